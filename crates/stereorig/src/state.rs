use glam::Mat4;

use crate::calibration::{Eye, EyeCalibration};
use crate::command::{Command, CommandQueue};
use crate::config::ViewerConfig;
use crate::error::StereoError;
use crate::geometry::{GeometryBuilder, PanelGeometry};
use crate::loader::{LoadTicket, LoadVerdict, PairLoader};
use crate::placement::{
    PlacementController, PlacementMode, PlacementTuning, Pose, PresentationMode,
};
use crate::preview::{presenting_layout, PreviewCompositor};
use crate::rig::{CameraLayers, LocalTransform, QuadId, RenderLayer, StereoRig};
use crate::texture::{EyeImage, StereoTexturePair};

/// Initial values for a [`ViewerState`].
#[derive(Debug, Clone, Default)]
pub struct ViewerSettings {
    pub config: ViewerConfig,
    pub placement_mode: PlacementMode,
    pub tuning: PlacementTuning,
    pub preview: PreviewCompositor,
    pub calibration: EyeCalibration,
}

/// What the display collaborator reports for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameInput {
    Preview,
    Presenting { head: Pose },
}

impl FrameInput {
    pub fn head(&self) -> Option<&Pose> {
        match self {
            FrameInput::Preview => None,
            FrameInput::Presenting { head } => Some(head),
        }
    }
}

/// One quad as handed to the renderer.
#[derive(Debug)]
pub struct QuadFrame<'a, I> {
    pub id: QuadId,
    pub layer: RenderLayer,
    pub local: LocalTransform,
    pub image: &'a EyeImage<I>,
}

#[derive(Debug)]
pub struct RigFrame<'a, I> {
    pub geometry: PanelGeometry,
    /// Bumped every time a new pair is installed.
    pub generation: u64,
    pub quads: [QuadFrame<'a, I>; 2],
}

/// Result of [`ViewerState::step`].
#[derive(Debug)]
pub struct FrameOutput<'a, I> {
    pub frame: u64,
    pub presentation: PresentationMode,
    pub group: Pose,
    pub cameras: CameraLayers,
    /// `None` until the first pair has been installed.
    pub rig: Option<RigFrame<'a, I>>,
}

impl<I> FrameOutput<'_, I> {
    /// World transform of a quad: group pose followed by the quad's local
    /// transform.
    pub fn model_matrix(&self, quad: &QuadFrame<'_, I>) -> Mat4 {
        self.group.matrix() * quad.local.matrix()
    }
}

/// All mutable viewer state, advanced once per display frame.
///
/// Input handlers only [`push`](Self::push) commands. [`step`](Self::step)
/// drains them and then runs geometry, placement and calibration in that
/// order, so nothing touches the rig in the middle of a frame.
#[derive(Debug)]
pub struct ViewerState<I> {
    config: ViewerConfig,
    calibration: EyeCalibration,
    placement: PlacementController,
    preview: PreviewCompositor,
    geometry: GeometryBuilder,
    loader: PairLoader,
    pair: Option<StereoTexturePair<I>>,
    generation: u64,
    rig: Option<StereoRig>,
    swapped: bool,
    cameras: CameraLayers,
    queue: CommandQueue<I>,
    reports: Vec<StereoError>,
    frame: u64,
}

impl<I> ViewerState<I> {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            config: settings.config,
            calibration: settings.calibration,
            placement: PlacementController::new(settings.placement_mode, settings.tuning),
            preview: settings.preview,
            geometry: GeometryBuilder::default(),
            loader: PairLoader::new(),
            pair: None,
            generation: 0,
            rig: None,
            swapped: false,
            cameras: CameraLayers::default(),
            queue: CommandQueue::new(),
            reports: Vec::new(),
            frame: 0,
        }
    }

    pub fn push(&mut self, command: Command<I>) {
        self.queue.push(command);
    }

    /// Issues a ticket for a new pair load. Any load still in flight is
    /// superseded and its result will be discarded.
    pub fn begin_pair_load(&mut self) -> LoadTicket {
        self.loader.request()
    }

    pub fn step(&mut self, input: FrameInput) -> FrameOutput<'_, I> {
        self.frame += 1;
        while let Some(command) = self.queue.pop() {
            self.apply(command);
        }

        if let (Some(pair), Some(rig)) = (&self.pair, &mut self.rig) {
            if let Some(geometry) = self.geometry.rebuild(self.config.panel_width(), pair.left()) {
                rig.set_geometry(geometry);
            }
        }

        let before = self.placement.presentation();
        if self.rig.is_some() {
            self.placement
                .update(input.head(), self.config.view_distance());
        } else {
            self.placement.track_presentation(input.head().is_some());
        }

        let presentation = self.placement.presentation();
        if before == PresentationMode::FlatPreview && presentation == PresentationMode::Presenting
        {
            // A presenting frame can start the session without SessionStarted.
            tracing::info!("headset session started by a presenting frame");
            self.cameras.restrict_to_own_eye();
        }
        if let Some(rig) = &mut self.rig {
            for eye in Eye::BOTH {
                let calibration = self.calibration.get(eye);
                let local = match presentation {
                    PresentationMode::Presenting => presenting_layout(&calibration),
                    PresentationMode::FlatPreview => self.preview.layout(
                        eye,
                        self.config.panel_width(),
                        self.config.view_distance(),
                        &calibration,
                    ),
                };
                rig.set_local(eye, local);
            }
        }

        self.output(presentation)
    }

    fn output(&self, presentation: PresentationMode) -> FrameOutput<'_, I> {
        let rig = match (&self.rig, &self.pair) {
            (Some(rig), Some(pair)) => {
                let quads = rig.quads().map(|quad| QuadFrame {
                    id: quad.id,
                    layer: quad.layer,
                    local: quad.local,
                    image: pair.image(quad.id.source_eye()),
                });
                Some(RigFrame {
                    geometry: rig.geometry(),
                    generation: self.generation,
                    quads,
                })
            }
            _ => None,
        };
        FrameOutput {
            frame: self.frame,
            presentation,
            group: self.placement.group(),
            cameras: self.cameras,
            rig,
        }
    }

    fn apply(&mut self, command: Command<I>) {
        match command {
            Command::SetPanelWidth(width) => self.set_panel_width(width),
            Command::SetViewDistance(distance) => self.set_view_distance(distance),
            Command::AdjustPanelWidth(delta) => {
                self.set_panel_width(self.config.panel_width() + delta)
            }
            Command::AdjustViewDistance(delta) => {
                self.set_view_distance(self.config.view_distance() + delta)
            }
            Command::SetEyeTransform { eye, transform } => {
                if self.calibration.set(eye, transform) {
                    tracing::debug!(%eye, ?transform, "eye calibration set");
                }
            }
            Command::NudgeEye {
                eye,
                dx,
                dy,
                drotation,
            } => {
                let transform = self.calibration.nudge(eye, dx, dy, drotation);
                tracing::debug!(%eye, ?transform, "eye calibration nudged");
            }
            Command::RequestSwap => {
                self.swapped = !self.swapped;
                if let Some(rig) = &mut self.rig {
                    rig.swap();
                }
            }
            Command::RequestRecenter => {
                tracing::info!("recenter requested");
                self.placement.request_recenter();
            }
            Command::NudgeHorizontal(direction) => self.placement.nudge_horizontal(direction),
            Command::SetPlacementMode(mode) => {
                self.placement.set_mode(mode);
            }
            Command::TogglePlacementMode => {
                self.placement.toggle_mode();
            }
            Command::PairLoaded { ticket, result } => self.finish_pair_load(ticket, result),
            Command::SessionStarted => {
                tracing::info!("headset session started");
                self.cameras.restrict_to_own_eye();
                self.placement.begin_session();
            }
            Command::SessionEnded => {
                tracing::info!("headset session ended");
                self.placement.end_session();
            }
            Command::SessionFailed(reason) => {
                self.placement.end_session();
                self.report(StereoError::UnsupportedDisplay(reason));
            }
        }
    }

    fn set_panel_width(&mut self, width: f32) {
        match self.config.set_panel_width(width) {
            Ok(true) => {
                tracing::debug!(width, "panel width changed");
                self.geometry.invalidate();
                self.placement.invalidate();
            }
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    fn set_view_distance(&mut self, distance: f32) {
        match self.config.set_view_distance(distance) {
            Ok(true) => {
                tracing::debug!(distance, "view distance changed");
                self.placement.invalidate();
            }
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    fn finish_pair_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<StereoTexturePair<I>, StereoError>,
    ) {
        if self.loader.complete(ticket) == LoadVerdict::Superseded {
            tracing::debug!(ticket = ticket.id(), "discarding stale pair load");
            return;
        }
        let pair = match result {
            Ok(pair) => pair,
            Err(err) => return self.report(err),
        };
        let geometry = PanelGeometry::for_image(self.config.panel_width(), pair.left());
        match &mut self.rig {
            Some(rig) => rig.set_geometry(geometry),
            None => {
                let mut rig = StereoRig::new(geometry);
                rig.set_swapped(self.swapped);
                self.rig = Some(rig);
            }
        }
        self.generation += 1;
        tracing::info!(
            ticket = ticket.id(),
            width = pair.left().width,
            height = pair.left().height,
            "stereo pair installed"
        );
        self.pair = Some(pair);
    }

    fn report(&mut self, err: StereoError) {
        tracing::warn!("{err}");
        self.reports.push(err);
    }

    /// Drains non-fatal conditions reported since the last call.
    pub fn take_reports(&mut self) -> Vec<StereoError> {
        std::mem::take(&mut self.reports)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn calibration(&self) -> &EyeCalibration {
        &self.calibration
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn presentation(&self) -> PresentationMode {
        self.placement.presentation()
    }

    pub fn rig(&self) -> Option<&StereoRig> {
        self.rig.as_ref()
    }

    pub fn pair(&self) -> Option<&StereoTexturePair<I>> {
        self.pair.as_ref()
    }

    pub fn pair_generation(&self) -> u64 {
        self.generation
    }

    pub fn swapped(&self) -> bool {
        self.swapped
    }

    pub fn cameras(&self) -> CameraLayers {
        self.cameras
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }
}

impl<I> Default for ViewerState<I> {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}
