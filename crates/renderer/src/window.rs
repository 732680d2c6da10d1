use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use stereorig::{Command, Eye, FrameInput, PresentationMode, StagedPair, StereoError, ViewerState};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::camera::cameras_for;
use crate::gpu::GpuState;
use crate::headset::{Headset, SimulatedHeadset, UnavailableHeadset};
use crate::input::{placement_label, KeyAction, KeyBindings};
use crate::loader::DecodeWorker;
use crate::types::{HeadsetKind, RendererConfig, DEFAULT_IPD};

const WINDOW_TITLE: &str = "Stereopane";

#[derive(Debug, Default)]
struct PointerState {
    position: Option<PhysicalPosition<f64>>,
    dragging: bool,
}

/// Everything the window needs between events: GPU resources, viewer state,
/// the headset backend and the background decoder.
pub(crate) struct ViewerWindow {
    window: Arc<Window>,
    gpu: GpuState,
    viewer: ViewerState<RgbaImage>,
    headset: Box<dyn Headset>,
    decoder: DecodeWorker,
    staged: StagedPair<PathBuf>,
    bindings: KeyBindings,
    pointer: PointerState,
    last_report: Option<String>,
    title: String,
}

impl ViewerWindow {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let gpu = GpuState::new(
            window.as_ref(),
            window.inner_size(),
            config.antialiasing,
            config.color_space,
        )?;
        let headset: Box<dyn Headset> = match config.headset {
            HeadsetKind::Simulated => Box::new(SimulatedHeadset::new()),
            HeadsetKind::None => Box::new(UnavailableHeadset),
        };
        tracing::info!(headset = headset.name(), "headset backend selected");

        let mut state = Self {
            window,
            gpu,
            viewer: ViewerState::new(config.viewer.clone()),
            headset,
            decoder: DecodeWorker::spawn()?,
            staged: StagedPair::new(),
            bindings: KeyBindings::default(),
            pointer: PointerState::default(),
            last_report: None,
            title: String::new(),
        };

        if let Some(left) = config.left_image.clone() {
            state.stage_image(Eye::Left, left);
        }
        if let Some(right) = config.right_image.clone() {
            state.stage_image(Eye::Right, right);
        }
        state.update_title();
        Ok(state)
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Records a source for one eye, starting a load once both are known.
    fn stage_image(&mut self, eye: Eye, path: PathBuf) {
        tracing::info!(%eye, path = %path.display(), "image selected");
        if let Some((left, right)) = self.staged.stage(eye, path) {
            let ticket = self.viewer.begin_pair_load();
            if let Err(err) = self.decoder.submit(ticket, left, right) {
                tracing::error!(error = %err, "failed to queue stereo pair for decoding");
            }
        }
    }

    /// Dropping onto the left half of the window sets the left eye, the
    /// right half sets the right eye. The half comes from the last known
    /// cursor position, since some platforms send no `CursorMoved` while a
    /// drag is in progress.
    fn handle_dropped_file(&mut self, path: PathBuf) {
        let eye = drop_target(self.pointer.position, self.size().width);
        self.stage_image(eye, path);
    }

    fn handle_hovered_file(&self, path: &Path) {
        let eye = drop_target(self.pointer.position, self.size().width);
        tracing::debug!(%eye, path = %path.display(), "file hovering, drop target");
    }

    fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let (true, Some(previous)) = (self.pointer.dragging, self.pointer.position) {
            self.headset
                .look(position.x - previous.x, position.y - previous.y);
        }
        self.pointer.position = Some(position);
    }

    fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match (button, state) {
            (MouseButton::Left, state) => self.pointer.dragging = state == ElementState::Pressed,
            (MouseButton::Right, ElementState::Pressed) => {
                if self.headset.select() {
                    self.viewer.push(Command::RequestRecenter);
                }
            }
            _ => {}
        }
    }

    /// Returns `true` when the key asks the viewer to quit.
    fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if event.state != ElementState::Pressed {
            return false;
        }
        let Some(action) = self.bindings.map(&event.logical_key) else {
            return false;
        };
        match action {
            KeyAction::Viewer(command) => self.viewer.push(command),
            KeyAction::ToggleSession => self.toggle_session(),
            KeyAction::SelectEye(eye) => tracing::info!(%eye, "calibrating eye"),
            KeyAction::Quit => return true,
        }
        self.update_title();
        false
    }

    fn toggle_session(&mut self) {
        if self.headset.is_presenting() {
            self.headset.end_session();
            self.viewer.push(Command::SessionEnded);
            return;
        }
        match self.headset.start_session() {
            Ok(()) => self.viewer.push(Command::SessionStarted),
            Err(StereoError::UnsupportedDisplay(reason)) => {
                self.viewer.push(Command::SessionFailed(reason))
            }
            Err(other) => self.viewer.push(Command::SessionFailed(other.to_string())),
        }
    }

    fn drain_decoder(&mut self) {
        while let Some((ticket, result)) = self.decoder.try_recv() {
            self.viewer.push(Command::PairLoaded { ticket, result });
        }
    }

    fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.drain_decoder();

        let head = self.headset.head_pose();
        let input = match head {
            Some(head) => FrameInput::Presenting { head },
            None => FrameInput::Preview,
        };
        let size = self.size();
        let result = {
            let frame = self.viewer.step(input);
            let cameras = cameras_for(&frame, head.as_ref(), DEFAULT_IPD, (size.width, size.height));
            self.gpu.render(&frame, &cameras)
        };

        if let Some(report) = self.viewer.take_reports().pop() {
            self.last_report = Some(report.to_string());
        }
        self.update_title();
        result
    }

    fn update_title(&mut self) {
        let mode = match self.viewer.presentation() {
            PresentationMode::FlatPreview => "preview",
            PresentationMode::Presenting => "presenting",
        };
        let config = self.viewer.config();
        let mut title = format!(
            "{WINDOW_TITLE} | {mode} | {} | {:.1}m @ {:.1}m | calibrating {}",
            placement_label(self.viewer.placement().mode()),
            config.panel_width(),
            config.view_distance(),
            self.bindings.selected(),
        );
        if self.viewer.swapped() {
            title.push_str(" | swapped");
        }
        if self.viewer.pair().is_none() {
            title.push_str(" | drop a left and right image");
        }
        if let Some(report) = self.last_report.as_deref() {
            title.push_str(" | ");
            title.push_str(report);
        }
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }

    fn shutdown(&mut self) {
        if self.headset.is_presenting() {
            self.headset.end_session();
        }
    }
}

/// Eye that receives a file dropped at `position` in a window `width`
/// pixels wide. With no known position the left eye is used.
fn drop_target(position: Option<PhysicalPosition<f64>>, width: u32) -> Eye {
    match position {
        Some(position) if position.x >= width as f64 / 2.0 => Eye::Right,
        _ => Eye::Left,
    }
}

/// Opens the viewer window and drives the `winit` event loop until the user
/// quits.
pub(crate) fn run(config: &RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create viewer window")?;
    let window = Arc::new(window);

    let mut state = ViewerWindow::new(window, config)?;
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            state.shutdown();
                            elwt.exit();
                        }
                        WindowEvent::HoveredFile(path) => state.handle_hovered_file(&path),
                        WindowEvent::DroppedFile(path) => state.handle_dropped_file(path),
                        WindowEvent::KeyboardInput { event, .. } => {
                            if state.handle_key(&event) {
                                state.shutdown();
                                elwt.exit();
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.handle_cursor_moved(position);
                        }
                        WindowEvent::MouseInput {
                            state: button_state,
                            button,
                            ..
                        } => state.handle_mouse_button(button, button_state),
                        WindowEvent::Resized(new_size) => state.resize(new_size),
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            let _ = inner_size_writer.request_inner_size(state.size());
                        }
                        WindowEvent::RedrawRequested => match state.render_frame() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; exiting");
                                state.shutdown();
                                elwt.exit();
                            }
                            Err(wgpu::SurfaceError::Timeout) => {
                                tracing::warn!("surface timeout; retrying next frame");
                            }
                            Err(other) => {
                                tracing::warn!(error = ?other, "surface error; retrying next frame");
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    state.window().request_redraw();
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
