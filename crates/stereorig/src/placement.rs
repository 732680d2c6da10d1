use glam::{Mat4, Quat, Vec3};

use crate::command::NudgeDirection;

/// Position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.orientation * Vec3::NEG_Z).normalize()
    }

    pub fn right(&self) -> Vec3 {
        (self.orientation * Vec3::X).normalize()
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How the panel follows the viewer while presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementMode {
    /// Placed once in front of the head, then fixed until recentered.
    #[default]
    WorldAnchored,
    /// Re-placed in front of the head every frame.
    HeadLocked,
}

impl PlacementMode {
    pub fn toggled(self) -> Self {
        match self {
            PlacementMode::WorldAnchored => PlacementMode::HeadLocked,
            PlacementMode::HeadLocked => PlacementMode::WorldAnchored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    FlatPreview,
    Presenting,
}

/// Global offsets applied on top of the head-relative placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementTuning {
    /// Metres along the head's right vector.
    pub x_offset: f32,
    /// Metres added to the world Y of the placed panel.
    pub y_offset: f32,
    /// Degrees about the panel's local X axis.
    pub tilt_deg: f32,
    /// Metres moved by one horizontal nudge.
    pub nudge_step: f32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.12,
            tilt_deg: 0.0,
            nudge_step: 0.02,
        }
    }
}

/// Per-frame placement state. Only the world-anchored state carries an
/// anchor, so an anchor can never leak into preview or head-locked frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementState {
    FlatPreview,
    HeadLocked,
    WorldAnchored { anchor: Option<Pose> },
}

impl PlacementState {
    fn presenting(mode: PlacementMode) -> Self {
        match mode {
            PlacementMode::WorldAnchored => PlacementState::WorldAnchored { anchor: None },
            PlacementMode::HeadLocked => PlacementState::HeadLocked,
        }
    }

    pub fn presentation(&self) -> PresentationMode {
        match self {
            PlacementState::FlatPreview => PresentationMode::FlatPreview,
            _ => PresentationMode::Presenting,
        }
    }
}

/// Computes the panel pose `distance` metres in front of `head`.
pub fn place_in_front(head: &Pose, distance: f32, tuning: &PlacementTuning) -> Pose {
    let mut position = head.position + head.forward() * distance + head.right() * tuning.x_offset;
    position.y += tuning.y_offset;
    let orientation = head.orientation * Quat::from_rotation_x(tuning.tilt_deg.to_radians());
    Pose {
        position,
        orientation,
    }
}

/// Decides where the panel group sits every frame.
#[derive(Debug, Clone)]
pub struct PlacementController {
    mode: PlacementMode,
    tuning: PlacementTuning,
    state: PlacementState,
    recenter_requested: bool,
    group: Pose,
}

impl PlacementController {
    pub fn new(mode: PlacementMode, tuning: PlacementTuning) -> Self {
        Self {
            mode,
            tuning,
            state: PlacementState::FlatPreview,
            recenter_requested: false,
            group: Pose::IDENTITY,
        }
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn tuning(&self) -> &PlacementTuning {
        &self.tuning
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn presentation(&self) -> PresentationMode {
        self.state.presentation()
    }

    pub fn group(&self) -> Pose {
        self.group
    }

    pub fn anchor(&self) -> Option<Pose> {
        match self.state {
            PlacementState::WorldAnchored { anchor } => anchor,
            _ => None,
        }
    }

    pub fn recenter_pending(&self) -> bool {
        self.recenter_requested
    }

    pub fn request_recenter(&mut self) {
        self.recenter_requested = true;
    }

    /// Drops the anchor so the next presenting frame places afresh.
    pub fn invalidate(&mut self) {
        if let PlacementState::WorldAnchored { anchor } = &mut self.state {
            if anchor.take().is_some() {
                tracing::debug!("world anchor invalidated");
            }
        }
    }

    /// Returns `true` when the mode actually changed.
    pub fn set_mode(&mut self, mode: PlacementMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        if self.state != PlacementState::FlatPreview {
            self.state = PlacementState::presenting(mode);
        }
        tracing::info!(?mode, "placement mode changed");
        true
    }

    pub fn toggle_mode(&mut self) -> PlacementMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn nudge_horizontal(&mut self, direction: NudgeDirection) {
        let step = self.tuning.nudge_step;
        self.tuning.x_offset += match direction {
            NudgeDirection::Left => -step,
            NudgeDirection::Right => step,
        };
        tracing::debug!(x_offset = self.tuning.x_offset, "nudged panel horizontally");
        self.invalidate();
    }

    /// Enters presentation with an unset anchor.
    pub fn begin_session(&mut self) {
        self.state = PlacementState::presenting(self.mode);
    }

    pub fn end_session(&mut self) {
        self.state = PlacementState::FlatPreview;
    }

    /// Keeps the state in line with the frame's presentation without placing.
    pub fn track_presentation(&mut self, presenting: bool) {
        match (presenting, self.state) {
            (true, PlacementState::FlatPreview) => self.begin_session(),
            (false, PlacementState::FlatPreview) => {}
            (false, _) => self.end_session(),
            (true, _) => {}
        }
    }

    /// Runs one placement step. `head` is `Some` exactly when presenting.
    pub fn update(&mut self, head: Option<&Pose>, distance: f32) -> Pose {
        self.track_presentation(head.is_some());
        let group = match (head, &mut self.state) {
            (Some(head), PlacementState::HeadLocked) => {
                self.recenter_requested = false;
                place_in_front(head, distance, &self.tuning)
            }
            (Some(head), PlacementState::WorldAnchored { anchor }) => {
                match *anchor {
                    Some(pose) if !self.recenter_requested => pose,
                    _ => {
                        let pose = place_in_front(head, distance, &self.tuning);
                        *anchor = Some(pose);
                        self.recenter_requested = false;
                        tracing::info!(
                            x = pose.position.x,
                            y = pose.position.y,
                            z = pose.position.z,
                            "placed panel in front of viewer"
                        );
                        pose
                    }
                }
            }
            _ => {
                // The anchor is already unset here, so a pending recenter has
                // nothing left to do.
                self.recenter_requested = false;
                Pose::IDENTITY
            }
        };
        tracing::trace!(?group, "placement step");
        self.group = group;
        group
    }
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(PlacementMode::default(), PlacementTuning::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn head_at(position: Vec3, yaw_deg: f32) -> Pose {
        Pose::new(position, Quat::from_rotation_y(yaw_deg.to_radians()))
    }

    fn flat_tuning() -> PlacementTuning {
        PlacementTuning {
            y_offset: 0.0,
            ..PlacementTuning::default()
        }
    }

    #[test]
    fn places_panel_along_forward_vector() {
        let head = head_at(Vec3::new(0.0, 1.6, 0.0), 0.0);
        let pose = place_in_front(&head, 2.0, &PlacementTuning::default());
        assert!(pose.position.abs_diff_eq(Vec3::new(0.0, 1.72, -2.0), EPS));
        assert!(pose.orientation.abs_diff_eq(head.orientation, EPS));
    }

    #[test]
    fn yawed_head_places_panel_to_the_side() {
        let head = head_at(Vec3::ZERO, 90.0);
        let pose = place_in_front(&head, 1.0, &flat_tuning());
        assert!(pose.position.abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn x_offset_follows_head_right_vector() {
        let head = head_at(Vec3::ZERO, 0.0);
        let tuning = PlacementTuning {
            x_offset: 0.3,
            ..flat_tuning()
        };
        let pose = place_in_front(&head, 1.0, &tuning);
        assert!(pose.position.abs_diff_eq(Vec3::new(0.3, 0.0, -1.0), EPS));
    }

    #[test]
    fn tilt_rotates_about_local_x() {
        let head = head_at(Vec3::ZERO, 0.0);
        let tuning = PlacementTuning {
            tilt_deg: 90.0,
            ..flat_tuning()
        };
        let pose = place_in_front(&head, 1.0, &tuning);
        let normal = pose.orientation * Vec3::Z;
        assert!(normal.abs_diff_eq(Vec3::NEG_Y, EPS));
    }

    #[test]
    fn world_anchor_ignores_head_motion_until_recenter() {
        let mut controller = PlacementController::default();
        let first = controller.update(Some(&head_at(Vec3::ZERO, 0.0)), 2.0);
        let turned = head_at(Vec3::new(0.5, 0.0, 0.0), 45.0);
        assert_eq!(controller.update(Some(&turned), 2.0), first);

        controller.request_recenter();
        let recentered = controller.update(Some(&turned), 2.0);
        assert_eq!(recentered, place_in_front(&turned, 2.0, controller.tuning()));
        assert!(!controller.recenter_pending());
    }

    #[test]
    fn head_locked_tracks_every_frame() {
        let mut controller =
            PlacementController::new(PlacementMode::HeadLocked, PlacementTuning::default());
        controller.update(Some(&head_at(Vec3::ZERO, 0.0)), 2.0);
        let turned = head_at(Vec3::ZERO, 30.0);
        assert_eq!(
            controller.update(Some(&turned), 2.0),
            place_in_front(&turned, 2.0, controller.tuning())
        );
        assert_eq!(controller.anchor(), None);
    }

    #[test]
    fn preview_frames_clear_the_anchor() {
        let mut controller = PlacementController::default();
        controller.update(Some(&head_at(Vec3::ZERO, 0.0)), 2.0);
        assert!(controller.anchor().is_some());
        assert_eq!(controller.update(None, 2.0), Pose::IDENTITY);
        assert_eq!(controller.state(), PlacementState::FlatPreview);

        let turned = head_at(Vec3::ZERO, -60.0);
        assert_eq!(
            controller.update(Some(&turned), 2.0),
            place_in_front(&turned, 2.0, controller.tuning())
        );
    }

    #[test]
    fn switching_to_world_anchored_starts_unanchored() {
        let mut controller =
            PlacementController::new(PlacementMode::HeadLocked, PlacementTuning::default());
        controller.update(Some(&head_at(Vec3::ZERO, 0.0)), 2.0);
        assert_eq!(controller.toggle_mode(), PlacementMode::WorldAnchored);
        assert_eq!(
            controller.state(),
            PlacementState::WorldAnchored { anchor: None }
        );
        assert!(!controller.set_mode(PlacementMode::WorldAnchored));
    }

    #[test]
    fn horizontal_nudge_moves_and_invalidates() {
        let mut controller = PlacementController::new(PlacementMode::WorldAnchored, flat_tuning());
        let head = head_at(Vec3::ZERO, 0.0);
        controller.update(Some(&head), 1.0);
        controller.nudge_horizontal(NudgeDirection::Right);
        assert_eq!(controller.anchor(), None);
        let pose = controller.update(Some(&head), 1.0);
        assert!(pose.position.abs_diff_eq(Vec3::new(0.02, 0.0, -1.0), EPS));
        controller.nudge_horizontal(NudgeDirection::Left);
        assert!(controller.tuning().x_offset.abs() < EPS);
    }

    #[test]
    fn invalidate_outside_world_anchor_is_a_no_op() {
        let mut controller = PlacementController::default();
        controller.invalidate();
        assert_eq!(controller.state(), PlacementState::FlatPreview);
    }
}
