use stereorig::glam::{Quat, Vec3};
use stereorig::{Pose, StereoError};

/// Standing eye height of the simulated viewer, in metres.
pub const SIMULATED_EYE_HEIGHT: f32 = 1.6;

/// Radians of head rotation per pixel of mouse drag.
const DRAG_SENSITIVITY: f32 = 0.004;

const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 * 0.95;

/// A source of presentation sessions and head poses.
pub trait Headset {
    fn name(&self) -> &'static str;

    fn start_session(&mut self) -> Result<(), StereoError>;

    fn end_session(&mut self);

    fn is_presenting(&self) -> bool;

    /// Current head pose, `None` outside a session.
    fn head_pose(&self) -> Option<Pose>;

    /// The primary "select" gesture. Returns `true` when it should recenter
    /// the panel.
    fn select(&mut self) -> bool {
        self.is_presenting()
    }

    /// Pointer drag in window pixels, for backends that emulate head motion.
    fn look(&mut self, _dx: f64, _dy: f64) {}
}

/// Desktop stand-in for a headset.
#[derive(Debug, Default)]
pub struct SimulatedHeadset {
    active: bool,
    yaw: f32,
    pitch: f32,
}

impl SimulatedHeadset {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Headset for SimulatedHeadset {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn start_session(&mut self) -> Result<(), StereoError> {
        self.active = true;
        self.yaw = 0.0;
        self.pitch = 0.0;
        Ok(())
    }

    fn end_session(&mut self) {
        self.active = false;
    }

    fn is_presenting(&self) -> bool {
        self.active
    }

    fn head_pose(&self) -> Option<Pose> {
        if !self.active {
            return None;
        }
        let orientation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        Some(Pose::new(
            Vec3::new(0.0, SIMULATED_EYE_HEIGHT, 0.0),
            orientation,
        ))
    }

    fn look(&mut self, dx: f64, dy: f64) {
        if !self.active {
            return;
        }
        self.yaw -= dx as f32 * DRAG_SENSITIVITY;
        self.pitch = (self.pitch - dy as f32 * DRAG_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }
}

/// Used when no headset is available; sessions always fail.
#[derive(Debug, Default)]
pub struct UnavailableHeadset;

impl Headset for UnavailableHeadset {
    fn name(&self) -> &'static str {
        "none"
    }

    fn start_session(&mut self) -> Result<(), StereoError> {
        Err(StereoError::UnsupportedDisplay(
            "no headset backend is configured".into(),
        ))
    }

    fn end_session(&mut self) {}

    fn is_presenting(&self) -> bool {
        false
    }

    fn head_pose(&self) -> Option<Pose> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_pose_only_while_presenting() {
        let mut headset = SimulatedHeadset::new();
        assert!(headset.head_pose().is_none());
        assert!(!headset.select());
        headset.start_session().unwrap();
        let pose = headset.head_pose().expect("pose");
        assert_eq!(pose.position.y, SIMULATED_EYE_HEIGHT);
        assert!(headset.select());
        headset.end_session();
        assert!(headset.head_pose().is_none());
    }

    #[test]
    fn dragging_right_turns_the_head_right() {
        let mut headset = SimulatedHeadset::new();
        headset.start_session().unwrap();
        headset.look(100.0, 0.0);
        let forward = headset.head_pose().unwrap().forward();
        assert!(forward.x > 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut headset = SimulatedHeadset::new();
        headset.start_session().unwrap();
        headset.look(0.0, -100_000.0);
        let forward = headset.head_pose().unwrap().forward();
        assert!(forward.y > 0.9 && forward.y < 1.0);
    }

    #[test]
    fn unavailable_headset_reports_unsupported_display() {
        let mut headset = UnavailableHeadset;
        assert!(matches!(
            headset.start_session(),
            Err(StereoError::UnsupportedDisplay(_))
        ));
        assert!(!headset.is_presenting());
    }
}
