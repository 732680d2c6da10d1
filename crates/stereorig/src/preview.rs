use glam::Vec3;

use crate::calibration::{Eye, EyeTransform};
use crate::rig::LocalTransform;

pub const DEFAULT_PREVIEW_SPACING: f32 = 0.55;

/// Flat side-by-side layout used outside a headset session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewCompositor {
    spacing: f32,
}

impl PreviewCompositor {
    /// `spacing` is the distance from the centre to each quad, as a fraction
    /// of the panel width.
    pub fn new(spacing: f32) -> Self {
        Self { spacing }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn layout(
        &self,
        eye: Eye,
        panel_width: f32,
        view_distance: f32,
        calibration: &EyeTransform,
    ) -> LocalTransform {
        let side = match eye {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        };
        LocalTransform {
            position: Vec3::new(
                side * self.spacing * panel_width + calibration.offset_x,
                calibration.offset_y,
                -view_distance,
            ),
            rotation_z: calibration.rotation_rad(),
        }
    }
}

impl Default for PreviewCompositor {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_SPACING)
    }
}

/// Local transform of an eye quad inside the placed panel group.
pub fn presenting_layout(calibration: &EyeTransform) -> LocalTransform {
    LocalTransform {
        position: Vec3::new(calibration.offset_x, calibration.offset_y, 0.0),
        rotation_z: calibration.rotation_rad(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_sit_symmetrically_at_view_distance() {
        let compositor = PreviewCompositor::default();
        let none = EyeTransform::default();
        let left = compositor.layout(Eye::Left, 2.0, 3.0, &none);
        let right = compositor.layout(Eye::Right, 2.0, 3.0, &none);
        assert!((left.position.x + 1.1).abs() < 1e-6);
        assert!((right.position.x - 1.1).abs() < 1e-6);
        assert_eq!(left.position.z, -3.0);
        assert_eq!(right.position.z, -3.0);
    }

    #[test]
    fn calibration_adds_to_preview_layout() {
        let compositor = PreviewCompositor::new(0.5);
        let tweak = EyeTransform::new(0.01, -0.02, 90.0);
        let right = compositor.layout(Eye::Right, 1.0, 2.0, &tweak);
        assert!((right.position.x - 0.51).abs() < 1e-6);
        assert!((right.position.y + 0.02).abs() < 1e-6);
        assert!((right.rotation_z - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn presenting_layout_lies_in_group_plane() {
        let local = presenting_layout(&EyeTransform::new(0.03, 0.04, 0.0));
        assert_eq!(local.position, Vec3::new(0.03, 0.04, 0.0));
    }
}
