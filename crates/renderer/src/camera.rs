use stereorig::glam::Mat4;
use stereorig::{CameraLayers, Eye, FrameOutput, LayerMask, Pose, PresentationMode};

pub const FOV_Y_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 0.01;
pub const FAR: f32 = 100.0;

/// Pixel rectangle a camera renders into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    /// Left and right halves of the surface.
    pub fn split(width: u32, height: u32) -> [Self; 2] {
        let half = (width.max(2) / 2) as f32;
        let height = height.max(1) as f32;
        [
            Self {
                x: 0.0,
                y: 0.0,
                width: half,
                height,
            },
            Self {
                x: half,
                y: 0.0,
                width: half,
                height,
            },
        ]
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// A view into the scene restricted to the layers in `mask`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub view_proj: Mat4,
    pub mask: LayerMask,
    pub viewport: Viewport,
}

impl Camera {
    fn looking_from(pose: &Pose, viewport: Viewport, mask: LayerMask) -> Self {
        let projection =
            Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), viewport.aspect(), NEAR, FAR);
        let view = pose.matrix().inverse();
        Self {
            view_proj: projection * view,
            mask,
            viewport,
        }
    }

    /// The flat preview camera at the rig origin, looking down -Z.
    pub fn preview(surface: (u32, u32), layers: &CameraLayers) -> Self {
        Self::looking_from(
            &Pose::IDENTITY,
            Viewport::full(surface.0, surface.1),
            layers.preview,
        )
    }

    /// Both eye cameras for a head pose, each offset by half the IPD along
    /// the head's right vector.
    pub fn eyes(head: &Pose, ipd: f32, surface: (u32, u32), layers: &CameraLayers) -> [Self; 2] {
        let viewports = Viewport::split(surface.0, surface.1);
        Eye::BOTH.map(|eye| {
            let side = match eye {
                Eye::Left => -0.5,
                Eye::Right => 0.5,
            };
            let pose = Pose::new(head.position + head.right() * (ipd * side), head.orientation);
            let viewport = match eye {
                Eye::Left => viewports[0],
                Eye::Right => viewports[1],
            };
            Self::looking_from(&pose, viewport, layers.eye(eye))
        })
    }
}

/// Cameras needed to draw `frame`: one for preview, two while presenting.
pub fn cameras_for<I>(
    frame: &FrameOutput<'_, I>,
    head: Option<&Pose>,
    ipd: f32,
    surface: (u32, u32),
) -> Vec<Camera> {
    match (frame.presentation, head) {
        (PresentationMode::Presenting, Some(head)) => {
            Camera::eyes(head, ipd, surface, &frame.cameras).to_vec()
        }
        _ => vec![Camera::preview(surface, &frame.cameras)],
    }
}

#[cfg(test)]
mod tests {
    use stereorig::glam::{Quat, Vec3};
    use stereorig::RenderLayer;

    use super::*;

    /// Projects a world-space point to normalised device coordinates.
    fn project(camera: &Camera, point: Vec3) -> Vec3 {
        camera.view_proj.project_point3(point)
    }

    fn restricted() -> CameraLayers {
        let mut layers = CameraLayers::default();
        layers.restrict_to_own_eye();
        layers
    }

    #[test]
    fn preview_camera_sees_straight_ahead_at_centre() {
        let camera = Camera::preview((1600, 900), &CameraLayers::default());
        let ndc = project(&camera, Vec3::new(0.0, 0.0, -2.0));
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!(camera.mask.contains(RenderLayer::LeftEye));
        assert!(camera.mask.contains(RenderLayer::RightEye));
    }

    #[test]
    fn eyes_split_the_surface_and_their_layers() {
        let head = Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY);
        let [left, right] = Camera::eyes(&head, 0.064, (1600, 900), &restricted());
        assert_eq!(left.viewport.x, 0.0);
        assert_eq!(right.viewport.x, 800.0);
        assert!(left.mask.contains(RenderLayer::LeftEye));
        assert!(!left.mask.contains(RenderLayer::RightEye));
        assert!(right.mask.contains(RenderLayer::RightEye));
        assert!(!right.mask.contains(RenderLayer::LeftEye));
    }

    #[test]
    fn eye_offset_produces_disparity() {
        let head = Pose::new(Vec3::ZERO, Quat::IDENTITY);
        let [left, right] = Camera::eyes(&head, 0.064, (1600, 900), &restricted());
        let point = Vec3::new(0.0, 0.0, -1.0);
        let left_ndc = project(&left, point);
        let right_ndc = project(&right, point);
        assert!(left_ndc.x > 0.0);
        assert!(right_ndc.x < 0.0);
    }

    #[test]
    fn split_viewports_keep_aspect_of_half_surface() {
        let [left, right] = Viewport::split(1000, 500);
        assert_eq!(left.aspect(), 1.0);
        assert_eq!(right.width, 500.0);
    }
}
