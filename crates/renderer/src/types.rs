use std::path::PathBuf;

use stereorig::ViewerSettings;

/// Interpupillary distance used by the eye cameras, in metres.
pub const DEFAULT_IPD: f32 = 0.064;

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Gamma-encoded swapchain; image bytes are passed through untouched.
    #[default]
    Auto,
    /// Use non-sRGB surfaces and textures.
    Gamma,
    /// Use sRGB surfaces and textures so sampling happens in linear space.
    Linear,
}

/// Which head-mounted display backend drives presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadsetKind {
    /// Desktop stand-in: split-screen eyes, mouse-drag head rotation.
    #[default]
    Simulated,
    /// No headset; every session request fails and the viewer stays in preview.
    None,
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Image shown to the left eye, if supplied up front.
    pub left_image: Option<PathBuf>,
    /// Image shown to the right eye, if supplied up front.
    pub right_image: Option<PathBuf>,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
    pub headset: HeadsetKind,
    /// Initial panel size, placement tuning and calibration.
    pub viewer: ViewerSettings,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1600, 900),
            left_image: None,
            right_image: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            headset: HeadsetKind::default(),
            viewer: ViewerSettings::default(),
        }
    }
}
