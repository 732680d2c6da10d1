//! Windowed front end for the stereo image viewer.
//!
//! The crate turns `stereorig`'s per-frame output into pixels:
//!
//! ```text
//!   CLI / stereopane
//!          │ RendererConfig
//!          ▼
//!   Viewer::run ──▶ ViewerWindow ──▶ winit event loop ──▶ render_frame()
//!                       │                                    │
//!                       ├─▶ DecodeWorker (image decode)      ├─▶ ViewerState::step
//!                       └─▶ Headset (session, head pose)     └─▶ GpuState::render
//! ```
//!
//! Input handlers never touch the rig directly; they push commands into the
//! viewer state, which applies them at the start of the next frame. The
//! headset sits behind a trait so the simulated desktop backend and a missing
//! backend share one code path.

mod camera;
mod gpu;
mod headset;
mod input;
mod loader;
mod types;
mod window;

use anyhow::Result;

pub use camera::{cameras_for, Camera, Viewport, FAR, FOV_Y_DEGREES, NEAR};
pub use headset::{Headset, SimulatedHeadset, UnavailableHeadset, SIMULATED_EYE_HEIGHT};
pub use input::{
    placement_label, KeyAction, KeyBindings, CALIBRATION_STEP, ROTATION_STEP, SIZE_STEP,
};
pub use loader::{decode_pair, DecodedPair};
pub use types::{Antialiasing, ColorSpaceMode, HeadsetKind, RendererConfig, DEFAULT_IPD};

/// Entry point that owns the start-up configuration.
pub struct Viewer {
    config: RendererConfig,
}

impl Viewer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Opens the window and blocks until it is closed.
    ///
    /// Fails when no window or GPU device can be created, for example on a
    /// headless machine.
    pub fn run(&mut self) -> Result<()> {
        window::run(&self.config)
    }
}
