//! Placement and per-eye visibility model for a stereoscopic image panel.
//!
//! [`ViewerState`] owns everything that changes at runtime. Input handlers
//! push [`Command`]s; the display loop calls [`ViewerState::step`] once per
//! frame and hands the resulting [`FrameOutput`] to a renderer.

mod calibration;
mod command;
mod config;
mod error;
mod geometry;
mod loader;
mod placement;
mod preview;
mod rig;
mod state;
mod texture;

pub use calibration::{Eye, EyeCalibration, EyeTransform};
pub use command::{Command, CommandQueue, NudgeDirection};
pub use config::{ViewerConfig, DEFAULT_PANEL_WIDTH, DEFAULT_VIEW_DISTANCE};
pub use error::StereoError;
pub use geometry::{GeometryBuilder, PanelGeometry};
pub use loader::{LoadTicket, LoadVerdict, PairLoader};
pub use placement::{
    place_in_front, PlacementController, PlacementMode, PlacementState, PlacementTuning, Pose,
    PresentationMode,
};
pub use preview::{presenting_layout, PreviewCompositor, DEFAULT_PREVIEW_SPACING};
pub use rig::{CameraLayers, LayerMask, LocalTransform, Quad, QuadId, RenderLayer, StereoRig};
pub use state::{FrameInput, FrameOutput, QuadFrame, RigFrame, ViewerSettings, ViewerState};
pub use texture::{EyeImage, StagedPair, StereoTexturePair};

pub use glam;
