//! GPU side of the viewer.
//!
//! - `context` owns the wgpu instance, device and surface, and picks the
//!   surface format and MSAA sample count.
//! - `pipeline` builds the single textured-quad pipeline.
//! - `textures` uploads decoded eye images once per load generation.
//! - `uniforms` mirrors the per-draw block in `panel.wgsl`.
//! - `state` draws every camera's visible quads and presents the frame.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
