use bytemuck::{Pod, Zeroable};
use stereorig::glam::Mat4;
use stereorig::PanelGeometry;

/// Per-draw uniform block, laid out to match `PanelUniforms` in `panel.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PanelUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub extent: [f32; 4],
}

impl PanelUniforms {
    pub fn new(view_proj: Mat4, model: Mat4, geometry: PanelGeometry) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            extent: [geometry.width, geometry.height, 0.0, 0.0],
        }
    }

    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}
