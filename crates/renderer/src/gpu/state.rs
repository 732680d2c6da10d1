use anyhow::Result;
use image::RgbaImage;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use stereorig::{FrameOutput, QuadId, RigFrame};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::Camera;
use crate::types::{Antialiasing, ColorSpaceMode};

use super::context::GpuContext;
use super::pipeline::PanelPipeline;
use super::textures::{create_sampler, PairTextures};
use super::uniforms::PanelUniforms;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.03,
    a: 1.0,
};

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    fn for_context(context: &GpuContext) -> Option<Self> {
        (context.sample_count > 1).then(|| {
            Self::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }
}

/// Every GPU resource needed to draw the stereo rig into the window.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: PanelPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    textures: Option<PairTextures>,
    multisample_target: Option<MultisampleTarget>,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, size, antialiasing, color_space)?;
        let pipeline = PanelPipeline::new(
            &context.device,
            context.surface_format,
            context.sample_count,
        );

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("panel uniforms"),
            size: PanelUniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("panel uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
        let sampler = create_sampler(&context.device);
        let multisample_target = MultisampleTarget::for_context(&context);

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            sampler,
            textures: None,
            multisample_target,
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.multisample_target = MultisampleTarget::for_context(&self.context);
    }

    /// Draws one frame and presents it.
    ///
    /// The surface is cleared first; afterwards every camera gets its own
    /// pass per visible quad, loading what earlier passes drew.
    pub(crate) fn render(
        &mut self,
        frame: &FrameOutput<'_, RgbaImage>,
        cameras: &[Camera],
    ) -> Result<(), wgpu::SurfaceError> {
        if let Some(rig) = frame.rig.as_ref() {
            self.sync_textures(rig);
        }

        let surface_texture = self.context.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("stereo frame encoder"),
                });

        self.encode_clear(&mut encoder, &view);

        if let (Some(rig), Some(textures)) = (frame.rig.as_ref(), self.textures.as_ref()) {
            for camera in cameras {
                for quad in rig.quads.iter().filter(|quad| camera.mask.contains(quad.layer)) {
                    let uniforms =
                        PanelUniforms::new(camera.view_proj, frame.model_matrix(quad), rig.geometry);
                    self.encode_quad(&mut encoder, &view, camera, &uniforms, textures, quad.id);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn sync_textures(&mut self, rig: &RigFrame<'_, RgbaImage>) {
        if self
            .textures
            .as_ref()
            .is_some_and(|textures| textures.generation() == rig.generation)
        {
            return;
        }

        let image_for = |id: QuadId| {
            rig.quads
                .iter()
                .find(|quad| quad.id == id)
                .map(|quad| quad.image)
        };
        let (Some(left), Some(right)) = (image_for(QuadId::A), image_for(QuadId::B)) else {
            return;
        };

        match PairTextures::upload(
            &self.context.device,
            &self.context.queue,
            &self.pipeline.texture_layout,
            &self.sampler,
            self.context.color_space.texture_format(),
            rig.generation,
            left,
            right,
        ) {
            Ok(textures) => self.textures = Some(textures),
            Err(err) => {
                tracing::warn!(
                    generation = rig.generation,
                    error = %err,
                    "failed to upload stereo pair; keeping previous textures"
                );
            }
        }
    }

    fn color_attachment<'a>(
        &'a self,
        view: &'a wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> wgpu::RenderPassColorAttachment<'a> {
        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(view)),
            None => (view, None),
        };
        wgpu::RenderPassColorAttachment {
            view: attachment_view,
            depth_slice: None,
            resolve_target,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
        }
    }

    fn encode_clear(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear pass"),
            color_attachments: &[Some(
                self.color_attachment(view, wgpu::LoadOp::Clear(CLEAR_COLOR)),
            )],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
    }

    fn encode_quad(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        camera: &Camera,
        uniforms: &PanelUniforms,
        textures: &PairTextures,
        quad: QuadId,
    ) {
        // Each pass gets its own staging copy so quads never share uniform values.
        let staging = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("panel uniform staging"),
                contents: bytemuck::bytes_of(uniforms),
                usage: wgpu::BufferUsages::COPY_SRC,
            });
        encoder.copy_buffer_to_buffer(&staging, 0, &self.uniform_buffer, 0, PanelUniforms::SIZE);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("panel pass"),
            color_attachments: &[Some(self.color_attachment(view, wgpu::LoadOp::Load))],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        let viewport = camera.viewport;
        render_pass.set_viewport(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height,
            0.0,
            1.0,
        );
        render_pass.set_pipeline(&self.pipeline.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, textures.bind_group(quad), &[]);
        render_pass.draw(0..6, 0..1);
    }
}
