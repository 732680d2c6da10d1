use anyhow::Result;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use stereorig::{Eye, EyeImage, QuadId};
use wgpu::util::{DeviceExt, TextureDataOrder};

/// One eye image resident on the GPU.
struct EyeTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl EyeTexture {
    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        eye: Eye,
        image: &EyeImage<RgbaImage>,
    ) -> Result<Self> {
        if image.width == 0 || image.height == 0 {
            anyhow::bail!(
                "{eye} image has zero extent ({}x{})",
                image.width,
                image.height
            );
        }

        let max_dimension = device.limits().max_texture_dimension_2d;
        let downscaled;
        let pixels = if image.width > max_dimension || image.height > max_dimension {
            let scale = max_dimension as f32 / image.width.max(image.height) as f32;
            let width = ((image.width as f32 * scale) as u32).clamp(1, max_dimension);
            let height = ((image.height as f32 * scale) as u32).clamp(1, max_dimension);
            tracing::warn!(
                %eye,
                original = ?(image.width, image.height),
                scaled = ?(width, height),
                "eye image exceeds GPU texture limit; downscaling"
            );
            downscaled = imageops::resize(&image.pixels, width, height, FilterType::Triangle);
            &downscaled
        } else {
            &image.pixels
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&format!("{eye} eye texture")),
                size: wgpu::Extent3d {
                    width: pixels.width(),
                    height: pixels.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            pixels.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{eye} eye bind group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Ok(Self {
            _texture: texture,
            bind_group,
        })
    }
}

/// GPU copies of the current stereo pair, tagged with the load generation
/// they were uploaded from.
pub(crate) struct PairTextures {
    generation: u64,
    left: EyeTexture,
    right: EyeTexture,
}

impl PairTextures {
    #[allow(clippy::too_many_arguments)]
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        generation: u64,
        left: &EyeImage<RgbaImage>,
        right: &EyeImage<RgbaImage>,
    ) -> Result<Self> {
        let left = EyeTexture::upload(
            device,
            queue,
            layout,
            sampler,
            format,
            Eye::Left,
            left,
        )?;
        let right = EyeTexture::upload(
            device,
            queue,
            layout,
            sampler,
            format,
            Eye::Right,
            right,
        )?;
        tracing::debug!(generation, "uploaded stereo pair textures");
        Ok(Self {
            generation,
            left,
            right,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Bind group for the image a quad displays. Quads keep their source
    /// image across swaps; only their layer changes.
    pub fn bind_group(&self, quad: QuadId) -> &wgpu::BindGroup {
        match quad.source_eye() {
            Eye::Left => &self.left.bind_group,
            Eye::Right => &self.right.bind_group,
        }
    }
}

pub(crate) fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("eye sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
