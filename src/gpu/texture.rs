//! Sampled volume/image textures and off-screen render targets.

use crate::uniforms::TextureDim;

use super::pipeline_helpers::{nearest_sampler, DEPTH_FORMAT};

/// A 2-D or 3-D texture shared between a producer that writes it and the
/// programs that sample it.
///
/// Writers go through [`GpuTexture::write`]; ordering between a write and the
/// draws that sample it is the caller's responsibility.
pub struct GpuTexture {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    /// Nearest-filtering sampler bound next to the view.
    pub sampler: wgpu::Sampler,
    dim: TextureDim,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
}

impl GpuTexture {
    /// Create a 3-D texture of `size` voxels.
    #[must_use]
    pub fn new_3d(
        device: &wgpu::Device,
        label: &str,
        size: [u32; 3],
        format: wgpu::TextureFormat,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: size[2],
        };
        Self::create(device, label, TextureDim::D3, extent, format)
    }

    /// Create a 2-D texture of `size` texels.
    #[must_use]
    pub fn new_2d(
        device: &wgpu::Device,
        label: &str,
        size: [u32; 2],
        format: wgpu::TextureFormat,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size[0],
            height: size[1],
            depth_or_array_layers: 1,
        };
        Self::create(device, label, TextureDim::D2, extent, format)
    }

    fn create(
        device: &wgpu::Device,
        label: &str,
        dim: TextureDim,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: match dim {
                TextureDim::D2 => wgpu::TextureDimension::D2,
                TextureDim::D3 => wgpu::TextureDimension::D3,
            },
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = nearest_sampler(device, &format!("{label} Sampler"));
        Self {
            texture,
            view,
            sampler,
            dim,
            size,
            format,
        }
    }

    /// Dimensionality.
    pub fn dim(&self) -> TextureDim {
        self.dim
    }

    /// Extent in texels (depth is 1 for 2-D textures).
    pub fn size(&self) -> [u32; 3] {
        [
            self.size.width,
            self.size.height,
            self.size.depth_or_array_layers,
        ]
    }

    /// Upload tightly packed texel data covering the whole texture.
    ///
    /// Returns `false` (and uploads nothing) when `data` does not match the
    /// texture's byte size.
    pub fn write(&self, queue: &wgpu::Queue, data: &[u8]) -> bool {
        let Some(texel) = self.format.block_copy_size(None) else {
            log::warn!("texture format {:?} cannot be written", self.format);
            return false;
        };
        let row = self.size.width * texel;
        let expected =
            u64::from(row) * u64::from(self.size.height) * u64::from(self.size.depth_or_array_layers);
        if data.len() as u64 != expected {
            log::warn!(
                "texture write of {} bytes, expected {expected}",
                data.len()
            );
            return false;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(row),
                rows_per_image: Some(self.size.height),
            },
            self.size,
        );
        true
    }
}

/// A color target with a matching depth attachment.
///
/// Created with `RENDER_ATTACHMENT | TEXTURE_BINDING | COPY_SRC` on the
/// color texture, suitable for off-screen rendering followed by read-back.
pub struct RenderTarget {
    /// The color texture.
    pub texture: wgpu::Texture,
    /// A default full-texture color view.
    pub view: wgpu::TextureView,
    /// Depth view on [`DEPTH_FORMAT`].
    pub depth_view: wgpu::TextureView,
}

impl RenderTarget {
    /// Create a new render target with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("RenderTarget"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("RenderTarget Depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            depth_view,
        }
    }

    /// Begin a pass that clears color to `clear` and depth to 1.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("RenderTarget Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}
