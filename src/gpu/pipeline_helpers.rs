//! Shared wgpu boilerplate for program bind group layouts and pipelines.

use std::num::NonZeroU64;

use crate::uniforms::TextureDim;

/// Stages that may read program uniforms and textures.
const PROGRAM_STAGES: wgpu::ShaderStages = wgpu::ShaderStages::VERTEX_FRAGMENT;

/// Depth format every program pipeline declares.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform block binding read with a dynamic offset, one block per draw.
pub fn dynamic_uniform_buffer(binding: u32, block_size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: PROGRAM_STAGES,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: NonZeroU64::new(block_size),
        },
        count: None,
    }
}

/// **Non-filterable** float texture binding of the given dimensionality.
pub fn sampled_texture(binding: u32, dim: TextureDim) -> wgpu::BindGroupLayoutEntry {
    let view_dimension = match dim {
        TextureDim::D2 => wgpu::TextureViewDimension::D2,
        TextureDim::D3 => wgpu::TextureViewDimension::D3,
    };
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: PROGRAM_STAGES,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

/// Non-filtering sampler binding.
pub fn non_filtering_sampler(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: PROGRAM_STAGES,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
        count: None,
    }
}

/// ClampToEdge + Nearest sampler, valid for every float texture format.
pub fn nearest_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Depth-stencil state on [`DEPTH_FORMAT`].
///
/// Programs that ignore depth still declare the format with an `Always`
/// compare so that every program can draw into the same pass.
pub fn depth_stencil_state(test: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: test,
        depth_compare: if test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Single color target on `format`.
pub fn color_target(
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend,
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_entry_is_dynamic_and_sized() {
        let entry = dynamic_uniform_buffer(0, 112);
        let wgpu::BindingType::Buffer {
            has_dynamic_offset,
            min_binding_size,
            ..
        } = entry.ty
        else {
            panic!("not a buffer binding");
        };
        assert!(has_dynamic_offset);
        assert_eq!(min_binding_size.map(NonZeroU64::get), Some(112));
    }

    #[test]
    fn disabled_depth_keeps_format() {
        let state = depth_stencil_state(false);
        assert_eq!(state.format, DEPTH_FORMAT);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
    }

    #[test]
    fn texture_entry_matches_dim() {
        let entry = sampled_texture(0, TextureDim::D3);
        assert!(matches!(
            entry.ty,
            wgpu::BindingType::Texture {
                view_dimension: wgpu::TextureViewDimension::D3,
                ..
            }
        ));
    }
}
