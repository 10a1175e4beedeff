//! GPU side of a linked program: pipeline, per-draw uniform ring and
//! texture bind group.

use std::borrow::Cow;

use crate::scene::TextureHandle;
use crate::uniforms::{BindingTable, TEXTURE_GROUP, UNIFORM_GROUP};

use super::pipeline_helpers::{
    color_target, depth_stencil_state, dynamic_uniform_buffer, non_filtering_sampler,
    sampled_texture,
};
use super::render_context::RenderContext;
use super::texture::GpuTexture;
use super::uniform_ring::UniformRing;

/// Vertex input a program consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInput {
    /// Per-vertex mesh attributes.
    Mesh,
    /// Mesh attributes plus a per-instance model matrix.
    MeshInstanced,
    /// No buffers; the vertex stage synthesizes a full-screen triangle.
    Fullscreen,
}

/// Fixed-function state of one program's pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Vertex input.
    pub input: VertexInput,
    /// Primitive topology.
    pub topology: wgpu::PrimitiveTopology,
    /// Face culling.
    pub cull_mode: Option<wgpu::Face>,
    /// Color blending.
    pub blend: Option<wgpu::BlendState>,
    /// Depth test and write.
    pub depth_test: bool,
}

/// Linked program realized on a device.
pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: Option<wgpu::BindGroupLayout>,
    texture_bind_group: Option<wgpu::BindGroup>,
    bound_texture: Option<TextureHandle>,
    table: BindingTable,
    ring: UniformRing,
}

impl GpuProgram {
    /// Build the pipeline and uniform ring for a linked program.
    ///
    /// `max_draws` bounds the number of uniform snapshots per frame.
    pub fn new(
        ctx: &RenderContext,
        label: &str,
        vertex: &naga::Module,
        fragment: &naga::Module,
        table: &BindingTable,
        config: &PipelineConfig,
        max_draws: u32,
    ) -> Self {
        let device = &ctx.device;
        let block_size = u64::from(table.block_size().unwrap_or(0)).max(16);
        let align = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let ring = UniformRing::new(block_size, align, max_draws);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Uniform Layout")),
            entries: &[dynamic_uniform_buffer(0, block_size)],
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Uniforms")),
            size: ring.buffer_size(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Uniform Bind Group")),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(block_size),
                }),
            }],
        });

        let texture_layout = table.texture().map(|tex| {
            let mut entries = vec![sampled_texture(tex.binding, tex.dim)];
            if let Some(sampler) = tex.sampler {
                entries.push(non_filtering_sampler(sampler));
            }
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} Texture Layout")),
                entries: &entries,
            })
        });

        let mut layouts = vec![&uniform_layout];
        layouts.extend(texture_layout.as_ref());
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let vertex_module = shader_module(device, &format!("{label} Vertex"), vertex);
        let fragment_module = shader_module(device, &format!("{label} Fragment"), fragment);
        let buffers = vertex_buffers(config.input);
        let targets = color_target(ctx.format(), config.blend);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} Pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: config.topology,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(config.depth_test)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            texture_bind_group: None,
            bound_texture: None,
            table: table.clone(),
            ring,
        }
    }

    /// Rewind the uniform ring for a new frame.
    pub fn begin_frame(&mut self) {
        self.ring.rewind();
    }

    /// Copy one uniform snapshot into the ring.
    ///
    /// Returns its dynamic offset, or `None` when the frame's ring is full.
    pub fn stage(&mut self, queue: &wgpu::Queue, bytes: &[u8]) -> Option<u32> {
        let offset = self.ring.next_offset()?;
        if !bytes.is_empty() {
            queue.write_buffer(&self.uniform_buffer, u64::from(offset), bytes);
        }
        Some(offset)
    }

    /// Texture the bind group currently points at.
    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.bound_texture
    }

    /// Point the program's texture binding at `texture`, registered as
    /// `handle`.
    pub fn bind_texture(&mut self, device: &wgpu::Device, handle: TextureHandle, texture: &GpuTexture) {
        let (Some(layout), Some(binding)) = (&self.texture_layout, self.table.texture()) else {
            return;
        };
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: binding.binding,
            resource: wgpu::BindingResource::TextureView(&texture.view),
        }];
        if let Some(sampler) = binding.sampler {
            entries.push(wgpu::BindGroupEntry {
                binding: sampler,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }
        self.texture_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Program Texture Bind Group"),
            layout,
            entries: &entries,
        }));
        self.bound_texture = Some(handle);
    }

    /// Set the pipeline and bind groups for a draw using the snapshot at
    /// `offset`.
    ///
    /// Returns `false` when the program samples a texture but none is
    /// bound; nothing is set in that case.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, offset: u32) -> bool {
        if self.texture_layout.is_some() && self.texture_bind_group.is_none() {
            return false;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(UNIFORM_GROUP, &self.uniform_bind_group, &[offset]);
        if let Some(group) = &self.texture_bind_group {
            pass.set_bind_group(TEXTURE_GROUP, group, &[]);
        }
        true
    }
}

fn shader_module(device: &wgpu::Device, label: &str, module: &naga::Module) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Naga(Cow::Owned(module.clone())),
    })
}

fn vertex_buffers(input: VertexInput) -> Vec<wgpu::VertexBufferLayout<'static>> {
    use crate::scene::{INSTANCE_LAYOUT, MESH_LAYOUT};

    match input {
        VertexInput::Mesh => vec![MESH_LAYOUT],
        VertexInput::MeshInstanced => vec![MESH_LAYOUT, INSTANCE_LAYOUT],
        VertexInput::Fullscreen => Vec::new(),
    }
}
