use std::fmt;

use crate::gpu::program::{GpuProgram, PipelineConfig, VertexInput};
use crate::scene::TextureHandle;
use crate::uniforms::{BindingTable, UniformBlock};

/// Opaque identifier of a registered program.
///
/// Handles are allocated monotonically and never reused, so a stale handle
/// can never address a newer program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub(crate) u32);

impl fmt::Display for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Purpose a program is made for. The scene keeps at most one program per
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgramKind {
    /// Lit opaque meshes.
    Simple,
    /// Planar cut through a volume texture.
    Slice,
    /// Line outlines (bounding boxes, bricks).
    Outline,
    /// Mesh to voxel rasterization along each triangle's dominant axis.
    Voxelize,
    /// Full-screen volume ray caster.
    Raycast,
    /// Lit meshes drawn once per instance transform.
    Instance,
    /// Full-screen 2-D texture display.
    Screen,
}

impl ProgramKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 7] = [
        Self::Simple,
        Self::Slice,
        Self::Outline,
        Self::Voxelize,
        Self::Raycast,
        Self::Instance,
        Self::Screen,
    ];

    /// Lowercase name, used for labels and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Slice => "slice",
            Self::Outline => "outline",
            Self::Voxelize => "voxelize",
            Self::Raycast => "raycast",
            Self::Instance => "instance",
            Self::Screen => "screen",
        }
    }

    /// Whether the program draws a full-screen triangle instead of models.
    pub const fn is_screenspace(self) -> bool {
        matches!(self, Self::Raycast | Self::Screen)
    }

    /// Whether draws need per-instance transforms.
    pub const fn is_instanced(self) -> bool {
        matches!(self, Self::Instance)
    }

    /// Fixed-function state of the kind's pipeline.
    pub fn pipeline_config(self) -> PipelineConfig {
        let mesh = PipelineConfig {
            input: VertexInput::Mesh,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            blend: None,
            depth_test: true,
        };
        let fullscreen = PipelineConfig {
            input: VertexInput::Fullscreen,
            cull_mode: None,
            depth_test: false,
            ..mesh
        };
        match self {
            Self::Simple => mesh,
            Self::Slice => PipelineConfig {
                cull_mode: None,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                ..mesh
            },
            Self::Outline => PipelineConfig {
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                ..mesh
            },
            Self::Voxelize => PipelineConfig {
                cull_mode: None,
                depth_test: false,
                ..mesh
            },
            Self::Raycast => PipelineConfig {
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                ..fullscreen
            },
            Self::Instance => PipelineConfig {
                input: VertexInput::MeshInstanced,
                ..mesh
            },
            Self::Screen => fullscreen,
        }
    }
}

impl fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composed and reflected stages, not yet realized on a device.
#[derive(Debug, Clone)]
pub struct LinkedProgram {
    /// Purpose of the program.
    pub kind: ProgramKind,
    /// Vertex stage IR.
    pub vertex: naga::Module,
    /// Fragment stage IR.
    pub fragment: naga::Module,
    /// Slot bindings merged from both stages.
    pub table: BindingTable,
}

/// A registered program: uniform state plus its optional pipeline.
pub struct Program {
    /// Handle the program is registered under.
    pub handle: ProgramHandle,
    /// Purpose of the program.
    pub kind: ProgramKind,
    /// CPU copy of the uniform block.
    pub uniforms: UniformBlock,
    /// Texture bound to the `tex` slot.
    pub texture: Option<TextureHandle>,
    /// Pipeline and uniform ring; `None` when registered without a device.
    pub gpu: Option<GpuProgram>,
}

impl Program {
    /// Label used in logs and GPU object names.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.handle)
    }

    /// Slot bindings of the program.
    pub fn table(&self) -> &BindingTable {
        self.uniforms.table()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("texture", &self.texture)
            .field("gpu", &self.gpu.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenspace_kinds_use_no_vertex_buffers() {
        for kind in ProgramKind::ALL {
            let fullscreen = kind.pipeline_config().input == VertexInput::Fullscreen;
            assert_eq!(fullscreen, kind.is_screenspace(), "{kind}");
        }
    }

    #[test]
    fn outline_draws_lines() {
        assert_eq!(
            ProgramKind::Outline.pipeline_config().topology,
            wgpu::PrimitiveTopology::LineList
        );
    }

    #[test]
    fn handles_order_by_allocation() {
        assert!(ProgramHandle(1) < ProgramHandle(2));
        assert_eq!(ProgramHandle(7).to_string(), "#7");
    }
}
