//! Indexed triangle and line meshes and their GPU buffers.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

/// Per-vertex attributes shared by every mesh program.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4];

/// Vertex buffer layout of [`MeshVertex`] (locations 0-2).
pub const MESH_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: size_of::<MeshVertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &MESH_ATTRIBUTES,
};

/// Per-instance column-major model matrix (locations 3-6).
pub const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: size_of::<[f32; 16]>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

/// How a mesh's indices group into primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Primitive {
    /// Every three indices form a triangle.
    #[default]
    Triangles,
    /// Every two indices form a line segment.
    Lines,
}

impl Primitive {
    /// Pipeline topology that draws this primitive.
    pub const fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Self::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

/// CPU-side indexed mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertices.
    pub vertices: Vec<MeshVertex>,
    /// Indices into `vertices`, grouped by `primitive`.
    pub indices: Vec<u32>,
    /// Primitive the indices describe.
    pub primitive: Primitive,
}

impl Mesh {
    /// Whether the mesh produces no primitives.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Unit cube spanning [0, 1] on every axis, with per-face normals.
    pub fn cube() -> Self {
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            // normal, u axis, v axis
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        let mut mesh = Self::default();
        for (normal, u, v) in FACES {
            let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
            let center = Vec3::splat(0.5) + n * 0.5;
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                mesh.vertices.push(MeshVertex {
                    position: (center + u * su + v * sv).to_array(),
                    normal,
                    uv: [su + 0.5, sv + 0.5],
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// The 12 edges of the unit cube as line pairs.
    pub fn box_outline() -> Self {
        let vertices = (0..8u32)
            .map(|i| MeshVertex {
                position: [(i & 1) as f32, ((i >> 1) & 1) as f32, ((i >> 2) & 1) as f32],
                normal: [0.0; 3],
                uv: [0.0; 2],
            })
            .collect();
        let mut indices = Vec::with_capacity(24);
        for a in 0..8u32 {
            for bit in [1, 2, 4] {
                if a & bit == 0 {
                    indices.extend_from_slice(&[a, a | bit]);
                }
            }
        }
        Self {
            vertices,
            indices,
            primitive: Primitive::Lines,
        }
    }

    /// Upload vertices and indices.
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertices")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Indices")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
        }
    }
}

/// Uploaded mesh.
pub struct GpuMesh {
    /// [`MeshVertex`] buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` index buffer.
    pub index_buffer: wgpu::Buffer,
}

/// Upload instance transforms as an [`INSTANCE_LAYOUT`] buffer.
pub fn upload_instances(device: &wgpu::Device, label: &str, instances: &[Mat4]) -> wgpu::Buffer {
    let data: Vec<[f32; 16]> = instances.iter().map(Mat4::to_cols_array).collect();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} Instances")),
        contents: bytemuck::cast_slice(&data),
        usage: wgpu::BufferUsages::VERTEX,
    })
}
