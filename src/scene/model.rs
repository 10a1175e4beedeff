use glam::{Mat4, Vec3, Vec4};

use super::mesh::{upload_instances, GpuMesh, Mesh};
use crate::options::LightingOptions;

/// Ambient, diffuse and specular colors; `specular.w` is the shininess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient color.
    pub ambient: Vec4,
    /// Diffuse color.
    pub diffuse: Vec4,
    /// Specular color and shininess.
    pub specular: Vec4,
}

impl Material {
    /// Material from explicit colors.
    pub const fn new(ambient: Vec4, diffuse: Vec4, specular: Vec4) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }

    /// Default material configured in `opts`.
    pub fn from_options(opts: &LightingOptions) -> Self {
        Self::new(
            Vec4::from_array(opts.ambient),
            Vec4::from_array(opts.diffuse),
            Vec4::from_array(opts.specular),
        )
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::from_options(&LightingOptions::default())
    }
}

/// Point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// World-space position.
    pub position: Vec3,
    /// Light follows the eye instead of `position`.
    pub eye_light: bool,
}

impl Light {
    /// Light configured in `opts`.
    pub fn from_options(opts: &LightingOptions) -> Self {
        Self {
            position: Vec3::from_array(opts.position),
            eye_light: opts.eye_light,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::from_options(&LightingOptions::default())
    }
}

/// Uploaded geometry of a model.
pub struct GpuModel {
    /// Mesh buffers.
    pub mesh: GpuMesh,
    /// Instance transforms, when the model has any.
    pub instances: Option<wgpu::Buffer>,
}

/// One piece of scene geometry.
pub struct Model {
    /// Name used in logs and GPU labels.
    pub label: String,
    /// Object to world transform, applied on top of the bound model matrix.
    pub transform: Mat4,
    /// Material; the scene default applies when `None`.
    pub material: Option<Material>,
    /// Geometry.
    pub mesh: Mesh,
    /// Per-instance transforms for instanced programs.
    pub instances: Vec<Mat4>,
    /// Uploaded geometry; `None` until [`Model::upload`].
    pub gpu: Option<GpuModel>,
}

impl Model {
    /// Model with an identity transform and the scene's default material.
    pub fn new(label: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            label: label.into(),
            transform: Mat4::IDENTITY,
            material: None,
            mesh,
            instances: Vec::new(),
            gpu: None,
        }
    }

    /// Builder: set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: set the material.
    #[must_use]
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// Builder: set instance transforms.
    #[must_use]
    pub fn with_instances(mut self, instances: Vec<Mat4>) -> Self {
        self.instances = instances;
        self
    }

    /// Upload (or re-upload) mesh and instance buffers.
    pub fn upload(&mut self, device: &wgpu::Device) {
        let mesh = self.mesh.upload(device, &self.label);
        let instances = (!self.instances.is_empty())
            .then(|| upload_instances(device, &self.label, &self.instances));
        self.gpu = Some(GpuModel { mesh, instances });
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("label", &self.label)
            .field("transform", &self.transform)
            .field("material", &self.material)
            .field("indices", &self.mesh.indices.len())
            .field("instances", &self.instances.len())
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}
