//! Scene state consumed by the uniform binder and draw calls.
//!
//! A [`Scene`] owns the camera, light, default material, models, registered
//! programs and textures. Every setup and draw call takes the scene
//! explicitly; there is no global scene.

mod mesh;
mod model;
mod texture;

pub use mesh::{
    upload_instances, GpuMesh, Mesh, MeshVertex, Primitive, INSTANCE_LAYOUT, MESH_LAYOUT,
};
pub use model::{GpuModel, Light, Material, Model};
pub use texture::{TextureEntry, TextureHandle, TextureRegistry};

use crate::camera::Camera;
use crate::options::Options;
use crate::shader::ProgramRegistry;

/// Everything the render setup reads and the programs it writes into.
#[derive(Debug)]
pub struct Scene {
    /// Viewing camera.
    pub camera: Camera,
    /// Scene light.
    pub light: Light,
    /// Material for models without their own.
    pub material: Material,
    /// Geometry in draw order.
    pub models: Vec<Model>,
    /// Registered programs.
    pub programs: ProgramRegistry,
    /// Registered textures.
    pub textures: TextureRegistry,
    max_draws_per_frame: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl Scene {
    /// Empty scene configured from `opts`.
    pub fn from_options(opts: &Options) -> Self {
        Self {
            camera: Camera::from_options(&opts.camera),
            light: Light::from_options(&opts.lighting),
            material: Material::from_options(&opts.lighting),
            models: Vec::new(),
            programs: ProgramRegistry::new(),
            textures: TextureRegistry::default(),
            max_draws_per_frame: opts.render.max_draws_per_frame.max(1),
        }
    }

    /// Append a model, returning its index.
    pub fn add_model(&mut self, model: Model) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }

    /// Uniform snapshots each program holds per frame.
    pub fn max_draws_per_frame(&self) -> u32 {
        self.max_draws_per_frame
    }

    /// Start a frame: rewind every program's uniform ring.
    pub fn begin_frame(&mut self) {
        self.programs.begin_frame();
    }
}
