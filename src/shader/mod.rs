//! Shader programs: kinds, handles, the per-scene registry and the factory
//! that builds programs from source files.

pub mod factory;
mod program;
mod registry;

pub use factory::{ShaderFactory, VOXELIZE_GEOM_MODULE};
pub use program::{LinkedProgram, Program, ProgramHandle, ProgramKind};
pub use registry::ProgramRegistry;
