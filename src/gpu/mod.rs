//! GPU resource management utilities.
//!
//! Provides wgpu device/queue initialization, captured-error diagnostics,
//! program pipelines with per-draw uniform rings, textures, and shader
//! composition.

/// Captured validation errors and scoped checks.
pub mod diagnostics;
/// Shared wgpu boilerplate for program layouts and pipelines.
pub mod pipeline_helpers;
/// Pipelines, uniform rings and texture bind groups of linked programs.
pub mod program;
/// Explicit device, queue and target format.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Sampled textures and off-screen render targets.
pub mod texture;
/// Aligned per-draw slots of a program's uniform buffer.
pub mod uniform_ring;

pub use diagnostics::{check_gpu, ErrorScope, GpuErrorQueue};
pub use render_context::{RenderContext, RenderContextError};
