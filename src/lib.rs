// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Render setup for voxel programs on wgpu.
//!
//! voxrender builds a fixed family of shader programs from WGSL sources,
//! reflects the uniforms each one declares, and binds conventional scene
//! parameters (camera, light, material, volume textures) into them before
//! drawing.
//!
//! # Key entry points
//!
//! - [`shader::ShaderFactory`] - composes, links and registers programs
//! - [`scene::Scene`] - camera, light, models, programs and textures
//! - [`render`] - the `render_*` uniform setters and draw calls
//! - [`gpu::check_gpu`] - drains captured device errors
//! - [`options::Options`] - TOML configuration
//!
//! # Architecture
//!
//! Each program owns a CPU [`uniforms::UniformBlock`] laid out from its
//! reflected [`uniforms::BindingTable`]. Setters write into the block and
//! never fail; slots a program does not declare are skipped. A draw
//! snapshots the block into the program's per-frame uniform ring and binds
//! it with a dynamic offset, so many draws with different parameters share
//! one render pass.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod options;
pub mod render;
pub mod scene;
pub mod shader;
pub mod uniforms;

pub use camera::Camera;
pub use error::VoxError;
pub use options::Options;
pub use scene::Scene;
pub use shader::{ProgramHandle, ProgramKind, ShaderFactory};
