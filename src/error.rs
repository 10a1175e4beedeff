//! Crate-level error types.

use std::fmt;
use std::path::PathBuf;

use crate::gpu::render_context::RenderContextError;
use crate::uniforms::LinkError;

/// Errors produced by the voxrender crate.
#[derive(Debug)]
pub enum VoxError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A shader source file could not be read.
    ShaderRead {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// naga_oil rejected a shader source or shared module.
    ShaderCompose {
        /// File or module name being composed.
        file: String,
        /// Composer diagnostic, already rendered against the source.
        message: String,
    },
    /// Composed stages could not be linked into one program.
    Link {
        /// Program being linked.
        program: String,
        /// What disagreed.
        source: LinkError,
    },
    /// The device rejected a program's pipeline.
    Pipeline {
        /// Program being built.
        program: String,
        /// Validation message reported by the device.
        message: String,
    },
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for VoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::ShaderRead { path, source } => {
                write!(f, "failed to read shader '{}': {source}", path.display())
            }
            Self::ShaderCompose { file, message } => {
                write!(f, "failed to compose shader '{file}': {message}")
            }
            Self::Link { program, source } => {
                write!(f, "failed to link program '{program}': {source}")
            }
            Self::Pipeline { program, message } => {
                write!(f, "device rejected the '{program}' pipeline: {message}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for VoxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::ShaderRead { source, .. } => Some(source),
            Self::Link { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::ShaderCompose { .. } | Self::Pipeline { .. } | Self::OptionsParse(_) => None,
        }
    }
}

impl From<RenderContextError> for VoxError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for VoxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
