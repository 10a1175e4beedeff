//! Perspective camera feeding the view, projection and viewport uniforms.

/// Core camera struct and derived matrices.
pub mod core;

pub use self::core::Camera;
