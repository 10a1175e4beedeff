//! Render setup: uniform binding and draw submission.
//!
//! The `render_*` setters in [`binder`] write conventional parameters into
//! one program's uniform block. The draw calls in [`draw`] snapshot that
//! block per draw and record into a caller-owned render pass.

pub mod binder;
pub mod draw;

pub use binder::{
    render_cam_setup, render_light_setup, render_set_material, render_set_samples,
    render_set_shadow, render_set_tex_2d, render_set_tex_3d, render_set_tex_range,
    render_set_uw, render_set_volume,
};
pub use draw::{
    plan_scene, plan_screenspace, render_scene, render_scene_with_materials, render_screenspace,
    DrawCall, SCREEN_VERTEX_COUNT,
};
