//! Uniform setup for one program at a time.
//!
//! Every setter writes into the program's CPU uniform block and never
//! fails: a slot the program does not declare is logged at `debug`, a
//! declared slot of a different kind at `warn`, and an unknown program or
//! texture handle at `warn`. The block reaches the GPU when the program
//! next draws.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::{Scene, TextureHandle};
use crate::shader::{Program, ProgramHandle, ProgramRegistry};
use crate::uniforms::{TextureDim, UniformError, UniformSlot, UniformValue};

pub(crate) fn program_mut<'a>(
    programs: &'a mut ProgramRegistry,
    prog: ProgramHandle,
    op: &str,
) -> Option<&'a mut Program> {
    let program = programs.get_mut(prog);
    if program.is_none() {
        log::warn!("{op}: unknown program {prog}");
    }
    program
}

pub(crate) fn write(program: &mut Program, slot: UniformSlot, value: impl Into<UniformValue>) {
    match program.uniforms.set(slot, value) {
        Ok(()) => {}
        Err(e @ UniformError::Missing(_)) => log::debug!("{}: {e}", program.label()),
        Err(e) => log::warn!("{}: {e}", program.label()),
    }
}

/// Bind the camera: `view`, `proj`, `inv_view`, `cam_pos`, `cam_dims` and
/// `model` (identity when `model` is `None`).
pub fn render_cam_setup(scene: &mut Scene, prog: ProgramHandle, model: Option<&Mat4>) {
    let cam = &scene.camera;
    let view = cam.view();
    let values = [
        (UniformSlot::View, UniformValue::Mat4(view)),
        (UniformSlot::Proj, UniformValue::Mat4(cam.projection())),
        (UniformSlot::InvView, UniformValue::Mat4(view.inverse())),
        (UniformSlot::CamPos, UniformValue::Vec3(cam.eye)),
        (UniformSlot::CamDims, UniformValue::Vec4(cam.dims())),
        (
            UniformSlot::Model,
            UniformValue::Mat4(model.copied().unwrap_or(Mat4::IDENTITY)),
        ),
    ];
    let Some(program) = program_mut(&mut scene.programs, prog, "render_cam_setup") else {
        return;
    };
    for (slot, value) in values {
        write(program, slot, value);
    }
}

/// Bind the light: `light_pos` and `eye_light`.
pub fn render_light_setup(scene: &mut Scene, prog: ProgramHandle) {
    let light = scene.light;
    let Some(program) = program_mut(&mut scene.programs, prog, "render_light_setup") else {
        return;
    };
    write(program, UniformSlot::LightPos, light.position);
    write(program, UniformSlot::EyeLight, light.eye_light);
}

/// Bind a 3-D texture to `tex` and write `res` to `tex_res`.
pub fn render_set_tex_3d(scene: &mut Scene, prog: ProgramHandle, tex: TextureHandle, res: Vec3) {
    bind_texture(scene, prog, tex, TextureDim::D3, Some(res), "render_set_tex_3d");
}

/// Bind a 2-D texture to `tex`.
pub fn render_set_tex_2d(scene: &mut Scene, prog: ProgramHandle, tex: TextureHandle) {
    bind_texture(scene, prog, tex, TextureDim::D2, None, "render_set_tex_2d");
}

/// Point the program at `tex` and, once accepted, write `res` to `tex_res`.
///
/// A rejected texture leaves both the previous binding and `tex_res`
/// untouched.
fn bind_texture(
    scene: &mut Scene,
    prog: ProgramHandle,
    tex: TextureHandle,
    dim: TextureDim,
    res: Option<Vec3>,
    op: &str,
) {
    let Some(entry) = scene.textures.get(tex) else {
        log::warn!("{op}: unknown texture {tex}");
        return;
    };
    if entry.dim != dim {
        log::warn!("{op}: texture {tex} '{}' is {}, expected {dim}", entry.label, entry.dim);
        return;
    }
    let Some(program) = program_mut(&mut scene.programs, prog, op) else {
        return;
    };
    match program.table().texture() {
        Some(declared) if declared.dim != dim => {
            log::warn!(
                "{op}: {} samples a {} texture, got {dim}",
                program.label(),
                declared.dim
            );
            return;
        }
        Some(_) => program.texture = Some(tex),
        None => log::debug!("{op}: {} does not sample a texture", program.label()),
    }
    if let Some(res) = res {
        write(program, UniformSlot::TexRes, res);
    }
}

/// Bind material colors to `clr_amb`, `clr_diff` and `clr_spec`.
pub fn render_set_material(scene: &mut Scene, prog: ProgramHandle, amb: Vec4, diff: Vec4, spec: Vec4) {
    let Some(program) = program_mut(&mut scene.programs, prog, "render_set_material") else {
        return;
    };
    write(program, UniformSlot::ClrAmb, amb);
    write(program, UniformSlot::ClrDiff, diff);
    write(program, UniformSlot::ClrSpec, spec);
}

/// Bind the voxel-space transform of a volume with `res` voxels placed by
/// `model`: `over_tex = model * scale(res)` (voxel to world),
/// `over_size = res` and `w = inverse(over_tex)` (world to voxel).
pub fn render_set_uw(scene: &mut Scene, prog: ProgramHandle, model: &Mat4, res: Vec3) {
    let over_tex = *model * Mat4::from_scale(res);
    let Some(program) = program_mut(&mut scene.programs, prog, "render_set_uw") else {
        return;
    };
    write(program, UniformSlot::OverTex, over_tex);
    write(program, UniformSlot::OverSize, res);
    write(program, UniformSlot::W, over_tex.inverse());
}

/// Bind the world-space volume bounds to `vol_min` and `vol_max`.
pub fn render_set_volume(scene: &mut Scene, prog: ProgramHandle, min: Vec3, max: Vec3) {
    let Some(program) = program_mut(&mut scene.programs, prog, "render_set_volume") else {
        return;
    };
    write(program, UniformSlot::VolMin, min);
    write(program, UniformSlot::VolMax, max);
}

/// Bind ray sampling steps (primary, shadow, fine) to `samples`.
pub fn render_set_samples(scene: &mut Scene, prog: ProgramHandle, samples: Vec3) {
    if let Some(program) = program_mut(&mut scene.programs, prog, "render_set_samples") {
        write(program, UniformSlot::Samples, samples);
    }
}

/// Bind the sampled value window to `tex_min` and `tex_max`.
pub fn render_set_tex_range(scene: &mut Scene, prog: ProgramHandle, min: Vec3, max: Vec3) {
    let Some(program) = program_mut(&mut scene.programs, prog, "render_set_tex_range") else {
        return;
    };
    write(program, UniformSlot::TexMin, min);
    write(program, UniformSlot::TexMax, max);
}

/// Bind shadow parameters to `shadow_mask` and `shadow_size`.
pub fn render_set_shadow(scene: &mut Scene, prog: ProgramHandle, mask: u32, size: Vec2) {
    let Some(program) = program_mut(&mut scene.programs, prog, "render_set_shadow") else {
        return;
    };
    write(program, UniformSlot::ShadowMask, mask);
    write(program, UniformSlot::ShadowSize, size);
}
