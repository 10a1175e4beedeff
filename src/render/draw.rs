//! Scene and full-screen draws.
//!
//! Planning runs on the CPU: it walks the scene, writes the per-draw
//! uniforms into the program's block and snapshots the block for each draw.
//! Encoding copies the snapshots into the program's uniform ring and records
//! one draw per snapshot into the caller's render pass.

use glam::Mat4;

use super::binder::{program_mut, write};
use crate::gpu::program::GpuProgram;
use crate::gpu::render_context::RenderContext;
use crate::scene::{Model, Scene, TextureRegistry};
use crate::shader::{Program, ProgramHandle, ProgramRegistry};
use crate::uniforms::{UniformSlot, UniformValue};

/// Vertices of the full-screen triangle.
pub const SCREEN_VERTEX_COUNT: u32 = 3;

/// One planned draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    /// Index into `Scene::models`; `None` for full-screen draws.
    pub model: Option<usize>,
    /// Uniform block contents for this draw.
    pub uniforms: Vec<u8>,
    /// Indices (or vertices for full-screen draws) to draw.
    pub count: u32,
    /// Instances to draw.
    pub instances: u32,
}

/// Plan one draw per model with geometry the program can draw.
///
/// Models whose mesh primitive does not match the program's topology
/// (line outlines under a triangle program and the reverse) are skipped.
///
/// The `model` slot holds `base * model.transform` for each draw, where
/// `base` is the value bound before the call, and is restored to `base`
/// afterwards. With `bind_material` each model's material (or the scene
/// default) is written before its draw and stays bound; without it the
/// material slots are not touched.
pub fn plan_scene(scene: &mut Scene, prog: ProgramHandle, bind_material: bool) -> Vec<DrawCall> {
    let default_material = scene.material;
    let Some(program) = program_mut(&mut scene.programs, prog, "render_scene") else {
        return Vec::new();
    };
    let has_model = program.table().contains(UniformSlot::Model);
    let base = match program.uniforms.get(UniformSlot::Model) {
        Some(UniformValue::Mat4(m)) => m,
        _ => Mat4::IDENTITY,
    };

    let mut plan = Vec::with_capacity(scene.models.len());
    for (index, model) in scene.models.iter().enumerate() {
        let Some(instances) = instance_count(program, model) else {
            continue;
        };
        if bind_material {
            let material = model.material.unwrap_or(default_material);
            write(program, UniformSlot::ClrAmb, material.ambient);
            write(program, UniformSlot::ClrDiff, material.diffuse);
            write(program, UniformSlot::ClrSpec, material.specular);
        }
        if has_model {
            write(program, UniformSlot::Model, base * model.transform);
        }
        plan.push(DrawCall {
            model: Some(index),
            uniforms: program.uniforms.bytes().to_vec(),
            count: model.mesh.indices.len() as u32,
            instances,
        });
    }

    if has_model {
        write(program, UniformSlot::Model, base);
    }
    plan
}

fn instance_count(program: &Program, model: &Model) -> Option<u32> {
    if model.mesh.is_empty() {
        return None;
    }
    let topology = program.kind.pipeline_config().topology;
    if model.mesh.primitive.topology() != topology {
        log::debug!(
            "{}: model '{}' is {:?}, program draws {topology:?}",
            program.label(),
            model.label,
            model.mesh.primitive
        );
        return None;
    }
    if program.kind.is_instanced() {
        if model.instances.is_empty() {
            log::debug!("{}: model '{}' has no instances", program.label(), model.label);
            return None;
        }
        return Some(model.instances.len() as u32);
    }
    Some(1)
}

/// Plan the full-screen triangle with the program's current uniforms.
pub fn plan_screenspace(scene: &mut Scene, prog: ProgramHandle) -> Option<DrawCall> {
    let program = program_mut(&mut scene.programs, prog, "render_screenspace")?;
    Some(DrawCall {
        model: None,
        uniforms: program.uniforms.bytes().to_vec(),
        count: SCREEN_VERTEX_COUNT,
        instances: 1,
    })
}

/// Draw every model with the program, binding each model's material.
pub fn render_scene(
    ctx: &RenderContext,
    scene: &mut Scene,
    prog: ProgramHandle,
    pass: &mut wgpu::RenderPass<'_>,
) {
    render_scene_with_materials(ctx, scene, prog, pass, true);
}

/// Draw every model with the program; materials are bound only when
/// `bind_material` is set.
pub fn render_scene_with_materials(
    ctx: &RenderContext,
    scene: &mut Scene,
    prog: ProgramHandle,
    pass: &mut wgpu::RenderPass<'_>,
    bind_material: bool,
) {
    let plan = plan_scene(scene, prog, bind_material);
    let max_draws = scene.max_draws_per_frame();
    let Some((label, gpu)) = ready(ctx, &mut scene.programs, &scene.textures, prog) else {
        return;
    };

    let mut skipped = 0;
    for draw in &plan {
        let Some(model) = draw.model.and_then(|i| scene.models.get(i)) else {
            continue;
        };
        let Some(geometry) = &model.gpu else {
            log::debug!("{label}: model '{}' is not uploaded", model.label);
            continue;
        };
        let Some(offset) = gpu.stage(&ctx.queue, &draw.uniforms) else {
            skipped += 1;
            continue;
        };
        if !gpu.bind(pass, offset) {
            log::warn!("{label}: no texture bound, draw skipped");
            return;
        }
        pass.set_vertex_buffer(0, geometry.mesh.vertex_buffer.slice(..));
        if let Some(instances) = &geometry.instances {
            pass.set_vertex_buffer(1, instances.slice(..));
        }
        pass.set_index_buffer(geometry.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..draw.count, 0, 0..draw.instances);
    }

    if skipped > 0 {
        log::warn!("{label}: frame exceeded {max_draws} draws, skipped {skipped}");
    }
}

/// Draw a full-screen triangle with the program's current uniforms and
/// texture.
pub fn render_screenspace(
    ctx: &RenderContext,
    scene: &mut Scene,
    prog: ProgramHandle,
    pass: &mut wgpu::RenderPass<'_>,
) {
    let Some(draw) = plan_screenspace(scene, prog) else {
        return;
    };
    let max_draws = scene.max_draws_per_frame();
    let Some((label, gpu)) = ready(ctx, &mut scene.programs, &scene.textures, prog) else {
        return;
    };
    let Some(offset) = gpu.stage(&ctx.queue, &draw.uniforms) else {
        log::warn!("{label}: frame exceeded {max_draws} draws, skipped 1");
        return;
    };
    if !gpu.bind(pass, offset) {
        log::warn!("{label}: no texture bound, draw skipped");
        return;
    }
    pass.draw(0..draw.count, 0..draw.instances);
}

/// The program's pipeline, with its texture bind group brought up to date.
fn ready<'a>(
    ctx: &RenderContext,
    programs: &'a mut ProgramRegistry,
    textures: &TextureRegistry,
    prog: ProgramHandle,
) -> Option<(String, &'a mut GpuProgram)> {
    let program = programs.get_mut(prog)?;
    let label = program.label();
    let texture = program.texture;
    let Some(gpu) = program.gpu.as_mut() else {
        log::debug!("{label}: registered without a device, nothing drawn");
        return None;
    };
    if let Some(tex) = texture {
        if gpu.bound_texture() != Some(tex) {
            match textures.gpu(tex) {
                Some(gpu_tex) => gpu.bind_texture(&ctx.device, tex, gpu_tex),
                None => log::warn!("{label}: texture {tex} has no device texture"),
            }
        }
    }
    Some((label, gpu))
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;
    use crate::render::binder::tests::{get, handle, scene_with_programs};
    use crate::render::binder::{render_cam_setup, render_set_material};
    use crate::scene::{Material, Mesh};
    use crate::shader::ProgramKind;

    fn with_models(mut scene: Scene) -> Scene {
        let _ = scene.add_model(
            Model::new("a", Mesh::cube()).with_transform(Mat4::from_translation(Vec3::X)),
        );
        let _ = scene.add_model(
            Model::new("b", Mesh::cube())
                .with_transform(Mat4::from_translation(Vec3::Y))
                .with_material(Material::new(Vec4::ZERO, Vec4::ONE, Vec4::W)),
        );
        let _ = scene.add_model(Model::new("empty", Mesh::default()));
        scene
    }

    fn model_in(draw: &DrawCall, scene: &Scene, prog: ProgramHandle) -> Mat4 {
        let offset = scene
            .programs
            .get(prog)
            .and_then(|p| p.table().member(UniformSlot::Model))
            .unwrap()
            .offset as usize;
        match UniformValue::read_from(crate::uniforms::UniformKind::Mat4, &draw.uniforms[offset..]) {
            Some(UniformValue::Mat4(m)) => m,
            other => panic!("no model matrix: {other:?}"),
        }
    }

    #[test]
    fn one_draw_per_model_with_geometry() {
        let mut scene = with_models(scene_with_programs());
        let simple = handle(&scene, ProgramKind::Simple);
        let plan = plan_scene(&mut scene, simple, true);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].count, 36);
        assert_eq!(plan[1].model, Some(1));
    }

    #[test]
    fn programs_draw_only_matching_primitives() {
        let mut scene = scene_with_programs();
        let _ = scene.add_model(Model::new("cube", Mesh::cube()));
        let _ = scene.add_model(Model::new("bounds", Mesh::box_outline()));

        let simple = handle(&scene, ProgramKind::Simple);
        let plan = plan_scene(&mut scene, simple, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].model, Some(0));
        assert_eq!(plan[0].count, 36);

        let outline = handle(&scene, ProgramKind::Outline);
        let plan = plan_scene(&mut scene, outline, false);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].model, Some(1));
        assert_eq!(plan[0].count, 24);
    }

    #[test]
    fn model_is_composed_per_draw_and_restored() {
        let mut scene = with_models(scene_with_programs());
        let simple = handle(&scene, ProgramKind::Simple);
        let base = Mat4::from_scale(Vec3::splat(2.0));
        render_cam_setup(&mut scene, simple, Some(&base));

        let plan = plan_scene(&mut scene, simple, true);
        assert_eq!(
            model_in(&plan[0], &scene, simple),
            base * Mat4::from_translation(Vec3::X)
        );
        assert_eq!(
            model_in(&plan[1], &scene, simple),
            base * Mat4::from_translation(Vec3::Y)
        );
        assert_eq!(
            get(&scene, simple, UniformSlot::Model),
            Some(UniformValue::Mat4(base))
        );
    }

    #[test]
    fn materials_bound_per_model() {
        let mut scene = with_models(scene_with_programs());
        let simple = handle(&scene, ProgramKind::Simple);
        let _ = plan_scene(&mut scene, simple, true);
        // The last model's own material stays bound.
        assert_eq!(
            get(&scene, simple, UniformSlot::ClrDiff),
            Some(UniformValue::Vec4(Vec4::ONE))
        );
    }

    #[test]
    fn without_materials_bound_colors_survive() {
        let mut scene = with_models(scene_with_programs());
        let simple = handle(&scene, ProgramKind::Simple);
        let amb = Vec4::new(0.1, 0.2, 0.3, 1.0);
        let diff = Vec4::new(0.4, 0.5, 0.6, 1.0);
        let spec = Vec4::new(0.7, 0.8, 0.9, 12.0);
        render_set_material(&mut scene, simple, amb, diff, spec);

        let plan = plan_scene(&mut scene, simple, false);
        assert_eq!(plan.len(), 2);
        assert_eq!(get(&scene, simple, UniformSlot::ClrAmb), Some(UniformValue::Vec4(amb)));
        assert_eq!(get(&scene, simple, UniformSlot::ClrDiff), Some(UniformValue::Vec4(diff)));
        assert_eq!(get(&scene, simple, UniformSlot::ClrSpec), Some(UniformValue::Vec4(spec)));
    }

    #[test]
    fn instanced_program_skips_models_without_instances() {
        let mut scene = with_models(scene_with_programs());
        let _ = scene.add_model(
            Model::new("grid", Mesh::cube())
                .with_instances(vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::Z)]),
        );
        let inst = handle(&scene, ProgramKind::Instance);
        let plan = plan_scene(&mut scene, inst, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].instances, 2);
    }

    #[test]
    fn screenspace_snapshots_current_block() {
        let mut scene = scene_with_programs();
        let screen = handle(&scene, ProgramKind::Screen);
        render_cam_setup(&mut scene, screen, None);
        let draw = plan_screenspace(&mut scene, screen).unwrap();
        assert_eq!(draw.count, SCREEN_VERTEX_COUNT);
        assert_eq!(draw.model, None);
        assert_eq!(
            draw.uniforms,
            scene.programs.get(screen).unwrap().uniforms.bytes()
        );
    }

    #[test]
    fn unknown_program_plans_nothing() {
        let mut scene = with_models(scene_with_programs());
        assert!(plan_scene(&mut scene, ProgramHandle(4242), true).is_empty());
        assert!(plan_screenspace(&mut scene, ProgramHandle(4242)).is_none());
    }
}
