//! `voxrender` command line: links the shipped programs, renders one
//! headless frame, or prints the options schema.

use std::io::Write;
use std::path::Path;

use glam::{Mat4, Vec3};
use voxrender::gpu::texture::{GpuTexture, RenderTarget};
use voxrender::gpu::{check_gpu, RenderContext};
use voxrender::render::{
    render_cam_setup, render_light_setup, render_scene, render_scene_with_materials,
    render_screenspace, render_set_samples, render_set_tex_3d, render_set_tex_range,
    render_set_volume,
};
use voxrender::scene::{Mesh, Model};
use voxrender::{Options, ProgramKind, Scene, ShaderFactory, VoxError};

const VOLUME_SIZE: u32 = 32;

struct Args {
    options: Option<String>,
    gpu: bool,
    schema: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        options: None,
        gpu: false,
        schema: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--gpu" => args.gpu = true,
            "--schema" => args.schema = true,
            _ => args.options = Some(arg),
        }
    }
    args
}

/// Density of a sphere filling the volume, 1 at the centre and 0 at the
/// faces.
fn sphere_volume(n: u32) -> Vec<f32> {
    let centre = (n as f32 - 1.0) * 0.5;
    let mut data = Vec::with_capacity((n * n * n) as usize);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let p = Vec3::new(x as f32, y as f32, z as f32) - Vec3::splat(centre);
                data.push((1.0 - p.length() / centre).max(0.0));
            }
        }
    }
    data
}

fn link_all(factory: &mut ShaderFactory, scene: &mut Scene, opts: &Options) -> Result<(), VoxError> {
    let _ = factory.make_all(None, scene, &opts.shaders)?;
    for program in scene.programs.iter() {
        let table = program.table();
        log::info!(
            "{}: {} byte block, texture {:?}",
            program.label(),
            table.block_size().unwrap_or(0),
            table.texture().map(|t| t.dim)
        );
        for (slot, binding) in table.slots() {
            log::info!("  {slot}: {binding:?}");
        }
        for name in table.extra_members() {
            log::info!("  {name}: not a known slot");
        }
    }
    Ok(())
}

fn render_frame(factory: &mut ShaderFactory, scene: &mut Scene, opts: &Options) -> Result<(), VoxError> {
    let width = opts.camera.width;
    let height = opts.camera.height;
    let format = wgpu::TextureFormat::Rgba8Unorm;
    let ctx = pollster::block_on(RenderContext::headless(format, width, height))?;
    let _ = factory.make_all(Some(&ctx), scene, &opts.shaders)?;

    let volume = GpuTexture::new_3d(
        &ctx.device,
        "Sphere Volume",
        [VOLUME_SIZE; 3],
        wgpu::TextureFormat::R32Float,
    );
    if !volume.write(&ctx.queue, bytemuck::cast_slice(&sphere_volume(VOLUME_SIZE))) {
        log::warn!("sphere volume upload rejected");
    }
    let volume = scene.textures.insert("sphere", volume);

    let mut cube = Model::new("cube", Mesh::cube()).with_transform(Mat4::from_rotation_y(0.5));
    cube.upload(&ctx.device);
    let _ = scene.add_model(cube);
    let mut outline = Model::new("bounds", Mesh::box_outline());
    outline.upload(&ctx.device);
    let _ = scene.add_model(outline);

    let target = RenderTarget::new(&ctx.device, ctx.width(), ctx.height(), ctx.format());
    let [r, g, b, a] = opts.render.clear_color.map(f64::from);
    let clear = wgpu::Color { r, g, b, a };

    scene.begin_frame();
    let mut encoder = ctx.create_encoder();
    {
        let mut pass = target.begin_pass(&mut encoder, clear);
        if let Some(prog) = scene.programs.handle_for(ProgramKind::Simple) {
            render_cam_setup(scene, prog, None);
            render_light_setup(scene, prog);
            render_scene(&ctx, scene, prog, &mut pass);
        }
        if let Some(prog) = scene.programs.handle_for(ProgramKind::Outline) {
            render_cam_setup(scene, prog, None);
            render_scene_with_materials(&ctx, scene, prog, &mut pass, false);
        }
        if let Some(prog) = scene.programs.handle_for(ProgramKind::Raycast) {
            let [sx, sy, sz] = opts.render.samples;
            render_cam_setup(scene, prog, None);
            render_light_setup(scene, prog);
            render_set_tex_3d(scene, prog, volume, Vec3::splat(VOLUME_SIZE as f32));
            render_set_volume(scene, prog, Vec3::splat(-1.0), Vec3::ONE);
            render_set_samples(scene, prog, Vec3::new(sx, sy, sz));
            render_set_tex_range(
                scene,
                prog,
                Vec3::from(opts.render.tex_min),
                Vec3::from(opts.render.tex_max),
            );
            render_screenspace(&ctx, scene, prog, &mut pass);
        }
    }
    ctx.submit(encoder);

    let errors = check_gpu(&ctx, "first frame");
    log::info!("rendered {width}x{height} frame, {errors} device error(s)");
    Ok(())
}

fn run(args: &Args) -> Result<(), VoxError> {
    if args.schema {
        let schema = serde_json::to_string_pretty(&Options::json_schema())
            .map_err(|e| VoxError::OptionsParse(e.to_string()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{schema}")?;
        return Ok(());
    }

    let opts = match &args.options {
        Some(path) => Options::load(Path::new(path))?,
        None => Options::default(),
    };
    let mut factory = ShaderFactory::new(&opts.shaders.dir)?;
    let mut scene = Scene::from_options(&opts);

    if args.gpu {
        render_frame(&mut factory, &mut scene, &opts)
    } else {
        link_all(&mut factory, &mut scene, &opts)
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run(&parse_args()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
