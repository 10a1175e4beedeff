//! Builds shader programs from source files and registers them in a scene.

use std::path::{Path, PathBuf};

use super::program::{LinkedProgram, ProgramHandle, ProgramKind};
use crate::error::VoxError;
use crate::gpu::diagnostics::ErrorScope;
use crate::gpu::program::GpuProgram;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::{ShaderOptions, StageFiles};
use crate::scene::Scene;
use crate::uniforms::{BindingTable, LinkError};

/// Import path the voxelize geometry source must define.
pub const VOXELIZE_GEOM_MODULE: &str = "voxrender::voxelize_geom";

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// Reads, composes and links program sources.
///
/// Relative paths resolve against the factory's shader directory.
pub struct ShaderFactory {
    composer: ShaderComposer,
    dir: PathBuf,
}

impl ShaderFactory {
    /// Factory reading sources from `shader_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::ShaderCompose`] if a shared module is rejected.
    pub fn new(shader_dir: impl Into<PathBuf>) -> Result<Self, VoxError> {
        Ok(Self {
            composer: ShaderComposer::new()?,
            dir: shader_dir.into(),
        })
    }

    /// Lit mesh program.
    ///
    /// # Errors
    ///
    /// Returns a [`VoxError`] if a source cannot be read, composed or linked,
    /// or the device rejects the pipeline.
    pub fn make_simple_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Simple, &pair(vert, frag))
    }

    /// Volume slice program.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_slice_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Slice, &pair(vert, frag))
    }

    /// Line outline program.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_outline_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Outline, &pair(vert, frag))
    }

    /// Voxelization program. `geom` holds the per-triangle projection code
    /// and must define the [`VOXELIZE_GEOM_MODULE`] import path, which the
    /// vertex stage imports.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_voxelize_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
        geom: &str,
    ) -> Result<ProgramHandle, VoxError> {
        let files = StageFiles {
            geom: Some(geom.to_owned()),
            ..pair(vert, frag)
        };
        self.make(Some(ctx), scene, ProgramKind::Voxelize, &files)
    }

    /// Full-screen volume ray caster.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_raycast_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Raycast, &pair(vert, frag))
    }

    /// Instanced mesh program.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_instance_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Instance, &pair(vert, frag))
    }

    /// Full-screen texture program.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make_screen_shader(
        &mut self,
        ctx: &RenderContext,
        scene: &mut Scene,
        vert: &str,
        frag: &str,
    ) -> Result<ProgramHandle, VoxError> {
        self.make(Some(ctx), scene, ProgramKind::Screen, &pair(vert, frag))
    }

    /// Make every program configured in `shaders`, in [`ProgramKind::ALL`]
    /// order.
    ///
    /// # Errors
    ///
    /// Stops at the first program that fails.
    pub fn make_all(
        &mut self,
        ctx: Option<&RenderContext>,
        scene: &mut Scene,
        shaders: &ShaderOptions,
    ) -> Result<Vec<ProgramHandle>, VoxError> {
        ProgramKind::ALL
            .into_iter()
            .map(|kind| self.make(ctx, scene, kind, shaders.files(kind)))
            .collect()
    }

    /// Link `files` as a `kind` program and register it in `scene`.
    ///
    /// Without a context the program is registered CPU-only: its uniforms
    /// accept writes but it draws nothing.
    ///
    /// # Errors
    ///
    /// See [`ShaderFactory::make_simple_shader`].
    pub fn make(
        &mut self,
        ctx: Option<&RenderContext>,
        scene: &mut Scene,
        kind: ProgramKind,
        files: &StageFiles,
    ) -> Result<ProgramHandle, VoxError> {
        let linked = self.link(kind, files)?;
        let gpu = match ctx {
            Some(ctx) => Some(build_pipeline(ctx, &linked, scene.max_draws_per_frame())?),
            None => None,
        };
        Ok(scene.programs.register(linked, gpu))
    }

    /// Read, compose and link the stages of a `kind` program without
    /// touching a device.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::ShaderRead`], [`VoxError::ShaderCompose`] or
    /// [`VoxError::Link`].
    pub fn link(&mut self, kind: ProgramKind, files: &StageFiles) -> Result<LinkedProgram, VoxError> {
        if let Some(geom) = &files.geom {
            let (source, path) = self.read(geom)?;
            let declared = ShaderComposer::import_path(&source);
            if declared.as_deref() != Some(VOXELIZE_GEOM_MODULE) {
                return Err(VoxError::ShaderCompose {
                    file: path,
                    message: format!(
                        "geometry source must define `{VOXELIZE_GEOM_MODULE}`, found {declared:?}"
                    ),
                });
            }
            self.composer.add_module(&source, &path)?;
        }

        let (vert_src, vert_path) = self.read(&files.vert)?;
        let (frag_src, frag_path) = self.read(&files.frag)?;
        let vertex = self.composer.compose(&vert_src, &vert_path)?;
        let fragment = self.composer.compose(&frag_src, &frag_path)?;

        let link_err = |source: LinkError| VoxError::Link {
            program: kind.name().to_owned(),
            source,
        };
        require_entry(&vertex, naga::ShaderStage::Vertex, &vert_path).map_err(link_err)?;
        require_entry(&fragment, naga::ShaderStage::Fragment, &frag_path).map_err(link_err)?;

        let mut table = BindingTable::reflect(&vertex).map_err(link_err)?;
        table
            .merge(&BindingTable::reflect(&fragment).map_err(link_err)?)
            .map_err(link_err)?;
        if table.block_size().is_none() {
            return Err(link_err(LinkError::MissingUniformBlock));
        }

        log::debug!(
            "linked {kind}: {} slots, {} byte block",
            table.slots().count(),
            table.block_size().unwrap_or(0)
        );
        Ok(LinkedProgram {
            kind,
            vertex,
            fragment,
            table,
        })
    }

    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }

    fn read(&self, file: &str) -> Result<(String, String), VoxError> {
        let path = self.resolve(file);
        let source = std::fs::read_to_string(&path).map_err(|source| VoxError::ShaderRead {
            path: path.clone(),
            source,
        })?;
        Ok((source, path.display().to_string()))
    }
}

fn pair(vert: &str, frag: &str) -> StageFiles {
    StageFiles {
        vert: vert.to_owned(),
        frag: frag.to_owned(),
        geom: None,
    }
}

fn require_entry(module: &naga::Module, stage: naga::ShaderStage, file: &str) -> Result<(), LinkError> {
    let (name, entry) = match stage {
        naga::ShaderStage::Vertex => ("vertex", VERTEX_ENTRY),
        _ => ("fragment", FRAGMENT_ENTRY),
    };
    if module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == entry)
    {
        Ok(())
    } else {
        Err(LinkError::MissingEntryPoint {
            stage: name,
            entry,
            file: file.to_owned(),
        })
    }
}

fn build_pipeline(ctx: &RenderContext, linked: &LinkedProgram, max_draws: u32) -> Result<GpuProgram, VoxError> {
    let label = linked.kind.name();
    let scope = ErrorScope::push(&ctx.device, format!("{label} pipeline"));
    let gpu = GpuProgram::new(
        ctx,
        label,
        &linked.vertex,
        &linked.fragment,
        &linked.table,
        &linked.kind.pipeline_config(),
        max_draws,
    );
    match scope.check() {
        Some(e) => Err(VoxError::Pipeline {
            program: label.to_owned(),
            message: e.to_string(),
        }),
        None => Ok(gpu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{TextureDim, UniformKind, UniformSlot};

    fn shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders")
    }

    fn factory() -> ShaderFactory {
        ShaderFactory::new(shader_dir()).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxrender-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn every_shipped_program_links() {
        let mut f = factory();
        let shaders = ShaderOptions::default();
        for kind in ProgramKind::ALL {
            let linked = f
                .link(kind, shaders.files(kind))
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
            assert!(linked.table.block_size().is_some(), "{kind}");
        }
    }

    #[test]
    fn shipped_tables_expose_expected_slots() {
        let mut f = factory();
        let shaders = ShaderOptions::default();

        let raycast = f
            .link(ProgramKind::Raycast, shaders.files(ProgramKind::Raycast))
            .unwrap();
        for slot in [
            UniformSlot::InvView,
            UniformSlot::CamPos,
            UniformSlot::VolMin,
            UniformSlot::VolMax,
            UniformSlot::Samples,
        ] {
            assert!(raycast.table.contains(slot), "raycast lacks {slot}");
        }
        assert_eq!(raycast.table.texture().map(|t| t.dim), Some(TextureDim::D3));
        assert_eq!(
            raycast.table.member(UniformSlot::EyeLight).and_then(|m| m.kind),
            Some(UniformKind::U32)
        );

        let screen = f
            .link(ProgramKind::Screen, shaders.files(ProgramKind::Screen))
            .unwrap();
        assert_eq!(screen.table.texture().map(|t| t.dim), Some(TextureDim::D2));

        let simple = f
            .link(ProgramKind::Simple, shaders.files(ProgramKind::Simple))
            .unwrap();
        assert!(simple.table.texture().is_none());
        assert!(simple.table.contains(UniformSlot::ClrSpec));
        assert!(!simple.table.contains(UniformSlot::TexRes));
    }

    #[test]
    fn make_registers_one_new_handle_each_time() {
        let mut f = factory();
        let mut scene = Scene::default();
        let shaders = ShaderOptions::default();

        let mut seen = Vec::new();
        for kind in ProgramKind::ALL {
            let before = scene.programs.len();
            let handle = f.make(None, &mut scene, kind, shaders.files(kind)).unwrap();
            assert_eq!(scene.programs.len(), before + 1);
            assert!(!seen.contains(&handle));
            seen.push(handle);
        }

        // Re-making a kind replaces the program under a fresh handle.
        let again = f
            .make(None, &mut scene, ProgramKind::Simple, shaders.files(ProgramKind::Simple))
            .unwrap();
        assert!(!seen.contains(&again));
        assert_eq!(scene.programs.len(), ProgramKind::ALL.len());
        assert!(scene.programs.get(seen[0]).is_none());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let mut f = factory();
        let err = f
            .link(ProgramKind::Simple, &pair("nope.vert.wgsl", "simple.frag.wgsl"))
            .unwrap_err();
        assert!(matches!(err, VoxError::ShaderRead { ref path, .. } if path.ends_with("nope.vert.wgsl")));
    }

    #[test]
    fn stage_layout_disagreement_is_a_link_error() {
        let dir = scratch_dir("mismatch");
        std::fs::write(
            dir.join("a.vert.wgsl"),
            "struct U { view: mat4x4<f32>, model: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;
             @vertex fn vs_main() -> @builtin(position) vec4<f32> { return u.view[0]; }",
        )
        .unwrap();
        std::fs::write(
            dir.join("a.frag.wgsl"),
            "struct U { model: mat4x4<f32>, view: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;
             @fragment fn fs_main() -> @location(0) vec4<f32> { return u.model[0]; }",
        )
        .unwrap();

        let mut f = ShaderFactory::new(&dir).unwrap();
        let err = f
            .link(ProgramKind::Simple, &pair("a.vert.wgsl", "a.frag.wgsl"))
            .unwrap_err();
        assert!(matches!(
            err,
            VoxError::Link {
                source: LinkError::SlotMismatch { .. },
                ..
            }
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_entry_point_is_a_link_error() {
        let dir = scratch_dir("entry");
        std::fs::write(
            dir.join("v.wgsl"),
            "struct U { model: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;
             @vertex fn main() -> @builtin(position) vec4<f32> { return u.model[0]; }",
        )
        .unwrap();
        let mut f = ShaderFactory::new(&dir).unwrap();
        let err = f.link(ProgramKind::Simple, &pair("v.wgsl", "v.wgsl")).unwrap_err();
        assert!(matches!(
            err,
            VoxError::Link {
                source: LinkError::MissingEntryPoint { stage: "vertex", .. },
                ..
            }
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn second_voxelize_link_rechecks_geometry() {
        let dir = scratch_dir("geom-relink");
        std::fs::write(
            dir.join("g.wgsl"),
            "#define_import_path voxrender::elsewhere\nfn f() -> u32 { return 0u; }",
        )
        .unwrap();
        let shaders = ShaderOptions::default();
        let mut f = factory();
        assert!(f
            .link(ProgramKind::Voxelize, shaders.files(ProgramKind::Voxelize))
            .is_ok());

        let files = StageFiles {
            geom: Some(dir.join("g.wgsl").display().to_string()),
            ..shaders.voxelize.clone()
        };
        assert!(matches!(
            f.link(ProgramKind::Voxelize, &files),
            Err(VoxError::ShaderCompose { ref message, .. }) if message.contains("voxrender::elsewhere")
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn voxelize_geometry_must_define_its_module() {
        let dir = scratch_dir("geom");
        std::fs::write(
            dir.join("g.wgsl"),
            "#define_import_path voxrender::elsewhere\nfn f() -> u32 { return 0u; }",
        )
        .unwrap();
        let shaders = ShaderOptions::default();
        let files = StageFiles {
            vert: shader_dir().join(&shaders.voxelize.vert).display().to_string(),
            frag: shader_dir().join(&shaders.voxelize.frag).display().to_string(),
            geom: Some("g.wgsl".to_owned()),
        };
        let mut f = ShaderFactory::new(&dir).unwrap();
        assert!(matches!(
            f.link(ProgramKind::Voxelize, &files),
            Err(VoxError::ShaderCompose { .. })
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
