use naga_oil::compose::{
    get_preprocessor_data, ComposableModuleDescriptor, Composer, NagaModuleDescriptor,
    ShaderLanguage, ShaderType,
};

use crate::error::VoxError;

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads the shared WGSL modules at construction time. Program sources
/// use `#import voxrender::module_name::{...}` to pull in shared code. The
/// composer produces `naga::Module` IR directly, which is both reflected for
/// uniform bindings and handed to wgpu without a WGSL re-parse.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

const SHARED_MODULES: &[ModuleDef] = &[
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/fullscreen.wgsl"),
        file_path: "modules/fullscreen.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/lighting.wgsl"),
        file_path: "modules/lighting.wgsl",
    },
    ModuleDef {
        source: include_str!("../../assets/shaders/modules/volume.wgsl"),
        file_path: "modules/volume.wgsl",
    },
];

impl ShaderComposer {
    /// Composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::ShaderCompose`] if a shared module is rejected.
    pub fn new() -> Result<Self, VoxError> {
        let mut composer = Self {
            composer: Composer::default(),
        };
        // Modules with no dependencies first.
        for m in SHARED_MODULES {
            composer.add_module(m.source, m.file_path)?;
        }
        Ok(composer)
    }

    /// Register (or replace) a composable module. The source names itself
    /// with `#define_import_path`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::ShaderCompose`] if naga_oil rejects the module.
    pub fn add_module(&mut self, source: &str, file_path: &str) -> Result<(), VoxError> {
        let result = self
            .composer
            .add_composable_module(ComposableModuleDescriptor {
                source,
                file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            });
        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(VoxError::ShaderCompose {
                file: file_path.to_owned(),
                message: e.emit_to_string(&self.composer),
            }),
        }
    }

    /// Import path a source declares with `#define_import_path`, if any.
    pub fn import_path(source: &str) -> Option<String> {
        get_preprocessor_data(source).0
    }

    /// Compose a shader source (which may contain `#import` directives) into
    /// a `naga::Module`.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::ShaderCompose`] with the composer's diagnostic
    /// rendered against the source.
    pub fn compose(&mut self, source: &str, file_path: &str) -> Result<naga::Module, VoxError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source,
                file_path,
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| VoxError::ShaderCompose {
                file: file_path.to_owned(),
                message: e.emit_to_string(&self.composer),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_modules_declare_their_paths() {
        let paths: Vec<_> = SHARED_MODULES
            .iter()
            .filter_map(|m| ShaderComposer::import_path(m.source))
            .collect();
        assert_eq!(
            paths,
            ["voxrender::fullscreen", "voxrender::lighting", "voxrender::volume"]
        );
    }

    #[test]
    fn source_without_import_path_has_none() {
        assert_eq!(ShaderComposer::import_path("fn f() -> u32 { return 0u; }"), None);
    }

    #[test]
    fn imports_resolve() {
        let mut composer = ShaderComposer::new().unwrap();
        let module = composer
            .compose(
                r"
#import voxrender::lighting::blinn_phong

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let c = blinn_phong(vec3<f32>(0.0, 0.0, 1.0), vec3<f32>(0.0, 0.0, 1.0),
        vec3<f32>(0.0, 0.0, 1.0), vec4<f32>(0.1), vec4<f32>(0.5), vec4<f32>(1.0, 1.0, 1.0, 8.0));
    return vec4<f32>(c, 1.0);
}
",
                "inline.wgsl",
            )
            .unwrap();
        assert!(module.entry_points.iter().any(|ep| ep.name == "fs_main"));
    }

    #[test]
    fn bad_source_is_a_compose_error() {
        let mut composer = ShaderComposer::new().unwrap();
        let err = composer
            .compose("fn broken( -> f32 { }", "broken.wgsl")
            .unwrap_err();
        assert!(matches!(err, VoxError::ShaderCompose { ref file, .. } if file == "broken.wgsl"));
    }
}
