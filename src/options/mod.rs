//! Renderer options with TOML preset support.
//!
//! Shader locations, camera, lighting and per-frame limits are consolidated
//! here. Options serialize to/from TOML so a run can be described by a
//! single preset file.

mod camera;
mod lighting;
mod render;
mod shaders;

use std::path::Path;

pub use camera::CameraOptions;
pub use lighting::LightingOptions;
pub use render::RenderOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use shaders::{ShaderOptions, StageFiles};

use crate::error::VoxError;
use crate::shader::ProgramKind;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(default)]
pub struct Options {
    /// Program source files.
    pub shaders: ShaderOptions,
    /// Camera placement and projection.
    pub camera: CameraOptions,
    /// Light and default material.
    pub lighting: LightingOptions,
    /// Per-frame limits and volume sampling.
    pub render: RenderOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, VoxError> {
        let content = std::fs::read_to_string(path).map_err(VoxError::Io)?;
        toml::from_str(&content).map_err(|e| VoxError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), VoxError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(VoxError::Io)?;
        }
        std::fs::write(path, content).map_err(VoxError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

impl ShaderOptions {
    /// Source files configured for `kind`.
    pub fn files(&self, kind: ProgramKind) -> &StageFiles {
        match kind {
            ProgramKind::Simple => &self.simple,
            ProgramKind::Slice => &self.slice,
            ProgramKind::Outline => &self.outline,
            ProgramKind::Voxelize => &self.voxelize,
            ProgramKind::Raycast => &self.raycast,
            ProgramKind::Instance => &self.instance,
            ProgramKind::Screen => &self.screen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[lighting]
eye_light = true

[shaders.raycast]
vert = "custom.vert.wgsl"
frag = "custom.frag.wgsl"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert!(opts.lighting.eye_light);
        assert_eq!(opts.shaders.raycast.vert, "custom.vert.wgsl");
        // Everything else should be default
        assert_eq!(opts.lighting.position, LightingOptions::default().position);
        assert_eq!(opts.render.max_draws_per_frame, 256);
        assert_eq!(
            opts.shaders.voxelize.geom.as_deref(),
            Some("voxelize.geom.wgsl")
        );
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("voxrender-opts-{}", std::process::id()));
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.render.max_draws_per_frame = 32;
        opts.save(&path).unwrap();

        assert_eq!(Options::load(&path).unwrap(), opts);
        assert_eq!(Options::list_presets(&dir), vec!["preset".to_owned()]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let dir = std::env::temp_dir().join(format!("voxrender-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[render]\nmax_draws_per_frame = \"many\"\n").unwrap();
        assert!(matches!(Options::load(&path), Err(VoxError::OptionsParse(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value = serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        for section in ["shaders", "camera", "lighting", "render"] {
            assert!(props.contains_key(section), "{section} missing");
        }
        let render = &props["render"]["properties"];
        assert!(render.get("max_draws_per_frame").is_some());
        assert!(render.get("clear_color").is_none());
    }

    #[test]
    fn every_kind_has_files() {
        let shaders = ShaderOptions::default();
        for kind in ProgramKind::ALL {
            assert!(shaders.files(kind).frag.ends_with(".frag.wgsl"));
        }
    }
}
