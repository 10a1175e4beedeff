use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Vertex and fragment file names of one program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct StageFiles {
    /// Vertex stage source.
    pub vert: String,
    /// Fragment stage source.
    pub frag: String,
    /// Geometry source, composed as a module (voxelize only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom: Option<String>,
}

impl StageFiles {
    fn pair(name: &str) -> Self {
        Self {
            vert: format!("{name}.vert.wgsl"),
            frag: format!("{name}.frag.wgsl"),
            geom: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Shaders", inline)]
#[serde(default)]
/// Where program sources live. File names resolve against `dir` unless
/// absolute.
pub struct ShaderOptions {
    /// Shader source directory.
    pub dir: PathBuf,
    /// Lit mesh program.
    pub simple: StageFiles,
    /// Volume slice program.
    pub slice: StageFiles,
    /// Line outline program.
    pub outline: StageFiles,
    /// Mesh voxelization program.
    pub voxelize: StageFiles,
    /// Full-screen volume ray caster.
    pub raycast: StageFiles,
    /// Instanced mesh program.
    pub instance: StageFiles,
    /// Full-screen texture program.
    pub screen: StageFiles,
}

impl Default for ShaderOptions {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/shaders"),
            simple: StageFiles::pair("simple"),
            slice: StageFiles::pair("slice"),
            outline: StageFiles::pair("outline"),
            voxelize: StageFiles {
                geom: Some("voxelize.geom.wgsl".to_owned()),
                ..StageFiles::pair("voxelize")
            },
            raycast: StageFiles::pair("raycast"),
            instance: StageFiles::pair("instance"),
            screen: StageFiles::pair("screen"),
        }
    }
}
