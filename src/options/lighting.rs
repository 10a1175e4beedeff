use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Scene light and the default material.
pub struct LightingOptions {
    /// Light position in world space.
    #[schemars(title = "Light Position")]
    pub position: [f32; 3],
    /// Light follows the eye instead of `position`.
    #[schemars(title = "Eye Light")]
    pub eye_light: bool,
    /// Default ambient color.
    #[schemars(title = "Ambient")]
    pub ambient: [f32; 4],
    /// Default diffuse color.
    #[schemars(title = "Diffuse")]
    pub diffuse: [f32; 4],
    /// Default specular color; the fourth component is the shininess.
    #[schemars(title = "Specular")]
    pub specular: [f32; 4],
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            position: [50.0, 100.0, 50.0],
            eye_light: false,
            ambient: [0.1, 0.1, 0.1, 1.0],
            diffuse: [0.7, 0.7, 0.7, 1.0],
            specular: [0.3, 0.3, 0.3, 40.0],
        }
    }
}
