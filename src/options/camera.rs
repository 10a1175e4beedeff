use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera placement, projection and viewport.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(title = "Near Plane", range(min = 0.001))]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(title = "Far Plane")]
    pub zfar: f32,
    /// Eye position in world space.
    #[schemars(title = "Eye")]
    pub eye: [f32; 3],
    /// Look-at target in world space.
    #[schemars(title = "Target")]
    pub target: [f32; 3],
    /// Viewport width in pixels.
    #[schemars(title = "Width", range(min = 1))]
    pub width: u32,
    /// Viewport height in pixels.
    #[schemars(title = "Height", range(min = 1))]
    pub height: u32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            eye: [0.0, 0.0, 4.0],
            target: [0.0; 3],
            width: 1280,
            height: 720,
        }
    }
}
