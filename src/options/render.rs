use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Render", inline)]
#[serde(default)]
/// Per-frame draw limits and volume sampling defaults.
pub struct RenderOptions {
    /// Uniform snapshots each program can hold per frame. Draws beyond this
    /// are skipped with a warning.
    #[schemars(title = "Max Draws Per Frame", range(min = 1, max = 65536))]
    pub max_draws_per_frame: u32,
    /// Ray steps: primary, shadow, fine (fractions of the volume diagonal).
    #[schemars(title = "Samples")]
    pub samples: [f32; 3],
    /// Lower end of the sampled value window.
    #[schemars(title = "Value Min")]
    pub tex_min: [f32; 3],
    /// Upper end of the sampled value window.
    #[schemars(title = "Value Max")]
    pub tex_max: [f32; 3],
    /// Clear color of the off-screen target.
    #[schemars(skip)]
    pub clear_color: [f32; 4],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_draws_per_frame: 256,
            samples: [0.005, 0.02, 0.001],
            tex_min: [0.0; 3],
            tex_max: [1.0; 3],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
