//! Tunables for the raycast pass

use serde::{Deserialize, Serialize};

/// Render pass settings, stored in the viewer config under `render`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Light every surface receives with no lights present, per channel [0, 1]
    pub ambient: f32,
    /// Half-angle of spot light cones in degrees
    pub spot_cutoff_deg: f32,
    /// Darken surfaces linearly toward the view distance
    pub depth_fade: bool,
    /// Colour written where no surface is hit (RGB)
    pub background: [u8; 3],
    /// Split the pass across framebuffer rows with rayon
    pub parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            ambient: 0.08,
            spot_cutoff_deg: 30.0,
            depth_fade: true,
            background: [0, 0, 0],
            parallel: true,
        }
    }
}
