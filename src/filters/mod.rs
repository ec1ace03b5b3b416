//! Post-process screen filters
//!
//! Pure functions over [`Framebuffer`]s, run after the raycast pass and
//! before the upscale. Filters that read one buffer and write another resize
//! the destination to the source first, so `dst` may start at any size.
//!
//! [`ScreenEffects`] chains them in the order the viewer uses and decays
//! each effect over time.

pub mod distortion;
pub mod effects;
pub mod fisheye;
pub mod shake;
pub mod vignette;

pub use distortion::{distortion, DistortionParams};
pub use effects::ScreenEffects;
pub use fisheye::fisheye;
pub use shake::{shake, shake_offset};
pub use vignette::vignette;

use crate::raycaster::Framebuffer;

/// Centre of the buffer and the centre-to-corner radius, in pixels
pub(crate) fn centre_and_radius(fb: &Framebuffer) -> (f32, f32, f32) {
    let cx = fb.width as f32 * 0.5;
    let cy = fb.height as f32 * 0.5;
    (cx, cy, (cx * cx + cy * cy).sqrt())
}
