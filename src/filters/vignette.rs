//! Radial darkening toward the screen edges

use super::centre_and_radius;
use crate::raycaster::Framebuffer;

/// Darken `fb` in place by `clamp(1 - strength * r^2, 0, 1)`, where `r` is
/// the distance from the centre with the corners at 1. Alpha is untouched.
pub fn vignette(fb: &mut Framebuffer, strength: f32) {
    if !strength.is_finite() || strength <= 0.0 {
        return;
    }
    let (cx, cy, radius) = centre_and_radius(fb);
    if radius <= 0.0 {
        return;
    }
    let inv_r2 = 1.0 / (radius * radius);

    for y in 0..fb.height {
        let dy = y as f32 + 0.5 - cy;
        for x in 0..fb.width {
            let dx = x as f32 + 0.5 - cx;
            let factor = (1.0 - strength * (dx * dx + dy * dy) * inv_r2).clamp(0.0, 1.0);
            let idx = (y * fb.width + x) * 4;
            for c in &mut fb.pixels[idx..idx + 3] {
                *c = (*c as f32 * factor) as u8;
            }
        }
    }
}
