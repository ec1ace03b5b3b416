//! Radial lens distortion

use super::centre_and_radius;
use crate::raycaster::{Color, Framebuffer};

/// Barrel/pincushion warp of `src` into `dst`.
///
/// A destination pixel at offset `p` from the centre (normalized so the
/// corners sit at radius 1) reads the source at `p * (1 + strength * r^2)`.
/// Positive strength pulls the edges inward, negative pushes them out.
/// Samples that land outside the source are black.
pub fn fisheye(src: &Framebuffer, dst: &mut Framebuffer, strength: f32) {
    if strength == 0.0 || !strength.is_finite() {
        dst.copy_from(src);
        return;
    }
    dst.resize(src.width, src.height);

    let (cx, cy, radius) = centre_and_radius(src);
    if radius <= 0.0 {
        return;
    }
    let inv_r2 = 1.0 / (radius * radius);

    for y in 0..src.height {
        let dy = y as f32 + 0.5 - cy;
        for x in 0..src.width {
            let dx = x as f32 + 0.5 - cx;
            let k = 1.0 + strength * (dx * dx + dy * dy) * inv_r2;
            let sx = (cx + dx * k).floor();
            let sy = (cy + dy * k).floor();

            let color = if sx >= 0.0 && sy >= 0.0 && (sx as usize) < src.width && (sy as usize) < src.height {
                src.get_pixel(sx as usize, sy as usize)
            } else {
                Color::BLACK
            };
            dst.set_pixel(x, y, color);
        }
    }
}
