//! Screen shake

use crate::raycaster::constants::SHAKE_REFERENCE_WIDTH;
use crate::raycaster::{Color, Framebuffer};

/// Copy `src` into `dst` moved by (dx, dy) pixels; uncovered pixels are black
pub fn shake(src: &Framebuffer, dst: &mut Framebuffer, dx: i32, dy: i32) {
    dst.resize(src.width, src.height);
    dst.clear(Color::BLACK);

    let (w, h) = (src.width as i64, src.height as i64);
    for y in 0..h {
        let sy = y - dy as i64;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx as i64;
            if sx < 0 || sx >= w {
                continue;
            }
            dst.set_pixel(x as usize, y as usize, src.get_pixel(sx as usize, sy as usize));
        }
    }
}

/// Pseudo-random jitter for a shake of `magnitude` at `clock` seconds.
///
/// The jitter comes from the fractional digits of `sin(clock)` so it looks
/// random but is fully deterministic. It is tuned for a 640 pixel wide
/// screen and scaled to `width`. Each axis stays within
/// `magnitude * 10 * width / 640` pixels (x) and `magnitude * 7.5 * width / 640` (y).
pub fn shake_offset(magnitude: f32, clock: f32, width: usize) -> (i32, i32) {
    if !magnitude.is_finite() || magnitude <= 0.0 || !clock.is_finite() {
        return (0, 0);
    }
    let s = clock.sin();
    let scale = width as f32 / SHAKE_REFERENCE_WIDTH;
    let x = ((s * 1000.0).rem_euclid(magnitude) - magnitude / 2.0) * 20.0 * scale;
    let y = ((s * 10000.0).rem_euclid(magnitude) - magnitude / 2.0) * 15.0 * scale;
    (x.round() as i32, y.round() as i32)
}
