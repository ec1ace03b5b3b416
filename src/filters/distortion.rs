//! Sine-wave row/column displacement (signal interference)

use crate::raycaster::Framebuffer;

/// Parameters for [`distortion`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    /// Shift rows sideways
    pub horizontal: bool,
    /// Shift columns up and down
    pub vertical: bool,
    /// Peak displacement in pixels
    pub amplitude: f32,
    /// Radians per pixel along the wave
    pub frequency: f32,
    /// Radians per second of phase drift
    pub speed: f32,
    /// Animation clock in seconds
    pub time: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            horizontal: true,
            vertical: true,
            amplitude: 0.0,
            frequency: 0.0,
            speed: 0.0,
            time: 0.0,
        }
    }
}

impl DistortionParams {
    /// Whole-pixel shift for row or column `index`, reduced to `[0, len)`
    /// so huge amplitudes never reach integer arithmetic
    fn offset(&self, index: usize, len: usize) -> isize {
        let shift = (self.amplitude * (self.frequency * index as f32 + self.speed * self.time).sin()).round();
        if !shift.is_finite() || len == 0 {
            return 0;
        }
        let reduced = shift.rem_euclid(len as f32) as isize;
        // rem_euclid may round up to `len` itself
        reduced.rem_euclid(len as isize)
    }

    fn is_identity(&self) -> bool {
        (!self.horizontal && !self.vertical) || self.amplitude == 0.0 || !self.amplitude.is_finite()
    }
}

fn wrap(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

/// Write `src` into `dst` with row `y` shifted by
/// `round(amplitude * sin(frequency * y + speed * time))` columns and then
/// column `x` shifted by the same wave evaluated at `x` in rows. Pixels
/// pushed off one edge wrap around to the other.
pub fn distortion(src: &Framebuffer, dst: &mut Framebuffer, params: DistortionParams) {
    if params.is_identity() {
        dst.copy_from(src);
        return;
    }
    dst.resize(src.width, src.height);
    let (w, h) = (src.width, src.height);
    if w == 0 || h == 0 {
        return;
    }

    let row_shift: Vec<isize> = (0..h).map(|y| if params.horizontal { params.offset(y, w) } else { 0 }).collect();
    let col_shift: Vec<isize> = (0..w).map(|x| if params.vertical { params.offset(x, h) } else { 0 }).collect();

    for y in 0..h {
        for x in 0..w {
            // Undo the column shift, then the row shift of the row we land on
            let sy = wrap(y as isize - col_shift[x], h);
            let sx = wrap(x as isize - row_shift[sy], w);
            dst.set_pixel(x, y, src.get_pixel(sx, sy));
        }
    }
}
