//! Raycaster constants
//!
//! Internal framebuffer resolution. The viewer multiplies both by its
//! quality factor and upscales the result to the window.

/// Base framebuffer width
pub const BASE_WIDTH: usize = 128;

/// Base framebuffer height
pub const BASE_HEIGHT: usize = 72;

/// Width the screen shake jitter is tuned for
pub const SHAKE_REFERENCE_WIDTH: f32 = 640.0;
