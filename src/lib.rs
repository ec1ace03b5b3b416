//! nostalgiae: a low-resolution software raycaster
//!
//! Textured planar surfaces, coloured point and spot lights, and a handful of
//! screen filters, rendered into a small RGBA framebuffer the caller upscales.
//!
//! - `raycaster` - geometry and light stores, the raycast pass
//! - `filters` - vignette, fisheye, distortion, shake, `ScreenEffects`
//! - `world` - level files, texture cache, billboards
//! - `config` / `logging` - viewer settings and logger setup
//! - `app` - player and per-frame sequence for the viewer binary

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod app;
pub mod config;
pub mod filters;
pub mod logging;
pub mod raycaster;
pub mod world;
