//! World module - static level geometry and its assets
//!
//! - `level` - RON level files (plain or brotli) describing static surfaces
//! - `textures` - texture cache keyed by asset-relative path
//! - `billboard` - camera-facing sprite quads

mod billboard;
mod level;
mod textures;

pub use billboard::*;
pub use level::*;
pub use textures::*;
