//! Software raycaster
//!
//! Renders textured planar surfaces (triangles and quads) lit by
//! frame-scoped coloured point and spot lights into a low-resolution RGBA
//! framebuffer.
//!
//! # Module Organization
//!
//! - `math` - Vec3, Vec2, point/segment distance
//! - `types` - Color, Texture
//! - `camera` - CameraPose and its basis
//! - `ray` - Ray, ray/plane intersection, primary ray generation
//! - `surface` - surfaces and the geometry store
//! - `light` - lights, the light store and shading
//! - `settings` - RenderSettings
//! - `render` - Framebuffer and RayCaster (the pass itself)
//! - `constants` - base resolution

pub mod camera;
pub mod constants;
pub mod light;
pub mod math;
pub mod ray;
pub mod render;
pub mod settings;
pub mod surface;
pub mod types;

pub use camera::{CameraBasis, CameraPose, MAX_FOV, MIN_FOV};
pub use constants::{BASE_HEIGHT, BASE_WIDTH};
pub use light::{Light, LightDesc, LightError, LightKind, LightStore};
pub use math::{Vec2, Vec3};
pub use ray::Ray;
pub use render::{Framebuffer, RayCaster, RayHit};
pub use settings::RenderSettings;
pub use surface::{GeometryError, GeometryStore, Surface, SurfaceDesc, SurfaceHit, SurfaceId, SurfaceShape};
pub use types::{Color, Texture, TextureError};
