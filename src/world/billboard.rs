//! Camera-facing sprites (monsters, pickups)

use crate::raycaster::{SurfaceShape, Vec3};

/// Upright quad of `width` x `height` centred on `center`, turned about the
/// y axis so its front faces `viewer`.
///
/// The texture's left edge appears on the viewer's left. Register the result
/// as a transient surface and rebuild it every frame as the viewer moves.
pub fn billboard_toward(center: Vec3, width: f32, height: f32, viewer: Vec3) -> SurfaceShape {
    let to_sprite = Vec3::new(center.x - viewer.x, 0.0, center.z - viewer.z);
    let forward = if to_sprite.len() > 1e-6 { to_sprite.normalize() } else { Vec3::new(0.0, 0.0, 1.0) };
    // Screen-right for a viewer looking along `forward`
    let right = Vec3::new(forward.z, 0.0, -forward.x);

    let half_w = right * (width * 0.5);
    let half_h = Vec3::UP * (height * 0.5);
    SurfaceShape::rect(center - half_w + half_h, center + half_w - half_h)
}
