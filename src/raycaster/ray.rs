//! Rays and primary-ray generation
//!
//! The projection is a plain pinhole camera: the horizontal field of view
//! sets the spread across the width and the vertical spread follows from the
//! framebuffer aspect ratio, so pixels stay square.

use super::camera::CameraPose;
use super::math::Vec3;

/// Rays closer to parallel than this are treated as missing a plane
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3, // Normalized
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Find the intersection of a ray with a plane.
///
/// Returns the distance along the ray to the intersection point,
/// or None if the ray is parallel to the plane or intersection is behind ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None; // Ray parallel to plane
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t.is_nan() || t < 0.0 {
        return None; // Behind ray origin (or NaN)
    }

    Some(t)
}

/// Per-frame primary ray setup.
///
/// Everything that does not depend on the pixel is computed once here.
#[derive(Debug, Clone, Copy)]
pub struct RayGenerator {
    origin: Vec3,
    forward: Vec3,
    /// Camera right scaled by tan(fov / 2)
    right: Vec3,
    /// Camera up scaled by tan(fov / 2) * height / width
    up: Vec3,
    inv_width: f32,
    inv_height: f32,
}

impl RayGenerator {
    /// Build from an already sanitized camera pose
    pub fn new(camera: &CameraPose, width: usize, height: usize) -> Self {
        let basis = camera.basis();
        let half_w = (camera.fov.to_radians() * 0.5).tan();
        let aspect = if width > 0 { height as f32 / width as f32 } else { 1.0 };
        Self {
            origin: camera.position,
            forward: basis.forward,
            right: basis.right * half_w,
            up: basis.up * (half_w * aspect),
            inv_width: 1.0 / width.max(1) as f32,
            inv_height: 1.0 / height.max(1) as f32,
        }
    }

    /// Ray through the centre of pixel (px, py); (0, 0) is the top-left pixel
    #[inline]
    pub fn ray(&self, px: usize, py: usize) -> Ray {
        let ndc_x = 2.0 * (px as f32 + 0.5) * self.inv_width - 1.0;
        let ndc_y = 1.0 - 2.0 * (py as f32 + 0.5) * self.inv_height;
        Ray::new(self.origin, self.forward + self.right * ndc_x + self.up * ndc_y)
    }
}
