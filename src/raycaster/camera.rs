//! Camera pose for the raycast pass
//!
//! Angles are in degrees. Yaw 0 looks along +X and yaw 90 along +Z; positive
//! pitch looks up. Screen-right at yaw `y` is `(sin y, 0, -cos y)`.

use serde::{Deserialize, Serialize};
use super::math::{point_segment_distance, Vec3};

/// Narrowest accepted field of view (degrees)
pub const MIN_FOV: f32 = 1.0;
/// Widest accepted field of view (degrees)
pub const MAX_FOV: f32 = 179.0;

/// Camera state passed by value into each raycast
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    /// Pitch in degrees, [-90, 90]
    pub pitch: f32,
    /// Yaw in degrees, wraps
    pub yaw: f32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    /// Surfaces further than this are never hit
    pub view_distance: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, pitch: f32, yaw: f32, fov: f32, view_distance: f32) -> Self {
        Self { position, pitch, yaw, fov, view_distance }
    }

    /// Copy with every parameter forced into its safe range.
    ///
    /// Non-finite angles become 0, FOV is clamped to [MIN_FOV, MAX_FOV] (a
    /// non-finite FOV becomes 90), and a negative or non-finite view distance
    /// becomes 0 so nothing is hit.
    pub fn sanitized(&self) -> Self {
        let finite_or = |v: f32, fallback: f32| if v.is_finite() { v } else { fallback };
        let view_distance = if self.view_distance.is_finite() { self.view_distance.max(0.0) } else { 0.0 };
        Self {
            position: self.position,
            pitch: finite_or(self.pitch, 0.0).clamp(-90.0, 90.0),
            yaw: finite_or(self.yaw, 0.0),
            fov: finite_or(self.fov, 90.0).clamp(MIN_FOV, MAX_FOV),
            view_distance,
        }
    }

    /// Unit vector the camera looks along
    pub fn forward(&self) -> Vec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cp * cy, sp, cp * sy)
    }

    /// Orthonormal (right, up, forward) basis
    pub fn basis(&self) -> CameraBasis {
        let forward = self.forward();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let right = Vec3::new(sy, 0.0, -cy);
        // Right stays horizontal even at +-90 pitch, so up is never degenerate
        let up = forward.cross(right).normalize();
        CameraBasis { right, up, forward }
    }

    /// Whether `point` lies within `tolerance` of the view line, out to the
    /// view distance (used for "what is the player looking at" checks)
    pub fn is_looking_at(&self, point: Vec3, tolerance: f32) -> bool {
        let end = self.position + self.forward() * self.view_distance.max(0.0);
        point_segment_distance(point, self.position, end) < tolerance
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch: 0.0,
            yaw: 90.0,
            fov: 90.0,
            view_distance: 10.0,
        }
    }
}

/// Computed camera axes in world space
#[derive(Clone, Copy, Debug)]
pub struct CameraBasis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}
