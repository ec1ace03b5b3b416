//! Frame-scoped point and spot lights
//!
//! Falloff is linear in distance: a light of intensity `i` contributes
//! `1 - d / i` of its colour at distance `d` and nothing past `d = i`, so
//! intensity reads directly as the reach of the light in world units.
//! Spot lights additionally fade from full at the cone axis to zero at the
//! cutoff angle.

use super::math::Vec3;

/// Error type for light registration
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightError {
    #[error("spot light target coincides with its position")]
    ZeroDirection,
    #[error("light position is not finite")]
    NonFinite,
}

/// Parameters for [`LightStore::add`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDesc {
    pub position: Vec3,
    /// Reach in world units (default 1.0)
    pub intensity: f32,
    /// Linear RGB multiplier per channel (default white)
    pub color: [f32; 3],
    /// Point the spot cone aims at; `None` makes an omnidirectional light
    pub target: Option<Vec3>,
}

impl LightDesc {
    pub fn point(position: Vec3) -> Self {
        Self { position, intensity: 1.0, color: [1.0, 1.0, 1.0], target: None }
    }

    pub fn spot(position: Vec3, target: Vec3) -> Self {
        Self::point(position).toward(target)
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r, g, b];
        self
    }

    pub fn toward(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }
}

impl Default for LightDesc {
    fn default() -> Self {
        Self::point(Vec3::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Point,
    /// Unit direction of the cone axis
    Spot { direction: Vec3 },
}

/// A validated light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub intensity: f32,
    pub color: [f32; 3],
    pub kind: LightKind,
}

fn non_negative(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.max(0.0) }
}

impl Light {
    /// Validate a description; intensity and colour are clamped to >= 0
    pub fn from_desc(desc: LightDesc) -> Result<Self, LightError> {
        if !desc.position.is_finite() {
            return Err(LightError::NonFinite);
        }

        let kind = match desc.target {
            None => LightKind::Point,
            Some(target) => {
                if !target.is_finite() {
                    return Err(LightError::NonFinite);
                }
                let dir = target - desc.position;
                let len = dir.len();
                if len <= 1e-6 {
                    return Err(LightError::ZeroDirection);
                }
                LightKind::Spot { direction: dir * (1.0 / len) }
            }
        };

        Ok(Self {
            position: desc.position,
            intensity: non_negative(desc.intensity),
            color: desc.color.map(non_negative),
            kind,
        })
    }

    /// Scalar contribution (before colour) at `point`, in [0, 1]
    pub fn attenuation(&self, point: Vec3, cos_cutoff: f32, cutoff_rad: f32) -> f32 {
        if self.intensity <= 0.0 {
            return 0.0;
        }
        let to_point = point - self.position;
        let dist = to_point.len();
        if dist >= self.intensity {
            return 0.0;
        }
        let falloff = 1.0 - dist / self.intensity;

        match self.kind {
            LightKind::Point => falloff,
            LightKind::Spot { direction } => {
                if dist < 1e-6 {
                    // Sitting on the light itself
                    return falloff;
                }
                let cos_angle = (to_point.dot(direction) / dist).clamp(-1.0, 1.0);
                if cos_angle < cos_cutoff {
                    return 0.0;
                }
                let edge = 1.0 - cos_angle.acos() / cutoff_rad;
                falloff * edge.max(0.0)
            }
        }
    }
}

/// Per-frame light list
#[derive(Debug, Default, Clone)]
pub struct LightStore {
    lights: Vec<Light>,
}

impl LightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, desc: LightDesc) -> Result<(), LightError> {
        let light = Light::from_desc(desc).map_err(|e| {
            log::debug!("skipped light at {:?}: {}", desc.position, e);
            e
        })?;
        self.lights.push(light);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn as_slice(&self) -> &[Light] {
        &self.lights
    }
}

/// Precomputed spot cone for one pass
#[derive(Debug, Clone, Copy)]
pub struct SpotCone {
    cutoff_rad: f32,
    cos_cutoff: f32,
}

impl SpotCone {
    pub fn new(cutoff_deg: f32) -> Self {
        let cutoff_rad = if cutoff_deg.is_finite() { cutoff_deg.clamp(0.1, 180.0) } else { 30.0 }.to_radians();
        Self { cutoff_rad, cos_cutoff: cutoff_rad.cos() }
    }
}

/// Light arriving at `point`: ambient plus every light, clamped per channel to [0, 1]
pub fn shade_point(point: Vec3, lights: &[Light], ambient: f32, cone: SpotCone) -> (f32, f32, f32) {
    let ambient = non_negative(ambient);
    let mut total_r = ambient;
    let mut total_g = ambient;
    let mut total_b = ambient;

    for light in lights {
        let contribution = light.attenuation(point, cone.cos_cutoff, cone.cutoff_rad);
        if contribution <= 0.0 {
            continue;
        }
        total_r += contribution * light.color[0];
        total_g += contribution * light.color[1];
        total_b += contribution * light.color[2];
    }

    (total_r.min(1.0), total_g.min(1.0), total_b.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone() -> SpotCone {
        SpotCone::new(30.0)
    }

    #[test]
    fn test_point_falloff_is_linear() {
        let light = Light::from_desc(LightDesc::point(Vec3::ZERO).with_intensity(4.0)).unwrap();
        let c = cone();
        assert!((light.attenuation(Vec3::new(1.0, 0.0, 0.0), c.cos_cutoff, c.cutoff_rad) - 0.75).abs() < 1e-6);
        assert!((light.attenuation(Vec3::new(0.0, 2.0, 0.0), c.cos_cutoff, c.cutoff_rad) - 0.5).abs() < 1e-6);
        assert_eq!(light.attenuation(Vec3::new(0.0, 0.0, 5.0), c.cos_cutoff, c.cutoff_rad), 0.0);
    }

    #[test]
    fn test_spot_cone() {
        let light = Light::from_desc(
            LightDesc::spot(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)).with_intensity(10.0),
        )
        .unwrap();
        let c = cone();
        let on_axis = light.attenuation(Vec3::new(0.0, 0.0, 2.0), c.cos_cutoff, c.cutoff_rad);
        assert!((on_axis - 0.8).abs() < 1e-5);
        // 15 degrees off axis: half the edge falloff
        let off = Vec3::new(2.0 * 15f32.to_radians().tan(), 0.0, 2.0);
        let half = light.attenuation(off, c.cos_cutoff, c.cutoff_rad);
        assert!(half > 0.0 && half < on_axis);
        // Behind the light
        assert_eq!(light.attenuation(Vec3::new(0.0, 0.0, -2.0), c.cos_cutoff, c.cutoff_rad), 0.0);
        // 45 degrees off axis
        assert_eq!(light.attenuation(Vec3::new(2.0, 0.0, 2.0), c.cos_cutoff, c.cutoff_rad), 0.0);
    }

    #[test]
    fn test_zero_direction_rejected() {
        let mut store = LightStore::new();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(store.add(LightDesc::spot(p, p)), Err(LightError::ZeroDirection));
        assert_eq!(store.add(LightDesc::point(Vec3::new(f32::NAN, 0.0, 0.0))), Err(LightError::NonFinite));
        assert!(store.is_empty());
    }

    #[test]
    fn test_negative_values_clamp() {
        let light = Light::from_desc(
            LightDesc::point(Vec3::ZERO).with_intensity(-3.0).with_color(-1.0, f32::NAN, 0.5),
        )
        .unwrap();
        assert_eq!(light.intensity, 0.0);
        assert_eq!(light.color, [0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_shade_point_sums_and_clamps() {
        let mut store = LightStore::new();
        let p = Vec3::new(0.0, 0.0, 1.0);
        let (r0, _, _) = shade_point(p, store.as_slice(), 0.1, cone());
        assert!((r0 - 0.1).abs() < 1e-6);

        store.add(LightDesc::point(Vec3::ZERO).with_intensity(2.0)).unwrap();
        let (r1, _, _) = shade_point(p, store.as_slice(), 0.1, cone());
        store.add(LightDesc::point(Vec3::ZERO).with_intensity(2.0)).unwrap();
        let (r2, _, _) = shade_point(p, store.as_slice(), 0.1, cone());
        assert!(r1 > r0);
        assert!(r2 >= r1);
        assert!(r2 <= 1.0);

        store.clear();
        assert!(store.is_empty());
    }
}
