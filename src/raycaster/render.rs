//! Framebuffer and the raycast pass
//!
//! Every pixel casts one primary ray against every registered surface. The
//! nearest hit whose texel is not fully transparent wins; its texel is
//! multiplied by the light arriving at the hit point and by the depth fade.

use rayon::prelude::*;

use super::camera::CameraPose;
use super::light::{shade_point, Light, LightDesc, LightError, LightStore, SpotCone};
use super::math::Vec3;
use super::ray::{Ray, RayGenerator};
use super::settings::RenderSettings;
use super::surface::{GeometryError, GeometryStore, Surface, SurfaceDesc, SurfaceHit, SurfaceId};
use super::types::Color;

/// Framebuffer for software rendering (RGBA, row-major, row 0 at the top)
///
/// The default is an empty 0x0 buffer; filters resize it on first use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; width * height * 4];
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Pixel at (x, y), transparent black outside the buffer
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let px = &self.pixels[idx..idx + 4];
            Color::from_bytes([px[0], px[1], px[2], px[3]])
        } else {
            Color::TRANSPARENT
        }
    }

    /// Make this buffer an exact copy of `src`
    pub fn copy_from(&mut self, src: &Framebuffer) {
        self.resize(src.width, src.height);
        self.pixels.copy_from_slice(&src.pixels);
    }

    /// Composite `src` over this buffer with a uniform alpha (0 keeps this
    /// buffer, 255 replaces it). Only the overlapping region is touched.
    pub fn blend_from(&mut self, src: &Framebuffer, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let t = alpha as f32 / 255.0;
        let w = self.width.min(src.width);
        let h = self.height.min(src.height);
        for y in 0..h {
            for x in 0..w {
                let blended = self.get_pixel(x, y).lerp(src.get_pixel(x, y), t);
                self.set_pixel(x, y, blended);
            }
        }
    }
}

/// Result of [`RayCaster::single_cast`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub surface: SurfaceId,
}

/// The renderer: owns the surfaces, the lights of the current frame and the
/// pass settings. Rendering borrows it immutably.
#[derive(Debug, Default)]
pub struct RayCaster {
    geometry: GeometryStore,
    lights: LightStore,
    pub settings: RenderSettings,
}

impl RayCaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RenderSettings) -> Self {
        Self { settings, ..Self::default() }
    }

    pub fn add_surface(&mut self, desc: SurfaceDesc) -> Result<SurfaceId, GeometryError> {
        self.geometry.add(desc)
    }

    /// Remove every surface flagged `remove_after_frame`; returns how many went
    pub fn clear_transient_surfaces(&mut self) -> usize {
        self.geometry.clear_transient()
    }

    /// Remove every surface
    pub fn reset(&mut self) {
        self.geometry.reset();
    }

    pub fn surfaces(&self) -> &GeometryStore {
        &self.geometry
    }

    pub fn add_light(&mut self, desc: LightDesc) -> Result<(), LightError> {
        self.lights.add(desc)
    }

    pub fn clear_lights(&mut self) {
        self.lights.clear();
    }

    pub fn lights(&self) -> &LightStore {
        &self.lights
    }

    /// Per-frame cleanup: drop transient surfaces and all lights
    pub fn end_frame(&mut self) {
        let removed = self.clear_transient_surfaces();
        self.clear_lights();
        log::trace!("end of frame, {} transient surfaces removed", removed);
    }

    /// Render the scene as seen from `camera` into every pixel of `fb`
    pub fn raycast(&self, fb: &mut Framebuffer, camera: &CameraPose) {
        let [br, bg, bb] = self.settings.background;
        let background = Color::new(br, bg, bb);

        if fb.width == 0 || fb.height == 0 {
            return;
        }
        if !camera.position.is_finite() {
            log::debug!("camera position is not finite, rendering background only");
            fb.clear(background);
            return;
        }

        let camera = camera.sanitized();
        let pass = Pass {
            surfaces: self.geometry.as_slice(),
            lights: self.lights.as_slice(),
            rays: RayGenerator::new(&camera, fb.width, fb.height),
            max_distance: camera.view_distance,
            ambient: self.settings.ambient,
            cone: SpotCone::new(self.settings.spot_cutoff_deg),
            depth_fade: self.settings.depth_fade,
            background,
        };

        let row_bytes = fb.width * 4;
        if self.settings.parallel {
            fb.pixels
                .par_chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(py, row)| pass.render_row(py, row));
        } else {
            fb.pixels
                .chunks_mut(row_bytes)
                .enumerate()
                .for_each(|(py, row)| pass.render_row(py, row));
        }
    }

    /// [`RayCaster::raycast`] with the camera given as loose values
    #[allow(clippy::too_many_arguments)]
    pub fn raycast_at(
        &self,
        fb: &mut Framebuffer,
        x: f32,
        y: f32,
        z: f32,
        pitch: f32,
        yaw: f32,
        fov: f32,
        max_distance: f32,
    ) {
        let camera = CameraPose::new(Vec3::new(x, y, z), pitch, yaw, fov, max_distance);
        self.raycast(fb, &camera);
    }

    /// Cast one ray from `origin` along the (pitch, yaw) view direction and
    /// return the nearest opaque hit within `max_distance`
    pub fn single_cast(&self, origin: Vec3, pitch: f32, yaw: f32, max_distance: f32) -> Option<RayHit> {
        if !origin.is_finite() {
            return None;
        }
        let camera = CameraPose::new(origin, pitch, yaw, 90.0, max_distance).sanitized();
        let ray = Ray::new(origin, camera.forward());
        let (surface, hit, _) = nearest_opaque(self.geometry.as_slice(), &ray, camera.view_distance)?;
        Some(RayHit {
            distance: hit.t,
            point: ray.at(hit.t),
            surface: surface.id,
        })
    }
}

/// Nearest hit whose texel is not transparent. Ties keep the earlier surface.
fn nearest_opaque<'a>(surfaces: &'a [Surface], ray: &Ray, max_distance: f32) -> Option<(&'a Surface, SurfaceHit, Color)> {
    let mut best: Option<(&Surface, SurfaceHit, Color)> = None;
    let mut best_t = max_distance;

    for surface in surfaces {
        let Some(hit) = surface.intersect(ray, best_t) else {
            continue;
        };
        if best.is_some() && hit.t >= best_t {
            continue;
        }
        let texel = surface.texture.sample(hit.u, hit.v);
        if texel.is_transparent() {
            continue;
        }
        best_t = hit.t;
        best = Some((surface, hit, texel));
    }

    best
}

/// Everything one raycast pass reads, shared by all rows
struct Pass<'a> {
    surfaces: &'a [Surface],
    lights: &'a [Light],
    rays: RayGenerator,
    max_distance: f32,
    ambient: f32,
    cone: SpotCone,
    depth_fade: bool,
    background: Color,
}

impl Pass<'_> {
    fn render_row(&self, py: usize, row: &mut [u8]) {
        for (px, out) in row.chunks_exact_mut(4).enumerate() {
            let color = self.shade_pixel(px, py);
            out.copy_from_slice(&color.to_bytes());
        }
    }

    fn shade_pixel(&self, px: usize, py: usize) -> Color {
        let ray = self.rays.ray(px, py);
        let Some((_, hit, texel)) = nearest_opaque(self.surfaces, &ray, self.max_distance) else {
            return self.background;
        };

        let (lr, lg, lb) = shade_point(ray.at(hit.t), self.lights, self.ambient, self.cone);
        let fade = if self.depth_fade { (1.0 - hit.t / self.max_distance).clamp(0.0, 1.0) } else { 1.0 };
        texel.shade_rgb(lr * fade, lg * fade, lb * fade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycaster::types::Texture;
    use std::sync::Arc;

    fn wall(color: Color, z: f32) -> SurfaceDesc {
        let tex = Arc::new(Texture::new_filled(2, 2, color));
        SurfaceDesc::rect(tex, Vec3::new(-5.0, 5.0, z), Vec3::new(5.0, -5.0, z))
    }

    fn bright() -> RenderSettings {
        RenderSettings { ambient: 1.0, depth_fade: false, ..RenderSettings::default() }
    }

    #[test]
    fn test_default_is_empty_and_resizes() {
        let mut fb = Framebuffer::default();
        assert_eq!((fb.width, fb.height), (0, 0));
        assert!(fb.pixels.is_empty());
        assert_eq!(fb.get_pixel(0, 0), Color::TRANSPARENT);

        let mut src = Framebuffer::new(3, 2);
        src.clear(Color::new(7, 8, 9));
        fb.copy_from(&src);
        assert_eq!(fb, src);
        assert_eq!(fb.get_pixel(2, 1), Color::new(7, 8, 9));
    }

    #[test]
    fn test_blend_from() {
        let mut dst = Framebuffer::new(2, 1);
        dst.clear(Color::BLACK);
        let mut src = Framebuffer::new(2, 1);
        src.clear(Color::WHITE);

        dst.blend_from(&src, 0);
        assert_eq!(dst.get_pixel(0, 0), Color::BLACK);
        dst.blend_from(&src, 255);
        assert_eq!(dst.get_pixel(1, 0), Color::WHITE);
    }

    #[test]
    fn test_empty_scene_is_background() {
        let mut caster = RayCaster::new();
        caster.settings.background = [10, 20, 30];
        let mut fb = Framebuffer::new(8, 4);
        caster.raycast(&mut fb, &CameraPose::default());
        assert!((0..4).all(|y| (0..8).all(|x| fb.get_pixel(x, y) == Color::new(10, 20, 30))));
    }

    #[test]
    fn test_ambient_only_lights_texel() {
        let mut caster = RayCaster::with_settings(bright());
        caster.add_surface(wall(Color::new(200, 100, 50), 3.0)).unwrap();
        let mut fb = Framebuffer::new(4, 4);
        caster.raycast(&mut fb, &CameraPose::default());
        assert_eq!(fb.get_pixel(1, 1), Color::new(200, 100, 50));
    }

    #[test]
    fn test_nan_position_renders_background() {
        let mut caster = RayCaster::with_settings(bright());
        caster.add_surface(wall(Color::WHITE, 3.0)).unwrap();
        let mut fb = Framebuffer::new(4, 4);
        caster.raycast_at(&mut fb, f32::NAN, 0.0, 0.0, 0.0, 90.0, 90.0, 10.0);
        assert!(fb.pixels.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_single_cast_nearest() {
        let mut caster = RayCaster::new();
        let far = caster.add_surface(wall(Color::RED, 6.0)).unwrap();
        let near = caster.add_surface(wall(Color::GREEN, 2.0)).unwrap();

        let hit = caster.single_cast(Vec3::ZERO, 0.0, 90.0, 10.0).unwrap();
        assert_eq!(hit.surface, near);
        assert!((hit.distance - 2.0).abs() < 1e-4);
        assert!((hit.point.z - 2.0).abs() < 1e-4);

        assert!(caster.single_cast(Vec3::ZERO, 0.0, 90.0, 1.5).is_none());
        assert!(caster.single_cast(Vec3::ZERO, 0.0, -90.0, 10.0).is_none());
        assert_ne!(far, near);
    }

    #[test]
    fn test_end_frame_clears_transients_and_lights() {
        let mut caster = RayCaster::new();
        caster.add_surface(wall(Color::WHITE, 2.0)).unwrap();
        caster.add_surface(wall(Color::WHITE, 3.0).transient()).unwrap();
        caster.add_light(LightDesc::point(Vec3::ZERO)).unwrap();

        caster.end_frame();
        assert_eq!(caster.surfaces().len(), 1);
        assert!(caster.lights().is_empty());
    }
}
