//! Post-process filters applied to rendered frames

use std::sync::Arc;

use nostalgiae::filters::{distortion, fisheye, shake, shake_offset, vignette, DistortionParams, ScreenEffects};
use nostalgiae::raycaster::{CameraPose, Color, Framebuffer, RayCaster, RenderSettings, SurfaceDesc, Texture, Vec3};

/// A checkerboard room corner, rendered at the base resolution
fn rendered_frame() -> Framebuffer {
    let settings = RenderSettings { ambient: 1.0, depth_fade: false, parallel: false, ..RenderSettings::default() };
    let mut caster = RayCaster::with_settings(settings);
    let tex = Arc::new(Texture::checkerboard(8, 8, 1, Color::new(200, 180, 40), Color::new(30, 60, 90)));
    caster
        .add_surface(SurfaceDesc::rect(Arc::clone(&tex), Vec3::new(-4.0, 3.0, 4.0), Vec3::new(4.0, -3.0, 4.0)))
        .unwrap();
    caster
        .add_surface(SurfaceDesc::rect(tex, Vec3::new(-4.0, 3.0, 0.0), Vec3::new(-4.0, -3.0, 4.0)))
        .unwrap();

    let mut fb = Framebuffer::new(128, 72);
    caster.raycast(&mut fb, &CameraPose::new(Vec3::ZERO, 0.0, 100.0, 80.0, 10.0));
    fb
}

fn sorted_pixels(fb: &Framebuffer) -> Vec<[u8; 4]> {
    let mut pixels: Vec<[u8; 4]> = fb.pixels.chunks_exact(4).map(|p| [p[0], p[1], p[2], p[3]]).collect();
    pixels.sort_unstable();
    pixels
}

#[test]
fn zero_strength_filters_leave_the_frame_alone() {
    let frame = rendered_frame();

    let mut fb = frame.clone();
    vignette(&mut fb, 0.0);
    assert_eq!(fb, frame);

    let mut out = Framebuffer::new(1, 1);
    fisheye(&frame, &mut out, 0.0);
    assert_eq!(out, frame);

    let mut out = Framebuffer::new(3, 3);
    distortion(&frame, &mut out, DistortionParams { frequency: 0.3, speed: 2.0, time: 1.5, ..Default::default() });
    assert_eq!(out, frame);

    let mut out = Framebuffer::new(0, 0);
    shake(&frame, &mut out, 0, 0);
    assert_eq!(out, frame);
}

#[test]
fn distortion_only_rearranges_pixels() {
    let frame = rendered_frame();
    let mut out = Framebuffer::new(0, 0);
    let params = DistortionParams { amplitude: 7.0, frequency: 0.4, speed: 1.0, time: 2.0, ..Default::default() };
    distortion(&frame, &mut out, params);

    assert_ne!(out, frame);
    assert_eq!(sorted_pixels(&out), sorted_pixels(&frame));
}

#[test]
fn vignette_darkens_edges_more_with_strength() {
    let mut white = Framebuffer::new(128, 72);
    white.clear(Color::WHITE);

    let mut soft = white.clone();
    vignette(&mut soft, 0.5);
    let mut hard = white.clone();
    vignette(&mut hard, 5.0);

    // The centre pixel sits almost exactly on the centre
    assert!(soft.get_pixel(64, 36).r >= 254);
    assert!(soft.get_pixel(0, 0).r < 255);
    assert_eq!(hard.get_pixel(0, 0), Color::BLACK);
    for (s, h) in soft.pixels.iter().zip(hard.pixels.iter()) {
        assert!(h <= s);
    }
}

#[test]
fn fisheye_blacks_out_corners_when_pulling_outward() {
    let frame = rendered_frame();
    let mut out = Framebuffer::new(0, 0);
    fisheye(&frame, &mut out, 0.8);
    assert_eq!((out.width, out.height), (frame.width, frame.height));
    // Corners sample beyond the source
    assert_eq!(out.get_pixel(0, 0), Color::BLACK);
    assert_eq!(out.get_pixel(127, 71), Color::BLACK);
    assert_eq!(out.get_pixel(64, 36), frame.get_pixel(64, 36));
}

#[test]
fn shake_offsets_stay_within_scaled_bounds() {
    for width in [128usize, 640, 1280] {
        let scale = width as f32 / 640.0;
        for step in 0..500 {
            let clock = step as f32 * 0.037;
            let (dx, dy) = shake_offset(1.0, clock, width);
            assert!(dx.abs() as f32 <= 10.0 * scale + 0.5, "dx {} at width {}", dx, width);
            assert!(dy.abs() as f32 <= 7.5 * scale + 0.5, "dy {} at width {}", dy, width);
        }
    }
    assert_eq!(shake_offset(0.0, 1.0, 640), (0, 0));
}

#[test]
fn screen_effects_run_out_and_stop_touching_frames() {
    let mut fx = ScreenEffects::new();
    fx.trigger_all(1.0);
    assert!(fx.is_active());

    let frame = rendered_frame();
    let mut fb = frame.clone();
    fx.apply(&mut fb, 0.25, 0.25);
    assert_ne!(fb, frame);

    for i in 0..4 {
        let mut fb = frame.clone();
        fx.apply(&mut fb, 0.25, 0.5 + i as f32 * 0.25);
    }
    assert!(!fx.is_active());

    let mut fb = frame.clone();
    fx.apply(&mut fb, 0.25, 2.0);
    assert_eq!(fb, frame);
}

#[test]
fn screen_effect_minimum_keeps_it_running() {
    let mut fx = ScreenEffects::new();
    fx.vignette = 1.0;
    fx.min_vignette = 0.2;

    for _ in 0..20 {
        let mut fb = rendered_frame();
        fx.apply(&mut fb, 0.5, 0.0);
    }
    assert_eq!(fx.vignette, 0.2);

    let frame = rendered_frame();
    let mut fb = frame.clone();
    fx.apply(&mut fb, 0.5, 0.0);
    assert_ne!(fb, frame);

    fx.reset();
    assert!(!fx.is_active());
    assert_eq!(fx.min_vignette, 0.0);
}
