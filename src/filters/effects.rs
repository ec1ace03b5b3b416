//! Decaying screen effects
//!
//! Gameplay bumps a strength (a scare sets `shake = 1.0`, a monster in view
//! adds a little vignette every frame) and `apply` renders and decays them.
//! Each strength falls by one unit per second until it reaches its minimum,
//! so a non-zero minimum keeps an effect running permanently.

use super::{distortion, fisheye, shake, shake_offset, vignette, DistortionParams};
use crate::raycaster::Framebuffer;

/// Strength of the interference overlay relative to `distortion`
const OVERLAY_ALPHA_PER_UNIT: f32 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct ScreenEffects {
    pub vignette: f32,
    pub min_vignette: f32,
    pub shake: f32,
    pub min_shake: f32,
    pub fish_eye: f32,
    pub min_fish_eye: f32,
    /// Soft interference overlay
    pub distortion: f32,
    pub min_distortion: f32,
    /// Violent full-screen glitch
    pub fried: f32,
    pub min_fried: f32,
    /// Seconds of shake so far, drives the jitter pattern
    shake_clock: f32,
    scratch: Framebuffer,
}

fn decay(value: &mut f32, min: f32, dt: f32) {
    *value = (*value - dt).max(min);
}

impl ScreenEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every strength, minimum and clock
    pub fn reset(&mut self) {
        let scratch = std::mem::take(&mut self.scratch);
        *self = Self { scratch, ..Self::default() };
    }

    /// Set every strength to `level`
    pub fn trigger_all(&mut self, level: f32) {
        self.vignette = level;
        self.shake = level;
        self.fish_eye = level;
        self.distortion = level;
        self.fried = level;
    }

    pub fn is_active(&self) -> bool {
        [self.vignette, self.shake, self.fish_eye, self.distortion, self.fried]
            .iter()
            .any(|&s| s > 0.0)
    }

    /// Apply active effects to `fb` in order (shake, fisheye, glitch,
    /// interference, vignette), then decay them by `dt` seconds
    pub fn apply(&mut self, fb: &mut Framebuffer, dt: f32, time: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.shake > 0.0 {
            self.shake_clock += dt;
            self.scratch.copy_from(fb);
            let (dx, dy) = shake_offset(self.shake, self.shake_clock, fb.width);
            shake(&self.scratch, fb, dx, dy);
            decay(&mut self.shake, self.min_shake, dt);
        }

        if self.fish_eye > 0.0 {
            self.scratch.copy_from(fb);
            fisheye(&self.scratch, fb, -self.fish_eye);
            decay(&mut self.fish_eye, self.min_fish_eye, dt);
        }

        if self.fried > 0.0 {
            self.scratch.copy_from(fb);
            let params = DistortionParams {
                amplitude: self.fried * 20.0,
                frequency: 100.0,
                speed: 1.0,
                time,
                ..Default::default()
            };
            distortion(&self.scratch, fb, params);
            decay(&mut self.fried, self.min_fried, dt);
        }

        if self.distortion > 0.0 {
            let params = DistortionParams {
                amplitude: 10.0,
                frequency: 0.01 * self.distortion,
                speed: 0.1 * self.distortion,
                time,
                ..Default::default()
            };
            distortion(fb, &mut self.scratch, params);
            let alpha = (self.distortion * OVERLAY_ALPHA_PER_UNIT).min(255.0) as u8;
            fb.blend_from(&self.scratch, alpha);
            decay(&mut self.distortion, self.min_distortion, dt);
        }

        if self.vignette > 0.0 {
            vignette(fb, self.vignette * 5.0);
            decay(&mut self.vignette, self.min_vignette, dt);
        }
    }
}
