//! Viewer state: the player, the level and the per-frame render sequence
//!
//! Kept free of windowing so the frame loop can be driven from tests.

use crate::config::ViewerConfig;
use crate::filters::ScreenEffects;
use crate::raycaster::{CameraPose, Framebuffer, LightDesc, RayCaster, RayHit, Vec3};
use crate::world::{LevelDef, TextureCache};

/// Player glow: a dim warm light that follows the player
const GLOW_INTENSITY: f32 = 3.0;
const GLOW_COLOR: [f32; 3] = [0.15, 0.07, 0.05];
/// Flashlight colour; its reach is the view distance
const FLASHLIGHT_COLOR: [f32; 3] = [0.5, 0.6, 0.7];
/// Flashlight aim point, in view distances ahead of the eye
const FLASHLIGHT_AIM: f32 = 1.8;

const JUMP_SPEED: f32 = 0.6;
const GRAVITY: f32 = 2.2;

/// One frame of player intent, already read from the input devices
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 right, -1 left
    pub strafe: f32,
    pub run: bool,
    pub jump: bool,
    /// Mouse motion in pixels since last frame
    pub look_dx: f32,
    pub look_dy: f32,
    pub toggle_flashlight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Feet position
    pub position: Vec3,
    pub pitch: f32,
    pub yaw: f32,
    pub flashlight: bool,
    vertical_speed: f32,
}

impl Player {
    pub fn new(position: Vec3, pitch: f32, yaw: f32) -> Self {
        Self { position, pitch, yaw, flashlight: false, vertical_speed: 0.0 }
    }

    pub fn eye(&self, eye_height: f32) -> Vec3 {
        self.position + Vec3::UP * eye_height
    }

    pub fn update(&mut self, input: &PlayerInput, dt: f32, config: &ViewerConfig) {
        if input.toggle_flashlight {
            self.flashlight = !self.flashlight;
        }

        self.yaw -= input.look_dx * config.mouse_sensitivity;
        self.pitch = (self.pitch - input.look_dy * config.mouse_sensitivity).clamp(-90.0, 90.0);

        let speed = if input.run { config.run_speed } else { config.walk_speed };
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let forward = Vec3::new(cy, 0.0, sy);
        let right = Vec3::new(sy, 0.0, -cy);
        let wish = forward * input.forward.clamp(-1.0, 1.0) + right * input.strafe.clamp(-1.0, 1.0);
        if wish.len() > 1e-6 {
            self.position = self.position + wish.normalize() * (speed * dt);
        }

        if input.jump && self.position.y <= 0.0 {
            self.vertical_speed = JUMP_SPEED;
        }
        if self.vertical_speed > 0.0 || self.position.y > 0.0 {
            self.position.y += self.vertical_speed * dt;
            self.vertical_speed -= GRAVITY * dt;
        }
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.vertical_speed = 0.0;
        }
    }
}

/// Everything the viewer renders
pub struct Viewer {
    pub config: ViewerConfig,
    pub caster: RayCaster,
    pub textures: TextureCache,
    pub level: LevelDef,
    pub player: Player,
    pub effects: ScreenEffects,
    pub fb: Framebuffer,
    time: f32,
}

impl Viewer {
    /// Register the level's static surfaces and place the player at its spawn
    pub fn new(config: ViewerConfig, level: LevelDef, mut textures: TextureCache) -> Self {
        let mut caster = RayCaster::with_settings(config.render);
        level.register(&mut caster, &mut textures);

        let spawn = level.spawn;
        let (w, h) = config.framebuffer_size();
        Self {
            player: Player::new(spawn.position, spawn.pitch, spawn.yaw),
            fb: Framebuffer::new(w, h),
            effects: ScreenEffects::new(),
            config,
            caster,
            textures,
            level,
            time: 0.0,
        }
    }

    pub fn camera(&self) -> CameraPose {
        CameraPose::new(
            self.player.eye(self.config.eye_height),
            self.player.pitch,
            self.player.yaw,
            self.config.fov,
            self.config.view_distance,
        )
    }

    /// Nearest surface straight ahead of the player
    pub fn look_target(&self) -> Option<RayHit> {
        let cam = self.camera();
        self.caster.single_cast(cam.position, cam.pitch, cam.yaw, cam.view_distance)
    }

    /// Advance one frame and render it into `self.fb`
    pub fn frame(&mut self, input: &PlayerInput, dt: f32) -> &Framebuffer {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += dt;
        self.player.update(input, dt, &self.config);
        let cam = self.camera();

        self.caster.clear_lights();
        let glow = LightDesc::point(cam.position)
            .with_intensity(GLOW_INTENSITY)
            .with_color(GLOW_COLOR[0], GLOW_COLOR[1], GLOW_COLOR[2]);
        if let Err(e) = self.caster.add_light(glow) {
            log::debug!("player glow skipped: {}", e);
        }

        if self.player.flashlight {
            // Aim follows yaw horizontally and pitch vertically, unnormalized
            let (sy, cy) = cam.yaw.to_radians().sin_cos();
            let reach = cam.view_distance * FLASHLIGHT_AIM;
            let aim = Vec3::new(cy, cam.pitch.to_radians().sin(), sy) * reach;
            let flashlight = LightDesc::spot(cam.position, cam.position + aim)
                .with_intensity(cam.view_distance)
                .with_color(FLASHLIGHT_COLOR[0], FLASHLIGHT_COLOR[1], FLASHLIGHT_COLOR[2]);
            if let Err(e) = self.caster.add_light(flashlight) {
                log::debug!("flashlight skipped: {}", e);
            }
        }

        for sprite in &self.level.sprites {
            let desc = sprite.surface_toward(cam.position, &mut self.textures);
            if let Err(e) = self.caster.add_surface(desc) {
                log::debug!("sprite {} skipped: {}", sprite.texture, e);
            }
        }

        self.caster.raycast(&mut self.fb, &cam);
        self.effects.apply(&mut self.fb, dt, self.time);
        self.caster.clear_transient_surfaces();

        &self.fb
    }
}
