//! nostalgiae viewer
//!
//! Walk around a level with the mouse and WASD.
//! - F: flashlight, Shift: run, Space: jump, E: report what is ahead
//! - 1-5: shake, vignette, fisheye, interference, glitch
//! - 9: everything at once, 0: clear effects

use macroquad::prelude::*;

use nostalgiae::app::{PlayerInput, Viewer};
use nostalgiae::config::{ViewerConfig, CONFIG_FILE};
use nostalgiae::logging::{init_logging, LoggingConfig};
use nostalgiae::raycaster::Framebuffer;
use nostalgiae::world::{load_level, LevelDef, TextureCache};
use nostalgiae::VERSION;

fn window_conf() -> Conf {
    // Read again in main once logging is up; here only the size matters
    let (window_width, window_height) = ViewerConfig::load(CONFIG_FILE)
        .unwrap_or_default()
        .window_size();
    Conf {
        window_title: format!("nostalgiae v{}", VERSION),
        window_width,
        window_height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn key_axis(positive: KeyCode, negative: KeyCode) -> f32 {
    let mut axis = 0.0;
    if is_key_down(positive) {
        axis += 1.0;
    }
    if is_key_down(negative) {
        axis -= 1.0;
    }
    axis
}

fn handle_effect_keys(viewer: &mut Viewer) {
    let fx = &mut viewer.effects;
    if is_key_pressed(KeyCode::Key1) {
        fx.shake = 1.0;
    }
    if is_key_pressed(KeyCode::Key2) {
        fx.vignette = 1.0;
    }
    if is_key_pressed(KeyCode::Key3) {
        fx.fish_eye = 0.5;
    }
    if is_key_pressed(KeyCode::Key4) {
        fx.distortion = 1.0;
    }
    if is_key_pressed(KeyCode::Key5) {
        fx.fried = 0.5;
    }
    if is_key_pressed(KeyCode::Key9) {
        fx.trigger_all(1.0);
    }
    if is_key_pressed(KeyCode::Key0) {
        fx.reset();
    }
}

/// Upscale the framebuffer to the window, keeping its aspect ratio
fn blit(fb: &Framebuffer) {
    let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
    texture.set_filter(FilterMode::Nearest);

    let (sw, sh) = (screen_width(), screen_height());
    let fb_aspect = fb.width as f32 / fb.height as f32;
    let (draw_w, draw_h) = if fb_aspect > sw / sh {
        (sw, sw / fb_aspect)
    } else {
        (sh * fb_aspect, sh)
    };

    draw_texture_ex(
        &texture,
        (sw - draw_w) * 0.5,
        (sh - draw_h) * 0.5,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(draw_w, draw_h)),
            ..Default::default()
        },
    );
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let (config, config_error) = match ViewerConfig::load(CONFIG_FILE) {
        Ok(config) => (config, None),
        Err(e) => (ViewerConfig::default(), Some(e)),
    };
    init_logging(LoggingConfig::with_filter(config.log_filter.as_deref()));
    if let Some(e) = config_error {
        log::warn!("could not read {}: {}; using defaults", CONFIG_FILE, e);
    }

    let level = match load_level(&config.level_path) {
        Ok(level) => level,
        Err(e) => {
            log::error!("could not load level {}: {}", config.level_path, e);
            LevelDef::default()
        }
    };

    let mut textures = TextureCache::new(&config.asset_root);
    textures.preload_directory("textures");
    textures.preload_directory("props");

    let frame_budget = 1.0 / config.target_fps.max(1) as f64;
    let mut viewer = Viewer::new(config, level, textures);

    set_cursor_grab(true);
    show_mouse(false);
    let mut last_mouse = mouse_position();

    loop {
        let frame_start = get_time();
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let mouse = mouse_position();
        let input = PlayerInput {
            forward: key_axis(KeyCode::W, KeyCode::S),
            strafe: key_axis(KeyCode::D, KeyCode::A),
            run: is_key_down(KeyCode::LeftShift),
            jump: is_key_pressed(KeyCode::Space),
            look_dx: mouse.0 - last_mouse.0,
            look_dy: mouse.1 - last_mouse.1,
            toggle_flashlight: is_key_pressed(KeyCode::F),
        };
        last_mouse = mouse;

        handle_effect_keys(&mut viewer);
        if is_key_pressed(KeyCode::E) {
            match viewer.look_target() {
                Some(hit) => log::info!("looking at surface {:?}, {:.2} away", hit.surface, hit.distance),
                None => log::info!("nothing within view distance"),
            }
        }

        clear_background(BLACK);
        let fb = viewer.frame(&input, get_frame_time());
        blit(fb);

        // Hold the configured frame rate on native targets
        #[cfg(not(target_arch = "wasm32"))]
        {
            let elapsed = get_time() - frame_start;
            if elapsed < frame_budget {
                std::thread::sleep(std::time::Duration::from_secs_f64(frame_budget - elapsed));
            }
        }
        #[cfg(target_arch = "wasm32")]
        let _ = (frame_start, frame_budget);

        next_frame().await;
    }
}
