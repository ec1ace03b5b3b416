//! Viewer configuration (`nostalgiae.ron`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::raycaster::{RenderSettings, BASE_HEIGHT, BASE_WIDTH};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "nostalgiae.ron";

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Everything the viewer reads at startup. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window size as a multiple of the framebuffer size
    pub window_scale: u32,
    /// Internal resolution multiplier on 128x72
    pub quality: u32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub view_distance: f32,
    pub target_fps: u32,
    /// Degrees of turn per pixel of mouse motion
    pub mouse_sensitivity: f32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub eye_height: f32,
    pub level_path: String,
    /// Directory texture names in the level are relative to
    pub asset_root: String,
    /// `env_logger` filter; `RUST_LOG` is used when unset
    pub log_filter: Option<String>,
    pub render: RenderSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_scale: 8,
            quality: 1,
            fov: 70.0,
            view_distance: 7.0,
            target_fps: 30,
            mouse_sensitivity: 0.15,
            walk_speed: 0.9,
            run_speed: 1.6,
            eye_height: 1.3,
            level_path: "assets/levels/bedroom.ron".to_string(),
            asset_root: "assets".to_string(),
            log_filter: None,
            render: RenderSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Load from `path`; a missing file gives the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config.sanitized())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        let contents = ron::ser::to_string_pretty(self, pretty).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Copy with values the viewer cannot use pulled back into range
    pub fn sanitized(&self) -> Self {
        let mut c = self.clone();
        c.window_scale = c.window_scale.clamp(1, 16);
        c.quality = c.quality.clamp(1, 8);
        c.target_fps = c.target_fps.clamp(1, 240);
        c
    }

    /// Internal framebuffer size
    pub fn framebuffer_size(&self) -> (usize, usize) {
        let q = self.quality.max(1) as usize;
        (BASE_WIDTH * q, BASE_HEIGHT * q)
    }

    /// Window size in pixels
    pub fn window_size(&self) -> (i32, i32) {
        let (w, h) = self.framebuffer_size();
        let scale = self.window_scale.max(1) as usize / self.quality.max(1) as usize;
        let scale = scale.max(1);
        ((w * scale) as i32, (h * scale) as i32)
    }
}
