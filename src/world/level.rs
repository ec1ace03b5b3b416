//! Level loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable level files.
//! Supports both compressed (brotli) and uncompressed RON files.
//! - Reading: Auto-detects format by checking for valid RON start
//! - Writing: plain RON by default, brotli with `save_level_compressed`

use std::fs;
use std::io::Cursor;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{billboard_toward, TextureCache};
use crate::raycaster::{CameraPose, RayCaster, SurfaceDesc, SurfaceShape, Vec3};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of surfaces in a level
    pub const MAX_SURFACES: usize = 65_536;
    /// Maximum string length for texture names
    pub const MAX_STRING_LEN: usize = 256;
    /// Maximum coordinate value (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
}

/// Error type for level loading
#[derive(thiserror::Error, Debug)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// How the corners of a [`SurfaceDef`] are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// `a` top-left, `b` bottom-right, optional `c` the corner under `a`
    #[default]
    Rect,
    /// `a`, `b`, `c`
    Triangle,
    /// `a`, `b`, `c`, `d` around the perimeter
    Quad,
}

/// One textured surface in a level file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDef {
    /// Texture path relative to the asset root
    pub texture: String,
    #[serde(default)]
    pub shape: SurfaceKind,
    pub a: Vec3,
    pub b: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Vec3>,
    #[serde(default)]
    pub remove_after_frame: bool,
}

impl SurfaceDef {
    pub fn rect(texture: &str, top_left: Vec3, bottom_right: Vec3) -> Self {
        Self {
            texture: texture.to_string(),
            shape: SurfaceKind::Rect,
            a: top_left,
            b: bottom_right,
            c: None,
            d: None,
            remove_after_frame: false,
        }
    }

    /// Rect with an explicit third corner (floors, ceilings, tabletops)
    pub fn rect_with_corner(texture: &str, top_left: Vec3, bottom_right: Vec3, corner: Vec3) -> Self {
        Self { c: Some(corner), ..Self::rect(texture, top_left, bottom_right) }
    }

    /// Corner layout; fails when a corner the kind needs is missing
    pub fn to_shape(&self) -> Result<SurfaceShape, String> {
        match self.shape {
            SurfaceKind::Rect => Ok(match self.c {
                Some(corner) => SurfaceShape::rect_with_corner(self.a, self.b, corner),
                None => SurfaceShape::rect(self.a, self.b),
            }),
            SurfaceKind::Triangle => {
                let c = self.c.ok_or("triangle is missing corner c")?;
                Ok(SurfaceShape::Triangle { a: self.a, b: self.b, c })
            }
            SurfaceKind::Quad => {
                let c = self.c.ok_or("quad is missing corner c")?;
                let d = self.d.ok_or("quad is missing corner d")?;
                Ok(SurfaceShape::Quad { a: self.a, b: self.b, c, d })
            }
        }
    }

    fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        [Some(self.a), Some(self.b), self.c, self.d].into_iter().flatten()
    }
}

/// A camera-facing sprite, rebuilt every frame as a transient surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteDef {
    pub texture: String,
    /// Centre of the sprite
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
}

impl SpriteDef {
    /// Surface for this frame, facing `viewer`
    pub fn surface_toward(&self, viewer: Vec3, textures: &mut TextureCache) -> SurfaceDesc {
        let shape = billboard_toward(self.position, self.width, self.height, viewer);
        SurfaceDesc::new(textures.get(&self.texture), shape).transient()
    }
}

/// Where the player starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnDef {
    /// Feet position
    pub position: Vec3,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default = "default_spawn_yaw")]
    pub yaw: f32,
}

fn default_spawn_yaw() -> f32 {
    90.0
}

impl Default for SpawnDef {
    fn default() -> Self {
        Self { position: Vec3::ZERO, pitch: 0.0, yaw: default_spawn_yaw() }
    }
}

impl SpawnDef {
    /// Camera pose at this spawn, eyes `eye_height` above the feet
    pub fn camera(&self, eye_height: f32, fov: f32, view_distance: f32) -> CameraPose {
        let eye = self.position + Vec3::UP * eye_height;
        CameraPose::new(eye, self.pitch, self.yaw, fov, view_distance)
    }
}

/// A level: static surfaces and a spawn point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    #[serde(default)]
    pub spawn: SpawnDef,
    #[serde(default)]
    pub surfaces: Vec<SurfaceDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sprites: Vec<SpriteDef>,
}

impl LevelDef {
    /// Add every surface to `caster`, skipping degenerate ones.
    /// Returns how many were registered.
    pub fn register(&self, caster: &mut RayCaster, textures: &mut TextureCache) -> usize {
        let mut added = 0;
        for (i, def) in self.surfaces.iter().enumerate() {
            let shape = match def.to_shape() {
                Ok(shape) => shape,
                Err(e) => {
                    log::warn!("level {}: skipping surface {}: {}", self.name, i, e);
                    continue;
                }
            };
            let desc = SurfaceDesc {
                texture: textures.get(&def.texture),
                shape,
                remove_after_frame: def.remove_after_frame,
            };
            match caster.add_surface(desc) {
                Ok(_) => added += 1,
                Err(e) => {
                    log::warn!("level {}: skipping surface {} ({}): {}", self.name, i, def.texture, e);
                }
            }
        }
        log::info!("level {}: registered {}/{} surfaces", self.name, added, self.surfaces.len());
        added
    }
}

fn validate_coord(p: Vec3, context: &str) -> Result<(), String> {
    for v in [p.x, p.y, p.z] {
        if !v.is_finite() {
            return Err(format!("{}: non-finite coordinate", context));
        }
        if v.abs() > limits::MAX_COORD {
            return Err(format!("{}: coordinate {} out of range", context, v));
        }
    }
    Ok(())
}

fn validate_surface(def: &SurfaceDef, idx: usize) -> Result<(), String> {
    let context = format!("surface {}", idx);
    if def.texture.len() > limits::MAX_STRING_LEN {
        return Err(format!("{}: texture name too long ({} > {})", context, def.texture.len(), limits::MAX_STRING_LEN));
    }
    for p in def.points() {
        validate_coord(p, &context)?;
    }
    def.to_shape().map_err(|e| format!("{}: {}", context, e))?;
    Ok(())
}

/// Validate level data to prevent malicious files
pub fn validate_level(level: &LevelDef) -> Result<(), LevelError> {
    if level.surfaces.len() > limits::MAX_SURFACES {
        return Err(LevelError::Validation(format!(
            "too many surfaces ({} > {})", level.surfaces.len(), limits::MAX_SURFACES
        )));
    }
    if level.name.len() > limits::MAX_STRING_LEN {
        return Err(LevelError::Validation("level name too long".to_string()));
    }
    validate_coord(level.spawn.position, "spawn").map_err(LevelError::Validation)?;

    for (i, def) in level.surfaces.iter().enumerate() {
        validate_surface(def, i).map_err(LevelError::Validation)?;
    }
    if level.sprites.len() > limits::MAX_SURFACES {
        return Err(LevelError::Validation("too many sprites".to_string()));
    }
    for (i, sprite) in level.sprites.iter().enumerate() {
        let context = format!("sprite {}", i);
        validate_coord(sprite.position, &context).map_err(LevelError::Validation)?;
        if sprite.texture.len() > limits::MAX_STRING_LEN {
            return Err(LevelError::Validation(format!("{}: texture name too long", context)));
        }
        if !(sprite.width.is_finite() && sprite.height.is_finite()) {
            return Err(LevelError::Validation(format!("{}: non-finite size", context)));
        }
    }
    Ok(())
}

/// Parse level bytes, plain or brotli-compressed RON
pub fn parse_level_data(bytes: &[u8]) -> Result<LevelDef, LevelError> {
    // Detect format: RON files start with '(' or whitespace, brotli is binary
    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' || b == b'/')
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid UTF-8: {}", e))
        })?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("brotli decompression failed: {}", e))
        })?;
        String::from_utf8(decompressed).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid UTF-8 after decompression: {}", e))
        })?
    };

    load_level_from_str(&contents)
}

/// Load a level from a RON string (for embedded levels or testing)
pub fn load_level_from_str(s: &str) -> Result<LevelDef, LevelError> {
    let level: LevelDef = ron::from_str(s).map_err(|e| {
        log::error!("RON parse error at line {}, column {}: {}", e.position.line, e.position.col, e.code);
        e
    })?;
    validate_level(&level)?;
    Ok(level)
}

/// Load a level from a RON file (supports both compressed and uncompressed)
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<LevelDef, LevelError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let level = parse_level_data(&bytes)?;
    log::info!("loaded level {} from {} ({} surfaces)", level.name, path.display(), level.surfaces.len());
    Ok(level)
}

fn to_pretty_ron(level: &LevelDef) -> Result<String, LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(level, config)?)
}

/// Save a level as plain RON
pub fn save_level<P: AsRef<Path>>(level: &LevelDef, path: P) -> Result<(), LevelError> {
    fs::write(path, to_pretty_ron(level)?)?;
    Ok(())
}

/// Save a level as brotli-compressed RON
pub fn save_level_compressed<P: AsRef<Path>>(level: &LevelDef, path: P) -> Result<(), LevelError> {
    let ron_string = to_pretty_ron(level)?;

    // Compress with brotli (quality 6, window 22 - good balance of speed/ratio)
    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut Cursor::new(ron_string.as_bytes()), &mut compressed, &brotli::enc::BrotliEncoderParams {
        quality: 6,
        lgwin: 22,
        ..Default::default()
    }).map_err(|e| std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("brotli compression failed: {}", e)
    ))?;

    fs::write(path, compressed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycaster::{Color, Texture};

    fn sample_level() -> LevelDef {
        LevelDef {
            name: "box".to_string(),
            spawn: SpawnDef::default(),
            surfaces: vec![
                SurfaceDef::rect("wall.png", Vec3::new(-1.0, 2.0, 2.0), Vec3::new(1.0, 0.0, 2.0)),
                SurfaceDef::rect_with_corner(
                    "floor.png",
                    Vec3::new(1.0, 0.0, -1.0),
                    Vec3::new(-1.0, 0.0, 1.0),
                    Vec3::new(1.0, 0.0, 1.0),
                ),
            ],
            sprites: vec![SpriteDef {
                texture: "ghost.png".to_string(),
                position: Vec3::new(0.0, 1.0, 1.5),
                width: 0.6,
                height: 1.2,
            }],
        }
    }

    #[test]
    fn test_save_and_load_plain_and_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let level = sample_level();

        let plain = dir.path().join("box.ron");
        save_level(&level, &plain).unwrap();
        assert_eq!(load_level(&plain).unwrap(), level);

        let packed = dir.path().join("box.ron.br");
        save_level_compressed(&level, &packed).unwrap();
        assert_eq!(load_level(&packed).unwrap(), level);
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let level = load_level_from_str(
            "(name: \"tiny\", surfaces: [(texture: \"t.png\", a: (x: 0.0, y: 1.0, z: 1.0), b: (x: 1.0, y: 0.0, z: 1.0))])",
        )
        .unwrap();
        assert_eq!(level.spawn.yaw, 90.0);
        assert_eq!(level.surfaces[0].shape, SurfaceKind::Rect);
        assert!(!level.surfaces[0].remove_after_frame);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let mut level = sample_level();
        level.surfaces[0].a.x = 2.0e7;
        assert!(matches!(validate_level(&level), Err(LevelError::Validation(_))));

        let mut level = sample_level();
        level.surfaces[1].texture = "x".repeat(limits::MAX_STRING_LEN + 1);
        assert!(matches!(validate_level(&level), Err(LevelError::Validation(_))));

        let mut level = sample_level();
        level.surfaces[0].shape = SurfaceKind::Quad;
        assert!(matches!(validate_level(&level), Err(LevelError::Validation(_))));

        assert!(matches!(load_level_from_str("(name: "), Err(LevelError::Parse(_))));
    }

    #[test]
    fn test_register_skips_degenerate() {
        let mut level = sample_level();
        // Zero-height wall
        level.surfaces.push(SurfaceDef::rect("wall.png", Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 3.0)));

        let mut cache = TextureCache::new("unused");
        cache.insert("wall.png", Texture::new_filled(2, 2, Color::WHITE));
        cache.insert("floor.png", Texture::new_filled(2, 2, Color::WHITE));
        let mut caster = RayCaster::new();

        assert_eq!(level.register(&mut caster, &mut cache), 2);
        assert_eq!(caster.surfaces().len(), 2);
    }

    #[test]
    fn test_sprite_surface_is_transient() {
        let level = sample_level();
        let mut cache = TextureCache::new("unused");
        let mut caster = RayCaster::new();
        let desc = level.sprites[0].surface_toward(Vec3::new(0.0, 1.3, -2.0), &mut cache);
        assert!(desc.remove_after_frame);
        caster.add_surface(desc).unwrap();
        assert_eq!(caster.clear_transient_surfaces(), 1);
    }

    #[test]
    fn test_spawn_camera_eye_height() {
        let spawn = SpawnDef { position: Vec3::new(1.0, 0.0, 2.0), pitch: 5.0, yaw: 45.0 };
        let cam = spawn.camera(1.3, 70.0, 7.0);
        assert_eq!(cam.position, Vec3::new(1.0, 1.3, 2.0));
        assert_eq!(cam.yaw, 45.0);
    }
}
