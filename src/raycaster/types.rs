//! Core pixel types for the raycaster

use std::path::Path;

/// Error type for texture decoding
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("texture has zero size ({width}x{height})")]
    Empty { width: usize, height: usize },
}

/// RGBA color, 8 bits per channel
///
/// Alpha 0 marks a hole in a texture: the raycaster looks through it.
/// Any other alpha value is treated as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const MAGENTA: Color = Color { r: 255, g: 0, b: 255, a: 255 };
    /// Transparent color (rays pass through it)
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Check if this color is transparent (should not be hit)
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Multiply each channel by its own factor (lighting), result is opaque
    #[inline]
    pub fn shade_rgb(self, r_shade: f32, g_shade: f32, b_shade: f32) -> Self {
        Self::new(
            (self.r as f32 * r_shade.clamp(0.0, 1.0)) as u8,
            (self.g as f32 * g_shade.clamp(0.0, 1.0)) as u8,
            (self.b as f32 * b_shade.clamp(0.0, 1.0)) as u8,
        )
    }

    /// Interpolate between two colors (RGBA)
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;
        Self {
            r: (self.r as f32 * inv_t + other.r as f32 * t).round() as u8,
            g: (self.g as f32 * inv_t + other.g as f32 * t).round() as u8,
            b: (self.b as f32 * inv_t + other.b as f32 * t).round() as u8,
            a: (self.a as f32 * inv_t + other.a as f32 * t).round() as u8,
        }
    }

    /// Convert to [u8; 4] for framebuffer (RGBA)
    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::rgba(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

/// Texture image (row-major RGBA, row 0 is the top of the image)
///
/// Immutable once loaded; surfaces share it through an `Arc`.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    /// Create a new texture filled with white
    pub fn new(width: usize, height: usize) -> Self {
        Self::new_filled(width, height, Color::WHITE)
    }

    /// Create a new texture filled with a specific color
    pub fn new_filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Build a texture from a raw RGBA byte buffer
    pub fn from_rgba(width: usize, height: usize, bytes: &[u8], name: impl Into<String>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width * height * 4;
        if bytes.len() != expected {
            return Err(TextureError::BufferSize { width, height, expected, actual: bytes.len() });
        }

        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Color::rgba(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self { width, height, pixels, name: name.into() })
    }

    /// Load texture from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_image(img, name)
    }

    /// Load texture from raw encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?;
        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width as usize, height as usize, rgba.as_raw(), name)
    }

    /// Create a checkerboard test texture with square cells of `cell` pixels
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: Color, color2: Color) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Nearest-neighbour sample. `u` runs left to right, `v` top to bottom;
    /// both are clamped to [0, 1].
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::TRANSPARENT;
        }
        let (tx, ty) = self.texel_coords(u, v);
        self.pixels[ty * self.width + tx]
    }

    /// Texel that `sample(u, v)` reads
    #[inline]
    pub fn texel_coords(&self, u: f32, v: f32) -> (usize, usize) {
        // NaN clamps to 0 through the `as` cast
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let tx = ((u * self.width as f32) as usize).min(self.width.saturating_sub(1));
        let ty = ((v * self.height as f32) as usize).min(self.height.saturating_sub(1));
        (tx, ty)
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::TRANSPARENT
        }
    }

    /// Set pixel at x,y coordinates
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_corners() {
        let mut tex = Texture::new_filled(4, 2, Color::BLACK);
        tex.set_pixel(0, 0, Color::RED);
        tex.set_pixel(3, 1, Color::BLUE);

        assert_eq!(tex.sample(0.0, 0.0), Color::RED);
        assert_eq!(tex.sample(1.0, 1.0), Color::BLUE);
        assert_eq!(tex.sample(0.99, 0.99), Color::BLUE);
        // Out-of-range clamps rather than wrapping
        assert_eq!(tex.sample(-3.0, -1.0), Color::RED);
        assert_eq!(tex.sample(f32::NAN, f32::NAN), Color::RED);
    }

    #[test]
    fn test_from_rgba_checks_size() {
        let err = Texture::from_rgba(2, 2, &[0; 15], "bad").unwrap_err();
        assert!(matches!(err, TextureError::BufferSize { expected: 16, actual: 15, .. }));
        assert!(matches!(Texture::from_rgba(0, 2, &[], "empty"), Err(TextureError::Empty { .. })));

        let tex = Texture::from_rgba(1, 1, &[1, 2, 3, 0], "px").unwrap();
        assert!(tex.get_pixel(0, 0).is_transparent());
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let mut img = image::RgbaImage::from_pixel(2, 3, image::Rgba([5, 6, 7, 255]));
        img.put_pixel(1, 2, image::Rgba([0, 0, 0, 0]));
        let mut encoded = std::io::Cursor::new(Vec::new());
        img.write_to(&mut encoded, image::ImageFormat::Png).unwrap();

        let tex = Texture::from_bytes(encoded.get_ref(), "swatch".to_string()).unwrap();
        assert_eq!((tex.width, tex.height), (2, 3));
        assert_eq!(tex.name, "swatch");
        assert_eq!(tex.get_pixel(0, 0), Color::new(5, 6, 7));
        assert!(tex.get_pixel(1, 2).is_transparent());

        assert!(matches!(Texture::from_bytes(b"not an image", "junk".to_string()), Err(TextureError::Decode(_))));
    }

    #[test]
    fn test_color_bytes_roundtrip() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::from_bytes(c.to_bytes()), c);
    }

    #[test]
    fn test_checkerboard_cells() {
        let tex = Texture::checkerboard(8, 8, 4, Color::WHITE, Color::BLACK);
        assert_eq!(tex.get_pixel(0, 0), Color::WHITE);
        assert_eq!(tex.get_pixel(4, 0), Color::BLACK);
        assert_eq!(tex.get_pixel(4, 4), Color::WHITE);
    }

    #[test]
    fn test_shade_rgb_clamps() {
        let c = Color::new(200, 100, 50).shade_rgb(2.0, 0.5, -1.0);
        assert_eq!(c, Color::new(200, 50, 0));
    }
}
