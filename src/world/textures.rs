//! Texture cache
//!
//! Textures are loaded once by name (a path relative to the asset root) and
//! shared between surfaces. A missing or unreadable file is replaced by a
//! magenta checkerboard so the renderer only ever sees valid textures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::raycaster::{Color, Texture};

/// Size of the placeholder texture in pixels
const PLACEHOLDER_SIZE: usize = 16;

#[derive(Debug)]
pub struct TextureCache {
    root: PathBuf,
    textures: HashMap<String, Arc<Texture>>,
    placeholder: Arc<Texture>,
}

impl TextureCache {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let mut placeholder = Texture::checkerboard(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, 4, Color::MAGENTA, Color::BLACK);
        placeholder.name = "placeholder".to_string();
        Self {
            root: root.as_ref().to_path_buf(),
            textures: HashMap::new(),
            placeholder: Arc::new(placeholder),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Texture for `name`, loading it on first use
    pub fn get(&mut self, name: &str) -> Arc<Texture> {
        if let Some(tex) = self.textures.get(name) {
            return Arc::clone(tex);
        }

        let path = self.root.join(name);
        let tex = match Texture::from_file(&path) {
            Ok(tex) => {
                log::debug!("loaded texture {} ({}x{})", name, tex.width, tex.height);
                Arc::new(tex)
            }
            Err(e) => {
                log::warn!("using placeholder for texture {}: {}", name, e);
                Arc::clone(&self.placeholder)
            }
        };
        self.textures.insert(name.to_string(), Arc::clone(&tex));
        tex
    }

    /// Register an in-memory texture under `name`, replacing any cached one
    pub fn insert(&mut self, name: &str, texture: Texture) -> Arc<Texture> {
        let tex = Arc::new(texture);
        self.textures.insert(name.to_string(), Arc::clone(&tex));
        tex
    }

    pub fn placeholder(&self) -> Arc<Texture> {
        Arc::clone(&self.placeholder)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// PNG files directly inside `dir` (relative to the root), sorted
    fn png_names(&self, dir: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.root.join(dir)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext.to_ascii_lowercase() == "png")
                    .unwrap_or(false)
            })
            .filter_map(|p| p.file_name().map(|f| f.to_string_lossy().to_string()))
            .map(|file| if dir.is_empty() { file } else { format!("{}/{}", dir.trim_end_matches('/'), file) })
            .collect();
        names.sort();
        names
    }

    /// Load every PNG in `dir` (relative to the root) into the cache.
    /// Returns how many loaded successfully.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn preload_directory(&mut self, dir: &str) -> usize {
        use indicatif::{ProgressBar, ProgressStyle};

        let names = self.png_names(dir);
        let pb = ProgressBar::new(names.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("Loading textures [{bar:30}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("█▓░"));
        }

        let mut loaded = 0;
        for name in names {
            let tex = self.get(&name);
            if Arc::ptr_eq(&tex, &self.placeholder) {
                pb.set_message(format!("Error: {}", name));
            } else {
                pb.set_message(format!("{} ({}x{})", name, tex.width, tex.height));
                loaded += 1;
            }
            pb.inc(1);
        }

        pb.finish_with_message(format!("Loaded {} textures", loaded));
        loaded
    }

    /// Load every PNG in `dir` (WASM - no progress bar)
    #[cfg(target_arch = "wasm32")]
    pub fn preload_directory(&mut self, dir: &str) -> usize {
        let mut loaded = 0;
        for name in self.png_names(dir) {
            let tex = self.get(&name);
            if !Arc::ptr_eq(&tex, &self.placeholder) {
                loaded += 1;
            }
        }
        loaded
    }
}
