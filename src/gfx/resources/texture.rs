//! Decoded texture images and the capability to load them
//!
//! Textures are decoded on the CPU into RGBA8 and kept in the scene's
//! [`TextureLibrary`]. The renderer uploads each library entry once.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::AssetError;

/// Index of a texture in the [`TextureLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// RGBA8 pixels, rows ordered bottom-up for disk images.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

impl TextureImage {
    pub fn new(label: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Single-pixel texture of one colour.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self::new(label, 1, 1, rgba.to_vec())
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 4
    }
}

/// Resolves a texture path to decoded pixels.
///
/// Paths are relative to whatever root the implementation was created with.
/// Missing files are [`AssetError::NotFound`]; nothing is retried.
pub trait TextureSource {
    fn load(&mut self, path: &str) -> Result<TextureImage, AssetError>;
}

/// Loads textures from a directory tree and caches them by path.
pub struct FsTextureSource {
    root: PathBuf,
    cache: HashMap<String, TextureImage>,
}

impl FsTextureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl TextureSource for FsTextureSource {
    fn load(&mut self, path: &str) -> Result<TextureImage, AssetError> {
        if let Some(image) = self.cache.get(path) {
            return Ok(image.clone());
        }

        let full_path = self.root.join(path);
        let image = decode_image_file(&full_path, path)?;
        log::debug!(
            "Decoded texture {} ({}x{})",
            full_path.display(),
            image.width,
            image.height
        );

        self.cache.insert(path.to_string(), image.clone());
        Ok(image)
    }
}

/// Decodes an image file into bottom-up RGBA8 rows.
///
/// Rows are flipped so that texture coordinate `v = 0` samples the bottom of
/// the picture, the convention every generated mesh uses.
pub fn decode_image_file(path: &Path, label: &str) -> Result<TextureImage, AssetError> {
    let decoded = image::open(path).map_err(|err| match err {
        image::ImageError::IoError(source) => AssetError::from_io(path, source),
        source => AssetError::Image {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let rgba = decoded.flipv().to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureImage::new(label, width, height, rgba.into_raw()))
}

/// Centralized texture storage
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: Vec<TextureImage>,
}

impl TextureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `image`, reusing the existing entry when the same decoded
    /// pixels were added before.
    pub fn add(&mut self, image: TextureImage) -> TextureId {
        if let Some(index) = self
            .textures
            .iter()
            .position(|t| t.label == image.label && Arc::ptr_eq(&t.pixels, &image.pixels))
        {
            return TextureId(index);
        }

        self.textures.push(image);
        TextureId(self.textures.len() - 1)
    }

    pub fn get(&self, id: TextureId) -> Option<&TextureImage> {
        self.textures.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &TextureImage)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, t)| (TextureId(i), t))
    }
}
