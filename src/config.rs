//! Runtime configuration
//!
//! Every field has a default, so an absent or partial `diorama.json` is fine.
//! The file location can be overridden with the `DIORAMA_CONFIG` environment
//! variable; a file named that way must exist and parse.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{controls::KeyRepeatPolicy, error::ConfigError, gfx::color::Color};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DIORAMA_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "diorama.json";

/// What the primitive factory does when a texture cannot be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTexturePolicy {
    /// Log the failure and build the object without that texture.
    #[default]
    Degrade,
    /// Return the error and insert nothing.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Happy Birthday".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Orbit control tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: 800.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
            pan_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DioramaConfig {
    pub asset_root: PathBuf,
    pub window: WindowConfig,
    pub clear_color: String,
    pub vsync: bool,
    pub key_repeat: KeyRepeatPolicy,
    pub missing_textures: MissingTexturePolicy,
    pub orbit: OrbitConfig,
}

impl Default for DioramaConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            window: WindowConfig::default(),
            clear_color: "#4d2600".to_string(),
            vsync: true,
            key_repeat: KeyRepeatPolicy::default(),
            missing_textures: MissingTexturePolicy::default(),
            orbit: OrbitConfig::default(),
        }
    }
}

impl DioramaConfig {
    /// Resolves the configuration from the environment.
    ///
    /// `DIORAMA_CONFIG` wins, then `diorama.json` in the working directory,
    /// then the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }

        log::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Checks fields whose type alone cannot express validity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.clear_color().map(|_| ())
    }

    pub fn clear_color(&self) -> Result<Color, ConfigError> {
        Color::parse(&self.clear_color)
    }

    /// Resolves an asset path against `asset_root`.
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    /// Initial camera aspect ratio from the configured window size.
    pub fn aspect(&self) -> f32 {
        self.window.width.max(1) as f32 / self.window.height.max(1) as f32
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_key_repeat(mut self, policy: KeyRepeatPolicy) -> Self {
        self.key_repeat = policy;
        self
    }

    pub fn with_missing_textures(mut self, policy: MissingTexturePolicy) -> Self {
        self.missing_textures = policy;
        self
    }
}
