//! Error types shared across the crate
//!
//! Asset failures are isolated per object and never abort the whole diorama,
//! viewport failures are fatal, configuration failures stop startup.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve or decode an external asset (texture, font, model).
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed font {}: {source}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to import model {}: {source}", path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("malformed asset {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl AssetError {
    /// Maps an I/O error on `path` to `NotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            AssetError::NotFound { path }
        } else {
            AssetError::Io { path, source }
        }
    }

    /// Path of the asset that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            AssetError::NotFound { path }
            | AssetError::Io { path, .. }
            | AssetError::Image { path, .. }
            | AssetError::Font { path, .. }
            | AssetError::Model { path, .. }
            | AssetError::Malformed { path, .. } => path,
        }
    }
}

/// Failure to create the render target. Nothing can be drawn without one.
#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reported no supported formats")]
    NoSurfaceFormat,

    #[error("render surface ran out of memory")]
    OutOfMemory,
}

/// Failure to read or interpret the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid colour {0:?}, expected #rrggbb")]
    Color(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = AssetError::from_io(
            "textures/wood.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, AssetError::NotFound { .. }));
        assert_eq!(err.path(), std::path::Path::new("textures/wood.jpg"));
    }

    #[test]
    fn test_other_io_errors_are_kept() {
        let err = AssetError::from_io(
            "fonts/a.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("fonts/a.json"));
    }
}
