// src/lib.rs
//! Cake Diorama
//!
//! A birthday-cake diorama rendered with wgpu and winit: a wooden table, a
//! two-tier cake with candles, extruded greeting text and an imported camera
//! model inside a skybox. Q toggles the spot light, S the candles, and W or
//! Space put the camera back where it started.

pub mod app;
pub mod config;
pub mod controls;
pub mod diorama;
pub mod error;
pub mod gfx;
pub mod loaders;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::DioramaApp;
pub use config::DioramaConfig;
pub use error::{AssetError, ConfigError, ViewportError};
