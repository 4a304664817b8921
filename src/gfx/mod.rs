//! # Graphics Module
//!
//! Camera, geometry, scene graph and the wgpu renderer the diorama is drawn
//! with.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped mouse controls
//! - **Geometry** ([`geometry`]) - Box, cylinder and cone generators
//! - **Scene Management** ([`scene`]) - Objects, lights and parent/child transforms
//! - **Resource Management** ([`resources`]) - Materials, textures and GPU uniforms
//! - **Rendering Pipeline** ([`rendering`]) - Blinn-Phong forward pass
//!
//! The scene is plain CPU data; the [`RenderEngine`] mirrors it onto the GPU
//! each frame and draws it.
//!
//! ```no_run
//! use cake_diorama::gfx::{camera::camera_manager_from_config, scene::Scene};
//! use cake_diorama::config::OrbitConfig;
//! use cgmath::Vector3;
//!
//! let camera = camera_manager_from_config(
//!     Vector3::new(16.0, 12.0, -8.0),
//!     Vector3::new(0.0, 0.0, 0.0),
//!     16.0 / 9.0,
//!     &OrbitConfig::default(),
//! );
//! let scene = Scene::new(camera);
//! assert_eq!(scene.object_count(), 0);
//! ```

pub mod camera;
pub mod color;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use color::Color;
pub use rendering::render_engine::RenderEngine;
