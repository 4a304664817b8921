//! # Scene Management Module
//!
//! The scene graph: objects with meshes and materials, lights, and the
//! camera. Everything here is plain CPU data, so scenes can be built and
//! inspected without a GPU.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns objects, lights, materials, textures and the camera
//! - [`Object`] - A mesh with a material list and a local transform
//! - [`Light`] - Ambient, spot or point light
//! - [`Vertex3D`] - Vertex with position, normal and texture coordinates
//!
//! Objects and lights are addressed by [`ObjectId`] and [`LightId`]. Ids are
//! indices into append-only storage and never dangle.

pub mod light;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use light::{Light, LightId, LightKind};
pub use object::{Mesh, Object, ObjectId, Transform};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
