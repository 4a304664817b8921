//! External asset loaders
//!
//! Typeface fonts become extruded text meshes and glTF files become a set of
//! meshes under one root. Both load off the render thread through
//! [`AssetLoader`].

pub mod asset_loader;
pub mod font;
pub mod model;
pub mod text_geometry;
pub mod triangulate;

pub use asset_loader::{AssetLoader, Completion};
pub use font::{Font, Shape};
pub use model::{load_gltf, ImportedMesh, ImportedModel};
pub use text_geometry::{extrude_shapes, generate_text, TextOptions};
