//! Materials, textures and GPU resources
//!
//! CPU-side descriptions ([`Material`], [`TextureImage`]) live beside the
//! wgpu objects they are uploaded into.

pub mod global_bindings;
pub mod material;
pub mod texture;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUniform};
pub use material::{Material, MaterialId, MaterialLibrary, Side};
pub use texture::{FsTextureSource, TextureId, TextureImage, TextureLibrary, TextureSource};
pub use texture_resource::TextureResource;
