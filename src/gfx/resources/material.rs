//! Phong material definitions
//!
//! Materials are stored once in the scene's [`MaterialLibrary`] and objects
//! reference them by [`MaterialId`]. Every factory call creates its own
//! material, even when two materials share the same texture.

use crate::gfx::{color::Color, resources::texture::TextureId};

/// Index of a material in the [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    /// Only inward-facing triangles, used for the skybox interior.
    Back,
    Double,
}

/// Blinn-Phong surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub specular: Color,
    pub shininess: f32,
    /// Diffuse colour map, multiplied with `color`.
    pub map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub normal_scale: [f32; 2],
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            color: Color::WHITE,
            specular: Color::hex(0x111111),
            shininess: 30.0,
            map: None,
            normal_map: None,
            normal_scale: [1.0, 1.0],
            side: Side::Front,
        }
    }
}

impl Material {
    /// Creates a default white Phong material
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_map(mut self, map: Option<TextureId>) -> Self {
        self.map = map;
        self
    }

    pub fn with_normal_map(mut self, normal_map: Option<TextureId>) -> Self {
        self.normal_map = normal_map;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        let [r, g, b] = self.color.to_array();
        let [sr, sg, sb] = self.specular.to_array();
        MaterialUniform {
            color: [r, g, b, 1.0],
            specular: [sr, sg, sb, self.shininess.max(1e-4)],
            normal_scale: self.normal_scale,
            use_map: self.map.is_some() as u32,
            use_normal_map: self.normal_map.is_some() as u32,
        }
    }
}

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// rgb specular colour, w = shininess
    pub specular: [f32; 4],
    pub normal_scale: [f32; 2],
    pub use_map: u32,
    pub use_normal_map: u32,
}

/// Centralized material storage
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i), m))
    }
}
