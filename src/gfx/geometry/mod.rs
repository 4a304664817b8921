//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the diorama is built from. Layouts follow
//! the three.js conventions so that textures authored for those shapes wrap
//! the same way:
//!
//! - Y is up, shapes are centred on the origin
//! - triangles are counter-clockwise when seen from outside
//! - UV origin is the bottom-left of the image
//!
//! ## Supported Primitives
//!
//! - **Box**: six faces, one material group per face in `px, nx, py, ny, pz, nz` order
//! - **Cylinder**: independent top and bottom radii, capped
//! - **Cone**: a cylinder with a zero top radius
//!
//! ```rust
//! use cake_diorama::gfx::geometry::{generate_box, generate_cylinder};
//!
//! let skybox = generate_box(500.0, 500.0, 500.0);
//! assert_eq!(skybox.groups.len(), 6);
//!
//! let leg = generate_cylinder(1.0, 1.0, 16.0, 64);
//! assert!(leg.triangle_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

/// A range of indices drawn with one entry of an object's material list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    /// First index (into `indices`)
    pub start: u32,
    /// Number of indices
    pub count: u32,
    /// Index into the owning object's material list
    pub material_index: usize,
}

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
    /// Material groups; empty means the whole mesh uses material 0
    pub groups: Vec<GeometryGroup>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices in this geometry
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends one vertex and returns its index.
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn add_group(&mut self, start: u32, count: u32, material_index: usize) {
        self.groups.push(GeometryGroup {
            start,
            count,
            material_index,
        });
    }

    /// Draw ranges, falling back to one range covering every index.
    pub fn draw_groups(&self) -> Vec<GeometryGroup> {
        if self.groups.is_empty() {
            vec![GeometryGroup {
                start: 0,
                count: self.indices.len() as u32,
                material_index: 0,
            }]
        } else {
            self.groups.clone()
        }
    }

    /// Smooth per-vertex normals from the triangle list.
    ///
    /// Used for imported meshes that ship without normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![[0.0f32; 3]; self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let (v0, v1, v2) = (self.vertices[i0], self.vertices[i1], self.vertices[i2]);
            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            // Area weighted: the cross product is left unnormalised
            for &vertex in &[i0, i1, i2] {
                for axis in 0..3 {
                    normals[vertex][axis] += face_normal[axis];
                }
            }
        }

        for normal in normals.iter_mut() {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            if length > 0.0 {
                normal.iter_mut().for_each(|c| *c /= length);
            } else {
                *normal = [0.0, 1.0, 0.0];
            }
        }

        self.normals = normals;
    }

    /// Axis-aligned bounds as `(min, max)`; `None` for empty geometry.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().skip(1).fold((first, first), |(mut min, mut max), v| {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
            (min, max)
        }))
    }

    /// Convert to the interleaved vertex format used by the renderer
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::vertex::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::vertex::Vertex3D;

        let vertices: Vec<Vertex3D> = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> GeometryData {
        let mut data = GeometryData::new();
        data.vertices = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        data.indices = vec![0, 1, 2];
        data
    }

    #[test]
    fn test_computed_normals_follow_winding() {
        let mut data = single_triangle();
        data.compute_vertex_normals();
        for normal in &data.normals {
            assert_eq!(*normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_draw_groups_default_to_whole_mesh() {
        let data = single_triangle();
        let groups = data.draw_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].material_index, 0);
    }

    #[test]
    fn test_bounding_box() {
        let data = single_triangle();
        assert_eq!(
            data.bounding_box(),
            Some(([0.0, 0.0, 0.0], [1.0, 1.0, 0.0]))
        );
        assert_eq!(GeometryData::new().bounding_box(), None);
    }
}
