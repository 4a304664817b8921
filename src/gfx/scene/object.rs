use cgmath::{Matrix4, Rad, Vector3, Zero};

use super::vertex::Vertex3D;
use crate::gfx::{
    geometry::{GeometryData, GeometryGroup},
    resources::material::MaterialId,
};

/// Index of an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// CPU-side triangle mesh. GPU buffers live in the renderer.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Draw ranges and the material slot each one uses
    pub groups: Vec<GeometryGroup>,
}

impl Mesh {
    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self {
            vertices,
            indices,
            groups: geometry.draw_groups(),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Local transform: translation, Euler rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// `T * Rx * Ry * Rz * S`
    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        Matrix4::from_translation(self.position)
            * rotation
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// A node of the scene graph: a mesh with materials, or an empty group.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: String,
    pub mesh: Option<Mesh>,
    /// Material list indexed by the mesh's draw groups
    pub materials: Vec<MaterialId>,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
}

impl Object {
    /// Create a new empty Object with identity transformation
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mesh: None,
            materials: Vec::new(),
            transform: Transform::default(),
            parent: None,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
        }
    }

    /// Mesh object drawn entirely with one material.
    pub fn with_mesh(name: &str, mesh: Mesh, material: MaterialId) -> Self {
        Self::with_materials(name, mesh, vec![material])
    }

    pub fn with_materials(name: &str, mesh: Mesh, materials: Vec<MaterialId>) -> Self {
        Self {
            mesh: Some(mesh),
            materials,
            ..Self::new(name)
        }
    }

    /// Enables both shadow flags.
    pub fn shadowed(mut self) -> Self {
        self.cast_shadow = true;
        self.receive_shadow = true;
        self
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vector3<f32>) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn child_of(mut self, parent: ObjectId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.transform.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.transform.rotation = rotation;
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix()
    }

    /// Material for a draw group, falling back to the first entry.
    pub fn material_for(&self, group: &GeometryGroup) -> Option<MaterialId> {
        self.materials
            .get(group.material_index)
            .or_else(|| self.materials.first())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    fn apply(matrix: Matrix4<f32>, point: Vector3<f32>) -> Vector3<f32> {
        let v = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
        Vector3::new(v.x, v.y, v.z)
    }

    #[test]
    fn test_transform_translates_after_rotating() {
        let transform = Transform {
            position: Vector3::new(20.0, -2.0, 0.0),
            rotation: Vector3::new(0.0, -std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        // -90 degrees about Y maps +X onto +Z
        let p = apply(transform.matrix(), Vector3::new(1.0, 0.0, 0.0));
        assert!((p - Vector3::new(20.0, -2.0, 1.0)).magnitude2() < 1e-8);
    }

    #[test]
    fn test_euler_order_is_xyz() {
        let transform = Transform {
            rotation: Vector3::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        // Ry first moves +Z onto +X, then Rx leaves it in place
        let p = apply(transform.matrix(), Vector3::new(0.0, 0.0, 1.0));
        assert!((p - Vector3::new(1.0, 0.0, 0.0)).magnitude2() < 1e-8);
    }

    #[test]
    fn test_material_fallback_for_unlisted_group() {
        let geometry = crate::gfx::geometry::generate_box(1.0, 1.0, 1.0);
        let object = Object::with_mesh("box", Mesh::from_geometry(&geometry), MaterialId(7));
        let mesh = object.mesh.as_ref().unwrap();
        assert_eq!(mesh.groups.len(), 6);
        assert_eq!(object.material_for(&mesh.groups[5]), Some(MaterialId(7)));
        assert!(Object::new("empty").material_for(&mesh.groups[0]).is_none());
        assert_eq!(object.transform.position, Vector3::zero());
    }
}
