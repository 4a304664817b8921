use cgmath::{Matrix4, SquareMatrix};

use crate::gfx::{
    camera::camera_utils::CameraManager,
    resources::{
        material::{Material, MaterialId, MaterialLibrary},
        texture::{TextureId, TextureImage, TextureLibrary},
    },
};

use super::{
    light::{Light, LightId},
    object::{Object, ObjectId},
};

/// Parent chains longer than this are treated as cycles and cut.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Main scene containing objects, lights, materials, textures and camera
///
/// Objects and lights are only ever appended, so the ids handed out stay
/// valid for the lifetime of the scene.
pub struct Scene {
    pub camera_manager: CameraManager,
    objects: Vec<Object>,
    lights: Vec<Light>,
    pub materials: MaterialLibrary,
    pub textures: TextureLibrary,
}

impl Scene {
    /// Creates a new scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            lights: Vec::new(),
            materials: MaterialLibrary::new(),
            textures: TextureLibrary::new(),
        }
    }

    /// Per-frame update: advances damped camera motion
    pub fn update(&mut self) {
        self.camera_manager.update();
    }

    pub fn add_object(&mut self, object: Object) -> ObjectId {
        log::debug!("Adding object '{}' to scene", object.name);
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        log::debug!("Adding light '{}' to scene", light.name);
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.add(material)
    }

    pub fn add_texture(&mut self, image: TextureImage) -> TextureId {
        self.textures.add(image)
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.0)
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId(i), o))
    }

    pub fn lights(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights.iter().enumerate().map(|(i, l)| (LightId(i), l))
    }

    /// First object with the given name
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .position(|o| o.name == name)
            .map(ObjectId)
    }

    pub fn find_light(&self, name: &str) -> Option<LightId> {
        self.lights.iter().position(|l| l.name == name).map(LightId)
    }

    /// Direct children of `parent`, in insertion order
    pub fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.objects()
            .filter(|(_, o)| o.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Local matrix composed with every ancestor's.
    pub fn world_matrix(&self, id: ObjectId) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        let mut depth = 0;

        while let Some(object) = current.and_then(|id| self.object(id)) {
            matrix = object.local_matrix() * matrix;
            current = object.parent;
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                log::warn!("Object hierarchy above '{}' is too deep, truncating", object.name);
                break;
            }
        }

        matrix
    }

    /// Visible only if every ancestor is visible too.
    pub fn is_visible(&self, id: ObjectId) -> bool {
        let mut current = Some(id);
        let mut depth = 0;
        while let Some(object) = current.and_then(|id| self.object(id)) {
            if !object.visible {
                return false;
            }
            current = object.parent;
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                break;
            }
        }
        true
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let meshes = self.objects.iter().filter_map(|o| o.mesh.as_ref());
        let (total_vertices, total_triangles) = meshes.fold((0, 0), |(v, t), mesh| {
            (v + mesh.vertex_count(), t + mesh.index_count() / 3)
        });

        SceneStatistics {
            object_count: self.objects.len(),
            light_count: self.lights.len(),
            material_count: self.materials.len(),
            texture_count: self.textures.len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub light_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, OrbitCamera},
        color::Color,
        geometry::generate_cylinder,
        scene::object::Mesh,
    };
    use cgmath::{InnerSpace, Vector3, Vector4, Zero};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.005, 1.0)))
    }

    #[test]
    fn test_ids_are_stable_and_independent() {
        let mut scene = scene();
        let material = scene.add_material(Material::new("white"));
        let mesh = Mesh::from_geometry(&generate_cylinder(1.0, 1.0, 1.0, 8));

        let a = scene.add_object(Object::with_mesh("leg", mesh.clone(), material));
        let b = scene.add_object(Object::with_mesh("leg", mesh, material));
        assert_ne!(a, b);
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.find_object("leg"), Some(a));

        let light = scene.add_light(Light::point("candle", Color::WHITE, 0.0, 8.0));
        scene.light_mut(light).unwrap().intensity = 1.0;
        assert_eq!(scene.light(light).unwrap().intensity, 1.0);
    }

    #[test]
    fn test_world_matrix_follows_parents() {
        let mut scene = scene();
        let root = scene.add_object(Object::new("root").at(Vector3::new(20.0, -2.0, 0.0)));
        let child = scene.add_object(
            Object::new("child")
                .at(Vector3::new(1.0, 0.0, 0.0))
                .child_of(root),
        );

        let origin = scene.world_matrix(child) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.truncate() - Vector3::new(21.0, -2.0, 0.0)).magnitude() < 1e-5);
        assert_eq!(scene.children(root), vec![child]);
    }

    #[test]
    fn test_hidden_parent_hides_children() {
        let mut scene = scene();
        let root = scene.add_object(Object::new("root"));
        let child = scene.add_object(Object::new("child").child_of(root));
        assert!(scene.is_visible(child));

        scene.object_mut(root).unwrap().visible = false;
        assert!(!scene.is_visible(child));
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut scene = scene();
        let a = scene.add_object(Object::new("a"));
        let b = scene.add_object(Object::new("b").child_of(a));
        scene.object_mut(a).unwrap().parent = Some(b);

        let _ = scene.world_matrix(a);
        assert!(scene.is_visible(a));
    }

    #[test]
    fn test_statistics() {
        let mut scene = scene();
        let material = scene.add_material(Material::new("white"));
        let mesh = Mesh::from_geometry(&generate_cylinder(1.0, 1.0, 1.0, 8));
        scene.add_object(Object::with_mesh("leg", mesh, material));
        scene.add_object(Object::new("group"));

        let stats = scene.get_statistics();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.material_count, 1);
        assert_eq!(stats.total_vertices, 6 * 8 + 4);
        assert_eq!(stats.total_triangles, 4 * 8);
    }
}
