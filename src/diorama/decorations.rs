//! Objects built from asynchronously loaded assets: the greeting text and
//! the camera model next to the table.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::{
    gfx::{
        geometry::GeometryData,
        resources::{material::Material, texture::TextureId},
        scene::{Mesh, Object, ObjectId, Scene},
    },
    loaders::{ImportedModel, TextOptions},
};

use super::TEXT_COLOR;

pub const TEXT_OPTIONS: TextOptions = TextOptions {
    size: 0.4,
    depth: 0.08,
    curve_segments: 12,
};

pub const TEXT_POSITION: Vector3<f32> = Vector3 {
    x: -0.5,
    y: 9.1,
    z: 2.4,
};

pub fn text_rotation() -> Vector3<f32> {
    Vector3::new(-PI / 8.0, PI / 2.0, 0.4)
}

pub const MODEL_POSITION: Vector3<f32> = Vector3 {
    x: 20.0,
    y: -2.0,
    z: 0.0,
};

pub fn model_rotation() -> Vector3<f32> {
    Vector3::new(0.0, -PI / 2.0, 0.0)
}

/// Places the extruded greeting in front of the cake.
///
/// Returns `None` when the font produced no geometry at all.
pub fn add_greeting(scene: &mut Scene, geometry: &GeometryData) -> Option<ObjectId> {
    if geometry.triangle_count() == 0 {
        log::warn!("Greeting text has no glyphs in this font");
        return None;
    }

    let material = scene.add_material(Material::new("greeting").with_color(TEXT_COLOR));
    let object = Object::with_mesh("greeting", Mesh::from_geometry(geometry), material)
        .shadowed()
        .at(TEXT_POSITION)
        .rotated(text_rotation());

    let id = scene.add_object(object);
    log::info!(
        "Greeting text added ({} triangles)",
        geometry.triangle_count()
    );
    Some(id)
}

/// Inserts the model under a new root object posed beside the table.
///
/// Returns the root's id.
pub fn add_camera_model(scene: &mut Scene, model: ImportedModel) -> ObjectId {
    let root = scene.add_object(
        Object::new(&model.name)
            .at(MODEL_POSITION)
            .rotated(model_rotation()),
    );

    let mut textures: Vec<Option<TextureId>> = vec![None; model.images.len()];
    let ImportedModel { meshes, images, .. } = model;

    for mesh in meshes {
        let map = mesh.base_color_texture.and_then(|index| {
            let image = images.get(index)?;
            Some(*textures[index].get_or_insert_with(|| scene.add_texture(image.clone())))
        });

        let material = scene.add_material(
            Material::new(&mesh.name)
                .with_color(mesh.base_color)
                .with_map(map),
        );
        scene.add_object(
            Object::with_mesh(&mesh.name, Mesh::from_geometry(&mesh.geometry), material)
                .child_of(root),
        );
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OrbitConfig,
        gfx::{
            camera::camera_manager_from_config, color::Color, geometry::generate_box,
            resources::texture::TextureImage,
        },
        diorama::GREETING,
        loaders::{generate_text, Font, ImportedMesh},
    };
    use cgmath::{InnerSpace, Vector4};

    fn scene() -> Scene {
        Scene::new(camera_manager_from_config(
            Vector3::new(16.0, 12.0, -8.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            &OrbitConfig::default(),
        ))
    }

    fn mesh(name: &str, texture: Option<usize>) -> ImportedMesh {
        ImportedMesh {
            name: name.to_string(),
            geometry: generate_box(1.0, 1.0, 1.0),
            base_color: Color::rgb(0.2, 0.2, 0.2),
            base_color_texture: texture,
        }
    }

    #[test]
    fn test_model_children_follow_the_root() {
        let mut scene = scene();
        let model = ImportedModel {
            name: "camera".to_string(),
            meshes: vec![mesh("body", Some(0)), mesh("lens", Some(0)), mesh("strap", None)],
            images: vec![TextureImage::solid("camera#image0", [0, 0, 0, 255])],
        };

        let root = add_camera_model(&mut scene, model);
        let children = scene.children(root);
        assert_eq!(children.len(), 3);
        // Both textured meshes share one texture entry
        assert_eq!(scene.textures.len(), 1);

        let world = scene.world_matrix(children[0]);
        let origin = world * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.truncate() - MODEL_POSITION).magnitude() < 1e-5);

        // Rotated -90 degrees about Y: local +X ends up along world +Z
        let x_axis = world * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((x_axis.truncate() - Vector3::new(0.0, 0.0, 1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_greeting_is_posed_and_coloured() {
        let font = Font::from_json(
            r#"{
                "familyName": "Boxy",
                "resolution": 1000,
                "glyphs": {
                    "H": { "ha": 800, "o": "m 0 0 l 0 1000 l 700 1000 l 700 0" },
                    " ": { "ha": 300 }
                }
            }"#,
        )
        .unwrap();

        let geometry = generate_text(&font, GREETING, &TEXT_OPTIONS);
        let mut scene = scene();
        let id = add_greeting(&mut scene, &geometry).unwrap();
        let text = scene.object(id).unwrap();

        assert_eq!(text.transform.position, TEXT_POSITION);
        assert_eq!(text.transform.rotation, text_rotation());
        assert!(text.cast_shadow && text.receive_shadow);
        let material = scene.materials.get(text.materials[0]).unwrap();
        assert_eq!(material.color, TEXT_COLOR);
    }

    #[test]
    fn test_greeting_without_glyphs_is_skipped() {
        let font =
            Font::from_json(r#"{ "resolution": 1000, "glyphs": {} }"#).unwrap();
        let geometry = generate_text(&font, GREETING, &TEXT_OPTIONS);
        let mut scene = scene();
        assert!(add_greeting(&mut scene, &geometry).is_none());
        assert_eq!(scene.object_count(), 0);
    }
}
