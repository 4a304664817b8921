//! glTF model import
//!
//! Every triangle primitive in the default scene becomes one mesh. Node
//! transforms are baked into the vertices relative to the model root, so the
//! meshes keep their arrangement once parented under a single root object.

use std::path::Path;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::{
    error::AssetError,
    gfx::{color::Color, geometry::GeometryData, resources::texture::TextureImage},
};

/// One drawable primitive from the file.
#[derive(Debug, Clone)]
pub struct ImportedMesh {
    pub name: String,
    pub geometry: GeometryData,
    pub base_color: Color,
    /// Index into [`ImportedModel::images`]
    pub base_color_texture: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedModel {
    pub name: String,
    pub meshes: Vec<ImportedMesh>,
    pub images: Vec<TextureImage>,
}

impl ImportedModel {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }
}

/// Imports a `.gltf`/`.glb` file with its buffers and images.
pub fn load_gltf(path: &Path) -> Result<ImportedModel, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let (document, buffers, images) = gltf::import(path).map_err(|source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    })?;

    let label = path.display().to_string();
    let mut model = ImportedModel {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| label.clone()),
        meshes: Vec::new(),
        images: images
            .iter()
            .enumerate()
            .map(|(i, image)| convert_image(&format!("{}#image{}", label, i), image))
            .collect(),
    };

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Err(AssetError::Malformed {
            path: path.to_path_buf(),
            reason: "file contains no scene".to_string(),
        });
    };

    for node in scene.nodes() {
        process_node(&node, &buffers, Matrix4::identity(), &mut model);
    }

    log::info!(
        "Imported {} ({} meshes, {} triangles, {} images)",
        label,
        model.meshes.len(),
        model.triangle_count(),
        model.images.len()
    );
    Ok(model)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: Matrix4<f32>,
    model: &mut ImportedModel,
) {
    let local_transform = Matrix4::from(node.transform().matrix());
    let global_transform = parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .or(node.name())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh{}", mesh.index()));

        for (index, primitive) in mesh.primitives().enumerate() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping {:?} primitive {} of '{}'",
                    primitive.mode(),
                    index,
                    mesh_name
                );
                continue;
            }
            if let Some(imported) =
                process_primitive(&primitive, buffers, global_transform, &mesh_name, index)
            {
                model.meshes.push(imported);
            }
        }
    }

    for child in node.children() {
        process_node(&child, buffers, global_transform, model);
    }
}

fn process_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: Matrix4<f32>,
    mesh_name: &str,
    index: usize,
) -> Option<ImportedMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));

    let Some(positions) = reader.read_positions() else {
        log::warn!("Primitive {} of '{}' has no positions", index, mesh_name);
        return None;
    };

    let mut geometry = GeometryData::new();
    geometry.vertices = positions
        .map(|p| {
            let v = transform * Vector4::new(p[0], p[1], p[2], 1.0);
            [v.x, v.y, v.z]
        })
        .collect();
    if geometry.vertices.is_empty() {
        return None;
    }

    geometry.indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..geometry.vertices.len() as u32).collect(),
    };
    let vertex_count = geometry.vertices.len() as u32;
    if geometry.indices.iter().any(|&i| i >= vertex_count) {
        log::warn!("Primitive {} of '{}' indexes past its vertices", index, mesh_name);
        return None;
    }

    match reader.read_normals() {
        Some(normals) => {
            let normal_matrix = normal_matrix(transform);
            geometry.normals = normals
                .map(|n| {
                    let v = (normal_matrix * Vector3::from(n)).normalize();
                    [v.x, v.y, v.z]
                })
                .collect();
        }
        None => geometry.compute_vertex_normals(),
    }

    geometry.tex_coords = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => vec![[0.0, 0.0]; geometry.vertices.len()],
    };

    let pbr = primitive.material().pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();

    Some(ImportedMesh {
        name: format!("{}/{}", mesh_name, index),
        geometry,
        base_color: Color::rgb(r, g, b),
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
    })
}

fn normal_matrix(transform: Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(
        transform.x.truncate(),
        transform.y.truncate(),
        transform.z.truncate(),
    );
    linear.invert().map(|m| m.transpose()).unwrap_or(linear)
}

/// Expands any 8-bit image layout to RGBA8. glTF images are top row first,
/// which already matches glTF texture coordinates, so rows are not flipped.
fn convert_image(label: &str, image: &gltf::image::Data) -> TextureImage {
    use gltf::image::Format;

    let pixels: Vec<u8> = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("Unsupported image format {:?} in {}, using white", other, label);
            vec![255; image.width as usize * image.height as usize * 4]
        }
    };

    TextureImage::new(label, image.width, image.height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle under a translated child node, buffer embedded as base64.
    /// Positions (0,0,0) (1,0,0) (0,1,0), no normals, no indices.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [
            { "name": "root", "children": [1] },
            { "name": "child", "mesh": 0, "translation": [0.0, 2.0, 0.0] }
        ],
        "meshes": [ { "name": "tri", "primitives": [ { "attributes": { "POSITION": 0 }, "material": 0 } ] } ],
        "materials": [ { "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.5, 0.25, 1.0] } } ],
        "accessors": [ {
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        } ],
        "bufferViews": [ { "buffer": 0, "byteOffset": 0, "byteLength": 36 } ],
        "buffers": [ {
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        } ]
    }"#;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("cake-diorama-model-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_imports_triangle_with_node_transform() {
        let path = write_temp("triangle.gltf", TRIANGLE_GLTF);
        let model = load_gltf(&path).unwrap();

        assert_eq!(model.name, "triangle");
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.geometry.indices, vec![0, 1, 2]);
        assert_eq!(mesh.geometry.vertices[2], [0.0, 3.0, 0.0]);
        assert_eq!(mesh.geometry.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.base_color, Color::rgb(1.0, 0.5, 0.25));
        assert!(mesh.base_color_texture.is_none());
    }

    #[test]
    fn test_missing_model_is_not_found() {
        let err = load_gltf(Path::new("/no/such/model.gltf")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn test_garbage_is_model_error() {
        let path = write_temp("garbage.gltf", "{ not json");
        let err = load_gltf(&path).unwrap_err();
        assert!(matches!(err, AssetError::Model { .. }));
    }

    #[test]
    fn test_rgb_images_gain_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let image = convert_image("rgb", &data);
        assert_eq!(&image.pixels[..], &[10, 20, 30, 255, 40, 50, 60, 255]);
        assert!(image.is_valid());
    }
}
