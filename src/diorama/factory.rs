//! Builders for every static piece of the diorama
//!
//! Each `create_*` call inserts exactly one new object or light into the
//! scene and returns its id. Calling one twice yields two independent
//! objects; only decoded texture pixels are shared.

use cgmath::Vector3;

use crate::{
    config::MissingTexturePolicy,
    error::AssetError,
    gfx::{
        geometry::{generate_box, generate_cone, generate_cylinder, GeometryData},
        resources::{
            material::{Material, MaterialId, Side},
            texture::{TextureId, TextureSource},
        },
        scene::{Light, LightId, Mesh, Object, ObjectId, Scene},
    },
};

use super::{paths, CANDLE_LIGHT_COLOR, LIGHT_COLOR};

/// Horizontal placement of one of the two candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleSlot {
    First,
    Second,
}

impl CandleSlot {
    pub const ALL: [CandleSlot; 2] = [CandleSlot::First, CandleSlot::Second];

    pub fn x(self) -> f32 {
        match self {
            CandleSlot::First => 0.0,
            CandleSlot::Second => 0.3,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            CandleSlot::First => "1",
            CandleSlot::Second => "2",
        }
    }
}

pub struct PrimitiveFactory<'a> {
    scene: &'a mut Scene,
    textures: &'a mut dyn TextureSource,
    policy: MissingTexturePolicy,
}

impl<'a> PrimitiveFactory<'a> {
    pub fn new(
        scene: &'a mut Scene,
        textures: &'a mut dyn TextureSource,
        policy: MissingTexturePolicy,
    ) -> Self {
        Self {
            scene,
            textures,
            policy,
        }
    }

    /// Loads a texture into the scene, or applies the missing-texture policy.
    fn texture(&mut self, path: &str) -> Result<Option<TextureId>, AssetError> {
        match self.textures.load(path) {
            Ok(image) => Ok(Some(self.scene.add_texture(image))),
            Err(err) => match self.policy {
                MissingTexturePolicy::Fail => Err(err),
                MissingTexturePolicy::Degrade => {
                    log::error!("{}; continuing without it", err);
                    Ok(None)
                }
            },
        }
    }

    fn textured_material(
        &mut self,
        name: &str,
        map: &str,
        normal_map: Option<&str>,
    ) -> Result<MaterialId, AssetError> {
        let map = self.texture(map)?;
        let normal_map = match normal_map {
            Some(path) => self.texture(path)?,
            None => None,
        };
        Ok(self.scene.add_material(
            Material::new(name)
                .with_map(map)
                .with_normal_map(normal_map),
        ))
    }

    fn insert_solid(
        &mut self,
        name: &str,
        geometry: &GeometryData,
        material: MaterialId,
        position: Vector3<f32>,
    ) -> ObjectId {
        let object = Object::with_mesh(name, Mesh::from_geometry(geometry), material)
            .shadowed()
            .at(position);
        self.scene.add_object(object)
    }

    fn wood_part(
        &mut self,
        name: &str,
        geometry: GeometryData,
    ) -> Result<ObjectId, AssetError> {
        let material =
            self.textured_material(name, paths::WOOD_TEXTURE, Some(paths::WOOD_NORMAL))?;
        Ok(self.insert_solid(name, &geometry, material, Vector3::new(0.0, 0.0, 0.0)))
    }

    /// Octagonal table top. Positioned by the assembler.
    pub fn create_table_top(&mut self) -> Result<ObjectId, AssetError> {
        self.wood_part("table top", generate_cylinder(12.0, 12.0, 1.2, 8))
    }

    /// Positioned by the assembler.
    pub fn create_table_leg(&mut self) -> Result<ObjectId, AssetError> {
        self.wood_part("table leg", generate_cylinder(1.0, 1.0, 16.0, 64))
    }

    /// Positioned by the assembler.
    pub fn create_table_base(&mut self) -> Result<ObjectId, AssetError> {
        self.wood_part("table base", generate_cylinder(5.0, 5.0, 1.0, 8))
    }

    /// Untextured default white Phong plate.
    pub fn create_plate(&mut self) -> ObjectId {
        let material = self.scene.add_material(Material::new("plate"));
        self.insert_solid(
            "plate",
            &generate_cylinder(7.0, 7.0, 0.5, 64),
            material,
            Vector3::new(0.0, 0.8, 0.6),
        )
    }

    fn cake_tier(&mut self, name: &str, radius: f32, y: f32) -> Result<ObjectId, AssetError> {
        let material = self.textured_material(
            name,
            paths::FROSTING_TEXTURE,
            Some(paths::FROSTING_NORMAL),
        )?;
        Ok(self.insert_solid(
            name,
            &generate_cylinder(radius, radius, 4.0, 64),
            material,
            Vector3::new(0.0, y, 0.5),
        ))
    }

    pub fn create_bottom_cake(&mut self) -> Result<ObjectId, AssetError> {
        self.cake_tier("bottom cake", 5.0, 3.0)
    }

    pub fn create_top_cake(&mut self) -> Result<ObjectId, AssetError> {
        self.cake_tier("top cake", 3.0, 7.0)
    }

    /// Cone on top of a candle body.
    pub fn create_candle_tip(&mut self, slot: CandleSlot) -> Result<ObjectId, AssetError> {
        let name = format!("candle tip {}", slot.suffix());
        let material = self.textured_material(&name, paths::CANDLE_TEXTURE, None)?;
        Ok(self.insert_solid(
            &name,
            &generate_cone(0.05, 0.1, 64),
            material,
            Vector3::new(slot.x(), 9.5, 0.6),
        ))
    }

    pub fn create_candle_body(&mut self, slot: CandleSlot) -> Result<ObjectId, AssetError> {
        let name = format!("candle body {}", slot.suffix());
        let material = self.textured_material(&name, paths::CANDLE_TEXTURE, None)?;
        Ok(self.insert_solid(
            &name,
            &generate_cylinder(0.05, 0.05, 0.5, 64),
            material,
            Vector3::new(slot.x(), 9.2, 0.6),
        ))
    }

    /// Point light just above a candle, created off.
    pub fn create_candle_light(&mut self, slot: CandleSlot) -> LightId {
        let light = Light::point(
            &format!("candle light {}", slot.suffix()),
            CANDLE_LIGHT_COLOR,
            0.0,
            8.0,
        )
        .with_position(Vector3::new(slot.x(), 9.6, 0.6));
        self.scene.add_light(light)
    }

    /// Hard-edged spot light aimed at the origin, created off.
    pub fn create_spot_light(&mut self) -> LightId {
        let light = Light::spot(
            "spot light",
            LIGHT_COLOR,
            0.0,
            1000.0,
            std::f32::consts::PI / 8.0,
        )
        .with_position(Vector3::new(20.0, 30.0, 0.0));
        self.scene.add_light(light)
    }

    /// Always-on fill light.
    pub fn create_ambient_light(&mut self) -> LightId {
        self.scene
            .add_light(Light::ambient("ambient light", LIGHT_COLOR, 0.3))
    }

    /// Inward-facing cube with one image per face.
    pub fn create_skybox(&mut self) -> Result<ObjectId, AssetError> {
        let mut maps = Vec::with_capacity(paths::SKYBOX_FACES.len());
        for path in paths::SKYBOX_FACES {
            maps.push(self.texture(path)?);
        }

        let materials = ["px", "nx", "py", "ny", "pz", "nz"]
            .iter()
            .zip(maps)
            .map(|(face, map)| {
                self.scene.add_material(
                    Material::new(&format!("skybox {}", face))
                        .with_map(map)
                        .with_side(Side::Back),
                )
            })
            .collect();

        let mesh = Mesh::from_geometry(&generate_box(500.0, 500.0, 500.0));
        Ok(self
            .scene
            .add_object(Object::with_materials("skybox", mesh, materials)))
    }
}
