//! The birthday-cake diorama
//!
//! [`assemble`] builds the whole scene in a fixed order and returns the
//! [`SceneHandles`] the keyboard controls operate on.

pub mod assembler;
pub mod decorations;
pub mod factory;
pub mod handles;

pub use assembler::assemble;
pub use factory::{CandleSlot, PrimitiveFactory};
pub use handles::SceneHandles;

use cgmath::Vector3;

use crate::gfx::color::Color;

/// Where the camera starts and where a reset puts it.
pub const DEFAULT_CAMERA_POSITION: Vector3<f32> = Vector3 {
    x: 16.0,
    y: 12.0,
    z: -8.0,
};

pub const DEFAULT_CAMERA_TARGET: Vector3<f32> = Vector3 {
    x: 0.0,
    y: 0.0,
    z: 0.0,
};

/// Intensity of a switched-on spot or candle light.
pub const ON_INTENSITY: f32 = 1.0;

/// Warm white shared by the ambient and spot lights.
pub const LIGHT_COLOR: Color = Color::hex(0xe8dc8b);
pub const CANDLE_LIGHT_COLOR: Color = Color::hex(0xe65c2c);
pub const TEXT_COLOR: Color = Color::hex(0xd65645);

pub const GREETING: &str = "Happy Birthday";

/// Asset paths relative to the configured asset root.
pub mod paths {
    pub const WOOD_TEXTURE: &str = "textures/wood_texture.jpg";
    pub const WOOD_NORMAL: &str = "textures/wood_normal.png";
    pub const FROSTING_TEXTURE: &str = "textures/frosting_texture.jpg";
    pub const FROSTING_NORMAL: &str = "textures/frosting_normal.png";
    pub const CANDLE_TEXTURE: &str = "textures/candle_texture.jpg";
    /// In box face order: px, nx, py, ny, pz, nz
    pub const SKYBOX_FACES: [&str; 6] = [
        "skyboxes/Vasa/px.jpg",
        "skyboxes/Vasa/nx.jpg",
        "skyboxes/Vasa/py.jpg",
        "skyboxes/Vasa/ny.jpg",
        "skyboxes/Vasa/pz.jpg",
        "skyboxes/Vasa/nz.jpg",
    ];
    pub const FONT: &str = "fonts/helvetiker_bold.typeface.json";
    pub const MODEL: &str = "3dmodel/model.gltf";
}
