use cgmath::Vector3;

use crate::{
    config::DioramaConfig,
    error::AssetError,
    gfx::{resources::texture::TextureSource, scene::Scene},
    loaders::AssetLoader,
};

use super::{
    decorations::{add_camera_model, add_greeting, TEXT_OPTIONS},
    factory::{CandleSlot, PrimitiveFactory},
    paths, SceneHandles, DEFAULT_CAMERA_POSITION, GREETING,
};

/// Builds the diorama into `scene`.
///
/// Lights and primitives are created first, then the text and model loads
/// are started without waiting for them, then the table parts and camera are
/// posed. The loads finish later through `loader`; a failed load only logs.
///
/// # Errors
/// Only under [`MissingTexturePolicy::Fail`](crate::config::MissingTexturePolicy::Fail),
/// for the first texture that cannot be loaded.
pub fn assemble(
    scene: &mut Scene,
    textures: &mut dyn TextureSource,
    loader: &mut AssetLoader,
    config: &DioramaConfig,
) -> Result<SceneHandles, AssetError> {
    let mut factory = PrimitiveFactory::new(scene, textures, config.missing_textures);

    factory.create_ambient_light();
    let spot_light = factory.create_spot_light();

    let table_top = factory.create_table_top()?;
    let table_leg = factory.create_table_leg()?;
    let table_base = factory.create_table_base()?;

    factory.create_plate();
    factory.create_top_cake()?;
    factory.create_bottom_cake()?;

    let mut candle_lights = Vec::with_capacity(CandleSlot::ALL.len());
    for slot in CandleSlot::ALL {
        factory.create_candle_tip(slot)?;
        factory.create_candle_body(slot)?;
        candle_lights.push(factory.create_candle_light(slot));
    }
    let candle_lights = [candle_lights[0], candle_lights[1]];

    loader.load_text(paths::FONT, GREETING, TEXT_OPTIONS, |scene, result| match result {
        Ok(geometry) => {
            add_greeting(scene, &geometry);
        }
        Err(err) => log::error!("Greeting text unavailable: {}", err),
    });
    loader.load_model(paths::MODEL, |scene, result| match result {
        Ok(model) => {
            let root = add_camera_model(scene, model);
            log::info!("Camera model added with {} parts", scene.children(root).len());
        }
        Err(err) => log::error!("Camera model unavailable: {}", err),
    });

    factory.create_skybox()?;

    for (id, position) in [
        (table_top, Vector3::new(0.0, 0.0, 0.0)),
        (table_leg, Vector3::new(0.0, -8.0, 0.5)),
        (table_base, Vector3::new(0.0, -16.0, 0.5)),
    ] {
        if let Some(object) = scene.object_mut(id) {
            object.set_position(position);
        }
    }

    scene.camera_manager.reset_position(DEFAULT_CAMERA_POSITION);

    log::info!(
        "Diorama assembled: {} objects, {} lights, {} asset loads pending",
        scene.object_count(),
        scene.light_count(),
        loader.in_flight()
    );

    Ok(SceneHandles {
        spot_light,
        candle_lights,
        table_top,
        table_leg,
        table_base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MissingTexturePolicy,
        gfx::{camera::camera_manager_from_config, resources::texture::FsTextureSource},
    };

    fn scene(config: &DioramaConfig) -> Scene {
        Scene::new(camera_manager_from_config(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(0.0, 0.0, 0.0),
            config.aspect(),
            &config.orbit,
        ))
    }

    #[test]
    fn test_table_parts_are_posed() {
        let config = DioramaConfig::default().with_asset_root("/definitely/not/assets");
        let mut scene = scene(&config);
        let mut textures = FsTextureSource::new(&config.asset_root);
        let mut loader = AssetLoader::new(&config.asset_root);

        let handles = assemble(&mut scene, &mut textures, &mut loader, &config).unwrap();

        let position = |id| scene.object(id).unwrap().transform.position;
        assert_eq!(position(handles.table_top), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(position(handles.table_leg), Vector3::new(0.0, -8.0, 0.5));
        assert_eq!(position(handles.table_base), Vector3::new(0.0, -16.0, 0.5));
        assert_eq!(scene.camera_manager.camera.position(), DEFAULT_CAMERA_POSITION);

        loader.wait_idle(&mut scene);
    }

    #[test]
    fn test_fail_policy_stops_at_first_missing_texture() {
        let config = DioramaConfig::default()
            .with_asset_root("/definitely/not/assets")
            .with_missing_textures(MissingTexturePolicy::Fail);
        let mut scene = scene(&config);
        let mut textures = FsTextureSource::new(&config.asset_root);
        let mut loader = AssetLoader::new(&config.asset_root);

        let err = assemble(&mut scene, &mut textures, &mut loader, &config).unwrap_err();
        assert!(err.path().ends_with(paths::WOOD_TEXTURE));
        assert_eq!(loader.in_flight(), 0);
    }
}
