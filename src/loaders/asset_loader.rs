//! Background asset loading
//!
//! Fonts and models are read and parsed on worker threads, and text is
//! triangulated and extruded there too. The worker never
//! sees the scene: it sends a completion back over a channel and the render
//! thread applies it in [`AssetLoader::poll`], between frames.

use std::path::{Path, PathBuf};

use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    FutureExt, StreamExt,
};

use crate::{
    error::AssetError,
    gfx::{geometry::GeometryData, scene::Scene},
};

use super::{
    font::Font,
    model::ImportedModel,
    text_geometry::{generate_text, TextOptions},
};

/// Work to run on the render thread once a load has finished.
pub type Completion = Box<dyn FnOnce(&mut Scene) + Send>;

pub struct AssetLoader {
    root: PathBuf,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl AssetLoader {
    /// Paths given to the `load_*` methods are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            root: root.into(),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads a typeface font and extrudes `text` with it, all in the
    /// background. The completion only receives the finished geometry.
    pub fn load_text<F>(
        &mut self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
        options: TextOptions,
        on_complete: F,
    ) where
        F: FnOnce(&mut Scene, Result<GeometryData, AssetError>) + Send + 'static,
    {
        let text = text.into();
        let build = move |path: &Path| -> Result<GeometryData, AssetError> {
            let font = Font::load(path)?;
            let geometry = generate_text(&font, &text, &options);
            log::debug!(
                "Extruded {:?} with '{}': {} triangles",
                text,
                font.family_name,
                geometry.triangle_count()
            );
            Ok(geometry)
        };
        self.spawn("text", path.as_ref(), build, on_complete);
    }

    /// Loads a glTF model in the background.
    pub fn load_model<F>(&mut self, path: impl AsRef<Path>, on_complete: F)
    where
        F: FnOnce(&mut Scene, Result<ImportedModel, AssetError>) + Send + 'static,
    {
        self.spawn("model", path.as_ref(), super::model::load_gltf, on_complete);
    }

    fn spawn<T, L, F>(&mut self, kind: &str, path: &Path, load: L, on_complete: F)
    where
        T: Send + 'static,
        L: FnOnce(&Path) -> Result<T, AssetError> + Send + 'static,
        F: FnOnce(&mut Scene, Result<T, AssetError>) + Send + 'static,
    {
        let full_path = self.root.join(path);
        let sender = self.sender.clone();
        log::debug!("Loading {} {}", kind, full_path.display());

        let spawned = std::thread::Builder::new()
            .name(format!("{}-loader", kind))
            .spawn(move || {
                let result = load(&full_path);
                let completion: Completion = Box::new(move |scene| on_complete(scene, result));
                // The receiver lives as long as the loader; a send only fails
                // after the application has shut down.
                let _ = sender.unbounded_send(completion);
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => log::error!("Failed to start {} loader thread: {}", kind, e),
        }
    }

    /// Applies every completion that is ready, without blocking.
    ///
    /// Returns how many were applied.
    pub fn poll(&mut self, scene: &mut Scene) -> usize {
        let mut applied = 0;
        while self.in_flight > 0 {
            match self.receiver.next().now_or_never() {
                Some(Some(completion)) => {
                    completion(scene);
                    self.in_flight -= 1;
                    applied += 1;
                }
                _ => break,
            }
        }
        applied
    }

    /// Blocks until every pending load has been applied.
    pub fn wait_idle(&mut self, scene: &mut Scene) {
        while self.in_flight > 0 {
            match futures::executor::block_on(self.receiver.next()) {
                Some(completion) => {
                    completion(scene);
                    self.in_flight -= 1;
                }
                None => break,
            }
        }
    }

    /// Loads started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::OrbitConfig, gfx::camera::camera_manager_from_config};
    use cgmath::Vector3;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    fn scene() -> Scene {
        Scene::new(camera_manager_from_config(
            Vector3::new(16.0, 12.0, -8.0),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            &OrbitConfig::default(),
        ))
    }

    #[test]
    fn test_missing_font_reports_not_found_on_render_thread() {
        let mut loader = AssetLoader::new("/definitely/not/a/dir");
        let mut scene = scene();
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let font = "fonts/helvetiker_bold.typeface.json";
        loader.load_text(font, "Hi", TextOptions::default(), move |_, result| {
            assert!(matches!(result, Err(AssetError::NotFound { .. })));
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(loader.in_flight(), 1);

        loader.wait_idle(&mut scene);
        assert!(called.load(Ordering::SeqCst));
        assert!(loader.is_idle());
    }

    #[test]
    fn test_text_arrives_already_extruded() {
        let dir = std::env::temp_dir().join(format!("cake-diorama-text-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("boxy.typeface.json"),
            r#"{
                "familyName": "Boxy",
                "resolution": 1000,
                "glyphs": { "I": { "ha": 400, "o": "m 0 0 l 0 1000 l 300 1000 l 300 0" } }
            }"#,
        )
        .unwrap();

        let mut loader = AssetLoader::new(&dir);
        let mut scene = scene();
        let triangles = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = triangles.clone();

        loader.load_text("boxy.typeface.json", "II", TextOptions::default(), move |_, result| {
            seen.store(result.unwrap().triangle_count(), Ordering::SeqCst);
        });
        loader.wait_idle(&mut scene);

        // Two extruded quads: 2 caps of 2 triangles plus 4 walls of 2 each
        assert_eq!(triangles.load(Ordering::SeqCst), 2 * 12);
    }

    #[test]
    fn test_completions_mutate_the_scene() {
        let mut loader = AssetLoader::new("/definitely/not/a/dir");
        let mut scene = scene();

        loader.load_model("3dmodel/model.gltf", |scene, result| {
            assert!(result.is_err());
            scene.add_object(crate::gfx::scene::Object::new("placeholder"));
        });
        loader.wait_idle(&mut scene);

        assert_eq!(scene.object_count(), 1);
        assert_eq!(loader.poll(&mut scene), 0);
    }
}
