use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key as LogicalKey, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::DioramaConfig,
    controls::{Key, ToggleController},
    diorama::{self, DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET},
    error::ViewportError,
    gfx::{
        camera::camera_manager_from_config,
        rendering::{RenderEngine, RenderOptions},
        resources::texture::FsTextureSource,
        scene::Scene,
    },
    loaders::AssetLoader,
};

/// The diorama window: owns the event loop, the scene and the renderer.
pub struct DioramaApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: DioramaConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    loader: AssetLoader,
    controls: ToggleController,
    fatal: Option<ViewportError>,
}

impl DioramaApp {
    /// Creates the event loop and assembles the scene.
    ///
    /// The window and renderer are created once the event loop starts.
    pub fn new(config: DioramaConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().map_err(ViewportError::from)?;

        let camera_manager = camera_manager_from_config(
            DEFAULT_CAMERA_POSITION,
            DEFAULT_CAMERA_TARGET,
            config.aspect(),
            &config.orbit,
        );
        let mut scene = Scene::new(camera_manager);
        let mut textures = FsTextureSource::new(&config.asset_root);
        let mut loader = AssetLoader::new(&config.asset_root);

        let handles = diorama::assemble(&mut scene, &mut textures, &mut loader, &config)?;
        let controls = ToggleController::new(handles, config.key_repeat);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                scene,
                loader,
                controls,
                fatal: None,
            },
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.app_state.scene
    }

    /// Runs until the window closes.
    ///
    /// # Errors
    /// Returns the viewport error that ended the loop, if any.
    pub fn run(mut self) -> Result<(), ViewportError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewportError) {
        log::error!("{}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn create_viewport(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(Arc<Window>, RenderEngine), ViewportError> {
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.window.title.clone())
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        self.config.window.width,
                        self.config.window.height,
                    )),
            )?,
        );

        let (width, height) = window.inner_size().into();
        let options = RenderOptions {
            clear_color: self.config.clear_color().unwrap_or_default(),
            vsync: self.config.vsync,
        };

        let window_clone = window.clone();
        let renderer = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, options).await
        })?;

        Ok((window, renderer))
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let key = Key::from_keys(&event.logical_key, event.physical_key);

        match event.state {
            ElementState::Pressed => {
                if event.logical_key == LogicalKey::Named(NamedKey::Escape) {
                    event_loop.exit();
                    return;
                }
                self.controls.key_down(key, event.repeat, &mut self.scene);
            }
            ElementState::Released => self.controls.key_up(key),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.loader.poll(&mut self.scene);
        self.scene.update();

        let Some(render_engine) = self.render_engine.as_mut() else {
            return;
        };
        render_engine.prepare(&self.scene);
        render_engine.update(&self.scene);
        if let Err(err) = render_engine.render_frame(&self.scene) {
            self.fail(event_loop, err);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_viewport(event_loop) {
            Ok((window, renderer)) => {
                let (width, height) = renderer.get_surface_size();
                self.scene.camera_manager.resize(width, height);
                self.window = Some(window);
                self.render_engine = Some(renderer);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.scene.camera_manager.process_window_event(&event);

        match event {
            WindowEvent::KeyboardInput { ref event, .. } => self.handle_key(event_loop, event),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene.camera_manager.resize(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
            }
            WindowEvent::Focused(false) => self.controls.release_all(),
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if self.window.is_some() {
            self.scene.camera_manager.process_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
