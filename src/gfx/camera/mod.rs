pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraManager, CameraUniform};
pub use orbit_camera::{OrbitCamera, OrbitCameraBounds};

use crate::config::OrbitConfig;

/// Builds the camera and its orbit controls from configuration.
pub fn camera_manager_from_config(
    eye: cgmath::Vector3<f32>,
    target: cgmath::Vector3<f32>,
    aspect: f32,
    orbit: &OrbitConfig,
) -> CameraManager {
    let bounds = OrbitCameraBounds {
        min_distance: Some(orbit.min_distance),
        max_distance: Some(orbit.max_distance),
        ..Default::default()
    };
    let camera = OrbitCamera::looking_at(eye, target, aspect).with_bounds(bounds);
    CameraManager::new(camera, CameraController::from_config(orbit))
}
