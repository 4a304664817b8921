use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::{DeviceEvent, WindowEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// The scene's single camera together with its orbit controls.
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) {
        self.controller.process_window_event(event);
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        self.controller.process_device_event(event);
    }

    /// Advances damped orbit motion by one frame.
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    /// Puts the eye at `position` and cancels pending orbit motion so the
    /// next frame does not drift away from it.
    pub fn reset_position(&mut self, position: Vector3<f32>) {
        self.controller.clear_momentum();
        self.camera.set_position(position);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::from_camera(&self.camera)
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
    fn eye_position(&self) -> Vector3<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera<C: Camera>(camera: &C) -> Self {
        let eye = camera.eye_position();
        Self {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view_proj: convert_matrix4_to_array(camera.build_view_projection_matrix()),
        }
    }
}

impl Default for CameraUniform {
    /// Creates a default [CameraUniform].
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_reset_clears_momentum_and_sets_exact_eye() {
        let camera = OrbitCamera::new(30.0, 0.2, 1.0, Vector3::zero(), 1.0);
        let mut manager = CameraManager::new(camera, CameraController::new(0.005, 1.0));

        manager.reset_position(Vector3::new(16.0, 12.0, -8.0));
        manager.update();
        assert_eq!(manager.camera.eye, Vector3::new(16.0, 12.0, -8.0));
        assert!(!manager.controller.has_momentum());
    }

    #[test]
    fn test_uniform_carries_eye_position() {
        let camera = OrbitCamera::looking_at(Vector3::new(1.0, 2.0, 3.0), Vector3::zero(), 1.0);
        let uniform = CameraUniform::from_camera(&camera);
        assert_eq!(uniform.view_position, [1.0, 2.0, 3.0, 1.0]);
    }
}
