use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::ModifiersState,
};

use super::orbit_camera::OrbitCamera;
use crate::config::OrbitConfig;

/// Pending motion below this is dropped instead of decayed forever.
const MOMENTUM_EPSILON: f32 = 1e-6;

/// Mouse-driven orbit controls with damping.
///
/// Left drag orbits, right drag or shift + left drag pans, the wheel zooms.
/// Input only accumulates pending motion; [`update`](Self::update) applies a
/// `damping_factor` share of it once per frame and decays the rest, so the
/// camera glides to a stop after the mouse is released.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: (f32, f32),
    pending_zoom: f32,
    is_left_pressed: bool,
    is_right_pressed: bool,
    is_shift_held: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
            damping_factor: 0.05,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: (0.0, 0.0),
            pending_zoom: 0.0,
            is_left_pressed: false,
            is_right_pressed: false,
            is_shift_held: false,
        }
    }

    pub fn from_config(config: &OrbitConfig) -> Self {
        let mut controller = Self::new(config.rotate_speed, config.zoom_speed);
        controller.pan_speed = config.pan_speed;
        controller.damping_factor = config.damping_factor.clamp(f32::EPSILON, 1.0);
        controller
    }

    /// Tracks button, wheel and modifier state from window events.
    pub fn process_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.is_left_pressed = pressed,
                    MouseButton::Right => self.is_right_pressed = pressed,
                    _ => (),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => *lines,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 50.0,
                };
                self.pending_zoom += scroll * self.zoom_speed;
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.is_shift_held = modifiers.state().contains(ModifiersState::SHIFT);
            }
            WindowEvent::Focused(false) => {
                self.is_left_pressed = false;
                self.is_right_pressed = false;
            }
            _ => (),
        }
    }

    /// Raw mouse motion drives orbit and pan while a button is held.
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let (dx, dy) = (delta.0 as f32, delta.1 as f32);
            if self.is_panning() {
                self.pending_pan.0 -= dx * self.pan_speed;
                self.pending_pan.1 += dy * self.pan_speed;
            } else if self.is_rotating() {
                self.pending_yaw -= dx * self.rotate_speed;
                self.pending_pitch += dy * self.rotate_speed;
            }
        }
    }

    /// Applies one frame of damped motion to `camera`.
    ///
    /// Returns `false` without touching the camera when nothing is pending.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        if !self.has_momentum() {
            return false;
        }

        let factor = self.damping_factor;

        if self.pending_yaw != 0.0 || self.pending_pitch != 0.0 {
            camera.add_yaw(self.pending_yaw * factor);
            camera.add_pitch(self.pending_pitch * factor);
        }
        if self.pending_zoom != 0.0 {
            // Scrolling up (positive) moves closer
            camera.scale_distance(0.95f32.powf(self.pending_zoom * factor));
        }
        if self.pending_pan != (0.0, 0.0) {
            camera.pan((self.pending_pan.0 * factor, self.pending_pan.1 * factor));
        }

        let decay = 1.0 - factor;
        self.pending_yaw = settle(self.pending_yaw * decay);
        self.pending_pitch = settle(self.pending_pitch * decay);
        self.pending_zoom = settle(self.pending_zoom * decay);
        self.pending_pan = (
            settle(self.pending_pan.0 * decay),
            settle(self.pending_pan.1 * decay),
        );
        true
    }

    pub fn has_momentum(&self) -> bool {
        self.pending_yaw != 0.0
            || self.pending_pitch != 0.0
            || self.pending_zoom != 0.0
            || self.pending_pan != (0.0, 0.0)
    }

    /// Drops any motion still waiting to be applied.
    pub fn clear_momentum(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
        self.pending_pan = (0.0, 0.0);
    }

    /// Returns true if currently panning
    pub fn is_panning(&self) -> bool {
        self.is_right_pressed || (self.is_left_pressed && self.is_shift_held)
    }

    /// Returns true if currently rotating
    pub fn is_rotating(&self) -> bool {
        self.is_left_pressed && !self.is_shift_held
    }
}

fn settle(value: f32) -> f32 {
    if value.abs() < MOMENTUM_EPSILON {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(Vector3::new(16.0, 12.0, -8.0), Vector3::zero(), 1.0)
    }

    fn left_drag(controller: &mut CameraController, dx: f64) {
        controller.is_left_pressed = true;
        controller.process_device_event(&DeviceEvent::MouseMotion { delta: (dx, 0.0) });
        controller.is_left_pressed = false;
    }

    #[test]
    fn test_motion_without_button_is_ignored() {
        let mut controller = CameraController::new(0.005, 1.0);
        controller.process_device_event(&DeviceEvent::MouseMotion { delta: (40.0, 10.0) });
        assert!(!controller.has_momentum());

        let mut cam = camera();
        assert!(!controller.update(&mut cam));
        assert_eq!(cam.eye, Vector3::new(16.0, 12.0, -8.0));
    }

    #[test]
    fn test_drag_glides_and_settles() {
        let mut controller = CameraController::new(0.005, 1.0);
        let mut cam = camera();
        left_drag(&mut controller, 100.0);

        let start_yaw = cam.yaw;
        let mut frames = 0;
        while controller.update(&mut cam) {
            frames += 1;
            assert!(frames < 10_000, "momentum never settled");
        }
        assert!(frames > 1);
        // The damped series converges on the full drag amount
        assert!((cam.yaw - (start_yaw - 0.5)).abs() < 1e-3);
        assert!((cam.eye.magnitude() - 464f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_clear_momentum_stops_drift() {
        let mut controller = CameraController::new(0.005, 1.0);
        left_drag(&mut controller, 100.0);
        assert!(controller.has_momentum());

        controller.clear_momentum();
        let mut cam = camera();
        assert!(!controller.update(&mut cam));
        assert_eq!(cam.eye, Vector3::new(16.0, 12.0, -8.0));
    }

    #[test]
    fn test_shift_drag_pans() {
        let mut controller = CameraController::new(0.005, 1.0);
        controller.is_left_pressed = true;
        controller.is_shift_held = true;
        assert!(controller.is_panning());
        assert!(!controller.is_rotating());
    }
}
