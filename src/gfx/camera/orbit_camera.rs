use super::camera_utils::Camera;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Vertical field of view of the diorama camera, in degrees.
pub const DEFAULT_FOVY_DEGREES: f32 = 75.0;
pub const DEFAULT_ZNEAR: f32 = 0.1;
pub const DEFAULT_ZFAR: f32 = 2000.0;

/// Perspective camera orbiting a target point, Y up.
///
/// The pose is stored both as spherical coordinates around `target` and as
/// the cartesian `eye`. Orbit operations recompute `eye`; [`set_position`]
/// stores the given eye verbatim and derives the spherical coordinates from it.
///
/// [`set_position`]: OrbitCamera::set_position
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    fn eye_position(&self) -> Vector3<f32> {
        self.eye
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Computed by `update()` below
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(DEFAULT_FOVY_DEGREES).into(),
            znear: DEFAULT_ZNEAR,
            zfar: DEFAULT_ZFAR,
        };
        camera.update();
        camera
    }

    /// Camera at `eye` looking at `target`.
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(1.0, 0.0, 0.0, target, aspect);
        camera.set_position(eye);
        camera
    }

    pub fn with_bounds(mut self, bounds: OrbitCameraBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Moves the eye to `eye` exactly, keeping the current target.
    pub fn set_position(&mut self, eye: Vector3<f32>) {
        let offset = eye - self.target;
        let distance = offset.magnitude();

        if distance > f32::EPSILON {
            self.distance = distance;
            self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.yaw = offset.x.atan2(offset.z);
        }
        self.eye = eye;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.eye
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON).max(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Multiplicative zoom; `scale < 1` moves the eye closer.
    pub fn scale_distance(&mut self, scale: f32) {
        self.set_distance(self.distance * scale);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale by distance for a consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;
        let movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.eye += movement;
        self.target += movement;
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    /// Recomputes the aspect ratio as exactly `width / height`.
    ///
    /// Zero-sized surfaces (minimised windows) are ignored.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.001,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.001,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_set_position_is_exact() {
        let mut camera = OrbitCamera::new(5.0, 0.3, 1.0, Vector3::zero(), 1.0);
        let eye = Vector3::new(16.0, 12.0, -8.0);
        camera.set_position(eye);
        assert_eq!(camera.position(), eye);
        assert!((camera.distance - 464f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_spherical_coordinates_round_trip_through_orbit() {
        let mut camera = OrbitCamera::looking_at(Vector3::new(16.0, 12.0, -8.0), Vector3::zero(), 1.0);
        // Orbiting by zero recomputes the eye from the derived angles
        camera.add_yaw(0.0);
        assert!(approx_eq(camera.eye, Vector3::new(16.0, 12.0, -8.0)));
    }

    #[test]
    fn test_resize_sets_exact_aspect() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.resize_projection(1920, 1080);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);

        camera.resize_projection(0, 600);
        assert_eq!(camera.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn test_distance_respects_bounds() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0).with_bounds(
            OrbitCameraBounds {
                min_distance: Some(0.0),
                max_distance: Some(800.0),
                ..Default::default()
            },
        );
        camera.set_distance(5000.0);
        assert_eq!(camera.distance, 800.0);
        camera.set_distance(-3.0);
        assert!(camera.distance > 0.0);
    }

    #[test]
    fn test_pitch_is_clamped_below_the_poles() {
        let mut camera = OrbitCamera::new(10.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        assert!(camera.eye.y < 10.0);
    }

    #[test]
    fn test_pan_moves_eye_and_target_together() {
        let mut camera = OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 10.0), Vector3::zero(), 1.0);
        let before = camera.eye - camera.target;
        camera.pan((1.0, 0.5));
        assert!(approx_eq(camera.eye - camera.target, before));
        assert!(camera.target.magnitude() > 0.0);
    }
}
