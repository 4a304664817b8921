//! Global uniform bindings for camera and lighting
//!
//! Manages the GPU uniform buffer and bind group for per-frame state shared
//! by every draw: the camera matrices and all scene lights. Bound to slot 0
//! of every render pipeline.

use cgmath::InnerSpace;

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        scene::light::{Light, LightKind},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

pub const MAX_SPOT_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightUniform {
    /// xyz position, w range (0 = unlimited)
    pub position: [f32; 4],
    /// xyz unit direction, w cosine of the cone half-angle
    pub direction: [f32; 4],
    /// rgb colour times intensity, w cosine where the penumbra ends
    pub color: [f32; 4],
    /// x decay exponent
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// xyz position, w range (0 = unlimited)
    pub position: [f32; 4],
    /// rgb colour times intensity, w decay exponent
    pub color: [f32; 4],
}

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in `phong.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    /// rgb sum of ambient lights, w unused
    pub ambient: [f32; 4],
    /// x spot light count, y point light count
    pub light_counts: [u32; 4],
    pub spot_lights: [SpotLightUniform; MAX_SPOT_LIGHTS],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl GlobalUniform {
    /// Packs the camera and every light that currently emits anything.
    ///
    /// Lights at intensity zero are left out; they would contribute nothing.
    pub fn new<'a>(camera: CameraUniform, lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = Self {
            view_proj: camera.view_proj,
            view_position: camera.view_position,
            ambient: [0.0; 4],
            light_counts: [0; 4],
            spot_lights: [SpotLightUniform::default(); MAX_SPOT_LIGHTS],
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
        };

        let mut spots = 0;
        let mut points = 0;

        for light in lights.into_iter().filter(|l| l.is_on()) {
            let [r, g, b] = light.radiance().to_array();
            let p = light.position;

            match light.kind {
                LightKind::Ambient => {
                    uniform.ambient[0] += r;
                    uniform.ambient[1] += g;
                    uniform.ambient[2] += b;
                }
                LightKind::Spot {
                    distance,
                    angle,
                    penumbra,
                    decay,
                    target,
                } => {
                    if spots == MAX_SPOT_LIGHTS {
                        log::warn!("Too many spot lights, '{}' is not rendered", light.name);
                        continue;
                    }
                    let to_target = target - p;
                    let direction = if to_target.magnitude2() > 0.0 {
                        to_target.normalize()
                    } else {
                        -cgmath::Vector3::unit_y()
                    };
                    let penumbra = penumbra.clamp(0.0, 1.0);
                    uniform.spot_lights[spots] = SpotLightUniform {
                        position: [p.x, p.y, p.z, distance],
                        direction: [direction.x, direction.y, direction.z, angle.cos()],
                        color: [r, g, b, (angle * (1.0 - penumbra)).cos()],
                        params: [decay, 0.0, 0.0, 0.0],
                    };
                    spots += 1;
                }
                LightKind::Point { distance, decay } => {
                    if points == MAX_POINT_LIGHTS {
                        log::warn!("Too many point lights, '{}' is not rendered", light.name);
                        continue;
                    }
                    uniform.point_lights[points] = PointLightUniform {
                        position: [p.x, p.y, p.z, distance],
                        color: [r, g, b, decay],
                    };
                    points += 1;
                }
            }
        }

        uniform.light_counts = [spots as u32, points as u32, 0, 0];
        uniform
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Owns the global uniform buffer and its bind group
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    ubo: GlobalUBO,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let ubo = GlobalUBO::new(device);
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        Self {
            bind_group_layout,
            bind_group,
            ubo,
        }
    }

    /// Uploads new camera and light data; unchanged content is not rewritten.
    pub fn update(&mut self, queue: &wgpu::Queue, content: GlobalUniform) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::color::Color;
    use cgmath::Vector3;

    #[test]
    fn test_layout_is_uniform_compatible() {
        assert_eq!(std::mem::size_of::<SpotLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }

    #[test]
    fn test_dark_lights_are_skipped() {
        let lights = vec![
            Light::ambient("ambient", Color::WHITE, 0.3),
            Light::spot("spot", Color::WHITE, 0.0, 1000.0, 0.4),
            Light::point("candle", Color::WHITE, 0.0, 8.0),
        ];
        let uniform = GlobalUniform::new(CameraUniform::default(), &lights);
        assert_eq!(uniform.light_counts, [0, 0, 0, 0]);
        assert!((uniform.ambient[0] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_spot_light_points_at_target() {
        let lights = vec![Light::spot("spot", Color::WHITE, 1.0, 1000.0, std::f32::consts::PI / 8.0)
            .with_position(Vector3::new(0.0, 30.0, 0.0))];
        let uniform = GlobalUniform::new(CameraUniform::default(), &lights);

        assert_eq!(uniform.light_counts[0], 1);
        let spot = uniform.spot_lights[0];
        assert_eq!(&spot.direction[0..3], &[0.0, -1.0, 0.0]);
        // Zero penumbra: the cone edge and the penumbra edge coincide
        assert_eq!(spot.direction[3], spot.color[3]);
        assert_eq!(spot.position[3], 1000.0);
    }

    #[test]
    fn test_point_lights_are_truncated_past_capacity() {
        let lights: Vec<Light> = (0..MAX_POINT_LIGHTS + 2)
            .map(|i| Light::point(&format!("p{}", i), Color::WHITE, 1.0, 8.0))
            .collect();
        let uniform = GlobalUniform::new(CameraUniform::default(), &lights);
        assert_eq!(uniform.light_counts[1] as usize, MAX_POINT_LIGHTS);
    }
}
