//! WGPU-based forward renderer for the diorama
//!
//! The engine mirrors the scene onto the GPU lazily: textures, materials and
//! meshes are uploaded the first frame they are seen, so objects inserted
//! later by the asset loader appear without any extra wiring.

use std::sync::Arc;

use cgmath::{Matrix, Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;

use crate::{
    error::ViewportError,
    gfx::{
        camera::camera_utils::convert_matrix4_to_array,
        color::Color,
        geometry::GeometryGroup,
        resources::{
            global_bindings::{GlobalBindings, GlobalUniform},
            material::{MaterialUniform, Side},
            texture::TextureId,
            texture_resource::TextureResource,
        },
        scene::{Object, Scene},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::pipeline_manager::{cull_mode_for, phong_pipeline_name, PipelineConfig, PipelineManager};

const PHONG_SHADER: &str = "phong";

/// Surface settings chosen by the application
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub clear_color: Color,
    pub vsync: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            clear_color: Color::BLACK,
            vsync: true,
        }
    }
}

/// Per-object transform uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_matrix(model: Matrix4<f32>) -> Self {
        let normal = model.invert().map(|m| m.transpose()).unwrap_or(model);
        Self {
            model: convert_matrix4_to_array(model),
            normal: convert_matrix4_to_array(normal),
        }
    }
}

struct GpuMaterial {
    ubo: UniformBuffer<MaterialUniform>,
    bind_group: wgpu::BindGroup,
    side: Side,
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    groups: Vec<GeometryGroup>,
    transform: UniformBuffer<TransformUniform>,
    transform_bind_group: wgpu::BindGroup,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,
    transform_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    default_map: TextureResource,
    default_normal_map: TextureResource,
    clear_color: wgpu::Color,

    // Mirrors of the scene's append-only storage, same indices
    textures: Vec<TextureResource>,
    materials: Vec<GpuMaterial>,
    meshes: Vec<Option<GpuMesh>>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Errors
    /// Any failure to obtain a surface, adapter or device is a
    /// [`ViewportError`]; nothing can be drawn without them.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        options: RenderOptions,
    ) -> Result<RenderEngine, ViewportError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Colours are written as-is, so prefer a non-sRGB target
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(ViewportError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(options.vsync),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_bindings = GlobalBindings::new(&device);

        let transform_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");

        let filtering = wgpu::SamplerBindingType::Filtering;
        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(filtering))
            .create(&device, "Material Bind Group Layout");

        let default_map = TextureResource::white(&device, &queue);
        let default_normal_map = TextureResource::flat_normal(&device, &queue);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader(PHONG_SHADER, include_str!("phong.wgsl"));
        for side in [Side::Front, Side::Back, Side::Double] {
            let name = phong_pipeline_name(side);
            pipeline_manager.register_pipeline(
                name,
                PipelineConfig::default_with_shader(PHONG_SHADER)
                    .with_label(name)
                    .with_cull_mode(cull_mode_for(side))
                    .with_color_format(format)
                    .with_depth_format(TextureResource::DEPTH_FORMAT)
                    .with_bind_group_layouts(vec![
                        global_bindings.bind_group_layout().clone(),
                        transform_layout.layout.clone(),
                        material_layout.layout.clone(),
                    ]),
            );
        }
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{}", error);
            }
        }

        log::info!(
            "Render engine ready: {}x{} {:?}, {:?}",
            config.width,
            config.height,
            format,
            config.present_mode
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            pipeline_manager,
            global_bindings,
            transform_layout,
            material_layout,
            default_map,
            default_normal_map,
            clear_color: options.clear_color.to_wgpu(),
            textures: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
        })
    }

    /// Uploads whatever the scene gained since the last call.
    pub fn prepare(&mut self, scene: &Scene) {
        for (_, image) in scene.textures.iter().skip(self.textures.len()) {
            if image.is_valid() {
                self.textures
                    .push(TextureResource::from_image(&self.device, &self.queue, image));
            } else {
                log::warn!("Texture '{}' has inconsistent dimensions", image.label);
                self.textures.push(TextureResource::white(&self.device, &self.queue));
            }
        }

        for (_, material) in scene.materials.iter().skip(self.materials.len()) {
            let uniform = material.to_uniform();
            let ubo = UniformBuffer::new_with_data(&self.device, &uniform);
            let map = self.texture_view(material.map, &self.default_map);
            let normal_map = self.texture_view(material.normal_map, &self.default_normal_map);

            let bind_group = BindGroupBuilder::new(&self.material_layout)
                .resource(ubo.binding_resource())
                .texture(&map.view)
                .sampler(&map.sampler)
                .texture(&normal_map.view)
                .sampler(&normal_map.sampler)
                .create(&self.device, &material.name);

            self.materials.push(GpuMaterial {
                ubo,
                bind_group,
                side: material.side,
            });
        }

        let known = self.meshes.len();
        for (id, object) in scene.objects().skip(known) {
            let mesh = self.upload_mesh(object, scene.world_matrix(id));
            self.meshes.push(mesh);
        }
    }

    fn texture_view<'a>(
        &'a self,
        id: Option<TextureId>,
        fallback: &'a TextureResource,
    ) -> &'a TextureResource {
        id.and_then(|id| self.textures.get(id.0)).unwrap_or(fallback)
    }

    fn upload_mesh(&self, object: &Object, world: Matrix4<f32>) -> Option<GpuMesh> {
        let mesh = object.mesh.as_ref()?;
        if mesh.indices.is_empty() {
            return None;
        }

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", object.name)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", object.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let transform =
            UniformBuffer::new_with_data(&self.device, &TransformUniform::from_matrix(world));
        let transform_bind_group = BindGroupBuilder::new(&self.transform_layout)
            .resource(transform.binding_resource())
            .create(&self.device, &format!("{} Transform", object.name));

        Some(GpuMesh {
            vertex_buffer,
            index_buffer,
            groups: mesh.groups.clone(),
            transform,
            transform_bind_group,
        })
    }

    /// Writes camera, lights, transforms and materials for this frame.
    ///
    /// Buffers whose content did not change are not rewritten.
    pub fn update(&mut self, scene: &Scene) {
        let camera = scene.camera_manager.uniform();
        let globals = GlobalUniform::new(camera, scene.lights().map(|(_, light)| light));
        self.global_bindings.update(&self.queue, globals);

        for (id, _) in scene.objects() {
            if let Some(Some(mesh)) = self.meshes.get_mut(id.0) {
                let model = TransformUniform::from_matrix(scene.world_matrix(id));
                mesh.transform.update_content(&self.queue, model);
            }
        }

        for (id, material) in scene.materials.iter() {
            if let Some(gpu) = self.materials.get_mut(id.0) {
                gpu.ubo.update_content(&self.queue, material.to_uniform());
                gpu.side = material.side;
            }
        }
    }

    /// Renders one frame of `scene`.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    ///
    /// # Errors
    /// [`ViewportError::OutOfMemory`] when the surface cannot allocate.
    pub fn render_frame(&mut self, scene: &Scene) -> Result<(), ViewportError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(ViewportError::OutOfMemory),
            Err(other) => {
                log::warn!("Skipping frame: {}", other);
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            for (id, object) in scene.objects() {
                let Some(Some(mesh)) = self.meshes.get(id.0) else {
                    continue;
                };
                if !scene.is_visible(id) {
                    continue;
                }

                render_pass.set_bind_group(1, &mesh.transform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                for group in &mesh.groups {
                    let Some(material) = object
                        .material_for(group)
                        .and_then(|m| self.materials.get(m.0))
                    else {
                        continue;
                    };
                    let Some(pipeline) = self.pipeline_manager.pipeline(phong_pipeline_name(material.side))
                    else {
                        continue;
                    };

                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.draw_indexed(group.start..group.start + group.count, 0, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let uniform = TransformUniform::from_matrix(model);
        let normal: Matrix4<f32> = uniform.normal.into();
        let n = normal * Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_singular_model_keeps_matrix() {
        let model = Matrix4::from_nonuniform_scale(0.0, 1.0, 1.0);
        let uniform = TransformUniform::from_matrix(model);
        assert_eq!(uniform.normal, uniform.model);
    }

    #[test]
    fn test_present_mode_follows_vsync() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::Immediate);
    }
}
