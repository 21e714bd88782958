//! Main renderer managing wgpu state and rendering.

use crate::{
    camera::{Camera, CameraUniform},
    depth::DepthBuffer,
    mesh::Mesh,
    pipeline::{
        create_blob_bind_group_layout, create_blob_pipeline, create_camera_bind_group_layout,
        create_lights_bind_group_layout, create_lit_pipeline, create_overlay_bind_group_layout,
        create_overlay_pipeline, create_star_pipeline,
    },
    shader::ShaderLibrary,
    texture::Texture,
    vertex::{InstanceData, OverlayVertex},
};
use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use engine_core::{hex_to_srgb, srgb_to_linear, SceneLight};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Light uniform (must match lit.wgsl Lights). rgb = linear colour, w = intensity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: [f32; 4],
    /// xyz = direction towards the light
    pub sun_direction: [f32; 4],
    pub sun_color: [f32; 4],
    /// xyz = position, w = range
    pub point_position: [f32; 4],
    pub point_color: [f32; 4],
}

impl Default for LightsUniform {
    fn default() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0, 1.0],
            sun_direction: [0.0, 1.0, 0.0, 0.0],
            sun_color: [0.0; 4],
            point_position: [0.0, 0.0, 0.0, 1.0],
            point_color: [0.0; 4],
        }
    }
}

fn linear_hex(hex: u32, intensity: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_srgb(hex).map(srgb_to_linear);
    [r, g, b, intensity]
}

impl LightsUniform {
    /// Pack scene lights. Later lights of the same kind replace earlier ones.
    pub fn from_lights(lights: &[SceneLight]) -> Self {
        let mut uniform = Self {
            ambient: [0.0; 4],
            ..Default::default()
        };
        for light in lights {
            match *light {
                SceneLight::Ambient { color, intensity } => {
                    uniform.ambient = linear_hex(color, intensity);
                }
                SceneLight::Directional { color, intensity, position } => {
                    let dir = position.try_normalize().unwrap_or(Vec3::Y);
                    uniform.sun_direction = [dir.x, dir.y, dir.z, 0.0];
                    uniform.sun_color = linear_hex(color, intensity);
                }
                SceneLight::Point { color, intensity, position, range } => {
                    uniform.point_position = [position.x, position.y, position.z, range.max(1e-3)];
                    uniform.point_color = linear_hex(color, intensity);
                }
            }
        }
        uniform
    }
}

/// Blob uniform (must match blob.wgsl BlobUniform).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BlobUniform {
    pub model: [[f32; 4]; 4],
    /// x = time, y = opacity
    pub params: [f32; 4],
}

impl BlobUniform {
    pub fn new(model: Mat4, time: f32, opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            params: [time, opacity, 0.0, 0.0],
        }
    }
}

/// Main renderer holding all GPU state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    depth: DepthBuffer,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    camera_uniform: CameraUniform,

    // Room geometry
    lit_pipeline: wgpu::RenderPipeline,
    lights_buffer: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    /// Write offset into instance_buffer this frame, so each pass gets its own region.
    frame_instance_offset: u32,

    // Star field, grown on demand
    star_pipeline: wgpu::RenderPipeline,
    star_buffer: Option<wgpu::Buffer>,
    star_capacity: usize,

    // Blob planet
    blob_pipeline: wgpu::RenderPipeline,
    blob_buffer: wgpu::Buffer,
    blob_bind_group: wgpu::BindGroup,

    // Text overlay
    overlay_pipeline: wgpu::RenderPipeline,
    overlay_bind_group: wgpu::BindGroup,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no texture formats"))?;

        // Mailbox when available for low-latency vsync, AutoVsync otherwise.
        let present_mode = if vsync {
            surface_caps
                .present_modes
                .iter()
                .find(|m| matches!(m, wgpu::PresentMode::Mailbox))
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        let depth = DepthBuffer::new(&device, config.width, config.height);
        let shaders = ShaderLibrary::builtin(&device);

        // Camera
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Lights + instanced room geometry
        let lights_bind_group_layout = create_lights_bind_group_layout(&device);
        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lights Buffer"),
            contents: bytemuck::cast_slice(&[LightsUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lights Bind Group"),
            layout: &lights_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            }],
        });
        let lit_pipeline = create_lit_pipeline(
            &device,
            &*shaders.require("lit")?,
            config.format,
            &camera_bind_group_layout,
            &lights_bind_group_layout,
        );

        let max_instances = 1024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (max_instances as usize * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let star_pipeline =
            create_star_pipeline(&device, &*shaders.require("stars")?, config.format, &camera_bind_group_layout);

        // Blob planet
        let blob_bind_group_layout = create_blob_bind_group_layout(&device);
        let blob_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Blob Uniform"),
            contents: bytemuck::cast_slice(&[BlobUniform::new(Mat4::IDENTITY, 0.0, 1.0)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let blob_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blob Bind Group"),
            layout: &blob_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: blob_buffer.as_entire_binding(),
            }],
        });
        let blob_pipeline = create_blob_pipeline(
            &device,
            &*shaders.require("blob")?,
            config.format,
            &camera_bind_group_layout,
            &blob_bind_group_layout,
        );

        // Overlay font
        let font = Texture::font_atlas(&device, &queue)?;
        let overlay_bind_group_layout = create_overlay_bind_group_layout(&device);
        let overlay_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Bind Group"),
            layout: &overlay_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&font.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&font.sampler),
                },
            ],
        });
        let overlay_pipeline =
            create_overlay_pipeline(&device, &*shaders.require("overlay")?, config.format, &overlay_bind_group_layout);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            depth,
            camera_buffer,
            camera_bind_group,
            camera_uniform,
            lit_pipeline,
            lights_buffer,
            lights_bind_group,
            instance_buffer,
            max_instances,
            frame_instance_offset: 0,
            star_pipeline,
            star_buffer: None,
            star_capacity: 0,
            blob_pipeline,
            blob_buffer,
            blob_bind_group,
            overlay_pipeline,
            overlay_bind_group,
        })
    }

    /// Handle window resize. Zero-sized (minimised) windows are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth.resize(&self.device, self.config.width, self.config.height);
        }
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    pub fn update_lights(&mut self, lights: &LightsUniform) {
        self.queue.write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[*lights]));
    }

    pub fn update_blob(&mut self, model: Mat4, time: f32, opacity: f32) {
        let uniform = BlobUniform::new(model, time, opacity);
        self.queue.write_buffer(&self.blob_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Begin a new frame, returns the command encoder and output texture.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder), wgpu::SurfaceError> {
        self.frame_instance_offset = 0;
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Clear colour and depth. `color` is linear RGB.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, color: [f32; 3]) {
        let [r, g, b] = color.map(f64::from);
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    /// Pass that keeps what is already in colour and depth.
    fn load_pass<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &'e wgpu::TextureView,
        label: &str,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Draw the star field as points. Uploads the current positions every call.
    pub fn render_stars(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, stars: &[Vec3]) {
        if stars.is_empty() {
            return;
        }
        if self.star_buffer.is_none() || self.star_capacity < stars.len() {
            self.star_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Star Buffer"),
                size: std::mem::size_of_val(stars) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.star_capacity = stars.len();
        }
        let Some(buffer) = self.star_buffer.as_ref() else {
            return;
        };
        self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(stars));

        let mut render_pass = self.load_pass(encoder, view, "Star Pass");
        render_pass.set_pipeline(&self.star_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, buffer.slice(..));
        render_pass.draw(0..stars.len() as u32, 0..1);
    }

    /// Draw the blob planet with the parameters from the last `update_blob`.
    pub fn render_blob(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, mesh: &Mesh) {
        let mut render_pass = self.load_pass(encoder, view, "Blob Pass");
        render_pass.set_pipeline(&self.blob_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.blob_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
    }

    /// Render meshes with instancing, loading existing frame content (no clear).
    pub fn render_instanced_load(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[InstanceData],
    ) {
        if instances.is_empty() {
            return;
        }

        // Allocate a unique region in the instance buffer for this draw call
        let offset = self.frame_instance_offset;
        let remaining = self.max_instances.saturating_sub(offset) as usize;
        let instance_count = instances.len().min(remaining);
        if instance_count == 0 {
            log::warn!("Instance buffer full, skipping {} instances", instances.len());
            return;
        }

        let byte_offset = (offset as usize * std::mem::size_of::<InstanceData>()) as u64;
        self.queue.write_buffer(
            &self.instance_buffer,
            byte_offset,
            bytemuck::cast_slice(&instances[..instance_count]),
        );
        self.frame_instance_offset = offset + instance_count as u32;

        let mut render_pass = self.load_pass(encoder, view, "Lit Pass");
        render_pass.set_pipeline(&self.lit_pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.lights_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.num_indices, 0, offset..(offset + instance_count as u32));
    }

    /// Render screen-space overlay geometry. Call as the last pass before end_frame.
    pub fn render_overlay(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        vertices: &[OverlayVertex],
        indices: &[u32],
    ) {
        if vertices.is_empty() || indices.is_empty() {
            return;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.overlay_pipeline);
        render_pass.set_bind_group(0, &self.overlay_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_pack_into_uniform_slots() {
        let lights = [
            SceneLight::Ambient { color: 0xffffff, intensity: 0.7 },
            SceneLight::Directional { color: 0xffffff, intensity: 0.6, position: Vec3::new(0.0, 10.0, 0.0) },
            SceneLight::Point { color: 0xffffff, intensity: 0.4, position: Vec3::new(-5.0, 5.0, 5.0), range: 20.0 },
        ];
        let uniform = LightsUniform::from_lights(&lights);
        assert_eq!(uniform.ambient, [1.0, 1.0, 1.0, 0.7]);
        assert_eq!(uniform.sun_direction, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.point_position, [-5.0, 5.0, 5.0, 20.0]);
        assert_eq!(uniform.point_color[3], 0.4);
    }

    #[test]
    fn no_lights_means_black() {
        let uniform = LightsUniform::from_lights(&[]);
        assert_eq!(uniform.ambient, [0.0; 4]);
        assert_eq!(uniform.sun_color, [0.0; 4]);
    }

    #[test]
    fn uniform_sizes_match_shader_structs() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 80);
        assert_eq!(std::mem::size_of::<BlobUniform>(), 80);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }
}
