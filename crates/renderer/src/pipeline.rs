//! Bind group layouts and render pipelines.

use std::num::NonZeroU64;

use crate::camera::CameraUniform;
use crate::depth::DepthBuffer;
use crate::renderer::{BlobUniform, LightsUniform};
use crate::vertex::{star_layout, InstanceData, OverlayVertex, Vertex};

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

pub fn create_camera_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        "Camera Bind Group Layout",
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        std::mem::size_of::<CameraUniform>(),
    )
}

pub fn create_lights_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        "Lights Bind Group Layout",
        wgpu::ShaderStages::FRAGMENT,
        std::mem::size_of::<LightsUniform>(),
    )
}

pub fn create_blob_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(
        device,
        "Blob Bind Group Layout",
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        std::mem::size_of::<BlobUniform>(),
    )
}

/// Font atlas texture + sampler.
pub fn create_overlay_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Overlay Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// Shared pipeline shape: `vs_main`/`fs_main` in one module, one colour target.
struct PipelineSpec<'a> {
    label: &'a str,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    blend: wgpu::BlendState,
    depth_format: Option<wgpu::TextureFormat>,
}

fn build_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    spec: PipelineSpec,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(spec.label),
        bind_group_layouts: spec.bind_group_layouts,
        push_constant_ranges: &[],
    });

    let depth_stencil = spec.depth_format.map(|format| wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: DepthBuffer::COMPARE_FUNCTION,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: spec.buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: spec.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: spec.cull_mode,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(spec.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

/// Flat-coloured room geometry lit by ambient, directional and point lights.
pub fn create_lit_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    lights_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    build_pipeline(
        device,
        shader,
        surface_format,
        PipelineSpec {
            label: "Lit Pipeline",
            bind_group_layouts: &[camera_layout, lights_layout],
            buffers: &[Vertex::layout(), InstanceData::layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            // Walls and floor are single planes seen from either side.
            cull_mode: None,
            blend: wgpu::BlendState::REPLACE,
            depth_format: Some(DepthBuffer::FORMAT),
        },
    )
}

/// One-pixel white points.
pub fn create_star_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    build_pipeline(
        device,
        shader,
        surface_format,
        PipelineSpec {
            label: "Star Pipeline",
            bind_group_layouts: &[camera_layout],
            buffers: &[star_layout()],
            topology: wgpu::PrimitiveTopology::PointList,
            cull_mode: None,
            blend: wgpu::BlendState::REPLACE,
            depth_format: Some(DepthBuffer::FORMAT),
        },
    )
}

/// Translucent planet with vertex displacement.
pub fn create_blob_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    camera_layout: &wgpu::BindGroupLayout,
    blob_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    build_pipeline(
        device,
        shader,
        surface_format,
        PipelineSpec {
            label: "Blob Pipeline",
            bind_group_layouts: &[camera_layout, blob_layout],
            buffers: &[Vertex::layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_format: Some(DepthBuffer::FORMAT),
        },
    )
}

/// Screen-space text and rectangles, drawn last without depth.
pub fn create_overlay_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    overlay_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    build_pipeline(
        device,
        shader,
        surface_format,
        PipelineSpec {
            label: "Overlay Pipeline",
            bind_group_layouts: &[overlay_layout],
            buffers: &[OverlayVertex::layout()],
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            blend: wgpu::BlendState::ALPHA_BLENDING,
            depth_format: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::{BLOB_SHADER_SOURCE, LIT_SHADER_SOURCE, OVERLAY_SHADER_SOURCE, STAR_SHADER_SOURCE};
    use crate::texture::create_test_device_queue;

    const SURFACE: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    fn module(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("test-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    }

    #[test]
    fn uniform_sizes_are_std140_friendly() {
        // Uniform bindings are checked against these sizes at bind time.
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<BlobUniform>() % 16, 0);
    }

    #[test]
    fn scene_pipelines_build() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let camera = create_camera_bind_group_layout(&device);
        let lights = create_lights_bind_group_layout(&device);
        let blob = create_blob_bind_group_layout(&device);

        let _ = create_lit_pipeline(&device, &module(&device, LIT_SHADER_SOURCE), SURFACE, &camera, &lights);
        let _ = create_star_pipeline(&device, &module(&device, STAR_SHADER_SOURCE), SURFACE, &camera);
        let _ = create_blob_pipeline(&device, &module(&device, BLOB_SHADER_SOURCE), SURFACE, &camera, &blob);
    }

    #[test]
    fn overlay_pipeline_builds_without_depth() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let overlay = create_overlay_bind_group_layout(&device);
        let _ = create_overlay_pipeline(&device, &module(&device, OVERLAY_SHADER_SOURCE), SURFACE, &overlay);
    }
}
