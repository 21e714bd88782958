//! Render passes for one frame: clear, stars, room, blob planet, overlay.

mod overlay;

use engine_core::{hex_to_srgb, srgb_to_linear, Shape, Transform};
use landing::scene::{placed_parts, scene_lights};
use landing::SceneSession;
use procgen::{BlobPlanet, StarField};
use renderer::{InstanceData, LightsUniform, Mesh, MeshData, Renderer};

/// GPU meshes built lazily from the scene and kept across frames.
#[derive(Default)]
pub struct GpuScene {
    blob_mesh: Option<Mesh>,
    /// One mesh per distinct room shape; parts sharing a shape draw as one batch.
    shape_meshes: Vec<(Shape, Mesh)>,
    lights_uploaded: bool,
}

impl GpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn mesh_index(&mut self, device: &wgpu::Device, shape: &Shape) -> usize {
        if let Some(index) = self.shape_meshes.iter().position(|(s, _)| s == shape) {
            return index;
        }
        self.shape_meshes
            .push((*shape, MeshData::from_shape(shape).upload(device)));
        self.shape_meshes.len() - 1
    }
}

/// Draw the session's current state.
pub fn frame(
    renderer: &mut Renderer,
    session: &SceneSession,
    gpu: &mut GpuScene,
) -> Result<(), wgpu::SurfaceError> {
    let (output, mut encoder) = renderer.begin_frame()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let world = session.world();

    renderer.update_camera(session.camera());
    renderer.clear(
        &mut encoder,
        &view,
        hex_to_srgb(session.background()).map(srgb_to_linear),
    );

    if let Some(entity) = session.star_field() {
        if let Ok(field) = world.get::<&StarField>(entity) {
            renderer.render_stars(&mut encoder, &view, field.positions());
        }
    }

    if !session.room().is_empty() {
        if !gpu.lights_uploaded {
            renderer.update_lights(&LightsUniform::from_lights(&scene_lights(world)));
            gpu.lights_uploaded = true;
        }

        let mut batches: Vec<Vec<InstanceData>> = Vec::new();
        for part in placed_parts(world) {
            let index = gpu.mesh_index(renderer.device(), &part.renderable.shape);
            if batches.len() <= index {
                batches.resize_with(index + 1, Vec::new);
            }
            batches[index].push(InstanceData::new(
                part.model.to_cols_array_2d(),
                part.renderable.linear_color(),
            ));
        }
        for (index, instances) in batches.iter().enumerate() {
            renderer.render_instanced_load(&mut encoder, &view, &gpu.shape_meshes[index].1, instances);
        }
    }

    // Transparent, so drawn after everything opaque.
    match session.planet() {
        Some(entity) => {
            if let (Ok(transform), Ok(planet)) = (
                world.get::<&Transform>(entity),
                world.get::<&BlobPlanet>(entity),
            ) {
                let mesh = gpu.blob_mesh.get_or_insert_with(|| {
                    let base = &planet.base;
                    MeshData::from_arrays(&base.positions, &base.normals, &base.indices)
                        .upload(renderer.device())
                });
                renderer.update_blob(transform.to_matrix(), planet.time, planet.opacity);
                renderer.render_blob(&mut encoder, &view, mesh);
            }
        }
        None => gpu.blob_mesh = None,
    }

    let (w, h) = renderer.dimensions();
    let text = overlay::build(session.overlay(), w as f32, h as f32);
    renderer.render_overlay(&mut encoder, &view, &text.vertices, &text.indices);

    renderer.end_frame(output, encoder);
    Ok(())
}
