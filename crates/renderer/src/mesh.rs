//! Mesh data structures and primitive generation.

use crate::vertex::Vertex;
use engine_core::Shape;
use glam::Vec3;
use std::f32::consts::TAU;
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Mesh data before GPU upload. Triangles wind counter-clockwise seen from outside.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices)
    }

    pub fn from_shape(shape: &Shape) -> Self {
        match *shape {
            Shape::Plane { width, height } => Self::plane(width, height),
            Shape::Cuboid { width, height, depth } => Self::cuboid(width, height, depth),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                segments,
            } => Self::cylinder(radius_top, radius_bottom, height, segments),
        }
    }

    /// Parallel position/normal arrays, e.g. a generated sphere.
    pub fn from_arrays(positions: &[Vec3], normals: &[Vec3], indices: &[u32]) -> Self {
        let vertices = positions
            .iter()
            .zip(normals)
            .map(|(p, n)| Vertex::new(p.to_array(), n.to_array()))
            .collect();
        Self {
            vertices,
            indices: indices.to_vec(),
        }
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let mut data = Self::new();
        data.push_face(Vec3::ZERO, Vec3::X * (width / 2.0), Vec3::Y * (height / 2.0));
        data
    }

    /// Box centred on the origin.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) / 2.0;
        // (normal, u, v) with u x v = normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let extent = |axis: Vec3| (axis.abs() * half).element_sum();

        let mut data = Self::new();
        for (normal, u, v) in faces {
            data.push_face(normal * extent(normal), u * extent(u), v * extent(v));
        }
        data
    }

    /// Capped cylinder along Y, centred on the origin. `radius_top == 0` gives a cone.
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = height / 2.0;
        let slope = if height > 0.0 { (radius_bottom - radius_top) / height } else { 0.0 };
        let mut data = Self::new();

        // Side: a top and bottom vertex per seam angle; the seam is duplicated.
        let side_start = data.vertices.len() as u32;
        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let normal = Vec3::new(sin, slope, cos).normalize();
            for (radius, y) in [(radius_top, half), (radius_bottom, -half)] {
                data.vertices.push(Vertex::new(
                    [radius * sin, y, radius * cos],
                    normal.to_array(),
                ));
            }
        }
        for s in 0..segments {
            let top = side_start + s * 2;
            let bottom = top + 1;
            let next_top = top + 2;
            let next_bottom = top + 3;
            data.indices.extend_from_slice(&[top, bottom, next_top, bottom, next_bottom, next_top]);
        }

        if radius_top > 0.0 {
            data.push_cap(radius_top, half, segments, true);
        }
        if radius_bottom > 0.0 {
            data.push_cap(radius_bottom, -half, segments, false);
        }
        data
    }

    /// Quad centred at `center` spanning `±u` and `±v`, facing `u x v`.
    fn push_face(&mut self, center: Vec3, u: Vec3, v: Vec3) {
        let normal = u.cross(v).normalize().to_array();
        let base = self.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = center + u * su + v * sv;
            self.vertices.push(Vertex::new(p.to_array(), normal));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_cap(&mut self, radius: f32, y: f32, segments: u32, top: bool) {
        let normal = if top { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
        let center = self.vertices.len() as u32;
        self.vertices.push(Vertex::new([0.0, y, 0.0], normal));
        for s in 0..=segments {
            let (sin, cos) = (s as f32 / segments as f32 * TAU).sin_cos();
            self.vertices.push(Vertex::new([radius * sin, y, radius * cos], normal));
        }
        for s in 0..segments {
            let a = center + 1 + s;
            let b = a + 1;
            if top {
                self.indices.extend_from_slice(&[center, a, b]);
            } else {
                self.indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
}
