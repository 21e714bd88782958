//! Common ECS components for the scene graph.

use glam::{Mat4, Vec3};
use hecs::{Entity, World};

use crate::Transform;

/// Primitive mesh shapes, sized in world units and centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Flat rectangle in the local XY plane, facing +Z.
    Plane { width: f32, height: f32 },
    Cuboid { width: f32, height: f32, depth: f32 },
    /// Capped cylinder along Y. A zero top radius makes a cone.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
}

impl Shape {
    pub fn cone(radius: f32, height: f32, segments: u32) -> Self {
        Shape::Cylinder {
            radius_top: 0.0,
            radius_bottom: radius,
            height,
            segments,
        }
    }

    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        Shape::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            segments,
        }
    }
}

/// A flat-coloured shape drawn by the lit pipeline. Colour is sRGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub shape: Shape,
    pub color: [f32; 4],
}

impl Renderable {
    pub fn from_hex(shape: Shape, hex: u32) -> Self {
        let [r, g, b] = hex_to_srgb(hex);
        Self {
            shape,
            color: [r, g, b, 1.0],
        }
    }

    /// Colour converted to linear space for an sRGB render target.
    pub fn linear_color(&self) -> [f32; 4] {
        let [r, g, b, a] = self.color;
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
    }
}

/// Split `0xRRGGBB` into sRGB components in 0..=1.
pub fn hex_to_srgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Child link. The child's transform is relative to the parent entity's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Top-level piece of room furniture or architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomPiece {
    pub name: &'static str,
}

/// Light source. Colours are sRGB hex, positions are world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneLight {
    Ambient {
        color: u32,
        intensity: f32,
    },
    /// Shines from `position` towards the origin.
    Directional {
        color: u32,
        intensity: f32,
        position: Vec3,
    },
    Point {
        color: u32,
        intensity: f32,
        position: Vec3,
        range: f32,
    },
}

/// World matrix of an entity, composed through its `Parent` chain.
///
/// Returns `None` if the entity or an ancestor has no `Transform`.
pub fn world_matrix(world: &World, entity: Entity) -> Option<Mat4> {
    let mut matrix = Mat4::IDENTITY;
    let mut current = entity;
    loop {
        let local = world.get::<&Transform>(current).ok()?.to_matrix();
        matrix = local * matrix;
        match world.get::<&Parent>(current) {
            Ok(parent) => current = parent.0,
            Err(_) => return Some(matrix),
        }
    }
}
