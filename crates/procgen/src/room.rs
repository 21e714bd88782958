//! Layout of the furnished room the sequence lands in.
//!
//! Fixtures are groups: a fixture transform places the group, each part transform is
//! relative to it. Colours are sRGB hex.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6};

use engine_core::{Renderable, SceneLight, Shape, Transform};
use glam::Vec3;

pub const ROOM_BACKGROUND: u32 = 0xe8dcc8;

const FLOOR_COLOR: u32 = 0xc9b896;
const WALL_COLOR: u32 = 0xf5f0e8;
const COUCH_COLOR: u32 = 0x8b7d6b;
const DESK_TOP_COLOR: u32 = 0xf5f5dc;
const DESK_LEG_COLOR: u32 = 0xe5e5cc;
const LAPTOP_COLOR: u32 = 0xd3d3d3;
const PLANT_COLOR: u32 = 0x2d5016;
const MUG_COLOR: u32 = 0xffffff;
const LAMP_COLOR: u32 = 0xffd700;

#[derive(Debug, Clone)]
pub struct Part {
    pub name: &'static str,
    pub renderable: Renderable,
    pub transform: Transform,
}

impl Part {
    fn new(name: &'static str, shape: Shape, color: u32, transform: Transform) -> Self {
        Self {
            name,
            renderable: Renderable::from_hex(shape, color),
            transform,
        }
    }

    fn at(name: &'static str, shape: Shape, color: u32, position: Vec3) -> Self {
        Self::new(name, shape, color, Transform::from_position(position))
    }
}

#[derive(Debug, Clone)]
pub struct Fixture {
    pub name: &'static str,
    pub transform: Transform,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone)]
pub struct RoomLayout {
    pub background: u32,
    pub fixtures: Vec<Fixture>,
    pub lights: Vec<SceneLight>,
}

/// Floor, three walls, a couch and a desk with its props, plus warm lighting.
pub fn furnished_room() -> RoomLayout {
    RoomLayout {
        background: ROOM_BACKGROUND,
        fixtures: vec![
            floor(),
            wall("back wall", Vec3::new(0.0, 7.5, -10.0), 0.0),
            wall("left wall", Vec3::new(-20.0, 7.5, 10.0), FRAC_PI_2),
            wall("right wall", Vec3::new(20.0, 7.5, 10.0), -FRAC_PI_2),
            couch(),
            desk(),
        ],
        lights: vec![
            SceneLight::Ambient {
                color: 0xffffff,
                intensity: 0.7,
            },
            SceneLight::Directional {
                color: 0xfff5e6,
                intensity: 0.6,
                position: Vec3::new(8.0, 15.0, 10.0),
            },
            SceneLight::Point {
                color: 0xffd700,
                intensity: 0.4,
                position: Vec3::new(-5.0, 5.0, 5.0),
                range: 20.0,
            },
        ],
    }
}

fn floor() -> Fixture {
    let plane = Shape::Plane {
        width: 40.0,
        height: 40.0,
    };
    Fixture {
        name: "floor",
        transform: Transform::from_position_euler(Vec3::ZERO, -FRAC_PI_2, 0.0, 0.0),
        parts: vec![Part::at("floor", plane, FLOOR_COLOR, Vec3::ZERO)],
    }
}

fn wall(name: &'static str, position: Vec3, yaw: f32) -> Fixture {
    let plane = Shape::Plane {
        width: 40.0,
        height: 15.0,
    };
    Fixture {
        name,
        transform: Transform::from_position_euler(position, 0.0, yaw, 0.0),
        parts: vec![Part::at(name, plane, WALL_COLOR, Vec3::ZERO)],
    }
}

fn couch() -> Fixture {
    let seat = Shape::Cuboid { width: 4.0, height: 0.8, depth: 2.0 };
    let back = Shape::Cuboid { width: 4.0, height: 2.0, depth: 0.4 };
    let arm = Shape::Cuboid { width: 0.4, height: 1.5, depth: 2.0 };
    Fixture {
        name: "couch",
        transform: Transform::from_position_euler(Vec3::new(-8.0, 0.0, 5.0), 0.0, FRAC_PI_6, 0.0),
        parts: vec![
            Part::at("seat", seat, COUCH_COLOR, Vec3::new(0.0, 0.8, 0.0)),
            Part::at("backrest", back, COUCH_COLOR, Vec3::new(0.0, 1.8, -0.8)),
            Part::at("left arm", arm, COUCH_COLOR, Vec3::new(-1.8, 1.2, 0.0)),
            Part::at("right arm", arm, COUCH_COLOR, Vec3::new(1.8, 1.2, 0.0)),
        ],
    }
}

fn desk() -> Fixture {
    let top = Shape::Cuboid { width: 7.0, height: 0.15, depth: 3.5 };
    let leg = Shape::Cuboid { width: 0.15, height: 2.0, depth: 0.15 };
    let laptop_base = Shape::Cuboid { width: 1.8, height: 0.08, depth: 1.3 };
    let laptop_screen = Shape::Cuboid { width: 1.8, height: 1.1, depth: 0.08 };

    let mut parts = vec![Part::at("desktop", top, DESK_TOP_COLOR, Vec3::new(0.0, 2.0, 0.0))];
    for (x, z) in [(-3.2, -1.5), (3.2, -1.5), (-3.2, 1.5), (3.2, 1.5)] {
        parts.push(Part::at("leg", leg, DESK_LEG_COLOR, Vec3::new(x, 1.0, z)));
    }
    parts.extend([
        Part::at("laptop base", laptop_base, LAPTOP_COLOR, Vec3::new(0.0, 2.12, 0.0)),
        Part::new(
            "laptop screen",
            laptop_screen,
            LAPTOP_COLOR,
            Transform::from_position_euler(Vec3::new(0.0, 2.7, -0.6), -0.3, 0.0, 0.0),
        ),
        Part::at("plant", Shape::cone(0.4, 1.2, 8), PLANT_COLOR, Vec3::new(-2.8, 2.7, 0.0)),
        Part::at("mug", Shape::cylinder(0.15, 0.35, 16), MUG_COLOR, Vec3::new(2.2, 2.3, 0.4)),
        Part::at("lamp pole", Shape::cylinder(0.05, 1.5, 8), LAMP_COLOR, Vec3::new(-2.0, 2.85, 0.8)),
        Part::at("lamp shade", Shape::cone(0.3, 0.4, 8), LAMP_COLOR, Vec3::new(-2.0, 3.6, 0.8)),
    ]);

    Fixture {
        name: "desk",
        transform: Transform::default(),
        parts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn room_has_six_fixtures_with_unique_names() {
        let room = furnished_room();
        assert_eq!(room.fixtures.len(), 6);
        let names: HashSet<_> = room.fixtures.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn furniture_part_counts() {
        let room = furnished_room();
        let count = |name: &str| {
            room.fixtures
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.parts.len())
                .unwrap_or(0)
        };
        assert_eq!(count("couch"), 4);
        assert_eq!(count("desk"), 11);
        assert_eq!(count("floor"), 1);
    }

    #[test]
    fn floor_faces_up() {
        let room = furnished_room();
        let floor = &room.fixtures[0];
        let normal = floor.transform.rotation * Vec3::Z;
        assert!(normal.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn side_walls_face_the_room() {
        let room = furnished_room();
        for fixture in room.fixtures.iter().filter(|f| f.name.ends_with("wall")) {
            let normal = fixture.transform.rotation * Vec3::Z;
            let inward = -fixture.transform.position.with_y(0.0).with_z(0.0).normalize_or_zero();
            if fixture.name != "back wall" {
                assert!(normal.abs_diff_eq(inward, 1e-5), "{}", fixture.name);
            } else {
                assert!(normal.abs_diff_eq(Vec3::Z, 1e-5));
            }
        }
    }

    #[test]
    fn lights_cover_ambient_sun_and_lamp() {
        let room = furnished_room();
        assert_eq!(room.lights.len(), 3);
        assert!(room.lights.iter().any(|l| matches!(l, SceneLight::Point { range, .. } if *range == 20.0)));
        assert_eq!(room.background, 0xe8dcc8);
    }
}
