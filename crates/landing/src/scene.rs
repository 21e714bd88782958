//! Spawning and querying the scene's entities.

use engine_core::{world_matrix, Parent, Renderable, RoomPiece, SceneLight, Transform};
use glam::{Mat4, Vec3};
use hecs::{Entity, World};
use procgen::{BlobPlanet, RoomLayout, StarField, StarFieldConfig};

pub fn spawn_star_field(world: &mut World, config: &StarFieldConfig) -> Entity {
    let field = StarField::generate(config);
    log::debug!("Spawned star field with {} stars", field.len());
    world.spawn((field,))
}

pub fn spawn_planet(world: &mut World, position: Vec3, radius: f32, detail: u32) -> Entity {
    let planet = BlobPlanet::new(radius, detail);
    log::debug!(
        "Spawned blob planet at {:?} ({} triangles)",
        position,
        planet.base.triangle_count()
    );
    world.spawn((Transform::from_position(position), planet))
}

/// Spawn every fixture as a `RoomPiece` with its parts as children, plus the lights.
/// Returns the fixture entities.
pub fn spawn_room(world: &mut World, layout: &RoomLayout) -> Vec<Entity> {
    let mut fixtures = Vec::with_capacity(layout.fixtures.len());
    for fixture in &layout.fixtures {
        let root = world.spawn((RoomPiece { name: fixture.name }, fixture.transform));
        for part in &fixture.parts {
            world.spawn((Parent(root), part.transform, part.renderable));
        }
        fixtures.push(root);
    }
    for light in &layout.lights {
        world.spawn((*light,));
    }
    log::debug!(
        "Spawned room: {} fixtures, {} lights",
        fixtures.len(),
        layout.lights.len()
    );
    fixtures
}

pub fn room_piece_count(world: &World) -> usize {
    world.query::<&RoomPiece>().iter().count()
}

pub fn scene_lights(world: &World) -> Vec<SceneLight> {
    world
        .query::<&SceneLight>()
        .iter()
        .map(|(_, light)| *light)
        .collect()
}

/// A renderable part resolved to world space.
#[derive(Debug, Clone, Copy)]
pub struct PlacedPart {
    pub entity: Entity,
    pub renderable: Renderable,
    pub model: Mat4,
}

pub fn placed_parts(world: &World) -> Vec<PlacedPart> {
    let entities: Vec<(Entity, Renderable)> = world
        .query::<&Renderable>()
        .iter()
        .map(|(entity, renderable)| (entity, *renderable))
        .collect();
    entities
        .into_iter()
        .filter_map(|(entity, renderable)| {
            world_matrix(world, entity).map(|model| PlacedPart {
                entity,
                renderable,
                model,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::furnished_room;

    #[test]
    fn room_spawns_six_pieces_and_three_lights() {
        let mut world = World::new();
        let layout = furnished_room();
        let fixtures = spawn_room(&mut world, &layout);
        assert_eq!(fixtures.len(), 6);
        assert_eq!(room_piece_count(&world), 6);
        assert_eq!(scene_lights(&world).len(), 3);

        let part_count: usize = layout.fixtures.iter().map(|f| f.parts.len()).sum();
        assert_eq!(placed_parts(&world).len(), part_count);
    }

    #[test]
    fn parts_inherit_fixture_transform() {
        let mut world = World::new();
        let layout = furnished_room();
        let fixtures = spawn_room(&mut world, &layout);

        let couch_index = layout
            .fixtures
            .iter()
            .position(|f| f.name == "couch")
            .unwrap();
        let couch = fixtures[couch_index];
        let parent_matrix = layout.fixtures[couch_index].transform.to_matrix();

        let mut children = 0;
        for part in placed_parts(&world) {
            let is_child = world
                .get::<&Parent>(part.entity)
                .map(|p| p.0 == couch)
                .unwrap_or(false);
            if is_child {
                let local = world.get::<&Transform>(part.entity).unwrap().to_matrix();
                assert!(part.model.abs_diff_eq(parent_matrix * local, 1e-5));
                children += 1;
            }
        }
        assert_eq!(children, layout.fixtures[couch_index].parts.len());
    }

    #[test]
    fn star_field_and_planet_are_separate_entities() {
        let mut world = World::new();
        let stars = spawn_star_field(
            &mut world,
            &StarFieldConfig {
                count: 100,
                ..StarFieldConfig::default()
            },
        );
        let planet = spawn_planet(&mut world, Vec3::new(0.0, 0.0, 100.0), 8.0, 1);
        assert_eq!(world.get::<&StarField>(stars).unwrap().len(), 100);
        assert_eq!(
            world.get::<&Transform>(planet).unwrap().position,
            Vec3::new(0.0, 0.0, 100.0)
        );
        assert!(world.get::<&BlobPlanet>(stars).is_err());
    }
}
