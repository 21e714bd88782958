//! Star particle field for the space-travel flythrough.
//!
//! Stars are scattered uniformly through a cube centred on the origin. During travel
//! they stream towards +Z; anything that passes the forward limit is sent back to the
//! far limit, so the field never runs dry. Only `z` ever changes after generation.

use glam::Vec3;
use rand::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarFieldConfig {
    pub count: usize,
    /// Side length of the spawn cube.
    pub spread: f32,
    /// Distance every star moves per travel frame.
    pub step: f32,
    /// Stars with `z` beyond this are recycled.
    pub forward_limit: f32,
    /// `z` a recycled star restarts from.
    pub far_reset: f32,
    pub seed: u64,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            count: 15_000,
            spread: 2000.0,
            step: 5.0,
            forward_limit: 500.0,
            far_reset: -500.0,
            seed: 0x4E1F_E5EE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StarField {
    positions: Vec<Vec3>,
    step: f32,
    forward_limit: f32,
    far_reset: f32,
}

impl StarField {
    pub fn generate(config: &StarFieldConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut coord = || (rng.gen::<f32>() - 0.5) * config.spread;
        let positions = (0..config.count)
            .map(|_| Vec3::new(coord(), coord(), coord()))
            .collect();

        log::debug!("Generated star field: {} stars, spread {}", config.count, config.spread);

        Self {
            positions,
            step: config.step,
            forward_limit: config.forward_limit,
            far_reset: config.far_reset,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Move every star one step towards the camera, recycling those past the forward limit.
    pub fn advance(&mut self) {
        for star in &mut self.positions {
            star.z += self.step;
            if star.z > self.forward_limit {
                star.z = self.far_reset;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> StarFieldConfig {
        StarFieldConfig {
            count: 2000,
            ..Default::default()
        }
    }

    #[test]
    fn generates_requested_count_inside_cube() {
        let config = small();
        let field = StarField::generate(&config);
        assert_eq!(field.len(), 2000);
        let half = config.spread / 2.0;
        assert!(field
            .positions()
            .iter()
            .all(|p| p.abs().max_element() <= half));
    }

    /// Same seed must give the same sky.
    #[test]
    fn generation_is_deterministic() {
        let a = StarField::generate(&small());
        let b = StarField::generate(&small());
        assert_eq!(a.positions(), b.positions());

        let c = StarField::generate(&StarFieldConfig { seed: 7, ..small() });
        assert_ne!(a.positions(), c.positions());
    }

    #[test]
    fn recycling_never_touches_x_or_y() {
        let mut field = StarField::generate(&small());
        let before: Vec<_> = field.positions().iter().map(|p| (p.x, p.y)).collect();
        for _ in 0..1000 {
            field.advance();
        }
        let after: Vec<_> = field.positions().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
        assert_eq!(field.len(), 2000);
    }

    #[test]
    fn stars_past_the_limit_restart_far_away() {
        let mut field = StarField::generate(&small());
        field.advance();
        assert!(field.positions().iter().all(|p| p.z <= 500.0));

        // Any star sitting exactly on the limit wraps on its next step.
        field.positions[0].z = 500.0;
        field.advance();
        assert_eq!(field.positions()[0].z, -500.0);
    }
}
