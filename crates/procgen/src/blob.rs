//! Blob planet surface: wobbling displacement and pastel colouring.
//!
//! `displacement` and `surface_color` are the CPU twins of the functions in the
//! renderer's `blob.wgsl`. Keep the constants in sync.

use glam::{Vec2, Vec3};

use crate::icosphere::{icosphere, SphereMesh};

/// Overall scale applied to the summed waves.
pub const DISPLACEMENT_SCALE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Basis {
    X,
    Y,
    Z,
    /// Length of the XY projection.
    RadialXy,
    /// Length of the YZ projection.
    RadialYz,
}

#[derive(Debug, Clone, Copy)]
struct Wave {
    basis: Basis,
    cosine: bool,
    frequency: f32,
    speed: f32,
    amplitude: f32,
}

const WAVES: [Wave; 5] = [
    Wave { basis: Basis::X, cosine: false, frequency: 1.5, speed: 2.0, amplitude: 0.6 },
    Wave { basis: Basis::Y, cosine: true, frequency: 1.8, speed: 2.5, amplitude: 0.6 },
    Wave { basis: Basis::Z, cosine: false, frequency: 1.3, speed: 2.2, amplitude: 0.6 },
    Wave { basis: Basis::RadialXy, cosine: false, frequency: 1.2, speed: 1.8, amplitude: 0.5 },
    Wave { basis: Basis::RadialYz, cosine: true, frequency: 1.4, speed: 2.3, amplitude: 0.5 },
];

impl Wave {
    fn sample(&self, p: Vec3, time: f32) -> f32 {
        let s = match self.basis {
            Basis::X => p.x,
            Basis::Y => p.y,
            Basis::Z => p.z,
            Basis::RadialXy => Vec2::new(p.x, p.y).length(),
            Basis::RadialYz => Vec2::new(p.y, p.z).length(),
        };
        let phase = s * self.frequency + time * self.speed;
        let osc = if self.cosine { phase.cos() } else { phase.sin() };
        osc * self.amplitude
    }
}

/// Upper bound on `|displacement|` for any input.
pub fn max_displacement() -> f32 {
    WAVES.iter().map(|w| w.amplitude).sum::<f32>() * DISPLACEMENT_SCALE
}

/// Offset along the normal for an undisplaced surface point at `time`.
pub fn displacement(position: Vec3, time: f32) -> f32 {
    WAVES.iter().map(|w| w.sample(position, time)).sum::<f32>() * DISPLACEMENT_SCALE
}

pub fn displace(position: Vec3, normal: Vec3, time: f32) -> Vec3 {
    position + normal * displacement(position, time)
}

pub const PINK: Vec3 = Vec3::new(0.95, 0.6, 0.7);
pub const BLUE: Vec3 = Vec3::new(0.5, 0.7, 0.95);
pub const PURPLE: Vec3 = Vec3::new(0.75, 0.55, 0.85);
pub const PEACH: Vec3 = Vec3::new(0.98, 0.75, 0.65);
pub const RIM_TINT: Vec3 = Vec3::new(0.5, 0.6, 0.7);
pub const SURFACE_ALPHA: f32 = 0.95;

/// Rim light strength from a view-space normal: 0 facing the camera, 1 edge-on.
pub fn fresnel(view_normal: Vec3) -> f32 {
    (1.0 - view_normal.dot(Vec3::Z).abs()).max(0.0).powi(3)
}

/// Display colour of the undisplaced surface point `position` seen with `view_normal`.
pub fn surface_color(position: Vec3, view_normal: Vec3, time: f32) -> Vec3 {
    let band = |s: f32, freq: f32, speed: f32| (s * freq + time * speed).sin() * 0.5 + 0.5;
    let n1 = band(position.x, 1.5, 0.5);
    let n2 = band(position.y, 1.2, 0.7);
    let n3 = band(position.z, 1.3, 0.6);

    let mut color = PINK.lerp(BLUE, n1);
    color = color.lerp(PURPLE, n2 * 0.8);
    color = color.lerp(PEACH, n3 * 0.6);
    color + RIM_TINT * fresnel(view_normal)
}

/// Live state of the blob planet. Scale lives on the entity's `Transform`.
#[derive(Debug, Clone)]
pub struct BlobPlanet {
    /// Animation clock fed to the displacement and colour functions.
    pub time: f32,
    /// Multiplies the surface alpha.
    pub opacity: f32,
    pub base: SphereMesh,
}

impl BlobPlanet {
    pub fn new(radius: f32, detail: u32) -> Self {
        Self {
            time: 0.0,
            opacity: 1.0,
            base: icosphere(radius, detail),
        }
    }

    pub fn alpha(&self) -> f32 {
        SURFACE_ALPHA * self.opacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_at_origin_matches_hand_computed_value() {
        // Only the two cosine waves contribute: (0.6 + 0.5) * 0.25.
        assert!((displacement(Vec3::ZERO, 0.0) - 0.275).abs() < 1e-6);
    }

    #[test]
    fn displacement_is_deterministic_and_bounded() {
        let sphere = icosphere(8.0, 2);
        for t in [0.0, 0.015, 1.7, 42.0] {
            for p in &sphere.positions {
                let d = displacement(*p, t);
                assert_eq!(d, displacement(*p, t));
                assert!(d.abs() <= max_displacement() + 1e-5);
            }
        }
        assert!((max_displacement() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn displacement_moves_along_the_normal() {
        let p = Vec3::new(0.0, 8.0, 0.0);
        let n = Vec3::Y;
        let moved = displace(p, n, 0.3);
        assert_eq!(moved.x, 0.0);
        assert_eq!(moved.z, 0.0);
        assert!((moved.y - (8.0 + displacement(p, 0.3))).abs() < 1e-6);
    }

    #[test]
    fn small_time_steps_give_small_changes() {
        let p = Vec3::new(3.0, -2.0, 6.5);
        let a = displacement(p, 10.0);
        let b = displacement(p, 10.0 + 0.015);
        // Derivative is bounded by sum(amplitude * speed) * scale.
        assert!((a - b).abs() < 0.015 * 3.0);
    }

    #[test]
    fn colour_at_origin_facing_camera() {
        let c = surface_color(Vec3::ZERO, Vec3::Z, 0.0);
        assert!(c.abs_diff_eq(Vec3::new(0.8085, 0.652, 0.7795), 1e-4));
    }

    #[test]
    fn fresnel_peaks_at_the_rim() {
        assert_eq!(fresnel(Vec3::Z), 0.0);
        assert_eq!(fresnel(-Vec3::Z), 0.0);
        assert!((fresnel(Vec3::X) - 1.0).abs() < 1e-6);

        let rim = surface_color(Vec3::ZERO, Vec3::X, 0.0);
        let centre = surface_color(Vec3::ZERO, Vec3::Z, 0.0);
        assert!(rim.abs_diff_eq(centre + RIM_TINT, 1e-5));
    }

    #[test]
    fn fading_scales_alpha() {
        let mut planet = BlobPlanet::new(8.0, 1);
        assert!((planet.alpha() - 0.95).abs() < 1e-6);
        planet.opacity = 0.5;
        assert!((planet.alpha() - 0.475).abs() < 1e-6);
    }
}
