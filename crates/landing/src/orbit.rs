//! Damped orbit camera for the room: drag rotates, wheel zooms, optional pan.
//!
//! Input is accumulated as pending deltas and bled into the camera a fraction at a
//! time in [`OrbitControls::update`], which gives the glide after a drag is released.

use crate::config::OrbitConfig;
use glam::Vec3;
use renderer::Camera;
use std::f32::consts::{PI, TAU};

/// Keeps phi away from the poles so the up vector never flips.
const POLE_EPSILON: f32 = 1e-6;
const ZOOM_BASE: f32 = 0.95;
const MIN_CHANGE: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitConfig,
    enabled: bool,
    target: Vec3,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
    zoom_scale: f32,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            enabled: false,
            target: Vec3::ZERO,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
            zoom_scale: 1.0,
        }
    }

    /// Start orbiting `target`. The camera's current distance is clamped into range
    /// on the next update.
    pub fn enable(&mut self, target: Vec3) {
        self.enabled = true;
        self.target = target;
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.zoom_scale = 1.0;
        log::debug!("Orbit controls enabled around {:?}", target);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Drag by `(dx, dy)` pixels. A drag across the full viewport height is one turn.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.enabled {
            return;
        }
        let h = viewport_height.max(1.0);
        self.pending_theta -= TAU * dx / h * self.config.rotate_speed;
        self.pending_phi -= TAU * dy / h * self.config.rotate_speed;
    }

    /// Move the target in the camera's view plane. No-op unless panning is enabled.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &Camera) {
        if !self.enabled || !self.config.enable_pan {
            return;
        }
        let h = viewport_height.max(1.0);
        let distance = (camera.position() - self.target).length()
            * (camera.fov_degrees.to_radians() / 2.0).tan();
        let left = -camera.right() * (2.0 * dx * distance / h);
        let up = camera.up() * (2.0 * dy * distance / h);
        self.pending_pan += (left + up) * self.config.pan_speed;
    }

    /// Positive `lines` (wheel up) moves closer.
    pub fn zoom(&mut self, lines: f32) {
        if !self.enabled || lines == 0.0 {
            return;
        }
        self.zoom_scale *= ZOOM_BASE.powf(self.config.zoom_speed * lines);
    }

    /// Apply one damped step. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if !self.enabled {
            return false;
        }
        let damping = self.config.damping_factor.clamp(0.0, 1.0);
        let before = camera.position();

        let offset = before - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };

        theta += self.pending_theta * damping;
        phi = (phi + self.pending_phi * damping).clamp(POLE_EPSILON, PI - POLE_EPSILON);
        radius = (radius * self.zoom_scale)
            .clamp(self.config.min_distance, self.config.max_distance);
        self.target += self.pending_pan * damping;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.transform.position = self.target + offset;
        camera.look_at(self.target);

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_pan *= 1.0 - damping;
        self.zoom_scale = 1.0;

        camera.position().distance_squared(before) > MIN_CHANGE
    }
}
