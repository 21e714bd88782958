//! Transform component and utilities for spatial positioning.

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, rotation and scale of a scene object, relative to its parent when it has one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from a position and XYZ Euler angles in radians.
    pub fn from_position_euler(position: Vec3, x: f32, y: f32, z: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            ..Default::default()
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Turn to face a target position. No-op when the target is the current position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if (target - self.position).length_squared() > 1e-8 {
            self.rotation = look_rotation(self.position, target, up);
        }
    }
}

/// Rotation that points the local -Z axis from `eye` at `target`.
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    if (target - eye).length_squared() <= 1e-8 {
        return Quat::IDENTITY;
    }
    Quat::from_mat4(&Mat4::look_at_rh(eye, target, up)).inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(0.0, 5.0, 15.0));
        let target = Vec3::new(0.0, 3.0, 0.0);
        t.look_at(target, Vec3::Y);
        let expected = (target - t.position).normalize();
        assert!(t.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn look_at_own_position_keeps_rotation() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.rotation = Quat::from_rotation_y(0.5);
        t.look_at(t.position, Vec3::Y);
        assert!(t.rotation.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
    }

    #[test]
    fn euler_floor_rotation_faces_up() {
        // A plane facing +Z laid flat as a floor.
        let t = Transform::from_position_euler(Vec3::ZERO, -std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        assert!((t.rotation * Vec3::Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn matrix_applies_scale_before_translation() {
        let mut t = Transform::from_position(Vec3::new(0.0, 0.0, 100.0));
        t.set_uniform_scale(5.0);
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(5.0, 0.0, 100.0), 1e-5));
    }
}
