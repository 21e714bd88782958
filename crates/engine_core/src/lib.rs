//! Core types shared by every crate of the landing sequence.
//!
//! - Transform and scene-graph components
//! - Frame time and the deterministic timer queue that replaces timeouts/intervals

pub mod components;
pub mod time;
pub mod timer;
pub mod transform;

pub use components::*;
pub use time::*;
pub use timer::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use hecs::{Entity, World};
