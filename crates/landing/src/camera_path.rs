//! Scripted camera moves: the travel push and the fly-through into the room.
//!
//! Everything here is a pure function of progress, so any frame of the cinematic can
//! be reproduced from a single number.

use engine_core::look_rotation;
use glam::{EulerRot, Quat, Vec3};
use std::f32::consts::{PI, TAU};
use std::time::Duration;

pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Yaw about +Y (zero looks down -Z) and pitch of a view direction.
fn heading(direction: Vec3) -> (f32, f32) {
    let d = direction.normalize_or_zero();
    ((-d.x).atan2(-d.z), d.y.clamp(-1.0, 1.0).asin())
}

fn heading_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Wrap into [-PI, PI).
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// `elapsed / duration` clamped to [0, 1]. A zero duration is already complete.
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Straight push along +Z from the origin to `distance`, always facing the planet.
pub fn travel_pose(progress: f32, distance: f32, planet: Vec3) -> Pose {
    let position = Vec3::new(0.0, 0.0, progress.clamp(0.0, 1.0) * distance);
    Pose {
        position,
        rotation: look_rotation(position, planet, Vec3::Y),
    }
}

/// Share of the entry path between progress `from` and `to` that runs the planet
/// clock fast. Same units as progress.
pub fn boosted_progress(from: f32, to: f32) -> f32 {
    (to.min(PUSH_END) - from.max(ARC_END)).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterSegment {
    /// Swing sideways and up around the planet.
    Arc,
    /// Dive into the planet while it swells.
    Push,
    /// Rise out of it while it fades.
    Inside,
    /// Drop down to the room viewpoint.
    Descend,
}

/// One frame of the room entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnterSample {
    pub segment: EnterSegment,
    pub pose: Pose,
    pub planet_scale: f32,
    pub planet_opacity: f32,
    /// Planet clock runs fast during the push.
    pub boost_planet_time: bool,
    pub stars_visible: bool,
    pub planet_visible: bool,
}

const ARC_END: f32 = 0.2;
const PUSH_END: f32 = 0.5;
const INSIDE_END: f32 = 0.7;
const STARS_HIDDEN_AT: f32 = 0.6;
const PLANET_HIDDEN_AT: f32 = 0.7;

const ARC_SWING: f32 = 20.0;
const ARC_RISE: f32 = 10.0;
const MAX_PLANET_SCALE: f32 = 5.0;

/// Key points of the entry path. The path starts where travel ended and finishes at
/// the room viewpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnterPath {
    start: Vec3,
    planet: Vec3,
    arc_end: Vec3,
    push_end: Vec3,
    inside_end: Vec3,
    room_eye: Vec3,
    room_target: Vec3,
    /// Heading held from the top of the arc until the descent turns towards the room.
    held_yaw: f32,
    held_pitch: f32,
    /// Heading from the room viewpoint to its target.
    final_yaw: f32,
    /// Signed yaw the descent turns through, fixed up front so the turn never flips.
    turn: f32,
}

impl EnterPath {
    pub fn new(start: Vec3, planet: Vec3, room_eye: Vec3, room_target: Vec3) -> Self {
        let arc_end = start + Vec3::Y * ARC_RISE;
        let push_end = Vec3::new(start.x, start.y, planet.z + 10.0);
        let inside_end = push_end + Vec3::new(0.0, 30.0, 20.0);
        let (held_yaw, held_pitch) = heading(planet - arc_end);
        let (final_yaw, _) = heading(room_target - room_eye);
        Self {
            start,
            planet,
            arc_end,
            push_end,
            inside_end,
            room_eye,
            room_target,
            held_yaw,
            held_pitch,
            final_yaw,
            turn: wrap_angle(final_yaw - held_yaw),
        }
    }

    /// Sample at progress `t`, clamped to [0, 1].
    pub fn sample(&self, t: f32) -> EnterSample {
        let t = t.clamp(0.0, 1.0);
        let mut sample = EnterSample {
            segment: EnterSegment::Arc,
            pose: Pose {
                position: self.start,
                rotation: heading_rotation(self.held_yaw, self.held_pitch),
            },
            planet_scale: 1.0,
            planet_opacity: 1.0,
            boost_planet_time: false,
            stars_visible: t < STARS_HIDDEN_AT,
            planet_visible: t < PLANET_HIDDEN_AT,
        };

        if t < ARC_END {
            let e = ease_in_out_quad(t / ARC_END);
            let position = self.start
                + Vec3::new(
                    (PI * e).sin() * ARC_SWING,
                    (1.0 - (PI * e).cos()) * ARC_RISE / 2.0,
                    0.0,
                );
            sample.pose = Pose {
                position,
                rotation: look_rotation(position, self.planet, Vec3::Y),
            };
        } else if t < PUSH_END {
            let u = (t - ARC_END) / (PUSH_END - ARC_END);
            sample.segment = EnterSegment::Push;
            sample.pose.position = self.arc_end.lerp(self.push_end, u);
            sample.planet_scale = 1.0 + (MAX_PLANET_SCALE - 1.0) * u;
            sample.boost_planet_time = true;
        } else if t < INSIDE_END {
            let u = (t - PUSH_END) / (INSIDE_END - PUSH_END);
            sample.segment = EnterSegment::Inside;
            sample.pose.position = self.push_end.lerp(self.inside_end, u);
            sample.planet_scale = MAX_PLANET_SCALE;
            sample.planet_opacity = 1.0 - u;
        } else {
            let u = (t - INSIDE_END) / (1.0 - INSIDE_END);
            sample.segment = EnterSegment::Descend;
            let position = self.inside_end.lerp(self.room_eye, u);
            let (yaw, pitch) = heading(self.room_target - position);
            let yaw = self.held_yaw + self.turn + wrap_angle(yaw - self.final_yaw);
            let e = ease_in_out_quad(u);
            sample.pose = Pose {
                position,
                rotation: heading_rotation(
                    self.held_yaw + (yaw - self.held_yaw) * e,
                    self.held_pitch + (pitch - self.held_pitch) * e,
                ),
            };
            sample.planet_scale = MAX_PLANET_SCALE;
            sample.planet_opacity = 0.0;
        }
        sample
    }
}
