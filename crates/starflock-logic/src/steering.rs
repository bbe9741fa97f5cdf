//! Stateless steering primitives shared by the player and every flock agent.
//!
//! Callers accumulate forces into [`Kinematics::acceleration`] and then call
//! [`integrate`] once per tick. Nothing here reads global state, and every
//! function returns a finite zero vector for degenerate input instead of NaN.

use serde::{Deserialize, Serialize};

use crate::vector::{remap, Vec2};

/// Position, velocity and accumulated acceleration of a mobile entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

impl Kinematics {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Add a force to the acceleration accumulator.
    pub fn apply_force(&mut self, force: Vec2) {
        if force.is_finite() {
            self.acceleration += force;
        }
    }
}

/// What a point force represents. Only used for bookkeeping; the maths is
/// the same for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointForceKind {
    Star,
    Body,
    Player,
    Reward,
}

/// A radius-bounded attractor (positive strength) or repulsor (negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointForce {
    pub position: Vec2,
    pub radius: f64,
    pub strength: f64,
    pub kind: PointForceKind,
}

impl PointForce {
    pub fn new(kind: PointForceKind, position: Vec2, radius: f64, strength: f64) -> Self {
        Self {
            position,
            radius,
            strength,
            kind,
        }
    }

    /// Same source with a different strength.
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }
}

/// Steer toward `target` at full speed.
pub fn seek(target: Vec2, max_speed: f64, max_force: f64, position: Vec2, velocity: Vec2) -> Vec2 {
    let desired = (target - position).with_length(max_speed);
    (desired - velocity).limit(max_force)
}

/// Desired approach speed at `distance` from a goal: scales linearly from 0
/// at the goal to `max_speed` at `slow_radius` and beyond.
pub fn desired_speed(distance: f64, slow_radius: f64, max_speed: f64) -> f64 {
    if distance < slow_radius {
        remap(distance, 0.0, slow_radius, 0.0, max_speed).clamp(0.0, max_speed)
    } else {
        max_speed
    }
}

/// Like [`seek`] but decelerating inside `slow_radius`, so the mover settles
/// on the goal instead of orbiting it.
pub fn arrive(
    target: Vec2,
    slow_radius: f64,
    max_speed: f64,
    max_force: f64,
    position: Vec2,
    velocity: Vec2,
) -> Vec2 {
    let offset = target - position;
    let speed = desired_speed(offset.approx_length(), slow_radius, max_speed);
    let desired = offset.with_length(speed);
    (desired - velocity).limit(max_force)
}

/// Force exerted by `source` on a circle at `self_position` with
/// `self_radius`: zero unless the two circles overlap, otherwise the unit
/// direction toward the source scaled by `source.strength`.
pub fn point_force(source: &PointForce, self_position: Vec2, self_radius: f64) -> Vec2 {
    let offset = source.position - self_position;
    let reach = source.radius + self_radius;
    if offset.length_squared() < reach * reach {
        offset.normalize() * source.strength
    } else {
        Vec2::ZERO
    }
}

/// Sum of [`point_force`] over many sources.
pub fn sum_point_forces<'a>(
    sources: impl IntoIterator<Item = &'a PointForce>,
    self_position: Vec2,
    self_radius: f64,
) -> Vec2 {
    sources
        .into_iter()
        .fold(Vec2::ZERO, |acc, s| acc + point_force(s, self_position, self_radius))
}

/// Advance one tick: velocity += acceleration (clamped to `max_speed`),
/// position += velocity, acceleration scaled by `acceleration_decay`
/// (0 resets it).
pub fn integrate(k: Kinematics, max_speed: f64, acceleration_decay: f64) -> Kinematics {
    let velocity = (k.velocity + k.acceleration).limit(max_speed);
    let velocity = if velocity.is_finite() { velocity } else { Vec2::ZERO };
    Kinematics {
        position: k.position + velocity,
        velocity,
        acceleration: k.acceleration * acceleration_decay.clamp(0.0, 1.0),
    }
}
