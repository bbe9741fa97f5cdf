//! Cosmetic circular orbits. Angles are recomputed from the tick count every
//! time, never integrated, so a body observed after any number of skipped
//! ticks is exactly where it would have been.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::vector::Vec2;

/// Fixed circular orbit around a local centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    /// Orbit centre, local to the sector.
    pub center: Vec2,
    pub radius: f64,
    /// Phase at tick zero, radians in `[0, 2π)`.
    pub start_angle: f64,
    /// Radians per tick; negative for retrograde orbits.
    pub angular_speed: f64,
}

impl Orbit {
    /// Angular position at `tick`, normalized to `[0, 2π)`.
    pub fn angle_at(&self, tick: u64) -> f64 {
        angle_at(self.start_angle, self.angular_speed, tick)
    }

    /// Local position at `tick`.
    pub fn position_at(&self, tick: u64) -> Vec2 {
        self.center + Vec2::from_angle(self.angle_at(tick), self.radius)
    }
}

/// `(start + speed * tick) mod 2π`.
pub fn angle_at(start_angle: f64, angular_speed: f64, tick: u64) -> f64 {
    // Reduce the per-tick phase first so large tick counts keep precision.
    let turns = (angular_speed * tick as f64).rem_euclid(TAU);
    (start_angle + turns).rem_euclid(TAU)
}
