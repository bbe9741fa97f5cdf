//! 2D vector math shared by generation, steering and the engine.
//!
//! Coordinates are `f64` so absolute positions stay precise far from the
//! origin sector.

use serde::{Deserialize, Serialize};

/// 2D vector / point
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle` radians, scaled by `length`.
    pub fn from_angle(angle: f64, length: f64) -> Self {
        Self {
            x: angle.cos() * length,
            y: angle.sin() * length,
        }
    }

    pub fn length_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Cheap magnitude estimate (max + weighted min), within ~1% of
    /// [`Vec2::length`]. Homogeneous of degree one, so it is linear along
    /// any fixed direction.
    pub fn approx_length(&self) -> f64 {
        let a = self.x.abs();
        let b = self.y.abs();
        let lo = a.min(b);
        let hi = a.max(b);
        hi + 3.0 * lo / 32.0 + (2.0 * lo - hi).max(0.0) / 8.0 + (4.0 * lo - hi).max(0.0) / 16.0
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        (*other - *self).length_squared()
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length (or
    /// non-finite) input.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Same direction with magnitude `magnitude`. Zero stays zero.
    pub fn with_length(&self, magnitude: f64) -> Self {
        self.normalize() * magnitude
    }

    /// Clamp the magnitude to at most `max`.
    pub fn limit(&self, max: f64) -> Self {
        let max = max.max(0.0);
        if self.length_squared() <= max * max {
            *self
        } else {
            self.with_length(max)
        }
    }

    /// Heading angle in radians; zero for the zero vector.
    pub fn angle(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            self.y.atan2(self.x)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl std::ops::Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        if scalar == 0.0 {
            return Self::ZERO;
        }
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Linearly remap `value` from `[lo1, hi1]` onto `[lo2, hi2]`.
///
/// A zero-width source range maps everything to `lo2`.
pub fn remap(value: f64, lo1: f64, hi1: f64, lo2: f64, hi2: f64) -> f64 {
    let width = hi1 - lo1;
    if width == 0.0 || !width.is_finite() {
        return lo2;
    }
    (value - lo1) / width * (hi2 - lo2) + lo2
}
