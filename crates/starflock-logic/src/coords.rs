//! Sector coordinates, the active window, and local/absolute position math.

use serde::{Deserialize, Serialize};

use crate::vector::Vec2;

/// Integer address of a sector. Used directly as a hash key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorCoord {
    pub x: i32,
    pub y: i32,
}

impl SectorCoord {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Chebyshev (king-move) distance between two sectors.
    pub fn chebyshev(&self, other: &Self) -> i32 {
        let dx = (i64::from(self.x) - i64::from(other.x)).abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).abs();
        dx.max(dy).min(i64::from(i32::MAX)) as i32
    }

    /// World-space origin (top-left corner) of this sector.
    pub fn origin(&self, sector_size: f64) -> Vec2 {
        Vec2::new(f64::from(self.x) * sector_size, f64::from(self.y) * sector_size)
    }

    /// Convert a sector-local position to an absolute one.
    pub fn to_absolute(&self, local: Vec2, sector_size: f64) -> Vec2 {
        self.origin(sector_size) + local
    }

    /// Convert an absolute position to a position local to this sector.
    pub fn to_local(&self, absolute: Vec2, sector_size: f64) -> Vec2 {
        absolute - self.origin(sector_size)
    }

    /// Sector containing an absolute position.
    pub fn containing(absolute: Vec2, sector_size: f64) -> Self {
        if sector_size <= 0.0 {
            return Self::ORIGIN;
        }
        Self {
            x: (absolute.x / sector_size).floor() as i32,
            y: (absolute.y / sector_size).floor() as i32,
        }
    }
}

impl std::fmt::Display for SectorCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifies one orbiting body: its sector plus its index around the star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyKey {
    pub sector: SectorCoord,
    pub index: u8,
}

impl BodyKey {
    pub fn new(sector: SectorCoord, index: u8) -> Self {
        Self { sector, index }
    }
}

/// The square of sectors within a Chebyshev radius of a centre sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub center: SectorCoord,
    pub radius: i32,
}

impl Window {
    pub fn new(center: SectorCoord, radius: i32) -> Self {
        Self {
            center,
            radius: radius.max(0),
        }
    }

    pub fn contains(&self, coord: &SectorCoord) -> bool {
        self.center.chebyshev(coord) <= self.radius
    }

    /// Number of sectors in the window.
    pub fn len(&self) -> usize {
        let side = 2 * u64::from(self.radius.unsigned_abs()) + 1;
        (side * side) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sectors in row-major order (y outer, x inner).
    pub fn coords(&self) -> impl Iterator<Item = SectorCoord> + '_ {
        let r = self.radius;
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| self.center.offset(dx, dy)))
    }
}
