//! Deterministic randomness: per-sector random streams and the occupancy
//! noise field.
//!
//! Every sector gets its own `ChaCha8Rng` keyed by `(seed, x, y)`, so the same
//! coordinate always replays the same draws no matter when or how often it is
//! generated. Star presence comes from a coherent OpenSimplex field evaluated
//! at the integer coordinate, which clusters occupied sectors together.

use noise::{NoiseFn, OpenSimplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::coords::SectorCoord;

/// SplitMix64 finalizer.
fn mix64(mut h: u64) -> u64 {
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d049bb133111eb);
    h ^ (h >> 31)
}

/// Stable 64-bit key for a sector's random stream.
pub fn sector_seed(seed: u64, coord: SectorCoord) -> u64 {
    let xy = (u64::from(coord.x as u32) << 32) | u64::from(coord.y as u32);
    mix64(mix64(seed.wrapping_add(0x9e3779b97f4a7c15)) ^ xy)
}

/// Random stream for one sector.
pub fn sector_rng(seed: u64, coord: SectorCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(sector_seed(seed, coord))
}

/// Uniform float in `[min, max)`. A reversed or empty range is tolerated:
/// the result always lies between the two bounds.
pub fn uniform(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if min == max {
        return min;
    }
    rng.gen::<f64>() * (max - min) + min
}

/// Uniform integer in `[min, max)`, `min` when the range is empty.
pub fn uniform_int(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Bernoulli draw with probability `p` (clamped to `[0, 1]`).
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.gen::<f64>() < p.clamp(0.0, 1.0)
}

/// Coherent noise over sector space that decides which sectors hold a star.
pub struct OccupancyField {
    noise: OpenSimplex,
    threshold: f64,
}

impl OccupancyField {
    pub fn new(seed: u64, threshold: f64) -> Self {
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            noise: OpenSimplex::new(folded),
            threshold,
        }
    }

    /// Raw noise sample at a sector coordinate, roughly in `[-1, 1]`.
    pub fn sample(&self, coord: SectorCoord) -> f64 {
        self.noise.get([f64::from(coord.x), f64::from(coord.y)])
    }

    /// A sector holds a star iff `|noise| <= threshold`.
    pub fn is_occupied(&self, coord: SectorCoord) -> bool {
        self.sample(coord).abs() <= self.threshold
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl std::fmt::Debug for OccupancyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccupancyField")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
