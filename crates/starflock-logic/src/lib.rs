//! Pure universe logic for Starflock.
//!
//! This crate contains everything that can be computed without an ECS world
//! or a running engine. Functions take plain data and return results, which
//! keeps them deterministic and unit-testable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Universe configuration, defaults, JSON loading and validation |
//! | [`coords`] | Hashable sector coordinates, body keys, the active window |
//! | [`orbit`] | Tick-indexed circular orbits (recomputed, never integrated) |
//! | [`rng`] | Per-sector seeded random streams and the occupancy noise field |
//! | [`steering`] | Seek, arrive, point forces and velocity integration |
//! | [`vector`] | 2D vectors, magnitude approximation, range remapping |

pub mod config;
pub mod coords;
pub mod orbit;
pub mod rng;
pub mod steering;
pub mod vector;

pub use coords::{BodyKey, SectorCoord, Window};
pub use vector::Vec2;
