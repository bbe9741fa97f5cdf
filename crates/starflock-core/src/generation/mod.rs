//! Generation - deterministic creation of sectors and their native flocks

mod flock;
mod sector;

pub use flock::*;
pub use sector::*;
