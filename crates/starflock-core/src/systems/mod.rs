//! Systems - logic that operates on components, run once per tick

mod flocking;
mod orbits;
mod player;

pub use flocking::*;
pub use orbits::*;
pub use player::*;
