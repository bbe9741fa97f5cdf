//! Data definitions for the simulation.
//!
//! Generated universe content (sectors, stars, bodies, flock blueprints) is
//! plain data; agents live in the `hecs` world as `Kinematics` + `Agent`
//! components. Behaviour lives in systems.

mod agents;
mod player;
mod universe;

pub use agents::*;
pub use player::*;
pub use universe::*;
