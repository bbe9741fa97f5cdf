//! Starflock Core - Procedural Universe Simulation Engine
//!
//! A deterministic, seed-driven 2D universe of sectors, stars and orbiting
//! bodies, populated by native flocks and explored by a single player.
//!
//! # Architecture
//!
//! Generated content is plain data, regenerated on demand from the seed;
//! agents live in a `hecs` world:
//! - **Generation**: sectors, stars, bodies and flock blueprints
//! - **Overlay**: the sparse record of what gameplay has changed
//! - **Caches**: bounded sector and flock caches around the player
//! - **Systems**: orbits, flocking and the player, run in a fixed order
//!
//! # Example
//!
//! ```rust,no_run
//! use starflock_core::prelude::*;
//!
//! let mut engine = SimulationEngine::with_seed(42);
//! engine.set_player_target(Vec2::new(900.0, 300.0));
//!
//! loop {
//!     let report = engine.advance_tick();
//!     for event in &report.events {
//!         println!("{:?}", event);
//!     }
//!     let _frame = engine.snapshot();
//! }
//! ```

pub mod cache;
pub mod components;
pub mod engine;
pub mod events;
pub mod generation;
pub mod overlay;
pub mod snapshot;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{RewardLedger, SimulationEngine, TickReport};
    pub use crate::events::SimEvent;
    pub use crate::snapshot::WorldSnapshot;
    pub use starflock_logic::config::UniverseConfig;
    pub use starflock_logic::{SectorCoord, Vec2};
}
