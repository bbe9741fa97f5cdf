//! Flock agents, live flocks and free-floating reward tokens.

use hecs::Entity;
use serde::{Deserialize, Serialize};
use starflock_logic::{SectorCoord, Vec2};

use super::{Body, FlockParams};

/// Per-agent state, stored alongside a `Kinematics` component whose
/// position is local to the flock's sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Sector of the owning flock.
    pub flock: SectorCoord,
    /// Index within the flock, stable for the flock's lifetime.
    pub index: usize,
    /// Drawn once at creation; curious agents see twice as far and trust
    /// the player sooner.
    pub curious: bool,
    /// Holding a reward token on the way home.
    pub carrying: bool,
    /// Facing angle in radians, kept from the last non-zero velocity.
    pub heading: f64,
    /// Absolute position derived after the last integration.
    pub absolute: Vec2,
}

/// A live flock in the flock cache. Its agents are ECS entities.
#[derive(Debug, Clone)]
pub struct Flock {
    pub coord: SectorCoord,
    /// Copy of the home body's generated data, so the flock can find home
    /// after its sector has been evicted.
    pub home: Body,
    pub params: FlockParams,
    pub agents: Vec<Entity>,
    /// Agents currently holding a token.
    pub carrying_count: u32,
    pub rewards_delivered: u32,
    /// One-way trust transition, set on the first delivery.
    pub friend: bool,
}

impl Flock {
    pub fn home_position(&self, tick: u64, sector_size: f64) -> Vec2 {
        self.home.absolute_position(tick, sector_size)
    }
}

/// A reward dropped by the player, waiting for an agent to pick it up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardToken {
    /// Absolute position.
    pub position: Vec2,
    pub radius: f64,
}
