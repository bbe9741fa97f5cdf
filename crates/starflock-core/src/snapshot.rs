//! Read-only, serializable view of the world for an external renderer.
//!
//! All positions are absolute. Nothing here borrows from the engine.

use serde::Serialize;
use starflock_logic::{BodyKey, SectorCoord, Vec2};

use crate::components::ShapeParams;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub seed: u64,
    pub sector_size: f64,
    pub player: PlayerView,
    pub stars: Vec<StarView>,
    pub bodies: Vec<BodyView>,
    pub agents: Vec<AgentView>,
    pub tokens: Vec<RewardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub sector: SectorCoord,
    pub position: Vec2,
    pub radius: f64,
    pub heading: f64,
    pub fuel: f64,
    pub rewards: u32,
    pub out_of_fuel: bool,
    pub target: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarView {
    pub sector: SectorCoord,
    pub position: Vec2,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub key: BodyKey,
    pub position: Vec2,
    pub radius: f64,
    pub orbit_center: Vec2,
    pub orbit_radius: f64,
    pub resource_present: bool,
    pub reward_present: bool,
    pub is_settlement: bool,
    pub growth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub flock: SectorCoord,
    pub index: usize,
    pub position: Vec2,
    pub heading: f64,
    pub radius: f64,
    pub carrying: bool,
    pub curious: bool,
    pub friend: bool,
    pub shape: ShapeParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardView {
    pub position: Vec2,
    pub radius: f64,
}

impl WorldSnapshot {
    /// Agents belonging to the flock at `coord`.
    pub fn flock_agents(&self, coord: SectorCoord) -> impl Iterator<Item = &AgentView> + '_ {
        self.agents.iter().filter(move |a| a.flock == coord)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
