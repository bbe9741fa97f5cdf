//! Gameplay events reported by each tick.

use serde::{Deserialize, Serialize};
use starflock_logic::{BodyKey, SectorCoord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An agent picked up a free-floating token.
    RewardClaimed { flock: SectorCoord, agent: usize },
    /// A carrying agent reached home. `total` is the flock's new count.
    RewardDelivered {
        flock: SectorCoord,
        home: BodyKey,
        total: u32,
    },
    /// First delivery for a flock that was not yet a friend.
    FlockBefriended { flock: SectorCoord },
    /// The player took a resource; `fuel` is the level afterwards.
    Refueled { body: BodyKey, fuel: f64 },
    /// The player took a body's reward; `held` is the count afterwards.
    RewardCollected { body: BodyKey, held: u32 },
    RewardRegrown { body: BodyKey },
    /// Fuel hit zero this tick.
    FuelDepleted,
}

impl SimEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SimEvent::RewardClaimed { .. } => "reward_claimed",
            SimEvent::RewardDelivered { .. } => "reward_delivered",
            SimEvent::FlockBefriended { .. } => "flock_befriended",
            SimEvent::Refueled { .. } => "refueled",
            SimEvent::RewardCollected { .. } => "reward_collected",
            SimEvent::RewardRegrown { .. } => "reward_regrown",
            SimEvent::FuelDepleted => "fuel_depleted",
        }
    }
}
