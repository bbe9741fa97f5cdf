//! Procedurally generated universe content.

use serde::{Deserialize, Serialize};
use starflock_logic::orbit::Orbit;
use starflock_logic::{BodyKey, SectorCoord, Vec2};

/// Mutable facts about a body that generation cannot re-derive.
/// Backed by the overlay; a copy is cached on each generated [`Body`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyState {
    /// A refuelling resource sits on the body.
    pub resource_present: bool,
    /// A reward token orbits the body, ready for the player.
    pub reward_present: bool,
    /// Tick of the last reward pickup (0 if never collected).
    pub last_reward_pickup: u64,
    /// The body is home to a native flock.
    pub is_settlement: bool,
    /// Rewards delivered to this settlement so far.
    pub growth: u32,
}

impl BodyState {
    /// State of a body nobody has interacted with yet.
    pub fn initial(grows_rewards: bool, is_settlement: bool) -> Self {
        Self {
            resource_present: false,
            reward_present: grows_rewards,
            last_reward_pickup: 0,
            is_settlement,
            growth: 0,
        }
    }
}

/// An orbiting body around a star.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub key: BodyKey,
    pub radius: f64,
    pub orbit: Orbit,
    /// Whether rewards regrow on this body after pickup.
    pub grows_rewards: bool,
    /// Ticks between a pickup and regrowth.
    pub regen_interval: u64,
    pub state: BodyState,
}

impl Body {
    /// State this body starts in before any overlay entry exists.
    pub fn initial_state(&self) -> BodyState {
        BodyState::initial(self.grows_rewards, self.state.is_settlement)
    }

    pub fn local_position(&self, tick: u64) -> Vec2 {
        self.orbit.position_at(tick)
    }

    pub fn absolute_position(&self, tick: u64, sector_size: f64) -> Vec2 {
        self.key.sector.to_absolute(self.local_position(tick), sector_size)
    }

    /// Whether a regrowth check at `tick` should put a reward back.
    pub fn reward_due(&self, tick: u64) -> bool {
        self.grows_rewards
            && !self.state.reward_present
            && tick > self.state.last_reward_pickup.saturating_add(self.regen_interval)
    }
}

/// A star and the bodies orbiting it, innermost first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Position local to the sector.
    pub position: Vec2,
    pub radius: f64,
    pub bodies: Vec<Body>,
}

/// Visual shape of a flock's agents: two Bézier control points in a unit
/// box, mirrored about the heading axis by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub control_a: Vec2,
    pub control_b: Vec2,
}

/// Scalar behaviour parameters shared by every agent in a flock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlockParams {
    pub max_speed: f64,
    pub max_force: f64,
    pub radius: f64,
    /// Radius within which flockmates, rewards and the player are noticed.
    pub perception: f64,
    pub separation: f64,
    pub alignment: f64,
    pub cohesion: f64,
    /// Exploration radius as a multiple of the sector size.
    pub explore_factor: f64,
    /// Signed: positive approaches the player, negative avoids.
    pub player_affinity: f64,
    pub curiosity_rate: f64,
    pub shape: ShapeParams,
}

/// Deterministic recipe for a sector's native flock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockBlueprint {
    pub home: BodyKey,
    pub params: FlockParams,
    /// One curiosity flag per agent, in spawn order.
    pub curious: Vec<bool>,
}

impl FlockBlueprint {
    pub fn agent_count(&self) -> usize {
        self.curious.len()
    }
}

/// One generated sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub coord: SectorCoord,
    pub star: Option<Star>,
    pub flock: Option<FlockBlueprint>,
}

impl Sector {
    pub fn empty(coord: SectorCoord) -> Self {
        Self {
            coord,
            star: None,
            flock: None,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        self.star.as_ref().map(|s| s.bodies.as_slice()).unwrap_or(&[])
    }

    pub fn body(&self, index: u8) -> Option<&Body> {
        self.bodies().get(usize::from(index))
    }

    pub fn body_mut(&mut self, index: u8) -> Option<&mut Body> {
        self.star
            .as_mut()
            .and_then(|s| s.bodies.get_mut(usize::from(index)))
    }

    /// The body the native flock calls home, if any.
    pub fn home_body(&self) -> Option<&Body> {
        self.flock.as_ref().and_then(|f| self.body(f.home.index))
    }
}
