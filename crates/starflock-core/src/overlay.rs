//! Sparse store of everything gameplay has changed about the universe.
//!
//! Generation is a pure function of seed and coordinate; the overlay holds
//! the facts it cannot re-derive (collected resources, regrown rewards,
//! befriended flocks). Every write goes through one of the operations
//! below, which also update the caller's cached copy of the body.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use starflock_logic::{BodyKey, SectorCoord};

use crate::components::{Body, BodyState};

/// What a flock remembers across eviction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockRecord {
    pub friend: bool,
    pub rewards_delivered: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overlay {
    bodies: HashMap<BodyKey, BodyState>,
    flocks: HashMap<SectorCoord, FlockRecord>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored state for a body, if gameplay ever touched it.
    pub fn body_state(&self, key: &BodyKey) -> Option<BodyState> {
        self.bodies.get(key).copied()
    }

    /// Stored state, or `initial` for an untouched body.
    pub fn body_state_or(&self, key: &BodyKey, initial: BodyState) -> BodyState {
        self.body_state(key).unwrap_or(initial)
    }

    fn store(&mut self, body: &Body) {
        self.bodies.insert(body.key, body.state);
    }

    /// Player picks up the refuelling resource. Returns false if there was none.
    pub fn collect_resource(&mut self, body: &mut Body) -> bool {
        if !body.state.resource_present {
            return false;
        }
        body.state.resource_present = false;
        self.store(body);
        true
    }

    /// Player picks up the body's reward at `tick`. Returns false if there was none.
    pub fn collect_reward(&mut self, body: &mut Body, tick: u64) -> bool {
        if !body.state.reward_present {
            return false;
        }
        body.state.reward_present = false;
        body.state.last_reward_pickup = tick;
        self.store(body);
        true
    }

    /// A delivery grows the settlement and leaves a resource on it.
    pub fn settle_delivery(&mut self, body: &mut Body) {
        body.state.is_settlement = true;
        body.state.resource_present = true;
        body.state.growth = body.state.growth.saturating_add(1);
        self.store(body);
    }

    /// Put a reward back on a growing body once its interval has passed.
    pub fn regrow_reward(&mut self, body: &mut Body, tick: u64) -> bool {
        if !body.reward_due(tick) {
            return false;
        }
        body.state.reward_present = true;
        self.store(body);
        true
    }

    pub fn flock_record(&self, coord: &SectorCoord) -> FlockRecord {
        self.flocks.get(coord).copied().unwrap_or_default()
    }

    pub fn save_flock(&mut self, coord: SectorCoord, record: FlockRecord) {
        self.flocks.insert(coord, record);
    }

    /// Count one delivery for the flock at `coord` and befriend it.
    /// Returns the updated record.
    pub fn record_delivery(&mut self, coord: SectorCoord) -> FlockRecord {
        let record = self.flocks.entry(coord).or_default();
        record.rewards_delivered = record.rewards_delivered.saturating_add(1);
        record.friend = true;
        *record
    }

    /// Rewards delivered across every flock ever recorded.
    pub fn total_delivered(&self) -> u64 {
        self.flocks
            .values()
            .map(|r| u64::from(r.rewards_delivered))
            .sum()
    }

    pub fn touched_bodies(&self) -> usize {
        self.bodies.len()
    }

    pub fn known_flocks(&self) -> usize {
        self.flocks.len()
    }
}
