//! The player-controlled agent.

use serde::{Deserialize, Serialize};
use starflock_logic::config::PlayerConfig;
use starflock_logic::steering::Kinematics;
use starflock_logic::{SectorCoord, Vec2};

/// Singleton player state. Kinematics are local to `sector`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub sector: SectorCoord,
    pub kinematics: Kinematics,
    pub radius: f64,
    /// Absolute steering goal supplied by the host, if any.
    pub target: Option<Vec2>,
    pub heading: f64,
    /// Collected rewards, capped at `PlayerConfig::max_rewards`.
    pub rewards: u32,
    /// Fuel in `[0, 1]`.
    pub fuel: f64,
}

impl Player {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            sector: SectorCoord::ORIGIN,
            kinematics: Kinematics::at(Vec2::new(config.start_x, config.start_y)),
            radius: config.radius,
            target: None,
            heading: 0.0,
            rewards: 0,
            fuel: 1.0,
        }
    }

    pub fn absolute_position(&self, sector_size: f64) -> Vec2 {
        self.sector.to_absolute(self.kinematics.position, sector_size)
    }

    pub fn is_out_of_fuel(&self) -> bool {
        self.fuel <= 0.0
    }

    /// Add fuel, capped at a full tank.
    pub fn refuel(&mut self, amount: f64) {
        self.fuel = (self.fuel + amount.max(0.0)).min(1.0);
    }

    /// Burn fuel, floored at empty. Returns true if this burn emptied the tank.
    pub fn burn(&mut self, amount: f64) -> bool {
        let was_empty = self.is_out_of_fuel();
        self.fuel = (self.fuel - amount.max(0.0)).max(0.0);
        !was_empty && self.is_out_of_fuel()
    }

    /// If the local position has left `[0, sector_size]` on either axis,
    /// move to the sector that contains it and rebase the local position.
    /// The absolute position is unchanged. Returns true on a sector change.
    pub fn recenter(&mut self, sector_size: f64) -> bool {
        let p = self.kinematics.position;
        let inside = (0.0..=sector_size).contains(&p.x) && (0.0..=sector_size).contains(&p.y);
        if inside {
            return false;
        }
        let absolute = self.absolute_position(sector_size);
        let sector = SectorCoord::containing(absolute, sector_size);
        self.kinematics.position = sector.to_local(absolute, sector_size);
        self.sector = sector;
        true
    }
}
