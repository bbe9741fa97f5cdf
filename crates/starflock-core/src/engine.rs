//! Simulation engine - main entry point for running the universe

use hecs::World;
use log::{debug, info, trace};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use starflock_logic::config::{ConfigError, UniverseConfig};
use starflock_logic::{SectorCoord, Vec2, Window};

use crate::cache::{FlockCache, SectorCache};
use crate::components::*;
use crate::events::SimEvent;
use crate::generation::{despawn_flock, spawn_flock, SectorGenerator};
use crate::overlay::{FlockRecord, Overlay};
use crate::snapshot::*;
use crate::systems::*;

/// Salt separating the motion stream from the per-sector generation streams.
const MOTION_STREAM: u64 = 0x6d6f_7469_6f6e;

/// What happened during one call to [`SimulationEngine::advance_tick`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<SimEvent>,
    pub sectors_loaded: usize,
    pub sectors_evicted: usize,
    pub flocks_spawned: usize,
    pub flocks_evicted: usize,
}

impl TickReport {
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

/// Where every reward token currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewardLedger {
    pub in_world: u64,
    pub carried: u64,
    pub delivered: u64,
    pub held: u64,
}

impl RewardLedger {
    pub fn total(&self) -> u64 {
        self.in_world + self.carried + self.delivered + self.held
    }
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world holding every live agent
    pub world: World,
    config: UniverseConfig,
    generator: SectorGenerator,
    overlay: Overlay,
    sectors: SectorCache,
    flocks: FlockCache,
    player: Player,
    tokens: Vec<RewardToken>,
    window: Window,
    frame: WorldFrame,
    tick: u64,
    rng: ChaCha8Rng,
}

impl SimulationEngine {
    /// Create an engine for `config`, with the window around the player
    /// already materialized.
    pub fn new(config: UniverseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = Self::build(config);
        info!(
            "Universe {} ready: {} sectors, {} flocks",
            engine.config.seed,
            engine.sectors.len(),
            engine.flocks.len()
        );
        Ok(engine)
    }

    /// Default universe with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(UniverseConfig::with_seed(seed))
    }

    fn build(config: UniverseConfig) -> Self {
        let player = Player::new(&config.player);
        let window = Window::new(player.sector, config.window_radius);
        let mut engine = Self {
            world: World::new(),
            generator: SectorGenerator::new(&config),
            overlay: Overlay::new(),
            sectors: SectorCache::new(config.sector_cache_capacity),
            flocks: FlockCache::new(config.flock_cache_capacity),
            player,
            tokens: Vec::new(),
            window,
            frame: WorldFrame::default(),
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed ^ MOTION_STREAM),
            config,
        };
        engine.maintain_window(&mut TickReport::default());
        engine.frame = build_frame(&engine.sectors, &engine.window, 0, engine.config.sector_size);
        engine
    }

    /// Steer the player toward an absolute position.
    pub fn set_player_target(&mut self, target: Vec2) {
        if target.is_finite() {
            self.player.target = Some(target);
        }
    }

    pub fn clear_player_target(&mut self) {
        self.player.target = None;
    }

    /// Drop one held reward as a free token at the player's position.
    /// Returns false when the player holds none.
    pub fn drop_reward_near_player(&mut self) -> bool {
        if self.player.rewards == 0 {
            return false;
        }
        self.player.rewards -= 1;
        let position = self.player.absolute_position(self.config.sector_size);
        self.tokens.push(RewardToken {
            position,
            radius: self.config.rewards.token_radius,
        });
        debug!("Reward dropped at ({:.1}, {:.1})", position.x, position.y);
        true
    }

    /// Run one tick: window, sectors, flocks, orbits, regrowth, agents, player.
    pub fn advance_tick(&mut self) -> TickReport {
        self.tick += 1;
        let tick = self.tick;
        let size = self.config.sector_size;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        self.window = Window::new(self.player.sector, self.config.window_radius);
        self.maintain_window(&mut report);

        self.frame = build_frame(&self.sectors, &self.window, tick, size);

        let regrown = regrow_rewards(&mut self.sectors, &mut self.overlay, &self.window, tick);
        report.events.extend(regrown);

        let ctx = FlockingContext {
            frame: &self.frame,
            player: PlayerPresence {
                position: self.player.absolute_position(size),
                radius: self.player.radius,
            },
            config: &self.config.flock,
            sector_size: size,
        };
        let flock_events = flocking_system(
            &mut self.world,
            &mut self.flocks,
            &mut self.tokens,
            &ctx,
            &mut self.rng,
        );
        for event in &flock_events {
            self.persist_flock_event(event);
        }
        report.events.extend(flock_events);

        let previous_sector = self.player.sector;
        let player_events = player_system(
            &mut self.player,
            &self.frame,
            &mut self.sectors,
            &mut self.overlay,
            &self.config.player,
            &self.config.rewards,
            size,
        );
        for event in &player_events {
            if *event == SimEvent::FuelDepleted {
                info!("Player ran out of fuel at tick {}", tick);
            }
        }
        report.events.extend(player_events);
        if self.player.sector != previous_sector {
            debug!("Player moved {} -> {}", previous_sector, self.player.sector);
        }

        trace!(
            "Tick {}: {} sectors, {} flocks, {} agents, {} tokens, {} events",
            tick,
            self.sectors.len(),
            self.flocks.len(),
            self.world.len(),
            self.tokens.len(),
            report.events.len()
        );
        report
    }

    /// Materialize the window's sectors and flocks, then evict what the
    /// caches no longer need.
    fn maintain_window(&mut self, report: &mut TickReport) {
        let window = self.window;
        for coord in window.coords() {
            if self.sectors.contains(&coord) {
                continue;
            }
            let sector = self.generator.generate(coord, &self.overlay);
            debug!(
                "Sector {} generated (star: {}, flock: {})",
                coord,
                sector.star.is_some(),
                sector.flock.is_some()
            );
            self.sectors.insert(coord, sector);
            report.sectors_loaded += 1;
            report.sectors_evicted += self.evict_sectors();
        }
        report.sectors_evicted += self.evict_sectors();

        for coord in window.coords() {
            if self.flocks.contains(&coord) {
                continue;
            }
            let Some(sector) = self.sectors.get(&coord) else {
                continue;
            };
            let (Some(blueprint), Some(home)) = (sector.flock.as_ref(), sector.home_body()) else {
                continue;
            };
            let record = self.overlay.flock_record(&coord);
            let flock = spawn_flock(
                &mut self.world,
                blueprint,
                *home,
                record,
                self.tick,
                self.config.sector_size,
                &mut self.rng,
            );
            debug!(
                "Flock {} spawned with {} agents (friend: {})",
                coord,
                flock.agents.len(),
                flock.friend
            );
            self.flocks.insert(coord, flock);
            report.flocks_spawned += 1;
            report.flocks_evicted += self.evict_flocks();
        }
        report.flocks_evicted += self.evict_flocks();
    }

    fn evict_sectors(&mut self) -> usize {
        let evicted = self.sectors.evict_outside(&self.window);
        for coord in &evicted {
            debug!("Sector {} evicted", coord);
        }
        evicted.len()
    }

    /// Evict flocks outside the window with no agent near the player.
    /// Carried tokens fall back into the world where their carrier was.
    fn evict_flocks(&mut self) -> usize {
        let window = self.window;
        let player = self.player.absolute_position(self.config.sector_size);
        let proximity = self.config.flock_proximity_radius();
        let proximity_sq = proximity * proximity;
        let world = &self.world;

        let evicted = self.flocks.evict_eligible(|flock| {
            !window.contains(&flock.coord)
                && !flock.agents.iter().any(|&e| {
                    world
                        .get::<&Agent>(e)
                        .map(|a| a.absolute.distance_squared(&player) < proximity_sq)
                        .unwrap_or(false)
                })
        });

        for flock in &evicted {
            for position in despawn_flock(&mut self.world, flock) {
                self.tokens.push(RewardToken {
                    position,
                    radius: self.config.rewards.token_radius,
                });
            }
            self.overlay.save_flock(
                flock.coord,
                FlockRecord {
                    friend: flock.friend,
                    rewards_delivered: flock.rewards_delivered,
                },
            );
            debug!("Flock {} evicted", flock.coord);
        }
        evicted.len()
    }

    /// Mirror a flock event into the overlay and the cached home body.
    fn persist_flock_event(&mut self, event: &SimEvent) {
        match *event {
            SimEvent::RewardDelivered { flock, home, total } => {
                self.overlay.record_delivery(flock);
                let cached = self
                    .sectors
                    .get_mut(&home.sector)
                    .and_then(|s| s.body_mut(home.index));
                let state = match cached {
                    Some(body) => {
                        self.overlay.settle_delivery(body);
                        body.state
                    }
                    None => {
                        let mut body = match self.flocks.get(&flock) {
                            Some(f) => f.home,
                            None => return,
                        };
                        body.state = self.overlay.body_state_or(&home, body.state);
                        self.overlay.settle_delivery(&mut body);
                        body.state
                    }
                };
                if let Some(f) = self.flocks.get_mut(&flock) {
                    f.home.state = state;
                }
                info!("Flock {} delivered a reward ({} total)", flock, total);
            }
            SimEvent::FlockBefriended { flock } => {
                info!("Flock {} is now a friend", flock);
            }
            _ => {}
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player access for hosts and harnesses (e.g. teleporting).
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn sector(&self, coord: SectorCoord) -> Option<&Sector> {
        self.sectors.get(&coord)
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn flock(&self, coord: SectorCoord) -> Option<&Flock> {
        self.flocks.get(&coord)
    }

    pub fn flock_count(&self) -> usize {
        self.flocks.len()
    }

    pub fn flock_coords(&self) -> Vec<SectorCoord> {
        self.flocks.keys().copied().collect()
    }

    pub fn agent_count(&self) -> usize {
        self.world.query::<&Agent>().iter().count()
    }

    pub fn tokens(&self) -> &[RewardToken] {
        &self.tokens
    }

    /// Count every reward token by where it is.
    pub fn reward_ledger(&self) -> RewardLedger {
        RewardLedger {
            in_world: self.tokens.len() as u64,
            carried: self
                .flocks
                .iter()
                .map(|(_, f)| u64::from(f.carrying_count))
                .sum(),
            delivered: self.overlay.total_delivered(),
            held: u64::from(self.player.rewards),
        }
    }

    /// Render view of the current window.
    pub fn snapshot(&self) -> WorldSnapshot {
        let size = self.config.sector_size;
        let mut stars = Vec::new();
        let mut bodies = Vec::new();
        for coord in self.window.coords() {
            let Some(star) = self.sectors.get(&coord).and_then(|s| s.star.as_ref()) else {
                continue;
            };
            stars.push(StarView {
                sector: coord,
                position: coord.to_absolute(star.position, size),
                radius: star.radius,
            });
            for body in &star.bodies {
                bodies.push(BodyView {
                    key: body.key,
                    position: body.absolute_position(self.tick, size),
                    radius: body.radius,
                    orbit_center: coord.to_absolute(body.orbit.center, size),
                    orbit_radius: body.orbit.radius,
                    resource_present: body.state.resource_present,
                    reward_present: body.state.reward_present,
                    is_settlement: body.state.is_settlement,
                    growth: body.state.growth,
                });
            }
        }

        let mut agents = Vec::new();
        for (coord, flock) in self.flocks.iter() {
            for &entity in &flock.agents {
                let Ok(agent) = self.world.get::<&Agent>(entity) else {
                    continue;
                };
                agents.push(AgentView {
                    flock: *coord,
                    index: agent.index,
                    position: agent.absolute,
                    heading: agent.heading,
                    radius: flock.params.radius,
                    carrying: agent.carrying,
                    curious: agent.curious,
                    friend: flock.friend,
                    shape: flock.params.shape,
                });
            }
        }

        WorldSnapshot {
            tick: self.tick,
            seed: self.config.seed,
            sector_size: size,
            player: PlayerView {
                sector: self.player.sector,
                position: self.player.absolute_position(size),
                radius: self.player.radius,
                heading: self.player.heading,
                fuel: self.player.fuel,
                rewards: self.player.rewards,
                out_of_fuel: self.player.is_out_of_fuel(),
                target: self.player.target,
            },
            stars,
            bodies,
            agents,
            tokens: self
                .tokens
                .iter()
                .map(|t| RewardView {
                    position: t.position,
                    radius: t.radius,
                })
                .collect(),
        }
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::with_seed(UniverseConfig::default().seed)
    }
}
