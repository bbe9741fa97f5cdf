//! Sector generation: star, orbiting bodies and native flock blueprint.

use std::f64::consts::TAU;

use rand::Rng;
use starflock_logic::config::{FloatRange, UniverseConfig};
use starflock_logic::orbit::Orbit;
use starflock_logic::rng::{chance, sector_rng, uniform, uniform_int, OccupancyField};
use starflock_logic::{BodyKey, SectorCoord, Vec2};

use crate::components::*;
use crate::overlay::Overlay;

/// Turns coordinates into sectors. Holds everything derived from the
/// configuration once, so each call is a pure function of the coordinate
/// and the overlay.
#[derive(Debug)]
pub struct SectorGenerator {
    config: UniverseConfig,
    occupancy: OccupancyField,
}

impl SectorGenerator {
    pub fn new(config: &UniverseConfig) -> Self {
        Self {
            occupancy: OccupancyField::new(config.seed, config.generation.occupancy_threshold),
            config: config.clone(),
        }
    }

    pub fn has_star(&self, coord: SectorCoord) -> bool {
        self.occupancy.is_occupied(coord)
    }

    /// Generate the sector at `coord`. Never fails; an unoccupied cell
    /// yields an empty sector.
    pub fn generate(&self, coord: SectorCoord, overlay: &Overlay) -> Sector {
        let mut sector = Sector::empty(coord);
        if !self.has_star(coord) {
            return sector;
        }

        let mut rng = sector_rng(self.config.seed, coord);
        let mut star = self.generate_star(coord, &mut rng);

        if !star.bodies.is_empty() && chance(&mut rng, self.config.generation.flock_chance) {
            let home = uniform_int(&mut rng, 0, star.bodies.len() as i64) as usize;
            let body = &mut star.bodies[home];
            body.grows_rewards = false;
            body.state.is_settlement = true;
            sector.flock = Some(self.generate_blueprint(body.key, &mut rng));
        }

        for body in &mut star.bodies {
            let initial = body.initial_state();
            body.state = overlay.body_state_or(&body.key, initial);
        }

        sector.star = Some(star);
        sector
    }

    fn generate_star(&self, coord: SectorCoord, rng: &mut impl Rng) -> Star {
        let rules = &self.config.generation;
        let size = self.config.sector_size;

        let position = Vec2::new(uniform(rng, 0.0, size), uniform(rng, 0.0, size));
        let radius = draw(rng, rules.star_radius);
        let count = uniform_int(rng, 0, i64::from(rules.max_bodies) + 1);

        let mut bodies = Vec::new();
        let mut orbit_radius = radius;
        let mut previous_radius = radius;
        for i in 0..count {
            let body_radius = draw(rng, rules.body_radius);
            let separation = previous_radius + body_radius;
            previous_radius = body_radius;
            orbit_radius += uniform(
                rng,
                separation,
                separation * ((i + 1) as f64).powf(rules.orbit_spacing_power),
            );
            if orbit_radius > rules.max_orbit_radius {
                continue;
            }

            let start_angle = uniform(rng, 0.0, TAU);
            let speed = draw(rng, rules.body_speed);
            let angular_speed = if chance(rng, rules.retrograde_chance) {
                -speed
            } else {
                speed
            };
            let grows_rewards = chance(rng, rules.reward_growth_chance);
            let regen_interval = draw(rng, rules.reward_regen_ticks).round().max(0.0) as u64;

            let key = BodyKey::new(coord, bodies.len() as u8);
            bodies.push(Body {
                key,
                radius: body_radius,
                orbit: Orbit {
                    center: position,
                    radius: orbit_radius,
                    start_angle,
                    angular_speed,
                },
                grows_rewards,
                regen_interval,
                state: BodyState::initial(grows_rewards, false),
            });
        }

        Star {
            position,
            radius,
            bodies,
        }
    }

    fn generate_blueprint(&self, home: BodyKey, rng: &mut impl Rng) -> FlockBlueprint {
        let cfg = &self.config.flock;
        let params = FlockParams {
            max_speed: draw(rng, cfg.max_speed),
            max_force: draw(rng, cfg.max_force),
            radius: cfg.agent_radius,
            perception: draw(rng, cfg.perception),
            separation: cfg.separation,
            alignment: draw(rng, cfg.alignment),
            cohesion: draw(rng, cfg.cohesion),
            explore_factor: draw(rng, cfg.explore_factor),
            player_affinity: draw(rng, cfg.player_affinity),
            curiosity_rate: draw(rng, cfg.curiosity_rate),
            shape: ShapeParams {
                control_a: Vec2::new(uniform(rng, -1.0, 1.0), uniform(rng, -1.0, 1.0)),
                control_b: Vec2::new(uniform(rng, -1.0, 1.0), uniform(rng, -1.0, 1.0)),
            },
        };

        let count = uniform_int(
            rng,
            cfg.agent_count.min.round() as i64,
            cfg.agent_count.max.round() as i64,
        )
        .max(1);
        let curious = (0..count)
            .map(|_| chance(rng, params.curiosity_rate))
            .collect();

        FlockBlueprint {
            home,
            params,
            curious,
        }
    }
}

fn draw(rng: &mut impl Rng, range: FloatRange) -> f64 {
    uniform(rng, range.min, range.max)
}
