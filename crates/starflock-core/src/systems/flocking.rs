//! Flocking system - per-tick force composition for every cached agent
//!
//! Each agent sums, in order: flocking (separation, alignment, cohesion),
//! obstacle avoidance, reward seeking, delivery, leash-to-home, player
//! approach/avoidance and wander. Flockmates are read from a snapshot of
//! the previous tick, so update order within a flock does not matter.

use std::f64::consts::TAU;

use hecs::{Entity, World};
use rand::Rng;
use starflock_logic::config::FlockConfig;
use starflock_logic::rng::uniform;
use starflock_logic::steering::{arrive, integrate, point_force, seek, Kinematics, PointForce, PointForceKind};
use starflock_logic::Vec2;

use super::orbits::WorldFrame;
use crate::cache::FlockCache;
use crate::components::*;
use crate::events::SimEvent;

/// A flockmate as it was at the end of the previous tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub index: usize,
    /// Absolute position.
    pub position: Vec2,
    pub velocity: Vec2,
}

/// The player as the flocks see it this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPresence {
    pub position: Vec2,
    pub radius: f64,
}

/// Weighted separation, alignment and cohesion for the agent `index`.
///
/// Only flockmates strictly inside `perception` contribute; separation
/// further requires them to be closer than two agent radii.
pub fn flocking_force(
    index: usize,
    position: Vec2,
    velocity: Vec2,
    neighbours: &[Neighbour],
    params: &FlockParams,
) -> Vec2 {
    let sight_sq = params.perception * params.perception;
    let touch = params.radius * 2.0;
    let touch_sq = touch * touch;

    let mut in_sight = 0usize;
    let mut touching = 0usize;
    let mut velocity_sum = Vec2::ZERO;
    let mut position_sum = Vec2::ZERO;
    let mut away_sum = Vec2::ZERO;

    for other in neighbours.iter().filter(|n| n.index != index) {
        let offset = other.position - position;
        let dist_sq = offset.length_squared();
        if dist_sq >= sight_sq {
            continue;
        }
        in_sight += 1;
        velocity_sum += other.velocity;
        position_sum += other.position;
        if dist_sq < touch_sq {
            touching += 1;
            away_sum += (-offset).normalize();
        }
    }

    let mut force = Vec2::ZERO;
    if in_sight > 0 {
        let n = in_sight as f64;
        let alignment = ((velocity_sum / n).with_length(params.max_speed) - velocity).limit(params.max_force);
        force += alignment * params.alignment;

        let cohesion = seek(position_sum / n, params.max_speed, params.max_force, position, velocity);
        force += cohesion * params.cohesion;
    }
    if touching > 0 {
        let away = away_sum / touching as f64;
        let separation = (away.with_length(params.max_speed) - velocity).limit(params.max_force);
        force += separation * params.separation;
    }
    force
}

/// Leash pulling an agent home, growing with the fourth power of distance
/// and saturating at one `range` away.
pub fn leash_force(position: Vec2, home: Vec2, range: f64, max_force: f64) -> Vec2 {
    let offset = home - position;
    let dist_sq = offset.length_squared();
    let range_sq = range * range;
    if range_sq <= 0.0 {
        return offset.with_length(1.0).limit(max_force);
    }
    let magnitude = ((dist_sq * dist_sq) / (range_sq * range_sq)).min(1.0);
    offset.with_length(magnitude).limit(max_force)
}

/// Signed weight of the player's pull on one agent.
pub fn player_affinity(base: f64, curious: bool, friend: bool, carrying: bool, config: &FlockConfig) -> f64 {
    let mut affinity = base;
    if curious || friend {
        affinity = if affinity > 0.0 {
            affinity * config.friend_boost
        } else {
            -affinity
        };
    }
    if carrying {
        affinity *= config.carrying_factor;
    }
    affinity
}

/// Shared inputs for one flocking pass.
pub struct FlockingContext<'a> {
    pub frame: &'a WorldFrame,
    pub player: PlayerPresence,
    pub config: &'a FlockConfig,
    pub sector_size: f64,
}

/// Update every agent of every cached flock. Claims tokens from `tokens`
/// and reports claims and deliveries; the flock's own counters are
/// updated here, persistence is left to the caller.
pub fn flocking_system(
    world: &mut World,
    flocks: &mut FlockCache,
    tokens: &mut Vec<RewardToken>,
    ctx: &FlockingContext<'_>,
    rng: &mut impl Rng,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let coords: Vec<_> = flocks.keys().copied().collect();

    for coord in coords {
        let Some(flock) = flocks.get_mut(&coord) else {
            continue;
        };
        let (entities, previous) = snapshot_flock(world, flock);
        for entity in entities {
            update_agent(world, entity, flock, &previous, tokens, ctx, rng, &mut events);
        }
    }

    events
}

/// Tick T−1 state of a flock's agents. The entities keep the flock's
/// order; the neighbour buffer is sorted by agent index so the sums every
/// agent computes do not depend on it.
fn snapshot_flock(world: &World, flock: &Flock) -> (Vec<Entity>, Vec<Neighbour>) {
    let (entities, mut neighbours): (Vec<_>, Vec<_>) = flock
        .agents
        .iter()
        .filter_map(|&entity| {
            let kinematics = world.get::<&Kinematics>(entity).ok()?;
            let agent = world.get::<&Agent>(entity).ok()?;
            Some((
                entity,
                Neighbour {
                    index: agent.index,
                    position: agent.absolute,
                    velocity: kinematics.velocity,
                },
            ))
        })
        .unzip();
    neighbours.sort_by_key(|n| n.index);
    (entities, neighbours)
}

#[allow(clippy::too_many_arguments)]
fn update_agent(
    world: &mut World,
    entity: Entity,
    flock: &mut Flock,
    previous: &[Neighbour],
    tokens: &mut Vec<RewardToken>,
    ctx: &FlockingContext<'_>,
    rng: &mut impl Rng,
    events: &mut Vec<SimEvent>,
) {
    let Ok((kinematics, agent)) = world.query_one_mut::<(&mut Kinematics, &mut Agent)>(entity) else {
        return;
    };

    let params = flock.params;
    let config = ctx.config;
    let position = agent.absolute;
    let velocity = kinematics.velocity;
    let sight = if agent.curious {
        params.perception * 2.0
    } else {
        params.perception
    };
    let sight_sq = sight * sight;
    let home = flock.home_position(ctx.frame.tick, ctx.sector_size);

    let mut force = Vec2::ZERO;

    force += flocking_force(agent.index, position, velocity, previous, &params);

    let avoid = -(params.max_force * config.obstacle_factor);
    let player_obstacle = PointForce::new(PointForceKind::Player, ctx.player.position, ctx.player.radius, avoid);
    for obstacle in ctx.frame.obstacles.iter().chain(std::iter::once(&player_obstacle)) {
        force += point_force(&obstacle.with_strength(avoid), position, params.radius);
    }

    if !agent.carrying {
        for token in tokens.iter() {
            if token.position.distance_squared(&position) < sight_sq {
                force += arrive(token.position, sight, params.max_speed, params.max_force, position, velocity);
            }
        }
        let touching = tokens.iter().position(|token| {
            let reach = token.radius + params.radius;
            token.position.distance_squared(&position) < reach * reach
        });
        if let Some(i) = touching {
            tokens.remove(i);
            agent.carrying = true;
            flock.carrying_count += 1;
            events.push(SimEvent::RewardClaimed {
                flock: flock.coord,
                agent: agent.index,
            });
        }
    }

    if agent.carrying {
        let around = flock.home.radius * 2.0;
        let goal = home + Vec2::from_angle(uniform(rng, 0.0, TAU), around);
        let deliver = arrive(goal, sight, params.max_speed, params.max_force, position, velocity);
        force += deliver * config.delivery_weight;

        let reach = around + params.radius;
        if home.distance_squared(&position) < reach * reach {
            agent.carrying = false;
            flock.carrying_count = flock.carrying_count.saturating_sub(1);
            flock.rewards_delivered += 1;
            events.push(SimEvent::RewardDelivered {
                flock: flock.coord,
                home: flock.home.key,
                total: flock.rewards_delivered,
            });
            if !flock.friend {
                flock.friend = true;
                events.push(SimEvent::FlockBefriended { flock: flock.coord });
            }
        }
    }

    force += leash_force(
        position,
        home,
        ctx.sector_size * params.explore_factor,
        params.max_force,
    );

    if ctx.player.position.distance_squared(&position) < sight_sq {
        let affinity = player_affinity(
            params.player_affinity,
            agent.curious,
            flock.friend,
            agent.carrying,
            config,
        );
        let around = (ctx.player.radius + params.radius) * 2.0;
        let goal = ctx.player.position + Vec2::from_angle(uniform(rng, 0.0, TAU), around);
        force += arrive(goal, sight, params.max_speed, params.max_force, position, velocity) * affinity;
    }

    let ahead_dist = params.radius * 2.0;
    let ahead = position + Vec2::from_angle(agent.heading, ahead_dist);
    let goal = ahead + Vec2::from_angle(uniform(rng, 0.0, TAU), ahead_dist);
    force += seek(goal, params.max_speed, params.max_force, position, velocity) * config.wander_weight;

    kinematics.apply_force(force);
    *kinematics = integrate(*kinematics, params.max_speed, config.acceleration_decay);
    if !kinematics.velocity.is_zero() {
        agent.heading = kinematics.velocity.angle();
    }
    agent.absolute = flock.coord.to_absolute(kinematics.position, ctx.sector_size);
}
