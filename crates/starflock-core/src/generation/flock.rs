//! Flock spawning - turns a blueprint into live agents in the ECS world

use std::f64::consts::TAU;

use hecs::World;
use log::debug;
use rand::Rng;
use starflock_logic::rng::uniform;
use starflock_logic::steering::Kinematics;
use starflock_logic::Vec2;

use crate::components::*;
use crate::overlay::FlockRecord;

/// Spawn the agents of `blueprint` around `home` and return the live flock.
///
/// Agents start at rest, scattered between one and ten contact distances
/// from the home body's position at `tick`, clamped into the sector.
pub fn spawn_flock(
    world: &mut World,
    blueprint: &FlockBlueprint,
    home: Body,
    record: FlockRecord,
    tick: u64,
    sector_size: f64,
    rng: &mut impl Rng,
) -> Flock {
    let coord = blueprint.home.sector;
    let params = blueprint.params;
    let anchor = home.local_position(tick);
    let min_dist = home.radius + params.radius;

    let agents = blueprint
        .curious
        .iter()
        .enumerate()
        .map(|(index, &curious)| {
            let dist = uniform(rng, min_dist, min_dist * 10.0);
            let angle = uniform(rng, 0.0, TAU);
            let offset = anchor + Vec2::from_angle(angle, dist);
            let local = Vec2::new(
                offset.x.clamp(0.0, sector_size),
                offset.y.clamp(0.0, sector_size),
            );
            world.spawn((
                Kinematics::at(local),
                Agent {
                    flock: coord,
                    index,
                    curious,
                    carrying: false,
                    heading: 0.0,
                    absolute: coord.to_absolute(local, sector_size),
                },
            ))
        })
        .collect();

    Flock {
        coord,
        home,
        params,
        agents,
        carrying_count: 0,
        rewards_delivered: record.rewards_delivered,
        friend: record.friend,
    }
}

/// Remove a flock's agents from the world. Returns the absolute positions
/// of agents that were carrying a token, so the tokens can be put back.
pub fn despawn_flock(world: &mut World, flock: &Flock) -> Vec<Vec2> {
    let mut dropped = Vec::new();
    for &entity in &flock.agents {
        if let Ok(agent) = world.get::<&Agent>(entity) {
            if agent.carrying {
                dropped.push(agent.absolute);
            }
        }
        if world.despawn(entity).is_err() {
            debug!("Agent {:?} of flock {} was already despawned", entity, flock.coord);
        }
    }
    dropped
}
