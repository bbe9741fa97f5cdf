//! Player system - target seeking, fuel, obstacle avoidance and pickups

use starflock_logic::config::{PlayerConfig, RewardConfig};
use starflock_logic::steering::{arrive, integrate, point_force};

use super::orbits::WorldFrame;
use crate::cache::SectorCache;
use crate::components::Player;
use crate::events::SimEvent;
use crate::overlay::Overlay;

/// Steer, move and collect for one tick.
pub fn player_system(
    player: &mut Player,
    frame: &WorldFrame,
    sectors: &mut SectorCache,
    overlay: &mut Overlay,
    config: &PlayerConfig,
    rewards: &RewardConfig,
    sector_size: f64,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    let position = player.absolute_position(sector_size);

    if let Some(target) = player.target {
        let steer = arrive(
            target,
            config.slow_radius,
            config.max_speed,
            config.max_force,
            position,
            player.kinematics.velocity,
        );
        if !steer.is_zero() && player.burn(config.fuel_rate) {
            events.push(SimEvent::FuelDepleted);
        }
        if !player.is_out_of_fuel() {
            player.kinematics.apply_force(steer);
        }
    }

    let avoid = -(config.max_force * config.obstacle_factor);
    for obstacle in &frame.obstacles {
        let push = point_force(&obstacle.with_strength(avoid), position, player.radius);
        player.kinematics.apply_force(push);
    }

    player.kinematics = integrate(player.kinematics, config.max_speed, 0.0);
    if !player.kinematics.velocity.is_zero() {
        player.heading = player.kinematics.velocity.angle();
    }

    collect_pickups(player, frame, sectors, overlay, config, rewards, sector_size, &mut events);
    player.recenter(sector_size);

    events
}

/// Take resources and rewards from any window body the player touches.
#[allow(clippy::too_many_arguments)]
fn collect_pickups(
    player: &mut Player,
    frame: &WorldFrame,
    sectors: &mut SectorCache,
    overlay: &mut Overlay,
    config: &PlayerConfig,
    rewards: &RewardConfig,
    sector_size: f64,
    events: &mut Vec<SimEvent>,
) {
    let position = player.absolute_position(sector_size);

    for seen in &frame.bodies {
        let Some(body) = sectors
            .get_mut(&seen.key.sector)
            .and_then(|s| s.body_mut(seen.key.index))
        else {
            continue;
        };
        let dist_sq = seen.position.distance_squared(&position);

        let touch = seen.radius + player.radius;
        if dist_sq < touch * touch && overlay.collect_resource(body) {
            player.refuel(config.refuel_amount);
            events.push(SimEvent::Refueled {
                body: seen.key,
                fuel: player.fuel,
            });
        }

        let reach = seen.radius + rewards.pickup_distance + player.radius;
        if player.rewards < config.max_rewards
            && dist_sq < reach * reach
            && overlay.collect_reward(body, frame.tick)
        {
            player.rewards += 1;
            events.push(SimEvent::RewardCollected {
                body: seen.key,
                held: player.rewards,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::*;
    use starflock_logic::orbit::Orbit;
    use starflock_logic::steering::{PointForce, PointForceKind};
    use starflock_logic::{BodyKey, SectorCoord, Vec2};

    use crate::systems::BodyFrame;

    fn world_with_body(state: BodyState) -> (SectorCache, WorldFrame) {
        let coord = SectorCoord::ORIGIN;
        let body = Body {
            key: BodyKey::new(coord, 0),
            radius: 10.0,
            orbit: Orbit {
                center: Vec2::new(300.0, 300.0),
                radius: 0.0,
                start_angle: 0.0,
                angular_speed: 0.0,
            },
            grows_rewards: true,
            regen_interval: 100,
            state,
        };
        let mut cache = SectorCache::new(10);
        cache.insert(
            coord,
            Sector {
                coord,
                star: Some(Star {
                    position: Vec2::new(300.0, 300.0),
                    radius: 0.0,
                    bodies: vec![body],
                }),
                flock: None,
            },
        );
        let frame = WorldFrame {
            tick: 7,
            obstacles: Vec::new(),
            bodies: vec![BodyFrame {
                key: body.key,
                position: Vec2::new(300.0, 300.0),
                radius: 10.0,
            }],
        };
        (cache, frame)
    }

    fn player_at(x: f64, y: f64) -> Player {
        let mut player = Player::new(&PlayerConfig::default());
        player.kinematics.position = Vec2::new(x, y);
        player
    }

    #[test]
    fn test_no_target_no_fuel_burn() {
        let (mut cache, frame) = world_with_body(BodyState::default());
        let mut overlay = Overlay::new();
        let mut player = player_at(100.0, 100.0);
        let events = player_system(
            &mut player,
            &frame,
            &mut cache,
            &mut overlay,
            &PlayerConfig::default(),
            &RewardConfig::default(),
            600.0,
        );
        assert!(events.is_empty());
        assert_eq!(player.fuel, 1.0);
        assert_eq!(player.kinematics.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_steering_burns_fuel_and_depletes() {
        let (mut cache, frame) = world_with_body(BodyState::default());
        let mut overlay = Overlay::new();
        let config = PlayerConfig {
            fuel_rate: 0.5,
            ..PlayerConfig::default()
        };
        let mut player = player_at(100.0, 100.0);
        player.target = Some(Vec2::new(500.0, 100.0));

        player_system(&mut player, &frame, &mut cache, &mut overlay, &config, &RewardConfig::default(), 600.0);
        assert!((player.fuel - 0.5).abs() < 1e-12);
        assert!(player.kinematics.velocity.x > 0.0);

        let events = player_system(&mut player, &frame, &mut cache, &mut overlay, &config, &RewardConfig::default(), 600.0);
        assert_eq!(player.fuel, 0.0);
        assert!(events.contains(&SimEvent::FuelDepleted));

        let speed = player.kinematics.velocity.length();
        player_system(&mut player, &frame, &mut cache, &mut overlay, &config, &RewardConfig::default(), 600.0);
        assert!((player.kinematics.velocity.length() - speed).abs() < 1e-12, "no thrust without fuel");
    }

    #[test]
    fn test_refuel_on_contact() {
        let state = BodyState {
            resource_present: true,
            ..BodyState::default()
        };
        let (mut cache, frame) = world_with_body(state);
        let mut overlay = Overlay::new();
        let mut player = player_at(315.0, 300.0);
        player.fuel = 0.25;

        let events = player_system(
            &mut player,
            &frame,
            &mut cache,
            &mut overlay,
            &PlayerConfig::default(),
            &RewardConfig::default(),
            600.0,
        );
        assert_eq!(player.fuel, 1.0);
        assert!(matches!(events[0], SimEvent::Refueled { .. }));
        assert!(!cache.get(&SectorCoord::ORIGIN).unwrap().bodies()[0].state.resource_present);
    }

    #[test]
    fn test_reward_pickup_respects_cap() {
        let state = BodyState {
            reward_present: true,
            ..BodyState::default()
        };
        let (mut cache, frame) = world_with_body(state);
        let mut overlay = Overlay::new();
        let config = PlayerConfig::default();

        let mut full = player_at(325.0, 300.0);
        full.rewards = config.max_rewards;
        player_system(&mut full, &frame, &mut cache, &mut overlay, &config, &RewardConfig::default(), 600.0);
        assert_eq!(full.rewards, config.max_rewards);

        let mut player = player_at(325.0, 300.0);
        let events = player_system(&mut player, &frame, &mut cache, &mut overlay, &config, &RewardConfig::default(), 600.0);
        assert_eq!(player.rewards, 1);
        assert_eq!(
            events,
            vec![SimEvent::RewardCollected {
                body: BodyKey::new(SectorCoord::ORIGIN, 0),
                held: 1,
            }]
        );
        let stored = overlay.body_state(&BodyKey::new(SectorCoord::ORIGIN, 0)).unwrap();
        assert_eq!(stored.last_reward_pickup, 7);
    }

    #[test]
    fn test_obstacles_push_player_away() {
        let (mut cache, mut frame) = world_with_body(BodyState::default());
        frame.obstacles.push(PointForce::new(
            PointForceKind::Star,
            Vec2::new(110.0, 100.0),
            20.0,
            0.0,
        ));
        let mut overlay = Overlay::new();
        let mut player = player_at(100.0, 100.0);
        player_system(
            &mut player,
            &frame,
            &mut cache,
            &mut overlay,
            &PlayerConfig::default(),
            &RewardConfig::default(),
            600.0,
        );
        assert!(player.kinematics.velocity.x < 0.0);
    }
}
