//! Starflock Headless Simulation Harness
//!
//! Validates generation, steering and the running engine in-process.
//! No renderer, no input devices.
//!
//! Usage:
//!   cargo run -p starflock-simtest
//!   cargo run -p starflock-simtest -- --verbose
//!   cargo run -p starflock-simtest -- --config universe.json --ticks 5000 --dump snapshot.json

use std::f64::consts::PI;

use log::{info, warn};
use serde::Serialize;
use starflock_core::generation::SectorGenerator;
use starflock_core::overlay::Overlay;
use starflock_core::prelude::*;
use starflock_core::systems::{flocking_force, Neighbour};
use starflock_logic::config::ConfigError;
use starflock_logic::orbit::angle_at;
use starflock_logic::rng::OccupancyField;
use starflock_logic::steering::{
    arrive, desired_speed, integrate, point_force, seek, Kinematics, PointForce, PointForceKind,
};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    config_path: Option<String>,
    ticks: u64,
    dump_path: Option<String>,
}

impl Options {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let value_after = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };
        Self {
            verbose: args.iter().any(|a| a == "--verbose"),
            config_path: value_after("--config"),
            ticks: value_after("--ticks")
                .and_then(|t| t.parse().ok())
                .unwrap_or(3_000),
            dump_path: value_after("--dump"),
        }
    }
}

/// End-of-run numbers, printed with `--verbose` and embedded in dumps.
#[derive(Debug, Serialize)]
struct RunSummary {
    ticks: u64,
    sectors_cached: usize,
    flocks_cached: usize,
    agents: usize,
    events: std::collections::BTreeMap<&'static str, usize>,
    ledger: RewardLedger,
}

#[derive(Serialize)]
struct Dump<'a> {
    summary: &'a RunSummary,
    snapshot: WorldSnapshot,
}

fn main() {
    let options = Options::from_args();
    let default_filter = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    println!("=== Starflock Simulation Harness ===\n");

    let config = match load_config(options.config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(2);
        }
    };
    info!("Seed {}, sector size {}", config.seed, config.sector_size);

    let mut results = Vec::new();

    // 1. Configuration loading and validation
    results.extend(validate_config(&config));

    // 2. Deterministic generation sweep
    results.extend(validate_generation(&config, options.verbose));

    // 3. Steering primitives
    results.extend(validate_steering());

    // 4. Orbit math
    results.extend(validate_orbits());

    // 5. Flocking neighbourhood
    results.extend(validate_flocking());

    // 6. Full engine run
    let summary = match validate_engine(&config, options.ticks, &mut results) {
        Some(s) => s,
        None => {
            report(&results, options.verbose);
            std::process::exit(1);
        }
    };

    if options.verbose {
        println!("\n--- Run Summary ---");
        println!("  ticks: {}", summary.ticks);
        println!("  sectors cached: {}", summary.sectors_cached);
        println!("  flocks cached: {} ({} agents)", summary.flocks_cached, summary.agents);
        for (name, count) in &summary.events {
            println!("  {}: {}", name, count);
        }
    }

    if let Some(path) = &options.dump_path {
        if let Err(e) = dump_snapshot(path, &config, &summary) {
            warn!("Could not write {}: {}", path, e);
            results.push(TestResult {
                name: "snapshot_dump".into(),
                passed: false,
                detail: e,
            });
        }
    }

    report(&results, options.verbose);
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> Result<UniverseConfig, String> {
    let Some(path) = path else {
        return Ok(UniverseConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    UniverseConfig::from_json(&text).map_err(|e| format!("{}: {}", path, e))
}

fn dump_snapshot(path: &str, config: &UniverseConfig, summary: &RunSummary) -> Result<(), String> {
    let mut engine = SimulationEngine::new(config.clone()).map_err(|e| e.to_string())?;
    for tick in 0..summary.ticks {
        engine.set_player_target(route_target(tick, config.sector_size));
        engine.advance_tick();
    }
    let dump = Dump {
        summary,
        snapshot: engine.snapshot(),
    };
    let json = serde_json::to_string_pretty(&dump).map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| e.to_string())?;
    println!("Snapshot written to {}", path);
    Ok(())
}

/// Scripted route: a slow loop through the neighbouring sectors.
fn route_target(tick: u64, sector_size: f64) -> Vec2 {
    let leg = (tick / 600) % 4;
    let half = sector_size * 0.5;
    let far = sector_size * 1.5;
    match leg {
        0 => Vec2::new(far, half),
        1 => Vec2::new(far, far),
        2 => Vec2::new(-half, far),
        _ => Vec2::new(-half, -half),
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &UniverseConfig) -> Vec<TestResult> {
    println!("--- Configuration ---");
    let mut results = Vec::new();

    let valid = config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: valid.is_ok(),
        detail: match valid {
            Ok(()) => format!("seed {}, window radius {}", config.seed, config.window_radius),
            Err(e) => e.to_string(),
        },
    });

    let roundtrip = serde_json::to_string(config)
        .map_err(ConfigError::from)
        .and_then(|json| UniverseConfig::from_json(&json));
    results.push(TestResult {
        name: "config_json_roundtrip".into(),
        passed: roundtrip
            .as_ref()
            .map(|c| c.seed == config.seed && c.sector_size == config.sector_size)
            .unwrap_or(false),
        detail: match &roundtrip {
            Ok(_) => "serialized config parses back".into(),
            Err(e) => e.to_string(),
        },
    });

    let rejected = UniverseConfig::from_json(r#"{ "sector_size": -1.0 }"#);
    results.push(TestResult {
        name: "config_rejects_bad_sector_size".into(),
        passed: matches!(rejected, Err(ConfigError::Invalid { .. })),
        detail: match rejected {
            Err(e) => e.to_string(),
            Ok(_) => "negative sector size accepted".into(),
        },
    });

    results
}

// ── 2. Generation ───────────────────────────────────────────────────────

fn validate_generation(config: &UniverseConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();
    let overlay = Overlay::new();
    let a = SectorGenerator::new(config);
    let b = SectorGenerator::new(config);

    let mut mismatches = 0;
    let mut stars = 0;
    let mut bodies = 0;
    let mut flocks = 0;
    let mut orbit_violations = Vec::new();
    let mut settlement_violations = 0;
    for x in -10..=10 {
        for y in -10..=10 {
            let coord = SectorCoord::new(x, y);
            let sector = a.generate(coord, &overlay);
            if sector != b.generate(coord, &overlay) {
                mismatches += 1;
            }
            let Some(star) = &sector.star else {
                continue;
            };
            stars += 1;
            bodies += star.bodies.len();
            let mut last = star.radius;
            for body in &star.bodies {
                if body.orbit.radius <= last || body.orbit.radius > config.generation.max_orbit_radius {
                    orbit_violations.push(coord);
                }
                last = body.orbit.radius;
            }
            if sector.flock.is_some() {
                flocks += 1;
                match sector.home_body() {
                    Some(home) if home.state.is_settlement && !home.grows_rewards => {}
                    _ => settlement_violations += 1,
                }
            }
        }
    }
    if verbose {
        println!("  21x21 grid: {} stars, {} bodies, {} flocks", stars, bodies, flocks);
    }

    results.push(TestResult {
        name: "generation_deterministic".into(),
        passed: mismatches == 0,
        detail: format!("{} of 441 sectors differ between generators", mismatches),
    });
    results.push(TestResult {
        name: "generation_orbits_increasing".into(),
        passed: orbit_violations.is_empty(),
        detail: if orbit_violations.is_empty() {
            format!("{} bodies checked", bodies)
        } else {
            format!("violations in {:?}", orbit_violations)
        },
    });
    results.push(TestResult {
        name: "generation_home_is_settlement".into(),
        passed: settlement_violations == 0,
        detail: format!("{} flocks, {} bad homes", flocks, settlement_violations),
    });

    let field = OccupancyField::new(42, 0.33);
    let origin_a = field.is_occupied(SectorCoord::ORIGIN);
    let origin_b = OccupancyField::new(42, 0.33).is_occupied(SectorCoord::ORIGIN);
    results.push(TestResult {
        name: "generation_seed_42_origin_stable".into(),
        passed: origin_a == origin_b,
        detail: format!(
            "noise {:.4}, star present: {}",
            field.sample(SectorCoord::ORIGIN),
            origin_a
        ),
    });

    results
}

// ── 3. Steering ─────────────────────────────────────────────────────────

fn validate_steering() -> Vec<TestResult> {
    println!("--- Steering ---");
    let mut results = Vec::new();

    let mut worst_force = 0.0f64;
    let mut worst_speed = 0.0f64;
    let mut non_finite = 0;
    for i in 0..400 {
        let angle = i as f64 * 0.157;
        let target = Vec2::from_angle(angle, i as f64 * 3.0);
        let velocity = Vec2::from_angle(-angle, (i % 7) as f64);
        let max_force = 0.01 + (i % 10) as f64 * 0.1;
        let max_speed = 0.5 + (i % 8) as f64;

        let s = seek(target, max_speed, max_force, Vec2::ZERO, velocity);
        let a = arrive(target, 100.0, max_speed, max_force, Vec2::ZERO, velocity);
        if !s.is_finite() || !a.is_finite() {
            non_finite += 1;
        }
        worst_force = worst_force.max(s.length() - max_force).max(a.length() - max_force);

        let next = integrate(
            Kinematics {
                position: Vec2::ZERO,
                velocity,
                acceleration: target,
            },
            max_speed,
            0.0,
        );
        worst_speed = worst_speed.max(next.velocity.length() - max_speed);
    }

    results.push(TestResult {
        name: "steering_force_clamped".into(),
        passed: worst_force <= 1e-9 && non_finite == 0,
        detail: format!("worst excess {:.2e}, {} non-finite", worst_force, non_finite),
    });
    results.push(TestResult {
        name: "steering_speed_clamped".into(),
        passed: worst_speed <= 1e-9,
        detail: format!("worst excess {:.2e}", worst_speed),
    });

    let speeds: Vec<f64> = (0..=10).map(|d| desired_speed(d as f64 * 10.0, 100.0, 4.0)).collect();
    let monotonic = speeds.windows(2).all(|w| w[0] < w[1]) && speeds[0] == 0.0;
    results.push(TestResult {
        name: "steering_arrival_monotonic".into(),
        passed: monotonic,
        detail: format!("speeds {:?}", speeds),
    });

    let star = PointForce::new(PointForceKind::Star, Vec2::new(30.0, 0.0), 20.0, -1.0);
    let at_edge = point_force(&star, Vec2::ZERO, 10.0);
    let inside = point_force(&star, Vec2::new(0.5, 0.0), 10.0);
    results.push(TestResult {
        name: "steering_point_force_reach".into(),
        passed: at_edge.is_zero() && inside.x < 0.0,
        detail: format!("edge {:?}, inside {:?}", at_edge, inside),
    });

    results
}

// ── 4. Orbits ───────────────────────────────────────────────────────────

fn validate_orbits() -> Vec<TestResult> {
    println!("--- Orbits ---");
    let mut results = Vec::new();

    let half_turn = angle_at(0.0, PI / 3600.0, 3600);
    results.push(TestResult {
        name: "orbit_half_turn".into(),
        passed: (half_turn - PI).abs() < 1e-9,
        detail: format!("angle after 3600 ticks at π/3600: {:.12}", half_turn),
    });

    let late = angle_at(1.0, 0.001, 10_000_000);
    results.push(TestResult {
        name: "orbit_bounded_after_long_run".into(),
        passed: (0.0..std::f64::consts::TAU).contains(&late),
        detail: format!("angle at tick 10M: {:.6}", late),
    });

    results
}

// ── 5. Flocking ─────────────────────────────────────────────────────────

fn validate_flocking() -> Vec<TestResult> {
    println!("--- Flocking ---");
    let mut results = Vec::new();

    let params = FlockParams {
        max_speed: 2.0,
        max_force: 0.1,
        radius: 15.0,
        perception: 100.0,
        separation: 2.0,
        alignment: 0.5,
        cohesion: 0.5,
        explore_factor: 3.0,
        player_affinity: 0.0,
        curiosity_rate: 0.0,
        shape: ShapeParams {
            control_a: Vec2::ZERO,
            control_b: Vec2::ZERO,
        },
    };
    let me = Neighbour {
        index: 0,
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
    };
    let edge = Neighbour {
        index: 1,
        position: Vec2::new(100.0, 0.0),
        velocity: Vec2::new(1.0, 0.0),
    };
    let force = flocking_force(0, Vec2::ZERO, Vec2::ZERO, &[me, edge], &params);
    results.push(TestResult {
        name: "flocking_perception_exclusive".into(),
        passed: force.is_zero(),
        detail: format!("force from neighbour at exactly perception: {:?}", force),
    });

    results
}

// ── 6. Engine ───────────────────────────────────────────────────────────

fn validate_engine(
    config: &UniverseConfig,
    ticks: u64,
    results: &mut Vec<TestResult>,
) -> Option<RunSummary> {
    println!("--- Engine ({} ticks) ---", ticks);

    let mut engine = match SimulationEngine::new(config.clone()) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult {
                name: "engine_create".into(),
                passed: false,
                detail: e.to_string(),
            });
            return None;
        }
    };
    let bound = config.sector_cache_capacity + engine.window().len();

    let mut events = std::collections::BTreeMap::new();
    let mut cache_violations = 0;
    let mut fuel_violations = 0;
    let mut ledger_violations = 0;
    let mut expected_rewards = engine.reward_ledger().total();

    for tick in 0..ticks {
        engine.set_player_target(route_target(tick, config.sector_size));
        if tick % 500 == 250 && engine.drop_reward_near_player() {
            info!("Dropped a reward at tick {}", tick);
        }

        let report = engine.advance_tick();
        for event in &report.events {
            *events.entry(event.name()).or_insert(0) += 1;
        }
        expected_rewards += report.count("reward_collected") as u64;

        if engine.sector_count() > bound {
            cache_violations += 1;
        }
        let fuel = engine.player().fuel;
        if !(0.0..=1.0).contains(&fuel) {
            fuel_violations += 1;
        }
        if engine.reward_ledger().total() != expected_rewards {
            ledger_violations += 1;
        }
    }

    results.push(TestResult {
        name: "engine_sector_cache_bounded".into(),
        passed: cache_violations == 0,
        detail: format!(
            "{} cached (bound {}), {} violations",
            engine.sector_count(),
            bound,
            cache_violations
        ),
    });
    results.push(TestResult {
        name: "engine_fuel_in_range".into(),
        passed: fuel_violations == 0,
        detail: format!("final fuel {:.4}", engine.player().fuel),
    });
    results.push(TestResult {
        name: "engine_rewards_conserved".into(),
        passed: ledger_violations == 0,
        detail: format!("{:?}, {} violations", engine.reward_ledger(), ledger_violations),
    });

    let agents_match = engine.agent_count()
        == engine
            .flock_coords()
            .iter()
            .filter_map(|c| engine.flock(*c))
            .map(|f| f.agents.len())
            .sum::<usize>();
    results.push(TestResult {
        name: "engine_agents_owned_by_flocks".into(),
        passed: agents_match,
        detail: format!("{} agents in {} flocks", engine.agent_count(), engine.flock_count()),
    });

    Some(RunSummary {
        ticks,
        sectors_cached: engine.sector_count(),
        flocks_cached: engine.flock_count(),
        agents: engine.agent_count(),
        events,
        ledger: engine.reward_ledger(),
    })
}
