//! Orbit system - body positions for the current tick and reward regrowth

use starflock_logic::steering::{PointForce, PointForceKind};
use starflock_logic::{BodyKey, Vec2, Window};

use crate::cache::SectorCache;
use crate::events::SimEvent;
use crate::overlay::Overlay;

/// Where a window body sits this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub key: BodyKey,
    /// Absolute position.
    pub position: Vec2,
    pub radius: f64,
}

/// Everything in the window that movers steer around, at one tick.
#[derive(Debug, Clone, Default)]
pub struct WorldFrame {
    pub tick: u64,
    /// Stars then bodies, sector by sector, absolute positions. Strength
    /// is left at zero; each mover applies its own.
    pub obstacles: Vec<PointForce>,
    pub bodies: Vec<BodyFrame>,
}

/// Position every star and body of the windowed sectors at `tick`.
pub fn build_frame(sectors: &SectorCache, window: &Window, tick: u64, sector_size: f64) -> WorldFrame {
    let mut frame = WorldFrame {
        tick,
        ..WorldFrame::default()
    };

    for coord in window.coords() {
        let Some(star) = sectors.get(&coord).and_then(|s| s.star.as_ref()) else {
            continue;
        };
        frame.obstacles.push(PointForce::new(
            PointForceKind::Star,
            coord.to_absolute(star.position, sector_size),
            star.radius,
            0.0,
        ));
        for body in &star.bodies {
            let position = body.absolute_position(tick, sector_size);
            frame
                .obstacles
                .push(PointForce::new(PointForceKind::Body, position, body.radius, 0.0));
            frame.bodies.push(BodyFrame {
                key: body.key,
                position,
                radius: body.radius,
            });
        }
    }

    frame
}

/// Regrow rewards on windowed bodies whose interval has passed.
pub fn regrow_rewards(
    sectors: &mut SectorCache,
    overlay: &mut Overlay,
    window: &Window,
    tick: u64,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for coord in window.coords() {
        let Some(star) = sectors.get_mut(&coord).and_then(|s| s.star.as_mut()) else {
            continue;
        };
        for body in &mut star.bodies {
            if overlay.regrow_reward(body, tick) {
                events.push(SimEvent::RewardRegrown { body: body.key });
            }
        }
    }
    events
}
