//! Headless driver: runs a seeded autopilot game and prints the outcome.
//!
//! Usage: `freefall [seed] [max_frames]`

use freefall::Tuning;
use freefall::sim::{FrameReport, GameEvent, Session, TickInput, World};
use glam::DVec3;

const FRAME_MS: f64 = 1000.0 / 60.0;
const DEFAULT_MAX_FRAMES: u64 = 60 * 60 * 5;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    let max_frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_MAX_FRAMES);

    let world = match World::new(Tuning::load(), seed) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Invalid tuning: {e}");
            std::process::exit(1);
        }
    };

    let mut session = Session::new(world);
    session.resume();

    let mut last: Option<FrameReport> = None;
    let mut landings = 0u32;
    let mut warps = 0u32;
    for frame in 0..max_frames {
        let input = autopilot(&session.world);
        let Some(report) = session.frame(frame as f64 * FRAME_MS, &input) else {
            continue;
        };
        for event in &report.events {
            match event {
                GameEvent::Landed { warped: false, .. } => landings += 1,
                GameEvent::WarpStarted { .. } => warps += 1,
                _ => {}
            }
        }
        let over = report.game_over;
        last = Some(report);
        if over {
            break;
        }
    }

    let Some(report) = last else {
        log::warn!("No frames were simulated");
        return;
    };
    log::info!(
        "Seed {seed}: score {} health {:.2} depth {:.1} after {:.1}s ({landings} landings, {warps} warps){}",
        report.score,
        report.health,
        -report.position.y,
        session.game_time_ms() / 1000.0,
        if report.game_over { ", game over" } else { "" },
    );
    match serde_json::to_string(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize final report: {e}"),
    }
}

/// Walk toward the nearest active platform below; warp when one is highlighted.
fn autopilot(world: &World) -> TickInput {
    let body = &world.body;
    if let Some(platform) = body.highlighted_platform.and_then(|id| world.field.get(id)) {
        return TickInput {
            warp: body.landed,
            aim: platform.position - body.position,
            ..Default::default()
        };
    }

    let next = world
        .field
        .platforms()
        .iter()
        .filter(|p| p.active && p.top() < body.position.y - 1.0)
        .min_by(|a, b| {
            let da = a.position.distance_squared(body.position);
            let db = b.position.distance_squared(body.position);
            da.total_cmp(&db)
        });

    match next {
        Some(platform) => {
            let to = platform.position - body.position;
            TickInput {
                forward: DVec3::new(to.x, 0.0, to.z).length() > 0.5,
                aim: to,
                ..Default::default()
            }
        }
        None => TickInput::default(),
    }
}
