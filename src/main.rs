//! Brawl Core demo
//!
//! Runs a scripted Mario vs Bowser match headless and checks that a
//! second run with the same inputs ends in the same state.
//!
//! Usage: `brawl-core [MOVESET_JSON]`
//! Environment: `BRAWL_TIMER_SECONDS` overrides the round length,
//! `RUST_LOG` the log filter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brawl_core::{
    Command, InputFrame, MatchConfig, MatchController, Moveset, FRAME_RATE, VERSION,
    game::events::{GameEvent, GameEventData},
    game::state::MatchState,
    game::tick::simulate,
};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Brawl Core v{}", VERSION);

    let moveset = match std::env::args().nth(1) {
        Some(path) => Moveset::load(&path).with_context(|| format!("loading moveset {}", path))?,
        None => Moveset::builtin().context("loading built-in moveset")?,
    };
    info!("Moveset fingerprint: {}", hex::encode(&moveset.fingerprint()[..8]));

    let mut config = MatchConfig::default();
    if let Ok(raw) = std::env::var("BRAWL_TIMER_SECONDS") {
        let seconds: u32 = raw
            .parse()
            .with_context(|| format!("BRAWL_TIMER_SECONDS must be a whole number, got {:?}", raw))?;
        config.timer_frames = timer_frames(seconds)?;
    }
    info!("Frame Rate: {} Hz, timer: {:?} frames", FRAME_RATE, config.timer_frames);

    demo_match(Arc::new(moveset), config)
}

/// Round length in frames for a length in seconds; 0 means untimed.
fn timer_frames(seconds: u32) -> Result<Option<u32>> {
    if seconds == 0 {
        return Ok(None);
    }
    let frames = seconds
        .checked_mul(FRAME_RATE)
        .with_context(|| format!("BRAWL_TIMER_SECONDS={} overflows the frame counter", seconds))?;
    Ok(Some(frames))
}

/// Scripted inputs for a frame: Mario closes in and pokes, Bowser walks in,
/// blocks now and then, and swings heavy.
fn scripted_inputs(frame: u32) -> [InputFrame; 2] {
    let mario = match frame % 90 {
        0..=29 => InputFrame::holding(&[Command::MoveRight]),
        30 | 45 => InputFrame::new().press(Command::Light),
        60 => InputFrame::new().press(Command::Heavy),
        75 => InputFrame::new().press(Command::Ultimate).press(Command::Light),
        80 => InputFrame::new().press(Command::Jump),
        84 => InputFrame::new().press(Command::Light),
        88 => InputFrame::new().press(Command::Special),
        _ => InputFrame::new(),
    };
    let bowser = match frame % 120 {
        0..=19 => InputFrame::holding(&[Command::MoveLeft]),
        20..=39 => InputFrame::holding(&[Command::Block]),
        50 => InputFrame::new().press(Command::Heavy),
        80 => InputFrame::new().press(Command::Special),
        100 => InputFrame::new().press(Command::Ultimate).press(Command::Light),
        _ => InputFrame::new(),
    };
    [mario, bowser]
}

/// Log the events worth reading in a demo run.
fn log_event(event: &GameEvent) {
    match &event.data {
        GameEventData::HitConnected { attacker, kind, damage, counter, defender_hp } => {
            info!(
                "Frame {}: {:?} hit with {:?} for {}{} (defender hp {})",
                event.frame,
                attacker,
                kind,
                damage,
                if *counter { " COUNTER" } else { "" },
                defender_hp
            );
        }
        GameEventData::UltimateActivated { side } => {
            info!("Frame {}: {:?} activated ultimate", event.frame, side);
        }
        GameEventData::ProjectileLaunched { side } => {
            info!("Frame {}: {:?} fired a projectile", event.frame, side);
        }
        GameEventData::KnockedOut { victim } => {
            info!("Frame {}: {:?} knocked out", event.frame, victim);
        }
        _ => {}
    }
}

/// Demo function to exercise the simulation.
fn demo_match(moveset: Arc<Moveset>, config: MatchConfig) -> Result<()> {
    info!("=== Starting Demo Match ===");

    let mut controller = MatchController::new(Arc::clone(&moveset), config.clone())
        .with_sink(Box::new(log_event));
    let limit = config.timer_frames.unwrap_or(60 * FRAME_RATE);
    let mut script = Vec::with_capacity(limit as usize);
    let mut total_events = 0;

    for frame in 0..limit {
        let inputs = scripted_inputs(frame);
        script.push(inputs);

        let result = controller.tick(inputs)?;
        total_events += result.events.len();

        if frame % (10 * FRAME_RATE) == 0 {
            let snap = controller.snapshot();
            info!(
                "Frame {} ({:?}s left): P1 {:?} hp {} meter {:.0} | P2 {:?} hp {} meter {:.0}",
                snap.frame,
                snap.timer_seconds(),
                snap.characters[0].state,
                snap.characters[0].hp,
                snap.characters[0].ultimate_meter,
                snap.characters[1].state,
                snap.characters[1].hp,
                snap.characters[1].ultimate_meter,
            );
        }

        if result.match_ended {
            break;
        }
    }

    // Print final results
    info!("=== Match Results ===");
    info!("Outcome: {:?} after {} frames", controller.outcome(), controller.state().frame);
    info!("Total events: {}", total_events);
    let hash = controller.state_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let mut replay = MatchState::new(moveset, &config);
    simulate(&mut replay, &script, &config)?;
    let replay_hash = replay.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    anyhow::ensure!(hash == replay_hash, "determinism failure: replay hash differs");
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
