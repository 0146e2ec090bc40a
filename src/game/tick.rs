//! Authoritative Simulation Tick
//!
//! The frame loop. Fixed update order every frame:
//!
//! 1. Capture both inputs and the opponents' start-of-frame positions
//! 2. P1 then P2: action state machine, then physics
//! 3. Projectiles released by attacks that just became active
//! 4. Melee hit detection in both directions on the moved positions
//! 5. Combat effects, P1's hit first
//! 6. Projectiles in flight: hit-test, then move, in launch order
//! 7. Round timer
//! 8. Termination
//!
//! A hit landing on frame N is visible to the state machines from frame
//! N+1, except KO which is forced immediately.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::core::fixed::{Fixed, FRAME_RATE, GRAVITY, GROUND_FRICTION, LAND_FRAMES};
use crate::core::hash::StateHash;
use crate::error::SimError;
use crate::game::action::{self, StepContext};
use crate::game::character::CharacterId;
use crate::game::combat;
use crate::game::events::{EventSink, GameEvent};
use crate::game::hitbox;
use crate::game::input::InputFrame;
use crate::game::moveset::Moveset;
use crate::game::physics::{self, PhysicsParams, Stage};
use crate::game::projectile;
use crate::game::state::{MatchOutcome, MatchSnapshot, MatchState, Side};

/// Default round length: 99 seconds.
pub const DEFAULT_ROUND_FRAMES: u32 = 99 * FRAME_RATE;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether the match is over
    pub match_ended: bool,
    /// Outcome after this tick
    pub outcome: MatchOutcome,
}

/// Configuration for match simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Round timer in frames; `None` for no timer
    pub timer_frames: Option<u32>,
    /// Stage bounds and spawn points
    pub stage: Stage,
    /// Characters for P1 and P2
    pub fighters: [CharacterId; 2],
    /// Frames of landing recovery
    pub land_frames: u32,
    /// Downward acceleration per frame
    pub gravity: Fixed,
    /// Grounded horizontal velocity multiplier while not moving
    pub ground_friction: Fixed,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            timer_frames: Some(DEFAULT_ROUND_FRAMES),
            stage: Stage::default(),
            fighters: [CharacterId::Mario, CharacterId::Bowser],
            land_frames: LAND_FRAMES,
            gravity: GRAVITY,
            ground_friction: GROUND_FRICTION,
        }
    }
}

impl MatchConfig {
    /// Integrator parameters.
    pub fn physics(&self) -> PhysicsParams {
        PhysicsParams {
            gravity: self.gravity,
            ground_friction: self.ground_friction,
        }
    }
}

/// Run one simulation frame.
///
/// # Arguments
///
/// * `state` - The match state (will be mutated)
/// * `inputs` - P1 and P2 input for this frame
/// * `config` - Match configuration
///
/// # Determinism
///
/// Fixed-point math only, fixed side order, no system calls.
pub fn tick(
    state: &mut MatchState,
    inputs: &[InputFrame; 2],
    config: &MatchConfig,
) -> Result<TickResult, SimError> {
    let mut result = TickResult::default();

    if state.outcome.is_over() {
        result.match_ended = true;
        result.outcome = state.outcome;
        return Ok(result);
    }

    // 0. Advance frame counter
    state.frame += 1;
    state.pending_events.clear();

    // 1. Opponent positions as of the start of the frame
    let centers = [
        state.characters[0].center_x(),
        state.characters[1].center_x(),
    ];

    // 2. State machine, then physics, for each side
    apply_inputs(state, inputs, config, centers);

    // 3. New projectiles
    projectile::launch_ready(
        &mut state.characters,
        &mut state.projectiles,
        state.frame,
        &mut state.pending_events,
    );

    // 4-5. Melee hits
    process_hits(state);

    // 6. Projectiles in flight
    projectile::update_projectiles(
        &mut state.characters,
        &mut state.projectiles,
        &state.stage,
        state.frame,
        &mut state.pending_events,
    );

    // 7. Timer
    if let Some(t) = state.timer_frames_remaining.as_mut() {
        *t = t.saturating_sub(1);
    }

    // 8. Termination
    check_match_end(state, &mut result);

    if let Err(err) = state.check_invariants() {
        warn!(frame = state.frame, %err, "invariant violated");
        return Err(err);
    }

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        frame = state.frame,
        hash = %hex::encode(&state.compute_hash()[..8]),
        p1 = ?state.character(Side::P1).state,
        p2 = ?state.character(Side::P2).state,
        "frame"
    );

    // Collect events in priority order
    state.pending_events.sort();
    result.events = std::mem::take(&mut state.pending_events);
    result.outcome = state.outcome;

    Ok(result)
}

/// Step every character through the state machine and physics.
fn apply_inputs(
    state: &mut MatchState,
    inputs: &[InputFrame; 2],
    config: &MatchConfig,
    centers: [Fixed; 2],
) {
    let params = config.physics();
    let frame = state.frame;

    for side in Side::ALL {
        let input = &inputs[side.index()];
        let ctx = StepContext {
            side,
            input,
            moveset: &state.moveset,
            opponent_center_x: centers[side.opponent().index()],
            frame,
            land_frames: config.land_frames,
        };

        let ch = &mut state.characters[side.index()];
        action::step(ch, &ctx, &mut state.pending_events);

        let out = physics::integrate(ch, input, &state.stage, &params);
        if out.landed {
            state.pending_events.push(GameEvent::landed(frame, side));
        }
    }
}

/// Detect contacts in both directions, then apply them.
fn process_hits(state: &mut MatchState) {
    let contacts = hitbox::detect_contacts(&mut state.characters);
    if contacts.is_empty() {
        return;
    }
    combat::resolve_contacts(
        &mut state.characters,
        &contacts,
        state.frame,
        &mut state.pending_events,
    );
}

/// Check if the match should end.
fn check_match_end(state: &mut MatchState, result: &mut TickResult) {
    let p1_ko = state.character(Side::P1).hp == 0;
    let p2_ko = state.character(Side::P2).hp == 0;

    let outcome = if p2_ko {
        // Double KO goes to P1
        MatchOutcome::P1Wins
    } else if p1_ko {
        MatchOutcome::P2Wins
    } else if state.timer_frames_remaining == Some(0) {
        let p1_hp = state.character(Side::P1).hp;
        let p2_hp = state.character(Side::P2).hp;
        match p1_hp.cmp(&p2_hp) {
            std::cmp::Ordering::Greater => MatchOutcome::P1Wins,
            std::cmp::Ordering::Less => MatchOutcome::P2Wins,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    } else {
        return;
    };

    end_match(state, outcome);
    result.match_ended = true;
}

/// Record the outcome exactly once.
fn end_match(state: &mut MatchState, outcome: MatchOutcome) {
    state.outcome = outcome;

    for side in Side::ALL {
        let ch = state.character_mut(side);
        if ch.hp == 0 && !ch.is_ko() {
            action::enter_ko(ch);
        }
    }
    if let Some(winner) = outcome.winner() {
        action::enter_win(state.character_mut(winner));
    }

    state.pending_events.push(GameEvent::match_ended(state.frame, outcome));
    info!(
        frame = state.frame,
        ?outcome,
        p1_hp = state.character(Side::P1).hp,
        p2_hp = state.character(Side::P2).hp,
        "match ended"
    );
}

/// Run a scripted input sequence until it is exhausted or the match ends.
///
/// Returns the number of frames actually simulated.
pub fn simulate(
    state: &mut MatchState,
    inputs: &[[InputFrame; 2]],
    config: &MatchConfig,
) -> Result<u32, SimError> {
    let mut frames = 0;
    for frame_inputs in inputs {
        let result = tick(state, frame_inputs, config)?;
        frames += 1;
        if result.match_ended {
            break;
        }
    }
    debug!(frames, hash = %hex::encode(&state.compute_hash()[..8]), "simulation finished");
    Ok(frames)
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns a match and its configuration; the entry point for a game loop.
pub struct MatchController {
    config: MatchConfig,
    state: MatchState,
    sink: Option<Box<dyn EventSink + Send>>,
}

impl MatchController {
    /// Start a new match.
    pub fn new(moveset: Arc<Moveset>, config: MatchConfig) -> Self {
        let state = MatchState::new(moveset, &config);
        info!(
            p1 = ?config.fighters[0],
            p2 = ?config.fighters[1],
            timer_frames = ?config.timer_frames,
            "match created"
        );
        Self { config, state, sink: None }
    }

    /// Forward every event to `sink` as it is produced.
    pub fn with_sink(mut self, sink: Box<dyn EventSink + Send>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Advance one frame.
    pub fn tick(&mut self, inputs: [InputFrame; 2]) -> Result<TickResult, SimError> {
        let result = tick(&mut self.state, &inputs, &self.config)?;
        if let Some(sink) = self.sink.as_mut() {
            for event in &result.events {
                sink.on_event(event);
            }
        }
        Ok(result)
    }

    /// Back to the start of the match.
    pub fn reset(&mut self) {
        self.state.reset();
        debug!("match reset");
    }

    /// Current state.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Current state, mutably (test setups, training modes).
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    /// Configuration in use.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> MatchSnapshot {
        self.state.snapshot()
    }

    /// Determinism digest of the current state.
    pub fn state_hash(&self) -> StateHash {
        self.state.compute_hash()
    }

    /// Outcome so far.
    pub fn outcome(&self) -> MatchOutcome {
        self.state.outcome
    }
}
