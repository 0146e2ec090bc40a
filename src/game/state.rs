//! Match State
//!
//! Everything that changes during a match: both characters, the frame
//! counter, the round timer and the outcome. Characters are stored in a
//! fixed-size array indexed by [`Side`] so iteration order never varies.

use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::core::fixed::{FRAME_RATE, MAX_HP, METER_MAX, to_float};
use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::FixedVec2;
use crate::error::SimError;
use crate::game::action::ActionState;
use crate::game::character::{Character, CharacterId, Facing};
use crate::game::events::GameEvent;
use crate::game::moveset::Moveset;
use crate::game::projectile::{Projectile, ProjectileSnapshot};
use crate::game::tick::MatchConfig;

pub use crate::game::physics::Stage;

// =============================================================================
// SIDE
// =============================================================================

/// Which controller slot a character belongs to.
///
/// P1 is side A: it is processed first and wins simultaneous KOs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Left spawn, processed first
    P1 = 0,
    /// Right spawn
    P2 = 1,
}

impl Side {
    /// Both sides in processing order.
    pub const ALL: [Side; 2] = [Side::P1, Side::P2];

    /// Array index.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The other side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of the match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MatchOutcome {
    /// Still being played
    #[default]
    InProgress = 0,
    /// P1 won
    P1Wins = 1,
    /// P2 won
    P2Wins = 2,
    /// Timer ran out with equal HP
    Draw = 3,
}

impl MatchOutcome {
    /// Outcome where `side` wins.
    pub fn win_for(side: Side) -> Self {
        match side {
            Side::P1 => MatchOutcome::P1Wins,
            Side::P2 => MatchOutcome::P2Wins,
        }
    }

    /// Winning side, if any.
    pub fn winner(self) -> Option<Side> {
        match self {
            MatchOutcome::P1Wins => Some(Side::P1),
            MatchOutcome::P2Wins => Some(Side::P2),
            _ => None,
        }
    }

    /// Has the match ended?
    #[inline]
    pub fn is_over(self) -> bool {
        self != MatchOutcome::InProgress
    }
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Attack table shared by both characters
    pub moveset: Arc<Moveset>,

    /// Characters picked for P1 and P2
    pub fighters: [CharacterId; 2],

    /// Stage bounds
    pub stage: Stage,

    /// Frames simulated so far
    pub frame: u32,

    /// Round timer, `None` for untimed matches
    pub timer_frames_remaining: Option<u32>,

    /// Timer value a reset returns to
    pub timer_frames_initial: Option<u32>,

    /// Current outcome
    pub outcome: MatchOutcome,

    /// Characters indexed by `Side`
    pub characters: [Character; 2],

    /// Projectiles in flight, in launch order
    pub projectiles: Vec<Projectile>,

    /// Events generated this frame (cleared each frame)
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match with both characters at their spawn points.
    pub fn new(moveset: Arc<Moveset>, config: &MatchConfig) -> Self {
        let stage = config.stage;
        let fighters = config.fighters;
        Self {
            moveset,
            fighters,
            stage,
            frame: 0,
            timer_frames_remaining: config.timer_frames,
            timer_frames_initial: config.timer_frames,
            outcome: MatchOutcome::InProgress,
            characters: spawn(&stage, fighters),
            projectiles: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Return to the start-of-match state. No attack, hitstun or
    /// invincibility survives.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.timer_frames_remaining = self.timer_frames_initial;
        self.outcome = MatchOutcome::InProgress;
        self.characters = spawn(&self.stage, self.fighters);
        self.projectiles.clear();
        self.pending_events.clear();
    }

    /// Character on `side`.
    #[inline]
    pub fn character(&self, side: Side) -> &Character {
        &self.characters[side.index()]
    }

    /// Character on `side`, mutably.
    #[inline]
    pub fn character_mut(&mut self, side: Side) -> &mut Character {
        &mut self.characters[side.index()]
    }

    /// Check if match has ended.
    pub fn is_ended(&self) -> bool {
        self.outcome.is_over()
    }

    /// Verify HP and meter ranges on both characters.
    pub fn check_invariants(&self) -> Result<(), SimError> {
        for side in Side::ALL {
            let ch = self.character(side);
            if ch.hp > MAX_HP {
                return Err(SimError::HpOutOfRange { side, hp: ch.hp });
            }
            if ch.ultimate_meter < 0 || ch.ultimate_meter > METER_MAX {
                return Err(SimError::MeterOutOfRange { side, meter: ch.ultimate_meter });
            }
        }
        Ok(())
    }

    /// Compute hash of current state for determinism checks.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame, |hasher| {
            hasher.update_opt_u32(self.timer_frames_remaining);
            hasher.update_u8(self.outcome as u8);
            for ch in &self.characters {
                ch.hash_into(hasher);
            }
            hasher.update_u32(self.projectiles.len() as u32);
            for projectile in &self.projectiles {
                projectile.hash_into(hasher);
            }
        })
    }

    /// Read-only view for the renderer.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            frame: self.frame,
            timer_frames_remaining: self.timer_frames_remaining,
            outcome: self.outcome,
            characters: [
                CharacterSnapshot::from(&self.characters[0]),
                CharacterSnapshot::from(&self.characters[1]),
            ],
            projectiles: self.projectiles.iter().map(ProjectileSnapshot::from).collect(),
        }
    }
}

/// Build both characters standing on the floor at the stage spawn points,
/// facing each other.
fn spawn(stage: &Stage, fighters: [CharacterId; 2]) -> [Character; 2] {
    let place = |side: Side, facing: Facing| {
        let id = fighters[side.index()];
        let stats = id.stats();
        let x = stage.spawn_center_x[side.index()] - (stats.width >> 1);
        let y = stage.ground_y - stats.height;
        Character::new(id, FixedVec2::new(x, y), facing)
    };
    [place(Side::P1, Facing::Right), place(Side::P2, Facing::Left)]
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// What the renderer needs to draw one character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    /// Character
    pub id: CharacterId,
    /// Top-left of the body box, in pixels
    pub position: (f32, f32),
    /// Facing
    pub facing: Facing,
    /// Action state
    pub state: ActionState,
    /// Frames in the action state (for animation frame selection)
    pub state_timer: u32,
    /// HP
    pub hp: u32,
    /// Ultimate meter, `0.0..=100.0`
    pub ultimate_meter: f32,
    /// Invincible this frame
    pub invincible: bool,
}

impl From<&Character> for CharacterSnapshot {
    fn from(ch: &Character) -> Self {
        Self {
            id: ch.id,
            position: ch.position.to_floats(),
            facing: ch.facing,
            state: ch.state,
            state_timer: ch.state_timer,
            hp: ch.hp,
            ultimate_meter: to_float(ch.ultimate_meter),
            invincible: ch.invincible,
        }
    }
}

/// Per-frame read-only view of the match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Frame number
    pub frame: u32,
    /// Round timer
    pub timer_frames_remaining: Option<u32>,
    /// Outcome
    pub outcome: MatchOutcome,
    /// P1 and P2
    pub characters: [CharacterSnapshot; 2],
    /// Projectiles in flight
    pub projectiles: Vec<ProjectileSnapshot>,
}

impl MatchSnapshot {
    /// Seconds left on the clock, rounded up.
    pub fn timer_seconds(&self) -> Option<u32> {
        self.timer_frames_remaining
            .map(|f| f.div_ceil(FRAME_RATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::game::moveset::AttackKind;

    fn new_state() -> MatchState {
        let moveset = Arc::new(Moveset::builtin().unwrap());
        MatchState::new(moveset, &MatchConfig::default())
    }

    #[test]
    fn test_spawn_positions() {
        let state = new_state();
        let p1 = state.character(Side::P1);
        let p2 = state.character(Side::P2);

        assert_eq!(p1.id, CharacterId::Mario);
        assert_eq!(p2.id, CharacterId::Bowser);
        assert_eq!(p1.center_x(), from_int(450));
        assert_eq!(p2.center_x(), from_int(850));
        assert_eq!(p1.facing, Facing::Right);
        assert_eq!(p2.facing, Facing::Left);
        assert_eq!(p1.body_box().bottom(), state.stage.ground_y);
        assert_eq!(p2.body_box().bottom(), state.stage.ground_y);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut state = new_state();
        let fresh = state.compute_hash();

        state.frame = 300;
        state.outcome = MatchOutcome::P2Wins;
        state.timer_frames_remaining = Some(1);
        let fireball = *state.moveset.attack(CharacterId::Mario, AttackKind::Special);
        let projectile = Projectile::launch(Side::P1, state.character(Side::P1), fireball);
        state.projectiles.push(projectile);
        assert_ne!(state.compute_hash(), fresh);
        let p1 = state.character_mut(Side::P1);
        p1.hp = 12;
        p1.hitstun_frames_remaining = 9;
        p1.invincible = true;

        state.reset();
        assert_eq!(state.compute_hash(), fresh);
        assert!(!state.is_ended());
        assert_eq!(state.character(Side::P1).hitstun_frames_remaining, 0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_invariants() {
        let mut state = new_state();
        assert!(state.check_invariants().is_ok());

        state.character_mut(Side::P2).hp = MAX_HP + 1;
        assert_eq!(
            state.check_invariants(),
            Err(SimError::HpOutOfRange { side: Side::P2, hp: MAX_HP + 1 })
        );

        state.character_mut(Side::P2).hp = 50;
        state.character_mut(Side::P1).ultimate_meter = -1;
        assert!(matches!(
            state.check_invariants(),
            Err(SimError::MeterOutOfRange { side: Side::P1, .. })
        ));
    }

    #[test]
    fn test_snapshot() {
        let mut state = new_state();
        state.character_mut(Side::P1).ultimate_meter = from_int(25);
        let snap = state.snapshot();
        assert_eq!(snap.characters[0].ultimate_meter, 25.0);
        assert_eq!(snap.characters[1].hp, MAX_HP);
        assert_eq!(snap.outcome, MatchOutcome::InProgress);
        assert_eq!(snap.timer_seconds(), Some(99));

        let json = serde_json::to_string(&snap).unwrap();
        let back: MatchSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::P1.opponent(), Side::P2);
        assert_eq!(Side::P2.index(), 1);
        assert_eq!(MatchOutcome::win_for(Side::P2).winner(), Some(Side::P2));
        assert_eq!(MatchOutcome::Draw.winner(), None);
    }
}
