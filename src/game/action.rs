//! Action State Machine
//!
//! Decides, once per frame and before physics, which action a character is
//! in. Transitions are checked in priority order:
//!
//! 1. HP at zero forces KO (terminal).
//! 2. Hitstun forces HURT; input is ignored until it runs out. The frame
//!    it runs out is actionable.
//! 3. Blockstun keeps the character in BLOCK.
//! 4. A running attack plays out its full duration.
//! 5. Landing recovery plays out.
//! 6. An attack command is accepted from a neutral or jumping state.
//! 7. Otherwise movement input picks the locomotion state.
//!
//! Horizontal velocity is not set here; physics reads the same input and
//! the state chosen here.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::Fixed;
use crate::game::character::{ActiveAttack, Character, Facing};
use crate::game::events::GameEvent;
use crate::game::input::{Command, InputFrame};
use crate::game::moveset::{AttackKind, Moveset};
use crate::game::state::Side;

// =============================================================================
// ACTION STATE
// =============================================================================

/// What a character is doing this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionState {
    /// Standing still
    Idle = 0,
    /// Walking
    Walk = 1,
    /// Running
    Run = 2,
    /// Crouching; smaller hurtbox
    Crouch = 3,
    /// Holding block
    Block = 4,
    /// Rising
    JumpUp = 5,
    /// Falling
    JumpFall = 6,
    /// Landing recovery
    Land = 7,
    /// Light attack
    AttackLight = 8,
    /// Heavy attack
    AttackHeavy = 9,
    /// Special attack
    AttackSpecial = 10,
    /// Air attack
    AttackAir = 11,
    /// Ultimate attack
    AttackUltimate = 12,
    /// Hitstun
    Hurt = 13,
    /// Knocked out (terminal)
    Ko = 14,
    /// Won the match (terminal)
    Win = 15,
}

impl ActionState {
    /// Any ATTACK_* state.
    #[inline]
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            ActionState::AttackLight
                | ActionState::AttackHeavy
                | ActionState::AttackSpecial
                | ActionState::AttackAir
                | ActionState::AttackUltimate
        )
    }

    /// KO or WIN; no further transitions.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Ko | ActionState::Win)
    }

    /// States from which an attack command is accepted.
    #[inline]
    pub fn accepts_attack(self) -> bool {
        matches!(
            self,
            ActionState::Idle
                | ActionState::Walk
                | ActionState::Run
                | ActionState::Crouch
                | ActionState::JumpUp
                | ActionState::JumpFall
        )
    }

    /// States in which horizontal input drives velocity.
    #[inline]
    pub fn permits_movement(self) -> bool {
        matches!(
            self,
            ActionState::Idle
                | ActionState::Walk
                | ActionState::Run
                | ActionState::JumpUp
                | ActionState::JumpFall
        )
    }

    /// Grounded actionable states in which the character turns to face the
    /// opponent.
    #[inline]
    pub fn auto_faces(self) -> bool {
        matches!(
            self,
            ActionState::Idle
                | ActionState::Walk
                | ActionState::Run
                | ActionState::Crouch
                | ActionState::Block
        )
    }
}

// =============================================================================
// TRANSITIONS
// =============================================================================

/// Per-frame context for one character's state machine step.
pub struct StepContext<'a> {
    /// Which side is stepping
    pub side: Side,
    /// This character's input
    pub input: &'a InputFrame,
    /// Attack table
    pub moveset: &'a Moveset,
    /// Opponent body centre, as of the start of the frame
    pub opponent_center_x: Fixed,
    /// Current frame number
    pub frame: u32,
    /// Length of landing recovery
    pub land_frames: u32,
}

/// Advance one character's action state by one frame.
pub fn step(ch: &mut Character, ctx: &StepContext<'_>, events: &mut Vec<GameEvent>) {
    if ch.state.is_terminal() {
        ch.state_timer = ch.state_timer.saturating_add(1);
        return;
    }

    // 1. HP floor
    if ch.hp == 0 {
        enter_ko(ch);
        events.push(GameEvent::knocked_out(ctx.frame, ctx.side));
        return;
    }

    ch.state_timer = ch.state_timer.saturating_add(1);
    tick_invincibility(ch);

    // 2. Hitstun
    if ch.hitstun_frames_remaining > 0 {
        if ch.state != ActionState::Hurt {
            if let Some(attack) = ch.active_attack.take() {
                debug!(side = ?ctx.side, kind = ?attack.definition.kind, "attack interrupted");
            }
            ch.set_state(ActionState::Hurt, None);
        }
        ch.hitstun_frames_remaining -= 1;
        if ch.hitstun_frames_remaining > 0 {
            return;
        }
        ch.set_state(airborne_or_idle(ch), None);
    }

    // 3. Blockstun
    if ch.blockstun_frames_remaining > 0 {
        ch.blockstun_frames_remaining -= 1;
        return;
    }

    // 4. Attack in progress
    if ch.state.is_attack() {
        let elapsed = ch.state_duration.map_or(true, |d| ch.state_timer >= d);
        if elapsed {
            ch.active_attack = None;
            ch.set_state(airborne_or_idle(ch), None);
        }
        return;
    }

    // 5. Landing recovery
    if ch.state == ActionState::Land {
        if ch.state_timer < ctx.land_frames {
            return;
        }
        ch.set_state(ActionState::Idle, None);
    }

    if ch.grounded && ch.state.auto_faces() {
        face_opponent(ch, ctx.opponent_center_x);
    }

    // 6. Attacks
    if ch.state.accepts_attack() {
        if let Some(kind) = select_attack(ch, ctx.input, ctx.moveset) {
            start_attack(ch, kind, ctx, events);
            return;
        }
    }

    // 7. Locomotion
    locomotion(ch, ctx, events);
}

/// Force KO. Clears any attack and grants permanent invincibility so a
/// downed character takes no further hits.
pub fn enter_ko(ch: &mut Character) {
    ch.active_attack = None;
    ch.hitstun_frames_remaining = 0;
    ch.blockstun_frames_remaining = 0;
    ch.invincible = true;
    ch.invincible_frames_remaining = 0;
    ch.set_state(ActionState::Ko, None);
}

/// Mark the winner. A knocked-out character stays KO.
pub fn enter_win(ch: &mut Character) {
    if ch.is_ko() {
        return;
    }
    ch.active_attack = None;
    ch.hitstun_frames_remaining = 0;
    ch.blockstun_frames_remaining = 0;
    ch.set_state(ActionState::Win, None);
}

/// Called by physics on ground contact. Only a plain fall enters landing
/// recovery; attacks and hitstun keep running on the ground.
pub fn on_landed(ch: &mut Character) {
    if ch.state == ActionState::JumpFall {
        ch.set_state(ActionState::Land, None);
    }
}

fn airborne_or_idle(ch: &Character) -> ActionState {
    if ch.grounded {
        ActionState::Idle
    } else {
        ActionState::JumpFall
    }
}

fn tick_invincibility(ch: &mut Character) {
    if ch.invincible_frames_remaining > 0 {
        ch.invincible_frames_remaining -= 1;
        if ch.invincible_frames_remaining == 0 {
            ch.invincible = false;
        }
    }
}

fn face_opponent(ch: &mut Character, opponent_center_x: Fixed) {
    if let Some(facing) = Facing::towards(ch.center_x(), opponent_center_x) {
        ch.facing = facing;
    }
}

/// Pick the highest-priority attack the character can perform.
///
/// ULTIMATE > SPECIAL > HEAVY > LIGHT; a command the meter cannot pay for
/// falls through to the next one pressed. Airborne, light and heavy become
/// AIR and meter attacks are unavailable.
fn select_attack(ch: &Character, input: &InputFrame, moveset: &Moveset) -> Option<AttackKind> {
    let affordable = |kind: AttackKind| ch.ultimate_meter >= moveset.attack(ch.id, kind).meter_cost;

    if !ch.grounded {
        let pressed = input.is_pressed(Command::Light) || input.is_pressed(Command::Heavy);
        return (pressed && affordable(AttackKind::Air)).then_some(AttackKind::Air);
    }

    if input.is_pressed(Command::Ultimate) && ch.meter_full() {
        return Some(AttackKind::Ultimate);
    }
    [
        (Command::Special, AttackKind::Special),
        (Command::Heavy, AttackKind::Heavy),
        (Command::Light, AttackKind::Light),
    ]
    .into_iter()
    .find(|&(command, kind)| input.is_pressed(command) && affordable(kind))
    .map(|(_, kind)| kind)
}

fn start_attack(ch: &mut Character, kind: AttackKind, ctx: &StepContext<'_>, events: &mut Vec<GameEvent>) {
    let def = *ctx.moveset.attack(ch.id, kind);

    match kind {
        AttackKind::Ultimate => {
            ch.ultimate_meter = 0;
            events.push(GameEvent::ultimate_activated(ctx.frame, ctx.side));
        }
        _ => ch.add_meter(-def.meter_cost),
    }

    if def.invincible_frames > 0 {
        ch.invincible = true;
        ch.invincible_frames_remaining = def.invincible_frames;
    }

    ch.active_attack = Some(ActiveAttack::new(def));
    ch.set_state(kind.action_state(), Some(def.total_frames()));
    debug!(side = ?ctx.side, ?kind, frames = def.total_frames(), "attack started");
}

fn locomotion(ch: &mut Character, ctx: &StepContext<'_>, events: &mut Vec<GameEvent>) {
    let input = ctx.input;

    let next = if ch.grounded {
        if input.is_pressed(Command::Jump) && ch.velocity.y == 0 {
            ch.velocity.y = ch.stats().jump_velocity;
            ch.grounded = false;
            events.push(GameEvent::jumped(ctx.frame, ctx.side));
            ActionState::JumpUp
        } else if input.is_held(Command::Block) {
            ActionState::Block
        } else if input.is_held(Command::Crouch) {
            ActionState::Crouch
        } else if input.horizontal() != 0 {
            if input.running() {
                ActionState::Run
            } else {
                ActionState::Walk
            }
        } else {
            ActionState::Idle
        }
    } else if ch.velocity.y > 0 {
        ActionState::JumpFall
    } else {
        ActionState::JumpUp
    };

    if next != ch.state {
        ch.set_state(next, None);
    }
}
