//! Combat Resolution
//!
//! Applies the effects of a confirmed contact: damage, hitstun, knockback,
//! meter, and KO. Blocking and counter hits are resolved here too. Melee
//! swings and projectiles share the same rules; they differ only in which
//! direction the hit comes from.

use tracing::debug;

use crate::core::fixed::{BLOCK_PUSHBACK, BLOCKSTUN_FRAMES};
use crate::core::vec2::FixedVec2;
use crate::game::action::{self, ActionState};
use crate::game::character::{AttackPhase, Character, Facing};
use crate::game::events::GameEvent;
use crate::game::hitbox::{self, Contact};
use crate::game::moveset::AttackDefinition;
use crate::game::projectile::Projectile;
use crate::game::state::Side;

/// What a contact did to the defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Defender was invincible; nothing changed
    Ignored,
    /// Defender blocked; only pushback and blockstun
    Blocked,
    /// Damage applied
    Hit {
        /// HP removed (after the counter-hit multiplier)
        damage: u32,
        /// Defender was interrupted during a special's startup
        counter: bool,
        /// Defender's HP reached zero
        ko: bool,
    },
}

/// Is the defender guarding against this attacker?
#[inline]
pub fn is_blocking(defender: &Character, attacker: &Character) -> bool {
    defender.state == ActionState::Block && hitbox::faces(defender, attacker)
}

/// Would hitting the defender now be a counter hit?
#[inline]
pub fn is_counter_hit(defender: &Character) -> bool {
    defender.state == ActionState::AttackSpecial
        && defender
            .active_attack
            .map(|a| a.phase(defender.state_timer) == AttackPhase::Startup)
            .unwrap_or(false)
}

/// Apply one melee attack to a defender.
///
/// Order is fixed: HP, hitstun, knockback, meter, then KO.
pub fn apply_hit(
    attacker: &mut Character,
    defender: &mut Character,
    def: &AttackDefinition,
) -> HitOutcome {
    let blocking = is_blocking(defender, attacker);
    land(attacker, defender, def, attacker.facing, blocking)
}

/// Apply a projectile to a defender on behalf of its owner.
///
/// Blocking and knockback follow the projectile's direction of travel, not
/// the owner's current facing.
pub fn apply_projectile_hit(
    owner: &mut Character,
    defender: &mut Character,
    projectile: &Projectile,
) -> HitOutcome {
    let blocking = defender.state == ActionState::Block && defender.facing != projectile.direction;
    land(owner, defender, &projectile.definition, projectile.direction, blocking)
}

fn land(
    attacker: &mut Character,
    defender: &mut Character,
    def: &AttackDefinition,
    direction: Facing,
    blocking: bool,
) -> HitOutcome {
    // Re-checked here even though detection already filters it.
    if defender.invincible {
        return HitOutcome::Ignored;
    }

    if !def.guard_break && blocking {
        defender.blockstun_frames_remaining = BLOCKSTUN_FRAMES;
        defender.velocity = defender
            .velocity
            .add(FixedVec2::new(BLOCK_PUSHBACK, 0).mirror_x(direction.sign()));
        return HitOutcome::Blocked;
    }

    let counter = is_counter_hit(defender);
    let multiplier = if counter { 2 } else { 1 };
    let damage = def.damage.saturating_mul(multiplier);

    // 1. HP, floored at zero
    defender.hp = defender.hp.saturating_sub(damage);

    // 2. Hitstun
    defender.hitstun_frames_remaining = def.hitstun_frames.saturating_mul(multiplier);
    defender.blockstun_frames_remaining = 0;

    // 3. Knockback impulse, mirrored by the direction of the hit
    defender.velocity = defender.velocity.add(def.knockback.mirror_x(direction.sign()));

    // 4. Meter
    defender.add_meter(def.meter_gain_defender);
    attacker.add_meter(def.meter_gain_attacker);

    if counter {
        defender.active_attack = None;
    }

    // 5. KO bypasses the state machine
    let ko = defender.hp == 0;
    if ko {
        action::enter_ko(defender);
    }

    HitOutcome::Hit { damage, counter, ko }
}

/// Split the pair into (attacker, defender).
fn pair_mut(characters: &mut [Character; 2], attacker: Side) -> (&mut Character, &mut Character) {
    let [p1, p2] = characters;
    match attacker {
        Side::P1 => (p1, p2),
        Side::P2 => (p2, p1),
    }
}

/// Apply every contact detected this frame, in detection order.
pub fn resolve_contacts(
    characters: &mut [Character; 2],
    contacts: &[Contact],
    frame: u32,
    events: &mut Vec<GameEvent>,
) {
    for contact in contacts {
        let def = contact.definition;
        let (attacker, defender) = pair_mut(characters, contact.attacker);
        let outcome = apply_hit(attacker, defender, &def);
        report(outcome, contact.attacker, &def, defender.hp, frame, events);
    }
}

/// Hit a projectile's target. Returns what happened so the caller can
/// decide whether the projectile is spent.
pub fn resolve_projectile(
    characters: &mut [Character; 2],
    projectile: &Projectile,
    frame: u32,
    events: &mut Vec<GameEvent>,
) -> HitOutcome {
    let (owner, defender) = pair_mut(characters, projectile.owner);
    let outcome = apply_projectile_hit(owner, defender, projectile);
    report(outcome, projectile.owner, &projectile.definition, defender.hp, frame, events);
    outcome
}

/// Log an outcome and queue its events.
fn report(
    outcome: HitOutcome,
    attacker: Side,
    def: &AttackDefinition,
    defender_hp: u32,
    frame: u32,
    events: &mut Vec<GameEvent>,
) {
    match outcome {
        HitOutcome::Ignored => {}
        HitOutcome::Blocked => {
            debug!(?attacker, kind = ?def.kind, "hit blocked");
            events.push(GameEvent::hit_blocked(frame, attacker, def.kind));
        }
        HitOutcome::Hit { damage, counter, ko } => {
            debug!(?attacker, kind = ?def.kind, damage, counter, defender_hp, "hit");
            events.push(GameEvent::hit_connected(frame, attacker, def.kind, damage, counter, defender_hp));
            if ko {
                events.push(GameEvent::knocked_out(frame, attacker.opponent()));
            }
        }
    }
}
