//! Hitbox Resolution
//!
//! Deterministic hitbox vs hurtbox detection. Both directions are tested
//! against the same post-movement positions before any effect is applied,
//! so neither side gets an advantage from update order.

use crate::core::fixed::{CROUCH_HURTBOX_MARGIN, fixed_max};
use crate::core::rect::FixedRect;
use crate::game::action::ActionState;
use crate::game::character::{Character, Facing};
use crate::game::moveset::AttackDefinition;
use crate::game::state::Side;

/// World-space hitbox of an attack.
///
/// Offsets are authored right-facing; a left-facing attacker mirrors them
/// about its own body box.
pub fn world_hitbox(attacker: &Character, def: &AttackDefinition) -> FixedRect {
    let width = attacker.stats().width;
    let offset = def.hitbox;
    let x = match attacker.facing {
        Facing::Right => attacker.position.x + offset.x,
        Facing::Left => attacker.position.x + width - offset.x - offset.w,
    };
    FixedRect::new(x, attacker.position.y + offset.y, offset.w, offset.h)
}

/// World-space hurtbox of a character.
///
/// The body box, lowered at the top while crouching.
pub fn hurtbox(ch: &Character) -> FixedRect {
    let body = ch.body_box();
    if ch.state == ActionState::Crouch {
        let margin = CROUCH_HURTBOX_MARGIN.min(body.h);
        FixedRect::new(body.x, body.y + margin, body.w, fixed_max(body.h - margin, 0))
    } else {
        body
    }
}

/// Is the attacker facing the defender?
///
/// Characters with the same centre count as facing each other.
#[inline]
pub fn faces(attacker: &Character, defender: &Character) -> bool {
    match Facing::towards(attacker.center_x(), defender.center_x()) {
        Some(dir) => dir == attacker.facing,
        None => true,
    }
}

/// Confirmed contact from one side onto the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Side whose hitbox connected
    pub attacker: Side,
    /// Definition of the connecting attack
    pub definition: AttackDefinition,
}

/// Check whether `attacker`'s current swing connects with `defender`.
pub fn check_hit(attacker: &Character, defender: &Character) -> Option<AttackDefinition> {
    let attack = attacker.active_attack?;

    // Projectiles carry the hit instead
    if attack.definition.is_projectile() {
        return None;
    }

    // One hit per swing
    if attack.has_landed {
        return None;
    }

    if !attacker.attack_active() {
        return None;
    }

    // Skip if defender is invincible (ultimate window, KO)
    if defender.invincible {
        return None;
    }

    let def = attack.definition;
    if !def.omnidirectional && !faces(attacker, defender) {
        return None;
    }

    if !world_hitbox(attacker, &def).overlaps(&hurtbox(defender)) {
        return None;
    }

    Some(def)
}

/// Detect all contacts this frame, P1's first, and mark the swings as
/// landed.
pub fn detect_contacts(characters: &mut [Character; 2]) -> Vec<Contact> {
    let mut contacts = Vec::with_capacity(2);

    for side in Side::ALL {
        let attacker = &characters[side.index()];
        let defender = &characters[side.opponent().index()];
        if let Some(definition) = check_hit(attacker, defender) {
            contacts.push(Contact { attacker: side, definition });
        }
    }

    for contact in &contacts {
        if let Some(attack) = characters[contact.attacker.index()].active_attack.as_mut() {
            attack.has_landed = true;
        }
    }

    contacts
}
