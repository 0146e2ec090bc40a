//! Fighters
//!
//! The per-character record every resolver reads and writes, plus the
//! static stat table keyed by [`CharacterId`].

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, MAX_HP, METER_MAX, fixed_clamp, from_int};
use crate::core::hash::StateHasher;
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::game::action::ActionState;
use crate::game::moveset::AttackDefinition;

// =============================================================================
// CHARACTER ID
// =============================================================================

/// Playable character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CharacterId {
    /// Small, fast, high jump
    Mario = 0,
    /// Large, slow, heavy hitter
    Bowser = 1,
}

impl CharacterId {
    /// All characters, in table order.
    pub const ALL: [CharacterId; 2] = [CharacterId::Mario, CharacterId::Bowser];

    /// Row in per-character tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static stats for this character.
    #[inline]
    pub fn stats(self) -> &'static CharacterStats {
        &CHARACTER_STATS[self.index()]
    }
}

/// Per-character movement and body constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterStats {
    /// Body box width
    pub width: Fixed,
    /// Body box height (standing)
    pub height: Fixed,
    /// Horizontal speed while walking (per frame)
    pub walk_speed: Fixed,
    /// Horizontal speed while running (per frame)
    pub run_speed: Fixed,
    /// Initial vertical velocity of a jump (negative is up)
    pub jump_velocity: Fixed,
}

/// Stat table indexed by `CharacterId`.
pub const CHARACTER_STATS: [CharacterStats; 2] = [
    // Mario
    CharacterStats {
        width: from_int(64),
        height: from_int(64),
        walk_speed: 196608,      // 3.0
        run_speed: 327680,       // 5.0
        jump_velocity: -786432,  // -12.0
    },
    // Bowser
    CharacterStats {
        width: from_int(96),
        height: from_int(112),
        walk_speed: 163840,      // 2.5
        run_speed: 262144,       // 4.0
        jump_velocity: -589824,  // -9.0
    },
];

// =============================================================================
// FACING
// =============================================================================

/// Horizontal facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    /// Towards -x
    Left = 0,
    /// Towards +x
    Right = 1,
}

impl Facing {
    /// -1 for left, +1 for right.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    /// Facing that points from `from_x` towards `to_x`, or `None` when equal.
    #[inline]
    pub fn towards(from_x: Fixed, to_x: Fixed) -> Option<Facing> {
        match to_x.cmp(&from_x) {
            std::cmp::Ordering::Greater => Some(Facing::Right),
            std::cmp::Ordering::Less => Some(Facing::Left),
            std::cmp::Ordering::Equal => None,
        }
    }
}

// =============================================================================
// ACTIVE ATTACK
// =============================================================================

/// Phase of an attack at a given state timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackPhase {
    /// Before the hitbox comes out
    Startup,
    /// Hitbox live
    Active,
    /// After the hitbox, still committed
    Recovery,
}

/// The attack a character is currently performing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveAttack {
    /// Definition copied from the moveset at activation
    pub definition: AttackDefinition,
    /// Set once this swing has connected; one hit per swing
    pub has_landed: bool,
}

impl ActiveAttack {
    /// Start a fresh swing.
    pub fn new(definition: AttackDefinition) -> Self {
        Self { definition, has_landed: false }
    }

    /// Phase at `state_timer` frames since activation.
    pub fn phase(&self, state_timer: u32) -> AttackPhase {
        let def = &self.definition;
        if state_timer < def.startup_frames {
            AttackPhase::Startup
        } else if state_timer < def.startup_frames + def.active_frames {
            AttackPhase::Active
        } else {
            AttackPhase::Recovery
        }
    }
}

// =============================================================================
// CHARACTER
// =============================================================================

/// A fighter on the stage.
///
/// `position` is the top-left corner of the body box in screen space
/// (+y is down).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Which fighter this is
    pub id: CharacterId,
    /// Top-left of the body box
    pub position: FixedVec2,
    /// Per-frame velocity
    pub velocity: FixedVec2,
    /// Direction the character faces
    pub facing: Facing,
    /// Touching the ground this frame
    pub grounded: bool,
    /// Hit points, `0..=MAX_HP`
    pub hp: u32,
    /// Ultimate meter, `0..=METER_MAX`
    pub ultimate_meter: Fixed,
    /// Current action state
    pub state: ActionState,
    /// Frames spent in `state`
    pub state_timer: u32,
    /// Fixed duration of `state`, if it has one
    pub state_duration: Option<u32>,
    /// Remaining hitstun; non-zero forces HURT
    pub hitstun_frames_remaining: u32,
    /// Remaining blockstun; non-zero locks BLOCK
    pub blockstun_frames_remaining: u32,
    /// Immune to incoming hits
    pub invincible: bool,
    /// Frames until `invincible` clears (0 with `invincible` set means permanent)
    pub invincible_frames_remaining: u32,
    /// Attack in progress
    pub active_attack: Option<ActiveAttack>,
}

impl Character {
    /// Create a standing character with full HP and an empty meter.
    pub fn new(id: CharacterId, position: FixedVec2, facing: Facing) -> Self {
        Self {
            id,
            position,
            velocity: FixedVec2::ZERO,
            facing,
            grounded: true,
            hp: MAX_HP,
            ultimate_meter: 0,
            state: ActionState::Idle,
            state_timer: 0,
            state_duration: None,
            hitstun_frames_remaining: 0,
            blockstun_frames_remaining: 0,
            invincible: false,
            invincible_frames_remaining: 0,
            active_attack: None,
        }
    }

    /// Static stats.
    #[inline]
    pub fn stats(&self) -> &'static CharacterStats {
        self.id.stats()
    }

    /// Full body box in world space.
    pub fn body_box(&self) -> FixedRect {
        let stats = self.stats();
        FixedRect::new(self.position.x, self.position.y, stats.width, stats.height)
    }

    /// Horizontal centre of the body.
    #[inline]
    pub fn center_x(&self) -> Fixed {
        self.body_box().center_x()
    }

    /// Enter `state`, resetting the state timer.
    pub fn set_state(&mut self, state: ActionState, duration: Option<u32>) {
        self.state = state;
        self.state_timer = 0;
        self.state_duration = duration;
    }

    /// Add (or with a negative amount, spend) meter, clamped to `[0, METER_MAX]`.
    pub fn add_meter(&mut self, amount: Fixed) {
        self.ultimate_meter = fixed_clamp(
            self.ultimate_meter.saturating_add(amount),
            0,
            METER_MAX,
        );
    }

    /// Meter is full.
    #[inline]
    pub fn meter_full(&self) -> bool {
        self.ultimate_meter >= METER_MAX
    }

    /// Knocked out.
    #[inline]
    pub fn is_ko(&self) -> bool {
        self.state == ActionState::Ko
    }

    /// Is the current attack in its active window?
    pub fn attack_active(&self) -> bool {
        self.state.is_attack()
            && self
                .active_attack
                .map(|a| a.phase(self.state_timer) == AttackPhase::Active)
                .unwrap_or(false)
    }

    /// Feed every field into a state hasher in a fixed order.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.id as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_u8(self.facing as u8);
        hasher.update_bool(self.grounded);
        hasher.update_u32(self.hp);
        hasher.update_fixed(self.ultimate_meter);
        hasher.update_u8(self.state as u8);
        hasher.update_u32(self.state_timer);
        hasher.update_opt_u32(self.state_duration);
        hasher.update_u32(self.hitstun_frames_remaining);
        hasher.update_u32(self.blockstun_frames_remaining);
        hasher.update_bool(self.invincible);
        hasher.update_u32(self.invincible_frames_remaining);
        match &self.active_attack {
            Some(attack) => {
                hasher.update_u8(1);
                hasher.update_u8(attack.definition.kind as u8);
                hasher.update_bool(attack.has_landed);
            }
            None => hasher.update_u8(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{to_fixed, FIXED_ONE};
    use crate::game::moveset::AttackKind;

    fn sample_attack() -> AttackDefinition {
        AttackDefinition {
            kind: AttackKind::Light,
            startup_frames: 3,
            active_frames: 2,
            recovery_frames: 4,
            hitbox: FixedRect::from_ints(0, 0, 10, 10),
            damage: 5,
            knockback: FixedVec2::ZERO,
            hitstun_frames: 10,
            meter_cost: 0,
            meter_gain_attacker: 0,
            meter_gain_defender: 0,
            invincible_frames: 0,
            omnidirectional: false,
            guard_break: false,
            projectile_speed: 0,
        }
    }

    #[test]
    fn test_new_character_defaults() {
        let c = Character::new(CharacterId::Mario, FixedVec2::ZERO, Facing::Right);
        assert_eq!(c.hp, MAX_HP);
        assert_eq!(c.ultimate_meter, 0);
        assert_eq!(c.state, ActionState::Idle);
        assert!(c.grounded);
        assert!(!c.invincible);
    }

    #[test]
    fn test_body_box_uses_stats() {
        let c = Character::new(CharacterId::Bowser, FixedVec2::from_ints(10, 20), Facing::Left);
        let body = c.body_box();
        assert_eq!(body, FixedRect::from_ints(10, 20, 96, 112));
        assert_eq!(c.center_x(), from_int(58));
    }

    #[test]
    fn test_stats_constants() {
        assert_eq!(CharacterId::Mario.stats().walk_speed, to_fixed(3.0));
        assert_eq!(CharacterId::Mario.stats().jump_velocity, to_fixed(-12.0));
        assert_eq!(CharacterId::Bowser.stats().walk_speed, to_fixed(2.5));
        assert_eq!(CharacterId::Bowser.stats().jump_velocity, to_fixed(-9.0));
    }

    #[test]
    fn test_meter_clamped() {
        let mut c = Character::new(CharacterId::Mario, FixedVec2::ZERO, Facing::Right);
        c.add_meter(METER_MAX + FIXED_ONE * 50);
        assert_eq!(c.ultimate_meter, METER_MAX);
        assert!(c.meter_full());
        c.add_meter(-(METER_MAX * 2));
        assert_eq!(c.ultimate_meter, 0);
    }

    #[test]
    fn test_facing_towards() {
        assert_eq!(Facing::towards(0, 10), Some(Facing::Right));
        assert_eq!(Facing::towards(10, 0), Some(Facing::Left));
        assert_eq!(Facing::towards(5, 5), None);
        assert_eq!(Facing::Left.sign(), -1);
    }

    #[test]
    fn test_attack_phases() {
        let attack = ActiveAttack::new(sample_attack());
        assert_eq!(attack.phase(0), AttackPhase::Startup);
        assert_eq!(attack.phase(2), AttackPhase::Startup);
        assert_eq!(attack.phase(3), AttackPhase::Active);
        assert_eq!(attack.phase(4), AttackPhase::Active);
        assert_eq!(attack.phase(5), AttackPhase::Recovery);
        assert_eq!(attack.phase(8), AttackPhase::Recovery);
    }

    #[test]
    fn test_set_state_resets_timer() {
        let mut c = Character::new(CharacterId::Mario, FixedVec2::ZERO, Facing::Right);
        c.state_timer = 17;
        c.set_state(ActionState::AttackLight, Some(9));
        assert_eq!(c.state_timer, 0);
        assert_eq!(c.state_duration, Some(9));
    }

    #[test]
    fn test_attack_active_window() {
        let mut c = Character::new(CharacterId::Mario, FixedVec2::ZERO, Facing::Right);
        c.set_state(ActionState::AttackLight, Some(9));
        c.active_attack = Some(ActiveAttack::new(sample_attack()));
        assert!(!c.attack_active());
        c.state_timer = 3;
        assert!(c.attack_active());
        c.state_timer = 5;
        assert!(!c.attack_active());
    }

    #[test]
    fn test_hash_changes_with_hp() {
        let a = Character::new(CharacterId::Mario, FixedVec2::ZERO, Facing::Right);
        let mut b = a.clone();
        b.hp -= 1;

        let mut ha = StateHasher::new(b"t");
        let mut hb = StateHasher::new(b"t");
        a.hash_into(&mut ha);
        b.hash_into(&mut hb);
        assert_ne!(ha.finalize(), hb.finalize());
    }
}
