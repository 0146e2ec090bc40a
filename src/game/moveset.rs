//! Movesets
//!
//! Attack definitions are static data keyed by (character, kind). They are
//! authored in pixels as JSON, converted to fixed-point once at load time,
//! validated, and never mutated during a match.
//!
//! Hitbox offsets are authored for a right-facing character, relative to the
//! top-left of the body box. The hitbox resolver mirrors them for left-facing
//! characters.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::{Fixed, METER_MAX, to_fixed};
use crate::core::hash::{StateHash, StateHasher};
use crate::core::rect::FixedRect;
use crate::core::vec2::FixedVec2;
use crate::error::{ConfigError, ConfigResult};
use crate::game::action::ActionState;
use crate::game::character::CharacterId;

/// Moveset shipped with the crate.
const BUILTIN_MOVESET_JSON: &str = include_str!("../../data/movesets.json");

/// Fastest projectile a moveset may author, in pixels per frame.
const MAX_PROJECTILE_SPEED: f64 = 64.0;

// =============================================================================
// ATTACK KIND
// =============================================================================

/// Attack slot in a moveset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AttackKind {
    /// Fast, weak grounded attack
    Light = 0,
    /// Slow, strong grounded attack
    Heavy = 1,
    /// Meter-costing grounded attack
    Special = 2,
    /// Any attack started while airborne
    Air = 3,
    /// Full-meter attack
    Ultimate = 4,
}

impl AttackKind {
    /// All kinds, in table order.
    pub const ALL: [AttackKind; 5] = [
        AttackKind::Light,
        AttackKind::Heavy,
        AttackKind::Special,
        AttackKind::Air,
        AttackKind::Ultimate,
    ];

    /// Column in per-kind tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Action state a character enters when performing this attack.
    pub fn action_state(self) -> ActionState {
        match self {
            AttackKind::Light => ActionState::AttackLight,
            AttackKind::Heavy => ActionState::AttackHeavy,
            AttackKind::Special => ActionState::AttackSpecial,
            AttackKind::Air => ActionState::AttackAir,
            AttackKind::Ultimate => ActionState::AttackUltimate,
        }
    }
}

// =============================================================================
// ATTACK DEFINITION
// =============================================================================

/// One attack's frame data and effects, in fixed-point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDefinition {
    /// Slot this definition fills
    pub kind: AttackKind,
    /// Frames before the hitbox is live
    pub startup_frames: u32,
    /// Frames the hitbox is live
    pub active_frames: u32,
    /// Frames after the hitbox, still committed
    pub recovery_frames: u32,
    /// Hitbox offset and size, right-facing, relative to body top-left
    pub hitbox: FixedRect,
    /// HP removed on hit
    pub damage: u32,
    /// Velocity impulse given to the defender, right-facing
    pub knockback: FixedVec2,
    /// Hitstun applied to the defender
    pub hitstun_frames: u32,
    /// Meter spent on activation
    pub meter_cost: Fixed,
    /// Meter the attacker gains on hit
    pub meter_gain_attacker: Fixed,
    /// Meter the defender gains on hit
    pub meter_gain_defender: Fixed,
    /// Frames of invincibility granted on activation
    pub invincible_frames: u32,
    /// Hits regardless of the attacker's facing
    pub omnidirectional: bool,
    /// Ignores blocking
    pub guard_break: bool,
    /// Speed of the projectile fired when startup ends; 0 for melee.
    /// The hitbox then describes the projectile at its spawn point.
    pub projectile_speed: Fixed,
}

impl AttackDefinition {
    /// Startup + active + recovery.
    #[inline]
    pub fn total_frames(&self) -> u32 {
        self.startup_frames + self.active_frames + self.recovery_frames
    }

    /// Fires a projectile instead of swinging a hitbox.
    #[inline]
    pub fn is_projectile(&self) -> bool {
        self.projectile_speed > 0
    }
}

/// Startup + active + recovery, or `None` if the sum does not fit.
fn checked_total(startup: u32, active: u32, recovery: u32) -> Option<u32> {
    startup.checked_add(active)?.checked_add(recovery)
}

// =============================================================================
// AUTHORED FORMAT
// =============================================================================

/// Rectangle as authored, in pixels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PixelRect {
    /// Offset from body left
    pub x: f64,
    /// Offset from body top
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

/// Vector as authored, in pixels per frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PixelVec {
    /// Horizontal component
    pub x: f64,
    /// Vertical component (+ is down)
    pub y: f64,
}

/// One attack entry as it appears in a moveset file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackEntry {
    /// Owning character
    pub character: CharacterId,
    /// Attack slot
    pub kind: AttackKind,
    /// Startup frames
    pub startup: u32,
    /// Active frames
    pub active: u32,
    /// Recovery frames
    pub recovery: u32,
    /// Hitbox, right-facing
    pub hitbox: PixelRect,
    /// Damage
    pub damage: u32,
    /// Knockback, right-facing
    #[serde(default)]
    pub knockback: PixelVec,
    /// Hitstun frames
    pub hitstun: u32,
    /// Meter cost
    #[serde(default)]
    pub meter_cost: u32,
    /// Meter gained by the attacker on hit
    #[serde(default)]
    pub meter_gain_attacker: u32,
    /// Meter gained by the defender on hit
    #[serde(default)]
    pub meter_gain_defender: u32,
    /// Invincibility granted on activation
    #[serde(default)]
    pub invincible_frames: u32,
    /// Hits behind the attacker too
    #[serde(default)]
    pub omnidirectional: bool,
    /// Ignores blocking
    #[serde(default)]
    pub guard_break: bool,
    /// Projectile speed in pixels per frame; omitted for melee
    #[serde(default)]
    pub projectile_speed: f64,
}

/// A moveset file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovesetFile {
    /// Format version
    pub version: u32,
    /// All attack entries
    pub attacks: Vec<AttackEntry>,
}

impl AttackEntry {
    /// Validate and convert to fixed-point.
    pub fn to_definition(&self) -> ConfigResult<AttackDefinition> {
        let invalid = |reason: &str| ConfigError::InvalidAttack {
            character: self.character,
            kind: self.kind,
            reason: reason.to_string(),
        };

        if self.active == 0 {
            return Err(invalid("active window must be at least one frame"));
        }
        if checked_total(self.startup, self.active, self.recovery).is_none() {
            return Err(invalid("startup + active + recovery overflows the frame counter"));
        }
        if !self.projectile_speed.is_finite() || !(0.0..=MAX_PROJECTILE_SPEED).contains(&self.projectile_speed) {
            return Err(invalid("projectile speed must be between 0 and 64 px per frame"));
        }
        let rect = [self.hitbox.x, self.hitbox.y, self.hitbox.w, self.hitbox.h];
        let kb = [self.knockback.x, self.knockback.y];
        if rect.iter().chain(kb.iter()).any(|v| !v.is_finite() || v.abs() > 4096.0) {
            return Err(invalid("hitbox and knockback must be finite pixel values"));
        }
        if self.hitbox.w <= 0.0 || self.hitbox.h <= 0.0 {
            return Err(invalid("hitbox must have positive width and height"));
        }
        let meter_max = (METER_MAX >> 16) as u32;
        if self.meter_cost > meter_max
            || self.meter_gain_attacker > meter_max
            || self.meter_gain_defender > meter_max
        {
            return Err(invalid("meter values must be within the meter range"));
        }

        Ok(AttackDefinition {
            kind: self.kind,
            startup_frames: self.startup,
            active_frames: self.active,
            recovery_frames: self.recovery,
            hitbox: FixedRect::new(
                to_fixed(self.hitbox.x),
                to_fixed(self.hitbox.y),
                to_fixed(self.hitbox.w),
                to_fixed(self.hitbox.h),
            ),
            damage: self.damage,
            knockback: FixedVec2::new(to_fixed(self.knockback.x), to_fixed(self.knockback.y)),
            hitstun_frames: self.hitstun,
            meter_cost: (self.meter_cost as Fixed) << 16,
            meter_gain_attacker: (self.meter_gain_attacker as Fixed) << 16,
            meter_gain_defender: (self.meter_gain_defender as Fixed) << 16,
            invincible_frames: self.invincible_frames,
            omnidirectional: self.omnidirectional,
            guard_break: self.guard_break,
            projectile_speed: to_fixed(self.projectile_speed),
        })
    }
}

// =============================================================================
// MOVESET
// =============================================================================

/// Complete attack table: every character has every kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moveset {
    table: [[AttackDefinition; 5]; 2],
}

impl Moveset {
    /// Build from entries, rejecting duplicates and gaps.
    pub fn from_entries(entries: &[AttackEntry]) -> ConfigResult<Self> {
        let mut slots: [[Option<AttackDefinition>; 5]; 2] = [[None; 5]; 2];

        for entry in entries {
            let slot = &mut slots[entry.character.index()][entry.kind.index()];
            if slot.is_some() {
                return Err(ConfigError::DuplicateAttack {
                    character: entry.character,
                    kind: entry.kind,
                });
            }
            *slot = Some(entry.to_definition()?);
        }

        let mut table = [[PLACEHOLDER; 5]; 2];
        for character in CharacterId::ALL {
            for kind in AttackKind::ALL {
                table[character.index()][kind.index()] = slots[character.index()][kind.index()]
                    .ok_or(ConfigError::MissingAttack { character, kind })?;
            }
        }

        Ok(Self { table })
    }

    /// Parse and validate a moveset document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let file: MovesetFile = serde_json::from_str(json)?;
        let moveset = Self::from_entries(&file.attacks)?;
        debug!(
            version = file.version,
            entries = file.attacks.len(),
            fingerprint = %hex::encode(&moveset.fingerprint()[..8]),
            "moveset loaded"
        );
        Ok(moveset)
    }

    /// Load a moveset file from disk.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The moveset shipped with the crate.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_json_str(BUILTIN_MOVESET_JSON)
    }

    /// Look up an attack.
    #[inline]
    pub fn attack(&self, character: CharacterId, kind: AttackKind) -> &AttackDefinition {
        &self.table[character.index()][kind.index()]
    }

    /// Replace one definition, keeping the table complete.
    pub fn set_attack(&mut self, character: CharacterId, definition: AttackDefinition) -> ConfigResult<()> {
        if definition.active_frames == 0 || definition.hitbox.w <= 0 || definition.hitbox.h <= 0 {
            return Err(ConfigError::InvalidAttack {
                character,
                kind: definition.kind,
                reason: "active window and hitbox must be non-empty".to_string(),
            });
        }
        let total = checked_total(
            definition.startup_frames,
            definition.active_frames,
            definition.recovery_frames,
        );
        if total.is_none() || definition.projectile_speed < 0 {
            return Err(ConfigError::InvalidAttack {
                character,
                kind: definition.kind,
                reason: "frame counts overflow or projectile speed is negative".to_string(),
            });
        }
        self.table[character.index()][definition.kind.index()] = definition;
        Ok(())
    }

    /// Hash of the whole table, for logs and replay headers.
    pub fn fingerprint(&self) -> StateHash {
        let mut hasher = StateHasher::for_moveset();
        for row in &self.table {
            for def in row {
                hasher.update_u8(def.kind as u8);
                hasher.update_u32(def.startup_frames);
                hasher.update_u32(def.active_frames);
                hasher.update_u32(def.recovery_frames);
                hasher.update_fixed(def.hitbox.x);
                hasher.update_fixed(def.hitbox.y);
                hasher.update_fixed(def.hitbox.w);
                hasher.update_fixed(def.hitbox.h);
                hasher.update_u32(def.damage);
                hasher.update_vec2(def.knockback);
                hasher.update_u32(def.hitstun_frames);
                hasher.update_fixed(def.meter_cost);
                hasher.update_fixed(def.meter_gain_attacker);
                hasher.update_fixed(def.meter_gain_defender);
                hasher.update_u32(def.invincible_frames);
                hasher.update_bool(def.omnidirectional);
                hasher.update_bool(def.guard_break);
                hasher.update_fixed(def.projectile_speed);
            }
        }
        hasher.finalize()
    }
}

/// Filler used while assembling a table; always overwritten.
const PLACEHOLDER: AttackDefinition = AttackDefinition {
    kind: AttackKind::Light,
    startup_frames: 0,
    active_frames: 1,
    recovery_frames: 0,
    hitbox: FixedRect::new(0, 0, 0, 0),
    damage: 0,
    knockback: FixedVec2::ZERO,
    hitstun_frames: 0,
    meter_cost: 0,
    meter_gain_attacker: 0,
    meter_gain_defender: 0,
    invincible_frames: 0,
    omnidirectional: false,
    guard_break: false,
    projectile_speed: 0,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;

    fn builtin_file() -> MovesetFile {
        serde_json::from_str(BUILTIN_MOVESET_JSON).unwrap()
    }

    #[test]
    fn test_builtin_is_complete() {
        let moveset = Moveset::builtin().unwrap();
        for character in CharacterId::ALL {
            for kind in AttackKind::ALL {
                let def = moveset.attack(character, kind);
                assert_eq!(def.kind, kind);
                assert!(def.active_frames > 0);
                assert!(def.hitbox.w > 0 && def.hitbox.h > 0);
            }
        }
    }

    #[test]
    fn test_builtin_flavor() {
        let moveset = Moveset::builtin().unwrap();
        let mario_light = moveset.attack(CharacterId::Mario, AttackKind::Light);
        assert_eq!(mario_light.damage, 4);
        assert_eq!(mario_light.meter_gain_attacker, from_int(3));

        // Mario's ultimate covers its whole window; Bowser's has none.
        let mario_ult = moveset.attack(CharacterId::Mario, AttackKind::Ultimate);
        assert_eq!(mario_ult.invincible_frames, mario_ult.total_frames());
        let bowser_ult = moveset.attack(CharacterId::Bowser, AttackKind::Ultimate);
        assert_eq!(bowser_ult.invincible_frames, 0);
        assert!(bowser_ult.damage > mario_ult.damage);

        // Mario's special is the fireball; nothing else fires projectiles.
        let fireball = moveset.attack(CharacterId::Mario, AttackKind::Special);
        assert!(fireball.is_projectile());
        assert!(fireball.guard_break);
        assert_eq!(fireball.projectile_speed, from_int(5));
        for character in CharacterId::ALL {
            for kind in AttackKind::ALL {
                let def = moveset.attack(character, kind);
                assert_eq!(def.is_projectile(), def == fireball);
            }
        }
    }

    #[test]
    fn test_missing_entry_rejected() {
        let mut file = builtin_file();
        file.attacks.retain(|e| !(e.character == CharacterId::Bowser && e.kind == AttackKind::Air));
        let err = Moveset::from_entries(&file.attacks).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingAttack { character: CharacterId::Bowser, kind: AttackKind::Air }
        ));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut file = builtin_file();
        let dup = file.attacks[0].clone();
        file.attacks.push(dup);
        let err = Moveset::from_entries(&file.attacks).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateAttack { .. }));
    }

    #[test]
    fn test_zero_active_rejected() {
        let mut file = builtin_file();
        file.attacks[0].active = 0;
        let err = Moveset::from_entries(&file.attacks).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAttack { .. }));
    }

    #[test]
    fn test_frame_count_overflow_rejected() {
        let mut file = builtin_file();
        file.attacks[0].startup = 4_000_000_000;
        file.attacks[0].recovery = 400_000_000;
        let err = Moveset::from_entries(&file.attacks).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidAttack { character: CharacterId::Mario, kind: AttackKind::Light, .. }
        ));

        let mut moveset = Moveset::builtin().unwrap();
        let mut def = *moveset.attack(CharacterId::Mario, AttackKind::Light);
        def.startup_frames = u32::MAX;
        assert!(moveset.set_attack(CharacterId::Mario, def).is_err());
        assert_eq!(moveset, Moveset::builtin().unwrap());
    }

    #[test]
    fn test_projectile_speed_bounds() {
        let mut file = builtin_file();
        let special = file
            .attacks
            .iter_mut()
            .find(|e| e.character == CharacterId::Mario && e.kind == AttackKind::Special)
            .unwrap();
        special.projectile_speed = -1.0;
        assert!(Moveset::from_entries(&file.attacks).is_err());

        let mut file = builtin_file();
        file.attacks[0].projectile_speed = f64::INFINITY;
        assert!(Moveset::from_entries(&file.attacks).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut file = builtin_file();
        file.attacks[1].knockback.x = f64::NAN;
        assert!(Moveset::from_entries(&file.attacks).is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = Moveset::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Moveset::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let base = Moveset::builtin().unwrap();
        let mut tweaked = base.clone();
        let mut def = *tweaked.attack(CharacterId::Mario, AttackKind::Light);
        def.damage += 1;
        tweaked.set_attack(CharacterId::Mario, def).unwrap();

        assert_eq!(base.fingerprint(), Moveset::builtin().unwrap().fingerprint());
        assert_ne!(base.fingerprint(), tweaked.fingerprint());
    }

    #[test]
    fn test_total_frames() {
        let moveset = Moveset::builtin().unwrap();
        let def = moveset.attack(CharacterId::Mario, AttackKind::Light);
        assert_eq!(
            def.total_frames(),
            def.startup_frames + def.active_frames + def.recovery_frames
        );
    }
}
