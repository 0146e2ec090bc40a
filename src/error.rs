//! Error Types
//!
//! Two failure families exist in the core:
//! - configuration errors, raised while loading a moveset (fatal, the match
//!   cannot start)
//! - invariant violations, raised by the frame loop when a resolver left a
//!   character in an impossible state
//!
//! Input that does not apply to the current state is not an error; it is
//! ignored by the state machine.

use std::path::PathBuf;

use crate::core::fixed::Fixed;
use crate::game::character::CharacterId;
use crate::game::moveset::AttackKind;
use crate::game::state::Side;

/// Moveset loading / validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A (character, kind) pair has no definition.
    #[error("moveset for {character:?} has no {kind:?} attack")]
    MissingAttack {
        /// Character whose moveset is incomplete
        character: CharacterId,
        /// Missing attack kind
        kind: AttackKind,
    },

    /// The same (character, kind) pair is defined twice.
    #[error("moveset for {character:?} defines {kind:?} more than once")]
    DuplicateAttack {
        /// Character with the duplicate
        character: CharacterId,
        /// Duplicated attack kind
        kind: AttackKind,
    },

    /// A definition exists but its values are unusable.
    #[error("invalid {kind:?} attack for {character:?}: {reason}")]
    InvalidAttack {
        /// Character owning the definition
        character: CharacterId,
        /// Attack kind
        kind: AttackKind,
        /// Human-readable reason
        reason: String,
    },

    /// Moveset JSON could not be parsed.
    #[error("malformed moveset data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Moveset file could not be read.
    #[error("failed to read moveset file {path}: {source}")]
    Io {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Error raised by the frame loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// HP was observed outside `[0, MAX_HP]`.
    #[error("{side:?} hp out of range: {hp}")]
    HpOutOfRange {
        /// Offending side
        side: Side,
        /// Observed value
        hp: u32,
    },

    /// Ultimate meter was observed outside `[0, METER_MAX]`.
    #[error("{side:?} meter out of range: {meter} (raw Q16.16)")]
    MeterOutOfRange {
        /// Offending side
        side: Side,
        /// Observed raw value
        meter: Fixed,
    },
}

/// Result alias for moveset loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
