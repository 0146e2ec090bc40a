//! Game Logic Module
//!
//! All combat simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `input`: Per-frame command sets
//! - `character`: Fighter record and stat table
//! - `moveset`: Attack definitions and loading
//! - `action`: Action state machine
//! - `physics`: Body integration and stage bounds
//! - `hitbox`: Hitbox vs hurtbox detection
//! - `combat`: Damage, hitstun, knockback, meter, KO
//! - `projectile`: Fired attacks in flight
//! - `state`: Match state and render snapshot
//! - `tick`: Authoritative frame loop
//! - `events`: Game events for audio and logs

pub mod input;
pub mod character;
pub mod moveset;
pub mod action;
pub mod physics;
pub mod hitbox;
pub mod combat;
pub mod projectile;
pub mod state;
pub mod tick;
pub mod events;

// Re-export key types
pub use input::{Command, CommandSet, InputFrame};
pub use character::{Character, CharacterId, Facing};
pub use moveset::{AttackDefinition, AttackKind, Moveset};
pub use action::ActionState;
pub use projectile::{Projectile, ProjectileSnapshot};
pub use state::{MatchOutcome, MatchSnapshot, MatchState, Side, Stage};
pub use tick::{MatchConfig, MatchController, TickResult};
pub use events::{EventSink, GameEvent};
