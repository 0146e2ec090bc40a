//! # Brawl Core
//!
//! Deterministic combat simulation for a 1v1 two-character fighting game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BRAWL CORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rect.rs     - Axis-aligned rectangles                   │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Combat logic (deterministic)              │
//! │  ├── input.rs    - Per-frame command sets                    │
//! │  ├── character.rs- Fighter record and stats                  │
//! │  ├── moveset.rs  - Attack definitions (JSON)                 │
//! │  ├── action.rs   - Action state machine                      │
//! │  ├── physics.rs  - Gravity, ground, walls                    │
//! │  ├── hitbox.rs   - Hitbox vs hurtbox detection               │
//! │  ├── combat.rs   - Damage, hitstun, knockback, meter         │
//! │  ├── projectile.rs - Fired attacks in flight                 │
//! │  ├── state.rs    - Match state and snapshots                 │
//! │  └── tick.rs     - Authoritative frame loop                  │
//! │                                                              │
//! │  error.rs        - Config and invariant errors               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - Characters in a fixed-size array, always processed P1 then P2
//! - No system time dependencies
//!
//! Given identical inputs, two runs produce identical positions, states,
//! HP and meter on every frame.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, FRAME_RATE};
pub use core::vec2::FixedVec2;
pub use error::{ConfigError, SimError};
pub use game::input::{Command, InputFrame};
pub use game::moveset::Moveset;
pub use game::state::{MatchOutcome, MatchState, Side};
pub use game::tick::{MatchConfig, MatchController};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
