//! Core deterministic primitives.
//!
//! Everything the combat simulation computes with: fixed-point scalars,
//! vectors, rectangles, and the state hasher used to compare runs.

pub mod fixed;
pub mod vec2;
pub mod rect;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE, METER_MAX, MAX_HP};
pub use vec2::FixedVec2;
pub use rect::FixedRect;
pub use hash::{StateHash, StateHasher, compute_state_hash};
