//! State Digests
//!
//! SHA-256 over match state (determinism checks, replay comparison) and
//! over moveset tables (fingerprints in logs). Field order is part of the
//! digest, so every caller feeds fields in a fixed order.

use sha2::{Sha256, Digest};
use super::fixed::Fixed;
use super::vec2::FixedVec2;

/// 32-byte SHA-256 digest.
pub type StateHash = [u8; 32];

/// What a digest covers. Each domain seeds the hasher with its own tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Full match state
    MatchState,
    /// Attack table
    Moveset,
}

impl Domain {
    fn tag(self) -> &'static [u8] {
        match self {
            Domain::MatchState => b"BRAWL_CORE_STATE_V1",
            Domain::Moveset => b"BRAWL_CORE_MOVESET_V1",
        }
    }
}

/// Incremental digest with helpers for the simulation's value types.
/// Integers go in little-endian.
pub struct StateHasher {
    inner: Sha256,
}

impl StateHasher {
    /// Hasher seeded with an arbitrary tag.
    pub fn new(tag: &[u8]) -> Self {
        let mut inner = Sha256::new();
        inner.update(tag);
        Self { inner }
    }

    /// Hasher for match state.
    pub fn for_match_state() -> Self {
        Self::new(Domain::MatchState.tag())
    }

    /// Hasher for a moveset table.
    pub fn for_moveset() -> Self {
        Self::new(Domain::Moveset.tag())
    }

    #[inline]
    fn absorb<const N: usize>(&mut self, bytes: [u8; N]) {
        self.inner.update(bytes);
    }

    /// Feed a byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.absorb([value]);
    }

    /// Feed a flag as one byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.absorb([value as u8]);
    }

    /// Feed a u32.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.absorb(value.to_le_bytes());
    }

    /// `None` is tagged 0, `Some(v)` is tagged 1 followed by `v`, so an
    /// untimed match never collides with a timer at zero.
    #[inline]
    pub fn update_opt_u32(&mut self, value: Option<u32>) {
        match value {
            Some(v) => {
                self.update_u8(1);
                self.update_u32(v);
            }
            None => self.update_u8(0),
        }
    }

    /// Feed a fixed-point value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.absorb(value.to_le_bytes());
    }

    /// Feed x then y.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_fixed(value.x);
        self.update_fixed(value.y);
    }

    /// Consume the hasher.
    pub fn finalize(self) -> StateHash {
        self.inner.finalize().into()
    }
}

/// Digest of a match at `frame`. The closure feeds everything after the
/// frame counter.
pub fn compute_state_hash<F>(frame: u32, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_match_state();
    hasher.update_u32(frame);
    add_state(&mut hasher);
    hasher.finalize()
}
