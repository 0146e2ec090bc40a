//! Fixed-Point 2D Vector
//!
//! Positions and velocities. Screen space: +x right, +y down.

use std::fmt;
use std::ops::Add;
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE, to_float};

/// Pair of Q16.16 components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// Horizontal component
    pub x: Fixed,
    /// Vertical component (positive is down)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Origin / no motion
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// From raw fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// From whole pixels.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self::new(x << FIXED_SCALE, y << FIXED_SCALE)
    }

    /// Component-wise wrapping sum.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x.wrapping_add(other.x), self.y.wrapping_add(other.y))
    }

    /// Flip the horizontal component when `sign` is negative.
    ///
    /// Knockback and pushback are authored for a right-facing attacker.
    #[inline]
    pub fn mirror_x(self, sign: i32) -> Self {
        if sign < 0 {
            Self::new(self.x.wrapping_neg(), self.y)
        } else {
            self
        }
    }

    /// Pixels as floats, for snapshots only.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (to_float(self.x), to_float(self.y))
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec2::add(self, rhs)
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_floats();
        write!(f, "({:.2}, {:.2})px", x, y)
    }
}
