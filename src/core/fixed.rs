//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the combat simulation.
//! Positions, velocities, rectangles and meter values are all `Fixed`;
//! floats only appear when a snapshot is handed to the renderer.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 px                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stage is 1550 px wide, well inside the integer range.
//! All physics constants are expressed per frame (60 Hz), in pixels.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

// =============================================================================
// FIGHT CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Maximum (and starting) hit points.
pub const MAX_HP: u32 = 100;

/// Ultimate meter capacity: 100.0 = 100 * 65536 = 6553600
pub const METER_MAX: Fixed = 6553600;

/// Downward acceleration per frame: 0.6 px/frame² = round(0.6 * 65536)
pub const GRAVITY: Fixed = 39322;

/// Horizontal velocity retained per grounded frame without control: 0.8
pub const GROUND_FRICTION: Fixed = 52429;

/// Pixels trimmed off the top of a crouching hurtbox: 24.0
pub const CROUCH_HURTBOX_MARGIN: Fixed = 1572864;

/// Horizontal pushback applied to a blocking defender: 2.0 px/frame
pub const BLOCK_PUSHBACK: Fixed = 131072;

/// Frames spent in LAND before control returns.
pub const LAND_FRAMES: u32 = 4;

/// Frames a blocked hit freezes the defender in BLOCK.
pub const BLOCKSTUN_FRAMES: u32 = 8;

/// Default ground line (feet), in px from the top of the screen: 790.0
pub const STAGE_GROUND_Y: Fixed = 51773440;

/// Default left wall: 0.0
pub const STAGE_LEFT_WALL: Fixed = 0;

/// Default right wall: 1550.0 = 1550 * 65536
pub const STAGE_RIGHT_WALL: Fixed = 101580800;

/// Simulation frame rate (Hz).
pub const FRAME_RATE: u32 = 60;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// # Warning
/// Only use at compile-time, in tests or when loading data. NEVER in the frame loop.
///
/// # Example
/// ```
/// use brawl_core::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert an integer to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to float for display/rendering.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Minimum of two fixed-point numbers.
#[inline]
pub fn fixed_min(a: Fixed, b: Fixed) -> Fixed {
    if a < b { a } else { b }
}

/// Maximum of two fixed-point numbers.
#[inline]
pub fn fixed_max(a: Fixed, b: Fixed) -> Fixed {
    if a > b { a } else { b }
}

/// Clamp a fixed-point number to a range.
///
/// If `min > max` the result is `min`.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    fixed_max(min, fixed_min(max, value))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(FIXED_SCALE, 16);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-1.0), -FIXED_ONE);
        assert_eq!(from_int(3), to_fixed(3.0));
    }

    #[test]
    fn test_fixed_mul() {
        assert_eq!(fixed_mul(to_fixed(2.0), to_fixed(3.0)), to_fixed(6.0));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), to_fixed(0.25));
        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_fixed_clamp() {
        assert_eq!(fixed_clamp(to_fixed(5.0), 0, to_fixed(3.0)), to_fixed(3.0));
        assert_eq!(fixed_clamp(to_fixed(-5.0), 0, to_fixed(3.0)), 0);
        assert_eq!(fixed_clamp(to_fixed(1.5), 0, to_fixed(3.0)), to_fixed(1.5));
        // Inverted bounds pin to the lower one
        assert_eq!(fixed_clamp(to_fixed(9.0), to_fixed(4.0), to_fixed(2.0)), to_fixed(4.0));
    }

    #[test]
    fn test_fight_constants() {
        assert_eq!(METER_MAX, from_int(100));
        assert_eq!(STAGE_GROUND_Y, from_int(790));
        assert_eq!(STAGE_RIGHT_WALL, from_int(1550));
        assert_eq!(CROUCH_HURTBOX_MARGIN, from_int(24));
        assert_eq!(BLOCK_PUSHBACK, from_int(2));
        // Rounded literals stay within one ulp of their decimal value
        assert!((GRAVITY - to_fixed(0.6)).abs() <= 1);
        assert!((GROUND_FRICTION - to_fixed(0.8)).abs() <= 1);
    }
}
