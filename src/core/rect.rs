//! Fixed-Point Axis-Aligned Rectangles
//!
//! Hitboxes and hurtboxes. `x`/`y` is the top-left corner.

use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE};

/// Axis-aligned rectangle with fixed-point components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedRect {
    /// Left edge
    pub x: Fixed,
    /// Top edge
    pub y: Fixed,
    /// Width (non-negative)
    pub w: Fixed,
    /// Height (non-negative)
    pub h: Fixed,
}

impl FixedRect {
    /// Create a rectangle from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed, w: Fixed, h: Fixed) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle from integer pixel components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
            w: w << FIXED_SCALE,
            h: h << FIXED_SCALE,
        }
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> Fixed {
        self.x.wrapping_add(self.w)
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> Fixed {
        self.y.wrapping_add(self.h)
    }

    /// Horizontal centre.
    #[inline]
    pub fn center_x(&self) -> Fixed {
        self.x.wrapping_add(self.w >> 1)
    }

    /// Strict overlap test.
    ///
    /// Rectangles that only share an edge do not overlap, and a rectangle
    /// with zero area never overlaps anything.
    #[inline]
    pub fn overlaps(&self, other: &FixedRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = FixedRect::from_ints(0, 0, 10, 10);
        let b = FixedRect::from_ints(5, 5, 10, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = FixedRect::from_ints(0, 0, 10, 10);
        let right = FixedRect::from_ints(10, 0, 10, 10);
        let below = FixedRect::from_ints(0, 10, 10, 10);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_zero_area_never_overlaps() {
        let a = FixedRect::from_ints(0, 0, 10, 10);
        let line = FixedRect::from_ints(5, 0, 0, 10);
        assert!(!a.overlaps(&line));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = FixedRect::from_ints(0, 0, 100, 100);
        let inner = FixedRect::from_ints(40, 40, 5, 5);
        assert!(outer.overlaps(&inner));
    }

    #[test]
    fn test_edges() {
        let r = FixedRect::from_ints(6, 7, 10, 20);
        assert_eq!(r, FixedRect::new(6 << FIXED_SCALE, 7 << FIXED_SCALE, 10 << FIXED_SCALE, 20 << FIXED_SCALE));
        assert_eq!(r.right(), 16 << FIXED_SCALE);
        assert_eq!(r.bottom(), 27 << FIXED_SCALE);
        assert_eq!(r.center_x(), 11 << FIXED_SCALE);
    }
}
