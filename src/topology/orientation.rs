//! Direction bits for oriented incidences (face-in-cell, edge-in-face).
//!
//! A [`Dir`] is the one-bit orientation group C₂: composing is XOR and every
//! element is its own inverse. Side node ordering is the composition of the
//! face-in-cell and edge-in-face directions.

use core::fmt::{Debug, Formatter};

/// Orientation group operations.
pub trait Orientation: Copy + Default {
    /// Apply `a` then `b`.
    fn compose(a: Self, b: Self) -> Self;
    fn inverse(a: Self) -> Self;
}

/// Direction of an oriented incidence. `POS` agrees with the entity's
/// natural orientation, `NEG` reverses it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[repr(transparent)]
pub struct Dir(bool);

static_assertions::assert_eq_size!(Dir, bool);

impl Dir {
    pub const POS: Dir = Dir(false);
    pub const NEG: Dir = Dir(true);

    #[inline]
    pub fn from_positive(positive: bool) -> Self {
        Dir(!positive)
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        !self.0
    }

    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        if self.0 { -1.0 } else { 1.0 }
    }

    /// `+1` or `-1`, the integer convention used for direction arrays.
    #[inline]
    pub fn as_i8(self) -> i8 {
        if self.0 { -1 } else { 1 }
    }

    #[inline]
    pub fn flipped(self) -> Self {
        Dir(!self.0)
    }

    /// Order a pair according to this direction: `POS` keeps it, `NEG` swaps.
    #[inline]
    pub fn order<T>(self, pair: [T; 2]) -> [T; 2] {
        let [a, b] = pair;
        if self.0 { [b, a] } else { [a, b] }
    }
}

impl Debug for Dir {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(if self.0 { "Dir(-)" } else { "Dir(+)" })
    }
}

impl Orientation for Dir {
    #[inline]
    fn compose(a: Self, b: Self) -> Self {
        Dir(a.0 ^ b.0)
    }
    #[inline]
    fn inverse(a: Self) -> Self {
        a
    }
}

impl core::ops::Neg for Dir {
    type Output = Dir;
    fn neg(self) -> Dir {
        self.flipped()
    }
}

/// Accumulate a sequence of orientation steps along a path, left-to-right.
/// Identity is `O::default()`.
#[inline]
pub fn accumulate_path<O, I>(path: I) -> O
where
    O: Orientation,
    I: IntoIterator<Item = O>,
{
    path.into_iter()
        .fold(O::default(), |acc, step| O::compose(acc, step))
}
