//! Inclusive-or sum type produced by sequence alignment
//!
//! `Ior<A, B>` holds a left value, a right value, or both — never
//! neither. It is the per-position record produced by
//! [`align`](crate::align::align): `Both` while the two input sequences
//! overlap, then `Left` or `Right` for the unmatched tail.
//!
//! # Examples
//!
//! ```
//! use watershed::Ior;
//!
//! let both = Ior::Both(1, "a");
//! let tagged = both.fold(
//!     |l| format!("left {l}"),
//!     |r| format!("right {r}"),
//!     |l, r| format!("both {l} {r}"),
//! );
//! assert_eq!(tagged, "both 1 a");
//! ```

use crate::{Either, Semigroup};

/// One of `Left(A)`, `Right(B)`, or `Both(A, B)`.
///
/// Unlike [`Either`], the two sides are not exclusive; unlike a pair,
/// neither side is required. The absent-both case is unrepresentable,
/// which is what lets [`align`](crate::align::align) tag every output
/// position without an artificial placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ior<A, B> {
    /// Only the left side is present.
    Left(A),
    /// Only the right side is present.
    Right(B),
    /// Both sides are present.
    Both(A, B),
}

impl<A, B> Ior<A, B> {
    /// Build from two options; `None` when both are absent.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Ior;
    ///
    /// assert_eq!(Ior::from_options(Some(1), None::<&str>), Some(Ior::Left(1)));
    /// assert_eq!(Ior::from_options(Some(1), Some("a")), Some(Ior::Both(1, "a")));
    /// assert_eq!(Ior::from_options(None::<i32>, None::<&str>), None);
    /// ```
    pub fn from_options(left: Option<A>, right: Option<B>) -> Option<Self> {
        match (left, right) {
            (Some(a), Some(b)) => Some(Ior::Both(a, b)),
            (Some(a), None) => Some(Ior::Left(a)),
            (None, Some(b)) => Some(Ior::Right(b)),
            (None, None) => None,
        }
    }

    /// Eliminate by handling all three cases.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Ior;
    ///
    /// let n = Ior::<i32, i32>::Left(3).fold(|l| l, |r| r, |l, r| l + r);
    /// assert_eq!(n, 3);
    /// ```
    #[inline]
    pub fn fold<C, FA, FB, FAB>(self, left_fn: FA, right_fn: FB, both_fn: FAB) -> C
    where
        FA: FnOnce(A) -> C,
        FB: FnOnce(B) -> C,
        FAB: FnOnce(A, B) -> C,
    {
        match self {
            Ior::Left(a) => left_fn(a),
            Ior::Right(b) => right_fn(b),
            Ior::Both(a, b) => both_fn(a, b),
        }
    }

    /// Returns `true` when only the left side is present.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Ior::Left(_))
    }

    /// Returns `true` when only the right side is present.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Ior::Right(_))
    }

    /// Returns `true` when both sides are present.
    #[inline]
    pub fn is_both(&self) -> bool {
        matches!(self, Ior::Both(_, _))
    }

    /// Transform the right side, leaving any left value alone.
    #[inline]
    pub fn map<B2, F>(self, f: F) -> Ior<A, B2>
    where
        F: FnOnce(B) -> B2,
    {
        self.bimap(|a| a, f)
    }

    /// Transform the left side, leaving any right value alone.
    #[inline]
    pub fn map_left<A2, F>(self, f: F) -> Ior<A2, B>
    where
        F: FnOnce(A) -> A2,
    {
        self.bimap(f, |b| b)
    }

    /// Transform both sides.
    #[inline]
    pub fn bimap<A2, B2, FA, FB>(self, left_fn: FA, right_fn: FB) -> Ior<A2, B2>
    where
        FA: FnOnce(A) -> A2,
        FB: FnOnce(B) -> B2,
    {
        match self {
            Ior::Left(a) => Ior::Left(left_fn(a)),
            Ior::Right(b) => Ior::Right(right_fn(b)),
            Ior::Both(a, b) => Ior::Both(left_fn(a), right_fn(b)),
        }
    }

    /// Project to a pair of options; the absent side becomes `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Ior;
    ///
    /// assert_eq!(Ior::<i32, &str>::Left(1).pad(), (Some(1), None));
    /// assert_eq!(Ior::Both(1, "a").pad(), (Some(1), Some("a")));
    /// ```
    #[inline]
    pub fn pad(self) -> (Option<A>, Option<B>) {
        self.fold(
            |a| (Some(a), None),
            |b| (None, Some(b)),
            |a, b| (Some(a), Some(b)),
        )
    }

    /// The left value, if present (alone or in `Both`), consuming self.
    #[inline]
    pub fn into_left(self) -> Option<A> {
        self.pad().0
    }

    /// The right value, if present (alone or in `Both`), consuming self.
    #[inline]
    pub fn into_right(self) -> Option<B> {
        self.pad().1
    }

    /// Exchange the sides.
    #[inline]
    pub fn swap(self) -> Ior<B, A> {
        self.fold(Ior::Right, Ior::Left, |a, b| Ior::Both(b, a))
    }

    /// Collapse to an [`Either`], right-biased: `Both` keeps its right.
    #[inline]
    pub fn into_either(self) -> Either<A, B> {
        self.fold(Either::Left, Either::Right, |_, b| Either::Right(b))
    }
}

impl<A> Ior<A, A> {
    /// Merge whichever sides are present through the element semigroup.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Ior;
    ///
    /// assert_eq!(Ior::Both(vec![1], vec![2]).merge(), vec![1, 2]);
    /// assert_eq!(Ior::<Vec<i32>, _>::Right(vec![3]).merge(), vec![3]);
    /// ```
    #[inline]
    pub fn merge(self) -> A
    where
        A: Semigroup,
    {
        self.fold(|a| a, |b| b, |a, b| a.combine(b))
    }
}

// Pointwise combination; Both absorbs the other side's values.
impl<A: Semigroup, B: Semigroup> Semigroup for Ior<A, B> {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Ior::Left(a1), Ior::Left(a2)) => Ior::Left(a1.combine(a2)),
            (Ior::Left(a1), Ior::Right(b2)) => Ior::Both(a1, b2),
            (Ior::Left(a1), Ior::Both(a2, b2)) => Ior::Both(a1.combine(a2), b2),
            (Ior::Right(b1), Ior::Left(a2)) => Ior::Both(a2, b1),
            (Ior::Right(b1), Ior::Right(b2)) => Ior::Right(b1.combine(b2)),
            (Ior::Right(b1), Ior::Both(a2, b2)) => Ior::Both(a2, b1.combine(b2)),
            (Ior::Both(a1, b1), Ior::Left(a2)) => Ior::Both(a1.combine(a2), b1),
            (Ior::Both(a1, b1), Ior::Right(b2)) => Ior::Both(a1, b1.combine(b2)),
            (Ior::Both(a1, b1), Ior::Both(a2, b2)) => {
                Ior::Both(a1.combine(a2), b1.combine(b2))
            }
        }
    }
}
