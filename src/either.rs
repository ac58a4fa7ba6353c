//! Fail-fast sum type with a single elimination form
//!
//! `Either<L, R>` holds exactly one of two values. By convention it is
//! right-biased: `map`, `and_then`, and `ap` operate on the `Right`
//! variant and short-circuit on the first `Left` encountered, so `Left`
//! plays the role of the error channel without any exception machinery.
//!
//! Every operation on this type is defined through [`Either::fold`], the
//! one primitive that eliminates the sum. That keeps each derived
//! combinator exhaustive by construction: there is no way to forget a
//! variant when the only way to look inside is to supply both branches.
//!
//! # Fail-fast vs accumulating
//!
//! Combining two failing `Either`s loses the second failure; use
//! [`Validation`](crate::Validation) when independent failures must all
//! be reported.
//!
//! # Examples
//!
//! ```
//! use watershed::Either;
//!
//! fn parse(s: &str) -> Either<String, i32> {
//!     s.parse()
//!         .map(Either::right)
//!         .unwrap_or_else(|_| Either::left(format!("not a number: {s}")))
//! }
//!
//! let description = parse("42").fold(
//!     |err| format!("failed: {err}"),
//!     |n| format!("parsed: {n}"),
//! );
//! assert_eq!(description, "parsed: 42");
//! ```

use crate::Validation;

/// A value that is either `Left(L)` or `Right(R)`.
///
/// Right-biased: the `Right` variant is the "happy path" and `Left` the
/// short-circuiting one. [`Either::fold`] is the primitive; everything
/// else is derived from it.
///
/// # Example
///
/// ```
/// use watershed::Either;
///
/// let fresh: Either<&str, i32> = Either::right(42);
/// assert_eq!(fresh.map(|n| n + 1), Either::right(43));
///
/// let stale: Either<&str, i32> = Either::left("cache miss");
/// assert_eq!(stale.map(|n| n + 1), Either::left("cache miss"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Either<L, R> {
    /// The left variant, conventionally the failure channel.
    Left(L),
    /// The right variant, conventionally the success channel.
    Right(R),
}

impl<L, R> Either<L, R> {
    // ========== Constructors ==========

    /// Create a `Left` value.
    #[inline]
    pub fn left(value: L) -> Self {
        Either::Left(value)
    }

    /// Create a `Right` value.
    #[inline]
    pub fn right(value: R) -> Self {
        Either::Right(value)
    }

    // ========== Elimination ==========

    /// Eliminate the sum by handling both variants.
    ///
    /// This is the primitive all other operations are built from.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let e: Either<&str, i32> = Either::right(2);
    /// let n = e.fold(|_| 0, |r| r * 10);
    /// assert_eq!(n, 20);
    /// ```
    #[inline]
    pub fn fold<C, FL, FR>(self, left_fn: FL, right_fn: FR) -> C
    where
        FL: FnOnce(L) -> C,
        FR: FnOnce(R) -> C,
    {
        match self {
            Either::Left(l) => left_fn(l),
            Either::Right(r) => right_fn(r),
        }
    }

    /// Returns `true` for a `Left` value.
    #[inline]
    pub fn is_left(&self) -> bool {
        self.as_ref().fold(|_| true, |_| false)
    }

    /// Returns `true` for a `Right` value.
    #[inline]
    pub fn is_right(&self) -> bool {
        !self.is_left()
    }

    /// Borrow both sides: `Either<&L, &R>`.
    #[inline]
    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(r),
        }
    }

    /// Borrow both sides mutably: `Either<&mut L, &mut R>`.
    #[inline]
    pub fn as_mut(&mut self) -> Either<&mut L, &mut R> {
        match self {
            Either::Left(l) => Either::Left(l),
            Either::Right(r) => Either::Right(r),
        }
    }

    // ========== Derived combinators (all through fold) ==========

    /// Transform the `Right` value, passing `Left` through.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let e: Either<&str, i32> = Either::right(5);
    /// assert_eq!(e.map(|n| n * 2), Either::right(10));
    /// ```
    #[inline]
    pub fn map<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        self.fold(Either::Left, |r| Either::Right(f(r)))
    }

    /// Transform the `Left` value, passing `Right` through.
    #[inline]
    pub fn map_left<L2, F>(self, f: F) -> Either<L2, R>
    where
        F: FnOnce(L) -> L2,
    {
        self.fold(|l| Either::Left(f(l)), Either::Right)
    }

    /// Transform both sides at once.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let e: Either<i32, i32> = Either::left(1);
    /// assert_eq!(e.bimap(|l| l - 1, |r| r + 1), Either::left(0));
    /// ```
    #[inline]
    pub fn bimap<L2, R2, F, G>(self, left_fn: F, right_fn: G) -> Either<L2, R2>
    where
        F: FnOnce(L) -> L2,
        G: FnOnce(R) -> R2,
    {
        self.fold(|l| Either::Left(left_fn(l)), |r| Either::Right(right_fn(r)))
    }

    /// Chain a dependent computation on the `Right` value.
    ///
    /// Short-circuits on `Left`: the function never runs.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let e: Either<&str, i32> = Either::right(4);
    /// let halved = e.and_then(|n| {
    ///     if n % 2 == 0 {
    ///         Either::right(n / 2)
    ///     } else {
    ///         Either::left("odd")
    ///     }
    /// });
    /// assert_eq!(halved, Either::right(2));
    /// ```
    #[inline]
    pub fn and_then<R2, F>(self, f: F) -> Either<L, R2>
    where
        F: FnOnce(R) -> Either<L, R2>,
    {
        self.fold(Either::Left, f)
    }

    /// Apply a wrapped function to the `Right` value, fail-fast.
    ///
    /// The receiver's `Left` wins: when both sides fail, the function
    /// side's failure is discarded. This is the short-circuiting
    /// counterpart of [`Validation::ap`](crate::Validation::ap), which
    /// keeps both.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let value: Either<&str, i32> = Either::left("first");
    /// let func: Either<&str, fn(i32) -> i32> = Either::left("second");
    /// assert_eq!(value.ap(func), Either::left("first"));
    /// ```
    #[inline]
    pub fn ap<R2, F>(self, f: Either<L, F>) -> Either<L, R2>
    where
        F: FnOnce(R) -> R2,
    {
        self.and_then(|r| f.map(|func| func(r)))
    }

    /// Recover from a `Left` value with a fallback computation.
    #[inline]
    pub fn or_else<L2, F>(self, f: F) -> Either<L2, R>
    where
        F: FnOnce(L) -> Either<L2, R>,
    {
        self.fold(f, Either::Right)
    }

    /// Extract the `Right` value, or compute one from the `Left`.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Either;
    ///
    /// let e: Either<&str, usize> = Either::left("oops");
    /// assert_eq!(e.get_or_else(|l| l.len()), 4);
    /// ```
    #[inline]
    pub fn get_or_else<F>(self, f: F) -> R
    where
        F: FnOnce(L) -> R,
    {
        self.fold(f, |r| r)
    }

    /// The `Right` value as an `Option`, discarding any `Left`.
    #[inline]
    pub fn into_option(self) -> Option<R> {
        self.fold(|_| None, Some)
    }

    /// Exchange the sides.
    #[inline]
    pub fn swap(self) -> Either<R, L> {
        self.fold(Either::Right, Either::Left)
    }

    /// Whether the `Right` value satisfies a predicate; `false` on `Left`.
    #[inline]
    pub fn exists<F>(&self, predicate: F) -> bool
    where
        F: FnOnce(&R) -> bool,
    {
        self.as_ref().fold(|_| false, predicate)
    }

    /// Whether this holds exactly the given `Right` value.
    #[inline]
    pub fn contains(&self, value: &R) -> bool
    where
        R: PartialEq,
    {
        self.exists(|r| r == value)
    }

    // ========== Conversions ==========

    /// Convert into `Result`, mapping `Right` to `Ok`.
    #[inline]
    pub fn into_result(self) -> Result<R, L> {
        self.fold(Err, Ok)
    }

    /// Build from a `Result`, mapping `Ok` to `Right`.
    #[inline]
    pub fn from_result(result: Result<R, L>) -> Self {
        match result {
            Ok(r) => Either::Right(r),
            Err(l) => Either::Left(l),
        }
    }

    /// Convert into a [`Validation`], mapping `Right` to `Success`.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Either, Validation};
    ///
    /// let e: Either<&str, i32> = Either::right(1);
    /// assert_eq!(e.into_validation(), Validation::Success(1));
    /// ```
    #[inline]
    pub fn into_validation(self) -> Validation<R, L> {
        self.fold(Validation::Failure, Validation::Success)
    }
}

impl<L, R> Either<L, Either<L, R>> {
    /// Flatten one level of nesting.
    #[inline]
    pub fn flatten(self) -> Either<L, R> {
        self.and_then(|inner| inner)
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        Either::from_result(result)
    }
}

/// Split a sequence of eithers into the lefts and the rights, preserving
/// order within each side.
///
/// # Example
///
/// ```
/// use watershed::either::partition;
/// use watershed::Either;
///
/// let items: Vec<Either<&str, i32>> =
///     vec![Either::right(1), Either::left("a"), Either::right(2)];
/// assert_eq!(partition(items), (vec!["a"], vec![1, 2]));
/// ```
pub fn partition<L, R, I>(iter: I) -> (Vec<L>, Vec<R>)
where
    I: IntoIterator<Item = Either<L, R>>,
{
    let mut lefts = Vec::new();
    let mut rights = Vec::new();
    for item in iter {
        match item {
            Either::Left(l) => lefts.push(l),
            Either::Right(r) => rights.push(r),
        }
    }
    (lefts, rights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left() -> Either<&'static str, i32> {
        Either::left("boom")
    }

    fn right() -> Either<&'static str, i32> {
        Either::right(2)
    }

    #[test]
    fn test_fold_left() {
        assert_eq!(left().fold(|l| l.len() as i32, |r| r), 4);
    }

    #[test]
    fn test_fold_right() {
        assert_eq!(right().fold(|_| 0, |r| r * 10), 20);
    }

    #[test]
    fn test_predicates() {
        assert!(left().is_left());
        assert!(!left().is_right());
        assert!(right().is_right());
    }

    #[test]
    fn test_map_biases_right() {
        assert_eq!(right().map(|r| r + 1), Either::right(3));
        assert_eq!(left().map(|r| r + 1), Either::left("boom"));
    }

    #[test]
    fn test_map_left() {
        assert_eq!(left().map_left(str::len), Either::left(4));
        assert_eq!(right().map_left(str::len), Either::right(2));
    }

    #[test]
    fn test_bimap() {
        assert_eq!(right().bimap(str::len, |r| r + 1), Either::right(3));
        assert_eq!(left().bimap(str::len, |r| r + 1), Either::left(4));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let chained = left().and_then(|r| Either::<&str, i32>::right(r + 1));
        assert_eq!(chained, Either::left("boom"));
    }

    #[test]
    fn test_ap_applies() {
        let f: Either<&str, fn(i32) -> i32> = Either::right(|x| x * 3);
        assert_eq!(right().ap(f), Either::right(6));
    }

    #[test]
    fn test_ap_first_failure_wins() {
        let f: Either<&str, fn(i32) -> i32> = Either::left("func side");
        // Receiver fails too: its failure is the one reported.
        assert_eq!(left().ap(f), Either::left("boom"));
        // Only the function side fails: that failure is reported.
        let f: Either<&str, fn(i32) -> i32> = Either::left("func side");
        assert_eq!(right().ap(f), Either::left("func side"));
    }

    #[test]
    fn test_get_or_else() {
        assert_eq!(right().get_or_else(|_| 0), 2);
        assert_eq!(left().get_or_else(|l| l.len() as i32), 4);
    }

    #[test]
    fn test_into_option() {
        assert_eq!(right().into_option(), Some(2));
        assert_eq!(left().into_option(), None);
    }

    #[test]
    fn test_swap() {
        assert_eq!(right().swap(), Either::left(2));
        assert_eq!(left().swap(), Either::right("boom"));
    }

    #[test]
    fn test_exists_contains() {
        assert!(right().exists(|r| *r == 2));
        assert!(!left().exists(|_| true));
        assert!(right().contains(&2));
        assert!(!right().contains(&3));
    }

    #[test]
    fn test_result_round_trip() {
        assert_eq!(right().into_result(), Ok(2));
        assert_eq!(Either::from_result(Err::<i32, _>("e")), Either::left("e"));
        let via_from: Either<&str, i32> = Ok(1).into();
        assert_eq!(via_from, Either::right(1));
    }

    #[test]
    fn test_or_else() {
        assert_eq!(left().or_else(|_| Either::<(), i32>::right(9)), Either::right(9));
        assert_eq!(right().or_else(|_| Either::<(), i32>::right(9)), Either::right(2));
    }

    #[test]
    fn test_flatten() {
        let nested: Either<&str, Either<&str, i32>> = Either::right(Either::right(1));
        assert_eq!(nested.flatten(), Either::right(1));
        let nested: Either<&str, Either<&str, i32>> = Either::right(Either::left("inner"));
        assert_eq!(nested.flatten(), Either::left("inner"));
    }

    #[test]
    fn test_into_validation() {
        assert_eq!(right().into_validation(), Validation::Success(2));
        assert_eq!(left().into_validation(), Validation::Failure("boom"));
    }

    #[test]
    fn test_partition() {
        let items: Vec<Either<&str, i32>> = vec![
            Either::right(1),
            Either::left("a"),
            Either::right(2),
            Either::left("b"),
        ];
        assert_eq!(partition(items), (vec!["a", "b"], vec![1, 2]));
    }
}
