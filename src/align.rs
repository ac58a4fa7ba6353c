//! Positional alignment of two sequences
//!
//! Zipping truncates to the shorter input; alignment keeps everything and
//! records, per position, which side contributed. [`align`] is the
//! primitive: position `i` of the output is [`Ior::Both`] while both
//! inputs still have an element, then `Left` or `Right` for the longer
//! side's tail. Every other operation here — the pad-zips, [`salign`],
//! the crosswalks — is a projection or fold of that tagging.
//!
//! All traversals are single-pass loops; alignment depth never depends on
//! input length.
//!
//! # Laws
//!
//! ```text
//! align(l, r).len() == max(l.len(), r.len())
//! align(l, r)[i] == Both(l[i], r[i])   for i < min(l.len(), r.len())
//! ```
//!
//! # Examples
//!
//! ```
//! use watershed::align::align;
//! use watershed::Ior;
//!
//! assert_eq!(
//!     align(vec![1, 2], vec!["a"]),
//!     vec![Ior::Both(1, "a"), Ior::Left(2)],
//! );
//! assert_eq!(
//!     align(vec![1], vec!["a", "b"]),
//!     vec![Ior::Both(1, "a"), Ior::Right("b")],
//! );
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use crate::{Ior, Semigroup};

/// Align two sequences positionally, tagging each output slot with the
/// side(s) that supplied it.
///
/// The output length is `max` of the input lengths; unmatched tails are
/// tagged `Left`/`Right` instead of being dropped.
///
/// # Example
///
/// ```
/// use watershed::align::align;
/// use watershed::Ior;
///
/// let aligned = align(vec!["A", "B"], vec![1, 2, 3]);
/// assert_eq!(
///     aligned,
///     vec![Ior::Both("A", 1), Ior::Both("B", 2), Ior::Right(3)],
/// );
/// ```
pub fn align<A, B, L, R>(left: L, right: R) -> Vec<Ior<A, B>>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
{
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let mut out = Vec::new();
    loop {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) => out.push(Ior::Both(a, b)),
            (Some(a), None) => {
                out.push(Ior::Left(a));
                out.extend(left.by_ref().map(Ior::Left));
                break;
            }
            (None, Some(b)) => {
                out.push(Ior::Right(b));
                out.extend(right.by_ref().map(Ior::Right));
                break;
            }
            (None, None) => break,
        }
    }
    out
}

/// Align two sequences and map each tagged slot through `f`.
///
/// # Example
///
/// ```
/// use watershed::align::align_with;
///
/// let merged = align_with(vec![1, 2], vec![10], |ior| {
///     ior.fold(|l| l, |r| r, |l, r| l + r)
/// });
/// assert_eq!(merged, vec![11, 2]);
/// ```
pub fn align_with<A, B, C, L, R, F>(left: L, right: R, f: F) -> Vec<C>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
    F: FnMut(Ior<A, B>) -> C,
{
    align(left, right).into_iter().map(f).collect()
}

/// Zip two sequences to the longer length, padding the shorter side with
/// `None`.
///
/// # Example
///
/// ```
/// use watershed::align::pad_zip;
///
/// assert_eq!(
///     pad_zip(vec![1, 2], vec!["a"]),
///     vec![(Some(1), Some("a")), (Some(2), None)],
/// );
/// ```
pub fn pad_zip<A, B, L, R>(left: L, right: R) -> Vec<(Option<A>, Option<B>)>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
{
    align_with(left, right, Ior::pad)
}

/// [`pad_zip`] with a transformation applied to each padded pair.
pub fn pad_zip_with<A, B, C, L, R, F>(left: L, right: R, mut f: F) -> Vec<C>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
    F: FnMut(Option<A>, Option<B>) -> C,
{
    align_with(left, right, |ior| {
        let (a, b) = ior.pad();
        f(a, b)
    })
}

/// Pad only the left side: positions where the right side is absent are
/// dropped.
///
/// # Example
///
/// ```
/// use watershed::align::left_pad_zip;
///
/// // Right side longer: left is padded.
/// assert_eq!(
///     left_pad_zip(vec![1], vec!["a", "b"]),
///     vec![(Some(1), "a"), (None, "b")],
/// );
/// // Left side longer: the unmatched tail has no right value and is dropped.
/// assert_eq!(left_pad_zip(vec![1, 2], vec!["a"]), vec![(Some(1), "a")]);
/// ```
pub fn left_pad_zip<A, B, L, R>(left: L, right: R) -> Vec<(Option<A>, B)>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
{
    align(left, right)
        .into_iter()
        .filter_map(|ior| {
            let (a, b) = ior.pad();
            b.map(|b| (a, b))
        })
        .collect()
}

/// Pad only the right side: positions where the left side is absent are
/// dropped.
///
/// # Example
///
/// ```
/// use watershed::align::right_pad_zip;
///
/// assert_eq!(
///     right_pad_zip(vec![1, 2], vec!["a"]),
///     vec![(1, Some("a")), (2, None)],
/// );
/// assert_eq!(right_pad_zip(vec![1], vec!["a", "b"]), vec![(1, Some("a"))]);
/// ```
pub fn right_pad_zip<A, B, L, R>(left: L, right: R) -> Vec<(A, Option<B>)>
where
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = B>,
{
    align(left, right)
        .into_iter()
        .filter_map(|ior| {
            let (a, b) = ior.pad();
            a.map(|a| (a, b))
        })
        .collect()
}

/// Align two sequences of the same element type and merge overlapping
/// positions through the element semigroup.
///
/// # Example
///
/// ```
/// use watershed::align::salign;
///
/// let merged = salign(vec![vec![1], vec![2]], vec![vec![10]]);
/// assert_eq!(merged, vec![vec![1, 10], vec![2]]);
/// ```
pub fn salign<A, L, R>(left: L, right: R) -> Vec<A>
where
    A: Semigroup,
    L: IntoIterator<Item = A>,
    R: IntoIterator<Item = A>,
{
    align_with(left, right, Ior::merge)
}

/// Split a sequence of tagged slots back into its two sides.
///
/// Inverse-ish of [`align`]: `Both` contributes to both outputs.
///
/// # Example
///
/// ```
/// use watershed::align::unalign;
/// use watershed::Ior;
///
/// let (lefts, rights) = unalign(vec![Ior::Both(1, "a"), Ior::Left(2)]);
/// assert_eq!(lefts, vec![1, 2]);
/// assert_eq!(rights, vec!["a"]);
/// ```
pub fn unalign<A, B, I>(iter: I) -> (Vec<A>, Vec<B>)
where
    I: IntoIterator<Item = Ior<A, B>>,
{
    let mut lefts = Vec::new();
    let mut rights = Vec::new();
    for ior in iter {
        let (a, b) = ior.pad();
        if let Some(a) = a {
            lefts.push(a);
        }
        if let Some(b) = b {
            rights.push(b);
        }
    }
    (lefts, rights)
}

/// Apply `f` to each element and align the successive results
/// positionally — a transpose of the produced sequences.
///
/// Row `i` of the output lists the `i`-th element of every application
/// that produced one, in application order. Unequal lengths never drop
/// elements; shorter applications simply contribute to fewer rows.
///
/// # Example
///
/// ```
/// use watershed::align::crosswalk;
///
/// let rows = crosswalk(vec![3, 1, 2], |n| (0..n).collect::<Vec<_>>());
/// assert_eq!(rows, vec![vec![0, 0, 0], vec![1, 1], vec![2]]);
/// ```
pub fn crosswalk<A, B, I, F>(iter: I, mut f: F) -> Vec<Vec<B>>
where
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Vec<B>,
{
    let mut rows: Vec<Vec<B>> = Vec::new();
    for item in iter {
        rows = align_with(rows, f(item), |ior| {
            ior.fold(
                |row| row,
                |b| vec![b],
                |mut row, b| {
                    row.push(b);
                    row
                },
            )
        });
    }
    rows
}

/// Apply `f` to each element and union the produced maps, collecting the
/// values for each key in application order.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use watershed::align::crosswalk_map;
///
/// let merged = crosswalk_map(vec![1, 2], |n| {
///     HashMap::from([("n", n), ("double", n * 2)])
/// });
/// assert_eq!(merged[&"n"], vec![1, 2]);
/// assert_eq!(merged[&"double"], vec![2, 4]);
/// ```
pub fn crosswalk_map<A, K, V, I, F>(iter: I, mut f: F) -> HashMap<K, Vec<V>>
where
    K: Eq + Hash,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> HashMap<K, V>,
{
    let mut merged: HashMap<K, Vec<V>> = HashMap::new();
    for item in iter {
        for (key, value) in f(item) {
            merged.entry(key).or_default().push(value);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_equal_lengths() {
        assert_eq!(
            align(vec![1, 2], vec!["a", "b"]),
            vec![Ior::Both(1, "a"), Ior::Both(2, "b")]
        );
    }

    #[test]
    fn test_align_left_longer() {
        assert_eq!(
            align(vec![1, 2], vec!["a"]),
            vec![Ior::Both(1, "a"), Ior::Left(2)]
        );
    }

    #[test]
    fn test_align_right_longer() {
        assert_eq!(
            align(vec![1], vec!["a", "b"]),
            vec![Ior::Both(1, "a"), Ior::Right("b")]
        );
    }

    #[test]
    fn test_align_empty_sides() {
        assert_eq!(
            align(Vec::<i32>::new(), vec!["a"]),
            vec![Ior::<i32, _>::Right("a")]
        );
        assert_eq!(
            align(vec![1], Vec::<&str>::new()),
            vec![Ior::<_, &str>::Left(1)]
        );
        assert_eq!(align(Vec::<i32>::new(), Vec::<&str>::new()), vec![]);
    }

    #[test]
    fn test_align_length_is_max() {
        let out = align(0..7, 0..3);
        assert_eq!(out.len(), 7);
        let out = align(0..2, 0..9);
        assert_eq!(out.len(), 9);
    }

    #[test]
    fn test_align_large_inputs() {
        // Depth must not scale with input size.
        let n = 1_000_000;
        let out = align(0..n, 0..n / 2);
        assert_eq!(out.len(), n as usize);
        assert_eq!(out[0], Ior::Both(0, 0));
        assert_eq!(out[(n - 1) as usize], Ior::Left(n - 1));
    }

    #[test]
    fn test_align_with() {
        let merged = align_with(vec![1, 2, 3], vec![10, 20], |ior| {
            ior.fold(|l| l, |r| r, |l, r| l + r)
        });
        assert_eq!(merged, vec![11, 22, 3]);
    }

    #[test]
    fn test_pad_zip() {
        assert_eq!(
            pad_zip(vec![1, 2], vec!["a"]),
            vec![(Some(1), Some("a")), (Some(2), None)]
        );
        assert_eq!(
            pad_zip(vec![1], vec!["a", "b"]),
            vec![(Some(1), Some("a")), (None, Some("b"))]
        );
    }

    #[test]
    fn test_pad_zip_with() {
        let out = pad_zip_with(vec![1, 2], vec![10], |a, b| {
            a.unwrap_or(0) + b.unwrap_or(0)
        });
        assert_eq!(out, vec![11, 2]);
    }

    #[test]
    fn test_left_pad_zip() {
        assert_eq!(left_pad_zip(vec![1, 2], vec!["a"]), vec![(Some(1), "a")]);
        assert_eq!(
            left_pad_zip(vec![1], vec!["a", "b"]),
            vec![(Some(1), "a"), (None, "b")]
        );
        assert_eq!(
            left_pad_zip(vec![1, 2], vec!["a", "b"]),
            vec![(Some(1), "a"), (Some(2), "b")]
        );
    }

    #[test]
    fn test_right_pad_zip() {
        assert_eq!(
            right_pad_zip(vec![1, 2], vec!["a"]),
            vec![(1, Some("a")), (2, None)]
        );
        assert_eq!(right_pad_zip(vec![1], vec!["a", "b"]), vec![(1, Some("a"))]);
    }

    #[test]
    fn test_salign() {
        let merged = salign(vec![vec![1], vec![2], vec![3]], vec![vec![10]]);
        assert_eq!(merged, vec![vec![1, 10], vec![2], vec![3]]);
    }

    #[test]
    fn test_unalign() {
        let (lefts, rights) = unalign(vec![
            Ior::Both(1, "a"),
            Ior::Left(2),
            Ior::Right("b"),
        ]);
        assert_eq!(lefts, vec![1, 2]);
        assert_eq!(rights, vec!["a", "b"]);
    }

    #[test]
    fn test_unalign_round_trip() {
        let left = vec![1, 2, 3];
        let right = vec!["a"];
        let (l, r) = unalign(align(left.clone(), right.clone()));
        assert_eq!(l, left);
        assert_eq!(r, right);
    }

    #[test]
    fn test_crosswalk_transposes() {
        let rows = crosswalk(vec![vec![1, 2], vec![3, 4]], |v| v);
        assert_eq!(rows, vec![vec![1, 3], vec![2, 4]]);
    }

    #[test]
    fn test_crosswalk_keeps_insertion_order() {
        // Rows list contributions in application order even when some
        // applications are shorter than others.
        let rows = crosswalk(vec![3, 1, 2], |n| (0..n).map(|i| (n, i)).collect());
        assert_eq!(
            rows,
            vec![
                vec![(3, 0), (1, 0), (2, 0)],
                vec![(3, 1), (2, 1)],
                vec![(3, 2)],
            ]
        );
    }

    #[test]
    fn test_crosswalk_empty() {
        let rows = crosswalk(Vec::<i32>::new(), |n| vec![n]);
        assert_eq!(rows, Vec::<Vec<i32>>::new());
        let rows = crosswalk(vec![1, 2], |_| Vec::<i32>::new());
        assert_eq!(rows, Vec::<Vec<i32>>::new());
    }

    #[test]
    fn test_crosswalk_map() {
        let merged = crosswalk_map(vec![1, 2, 3], |n| {
            let mut m = HashMap::new();
            m.insert(n % 2, n);
            m
        });
        assert_eq!(merged[&1], vec![1, 3]);
        assert_eq!(merged[&0], vec![2]);
    }
}
