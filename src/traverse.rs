//! Traverse and sequence over collections of effect-carrying values
//!
//! Two families live here. The [`Validation`] family accumulates: it is a
//! right fold seeded with `success(vec![])` where each step applies
//! [`Validation::ap`], so every element is inspected and all failures are
//! combined in input order. The [`Either`] family is fail-fast: it stops
//! at the first `Left` and later elements are never examined. A third
//! entry point, [`traverse_deferred`], sequences deferred effects in
//! declaration order.
//!
//! Output order always equals input order; the internal fold direction is
//! not observable except through the accumulation order the Validation
//! family guarantees.
//!
//! # Examples
//!
//! ```
//! use watershed::traverse::traverse;
//! use watershed::Validation;
//!
//! fn parse(s: &str) -> Validation<i32, Vec<String>> {
//!     s.parse()
//!         .map(Validation::success)
//!         .unwrap_or_else(|_| Validation::failure(vec![format!("bad number: {s}")]))
//! }
//!
//! assert_eq!(
//!     traverse(vec!["1", "2"], parse),
//!     Validation::Success(vec![1, 2]),
//! );
//! assert_eq!(
//!     traverse(vec!["1", "x", "y"], parse),
//!     Validation::Failure(vec![
//!         "bad number: x".to_string(),
//!         "bad number: y".to_string(),
//!     ]),
//! );
//! ```

use crate::{Deferred, Either, Semigroup, Validation};

/// Validate every element, accumulating all failures in input order.
///
/// Implemented as a right fold with [`Validation::ap`]; the success
/// vector preserves input order.
///
/// # Example
///
/// ```
/// use watershed::traverse::traverse;
/// use watershed::Validation;
///
/// fn positive(x: i32) -> Validation<i32, Vec<String>> {
///     if x > 0 {
///         Validation::success(x)
///     } else {
///         Validation::failure(vec![format!("{x} is not positive")])
///     }
/// }
///
/// assert_eq!(traverse(vec![1, 2], positive), Validation::Success(vec![1, 2]));
/// assert!(traverse(vec![1, -2], positive).is_failure());
/// ```
pub fn traverse<T, U, E, F, I>(iter: I, mut f: F) -> Validation<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Validation<U, E>,
    E: Semigroup,
{
    let items: Vec<T> = iter.into_iter().collect();
    let mut acc: Validation<Vec<U>, E> = Validation::success(Vec::with_capacity(items.len()));
    for item in items.into_iter().rev() {
        acc = acc.ap(f(item).map(|value| {
            move |mut rest: Vec<U>| {
                rest.push(value);
                rest
            }
        }));
    }
    // The fold consed onto the back right-to-left; one reversal restores
    // input order.
    acc.map(|mut values| {
        values.reverse();
        values
    })
}

/// Sequence a collection of validations into a validation of a collection.
///
/// # Example
///
/// ```
/// use watershed::traverse::sequence;
/// use watershed::Validation;
///
/// let vals = vec![
///     Validation::<_, Vec<&str>>::success(1),
///     Validation::success(2),
/// ];
/// assert_eq!(sequence(vals), Validation::Success(vec![1, 2]));
/// ```
pub fn sequence<T, E, I>(iter: I) -> Validation<Vec<T>, E>
where
    I: IntoIterator<Item = Validation<T, E>>,
    E: Semigroup,
{
    traverse(iter, |validation| validation)
}

/// Validate every element, keeping only the combined failure.
///
/// # Example
///
/// ```
/// use watershed::traverse::traverse_discard;
/// use watershed::Validation;
///
/// let checked = traverse_discard(vec![1, -2, -3], |x| {
///     if x > 0 {
///         Validation::<_, Vec<i32>>::success(x)
///     } else {
///         Validation::failure(vec![x])
///     }
/// });
/// assert_eq!(checked, Validation::Failure(vec![-2, -3]));
/// ```
pub fn traverse_discard<T, U, E, F, I>(iter: I, mut f: F) -> Validation<(), E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Validation<U, E>,
    E: Semigroup,
{
    let items: Vec<T> = iter.into_iter().collect();
    let mut acc: Validation<(), E> = Validation::success(());
    for item in items.into_iter().rev() {
        acc = acc.ap(f(item).map(|_value| move |()| ()));
    }
    acc
}

/// Sequence a collection of validations, keeping only the combined failure.
pub fn sequence_discard<T, E, I>(iter: I) -> Validation<(), E>
where
    I: IntoIterator<Item = Validation<T, E>>,
    E: Semigroup,
{
    traverse_discard(iter, |validation| validation)
}

/// Traverse where each element expands to several outputs; the results
/// are concatenated in input order.
///
/// # Example
///
/// ```
/// use watershed::traverse::flat_traverse;
/// use watershed::Validation;
///
/// let doubled = flat_traverse(vec![1, 2], |x| {
///     Validation::<_, Vec<&str>>::success(vec![x, x * 10])
/// });
/// assert_eq!(doubled, Validation::Success(vec![1, 10, 2, 20]));
/// ```
pub fn flat_traverse<T, U, E, F, I>(iter: I, f: F) -> Validation<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Validation<Vec<U>, E>,
    E: Semigroup,
{
    traverse(iter, f).map(|nested| nested.into_iter().flatten().collect())
}

/// Transform every element fail-fast: the first `Left` stops the
/// traversal and later elements are never inspected.
///
/// # Example
///
/// ```
/// use watershed::traverse::traverse_either;
/// use watershed::Either;
///
/// let halved = traverse_either(vec![2, 4], |x: i32| {
///     if x % 2 == 0 {
///         Either::right(x / 2)
///     } else {
///         Either::left(format!("{x} is odd"))
///     }
/// });
/// assert_eq!(halved, Either::right(vec![1, 2]));
/// ```
pub fn traverse_either<T, U, L, F, I>(iter: I, mut f: F) -> Either<L, Vec<U>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Either<L, U>,
{
    let iter = iter.into_iter();
    let mut values = Vec::with_capacity(iter.size_hint().0);
    for item in iter {
        match f(item) {
            Either::Left(l) => return Either::Left(l),
            Either::Right(value) => values.push(value),
        }
    }
    Either::Right(values)
}

/// Sequence a collection of eithers fail-fast.
pub fn sequence_either<L, R, I>(iter: I) -> Either<L, Vec<R>>
where
    I: IntoIterator<Item = Either<L, R>>,
{
    traverse_either(iter, |either| either)
}

/// Fail-fast traversal that keeps only the effect.
pub fn traverse_either_discard<T, U, L, F, I>(iter: I, mut f: F) -> Either<L, ()>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Either<L, U>,
{
    for item in iter {
        if let Either::Left(l) = f(item) {
            return Either::Left(l);
        }
    }
    Either::Right(())
}

/// Run a deferred effect per element, sequentially and in declaration
/// order, collecting the results.
///
/// Fail-fast: the first error stops the chain, and elements after it are
/// never forced.
///
/// # Example
///
/// ```
/// use watershed::traverse::traverse_deferred;
/// use watershed::{Deferred, Outcome};
///
/// let doubled = traverse_deferred(vec![1, 2, 3], |x| {
///     Deferred::<i32, String>::later(move || x * 2)
/// });
/// assert_eq!(doubled.run_sync(), Outcome::Completed(vec![2, 4, 6]));
/// ```
pub fn traverse_deferred<T, U, E, F, I>(iter: I, mut f: F) -> Deferred<Vec<U>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Deferred<U, E>,
    U: Send + 'static,
    E: Send + 'static,
{
    let mut acc: Deferred<Vec<U>, E> = Deferred::pure(Vec::new());
    for item in iter {
        let step = f(item);
        acc = acc.and_then(move |mut values| {
            step.map(move |value| {
                values.push(value);
                values
            })
        });
    }
    acc
}

/// Sequence a collection of deferred effects in declaration order.
pub fn sequence_deferred<T, E, I>(iter: I) -> Deferred<Vec<T>, E>
where
    I: IntoIterator<Item = Deferred<T, E>>,
    T: Send + 'static,
    E: Send + 'static,
{
    traverse_deferred(iter, |deferred| deferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;

    fn positive(x: i32) -> Validation<i32, Vec<String>> {
        if x > 0 {
            Validation::success(x)
        } else {
            Validation::failure(vec![format!("{x} is not positive")])
        }
    }

    #[test]
    fn test_traverse_all_success_keeps_order() {
        assert_eq!(
            traverse(vec![3, 1, 2], positive),
            Validation::Success(vec![3, 1, 2])
        );
    }

    #[test]
    fn test_traverse_accumulates_in_input_order() {
        let result = traverse(vec![-1, 2, -3, -4], positive);
        assert_eq!(
            result,
            Validation::Failure(vec![
                "-1 is not positive".to_string(),
                "-3 is not positive".to_string(),
                "-4 is not positive".to_string(),
            ])
        );
    }

    #[test]
    fn test_traverse_empty() {
        assert_eq!(
            traverse(Vec::<i32>::new(), positive),
            Validation::Success(vec![])
        );
    }

    #[test]
    fn test_sequence_identity_law() {
        let xs = vec![1, 2, 3];
        let lifted: Vec<Validation<i32, Vec<String>>> =
            xs.iter().copied().map(Validation::success).collect();
        assert_eq!(sequence(lifted), Validation::Success(xs));
    }

    #[test]
    fn test_sequence_with_failures() {
        let vals = vec![
            Validation::<i32, _>::failure(vec!["first"]),
            Validation::success(2),
            Validation::failure(vec!["second"]),
        ];
        assert_eq!(sequence(vals), Validation::Failure(vec!["first", "second"]));
    }

    #[test]
    fn test_traverse_discard() {
        assert_eq!(
            traverse_discard(vec![1, 2], positive),
            Validation::Success(())
        );
        let failed = traverse_discard(vec![-1, -2], positive);
        assert_eq!(
            failed,
            Validation::Failure(vec![
                "-1 is not positive".to_string(),
                "-2 is not positive".to_string(),
            ])
        );
    }

    #[test]
    fn test_sequence_discard() {
        let vals = vec![
            Validation::<i32, Vec<&str>>::success(1),
            Validation::failure(vec!["e"]),
        ];
        assert_eq!(sequence_discard(vals), Validation::Failure(vec!["e"]));
    }

    #[test]
    fn test_flat_traverse() {
        let result = flat_traverse(vec![1, 2], |x| {
            Validation::<_, Vec<&str>>::success(vec![x, x * 10])
        });
        assert_eq!(result, Validation::Success(vec![1, 10, 2, 20]));
    }

    #[test]
    fn test_flat_traverse_accumulates() {
        let result = flat_traverse(vec![1, 2], |x| {
            Validation::<Vec<i32>, _>::failure(vec![x])
        });
        assert_eq!(result, Validation::Failure(vec![1, 2]));
    }

    #[test]
    fn test_traverse_either_success() {
        let result = traverse_either(vec![1, 2], |x| Either::<String, _>::right(x * 2));
        assert_eq!(result, Either::right(vec![2, 4]));
    }

    #[test]
    fn test_traverse_either_stops_at_first_left() {
        let mut inspected = Vec::new();
        let result = traverse_either(vec![1, -2, -3], |x| {
            inspected.push(x);
            if x > 0 {
                Either::right(x)
            } else {
                Either::left(x)
            }
        });
        assert_eq!(result, Either::left(-2));
        // -3 was never inspected: fail-fast.
        assert_eq!(inspected, vec![1, -2]);
    }

    #[test]
    fn test_sequence_either() {
        let ok = vec![Either::<&str, i32>::right(1), Either::right(2)];
        assert_eq!(sequence_either(ok), Either::right(vec![1, 2]));
        let bad = vec![Either::right(1), Either::<&str, i32>::left("e")];
        assert_eq!(sequence_either(bad), Either::left("e"));
    }

    #[test]
    fn test_traverse_either_discard() {
        let ok = traverse_either_discard(vec![1, 2], |x| Either::<String, _>::right(x));
        assert_eq!(ok, Either::right(()));
        let bad = traverse_either_discard(vec![1, 0], |x| {
            if x > 0 {
                Either::right(x)
            } else {
                Either::left("zero")
            }
        });
        assert_eq!(bad, Either::left("zero"));
    }

    #[test]
    fn test_traverse_deferred_in_order() {
        let result = traverse_deferred(vec![1, 2, 3], |x| {
            Deferred::<i32, String>::later(move || x * 2)
        });
        assert_eq!(result.run_sync(), Outcome::Completed(vec![2, 4, 6]));
    }

    #[test]
    fn test_traverse_deferred_fail_fast() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let forced = Arc::new(AtomicUsize::new(0));
        let observer = forced.clone();
        let result = traverse_deferred(vec![1, -2, 3], move |x| {
            let observer = observer.clone();
            Deferred::<i32, String>::defer(move || {
                observer.fetch_add(1, Ordering::SeqCst);
                if x > 0 {
                    Deferred::pure(x)
                } else {
                    Deferred::raise(format!("{x} is negative"))
                }
            })
        });
        assert_eq!(
            result.run_sync(),
            Outcome::Errored("-2 is negative".to_string())
        );
        // The element after the failure was never forced.
        assert_eq!(forced.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sequence_deferred() {
        let effects = vec![
            Deferred::<i32, String>::pure(1),
            Deferred::pure(2),
            Deferred::pure(3),
        ];
        assert_eq!(
            sequence_deferred(effects).run_sync(),
            Outcome::Completed(vec![1, 2, 3])
        );
    }
}
