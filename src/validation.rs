//! Validation type for accumulating errors
//!
//! `Validation<T, E>` has the same shape as a result but a different
//! applicative composition law: combining two failures merges their error
//! payloads with [`Semigroup::combine`] instead of dropping one. That is
//! the defining difference from [`Either`](crate::Either), whose
//! composition is fail-fast.
//!
//! # Accumulation order
//!
//! Combining N failures left-to-right reports the errors in the order the
//! values appear. This only holds when the error semigroup is associative
//! (see [`Semigroup`]); with `Vec` or [`NonEmptyVec`] errors, the output
//! order is the input order.
//!
//! # Examples
//!
//! ## Accumulating independent failures
//!
//! ```
//! use watershed::Validation;
//!
//! let v1 = Validation::<i32, _>::failure(vec!["too small"]);
//! let v2 = Validation::<i32, _>::failure(vec!["not even"]);
//! assert_eq!(v1.and(v2), Validation::Failure(vec!["too small", "not even"]));
//! ```
//!
//! ## Validating several fields at once
//!
//! ```
//! use watershed::Validation;
//!
//! fn name(s: &str) -> Validation<String, Vec<String>> {
//!     if s.is_empty() {
//!         Validation::failure(vec!["name is empty".to_string()])
//!     } else {
//!         Validation::success(s.to_string())
//!     }
//! }
//!
//! fn age(n: i32) -> Validation<i32, Vec<String>> {
//!     if n < 0 {
//!         Validation::failure(vec!["age is negative".to_string()])
//!     } else {
//!         Validation::success(n)
//!     }
//! }
//!
//! let ok = Validation::<(String, i32), Vec<String>>::all((name("ada"), age(36)));
//! assert_eq!(ok, Validation::Success(("ada".to_string(), 36)));
//!
//! let bad = Validation::<(String, i32), Vec<String>>::all((name(""), age(-1)));
//! assert!(bad.is_failure());
//! ```

use crate::{Either, NonEmptyVec, Semigroup};

/// A validation that either succeeds with a value or fails with
/// accumulated errors.
///
/// A single failure always fails the whole combination; what distinguishes
/// this type is that *several* failures are all kept, merged through the
/// error type's [`Semigroup`].
///
/// # Type Parameters
///
/// * `T` - success value
/// * `E` - error payload; needs `Semigroup` only for the accumulating
///   operations (`ap`, `and`, `combine`, `all`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation<T, E> {
    /// Successful validation holding a value.
    Success(T),
    /// Failed validation holding the (possibly accumulated) errors.
    Failure(E),
}

impl<T, E> Validation<T, E> {
    /// Create a successful validation.
    #[inline]
    pub fn success(value: T) -> Self {
        Validation::Success(value)
    }

    /// Create a failed validation.
    #[inline]
    pub fn failure(error: E) -> Self {
        Validation::Failure(error)
    }

    /// Lift a `Result` into a validation.
    #[inline]
    pub fn from_result(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Validation::Success(value),
            Err(error) => Validation::Failure(error),
        }
    }

    /// Lift an `Option`, supplying the error for the `None` case.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let missing: Option<i32> = None;
    /// let v = Validation::from_option(missing, || "absent");
    /// assert_eq!(v, Validation::Failure("absent"));
    /// ```
    #[inline]
    pub fn from_option<F>(option: Option<T>, error: F) -> Self
    where
        F: FnOnce() -> E,
    {
        match option {
            Some(value) => Validation::Success(value),
            None => Validation::Failure(error()),
        }
    }

    /// Lift an [`Either`], mapping `Right` to `Success`.
    #[inline]
    pub fn from_either(either: Either<E, T>) -> Self {
        either.into_validation()
    }

    /// Convert to a `Result`.
    #[inline]
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Validation::Success(value) => Ok(value),
            Validation::Failure(error) => Err(error),
        }
    }

    /// Convert to an [`Either`], mapping `Success` to `Right`.
    #[inline]
    pub fn into_either(self) -> Either<E, T> {
        self.fold(Either::Left, Either::Right)
    }

    /// Returns `true` for a successful validation.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Validation::Success(_))
    }

    /// Returns `true` for a failed validation.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Validation::Failure(_))
    }

    /// Eliminate the sum by handling both cases, failure first.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let v = Validation::<i32, String>::success(2);
    /// assert_eq!(v.fold(|e| e.len() as i32, |t| t * 10), 20);
    /// ```
    #[inline]
    pub fn fold<C, FE, FT>(self, failure_fn: FE, success_fn: FT) -> C
    where
        FE: FnOnce(E) -> C,
        FT: FnOnce(T) -> C,
    {
        match self {
            Validation::Success(value) => success_fn(value),
            Validation::Failure(error) => failure_fn(error),
        }
    }

    /// Transform both sides at once.
    #[inline]
    pub fn bimap<T2, E2, FE, FT>(self, failure_fn: FE, success_fn: FT) -> Validation<T2, E2>
    where
        FE: FnOnce(E) -> E2,
        FT: FnOnce(T) -> T2,
    {
        self.fold(
            |e| Validation::Failure(failure_fn(e)),
            |t| Validation::Success(success_fn(t)),
        )
    }

    /// Transform the success value if present.
    #[inline]
    pub fn map<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        self.bimap(|e| e, f)
    }

    /// Transform the error payload if present.
    #[inline]
    pub fn map_err<E2, F>(self, f: F) -> Validation<T, E2>
    where
        F: FnOnce(E) -> E2,
    {
        self.bimap(f, |t| t)
    }

    /// Chain a dependent validation; fail-fast, no accumulation.
    ///
    /// Use this when the next check cannot even be expressed until this
    /// one has succeeded; use [`Validation::and`] / [`Validation::ap`] for
    /// independent checks.
    #[inline]
    pub fn and_then<U, F>(self, f: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> Validation<U, E>,
    {
        self.fold(Validation::Failure, f)
    }

    /// Extract the success value, or compute one from the errors.
    #[inline]
    pub fn get_or_else<F>(self, f: F) -> T
    where
        F: FnOnce(E) -> T,
    {
        self.fold(f, |t| t)
    }

    /// Whether the success value satisfies a predicate; `false` on failure.
    #[inline]
    pub fn exists<F>(&self, predicate: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        match self {
            Validation::Success(value) => predicate(value),
            Validation::Failure(_) => false,
        }
    }

    /// Exchange the sides.
    #[inline]
    pub fn swap(self) -> Validation<E, T> {
        self.fold(Validation::Success, Validation::Failure)
    }

    /// Upgrade a lone error into a one-element [`NonEmptyVec`], making the
    /// validation ready for accumulation.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{NonEmptyVec, Validation};
    ///
    /// let v = Validation::<i32, _>::failure("nope").into_accumulating();
    /// assert_eq!(v, Validation::Failure(NonEmptyVec::singleton("nope")));
    /// ```
    #[inline]
    pub fn into_accumulating(self) -> Validation<T, NonEmptyVec<E>> {
        self.map_err(NonEmptyVec::singleton)
    }

    /// Fall back to another validation on failure, dropping this error.
    ///
    /// Unlike [`Validation::find_valid`] the first error is discarded.
    #[inline]
    pub fn or_else<F>(self, f: F) -> Validation<T, E>
    where
        F: FnOnce() -> Validation<T, E>,
    {
        self.fold(|_| f(), Validation::Success)
    }
}

impl<T, E: Semigroup> Validation<T, E> {
    /// Apply a wrapped function to the success value, accumulating errors.
    ///
    /// - both sides successful: apply the function;
    /// - exactly one side failed: propagate that failure;
    /// - both sides failed: combine the errors, **function side first**.
    ///
    /// The chosen order makes a right-to-left traversal fold report errors
    /// in input order; see [`crate::traverse::traverse`].
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::monoid::Sum;
    /// use watershed::Validation;
    ///
    /// let value = Validation::<i32, _>::failure(Sum(10));
    /// let func = Validation::<fn(i32) -> i32, _>::failure(Sum(5));
    /// assert_eq!(value.ap(func), Validation::Failure(Sum(15)));
    /// ```
    pub fn ap<U, F>(self, f: Validation<F, E>) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match (self, f) {
            (Validation::Success(value), Validation::Success(func)) => {
                Validation::Success(func(value))
            }
            (Validation::Failure(e), Validation::Success(_)) => Validation::Failure(e),
            (Validation::Success(_), Validation::Failure(fe)) => Validation::Failure(fe),
            (Validation::Failure(e), Validation::Failure(fe)) => {
                Validation::Failure(fe.combine(e))
            }
        }
    }

    /// Zip with another independent validation, accumulating errors.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let v1 = Validation::<i32, Vec<&str>>::failure(vec!["a"]);
    /// let v2 = Validation::<i32, Vec<&str>>::failure(vec!["b"]);
    /// assert_eq!(v1.and(v2), Validation::Failure(vec!["a", "b"]));
    /// ```
    pub fn and<U>(self, other: Validation<U, E>) -> Validation<(T, U), E> {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => Validation::Success((a, b)),
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) => Validation::Failure(e),
            (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Accumulating alternative: keep this on success, otherwise try the
    /// other and combine the errors when both fail.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let a = Validation::<i32, Vec<&str>>::failure(vec!["a"]);
    /// let b = Validation::<i32, Vec<&str>>::failure(vec!["b"]);
    /// assert_eq!(a.find_valid(|| b), Validation::Failure(vec!["a", "b"]));
    /// ```
    pub fn find_valid<F>(self, that: F) -> Validation<T, E>
    where
        F: FnOnce() -> Validation<T, E>,
    {
        self.fold(
            |e| that().map_err(|ee| e.combine(ee)),
            Validation::Success,
        )
    }

    /// Combine with another validation of the same value type.
    ///
    /// Both successful: combine the values. Both failed: combine the
    /// errors. Mixed: the failure wins.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let good = Validation::<Vec<i32>, Vec<&str>>::success(vec![1]);
    /// let bad = Validation::<Vec<i32>, Vec<&str>>::failure(vec!["e"]);
    /// assert_eq!(good.combine(bad), Validation::Failure(vec!["e"]));
    /// ```
    pub fn combine(self, other: Validation<T, E>) -> Validation<T, E>
    where
        T: Semigroup,
    {
        match (self, other) {
            (Validation::Success(a), Validation::Success(b)) => {
                Validation::Success(a.combine(b))
            }
            (Validation::Failure(e1), Validation::Failure(e2)) => {
                Validation::Failure(e1.combine(e2))
            }
            (Validation::Failure(e), _) => Validation::Failure(e),
            (_, Validation::Failure(e)) => Validation::Failure(e),
        }
    }

    /// Combine every validation in a `Vec`, accumulating all errors in
    /// input order.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let all_good = Validation::all_vec(vec![
    ///     Validation::<_, Vec<&str>>::success(1),
    ///     Validation::success(2),
    /// ]);
    /// assert_eq!(all_good, Validation::Success(vec![1, 2]));
    ///
    /// let mixed = Validation::all_vec(vec![
    ///     Validation::<i32, _>::failure(vec!["first"]),
    ///     Validation::success(2),
    ///     Validation::failure(vec!["second"]),
    /// ]);
    /// assert_eq!(mixed, Validation::Failure(vec!["first", "second"]));
    /// ```
    pub fn all_vec(validations: Vec<Validation<T, E>>) -> Validation<Vec<T>, E> {
        let mut values = Vec::with_capacity(validations.len());
        let mut errors: Option<E> = None;
        for validation in validations {
            match validation {
                Validation::Success(value) => values.push(value),
                Validation::Failure(error) => {
                    errors = Some(match errors {
                        Some(acc) => acc.combine(error),
                        None => error,
                    });
                }
            }
        }
        match errors {
            None => Validation::Success(values),
            Some(error) => Validation::Failure(error),
        }
    }
}

impl<T, E> Validation<T, E> {
    /// Combine a tuple of heterogeneous validations, accumulating errors.
    ///
    /// Works for tuples up to arity 6 via the [`ValidateAll`] trait.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::Validation;
    ///
    /// let combined = Validation::<(i32, &str), Vec<&str>>::all((
    ///     Validation::<_, Vec<&str>>::success(1),
    ///     Validation::<_, Vec<&str>>::success("two"),
    /// ));
    /// assert_eq!(combined, Validation::Success((1, "two")));
    /// ```
    pub fn all<V, E2>(validations: V) -> Validation<V::Output, E2>
    where
        E2: Semigroup,
        V: ValidateAll<E2>,
    {
        validations.validate_all()
    }
}

impl<T, E> From<Result<T, E>> for Validation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Validation::from_result(result)
    }
}

/// Combining a tuple of validations into a validation of a tuple.
///
/// Implemented for tuples up to arity 6; errors accumulate left-to-right.
pub trait ValidateAll<E: Semigroup> {
    /// The tuple of success values.
    type Output;

    /// Combine all components, accumulating errors.
    fn validate_all(self) -> Validation<Self::Output, E>;
}

macro_rules! impl_validate_all {
    ($T1:ident) => {
        impl<E: Semigroup, $T1> ValidateAll<E> for (Validation<$T1, E>,) {
            type Output = ($T1,);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0.map(|a| (a,))
            }
        }
    };
    ($T1:ident, $T2:ident) => {
        impl<E: Semigroup, $T1, $T2> ValidateAll<E> for (Validation<$T1, E>, Validation<$T2, E>) {
            type Output = ($T1, $T2);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0.and(self.1)
            }
        }
    };
    ($T1:ident, $T2:ident, $T3:ident) => {
        impl<E: Semigroup, $T1, $T2, $T3> ValidateAll<E>
            for (Validation<$T1, E>, Validation<$T2, E>, Validation<$T3, E>)
        {
            type Output = ($T1, $T2, $T3);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0
                    .and(self.1)
                    .and(self.2)
                    .map(|((a, b), c)| (a, b, c))
            }
        }
    };
    ($T1:ident, $T2:ident, $T3:ident, $T4:ident) => {
        impl<E: Semigroup, $T1, $T2, $T3, $T4> ValidateAll<E>
            for (
                Validation<$T1, E>,
                Validation<$T2, E>,
                Validation<$T3, E>,
                Validation<$T4, E>,
            )
        {
            type Output = ($T1, $T2, $T3, $T4);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0
                    .and(self.1)
                    .and(self.2)
                    .and(self.3)
                    .map(|(((a, b), c), d)| (a, b, c, d))
            }
        }
    };
    ($T1:ident, $T2:ident, $T3:ident, $T4:ident, $T5:ident) => {
        impl<E: Semigroup, $T1, $T2, $T3, $T4, $T5> ValidateAll<E>
            for (
                Validation<$T1, E>,
                Validation<$T2, E>,
                Validation<$T3, E>,
                Validation<$T4, E>,
                Validation<$T5, E>,
            )
        {
            type Output = ($T1, $T2, $T3, $T4, $T5);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0
                    .and(self.1)
                    .and(self.2)
                    .and(self.3)
                    .and(self.4)
                    .map(|((((a, b), c), d), e)| (a, b, c, d, e))
            }
        }
    };
    ($T1:ident, $T2:ident, $T3:ident, $T4:ident, $T5:ident, $T6:ident) => {
        impl<E: Semigroup, $T1, $T2, $T3, $T4, $T5, $T6> ValidateAll<E>
            for (
                Validation<$T1, E>,
                Validation<$T2, E>,
                Validation<$T3, E>,
                Validation<$T4, E>,
                Validation<$T5, E>,
                Validation<$T6, E>,
            )
        {
            type Output = ($T1, $T2, $T3, $T4, $T5, $T6);

            fn validate_all(self) -> Validation<Self::Output, E> {
                self.0
                    .and(self.1)
                    .and(self.2)
                    .and(self.3)
                    .and(self.4)
                    .and(self.5)
                    .map(|(((((a, b), c), d), e), f)| (a, b, c, d, e, f))
            }
        }
    };
}

impl_validate_all!(T1);
impl_validate_all!(T1, T2);
impl_validate_all!(T1, T2, T3);
impl_validate_all!(T1, T2, T3, T4);
impl_validate_all!(T1, T2, T3, T4, T5);
impl_validate_all!(T1, T2, T3, T4, T5, T6);
