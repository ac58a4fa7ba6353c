//! # Watershed
//!
//! > *"Where independent streams meet, nothing is lost"*
//!
//! A Rust library for accumulating validation, positional alignment, and
//! cancellation-safe deferred effects.
//!
//! ## Philosophy
//!
//! Errors are values and every branch is accounted for. Each sum type
//! here exposes one elimination form (`fold`), everything else derives
//! from it, and the combinators never drop information silently:
//! validation accumulates instead of short-circuiting, alignment tags
//! unmatched tails instead of truncating, and the bracket protocol tells
//! release code exactly why it is running.
//!
//! ## Quick Example
//!
//! ```rust
//! use watershed::Validation;
//!
//! fn validate_email(email: &str) -> Validation<String, Vec<String>> {
//!     if email.contains('@') {
//!         Validation::success(email.to_string())
//!     } else {
//!         Validation::failure(vec![format!("{email} has no @")])
//!     }
//! }
//!
//! fn validate_age(age: i32) -> Validation<i32, Vec<String>> {
//!     if age >= 18 {
//!         Validation::success(age)
//!     } else {
//!         Validation::failure(vec!["must be 18 or older".to_string()])
//!     }
//! }
//!
//! // Both checks run; both errors are reported at once.
//! let result = Validation::<(String, i32), Vec<String>>::all((
//!     validate_email("user.example.com"),
//!     validate_age(16),
//! ));
//! assert_eq!(
//!     result,
//!     Validation::Failure(vec![
//!         "user.example.com has no @".to_string(),
//!         "must be 18 or older".to_string(),
//!     ]),
//! );
//! ```
//!
//! ## Modules
//!
//! - [`either`] — fail-fast sum type, `fold`-derived combinators
//! - [`validation`] — accumulating counterpart, [`Semigroup`]-driven
//! - [`ior`] / [`align`] — inclusive-or tagging and positional alignment
//! - [`traverse`] — traverse/sequence for both families
//! - [`deferred`] — suspended effects, execution contexts, and the
//!   bracket protocol
//! - [`semigroup`] / [`monoid`] / [`nonempty`] — the supporting algebra

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod align;
pub mod deferred;
pub mod either;
pub mod ior;
pub mod monoid;
pub mod nonempty;
pub mod semigroup;
pub mod traverse;
pub mod validation;

// Re-exports
pub use deferred::bracket::{CancelToken, ExitCase};
pub use deferred::context::{ContextId, ExecutionContext};
pub use deferred::{CaughtPanic, Deferred, Fatal, Outcome};
pub use either::Either;
pub use ior::Ior;
pub use monoid::Monoid;
pub use nonempty::NonEmptyVec;
pub use semigroup::Semigroup;
pub use validation::Validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::deferred::bracket::{CancelToken, ExitCase};
    pub use crate::deferred::context::{current_context, ContextId, ExecutionContext};
    pub use crate::deferred::{CaughtPanic, Deferred, Fatal, Outcome};
    pub use crate::either::Either;
    pub use crate::ior::Ior;
    pub use crate::monoid::Monoid;
    pub use crate::nonempty::NonEmptyVec;
    pub use crate::semigroup::Semigroup;
    pub use crate::validation::Validation;
}
