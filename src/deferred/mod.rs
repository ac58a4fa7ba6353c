//! Deferred computations with explicit suspension points
//!
//! [`Deferred<A, E>`] is a description of work that produces an `A` or
//! fails with an `E`. Nothing runs until a runner forces it, and each run
//! re-evaluates the underlying computation (by-name semantics; memoize
//! outside this type if a result must be shared).
//!
//! Internally a deferred value is a continuation-passing chain. That is
//! what makes [`Deferred::continue_on`] meaningful: everything sequenced
//! after the shift runs as a continuation scheduled onto the target
//! [`ExecutionContext`](crate::deferred::context::ExecutionContext), so
//! later steps observe that context before producing further effects.
//!
//! # Error model
//!
//! Domain errors travel in the `E` channel and are never thrown.
//! Non-fatal panics raised inside [`Deferred::later`] /
//! [`Deferred::effect_on`] are caught at that boundary and converted
//! through [`CaughtPanic`]. A panic carrying a [`Fatal`] payload is
//! rethrown untouched: unrecoverable conditions must not be silently
//! converted into domain errors. Cancellation is a third outcome, kept
//! separate from both (see [`Outcome`] and the bracket module).
//!
//! # Examples
//!
//! ```
//! use watershed::{Deferred, Outcome};
//!
//! let program = Deferred::<i32, String>::later(|| 40)
//!     .map(|x| x + 2)
//!     .and_then(|x| Deferred::pure(x * 10));
//! assert_eq!(program.run_sync(), Outcome::Completed(420));
//! ```

pub mod bracket;
pub mod context;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use futures::channel::oneshot;

use crate::Either;

use self::bracket::CancelToken;
use self::context::ExecutionContext;

/// Completion callback threaded through a deferred chain.
pub(crate) type Callback<A, E> = Box<dyn FnOnce(Result<A, E>) + Send>;

/// The suspended run function of a deferred chain.
pub(crate) type RunFn<A, E> = Box<dyn FnOnce(CancelToken, Callback<A, E>) + Send>;

/// A suspended computation that yields an `A` or fails with an `E`.
///
/// Values of this type are inert descriptions; force one with
/// [`Deferred::run_sync`], [`Deferred::run_with`], or
/// [`Deferred::into_future`]. Combinators check the run's
/// [`CancelToken`] at every suspension point and simply stop propagating
/// once it is cancelled — observers of a cancelled run see
/// [`Outcome::Canceled`], never a fabricated error.
pub struct Deferred<A, E> {
    pub(crate) run: RunFn<A, E>,
}

impl<A, E> fmt::Debug for Deferred<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("run", &"<suspended>")
            .finish()
    }
}

/// The observable result of running a [`Deferred`].
///
/// Cancellation is not an error: a cancelled run produces neither a value
/// nor an `E`, and conflating the two would make release logic ambiguous
/// (see [`Deferred::bracket_case`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<A, E> {
    /// The computation ran to completion.
    Completed(A),
    /// The computation failed in the domain-error channel.
    Errored(E),
    /// The run was cancelled (or its continuation was dropped by a
    /// stopped execution context) before completing.
    Canceled,
}

impl<A, E> Outcome<A, E> {
    /// Returns `true` for a completed outcome.
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    /// Returns `true` for an errored outcome.
    pub fn is_errored(&self) -> bool {
        matches!(self, Outcome::Errored(_))
    }

    /// Returns `true` for a cancelled outcome.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Outcome::Canceled)
    }

    /// Convert into a `Result`, mapping cancellation to `None`.
    pub fn into_result(self) -> Option<Result<A, E>> {
        match self {
            Outcome::Completed(a) => Some(Ok(a)),
            Outcome::Errored(e) => Some(Err(e)),
            Outcome::Canceled => None,
        }
    }
}

/// A non-fatal panic caught at the [`Deferred::later`] boundary.
///
/// Only the rendered message is kept: panic payloads are not `Clone`, and
/// error channels frequently need to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtPanic {
    message: String,
}

impl CaughtPanic {
    /// The panic message, as rendered from the payload.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "opaque panic payload".to_string()
        };
        CaughtPanic { message }
    }
}

impl fmt::Display for CaughtPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caught panic: {}", self.message)
    }
}

impl std::error::Error for CaughtPanic {}

impl From<CaughtPanic> for String {
    fn from(panic: CaughtPanic) -> Self {
        panic.message
    }
}

/// Marker payload for unrecoverable conditions.
///
/// A panic raised with `std::panic::panic_any(Fatal::new(..))` passes
/// through [`Deferred::later`] uncaught instead of being converted into a
/// domain error.
///
/// # Example
///
/// ```should_panic
/// use std::panic::panic_any;
/// use watershed::{Deferred, Fatal};
///
/// let d = Deferred::<i32, String>::later(|| panic_any(Fatal::new("backing store gone")));
/// let _ = d.run_sync(); // unwinds
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fatal {
    message: String,
}

impl Fatal {
    /// Create a fatal marker with a message describing the condition.
    pub fn new(message: impl Into<String>) -> Self {
        Fatal {
            message: message.into(),
        }
    }

    /// The message describing the unrecoverable condition.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fatal: {}", self.message)
    }
}

// Runs `f`, converting a non-fatal panic into CaughtPanic. A Fatal
// payload resumes unwinding.
pub(crate) fn catch_non_fatal<A, F>(f: F) -> Result<A, CaughtPanic>
where
    F: FnOnce() -> A,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => {
            if payload.is::<Fatal>() {
                panic::resume_unwind(payload);
            }
            Err(CaughtPanic::from_payload(payload))
        }
    }
}

impl<A, E> Deferred<A, E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn from_run(
        f: impl FnOnce(CancelToken, Callback<A, E>) + Send + 'static,
    ) -> Self {
        Deferred { run: Box::new(f) }
    }

    /// Lift an already-computed value.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Deferred, Outcome};
    ///
    /// assert_eq!(Deferred::<_, String>::pure(1).run_sync(), Outcome::Completed(1));
    /// ```
    pub fn pure(value: A) -> Self {
        Deferred::from_run(move |_token, cb| cb(Ok(value)))
    }

    /// Lift an error into the failure channel.
    pub fn raise(error: E) -> Self {
        Deferred::from_run(move |_token, cb| cb(Err(error)))
    }

    /// Lift a `Result`.
    pub fn from_result(result: Result<A, E>) -> Self {
        Deferred::from_run(move |_token, cb| cb(result))
    }

    /// Suspend a factory that builds a deferred value per run.
    ///
    /// The factory runs again on every force, so side effects inside it
    /// repeat — that is the by-name contract.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    /// use watershed::{Deferred, Outcome};
    ///
    /// let runs = Arc::new(AtomicUsize::new(0));
    /// let make = {
    ///     let runs = runs.clone();
    ///     move || {
    ///         let runs = runs.clone();
    ///         Deferred::<usize, String>::defer(move || {
    ///             Deferred::pure(runs.fetch_add(1, Ordering::SeqCst))
    ///         })
    ///     }
    /// };
    /// assert_eq!(make().run_sync(), Outcome::Completed(0));
    /// assert_eq!(make().run_sync(), Outcome::Completed(1));
    /// ```
    pub fn defer<F>(f: F) -> Self
    where
        F: FnOnce() -> Deferred<A, E> + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            if token.is_cancelled() {
                return;
            }
            (f().run)(token, cb)
        })
    }

    /// Suspend a plain computation, catching non-fatal panics into the
    /// error channel.
    ///
    /// A panic whose payload is [`Fatal`] is rethrown instead of caught.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Deferred, Outcome};
    ///
    /// let d = Deferred::<i32, String>::later(|| panic!("bad parse"));
    /// assert_eq!(d.run_sync(), Outcome::Errored("bad parse".to_string()));
    /// ```
    pub fn later<F>(f: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
        E: From<CaughtPanic>,
    {
        Deferred::from_run(move |token, cb| {
            if token.is_cancelled() {
                return;
            }
            match catch_non_fatal(f) {
                Ok(value) => cb(Ok(value)),
                Err(caught) => cb(Err(E::from(caught))),
            }
        })
    }

    /// Suspend a computation that already reports failure as a value.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Deferred, Outcome};
    ///
    /// let d = Deferred::later_or_raise(|| "7".parse::<i32>().map_err(|e| e.to_string()));
    /// assert_eq!(d.run_sync(), Outcome::Completed(7));
    /// ```
    pub fn later_or_raise<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<A, E> + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            if token.is_cancelled() {
                return;
            }
            cb(f())
        })
    }

    /// Suspend a computation and run it on the given context.
    ///
    /// Like [`Deferred::later`] for panic handling, but the work is
    /// scheduled through `ctx` instead of running wherever the chain
    /// happens to be.
    pub fn effect_on<F>(ctx: Arc<dyn ExecutionContext>, f: F) -> Self
    where
        F: FnOnce() -> A + Send + 'static,
        E: From<CaughtPanic>,
    {
        Deferred::from_run(move |token, cb| {
            ctx.execute(Box::new(move || {
                if token.is_cancelled() {
                    return;
                }
                match catch_non_fatal(f) {
                    Ok(value) => cb(Ok(value)),
                    Err(caught) => cb(Err(E::from(caught))),
                }
            }));
        })
    }

    /// Transform the produced value.
    pub fn map<B, F>(self, f: F) -> Deferred<B, E>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            (self.run)(token, Box::new(move |result| cb(result.map(f))));
        })
    }

    /// Transform the error.
    pub fn map_err<E2, F>(self, f: F) -> Deferred<A, E2>
    where
        E2: Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            (self.run)(token, Box::new(move |result| cb(result.map_err(f))));
        })
    }

    /// Sequence a dependent computation after this one.
    ///
    /// The continuation runs wherever this computation finished — after a
    /// [`Deferred::continue_on`], that is the shifted context.
    pub fn and_then<B, F>(self, f: F) -> Deferred<B, E>
    where
        B: Send + 'static,
        F: FnOnce(A) -> Deferred<B, E> + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            let next_token = token.clone();
            (self.run)(
                token,
                Box::new(move |result| match result {
                    Ok(value) => {
                        if next_token.is_cancelled() {
                            return;
                        }
                        (f(value).run)(next_token, cb)
                    }
                    Err(error) => cb(Err(error)),
                }),
            );
        })
    }

    /// Expose the outcome as an [`Either`] in the value channel.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Deferred, Either, Outcome};
    ///
    /// let d = Deferred::<i32, String>::raise("nope".to_string()).attempt();
    /// assert_eq!(
    ///     d.run_sync(),
    ///     Outcome::Completed(Either::left("nope".to_string())),
    /// );
    /// ```
    pub fn attempt(self) -> Deferred<Either<E, A>, E> {
        Deferred::from_run(move |token, cb| {
            (self.run)(
                token,
                Box::new(move |result| cb(Ok(Either::from_result(result)))),
            );
        })
    }

    /// Recover from an error with a fallback computation.
    pub fn handle_error_with<F>(self, f: F) -> Deferred<A, E>
    where
        F: FnOnce(E) -> Deferred<A, E> + Send + 'static,
    {
        Deferred::from_run(move |token, cb| {
            let next_token = token.clone();
            (self.run)(
                token,
                Box::new(move |result| match result {
                    Ok(value) => cb(Ok(value)),
                    Err(error) => {
                        if next_token.is_cancelled() {
                            return;
                        }
                        (f(error).run)(next_token, cb)
                    }
                }),
            );
        })
    }

    /// Shift the rest of the chain onto another execution context.
    ///
    /// Every operation sequenced after this call runs as a continuation
    /// scheduled through `ctx`, so
    /// [`current_context`](crate::deferred::context::current_context)
    /// observes `ctx`'s id from the next step onward.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use watershed::deferred::context::{current_context, ExecutionContext, ThreadContext};
    /// use watershed::{Deferred, Outcome};
    ///
    /// let ctx = Arc::new(ThreadContext::new("db-pool").unwrap());
    /// let id = ctx.id().clone();
    /// let observed = Deferred::<(), String>::pure(())
    ///     .continue_on(ctx)
    ///     .and_then(|_| Deferred::later(|| current_context()));
    /// assert_eq!(observed.run_sync(), Outcome::Completed(Some(id)));
    /// ```
    pub fn continue_on(self, ctx: Arc<dyn ExecutionContext>) -> Deferred<A, E> {
        Deferred::from_run(move |token, cb| {
            let next_token = token.clone();
            (self.run)(
                token,
                Box::new(move |result| {
                    ctx.execute(Box::new(move || {
                        if next_token.is_cancelled() {
                            return;
                        }
                        cb(result)
                    }));
                }),
            );
        })
    }

    /// Run to completion on the current thread with a private token.
    ///
    /// Blocks while continuations execute on other contexts. Do not call
    /// from inside a single-threaded context the chain shifts onto — the
    /// wait and the continuation would need the same thread.
    pub fn run_sync(self) -> Outcome<A, E> {
        self.run_with(&CancelToken::new())
    }

    /// Run to completion under an externally supplied cancellation token.
    ///
    /// Returns [`Outcome::Canceled`] when the token fires before the
    /// chain completes, or when a continuation was dropped (for example
    /// by a stopped [`ThreadContext`](crate::deferred::context::ThreadContext)).
    pub fn run_with(self, token: &CancelToken) -> Outcome<A, E> {
        let (tx, rx) = mpsc::channel();
        (self.run)(
            token.clone(),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        match rx.recv() {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(error)) => Outcome::Errored(error),
            // The final callback was dropped without firing: the chain
            // was cancelled or abandoned mid-flight.
            Err(_) => Outcome::Canceled,
        }
    }

    /// Bridge into a `Future`, forcing the chain on first poll.
    ///
    /// # Example
    ///
    /// ```
    /// use watershed::{Deferred, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let d = Deferred::<i32, String>::later(|| 21).map(|x| x * 2);
    /// assert_eq!(d.into_future().await, Outcome::Completed(42));
    /// # });
    /// ```
    pub fn into_future(self) -> impl std::future::Future<Output = Outcome<A, E>> {
        async move {
            let (tx, rx) = oneshot::channel();
            (self.run)(
                CancelToken::new(),
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            );
            match rx.await {
                Ok(Ok(value)) => Outcome::Completed(value),
                Ok(Err(error)) => Outcome::Errored(error),
                Err(_) => Outcome::Canceled,
            }
        }
    }
}
