//! Resource-safe bracket protocol with three-way exit classification
//!
//! [`Deferred::bracket_case`] acquires a resource, uses it, and
//! guarantees exactly one release — even when external cancellation races
//! natural completion. The release step receives an [`ExitCase`] telling
//! it *why* it is running: normal completion, a domain error, or
//! cancellation. Cancellation is not an error and must never be presented
//! to release logic as one.
//!
//! # Race arbitration
//!
//! The only shared mutable state is a single-assignment exit cell updated
//! with compare-and-set: the first of {complete, error, cancel} to arrive
//! wins, and the loser does nothing. The resource itself sits in a
//! take-once slot, so release cannot double-fire even in the presence of
//! a bug in the arbitration above it.
//!
//! # Example
//!
//! ```
//! use watershed::{Deferred, ExitCase, Outcome};
//!
//! let result = Deferred::<&str, String>::pure("conn")
//!     .bracket_case(
//!         |conn| Deferred::later(move || format!("used {conn}")),
//!         |conn, exit| {
//!             Deferred::later(move || {
//!                 assert_eq!(exit, ExitCase::Completed);
//!                 drop(conn);
//!             })
//!         },
//!     );
//! assert_eq!(result.run_sync(), Outcome::Completed("used conn".to_string()));
//! ```

use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{Callback, Deferred, Outcome};

// ============================================================================
// ExitCase
// ============================================================================

/// Why a bracket's release step is running.
///
/// Passed to the release function and then discarded; it is never stored
/// beyond the release call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitCase<E> {
    /// The use step produced a value.
    Completed,
    /// The use step failed with a domain error.
    Errored(E),
    /// The run was cancelled while the resource was held.
    Canceled,
}

// ============================================================================
// CancelToken
// ============================================================================

type CancelListener = Box<dyn FnOnce() + Send>;

struct TokenInner {
    cancelled: AtomicBool,
    listeners: Mutex<Vec<CancelListener>>,
}

/// Shared cancellation signal for a deferred run.
///
/// Cloning shares the signal. [`CancelToken::cancel`] is idempotent:
/// listeners fire at most once, on the cancelling thread; a listener
/// registered after cancellation fires immediately on the registering
/// thread.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        CancelToken {
            inner: Arc::new(TokenInner {
                cancelled: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Cancel the run. Idempotent; the first call fires all registered
    /// listeners on the calling thread.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let listeners = {
            let mut guard = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            mem::take(&mut *guard)
        };
        for listener in listeners {
            listener();
        }
    }

    /// Register a listener fired once on cancellation.
    ///
    /// If the token is already cancelled, the listener runs immediately.
    pub fn on_cancel(&self, listener: impl FnOnce() + Send + 'static) {
        let mut guard = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Check under the lock: cancel() sets the flag before taking
        // the listener list, so either we see the flag or our push is
        // seen by the take.
        if self.inner.cancelled.load(Ordering::Acquire) {
            drop(guard);
            listener();
        } else {
            guard.push(Box::new(listener));
        }
    }
}

// ============================================================================
// ExitCell - single-assignment race arbiter
// ============================================================================

// Single-assignment exit classification arbiter. Values are the states a
// bracketed resource can end in; PENDING is the only state that can
// transition, and it transitions exactly once.
const PENDING: u8 = 0;
const COMPLETED: u8 = 1;
const ERRORED: u8 = 2;
const CANCELED: u8 = 3;

struct ExitCell(AtomicU8);

impl ExitCell {
    fn new() -> Self {
        ExitCell(AtomicU8::new(PENDING))
    }

    // First writer wins; everyone else sees false and must stand down.
    fn try_assign(&self, state: u8) -> bool {
        self.0
            .compare_exchange(PENDING, state, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

type ReleaseFn<A, E> = Box<dyn FnOnce(A, ExitCase<E>) -> Deferred<(), E> + Send>;
type ReleaseSlot<A, E> = Arc<Mutex<Option<(A, ReleaseFn<A, E>)>>>;

// Take-once execution of the release step. The slot guarantees at most
// one invocation independently of the exit cell above it.
fn run_release<A, E>(slot: &ReleaseSlot<A, E>, exit: ExitCase<E>) -> Result<(), E>
where
    A: Send + 'static,
    E: Send + 'static,
{
    let taken = slot
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match taken {
        Some((resource, release)) => {
            // Release itself is not cancellable: it runs under a private
            // token to completion.
            match release(resource, exit).run_with(&CancelToken::new()) {
                Outcome::Completed(()) => Ok(()),
                Outcome::Errored(error) => Err(error),
                Outcome::Canceled => Ok(()),
            }
        }
        None => Ok(()),
    }
}

fn warn_release_failure<E: fmt::Debug>(error: &E) {
    #[cfg(feature = "tracing")]
    tracing::warn!("resource release failed: {:?}", error);
    #[cfg(not(feature = "tracing"))]
    eprintln!("resource release failed: {:?}", error);
}

// ============================================================================
// bracket_case / guarantee
// ============================================================================

impl<A, E> Deferred<A, E>
where
    A: Clone + Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    /// Acquire this computation's value as a resource, use it, and
    /// release it exactly once with an [`ExitCase`] describing how the
    /// use step ended.
    ///
    /// Exit priority when paths race: cancellation observed before
    /// natural completion wins; otherwise an error from `use_fn` wins
    /// over its success. Whichever path wins, the others do nothing —
    /// arbitration is a single compare-and-set.
    ///
    /// Error policy mirrors the propagation contract:
    /// - use failed: release runs with `Errored`, then the original
    ///   error propagates; a release error on this path is logged.
    /// - use succeeded: release runs with `Completed`, then the value
    ///   propagates; a release error on this path replaces the value.
    /// - cancelled: release runs with `Canceled`; nothing propagates
    ///   (observers see [`Outcome::Canceled`]); a release error is
    ///   logged.
    ///
    /// Acquisition failure skips `use_fn` and `release` entirely.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    /// use watershed::{Deferred, ExitCase, Outcome};
    ///
    /// let released = Arc::new(AtomicUsize::new(0));
    /// let observer = released.clone();
    /// let result = Deferred::<i32, String>::pure(7)
    ///     .bracket_case(
    ///         |_conn| Deferred::<i32, String>::raise("query failed".to_string()),
    ///         move |_conn, exit| {
    ///             Deferred::later(move || {
    ///                 assert!(matches!(exit, ExitCase::Errored(_)));
    ///                 observer.fetch_add(1, Ordering::SeqCst);
    ///             })
    ///         },
    ///     );
    /// assert_eq!(result.run_sync(), Outcome::Errored("query failed".to_string()));
    /// assert_eq!(released.load(Ordering::SeqCst), 1);
    /// ```
    pub fn bracket_case<B, U, R>(self, use_fn: U, release: R) -> Deferred<B, E>
    where
        B: Send + 'static,
        U: FnOnce(A) -> Deferred<B, E> + Send + 'static,
        R: FnOnce(A, ExitCase<E>) -> Deferred<(), E> + Send + 'static,
    {
        Deferred::from_run(move |token, cb: Callback<B, E>| {
            let outer = token.clone();
            (self.run)(
                token,
                Box::new(move |acquired| {
                    let resource = match acquired {
                        Ok(resource) => resource,
                        Err(error) => return cb(Err(error)),
                    };

                    let exit = Arc::new(ExitCell::new());
                    let slot: ReleaseSlot<A, E> = Arc::new(Mutex::new(Some((
                        resource.clone(),
                        Box::new(release) as ReleaseFn<A, E>,
                    ))));

                    {
                        let exit = exit.clone();
                        let slot = slot.clone();
                        outer.on_cancel(move || {
                            if exit.try_assign(CANCELED) {
                                if let Err(release_err) =
                                    run_release(&slot, ExitCase::Canceled)
                                {
                                    warn_release_failure(&release_err);
                                }
                            }
                        });
                    }

                    (use_fn(resource).run)(
                        outer.clone(),
                        Box::new(move |used| match used {
                            Ok(value) => {
                                if exit.try_assign(COMPLETED) {
                                    match run_release(&slot, ExitCase::Completed) {
                                        Ok(()) => cb(Ok(value)),
                                        Err(release_err) => cb(Err(release_err)),
                                    }
                                }
                            }
                            Err(error) => {
                                if exit.try_assign(ERRORED) {
                                    if let Err(release_err) = run_release(
                                        &slot,
                                        ExitCase::Errored(error.clone()),
                                    ) {
                                        warn_release_failure(&release_err);
                                    }
                                    cb(Err(error));
                                }
                            }
                        }),
                    );
                }),
            );
        })
    }
}

impl<A, E> Deferred<A, E>
where
    A: Send + 'static,
    E: Clone + fmt::Debug + Send + 'static,
{
    /// Run a finalizer after this computation, whatever its exit.
    ///
    /// The resource-less special case of [`Deferred::bracket_case`].
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    /// use watershed::{Deferred, Outcome};
    ///
    /// let finalized = Arc::new(AtomicUsize::new(0));
    /// let observer = finalized.clone();
    /// let result = Deferred::<i32, String>::pure(1).guarantee(move |_exit| {
    ///     Deferred::later(move || {
    ///         observer.fetch_add(1, Ordering::SeqCst);
    ///     })
    /// });
    /// assert_eq!(result.run_sync(), Outcome::Completed(1));
    /// assert_eq!(finalized.load(Ordering::SeqCst), 1);
    /// ```
    pub fn guarantee<F>(self, finalizer: F) -> Deferred<A, E>
    where
        F: FnOnce(ExitCase<E>) -> Deferred<(), E> + Send + 'static,
    {
        Deferred::<(), E>::pure(()).bracket_case(move |()| self, move |(), exit| finalizer(exit))
    }
}
