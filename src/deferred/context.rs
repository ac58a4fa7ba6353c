//! Execution contexts for deferred continuations
//!
//! A [`Deferred`](crate::Deferred) chain can shift itself between named
//! execution contexts with
//! [`continue_on`](crate::Deferred::continue_on). The context is a
//! capability passed in by the caller, never hard-wired: anything
//! implementing [`ExecutionContext`] can host continuations.
//!
//! Context identity is a structural [`ContextId`] token. Implementations
//! install their id around every task they run, and
//! [`current_context`] reads it back — assertions compare tokens, never
//! thread names or other runtime metadata.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use watershed::deferred::context::{current_context, ExecutionContext, ThreadContext};
//! use watershed::{Deferred, Outcome};
//!
//! let blocking = Arc::new(ThreadContext::new("blocking-io").unwrap());
//! let expected = blocking.id().clone();
//!
//! let observed = Deferred::<_, String>::effect_on(blocking, || current_context());
//! assert_eq!(observed.run_sync(), Outcome::Completed(Some(expected)));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// A unit of work scheduled onto an execution context.
pub type Task = Box<dyn FnOnce() + Send>;

/// Structural identity token for an execution context.
///
/// Two ids compare equal exactly when they were cloned from the same
/// [`ContextId::new`] call chain or carry the same name — identity is the
/// name itself, not the thread that happens to run tasks.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContextId(Arc<str>);

impl ContextId {
    /// Create an id from a context name.
    pub fn new(name: impl AsRef<str>) -> Self {
        ContextId(Arc::from(name.as_ref()))
    }

    /// The context name this id carries.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextId").field(&self.name()).finish()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scheduler for deferred continuations.
///
/// Implementations must run every submitted task with their [`ContextId`]
/// installed (via [`enter_context`]) so that code running inside the task
/// can observe where it is.
pub trait ExecutionContext: Send + Sync {
    /// The structural identity of this context.
    fn id(&self) -> &ContextId;

    /// Schedule a task. Ordering between independently submitted tasks is
    /// implementation-defined; tasks submitted by one continuation chain
    /// are inherently ordered by the chain itself.
    fn execute(&self, task: Task);
}

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<ContextId>> = const { RefCell::new(None) };
}

/// The id of the execution context currently hosting this thread's task,
/// if any.
pub fn current_context() -> Option<ContextId> {
    CURRENT_CONTEXT.with(|current| current.borrow().clone())
}

/// Run `f` with `id` installed as the current context.
///
/// The previous id is restored afterwards, also on unwind. Context
/// implementations call this around every task; application code rarely
/// needs it directly.
pub fn enter_context<R>(id: &ContextId, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<ContextId>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            CURRENT_CONTEXT.with(|current| *current.borrow_mut() = previous);
        }
    }

    let previous = CURRENT_CONTEXT.with(|current| current.borrow_mut().replace(id.clone()));
    let _restore = Restore(previous);
    f()
}

/// Context that runs tasks immediately on the submitting thread.
///
/// Useful as a trampoline-free default and in tests: the task still
/// observes the context id, but no thread hop happens.
#[derive(Debug)]
pub struct ImmediateContext {
    id: ContextId,
}

impl ImmediateContext {
    /// Create an immediate context with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        ImmediateContext {
            id: ContextId::new(name),
        }
    }
}

impl ExecutionContext for ImmediateContext {
    fn id(&self) -> &ContextId {
        &self.id
    }

    fn execute(&self, task: Task) {
        enter_context(&self.id, task);
    }
}

/// Context backed by one dedicated worker thread draining a queue.
///
/// Tasks run in submission order on the same OS thread. Dropping the
/// context stops the worker after the queued tasks finish; tasks
/// submitted after that are dropped, which their runners observe as
/// [`Outcome::Canceled`](crate::Outcome::Canceled).
pub struct ThreadContext {
    id: ContextId,
    sender: Option<mpsc::Sender<Task>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadContext {
    /// Spawn a named worker thread and return the context driving it.
    ///
    /// # Errors
    ///
    /// Fails when the OS refuses to spawn the thread.
    pub fn new(name: impl AsRef<str>) -> io::Result<Self> {
        let name = name.as_ref();
        let id = ContextId::new(name);
        let (sender, receiver) = mpsc::channel::<Task>();
        let worker_id = id.clone();
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Ok(task) = receiver.recv() {
                    enter_context(&worker_id, task);
                }
            })?;
        Ok(ThreadContext {
            id,
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

impl fmt::Debug for ThreadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadContext")
            .field("id", &self.id)
            .finish()
    }
}

impl ExecutionContext for ThreadContext {
    fn id(&self) -> &ContextId {
        &self.id
    }

    fn execute(&self, task: Task) {
        if let Some(sender) = &self.sender {
            // A stopped worker drops the task; the pending chain is then
            // observed as canceled by its runner.
            let _ = sender.send(task);
        }
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        // Disconnect the queue so the worker's recv loop ends.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            // The last handle can be dropped by a task on the worker
            // itself; joining from there would deadlock.
            if thread::current().id() != worker.thread().id() {
                let _ = worker.join();
            }
        }
    }
}

/// Context backed by a tokio runtime handle.
///
/// Tasks are spawned onto the runtime; the context id is installed for
/// the duration of each task regardless of which runtime worker picks
/// it up.
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    id: ContextId,
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "async")]
impl RuntimeContext {
    /// Wrap a runtime handle under the given context name.
    pub fn new(name: impl AsRef<str>, handle: tokio::runtime::Handle) -> Self {
        RuntimeContext {
            id: ContextId::new(name),
            handle,
        }
    }
}

#[cfg(feature = "async")]
impl ExecutionContext for RuntimeContext {
    fn id(&self) -> &ContextId {
        &self.id
    }

    fn execute(&self, task: Task) {
        let id = self.id.clone();
        self.handle.spawn(async move {
            enter_context(&id, task);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_context_id_is_structural() {
        let a = ContextId::new("io");
        let b = ContextId::new("io");
        let c = ContextId::new("compute");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.name(), "io");
        assert_eq!(a.to_string(), "io");
    }

    #[test]
    fn test_current_context_defaults_to_none() {
        assert_eq!(current_context(), None);
    }

    #[test]
    fn test_enter_context_installs_and_restores() {
        let id = ContextId::new("scoped");
        let observed = enter_context(&id, current_context);
        assert_eq!(observed, Some(id));
        assert_eq!(current_context(), None);
    }

    #[test]
    fn test_enter_context_nests() {
        let outer = ContextId::new("outer");
        let inner = ContextId::new("inner");
        enter_context(&outer, || {
            assert_eq!(current_context(), Some(outer.clone()));
            enter_context(&inner, || {
                assert_eq!(current_context(), Some(inner.clone()));
            });
            assert_eq!(current_context(), Some(outer.clone()));
        });
    }

    #[test]
    fn test_immediate_context_runs_inline() {
        let ctx = ImmediateContext::new("inline");
        let count = Arc::new(AtomicUsize::new(0));
        let count_task = count.clone();
        ctx.execute(Box::new(move || {
            count_task.fetch_add(1, Ordering::SeqCst);
        }));
        // Immediate means done before execute returns.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_immediate_context_installs_id() {
        let ctx = ImmediateContext::new("inline");
        let observed = Arc::new(Mutex::new(None));
        let observed_task = observed.clone();
        ctx.execute(Box::new(move || {
            *observed_task.lock().unwrap() = current_context();
        }));
        assert_eq!(*observed.lock().unwrap(), Some(ctx.id().clone()));
    }

    #[test]
    fn test_thread_context_runs_in_order() {
        let ctx = ThreadContext::new("ordered").unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let log = log.clone();
            ctx.execute(Box::new(move || {
                log.lock().unwrap().push(i);
            }));
        }
        drop(ctx); // joins the worker, flushing the queue
        assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_thread_context_installs_id() {
        let ctx = ThreadContext::new("worker").unwrap();
        let observed = Arc::new(Mutex::new(None));
        let observed_task = observed.clone();
        let (tx, rx) = mpsc::channel();
        ctx.execute(Box::new(move || {
            *observed_task.lock().unwrap() = current_context();
            tx.send(()).unwrap();
        }));
        rx.recv().unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(ctx.id().clone()));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_runtime_context_installs_id() {
        let ctx = RuntimeContext::new("rt", tokio::runtime::Handle::current());
        let (tx, rx) = tokio::sync::oneshot::channel();
        let id = ctx.id().clone();
        ctx.execute(Box::new(move || {
            let _ = tx.send(current_context());
        }));
        assert_eq!(rx.await.unwrap(), Some(id));
    }
}
