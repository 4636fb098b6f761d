/*!
 * Accessors and Dispatch Results
 *
 * An accessor is the single-use handle to a delegated operation. Backends
 * settle it through a `Completer`; callers consume it exactly once, either
 * through `Executor::access` or by waiting on it directly.
 */

use crate::core::{GreenError, GreenMode, GreenResult};
use futures::FutureExt;
use std::any::{type_name, Any};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::trace;

/// Type-erased operation result
pub type Payload = Box<dyn Any + Send>;

/// Type-erased operation
pub type Job = Box<dyn FnOnce() -> Payload + Send + 'static>;

/// Either the operation's payload or the panic it raised
type Outcome = std::thread::Result<Payload>;

/// Box a typed closure into a `Job`
pub fn job<T, F>(f: F) -> Job
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Box::new(move || Box::new(f()) as Payload)
}

/// Recover the typed value from a payload
pub(crate) fn downcast<T: 'static>(payload: Payload) -> GreenResult<T> {
    payload.downcast::<T>().map(|value| *value).map_err(|_| {
        GreenError::Internal(format!(
            "operation result is not a {}",
            type_name::<T>()
        ))
    })
}

/// Create a linked completer/accessor pair for one delegated operation
pub fn completion(mode: GreenMode) -> (Completer, RawAccessor) {
    let (tx, rx) = flume::bounded(1);
    (Completer { tx }, RawAccessor { mode, rx })
}

/// Backend side of an accessor
#[derive(Debug)]
pub struct Completer {
    tx: flume::Sender<Outcome>,
}

impl Completer {
    /// Run the job, capturing a panic instead of unwinding into the backend
    pub fn complete(self, job: Job) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(job));
        self.settle(outcome);
    }

    /// Drive a future to completion, capturing a panic the same way
    pub async fn complete_future<F, T>(self, future: F)
    where
        F: Future<Output = T>,
        T: Send + 'static,
    {
        let outcome = AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map(|value| Box::new(value) as Payload);
        self.settle(outcome);
    }

    fn settle(self, outcome: Outcome) {
        // The caller may have timed out and dropped the accessor
        if self.tx.send(outcome).is_err() {
            trace!("Accessor dropped before the operation completed");
        }
    }
}

/// Type-erased accessor as seen by executors
pub struct RawAccessor {
    mode: GreenMode,
    rx: flume::Receiver<Outcome>,
}

impl RawAccessor {
    /// Mode of the executor the operation was delegated to
    pub fn mode(&self) -> GreenMode {
        self.mode
    }

    /// Whether the operation has finished (successfully or not)
    pub fn is_complete(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Block until the operation completes or the timeout elapses
    ///
    /// A panic raised by the operation is resumed on the calling thread.
    pub fn wait(self, timeout: Option<Duration>) -> GreenResult<Payload> {
        let outcome = match timeout {
            None => self.rx.recv().map_err(|_| abandoned(self.mode))?,
            // A deadline past the end of `Instant` means waiting forever
            Some(timeout) => match Instant::now().checked_add(timeout) {
                None => self.rx.recv().map_err(|_| abandoned(self.mode))?,
                Some(deadline) => match self.rx.recv_deadline(deadline) {
                    Ok(outcome) => outcome,
                    Err(flume::RecvTimeoutError::Timeout) => {
                        return Err(GreenError::timeout(self.mode, timeout))
                    }
                    Err(flume::RecvTimeoutError::Disconnected) => return Err(abandoned(self.mode)),
                },
            },
        };
        resume(outcome)
    }

    /// Await the operation from async code without blocking a thread
    pub async fn wait_async(self) -> GreenResult<Payload> {
        let outcome = self
            .rx
            .recv_async()
            .await
            .map_err(|_| abandoned(self.mode))?;
        resume(outcome)
    }
}

impl fmt::Debug for RawAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAccessor")
            .field("mode", &self.mode)
            .field("complete", &self.is_complete())
            .finish()
    }
}

fn resume(outcome: Outcome) -> GreenResult<Payload> {
    match outcome {
        Ok(payload) => Ok(payload),
        Err(panic_payload) => panic::resume_unwind(panic_payload),
    }
}

#[cold]
fn abandoned(mode: GreenMode) -> GreenError {
    GreenError::Internal(format!(
        "operation abandoned: the {} backend shut down before completing it",
        mode
    ))
}

/// Typed handle to a pending operation returning `T`
pub struct Accessor<T> {
    raw: RawAccessor,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Accessor<T> {
    pub(crate) fn from_raw(raw: RawAccessor) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub fn into_raw(self) -> RawAccessor {
        self.raw
    }

    pub fn mode(&self) -> GreenMode {
        self.raw.mode()
    }

    pub fn is_complete(&self) -> bool {
        self.raw.is_complete()
    }

    /// Block until the result is available or the timeout elapses
    pub fn wait(self, timeout: Option<Duration>) -> GreenResult<T> {
        downcast(self.raw.wait(timeout)?)
    }

    /// Await the result from async code
    pub async fn wait_async(self) -> GreenResult<T> {
        downcast(self.raw.wait_async().await?)
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&self.raw).finish()
    }
}

/// Type-erased result of `submit`/`run`
#[derive(Debug)]
pub enum RawDispatch {
    Ready(Payload),
    Pending(RawAccessor),
}

/// Result of `submit`/`run`: the value itself, or an accessor to wait on
pub enum Dispatch<T> {
    Ready(T),
    Pending(Accessor<T>),
}

impl<T: 'static> Dispatch<T> {
    pub(crate) fn from_raw(raw: RawDispatch) -> GreenResult<Self> {
        match raw {
            RawDispatch::Ready(payload) => downcast(payload).map(Dispatch::Ready),
            RawDispatch::Pending(accessor) => Ok(Dispatch::Pending(Accessor::from_raw(accessor))),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Dispatch::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Dispatch::Pending(_))
    }

    /// The value, if the operation already ran
    pub fn ready(self) -> Option<T> {
        match self {
            Dispatch::Ready(value) => Some(value),
            Dispatch::Pending(_) => None,
        }
    }

    /// The accessor, if the operation was deferred
    pub fn pending(self) -> Option<Accessor<T>> {
        match self {
            Dispatch::Ready(_) => None,
            Dispatch::Pending(accessor) => Some(accessor),
        }
    }

    /// Collapse into a value, waiting on the accessor if needed
    pub fn wait(self, timeout: Option<Duration>) -> GreenResult<T> {
        match self {
            Dispatch::Ready(value) => Ok(value),
            Dispatch::Pending(accessor) => accessor.wait(timeout),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Dispatch::Pending(accessor) => f.debug_tuple("Pending").field(accessor).finish(),
        }
    }
}
