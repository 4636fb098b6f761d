/*!
 * Executor Contract
 *
 * `Executor` is the object-safe contract every backend satisfies. It works
 * on boxed jobs and erased payloads so executors can be shared as
 * `Arc<dyn Executor>`. `ExecutorExt` layers the typed, closure-based API
 * on top and is what call sites use.
 */

use super::accessor::{job, Accessor, Dispatch, Job, Payload, RawAccessor, RawDispatch};
use crate::core::{GreenError, GreenMode, GreenResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Submission and waiting semantics for one green mode
pub trait Executor: Send + Sync + fmt::Debug {
    /// Mode this executor serves
    fn mode(&self) -> GreenMode;

    /// Whether operations can be deferred
    fn asynchronous(&self) -> bool;

    /// Whether callers wait for the result when they don't say otherwise
    fn default_wait(&self) -> bool;

    /// Submit a job for deferred execution and return immediately
    fn delegate_job(&self, job: Job) -> GreenResult<RawAccessor> {
        drop(job);
        if !self.asynchronous() {
            return Err(GreenError::UnsupportedMode(self.mode()));
        }
        Err(GreenError::Internal(format!(
            "{} executor does not implement delegation",
            self.mode()
        )))
    }

    /// Wait for a delegated job, up to `timeout` (forever if `None`)
    fn access_job(&self, accessor: RawAccessor, timeout: Option<Duration>) -> GreenResult<Payload> {
        let _ = (accessor, timeout);
        if !self.asynchronous() {
            return Err(GreenError::UnsupportedMode(self.mode()));
        }
        Err(GreenError::Internal(format!(
            "{} executor does not implement access",
            self.mode()
        )))
    }

    /// Run inline when synchronous, otherwise delegate without waiting
    fn submit_job(&self, job: Job) -> GreenResult<RawDispatch> {
        if !self.asynchronous() {
            return Ok(RawDispatch::Ready(job()));
        }
        self.delegate_job(job).map(RawDispatch::Pending)
    }

    /// Run the job to completion and return its result
    ///
    /// Asynchronous backends must override this.
    fn execute_job(&self, job: Job) -> GreenResult<Payload> {
        if !self.asynchronous() {
            return Ok(job());
        }
        drop(job);
        Err(GreenError::Internal(format!(
            "{} executor does not implement execute",
            self.mode()
        )))
    }

    /// Unified entry point
    ///
    /// `wait` defaults to `default_wait()`. Synchronous executors only
    /// accept waiting without a timeout. Asynchronous executors always
    /// delegate, then either hand back the accessor or wait on it.
    fn run_job(
        &self,
        job: Job,
        wait: Option<bool>,
        timeout: Option<Duration>,
    ) -> GreenResult<RawDispatch> {
        let wait = wait.unwrap_or_else(|| self.default_wait());

        if !self.asynchronous() {
            if !wait || timeout.is_some() {
                return Err(GreenError::synchronous_only());
            }
            return Ok(RawDispatch::Ready(job()));
        }

        let accessor = self.delegate_job(job)?;
        if !wait {
            return Ok(RawDispatch::Pending(accessor));
        }
        self.access_job(accessor, timeout).map(RawDispatch::Ready)
    }
}

/// Typed operations available on every executor
pub trait ExecutorExt: Executor {
    /// Defer `f` and return its accessor
    fn delegate<T, F>(&self, f: F) -> GreenResult<Accessor<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.delegate_job(job(f)).map(Accessor::from_raw)
    }

    /// Wait for the result behind `accessor`
    fn access<T>(&self, accessor: Accessor<T>, timeout: Option<Duration>) -> GreenResult<T>
    where
        T: Send + 'static,
    {
        let payload = self.access_job(accessor.into_raw(), timeout)?;
        super::accessor::downcast(payload)
    }

    /// Fire `f`: inline when synchronous, deferred otherwise
    fn submit<T, F>(&self, f: F) -> GreenResult<Dispatch<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        Dispatch::from_raw(self.submit_job(job(f))?)
    }

    /// Run `f` to completion regardless of mode
    fn execute<T, F>(&self, f: F) -> GreenResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let payload = self.execute_job(job(f))?;
        super::accessor::downcast(payload)
    }

    /// Run `f` honoring `wait` and `timeout`
    fn run<T, F>(&self, f: F, wait: Option<bool>, timeout: Option<Duration>) -> GreenResult<Dispatch<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        Dispatch::from_raw(self.run_job(job(f), wait, timeout)?)
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}

/// Whether two handles point at the same executor instance
pub fn same_executor(a: &Arc<dyn Executor>, b: &Arc<dyn Executor>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
