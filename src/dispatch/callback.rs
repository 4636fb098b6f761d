/*!
 * Green Callbacks
 *
 * Wraps a callback so invoking it submits the work to a fixed executor
 * instead of running inline. Backends use this to hand completion
 * callbacks back to the caller's concurrency mode, e.g. so a callback
 * registered under the event loop runs on the loop thread.
 */

use crate::core::{GreenMode, GreenResult};
use crate::executor::{Dispatch, Executor, ExecutorExt};
use crate::runtime::GreenRuntime;
use std::fmt;
use std::sync::Arc;

type Callback<A, T> = dyn Fn(A) -> T + Send + Sync;

/// Callback routed through an executor
pub struct GreenCallback<A, T> {
    executor: Arc<dyn Executor>,
    callback: Arc<Callback<A, T>>,
}

impl<A, T> GreenCallback<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    /// Bind `callback` to an explicit executor
    pub fn with_executor<F>(callback: F, executor: Arc<dyn Executor>) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self {
            executor,
            callback: Arc::new(callback),
        }
    }

    /// Bind `callback` to the executor for `mode` (or the current default)
    pub fn new_in<F>(runtime: &GreenRuntime, callback: F, mode: Option<GreenMode>) -> GreenResult<Self>
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        let mode = mode.unwrap_or_else(|| runtime.default_mode());
        let executor = runtime.executor(mode)?;
        Ok(Self::with_executor(callback, executor))
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// Submit the callback with `args`
    ///
    /// Synchronous executors run it inline and return `Ready`; asynchronous
    /// ones return `Pending` without waiting.
    pub fn call(&self, args: A) -> GreenResult<Dispatch<T>> {
        let callback = Arc::clone(&self.callback);
        self.executor.submit(move || callback(args))
    }
}

impl<A, T> Clone for GreenCallback<A, T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A, T> fmt::Debug for GreenCallback<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenCallback")
            .field("mode", &self.executor.mode())
            .finish()
    }
}

/// Wrap `callback` for the global runtime's executor for `mode`
///
/// The executor is resolved now, not when the callback fires.
pub fn green_callback<A, T, F>(callback: F, mode: Option<GreenMode>) -> GreenResult<GreenCallback<A, T>>
where
    F: Fn(A) -> T + Send + Sync + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    GreenCallback::new_in(GreenRuntime::global(), callback, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SynchronousExecutor;
    use crate::registry::ExecutorRegistry;

    #[test]
    fn test_synchronous_callback_runs_inline() {
        let callback = GreenCallback::with_executor(|x: u32| x + 1, SynchronousExecutor::shared());
        assert_eq!(callback.call(41).unwrap().ready(), Some(42));
    }

    #[test]
    fn test_unavailable_mode_fails_at_wrap_time() {
        let runtime = GreenRuntime::new(ExecutorRegistry::empty(), GreenMode::Synchronous);
        let err = GreenCallback::new_in(&runtime, |(): ()| (), Some(GreenMode::EventLoop)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_default_mode_resolved_at_wrap_time() {
        let runtime = GreenRuntime::new(ExecutorRegistry::empty(), GreenMode::Synchronous);
        let callback = GreenCallback::new_in(&runtime, |(): ()| 1, None).unwrap();
        assert_eq!(callback.executor().mode(), GreenMode::Synchronous);
    }
}
