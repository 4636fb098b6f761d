/*!
 * Green Operations
 *
 * `Green` wraps an operation on a receiver object so the same call site
 * serves blocking and non-blocking callers. Each call carries optional
 * control parameters (`GreenCall`): whether to wait, how long, and which
 * mode to use. The executor is resolved from the receiver and the runtime,
 * then the operation is routed through `run`.
 *
 * A caller that passes no control parameters gets exactly what calling the
 * operation under the receiver's ambient mode would give.
 */

use crate::core::{GreenMode, GreenResult};
use crate::dispatch::target::GreenTarget;
use crate::executor::{Dispatch, ExecutorExt};
use crate::monitoring::span_dispatch;
use crate::runtime::GreenRuntime;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Control parameters for one green call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreenCall {
    /// Wait for the result (default: the executor's `default_wait`)
    pub wait: Option<bool>,
    /// Give up waiting after this long
    pub timeout: Option<Duration>,
    /// Override the mode for this call only
    pub mode: Option<GreenMode>,
}

impl GreenCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Shorthand for `wait(false)`
    pub fn no_wait(self) -> Self {
        self.wait(false)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn mode(mut self, mode: GreenMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

type Operation<O, A, T> = dyn Fn(&O, A, Option<GreenMode>) -> T + Send + Sync;

/// Operation on `O` taking arguments `A` and producing `T`, dispatchable
/// under any green mode
pub struct Green<O: ?Sized, A, T> {
    name: &'static str,
    op: Arc<Operation<O, A, T>>,
    consume_mode: bool,
}

impl<O, A, T> Green<O, A, T>
where
    O: GreenTarget + Send + Sync + ?Sized + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    /// Wrap `op`; the call-site mode is consumed by the wrapper
    pub fn new<F>(name: &'static str, op: F) -> Self
    where
        F: Fn(&O, A) -> T + Send + Sync + 'static,
    {
        Self {
            name,
            op: Arc::new(move |target: &O, args: A, _mode: Option<GreenMode>| op(target, args)),
            consume_mode: true,
        }
    }

    /// Wrap `op`; the call-site mode is also handed to the operation
    pub fn forwarding_mode<F>(name: &'static str, op: F) -> Self
    where
        F: Fn(&O, A, Option<GreenMode>) -> T + Send + Sync + 'static,
    {
        Self {
            name,
            op: Arc::new(op),
            consume_mode: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the call-site mode stops at the wrapper
    pub fn consumes_mode(&self) -> bool {
        self.consume_mode
    }

    /// Call with no control parameters under the global runtime
    pub fn invoke(&self, target: &Arc<O>, args: A) -> GreenResult<Dispatch<T>> {
        self.call(target, args, GreenCall::default())
    }

    /// Call under the global runtime
    pub fn call(&self, target: &Arc<O>, args: A, call: GreenCall) -> GreenResult<Dispatch<T>> {
        self.call_in(GreenRuntime::global(), target, args, call)
    }

    /// Call under an explicit runtime
    pub fn call_in(
        &self,
        runtime: &GreenRuntime,
        target: &Arc<O>,
        args: A,
        call: GreenCall,
    ) -> GreenResult<Dispatch<T>> {
        let span = span_dispatch(self.name);
        let _entered = span.enter();

        let executor = match runtime.resolve(&**target, call.mode) {
            Ok(executor) => executor,
            Err(e) => {
                span.record_outcome("error");
                return Err(e);
            }
        };
        span.record_mode(executor.mode());
        debug!(
            wait = ?call.wait,
            timeout_ms = call.timeout.map(|t| t.as_millis() as u64),
            "Dispatching green operation"
        );

        let forwarded = if self.consume_mode { None } else { call.mode };
        let op = Arc::clone(&self.op);
        let target = Arc::clone(target);
        let result = executor.run(move || op(&*target, args, forwarded), call.wait, call.timeout);

        span.record_outcome(match &result {
            Ok(Dispatch::Ready(_)) => "ready",
            Ok(Dispatch::Pending(_)) => "pending",
            Err(_) => "error",
        });
        result
    }
}

impl<O: ?Sized, A, T> Clone for Green<O, A, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            op: Arc::clone(&self.op),
            consume_mode: self.consume_mode,
        }
    }
}

impl<O: ?Sized, A, T> fmt::Debug for Green<O, A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Green")
            .field("name", &self.name)
            .field("consume_mode", &self.consume_mode)
            .finish()
    }
}
