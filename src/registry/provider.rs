/*!
 * Executor Providers
 * Capability providers build the executor for one green mode
 */

use crate::core::{GreenMode, GreenResult};
use crate::executor::Executor;
use std::fmt;
use std::sync::Arc;

/// Builds the executor for one non-synchronous green mode
///
/// The registry calls `build` at most once per successful construction and
/// caches the result; providers need not memoize.
pub trait ExecutorProvider: Send + Sync {
    /// Mode served by the built executor
    fn mode(&self) -> GreenMode;

    /// Construct the executor, acquiring whatever threads it needs
    fn build(&self) -> GreenResult<Arc<dyn Executor>>;
}

/// Provider backed by a closure
pub struct FnProvider<F> {
    mode: GreenMode,
    build: F,
}

impl<F> ExecutorProvider for FnProvider<F>
where
    F: Fn() -> GreenResult<Arc<dyn Executor>> + Send + Sync,
{
    fn mode(&self) -> GreenMode {
        self.mode
    }

    fn build(&self) -> GreenResult<Arc<dyn Executor>> {
        (self.build)()
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").field("mode", &self.mode).finish()
    }
}

/// Wrap a closure as a provider for `mode`
pub fn provider_fn<F>(mode: GreenMode, build: F) -> FnProvider<F>
where
    F: Fn() -> GreenResult<Arc<dyn Executor>> + Send + Sync,
{
    FnProvider { mode, build }
}
