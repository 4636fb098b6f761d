/*!
 * Dispatch Targets
 *
 * Objects that receive green calls may carry two optional capabilities:
 * a preferred green mode, and executor overrides for specific modes. Both
 * default to deferring to the runtime.
 */

use crate::core::GreenMode;
use crate::executor::Executor;
use ahash::HashMap;
use std::fmt;
use std::sync::Arc;

/// Receiver of green calls
///
/// Implement with an empty body for objects that always follow the
/// runtime default.
pub trait GreenTarget {
    /// Mode this object prefers when the call site doesn't pick one
    fn green_mode(&self) -> Option<GreenMode> {
        None
    }

    /// Executor this object uses instead of the registry singleton for `mode`
    fn executor_override(&self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        let _ = mode;
        None
    }
}

impl GreenTarget for () {}

impl<T: GreenTarget + ?Sized> GreenTarget for &T {
    fn green_mode(&self) -> Option<GreenMode> {
        (**self).green_mode()
    }

    fn executor_override(&self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        (**self).executor_override(mode)
    }
}

impl<T: GreenTarget + ?Sized> GreenTarget for Arc<T> {
    fn green_mode(&self) -> Option<GreenMode> {
        (**self).green_mode()
    }

    fn executor_override(&self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        (**self).executor_override(mode)
    }
}

/// Per-object executor overrides
///
/// Holds shared references only; the executors stay owned by whoever
/// built them.
#[derive(Clone, Default)]
pub struct ExecutorMap {
    executors: HashMap<GreenMode, Arc<dyn Executor>>,
}

impl ExecutorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `executor` whenever a call resolves to `mode`
    pub fn insert(&mut self, mode: GreenMode, executor: Arc<dyn Executor>) -> Option<Arc<dyn Executor>> {
        self.executors.insert(mode, executor)
    }

    /// Builder form of `insert`
    pub fn with(mut self, mode: GreenMode, executor: Arc<dyn Executor>) -> Self {
        self.insert(mode, executor);
        self
    }

    pub fn remove(&mut self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        self.executors.remove(&mode)
    }

    pub fn get(&self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        self.executors.get(&mode).cloned()
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl fmt::Debug for ExecutorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modes: Vec<_> = self.executors.keys().copied().collect();
        modes.sort();
        f.debug_struct("ExecutorMap").field("modes", &modes).finish()
    }
}

/// Mode preference and overrides fixed when an object is constructed
///
/// Embed in a proxy type and forward `GreenTarget` to it, or use directly.
#[derive(Debug, Clone, Default)]
pub struct GreenBinding {
    mode: Option<GreenMode>,
    executors: ExecutorMap,
}

impl GreenBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer `mode` over the runtime default
    pub fn with_mode(mut self, mode: GreenMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Route `mode` to `executor` instead of the registry singleton
    pub fn with_executor(mut self, mode: GreenMode, executor: Arc<dyn Executor>) -> Self {
        self.executors.insert(mode, executor);
        self
    }

    pub fn mode(&self) -> Option<GreenMode> {
        self.mode
    }

    pub fn executors(&self) -> &ExecutorMap {
        &self.executors
    }
}

impl GreenTarget for GreenBinding {
    fn green_mode(&self) -> Option<GreenMode> {
        self.mode
    }

    fn executor_override(&self, mode: GreenMode) -> Option<Arc<dyn Executor>> {
        self.executors.get(mode)
    }
}
