/*!
 * Synchronous Executor
 * Built-in zero-configuration backend: every operation runs inline
 */

use super::accessor::{Job, Payload, RawAccessor};
use super::traits::Executor;
use crate::core::{GreenError, GreenMode, GreenResult};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

static SYNCHRONOUS: Lazy<Arc<SynchronousExecutor>> = Lazy::new(|| Arc::new(SynchronousExecutor));

/// Stateless executor running operations on the caller's thread
#[derive(Debug, Default)]
pub struct SynchronousExecutor;

impl SynchronousExecutor {
    /// The process-wide shared instance
    pub fn shared() -> Arc<dyn Executor> {
        let executor: Arc<SynchronousExecutor> = Arc::clone(&SYNCHRONOUS);
        executor
    }
}

impl Executor for SynchronousExecutor {
    fn mode(&self) -> GreenMode {
        GreenMode::Synchronous
    }

    fn asynchronous(&self) -> bool {
        false
    }

    fn default_wait(&self) -> bool {
        true
    }

    fn delegate_job(&self, _job: Job) -> GreenResult<RawAccessor> {
        Err(GreenError::synchronous_only())
    }

    fn access_job(&self, _accessor: RawAccessor, _timeout: Option<Duration>) -> GreenResult<Payload> {
        Err(GreenError::synchronous_only())
    }
}
