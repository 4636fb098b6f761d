/*!
 * Thread Pool Backend
 *
 * Futures mode: operations run on a rayon pool. The caller gets an
 * accessor back immediately and may wait on it with a timeout.
 *
 * A worker of a single-thread pool cannot wait on work queued behind it,
 * so such waits are rejected. On larger pools a worker may wait, but
 * saturating every worker with waits still stalls the pool.
 */

use crate::core::limits::POOL_THREAD_PREFIX;
use crate::core::{GreenError, GreenMode, GreenResult};
use crate::executor::{completion, Executor, Job, Payload, RawAccessor};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Executor backed by a dedicated thread pool
pub struct ThreadPoolExecutor {
    pool: rayon::ThreadPool,
}

impl ThreadPoolExecutor {
    /// Start a pool with `threads` workers (`None` = one per core)
    pub fn new(threads: Option<usize>) -> GreenResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|index| format!("{}-{}", POOL_THREAD_PREFIX, index))
            .build()
            .map_err(|e| GreenError::backend(GreenMode::Futures, e))?;

        info!(threads = pool.current_num_threads(), "Futures thread pool started");
        Ok(Self { pool })
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Whether the calling thread is one of this pool's workers
    pub fn in_pool(&self) -> bool {
        self.pool.current_thread_index().is_some()
    }
}

impl Executor for ThreadPoolExecutor {
    fn mode(&self) -> GreenMode {
        GreenMode::Futures
    }

    fn asynchronous(&self) -> bool {
        true
    }

    fn default_wait(&self) -> bool {
        true
    }

    fn delegate_job(&self, job: Job) -> GreenResult<RawAccessor> {
        let (completer, accessor) = completion(GreenMode::Futures);
        self.pool.spawn(move || completer.complete(job));
        Ok(accessor)
    }

    fn access_job(&self, accessor: RawAccessor, timeout: Option<Duration>) -> GreenResult<Payload> {
        // The only worker is the one that would have to run the job
        if self.in_pool() && self.threads() == 1 && !accessor.is_complete() {
            return Err(GreenError::InvalidUsage(
                "blocking wait on the only futures worker".to_string(),
            ));
        }
        accessor.wait(timeout)
    }

    fn execute_job(&self, job: Job) -> GreenResult<Payload> {
        // Waiting on a worker for another queued job could starve a small pool
        if self.in_pool() {
            debug!("Executing inline on futures worker");
            return Ok(job());
        }
        let accessor = self.delegate_job(job)?;
        accessor.wait(None)
    }
}

impl fmt::Debug for ThreadPoolExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolExecutor")
            .field("threads", &self.threads())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorExt;
    use std::sync::Arc;

    #[test]
    fn test_pool_threads_are_named() {
        let executor = ThreadPoolExecutor::new(Some(2)).unwrap();
        assert_eq!(executor.threads(), 2);

        let name = executor
            .execute(|| std::thread::current().name().map(str::to_owned))
            .unwrap()
            .unwrap();
        assert!(name.starts_with(POOL_THREAD_PREFIX), "unexpected thread {}", name);
    }

    #[test]
    fn test_execute_inside_pool_runs_inline() {
        let executor = Arc::new(ThreadPoolExecutor::new(Some(1)).unwrap());
        let inner = Arc::clone(&executor);

        // With a single worker, a delegated wait from inside the pool would never finish
        let value = executor
            .execute(move || inner.execute(|| 21 * 2).unwrap())
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_wait_on_single_worker_is_rejected() {
        let executor = Arc::new(ThreadPoolExecutor::new(Some(1)).unwrap());
        let inner = Arc::clone(&executor);

        let err = executor
            .execute(move || inner.run(|| 1, Some(true), None).map(|d| d.is_ready()))
            .unwrap()
            .unwrap_err();
        assert!(err.is_invalid_usage());

        // Deferring without waiting is still allowed from the worker
        let inner = Arc::clone(&executor);
        let accessor = executor
            .execute(move || inner.run(|| 5, Some(false), None).unwrap().pending())
            .unwrap()
            .unwrap();
        assert_eq!(executor.access(accessor, Some(Duration::from_secs(5))).unwrap(), 5);
    }
}
