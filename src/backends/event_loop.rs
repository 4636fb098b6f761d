/*!
 * Event Loop Backend
 *
 * Event-loop mode: a tokio current-thread runtime driven by one dedicated
 * thread. Every delegated operation becomes a task on that loop, so
 * operations never run concurrently with each other and completion
 * callbacks routed here observe loop-thread affinity.
 *
 * Callers don't wait by default in this mode.
 */

use crate::core::limits::EVENT_LOOP_THREAD;
use crate::core::{GreenError, GreenMode, GreenResult};
use crate::executor::{completion, Accessor, Executor, Job, Payload, RawAccessor};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::thread::{self, ThreadId};
use std::time::Duration;
use tokio::runtime::{Builder, Handle};
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Executor running operations as tasks on a single-threaded event loop
pub struct EventLoopExecutor {
    handle: Handle,
    loop_thread: ThreadId,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
}

impl EventLoopExecutor {
    /// Start the loop thread and wait until its runtime is ready
    pub fn new() -> GreenResult<Self> {
        let (ready_tx, ready_rx) = flume::bounded(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name(EVENT_LOOP_THREAD.to_string())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(runtime.handle().clone()));

                // Drive spawned tasks until the executor is dropped
                runtime.block_on(async {
                    let _ = shutdown_rx.await;
                });
                debug!("Event loop stopped");
            })
            .map_err(|e| GreenError::backend(GreenMode::EventLoop, e))?;

        let handle = ready_rx
            .recv()
            .map_err(|_| GreenError::backend(GreenMode::EventLoop, "event loop thread exited"))?
            .map_err(|reason| GreenError::backend(GreenMode::EventLoop, reason))?;

        info!("Event loop started");
        Ok(Self {
            handle,
            loop_thread: thread.thread().id(),
            shutdown: Mutex::new(Some(shutdown_tx)),
        })
    }

    /// Whether the caller is running on the loop thread
    pub fn on_loop_thread(&self) -> bool {
        thread::current().id() == self.loop_thread
    }

    /// Runtime handle for spawning directly onto the loop
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Schedule an async operation on the loop
    pub fn delegate_future<F, T>(&self, future: F) -> Accessor<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (completer, accessor) = completion(GreenMode::EventLoop);
        self.handle.spawn(completer.complete_future(future));
        Accessor::from_raw(accessor)
    }
}

impl Executor for EventLoopExecutor {
    fn mode(&self) -> GreenMode {
        GreenMode::EventLoop
    }

    fn asynchronous(&self) -> bool {
        true
    }

    fn default_wait(&self) -> bool {
        false
    }

    fn delegate_job(&self, job: Job) -> GreenResult<RawAccessor> {
        let (completer, accessor) = completion(GreenMode::EventLoop);
        self.handle.spawn(async move { completer.complete(job) });
        Ok(accessor)
    }

    fn access_job(&self, accessor: RawAccessor, timeout: Option<Duration>) -> GreenResult<Payload> {
        // Blocking the only loop thread on its own task can never finish
        if self.on_loop_thread() && !accessor.is_complete() {
            return Err(GreenError::InvalidUsage(
                "blocking wait on the event loop thread".to_string(),
            ));
        }
        accessor.wait(timeout)
    }

    fn execute_job(&self, job: Job) -> GreenResult<Payload> {
        if self.on_loop_thread() {
            return Ok(job());
        }
        let accessor = self.delegate_job(job)?;
        accessor.wait(None)
    }
}

impl Drop for EventLoopExecutor {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.lock().take() {
            let _ = shutdown.send(());
        }
    }
}

impl fmt::Debug for EventLoopExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoopExecutor")
            .field("loop_thread", &self.loop_thread)
            .finish()
    }
}
