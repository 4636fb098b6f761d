/*!
 * Cooperative Green Thread Backend
 *
 * Greenlets mode: a single hub thread runs a `futures` local pool. Each
 * delegated operation becomes a green task on the hub. Plain closures run
 * to completion once scheduled; futures delegated through
 * `delegate_future` yield to the other green tasks at every await point.
 */

use crate::core::limits::GREENLET_HUB_THREAD;
use crate::core::{GreenError, GreenMode, GreenResult};
use crate::executor::{completion, Accessor, Executor, Job, Payload, RawAccessor};
use futures::executor::LocalPool;
use futures::future::BoxFuture;
use futures::task::LocalSpawnExt;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::thread::{self, ThreadId};
use std::time::Duration;
use tracing::{debug, error, info};

type Greenlet = BoxFuture<'static, ()>;

/// Executor scheduling operations as green tasks on a hub thread
pub struct GreenletExecutor {
    spawn_tx: flume::Sender<Greenlet>,
    hub_thread: ThreadId,
}

impl GreenletExecutor {
    /// Start the hub thread
    pub fn new() -> GreenResult<Self> {
        let (spawn_tx, spawn_rx) = flume::unbounded::<Greenlet>();

        let hub = thread::Builder::new()
            .name(GREENLET_HUB_THREAD.to_string())
            .spawn(move || {
                let mut pool = LocalPool::new();
                let spawner = pool.spawner();

                // Accept new greenlets until every sender is gone
                pool.run_until(async move {
                    while let Ok(greenlet) = spawn_rx.recv_async().await {
                        if let Err(e) = spawner.spawn_local(greenlet) {
                            error!(error = %e, "Hub refused greenlet");
                            break;
                        }
                    }
                });
                debug!("Greenlet hub stopped");
            })
            .map_err(|e| GreenError::backend(GreenMode::Greenlets, e))?;

        info!("Greenlet hub started");
        Ok(Self {
            spawn_tx,
            hub_thread: hub.thread().id(),
        })
    }

    /// Whether the caller is running on the hub thread
    pub fn on_hub(&self) -> bool {
        thread::current().id() == self.hub_thread
    }

    /// Schedule an async operation as a greenlet
    pub fn delegate_future<F, T>(&self, future: F) -> GreenResult<Accessor<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (completer, accessor) = completion(GreenMode::Greenlets);
        self.spawn(completer.complete_future(future).boxed())?;
        Ok(Accessor::from_raw(accessor))
    }

    fn spawn(&self, greenlet: Greenlet) -> GreenResult<()> {
        self.spawn_tx
            .send(greenlet)
            .map_err(|_| GreenError::backend(GreenMode::Greenlets, "greenlet hub has stopped"))
    }
}

impl Executor for GreenletExecutor {
    fn mode(&self) -> GreenMode {
        GreenMode::Greenlets
    }

    fn asynchronous(&self) -> bool {
        true
    }

    fn default_wait(&self) -> bool {
        true
    }

    fn delegate_job(&self, job: Job) -> GreenResult<RawAccessor> {
        let (completer, accessor) = completion(GreenMode::Greenlets);
        self.spawn(async move { completer.complete(job) }.boxed())?;
        Ok(accessor)
    }

    fn access_job(&self, accessor: RawAccessor, timeout: Option<Duration>) -> GreenResult<Payload> {
        // A blocked hub cannot schedule the greenlet being waited on
        if self.on_hub() && !accessor.is_complete() {
            return Err(GreenError::InvalidUsage(
                "blocking wait on the greenlet hub".to_string(),
            ));
        }
        accessor.wait(timeout)
    }

    fn execute_job(&self, job: Job) -> GreenResult<Payload> {
        if self.on_hub() {
            return Ok(job());
        }
        let accessor = self.delegate_job(job)?;
        accessor.wait(None)
    }
}

impl fmt::Debug for GreenletExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenletExecutor")
            .field("hub_thread", &self.hub_thread)
            .finish()
    }
}
