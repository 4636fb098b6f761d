/*!
 * Concurrency Backends
 *
 * One executor per non-synchronous green mode, each behind a cargo
 * feature, plus the providers that build them for the registry:
 * - `greenlets`: cooperative hub thread (futures local pool)
 * - `thread-pool`: rayon worker pool
 * - `event-loop`: tokio current-thread runtime on its own thread
 */

#[cfg(feature = "event-loop")]
pub mod event_loop;
#[cfg(feature = "greenlets")]
pub mod greenlets;
#[cfg(feature = "thread-pool")]
pub mod thread_pool;

#[cfg(feature = "event-loop")]
pub use event_loop::EventLoopExecutor;
#[cfg(feature = "greenlets")]
pub use greenlets::GreenletExecutor;
#[cfg(feature = "thread-pool")]
pub use thread_pool::ThreadPoolExecutor;

use crate::core::{GreenConfig, GreenMode, GreenResult};
use crate::executor::Executor;
use crate::registry::ExecutorProvider;
use std::sync::Arc;

/// Provider for the cooperative greenlet hub
#[cfg(feature = "greenlets")]
#[derive(Debug, Default)]
pub struct GreenletProvider;

#[cfg(feature = "greenlets")]
impl ExecutorProvider for GreenletProvider {
    fn mode(&self) -> GreenMode {
        GreenMode::Greenlets
    }

    fn build(&self) -> GreenResult<Arc<dyn Executor>> {
        Ok(Arc::new(GreenletExecutor::new()?))
    }
}

/// Provider for the futures thread pool
#[cfg(feature = "thread-pool")]
#[derive(Debug, Default)]
pub struct ThreadPoolProvider {
    threads: Option<usize>,
}

#[cfg(feature = "thread-pool")]
impl ThreadPoolProvider {
    pub fn new(threads: Option<usize>) -> Self {
        Self { threads }
    }
}

#[cfg(feature = "thread-pool")]
impl ExecutorProvider for ThreadPoolProvider {
    fn mode(&self) -> GreenMode {
        GreenMode::Futures
    }

    fn build(&self) -> GreenResult<Arc<dyn Executor>> {
        Ok(Arc::new(ThreadPoolExecutor::new(self.threads)?))
    }
}

/// Provider for the event loop
#[cfg(feature = "event-loop")]
#[derive(Debug, Default)]
pub struct EventLoopProvider;

#[cfg(feature = "event-loop")]
impl ExecutorProvider for EventLoopProvider {
    fn mode(&self) -> GreenMode {
        GreenMode::EventLoop
    }

    fn build(&self) -> GreenResult<Arc<dyn Executor>> {
        Ok(Arc::new(EventLoopExecutor::new()?))
    }
}

/// Providers for every backend compiled into this build
pub fn default_providers(config: &GreenConfig) -> Vec<Box<dyn ExecutorProvider>> {
    let mut providers: Vec<Box<dyn ExecutorProvider>> = Vec::new();

    #[cfg(feature = "greenlets")]
    providers.push(Box::new(GreenletProvider));

    #[cfg(feature = "thread-pool")]
    providers.push(Box::new(ThreadPoolProvider::new(config.pool_threads)));

    #[cfg(feature = "event-loop")]
    providers.push(Box::new(EventLoopProvider));

    let _ = config;
    providers
}
