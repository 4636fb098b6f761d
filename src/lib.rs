/*!
 * Green Dispatch Library
 * One call-site API over synchronous, green-thread, thread-pool and
 * event-loop execution
 */

pub mod backends;
pub mod core;
pub mod dispatch;
pub mod executor;
pub mod monitoring;
pub mod registry;
pub mod runtime;

// Re-exports
pub use crate::core::{GreenConfig, GreenError, GreenMode, GreenResult};
pub use dispatch::{green_callback, ExecutorMap, Green, GreenBinding, GreenCall, GreenCallback, GreenTarget};
pub use executor::{same_executor, Accessor, Dispatch, Executor, ExecutorExt, SynchronousExecutor};
pub use monitoring::init_tracing;
pub use registry::{provider_fn, ExecutorProvider, ExecutorRegistry};
pub use runtime::{default_mode, get_executor, resolve_executor, set_default_mode, GreenRuntime};
