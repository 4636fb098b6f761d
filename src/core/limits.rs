/*!
 * Dispatch Constants
 *
 * Environment variable names, thread names and other fixed values shared
 * by the configuration layer and the backends.
 */

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Initial process-wide green mode (e.g. `futures`, `asyncio`)
pub const GREEN_MODE_ENV: &str = "GREEN_MODE";

/// Thread count for the futures thread pool
pub const POOL_THREADS_ENV: &str = "GREEN_POOL_THREADS";

/// JSON log output toggle for the demo binary
pub const TRACE_JSON_ENV: &str = "GREEN_TRACE_JSON";

// =============================================================================
// BACKEND THREADS
// =============================================================================

/// Name of the cooperative hub thread
pub const GREENLET_HUB_THREAD: &str = "green-hub";

/// Prefix for thread pool workers, suffixed with the worker index
pub const POOL_THREAD_PREFIX: &str = "green-futures";

/// Name of the event loop thread
pub const EVENT_LOOP_THREAD: &str = "green-event-loop";

/// Upper bound accepted for `GREEN_POOL_THREADS`
pub const MAX_POOL_THREADS: usize = 1024;
