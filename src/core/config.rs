/*!
 * Dispatch Configuration
 *
 * Startup settings for the process-wide runtime. Read once from the
 * environment; everything afterwards goes through explicit setters.
 */

use super::limits::{GREEN_MODE_ENV, MAX_POOL_THREADS, POOL_THREADS_ENV};
use super::mode::GreenMode;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the process-wide green runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenConfig {
    /// Initial default mode (default: synchronous)
    pub default_mode: GreenMode,

    /// Futures thread pool size (default: one thread per core)
    pub pool_threads: Option<usize>,
}

impl GreenConfig {
    pub fn new() -> Self {
        Self {
            default_mode: GreenMode::Synchronous,
            pool_threads: None,
        }
    }

    /// Load configuration from `GREEN_MODE` and `GREEN_POOL_THREADS`
    ///
    /// Missing or unrecognized values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            default_mode: parse_mode_var(std::env::var(GREEN_MODE_ENV).ok().as_deref()),
            pool_threads: parse_threads_var(std::env::var(POOL_THREADS_ENV).ok().as_deref()),
        }
    }

    pub fn with_default_mode(mut self, mode: GreenMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_pool_threads(mut self, threads: usize) -> Self {
        self.pool_threads = Some(threads);
        self
    }
}

impl Default for GreenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Interpret the raw value of the green mode variable
pub fn parse_mode_var(raw: Option<&str>) -> GreenMode {
    let Some(raw) = raw else {
        return GreenMode::Synchronous;
    };

    match raw.parse() {
        Ok(mode) => mode,
        Err(e) => {
            warn!(
                variable = GREEN_MODE_ENV,
                value = raw,
                error = %e,
                "Ignoring green mode, falling back to synchronous"
            );
            GreenMode::Synchronous
        }
    }
}

fn parse_threads_var(raw: Option<&str>) -> Option<usize> {
    let raw = raw?;
    match raw.trim().parse::<usize>() {
        Ok(n) if (1..=MAX_POOL_THREADS).contains(&n) => Some(n),
        _ => {
            warn!(
                variable = POOL_THREADS_ENV,
                value = raw,
                "Ignoring pool size, using one thread per core"
            );
            None
        }
    }
}
