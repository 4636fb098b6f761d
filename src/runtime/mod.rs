/*!
 * Green Runtime
 *
 * Process-wide dispatch state: the executor registry and the default green
 * mode. `GreenRuntime::global()` is built from the environment on first
 * use; the free functions below forward to it. Isolated runtimes can be
 * built for tests or embedding and passed explicitly.
 *
 * Changing the default mode affects every caller in the process. It is
 * meant to be done once, early, by the final application, never by a
 * library.
 */

use crate::core::{GreenConfig, GreenMode, GreenResult};
use crate::dispatch::target::GreenTarget;
use crate::executor::Executor;
use crate::registry::ExecutorRegistry;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};

static GLOBAL: Lazy<GreenRuntime> = Lazy::new(|| GreenRuntime::from_config(&GreenConfig::from_env()));

/// Registry plus default-mode state
pub struct GreenRuntime {
    registry: ExecutorRegistry,
    default_mode: AtomicU8,
    /// Serializes default-mode changes
    admin: Mutex<()>,
}

impl GreenRuntime {
    /// Build a runtime around `registry` with `initial_mode` as default
    ///
    /// The initial mode is not constructed eagerly. A mode without provider
    /// falls back to synchronous.
    pub fn new(registry: ExecutorRegistry, initial_mode: GreenMode) -> Self {
        let initial_mode = if registry.supports(initial_mode) {
            initial_mode
        } else {
            warn!(
                mode = %initial_mode,
                "Initial green mode is not available, falling back to synchronous"
            );
            GreenMode::Synchronous
        };

        Self {
            registry,
            default_mode: AtomicU8::new(initial_mode as u8),
            admin: Mutex::new(()),
        }
    }

    /// Runtime with the default providers configured from `config`
    pub fn from_config(config: &GreenConfig) -> Self {
        Self::new(
            ExecutorRegistry::with_default_providers(config),
            config.default_mode,
        )
    }

    /// The process-wide runtime
    pub fn global() -> &'static GreenRuntime {
        &GLOBAL
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Singleton executor for `mode`
    pub fn executor(&self, mode: GreenMode) -> GreenResult<Arc<dyn Executor>> {
        self.registry.get(mode)
    }

    /// Current default mode
    pub fn default_mode(&self) -> GreenMode {
        GreenMode::from_repr(self.default_mode.load(Ordering::Acquire))
    }

    /// Change the default mode
    ///
    /// The executor for `mode` is built first; if that fails the previous
    /// default stays in place.
    #[instrument(skip_all, fields(mode = %mode))]
    pub fn set_default_mode(&self, mode: GreenMode) -> GreenResult<()> {
        let _admin = self.admin.lock();
        self.registry.get(mode)?;

        let previous = GreenMode::from_repr(self.default_mode.swap(mode as u8, Ordering::AcqRel));
        if previous != mode {
            info!(previous = %previous, current = %mode, "Default green mode changed");
        }
        Ok(())
    }

    /// Mode that applies to `target` for a call with an optional explicit mode
    ///
    /// Explicit mode wins, then the target's own preference, then the
    /// runtime default.
    pub fn effective_mode<O>(&self, target: &O, explicit: Option<GreenMode>) -> GreenMode
    where
        O: GreenTarget + ?Sized,
    {
        explicit
            .or_else(|| target.green_mode())
            .unwrap_or_else(|| self.default_mode())
    }

    /// Executor that should service a call on `target`
    ///
    /// The target's executor override for the effective mode is preferred
    /// over the registry singleton.
    pub fn resolve<O>(&self, target: &O, explicit: Option<GreenMode>) -> GreenResult<Arc<dyn Executor>>
    where
        O: GreenTarget + ?Sized,
    {
        let mode = self.effective_mode(target, explicit);
        match target.executor_override(mode) {
            Some(executor) => Ok(executor),
            None => self.registry.get(mode),
        }
    }
}

impl fmt::Debug for GreenRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenRuntime")
            .field("default_mode", &self.default_mode())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Singleton executor for `mode` from the global runtime
pub fn get_executor(mode: GreenMode) -> GreenResult<Arc<dyn Executor>> {
    GreenRuntime::global().executor(mode)
}

/// Current process-wide default mode
pub fn default_mode() -> GreenMode {
    GreenRuntime::global().default_mode()
}

/// Change the process-wide default mode (applications only)
pub fn set_default_mode(mode: GreenMode) -> GreenResult<()> {
    GreenRuntime::global().set_default_mode(mode)
}

/// Resolve the executor for a call on `target` against the global runtime
pub fn resolve_executor<O>(target: &O, explicit: Option<GreenMode>) -> GreenResult<Arc<dyn Executor>>
where
    O: GreenTarget + ?Sized,
{
    GreenRuntime::global().resolve(target, explicit)
}
