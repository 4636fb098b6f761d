/*!
 * Executor Registry
 *
 * Maps each green mode to its singleton executor. Synchronous is always
 * available and costs nothing; every other mode is built by its provider
 * on first request and cached for the life of the registry.
 *
 * ## Single-flight construction
 *
 * Each mode owns a `OnceCell`. Concurrent first requests for the same mode
 * block on the cell while one of them builds, so a backend is never started
 * twice. A failed build leaves the cell empty; the next request retries.
 */

pub mod provider;

pub use provider::{provider_fn, ExecutorProvider, FnProvider};

use crate::core::{GreenConfig, GreenError, GreenMode, GreenResult};
use crate::executor::{Executor, SynchronousExecutor};
use ahash::HashMap;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

struct Slot {
    provider: Box<dyn ExecutorProvider>,
    executor: OnceCell<Arc<dyn Executor>>,
}

/// Lazily populated mode → executor cache
pub struct ExecutorRegistry {
    slots: HashMap<GreenMode, Slot>,
}

impl ExecutorRegistry {
    /// Registry that only knows the synchronous mode
    pub fn empty() -> Self {
        Self {
            slots: HashMap::default(),
        }
    }

    /// Registry with a provider for every backend compiled in
    pub fn with_default_providers(config: &GreenConfig) -> Self {
        crate::backends::default_providers(config)
            .into_iter()
            .fold(Self::empty(), |registry, provider| registry.with_boxed_provider(provider))
    }

    /// Register (or replace) the provider for the provider's mode
    pub fn with_provider(self, provider: impl ExecutorProvider + 'static) -> Self {
        self.with_boxed_provider(Box::new(provider))
    }

    fn with_boxed_provider(mut self, provider: Box<dyn ExecutorProvider>) -> Self {
        let mode = provider.mode();
        if mode.is_synchronous() {
            warn!("Ignoring provider for synchronous mode, the built-in executor is always used");
            return self;
        }
        self.slots.insert(
            mode,
            Slot {
                provider,
                executor: OnceCell::new(),
            },
        );
        self
    }

    /// Get the singleton executor for `mode`, building it on first use
    pub fn get(&self, mode: GreenMode) -> GreenResult<Arc<dyn Executor>> {
        if mode.is_synchronous() {
            return Ok(SynchronousExecutor::shared());
        }

        let slot = self.slots.get(&mode).ok_or_else(|| {
            GreenError::Configuration(format!("no executor provider for {} mode", mode))
        })?;

        slot.executor
            .get_or_try_init(|| {
                let executor = slot.provider.build()?;
                if executor.mode() != mode {
                    return Err(GreenError::Configuration(format!(
                        "provider for {} mode built a {} executor",
                        mode,
                        executor.mode()
                    )));
                }
                info!(mode = %mode, "Executor initialized");
                Ok(executor)
            })
            .map(Arc::clone)
    }

    /// Whether `mode` can be resolved at all
    pub fn supports(&self, mode: GreenMode) -> bool {
        mode.is_synchronous() || self.slots.contains_key(&mode)
    }

    /// Whether the executor for `mode` has already been built
    pub fn is_initialized(&self, mode: GreenMode) -> bool {
        mode.is_synchronous()
            || self
                .slots
                .get(&mode)
                .map_or(false, |slot| slot.executor.get().is_some())
    }

    /// Modes whose executors exist right now, in declaration order
    pub fn initialized_modes(&self) -> Vec<GreenMode> {
        GreenMode::ALL
            .into_iter()
            .filter(|mode| self.is_initialized(*mode))
            .collect()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::with_default_providers(&GreenConfig::default())
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modes: Vec<_> = self.slots.keys().copied().collect();
        modes.sort();
        f.debug_struct("ExecutorRegistry")
            .field("providers", &modes)
            .field("initialized", &self.initialized_modes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::same_executor;

    #[test]
    fn test_empty_registry_only_knows_synchronous() {
        let registry = ExecutorRegistry::empty();
        assert!(registry.supports(GreenMode::Synchronous));
        assert!(registry.get(GreenMode::Synchronous).is_ok());

        let err = registry.get(GreenMode::Futures).unwrap_err();
        assert!(matches!(err, GreenError::Configuration(_)));
    }

    #[test]
    fn test_mismatched_provider_is_rejected() {
        let registry = ExecutorRegistry::empty().with_provider(provider_fn(GreenMode::Futures, || {
            Ok(SynchronousExecutor::shared())
        }));
        assert!(registry.get(GreenMode::Futures).unwrap_err().is_configuration());
        assert!(!registry.is_initialized(GreenMode::Futures));
    }

    #[test]
    fn test_synchronous_provider_is_ignored() {
        let registry = ExecutorRegistry::empty().with_provider(provider_fn(
            GreenMode::Synchronous,
            || Err(GreenError::Internal("never called".into())),
        ));
        let executor = registry.get(GreenMode::Synchronous).unwrap();
        assert!(same_executor(&executor, &SynchronousExecutor::shared()));
    }
}
