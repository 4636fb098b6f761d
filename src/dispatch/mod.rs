/*!
 * Dispatch Layer
 *
 * Call-site adapters on top of the runtime:
 * - Targets: per-object mode preference and executor overrides
 * - Green: operation wrapper honoring wait/timeout/mode per call
 * - Callbacks: callbacks re-routed through an executor
 */

pub mod callback;
pub mod green;
pub mod target;

pub use callback::{green_callback, GreenCallback};
pub use green::{Green, GreenCall};
pub use target::{ExecutorMap, GreenBinding, GreenTarget};
