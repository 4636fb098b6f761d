/*!
 * Core Module
 * Green modes, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod mode;

// Re-export for convenience
pub use config::GreenConfig;
pub use errors::{GreenError, GreenResult};
pub use mode::GreenMode;
