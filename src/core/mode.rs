/*!
 * Green Modes
 * Closed set of concurrency backends an operation can be dispatched to
 */

use super::errors::GreenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Concurrency mode used to dispatch an operation
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GreenMode {
    /// Blocking call on the caller's thread
    #[default]
    Synchronous = 0,
    /// Cooperative green threads on a single hub thread
    Greenlets = 1,
    /// Thread pool futures
    Futures = 2,
    /// Tasks on a single-threaded event loop
    EventLoop = 3,
}

impl GreenMode {
    /// Every mode, in declaration order
    pub const ALL: [GreenMode; 4] = [
        GreenMode::Synchronous,
        GreenMode::Greenlets,
        GreenMode::Futures,
        GreenMode::EventLoop,
    ];

    /// Stable lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            GreenMode::Synchronous => "synchronous",
            GreenMode::Greenlets => "greenlets",
            GreenMode::Futures => "futures",
            GreenMode::EventLoop => "event_loop",
        }
    }

    #[inline]
    pub const fn is_synchronous(self) -> bool {
        matches!(self, GreenMode::Synchronous)
    }

    pub(crate) const fn from_repr(value: u8) -> Self {
        match value {
            1 => GreenMode::Greenlets,
            2 => GreenMode::Futures,
            3 => GreenMode::EventLoop,
            _ => GreenMode::Synchronous,
        }
    }
}

impl fmt::Display for GreenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GreenMode {
    type Err = GreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "synchronous" | "sync" => Ok(GreenMode::Synchronous),
            "greenlets" | "greenlet" | "gevent" | "cooperative" => Ok(GreenMode::Greenlets),
            "futures" | "threadpool" | "pool" => Ok(GreenMode::Futures),
            "eventloop" | "asyncio" | "async" => Ok(GreenMode::EventLoop),
            _ => Err(GreenError::Configuration(format!(
                "unknown green mode '{}'",
                s.trim()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Synchronous".parse::<GreenMode>().unwrap(), GreenMode::Synchronous);
        assert_eq!("gevent".parse::<GreenMode>().unwrap(), GreenMode::Greenlets);
        assert_eq!("FUTURES".parse::<GreenMode>().unwrap(), GreenMode::Futures);
        assert_eq!("thread-pool".parse::<GreenMode>().unwrap(), GreenMode::Futures);
        assert_eq!(" asyncio ".parse::<GreenMode>().unwrap(), GreenMode::EventLoop);
        assert_eq!("event_loop".parse::<GreenMode>().unwrap(), GreenMode::EventLoop);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "tornado".parse::<GreenMode>().unwrap_err();
        assert!(matches!(err, GreenError::Configuration(_)));
    }

    #[test]
    fn test_repr_roundtrip() {
        for mode in GreenMode::ALL {
            assert_eq!(GreenMode::from_repr(mode as u8), mode);
            assert_eq!(mode.as_str().parse::<GreenMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&GreenMode::EventLoop).unwrap();
        assert_eq!(json, "\"event_loop\"");
    }
}
