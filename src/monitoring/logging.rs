//! Structured logging for lazyplug.
//!
//! The loader emits through `tracing`; this installs a subscriber whose
//! verbosity follows the loader's `debug` flag.

use crate::loader::LoaderConfig;
use tracing::Level;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one line per event
    Text,
    /// Compact single-line
    Compact,
}

/// Logger configuration.
#[derive(Clone, Debug)]
pub struct LoggerConfig {
    /// Maximum level emitted
    pub level: Level,
    /// Output format
    pub format: LogFormat,
    /// Include the module target
    pub with_target: bool,
}

impl LoggerConfig {
    /// DEBUG when the loader is in debug mode, INFO otherwise.
    pub fn for_loader(config: &LoaderConfig) -> Self {
        Self {
            level: if config.debug { Level::DEBUG } else { Level::INFO },
            ..Self::default()
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
            with_target: true,
        }
    }
}

/// Install a global fmt subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(config: &LoggerConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.level)
        .with_target(config.with_target);

    match config.format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    }
}

/// Install a subscriber matching the loader's `debug` flag.
pub fn init_tracing(config: &LoaderConfig) -> bool {
    init(&LoggerConfig::for_loader(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_follows_debug_flag() {
        let quiet = LoggerConfig::for_loader(&LoaderConfig::default());
        assert_eq!(quiet.level, Level::INFO);

        let verbose = LoggerConfig::for_loader(&LoaderConfig::default().with_debug(true));
        assert_eq!(verbose.level, Level::DEBUG);
        assert_eq!(verbose.format, LogFormat::Text);
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoaderConfig::default().with_debug(true);
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
