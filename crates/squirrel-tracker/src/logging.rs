//! Tracing setup for the `squirrels` binary.
//!
//! Everything is written to stderr so that tables and JSON on stdout can be
//! piped without log lines mixed in. The default level is `warn`; lifecycle
//! events (saves, toggles, local removals) are logged at `info` and store
//! traffic at `debug`.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much the binary logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings, such as a list that could not be reloaded.
    #[default]
    Normal,
    /// Lifecycle events (`-v`).
    Verbose,
    /// Store traffic as well (`-vv` and up).
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the number of `-v` flags to a verbosity.
    ///
    /// `-q` wins over any number of `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level that gets through.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Trace => Level::DEBUG,
        }
    }

    /// Filter directive used when `RUST_LOG` is not set.
    ///
    /// Only this crate's targets are enabled; dependencies stay silent.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        format!("squirrel_tracker={}", self.to_level_filter())
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the directive derived from `verbosity` when set.
/// Calling this again after a subscriber is installed does nothing.
///
/// ```no_run
/// use squirrel_tracker::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time();

    // A second install fails; that is fine in tests.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 4), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
    }

    #[test]
    fn test_level_per_verbosity() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::default().to_level_filter(), Level::WARN);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::DEBUG);
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(Verbosity::Normal.filter_directive(), "squirrel_tracker=WARN");
        assert_eq!(Verbosity::Trace.filter_directive(), "squirrel_tracker=DEBUG");
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
