//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! `RUST_LOG` always wins. Without it, our crates log at the level chosen on
//! the command line and everything else stays at `warn`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Logging options derived from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    /// Single-line output without timestamps, for interactive commands.
    pub compact: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            compact: false,
        }
    }
}

impl LogConfig {
    /// Map `-v`/`-q` counts to a level.
    ///
    /// - `-q`: warn, `-qq`: error
    /// - none: info
    /// - `-v`: debug, `-vv`: trace
    pub fn from_verbosity(verbose: u8, quiet: u8) -> Self {
        let level = match i16::from(verbose) - i16::from(quiet) {
            ..=-2 => Level::ERROR,
            -1 => Level::WARN,
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config.level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.compact {
        builder.compact().without_time().init();
    } else {
        builder.init();
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("warn,qr_labels={level},qr_labels_lib={level},label_engine={level},row_source={level}")
}
