#![forbid(unsafe_code)]

//! Tracing subscriber setup for the demo binary.
//!
//! All diagnostics go to stderr so they never interleave with the rendered
//! frames on stdout. The filter comes from `BOOKCART_LOG`, then `RUST_LOG`,
//! then [`DEFAULT_DIRECTIVE`].
//!
//! ```no_run
//! use bookcart_demo::logging::{self, LogConfig};
//!
//! logging::init(&LogConfig::default());
//! tracing::warn!("visible by default");
//! ```

use std::env;
use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Filter used when no environment variable is set.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Environment variables consulted for the filter, in order.
pub const FILTER_VARS: [&str; 2] = ["BOOKCART_LOG", "RUST_LOG"];

/// Output options for the stderr layer.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Show the tracing target (module path). Default: false.
    pub show_target: bool,
    /// Emit ANSI colors. Default: true.
    pub ansi: bool,
    /// Explicit filter directive, overriding the environment.
    pub directive: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            show_target: false,
            ansi: true,
            directive: None,
        }
    }
}

/// Pick the filter directive from `lookup`, falling back to the default.
pub fn directive_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    FILTER_VARS
        .into_iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Build the filter for `config`, reading the process environment.
///
/// A directive that fails to parse falls back to [`DEFAULT_DIRECTIVE`].
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    let directive = config
        .directive
        .clone()
        .unwrap_or_else(|| directive_from(|var| env::var(var).ok()));
    EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter {directive:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    })
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init(config: &LogConfig) -> bool {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.show_target)
        .with_ansi(config.ansi);
    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(layer)
        .try_init()
        .is_ok()
}
