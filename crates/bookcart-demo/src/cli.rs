#![forbid(unsafe_code)]

//! Command-line argument parsing for the bookcart demo.
//!
//! Parses args manually and supports environment variable overrides via the
//! `BOOKCART_*` prefix. Flags beat environment variables, which beat
//! defaults.

use crate::session::SessionMode;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest accepted `--time-scale`.
pub const MAX_TIME_SCALE: f64 = 100.0;

pub const HELP_TEXT: &str = "\
bookcart: a line-driven bookstore

USAGE:
    bookcart [OPTIONS]

OPTIONS:
    --mode=MODE          What to run: 'store' (default), 'shelf' or 'session'
    --state=PATH         State file (default: $XDG_STATE_HOME/bookcart/state.json)
    --memory             Keep state in memory only; nothing survives exit
    --catalog=PATH       Load the catalog from a JSON file instead of the built-in one
    --session=KIND       Session timers: 'sequential' (default) or 'concurrent'
    --user=NAME          User name for the session script (default: guest)
    --time-scale=F       Multiply session delays by F, 0 to 100, 0 for instant (default: 1)
    --help, -h           Show this help message
    --version, -V        Show version

MODES:
    store      Browse the catalog, fill the cart and check out
    shelf      Add, edit, delete and search your own book list
    session    Replay the timed login-to-logout script

ENVIRONMENT VARIABLES:
    BOOKCART_MODE         Override --mode
    BOOKCART_STATE        Override --state
    BOOKCART_MEMORY       Set to 1 for --memory
    BOOKCART_CATALOG      Override --catalog
    BOOKCART_SESSION      Override --session
    BOOKCART_USER         Override --user
    BOOKCART_TIME_SCALE   Override --time-scale
    BOOKCART_LOG          Log filter (falls back to RUST_LOG, then 'warn')";

/// Which front-end to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Store,
    Shelf,
    Session,
}

impl RunMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "store" | "shop" => Some(Self::Store),
            "shelf" | "crud" => Some(Self::Shelf),
            "session" | "script" => Some(Self::Session),
            _ => None,
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Front-end to run.
    pub mode: RunMode,
    /// Explicit state file; `None` uses the per-user default.
    pub state_path: Option<PathBuf>,
    /// Use in-memory storage.
    pub memory: bool,
    /// Catalog file; `None` uses the built-in catalog.
    pub catalog: Option<PathBuf>,
    /// Session timer mode.
    pub session: SessionMode,
    /// Session user name.
    pub user: String,
    /// Session delay multiplier.
    pub time_scale: f64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            mode: RunMode::Store,
            state_path: None,
            memory: false,
            catalog: None,
            session: SessionMode::Sequential,
            user: "guest".into(),
            time_scale: 1.0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    Run(Opts),
    Help,
    Version,
}

/// A flag or environment value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// A value did not parse.
    InvalidValue { flag: &'static str, value: String },
    /// An argument matched nothing.
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_mode(flag: &'static str, value: &str) -> Result<RunMode, CliError> {
    RunMode::parse(value).ok_or_else(|| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn parse_session(flag: &'static str, value: &str) -> Result<SessionMode, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

fn parse_scale(flag: &'static str, value: &str) -> Result<f64, CliError> {
    match value.trim().parse::<f64>() {
        Ok(n) if (0.0..=MAX_TIME_SCALE).contains(&n) => Ok(n),
        _ => Err(CliError::InvalidValue {
            flag,
            value: value.to_string(),
        }),
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on bad input.
    pub fn parse() -> Self {
        match Self::parse_from(|key| env::var(key).ok(), env::args().skip(1)) {
            Ok(CliAction::Run(opts)) => opts,
            Ok(CliAction::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(CliAction::Version) => {
                println!("bookcart {VERSION}");
                process::exit(0);
            }
            Err(e) => {
                eprintln!("{e}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse from an explicit environment lookup and argument list.
    pub fn parse_from<I, S>(
        lookup: impl Fn(&str) -> Option<String>,
        args: I,
    ) -> Result<CliAction, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = lookup("BOOKCART_MODE") {
            opts.mode = parse_mode("BOOKCART_MODE", &val)?;
        }
        if let Some(val) = lookup("BOOKCART_STATE") {
            opts.state_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("BOOKCART_MEMORY") {
            opts.memory = truthy(&val);
        }
        if let Some(val) = lookup("BOOKCART_CATALOG") {
            opts.catalog = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("BOOKCART_SESSION") {
            opts.session = parse_session("BOOKCART_SESSION", &val)?;
        }
        if let Some(val) = lookup("BOOKCART_USER")
            && !val.trim().is_empty()
        {
            opts.user = val;
        }
        if let Some(val) = lookup("BOOKCART_TIME_SCALE") {
            opts.time_scale = parse_scale("BOOKCART_TIME_SCALE", &val)?;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(CliAction::Help),
                "--version" | "-V" => return Ok(CliAction::Version),
                "--memory" => opts.memory = true,
                other => {
                    if let Some(val) = other.strip_prefix("--mode=") {
                        opts.mode = parse_mode("--mode", val)?;
                    } else if let Some(val) = other.strip_prefix("--state=") {
                        opts.state_path = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--catalog=") {
                        opts.catalog = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--session=") {
                        opts.session = parse_session("--session", val)?;
                    } else if let Some(val) = other.strip_prefix("--user=") {
                        if val.trim().is_empty() {
                            return Err(CliError::InvalidValue {
                                flag: "--user",
                                value: val.to_string(),
                            });
                        }
                        opts.user = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--time-scale=") {
                        opts.time_scale = parse_scale("--time-scale", val)?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(CliAction::Run(opts))
    }
}
