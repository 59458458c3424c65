#![forbid(unsafe_code)]

//! Wiring from parsed options to a running program.

use crate::cli::{Opts, RunMode};
use crate::session::SessionScript;
use bookcart_core::{Catalog, CatalogError, Shelf, ShelfApp, Storefront};
use bookcart_runtime::state_persistence::{FileStorage, MemoryStorage, StorageBackend};
use bookcart_runtime::{Model, Program, ProgramConfig};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Application name used for the default state location.
pub const APP_NAME: &str = "bookcart";

/// Prompt printed before each input line.
pub const PROMPT: &str = "> ";

/// Errors that end a run.
#[derive(Debug)]
pub enum AppError {
    /// The catalog file could not be used.
    Catalog(CatalogError),
    /// Reading input or writing output failed.
    Io(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// The storage backend selected by `opts`.
pub fn open_backend(opts: &Opts) -> Arc<dyn StorageBackend> {
    if opts.memory {
        return Arc::new(MemoryStorage::new());
    }
    let storage = match &opts.state_path {
        Some(path) => FileStorage::new(path),
        None => FileStorage::default_for_app(APP_NAME),
    };
    tracing::debug!(path = %storage.path().display(), "using file storage");
    Arc::new(storage)
}

/// The catalog selected by `opts`.
pub fn load_catalog(opts: &Opts) -> Result<Catalog, CatalogError> {
    match &opts.catalog {
        Some(path) => Catalog::load(path),
        None => Ok(Catalog::builtin()),
    }
}

/// Run the front-end chosen by `opts` over `input`, writing to `out`.
pub fn run<R: BufRead, W: Write>(opts: &Opts, input: R, out: W) -> Result<(), AppError> {
    match opts.mode {
        RunMode::Store => {
            let catalog = load_catalog(opts)?;
            let store = Storefront::open(catalog, open_backend(opts));
            interactive(store, input, out)
        }
        RunMode::Shelf => {
            let shelf = ShelfApp::new(Shelf::open(open_backend(opts)));
            interactive(shelf, input, out)
        }
        RunMode::Session => {
            let script = SessionScript::new(opts.user.clone(), opts.session);
            let config = ProgramConfig::headless().with_time_scale(opts.time_scale);
            let mut program = Program::with_config(script, out, config);
            program.run_until_idle()?;
            Ok(())
        }
    }
}

fn interactive<M: Model, R: BufRead, W: Write>(model: M, input: R, out: W) -> Result<(), AppError> {
    let config = ProgramConfig::default().with_prompt(PROMPT);
    let mut program = Program::with_config(model, out, config);
    program.run(input)?;
    Ok(())
}
