#![forbid(unsafe_code)]

//! bookcart binary entry point.

use bookcart_demo::app;
use bookcart_demo::cli;
use bookcart_demo::logging::{self, LogConfig};
use std::io;

fn main() {
    let opts = cli::Opts::parse();
    logging::init(&LogConfig::default());
    tracing::debug!(?opts, "starting");

    let stdin = io::stdin();
    if let Err(e) = app::run(&opts, stdin.lock(), io::stdout()) {
        eprintln!("bookcart: {e}");
        std::process::exit(1);
    }
}
