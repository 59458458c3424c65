#![forbid(unsafe_code)]

//! bookcart demo: command-line front-ends over `bookcart-core`.
//!
//! - [`cli`] - flags and `BOOKCART_*` environment overrides
//! - [`logging`] - stderr tracing subscriber
//! - [`session`] - the timed login-to-logout script
//! - [`app`] - picks storage and catalog, then runs a `Program`

pub mod app;
pub mod cli;
pub mod logging;
pub mod session;
