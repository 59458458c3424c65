#![forbid(unsafe_code)]

//! bookcart runtime
//!
//! This crate provides the runtime pieces the bookcart models are built on.
//!
//! # Key Components
//!
//! - [`Model`] - Trait for application state and behavior
//! - [`Cmd`] - Commands for side effects
//! - [`Program`] - Line-driven runner that renders frames to a writer
//! - [`ProgramSimulator`] - Deterministic runner for tests
//! - [`StorageBackend`] - Durable key-value store seam
//! - [`StateSlot`] - Typed, failure-tolerant handle on one storage key
//!
//! # How it fits in the system
//! `bookcart-core` implements [`Model`] for its front-ends and persists
//! through [`StateSlot`]; `bookcart-demo` picks a [`StorageBackend`] and
//! hands the model to a [`Program`].

pub mod event;
pub mod frame;
pub mod program;
pub mod simulator;
pub mod state_persistence;

pub use event::Event;
pub use frame::Frame;
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::{CmdRecord, ProgramSimulator};

// State persistence
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    MemoryStorage, OpCounts, SlotStats, StateSlot, StorageBackend, StorageError, StorageResult,
};
