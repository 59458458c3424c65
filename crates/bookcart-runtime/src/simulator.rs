#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without any real input or output,
//! enabling deterministic event injection, frame capture, and virtual-time
//! tick delivery.
//!
//! # Example
//!
//! ```ignore
//! use bookcart_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(store);
//! sim.init();
//! sim.input_lines(&["add 3", "cart"]);
//! assert!(sim.capture_frame().contains("1 items in cart"));
//! assert!(sim.notices().is_empty());
//! ```

use crate::event::Event;
use crate::frame::Frame;
use crate::program::{Cmd, Model};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    /// No-op command.
    None,
    /// Quit command.
    Quit,
    /// Message sent to model (not stored, just noted).
    Msg,
    /// Batch of commands.
    Batch(usize),
    /// Sequence of commands.
    Sequence(usize),
    /// Tick scheduled.
    Tick(Duration),
    /// Log message emitted.
    Log(String),
    /// User notice emitted.
    Notify(String),
}

/// Deterministic simulator for [`Model`] testing.
///
/// Ticks are queued rather than slept through; [`fire_tick`](Self::fire_tick)
/// advances a virtual clock by the tick's duration and delivers
/// [`Event::Tick`].
pub struct ProgramSimulator<M: Model> {
    /// The application model.
    model: M,
    /// Captured frames.
    frames: Vec<Frame>,
    /// Record of all executed commands.
    command_log: Vec<CmdRecord>,
    /// Whether the simulated program is still running.
    running: bool,
    /// Scheduled ticks not yet delivered.
    pending_ticks: VecDeque<Duration>,
    /// Virtual time consumed by delivered ticks.
    elapsed: Duration,
    /// Log messages emitted via Cmd::Log.
    logs: Vec<String>,
    /// Notices emitted via Cmd::Notify.
    notices: Vec<String>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model.
    ///
    /// The model is not initialized until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            pending_ticks: VecDeque::new(),
            elapsed: Duration::ZERO,
            logs: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Initialize the model by calling `Model::init()` and executing returned commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Inject events into the model.
    ///
    /// Each event is converted to a message via `From<Event>` and dispatched
    /// through `Model::update()`. Commands returned from update are executed.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    /// Inject a single event into the model.
    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Inject each line as an [`Event::Input`].
    pub fn input_lines(&mut self, lines: &[&str]) {
        let events: Vec<Event> = lines.iter().map(|l| Event::input(*l)).collect();
        self.inject_events(&events);
    }

    /// Send a specific message to the model.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Deliver the oldest pending tick, advancing the virtual clock.
    ///
    /// Returns the tick's duration, or `None` when nothing is scheduled.
    pub fn fire_tick(&mut self) -> Option<Duration> {
        if !self.running {
            return None;
        }
        let duration = self.pending_ticks.pop_front()?;
        self.elapsed += duration;
        self.inject_event(Event::Tick);
        Some(duration)
    }

    /// Deliver ticks until none are pending or the model quits.
    ///
    /// Returns the number of ticks delivered.
    pub fn run_ticks(&mut self) -> usize {
        let mut fired = 0;
        while self.fire_tick().is_some() {
            fired += 1;
        }
        fired
    }

    /// Render the model into a fresh frame and store it.
    pub fn capture_frame(&mut self) -> &Frame {
        let mut frame = Frame::new();
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    /// Get all captured frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Get the most recently captured frame, if any.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Check if the simulated program is still running.
    ///
    /// Returns `false` after a `Cmd::Quit` has been executed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks scheduled but not yet delivered.
    pub fn pending_ticks(&self) -> usize {
        self.pending_ticks.len()
    }

    /// Virtual time consumed by delivered ticks.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get all log messages emitted via `Cmd::Log`.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Get all notices emitted via `Cmd::Notify`.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Get the command execution log.
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Clear all logs and notices.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.notices.clear();
    }

    /// Execute a command without IO.
    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {
                self.command_log.push(CmdRecord::None);
            }
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.pending_ticks.push_back(duration);
                self.command_log.push(CmdRecord::Tick(duration));
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
            Cmd::Notify(text) => {
                self.command_log.push(CmdRecord::Notify(text.clone()));
                self.notices.push(text);
            }
        }
    }
}
