#![forbid(unsafe_code)]

//! Elm-style program runtime.
//!
//! This module provides the core types for building applications with a
//! Model-View-Update architecture:
//!
//! - [`Model`] - application state with `init`, `update` and `view`
//! - [`Cmd`] - side effects returned from `update`
//! - [`Program`] - runs a model against a line-oriented input stream
//!
//! The runtime is single-threaded: one input line becomes one event, the
//! event is converted to a message, `update` runs, and the returned commands
//! execute to completion before the next line is read. Ticks scheduled with
//! [`Cmd::Tick`] are slept through on the same thread.
//!
//! # Example
//!
//! ```ignore
//! use bookcart_runtime::{Cmd, Event, Frame, Model, Program};
//!
//! struct Counter { count: i32 }
//!
//! enum Msg { Increment, Quit, Noop }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event.as_input() {
//!             Some("+") => Msg::Increment,
//!             Some("q") => Msg::Quit,
//!             _ => Msg::Noop,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!             Msg::Noop => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         frame.line(format!("Count: {}", self.count));
//!     }
//! }
//! ```

use crate::event::Event;
use crate::frame::Frame;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// The Model trait defines application state and behavior.
///
/// Implementations define how the application responds to events
/// and renders its current state.
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Messages represent actions that update the model state.
    /// Must be convertible from input events.
    type Message: From<Event> + Send + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    ///
    /// This is the core state transition function. Returns commands
    /// for any side effects that should be executed.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state to a frame.
    fn view(&self, frame: &mut Frame);
}

/// Commands represent side effects to be executed by the runtime.
///
/// Commands are returned from `init()` and `update()` to trigger
/// actions like quitting, sending messages, or scheduling ticks.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands as a batch (currently sequential).
    Batch(Vec<Cmd<M>>),
    /// Execute commands sequentially.
    Sequence(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver an [`Event::Tick`] after a duration.
    Tick(Duration),
    /// Write a log line to the program output.
    Log(String),
    /// Show a notice to the user (confirmation, refusal, ...).
    Notify(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
            Self::Notify(s) => f.debug_tuple("Notify").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a quit command.
    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a user notice command.
    #[inline]
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    /// Create a tick command.
    #[inline]
    pub fn tick(duration: Duration) -> Self {
        Self::Tick(duration)
    }

    /// Create a batch of commands.
    pub fn batch(mut cmds: Vec<Self>) -> Self {
        if cmds.len() > 1 {
            return Self::Batch(cmds);
        }
        cmds.pop().unwrap_or(Self::None)
    }

    /// Create a sequence of commands.
    pub fn sequence(mut cmds: Vec<Self>) -> Self {
        if cmds.len() > 1 {
            return Self::Sequence(cmds);
        }
        cmds.pop().unwrap_or(Self::None)
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Log(_) => "Log",
            Self::Notify(_) => "Notify",
        }
    }

    /// Whether this command does nothing.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Longest a single scaled tick may sleep.
pub const MAX_TICK_DELAY: Duration = Duration::from_secs(60 * 60);

/// Configuration for [`Program`].
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Render the model after init and after every input line.
    pub render: bool,
    /// Multiplier applied to every tick duration before sleeping.
    ///
    /// `1.0` sleeps for real; `0.0` fires ticks immediately.
    pub time_scale: f64,
    /// Text written before reading each input line.
    pub prompt: Option<String>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            render: true,
            time_scale: 1.0,
            prompt: None,
        }
    }
}

impl ProgramConfig {
    /// Configuration for scripted output: no rendering, no prompt.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            render: false,
            ..Self::default()
        }
    }

    /// Set the tick time scale.
    #[must_use]
    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    /// Set the input prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    fn scaled(&self, duration: Duration) -> Duration {
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(duration.as_secs_f64() * self.time_scale)
            .map_or(MAX_TICK_DELAY, |d| d.min(MAX_TICK_DELAY))
    }
}

/// Runs a [`Model`] against line-oriented input, writing frames, logs and
/// notices to `out`.
pub struct Program<M: Model, W: Write> {
    model: M,
    out: W,
    config: ProgramConfig,
    running: bool,
    pending_ticks: VecDeque<Duration>,
}

impl<M: Model, W: Write> Program<M, W> {
    /// Create a program with the default configuration.
    pub fn new(model: M, out: W) -> Self {
        Self::with_config(model, out, ProgramConfig::default())
    }

    /// Create a program with an explicit configuration.
    pub fn with_config(model: M, out: W, config: ProgramConfig) -> Self {
        Self {
            model,
            out,
            config,
            running: true,
            pending_ticks: VecDeque::new(),
        }
    }

    /// Initialize the model, then feed it every line of `input` until the
    /// input ends or the model quits.
    pub fn run<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        self.start()?;
        let mut lines = input.lines();
        while self.running {
            self.prompt()?;
            let Some(line) = lines.next() else {
                break;
            };
            self.dispatch(Event::Input(line?))?;
            self.settle()?;
        }
        debug!(running = self.running, "program finished");
        Ok(())
    }

    /// Initialize the model and run until no ticks remain, without reading
    /// any input.
    pub fn run_until_idle(&mut self) -> io::Result<()> {
        self.start()
    }

    /// Get a reference to the model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Consume the program, returning the model and the output sink.
    pub fn into_parts(self) -> (M, W) {
        (self.model, self.out)
    }

    /// Whether the model has not quit yet.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> io::Result<()> {
        let cmd = self.model.init();
        self.execute(cmd)?;
        self.settle()
    }

    fn settle(&mut self) -> io::Result<()> {
        self.drain_ticks()?;
        if self.config.render && self.running {
            let mut frame = Frame::new();
            self.model.view(&mut frame);
            write!(self.out, "{frame}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        if let Some(prompt) = &self.config.prompt {
            write!(self.out, "{prompt}")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> io::Result<()> {
        let msg = M::Message::from(event);
        let cmd = self.model.update(msg);
        self.execute(cmd)
    }

    fn drain_ticks(&mut self) -> io::Result<()> {
        while self.running {
            let Some(duration) = self.pending_ticks.pop_front() else {
                break;
            };
            let delay = self.config.scaled(duration);
            trace!(?duration, ?delay, "sleeping for tick");
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            self.dispatch(Event::Tick)?;
        }
        Ok(())
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        trace!(cmd = cmd.type_name(), "executing command");
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                self.running = false;
            }
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute(cmd)?;
            }
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => {
                self.pending_ticks.push_back(duration);
            }
            Cmd::Log(text) => {
                writeln!(self.out, "{text}")?;
            }
            Cmd::Notify(text) => {
                writeln!(self.out, "** {text}")?;
            }
        }
        Ok(())
    }
}
