#![forbid(unsafe_code)]

//! Scripted session: a fixed chain of timed steps.
//!
//! The script logs in, fetches data, calculates, sends a message and logs
//! out, each after its own delay. In [`SessionMode::Sequential`] every timer
//! starts when the previous step fires. In [`SessionMode::Concurrent`] all
//! timers start at once, so steps complete in delay order, with ties kept in
//! declaration order.
//!
//! The model never sleeps. It asks the runtime for one `Cmd::Tick` per gap
//! between completions, which lets `ProgramSimulator` replay a whole
//! session in virtual time.

use bookcart_runtime::{Cmd, Event, Frame, Model};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One step of the script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Login,
    FetchData,
    Calculate,
    SendMessage,
    Logout,
}

impl StepKind {
    /// All steps in declaration order.
    pub const ALL: [StepKind; 5] = [
        StepKind::Login,
        StepKind::FetchData,
        StepKind::Calculate,
        StepKind::SendMessage,
        StepKind::Logout,
    ];

    /// How long the step's timer runs.
    #[must_use]
    pub const fn delay(self) -> Duration {
        match self {
            StepKind::Login => Duration::from_millis(1000),
            StepKind::FetchData => Duration::from_millis(8000),
            StepKind::Calculate | StepKind::SendMessage | StepKind::Logout => {
                Duration::from_millis(3000)
            }
        }
    }

    /// Line printed when the step completes.
    #[must_use]
    pub fn message(self, user: &str) -> String {
        match self {
            StepKind::Login => format!("{user} logged in successfully"),
            StepKind::FetchData => "Data fetched successfully".to_string(),
            StepKind::Calculate => "Data calculated successfully".to_string(),
            StepKind::SendMessage => "Message sent successfully".to_string(),
            StepKind::Logout => format!("{user} logged out successfully"),
        }
    }
}

/// How step timers relate to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Each timer starts when the previous step completes.
    #[default]
    Sequential,
    /// All timers start together.
    Concurrent,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionMode::Sequential => "sequential",
            SessionMode::Concurrent => "concurrent",
        })
    }
}

/// Unrecognized session mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError(pub String);

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown session mode {:?} (expected sequential or concurrent)", self.0)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for SessionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "callback" => Ok(SessionMode::Sequential),
            "concurrent" | "conc" | "parallel" => Ok(SessionMode::Concurrent),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Completion times for `steps` under `mode`, in completion order.
///
/// Times are measured from the start of the session.
#[must_use]
pub fn schedule(mode: SessionMode, steps: &[StepKind]) -> Vec<(Duration, StepKind)> {
    match mode {
        SessionMode::Sequential => {
            let mut at = Duration::ZERO;
            steps
                .iter()
                .map(|&step| {
                    at += step.delay();
                    (at, step)
                })
                .collect()
        }
        SessionMode::Concurrent => {
            let mut timeline: Vec<(Duration, StepKind)> =
                steps.iter().map(|&step| (step.delay(), step)).collect();
            // Stable: equal delays keep declaration order.
            timeline.sort_by_key(|&(at, _)| at);
            timeline
        }
    }
}

/// Messages understood by [`SessionScript`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMsg {
    /// The pending timer fired.
    Tick,
    /// Stop early.
    Quit,
    /// Input the script ignores.
    Ignore,
}

impl From<Event> for SessionMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Tick => SessionMsg::Tick,
            Event::Input(line) if matches!(line.trim(), "q" | "quit" | "exit") => SessionMsg::Quit,
            Event::Input(_) => SessionMsg::Ignore,
        }
    }
}

/// The scripted session model.
#[derive(Debug, Clone)]
pub struct SessionScript {
    user: String,
    mode: SessionMode,
    timeline: Vec<(Duration, StepKind)>,
    done: usize,
    clock: Duration,
}

impl SessionScript {
    /// Script every step for `user`.
    #[must_use]
    pub fn new(user: impl Into<String>, mode: SessionMode) -> Self {
        Self::with_steps(user, mode, &StepKind::ALL)
    }

    /// Script a custom chain of steps.
    #[must_use]
    pub fn with_steps(user: impl Into<String>, mode: SessionMode, steps: &[StepKind]) -> Self {
        Self {
            user: user.into(),
            mode,
            timeline: schedule(mode, steps),
            done: 0,
            clock: Duration::ZERO,
        }
    }

    /// Steps completed so far, in completion order.
    pub fn completed(&self) -> impl Iterator<Item = StepKind> + '_ {
        self.timeline[..self.done].iter().map(|&(_, step)| step)
    }

    /// Whether every step has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done == self.timeline.len()
    }

    /// Script time at the last completion.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Timer mode.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    fn wait_for_next(&self) -> Cmd<SessionMsg> {
        match self.timeline.get(self.done) {
            Some(&(at, _)) => Cmd::tick(at.saturating_sub(self.clock)),
            None => Cmd::quit(),
        }
    }
}

impl Model for SessionScript {
    type Message = SessionMsg;

    fn init(&mut self) -> Cmd<SessionMsg> {
        tracing::debug!(mode = %self.mode, steps = self.timeline.len(), "session started");
        self.wait_for_next()
    }

    fn update(&mut self, msg: SessionMsg) -> Cmd<SessionMsg> {
        match msg {
            SessionMsg::Tick => {
                let Some(&(at, step)) = self.timeline.get(self.done) else {
                    return Cmd::none();
                };
                self.clock = at;
                self.done += 1;
                tracing::debug!(?step, at_ms = at.as_millis(), "step completed");
                Cmd::sequence(vec![Cmd::log(step.message(&self.user)), self.wait_for_next()])
            }
            SessionMsg::Quit => Cmd::quit(),
            SessionMsg::Ignore => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        frame.line(format!(
            "session ({}) for {}: {}/{} steps done",
            self.mode,
            self.user,
            self.done,
            self.timeline.len()
        ));
        for step in self.completed() {
            frame.line(format!("  {}", step.message(&self.user)));
        }
    }
}
