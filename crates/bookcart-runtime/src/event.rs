#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Models receive events through `From<Event>` on their message type. Input
//! arrives as whole text lines (one user gesture per line); ticks are
//! produced by the runtime when a `Cmd::Tick` elapses.

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One line of user input, without the trailing newline.
    Input(String),

    /// A tick event from the runtime.
    ///
    /// Fired when a scheduled tick duration elapses.
    Tick,
}

impl Event {
    /// Build an input event from anything string-like.
    pub fn input(line: impl Into<String>) -> Self {
        Self::Input(line.into())
    }

    /// The input text, if this is an input event.
    #[must_use]
    pub fn as_input(&self) -> Option<&str> {
        match self {
            Self::Input(line) => Some(line),
            Self::Tick => None,
        }
    }
}
