#![forbid(unsafe_code)]

//! Frame = the text lines produced by one render pass.
//!
//! The `Frame` is the render target that `Model::view()` methods write to.
//!
//! # Usage
//!
//! ```
//! use bookcart_runtime::frame::Frame;
//!
//! let mut frame = Frame::new();
//! frame.line("BookStore");
//! frame.blank();
//! assert_eq!(frame.to_text(), "BookStore\n\n");
//! ```

use std::fmt;

/// Text render target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    /// Create an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line.
    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// All lines written so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Join the lines, each terminated by `\n`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_frame_renders_nothing() {
        let frame = Frame::new();
        assert_eq!(frame.height(), 0);
        assert_eq!(frame.to_text(), "");
    }

    #[test]
    fn contains_searches_every_line() {
        let mut frame = Frame::new();
        frame.line("first");
        frame.line("second line");
        assert!(frame.contains("second"));
        assert!(!frame.contains("third"));
    }
}
