//! Display notification for streaming sessions.
//!
//! The session controller pushes updates to a [`DisplayObserver`] as
//! fragments arrive; the UI never polls. Each fragment notification
//! carries the cumulative text of the in-progress assistant turn so a
//! display can re-render the whole message with a typing cursor.

use std::io::{self, Write};

/// ANSI escape code for dim text (used for the streaming cursor).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// The cursor glyph shown at the end of in-progress output.
const CURSOR: &str = "▌";

/// Push interface between a session and its display.
///
/// All methods default to no-ops so observers implement only what they
/// display.
pub trait DisplayObserver: Send {
    /// Called for each streamed fragment with the cumulative text of the
    /// in-progress assistant turn.
    fn fragment(&mut self, cumulative: &str) {
        _ = cumulative;
    }

    /// Called once when a stream completes, with the final text.
    fn completed(&mut self, text: &str) {
        _ = text;
    }

    /// Called once when a stream fails, with a user-displayable message.
    /// The partial output already delivered via `fragment` remains valid.
    fn failed(&mut self, message: &str) {
        _ = message;
    }

    /// Called when the running session cost changes, with the formatted
    /// total (five fractional digits).
    fn cost_updated(&mut self, formatted: &str) {
        _ = formatted;
    }
}

/// An observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl DisplayObserver for NullObserver {}

/// An observer that prints streamed text to stdout.
///
/// Fragment notifications carry cumulative text, so this impl tracks how
/// much it has already printed and emits only the delta.
pub struct PlainTextObserver {
    stdout: io::Stdout,
    printed: usize,
    use_color: bool,
}

impl PlainTextObserver {
    /// Creates an observer writing to stdout with ANSI styling.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates an observer with styling enabled or disabled.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            printed: 0,
            use_color,
        }
    }

    fn print(&mut self, text: &str) {
        let mut handle = self.stdout.lock();
        _ = handle.write_all(text.as_bytes());
        _ = handle.flush();
    }

    /// Print an informational message.
    pub fn print_info(&mut self, info: &str) {
        if self.use_color {
            self.print(&format!("{ANSI_DIM}{info}{ANSI_RESET}\n"));
        } else {
            self.print(&format!("{info}\n"));
        }
    }

    /// Print an error message.
    pub fn print_error(&mut self, error: &str) {
        self.print(&format!("error: {error}\n"));
    }
}

impl Default for PlainTextObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayObserver for PlainTextObserver {
    fn fragment(&mut self, cumulative: &str) {
        let delta = &cumulative[self.printed.min(cumulative.len())..];
        self.printed = cumulative.len();
        if self.use_color {
            // Overwrite the cursor from the previous fragment.
            self.print(&format!("{delta}{ANSI_DIM}{CURSOR}{ANSI_RESET}\x08"));
        } else {
            self.print(delta);
        }
    }

    fn completed(&mut self, _text: &str) {
        self.printed = 0;
        if self.use_color {
            // Erase the trailing cursor.
            self.print(" \x08");
        }
        self.print("\n");
    }

    fn failed(&mut self, message: &str) {
        self.printed = 0;
        self.print(&format!("\nerror: {message}\n"));
    }

    fn cost_updated(&mut self, formatted: &str) {
        if self.use_color {
            self.print(&format!("{ANSI_DIM}[session cost: {formatted}]{ANSI_RESET}\n"));
        } else {
            self.print(&format!("[session cost: {formatted}]\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every notification for assertions.
    #[derive(Default)]
    pub struct RecordingObserver {
        pub fragments: Vec<String>,
        pub completed: Vec<String>,
        pub failures: Vec<String>,
        pub costs: Vec<String>,
    }

    impl DisplayObserver for RecordingObserver {
        fn fragment(&mut self, cumulative: &str) {
            self.fragments.push(cumulative.to_string());
        }

        fn completed(&mut self, text: &str) {
            self.completed.push(text.to_string());
        }

        fn failed(&mut self, message: &str) {
            self.failures.push(message.to_string());
        }

        fn cost_updated(&mut self, formatted: &str) {
            self.costs.push(formatted.to_string());
        }
    }

    #[test]
    fn null_observer_accepts_everything() {
        let mut observer = NullObserver;
        observer.fragment("Hel");
        observer.fragment("Hello");
        observer.completed("Hello");
        observer.failed("nope");
        observer.cost_updated("$0.00001");
    }

    #[test]
    fn recording_observer_sees_cumulative_text() {
        let mut observer = RecordingObserver::default();
        observer.fragment("Hel");
        observer.fragment("Hello");
        observer.completed("Hello");
        assert_eq!(observer.fragments, vec!["Hel", "Hello"]);
        assert_eq!(observer.completed, vec!["Hello"]);
    }
}
