//! Output abstraction for the CLI
//!
//! The investigation loop reports progress as [`OutputEvent`]s; writers
//! decide how to render them (ANSI terminal or plain text for pipes).

use std::time::Duration;

mod plain;
mod terminal;

pub use plain::PlainOutput;
pub use terminal::TerminalOutput;

// ============================================================================
// Output Events
// ============================================================================

/// Events that can be displayed to the user
#[derive(Debug, Clone)]
pub enum OutputEvent {
    /// A new investigation turn is starting
    Step { turn: usize, max_turns: usize },

    /// The oracle's rationale for this turn
    Thought(String),

    /// The oracle's current hypothesis
    Hypothesis(String),

    /// Query about to be sent to the event service
    QueryStart {
        sql: String,
        start: String,
        end: String,
    },

    /// Query finished; `summary` is exactly what the oracle will see
    QueryComplete {
        summary: String,
        duration: Duration,
        is_error: bool,
    },

    /// The answer that ends an investigation
    FinalAnalysis { content: String, forced: bool },

    /// Status message (informational)
    Status(String),

    /// Error message
    Error(String),

    /// Warning message
    Warning(String),

    /// System message (dimmed, for internal info)
    System(String),
}

// ============================================================================
// Output Writer Trait
// ============================================================================

/// Trait for writing output events
pub trait OutputWriter: Send + Sync {
    /// Write an output event
    fn write(&self, event: OutputEvent);

    /// Flush any buffered output
    fn flush(&self);

    /// Whether this writer supports colors/formatting
    fn supports_colors(&self) -> bool {
        false
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a default output writer based on environment
pub fn default_output(verbose: bool) -> Box<dyn OutputWriter> {
    if atty::is(atty::Stream::Stdout) {
        Box::new(TerminalOutput::new().with_verbose(verbose))
    } else {
        Box::new(PlainOutput::new().with_verbose(verbose))
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Single-line form of a (possibly multi-line) SQL statement
pub(crate) fn one_line(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tests
// ============================================================================
