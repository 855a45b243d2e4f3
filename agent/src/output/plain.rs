//! Plain text output for pipes and CI environments
//!
//! No colors or special formatting - just clean text output.

use std::io::{self, Write};

use super::{one_line, preview, OutputEvent, OutputWriter};

/// Plain text output writer (no colors)
pub struct PlainOutput {
    /// Whether to show verbose output
    verbose: bool,
}

impl Default for PlainOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl PlainOutput {
    /// Create a new plain output writer
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn render(&self, event: OutputEvent) -> Option<(bool, String)> {
        // (to_stdout, line)
        let rendered = match event {
            OutputEvent::Step { turn, max_turns } => {
                (false, format!("===== [Investigation Step {}/{}] =====", turn, max_turns))
            }
            OutputEvent::Thought(thought) => {
                if !self.verbose || thought.is_empty() {
                    return None;
                }
                (false, format!("  [thought] {}", thought))
            }
            OutputEvent::Hypothesis(h) => (false, format!("  [hypothesis] {}", h)),
            OutputEvent::QueryStart { sql, start, end } => (
                false,
                format!("  -> query [{} .. {}] {}", start, end, preview(&one_line(&sql), 160)),
            ),
            OutputEvent::QueryComplete {
                summary,
                duration,
                is_error,
            } => {
                let status = if is_error { "FAIL" } else { "OK" };
                let limit = if self.verbose { usize::MAX } else { 200 };
                (
                    false,
                    format!("  {} ({}ms) {}", status, duration.as_millis(), preview(&summary, limit)),
                )
            }
            OutputEvent::FinalAnalysis { content, forced } => {
                let title = if forced {
                    "[Final Summary]"
                } else {
                    "[Final Analysis]"
                };
                (true, format!("{}\n{}", title, content))
            }
            OutputEvent::Status(msg) => (false, format!("  {}", msg)),
            OutputEvent::Error(msg) => (false, format!("Error: {}", msg)),
            OutputEvent::Warning(msg) => (false, format!("Warning: {}", msg)),
            OutputEvent::System(msg) => (false, msg),
        };
        Some(rendered)
    }
}

impl OutputWriter for PlainOutput {
    fn write(&self, event: OutputEvent) {
        match self.render(event) {
            Some((true, line)) => println!("{}", line),
            Some((false, line)) => eprintln!("{}", line),
            None => {}
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}
