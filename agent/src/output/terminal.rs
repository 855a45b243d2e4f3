//! Terminal output with colors and formatting
//!
//! Uses ANSI escape codes for colors and styling.

use std::io::{self, Write};

use super::{one_line, preview, OutputEvent, OutputWriter};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";

/// Terminal output writer with colors and formatting
pub struct TerminalOutput {
    /// Whether to use colors (can be disabled)
    use_colors: bool,
    /// Whether verbose mode is enabled
    verbose: bool,
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalOutput {
    /// Create a new terminal output writer
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Create without colors
    pub fn without_colors() -> Self {
        Self {
            use_colors: false,
            verbose: false,
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Format with color if colors are enabled
    fn color(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Format with multiple styles
    fn styled(&self, codes: &[&str], text: &str) -> String {
        if self.use_colors {
            let prefix: String = codes.iter().copied().collect();
            format!("{}{}{}", prefix, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Print to stderr (for status/progress messages)
    fn eprint(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    /// Print to stdout (for content)
    fn print(&self, msg: &str) {
        println!("{}", msg);
    }
}

impl OutputWriter for TerminalOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Step { turn, max_turns } => {
                self.eprint("");
                self.eprint(&self.styled(
                    &[BOLD, BLUE],
                    &format!("===== [Investigation Step {}/{}] =====", turn, max_turns),
                ));
            }

            OutputEvent::Thought(thought) => {
                if self.verbose && !thought.is_empty() {
                    let styled = self.styled(&[DIM, ITALIC], &thought);
                    self.eprint(&format!("  {} {}", self.color(MAGENTA, "💭"), styled));
                }
            }

            OutputEvent::Hypothesis(h) => {
                self.eprint(&format!("  {} {}", self.styled(&[BOLD, MAGENTA], "Hypothesis:"), h));
            }

            OutputEvent::QueryStart { sql, start, end } => {
                let window = self.color(GRAY, &format!("[{} .. {}]", start, end));
                let sql = self.color(CYAN, &preview(&one_line(&sql), 160));
                self.eprint(&format!("  {} {} {}", self.color(GRAY, "→"), window, sql));
            }

            OutputEvent::QueryComplete {
                summary,
                duration,
                is_error,
            } => {
                let status = if is_error {
                    self.color(RED, "✗")
                } else {
                    self.color(GREEN, "✓")
                };
                let time = self.color(GRAY, &format!("({}ms)", duration.as_millis()));
                let limit = if self.verbose { usize::MAX } else { 200 };
                let body = if is_error {
                    self.color(RED, &preview(&summary, limit))
                } else {
                    self.color(GRAY, &preview(&summary, limit))
                };
                self.eprint(&format!("  {} {} {}", status, time, body));
            }

            OutputEvent::FinalAnalysis { content, forced } => {
                let title = if forced {
                    "[Final Summary]"
                } else {
                    "[Final Analysis]"
                };
                self.print("");
                self.print(&self.styled(&[BOLD, GREEN], title));
                self.print(&content);
            }

            OutputEvent::Status(msg) => {
                self.eprint(&self.color(GRAY, &format!("  {}", msg)));
            }

            OutputEvent::Error(msg) => {
                self.eprint(&format!(
                    "{} {}",
                    self.styled(&[BOLD, RED], "Error:"),
                    self.color(RED, &msg)
                ));
            }

            OutputEvent::Warning(msg) => {
                self.eprint(&format!(
                    "{} {}",
                    self.styled(&[BOLD, YELLOW], "Warning:"),
                    self.color(YELLOW, &msg)
                ));
            }

            OutputEvent::System(msg) => {
                self.eprint(&self.color(GRAY, &msg));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

    fn supports_colors(&self) -> bool {
        self.use_colors
    }
}
