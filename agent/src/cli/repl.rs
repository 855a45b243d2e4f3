//! REPL (Read-Eval-Print Loop) for interactive CLI
//!
//! Each non-empty line starts one investigation. `exit` (any case) quits.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::investigation::Investigator;
use crate::output::{OutputEvent, OutputWriter};

/// Interactive REPL
pub struct Repl<'a> {
    investigator: &'a Investigator,
    output: &'a dyn OutputWriter,
}

impl<'a> Repl<'a> {
    /// Create a new REPL
    pub fn new(investigator: &'a Investigator, output: &'a dyn OutputWriter) -> Self {
        Self {
            investigator,
            output,
        }
    }

    /// Run the REPL loop on stdin
    pub async fn run(&mut self) -> Result<usize> {
        let stdin = io::stdin();
        self.run_with(stdin.lock()).await
    }

    /// Run the REPL loop on any line source; returns the number of investigations run
    pub async fn run_with<R: BufRead>(&mut self, mut input: R) -> Result<usize> {
        self.output.write(OutputEvent::System(
            "Kubernetes event investigator. Describe a problem, or type 'exit' to quit.".to_string(),
        ));
        self.output.write(OutputEvent::System(format!(
            "Model: {} ({} turns per investigation)",
            self.investigator.model(),
            self.investigator.max_turns()
        )));

        let mut stdout = io::stdout();
        let mut investigations = 0;

        loop {
            print!("\n[User] ");
            stdout.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            if line.eq_ignore_ascii_case("exit") {
                self.output.write(OutputEvent::System("Goodbye.".to_string()));
                break;
            }

            let report = self.investigator.investigate(line).await;
            investigations += 1;
            tracing::debug!(
                "Investigation {} ended: {:?} ({} turns, {} queries)",
                investigations,
                report.outcome,
                report.turns,
                report.queries_executed
            );
            self.output.flush();
        }

        Ok(investigations)
    }
}
