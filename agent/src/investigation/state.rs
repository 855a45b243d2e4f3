//! Per-request investigation state
//!
//! The transcript is append-only: entries are never edited or pruned, so the
//! oracle always sees the complete history it produced.

use crate::llm::Message;

/// Turn budget per investigation
pub const DEFAULT_MAX_TURNS: usize = 7;

/// Hypothesis shown before the oracle has offered one
pub const HYPOTHESIS_PLACEHOLDER: &str = "No hypothesis yet.";

/// State for one user request, dropped when the loop exits
#[derive(Debug)]
pub struct InvestigationState {
    transcript: Vec<Message>,
    turn: usize,
    max_turns: usize,
    hypothesis: String,
}

impl InvestigationState {
    /// Seed with the instruction preamble and the user's problem statement
    pub fn new(preamble: &str, statement: &str, max_turns: usize) -> Self {
        Self {
            transcript: vec![Message::system(preamble), Message::user(statement)],
            turn: 0,
            max_turns,
            hypothesis: HYPOTHESIS_PLACEHOLDER.to_string(),
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn hypothesis(&self) -> &str {
        &self.hypothesis
    }

    pub fn budget_exhausted(&self) -> bool {
        self.turn >= self.max_turns
    }

    /// Count one oracle call inside the loop; returns the new turn number
    pub fn begin_turn(&mut self) -> usize {
        self.turn += 1;
        self.turn
    }

    /// Store the oracle's reply exactly as received
    pub fn record_plan(&mut self, raw: &str) {
        self.transcript.push(Message::assistant(raw));
    }

    /// Append a system-authored observation
    pub fn observe(&mut self, text: impl Into<String>) {
        self.transcript.push(Message::system(text));
    }

    /// Overwrite the hypothesis when the plan carries one
    pub fn update_hypothesis(&mut self, hypothesis: Option<&str>) {
        if let Some(h) = hypothesis {
            self.hypothesis = h.to_string();
        }
    }
}
