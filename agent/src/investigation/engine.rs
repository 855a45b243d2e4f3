//! Turn loop
//!
//! ```text
//! AWAITING_PLAN --Conclude--> CONCLUDE (final analysis, verbatim)
//!               --Continue--> run query, summarize, observe --> AWAITING_PLAN
//!               --defect----> observe defect (within recovery budget) --> AWAITING_PLAN
//!               --no sql / budget spent--> ABORT
//! turn == max_turns --> one forced summary call --> EXHAUSTED
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::SecondsFormat;

use super::adapter::{PlanAdapter, Proposal};
use super::plan::{Plan, PlanFailure};
use super::prompts::{defect_observation, FORCED_SUMMARY_INSTRUCTION, INVESTIGATOR_PREAMBLE};
use super::state::{InvestigationState, DEFAULT_MAX_TURNS};
use crate::clock::{Clock, SystemClock};
use crate::llm::Oracle;
use crate::output::{OutputEvent, OutputWriter};
use crate::query::{summarize, QueryService};

/// Consecutive invalid plans fed back before giving up
pub const DEFAULT_PLAN_RECOVERY_BUDGET: usize = 1;

/// Final analysis reported when the oracle's reply is not a JSON object
pub const UNPARSEABLE_ANALYSIS: &str =
    "Unparseable response: the oracle's reply was not a JSON object, so the investigation was stopped.";

/// Surfaced when the forced summary still lacks a final analysis
pub const NO_SUMMARY_PROVIDED: &str = "No summary provided.";

/// Prefix of every abort message
pub const NO_FURTHER_ACTION: &str = "No further action taken";

/// How an investigation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The oracle concluded (or its reply was unparseable)
    Concluded(String),
    /// The turn budget ran out; carries the forced summary
    Exhausted(String),
    /// Contract violation or recovery budget spent
    Aborted(String),
    /// The oracle could not be reached
    Failed(String),
}

impl Outcome {
    /// Text to show the user
    pub fn message(&self) -> &str {
        match self {
            Outcome::Concluded(s) | Outcome::Exhausted(s) | Outcome::Aborted(s) | Outcome::Failed(s) => s,
        }
    }
}

/// Result of one investigation
#[derive(Debug, Clone)]
pub struct InvestigationReport {
    pub outcome: Outcome,
    /// Oracle calls made inside the loop (the forced summary is not counted)
    pub turns: usize,
    pub queries_executed: usize,
    pub hypothesis: String,
}

/// Drives investigations; holds only long-lived clients and settings
pub struct Investigator {
    adapter: PlanAdapter,
    queries: Arc<dyn QueryService>,
    output: Option<Box<dyn OutputWriter>>,
    max_turns: usize,
    recovery_budget: usize,
}

impl Investigator {
    /// Create an investigator with default settings and the system clock
    pub fn new(oracle: Arc<dyn Oracle>, queries: Arc<dyn QueryService>) -> Self {
        Self::with_clock(oracle, queries, Arc::new(SystemClock))
    }

    /// Create an investigator reading time from `clock`
    pub fn with_clock(
        oracle: Arc<dyn Oracle>,
        queries: Arc<dyn QueryService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            adapter: PlanAdapter::new(oracle, clock),
            queries,
            output: None,
            max_turns: DEFAULT_MAX_TURNS,
            recovery_budget: DEFAULT_PLAN_RECOVERY_BUDGET,
        }
    }

    /// Report progress to `output`
    pub fn with_output(mut self, output: Box<dyn OutputWriter>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_recovery_budget(mut self, budget: usize) -> Self {
        self.recovery_budget = budget;
        self
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn model(&self) -> &str {
        self.adapter.model()
    }

    fn emit(&self, event: OutputEvent) {
        if let Some(ref output) = self.output {
            output.write(event);
        }
    }

    /// Run one investigation for a user problem statement
    pub async fn investigate(&self, statement: &str) -> InvestigationReport {
        let mut state = InvestigationState::new(INVESTIGATOR_PREAMBLE, statement, self.max_turns);
        let mut queries_executed = 0;
        let mut consecutive_defects = 0;

        tracing::info!(
            "Starting investigation ({} turns max, model {})",
            self.max_turns,
            self.adapter.model()
        );

        let outcome = loop {
            if state.budget_exhausted() {
                break self.force_summary(&mut state).await;
            }

            let turn = state.begin_turn();
            self.emit(OutputEvent::Step {
                turn,
                max_turns: state.max_turns(),
            });
            tracing::info!("Turn {}/{}", turn, state.max_turns());

            let Proposal { raw, plan } = match self.adapter.propose(state.transcript()).await {
                Ok(proposal) => proposal,
                Err(e) => {
                    tracing::error!("Oracle call failed on turn {}: {}", turn, e);
                    break Outcome::Failed(format!("The reasoning oracle could not be reached: {}", e));
                }
            };
            state.record_plan(&raw);

            match plan {
                Ok(plan) => {
                    consecutive_defects = 0;
                    state.update_hypothesis(plan.hypothesis());
                    self.emit(OutputEvent::Thought(plan.thought().to_string()));
                    if let Some(h) = plan.hypothesis() {
                        self.emit(OutputEvent::Hypothesis(h.to_string()));
                    }

                    match plan {
                        Plan::Conclude { final_analysis, .. } => {
                            tracing::info!("Oracle concluded on turn {}", turn);
                            break Outcome::Concluded(final_analysis);
                        }
                        Plan::Continue { query, .. } => {
                            self.emit(OutputEvent::QueryStart {
                                sql: query.sql.clone(),
                                start: query.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                                end: query.end.to_rfc3339_opts(SecondsFormat::Secs, true),
                            });
                            let started = Instant::now();
                            let result = self
                                .queries
                                .run(&query.sql, Some(query.start), Some(query.end))
                                .await;
                            queries_executed += 1;

                            let summary = summarize(&result);
                            if result.is_error() {
                                tracing::warn!("Query on turn {} failed: {}", turn, summary);
                            }
                            self.emit(OutputEvent::QueryComplete {
                                summary: summary.clone(),
                                duration: started.elapsed(),
                                is_error: result.is_error(),
                            });
                            state.observe(summary);
                        }
                    }
                }
                Err(PlanFailure::Unparseable(detail)) => {
                    tracing::warn!("Unparseable oracle reply on turn {}: {}", turn, detail);
                    break Outcome::Concluded(UNPARSEABLE_ANALYSIS.to_string());
                }
                Err(PlanFailure::MissingSql) => {
                    break Outcome::Aborted(format!(
                        "{}: the proposed query had no SQL.",
                        NO_FURTHER_ACTION
                    ));
                }
                Err(PlanFailure::Defect(defect)) => {
                    if consecutive_defects >= self.recovery_budget {
                        tracing::warn!("Plan recovery budget spent on turn {}", turn);
                        break Outcome::Aborted(format!(
                            "{}: the oracle kept returning invalid plans ({}).",
                            NO_FURTHER_ACTION, defect
                        ));
                    }
                    consecutive_defects += 1;
                    self.emit(OutputEvent::Warning(format!("Invalid plan: {}", defect)));
                    state.observe(defect_observation(&defect));
                }
            }
        };

        match &outcome {
            Outcome::Concluded(analysis) => self.emit(OutputEvent::FinalAnalysis {
                content: analysis.clone(),
                forced: false,
            }),
            Outcome::Exhausted(summary) => self.emit(OutputEvent::FinalAnalysis {
                content: summary.clone(),
                forced: true,
            }),
            Outcome::Aborted(msg) => self.emit(OutputEvent::Warning(msg.clone())),
            Outcome::Failed(msg) => self.emit(OutputEvent::Error(msg.clone())),
        }

        tracing::info!(
            "Investigation finished after {} turn(s), {} query(ies)",
            state.turn(),
            queries_executed
        );

        InvestigationReport {
            outcome,
            turns: state.turn(),
            queries_executed,
            hypothesis: state.hypothesis().to_string(),
        }
    }

    /// One extra oracle call after the budget is spent; never loops
    async fn force_summary(&self, state: &mut InvestigationState) -> Outcome {
        tracing::info!("Turn budget of {} reached, requesting final summary", state.max_turns());
        self.emit(OutputEvent::Status(
            "Reached the maximum number of investigation steps; summarizing what was found.".into(),
        ));
        state.observe(FORCED_SUMMARY_INSTRUCTION);

        let summary = match self.adapter.propose(state.transcript()).await {
            Ok(Proposal { raw, plan }) => {
                state.record_plan(&raw);
                match plan {
                    Ok(plan) => {
                        state.update_hypothesis(plan.hypothesis());
                        match plan {
                            Plan::Conclude { final_analysis, .. } => final_analysis,
                            Plan::Continue { .. } => NO_SUMMARY_PROVIDED.to_string(),
                        }
                    }
                    Err(_) => NO_SUMMARY_PROVIDED.to_string(),
                }
            }
            Err(e) => {
                tracing::error!("Forced summary call failed: {}", e);
                NO_SUMMARY_PROVIDED.to_string()
            }
        };
        Outcome::Exhausted(summary)
    }
}
