//! Bounded investigation loop
//!
//! One [`Investigator::investigate`] call handles one user request: it seeds
//! an [`InvestigationState`], asks the oracle for plans, runs the queries they
//! carry and feeds summarized results back until the oracle concludes, the
//! turn budget runs out, or the plan contract is broken.

mod adapter;
mod engine;
mod plan;
mod prompts;
mod state;

pub use adapter::{PlanAdapter, Proposal};
pub use engine::{
    InvestigationReport, Investigator, Outcome, DEFAULT_PLAN_RECOVERY_BUDGET, NO_FURTHER_ACTION,
    NO_SUMMARY_PROVIDED, UNPARSEABLE_ANALYSIS,
};
pub use plan::{decode_plan, Plan, PlanDefect, PlanFailure, QuerySpec};
pub use prompts::{FORCED_SUMMARY_INSTRUCTION, INVESTIGATOR_PREAMBLE};
pub use state::{InvestigationState, DEFAULT_MAX_TURNS, HYPOTHESIS_PLACEHOLDER};
