//! Plan oracle adapter
//!
//! Sends the stored transcript plus a throwaway clock message, then decodes
//! the reply. The raw reply is returned alongside the decode result so the
//! loop can store it byte-for-byte.

use std::sync::Arc;
use std::time::Instant;

use super::plan::{decode_plan, Plan, PlanFailure};
use super::prompts::clock_message;
use crate::clock::Clock;
use crate::llm::{Message, Oracle, OracleError};

/// One oracle reply and what it decoded to
#[derive(Debug, Clone)]
pub struct Proposal {
    pub raw: String,
    pub plan: Result<Plan, PlanFailure>,
}

pub struct PlanAdapter {
    oracle: Arc<dyn Oracle>,
    clock: Arc<dyn Clock>,
}

impl PlanAdapter {
    pub fn new(oracle: Arc<dyn Oracle>, clock: Arc<dyn Clock>) -> Self {
        Self { oracle, clock }
    }

    pub fn model(&self) -> &str {
        self.oracle.model()
    }

    /// Ask the oracle for the next plan
    ///
    /// Transport failures are returned as `Err`; anything the oracle actually
    /// said comes back as a [`Proposal`], decodable or not.
    pub async fn propose(&self, transcript: &[Message]) -> Result<Proposal, OracleError> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.extend_from_slice(transcript);
        messages.push(clock_message(self.clock.now()));

        tracing::debug!(
            "Requesting plan from {} ({} messages)",
            self.oracle.model(),
            messages.len()
        );
        let started = Instant::now();
        let raw = self.oracle.complete(&messages).await?;
        tracing::debug!(
            "Oracle replied in {}ms ({} bytes)",
            started.elapsed().as_millis(),
            raw.len()
        );

        let plan = decode_plan(&raw);
        if let Err(ref failure) = plan {
            tracing::warn!("Oracle reply rejected: {}", failure);
        }
        Ok(Proposal { raw, plan })
    }
}
