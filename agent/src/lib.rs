//! Bounded LLM investigation loop over Kubernetes event logs

pub mod cli;
pub mod clock;
pub mod config;
pub mod investigation;
pub mod llm;
pub mod output;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;
