//! CLI argument definitions
//!
//! Contains the main CLI struct and Commands enum for clap parsing.

use clap::{ArgAction, Parser, Subcommand};

use crate::config::{AgentFileConfig, OracleBackend};

#[derive(Parser)]
#[command(name = "event-agent")]
#[command(about = "Investigate Kubernetes cluster problems from the event log with an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Event query endpoint (default: from .event-agent.toml or http://127.0.0.1:8080/query)
    #[arg(long, env = "KUBE_EVENT_ANALYZER_URL", global = true)]
    pub query_url: Option<String>,

    /// Oracle protocol
    #[arg(long, env = "ORACLE_BACKEND", value_enum, global = true)]
    pub backend: Option<OracleBackend>,

    /// Oracle API base URL
    #[arg(long, env = "OPENAI_API_BASE", global = true)]
    pub oracle_url: Option<String>,

    /// Model to use
    #[arg(short = 'm', long, env = "ORACLE_MODEL", global = true)]
    pub model: Option<String>,

    /// Investigation turn budget
    #[arg(long, global = true)]
    pub max_turns: Option<usize>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: one investigation per line, `exit` to quit (default)
    Repl,
    /// Run a single investigation and exit
    Ask {
        /// Problem statement, e.g. "the cluster is unstable"
        problem: String,
    },
}

impl Cli {
    /// Apply flag/env overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut AgentFileConfig) {
        if let Some(ref url) = self.query_url {
            config.query.url = url.clone();
        }
        if let Some(backend) = self.backend {
            config.oracle.backend = backend;
        }
        if let Some(ref url) = self.oracle_url {
            config.oracle.url = Some(url.clone());
        }
        if let Some(ref model) = self.model {
            config.oracle.model = model.clone();
        }
        if let Some(max_turns) = self.max_turns {
            config.investigation.max_turns = max_turns;
        }
    }

    /// Default tracing filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
