use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kube_event_agent::cli::{Cli, Commands, Repl};
use kube_event_agent::config::AgentFileConfig;
use kube_event_agent::investigation::Investigator;
use kube_event_agent::output::default_output;
use kube_event_agent::query::EventQueryClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = AgentFileConfig::load()?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    // Missing credentials are the only fatal startup condition
    let oracle = config.oracle.build_oracle()?;

    let queries = EventQueryClient::new(
        &config.query.url,
        Duration::from_secs(config.query.timeout_secs),
    )
    .context("Failed to build query service client")?;
    tracing::info!("Event query service: {}", queries.url());

    let investigator = Investigator::new(Arc::from(oracle), Arc::new(queries))
        .with_max_turns(config.investigation.max_turns)
        .with_recovery_budget(config.investigation.plan_recovery_budget)
        .with_output(default_output(cli.verbose > 0));

    match cli.command {
        Some(Commands::Ask { problem }) => {
            investigator.investigate(&problem).await;
        }
        Some(Commands::Repl) | None => {
            let output = default_output(cli.verbose > 0);
            let mut repl = Repl::new(&investigator, output.as_ref());
            repl.run().await?;
        }
    }

    Ok(())
}
