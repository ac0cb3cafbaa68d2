//! `meetbot` - custom action server for meeting scheduling dialogues
//!
//! Serves the dialogue runtime's action webhook, and offers local commands to
//! run an action or probe the temporal resolver from a terminal.

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use meetbot_core::config::{Config, ResolverBackend};
use meetbot_core::output::OutputFormatter;
use meetbot_core::protocol::ActionCall;
use meetbot_core::tracker::Tracker;
use meetbot_core::{build_resolver, ActionExecutor, ActionRegistry, TemporalResolver};

mod cli;
mod server;

/// Main entry point for the action server CLI
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.version {
        let blue = Style::new().blue();
        println!(
            "{} v{} ({})",
            blue.apply_to("meetbot"),
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH")
        );
        return Ok(());
    }

    let formatter = OutputFormatter::new();

    let mut config =
        Config::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(backend) = &cli.resolver {
        config.resolver.backend = backend
            .parse::<ResolverBackend>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        config.validate().context("Invalid resolver override")?;
    }

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let executor = build_executor(&config)?;
            server::start_server(&bind, executor).await?;
        }

        Commands::Run { action, slots } => {
            let executor = build_executor(&config)?;
            let call = ActionCall::new(action.clone(), Tracker::from_slots(slots));
            let response = executor.run(&call).await?;
            formatter.print_action_response(&action, &response);
        }

        Commands::Parse { text } => {
            let text = text.join(" ");
            let resolver = resolver_for(&config)?;
            let candidates = resolver.parse(&text, None).await?;
            formatter.print_candidates(&text, &candidates);
        }

        Commands::Actions => {
            let executor = build_executor(&config)?;
            formatter.print_actions(&executor.registry().names());
        }

        Commands::Config => {
            formatter.print_config(&config);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The resolver is built once here and shared by every action.
fn resolver_for(config: &Config) -> Result<Arc<dyn TemporalResolver>> {
    build_resolver(&config.resolver).context("Failed to initialize temporal resolver")
}

fn build_executor(config: &Config) -> Result<ActionExecutor> {
    let resolver = resolver_for(config)?;
    Ok(ActionExecutor::new(ActionRegistry::with_defaults(config, resolver)))
}
