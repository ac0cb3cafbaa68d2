//! CLI argument parsing using clap 4.x derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Custom action server for meeting scheduling and joining
///
/// Serves the dialogue runtime's action webhook, or runs a single action
/// locally for debugging.
#[derive(Parser, Debug)]
#[command(name = "meetbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to a config file (defaults to ./meetbot.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Resolver backend override (builtin, duckling)
    #[arg(short, long, global = true)]
    pub resolver: Option<String>,

    /// Print version information
    #[arg(long)]
    pub version: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the action webhook server
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Run one action against the given slots
    Run {
        /// Action name, e.g. action_a_meeting
        action: String,

        /// Slot value as name=value (repeatable)
        #[arg(short, long = "slot", value_parser = parse_slot)]
        slots: Vec<(String, String)>,
    },

    /// Show resolver candidates for a phrase
    Parse {
        /// The date/time phrase
        #[arg(num_args = 1..)]
        text: Vec<String>,
    },

    /// List registered actions
    Actions,

    /// Show the effective configuration
    Config,
}

fn parse_slot(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty slot name in '{}'", arg));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_slots() {
        let cli = Cli::parse_from([
            "meetbot",
            "run",
            "action_a_meeting",
            "--slot",
            "date=next friday",
            "-s",
            "time=3pm",
        ]);
        match cli.command {
            Some(Commands::Run { action, slots }) => {
                assert_eq!(action, "action_a_meeting");
                assert_eq!(
                    slots,
                    vec![
                        ("date".to_string(), "next friday".to_string()),
                        ("time".to_string(), "3pm".to_string())
                    ]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_slot_argument() {
        assert!(Cli::try_parse_from(["meetbot", "run", "x", "--slot", "novalue"]).is_err());
        assert!(Cli::try_parse_from(["meetbot", "run", "x", "--slot", "=v"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["meetbot", "parse", "--resolver", "builtin", "tomorrow", "3pm"]);
        assert_eq!(cli.resolver.as_deref(), Some("builtin"));
        assert!(matches!(cli.command, Some(Commands::Parse { ref text }) if text.len() == 2));
    }
}
