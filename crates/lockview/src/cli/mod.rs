//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `cycles`: Run cycle analysis over an artifact directory
//! - `replay`: Run an interaction script against a headless session
//! - `show-config`: Print the effective configuration
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Path to the configuration file
//!
//! # Example
//!
//! ```bash
//! lockview cycles --dir ./artifacts --exclude e1,e3
//! lockview --json replay --dir ./artifacts --script session.jsonl --width 800 --height 600
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE_NAME;
use crate::output::OutputMode;

pub use args::{CyclesArgs, ReplayArgs};

/// Lockview - inspect lock graphs and their cycles
///
/// Loads pre-rendered lock graph artifacts, runs cycle analysis with
/// user-chosen edge exclusions, and replays interaction scripts against a
/// headless viewer.
#[derive(Parser, Debug)]
#[command(name = "lockview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run cycle analysis
    ///
    /// Prints the nodes and edges that lie on at least one cycle once the
    /// excluded edges are removed.
    Cycles(CyclesArgs),

    /// Replay an interaction script
    ///
    /// Loads the graph into a headless viewer, runs each scripted step, and
    /// prints the resulting visual state.
    Replay(ReplayArgs),

    /// Print the effective configuration
    ShowConfig,
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error from the command.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Cycles(args)) => execute::execute_cycles(args, output_mode).await,
            Some(Commands::Replay(args)) => {
                execute::execute_replay(args, &self.config, output_mode).await
            }
            Some(Commands::ShowConfig) => {
                execute::execute_show_config(&self.config, output_mode).await
            }
            None => {
                println!("Lockview lock graph viewer");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
