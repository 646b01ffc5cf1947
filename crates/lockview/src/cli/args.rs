//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

/// Parse a container dimension: a finite, non-negative number of pixels.
fn parse_dimension(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("'{s}' must be a finite, non-negative number"))
    }
}

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone)]
pub struct CyclesArgs {
    /// Artifact directory containing graph.json and stacks/
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Edges to exclude from analysis (comma-separated edge ids)
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Artifact directory containing graph.json and stacks/
    #[arg(short, long)]
    pub dir: PathBuf,

    /// Interaction script (JSON Lines, one step per line)
    #[arg(short, long)]
    pub script: PathBuf,

    /// Container width in pixels (overrides the config file)
    #[arg(long, value_parser = parse_dimension)]
    pub width: Option<f64>,

    /// Container height in pixels (overrides the config file)
    #[arg(long, value_parser = parse_dimension)]
    pub height: Option<f64>,
}
