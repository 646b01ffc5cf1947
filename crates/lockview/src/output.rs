//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or JSON. Text output uses
//! a small semantic color theme:
//!
//! - cyan: element ids
//! - red: cycle members
//! - yellow: excluded edges
//! - green: the selected edge and successful steps
//! - dimmed: labels and superseded responses

use crate::controller::{ClickOutcome, RecomputeOutcome};
use crate::detail::DetailOutcome;
use crate::domain::{CycleMembership, ElementId, ExclusionSet};
use crate::replay::{SessionSnapshot, StepResult};
use colored::Colorize;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output format selected by the global `--json` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Read settings from the environment.
    ///
    /// Colors are disabled by `NO_COLOR` (any value) or by `LOCKVIEW_COLOR`
    /// set to `0` or `false`.
    #[must_use]
    pub fn from_env() -> Self {
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("LOCKVIEW_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }

    /// Plain text, no colors.
    #[must_use]
    pub const fn plain() -> Self {
        Self { use_colors: false }
    }

    fn paint(self, text: &str, style: fn(&str) -> colored::ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

fn id(text: &str, config: OutputConfig) -> String {
    config.paint(text, |s| s.cyan())
}

fn label(text: &str, config: OutputConfig) -> String {
    config.paint(text, |s| s.dimmed())
}

fn heading(text: &str, config: OutputConfig) -> String {
    config.paint(text, |s| s.bold())
}

fn id_list<'a>(ids: impl Iterator<Item = &'a ElementId>, config: OutputConfig) -> String {
    let ids: Vec<String> = ids.map(|i| id(i.as_str(), config)).collect();
    if ids.is_empty() {
        label("(none)", config)
    } else {
        ids.join(", ")
    }
}

/// Print any serializable value as pretty JSON to stdout.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)
}

/// Write a cycle analysis result as text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_membership_text<W: Write>(
    w: &mut W,
    membership: &CycleMembership,
    exclusions: &ExclusionSet,
    config: OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", heading("Cycle membership", config))?;
    writeln!(
        w,
        "  {} {}",
        label("excluded:", config),
        id_list(exclusions.iter(), config)
    )?;
    if membership.is_empty() {
        writeln!(w, "  {}", config.paint("no cycles", |s| s.green()))?;
        return Ok(());
    }
    writeln!(
        w,
        "  {} {}",
        label("nodes:   ", config),
        id_list(membership.nodes.iter(), config)
    )?;
    writeln!(
        w,
        "  {} {}",
        label("edges:   ", config),
        id_list(membership.edges.iter(), config)
    )
}

fn describe_recompute(outcome: RecomputeOutcome, config: OutputConfig) -> String {
    match outcome {
        RecomputeOutcome::Applied { seq } => format!("applied #{seq}"),
        RecomputeOutcome::Superseded { seq, current } => {
            label(&format!("superseded #{seq} (latest #{current})"), config)
        }
    }
}

fn describe_step(result: &StepResult, config: OutputConfig) -> String {
    match result {
        StepResult::Done => config.paint("ok", |s| s.green()),
        StepResult::Recompute(outcome) => describe_recompute(*outcome, config),
        StepResult::Click(ClickOutcome::Toggled {
            edge,
            excluded,
            recompute,
        }) => format!(
            "{} {}, {}",
            if *excluded { "excluded" } else { "included" },
            id(edge.as_str(), config),
            describe_recompute(*recompute, config)
        ),
        StepResult::Click(ClickOutcome::Selected { edge, detail }) => {
            let detail = match detail {
                DetailOutcome::Mounted { .. } => "detail shown".to_string(),
                DetailOutcome::Superseded { .. } => label("detail superseded", config),
            };
            format!("selected {}, {detail}", id(edge.as_str(), config))
        }
        StepResult::Click(ClickOutcome::Missed) => label("missed", config),
        StepResult::Failed(reason) => config.paint(&format!("failed: {reason}"), |s| s.red()),
    }
}

/// Write a session snapshot as text.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_snapshot_text<W: Write>(
    w: &mut W,
    snapshot: &SessionSnapshot,
    config: OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", heading("Steps", config))?;
    for step in &snapshot.steps {
        writeln!(
            w,
            "  {:>4} {:<13} {}",
            step.line,
            step.step,
            describe_step(&step.result, config)
        )?;
    }
    writeln!(w)?;
    writeln!(w, "{}", heading("Session", config))?;
    writeln!(w, "  {} {}", label("layout:  ", config), snapshot.layout)?;
    writeln!(
        w,
        "  {} {}",
        label("selected:", config),
        snapshot
            .selected
            .as_ref()
            .map_or_else(|| label("(none)", config), |s| config.paint(s.as_str(), |t| t.green()))
    )?;
    writeln!(
        w,
        "  {} {}",
        label("excluded:", config),
        id_list(snapshot.exclusions.iter(), config)
    )?;
    writeln!(
        w,
        "  {} {}",
        label("cycles:  ", config),
        config.paint(
            &format!(
                "{} nodes, {} edges",
                snapshot.membership.nodes.len(),
                snapshot.membership.edges.len()
            ),
            |s| s.red()
        )
    )?;
    writeln!(
        w,
        "  {} {}",
        label("graph:   ", config),
        snapshot.graph.transform.as_deref().unwrap_or("(none)")
    )?;
    if let Some(detail) = &snapshot.detail {
        writeln!(
            w,
            "  {} {}",
            label("detail:  ", config),
            detail.transform.as_deref().unwrap_or("(none)")
        )?;
    }
    if let Some(text) = &snapshot.indicator.text {
        writeln!(
            w,
            "  {} {}",
            label("status:  ", config),
            config.paint(text, |s| s.yellow())
        )?;
    }
    Ok(())
}
