//! Command execution logic.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

use super::args::{CyclesArgs, ReplayArgs};
use crate::config::ViewerConfig;
use crate::domain::{ElementId, ElementKind, ExclusionSet};
use crate::output::{self, OutputConfig, OutputMode};
use crate::replay::{read_script, Session};
use crate::source::{ArtifactSource, DirectorySource};

/// Execute the cycles command
pub async fn execute_cycles(args: &CyclesArgs, output_mode: OutputMode) -> Result<()> {
    let source = DirectorySource::new(&args.dir);
    let graph = source
        .fetch_graph()
        .await
        .with_context(|| format!("Cannot load graph from {}", args.dir.display()))?;

    let exclusions: ExclusionSet = args
        .exclude
        .iter()
        .map(|s| ElementId::new(s.trim()))
        .filter(|id| !id.as_str().is_empty())
        .collect();
    for id in exclusions.iter() {
        let known = graph
            .elements
            .iter()
            .any(|e| &e.id == id && e.kind == ElementKind::Edge);
        if !known {
            warn!(edge = %id, "Excluded id is not an edge of the graph");
        }
    }

    let membership = source.fetch_cycles(&exclusions).await?;
    debug!(
        nodes = membership.nodes.len(),
        edges = membership.edges.len(),
        "Cycle analysis complete"
    );

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "excluded": exclusions,
            "nodes": membership.nodes,
            "edges": membership.edges,
        }))?,
        OutputMode::Text => output::write_membership_text(
            &mut io::stdout().lock(),
            &membership,
            &exclusions,
            OutputConfig::from_env(),
        )?,
    }
    Ok(())
}

/// Execute the replay command
pub async fn execute_replay(
    args: &ReplayArgs,
    config_path: &Path,
    output_mode: OutputMode,
) -> Result<()> {
    let mut config = ViewerConfig::load(config_path).await?;
    if let Some(width) = args.width {
        config.container.width = width;
    }
    if let Some(height) = args.height {
        config.container.height = height;
    }
    config.validate()?;

    let file = tokio::fs::File::open(&args.script)
        .await
        .with_context(|| format!("Cannot open script {}", args.script.display()))?;
    let script = read_script(file).await?;

    let mut session = Session::new(Rc::new(DirectorySource::new(&args.dir)), config);
    session
        .load()
        .await
        .with_context(|| format!("Cannot load graph from {}", args.dir.display()))?;
    session.run(&script).await;

    let snapshot = session.snapshot();
    match output_mode {
        OutputMode::Json => output::print_json(&snapshot)?,
        OutputMode::Text => output::write_snapshot_text(
            &mut io::stdout().lock(),
            &snapshot,
            OutputConfig::from_env(),
        )?,
    }
    Ok(())
}

/// Execute the show-config command
pub async fn execute_show_config(config_path: &Path, output_mode: OutputMode) -> Result<()> {
    let config = ViewerConfig::load(config_path).await?;
    match output_mode {
        OutputMode::Json => output::print_json(&config)?,
        OutputMode::Text => print!("{}", config.to_yaml()?),
    }
    Ok(())
}
