//! Artifact source backed by a directory of pre-rendered diagrams.
//!
//! Layout:
//!
//! ```text
//! <root>/graph.json          whole-graph diagram
//! <root>/stacks/<edge>.json  per-edge detail diagrams
//! ```
//!
//! Cycle queries are answered by running [`cycle_membership`] over the
//! graph diagram, which is read once and cached.

use super::analysis::cycle_membership;
use super::{ArtifactSource, Endpoint};
use crate::domain::{CycleMembership, Diagram, ElementId, ExclusionSet};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::debug;

/// File name of the whole-graph diagram.
pub const GRAPH_FILE: &str = "graph.json";

/// Directory holding per-edge detail diagrams.
pub const STACKS_DIR: &str = "stacks";

/// Serves artifacts from a directory on disk.
#[derive(Debug)]
pub struct DirectorySource {
    root: PathBuf,
    graph: OnceCell<Diagram>,
}

impl DirectorySource {
    /// Serve artifacts from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            graph: OnceCell::new(),
        }
    }

    /// The artifact directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn graph(&self) -> Result<&Diagram> {
        self.graph
            .get_or_try_init(|| read_json(self.root.join(GRAPH_FILE), Endpoint::Graph))
            .await
    }
}

#[async_trait(?Send)]
impl ArtifactSource for DirectorySource {
    async fn fetch_graph(&self) -> Result<Diagram> {
        self.graph().await.cloned()
    }

    async fn fetch_cycles(&self, exclusions: &ExclusionSet) -> Result<CycleMembership> {
        debug!(endpoint = %Endpoint::Cycles(exclusions.clone()), "Answering cycle query");
        let graph = self.graph().await?;
        Ok(cycle_membership(graph, exclusions))
    }

    async fn fetch_edge_detail(&self, edge: &ElementId) -> Result<Diagram> {
        let id = edge.as_str();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
            return Err(Error::Status {
                code: 400,
                text: "Bad Request".to_string(),
            });
        }
        let path = self.root.join(STACKS_DIR).join(format!("{id}.json"));
        read_json(path, Endpoint::EdgeDetail(edge.clone())).await
    }
}

async fn read_json<T: DeserializeOwned>(path: PathBuf, endpoint: Endpoint) -> Result<T> {
    debug!(%endpoint, path = %path.display(), "Reading artifact");
    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::Status {
            code: 404,
            text: "Not Found".to_string(),
        },
        _ => Error::Transport(format!("{endpoint}: {e}")),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| Error::MalformedBody(format!("{endpoint}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const GRAPH: &str = r#"{
        "width": 100, "height": 50,
        "elements": [
            {"id": "a", "kind": "node"},
            {"id": "b", "kind": "node"},
            {"id": "e1", "kind": "edge", "source": "a", "target": "b", "path": "M0,0 L10,10"},
            {"id": "e2", "kind": "edge", "source": "b", "target": "a", "path": "M10,10 L0,0"}
        ]
    }"#;

    fn artifact_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GRAPH_FILE), GRAPH).unwrap();
        fs::create_dir(dir.path().join(STACKS_DIR)).unwrap();
        fs::write(
            dir.path().join(STACKS_DIR).join("e1.json"),
            r#"{"width": 30, "height": 20, "elements": []}"#,
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_fetch_graph() {
        let dir = artifact_dir();
        let source = DirectorySource::new(dir.path());
        let graph = source.fetch_graph().await.unwrap();
        assert_eq!(graph.elements.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_cycles_uses_exclusions() {
        let dir = artifact_dir();
        let source = DirectorySource::new(dir.path());

        let all = source.fetch_cycles(&ExclusionSet::new()).await.unwrap();
        assert_eq!(all.edges.len(), 2);

        let excluded: ExclusionSet = [ElementId::new("e1")].into_iter().collect();
        assert!(source.fetch_cycles(&excluded).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_edge_detail() {
        let dir = artifact_dir();
        let source = DirectorySource::new(dir.path());
        let detail = source
            .fetch_edge_detail(&ElementId::new("e1"))
            .await
            .unwrap();
        assert!((detail.width - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_detail_is_not_found() {
        let dir = artifact_dir();
        let source = DirectorySource::new(dir.path());
        let err = source
            .fetch_edge_detail(&ElementId::new("e2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { code: 404, .. }));
        assert_eq!(err.indicator_text(), "Not Found");
    }

    #[tokio::test]
    async fn test_path_like_edge_id_is_rejected() {
        let dir = artifact_dir();
        let source = DirectorySource::new(dir.path());
        let err = source
            .fetch_edge_detail(&ElementId::new("../graph"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { code: 400, .. }));
    }

    #[tokio::test]
    async fn test_malformed_graph() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GRAPH_FILE), "{not json").unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(matches!(
            source.fetch_graph().await,
            Err(Error::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_graph_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());
        assert!(source.fetch_graph().await.is_err());

        fs::write(dir.path().join(GRAPH_FILE), GRAPH).unwrap();
        assert!(source.fetch_graph().await.is_ok());
    }
}
