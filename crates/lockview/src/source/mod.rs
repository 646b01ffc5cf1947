//! Artifact source abstraction.
//!
//! The viewer never renders graphs or computes cycles itself. It asks an
//! [`ArtifactSource`] for three artifacts: the whole graph, the cycle
//! membership for a given exclusion set, and the detail diagram of one edge.

pub mod analysis;
pub mod directory;

use crate::domain::{CycleMembership, Diagram, ElementId, ExclusionSet};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

pub use directory::DirectorySource;

/// A request the viewer makes to its artifact source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The whole graph diagram.
    Graph,
    /// Cycle membership with the given edges excluded.
    Cycles(ExclusionSet),
    /// The detail diagram for one edge.
    EdgeDetail(ElementId),
}

impl Endpoint {
    /// The request path, including the query string when there is one.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Graph => "/graph".to_string(),
            Self::Cycles(exclusions) => match exclusions.query_param() {
                Some(exc) => format!("/cycles?exc={exc}"),
                None => "/cycles".to_string(),
            },
            Self::EdgeDetail(edge) => format!("/stacks/{edge}"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {}", self.path())
    }
}

/// Produces the artifacts the viewer displays.
///
/// Implementations run on the viewer's single-threaded executor, so their
/// futures need not be `Send`.
#[async_trait(?Send)]
pub trait ArtifactSource {
    /// Fetch the whole graph.
    async fn fetch_graph(&self) -> Result<Diagram>;

    /// Fetch cycle membership with `exclusions` removed from the graph.
    async fn fetch_cycles(&self, exclusions: &ExclusionSet) -> Result<CycleMembership>;

    /// Fetch the detail diagram of `edge`.
    async fn fetch_edge_detail(&self, edge: &ElementId) -> Result<Diagram>;
}
