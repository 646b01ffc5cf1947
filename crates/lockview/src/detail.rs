//! The edge detail view.
//!
//! Selecting an edge replaces whatever the detail container showed before:
//! the old content and its transform engine are dropped, the edge's detail
//! diagram is fetched and mounted, and a fresh engine is fitted to it.

use crate::diagram::MountedDiagram;
use crate::domain::ElementId;
use crate::error::Result;
use crate::indicator::{fetch_checked, LoadingIndicator};
use crate::source::ArtifactSource;
use crate::surface::Container;
use lockview_transform::TransformEngine;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// What happened to a detail request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DetailOutcome {
    /// The detail diagram was mounted and fitted.
    Mounted {
        /// The edge shown.
        edge: ElementId,
    },
    /// Another edge was selected before this response arrived; it was
    /// dropped.
    Superseded {
        /// The edge whose response was dropped.
        edge: ElementId,
    },
}

struct DetailState<C: Container> {
    container: C,
    engine: Option<TransformEngine<C::Viewport>>,
    diagram: Option<MountedDiagram>,
    edge: Option<ElementId>,
    issued_seq: u64,
}

/// Loads per-edge detail diagrams into a dedicated container.
///
/// Clones share state.
pub struct EdgeDetailLoader<C: Container> {
    state: Rc<RefCell<DetailState<C>>>,
    source: Rc<dyn ArtifactSource>,
    indicator: LoadingIndicator,
}

impl<C: Container> Clone for EdgeDetailLoader<C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            source: Rc::clone(&self.source),
            indicator: self.indicator.clone(),
        }
    }
}

impl<C: Container> EdgeDetailLoader<C> {
    /// Create a loader that mounts into `container`.
    pub fn new(container: C, source: Rc<dyn ArtifactSource>, indicator: LoadingIndicator) -> Self {
        Self {
            state: Rc::new(RefCell::new(DetailState {
                container,
                engine: None,
                diagram: None,
                edge: None,
                issued_seq: 0,
            })),
            source,
            indicator,
        }
    }

    /// Show the detail diagram of `edge`, replacing any previous content.
    ///
    /// The container is cleared before the request goes out, so a failed
    /// request leaves it empty.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the fetch fails.
    pub async fn show(&self, edge: ElementId) -> Result<DetailOutcome> {
        let seq = {
            let mut state = self.state.borrow_mut();
            state.issued_seq += 1;
            state.container.clear();
            state.engine = None;
            state.diagram = None;
            state.edge = Some(edge.clone());
            state.issued_seq
        };
        debug!(%edge, seq, "Loading edge detail");

        let diagram = fetch_checked(&self.indicator, self.source.fetch_edge_detail(&edge)).await?;

        let mut state = self.state.borrow_mut();
        if seq != state.issued_seq {
            debug!(%edge, seq, current = state.issued_seq, "Dropping superseded edge detail");
            return Ok(DetailOutcome::Superseded { edge });
        }

        let viewport = state.container.mount(&diagram);
        let mut engine = TransformEngine::new(viewport);
        if let Err(e) = engine.fit_to_view() {
            warn!(%edge, error = %e, "Cannot fit edge detail");
        }
        state.engine = Some(engine);
        state.diagram = Some(MountedDiagram::mount(&diagram));
        Ok(DetailOutcome::Mounted { edge })
    }

    /// The edge most recently requested.
    #[must_use]
    pub fn current_edge(&self) -> Option<ElementId> {
        self.state.borrow().edge.clone()
    }

    /// Whether a detail diagram is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state.borrow().diagram.is_some()
    }

    /// Run `f` on the detail view's transform engine, if one exists.
    pub fn with_engine<R>(
        &self,
        f: impl FnOnce(&mut TransformEngine<C::Viewport>) -> R,
    ) -> Option<R> {
        self.state.borrow_mut().engine.as_mut().map(f)
    }

    /// Run `f` on the detail container.
    pub fn with_container<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.state.borrow_mut().container)
    }

    /// Run `f` on the mounted detail diagram, if any.
    pub fn with_diagram<R>(&self, f: impl FnOnce(&MountedDiagram) -> R) -> Option<R> {
        self.state.borrow().diagram.as_ref().map(f)
    }
}
