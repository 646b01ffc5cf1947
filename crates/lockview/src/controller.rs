//! The graph interaction controller.
//!
//! Owns the whole-graph view and keeps every element's visual markers
//! consistent with the exclusion set, the latest cycle membership, and the
//! current selection.
//!
//! # Cycle recomputation
//!
//! Each recomputation is a [`CycleRequest`]: a sequence number assigned when
//! the request is issued plus a snapshot of the exclusion set. Any number of
//! requests may be in flight and their responses may arrive in any order.
//! Only the response to the most recently issued request is applied; every
//! other response is dropped as [`RecomputeOutcome::Superseded`]. Nothing is
//! cancelled.
//!
//! # Concurrency
//!
//! Everything runs on one thread. State lives behind `Rc<RefCell<_>>` and
//! no borrow is held across an `.await`, so interleaved tasks always see
//! consistent state.

use crate::config::ViewerConfig;
use crate::detail::{DetailOutcome, EdgeDetailLoader};
use crate::diagram::{ElementState, MountedDiagram};
use crate::domain::{
    CycleMembership, ElementId, ElementKind, ExclusionSet, Marker, Markers, Modifiers, ViewLayout,
};
use crate::error::{Error, Result};
use crate::indicator::{fetch_checked, LoadingIndicator};
use crate::source::ArtifactSource;
use crate::surface::Container;
use lockview_transform::{Point, TransformEngine};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// An issued cycle recomputation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    /// Position in issue order; later requests have larger numbers.
    pub seq: u64,
    /// The exclusion set at the time of issue.
    pub exclusions: ExclusionSet,
}

/// What happened to a cycle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RecomputeOutcome {
    /// The response was the latest and its membership is now shown.
    Applied {
        /// Sequence number of the applied request.
        seq: u64,
    },
    /// A newer request was issued before this response arrived.
    Superseded {
        /// Sequence number of the dropped request.
        seq: u64,
        /// Sequence number of the latest issued request.
        current: u64,
    },
}

/// What an edge click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClickOutcome {
    /// The edge was toggled in the exclusion set.
    Toggled {
        /// The clicked edge.
        edge: ElementId,
        /// Whether the edge is now excluded.
        excluded: bool,
        /// What happened to the resulting recomputation.
        recompute: RecomputeOutcome,
    },
    /// The edge was selected and its detail requested.
    Selected {
        /// The clicked edge.
        edge: ElementId,
        /// What happened to the detail request.
        detail: DetailOutcome,
    },
    /// No edge was under the pointer.
    Missed,
}

struct ControllerState<C: Container> {
    container: C,
    graph: Option<MountedDiagram>,
    engine: Option<TransformEngine<C::Viewport>>,
    exclusions: ExclusionSet,
    membership: CycleMembership,
    selected: Option<ElementId>,
    layout: ViewLayout,
    issued_seq: u64,
}

impl<C: Container> ControllerState<C> {
    fn graph(&self) -> Result<&MountedDiagram> {
        self.graph.as_ref().ok_or(Error::NotLoaded)
    }

    fn edge(&self, id: &ElementId) -> Result<()> {
        let element = self
            .graph()?
            .get(id)
            .ok_or_else(|| Error::UnknownElement(id.clone()))?;
        match element.kind {
            ElementKind::Edge => Ok(()),
            ElementKind::Node => Err(Error::NotAnEdge(id.clone())),
        }
    }

    fn issue_request(&mut self) -> CycleRequest {
        self.issued_seq += 1;
        debug!(
            seq = self.issued_seq,
            excluded = self.exclusions.len(),
            "Issuing cycle query"
        );
        CycleRequest {
            seq: self.issued_seq,
            exclusions: self.exclusions.clone(),
        }
    }

    /// Make the excluded markers mirror the exclusion set.
    fn refresh_excluded(&mut self) {
        let Some(graph) = self.graph.as_mut() else {
            return;
        };
        graph.clear_marker(Marker::Excluded);
        for id in self.exclusions.iter() {
            if let Err(e) = graph.set_marker(id, Marker::Excluded, true) {
                warn!(error = %e, "Skipping excluded id");
            }
        }
    }

    /// Make the in-cycle markers mirror `membership`.
    fn apply_membership(&mut self, membership: CycleMembership) {
        if let Some(graph) = self.graph.as_mut() {
            graph.clear_marker(Marker::InCycle);
            for id in membership.iter() {
                if let Err(e) = graph.set_marker(id, Marker::InCycle, true) {
                    warn!(error = %e, "Skipping cycle member");
                }
            }
        }
        self.membership = membership;
    }
}

/// Drives the whole-graph view and the edge detail view.
///
/// Clones share state.
pub struct GraphController<C: Container> {
    state: Rc<RefCell<ControllerState<C>>>,
    source: Rc<dyn ArtifactSource>,
    indicator: LoadingIndicator,
    detail: EdgeDetailLoader<C>,
    config: Rc<ViewerConfig>,
}

impl<C: Container> Clone for GraphController<C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            source: Rc::clone(&self.source),
            indicator: self.indicator.clone(),
            detail: self.detail.clone(),
            config: Rc::clone(&self.config),
        }
    }
}

impl<C: Container> GraphController<C> {
    /// Create a controller over a graph container and a detail container.
    pub fn new(
        source: Rc<dyn ArtifactSource>,
        graph_container: C,
        detail_container: C,
        config: ViewerConfig,
    ) -> Self {
        let indicator = LoadingIndicator::new();
        let detail = EdgeDetailLoader::new(detail_container, Rc::clone(&source), indicator.clone());
        Self {
            state: Rc::new(RefCell::new(ControllerState {
                container: graph_container,
                graph: None,
                engine: None,
                exclusions: ExclusionSet::new(),
                membership: CycleMembership::default(),
                selected: None,
                layout: ViewLayout::default(),
                issued_seq: 0,
            })),
            source,
            indicator,
            detail,
            config: Rc::new(config),
        }
    }

    /// Fetch and mount the graph, fit it, and apply the initial cycle
    /// membership.
    ///
    /// The initial cycle query is issued with the current exclusion set
    /// (empty on first load) before the transform engine is created.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the graph or initial cycle fetch fails.
    /// A graph that cannot be fitted is logged, not returned.
    pub async fn load(&self) -> Result<RecomputeOutcome> {
        let diagram = fetch_checked(&self.indicator, self.source.fetch_graph()).await?;

        let request = {
            let mut state = self.state.borrow_mut();
            let mut mounted = MountedDiagram::mount(&diagram);
            let bound = mounted.bind_hit_targets(self.config.hit_target_width);
            state.graph = Some(mounted);
            state.selected = None;
            state.membership = CycleMembership::default();
            state.refresh_excluded();

            let request = state.issue_request();

            let viewport = state.container.mount(&diagram);
            let mut engine = TransformEngine::new(viewport);
            if let Err(e) = engine.fit_to_view() {
                warn!(error = %e, "Cannot fit graph");
            }
            state.engine = Some(engine);

            info!(
                elements = diagram.elements.len(),
                hit_targets = bound,
                "Graph loaded"
            );
            request
        };

        self.complete_cycles(request).await
    }

    /// Dispatch a click on `edge`.
    ///
    /// With the configured toggle modifier held the edge's exclusion is
    /// toggled and cycles are recomputed; otherwise the edge is selected and
    /// its detail loaded.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownElement` or `Error::NotAnEdge` if `edge` is not
    /// a mounted edge, or the source's error if a fetch fails.
    pub async fn handle_edge_click(
        &self,
        edge: &ElementId,
        modifiers: Modifiers,
    ) -> Result<ClickOutcome> {
        if modifiers.held(self.config.toggle_modifier) {
            let request = self.toggle_exclusion(edge)?;
            let excluded = request.exclusions.contains(edge);
            let recompute = self.complete_cycles(request).await?;
            Ok(ClickOutcome::Toggled {
                edge: edge.clone(),
                excluded,
                recompute,
            })
        } else {
            self.select_edge(edge)?;
            let detail = self.detail.show(edge.clone()).await?;
            Ok(ClickOutcome::Selected {
                edge: edge.clone(),
                detail,
            })
        }
    }

    /// Hit-test `client` against the edge overlays and dispatch a click.
    ///
    /// A click that hits no edge does nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotLoaded` before [`load`](Self::load), or whatever
    /// [`handle_edge_click`](Self::handle_edge_click) returns.
    pub async fn click_at(&self, client: Point, modifiers: Modifiers) -> Result<ClickOutcome> {
        let hit = {
            let state = self.state.borrow();
            let graph = state.graph()?;
            state
                .engine
                .as_ref()
                .and_then(|engine| engine.client_to_content(client))
                .and_then(|point| graph.edge_at(point).cloned())
        };
        match hit {
            Some(edge) => self.handle_edge_click(&edge, modifiers).await,
            None => {
                debug!(x = client.x, y = client.y, "Click missed every edge");
                Ok(ClickOutcome::Missed)
            }
        }
    }

    /// Toggle `edge` in the exclusion set, refresh the excluded markers,
    /// and issue a recomputation.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotLoaded`, `Error::UnknownElement` or
    /// `Error::NotAnEdge`; the exclusion set is unchanged in that case.
    pub fn toggle_exclusion(&self, edge: &ElementId) -> Result<CycleRequest> {
        let mut state = self.state.borrow_mut();
        state.edge(edge)?;
        let excluded = state.exclusions.toggle(edge);
        state.refresh_excluded();
        debug!(%edge, excluded, "Toggled exclusion");
        Ok(state.issue_request())
    }

    /// Issue a recomputation for the current exclusion set.
    pub fn request_cycles(&self) -> CycleRequest {
        self.state.borrow_mut().issue_request()
    }

    /// Fetch the membership for `request` and apply it if `request` is still
    /// the latest.
    ///
    /// # Errors
    ///
    /// Returns the source's error; markers keep their previous state.
    pub async fn complete_cycles(&self, request: CycleRequest) -> Result<RecomputeOutcome> {
        let membership =
            fetch_checked(&self.indicator, self.source.fetch_cycles(&request.exclusions)).await?;

        let mut state = self.state.borrow_mut();
        if request.seq != state.issued_seq {
            debug!(
                seq = request.seq,
                current = state.issued_seq,
                "Dropping superseded cycle response"
            );
            return Ok(RecomputeOutcome::Superseded {
                seq: request.seq,
                current: state.issued_seq,
            });
        }

        debug!(
            seq = request.seq,
            nodes = membership.nodes.len(),
            edges = membership.edges.len(),
            "Applying cycle membership"
        );
        state.apply_membership(membership);
        Ok(RecomputeOutcome::Applied { seq: request.seq })
    }

    /// Issue and complete a recomputation for the current exclusion set.
    ///
    /// # Errors
    ///
    /// Returns the source's error.
    pub async fn recompute_cycles(&self) -> Result<RecomputeOutcome> {
        let request = self.request_cycles();
        self.complete_cycles(request).await
    }

    /// Make `edge` the only selected element and switch to the configured
    /// selection layout. Does not load the detail view.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotLoaded`, `Error::UnknownElement` or
    /// `Error::NotAnEdge`; the selection is unchanged in that case.
    pub fn select_edge(&self, edge: &ElementId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.edge(edge)?;
        let layout = ViewLayout::from(self.config.selection_layout);
        if let Some(graph) = state.graph.as_mut() {
            graph.clear_marker(Marker::Selected);
            graph.set_marker(edge, Marker::Selected, true)?;
        }
        state.selected = Some(edge.clone());
        state.layout = layout;
        debug!(%edge, %layout, "Selected edge");
        Ok(())
    }

    /// Expand the graph view to full size.
    pub fn expand(&self) {
        self.state.borrow_mut().layout = ViewLayout::Expanded;
        debug!("Expanded graph view");
    }

    /// The current exclusion set.
    #[must_use]
    pub fn exclusions(&self) -> ExclusionSet {
        self.state.borrow().exclusions.clone()
    }

    /// The most recently applied cycle membership.
    #[must_use]
    pub fn membership(&self) -> CycleMembership {
        self.state.borrow().membership.clone()
    }

    /// The selected edge, if any.
    #[must_use]
    pub fn selected_edge(&self) -> Option<ElementId> {
        self.state.borrow().selected.clone()
    }

    /// The current view layout.
    #[must_use]
    pub fn layout(&self) -> ViewLayout {
        self.state.borrow().layout
    }

    /// Sequence number of the most recently issued cycle request.
    #[must_use]
    pub fn issued_seq(&self) -> u64 {
        self.state.borrow().issued_seq
    }

    /// The markers of element `id`, if it is mounted.
    #[must_use]
    pub fn markers(&self, id: &ElementId) -> Option<Markers> {
        let state = self.state.borrow();
        state.graph.as_ref()?.get(id).map(|element| element.markers)
    }

    /// Ids of the graph elements carrying `marker`.
    #[must_use]
    pub fn elements_with(&self, marker: Marker) -> Vec<ElementId> {
        self.state
            .borrow()
            .graph
            .as_ref()
            .map(|graph| graph.elements_with(marker))
            .unwrap_or_default()
    }

    /// Marker state of every marked graph element.
    #[must_use]
    pub fn marked_elements(&self) -> Vec<ElementState> {
        self.state
            .borrow()
            .graph
            .as_ref()
            .map(MountedDiagram::marked_elements)
            .unwrap_or_default()
    }

    /// Run `f` on the graph view's transform engine, if loaded.
    pub fn with_graph_engine<R>(
        &self,
        f: impl FnOnce(&mut TransformEngine<C::Viewport>) -> R,
    ) -> Option<R> {
        self.state.borrow_mut().engine.as_mut().map(f)
    }

    /// Run `f` on the graph container.
    pub fn with_graph_container<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.state.borrow_mut().container)
    }

    /// The edge detail view.
    #[must_use]
    pub const fn detail(&self) -> &EdgeDetailLoader<C> {
        &self.detail
    }

    /// The shared loading indicator.
    #[must_use]
    pub const fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}
