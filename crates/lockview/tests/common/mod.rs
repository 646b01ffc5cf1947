//! Shared fixtures for lockview integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lockview::Result;
use lockview::config::ViewerConfig;
use lockview::controller::GraphController;
use lockview::domain::{CycleMembership, Diagram, DiagramElement, ElementId, ExclusionSet};
use lockview::source::ArtifactSource;
use lockview::source::analysis::cycle_membership;
use lockview::surface::HeadlessContainer;
use lockview_transform::Rect;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tokio::sync::oneshot;

/// Build a set of element ids.
pub fn ids(names: &[&str]) -> BTreeSet<ElementId> {
    names.iter().map(|n| ElementId::new(*n)).collect()
}

/// Build an exclusion set.
pub fn exclusions(names: &[&str]) -> ExclusionSet {
    names.iter().map(|n| ElementId::new(*n)).collect()
}

/// Build a cycle membership.
pub fn membership(nodes: &[&str], edges: &[&str]) -> CycleMembership {
    CycleMembership {
        nodes: ids(nodes),
        edges: ids(edges),
    }
}

/// Five nodes and eight edges laid out on a 400x300 canvas.
///
/// Edge `eK` runs horizontally at y = 30*K from x = 20 to x = 380.
pub fn sample_graph() -> Diagram {
    let links = [
        ("e1", "n1", "n2"),
        ("e2", "n2", "n1"),
        ("e3", "n2", "n3"),
        ("e4", "n3", "n2"),
        ("e5", "n3", "n4"),
        ("e6", "n4", "n5"),
        ("e7", "n5", "n2"),
        ("e8", "n4", "n1"),
    ];
    let mut elements: Vec<DiagramElement> = ["n1", "n2", "n3", "n4", "n5"]
        .into_iter()
        .map(DiagramElement::node)
        .collect();
    for (k, (id, from, to)) in links.into_iter().enumerate() {
        let y = 30.0 * (k + 1) as f64;
        elements.push(DiagramElement::edge(id, from, to, format!("M20,{y} L380,{y}")));
    }
    Diagram {
        width: 400.0,
        height: 300.0,
        elements,
    }
}

/// A source that answers every request immediately.
pub struct StaticSource {
    pub graph: Diagram,
}

#[async_trait(?Send)]
impl ArtifactSource for StaticSource {
    async fn fetch_graph(&self) -> Result<Diagram> {
        Ok(self.graph.clone())
    }

    async fn fetch_cycles(&self, exclusions: &ExclusionSet) -> Result<CycleMembership> {
        Ok(cycle_membership(&self.graph, exclusions))
    }

    async fn fetch_edge_detail(&self, _edge: &ElementId) -> Result<Diagram> {
        Ok(Diagram {
            width: 100.0,
            height: 100.0,
            elements: Vec::new(),
        })
    }
}

struct Pending<K, V> {
    key: K,
    reply: oneshot::Sender<Result<V>>,
}

type Queue<K, V> = Rc<RefCell<Vec<Pending<K, V>>>>;

/// A source whose cycle and detail responses are released by the test.
pub struct GatedSource {
    graph: Diagram,
    cycles: Queue<ExclusionSet, CycleMembership>,
    details: Queue<ElementId, Diagram>,
}

/// The test's handle for releasing gated responses.
#[derive(Clone)]
pub struct Gate {
    cycles: Queue<ExclusionSet, CycleMembership>,
    details: Queue<ElementId, Diagram>,
}

impl GatedSource {
    pub fn new(graph: Diagram) -> (Self, Gate) {
        let cycles: Queue<_, _> = Rc::default();
        let details: Queue<_, _> = Rc::default();
        let gate = Gate {
            cycles: Rc::clone(&cycles),
            details: Rc::clone(&details),
        };
        (
            Self {
                graph,
                cycles,
                details,
            },
            gate,
        )
    }
}

async fn wait_reply<V>(rx: oneshot::Receiver<Result<V>>) -> Result<V> {
    rx.await
        .unwrap_or_else(|_| Err(lockview::Error::Transport("gate dropped".to_string())))
}

#[async_trait(?Send)]
impl ArtifactSource for GatedSource {
    async fn fetch_graph(&self) -> Result<Diagram> {
        Ok(self.graph.clone())
    }

    async fn fetch_cycles(&self, exclusions: &ExclusionSet) -> Result<CycleMembership> {
        let (reply, rx) = oneshot::channel();
        self.cycles.borrow_mut().push(Pending {
            key: exclusions.clone(),
            reply,
        });
        wait_reply(rx).await
    }

    async fn fetch_edge_detail(&self, edge: &ElementId) -> Result<Diagram> {
        let (reply, rx) = oneshot::channel();
        self.details.borrow_mut().push(Pending {
            key: edge.clone(),
            reply,
        });
        wait_reply(rx).await
    }
}

async fn wait_for<K, V>(queue: &Queue<K, V>, count: usize) {
    while queue.borrow().len() < count {
        tokio::task::yield_now().await;
    }
}

fn release<K: PartialEq + std::fmt::Debug, V>(queue: &Queue<K, V>, key: &K, value: Result<V>) {
    let mut queue = queue.borrow_mut();
    let index = queue
        .iter()
        .position(|p| &p.key == key)
        .unwrap_or_else(|| panic!("no pending request for {key:?}"));
    let pending = queue.remove(index);
    let _ = pending.reply.send(value);
}

impl Gate {
    /// Wait until `count` cycle queries are pending.
    pub async fn cycles_pending(&self, count: usize) {
        wait_for(&self.cycles, count).await;
    }

    /// Answer the pending cycle query issued with `exclusions`.
    pub fn answer_cycles(&self, exclusions: &ExclusionSet, result: Result<CycleMembership>) {
        release(&self.cycles, exclusions, result);
    }

    /// Wait until `count` detail requests are pending.
    pub async fn details_pending(&self, count: usize) {
        wait_for(&self.details, count).await;
    }

    /// Answer the pending detail request for `edge`.
    pub fn answer_detail(&self, edge: &str, result: Result<Diagram>) {
        release(&self.details, &ElementId::new(edge), result);
    }
}

/// A small detail diagram.
pub fn detail_diagram() -> Diagram {
    Diagram {
        width: 120.0,
        height: 80.0,
        elements: vec![DiagramElement::node("frame0")],
    }
}

/// Container box shared by both views in tests.
pub const CONTAINER: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

/// A controller over headless containers.
pub fn controller(source: Rc<dyn ArtifactSource>) -> GraphController<HeadlessContainer> {
    controller_with(source, ViewerConfig::default())
}

/// A controller over headless containers with a custom config.
pub fn controller_with(
    source: Rc<dyn ArtifactSource>,
    config: ViewerConfig,
) -> GraphController<HeadlessContainer> {
    GraphController::new(
        source,
        HeadlessContainer::new(CONTAINER),
        HeadlessContainer::new(CONTAINER),
        config,
    )
}

/// Load `controller`, answering the initial cycle query with `initial`.
pub async fn load_gated(
    controller: &GraphController<HeadlessContainer>,
    gate: &Gate,
    initial: CycleMembership,
) {
    let (loaded, ()) = tokio::join!(controller.load(), async {
        gate.cycles_pending(1).await;
        gate.answer_cycles(&ExclusionSet::new(), Ok(initial));
    });
    loaded.expect("initial load");
}
