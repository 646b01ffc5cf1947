//! Domain types for the lock graph viewer.
//!
//! This module contains the artifacts exchanged with the rendering and
//! analysis collaborators and the visual state the viewer derives from them.

use lockview_transform::Size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable identifier of an element in a mounted diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Create a new element ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Whether an element is a graph node or a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// A graph node.
    Node,
    /// A graph edge.
    Edge,
}

/// One addressable element of a diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    /// Stable identifier.
    pub id: ElementId,

    /// Node or edge.
    pub kind: ElementKind,

    /// SVG path data of the element's visible outline or stroke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// For edges: the node the edge leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ElementId>,

    /// For edges: the node the edge enters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementId>,
}

impl DiagramElement {
    /// A node element without geometry.
    pub fn node(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Node,
            path: None,
            source: None,
            target: None,
        }
    }

    /// An edge element from `source` to `target` with the given path data.
    pub fn edge(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Edge,
            path: Some(path.into()),
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }
}

/// A vector diagram produced by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    /// Natural width.
    pub width: f64,

    /// Natural height.
    pub height: f64,

    /// Elements in document order.
    #[serde(default)]
    pub elements: Vec<DiagramElement>,
}

impl Diagram {
    /// The diagram's natural size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Iterate over the edge elements.
    pub fn edges(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements
            .iter()
            .filter(|element| element.kind == ElementKind::Edge)
    }

    /// Iterate over the node elements.
    pub fn nodes(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements
            .iter()
            .filter(|element| element.kind == ElementKind::Node)
    }
}

/// Edges the user has removed from cycle analysis.
///
/// Ordered, so the query parameter built from it is deterministic. The set
/// is only ever changed by [`ExclusionSet::toggle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<ElementId>);

impl ExclusionSet {
    /// An empty exclusion set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `edge` if absent, remove it if present.
    ///
    /// Returns `true` if the edge is excluded afterwards. Toggling the same
    /// edge twice leaves the set unchanged.
    pub fn toggle(&mut self, edge: &ElementId) -> bool {
        if self.0.remove(edge) {
            false
        } else {
            self.0.insert(edge.clone());
            true
        }
    }

    /// Whether `edge` is excluded.
    #[must_use]
    pub fn contains(&self, edge: &ElementId) -> bool {
        self.0.contains(edge)
    }

    /// Iterate over excluded edges in order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.0.iter()
    }

    /// Number of excluded edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no edge is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The comma-joined `exc` query value, or `None` when the set is empty.
    #[must_use]
    pub fn query_param(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        Some(
            self.0
                .iter()
                .map(ElementId::as_str)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

impl FromIterator<ElementId> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The nodes and edges that take part in at least one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleMembership {
    /// Nodes on at least one cycle.
    #[serde(default)]
    pub nodes: BTreeSet<ElementId>,

    /// Edges on at least one cycle.
    #[serde(default)]
    pub edges: BTreeSet<ElementId>,
}

impl CycleMembership {
    /// Whether `id` names a node or edge in this membership.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.nodes.contains(id) || self.edges.contains(id)
    }

    /// Whether no element is on a cycle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// All named nodes, then all named edges.
    pub fn iter(&self) -> impl Iterator<Item = &ElementId> {
        self.nodes.iter().chain(self.edges.iter())
    }
}

/// One of the three independent visual markers an element can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Marker {
    /// Excluded from cycle analysis.
    Excluded,
    /// On at least one cycle.
    InCycle,
    /// The selected edge; at most one element carries it.
    Selected,
}

impl Marker {
    /// Every marker, in display order.
    pub const ALL: [Self; 3] = [Self::Excluded, Self::InCycle, Self::Selected];

    /// The presentation class name for this marker.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Excluded => "excluded",
            Self::InCycle => "in-cycle",
            Self::Selected => "selected",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// The visual state of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Excluded from cycle analysis.
    pub excluded: bool,
    /// On at least one cycle.
    pub in_cycle: bool,
    /// Currently selected.
    pub selected: bool,
}

impl Markers {
    /// Whether `marker` is set.
    #[must_use]
    pub const fn has(&self, marker: Marker) -> bool {
        match marker {
            Marker::Excluded => self.excluded,
            Marker::InCycle => self.in_cycle,
            Marker::Selected => self.selected,
        }
    }

    /// Set or clear `marker`.
    pub fn set(&mut self, marker: Marker, on: bool) {
        match marker {
            Marker::Excluded => self.excluded = on,
            Marker::InCycle => self.in_cycle = on,
            Marker::Selected => self.selected = on,
        }
    }

    /// Whether no marker is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.excluded && !self.in_cycle && !self.selected
    }

    /// The class names of every set marker, in display order.
    pub fn class_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        Marker::ALL
            .into_iter()
            .filter(|marker| self.has(*marker))
            .map(Marker::class_name)
    }
}

/// A keyboard modifier that can turn a click into an exclusion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierKey {
    /// Control.
    #[default]
    Ctrl,
    /// Shift.
    Shift,
    /// Alt / Option.
    Alt,
    /// Meta / Command.
    Meta,
}

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control held.
    #[serde(default)]
    pub ctrl: bool,
    /// Shift held.
    #[serde(default)]
    pub shift: bool,
    /// Alt held.
    #[serde(default)]
    pub alt: bool,
    /// Meta held.
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Only control held.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Whether `key` is held.
    #[must_use]
    pub const fn held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Shift => self.shift,
            ModifierKey::Alt => self.alt,
            ModifierKey::Meta => self.meta,
        }
    }
}

/// How the graph and detail views share the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewLayout {
    /// Initial layout: the graph view at its normal size.
    #[default]
    Graph,
    /// The graph view expanded to fill the screen.
    Expanded,
    /// The graph as a thumbnail with the edge detail filling the screen.
    DetailFocus,
    /// Graph and edge detail side by side.
    SideBySide,
}

impl ViewLayout {
    /// The presentation class names for the graph view in this layout.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Graph => "",
            Self::Expanded => "full",
            Self::DetailFocus => "full thumb",
            Self::SideBySide => "full split",
        }
    }
}

impl fmt::Display for ViewLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Graph => "graph",
            Self::Expanded => "expanded",
            Self::DetailFocus => "detail-focus",
            Self::SideBySide => "side-by-side",
        };
        f.write_str(name)
    }
}

/// The layout used when an edge is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionLayout {
    /// Shrink the graph to a thumbnail and show the detail full screen.
    #[default]
    DetailFocus,
    /// Show graph and detail side by side.
    SideBySide,
}

impl From<SelectionLayout> for ViewLayout {
    fn from(layout: SelectionLayout) -> Self {
        match layout {
            SelectionLayout::DetailFocus => Self::DetailFocus,
            SelectionLayout::SideBySide => Self::SideBySide,
        }
    }
}
