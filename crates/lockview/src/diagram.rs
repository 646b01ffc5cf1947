//! Mounted diagrams: elements addressable by id, carrying visual markers.

use crate::domain::{Diagram, ElementId, ElementKind, Marker, Markers};
use crate::error::{Error, Result};
use crate::path::PathGeometry;
use lockview_transform::{Point, Size};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default stroke width of the invisible click target over each edge.
pub const DEFAULT_HIT_TARGET_WIDTH: f64 = 10.0;

/// An invisible overlay that widens an edge's clickable area.
#[derive(Debug, Clone, PartialEq)]
pub struct HitTarget {
    /// Same geometry as the edge.
    pub path: PathGeometry,
    /// Stroke width of the overlay; points within half of it hit.
    pub stroke_width: f64,
}

/// One element of a mounted diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedElement {
    /// Stable identifier.
    pub id: ElementId,
    /// Node or edge.
    pub kind: ElementKind,
    /// Parsed geometry, when the element has valid path data.
    pub path: Option<PathGeometry>,
    /// Current visual markers.
    pub markers: Markers,
    /// Click overlay, once bound.
    pub overlay: Option<HitTarget>,
}

/// Serializable view of one element's markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementState {
    /// Element id.
    pub id: ElementId,
    /// Presentation class names currently applied.
    pub classes: Vec<&'static str>,
}

/// A diagram mounted into a container.
#[derive(Debug, Clone, Default)]
pub struct MountedDiagram {
    size: Size,
    elements: Vec<MountedElement>,
    index: HashMap<ElementId, usize>,
}

impl MountedDiagram {
    /// Mount `diagram`, parsing each element's path data.
    ///
    /// Elements with unparsable paths are mounted without geometry so they
    /// can still carry markers. A repeated id keeps its first element.
    #[must_use]
    pub fn mount(diagram: &Diagram) -> Self {
        let mut mounted = Self {
            size: diagram.size(),
            elements: Vec::with_capacity(diagram.elements.len()),
            index: HashMap::with_capacity(diagram.elements.len()),
        };

        for element in &diagram.elements {
            if mounted.index.contains_key(&element.id) {
                warn!(id = %element.id, "Duplicate element id; keeping the first");
                continue;
            }
            let path = element.path.as_deref().and_then(|data| {
                PathGeometry::parse(data)
                    .inspect_err(|e| warn!(id = %element.id, error = %e, "Unusable path data"))
                    .ok()
            });
            mounted
                .index
                .insert(element.id.clone(), mounted.elements.len());
            mounted.elements.push(MountedElement {
                id: element.id.clone(),
                kind: element.kind,
                path,
                markers: Markers::default(),
                overlay: None,
            });
        }

        debug!(elements = mounted.elements.len(), "Mounted diagram");
        mounted
    }

    /// The diagram's natural size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of mounted elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&MountedElement> {
        self.index.get(id).map(|&i| &self.elements[i])
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &MountedElement> {
        self.elements.iter()
    }

    /// Set or clear `marker` on the element `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownElement` if no element has this id.
    pub fn set_marker(&mut self, id: &ElementId, marker: Marker, on: bool) -> Result<()> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| Error::UnknownElement(id.clone()))?;
        self.elements[i].markers.set(marker, on);
        Ok(())
    }

    /// Clear `marker` from every element.
    pub fn clear_marker(&mut self, marker: Marker) {
        for element in &mut self.elements {
            element.markers.set(marker, false);
        }
    }

    /// Ids of the elements carrying `marker`, in document order.
    #[must_use]
    pub fn elements_with(&self, marker: Marker) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|element| element.markers.has(marker))
            .map(|element| element.id.clone())
            .collect()
    }

    /// Attach a click overlay of `stroke_width` to every edge with geometry.
    ///
    /// Returns the number of overlays bound. Rebinding replaces existing
    /// overlays.
    pub fn bind_hit_targets(&mut self, stroke_width: f64) -> usize {
        let mut bound = 0;
        for element in &mut self.elements {
            if element.kind != ElementKind::Edge {
                continue;
            }
            element.overlay = element.path.clone().map(|path| HitTarget { path, stroke_width });
            if element.overlay.is_some() {
                bound += 1;
            }
        }
        debug!(bound, stroke_width, "Bound edge hit targets");
        bound
    }

    /// The edge whose overlay is closest to `point` and within its stroke.
    ///
    /// `point` is in diagram coordinates.
    #[must_use]
    pub fn edge_at(&self, point: Point) -> Option<&ElementId> {
        self.elements
            .iter()
            .filter_map(|element| {
                let overlay = element.overlay.as_ref()?;
                let distance = overlay.path.distance_to(point)?;
                (distance <= overlay.stroke_width / 2.0).then_some((distance, &element.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    /// Marker state of every element carrying at least one marker.
    #[must_use]
    pub fn marked_elements(&self) -> Vec<ElementState> {
        self.elements
            .iter()
            .filter(|element| !element.markers.is_empty())
            .map(|element| ElementState {
                id: element.id.clone(),
                classes: element.markers.class_names().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiagramElement;

    fn sample() -> Diagram {
        Diagram {
            width: 200.0,
            height: 100.0,
            elements: vec![
                DiagramElement::node("n1"),
                DiagramElement::node("n2"),
                DiagramElement::edge("e1", "n1", "n2", "M0,50 L200,50"),
                DiagramElement::edge("e2", "n2", "n1", "M100,0 L100,100"),
                DiagramElement::edge("e3", "n2", "n2", "M0,0 A1,1 0 0 1 5,5"),
            ],
        }
    }

    #[test]
    fn test_mount_indexes_elements() {
        let mounted = MountedDiagram::mount(&sample());
        assert_eq!(mounted.len(), 5);
        assert_eq!(mounted.size(), Size::new(200.0, 100.0));
        assert_eq!(
            mounted.get(&ElementId::new("e1")).unwrap().kind,
            ElementKind::Edge
        );
        // Unsupported path data still mounts, without geometry.
        assert!(mounted.get(&ElementId::new("e3")).unwrap().path.is_none());
    }

    #[test]
    fn test_set_marker_unknown_element() {
        let mut mounted = MountedDiagram::mount(&sample());
        let err = mounted
            .set_marker(&ElementId::new("zz"), Marker::Selected, true)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownElement(id) if id.as_str() == "zz"));
    }

    #[test]
    fn test_markers_are_independent() {
        let mut mounted = MountedDiagram::mount(&sample());
        let e1 = ElementId::new("e1");
        mounted.set_marker(&e1, Marker::Excluded, true).unwrap();
        mounted.set_marker(&e1, Marker::InCycle, true).unwrap();
        mounted.clear_marker(Marker::InCycle);

        let markers = mounted.get(&e1).unwrap().markers;
        assert!(markers.excluded);
        assert!(!markers.in_cycle);
        assert_eq!(mounted.elements_with(Marker::Excluded), vec![e1]);
    }

    #[test]
    fn test_bind_hit_targets_skips_nodes_and_bad_paths() {
        let mut mounted = MountedDiagram::mount(&sample());
        assert_eq!(mounted.bind_hit_targets(DEFAULT_HIT_TARGET_WIDTH), 2);
        assert!(mounted.get(&ElementId::new("n1")).unwrap().overlay.is_none());
    }

    #[test]
    fn test_edge_at_uses_half_stroke_width() {
        let mut mounted = MountedDiagram::mount(&sample());
        mounted.bind_hit_targets(10.0);

        assert_eq!(
            mounted.edge_at(Point::new(30.0, 54.0)).map(ElementId::as_str),
            Some("e1")
        );
        assert_eq!(mounted.edge_at(Point::new(30.0, 56.0)), None);
        // Closest overlay wins where two overlap.
        assert_eq!(
            mounted.edge_at(Point::new(102.0, 51.0)).map(ElementId::as_str),
            Some("e1")
        );
        assert_eq!(
            mounted.edge_at(Point::new(101.0, 53.0)).map(ElementId::as_str),
            Some("e2")
        );
    }

    #[test]
    fn test_edge_at_without_overlays_misses() {
        let mounted = MountedDiagram::mount(&sample());
        assert_eq!(mounted.edge_at(Point::new(30.0, 50.0)), None);
    }

    #[test]
    fn test_marked_elements_lists_classes() {
        let mut mounted = MountedDiagram::mount(&sample());
        let e2 = ElementId::new("e2");
        mounted.set_marker(&e2, Marker::Selected, true).unwrap();
        mounted.set_marker(&e2, Marker::InCycle, true).unwrap();

        let marked = mounted.marked_elements();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].classes, vec!["in-cycle", "selected"]);
    }
}
