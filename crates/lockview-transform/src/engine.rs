//! The transform engine: pan, zoom and fit-to-view for one viewport.
//!
//! # Coordinate spaces
//!
//! - **Client/page**: raw event coordinates.
//! - **Centered container**: client coordinates relative to the container
//!   center. The content's transform origin sits here.
//! - **View space**: centered container coordinates through the inverse
//!   [`Projection`]; the container's short axis spans `[-1, 1]`.
//!
//! The content is rendered with `projection ∘ view`, where `view` is the
//! engine's [`AffineTransform`] (its view state). Initially `view` is the
//! inverse projection, so the content renders 1:1 and centered. Every edit
//! composes a new matrix on the left of the current view state.
//!
//! # Degenerate containers
//!
//! A container with no area has no invertible projection. While that holds
//! the engine keeps `projection` at `None`: pointer and wheel input is
//! ignored, [`TransformEngine::fit_to_view`] returns
//! `Error::DegenerateContainer`, and nothing is rendered. The first
//! successful projection update initializes the view state if it was never
//! set. Non-finite transforms never reach the viewport.

use crate::affine::{AffineTransform, Point};
use crate::error::{Error, Result};
use crate::input::{InputHandler, PointerEvent, PointerId, WheelEvent};
use crate::projection::Projection;
use crate::viewport::Viewport;
use tracing::{debug, warn};

/// How the engine reacts to container resize notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeStrategy {
    /// Resize notifications recompute the projection.
    Observe,
    /// The platform has no resize notifications; the engine ignores
    /// `on_resize` and callers use [`TransformEngine::update_projection`].
    Manual,
}

/// An in-progress pointer drag.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    pointer: PointerId,
    last: Point,
    captured: bool,
}

/// Maintains the view state for one viewport and turns input into edits.
#[derive(Debug)]
pub struct TransformEngine<V: Viewport> {
    viewport: V,
    projection: Option<Projection>,
    view: Option<AffineTransform>,
    drag: Option<DragSession>,
    resize: ResizeStrategy,
}

impl<V: Viewport> TransformEngine<V> {
    /// Attach an engine to `viewport` and render the content 1:1, centered.
    ///
    /// A degenerate container is logged and leaves the engine idle until a
    /// later projection update succeeds.
    pub fn new(viewport: V) -> Self {
        let resize = if viewport.observes_resize() {
            ResizeStrategy::Observe
        } else {
            ResizeStrategy::Manual
        };
        let mut engine = Self {
            viewport,
            projection: None,
            view: None,
            drag: None,
            resize,
        };
        engine.viewport.set_transform_origin_centered();
        // A degenerate container is already logged by update_projection.
        let _ = engine.update_projection();
        engine
    }

    /// Recompute the projection from the container's current size, then
    /// reapply the unchanged view state.
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateContainer` if the container has no area. The
    /// engine then ignores input until a later update succeeds.
    pub fn update_projection(&mut self) -> Result<()> {
        let rect = self.viewport.container_rect();
        match Projection::for_size(rect.size()) {
            Ok(projection) => {
                self.projection = Some(projection);
                let view = self.view.unwrap_or(*projection.inverse());
                self.set_view(view);
                Ok(())
            }
            Err(err) => {
                warn!(
                    width = rect.width,
                    height = rect.height,
                    "Container has no usable area; transform engine idle"
                );
                self.projection = None;
                Err(err)
            }
        }
    }

    /// Pan by a screen-space delta.
    ///
    /// The delta is mapped into view space through the linear part of the
    /// inverse projection and composed on the left of the view state.
    pub fn pan_by(&mut self, screen_delta: Point) {
        let (Some(projection), Some(view)) = (self.projection, self.view) else {
            debug!("Ignoring pan without a projection");
            return;
        };
        let delta = projection.inverse().apply_linear(screen_delta);
        self.set_view(AffineTransform::translate(delta.x, delta.y).compose(&view));
    }

    /// Zoom by `factor` about the content point under `client`.
    ///
    /// Non-finite or non-positive factors are ignored.
    pub fn zoom_at(&mut self, factor: f64, client: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            debug!(factor, "Ignoring unusable zoom factor");
            return;
        }
        let (Some(projection), Some(view)) = (self.projection, self.view) else {
            debug!("Ignoring zoom without a projection");
            return;
        };
        let centered = self.viewport.container_rect().to_centered(client);
        let anchor = projection.inverse().apply(centered);
        self.set_view(AffineTransform::scale_about(factor, anchor).compose(&view));
    }

    /// Scale the content to fit the container, or show it 1:1 if it fits.
    ///
    /// Measures the content with its transform cleared. Content smaller than
    /// the container on both axes is shown 1:1 and centered. Larger content
    /// is uniformly scaled to fit the view-space bounds of the container,
    /// centered with no pan offset. Calling this twice in a row gives the
    /// same view state both times.
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateContainer` if the engine has no projection,
    /// or `Error::SingularTransform` if the content size yields no finite
    /// scale. The previous view state is kept in both cases.
    pub fn fit_to_view(&mut self) -> Result<AffineTransform> {
        let container = self.viewport.container_rect().size();
        let Some(projection) = self.projection else {
            return Err(Error::DegenerateContainer {
                width: container.width,
                height: container.height,
            });
        };

        self.viewport.set_content_transform(None);
        let content = self.viewport.content_size();

        let view = if content.fits_within(&container) {
            *projection.inverse()
        } else {
            let bounds = projection.view_bounds(container);
            let scale = 2.0 * (bounds.x / content.width).min(bounds.y / content.height);
            AffineTransform::scale(scale)
        };

        if !view.is_finite() || view.sx <= 0.0 {
            self.render();
            return Err(Error::SingularTransform {
                sx: view.sx,
                sy: view.sy,
            });
        }

        debug!(
            content_width = content.width,
            content_height = content.height,
            scale = view.sx,
            "Fit content to view"
        );
        self.set_view(view);
        Ok(view)
    }

    /// Map a client point to content coordinates (origin at the content's
    /// top-left corner, in the content's natural units).
    ///
    /// Assumes the untransformed content is centered in the container, which
    /// is where the initial view state renders it. Returns `None` while the
    /// engine has no invertible rendered transform.
    #[must_use]
    pub fn client_to_content(&self, client: Point) -> Option<Point> {
        let inverse = self.rendered_transform()?.inverse().ok()?;
        let centered = self.viewport.container_rect().to_centered(client);
        let content = self.viewport.content_size();
        let local = inverse.apply(centered);
        Some(local.plus(Point::new(content.width / 2.0, content.height / 2.0)))
    }

    /// The current view state, if initialized.
    #[must_use]
    pub const fn transform(&self) -> Option<AffineTransform> {
        self.view
    }

    /// The current projection, if the container has area.
    #[must_use]
    pub const fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// The transform applied to the content: `projection ∘ view`.
    #[must_use]
    pub fn rendered_transform(&self) -> Option<AffineTransform> {
        let projection = self.projection.as_ref()?;
        let view = self.view.as_ref()?;
        Some(projection.forward().compose(view))
    }

    /// How this engine reacts to resize notifications.
    #[must_use]
    pub const fn resize_strategy(&self) -> ResizeStrategy {
        self.resize
    }

    /// Whether a drag session is tracking a pointer.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The underlying viewport.
    #[must_use]
    pub const fn viewport(&self) -> &V {
        &self.viewport
    }

    /// Mutable access to the underlying viewport, e.g. to resize it.
    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    fn set_view(&mut self, view: AffineTransform) {
        self.view = Some(view);
        self.render();
    }

    fn render(&mut self) {
        if let Some(rendered) = self.rendered_transform() {
            if rendered.is_finite() {
                self.viewport.set_content_transform(Some(rendered));
            } else {
                warn!(%rendered, "Refusing to render a non-finite transform");
            }
        }
    }

    fn end_drag(&mut self, pointer: PointerId) {
        if let Some(session) = self.drag.take_if(|session| session.pointer == pointer) {
            self.viewport.release_pointer_capture(session.pointer);
        }
    }
}

impl<V: Viewport> InputHandler for TransformEngine<V> {
    fn on_pointer_down(&mut self, event: &PointerEvent) {
        if let Some(previous) = self.drag.take() {
            self.viewport.release_pointer_capture(previous.pointer);
        }
        // Capture waits for the first move so a plain click still reaches
        // handlers below the container.
        self.drag = Some(DragSession {
            pointer: event.pointer_id,
            last: event.page,
            captured: false,
        });
    }

    fn on_pointer_move(&mut self, event: &PointerEvent) {
        let Some(session) = self.drag else {
            return;
        };
        if session.pointer != event.pointer_id {
            return;
        }
        if !event.buttons.any() {
            self.end_drag(event.pointer_id);
            return;
        }

        let delta = event.page.minus(session.last);
        self.drag = Some(DragSession {
            last: event.page,
            captured: true,
            ..session
        });
        self.pan_by(delta);
        if !session.captured {
            self.viewport.set_pointer_capture(event.pointer_id);
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent) {
        self.end_drag(event.pointer_id);
    }

    fn on_wheel(&mut self, event: &WheelEvent) {
        self.zoom_at(event.zoom_factor(), event.client);
    }

    fn on_resize(&mut self) {
        match self.resize {
            ResizeStrategy::Observe => {
                // Failure is logged and leaves the engine idle.
                let _ = self.update_projection();
            }
            ResizeStrategy::Manual => {
                debug!("Ignoring resize notification; projection is updated manually");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Buttons, DeltaMode};
    use crate::projection::{Rect, Size};
    use crate::viewport::HeadlessViewport;

    const EPS: f64 = 1e-9;

    fn engine(container: (f64, f64), content: (f64, f64)) -> TransformEngine<HeadlessViewport> {
        TransformEngine::new(HeadlessViewport::new(
            Rect::new(0.0, 0.0, container.0, container.1),
            Size::new(content.0, content.1),
        ))
    }

    #[test]
    fn test_new_renders_identity() {
        let engine = engine((800.0, 600.0), (100.0, 100.0));

        assert!(engine.viewport().origin_centered());
        let rendered = engine.viewport().applied_transform().unwrap();
        assert!(rendered.approx_eq(&AffineTransform::IDENTITY, EPS));
        assert!(engine
            .transform()
            .unwrap()
            .approx_eq(&AffineTransform::scale(1.0 / 300.0), EPS));
    }

    #[test]
    fn test_pointer_down_does_not_capture() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.on_pointer_down(&PointerEvent::primary(Point::new(10.0, 10.0)));

        assert!(engine.is_dragging());
        assert_eq!(engine.viewport().captured_pointer(), None);
    }

    #[test]
    fn test_drag_pans_and_captures() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.on_pointer_down(&PointerEvent::primary(Point::new(10.0, 10.0)));
        engine.on_pointer_move(&PointerEvent::primary(Point::new(40.0, -20.0)));

        assert_eq!(engine.viewport().captured_pointer(), Some(PointerId(1)));
        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.tx - 30.0).abs() < EPS);
        assert!((rendered.ty + 30.0).abs() < EPS);

        // Deltas accumulate from the last position, not the drag origin.
        engine.on_pointer_move(&PointerEvent::primary(Point::new(50.0, -20.0)));
        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.tx - 40.0).abs() < EPS);
    }

    #[test]
    fn test_move_without_buttons_ends_drag() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.on_pointer_down(&PointerEvent::primary(Point::new(0.0, 0.0)));
        engine.on_pointer_move(&PointerEvent::primary(Point::new(5.0, 5.0)));
        engine.on_pointer_move(&PointerEvent::released(Point::new(50.0, 50.0)));

        assert!(!engine.is_dragging());
        assert_eq!(engine.viewport().captured_pointer(), None);
        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.tx - 5.0).abs() < EPS);
    }

    #[test]
    fn test_pointer_up_releases_capture() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.on_pointer_down(&PointerEvent::primary(Point::new(0.0, 0.0)));
        engine.on_pointer_move(&PointerEvent::primary(Point::new(5.0, 5.0)));
        engine.on_pointer_up(&PointerEvent::released(Point::new(5.0, 5.0)));

        assert!(!engine.is_dragging());
        assert_eq!(engine.viewport().captured_pointer(), None);

        // Moves after the drag ended do nothing.
        let before = engine.transform();
        engine.on_pointer_move(&PointerEvent::primary(Point::new(100.0, 100.0)));
        assert_eq!(engine.transform(), before);
    }

    #[test]
    fn test_moves_from_other_pointers_are_ignored() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.on_pointer_down(&PointerEvent::primary(Point::new(0.0, 0.0)));
        let before = engine.transform();
        engine.on_pointer_move(&PointerEvent {
            pointer_id: PointerId(9),
            page: Point::new(30.0, 30.0),
            buttons: Buttons::PRIMARY,
        });
        assert_eq!(engine.transform(), before);
        assert!(engine.is_dragging());
    }

    #[test]
    fn test_wheel_zooms_about_pointer() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        let client = Point::new(600.0, 100.0);
        let before = engine.client_to_content(client).unwrap();

        engine.on_wheel(&WheelEvent {
            client,
            delta_y: -500.0,
            delta_mode: DeltaMode::Pixel,
        });

        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.sx - 2.0).abs() < EPS);
        let after = engine.client_to_content(client).unwrap();
        assert!((before.x - after.x).abs() < EPS);
        assert!((before.y - after.y).abs() < EPS);
    }

    #[test]
    fn test_fit_small_content_is_one_to_one() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.pan_by(Point::new(50.0, 50.0));
        let view = engine.fit_to_view().unwrap();

        assert!(view.approx_eq(engine.projection().unwrap().inverse(), EPS));
        assert!(engine
            .rendered_transform()
            .unwrap()
            .approx_eq(&AffineTransform::IDENTITY, EPS));
    }

    #[test]
    fn test_fit_large_content_scales_to_container() {
        let mut engine = engine((800.0, 600.0), (1600.0, 300.0));
        engine.fit_to_view().unwrap();

        // Width is the binding axis: 1600 wide content into 800 pixels.
        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.sx - 0.5).abs() < EPS);
        assert!((rendered.sy - 0.5).abs() < EPS);
        assert!(rendered.tx.abs() < EPS && rendered.ty.abs() < EPS);
    }

    #[test]
    fn test_fit_content_equal_to_container_scales() {
        // Not strictly smaller, so the scaling branch runs and yields 1:1.
        let mut engine = engine((800.0, 600.0), (800.0, 600.0));
        engine.fit_to_view().unwrap();
        let rendered = engine.rendered_transform().unwrap();
        assert!((rendered.sx - 1.0).abs() < EPS);
    }

    #[test]
    fn test_resize_keeps_view_state() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        engine.pan_by(Point::new(30.0, 0.0));
        let view = engine.transform().unwrap();

        engine.viewport_mut().resize(Rect::new(0.0, 0.0, 400.0, 300.0));
        engine.on_resize();

        assert_eq!(engine.transform().unwrap(), view);
        let rendered = engine.viewport().applied_transform().unwrap();
        // Projection halved, so the pan offset halves on screen.
        assert!((rendered.tx - 15.0).abs() < EPS);
        assert!((rendered.sx - 0.5).abs() < EPS);
    }

    #[test]
    fn test_manual_strategy_ignores_resize_notifications() {
        let mut engine = TransformEngine::new(
            HeadlessViewport::new(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(10.0, 10.0))
                .without_resize_notifications(),
        );
        assert_eq!(engine.resize_strategy(), ResizeStrategy::Manual);

        engine.viewport_mut().resize(Rect::new(0.0, 0.0, 400.0, 300.0));
        engine.on_resize();
        assert!((engine.projection().unwrap().forward().sx - 300.0).abs() < EPS);

        engine.update_projection().unwrap();
        assert!((engine.projection().unwrap().forward().sx - 150.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_container_is_idle_until_resized() {
        let mut engine = engine((0.0, 600.0), (100.0, 100.0));

        assert!(engine.projection().is_none());
        assert!(engine.transform().is_none());
        assert!(engine.viewport().applied_transform().is_none());

        engine.on_pointer_down(&PointerEvent::primary(Point::new(0.0, 0.0)));
        engine.on_pointer_move(&PointerEvent::primary(Point::new(10.0, 10.0)));
        engine.on_wheel(&WheelEvent {
            client: Point::ORIGIN,
            delta_y: -100.0,
            delta_mode: DeltaMode::Pixel,
        });
        assert!(engine.transform().is_none());
        assert!(matches!(
            engine.fit_to_view(),
            Err(Error::DegenerateContainer { .. })
        ));
        assert!(engine.viewport().applied_transform().is_none());

        engine.viewport_mut().resize(Rect::new(0.0, 0.0, 200.0, 100.0));
        engine.on_resize();
        assert!(engine
            .rendered_transform()
            .unwrap()
            .approx_eq(&AffineTransform::IDENTITY, EPS));
    }

    #[test]
    fn test_unusable_zoom_factor_ignored() {
        let mut engine = engine((800.0, 600.0), (100.0, 100.0));
        let before = engine.transform();
        engine.zoom_at(0.0, Point::ORIGIN);
        engine.zoom_at(f64::NAN, Point::ORIGIN);
        engine.zoom_at(f64::INFINITY, Point::ORIGIN);
        assert_eq!(engine.transform(), before);
    }
}
