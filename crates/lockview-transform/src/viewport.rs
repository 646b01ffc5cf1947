//! The surface a transform engine drives.
//!
//! A [`Viewport`] is one visual container with one piece of content inside
//! it. The engine reads sizes from it, writes the rendered transform to the
//! content, and routes pointer capture through it.
//!
//! [`HeadlessViewport`] keeps all of that in memory. It backs the tests, the
//! replay driver, and any host without a real rendering surface.

use crate::affine::AffineTransform;
use crate::input::PointerId;
use crate::projection::{Rect, Size};

/// A container/content pair that a transform engine renders into.
pub trait Viewport {
    /// The container's current bounding box in client coordinates.
    fn container_rect(&self) -> Rect;

    /// The content's natural size with no transform applied.
    fn content_size(&self) -> Size;

    /// Apply a transform to the content, or clear it with `None`.
    fn set_content_transform(&mut self, transform: Option<AffineTransform>);

    /// Put the content's transform origin at its geometric center.
    fn set_transform_origin_centered(&mut self);

    /// Route all further events from `pointer` to this container.
    fn set_pointer_capture(&mut self, pointer: PointerId);

    /// Stop routing events from `pointer` to this container.
    fn release_pointer_capture(&mut self, pointer: PointerId);

    /// Whether the platform delivers resize notifications for this container.
    ///
    /// When `false` the engine never recomputes its projection on its own;
    /// callers must invoke `TransformEngine::update_projection` themselves.
    fn observes_resize(&self) -> bool;
}

/// In-memory viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessViewport {
    container: Rect,
    content: Size,
    transform: Option<AffineTransform>,
    origin_centered: bool,
    captured: Option<PointerId>,
    observes_resize: bool,
}

impl HeadlessViewport {
    /// Create a viewport with the given container box and content size.
    ///
    /// Resize notifications are reported as available.
    #[must_use]
    pub const fn new(container: Rect, content: Size) -> Self {
        Self {
            container,
            content,
            transform: None,
            origin_centered: false,
            captured: None,
            observes_resize: true,
        }
    }

    /// Report resize notifications as unavailable.
    #[must_use]
    pub const fn without_resize_notifications(mut self) -> Self {
        self.observes_resize = false;
        self
    }

    /// Change the container's bounding box.
    pub fn resize(&mut self, container: Rect) {
        self.container = container;
    }

    /// The transform last applied to the content.
    #[must_use]
    pub const fn applied_transform(&self) -> Option<AffineTransform> {
        self.transform
    }

    /// Whether the transform origin was set to the content center.
    #[must_use]
    pub const fn origin_centered(&self) -> bool {
        self.origin_centered
    }

    /// The pointer currently captured by this container, if any.
    #[must_use]
    pub const fn captured_pointer(&self) -> Option<PointerId> {
        self.captured
    }
}

impl Viewport for HeadlessViewport {
    fn container_rect(&self) -> Rect {
        self.container
    }

    fn content_size(&self) -> Size {
        self.content
    }

    fn set_content_transform(&mut self, transform: Option<AffineTransform>) {
        self.transform = transform;
    }

    fn set_transform_origin_centered(&mut self) {
        self.origin_centered = true;
    }

    fn set_pointer_capture(&mut self, pointer: PointerId) {
        self.captured = Some(pointer);
    }

    fn release_pointer_capture(&mut self, pointer: PointerId) {
        if self.captured == Some(pointer) {
            self.captured = None;
        }
    }

    fn observes_resize(&self) -> bool {
        self.observes_resize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_only_matching_pointer() {
        let mut viewport =
            HeadlessViewport::new(Rect::new(0.0, 0.0, 10.0, 10.0), Size::new(5.0, 5.0));
        viewport.set_pointer_capture(PointerId(3));
        viewport.release_pointer_capture(PointerId(4));
        assert_eq!(viewport.captured_pointer(), Some(PointerId(3)));
        viewport.release_pointer_capture(PointerId(3));
        assert_eq!(viewport.captured_pointer(), None);
    }

    #[test]
    fn test_resize_capability_flag() {
        let viewport = HeadlessViewport::new(Rect::default(), Size::default());
        assert!(viewport.observes_resize());
        assert!(!viewport.without_resize_notifications().observes_resize());
    }
}
