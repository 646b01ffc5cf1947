//! Containers that diagrams are mounted into.

use crate::domain::Diagram;
use lockview_transform::{HeadlessViewport, Rect, Size, Viewport};
use tracing::debug;

/// A visual container that can show one diagram at a time.
pub trait Container {
    /// The viewport a mounted diagram is rendered through.
    type Viewport: Viewport;

    /// Replace the container's content with `diagram`.
    fn mount(&mut self, diagram: &Diagram) -> Self::Viewport;

    /// Remove the container's content.
    fn clear(&mut self);
}

/// An in-memory container.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessContainer {
    rect: Rect,
    observe_resize: bool,
    content: Option<Size>,
    mounts: usize,
}

impl HeadlessContainer {
    /// A container with bounding box `rect` that reports resize
    /// notifications.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self {
            rect,
            observe_resize: true,
            content: None,
            mounts: 0,
        }
    }

    /// Report resize notifications as unavailable to mounted viewports.
    #[must_use]
    pub const fn without_resize_notifications(mut self) -> Self {
        self.observe_resize = false;
        self
    }

    /// The container's bounding box.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Change the bounding box used for later mounts.
    pub fn resize(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Natural size of the mounted content, if any.
    #[must_use]
    pub const fn content(&self) -> Option<Size> {
        self.content
    }

    /// How many diagrams have been mounted so far.
    #[must_use]
    pub const fn mount_count(&self) -> usize {
        self.mounts
    }
}

impl Container for HeadlessContainer {
    type Viewport = HeadlessViewport;

    fn mount(&mut self, diagram: &Diagram) -> HeadlessViewport {
        self.content = Some(diagram.size());
        self.mounts += 1;
        debug!(width = diagram.width, height = diagram.height, "Mounted content");
        let viewport = HeadlessViewport::new(self.rect, diagram.size());
        if self.observe_resize {
            viewport
        } else {
            viewport.without_resize_notifications()
        }
    }

    fn clear(&mut self) {
        self.content = None;
    }
}
