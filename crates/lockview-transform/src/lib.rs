//! Axis-aligned affine view transforms for pan/zoom viewers.
//!
//! This crate owns the view-transform engine used by lockview: a 2D affine
//! transform per (container, content) pair, driven purely by pointer and
//! wheel input, with anchored zoom and fit-to-view.
//!
//! # Example
//!
//! ```
//! use lockview_transform::{
//!     DeltaMode, HeadlessViewport, InputHandler, Point, Rect, Size, TransformEngine, WheelEvent,
//! };
//!
//! let viewport = HeadlessViewport::new(
//!     Rect::new(0.0, 0.0, 800.0, 600.0),
//!     Size::new(2400.0, 900.0),
//! );
//! let mut engine = TransformEngine::new(viewport);
//! engine.fit_to_view().unwrap();
//!
//! // Zoom in 2x about the container center.
//! engine.on_wheel(&WheelEvent {
//!     client: Point::new(400.0, 300.0),
//!     delta_y: -500.0,
//!     delta_mode: DeltaMode::Pixel,
//! });
//! assert!(engine.rendered_transform().is_some());
//! ```

#![forbid(unsafe_code)]

pub mod affine;
pub mod engine;
pub mod error;
pub mod input;
pub mod projection;
pub mod viewport;

pub use affine::{AffineTransform, Point};
pub use engine::{ResizeStrategy, TransformEngine};
pub use error::{Error, Result};
pub use input::{Buttons, DeltaMode, InputHandler, PointerEvent, PointerId, WheelEvent};
pub use projection::{Projection, Rect, Size};
pub use viewport::{HeadlessViewport, Viewport};
