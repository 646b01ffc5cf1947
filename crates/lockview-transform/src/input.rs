//! Input events delivered to a transform engine.
//!
//! Hosts translate their native pointer, wheel and resize notifications into
//! these types and dispatch them through [`InputHandler`]. Nothing here
//! depends on a live input surface, so handlers can be driven directly from
//! tests or recorded scripts.

use crate::affine::Point;
use serde::{Deserialize, Serialize};

/// Identifies one pointer (mouse, pen or touch contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// Bitmask of pointer buttons currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buttons(pub u16);

impl Buttons {
    /// No buttons held.
    pub const NONE: Self = Self(0);
    /// The primary (usually left) button.
    pub const PRIMARY: Self = Self(1);
    /// The secondary (usually right) button.
    pub const SECONDARY: Self = Self(2);
    /// The auxiliary (usually middle) button.
    pub const AUXILIARY: Self = Self(4);

    /// Whether any button is held.
    #[must_use]
    pub const fn any(self) -> bool {
        self.0 != 0
    }
}

/// A pointer-down, pointer-move or pointer-up event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// The pointer that produced the event.
    pub pointer_id: PointerId,
    /// Position in page coordinates.
    pub page: Point,
    /// Buttons held while the event fired.
    pub buttons: Buttons,
}

impl PointerEvent {
    /// A primary-button event at `page` for the default pointer.
    #[must_use]
    pub const fn primary(page: Point) -> Self {
        Self {
            pointer_id: PointerId(1),
            page,
            buttons: Buttons::PRIMARY,
        }
    }

    /// A button-less event at `page` for the default pointer.
    #[must_use]
    pub const fn released(page: Point) -> Self {
        Self {
            pointer_id: PointerId(1),
            page,
            buttons: Buttons::NONE,
        }
    }
}

/// The unit a wheel delta is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeltaMode {
    /// Pixels.
    #[default]
    Pixel,
    /// Lines of text.
    Line,
    /// Pages.
    Page,
}

impl DeltaMode {
    /// The delta at which a wheel event zooms by exactly a factor of 2.
    #[must_use]
    pub const fn reference_distance(self) -> f64 {
        match self {
            Self::Pixel => 500.0,
            Self::Line => 30.0,
            Self::Page => 0.5,
        }
    }
}

/// A wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Position in client coordinates.
    pub client: Point,
    /// Vertical delta; positive scrolls down (zooms out).
    pub delta_y: f64,
    /// Unit of `delta_y`.
    #[serde(default)]
    pub delta_mode: DeltaMode,
}

impl WheelEvent {
    /// The zoom factor this event requests: `2^(-delta_y / reference)`.
    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        (-self.delta_y / self.delta_mode.reference_distance()).exp2()
    }
}

/// Handler signatures for each input event kind.
pub trait InputHandler {
    /// A pointer button went down over the container.
    fn on_pointer_down(&mut self, event: &PointerEvent);

    /// A pointer moved over (or, while captured, outside) the container.
    fn on_pointer_move(&mut self, event: &PointerEvent);

    /// A pointer button was released.
    fn on_pointer_up(&mut self, event: &PointerEvent);

    /// The wheel turned over the container.
    fn on_wheel(&mut self, event: &WheelEvent);

    /// The container was resized.
    fn on_resize(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::pixel(DeltaMode::Pixel, -500.0, 2.0)]
    #[case::pixel_out(DeltaMode::Pixel, 500.0, 0.5)]
    #[case::line(DeltaMode::Line, -30.0, 2.0)]
    #[case::line_double(DeltaMode::Line, -60.0, 4.0)]
    #[case::page(DeltaMode::Page, 0.5, 0.5)]
    #[case::zero(DeltaMode::Pixel, 0.0, 1.0)]
    fn test_zoom_factor(#[case] mode: DeltaMode, #[case] delta_y: f64, #[case] expected: f64) {
        let event = WheelEvent {
            client: Point::ORIGIN,
            delta_y,
            delta_mode: mode,
        };
        assert!((event.zoom_factor() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_buttons_any() {
        assert!(!Buttons::NONE.any());
        assert!(Buttons::PRIMARY.any());
        assert!(Buttons(Buttons::PRIMARY.0 | Buttons::AUXILIARY.0).any());
    }

    #[test]
    fn test_delta_mode_deserializes_kebab_case() {
        let event: WheelEvent =
            serde_json::from_str(r#"{"client":{"x":1.0,"y":2.0},"delta_y":-3.0,"delta_mode":"line"}"#)
                .unwrap();
        assert_eq!(event.delta_mode, DeltaMode::Line);

        let event: WheelEvent =
            serde_json::from_str(r#"{"client":{"x":1.0,"y":2.0},"delta_y":-3.0}"#).unwrap();
        assert_eq!(event.delta_mode, DeltaMode::Pixel);
    }
}
