//! Container geometry and the resize-derived projection.
//!
//! Content is mapped into a unit view space where the container's short
//! dimension spans `[-1, 1]` and the long dimension keeps the container's
//! aspect ratio. The projection maps that view space onto centered container
//! pixels; its origin is the container center, which is also the content's
//! transform origin.

use crate::affine::{AffineTransform, Point};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A bounding box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rect.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A rect of the given size anchored at the origin.
    #[must_use]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// The rect's size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The rect's center in client coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }

    /// Translate a client point into coordinates centered on this rect.
    #[must_use]
    pub fn to_centered(&self, client: Point) -> Point {
        client.minus(self.center())
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are strictly smaller than `other`'s.
    #[must_use]
    pub fn fits_within(&self, other: &Self) -> bool {
        self.width < other.width && self.height < other.height
    }

    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// The projection for one container size, with its cached inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    forward: AffineTransform,
    inverse: AffineTransform,
}

impl Projection {
    /// Compute the projection for a container of the given size.
    ///
    /// # Errors
    ///
    /// Returns `Error::DegenerateContainer` if the container has zero or
    /// non-finite width or height; such a projection has no inverse.
    pub fn for_size(size: Size) -> Result<Self> {
        if !size.has_area() {
            return Err(Error::DegenerateContainer {
                width: size.width,
                height: size.height,
            });
        }
        let scale = (size.width / 2.0).min(size.height / 2.0);
        let forward = AffineTransform::scale(scale);
        let inverse = forward.inverse()?;
        Ok(Self { forward, inverse })
    }

    /// View space to centered container pixels.
    #[must_use]
    pub const fn forward(&self) -> &AffineTransform {
        &self.forward
    }

    /// Centered container pixels to view space.
    #[must_use]
    pub const fn inverse(&self) -> &AffineTransform {
        &self.inverse
    }

    /// The view-space extent of a container of `size`.
    ///
    /// Reverse-projects the container's centered top-left corner and returns
    /// its distance from the origin on each axis. One axis is exactly 1; the
    /// other is at least 1 to preserve the aspect ratio.
    #[must_use]
    pub fn view_bounds(&self, size: Size) -> Point {
        let top_left = self
            .inverse
            .apply(Point::new(-size.width / 2.0, -size.height / 2.0));
        Point::new(-top_left.x, -top_left.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_short_axis_spans_unit_interval() {
        let projection = Projection::for_size(Size::new(800.0, 600.0)).unwrap();
        assert_eq!(*projection.forward(), AffineTransform::scale(300.0));

        let bounds = projection.view_bounds(Size::new(800.0, 600.0));
        assert!((bounds.y - 1.0).abs() < 1e-12);
        assert!((bounds.x - 800.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn test_tall_container_uses_width() {
        let projection = Projection::for_size(Size::new(200.0, 1000.0)).unwrap();
        let bounds = projection.view_bounds(Size::new(200.0, 1000.0));
        assert!((bounds.x - 1.0).abs() < 1e-12);
        assert!((bounds.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_is_cached_inverse() {
        let projection = Projection::for_size(Size::new(640.0, 480.0)).unwrap();
        let round_trip = projection.forward().compose(projection.inverse());
        assert!(round_trip.approx_eq(&AffineTransform::IDENTITY, 1e-12));
    }

    #[rstest]
    #[case::zero_width(Size::new(0.0, 480.0))]
    #[case::zero_height(Size::new(640.0, 0.0))]
    #[case::negative(Size::new(-10.0, 480.0))]
    #[case::nan(Size::new(f64::NAN, 480.0))]
    #[case::infinite(Size::new(f64::INFINITY, 480.0))]
    fn test_degenerate_container_rejected(#[case] size: Size) {
        assert!(matches!(
            Projection::for_size(size),
            Err(Error::DegenerateContainer { .. })
        ));
    }

    #[test]
    fn test_rect_to_centered() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), Point::new(60.0, 45.0));
        assert_eq!(rect.to_centered(Point::new(10.0, 20.0)), Point::new(-50.0, -25.0));
    }

    #[rstest]
    #[case(Size::new(10.0, 10.0), Size::new(20.0, 20.0), true)]
    #[case(Size::new(20.0, 10.0), Size::new(20.0, 20.0), false)]
    #[case(Size::new(10.0, 30.0), Size::new(20.0, 20.0), false)]
    fn test_fits_within_is_strict(#[case] inner: Size, #[case] outer: Size, #[case] fits: bool) {
        assert_eq!(inner.fits_within(&outer), fits);
    }
}
