//! Axis-aligned affine transforms.
//!
//! A transform is represented by four numbers, standing for the matrix
//!
//! ```text
//! sx  0 tx
//!  0 sy ty
//!  0  0  1
//! ```
//!
//! There is no rotation or skew term. Every pan, zoom and fit edit in the
//! engine is expressed as a composition of these matrices.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point (or, for [`AffineTransform::apply_linear`], a direction) in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn minus(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sum `self + other`.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Independent per-axis scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Horizontal scale.
    pub sx: f64,
    /// Vertical scale.
    pub sy: f64,
    /// Horizontal translation.
    pub tx: f64,
    /// Vertical translation.
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Create a transform from its four components.
    #[must_use]
    pub const fn new(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self { sx, sy, tx, ty }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 1.0, dx, dy)
    }

    /// A uniform scale about the origin.
    #[must_use]
    pub const fn scale(factor: f64) -> Self {
        Self::new(factor, factor, 0.0, 0.0)
    }

    /// A uniform scale about `anchor`, which stays fixed.
    ///
    /// Moves the anchor to the origin, scales, then moves it back.
    #[must_use]
    pub fn scale_about(factor: f64, anchor: Point) -> Self {
        Self::translate(anchor.x, anchor.y)
            .compose(&Self::scale(factor))
            .compose(&Self::translate(-anchor.x, -anchor.y))
    }

    /// Compose two transforms: the result applies `inner` first, then `self`.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        Self {
            sx: self.sx * inner.sx,
            sy: self.sy * inner.sy,
            tx: self.sx * inner.tx + self.tx,
            ty: self.sy * inner.ty + self.ty,
        }
    }

    /// Map a point through the transform.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.sx * p.x + self.tx, self.sy * p.y + self.ty)
    }

    /// Map a delta vector through the linear part only.
    ///
    /// Deltas are directions, not positions, so the translation must not
    /// be added to them.
    #[must_use]
    pub fn apply_linear(&self, v: Point) -> Point {
        Point::new(self.sx * v.x, self.sy * v.y)
    }

    /// Invert the transform.
    ///
    /// # Errors
    ///
    /// Returns `Error::SingularTransform` if either scale is zero or
    /// the transform has non-finite components.
    pub fn inverse(&self) -> Result<Self> {
        if !self.is_finite() || self.sx == 0.0 || self.sy == 0.0 {
            return Err(Error::SingularTransform {
                sx: self.sx,
                sy: self.sy,
            });
        }
        Ok(Self {
            sx: 1.0 / self.sx,
            sy: 1.0 / self.sy,
            tx: -self.tx / self.sx,
            ty: -self.ty / self.sy,
        })
    }

    /// Whether every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.sx.is_finite() && self.sy.is_finite() && self.tx.is_finite() && self.ty.is_finite()
    }

    /// Component-wise comparison within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.sx - other.sx).abs() <= tolerance
            && (self.sy - other.sy).abs() <= tolerance
            && (self.tx - other.tx).abs() <= tolerance
            && (self.ty - other.ty).abs() <= tolerance
    }

    /// Render as a CSS `matrix()` transform function.
    #[must_use]
    pub fn to_css_matrix(&self) -> String {
        format!("matrix({},0,0,{},{},{})", self.sx, self.sy, self.tx, self.ty)
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_matrix())
    }
}
