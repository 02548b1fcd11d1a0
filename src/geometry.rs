//! Fundamental geometric types for bonding-point mapping.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Position on the flat precursor, in the units of the bonding file.
///
/// Serializes as a two-element array `[u, v]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    /// Coordinate along the precursor's first axis.
    pub u: f64,
    /// Coordinate along the precursor's second axis.
    pub v: f64,
}

impl Point2D {
    /// Create a [`Point2D`] with explicit coordinates.
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.u, self.v)
    }

    /// Embed the point in the `z = 0` plane.
    #[must_use]
    pub fn embed(self) -> Vector3<f64> {
        Vector3::new(self.u, self.v, 0.0)
    }

    /// Return `true` when both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point2D> for Vector2<f64> {
    fn from(value: Point2D) -> Self {
        value.to_vector()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([u, v]: [f64; 2]) -> Self {
        Self::new(u, v)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(value: Point2D) -> Self {
        [value.u, value.v]
    }
}

/// Location and orientation of a precursor point after mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedPoint {
    /// Position on the target surface.
    pub position: Vector3<f64>,
    /// Rotation vector in radians: direction is the axis, norm is the angle.
    pub rotation: Vector3<f64>,
}

impl MappedPoint {
    /// Create a [`MappedPoint`] from a position and a rotation vector.
    #[must_use]
    pub const fn new(position: Vector3<f64>, rotation: Vector3<f64>) -> Self {
        Self { position, rotation }
    }

    /// Return `true` when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.rotation.iter()).all(|c| c.is_finite())
    }
}

/// Convenience helper for creating [`Point2D`] instances.
///
/// # Examples
/// ```
/// use bondmap::point2d;
///
/// let center = point2d(1.0, 2.0);
/// assert_eq!(center.v, 2.0);
/// ```
#[must_use]
pub const fn point2d(u: f64, v: f64) -> Point2D {
    Point2D::new(u, v)
}
