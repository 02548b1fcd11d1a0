//! Uniform in-plane shrinkage applied before mapping.
//!
//! The structural assembly stage shrinks the precursor about a center before
//! the bonding points are carried onto the target surface. Both stages must
//! use the same [`Shrinkage`]; keep it in the shared configuration rather than
//! duplicating the numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConsistencyError;
use crate::geometry::Point2D;

/// Tolerance used when comparing two sets of shrinkage parameters.
const CONSISTENCY_TOLERANCE: f64 = 1.0e-12;

/// Radial scaling `p' = p - fraction * (p - center)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Shrinkage {
    /// Fixed point of the scaling.
    pub center: Point2D,
    /// Fraction of the distance to the center removed from every point.
    pub fraction: f64,
}

impl Shrinkage {
    /// Create a [`Shrinkage`] about `center`.
    #[must_use]
    pub const fn new(center: Point2D, fraction: f64) -> Self {
        Self { center, fraction }
    }

    /// Shrinkage that leaves every point in place.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Point2D::new(0.0, 0.0), 0.0)
    }

    /// Return `true` when the parameters describe a usable scaling.
    ///
    /// A fraction of one or more would collapse or invert the precursor.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.fraction.is_finite() && self.fraction < 1.0
    }

    /// Apply the scaling to a single point.
    ///
    /// # Examples
    /// ```
    /// use bondmap::{point2d, Shrinkage};
    ///
    /// let shrinkage = Shrinkage::new(point2d(0.0, 0.0), 0.3);
    /// let shrunk = shrinkage.apply(point2d(1.0, 0.0));
    /// assert!((shrunk.u - 0.7).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn apply(&self, point: Point2D) -> Point2D {
        let (du, dv) = self.displacement(point);
        Point2D::new(point.u + du, point.v + dv)
    }

    /// Apply the scaling to every point, preserving order.
    #[must_use]
    pub fn apply_all(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.iter().map(|&point| self.apply(point)).collect()
    }

    /// In-plane displacement `-fraction * (p - center)` that the assembly
    /// stage prescribes for a bonding region at `point`.
    #[must_use]
    pub fn displacement(&self, point: Point2D) -> (f64, f64) {
        (
            -self.fraction * (point.u - self.center.u),
            -self.fraction * (point.v - self.center.v),
        )
    }

    /// Compare against the parameters recorded for the assembly stage.
    ///
    /// # Errors
    ///
    /// Returns [`ConsistencyError`] when the center or fraction differ.
    pub fn check_consistency(&self, assembly: &Self) -> Result<(), ConsistencyError> {
        let close = |a: f64, b: f64| (a - b).abs() <= CONSISTENCY_TOLERANCE;
        if close(self.center.u, assembly.center.u)
            && close(self.center.v, assembly.center.v)
            && close(self.fraction, assembly.fraction)
        {
            Ok(())
        } else {
            Err(ConsistencyError {
                mapping: *self,
                assembly: *assembly,
            })
        }
    }
}

impl Default for Shrinkage {
    fn default() -> Self {
        Self::new(Point2D::new(0.0, 0.0), 0.3)
    }
}

impl fmt::Display for Shrinkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "center ({}, {}), fraction {}",
            self.center.u, self.center.v, self.fraction
        )
    }
}
