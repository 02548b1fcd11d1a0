//! Surface mapping strategies and the batch mapping entry points.

use log::debug;
use ndarray::{Array2, ArrayView2};
use uom::si::angle::degree;
use uom::si::f64::Angle;

use crate::analytic::{map_cylinder, map_sphere};
use crate::errors::DomainError;
use crate::field::{map_discrete, DeformationField};
use crate::geometry::{MappedPoint, Point2D};
use crate::interpolate::CloughTocher2d;

/// Target surface onto which precursor points are carried.
#[derive(Clone, Debug)]
pub enum MappingStrategy {
    /// Cylinder touching the precursor plane along a line through the origin.
    Cylinder {
        /// Cylinder radius.
        radius: f64,
        /// Angle between the cylinder axis and the x axis, counter-clockwise
        /// when viewed from above.
        orientation: Angle,
    },
    /// Sphere touching the precursor plane at the origin.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
    /// Surface described by an interpolated deformation field.
    DiscreteField(CloughTocher2d),
}

impl MappingStrategy {
    /// Cylinder strategy with the orientation given in degrees.
    #[must_use]
    pub fn cylinder(radius: f64, orientation_deg: f64) -> Self {
        Self::Cylinder {
            radius,
            orientation: Angle::new::<degree>(orientation_deg),
        }
    }

    /// Sphere strategy.
    #[must_use]
    pub const fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Interpolated strategy built from a sampled deformation field.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InsufficientSamples`] when the samples do not
    /// span a triangle.
    pub fn discrete_field(field: &DeformationField) -> Result<Self, DomainError> {
        Ok(Self::DiscreteField(field.interpolant()?))
    }

    /// Short name of the strategy for reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cylinder { .. } => "cylinder",
            Self::Sphere { .. } => "sphere",
            Self::DiscreteField(_) => "discrete field",
        }
    }

    /// Map a single point with 0-based `index`, validating the result.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] when the point is outside the strategy's domain
    /// or the result is not finite.
    pub fn map_point(&self, index: usize, point: Point2D) -> Result<MappedPoint, DomainError> {
        let mapped = match self {
            Self::Cylinder {
                radius,
                orientation,
            } => map_cylinder(point, *radius, *orientation),
            Self::Sphere { radius } => map_sphere(point, *radius),
            Self::DiscreteField(field) => map_discrete(field, index, point)?,
        };
        if mapped.is_finite() {
            Ok(mapped)
        } else {
            Err(DomainError::NonFinite { index })
        }
    }
}

/// Map every point onto the surface selected by `strategy`, preserving order.
///
/// # Errors
///
/// Returns the [`DomainError`] of the first point that cannot be mapped; no
/// partial result is produced.
///
/// # Examples
/// ```
/// use bondmap::{map, point2d, MappingStrategy};
///
/// let points = [point2d(0.0, 0.0), point2d(0.7, 0.0)];
/// let mapped = map(&points, &MappingStrategy::cylinder(2.0, 0.0)).unwrap();
/// assert_eq!(mapped[1].position.x, 0.7);
/// assert_eq!(mapped[1].rotation.norm(), 0.0);
/// ```
pub fn map(points: &[Point2D], strategy: &MappingStrategy) -> Result<Vec<MappedPoint>, DomainError> {
    debug!("mapping {} points onto a {}", points.len(), strategy.name());
    points
        .iter()
        .enumerate()
        .map(|(index, &point)| strategy.map_point(index, point))
        .collect()
}

/// Array form of [`map`]: `N×2` precursor coordinates in, `N×3` positions and
/// `N×3` rotation vectors out.
///
/// # Errors
///
/// Returns [`DomainError::ArrayShape`] when `points` does not have two
/// columns and the first mapping failure otherwise.
pub fn map_array(
    points: ArrayView2<'_, f64>,
    strategy: &MappingStrategy,
) -> Result<(Array2<f64>, Array2<f64>), DomainError> {
    if points.ncols() != 2 {
        return Err(DomainError::ArrayShape {
            expected: "N×2",
            found: points.shape().to_vec(),
        });
    }
    let input: Vec<Point2D> = points
        .outer_iter()
        .map(|row| Point2D::new(row[0], row[1]))
        .collect();
    let mapped = map(&input, strategy)?;

    let mut positions = Array2::zeros((mapped.len(), 3));
    let mut rotations = Array2::zeros((mapped.len(), 3));
    for (idx, point) in mapped.iter().enumerate() {
        for axis in 0..3 {
            positions[[idx, axis]] = point.position[axis];
            rotations[[idx, axis]] = point.rotation[axis];
        }
    }
    Ok((positions, rotations))
}
