//! Discretely sampled deformation fields.
//!
//! A field file lists correspondences between the undeformed precursor and a
//! deformed 3D surface, typically exported from a previous simulation:
//!
//! ```text
//! # u v x y z
//! 0.0 0.0 0.0 0.0 0.0
//! 1.0 0.0 0.98 0.0 -0.2
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::{Matrix3, Vector2, Vector3};

use crate::bonding::parse_number;
use crate::errors::{DomainError, InputError, ParseError, ParseErrorKind};
use crate::geometry::{MappedPoint, Point2D};
use crate::interpolate::CloughTocher2d;
use crate::rotation::rotation_vector;

/// Number of columns in a field row: `u v x y z`.
const FIELD_COLUMNS: usize = 5;
/// Smallest tangent stretch accepted when building a local frame.
const MIN_STRETCH: f64 = 1.0e-8;

/// One correspondence between the precursor and the deformed surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSample {
    /// Location on the undeformed precursor.
    pub undeformed: Point2D,
    /// Location of the same material point on the deformed surface.
    pub deformed: Vector3<f64>,
}

/// Unordered collection of [`FieldSample`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeformationField {
    /// Samples in file order.
    samples: Vec<FieldSample>,
}

impl DeformationField {
    /// Create a field from samples.
    #[must_use]
    pub fn new(samples: Vec<FieldSample>) -> Self {
        Self { samples }
    }

    /// Samples of the field.
    #[must_use]
    pub fn samples(&self) -> &[FieldSample] {
        &self.samples
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Return `true` when the field holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Parse whitespace-separated `u v x y z` rows.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for a row without exactly five columns or with
    /// a column that is not a finite number.
    pub fn parse(text: &str, source_name: &str) -> Result<Self, ParseError> {
        let mut samples = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let error = |kind| ParseError {
                source_name: source_name.to_owned(),
                line: idx + 1,
                text: raw.to_owned(),
                kind,
            };
            let columns: Vec<&str> = trimmed.split_whitespace().collect();
            if columns.len() != FIELD_COLUMNS {
                return Err(error(ParseErrorKind::ColumnCount {
                    expected: FIELD_COLUMNS,
                    found: columns.len(),
                }));
            }
            let values = columns
                .iter()
                .map(|column| parse_number(column))
                .collect::<Result<Vec<_>, _>>()
                .map_err(error)?;
            samples.push(FieldSample {
                undeformed: Point2D::new(values[0], values[1]),
                deformed: Vector3::new(values[2], values[3], values[4]),
            });
        }
        debug!("parsed {} field samples from {source_name}", samples.len());
        Ok(Self { samples })
    }

    /// Read and parse a field file.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Io`] when the file cannot be read and
    /// [`InputError::Parse`] when a row is malformed.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text, &path.display().to_string())?)
    }

    /// Build the Clough–Tocher interpolant of the deformed positions.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InsufficientSamples`] when the undeformed
    /// locations do not span a triangle.
    pub fn interpolant(&self) -> Result<CloughTocher2d, DomainError> {
        let points = self
            .samples
            .iter()
            .map(|sample| sample.undeformed.to_vector())
            .collect();
        let values = self.samples.iter().map(|sample| sample.deformed).collect();
        CloughTocher2d::new(points, values)
    }
}

/// Map the point with 0-based `index` through an interpolated deformation.
///
/// The local frame has the normalized `u` and `v` tangents as its first two
/// columns and their cross product as the third; its rotation vector is the
/// point's rotation.
///
/// # Errors
///
/// Returns [`DomainError::OutsideConvexHull`] when `point` is outside the
/// sampled region and [`DomainError::DegenerateJacobian`] when a tangent
/// vanishes.
pub fn map_discrete(
    field: &CloughTocher2d,
    index: usize,
    point: Point2D,
) -> Result<MappedPoint, DomainError> {
    let query: Vector2<f64> = point.to_vector();
    let outside = || DomainError::OutsideConvexHull {
        index,
        u: point.u,
        v: point.v,
    };
    let position = field.evaluate(query).ok_or_else(outside)?;
    let jacobian = field.jacobian(query).ok_or_else(outside)?;

    let tangent_u = jacobian.column(0).into_owned();
    let tangent_v = jacobian.column(1).into_owned();
    let (norm_u, norm_v) = (tangent_u.norm(), tangent_v.norm());
    if !(norm_u > MIN_STRETCH && norm_v > MIN_STRETCH && norm_u.is_finite() && norm_v.is_finite()) {
        return Err(DomainError::DegenerateJacobian { index });
    }
    let n1 = tangent_u / norm_u;
    let n2 = tangent_v / norm_v;
    let n3 = n1.cross(&n2);
    let frame = Matrix3::from_columns(&[n1, n2, n3]);
    Ok(MappedPoint::new(position, rotation_vector(&frame)))
}
