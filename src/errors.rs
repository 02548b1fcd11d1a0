//! Error types produced while loading, mapping and writing bonding data.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shrink::Shrinkage;

/// Reason a line of an input file was rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseErrorKind {
    /// Returned when the leading tag is neither `CIRCLE` nor `RECT`.
    #[error("unknown bonding type `{0}`")]
    UnknownTag(String),
    /// Returned when a bonding line carries the wrong number of fields.
    #[error("{tag} expects {expected} numeric fields (found {found})")]
    FieldCount {
        /// Normalized tag of the offending line.
        tag: &'static str,
        /// Number of numeric fields the tag requires.
        expected: usize,
        /// Number of fields present after the tag.
        found: usize,
    },
    /// Returned when a field is not a finite number.
    #[error("`{0}` is not a finite number")]
    InvalidNumber(String),
    /// Returned when the trailing token is not the `ROTATABLE` marker.
    #[error("unexpected marker `{0}` (only ROTATABLE is accepted)")]
    UnknownMarker(String),
    /// Returned when a circular region has a negative radius.
    #[error("radius must not be negative (received {0})")]
    NegativeRadius(f64),
    /// Returned when a deformation-field row does not have `u v x y z` columns.
    #[error("expected {expected} columns (found {found})")]
    ColumnCount {
        /// Number of columns a row requires.
        expected: usize,
        /// Number of columns present.
        found: usize,
    },
}

/// Error returned when a descriptor or data file contains a malformed line.
///
/// # Examples
///
/// ```
/// use bondmap::{parse_bonding_regions, ParseErrorKind};
///
/// let error = parse_bonding_regions("TRIANGLE 1 2 3\n", "bonding.txt")
///     .expect_err("unknown tags are fatal");
/// assert_eq!(error.line, 1);
/// assert_eq!(error.kind, ParseErrorKind::UnknownTag("TRIANGLE".to_owned()));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{source_name}:{line}: {kind}: `{text}`")]
pub struct ParseError {
    /// Name of the file (or other source) the line came from.
    pub source_name: String,
    /// 1-based line number.
    pub line: usize,
    /// Raw text of the offending line without its line terminator.
    pub text: String,
    /// What was wrong with the line.
    pub kind: ParseErrorKind,
}

/// Error returned when a mapping is evaluated outside its valid domain.
///
/// Point numbers are 1-based so they match the bonding labels used by the
/// boundary-condition consumer.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    /// Returned when a query point lies outside the convex hull of the samples.
    #[error("point #{} at ({u}, {v}) lies outside the sampled deformation field", .index + 1)]
    OutsideConvexHull {
        /// 0-based index of the query point.
        index: usize,
        /// First coordinate of the query point.
        u: f64,
        /// Second coordinate of the query point.
        v: f64,
    },
    /// Returned when a mapped position or rotation is not finite.
    #[error("mapping of point #{} produced a non-finite result", .index + 1)]
    NonFinite {
        /// 0-based index of the offending point.
        index: usize,
    },
    /// Returned when a surface tangent vanishes or cannot be evaluated.
    #[error("surface tangents at point #{} are degenerate", .index + 1)]
    DegenerateJacobian {
        /// 0-based index of the offending point.
        index: usize,
    },
    /// Returned when the samples do not span a single triangle.
    #[error("deformation field needs at least three non-collinear samples (received {count})")]
    InsufficientSamples {
        /// Number of samples supplied.
        count: usize,
    },
    /// Returned when an array argument has the wrong shape.
    #[error("expected an array of shape {expected} (received {found:?})")]
    ArrayShape {
        /// Human-readable description of the accepted shape.
        expected: &'static str,
        /// Shape that was supplied.
        found: Vec<usize>,
    },
}

/// Advisory error raised when the mapping stage and the structural assembly
/// stage disagree about the pre-shrink parameters.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
#[error("pre-shrink used for mapping ({mapping}) differs from the assembly stage ({assembly})")]
pub struct ConsistencyError {
    /// Parameters applied before mapping.
    pub mapping: Shrinkage,
    /// Parameters recorded for the structural assembly stage.
    pub assembly: Shrinkage,
}

/// Error returned when the run configuration cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("failed to read configuration `{}`: {source}", .path.display())]
    Io {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Returned when the configuration is not valid JSON for this schema.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Returned when the shrinkage fraction or center is unusable.
    #[error("shrinkage must be finite with a fraction below 1 (received {0})")]
    InvalidShrinkage(Shrinkage),
    /// Returned when a surface radius is not finite and positive.
    #[error("radius must be finite and positive (received {0})")]
    InvalidRadius(f64),
    /// Returned when the cylinder orientation is not finite.
    #[error("orientation must be finite (received {0})")]
    InvalidOrientation(f64),
}

/// Error returned when an input file cannot be loaded.
#[derive(Debug, Error)]
pub enum InputError {
    /// Returned when the file cannot be read.
    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Returned when the file content is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Error returned by the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Returned when the configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Returned when an input file cannot be loaded.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Returned when a point cannot be mapped.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Returned in strict mode when the pre-shrink parameters diverge.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
    /// Returned when the output file cannot be written.
    #[error("failed to write `{}`: {source}", .path.display())]
    Output {
        /// Location of the output file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

