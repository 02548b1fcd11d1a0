//! Bonding-region descriptor files.
//!
//! Each meaningful line names one bonding region of the precursor:
//!
//! ```text
//! # comment
//! CIRCLE xc yc r [ROTATABLE]
//! RECT x1 y1 x2 y2 [ROTATABLE]
//! ```
//!
//! Tags and the marker are case-insensitive. Only the region centers are
//! needed for mapping; the extents are kept for the boundary-condition stage
//! that selects the bonded nodes.

use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::{InputError, ParseError, ParseErrorKind};
use crate::geometry::Point2D;

/// Marker that frees the in-plane rotation of a bonding region.
const ROTATABLE_MARKER: &str = "ROTATABLE";

/// Shape of a bonding region on the precursor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BondingShape {
    /// Circular region.
    Circle {
        /// Center of the circle.
        center: Point2D,
        /// Radius of the circle.
        radius: f64,
    },
    /// Axis-aligned rectangular region with `corner1 <= corner2` componentwise.
    Rect {
        /// Lower-left corner.
        corner1: Point2D,
        /// Upper-right corner.
        corner2: Point2D,
    },
}

/// One parsed line of a bonding descriptor file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BondingRegion {
    /// Geometry of the region.
    pub shape: BondingShape,
    /// Whether the region may rotate about the surface normal.
    pub rotatable: bool,
    /// 1-based line number the region was read from.
    pub line: usize,
}

impl BondingRegion {
    /// Center of the region: the circle center or the rectangle midpoint.
    ///
    /// # Examples
    /// ```
    /// use bondmap::{parse_bonding_regions, point2d};
    ///
    /// let regions = parse_bonding_regions("RECT 0 0 2 4\n", "bonding.txt").unwrap();
    /// assert_eq!(regions[0].center(), point2d(1.0, 2.0));
    /// ```
    #[must_use]
    pub fn center(&self) -> Point2D {
        match self.shape {
            BondingShape::Circle { center, .. } => center,
            BondingShape::Rect { corner1, corner2 } => Point2D::new(
                0.5 * (corner1.u + corner2.u),
                0.5 * (corner1.v + corner2.v),
            ),
        }
    }
}

/// Centers of `regions`, in order.
#[must_use]
pub fn bonding_centers(regions: &[BondingRegion]) -> Vec<Point2D> {
    regions.iter().map(BondingRegion::center).collect()
}

/// Parse the content of a bonding descriptor file.
///
/// `source_name` only labels errors.
///
/// # Errors
///
/// Returns [`ParseError`] for the first line with an unknown tag, a wrong
/// number of fields, a field that is not a finite number, an unexpected
/// trailing marker or a negative circle radius.
///
/// # Examples
/// ```
/// use bondmap::{parse_bonding_regions, point2d};
///
/// let text = "# demo\nCIRCLE 1.0 2.0 0.5\nrect 4 4 2 2 rotatable\n";
/// let regions = parse_bonding_regions(text, "bonding.txt").unwrap();
/// assert_eq!(regions.len(), 2);
/// assert_eq!(regions[0].center(), point2d(1.0, 2.0));
/// assert!(regions[1].rotatable);
/// ```
pub fn parse_bonding_regions(
    text: &str,
    source_name: &str,
) -> Result<Vec<BondingRegion>, ParseError> {
    let mut regions = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let fields: Vec<&str> = raw.split_whitespace().collect();
        let Some(tag) = fields.first() else {
            continue;
        };
        if tag.starts_with('#') {
            continue;
        }
        let error = |kind| ParseError {
            source_name: source_name.to_owned(),
            line,
            text: raw.to_owned(),
            kind,
        };
        let region = parse_region(tag, &fields[1..], line).map_err(error)?;
        regions.push(region);
    }
    debug!("parsed {} bonding regions from {source_name}", regions.len());
    Ok(regions)
}

/// Read and parse a bonding descriptor file.
///
/// # Errors
///
/// Returns [`InputError::Io`] when the file cannot be read and
/// [`InputError::Parse`] when a line is malformed.
pub fn load_bonding_regions(path: &Path) -> Result<Vec<BondingRegion>, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_bonding_regions(&text, &path.display().to_string())?)
}

/// Interpret the fields following `tag`.
fn parse_region(tag: &str, args: &[&str], line: usize) -> Result<BondingRegion, ParseErrorKind> {
    let (name, expected) = if tag.eq_ignore_ascii_case("CIRCLE") {
        ("CIRCLE", 3)
    } else if tag.eq_ignore_ascii_case("RECT") {
        ("RECT", 4)
    } else {
        return Err(ParseErrorKind::UnknownTag(tag.to_owned()));
    };

    let rotatable = match args.len() {
        n if n == expected => false,
        n if n == expected + 1 => {
            let marker = args[expected];
            if !marker.eq_ignore_ascii_case(ROTATABLE_MARKER) {
                return Err(ParseErrorKind::UnknownMarker(marker.to_owned()));
            }
            true
        }
        found => {
            return Err(ParseErrorKind::FieldCount {
                tag: name,
                expected,
                found,
            })
        }
    };

    let values = args[..expected]
        .iter()
        .map(|field| parse_number(field))
        .collect::<Result<Vec<_>, _>>()?;

    let shape = if name == "CIRCLE" {
        let radius = values[2];
        if radius < 0.0 {
            return Err(ParseErrorKind::NegativeRadius(radius));
        }
        BondingShape::Circle {
            center: Point2D::new(values[0], values[1]),
            radius,
        }
    } else {
        let (x1, y1, x2, y2) = (values[0], values[1], values[2], values[3]);
        BondingShape::Rect {
            corner1: Point2D::new(x1.min(x2), y1.min(y2)),
            corner2: Point2D::new(x1.max(x2), y1.max(y2)),
        }
    };

    Ok(BondingRegion {
        shape,
        rotatable,
        line,
    })
}

/// Parse a finite floating point field.
pub(crate) fn parse_number(field: &str) -> Result<f64, ParseErrorKind> {
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseErrorKind::InvalidNumber(field.to_owned()))
}
