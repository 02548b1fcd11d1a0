//! Writer for the bonding displacement file read by the CAE macro stage.

use std::io::{self, Write};

use nalgebra::Vector3;

use crate::geometry::{MappedPoint, Point2D};

/// Documentation header written at the top of every displacement file.
pub const BONDING_DISP_HEADER: &str = "# Bonding regions displacement data file
#
# This file specifies the displacement and rotation for each bonding region
# listed in `bonding.txt`, following the same order as in that file.
#
# Each line corresponds to a bonding region and contains:
#
#   {U1} {U2} {U3} {UR1} {UR2} {UR3}
#
#   where (U1, U2, U3) are the displacement components, and (UR1, UR2, UR3) are
#   the rotational displacement components (in radians).

";

/// Width of every numeric column.
const COLUMN_WIDTH: usize = 13;

/// One row of the displacement file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BondingDisplacement {
    /// Displacement `(U1, U2, U3)` from the precursor location.
    pub translation: Vector3<f64>,
    /// Rotational displacement `(UR1, UR2, UR3)` in radians.
    pub rotation: Vector3<f64>,
}

impl BondingDisplacement {
    /// Displacement of a bonding center from its location on the flat
    /// precursor to its mapped location.
    ///
    /// `original` is the center before pre-shrinking, so the translation
    /// includes the in-plane shrink.
    #[must_use]
    pub fn from_mapping(original: Point2D, mapped: &MappedPoint) -> Self {
        Self {
            translation: mapped.position - original.embed(),
            rotation: mapped.rotation,
        }
    }
}

/// Format a value like C's `%13.6e`.
///
/// # Examples
/// ```
/// use bondmap::format_scientific;
///
/// assert_eq!(format_scientific(1.5), " 1.500000e+00");
/// assert_eq!(format_scientific(-0.000125), "-1.250000e-04");
/// ```
#[must_use]
pub fn format_scientific(value: f64) -> String {
    if !value.is_finite() {
        let text = if value.is_nan() {
            "nan"
        } else if value > 0.0 {
            "inf"
        } else {
            "-inf"
        };
        return format!("{text:>width$}", width = COLUMN_WIDTH);
    }
    let rust = format!("{value:.6e}");
    let (mantissa, exponent) = rust.split_once('e').unwrap_or((rust.as_str(), "0"));
    // Rust prints exponents without sign padding, e.g. `1.5e-3`.
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let text = format!("{mantissa}e{sign}{:02}", exponent.abs());
    format!("{text:>width$}", width = COLUMN_WIDTH)
}

/// Format one displacement row without its line terminator.
#[must_use]
pub fn format_row(row: &BondingDisplacement) -> String {
    row.translation
        .iter()
        .chain(row.rotation.iter())
        .map(|&value| format_scientific(value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write the header followed by one line per row.
///
/// # Errors
///
/// Propagates any I/O error from `writer`.
pub fn write_displacements<W: Write>(mut writer: W, rows: &[BondingDisplacement]) -> io::Result<()> {
    writer.write_all(BONDING_DISP_HEADER.as_bytes())?;
    for row in rows {
        writeln!(writer, "{}", format_row(row))?;
    }
    writer.flush()
}
