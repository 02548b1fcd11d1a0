//! Conversion between rotation matrices and rotation vectors (axis-angle).
//!
//! See <https://en.wikipedia.org/wiki/Rotation_matrix#Conversion_from_rotation_matrix_to_axis%E2%80%93angle>.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, Vector3};
use ndarray::{Array2, ArrayView3};

use crate::errors::DomainError;

/// Convert a rotation matrix to a rotation vector.
///
/// The direction of the result is the rotation axis and its norm is the
/// rotation angle in `[0, π]`. When the skew-symmetric part of `q` vanishes
/// (angle `0` or `π`) the axis is recovered from the row norms of `Q + I`,
/// scaled by `(1 - cos θ) π / 4`. That single expression yields the exact
/// zero vector for the identity and an angle of `π` for half-turns. For
/// half-turns the recovered axis components are non-negative.
///
/// # Examples
/// ```
/// use bondmap::rotation_vector;
/// use nalgebra::{Matrix3, Vector3};
///
/// assert_eq!(rotation_vector(&Matrix3::identity()), Vector3::zeros());
///
/// let half_turn_x = Matrix3::new(1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0);
/// let rotvec = rotation_vector(&half_turn_x);
/// assert!((rotvec.x - std::f64::consts::PI).abs() < 1.0e-12);
/// ```
#[must_use]
pub fn rotation_vector(q: &Matrix3<f64>) -> Vector3<f64> {
    let skew = (q - q.transpose()) / 2.0;
    let numerator = Vector3::new(skew[(2, 1)], skew[(0, 2)], skew[(1, 0)]);
    let sin_t = numerator.norm();
    let cos_t = (q.trace() - 1.0) / 2.0;
    if sin_t == 0.0 {
        // Symmetric q: angle is 0 or pi.
        let shifted = q + Matrix3::identity();
        let row_norms = Vector3::new(
            shifted.row(0).norm(),
            shifted.row(1).norm(),
            shifted.row(2).norm(),
        );
        return row_norms * ((1.0 - cos_t) * PI / 4.0);
    }
    let axis = numerator / sin_t;
    axis * sin_t.atan2(cos_t)
}

/// Convert a batch of rotation matrices, preserving order.
#[must_use]
pub fn rotation_vectors(matrices: &[Matrix3<f64>]) -> Vec<Vector3<f64>> {
    matrices.iter().map(rotation_vector).collect()
}

/// Convert an `N×3×3` array of rotation matrices into an `N×3` array of
/// rotation vectors.
///
/// # Errors
///
/// Returns [`DomainError::ArrayShape`] when the trailing dimensions are not `3×3`.
pub fn rotation_vectors_array(matrices: ArrayView3<'_, f64>) -> Result<Array2<f64>, DomainError> {
    let shape = matrices.shape();
    if shape[1] != 3 || shape[2] != 3 {
        return Err(DomainError::ArrayShape {
            expected: "N×3×3",
            found: shape.to_vec(),
        });
    }
    let count = shape[0];
    let mut rotvecs = Array2::zeros((count, 3));
    for idx in 0..count {
        let q = Matrix3::from_fn(|row, col| matrices[[idx, row, col]]);
        let rotvec = rotation_vector(&q);
        for axis in 0..3 {
            rotvecs[[idx, axis]] = rotvec[axis];
        }
    }
    Ok(rotvecs)
}

/// Build the rotation matrix described by a rotation vector (Rodrigues' formula).
#[must_use]
pub fn rotation_matrix(rotvec: &Vector3<f64>) -> Matrix3<f64> {
    Rotation3::from_scaled_axis(*rotvec).into_inner()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array3;

    use super::*;

    fn half_turn(axis: usize) -> Matrix3<f64> {
        let mut q = -Matrix3::identity();
        q[(axis, axis)] = 1.0;
        q
    }

    #[test]
    fn identity_gives_exact_zero() {
        let rotvec = rotation_vector(&Matrix3::identity());
        assert_eq!(rotvec, Vector3::zeros());
    }

    #[test]
    fn half_turns_about_coordinate_axes() {
        for axis in 0..3 {
            let rotvec = rotation_vector(&half_turn(axis));
            assert_relative_eq!(rotvec.norm(), PI, epsilon = 1.0e-12);
            for component in 0..3 {
                let expected = if component == axis { PI } else { 0.0 };
                assert_relative_eq!(rotvec[component].abs(), expected, epsilon = 1.0e-12);
            }
            assert_relative_eq!(
                rotation_matrix(&rotvec),
                half_turn(axis),
                epsilon = 1.0e-12
            );
        }
    }

    #[test]
    fn generic_rotation_roundtrips() {
        let rotvecs = [
            Vector3::new(0.3, -0.2, 0.5),
            Vector3::new(-1.2, 0.4, 0.9),
            Vector3::new(0.0, 0.0, 2.5),
            Vector3::new(1.0e-4, 0.0, 0.0),
        ];
        for rotvec in rotvecs {
            let q = rotation_matrix(&rotvec);
            let recovered = rotation_vector(&q);
            assert_relative_eq!(recovered, rotvec, epsilon = 1.0e-10);
            assert_relative_eq!(rotation_matrix(&recovered), q, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn frame_rotation_about_z() {
        let angle = 0.75_f64;
        let q = Matrix3::new(
            angle.cos(),
            -angle.sin(),
            0.0,
            angle.sin(),
            angle.cos(),
            0.0,
            0.0,
            0.0,
            1.0,
        );
        let rotvec = rotation_vector(&q);
        assert_relative_eq!(rotvec, Vector3::new(0.0, 0.0, angle), epsilon = 1.0e-12);
    }

    #[test]
    fn batch_conversion_matches_single() {
        let matrices = vec![
            Matrix3::identity(),
            half_turn(1),
            rotation_matrix(&Vector3::new(0.1, 0.2, 0.3)),
        ];
        let single: Vec<_> = matrices.iter().map(rotation_vector).collect();
        assert_eq!(rotation_vectors(&matrices), single);

        let mut stacked = Array3::zeros((matrices.len(), 3, 3));
        for (idx, q) in matrices.iter().enumerate() {
            for row in 0..3 {
                for col in 0..3 {
                    stacked[[idx, row, col]] = q[(row, col)];
                }
            }
        }
        let array = rotation_vectors_array(stacked.view()).expect("valid shape");
        for (idx, rotvec) in single.iter().enumerate() {
            for axis in 0..3 {
                assert_eq!(array[[idx, axis]], rotvec[axis]);
            }
        }
    }

    #[test]
    fn batch_rejects_wrong_shape() {
        let stacked = Array3::<f64>::zeros((2, 3, 2));
        let error = rotation_vectors_array(stacked.view()).expect_err("bad shape rejected");
        assert_eq!(
            error,
            DomainError::ArrayShape {
                expected: "N×3×3",
                found: vec![2, 3, 2],
            }
        );
    }
}
