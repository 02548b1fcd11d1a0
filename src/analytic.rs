//! Closed-form maps from the flat precursor onto cylinders and spheres.
//!
//! Both surfaces touch the precursor plane at the origin and curve towards
//! negative `z`. Lengths are preserved along the wrapping direction, so the
//! rotation of a point grows linearly with its distance from the contact line
//! (cylinder) or the contact point (sphere).

use nalgebra::{Matrix3, Vector3};
use uom::si::angle::radian;
use uom::si::f64::Angle;

use crate::geometry::{MappedPoint, Point2D};

/// Wrap a point onto a cylinder of `radius` whose axis is the global x axis.
///
/// The `v` coordinate is rolled onto the cylinder; `u` runs along the axis.
///
/// # Examples
/// ```
/// use bondmap::{map_cylinder_along_x, point2d};
///
/// let mapped = map_cylinder_along_x(point2d(1.5, 0.0), 2.0);
/// assert_eq!(mapped.position.x, 1.5);
/// assert_eq!(mapped.position.y, 0.0);
/// assert_eq!(mapped.rotation.norm(), 0.0);
/// ```
#[must_use]
pub fn map_cylinder_along_x(point: Point2D, radius: f64) -> MappedPoint {
    let angle = point.v / radius;
    let (s, c) = angle.sin_cos();
    MappedPoint::new(
        Vector3::new(point.u, radius * s, -radius * (1.0 - c)),
        Vector3::new(-angle, 0.0, 0.0),
    )
}

/// Wrap a point onto a cylinder whose axis makes `orientation` with the x
/// axis, positive counter-clockwise when viewed from above.
#[must_use]
pub fn map_cylinder(point: Point2D, radius: f64, orientation: Angle) -> MappedPoint {
    let to_global = rotation_about_z(orientation.get::<radian>());
    let local = to_global.transpose() * point.embed();
    let mapped = map_cylinder_along_x(Point2D::new(local.x, local.y), radius);
    MappedPoint::new(to_global * mapped.position, to_global * mapped.rotation)
}

/// Wrap a point onto a sphere of `radius` touching the plane at the origin.
///
/// The polar radius of the point becomes the arc length along a meridian and
/// the rotation axis is tangent to the corresponding parallel.
///
/// # Examples
/// ```
/// use bondmap::{map_sphere, point2d};
///
/// let mapped = map_sphere(point2d(0.0, 0.0), 5.0);
/// assert_eq!(mapped.position.norm(), 0.0);
/// assert_eq!(mapped.rotation.norm(), 0.0);
/// ```
#[must_use]
pub fn map_sphere(point: Point2D, radius: f64) -> MappedPoint {
    let rho = point.u.hypot(point.v);
    let phi = point.v.atan2(point.u);
    let (sin_phi, cos_phi) = phi.sin_cos();
    // Colatitude measured from the contact point.
    let theta = rho / radius;
    let (sin_theta, cos_theta) = theta.sin_cos();
    MappedPoint::new(
        radius * Vector3::new(sin_theta * cos_phi, sin_theta * sin_phi, -(1.0 - cos_theta)),
        theta * Vector3::new(-sin_phi, cos_phi, 0.0),
    )
}

/// Rotation by `angle` radians about the global z axis.
fn rotation_about_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;
    use uom::si::angle::degree;

    use super::*;
    use crate::geometry::point2d;
    use crate::rotation::{rotation_matrix, rotation_vector};

    fn degrees(value: f64) -> Angle {
        Angle::new::<degree>(value)
    }

    #[test]
    fn cylinder_axis_line_is_fixed() {
        for radius in [0.5, 2.0, 100.0] {
            for u in [-3.0, 0.0, 0.25, 7.5] {
                let mapped = map_cylinder_along_x(point2d(u, 0.0), radius);
                assert_eq!(mapped.position, Vector3::new(u, 0.0, 0.0));
                assert_eq!(mapped.rotation, Vector3::zeros());

                let oriented = map_cylinder(point2d(u, 0.0), radius, degrees(0.0));
                assert_eq!(oriented.position, Vector3::new(u, 0.0, 0.0));
                assert_eq!(oriented.rotation, Vector3::zeros());
            }
        }
    }

    #[test]
    fn oriented_cylinder_axis_line_is_fixed() {
        for orientation in [30.0, 90.0, -135.0] {
            let theta = degrees(orientation).get::<radian>();
            for t in [-2.0, 1.0, 4.0] {
                let point = point2d(t * theta.cos(), t * theta.sin());
                let mapped = map_cylinder(point, 2.0, degrees(orientation));
                assert_relative_eq!(mapped.position, point.embed(), epsilon = 1.0e-12);
                assert_relative_eq!(mapped.rotation, Vector3::zeros(), epsilon = 1.0e-12);
            }
        }
    }

    #[test]
    fn quarter_wrap_along_x() {
        let radius = 2.0;
        let mapped = map_cylinder_along_x(point2d(1.0, radius * FRAC_PI_2), radius);
        assert_relative_eq!(
            mapped.position,
            Vector3::new(1.0, radius, -radius),
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            mapped.rotation,
            Vector3::new(-FRAC_PI_2, 0.0, 0.0),
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn cylinder_rotation_tilts_normal_towards_axis() {
        // The surface normal at the mapped point is the rotated +z axis and
        // must point back to the cylinder axis at (u, 0, -r).
        let radius = 3.0;
        let mapped = map_cylinder_along_x(point2d(0.0, 1.2), radius);
        let normal = rotation_matrix(&mapped.rotation) * Vector3::z();
        let to_axis = (Vector3::new(0.0, 0.0, -radius) - mapped.position) / radius;
        assert_relative_eq!(normal, -to_axis, epsilon = 1.0e-12);
    }

    #[test]
    fn cylinder_oriented_along_y_wraps_x() {
        let radius = 2.0;
        let mapped = map_cylinder(point2d(-radius * FRAC_PI_2, 0.5), radius, degrees(90.0));
        assert_relative_eq!(
            mapped.position,
            Vector3::new(-radius, 0.5, -radius),
            epsilon = 1.0e-12
        );
        assert_relative_eq!(
            mapped.rotation,
            Vector3::new(0.0, -FRAC_PI_2, 0.0),
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn sphere_origin_is_fixed() {
        for radius in [0.1, 1.0, 50.0] {
            let mapped = map_sphere(point2d(0.0, 0.0), radius);
            assert_eq!(mapped.position, Vector3::zeros());
            assert_eq!(mapped.rotation, Vector3::zeros());
        }
    }

    #[test]
    fn sphere_point_lies_on_surface_with_matching_rotation() {
        let radius = 4.0;
        for point in [point2d(1.0, 0.0), point2d(-0.5, 2.0), point2d(0.3, -3.1)] {
            let mapped = map_sphere(point, radius);
            let center = Vector3::new(0.0, 0.0, -radius);
            assert_relative_eq!((mapped.position - center).norm(), radius, epsilon = 1.0e-12);

            let rho = point.u.hypot(point.v);
            assert_relative_eq!(mapped.rotation.norm(), rho / radius, epsilon = 1.0e-12);

            // The rotated +z axis is the outward surface normal.
            let normal = rotation_matrix(&mapped.rotation) * Vector3::z();
            assert_relative_eq!(normal, (mapped.position - center) / radius, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn hemisphere_edge_rotation_is_quarter_turn() {
        let radius = 1.0;
        let mapped = map_sphere(point2d(0.0, FRAC_PI_2), radius);
        assert_relative_eq!(
            mapped.position,
            Vector3::new(0.0, 1.0, -1.0),
            epsilon = 1.0e-12
        );
        let recovered = rotation_vector(&rotation_matrix(&mapped.rotation));
        assert_relative_eq!(recovered, Vector3::new(-FRAC_PI_2, 0.0, 0.0), epsilon = 1.0e-12);
        assert!(recovered.norm() < PI);
    }
}
