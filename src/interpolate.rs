//! Piecewise cubic, C1-smooth interpolation of scattered 2D samples.
//!
//! The samples are Delaunay-triangulated and every triangle is split at its
//! centroid into three cubic Bézier patches (the Clough–Tocher element). Vertex
//! gradients are not part of the input; they are estimated by minimizing the
//! curvature of the interpolant along the triangulation edges
//! (G. Nielson, "A method for interpolating scattered data based upon a
//! minimum norm network", Math. Comp. 40, 1983).

use delaunator::{next_halfedge, triangulate, Point, EMPTY};
use log::{debug, warn};
use nalgebra::{Matrix2, Matrix3x2, Vector2, Vector3};

use crate::errors::DomainError;

/// Slack allowed on barycentric coordinates when locating a point.
const BARYCENTRIC_EPS: f64 = 100.0 * f64::EPSILON;
/// Upper bound on gradient-estimation sweeps.
const GRADIENT_MAX_ITERATIONS: usize = 400;
/// Convergence tolerance of the gradient estimation.
const GRADIENT_TOLERANCE: f64 = 1.0e-6;
/// Finite-difference step relative to the extent of the samples.
const RELATIVE_STEP: f64 = 1.0e-6;

/// Triangle of the Delaunay triangulation.
#[derive(Clone, Debug)]
struct Triangle {
    /// Indices of the corner samples.
    vertices: [usize; 3],
    /// Inverse of `[p0 - p2, p1 - p2]`; `None` for a zero-area triangle.
    inverse: Option<Matrix2<f64>>,
    /// Cross-boundary derivative factors for the edges opposite each vertex.
    edge_factors: [f64; 3],
}

/// Clough–Tocher interpolant of a vector field sampled at scattered points.
#[derive(Clone, Debug)]
pub struct CloughTocher2d {
    /// Sample locations.
    points: Vec<Vector2<f64>>,
    /// Sample values.
    values: Vec<Vector3<f64>>,
    /// Estimated derivative of each value component (rows) along u and v (columns).
    gradients: Vec<Matrix3x2<f64>>,
    /// Triangulation of `points`.
    triangles: Vec<Triangle>,
    /// Finite-difference step used by [`CloughTocher2d::jacobian`].
    step: f64,
}

impl CloughTocher2d {
    /// Build the interpolant through `values` sampled at `points`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InsufficientSamples`] when fewer than three
    /// samples are supplied, when the inputs differ in length or when the
    /// samples are collinear.
    ///
    /// # Examples
    /// ```
    /// use bondmap::CloughTocher2d;
    /// use nalgebra::{Vector2, Vector3};
    ///
    /// let points = vec![
    ///     Vector2::new(0.0, 0.0),
    ///     Vector2::new(1.0, 0.0),
    ///     Vector2::new(0.0, 1.0),
    ///     Vector2::new(1.0, 1.0),
    /// ];
    /// let values = points.iter().map(|p| Vector3::new(p.x, p.y, 0.5)).collect();
    /// let field = CloughTocher2d::new(points, values).unwrap();
    /// let value = field.evaluate(Vector2::new(0.25, 0.5)).unwrap();
    /// assert!((value - Vector3::new(0.25, 0.5, 0.5)).norm() < 1.0e-4);
    /// assert!(field.evaluate(Vector2::new(2.0, 0.0)).is_none());
    /// ```
    pub fn new(points: Vec<Vector2<f64>>, values: Vec<Vector3<f64>>) -> Result<Self, DomainError> {
        let count = points.len();
        if count < 3 || values.len() != count {
            return Err(DomainError::InsufficientSamples { count });
        }

        let delaunay_points: Vec<Point> = points.iter().map(|p| Point { x: p.x, y: p.y }).collect();
        let triangulation = triangulate(&delaunay_points);
        if triangulation.triangles.is_empty() {
            return Err(DomainError::InsufficientSamples { count });
        }

        let mut triangles: Vec<Triangle> = triangulation
            .triangles
            .chunks_exact(3)
            .map(|corners| {
                let vertices = [corners[0], corners[1], corners[2]];
                let p2 = points[vertices[2]];
                let inverse = Matrix2::from_columns(&[points[vertices[0]] - p2, points[vertices[1]] - p2])
                    .try_inverse();
                Triangle {
                    vertices,
                    inverse,
                    edge_factors: [-0.5; 3],
                }
            })
            .collect();

        // Halfedge 3t + j runs from corner j to corner j + 1, opposite corner j + 2.
        for (edge, &twin) in triangulation.halfedges.iter().enumerate() {
            if twin == EMPTY {
                continue;
            }
            let (tri, opposite) = (edge / 3, (edge % 3 + 2) % 3);
            let neighbor = &triangles[twin / 3];
            let centroid = neighbor
                .vertices
                .iter()
                .fold(Vector2::zeros(), |acc, &v| acc + points[v])
                / 3.0;
            if let Some(c) = barycentric(&triangles[tri], &points, centroid) {
                triangles[tri].edge_factors[opposite] = edge_factor(opposite, c);
            }
        }

        let mut adjacency = vec![Vec::new(); count];
        for (edge, &twin) in triangulation.halfedges.iter().enumerate() {
            if twin == EMPTY || edge < twin {
                let a = triangulation.triangles[edge];
                let b = triangulation.triangles[next_halfedge(edge)];
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }

        let mut gradients = vec![Matrix3x2::zeros(); count];
        for component in 0..3 {
            let samples: Vec<f64> = values.iter().map(|value| value[component]).collect();
            let estimate = estimate_gradients(&points, &adjacency, &samples);
            for (gradient, row) in gradients.iter_mut().zip(estimate) {
                gradient[(component, 0)] = row.x;
                gradient[(component, 1)] = row.y;
            }
        }

        let (min, max) = points.iter().fold(
            (points[0], points[0]),
            |(lo, hi), p| (lo.inf(p), hi.sup(p)),
        );
        let extent = (max - min).norm();
        debug!(
            "triangulated {count} samples into {} triangles",
            triangles.len()
        );

        Ok(Self {
            points,
            values,
            gradients,
            triangles,
            step: RELATIVE_STEP * extent.max(f64::MIN_POSITIVE),
        })
    }

    /// Number of samples the interpolant passes through.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    /// Evaluate the interpolant, or `None` outside the convex hull of the samples.
    ///
    /// At a sample location the sample value is returned unchanged.
    #[must_use]
    pub fn evaluate(&self, x: Vector2<f64>) -> Option<Vector3<f64>> {
        let (tri, b) = self.locate(x)?;
        let triangle = &self.triangles[tri];
        if let Some(&vertex) = triangle.vertices.iter().find(|&&v| self.points[v] == x) {
            return Some(self.values[vertex]);
        }
        Some(Vector3::from_fn(|component, _| {
            self.patch_value(triangle, &b, component)
        }))
    }

    /// Derivative of the interpolant with respect to `u` (first column) and
    /// `v` (second column).
    ///
    /// Central differences are used where both neighbours lie inside the
    /// convex hull and one-sided differences next to its boundary. Returns
    /// `None` when `x` is outside the hull or no difference can be formed.
    #[must_use]
    pub fn jacobian(&self, x: Vector2<f64>) -> Option<Matrix3x2<f64>> {
        let center = self.evaluate(x)?;
        let h = self.step;
        let mut jacobian = Matrix3x2::zeros();
        for (column, direction) in [Vector2::<f64>::x(), Vector2::<f64>::y()].iter().enumerate() {
            let forward = self.evaluate(x + direction * h);
            let backward = self.evaluate(x - direction * h);
            let derivative = match (forward, backward) {
                (Some(f), Some(b)) => (f - b) / (2.0 * h),
                (Some(f), None) => (f - center) / h,
                (None, Some(b)) => (center - b) / h,
                (None, None) => return None,
            };
            jacobian.set_column(column, &derivative);
        }
        Some(jacobian)
    }

    /// Find a triangle containing `x` and its barycentric coordinates there.
    fn locate(&self, x: Vector2<f64>) -> Option<(usize, [f64; 3])> {
        self.triangles.iter().enumerate().find_map(|(idx, triangle)| {
            let b = barycentric(triangle, &self.points, x)?;
            b.iter().all(|&c| c >= -BARYCENTRIC_EPS).then(|| (idx, b))
        })
    }

    /// Evaluate one value component on the Clough–Tocher split of `triangle`.
    fn patch_value(&self, triangle: &Triangle, b: &[f64; 3], component: usize) -> f64 {
        let [i1, i2, i3] = triangle.vertices;
        let (x1, x2, x3) = (self.points[i1], self.points[i2], self.points[i3]);
        let e12 = x2 - x1;
        let e23 = x3 - x2;
        let e31 = x1 - x3;

        let f1 = self.values[i1][component];
        let f2 = self.values[i2][component];
        let f3 = self.values[i3][component];
        let grad = |vertex: usize| -> Vector2<f64> {
            self.gradients[vertex].row(component).transpose()
        };
        let (g1, g2, g3) = (grad(i1), grad(i2), grad(i3));

        // Directional derivatives at each corner along its two edges.
        let df12 = g1.dot(&e12);
        let df21 = -g2.dot(&e12);
        let df23 = g2.dot(&e23);
        let df32 = -g3.dot(&e23);
        let df31 = g3.dot(&e31);
        let df13 = -g1.dot(&e31);

        let c3000 = f1;
        let c2100 = (df12 + 3.0 * c3000) / 3.0;
        let c2010 = (df13 + 3.0 * c3000) / 3.0;
        let c0300 = f2;
        let c1200 = (df21 + 3.0 * c0300) / 3.0;
        let c0210 = (df23 + 3.0 * c0300) / 3.0;
        let c0030 = f3;
        let c1020 = (df31 + 3.0 * c0030) / 3.0;
        let c0120 = (df32 + 3.0 * c0030) / 3.0;

        let c2001 = (c2100 + c2010 + c3000) / 3.0;
        let c0201 = (c1200 + c0300 + c0210) / 3.0;
        let c0021 = (c1020 + c0120 + c0030) / 3.0;

        let [k1, k2, k3] = triangle.edge_factors;
        let c0111 = (k1 * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (k2 * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (k3 * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Barycentric coordinates within the sub-triangle; one of b1..b3 is zero.
        let min = b[0].min(b[1]).min(b[2]);
        let b1 = b[0] - min;
        let b2 = b[1] - min;
        let b3 = b[2] - min;
        let b4 = 3.0 * min;

        b1.powi(3) * c3000
            + 3.0 * b1 * b1 * b2 * c2100
            + 3.0 * b1 * b1 * b3 * c2010
            + 3.0 * b1 * b1 * b4 * c2001
            + 3.0 * b1 * b2 * b2 * c1200
            + 6.0 * b1 * b2 * b4 * c1101
            + 3.0 * b1 * b3 * b3 * c1020
            + 6.0 * b1 * b3 * b4 * c1011
            + 3.0 * b1 * b4 * b4 * c1002
            + b2.powi(3) * c0300
            + 3.0 * b2 * b2 * b3 * c0210
            + 3.0 * b2 * b2 * b4 * c0201
            + 3.0 * b2 * b3 * b3 * c0120
            + 6.0 * b2 * b3 * b4 * c0111
            + 3.0 * b2 * b4 * b4 * c0102
            + b3.powi(3) * c0030
            + 3.0 * b3 * b3 * b4 * c0021
            + 3.0 * b3 * b4 * b4 * c0012
            + b4.powi(3) * c0003
    }
}

/// Barycentric coordinates of `x` with respect to `triangle`.
fn barycentric(triangle: &Triangle, points: &[Vector2<f64>], x: Vector2<f64>) -> Option<[f64; 3]> {
    let inverse = triangle.inverse?;
    let c = inverse * (x - points[triangle.vertices[2]]);
    Some([c.x, c.y, 1.0 - c.x - c.y])
}

/// Cross-boundary derivative factor for the edge opposite corner `opposite`,
/// given the neighbour's centroid `c` in this triangle's barycentric coordinates.
fn edge_factor(opposite: usize, c: [f64; 3]) -> f64 {
    let (near, far) = match opposite {
        0 => (c[2], c[1]),
        1 => (c[0], c[2]),
        _ => (c[1], c[0]),
    };
    (2.0 * near + far - 1.0) / (2.0 - 3.0 * near - 3.0 * far)
}

/// Estimate the gradient of a scalar field at every sample by minimizing the
/// second derivative of cubic edge interpolants (Gauss–Seidel sweeps).
fn estimate_gradients(
    points: &[Vector2<f64>],
    adjacency: &[Vec<usize>],
    values: &[f64],
) -> Vec<Vector2<f64>> {
    let mut gradients = vec![Vector2::zeros(); points.len()];
    for iteration in 0..GRADIENT_MAX_ITERATIONS {
        let mut error: f64 = 0.0;
        for (i, neighbors) in adjacency.iter().enumerate() {
            let mut q = Matrix2::zeros();
            let mut s = Vector2::zeros();
            for &j in neighbors {
                let e = points[j] - points[i];
                let length_cubed = e.norm().powi(3);
                if length_cubed == 0.0 {
                    continue;
                }
                let df_j = -e.dot(&gradients[j]);
                q += (e * e.transpose()) * (4.0 / length_cubed);
                s += e * ((6.0 * (values[i] - values[j]) - 2.0 * df_j) / length_cubed);
            }
            let Some(r) = q.try_inverse().map(|inverse| inverse * s) else {
                continue;
            };
            let change = (gradients[i] + r).amax() / r.amax().max(1.0);
            gradients[i] = -r;
            error = error.max(change);
        }
        if error < GRADIENT_TOLERANCE {
            debug!("gradient estimation converged after {} sweeps", iteration + 1);
            return gradients;
        }
    }
    warn!("gradient estimation did not converge after {GRADIENT_MAX_ITERATIONS} sweeps");
    gradients
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn grid(n: usize, extent: f64) -> Vec<Vector2<f64>> {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let u = extent * (i as f64 / (n - 1) as f64 - 0.5);
                let v = extent * (j as f64 / (n - 1) as f64 - 0.5);
                points.push(Vector2::new(u, v));
            }
        }
        points
    }

    fn affine(p: &Vector2<f64>) -> Vector3<f64> {
        Vector3::new(1.0 + 2.0 * p.x - 0.5 * p.y, 0.3 * p.x + p.y, -0.25 * p.x + 0.75 * p.y)
    }

    #[test]
    fn passes_through_samples() {
        let points = grid(6, 4.0);
        let values: Vec<_> = points
            .iter()
            .map(|p| Vector3::new(p.x.sin(), p.y.cos(), p.x * p.y))
            .collect();
        let field = CloughTocher2d::new(points.clone(), values.clone()).expect("valid samples");
        for (point, value) in points.iter().zip(&values) {
            assert_eq!(field.evaluate(*point), Some(*value));
        }
    }

    #[test]
    fn reproduces_affine_fields() {
        let points = grid(5, 2.0);
        let values = points.iter().map(affine).collect();
        let field = CloughTocher2d::new(points, values).expect("valid samples");
        for query in [
            Vector2::new(0.1, 0.2),
            Vector2::new(-0.73, 0.41),
            Vector2::new(0.95, -0.95),
        ] {
            let value = field.evaluate(query).expect("inside hull");
            assert_relative_eq!(value, affine(&query), epsilon = 1.0e-4);

            let jacobian = field.jacobian(query).expect("inside hull");
            let expected = Matrix3x2::new(2.0, -0.5, 0.3, 1.0, -0.25, 0.75);
            assert_relative_eq!(jacobian, expected, epsilon = 1.0e-4);
        }
    }

    #[test]
    fn approximates_smooth_fields() {
        let points = grid(21, 2.0);
        let surface = |p: &Vector2<f64>| Vector3::new(p.x, p.y, 0.5 * (p.x * p.x + p.y * p.y));
        let values = points.iter().map(surface).collect();
        let field = CloughTocher2d::new(points, values).expect("valid samples");
        let query = Vector2::new(0.33, -0.27);
        let value = field.evaluate(query).expect("inside hull");
        assert_relative_eq!(value, surface(&query), epsilon = 1.0e-3);
    }

    #[test]
    fn jacobian_on_hull_boundary_uses_one_sided_differences() {
        let points = grid(4, 2.0);
        let values = points.iter().map(affine).collect();
        let field = CloughTocher2d::new(points, values).expect("valid samples");
        let corner = Vector2::new(-1.0, -1.0);
        let jacobian = field.jacobian(corner).expect("corner is a sample");
        let expected = Matrix3x2::new(2.0, -0.5, 0.3, 1.0, -0.25, 0.75);
        assert_relative_eq!(jacobian, expected, epsilon = 1.0e-4);
    }

    #[test]
    fn outside_hull_is_none() {
        let points = grid(3, 2.0);
        let values = points.iter().map(affine).collect();
        let field = CloughTocher2d::new(points, values).expect("valid samples");
        assert!(field.evaluate(Vector2::new(1.5, 0.0)).is_none());
        assert!(field.jacobian(Vector2::new(0.0, -1.01)).is_none());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let two = vec![Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)];
        let error = CloughTocher2d::new(two, vec![Vector3::zeros(); 2]).expect_err("too few");
        assert_eq!(error, DomainError::InsufficientSamples { count: 2 });

        let collinear: Vec<_> = (0..4_i32).map(|i| Vector2::new(f64::from(i), 0.0)).collect();
        let error =
            CloughTocher2d::new(collinear, vec![Vector3::zeros(); 4]).expect_err("collinear");
        assert_eq!(error, DomainError::InsufficientSamples { count: 4 });
    }
}
