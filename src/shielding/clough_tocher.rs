// Clough-Tocher C1 cubic interpolation over a Delaunay triangulation
//
// Each triangle is split at its centroid into three cubic Bezier patches.
// Vertex values and gradients fix the corner and edge control points; the
// cross-boundary derivative along each edge is made linear, using the
// direction to the neighbouring triangle's centroid, which keeps the
// interpolant affine-invariant and C1 across edges.
//
// Vertex gradients are estimated globally by minimizing the summed squared
// second derivative of the interpolant along every edge (Nielson 1983;
// Renka & Cline 1984), solved one vertex at a time (Gauss-Seidel).
//
// References:
// - Clough, R. & Tocher, J. (1965). Finite element stiffness matrices for
//   analysis of plate bending.
// - Nielson, G. M. (1983). A method for interpolating scattered data based
//   upon a minimum norm network. Math. Comp. 40.

use super::triangulation::Triangulation;
use super::Result;

/// Gauss-Seidel sweeps allowed for gradient estimation
pub const GRADIENT_MAX_ITER: usize = 400;

/// Convergence tolerance on the largest gradient update
pub const GRADIENT_TOL: f64 = 1e-6;

/// Piecewise cubic interpolant for scattered 2-D data
#[derive(Debug, Clone)]
pub struct CloughTocher {
    mesh: Triangulation,
    values: Vec<f64>,
    gradients: Vec<[f64; 2]>,
}

impl CloughTocher {
    /// Build the interpolant for `values` at `points`
    pub fn new(points: Vec<[f64; 2]>, values: Vec<f64>) -> Result<Self> {
        let mesh = Triangulation::with_values(points, &values)?;
        let (gradients, sweeps) =
            estimate_gradients(&mesh, &values, GRADIENT_MAX_ITER, GRADIENT_TOL);
        match sweeps {
            Some(sweeps) => tracing::debug!(sweeps, "gradient estimation converged"),
            None => tracing::warn!(
                "Gradient estimation did not converge within {} sweeps",
                GRADIENT_MAX_ITER
            ),
        }

        Ok(Self {
            mesh,
            values,
            gradients,
        })
    }

    pub fn mesh(&self) -> &Triangulation {
        &self.mesh
    }

    pub fn gradients(&self) -> &[[f64; 2]] {
        &self.gradients
    }

    /// Interpolated value at `(x, y)`, `None` outside the convex hull
    ///
    /// Data points return their sample value exactly.
    pub fn evaluate(&self, x: f64, y: f64) -> Option<f64> {
        if let Some(i) = self.mesh.points().iter().position(|p| *p == [x, y]) {
            return Some(self.values[i]);
        }

        let (t, coords) = self.mesh.locate([x, y])?;
        Some(self.patch_value(t, coords))
    }

    /// Evaluate the Clough-Tocher patch of triangle `t` at barycentric `b`
    fn patch_value(&self, t: usize, b: [f64; 3]) -> f64 {
        let mesh = &self.mesh;
        let tri = mesh.triangles()[t];
        let [p1, p2, p3] = tri.map(|v| mesh.points()[v]);
        let [f1, f2, f3] = tri.map(|v| self.values[v]);
        let [g1, g2, g3] = tri.map(|v| self.gradients[v]);

        let e12 = [p2[0] - p1[0], p2[1] - p1[1]];
        let e23 = [p3[0] - p2[0], p3[1] - p2[1]];
        let e31 = [p1[0] - p3[0], p1[1] - p3[1]];

        let dot = |g: [f64; 2], e: [f64; 2]| g[0] * e[0] + g[1] * e[1];

        // Directional derivatives along each edge, leaving each vertex
        let df12 = dot(g1, e12);
        let df21 = -dot(g2, e12);
        let df23 = dot(g2, e23);
        let df32 = -dot(g3, e23);
        let df31 = dot(g3, e31);
        let df13 = -dot(g1, e31);

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

        // Cross-edge direction: towards the neighbour's centroid, or the
        // triangle's own centroid on the hull
        let mut g = [-0.5; 3];
        for (k, neighbor) in mesh.neighbors(t).into_iter().enumerate() {
            let Some(neighbor) = neighbor else {
                continue;
            };
            let c = mesh.barycentric(t, mesh.centroid(neighbor));
            g[k] = match k {
                0 => (2.0 * c[2] + c[1] - 1.0) / (2.0 - 3.0 * c[2] - 3.0 * c[1]),
                1 => (2.0 * c[0] + c[2] - 1.0) / (2.0 - 3.0 * c[0] - 3.0 * c[2]),
                _ => (2.0 * c[1] + c[0] - 1.0) / (2.0 - 3.0 * c[1] - 3.0 * c[0]),
            };
        }

        let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
            + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
            / 2.0;
        let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
            + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
            / 2.0;
        let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
            + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
            / 2.0;

        let c1002 = (c1101 + c1011 + c2001) / 3.0;
        let c0102 = (c1101 + c0111 + c0201) / 3.0;
        let c0012 = (c1011 + c0111 + c0021) / 3.0;
        let c0003 = (c1002 + c0102 + c0012) / 3.0;

        // Barycentric coordinates in the micro-triangle containing the point;
        // one of b1..b3 is zero
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

/// Estimate vertex gradients minimizing edge curvature
///
/// Returns the gradients and the number of sweeps needed, or `None` when
/// `max_iter` sweeps did not reach `tol`.
pub fn estimate_gradients(
    mesh: &Triangulation,
    values: &[f64],
    max_iter: usize,
    tol: f64,
) -> (Vec<[f64; 2]>, Option<usize>) {
    let points = mesh.points();
    let mut grad = vec![[0.0; 2]; points.len()];

    for sweep in 0..max_iter {
        let mut err: f64 = 0.0;

        for i in 0..points.len() {
            let mut q = [0.0; 3]; // symmetric 2x2: xx, xy, yy
            let mut s = [0.0; 2];

            for &j in mesh.vertex_neighbors(i) {
                let ex = points[j][0] - points[i][0];
                let ey = points[j][1] - points[i][1];
                let l = (ex * ex + ey * ey).sqrt();
                let l3 = l * l * l;

                let df2 = -ex * grad[j][0] - ey * grad[j][1];
                let rhs = 6.0 * (values[i] - values[j]) - 2.0 * df2;

                q[0] += 4.0 * ex * ex / l3;
                q[1] += 4.0 * ex * ey / l3;
                q[2] += 4.0 * ey * ey / l3;
                s[0] += rhs * ex / l3;
                s[1] += rhs * ey / l3;
            }

            let det = q[0] * q[2] - q[1] * q[1];
            let r0 = (q[2] * s[0] - q[1] * s[1]) / det;
            let r1 = (-q[1] * s[0] + q[0] * s[1]) / det;

            let change = (grad[i][0] + r0).abs().max((grad[i][1] + r1).abs());
            grad[i] = [-r0, -r1];

            err = err.max(change / r0.abs().max(r1.abs()).max(1.0));
        }

        if err < tol {
            return (grad, Some(sweep + 1));
        }
    }

    (grad, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scattered() -> Vec<[f64; 2]> {
        vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [0.0, 2.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [0.4, 0.7],
            [1.6, 1.3],
            [1.3, 0.4],
        ]
    }

    #[test]
    fn test_reproduces_linear_function() {
        // Gradient estimation is exact for linear data, and so is the patch
        let f = |p: &[f64; 2]| 3.0 * p[0] - 2.0 * p[1] + 1.0;
        let points = scattered();
        let values = points.iter().map(f).collect();
        let ct = CloughTocher::new(points, values).unwrap();

        for q in [[0.25, 0.25], [1.5, 0.5], [0.9, 1.7], [1.99, 1.01]] {
            let v = ct.evaluate(q[0], q[1]).unwrap();
            assert!((v - f(&q)).abs() < 1e-6, "at {:?}: {} vs {}", q, v, f(&q));
        }
    }

    #[test]
    fn test_linear_gradients_are_recovered() {
        let points = scattered();
        let values = points.iter().map(|p| 0.5 * p[0] + 4.0 * p[1]).collect();
        let ct = CloughTocher::new(points, values).unwrap();
        for g in ct.gradients() {
            assert!((g[0] - 0.5).abs() < 1e-4);
            assert!((g[1] - 4.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_nodes_are_exact() {
        let points = scattered();
        let values: Vec<f64> = points.iter().map(|p| (p[0] * p[1]).sin()).collect();
        let ct = CloughTocher::new(points.clone(), values.clone()).unwrap();
        for (p, v) in points.iter().zip(values) {
            assert_eq!(ct.evaluate(p[0], p[1]), Some(v));
        }
    }

    #[test]
    fn test_outside_hull_is_none() {
        let points = scattered();
        let values = vec![1.0; points.len()];
        let ct = CloughTocher::new(points, values).unwrap();
        assert_eq!(ct.evaluate(-0.5, 1.0), None);
        assert_eq!(ct.evaluate(1.0, 2.5), None);
    }

    #[test]
    fn test_constant_data_stays_constant() {
        let points = scattered();
        let values = vec![2.5; points.len()];
        let ct = CloughTocher::new(points, values).unwrap();
        let v = ct.evaluate(0.77, 1.41).unwrap();
        assert!((v - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_value_count_mismatch() {
        assert!(CloughTocher::new(scattered(), vec![1.0, 2.0]).is_err());
    }
}
