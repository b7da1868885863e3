// Planar Delaunay triangulation for scattered-data interpolation
//
// Construction:
// 1. Lexicographic sweep: points are inserted in (x, y) order, so every new
//    point lies strictly outside the current hull and is joined to the hull
//    edges it can see. Collinear hull edges are never "visible", which keeps
//    zero-area triangles out of the mesh.
// 2. Lawson flips: any interior edge whose opposite vertex falls strictly
//    inside the circumcircle is flipped until none remain.
// 3. Ties: a convex quad with all four corners on one circle (every grid
//    cell) admits either diagonal. With sample values attached, the diagonal
//    whose endpoint values sum lower is kept; without them the sweep's
//    choice stands.
//
// Coordinates are used as given (no rescaling).

use super::{Result, ShieldError};
use std::collections::HashMap;

/// Relative tolerance for orientation tests
const ORIENT_EPS: f64 = 1e-12;

/// Relative tolerance for in-circle tests
const INCIRCLE_EPS: f64 = 1e-10;

/// Barycentric slack accepted when locating a query point
const LOCATE_EPS: f64 = 1e-10;

/// Upper bound on flip passes per input point
const MAX_FLIP_PASSES_PER_POINT: usize = 8;

type Point = [f64; 2];

/// Delaunay triangulation of a planar point set
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<Point>,
    /// Vertex indices, counter-clockwise
    triangles: Vec<[usize; 3]>,
    /// `neighbors[t][k]`: triangle across the edge opposite vertex `k` of `t`
    neighbors: Vec<[Option<usize>; 3]>,
    /// Sorted vertex adjacency
    vertex_neighbors: Vec<Vec<usize>>,
}

impl Triangulation {
    /// Triangulate `points`
    ///
    /// # Errors
    /// `ShieldError::Triangulation` for fewer than three points, non-finite
    /// coordinates, duplicate points, an all-collinear set, or a flip loop
    /// that fails to settle.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        Self::build(points, None)
    }

    /// Triangulate `points`, splitting cocircular quads along the diagonal
    /// with the lower `values` sum
    ///
    /// # Errors
    /// As [`Triangulation::new`], plus a length mismatch between `points`
    /// and `values`.
    pub fn with_values(points: Vec<Point>, values: &[f64]) -> Result<Self> {
        if points.len() != values.len() {
            return Err(ShieldError::Triangulation(format!(
                "{} points but {} values",
                points.len(),
                values.len()
            )));
        }
        Self::build(points, Some(values))
    }

    fn build(points: Vec<Point>, values: Option<&[f64]>) -> Result<Self> {
        if points.len() < 3 {
            return Err(ShieldError::Triangulation(format!(
                "need at least 3 points, got {}",
                points.len()
            )));
        }
        if let Some(p) = points.iter().find(|p| !p[0].is_finite() || !p[1].is_finite()) {
            return Err(ShieldError::Triangulation(format!(
                "non-finite point ({}, {})",
                p[0], p[1]
            )));
        }

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| {
            points[a][0]
                .total_cmp(&points[b][0])
                .then(points[a][1].total_cmp(&points[b][1]))
        });
        if let Some(w) = order.windows(2).find(|w| points[w[0]] == points[w[1]]) {
            let p = points[w[0]];
            return Err(ShieldError::Triangulation(format!(
                "duplicate point ({}, {})",
                p[0], p[1]
            )));
        }

        let mut triangles = sweep(&points, &order)?;
        let passes = legalize(&points, &mut triangles)?;
        let tie_flips = match values {
            Some(values) => break_ties(&points, values, &mut triangles)?,
            None => 0,
        };
        tracing::trace!(
            points = points.len(),
            triangles = triangles.len(),
            passes,
            tie_flips,
            "triangulation built"
        );

        let edges = directed_edges(&triangles);
        let neighbors = triangles
            .iter()
            .map(|tri| {
                let mut across = [None; 3];
                for (k, slot) in across.iter_mut().enumerate() {
                    let (a, b) = edge(tri, k);
                    *slot = edges.get(&(b, a)).map(|&(t, _)| t);
                }
                across
            })
            .collect();

        let mut vertex_neighbors = vec![Vec::new(); points.len()];
        for tri in &triangles {
            for k in 0..3 {
                let (a, b) = edge(tri, k);
                vertex_neighbors[a].push(b);
                vertex_neighbors[b].push(a);
            }
        }
        for adjacent in &mut vertex_neighbors {
            adjacent.sort_unstable();
            adjacent.dedup();
        }

        Ok(Self {
            points,
            triangles,
            neighbors,
            vertex_neighbors,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn neighbors(&self, triangle: usize) -> [Option<usize>; 3] {
        self.neighbors[triangle]
    }

    pub fn vertex_neighbors(&self, vertex: usize) -> &[usize] {
        &self.vertex_neighbors[vertex]
    }

    /// Barycentric coordinates of `p` with respect to `triangle`
    pub fn barycentric(&self, triangle: usize, p: Point) -> [f64; 3] {
        let [v0, v1, v2] = self.triangles[triangle];
        let [x0, y0] = self.points[v0];
        let [x1, y1] = self.points[v1];
        let [x2, y2] = self.points[v2];

        let det = (y1 - y2) * (x0 - x2) + (x2 - x1) * (y0 - y2);
        let c0 = ((y1 - y2) * (p[0] - x2) + (x2 - x1) * (p[1] - y2)) / det;
        let c1 = ((y2 - y0) * (p[0] - x2) + (x0 - x2) * (p[1] - y2)) / det;
        [c0, c1, 1.0 - c0 - c1]
    }

    /// Centroid of `triangle`
    pub fn centroid(&self, triangle: usize) -> Point {
        let [a, b, c] = self.triangles[triangle].map(|v| self.points[v]);
        [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0]
    }

    /// Triangle containing `p` with its barycentric coordinates
    ///
    /// Points on shared edges resolve to the triangle where `p` sits
    /// deepest. `None` outside the convex hull.
    pub fn locate(&self, p: Point) -> Option<(usize, [f64; 3])> {
        let mut best: Option<(usize, [f64; 3], f64)> = None;
        for t in 0..self.triangles.len() {
            let coords = self.barycentric(t, p);
            let depth = coords[0].min(coords[1]).min(coords[2]);
            if depth < -LOCATE_EPS {
                continue;
            }
            if best.map_or(true, |(_, _, d)| depth > d) {
                best = Some((t, coords, depth));
            }
        }
        best.map(|(t, coords, _)| (t, coords))
    }
}

/// Edge `k` of a triangle: the one opposite vertex `k`, in winding order
fn edge(tri: &[usize; 3], k: usize) -> (usize, usize) {
    (tri[(k + 1) % 3], tri[(k + 2) % 3])
}

/// Directed edge -> (triangle, edge slot)
fn directed_edges(triangles: &[[usize; 3]]) -> HashMap<(usize, usize), (usize, usize)> {
    let mut edges = HashMap::with_capacity(triangles.len() * 3);
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            edges.insert(edge(tri, k), (t, k));
        }
    }
    edges
}

fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn distance(a: Point, b: Point) -> f64 {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

/// +1 if `c` lies left of a->b, -1 if right, 0 if collinear within tolerance
fn orientation(a: Point, b: Point, c: Point) -> i8 {
    let area = cross(a, b, c);
    let scale = ORIENT_EPS * distance(a, b) * distance(a, c);
    if area > scale {
        1
    } else if area < -scale {
        -1
    } else {
        0
    }
}

/// +1 if `d` lies inside the circumcircle of counter-clockwise `a, b, c`,
/// -1 if outside, 0 if on it within tolerance
fn circumcircle_side(a: Point, b: Point, c: Point, d: Point) -> i8 {
    let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
    let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
    let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdx * cdy - cdx * bdy)
        + blift * (cdx * ady - adx * cdy)
        + clift * (adx * bdy - bdx * ady);
    let permanent = alift * ((bdx * cdy).abs() + (cdx * bdy).abs())
        + blift * ((cdx * ady).abs() + (adx * cdy).abs())
        + clift * ((adx * bdy).abs() + (bdx * ady).abs());

    let tolerance = INCIRCLE_EPS * permanent;
    if det > tolerance {
        1
    } else if det < -tolerance {
        -1
    } else {
        0
    }
}

/// True if `d` lies strictly inside the circumcircle of counter-clockwise `a, b, c`
fn in_circumcircle(a: Point, b: Point, c: Point, d: Point) -> bool {
    circumcircle_side(a, b, c, d) > 0
}

/// Initial (non-Delaunay) triangulation by lexicographic hull sweep
fn sweep(points: &[Point], order: &[usize]) -> Result<Vec<[usize; 3]>> {
    let p0 = points[order[0]];
    let p1 = points[order[1]];

    // Leading run of collinear points forms the seed chain
    let apex_pos = (2..order.len())
        .find(|&i| orientation(p0, p1, points[order[i]]) != 0)
        .ok_or_else(|| ShieldError::Triangulation("all points are collinear".to_string()))?;
    let apex = order[apex_pos];
    let chain = &order[..apex_pos];
    let turn = orientation(p0, p1, points[apex]);

    let mut triangles = Vec::with_capacity(2 * order.len());
    for w in chain.windows(2) {
        if turn > 0 {
            triangles.push([w[0], w[1], apex]);
        } else {
            triangles.push([w[1], w[0], apex]);
        }
    }

    // Counter-clockwise hull
    let mut hull: Vec<usize> = if turn > 0 {
        chain.iter().copied().chain(std::iter::once(apex)).collect()
    } else {
        chain.iter().rev().copied().chain(std::iter::once(apex)).collect()
    };

    for &p in &order[apex_pos + 1..] {
        let n = hull.len();
        let visible: Vec<bool> = (0..n)
            .map(|i| orientation(points[hull[i]], points[hull[(i + 1) % n]], points[p]) < 0)
            .collect();

        let start = (0..n)
            .find(|&i| visible[i] && !visible[(i + n - 1) % n])
            .ok_or_else(|| {
                ShieldError::Triangulation(format!(
                    "point ({}, {}) sees no hull edge",
                    points[p][0], points[p][1]
                ))
            })?;
        let mut end = start;
        while visible[(end + 1) % n] {
            end = (end + 1) % n;
        }

        let mut i = start;
        loop {
            triangles.push([hull[(i + 1) % n], hull[i], p]);
            if i == end {
                break;
            }
            i = (i + 1) % n;
        }

        // Vertices strictly inside the visible chain leave the hull
        let mut next = Vec::with_capacity(n + 1);
        let mut j = (end + 1) % n;
        loop {
            next.push(hull[j]);
            if j == start {
                break;
            }
            j = (j + 1) % n;
        }
        next.push(p);
        hull = next;
    }

    Ok(triangles)
}

/// Flip illegal edges until the mesh is Delaunay, returning the pass count
fn legalize(points: &[Point], triangles: &mut [[usize; 3]]) -> Result<usize> {
    let max_passes = MAX_FLIP_PASSES_PER_POINT * points.len();
    let mut touched = vec![false; triangles.len()];

    for pass in 1..=max_passes {
        let edges = directed_edges(triangles);
        touched.fill(false);
        let mut flips = 0;

        for t in 0..triangles.len() {
            if touched[t] {
                continue;
            }
            for k in 0..3 {
                let tri = triangles[t];
                let (a, b) = edge(&tri, k);
                let Some(&(u, m)) = edges.get(&(b, a)) else {
                    continue;
                };
                if touched[u] {
                    continue;
                }

                let q = triangles[u][m];
                let [v0, v1, v2] = tri.map(|v| points[v]);
                if in_circumcircle(v0, v1, v2, points[q]) {
                    let p = tri[k];
                    triangles[t] = [p, a, q];
                    triangles[u] = [p, q, b];
                    touched[t] = true;
                    touched[u] = true;
                    flips += 1;
                    break;
                }
            }
        }

        if flips == 0 {
            return Ok(pass);
        }
    }

    Err(ShieldError::Triangulation(format!(
        "edge flips did not settle after {} passes",
        max_passes
    )))
}

/// Re-split cocircular quads along their lower-valued diagonal, returning the
/// flip count
fn break_ties(points: &[Point], values: &[f64], triangles: &mut [[usize; 3]]) -> Result<usize> {
    let max_passes = MAX_FLIP_PASSES_PER_POINT * points.len();
    let mut touched = vec![false; triangles.len()];
    let mut total = 0;

    for _ in 0..max_passes {
        let edges = directed_edges(triangles);
        touched.fill(false);
        let mut flips = 0;

        for t in 0..triangles.len() {
            if touched[t] {
                continue;
            }
            for k in 0..3 {
                let tri = triangles[t];
                let (a, b) = edge(&tri, k);
                let Some(&(u, m)) = edges.get(&(b, a)) else {
                    continue;
                };
                if touched[u] {
                    continue;
                }

                let p = tri[k];
                let q = triangles[u][m];
                let [v0, v1, v2] = tri.map(|v| points[v]);
                if circumcircle_side(v0, v1, v2, points[q]) == 0
                    && values[p] + values[q] < values[a] + values[b]
                    && orientation(points[p], points[a], points[q]) > 0
                    && orientation(points[p], points[q], points[b]) > 0
                {
                    triangles[t] = [p, a, q];
                    triangles[u] = [p, q, b];
                    touched[t] = true;
                    touched[u] = true;
                    flips += 1;
                    break;
                }
            }
        }

        if flips == 0 {
            return Ok(total);
        }
        total += flips;
    }

    Err(ShieldError::Triangulation(format!(
        "diagonal ties did not settle after {} passes",
        max_passes
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nx: usize, ny: usize) -> Vec<Point> {
        let mut points = Vec::new();
        for i in 0..nx {
            for j in 0..ny {
                points.push([i as f64, j as f64 * 0.5]);
            }
        }
        points
    }

    fn signed_area(tri: &Triangulation, t: usize) -> f64 {
        let [a, b, c] = tri.triangles()[t].map(|v| tri.points()[v]);
        cross(a, b, c)
    }

    #[test]
    fn test_single_triangle() {
        let tri = Triangulation::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert_eq!(tri.triangles().len(), 1);
        assert!(signed_area(&tri, 0) > 0.0);
        assert_eq!(tri.neighbors(0), [None, None, None]);
    }

    #[test]
    fn test_grid_triangle_count() {
        // Euler: T = 2n - 2 - h with every boundary point on the hull
        let tri = Triangulation::new(grid(4, 3)).unwrap();
        let n = 12;
        let h = 10;
        assert_eq!(tri.triangles().len(), 2 * n - 2 - h);
    }

    #[test]
    fn test_triangles_are_counter_clockwise() {
        let tri = Triangulation::new(grid(5, 5)).unwrap();
        for t in 0..tri.triangles().len() {
            assert!(signed_area(&tri, t) > 0.0, "triangle {} is degenerate", t);
        }
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let tri = Triangulation::new(grid(4, 4)).unwrap();
        for t in 0..tri.triangles().len() {
            for u in tri.neighbors(t).into_iter().flatten() {
                assert!(tri.neighbors(u).contains(&Some(t)));
            }
        }
    }

    #[test]
    fn test_delaunay_property() {
        let points = vec![
            [0.0, 0.0],
            [10.0, 0.3],
            [3.0, 4.0],
            [7.5, 6.1],
            [1.2, 8.0],
            [9.0, 9.5],
            [5.0, 2.2],
            [4.4, 7.7],
        ];
        let tri = Triangulation::new(points.clone()).unwrap();
        for t in tri.triangles() {
            let [a, b, c] = t.map(|v| points[v]);
            for (i, p) in points.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                assert!(!in_circumcircle(a, b, c, *p));
            }
        }
    }

    #[test]
    fn test_vertex_neighbors_of_grid_corner() {
        let tri = Triangulation::new(grid(3, 3)).unwrap();
        // Corner (0, 0) touches at least its two axis neighbours
        let adjacent = tri.vertex_neighbors(0);
        assert!(adjacent.contains(&1));
        assert!(adjacent.contains(&3));
    }

    #[test]
    fn test_locate_inside_and_outside() {
        let tri = Triangulation::new(grid(3, 3)).unwrap();
        let (t, coords) = tri.locate([0.5, 0.3]).unwrap();
        assert!(coords.iter().all(|c| *c >= -LOCATE_EPS));
        assert!(t < tri.triangles().len());
        assert!(tri.locate([2.5, 0.5]).is_none());
        assert!(tri.locate([1.0, -0.1]).is_none());
    }

    #[test]
    fn test_locate_on_hull_edge() {
        let tri = Triangulation::new(grid(3, 3)).unwrap();
        assert!(tri.locate([2.0, 0.6]).is_some());
    }

    #[test]
    fn test_barycentric_reconstructs_point() {
        let tri = Triangulation::new(vec![[0.0, 0.0], [4.0, 0.0], [0.0, 2.0]]).unwrap();
        let c = tri.barycentric(0, [1.0, 0.5]);
        let [a, b, d] = tri.triangles()[0].map(|v| tri.points()[v]);
        let x = c[0] * a[0] + c[1] * b[0] + c[2] * d[0];
        let y = c[0] * a[1] + c[1] * b[1] + c[2] * d[1];
        assert!((x - 1.0).abs() < 1e-12);
        assert!((y - 0.5).abs() < 1e-12);
    }

    fn has_edge(tri: &Triangulation, a: usize, b: usize) -> bool {
        tri.vertex_neighbors(a).contains(&b)
    }

    #[test]
    fn test_square_tie_follows_lower_diagonal() {
        // 0 (0,0), 1 (0,1), 2 (1,0), 3 (1,1)
        let square = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

        let tri = Triangulation::with_values(square.clone(), &[1.0, 5.0, 5.0, 1.0]).unwrap();
        assert!(has_edge(&tri, 0, 3));
        assert!(!has_edge(&tri, 1, 2));

        let tri = Triangulation::with_values(square, &[5.0, 1.0, 1.0, 5.0]).unwrap();
        assert!(has_edge(&tri, 1, 2));
        assert!(!has_edge(&tri, 0, 3));
    }

    #[test]
    fn test_equal_diagonal_sums_keep_sweep_split() {
        let square = vec![[0.0, 0.0], [0.0, 1.0], [2.0, 0.0], [2.0, 1.0]];
        let plain = Triangulation::new(square.clone()).unwrap();
        let tied = Triangulation::with_values(square, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(plain.triangles(), tied.triangles());
    }

    #[test]
    fn test_value_ties_keep_delaunay_property() {
        let points = grid(6, 5);
        // Convex bowl: every cell prefers a data-dependent diagonal
        let values: Vec<f64> = points
            .iter()
            .map(|p| (p[0] - 2.2).powi(2) + 3.0 * (p[1] - 0.7).powi(2))
            .collect();
        let tri = Triangulation::with_values(points.clone(), &values).unwrap();
        assert_eq!(tri.triangles().len(), 2 * (6 - 1) * (5 - 1));
        for t in 0..tri.triangles().len() {
            assert!(signed_area(&tri, t) > 0.0);
            let [a, b, c] = tri.triangles()[t].map(|v| points[v]);
            for p in &points {
                assert!(!in_circumcircle(a, b, c, *p));
            }
        }
    }

    #[test]
    fn test_with_values_length_mismatch() {
        let err = Triangulation::with_values(grid(2, 2), &[1.0, 2.0]).unwrap_err();
        assert!(err.to_string().contains("4 points but 2 values"));
    }

    #[test]
    fn test_rejects_duplicates() {
        let err = Triangulation::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, ShieldError::Triangulation(_)));
    }

    #[test]
    fn test_rejects_collinear() {
        let err =
            Triangulation::new(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]).unwrap_err();
        assert!(err.to_string().contains("collinear"));
    }

    #[test]
    fn test_rejects_too_few_points() {
        assert!(Triangulation::new(vec![[0.0, 0.0], [1.0, 0.0]]).is_err());
    }
}
