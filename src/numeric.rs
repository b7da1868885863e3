//! Small numeric helpers shared by the shielding model

/// Piecewise-linear interpolation of `ys` over ascending `xs`
///
/// Returns the tabulated value exactly when `x` hits a knot, and `None`
/// for `x` outside `[xs[0], xs[last]]`, for non-finite `x`, or for tables
/// with mismatched or fewer than two entries.
pub fn interp_linear(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || !x.is_finite() {
        return None;
    }

    let last = xs.len() - 1;
    if x < xs[0] || x > xs[last] {
        return None;
    }
    if x == xs[last] {
        return Some(ys[last]);
    }

    // First segment whose right end lies beyond x
    let j = xs.partition_point(|&knot| knot <= x).saturating_sub(1);
    if x == xs[j] {
        return Some(ys[j]);
    }

    let slope = (ys[j + 1] - ys[j]) / (xs[j + 1] - xs[j]);
    Some(ys[j] + slope * (x - xs[j]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: [f64; 4] = [0.0, 15.0, 30.0, 45.0];
    const YS: [f64; 4] = [1.0, 2.0, 4.0, 8.0];

    #[test]
    fn test_knots_are_exact() {
        for (x, y) in XS.iter().zip(YS.iter()) {
            assert_eq!(interp_linear(&XS, &YS, *x), Some(*y));
        }
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(interp_linear(&XS, &YS, 7.5), Some(1.5));
        assert_eq!(interp_linear(&XS, &YS, 37.5), Some(6.0));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(interp_linear(&XS, &YS, -0.1), None);
        assert_eq!(interp_linear(&XS, &YS, 45.1), None);
        assert_eq!(interp_linear(&XS, &YS, f64::NAN), None);
    }

    #[test]
    fn test_degenerate_tables() {
        assert_eq!(interp_linear(&[1.0], &[2.0], 1.0), None);
        assert_eq!(interp_linear(&XS, &YS[..3], 1.0), None);
    }
}
