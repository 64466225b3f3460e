//! Trapezoidal quadrature and logarithmic spacing.

use ndarray::ArrayView1;

/// Trapezoidal rule of `y(x)`, `x` and `y` of equal length.
///
/// Non-finite `y` counts as zero: bins already rejected by masking carry
/// no flux. Segments with a non-finite width are skipped.
pub fn trapezoid(y: ArrayView1<f64>, x: ArrayView1<f64>) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "x and y must have equal length");
    let mut sum = 0.0;
    for i in 1..x.len() {
        let dx = x[i] - x[i - 1];
        if !dx.is_finite() {
            continue;
        }
        sum += 0.5 * (finite_or_zero(y[i - 1]) + finite_or_zero(y[i])) * dx;
    }
    sum
}

#[inline]
pub fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// `n` points log-spaced strictly inside `(a, b)`, endpoints excluded.
///
/// Equivalent to the interior of a `n + 2` point geometric sequence from
/// `a` to `b`. Non-positive or non-finite endpoints give NaN points.
pub fn logspace_interior(a: f64, b: f64, n: usize) -> Vec<f64> {
    if !(a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite()) {
        return vec![f64::NAN; n];
    }
    let (la, lb) = (a.ln(), b.ln());
    let steps = (n + 1) as f64;
    (1..=n)
        .map(|k| (la + (lb - la) * k as f64 / steps).exp())
        .collect()
}
