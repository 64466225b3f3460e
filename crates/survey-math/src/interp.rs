//! One-dimensional interpolation and resampling onto a reference time grid.
//!
//! Timestamps arrive as nanosecond `i64`; they are shifted to a common
//! origin before conversion so that f64 keeps sub-microsecond precision.

use crate::smoothing::trailing_mean;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use survey_types::config::Resampling;

/// Median positive step of a timestamp grid [ns].
///
/// Returns NaN for fewer than two samples.
pub fn sampling_period(time: ArrayView1<i64>) -> f64 {
    let mut steps: Vec<f64> = time
        .windows(2)
        .into_iter()
        .map(|w| (w[1] - w[0]) as f64)
        .filter(|d| *d > 0.0)
        .collect();
    if steps.is_empty() {
        return f64::NAN;
    }
    steps.sort_by(|a, b| a.total_cmp(b));
    let mid = steps.len() / 2;
    if steps.len() % 2 == 0 {
        0.5 * (steps[mid - 1] + steps[mid])
    } else {
        steps[mid]
    }
}

/// Mean step of a timestamp grid [ns]. NaN for fewer than two samples.
pub fn mean_step(time: ArrayView1<i64>) -> f64 {
    let n = time.len();
    if n < 2 {
        return f64::NAN;
    }
    (time[n - 1] - time[0]) as f64 / (n - 1) as f64
}

/// Seconds elapsed since `origin`.
pub fn to_seconds(time: ArrayView1<i64>, origin: i64) -> Array1<f64> {
    time.mapv(|t| (t - origin) as f64 * 1e-9)
}

/// Index `i` of the segment `[x[i], x[i+1]]` containing `xo`.
/// Caller guarantees `x[0] <= xo <= x[n-1]` and `n >= 2`.
fn segment(x: &[f64], xo: f64) -> usize {
    let upper = x.partition_point(|&v| v <= xo);
    upper.saturating_sub(1).min(x.len() - 2)
}

fn lerp(x: &[f64], y: ArrayView1<f64>, xo: f64) -> f64 {
    if x.len() == 1 {
        return if xo == x[0] { y[0] } else { f64::NAN };
    }
    let i = segment(x, xo);
    if xo == x[i] {
        return y[i];
    }
    if xo == x[i + 1] {
        return y[i + 1];
    }
    let t = (xo - x[i]) / (x[i + 1] - x[i]);
    y[i] + t * (y[i + 1] - y[i])
}

/// Linear interpolation of `y(x)` at `xout`.
///
/// `x` must be increasing and as long as `y`. Points outside `[x[0], x[n-1]]` are NaN; NaN in
/// `y` propagates into the two adjacent segments.
pub fn interp_linear(x: ArrayView1<f64>, y: ArrayView1<f64>, xout: ArrayView1<f64>) -> Array1<f64> {
    debug_assert_eq!(x.len(), y.len(), "x and y must have equal length");
    let xs = x.to_vec();
    xout.mapv(|xo| {
        if xs.is_empty() || xo.is_nan() || xo < xs[0] || xo > xs[xs.len() - 1] {
            f64::NAN
        } else {
            lerp(&xs, y, xo)
        }
    })
}

/// Linear interpolation holding the edge values outside the source range.
/// Same length contract as [`interp_linear`].
pub fn interp_clamped(x: ArrayView1<f64>, y: ArrayView1<f64>, xout: ArrayView1<f64>) -> Array1<f64> {
    debug_assert_eq!(x.len(), y.len(), "x and y must have equal length");
    let xs = x.to_vec();
    let n = xs.len();
    xout.mapv(|xo| {
        if n == 0 || xo.is_nan() {
            f64::NAN
        } else if xo <= xs[0] {
            y[0]
        } else if xo >= xs[n - 1] {
            y[n - 1]
        } else {
            lerp(&xs, y, xo)
        }
    })
}

/// Block-average width for `Box` resampling: the cadence ratio, at least 1.
pub fn box_window(time_src: ArrayView1<i64>, time_dst: ArrayView1<i64>) -> usize {
    let ratio = mean_step(time_dst) / mean_step(time_src);
    if ratio.is_finite() && ratio >= 1.0 {
        ratio.floor() as usize
    } else {
        1
    }
}

/// Resample every column of `values[time_src]` onto `time_dst`.
///
/// `Linear` interpolates directly. `Box` first replaces each source sample
/// by the NaN-aware trailing mean of the `box_window` samples ending at it,
/// then interpolates. Out-of-range targets are NaN. `values` has one row per
/// `time_src` entry; the validated series constructors guarantee it.
pub fn resample(
    time_src: ArrayView1<i64>,
    values: ArrayView2<f64>,
    time_dst: ArrayView1<i64>,
    mode: Resampling,
) -> Array2<f64> {
    debug_assert_eq!(time_src.len(), values.nrows(), "one row per source timestamp");
    let origin = common_origin(time_src, time_dst);
    let xs = to_seconds(time_src, origin);
    let xo = to_seconds(time_dst, origin);
    let window = match mode {
        Resampling::Linear => 1,
        Resampling::Box => box_window(time_src, time_dst),
    };

    let mut out = Array2::zeros((time_dst.len(), values.ncols()));
    for (j, column) in values.axis_iter(Axis(1)).enumerate() {
        let column = if window > 1 {
            trailing_mean(column, window)
        } else {
            column.to_owned()
        };
        let col_out = interp_linear(xs.view(), column.view(), xo.view());
        out.column_mut(j).assign(&col_out);
    }
    out
}

/// Resample columns holding edge values outside the source range.
/// Same row contract as [`resample`].
pub fn resample_clamped(
    time_src: ArrayView1<i64>,
    values: ArrayView2<f64>,
    time_dst: ArrayView1<i64>,
) -> Array2<f64> {
    debug_assert_eq!(time_src.len(), values.nrows(), "one row per source timestamp");
    let origin = common_origin(time_src, time_dst);
    let xs = to_seconds(time_src, origin);
    let xo = to_seconds(time_dst, origin);
    let mut out = Array2::zeros((time_dst.len(), values.ncols()));
    for (j, column) in values.axis_iter(Axis(1)).enumerate() {
        out.column_mut(j)
            .assign(&interp_clamped(xs.view(), column, xo.view()));
    }
    out
}

fn common_origin(a: ArrayView1<i64>, b: ArrayView1<i64>) -> i64 {
    match (a.first(), b.first()) {
        (Some(&x), Some(&y)) => x.min(y),
        (Some(&x), None) => x,
        (None, Some(&y)) => y,
        (None, None) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sampling_period_median() {
        let t = array![0i64, 10, 20, 31, 40, 1000];
        assert!((sampling_period(t.view()) - 10.0).abs() < 1e-12);
        assert!(sampling_period(array![5i64].view()).is_nan());
    }

    #[test]
    fn test_interp_linear_exact_and_midpoint() {
        let x = array![0.0, 1.0, 2.0];
        let y = array![0.0, 10.0, 40.0];
        let out = interp_linear(x.view(), y.view(), array![0.0, 0.5, 1.5, 2.0].view());
        assert!((out[0] - 0.0).abs() < 1e-12);
        assert!((out[1] - 5.0).abs() < 1e-12);
        assert!((out[2] - 25.0).abs() < 1e-12);
        assert!((out[3] - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_interp_linear_out_of_range_is_nan() {
        let x = array![1.0, 2.0];
        let y = array![1.0, 2.0];
        let out = interp_linear(x.view(), y.view(), array![0.5, 2.5].view());
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
    }

    #[test]
    fn test_interp_exact_node_ignores_nan_neighbour() {
        let x = array![0.0, 1.0, 2.0];
        let y = array![1.0, f64::NAN, 3.0];
        let out = interp_linear(x.view(), y.view(), array![0.0, 0.5, 2.0].view());
        assert_eq!(out[0], 1.0);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 3.0);
    }

    #[test]
    fn test_interp_clamped_holds_edges() {
        let x = array![1.0, 2.0];
        let y = array![10.0, 20.0];
        let out = interp_clamped(x.view(), y.view(), array![0.0, 1.5, 5.0].view());
        assert_eq!(out[0], 10.0);
        assert!((out[1] - 15.0).abs() < 1e-12);
        assert_eq!(out[2], 20.0);
    }

    #[test]
    fn test_box_window_ratio() {
        let fine = Array1::from_iter((0..100).map(|i| i as i64 * 10));
        let coarse = Array1::from_iter((0..10).map(|i| i as i64 * 100));
        assert_eq!(box_window(fine.view(), coarse.view()), 10);
        assert_eq!(box_window(coarse.view(), fine.view()), 1);
    }

    #[test]
    fn test_resample_linear_identity() {
        let t = array![0i64, 1_000, 2_000, 3_000];
        let v = Array2::from_shape_fn((4, 2), |(i, j)| (i * 10 + j) as f64);
        let out = resample(t.view(), v.view(), t.view(), Resampling::Linear);
        assert_eq!(out, v);
    }

    #[test]
    fn test_resample_box_averages_fine_source() {
        // Alternating +1/-1 source averaged over the 2x cadence ratio → 0
        let src = Array1::from_iter((0..40).map(|i| i as i64 * 1_000_000));
        let v = Array2::from_shape_fn((40, 1), |(i, _)| if i % 2 == 0 { 1.0 } else { -1.0 });
        let dst = Array1::from_iter((5..15).map(|i| i as i64 * 2_000_000));
        let out = resample(src.view(), v.view(), dst.view(), Resampling::Box);
        for &val in out.iter() {
            assert!(val.abs() < 1e-12, "box average should cancel: {val}");
        }
    }

    #[test]
    fn test_resample_box_uses_trailing_window() {
        let src = Array1::from_iter((0..40).map(|i| i as i64 * 1_000_000_000));
        let v = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let dst = Array1::from_iter((0..10).map(|i| i as i64 * 4_000_000_000));
        let out = resample(src.view(), v.view(), dst.view(), Resampling::Box);
        // mean(5, 6, 7, 8) at t = 8 s
        assert!((out[[2, 0]] - 6.5).abs() < 1e-12);
        assert!((out[[5, 0]] - 18.5).abs() < 1e-12);
        // fewer than four samples behind t = 0
        assert_eq!(out[[0, 0]], 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "one row per source timestamp")]
    fn test_resample_row_contract() {
        let t = array![0i64, 1_000];
        resample(t.view(), Array2::zeros((3, 1)).view(), t.view(), Resampling::Linear);
    }

    #[test]
    fn test_resample_large_epoch_precision() {
        // 2017-07-26 in ns since 1970: far beyond f64's exact integer range
        let base = 1_501_052_400_000_000_000i64;
        let src = array![base, base + 1_000_000_000];
        let dst = array![base + 250_000_000];
        let v = Array2::from_shape_vec((2, 1), vec![0.0, 4.0]).unwrap();
        let out = resample(src.view(), v.view(), dst.view(), Resampling::Linear);
        assert!((out[[0, 0]] - 1.0).abs() < 1e-9);
    }
}
