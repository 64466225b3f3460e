// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Smoothing
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! NaN-aware moving averages: centred (weighted kernel) and trailing.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use survey_types::config::Kernel;

/// Gaussian kernel spans ±3σ of the window.
const GAUSS_SIGMAS_PER_WINDOW: f64 = 6.0;

/// Window length (samples) covering `duration_s` at a sampling period of `period_ns`.
pub fn window_samples(duration_s: f64, period_ns: f64) -> usize {
    let w = duration_s * 1e9 / period_ns;
    if w.is_finite() && w >= 1.0 {
        w.round() as usize
    } else {
        1
    }
}

fn weights(window: usize, kernel: Kernel) -> Vec<f64> {
    let half = (window as f64 - 1.0) / 2.0;
    match kernel {
        Kernel::Box => vec![1.0; window],
        Kernel::Gauss => {
            let sigma = window as f64 / GAUSS_SIGMAS_PER_WINDOW;
            (0..window)
                .map(|k| {
                    let d = (k as f64 - half) / sigma;
                    (-0.5 * d * d).exp()
                })
                .collect()
        }
    }
}

/// Centred moving average of width `window`.
///
/// Non-finite samples are skipped; a position with no finite sample in its
/// window becomes NaN. `window <= 1` returns the input unchanged.
pub fn moving_average(y: ArrayView1<f64>, window: usize, kernel: Kernel) -> Array1<f64> {
    let n = y.len();
    if window <= 1 || n == 0 {
        return y.to_owned();
    }
    let w = weights(window, kernel);
    let back = (window - 1) / 2;
    let mut out = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        let mut norm = 0.0;
        for (k, &wk) in w.iter().enumerate() {
            let Some(j) = (i + k).checked_sub(back) else {
                continue;
            };
            if j >= n {
                break;
            }
            let v = y[j];
            if v.is_finite() {
                sum += wk * v;
                norm += wk;
            }
        }
        out[i] = if norm > 0.0 { sum / norm } else { f64::NAN };
    }
    out
}

/// Trailing mean over `y[i + 1 - window ..= i]`.
///
/// Non-finite samples are skipped and a single finite sample is enough;
/// a window with none is NaN. `window <= 1` returns the input unchanged.
pub fn trailing_mean(y: ArrayView1<f64>, window: usize) -> Array1<f64> {
    let n = y.len();
    if window <= 1 || n == 0 {
        return y.to_owned();
    }
    let mut out = Array1::zeros(n);
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        if y[i].is_finite() {
            sum += y[i];
            count += 1;
        }
        if i >= window {
            let old = y[i - window];
            if old.is_finite() {
                sum -= old;
                count -= 1;
            }
        }
        out[i] = if count > 0 { sum / count as f64 } else { f64::NAN };
    }
    out
}

/// Moving average of every column of `[n_times, n_channels]` along time.
pub fn moving_average_columns(values: ArrayView2<f64>, window: usize, kernel: Kernel) -> Array2<f64> {
    let mut out = values.to_owned();
    if window <= 1 {
        return out;
    }
    for (j, column) in values.axis_iter(Axis(1)).enumerate() {
        out.column_mut(j)
            .assign(&moving_average(column, window, kernel));
    }
    out
}
