// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Spectrum Conditioning
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-instrument steps applied before two spectra are fused:
//! low-energy cutoff mask, noise-floor and background removal,
//! spin averaging and alignment onto a reference time grid.

use ndarray::{Array1, ArrayView1};
use survey_math::interp::{resample, resample_clamped, sampling_period};
use survey_math::smoothing::{moving_average_columns, window_samples};
use survey_types::config::{Resampling, SpinAverage};
use survey_types::error::SurveyResult;
use survey_types::series::{tile_rows, EnergySpectrum};
use survey_types::species::Species;
use tracing::debug;

/// Energy threshold [eV] below which a bin is masked at sample `t`.
fn cutoff_threshold(spec: &EnergySpectrum, t: usize, cutoff_ev: f64) -> f64 {
    match &spec.sc_potential {
        Some(v) if v[t].is_finite() => cutoff_ev.max(v[t].abs()),
        _ => cutoff_ev,
    }
}

/// NaN every bin with `energy < max(cutoff_ev, |V_sc|)`.
pub fn mask_cutoff(spec: &EnergySpectrum, cutoff_ev: f64) -> SurveyResult<EnergySpectrum> {
    let to_ev = spec.energy_unit.energy_scale_ev()?;
    let mut out = spec.clone();
    for (t, mut row) in out.flux.outer_iter_mut().enumerate() {
        let threshold = cutoff_threshold(spec, t, cutoff_ev);
        for (c, f) in row.iter_mut().enumerate() {
            if spec.energy[[t, c]] * to_ev < threshold {
                *f = f64::NAN;
            }
        }
    }
    Ok(out)
}

/// Mean of the `bins` smallest finite values of `row`, NaN if none.
pub fn noise_floor(row: ArrayView1<f64>, bins: usize) -> f64 {
    let mut finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return f64::NAN;
    }
    finite.sort_by(|a, b| a.total_cmp(b));
    let take = bins.min(finite.len());
    finite[..take].iter().sum::<f64>() / take as f64
}

/// Subtract each row's noise floor, then NaN bins at or below the
/// species background level.
pub fn remove_background(
    spec: &EnergySpectrum,
    species: Species,
    factor: f64,
    floor_bins: usize,
) -> SurveyResult<EnergySpectrum> {
    let to_kev = spec.energy_unit.energy_scale_ev()? * 1e-3;
    let to_cm2 = spec.flux_unit.flux_scale_cm2()?;
    let table = species.background();
    let mut out = spec.clone();
    let mut rejected = 0usize;
    for (t, mut row) in out.flux.outer_iter_mut().enumerate() {
        let floor = noise_floor(row.view(), floor_bins);
        for (c, f) in row.iter_mut().enumerate() {
            *f -= floor;
            let level = table.level(spec.energy[[t, c]] * to_kev, factor);
            if *f * to_cm2 <= level {
                *f = f64::NAN;
                rejected += 1;
            }
        }
    }
    debug!(species = %species, rejected, "background removal");
    Ok(out)
}

/// Smooth every channel over a fraction of the spin period.
pub fn spin_average(spec: &EnergySpectrum, spin: &SpinAverage) -> EnergySpectrum {
    let period = sampling_period(spec.time.view());
    let window = window_samples(spin.duration_s(), period);
    debug!(window, period_ns = period, "spin average");
    let mut out = spec.clone();
    out.flux = moving_average_columns(spec.flux.view(), window, spin.kernel);
    out
}

/// Resample `spec` onto `time` with a block-averaging prefilter.
///
/// A fixed channel table is tiled; a time-varying one is interpolated
/// holding its edge rows. The spacecraft potential is not carried over.
pub fn align_to(spec: &EnergySpectrum, time: &Array1<i64>) -> SurveyResult<EnergySpectrum> {
    let flux = resample(spec.time.view(), spec.flux.view(), time.view(), Resampling::Box);
    let energy = match spec.energy.outer_iter().next() {
        Some(first) if spec.has_fixed_channels() => tile_rows(&first.to_owned(), time.len()),
        _ => resample_clamped(spec.time.view(), spec.energy.view(), time.view()),
    };
    EnergySpectrum::new(
        time.clone(),
        flux,
        energy,
        spec.flux_unit.clone(),
        spec.energy_unit.clone(),
    )
}
