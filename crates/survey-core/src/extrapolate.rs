// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Gap Extrapolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Power-law bridge across the energy gap between two instruments and
//! concatenation into a single fused spectrum.

use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};
use survey_math::quadrature::logspace_interior;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::series::{EnergySpectrum, FusedSpectrum};
use tracing::debug;

/// Extrapolated bins between the low and high instruments.
#[derive(Debug, Clone)]
pub struct Bridge {
    pub flux: Array2<f64>,
    pub energy: Array2<f64>,
}

fn usable(f: f64, e: f64) -> bool {
    f.is_finite() && f > 0.0 && e.is_finite() && e > 0.0
}

/// Last `(energy, flux)` pair of a row usable for a log-log slope.
fn last_usable(flux: ArrayView1<f64>, energy: ArrayView1<f64>) -> Option<(f64, f64)> {
    (0..flux.len())
        .rev()
        .find(|&c| usable(flux[c], energy[c]))
        .map(|c| (energy[c], flux[c]))
}

fn first_usable(flux: ArrayView1<f64>, energy: ArrayView1<f64>) -> Option<(f64, f64)> {
    (0..flux.len())
        .find(|&c| usable(flux[c], energy[c]))
        .map(|c| (energy[c], flux[c]))
}

/// Power law through both endpoints, evaluated at `n_ext` energies
/// log-spaced strictly between the last low and first high channel.
///
/// Rows lacking a usable endpoint on either side give a NaN bridge.
pub fn extrapolate_gap(
    low_flux: ArrayView2<f64>,
    low_energy: ArrayView2<f64>,
    high_flux: ArrayView2<f64>,
    high_energy: ArrayView2<f64>,
    n_ext: usize,
) -> Bridge {
    let n = low_flux.nrows();
    let mut flux = Array2::from_elem((n, n_ext), f64::NAN);
    let mut energy = Array2::from_elem((n, n_ext), f64::NAN);
    let mut missing = 0usize;

    for t in 0..n {
        let edge_low = low_energy.row(t).last().copied().unwrap_or(f64::NAN);
        let edge_high = high_energy.row(t).first().copied().unwrap_or(f64::NAN);
        let bins = logspace_interior(edge_low, edge_high, n_ext);
        for (c, e) in bins.iter().enumerate() {
            energy[[t, c]] = *e;
        }

        let endpoints = (
            last_usable(low_flux.row(t), low_energy.row(t)),
            first_usable(high_flux.row(t), high_energy.row(t)),
        );
        let ((e_l, f_l), (e_h, f_h)) = match endpoints {
            (Some(l), Some(h)) => (l, h),
            _ => {
                missing += 1;
                continue;
            }
        };
        let slope = (f_h / f_l).ln() / (e_h / e_l).ln();
        for (c, e) in bins.iter().enumerate() {
            flux[[t, c]] = f_l * (e / e_l).powf(slope);
        }
    }
    if missing > 0 {
        debug!(rows = n, missing, "bridge rows without usable endpoints");
    }
    Bridge { flux, energy }
}

/// Concatenate `low ‖ bridge ‖ high` on `low`'s time grid.
///
/// `high` must already be aligned onto `low`'s timestamps.
pub fn fuse(low: &EnergySpectrum, high: &EnergySpectrum, n_ext: usize) -> SurveyResult<FusedSpectrum> {
    low.flux_unit.ensure_same(&high.flux_unit, "fusion flux")?;
    low.energy_unit.ensure_same(&high.energy_unit, "fusion energy")?;
    if low.n_times() != high.n_times() {
        return Err(SurveyError::shape(
            "fusion time grid",
            low.n_times(),
            high.n_times(),
        ));
    }

    let bridge = extrapolate_gap(
        low.flux.view(),
        low.energy.view(),
        high.flux.view(),
        high.energy.view(),
        n_ext,
    );
    let join = |parts: [ArrayView2<f64>; 3]| {
        concatenate(Axis(1), &parts)
            .map_err(|e| SurveyError::shape("fused spectrum", "matching rows", e))
    };
    let flux = join([low.flux.view(), bridge.flux.view(), high.flux.view()])?;
    let energy = join([low.energy.view(), bridge.energy.view(), high.energy.view()])?;

    Ok(FusedSpectrum {
        time: low.time.clone(),
        flux,
        energy,
        flux_unit: low.flux_unit.clone(),
        energy_unit: low.energy_unit.clone(),
        n_low: low.n_energies(),
        n_bridge: n_ext,
        n_high: high.n_energies(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};
    use survey_types::units::{Unit, FLUX_CM2};

    fn spectrum(flux: Array2<f64>, channels: Array1<f64>) -> EnergySpectrum {
        let time = Array1::from_iter((0..flux.nrows()).map(|i| i as i64));
        EnergySpectrum::with_channels(time, flux, &channels, Unit::new(FLUX_CM2), Unit::new("keV")).unwrap()
    }

    #[test]
    fn test_bridge_across_decade_jump() {
        // low covers [10, 100] keV, high [1000, 5000] keV, 100x flux drop
        let low = spectrum(Array2::from_elem((1, 4), 1e6), array![10.0, 30.0, 60.0, 100.0]);
        let high = spectrum(Array2::from_elem((1, 3), 1e4), array![1000.0, 2000.0, 5000.0]);
        let fused = fuse(&low, &high, 5).unwrap();
        assert_eq!(fused.n_bridge, 5);
        assert_eq!(fused.n_energies(), 12);

        let e = fused.energy.row(0);
        let f = fused.flux.row(0);
        for c in 4..9 {
            assert!(e[c] > 100.0 && e[c] < 1000.0, "bridge energy {}", e[c]);
            assert!(e[c] > e[c - 1]);
            assert!(f[c] < f[c - 1] && f[c] > 1e4);
        }
        assert!(e[9] > e[8]);
        // slope -2 in log-log: f = 1e6 (E/100)^-2
        for c in 4..9 {
            let expected = 1e6 * (e[c] / 100.0).powi(-2);
            assert!((f[c] - expected).abs() < 1e-6 * expected);
        }
    }

    #[test]
    fn test_bridge_uses_last_valid_low_bin() {
        let low = array![[1e3, 1e2, f64::NAN]];
        let low_e = array![[1.0, 10.0, 20.0]];
        let high = array![[f64::NAN, 1e0, 1e-1]];
        let high_e = array![[50.0, 100.0, 1000.0]];
        let b = extrapolate_gap(low.view(), low_e.view(), high.view(), high_e.view(), 3);
        // endpoints (10, 1e2) and (100, 1e0): slope -2
        for c in 0..3 {
            let e = b.energy[[0, c]];
            assert!(e > 20.0 && e < 50.0);
            assert!((b.flux[[0, c]] - 1e2 * (e / 10.0).powi(-2)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bridge_without_endpoints_is_nan() {
        let low = array![[f64::NAN, 0.0]];
        let e = array![[1.0, 2.0]];
        let high = array![[5.0, 6.0]];
        let high_e = array![[10.0, 20.0]];
        let b = extrapolate_gap(low.view(), e.view(), high.view(), high_e.view(), 4);
        assert!(b.flux.iter().all(|f| f.is_nan()));
        // energies still span the gap
        assert!(b.energy.iter().all(|v| *v > 2.0 && *v < 10.0));
    }

    #[test]
    fn test_fuse_rejects_unit_mismatch() {
        let low = spectrum(Array2::ones((1, 2)), array![1.0, 2.0]);
        let mut high = spectrum(Array2::ones((1, 2)), array![10.0, 20.0]);
        high.energy_unit = Unit::new("eV");
        assert!(matches!(
            fuse(&low, &high, 2),
            Err(SurveyError::UnitMismatch { .. })
        ));
    }

    #[test]
    fn test_fuse_zero_bridge() {
        let low = spectrum(Array2::ones((2, 2)), array![1.0, 2.0]);
        let high = spectrum(Array2::ones((2, 3)), array![10.0, 20.0, 30.0]);
        let fused = fuse(&low, &high, 0).unwrap();
        assert_eq!(fused.flux.dim(), (2, 5));
        assert_eq!(fused.nonthermal_start(), 2);
    }
}
