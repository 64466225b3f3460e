// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Spectrum Fusion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Combine a low-energy and a high-energy instrument into one spectrum and
//! integrate total and non-thermal moments.
//!
//! Steps: mask → background → spin average → align → bridge →
//! concatenate → integrate.

use crate::extrapolate::fuse;
use crate::moments::integrate_moments;
use crate::spectrum::{align_to, mask_cutoff, remove_background, spin_average};
use survey_types::config::FusionOptions;
use survey_types::error::SurveyResult;
use survey_types::series::{EnergySpectrum, FusedSpectrum, MomentSet};
use survey_types::species::Species;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FusionProduct {
    pub spectrum: FusedSpectrum,
    pub moments: MomentSet,
    pub nonthermal: MomentSet,
}

/// Full fusion pipeline for one species and interval.
///
/// `low` provides the time grid and the spacecraft potential. Both
/// instruments must report the same flux and energy units.
pub fn fuse_and_integrate(
    low: &EnergySpectrum,
    high: &EnergySpectrum,
    species: Species,
    options: &FusionOptions,
) -> SurveyResult<FusionProduct> {
    low.flux_unit.ensure_same(&high.flux_unit, "fusion flux")?;
    low.energy_unit.ensure_same(&high.energy_unit, "fusion energy")?;
    options.validate()?;

    let mut low = if options.mask_cutoff {
        mask_cutoff(low, options.cutoff_energy_ev)?
    } else {
        low.clone()
    };
    if options.bg_remove {
        low = remove_background(&low, species, options.factor, options.noise_floor_bins)?;
    }

    let high = match &options.spin_average {
        Some(spin) => spin_average(high, spin),
        None => high.clone(),
    };
    let high = align_to(&high, &low.time)?;

    let spectrum = fuse(&low, &high, options.n_ext)?;
    let potential = low.sc_potential.as_ref();
    let moments = integrate_moments(&spectrum, species, potential, 0)?;
    let nonthermal = integrate_moments(&spectrum, species, potential, spectrum.nonthermal_start())?;
    debug!(
        species = %species,
        samples = spectrum.time.len(),
        n_low = spectrum.n_low,
        n_high = spectrum.n_high,
        "spectrum fused"
    );

    Ok(FusionProduct {
        spectrum,
        moments,
        nonthermal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use survey_types::error::SurveyError;
    use survey_types::units::{Unit, FLUX_CM2};

    fn power_law(energy: &Array1<f64>, amplitude: f64, index: f64, n_times: usize) -> Array2<f64> {
        Array2::from_shape_fn((n_times, energy.len()), |(_, j)| amplitude * energy[j].powf(-index))
    }

    fn spectrum(time: &Array1<i64>, channels: &Array1<f64>, flux: Array2<f64>) -> EnergySpectrum {
        EnergySpectrum::with_channels(time.clone(), flux, channels, Unit::new(FLUX_CM2), Unit::new("eV"))
            .unwrap()
    }

    /// ∫_a^b A E^-(γ + k) dE
    fn analytic(a: f64, b: f64, amplitude: f64, exponent: f64) -> f64 {
        amplitude * (b.powf(1.0 - exponent) - a.powf(1.0 - exponent)) / (1.0 - exponent)
    }

    #[test]
    fn test_power_law_round_trip() {
        let (amp, gamma) = (1e12, 2.0);
        let time = Array1::from_iter((0..3).map(|i| i as i64 * 4_500_000_000));
        // one log grid split in two with a 6-step hole for the bridge
        let ratio: f64 = (100.0f64).powf(1.0 / 1000.0);
        let grid: Vec<f64> = (0..2007).map(|k| 100.0 * ratio.powi(k)).collect();
        let low_e = Array1::from(grid[..1001].to_vec());
        let high_e = Array1::from(grid[1006..].to_vec());

        let low = spectrum(&time, &low_e, power_law(&low_e, amp, gamma, 3));
        let high = spectrum(&time, &high_e, power_law(&high_e, amp, gamma, 3));
        let out = fuse_and_integrate(&low, &high, Species::Ion, &FusionOptions::raw()).unwrap();

        let bridge = out.spectrum.bridge_start();
        for c in bridge..bridge + 5 {
            let e = out.spectrum.energy[[1, c]];
            let expected = amp * e.powf(-gamma);
            assert!((out.spectrum.flux[[1, c]] - expected).abs() < 1e-9 * expected);
            // bridge energies land on the hole of the log grid
            assert!((e / grid[1001 + c - bridge] - 1.0).abs() < 1e-9);
        }

        let (a, b) = (grid[0], grid[grid.len() - 1]);
        let c = crate::moments::moment_prefactor(Species::Ion);
        let n_exact = c * 1e-2 * analytic(a, b, amp, gamma + 1.5);
        let p_exact = c * 1e-5 * analytic(a, b, amp, gamma + 0.5);
        for t in 0..3 {
            assert!((out.moments.density[t] / n_exact - 1.0).abs() < 1e-3);
            assert!((out.moments.pressure[t] / p_exact - 1.0).abs() < 1e-3);
        }

        // tail starts one bin into the bridge
        let a_nt = grid[1002];
        let n_nt = c * 1e-2 * analytic(a_nt, b, amp, gamma + 1.5);
        assert!((out.nonthermal.density[0] / n_nt - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_all_below_background_gives_zero_moments() {
        let time = Array1::from_iter((0..4).map(|i| i as i64 * 4_500_000_000));
        let low_e = Array1::from(vec![1e3, 2e3, 5e3, 1e4, 2e4]);
        let high_e = Array1::from(vec![8e4, 1e5, 2e5]);
        let low = spectrum(&time, &low_e, Array2::from_elem((4, 5), 10.0));
        let high = spectrum(&time, &high_e, Array2::from_elem((4, 3), f64::NAN));
        let options = FusionOptions {
            bg_remove: true,
            spin_average: None,
            ..FusionOptions::default()
        };
        let out = fuse_and_integrate(&low, &high, Species::Ion, &options).unwrap();
        assert!(out.spectrum.flux.iter().all(|f| f.is_nan()));
        assert!(out.moments.density.iter().all(|n| *n == 0.0));
        assert!(out.moments.pressure.iter().all(|p| *p == 0.0));
    }

    #[test]
    fn test_unit_mismatch_is_fatal() {
        let time = Array1::from_iter(0..2);
        let e = Array1::from(vec![1.0, 2.0]);
        let low = spectrum(&time, &e, Array2::ones((2, 2)));
        let mut high = spectrum(&time, &e, Array2::ones((2, 2)));
        high.flux_unit = Unit::new("m-2 s-1 sr-1");
        assert!(matches!(
            fuse_and_integrate(&low, &high, Species::Electron, &FusionOptions::default()),
            Err(SurveyError::UnitMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let time = Array1::from_iter(0..2);
        let e = Array1::from(vec![1.0, 2.0]);
        let low = spectrum(&time, &e, Array2::ones((2, 2)));
        let options = FusionOptions {
            factor: 0.0,
            ..FusionOptions::default()
        };
        assert!(matches!(
            fuse_and_integrate(&low, &low, Species::Ion, &options),
            Err(SurveyError::ConfigError(_))
        ));
    }

    #[test]
    fn test_cutoff_masks_low_only() {
        let time = Array1::from_iter((0..2).map(|i| i as i64 * 1_000_000_000));
        let low_e = Array1::from(vec![10.0, 100.0, 1000.0]);
        let high_e = Array1::from(vec![20.0, 3000.0]);
        let low = spectrum(&time, &low_e, Array2::ones((2, 3)));
        let high = spectrum(&time, &high_e, Array2::ones((2, 2)));
        let options = FusionOptions {
            spin_average: None,
            n_ext: 2,
            ..FusionOptions::default()
        };
        let out = fuse_and_integrate(&low, &high, Species::Ion, &options).unwrap();
        assert!(out.spectrum.flux[[0, 0]].is_nan());
        assert_eq!(out.spectrum.flux[[0, 1]], 1.0);
        // high instrument bins survive even below the cutoff
        assert_eq!(out.spectrum.flux[[0, 5]], 1.0);
    }
}
