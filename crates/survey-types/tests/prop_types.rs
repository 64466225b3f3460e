// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Property-Based Tests (proptest) for survey-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for survey-types using proptest.
//!
//! Covers: series construction invariants, channel tiling,
//! background table shape, configuration serialization roundtrip.

use ndarray::{Array1, Array2};
use proptest::prelude::*;
use survey_types::config::{FusionOptions, SurveyConfig};
use survey_types::series::{EnergySpectrum, VectorSeries};
use survey_types::species::Species;
use survey_types::units::{Unit, FLUX_CM2};

fn uniform_time(n: usize, step: i64) -> Array1<i64> {
    Array1::from_iter((0..n as i64).map(|i| i * step))
}

// ── Series Construction Invariants ───────────────────────────────────

proptest! {
    /// Any strictly increasing grid with matching rows is accepted.
    #[test]
    fn vector_series_accepts_monotone(n in 1usize..64, step in 1i64..1_000_000_000) {
        let series = VectorSeries::new(
            uniform_time(n, step),
            Array2::zeros((n, 3)),
            Unit::new("nT"),
        );
        prop_assert!(series.is_ok());
        prop_assert_eq!(series.unwrap().len(), n);
    }

    /// Swapping two adjacent timestamps is always rejected.
    #[test]
    fn vector_series_rejects_swap(n in 3usize..64, at in 1usize..62) {
        let at = at.min(n - 1);
        let mut time = uniform_time(n, 10);
        time.swap(at - 1, at);
        let series = VectorSeries::new(time, Array2::zeros((n, 3)), Unit::new("nT"));
        prop_assert!(series.is_err());
    }

    /// Tiled channel tables are constant in time and keep their order.
    #[test]
    fn channel_tiling(n_t in 1usize..32, n_e in 1usize..32) {
        let channels = Array1::from_iter((0..n_e).map(|i| 10.0 * (i as f64 + 1.0)));
        let spec = EnergySpectrum::with_channels(
            uniform_time(n_t, 1),
            Array2::ones((n_t, n_e)),
            &channels,
            Unit::new(FLUX_CM2),
            Unit::new("eV"),
        ).unwrap();
        prop_assert!(spec.has_fixed_channels());
        for t in 0..n_t {
            for e in 0..n_e {
                prop_assert_eq!(spec.energy[[t, e]], channels[e]);
            }
        }
    }
}

// ── Background Table Invariants ──────────────────────────────────────

proptest! {
    /// Plateau levels scale linearly with the factor; the gap level does not.
    #[test]
    fn background_scaling(energy_kev in 0.01f64..1000.0, factor in 0.1f64..10.0) {
        for species in Species::ALL {
            let bg = species.background();
            let base = bg.level(energy_kev, 1.0);
            let scaled = bg.level(energy_kev, factor);
            let [lower, upper] = bg.gap_kev;
            if energy_kev > lower && energy_kev < upper {
                prop_assert_eq!(scaled, bg.gap_level);
            } else {
                prop_assert!((scaled - factor * base).abs() <= 1e-9 * scaled.abs());
            }
        }
    }
}

// ── Configuration Roundtrip ──────────────────────────────────────────

proptest! {
    #[test]
    fn fusion_options_roundtrip(
        n_ext in 0usize..20,
        factor in 0.01f64..10.0,
        bg_remove in any::<bool>(),
        mask_cutoff in any::<bool>(),
    ) {
        let mut cfg = SurveyConfig::default();
        cfg.fusion = FusionOptions { n_ext, factor, bg_remove, mask_cutoff, ..FusionOptions::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        let back = SurveyConfig::from_json(&json).unwrap();
        prop_assert_eq!(back.fusion, cfg.fusion);
    }
}
