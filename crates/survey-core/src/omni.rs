// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Omni-directional Collapse
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Collapse per-eye FEEPS intensities into one omni-directional spectrum.
//!
//! Each sensor eye reports a differential number flux per channel. It is
//! converted to energy flux with the corrected channel table, eyes whose
//! relative error falls outside `[0, 1]` are excluded sample by sample,
//! and the remaining eyes are averaged and scaled by the probe's
//! geometric factor.

use ndarray::{Array1, Array2, ArrayView1, Zip};
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::instruments::{feeps_channels_kev, feeps_geometric_factor, Probe};
use survey_types::series::EnergySpectrum;
use survey_types::species::Species;
use survey_types::units::{Unit, FLUX_CM2};

/// Channels whose reported energy deviates more than this fraction from the
/// corrected table are dropped.
const CHANNEL_MATCH_FRACTION: f64 = 0.1;

/// Readings of one sensor eye.
#[derive(Debug, Clone)]
pub struct SensorEye {
    /// Differential number flux [cm⁻² s⁻¹ sr⁻¹ keV⁻¹], `[n_times, n_channels]`.
    pub number_flux: Array2<f64>,
    /// Percent error per sample; absent in older files, treated as zero.
    pub percent_error: Option<Array2<f64>>,
    /// Channel energies [keV] as reported by the file.
    pub energy_kev: Array1<f64>,
}

/// Mean energy flux over `eyes`, scaled by `geometric_factor`.
///
/// `channels_kev` is the corrected channel table. A sample with no eye
/// passing the error check is NaN.
pub fn collapse_omni(
    eyes: &[SensorEye],
    channels_kev: ArrayView1<f64>,
    geometric_factor: f64,
) -> SurveyResult<Array2<f64>> {
    let first = eyes
        .first()
        .ok_or_else(|| SurveyError::shape("omni collapse eyes", "at least 1", 0))?;
    let dim = first.number_flux.dim();
    if dim.1 != channels_kev.len() {
        return Err(SurveyError::shape("omni collapse channels", channels_kev.len(), dim.1));
    }
    for eye in eyes {
        if eye.number_flux.dim() != dim {
            return Err(SurveyError::shape(
                "omni collapse eye flux",
                format!("{dim:?}"),
                format!("{:?}", eye.number_flux.dim()),
            ));
        }
        if let Some(err) = &eye.percent_error {
            if err.dim() != dim {
                return Err(SurveyError::shape(
                    "omni collapse eye error",
                    format!("{dim:?}"),
                    format!("{:?}", err.dim()),
                ));
            }
        }
        if eye.energy_kev.len() != dim.1 {
            return Err(SurveyError::shape(
                "omni collapse eye energies",
                dim.1,
                eye.energy_kev.len(),
            ));
        }
    }

    let mut sum = Array2::<f64>::zeros(dim);
    let mut count = Array2::<f64>::zeros(dim);
    for eye in eyes {
        for ((t, c), &nflux) in eye.number_flux.indexed_iter() {
            let nominal = channels_kev[c];
            if (nominal - eye.energy_kev[c]).abs() > CHANNEL_MATCH_FRACTION * nominal {
                continue;
            }
            let eflux = nflux * nominal;
            let err = match &eye.percent_error {
                Some(pct) => eflux * pct[[t, c]] / 100.0,
                None => 0.0,
            };
            let relative = err / eflux;
            if (0.0..=1.0).contains(&relative) {
                sum[[t, c]] += eflux;
                count[[t, c]] += 1.0;
            }
        }
    }

    Ok(Zip::from(&sum)
        .and(&count)
        .map_collect(|&s, &n| if n > 0.0 { geometric_factor * s / n } else { f64::NAN }))
}

/// FEEPS omni-directional spectrum for one probe and species.
pub fn feeps_omni(
    time: Array1<i64>,
    eyes: &[SensorEye],
    species: Species,
    probe: Probe,
) -> SurveyResult<EnergySpectrum> {
    let channels = feeps_channels_kev(species, probe);
    let flux = collapse_omni(eyes, channels.view(), feeps_geometric_factor(species, probe))?;
    EnergySpectrum::with_channels(time, flux, &channels, Unit::new(FLUX_CM2), Unit::new("keV"))
}
