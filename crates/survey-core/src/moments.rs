// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Omni Moments
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Density and scalar pressure from an omni-directional energy-flux
//! spectrum F(E) [cm⁻² s⁻¹ sr⁻¹]:
//!
//!   N = 4π √(m/2) ∫ F E^-3/2 dE
//!   P = 4π √(m/2) ∫ F E^-1/2 dE
//!
//! With E in eV the prefactor becomes 4π √(m / 2e); the remaining powers
//! of ten take N to cm⁻³ and P to keV cm⁻³.

use ndarray::{s, Array1, ArrayView1};
use survey_math::quadrature::trapezoid;
use survey_types::constants::Q_ELEMENTARY;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::series::{FusedSpectrum, MomentSet};
use survey_types::species::Species;

/// m⁻² → cm⁻² on F and m⁻³ → cm⁻³ on N.
const DENSITY_SCALE: f64 = 1e4 * 1e-6;
/// As above, plus eV → keV.
const PRESSURE_SCALE: f64 = 1e4 * 1e-6 * 1e-3;

/// 4π √(m / 2e) for energies in eV.
pub fn moment_prefactor(species: Species) -> f64 {
    4.0 * std::f64::consts::PI * (species.mass_kg() / (2.0 * Q_ELEMENTARY)).sqrt()
}

/// `(N [cm⁻³], P [keV cm⁻³])` of one spectrum row.
///
/// `energy_ev` must already include the spacecraft-potential correction.
/// NaN flux and non-positive energies contribute zero.
pub fn omni_moments(energy_ev: ArrayView1<f64>, flux_cm2: ArrayView1<f64>, species: Species) -> (f64, f64) {
    let mut density_integrand = Array1::zeros(energy_ev.len());
    let mut pressure_integrand = Array1::zeros(energy_ev.len());
    for (i, (&e, &f)) in energy_ev.iter().zip(flux_cm2.iter()).enumerate() {
        if f.is_finite() && e > 0.0 {
            density_integrand[i] = f * e.powf(-1.5);
            pressure_integrand[i] = f * e.powf(-0.5);
        }
    }
    let c = moment_prefactor(species);
    (
        c * DENSITY_SCALE * trapezoid(density_integrand.view(), energy_ev),
        c * PRESSURE_SCALE * trapezoid(pressure_integrand.view(), energy_ev),
    )
}

/// Integrate the fused spectrum from column `start` to the end.
///
/// Energies are shifted by `charge_sign · V_sc` when a potential is given;
/// a non-finite potential sample gives NaN moments for that row.
pub fn integrate_moments(
    spectrum: &FusedSpectrum,
    species: Species,
    sc_potential: Option<&Array1<f64>>,
    start: usize,
) -> SurveyResult<MomentSet> {
    let to_ev = spectrum.energy_unit.energy_scale_ev()?;
    let to_cm2 = spectrum.flux_unit.flux_scale_cm2()?;
    let n = spectrum.time.len();
    if let Some(v) = sc_potential {
        if v.len() != n {
            return Err(SurveyError::shape("moment spacecraft potential", n, v.len()));
        }
    }
    let start = start.min(spectrum.n_energies());

    let mut density = Array1::from_elem(n, f64::NAN);
    let mut pressure = Array1::from_elem(n, f64::NAN);
    for t in 0..n {
        let shift = match sc_potential {
            Some(v) if !v[t].is_finite() => continue,
            Some(v) => species.charge_sign() * v[t],
            None => 0.0,
        };
        let energy = spectrum.energy.row(t);
        let flux = spectrum.flux.row(t);
        let energy_ev = energy.slice(s![start..]).mapv(|e| e * to_ev + shift);
        let flux_cm2 = flux.slice(s![start..]).mapv(|f| f * to_cm2);
        let (nt, pt) = omni_moments(energy_ev.view(), flux_cm2.view(), species);
        density[t] = nt;
        pressure[t] = pt;
    }
    Ok(MomentSet::new(spectrum.time.clone(), density, pressure))
}
