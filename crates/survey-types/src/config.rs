// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    DEFAULT_CUTOFF_ENERGY_EV, DEFAULT_N_EXT, DEGENERACY_TOLERANCE, NOISE_FLOOR_BINS,
    SPIN_AVERAGE_FRACTION, SPIN_PERIOD_S,
};
use crate::error::{SurveyError, SurveyResult};
use crate::instruments::Probe;
use crate::species::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level survey configuration.
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Worker threads of the batch pool.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Probe whose particle instruments feed the spectrum fusion.
    #[serde(default = "default_probe")]
    pub probe: Probe,
    #[serde(default)]
    pub fusion: FusionOptions,
    /// Per-species replacements for `fusion`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub species_overrides: BTreeMap<Species, FusionOptions>,
    #[serde(default)]
    pub curlometer: CurlometerOptions,
}

fn default_workers() -> usize {
    4
}
fn default_probe() -> Probe {
    Probe::Mms1
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            workers: default_workers(),
            probe: default_probe(),
            fusion: FusionOptions::default(),
            species_overrides: BTreeMap::new(),
            curlometer: CurlometerOptions::default(),
        }
    }
}

/// Options of a single spectrum fusion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionOptions {
    /// Mask low-instrument bins below the cutoff / spacecraft potential.
    #[serde(default = "default_true")]
    pub mask_cutoff: bool,
    /// Fixed instrument cutoff [eV].
    #[serde(default = "default_cutoff_energy_ev")]
    pub cutoff_energy_ev: f64,
    /// Subtract the noise floor and drop bins under the background curve.
    #[serde(default)]
    pub bg_remove: bool,
    /// Scale applied to the background plateaus.
    #[serde(default = "default_factor")]
    pub factor: f64,
    /// Number of bridge bins between the two instruments.
    #[serde(default = "default_n_ext")]
    pub n_ext: usize,
    /// Number of lowest fluxes averaged into the noise floor.
    #[serde(default = "default_noise_floor_bins")]
    pub noise_floor_bins: usize,
    /// Pre-smoothing of the high-energy instrument. `null` disables it.
    #[serde(default = "default_spin_average")]
    pub spin_average: Option<SpinAverage>,
}

fn default_true() -> bool {
    true
}
fn default_cutoff_energy_ev() -> f64 {
    DEFAULT_CUTOFF_ENERGY_EV
}
fn default_factor() -> f64 {
    1.0
}
fn default_n_ext() -> usize {
    DEFAULT_N_EXT
}
fn default_noise_floor_bins() -> usize {
    NOISE_FLOOR_BINS
}
fn default_spin_average() -> Option<SpinAverage> {
    Some(SpinAverage::default())
}

impl Default for FusionOptions {
    fn default() -> Self {
        FusionOptions {
            mask_cutoff: default_true(),
            cutoff_energy_ev: default_cutoff_energy_ev(),
            bg_remove: false,
            factor: default_factor(),
            n_ext: default_n_ext(),
            noise_floor_bins: default_noise_floor_bins(),
            spin_average: default_spin_average(),
        }
    }
}

impl FusionOptions {
    /// Plain power-law fusion: no masking, no background removal, no smoothing.
    pub fn raw() -> Self {
        FusionOptions {
            mask_cutoff: false,
            bg_remove: false,
            spin_average: None,
            ..FusionOptions::default()
        }
    }

    pub fn validate(&self) -> SurveyResult<()> {
        if !(self.factor.is_finite() && self.factor > 0.0) {
            return Err(SurveyError::ConfigError(format!(
                "background factor must be finite and > 0, got {}",
                self.factor
            )));
        }
        if !(self.cutoff_energy_ev.is_finite() && self.cutoff_energy_ev >= 0.0) {
            return Err(SurveyError::ConfigError(format!(
                "cutoff energy must be finite and >= 0, got {}",
                self.cutoff_energy_ev
            )));
        }
        if self.noise_floor_bins == 0 {
            return Err(SurveyError::ConfigError(
                "noise floor needs at least one bin".to_string(),
            ));
        }
        if let Some(spin) = &self.spin_average {
            spin.validate()?;
        }
        Ok(())
    }
}

/// Moving-average window shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    #[default]
    Box,
    Gauss,
}

/// Smoothing over a fraction of the spacecraft spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinAverage {
    #[serde(default = "default_spin_period_s")]
    pub spin_period_s: f64,
    #[serde(default = "default_spin_fraction")]
    pub fraction: f64,
    #[serde(default)]
    pub kernel: Kernel,
}

fn default_spin_period_s() -> f64 {
    SPIN_PERIOD_S
}
fn default_spin_fraction() -> f64 {
    SPIN_AVERAGE_FRACTION
}

impl Default for SpinAverage {
    fn default() -> Self {
        SpinAverage {
            spin_period_s: default_spin_period_s(),
            fraction: default_spin_fraction(),
            kernel: Kernel::default(),
        }
    }
}

impl SpinAverage {
    /// Averaging duration [s].
    pub fn duration_s(&self) -> f64 {
        self.fraction * self.spin_period_s
    }

    pub fn validate(&self) -> SurveyResult<()> {
        if !(self.duration_s().is_finite() && self.duration_s() > 0.0) {
            return Err(SurveyError::ConfigError(format!(
                "spin average duration must be > 0, got {} s",
                self.duration_s()
            )));
        }
        Ok(())
    }
}

/// Resampling of a series onto a reference time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    /// Linear interpolation, NaN outside the source range.
    #[default]
    Linear,
    /// Trailing block average over the cadence ratio, then linear interpolation.
    Box,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurlometerOptions {
    #[serde(default)]
    pub resampling: Resampling,
    #[serde(default = "default_degeneracy_tolerance")]
    pub degeneracy_tolerance: f64,
}

fn default_degeneracy_tolerance() -> f64 {
    DEGENERACY_TOLERANCE
}

impl Default for CurlometerOptions {
    fn default() -> Self {
        CurlometerOptions {
            resampling: Resampling::default(),
            degeneracy_tolerance: default_degeneracy_tolerance(),
        }
    }
}

impl SurveyConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> SurveyResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> SurveyResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Fusion options for `species`, honouring overrides.
    pub fn fusion_for(&self, species: Species) -> &FusionOptions {
        self.species_overrides.get(&species).unwrap_or(&self.fusion)
    }

    pub fn validate(&self) -> SurveyResult<()> {
        if self.workers == 0 {
            return Err(SurveyError::ConfigError(
                "workers must be >= 1".to_string(),
            ));
        }
        self.fusion.validate()?;
        for options in self.species_overrides.values() {
            options.validate()?;
        }
        let tol = self.curlometer.degeneracy_tolerance;
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(SurveyError::ConfigError(format!(
                "degeneracy tolerance must be finite and >= 0, got {tol}"
            )));
        }
        Ok(())
    }
}
