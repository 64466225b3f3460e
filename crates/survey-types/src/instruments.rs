// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Instrument Tables
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Probes, instruments and the static FEEPS channel tables.

use crate::species::Species;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Probe {
    Mms1,
    Mms2,
    Mms3,
    Mms4,
}

impl Probe {
    pub const ALL: [Probe; 4] = [Probe::Mms1, Probe::Mms2, Probe::Mms3, Probe::Mms4];

    pub fn index(&self) -> usize {
        match self {
            Probe::Mms1 => 0,
            Probe::Mms2 => 1,
            Probe::Mms3 => 2,
            Probe::Mms4 => 3,
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mms{}", self.index() + 1)
    }
}

/// Spectrum-producing instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Low-energy, high-cadence plasma analyser.
    Fpi,
    /// High-energy, low-cadence energetic particle detector.
    Feeps,
}

/// Vector quantities consumed by the curlometer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorQuantity {
    #[serde(rename = "B")]
    MagneticField,
    #[serde(rename = "E")]
    ElectricField,
    #[serde(rename = "R")]
    Position,
}

const FEEPS_ION_CHANNELS_KEV: [f64; 14] = [
    76.8, 95.4, 114.1, 133.0, 153.7, 177.6, 205.1, 236.7, 273.2, 315.4, 363.8, 419.7, 484.2, 558.6,
];

const FEEPS_ELECTRON_CHANNELS_KEV: [f64; 14] = [
    51.9, 70.6, 89.4, 107.1, 125.2, 146.5, 171.3, 200.2, 234.0, 273.4, 319.4, 373.2, 436.0, 509.2,
];

/// Per-probe channel energy correction (keV), indexed by probe.
const FEEPS_ELECTRON_CORRECTION_KEV: [f64; 4] = [14.0, -1.0, -3.0, -3.0];

const FEEPS_ION_GEOMETRIC_FACTOR: [f64; 4] = [0.84, 1.0, 1.0, 1.0];

/// Corrected FEEPS channel centre energies (keV) for a species and probe.
pub fn feeps_channels_kev(species: Species, probe: Probe) -> Array1<f64> {
    match species {
        Species::Ion => Array1::from(FEEPS_ION_CHANNELS_KEV.to_vec()),
        Species::Electron => {
            let offset = FEEPS_ELECTRON_CORRECTION_KEV[probe.index()];
            FEEPS_ELECTRON_CHANNELS_KEV.iter().map(|e| e + offset).collect()
        }
    }
}

/// FEEPS geometric-factor correction applied after the omni collapse.
pub fn feeps_geometric_factor(species: Species, probe: Probe) -> f64 {
    match species {
        Species::Ion => FEEPS_ION_GEOMETRIC_FACTOR[probe.index()],
        Species::Electron => 1.0,
    }
}
