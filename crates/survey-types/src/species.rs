// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Species
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Particle species and their static calibration tables.

use crate::constants::{M_ELECTRON, M_PROTON, Q_ELEMENTARY};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "ion")]
    Ion,
    #[serde(rename = "elc")]
    Electron,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Ion, Species::Electron];

    /// Short tag used in artifact keys.
    pub fn tag(&self) -> &'static str {
        match self {
            Species::Ion => "ion",
            Species::Electron => "elc",
        }
    }

    pub fn mass_kg(&self) -> f64 {
        match self {
            Species::Ion => M_PROTON,
            Species::Electron => M_ELECTRON,
        }
    }

    /// +1 for ions, -1 for electrons.
    pub fn charge_sign(&self) -> f64 {
        match self {
            Species::Ion => 1.0,
            Species::Electron => -1.0,
        }
    }

    pub fn charge_c(&self) -> f64 {
        self.charge_sign() * Q_ELEMENTARY
    }

    pub fn background(&self) -> &'static BackgroundTable {
        match self {
            Species::Ion => &ION_BACKGROUND,
            Species::Electron => &ELECTRON_BACKGROUND,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Empirical penetrating-background level of the low-energy instrument,
/// in cm-2 s-1 sr-1, piecewise constant in energy (keV).
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundTable {
    /// Energy gap `[lower, upper]` (keV) separating the two plateaus.
    pub gap_kev: [f64; 2],
    /// Plateau levels below the lower and above the upper gap edge.
    pub levels: [f64; 2],
    /// Level inside the gap. Never scaled.
    pub gap_level: f64,
    /// Optional band `[lower_kev, gap_kev[0]]` overriding the low plateau.
    pub low_band: Option<LowBand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LowBand {
    pub lower_kev: f64,
    pub level: f64,
}

pub static ION_BACKGROUND: BackgroundTable = BackgroundTable {
    gap_kev: [28.3, 76.8],
    levels: [3e4, 4e3],
    gap_level: 1e-4,
    low_band: None,
};

pub static ELECTRON_BACKGROUND: BackgroundTable = BackgroundTable {
    gap_kev: [27.5, 65.9],
    levels: [6e5, 8e2],
    gap_level: 1e-4,
    low_band: Some(LowBand {
        lower_kev: 0.7,
        level: 1e5,
    }),
};

impl BackgroundTable {
    /// Background level at `energy_kev`, plateaus scaled by `factor`.
    pub fn level(&self, energy_kev: f64, factor: f64) -> f64 {
        let [lower, upper] = self.gap_kev;
        if let Some(band) = &self.low_band {
            if band.lower_kev <= energy_kev && energy_kev <= lower {
                return factor * band.level;
            }
        }
        if energy_kev <= lower {
            factor * self.levels[0]
        } else if energy_kev >= upper {
            factor * self.levels[1]
        } else {
            self.gap_level
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ion_plateaus() {
        let bg = Species::Ion.background();
        assert_eq!(bg.level(1.0, 1.0), 3e4);
        assert_eq!(bg.level(28.3, 1.0), 3e4);
        assert_eq!(bg.level(50.0, 1.0), 1e-4);
        assert_eq!(bg.level(76.8, 0.8), 0.8 * 4e3);
    }

    #[test]
    fn test_electron_low_band() {
        let bg = Species::Electron.background();
        assert_eq!(bg.level(0.5, 1.0), 6e5);
        assert_eq!(bg.level(0.7, 2.0), 2e5);
        assert_eq!(bg.level(10.0, 1.0), 1e5);
        assert_eq!(bg.level(40.0, 2.0), 1e-4);
        assert_eq!(bg.level(100.0, 1.0), 8e2);
    }

    #[test]
    fn test_charge_and_mass() {
        assert_eq!(Species::Ion.charge_sign(), 1.0);
        assert_eq!(Species::Electron.charge_sign(), -1.0);
        assert!(Species::Ion.mass_kg() > 1800.0 * Species::Electron.mass_kg());
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(serde_json::to_string(&Species::Electron).unwrap(), "\"elc\"");
        let s: Species = serde_json::from_str("\"ion\"").unwrap();
        assert_eq!(s, Species::Ion);
    }
}
