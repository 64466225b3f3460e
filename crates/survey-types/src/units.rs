// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Units
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Physical-unit labels attached to every array crossing a crate boundary.
//!
//! Labels compare by their whitespace-normalised text. Only the handful of
//! conversions the estimators need are known; anything else is carried
//! through untouched and only fails when a conversion is requested.

use crate::constants::Q_ELEMENTARY;
use crate::error::{SurveyError, SurveyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical flux label of an omni-directional energy-flux spectrum.
pub const FLUX_CM2: &str = "cm-2 s-1 sr-1";
/// Number density label of integrated moments.
pub const DENSITY: &str = "cm-3";
/// Scalar pressure label of integrated moments.
pub const PRESSURE: &str = "keV cm-3";
/// Current density label of curlometer products.
pub const CURRENT_DENSITY: &str = "nA m-2";
/// Power density label of J·E products.
pub const POWER_DENSITY: &str = "nW m-3";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Unit(String);

impl Unit {
    pub fn new(label: &str) -> Self {
        Unit(label.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quotient label, e.g. `nT / km`.
    pub fn per(&self, denominator: &Unit) -> Unit {
        Unit(format!("{} / {}", self.0, denominator.0))
    }

    /// Fail with `UnitMismatch` unless both labels agree.
    pub fn ensure_same(&self, other: &Unit, context: &str) -> SurveyResult<()> {
        if self == other {
            Ok(())
        } else {
            Err(SurveyError::UnitMismatch {
                context: context.to_string(),
                left: self.0.clone(),
                right: other.0.clone(),
            })
        }
    }

    /// Multiplier taking a value in this unit to electron-volts.
    pub fn energy_scale_ev(&self) -> SurveyResult<f64> {
        match self.0.as_str() {
            "eV" => Ok(1.0),
            "keV" => Ok(1e3),
            "MeV" => Ok(1e6),
            "J" => Ok(1.0 / Q_ELEMENTARY),
            _ => Err(self.unsupported("energy")),
        }
    }

    /// Multiplier taking a value in this unit to cm-2 s-1 sr-1.
    pub fn flux_scale_cm2(&self) -> SurveyResult<f64> {
        match self.0.as_str() {
            "cm-2 s-1 sr-1" | "1 / (cm2 s sr)" => Ok(1.0),
            "m-2 s-1 sr-1" | "1 / (m2 s sr)" => Ok(1e-4),
            _ => Err(self.unsupported("energy flux")),
        }
    }

    /// Multiplier taking a value in this unit to tesla.
    pub fn magnetic_scale_t(&self) -> SurveyResult<f64> {
        match self.0.as_str() {
            "T" => Ok(1.0),
            "nT" => Ok(1e-9),
            _ => Err(self.unsupported("magnetic field")),
        }
    }

    /// Multiplier taking a value in this unit to metres.
    pub fn length_scale_m(&self) -> SurveyResult<f64> {
        match self.0.as_str() {
            "m" => Ok(1.0),
            "km" => Ok(1e3),
            "cm" => Ok(1e-2),
            _ => Err(self.unsupported("length")),
        }
    }

    /// Multiplier taking a value in this unit to V/m.
    pub fn electric_scale_v_per_m(&self) -> SurveyResult<f64> {
        match self.0.as_str() {
            "V/m" | "V m-1" => Ok(1.0),
            "mV/m" | "mV m-1" => Ok(1e-3),
            _ => Err(self.unsupported("electric field")),
        }
    }

    fn unsupported(&self, quantity: &str) -> SurveyError {
        SurveyError::UnsupportedUnit {
            unit: self.0.clone(),
            quantity: quantity.to_string(),
        }
    }
}

impl From<String> for Unit {
    fn from(label: String) -> Self {
        Unit::new(&label)
    }
}

impl From<&str> for Unit {
    fn from(label: &str) -> Self {
        Unit::new(label)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.0
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_normalisation() {
        assert_eq!(Unit::new("cm-2  s-1 sr-1"), Unit::new(FLUX_CM2));
        assert_eq!(Unit::new(" keV ").as_str(), "keV");
    }

    #[test]
    fn test_quotient_label() {
        let u = Unit::new("nT").per(&Unit::new("km"));
        assert_eq!(u.as_str(), "nT / km");
    }

    #[test]
    fn test_mismatch_is_error() {
        let err = Unit::new("eV")
            .ensure_same(&Unit::new("keV"), "energy")
            .unwrap_err();
        match err {
            SurveyError::UnitMismatch { left, right, .. } => {
                assert_eq!(left, "eV");
                assert_eq!(right, "keV");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scales() {
        assert!((Unit::new("keV").energy_scale_ev().unwrap() - 1e3).abs() < 1e-12);
        assert!((Unit::new("m-2 s-1 sr-1").flux_scale_cm2().unwrap() - 1e-4).abs() < 1e-18);
        assert!((Unit::new("nT").magnetic_scale_t().unwrap() - 1e-9).abs() < 1e-24);
        assert!((Unit::new("km").length_scale_m().unwrap() - 1e3).abs() < 1e-12);
        assert!((Unit::new("mV/m").electric_scale_v_per_m().unwrap() - 1e-3).abs() < 1e-15);
        assert!(Unit::new("furlong").length_scale_m().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Unit::new("nT")).unwrap();
        assert_eq!(json, "\"nT\"");
        let back: Unit = serde_json::from_str("\"keV  cm-3\"").unwrap();
        assert_eq!(back.as_str(), PRESSURE);
    }
}
