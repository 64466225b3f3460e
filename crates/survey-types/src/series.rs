// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Series
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Time-stamped arrays exchanged between loaders, estimators and storage.
//!
//! Timestamps are nanoseconds (`i64`) and must be strictly increasing.
//! Energy spectra are stored `[n_times, n_energies]`, row = timestamp.

use crate::error::{SurveyError, SurveyResult};
use crate::units::{Unit, DENSITY, PRESSURE};
use ndarray::{Array1, Array2};

/// Check that `time` is strictly increasing.
pub fn check_monotonic(time: &Array1<i64>) -> SurveyResult<()> {
    for i in 1..time.len() {
        if time[i] <= time[i - 1] {
            return Err(SurveyError::NonMonotonicTime { index: i });
        }
    }
    Ok(())
}

/// 3-component vector time series (field or position).
#[derive(Debug, Clone)]
pub struct VectorSeries {
    pub time: Array1<i64>,
    pub values: Array2<f64>, // [n, 3]
    pub unit: Unit,
}

impl VectorSeries {
    pub fn new(time: Array1<i64>, values: Array2<f64>, unit: Unit) -> SurveyResult<Self> {
        if values.ncols() != 3 {
            return Err(SurveyError::shape(
                "vector series columns",
                3,
                values.ncols(),
            ));
        }
        if values.nrows() != time.len() {
            return Err(SurveyError::shape(
                "vector series rows",
                time.len(),
                values.nrows(),
            ));
        }
        check_monotonic(&time)?;
        Ok(VectorSeries { time, values, unit })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Omni-directional energy-flux spectrum of one instrument and species.
#[derive(Debug, Clone)]
pub struct EnergySpectrum {
    pub time: Array1<i64>,
    pub flux: Array2<f64>,   // [n_times, n_energies]
    pub energy: Array2<f64>, // [n_times, n_energies]
    pub flux_unit: Unit,
    pub energy_unit: Unit,
    /// Spacecraft floating potential [V], one value per timestamp.
    pub sc_potential: Option<Array1<f64>>,
}

impl EnergySpectrum {
    pub fn new(
        time: Array1<i64>,
        flux: Array2<f64>,
        energy: Array2<f64>,
        flux_unit: Unit,
        energy_unit: Unit,
    ) -> SurveyResult<Self> {
        if flux.dim() != energy.dim() {
            return Err(SurveyError::shape(
                "spectrum energy table",
                format!("{:?}", flux.dim()),
                format!("{:?}", energy.dim()),
            ));
        }
        if flux.nrows() != time.len() {
            return Err(SurveyError::shape(
                "spectrum rows",
                time.len(),
                flux.nrows(),
            ));
        }
        check_monotonic(&time)?;
        Ok(EnergySpectrum {
            time,
            flux,
            energy,
            flux_unit,
            energy_unit,
            sc_potential: None,
        })
    }

    /// Spectrum whose channel table does not change in time.
    pub fn with_channels(
        time: Array1<i64>,
        flux: Array2<f64>,
        channels: &Array1<f64>,
        flux_unit: Unit,
        energy_unit: Unit,
    ) -> SurveyResult<Self> {
        if flux.ncols() != channels.len() {
            return Err(SurveyError::shape(
                "spectrum channel table",
                flux.ncols(),
                channels.len(),
            ));
        }
        let energy = tile_rows(channels, flux.nrows());
        Self::new(time, flux, energy, flux_unit, energy_unit)
    }

    /// Attach the spacecraft potential [V].
    pub fn with_sc_potential(mut self, potential: Array1<f64>) -> SurveyResult<Self> {
        if potential.len() != self.time.len() {
            return Err(SurveyError::shape(
                "spacecraft potential",
                self.time.len(),
                potential.len(),
            ));
        }
        self.sc_potential = Some(potential);
        Ok(self)
    }

    pub fn n_times(&self) -> usize {
        self.flux.nrows()
    }

    pub fn n_energies(&self) -> usize {
        self.flux.ncols()
    }

    /// True when every row of the energy table equals the first one.
    pub fn has_fixed_channels(&self) -> bool {
        match self.energy.outer_iter().next() {
            None => true,
            Some(first) => self.energy.outer_iter().all(|row| row == first),
        }
    }
}

/// Repeat `row` `n` times along a new leading axis.
pub fn tile_rows(row: &Array1<f64>, n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, row.len()), |(_, j)| row[j])
}

/// Low ‖ bridge ‖ high spectrum on the low instrument's time grid.
#[derive(Debug, Clone)]
pub struct FusedSpectrum {
    pub time: Array1<i64>,
    pub flux: Array2<f64>,
    pub energy: Array2<f64>,
    pub flux_unit: Unit,
    pub energy_unit: Unit,
    pub n_low: usize,
    pub n_bridge: usize,
    pub n_high: usize,
}

impl FusedSpectrum {
    /// First column of the bridge segment.
    pub fn bridge_start(&self) -> usize {
        self.n_low
    }

    /// First column integrated into the non-thermal moments: one past the
    /// last low-instrument column, or the first high column without a bridge.
    pub fn nonthermal_start(&self) -> usize {
        self.n_low + self.n_bridge.min(1)
    }

    pub fn n_energies(&self) -> usize {
        self.n_low + self.n_bridge + self.n_high
    }
}

/// Density and scalar pressure per timestamp.
#[derive(Debug, Clone)]
pub struct MomentSet {
    pub time: Array1<i64>,
    pub density: Array1<f64>,
    pub pressure: Array1<f64>,
    pub density_unit: Unit,
    pub pressure_unit: Unit,
}

impl MomentSet {
    pub fn new(time: Array1<i64>, density: Array1<f64>, pressure: Array1<f64>) -> Self {
        MomentSet {
            time,
            density,
            pressure,
            density_unit: Unit::new(DENSITY),
            pressure_unit: Unit::new(PRESSURE),
        }
    }
}
