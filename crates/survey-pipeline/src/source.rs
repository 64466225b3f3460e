// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Interval Sources
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Input side of the survey. `Ok(None)` means the instrument has no
//! recording for that interval; `Err` means the recording is unusable.

use std::collections::HashMap;
use survey_types::error::SurveyResult;
use survey_types::instruments::{Instrument, Probe, VectorQuantity};
use survey_types::series::{EnergySpectrum, VectorSeries};
use survey_types::species::Species;

pub trait IntervalSource: Send + Sync {
    fn spectrum(
        &self,
        probe: Probe,
        interval: usize,
        instrument: Instrument,
        species: Species,
    ) -> SurveyResult<Option<EnergySpectrum>>;

    fn vectors(
        &self,
        probe: Probe,
        interval: usize,
        quantity: VectorQuantity,
    ) -> SurveyResult<Option<VectorSeries>>;
}

type SpectrumKey = (Probe, usize, Instrument, Species);
type VectorKey = (Probe, usize, VectorQuantity);

/// Preloaded recordings held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    spectra: HashMap<SpectrumKey, EnergySpectrum>,
    vectors: HashMap<VectorKey, VectorSeries>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_spectrum(
        &mut self,
        probe: Probe,
        interval: usize,
        instrument: Instrument,
        species: Species,
        spectrum: EnergySpectrum,
    ) -> &mut Self {
        self.spectra
            .insert((probe, interval, instrument, species), spectrum);
        self
    }

    pub fn insert_vectors(
        &mut self,
        probe: Probe,
        interval: usize,
        quantity: VectorQuantity,
        series: VectorSeries,
    ) -> &mut Self {
        self.vectors.insert((probe, interval, quantity), series);
        self
    }
}

impl IntervalSource for MemorySource {
    fn spectrum(
        &self,
        probe: Probe,
        interval: usize,
        instrument: Instrument,
        species: Species,
    ) -> SurveyResult<Option<EnergySpectrum>> {
        Ok(self
            .spectra
            .get(&(probe, interval, instrument, species))
            .cloned())
    }

    fn vectors(
        &self,
        probe: Probe,
        interval: usize,
        quantity: VectorQuantity,
    ) -> SurveyResult<Option<VectorSeries>> {
        Ok(self.vectors.get(&(probe, interval, quantity)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use survey_types::units::Unit;

    #[test]
    fn test_missing_recording_is_none() {
        let mut source = MemorySource::new();
        let b = VectorSeries::new(Array1::from_iter(0..3), Array2::zeros((3, 3)), Unit::new("nT")).unwrap();
        source.insert_vectors(Probe::Mms2, 4, VectorQuantity::MagneticField, b);

        assert!(source
            .vectors(Probe::Mms2, 4, VectorQuantity::MagneticField)
            .unwrap()
            .is_some());
        assert!(source
            .vectors(Probe::Mms2, 5, VectorQuantity::MagneticField)
            .unwrap()
            .is_none());
        assert!(source
            .vectors(Probe::Mms1, 4, VectorQuantity::MagneticField)
            .unwrap()
            .is_none());
        assert!(source
            .spectrum(Probe::Mms2, 4, Instrument::Fpi, Species::Ion)
            .unwrap()
            .is_none());
    }
}
