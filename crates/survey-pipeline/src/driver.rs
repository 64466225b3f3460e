// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Batch Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runs every survey product for a list of intervals on a dedicated
//! worker pool.
//!
//! Each interval yields one fused spectrum per species plus the
//! barycentric curlometer products. A product whose inputs are missing
//! is skipped as `NoData`; a product that fails is recorded as `Failed`.
//! Neither stops the rest of the batch.

use crate::source::IntervalSource;
use crate::store::{ArrayGroup, ArtifactKey, ArtifactStore, StoredArray};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use survey_core::barycenter::{current_density, field_aligned_products};
use survey_core::curlometer::{barycentre, curlometer, TetrahedronObservation};
use survey_core::fusion::fuse_and_integrate;
use survey_math::interp::resample;
use survey_types::config::SurveyConfig;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::instruments::{Instrument, Probe, VectorQuantity};
use survey_types::series::VectorSeries;
use survey_types::species::Species;
use survey_types::units::{Unit, CURRENT_DENSITY};
use tracing::{debug, info, warn};

/// Artifact category of the curlometer products.
pub const BARYCENTER: &str = "barycenter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// Low/high instrument fusion and moments for one species.
    Fusion(Species),
    /// Curlometer current and energy conversion at the barycentre.
    Barycenter,
}

impl Product {
    pub const ALL: [Product; 3] = [
        Product::Fusion(Species::Ion),
        Product::Fusion(Species::Electron),
        Product::Barycenter,
    ];

    pub fn category(&self) -> &'static str {
        match self {
            Product::Fusion(species) => species.tag(),
            Product::Barycenter => BARYCENTER,
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed { arrays: usize },
    NoData { missing: String },
    Failed { error: SurveyError },
}

#[derive(Debug)]
pub struct ProductReport {
    pub interval: usize,
    pub product: Product,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<ProductReport>,
    /// Intervals never started because the batch was cancelled.
    pub cancelled: usize,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Completed { .. }))
    }

    pub fn no_data(&self) -> usize {
        self.count(|o| matches!(o, Outcome::NoData { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    pub fn get(&self, interval: usize, product: Product) -> Option<&Outcome> {
        self.reports
            .iter()
            .find(|r| r.interval == interval && r.product == product)
            .map(|r| &r.outcome)
    }
}

enum Computed {
    Arrays(ArrayGroup),
    Missing(String),
}

pub struct SurveyDriver {
    config: SurveyConfig,
    source: Arc<dyn IntervalSource>,
    store: Arc<dyn ArtifactStore>,
    cancel: Arc<AtomicBool>,
}

impl SurveyDriver {
    pub fn new(
        config: SurveyConfig,
        source: Arc<dyn IntervalSource>,
        store: Arc<dyn ArtifactStore>,
    ) -> SurveyResult<Self> {
        config.validate()?;
        Ok(SurveyDriver {
            config,
            source,
            store,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag shared with the workers; setting it stops intervals that have
    /// not started yet.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run(&self, intervals: &[usize]) -> SurveyResult<BatchReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| SurveyError::ConfigError(format!("worker pool: {e}")))?;

        let per_interval: Vec<Option<Vec<ProductReport>>> = pool.install(|| {
            intervals
                .par_iter()
                .map(|&interval| {
                    if self.cancel.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(self.process_interval(interval))
                    }
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for reports in per_interval {
            match reports {
                Some(r) => report.reports.extend(r),
                None => report.cancelled += 1,
            }
        }
        info!(
            intervals = intervals.len(),
            completed = report.completed(),
            no_data = report.no_data(),
            failed = report.failed(),
            cancelled = report.cancelled,
            "survey batch finished"
        );
        Ok(report)
    }

    fn process_interval(&self, interval: usize) -> Vec<ProductReport> {
        Product::ALL
            .iter()
            .map(|&product| ProductReport {
                interval,
                product,
                outcome: self.run_product(interval, product),
            })
            .collect()
    }

    fn run_product(&self, interval: usize, product: Product) -> Outcome {
        let category = product.category();
        let computed = match product {
            Product::Fusion(species) => self.fusion_artifacts(interval, species),
            Product::Barycenter => self.barycenter_artifacts(interval),
        };
        let group = match computed {
            Ok(Computed::Arrays(group)) => group,
            Ok(Computed::Missing(missing)) => {
                warn!(interval, category, %missing, "skipped: no data");
                return Outcome::NoData { missing };
            }
            Err(error) => {
                warn!(interval, category, %error, "product failed");
                return Outcome::Failed { error };
            }
        };

        let arrays = group.len();
        match self.store.replace_group(&ArtifactKey::new(interval, category), group) {
            Ok(()) => {
                info!(interval, category, arrays, "product written");
                Outcome::Completed { arrays }
            }
            Err(error) => {
                warn!(interval, category, %error, "artifact write failed");
                Outcome::Failed { error }
            }
        }
    }

    fn fusion_artifacts(&self, interval: usize, species: Species) -> SurveyResult<Computed> {
        let probe = self.config.probe;
        let Some(low) = self.source.spectrum(probe, interval, Instrument::Fpi, species)? else {
            return Ok(Computed::Missing(format!("{probe} fpi {species} spectrum")));
        };
        let Some(high) = self.source.spectrum(probe, interval, Instrument::Feeps, species)? else {
            return Ok(Computed::Missing(format!("{probe} feeps {species} spectrum")));
        };

        let product = fuse_and_integrate(&low, &high, species, self.config.fusion_for(species))?;
        let spectrum = product.spectrum;
        let (total, tail) = (product.moments, product.nonthermal);

        let mut group = ArrayGroup::new();
        group.insert("t".into(), StoredArray::time(spectrum.time));
        group.insert("f_omni".into(), StoredArray::float(spectrum.flux, spectrum.flux_unit));
        group.insert(
            "f_omni_energy".into(),
            StoredArray::float(spectrum.energy, spectrum.energy_unit),
        );
        group.insert("N".into(), StoredArray::float(total.density, total.density_unit));
        group.insert("P_scalar".into(), StoredArray::float(total.pressure, total.pressure_unit));
        group.insert("N_nt".into(), StoredArray::float(tail.density, tail.density_unit));
        group.insert("P_scalar_nt".into(), StoredArray::float(tail.pressure, tail.pressure_unit));
        Ok(Computed::Arrays(group))
    }

    /// One series of `quantity` per probe, `None` if any probe lacks it.
    fn quartet(&self, interval: usize, quantity: VectorQuantity) -> SurveyResult<Option<[VectorSeries; 4]>> {
        let mut found = Vec::with_capacity(4);
        for probe in Probe::ALL {
            match self.source.vectors(probe, interval, quantity)? {
                Some(series) => found.push(series),
                None => return Ok(None),
            }
        }
        Ok(found.try_into().ok())
    }

    fn barycenter_artifacts(&self, interval: usize) -> SurveyResult<Computed> {
        let Some(fields) = self.quartet(interval, VectorQuantity::MagneticField)? else {
            return Ok(Computed::Missing("magnetic field on all four probes".into()));
        };
        let Some(positions) = self.quartet(interval, VectorQuantity::Position)? else {
            return Ok(Computed::Missing("position on all four probes".into()));
        };

        let options = &self.config.curlometer;
        let observation = TetrahedronObservation::align(&fields, &positions, options.resampling)?;
        let output = curlometer(&observation, options.degeneracy_tolerance);
        let current = current_density(&output)?;
        let gradient_unit = output.unit();

        let mut group = ArrayGroup::new();
        group.insert("t".into(), StoredArray::time(output.time.clone()));
        group.insert(
            "R_bc".into(),
            StoredArray::float(output.position_bc.clone(), output.position_unit.clone()),
        );
        group.insert(
            "B_bc".into(),
            StoredArray::float(output.field_bc.clone(), output.field_unit.clone()),
        );
        group.insert("curl_B".into(), StoredArray::float(output.curl.clone(), gradient_unit.clone()));
        group.insert("div_B".into(), StoredArray::float(output.div.clone(), gradient_unit));
        group.insert("J_clm_err".into(), StoredArray::float(current.j_err, current.unit.clone()));

        match self.quartet(interval, VectorQuantity::ElectricField)? {
            Some(electric) => {
                // E gradient on the electric field's own grid
                let e_observation = TetrahedronObservation::align(&electric, &positions, options.resampling)?;
                let e_output = curlometer(&e_observation, options.degeneracy_tolerance);
                let e_gradient_unit = e_output.unit();
                group.insert("t_E".into(), StoredArray::time(e_output.time));
                group.insert("curl_E".into(), StoredArray::float(e_output.curl, e_gradient_unit.clone()));
                group.insert("div_E".into(), StoredArray::float(e_output.div, e_gradient_unit));

                let e_unit = e_output.field_unit;
                let aligned: [_; 4] = std::array::from_fn(|i| {
                    let e = &electric[i];
                    resample(e.time.view(), e.values.view(), output.time.view(), options.resampling)
                });
                let e_bc = barycentre(&aligned);
                let products =
                    field_aligned_products(current.j.view(), output.field_bc.view(), e_bc.view(), &e_unit)?;
                group.insert("E_bc".into(), StoredArray::float(e_bc, e_unit));
                group.insert(
                    "J_para".into(),
                    StoredArray::float(products.j_para, Unit::new(CURRENT_DENSITY)),
                );
                group.insert("E_para".into(), StoredArray::float(products.e_para, products.e_unit));
                group.insert("JdE".into(), StoredArray::float(products.jde, products.power_unit.clone()));
                group.insert(
                    "JdE_para".into(),
                    StoredArray::float(products.jde_para, products.power_unit.clone()),
                );
                group.insert("JdE_perp".into(), StoredArray::float(products.jde_perp, products.power_unit));
            }
            None => debug!(interval, "no electric field, E gradient and J·E products omitted"),
        }
        group.insert("J_clm".into(), StoredArray::float(current.j, current.unit));
        Ok(Computed::Arrays(group))
    }
}
