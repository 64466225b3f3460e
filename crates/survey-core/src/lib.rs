//! Gradient estimation and particle-spectrum fusion.
//!
//! Curlometer: curlometer, barycenter
//! Spectra: omni, spectrum, extrapolate, moments, fusion

pub mod barycenter;
pub mod curlometer;
pub mod extrapolate;
pub mod fusion;
pub mod moments;
pub mod omni;
pub mod spectrum;
