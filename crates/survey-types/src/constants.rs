// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Vacuum permeability (H/m), CODATA 2018.
pub const MU0_SI: f64 = 1.25663706212e-6;

/// Elementary charge (C). Also the eV → J factor.
pub const Q_ELEMENTARY: f64 = 1.602176634e-19;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Electron mass (kg)
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Low-energy instrument cutoff below which bins are masked (eV).
pub const DEFAULT_CUTOFF_ENERGY_EV: f64 = 60.0;

/// Number of log-spaced bins bridging the instrumental energy gap.
pub const DEFAULT_N_EXT: usize = 5;

/// Number of lowest fluxes averaged into the per-timestamp noise floor.
pub const NOISE_FLOOR_BINS: usize = 5;

/// Spin period of the spacecraft (s).
pub const SPIN_PERIOD_S: f64 = 19.67;

/// Fraction of a spin used for the high-energy instrument smoothing window.
pub const SPIN_AVERAGE_FRACTION: f64 = 2.0 / 3.0;

/// Relative triple-product threshold below which a tetrahedron is coplanar.
pub const DEGENERACY_TOLERANCE: f64 = 1e-10;

/// Nanoseconds per second.
pub const NS_PER_S: f64 = 1e9;
