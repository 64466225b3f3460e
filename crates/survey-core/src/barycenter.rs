// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Barycentric Current Products
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Current density from the curlometer and its field-aligned split.
//!
//! J = curl(B) / μ0, with div(B) / μ0 kept as the error proxy.
//! J·E is reported in nW m⁻³ with J in nA m⁻² and E in V m⁻¹.

use crate::curlometer::CurlometerOutput;
use ndarray::{Array1, Array2, ArrayView2};
use survey_math::linalg::{dot, norm, row, scale};
use survey_types::constants::MU0_SI;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::units::{Unit, CURRENT_DENSITY, POWER_DENSITY};

/// nA per A.
const NANO: f64 = 1e9;

#[derive(Debug, Clone)]
pub struct CurrentDensity {
    pub time: Array1<i64>,
    pub j: Array2<f64>,
    pub j_err: Array1<f64>,
    pub unit: Unit,
}

/// Curlometer current density in nA m⁻².
///
/// The field unit must be magnetic and the position unit a length.
pub fn current_density(output: &CurlometerOutput) -> SurveyResult<CurrentDensity> {
    let b_scale = output.field_unit.magnetic_scale_t()?;
    let l_scale = output.position_unit.length_scale_m()?;
    let factor = b_scale / l_scale / MU0_SI * NANO;
    Ok(CurrentDensity {
        time: output.time.clone(),
        j: output.curl.mapv(|c| c * factor),
        j_err: output.div.mapv(|d| d * factor),
        unit: Unit::new(CURRENT_DENSITY),
    })
}

/// Parallel components and energy conversion rates at the barycentre.
#[derive(Debug, Clone)]
pub struct FieldAlignedProducts {
    /// J·b̂ [nA m⁻²]
    pub j_para: Array1<f64>,
    /// E·b̂ in the electric field's unit
    pub e_para: Array1<f64>,
    pub jde: Array1<f64>,
    pub jde_para: Array1<f64>,
    pub jde_perp: Array1<f64>,
    pub e_unit: Unit,
    pub power_unit: Unit,
}

/// Split `J·E` into field-aligned and perpendicular parts.
///
/// `j` is in nA m⁻², `b` in any unit, `e` in `e_unit`. Rows where |B| is
/// zero or non-finite give NaN.
pub fn field_aligned_products<'a>(
    j: ArrayView2<'a, f64>,
    b: ArrayView2<'a, f64>,
    e: ArrayView2<'a, f64>,
    e_unit: &Unit,
) -> SurveyResult<FieldAlignedProducts> {
    let n = j.nrows();
    for (name, values) in [("current", &j), ("magnetic field", &b), ("electric field", &e)] {
        if values.dim() != (n, 3) {
            return Err(SurveyError::shape(
                &format!("field-aligned {name}"),
                format!("({n}, 3)"),
                format!("{:?}", values.dim()),
            ));
        }
    }
    let e_scale = e_unit.electric_scale_v_per_m()?;

    let mut j_para = Array1::from_elem(n, f64::NAN);
    let mut e_para = Array1::from_elem(n, f64::NAN);
    let mut jde = Array1::from_elem(n, f64::NAN);
    let mut jde_para = Array1::from_elem(n, f64::NAN);

    for t in 0..n {
        let (jt, bt, et) = (row(&j, t), row(&b, t), row(&e, t));
        jde[t] = dot(jt, et) * e_scale;
        let b_mag = norm(bt);
        if !(b_mag.is_finite() && b_mag > 0.0) {
            continue;
        }
        let b_hat = scale(bt, 1.0 / b_mag);
        j_para[t] = dot(jt, b_hat);
        e_para[t] = dot(et, b_hat);
        jde_para[t] = j_para[t] * e_para[t] * e_scale;
    }
    let jde_perp = &jde - &jde_para;

    Ok(FieldAlignedProducts {
        j_para,
        e_para,
        jde,
        jde_para,
        jde_perp,
        e_unit: e_unit.clone(),
        power_unit: Unit::new(POWER_DENSITY),
    })
}
