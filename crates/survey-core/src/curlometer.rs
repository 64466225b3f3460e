// ─────────────────────────────────────────────────────────────────────
// Magnetotail Survey — Curlometer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Four-point divergence and curl estimate (reciprocal vectors).
//!
//! Edges are taken from vertex 1: `dR1j = Rj - R1`, j = 2, 3, 4.
//! For each edge j with the remaining two edges `a < b`:
//!   k_j = (dR1a × dR1b) / (dR1j · (dR1a × dR1b))
//!   k_1 = -(k_2 + k_3 + k_4)
//! and then
//!   div Q  = Σ k_i · Q_i
//!   curl Q = Σ k_i × Q_i

use ndarray::{Array1, Array2};
use survey_math::interp::resample;
use survey_math::linalg::{add, cross, dot, is_finite, norm, row, scale, set_row, sub, triple, Vec3};
use survey_types::config::Resampling;
use survey_types::error::{SurveyError, SurveyResult};
use survey_types::series::{check_monotonic, VectorSeries};
use survey_types::units::Unit;
use tracing::debug;

/// One spacecraft at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub field: Vec3,
    pub position: Vec3,
}

/// Reciprocal vectors `k_1..k_4` of a tetrahedron.
///
/// Returns `None` when the tetrahedron is degenerate: the edge triple
/// product is within `tolerance · |dR12||dR13||dR14|` of zero (coplanar,
/// collinear or coincident spacecraft).
pub fn reciprocal_vectors(positions: &[Vec3; 4], tolerance: f64) -> Option<[Vec3; 4]> {
    let edges = [
        sub(positions[1], positions[0]),
        sub(positions[2], positions[0]),
        sub(positions[3], positions[0]),
    ];
    let volume = triple(edges[0], edges[1], edges[2]);
    let edge_product = norm(edges[0]) * norm(edges[1]) * norm(edges[2]);
    if volume.abs() <= tolerance * edge_product {
        return None;
    }

    let mut k = [[0.0; 3]; 4];
    for j in 0..3 {
        let (a, b) = match j {
            0 => (1, 2),
            1 => (0, 2),
            _ => (0, 1),
        };
        let normal = cross(edges[a], edges[b]);
        k[j + 1] = scale(normal, 1.0 / dot(edges[j], normal));
    }
    k[0] = scale(add(add(k[1], k[2]), k[3]), -1.0);
    Some(k)
}

/// Four field and four position series on one timestamp grid.
#[derive(Debug, Clone)]
pub struct TetrahedronObservation {
    pub time: Array1<i64>,
    pub fields: [Array2<f64>; 4],    // [n, 3] each
    pub positions: [Array2<f64>; 4], // [n, 3] each
    pub field_unit: Unit,
    pub position_unit: Unit,
}

impl TetrahedronObservation {
    pub fn new(
        time: Array1<i64>,
        fields: [Array2<f64>; 4],
        positions: [Array2<f64>; 4],
        field_unit: Unit,
        position_unit: Unit,
    ) -> SurveyResult<Self> {
        let n = time.len();
        for (i, values) in fields.iter().chain(positions.iter()).enumerate() {
            if values.dim() != (n, 3) {
                let context = if i < 4 {
                    format!("curlometer field {}", i + 1)
                } else {
                    format!("curlometer position {}", i - 3)
                };
                return Err(SurveyError::shape(
                    &context,
                    format!("({n}, 3)"),
                    format!("{:?}", values.dim()),
                ));
            }
        }
        check_monotonic(&time)?;
        Ok(TetrahedronObservation {
            time,
            fields,
            positions,
            field_unit,
            position_unit,
        })
    }

    /// Resample every series onto the first field series' timestamps.
    ///
    /// All fields must share one unit and all positions another.
    pub fn align(
        fields: &[VectorSeries; 4],
        positions: &[VectorSeries; 4],
        mode: Resampling,
    ) -> SurveyResult<Self> {
        for i in 1..4 {
            fields[i]
                .unit
                .ensure_same(&fields[0].unit, "curlometer field group")?;
            positions[i]
                .unit
                .ensure_same(&positions[0].unit, "curlometer position group")?;
        }
        let time = fields[0].time.clone();
        let onto = |s: &VectorSeries| resample(s.time.view(), s.values.view(), time.view(), mode);
        let aligned_fields = std::array::from_fn(|i| onto(&fields[i]));
        let aligned_positions = std::array::from_fn(|i| onto(&positions[i]));
        Self::new(
            time,
            aligned_fields,
            aligned_positions,
            fields[0].unit.clone(),
            positions[0].unit.clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The four spacecraft at sample `t`.
    pub fn vertices(&self, t: usize) -> [Vertex; 4] {
        std::array::from_fn(|i| Vertex {
            field: row(&self.fields[i].view(), t),
            position: row(&self.positions[i].view(), t),
        })
    }
}

/// Mean over the four spacecraft, row by row.
pub fn barycentre(values: &[Array2<f64>; 4]) -> Array2<f64> {
    let mut sum = values[0].clone();
    for v in &values[1..] {
        sum += v;
    }
    sum * 0.25
}

#[derive(Debug, Clone)]
pub struct CurlometerOutput {
    pub time: Array1<i64>,
    pub div: Array1<f64>,
    pub curl: Array2<f64>,
    /// True where the tetrahedron was too flat to estimate a gradient.
    pub degenerate: Array1<bool>,
    pub field_bc: Array2<f64>,
    pub position_bc: Array2<f64>,
    pub field_unit: Unit,
    pub position_unit: Unit,
}

impl CurlometerOutput {
    /// Unit of `div` and `curl`.
    pub fn unit(&self) -> Unit {
        self.field_unit.per(&self.position_unit)
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate.iter().filter(|d| **d).count()
    }

    /// Error on the first degenerate sample.
    pub fn ensure_non_degenerate(&self) -> SurveyResult<()> {
        match self.degenerate.iter().position(|d| *d) {
            Some(index) => Err(SurveyError::DegenerateTetrahedron { index }),
            None => Ok(()),
        }
    }
}

/// Divergence and curl of a single tetrahedron, or `None` if degenerate.
///
/// Non-finite fields or positions give NaN components.
pub fn estimate(vertices: &[Vertex; 4], tolerance: f64) -> Option<(f64, Vec3)> {
    let positions: [Vec3; 4] = std::array::from_fn(|i| vertices[i].position);
    if !positions.iter().all(|p| is_finite(*p)) {
        return Some((f64::NAN, [f64::NAN; 3]));
    }
    let k = reciprocal_vectors(&positions, tolerance)?;
    let mut div = 0.0;
    let mut curl = [0.0; 3];
    for (ki, vertex) in k.iter().zip(vertices.iter()) {
        div += dot(*ki, vertex.field);
        curl = add(curl, cross(*ki, vertex.field));
    }
    Some((div, curl))
}

/// Run the estimator at every sample of `observation`.
pub fn curlometer(observation: &TetrahedronObservation, tolerance: f64) -> CurlometerOutput {
    let n = observation.len();
    let mut div = Array1::from_elem(n, f64::NAN);
    let mut curl = Array2::from_elem((n, 3), f64::NAN);
    let mut degenerate = Array1::from_elem(n, false);

    for t in 0..n {
        match estimate(&observation.vertices(t), tolerance) {
            Some((d, c)) => {
                div[t] = d;
                set_row(&mut curl.view_mut(), t, c);
            }
            None => degenerate[t] = true,
        }
    }

    let output = CurlometerOutput {
        time: observation.time.clone(),
        div,
        curl,
        degenerate,
        field_bc: barycentre(&observation.fields),
        position_bc: barycentre(&observation.positions),
        field_unit: observation.field_unit.clone(),
        position_unit: observation.position_unit.clone(),
    };
    let flagged = output.degenerate_count();
    if flagged > 0 {
        debug!(samples = n, degenerate = flagged, "curlometer: flat tetrahedra flagged");
    }
    output
}
