//! Fixed-size 3-vector algebra.
//!
//! Rows of `[n, 3]` arrays are copied into `[f64; 3]` so per-timestamp
//! estimators stay allocation-free.

use ndarray::{ArrayView2, ArrayViewMut2};

pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Scalar triple product `a · (b × c)`.
#[inline]
pub fn triple(a: Vec3, b: Vec3, c: Vec3) -> f64 {
    dot(a, cross(b, c))
}

pub fn is_finite(a: Vec3) -> bool {
    a.iter().all(|v| v.is_finite())
}

/// Row `i` of an `[n, 3]` array.
#[inline]
pub fn row(values: &ArrayView2<f64>, i: usize) -> Vec3 {
    [values[[i, 0]], values[[i, 1]], values[[i, 2]]]
}

#[inline]
pub fn set_row(values: &mut ArrayViewMut2<f64>, i: usize, v: Vec3) {
    values[[i, 0]] = v[0];
    values[[i, 1]] = v[1];
    values[[i, 2]] = v[2];
}
