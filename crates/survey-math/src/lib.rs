//! Mathematical primitives for the magnetotail survey.

pub mod interp;
pub mod linalg;
pub mod quadrature;
pub mod smoothing;
