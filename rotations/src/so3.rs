//! Helpers on the Lie algebra so(3).

use nalgebra::{Matrix3, Vector3};

/// Skew-symmetric matrix of a vector, so that `hat(v) * w == v.cross(w)`.
///
/// ```text
///          [ 0  -z   y]
/// hat(v) = [ z   0  -x]
///          [-y   x   0]
/// ```
pub fn hat(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v[2], v[1], v[2], 0.0, -v[0], -v[1], v[0], 0.0)
}

/// Inverse of [`hat`].
///
/// Only meaningful for a skew-symmetric input. No check is performed, for any
/// other matrix the result is whatever sits in the (2,1), (0,2) and (1,0) slots.
pub fn vex(m: &Matrix3<f64>) -> Vector3<f64> {
    Vector3::new(m[(2, 1)], m[(0, 2)], m[(1, 0)])
}

/// Symmetric part of a square matrix.
pub fn symproj(h: &Matrix3<f64>) -> Matrix3<f64> {
    (h + h.transpose()) * 0.5
}

/// Anti-symmetric part of a square matrix.
pub fn asymproj(h: &Matrix3<f64>) -> Matrix3<f64> {
    (h - h.transpose()) * 0.5
}
