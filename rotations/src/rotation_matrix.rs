use super::*;
use euler_angles::EulerAngles;
use nalgebra::{Matrix3, Vector3};
use quaternion::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::ops::Mul;
use thiserror::Error;

/// A struct representing a 3x3 rotation matrix from the body frame to the
/// inertial frame. Its columns are the body axes expressed in the inertial frame.
///
/// The matrix is expected to be orthonormal with determinant +1. This is a
/// contract on the caller of [`RotationMatrix::from_raw_entries`] and is not
/// verified there.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationMatrix(Matrix3<f64>);

/// Errors that can occur when creating a `RotationMatrix`.
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum RotationMatrixErrors {
    #[error("{0}")]
    InvalidLength(#[from] InvalidLength),
    #[error("up axis is parallel to the yaw direction, cannot build an orthonormal basis")]
    ParallelAxes,
    #[error("up axis has zero magnitude")]
    ZeroMagnitudeAxis,
}

impl RotationMatrix {
    /// Builds a `RotationMatrix` from 9 values in row-major order.
    ///
    /// The entries are taken as-is, callers must supply a valid rotation.
    ///
    /// # Arguments
    ///
    /// * `entries` - `[e11, e12, e13, e21, e22, e23, e31, e32, e33]`.
    pub fn from_raw_entries(entries: &[f64]) -> Result<Self, RotationMatrixErrors> {
        InvalidLength::check(9, entries.len())?;
        Ok(Self(Matrix3::from_row_slice(entries)))
    }

    /// Builds the body-to-inertial rotation whose body Z axis is `up` and whose
    /// heading is as close to `yaw` as `up` allows.
    ///
    /// Body Y starts as the horizontal direction `[-sin(yaw), cos(yaw), 0]`,
    /// body X is `y x z`, then body Y is recomputed as `z x x` so the basis is
    /// orthonormal and right handed.
    ///
    /// # Errors
    ///
    /// `ZeroMagnitudeAxis` if `up` is zero and `ParallelAxes` if `up` is
    /// parallel to the yaw-derived Y direction.
    pub fn from_yaw_and_up_axis(yaw: f64, up: &Vector3<f64>) -> Result<Self, RotationMatrixErrors> {
        const TOL: f64 = 1e-12;

        let up_norm = up.norm();
        if !(up_norm > TOL) {
            return Err(RotationMatrixErrors::ZeroMagnitudeAxis);
        }
        let z = up / up_norm;

        let y = Vector3::new(-yaw.sin(), yaw.cos(), 0.0);
        let x = y.cross(&z);
        let x_norm = x.norm();
        if x_norm < TOL {
            return Err(RotationMatrixErrors::ParallelAxes);
        }
        let x = x / x_norm;
        let y = z.cross(&x);

        Ok(Self(Matrix3::from_columns(&[x, y, z])))
    }

    pub fn get_value(&self) -> Matrix3<f64> {
        self.0
    }

    /// Entries in row-major order.
    pub fn as_vector(&self) -> [f64; 9] {
        let m = &self.0;
        [
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        ]
    }

    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    pub fn trace(&self) -> f64 {
        self.0.trace()
    }

    /// True if `R^T R` is the identity within `tol` and the determinant is +1.
    pub fn is_orthonormal(&self, tol: f64) -> bool {
        let gram = self.0.transpose() * self.0;
        (gram - Matrix3::identity()).amax() < tol && (self.determinant() - 1.0).abs() < tol
    }
}

impl Default for RotationMatrix {
    fn default() -> Self {
        Self(Matrix3::identity())
    }
}

impl From<Matrix3<f64>> for RotationMatrix {
    fn from(value: Matrix3<f64>) -> Self {
        Self(value)
    }
}

impl From<&UnitQuaternion> for RotationMatrix {
    fn from(q: &UnitQuaternion) -> Self {
        q.to_rotation_matrix()
    }
}

impl From<&EulerAngles> for RotationMatrix {
    fn from(euler_angles: &EulerAngles) -> Self {
        euler_angles.r_bi()
    }
}

impl RotationTrait for RotationMatrix {
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0 * v
    }

    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.0.transpose() * v
    }

    fn inv(&self) -> Self {
        self.transpose()
    }

    fn identity() -> Self {
        Self::default()
    }
}

impl Mul<RotationMatrix> for RotationMatrix {
    type Output = RotationMatrix;

    /// Composes two rotations, `rhs` is applied first.
    fn mul(self, rhs: RotationMatrix) -> RotationMatrix {
        RotationMatrix(self.0 * rhs.0)
    }
}
