use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative tolerance on `|I - I^T|` when checking an inertia matrix for symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MassPropertiesErrors {
    #[error("inertia matrix has non-finite entries")]
    InertiaNotFinite,
    #[error("inertia matrix is not positive definite")]
    InertiaNotPositiveDefinite,
    #[error("inertia matrix is not symmetric")]
    InertiaNotSymmetric,
    #[error("expected {expected} inertia entries, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("Ixx cant be less than or equal to  zero")]
    IxxLessThanOrEqualToZero,
    #[error("Iyy cant be less than or equal to zero")]
    IyyLessThanOrEqualToZero,
    #[error("Izz cant be less than or equal to zero")]
    IzzLessThanOrEqualToZero,
    #[error("mass must be finite and greater than zero, got {0}")]
    InvalidMass(f64),
}

/// A symmetric positive definite inertia matrix about the center of mass,
/// expressed in the body frame. [kg m^2]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 9]", into = "[f64; 9]")]
pub struct Inertia(Matrix3<f64>);

impl Inertia {
    pub fn new(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, MassPropertiesErrors> {
        Self::from_matrix(&Matrix3::new(
            ixx, ixy, ixz, //
            ixy, iyy, iyz, //
            ixz, iyz, izz,
        ))
    }

    /// Principal moments only.
    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, MassPropertiesErrors> {
        Self::new(ixx, iyy, izz, 0.0, 0.0, 0.0)
    }

    /// Validates a full 3x3 inertia matrix.
    ///
    /// # Errors
    ///
    /// Non-finite entries, a non-positive diagonal, asymmetry beyond a relative
    /// tolerance of 1e-9, or a matrix that is not positive definite.
    pub fn from_matrix(m: &Matrix3<f64>) -> Result<Self, MassPropertiesErrors> {
        if !m.iter().all(|v| v.is_finite()) {
            return Err(MassPropertiesErrors::InertiaNotFinite);
        }
        if m[(0, 0)] <= f64::EPSILON {
            return Err(MassPropertiesErrors::IxxLessThanOrEqualToZero);
        }
        if m[(1, 1)] <= f64::EPSILON {
            return Err(MassPropertiesErrors::IyyLessThanOrEqualToZero);
        }
        if m[(2, 2)] <= f64::EPSILON {
            return Err(MassPropertiesErrors::IzzLessThanOrEqualToZero);
        }
        if (m - m.transpose()).amax() > SYMMETRY_TOLERANCE * m.amax() {
            return Err(MassPropertiesErrors::InertiaNotSymmetric);
        }
        let symmetric = (m + m.transpose()) * 0.5;
        if symmetric.cholesky().is_none() {
            return Err(MassPropertiesErrors::InertiaNotPositiveDefinite);
        }
        Ok(Self(symmetric))
    }

    /// Builds from 9 entries in row-major order.
    pub fn from_row_slice(entries: &[f64]) -> Result<Self, MassPropertiesErrors> {
        if entries.len() != 9 {
            return Err(MassPropertiesErrors::InvalidLength {
                expected: 9,
                got: entries.len(),
            });
        }
        Self::from_matrix(&Matrix3::from_row_slice(entries))
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        self.0
    }
}

impl Default for Inertia {
    fn default() -> Self {
        Self(Matrix3::identity())
    }
}

impl TryFrom<Matrix3<f64>> for Inertia {
    type Error = MassPropertiesErrors;
    fn try_from(m: Matrix3<f64>) -> Result<Self, MassPropertiesErrors> {
        Self::from_matrix(&m)
    }
}

impl TryFrom<[f64; 9]> for Inertia {
    type Error = MassPropertiesErrors;
    fn try_from(entries: [f64; 9]) -> Result<Self, MassPropertiesErrors> {
        Self::from_row_slice(&entries)
    }
}

impl From<Inertia> for [f64; 9] {
    fn from(inertia: Inertia) -> Self {
        let m = inertia.0;
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
}

/// Represents the mass properties of a rigid body.
/// Mass and inertia, plus the inverse inertia computed once here.
///
/// There are no setters, new parameters mean a new `MassProperties`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    mass: f64,
    inertia: Inertia,
    inverse_inertia: Matrix3<f64>,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Inertia::default(),
            inverse_inertia: Matrix3::identity(),
        }
    }
}

impl MassProperties {
    pub fn new(mass: f64, inertia: Inertia) -> Result<Self, MassPropertiesErrors> {
        if !(mass.is_finite() && mass > f64::EPSILON) {
            return Err(MassPropertiesErrors::InvalidMass(mass));
        }
        let inverse_inertia = inertia
            .matrix()
            .cholesky()
            .ok_or(MassPropertiesErrors::InertiaNotPositiveDefinite)?
            .inverse();
        Ok(Self {
            mass,
            inertia,
            inverse_inertia,
        })
    }

    /// [kg]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inertia(&self) -> Matrix3<f64> {
        self.inertia.matrix()
    }

    pub fn inverse_inertia(&self) -> Matrix3<f64> {
        self.inverse_inertia
    }
}
