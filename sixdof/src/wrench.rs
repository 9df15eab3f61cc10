use nalgebra::{Vector3, Vector6};
use rotations::InvalidLength;
use serde::{Deserialize, Serialize};

/// Force and moment acting on the body, both expressed in the body frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wrench {
    /// [N]
    pub force: Vector3<f64>,
    /// [Nm]
    pub moment: Vector3<f64>,
}

impl Wrench {
    pub fn new(force: Vector3<f64>, moment: Vector3<f64>) -> Self {
        Self { force, moment }
    }

    pub fn from_force(force: Vector3<f64>) -> Self {
        Self::new(force, Vector3::zeros())
    }

    pub fn from_moment(moment: Vector3<f64>) -> Self {
        Self::new(Vector3::zeros(), moment)
    }

    /// Builds from `[Fx, Fy, Fz, L, M, N]`.
    pub fn from_slice(values: &[f64]) -> Result<Self, InvalidLength> {
        if values.len() != 6 {
            return Err(InvalidLength {
                expected: 6,
                got: values.len(),
            });
        }
        Ok(Self::new(
            Vector3::from_column_slice(&values[0..3]),
            Vector3::from_column_slice(&values[3..6]),
        ))
    }

    pub fn is_finite(&self) -> bool {
        self.force.iter().chain(self.moment.iter()).all(|c| c.is_finite())
    }

    /// `[Fx, Fy, Fz, L, M, N]`
    pub fn as_vector(&self) -> Vector6<f64> {
        let mut v = Vector6::zeros();
        v.fixed_rows_mut::<3>(0).copy_from(&self.force);
        v.fixed_rows_mut::<3>(3).copy_from(&self.moment);
        v
    }
}
