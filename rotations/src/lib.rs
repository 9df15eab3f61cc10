pub mod euler_angles;
pub mod quaternion;
pub mod rotation_matrix;
pub mod so3;

use nalgebra::Vector3;

pub mod prelude {
    pub use crate::RotationTrait;
    pub use crate::euler_angles::*;
    pub use crate::quaternion::*;
    pub use crate::rotation_matrix::*;
    pub use crate::so3::*;
}

/// Trait defining rotation and transformation operations.
///
/// Every implementor represents the attitude of a body frame relative to an
/// inertial frame (body-to-inertial).
pub trait RotationTrait {
    /// Rotates a vector by the rotation.
    /// Takes a vector expressed in the body frame and returns it expressed in
    /// the inertial frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be rotated.
    ///
    /// # Returns
    ///
    /// The rotated vector.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64>;

    /// Transforms a vector by the inverse rotation.
    /// Takes a vector expressed in the inertial frame and returns it expressed
    /// in the body frame.
    ///
    /// # Arguments
    ///
    /// * `v` - The vector to be transformed.
    ///
    /// # Returns
    ///
    /// The transformed vector.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64>;

    fn inv(&self) -> Self;

    fn identity() -> Self;
}

/// Error returned by the slice based constructors when the input has the
/// wrong number of elements.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("expected {expected} elements, got {got}")]
pub struct InvalidLength {
    pub expected: usize,
    pub got: usize,
}

impl InvalidLength {
    pub(crate) fn check(expected: usize, got: usize) -> Result<(), InvalidLength> {
        if expected != got {
            return Err(InvalidLength { expected, got });
        }
        Ok(())
    }
}
