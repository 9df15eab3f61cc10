use diffeq::Integrable;
use nalgebra::{SVector, Vector3, Vector4};
use rotations::{
    InvalidLength,
    prelude::{QuaternionErrors, UnitQuaternion},
};
use serde::{Deserialize, Serialize};
use std::ops::{AddAssign, MulAssign};

pub const STATE_SIZE: usize = 13;

const POSITION: usize = 0;
const VELOCITY: usize = 3;
const QUATERNION: usize = 6;
const ANGULAR_RATE: usize = 10;

/// The 13 element rigid body state.
///
/// | index | content |
/// |---|---|
/// | 0..3 | position, inertial NED [m] |
/// | 3..6 | velocity, inertial NED [m/s] |
/// | 6..10 | orientation quaternion `[w, x, y, z]`, body-to-inertial |
/// | 10..13 | angular rate `[p, q, r]`, body frame [rad/s] |
///
/// The same layout holds the state derivative, in which case each accessor
/// returns the rate of that block (`velocity()` is the acceleration and so on).
/// `Default` is the zero vector, use [`RigidBodyState::rest`] for a body at rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState(SVector<f64, STATE_SIZE>);

impl RigidBodyState {
    /// Zero position, velocity and rate with identity orientation.
    pub fn rest() -> Self {
        Self::from_parts(
            &Vector3::zeros(),
            &Vector3::zeros(),
            &UnitQuaternion::IDENTITY,
            &Vector3::zeros(),
        )
    }

    pub fn from_parts(
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
        orientation: &UnitQuaternion,
        angular_rate: &Vector3<f64>,
    ) -> Self {
        let mut state = Self::default();
        state.set_position(position);
        state.set_velocity(velocity);
        state.set_quaternion(&orientation.as_vector());
        state.set_angular_rate(angular_rate);
        state
    }

    /// Builds from 13 raw values. The quaternion block is taken as-is.
    pub fn from_slice(values: &[f64]) -> Result<Self, InvalidLength> {
        if values.len() != STATE_SIZE {
            return Err(InvalidLength {
                expected: STATE_SIZE,
                got: values.len(),
            });
        }
        Ok(Self(SVector::from_column_slice(values)))
    }

    pub fn position(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(POSITION).into_owned()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(VELOCITY).into_owned()
    }

    /// Raw quaternion block, not necessarily unit norm.
    pub fn quaternion(&self) -> Vector4<f64> {
        self.0.fixed_rows::<4>(QUATERNION).into_owned()
    }

    pub fn angular_rate(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(ANGULAR_RATE).into_owned()
    }

    /// The quaternion block as a normalized `UnitQuaternion`.
    pub fn orientation(&self) -> Result<UnitQuaternion, QuaternionErrors> {
        UnitQuaternion::from_vector(&self.quaternion())
    }

    pub fn set_position(&mut self, position: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(POSITION).copy_from(position);
    }

    pub fn set_velocity(&mut self, velocity: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(VELOCITY).copy_from(velocity);
    }

    pub fn set_quaternion(&mut self, quaternion: &Vector4<f64>) {
        self.0.fixed_rows_mut::<4>(QUATERNION).copy_from(quaternion);
    }

    pub fn set_angular_rate(&mut self, angular_rate: &Vector3<f64>) {
        self.0.fixed_rows_mut::<3>(ANGULAR_RATE).copy_from(angular_rate);
    }

    /// Writes the normalized quaternion back into the state and returns it.
    pub fn normalize_orientation(&mut self) -> Result<UnitQuaternion, QuaternionErrors> {
        let q = self.orientation()?;
        self.set_quaternion(&q.as_vector());
        Ok(q)
    }

    pub fn as_vector(&self) -> &SVector<f64, STATE_SIZE> {
        &self.0
    }

    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self(SVector::zeros())
    }
}

impl From<SVector<f64, STATE_SIZE>> for RigidBodyState {
    fn from(v: SVector<f64, STATE_SIZE>) -> Self {
        Self(v)
    }
}

impl AddAssign<&Self> for RigidBodyState {
    fn add_assign(&mut self, rhs: &Self) {
        self.0 += &rhs.0;
    }
}

impl MulAssign<f64> for RigidBodyState {
    fn mul_assign(&mut self, rhs: f64) {
        self.0 *= rhs;
    }
}

impl Integrable for RigidBodyState {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rest_state() {
        let state = RigidBodyState::rest();
        assert_eq!(state.position(), Vector3::zeros());
        assert_eq!(state.velocity(), Vector3::zeros());
        assert_eq!(state.angular_rate(), Vector3::zeros());
        assert_eq!(state.orientation().unwrap(), UnitQuaternion::IDENTITY);
        assert_eq!(state.as_slice()[6], 1.0);
    }

    #[test]
    fn test_blocks_are_in_place() {
        let values: Vec<f64> = (0..13u8).map(f64::from).collect();
        let state = RigidBodyState::from_slice(&values).unwrap();

        assert_eq!(state.position(), Vector3::new(0.0, 1.0, 2.0));
        assert_eq!(state.velocity(), Vector3::new(3.0, 4.0, 5.0));
        assert_eq!(state.quaternion(), Vector4::new(6.0, 7.0, 8.0, 9.0));
        assert_eq!(state.angular_rate(), Vector3::new(10.0, 11.0, 12.0));
    }

    #[test]
    fn test_from_slice_wrong_length() {
        assert_eq!(
            RigidBodyState::from_slice(&[0.0; 12]),
            Err(InvalidLength {
                expected: 13,
                got: 12
            })
        );
    }

    #[test]
    fn test_normalize_orientation() {
        let mut state = RigidBodyState::rest();
        state.set_quaternion(&Vector4::new(2.0, 0.0, 0.0, 0.0));
        let q = state.normalize_orientation().unwrap();

        assert_eq!(q, UnitQuaternion::IDENTITY);
        assert_eq!(state.quaternion(), Vector4::new(1.0, 0.0, 0.0, 0.0));

        state.set_quaternion(&Vector4::zeros());
        assert_eq!(
            state.normalize_orientation(),
            Err(QuaternionErrors::ZeroMagnitude)
        );
    }

    #[test]
    fn test_arithmetic() {
        let mut a = RigidBodyState::rest();
        let mut b = RigidBodyState::default();
        b.set_velocity(&Vector3::new(1.0, 2.0, 3.0));

        a += &b;
        a *= 2.0;
        assert_abs_diff_eq!(a.velocity(), Vector3::new(2.0, 4.0, 6.0), epsilon = 1e-15);
        assert_eq!(a.quaternion()[0], 2.0);
    }
}
