use super::*;
use nalgebra::{Matrix3, Vector3};
use quaternion::UnitQuaternion;
use rotation_matrix::RotationMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Below this value of |cos(pitch)| roll and yaw can no longer be separated.
pub const GIMBAL_LOCK_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EulerAnglesErrors {
    #[error("gimbal lock: pitch is at +/-90 degrees, roll and yaw are indeterminate")]
    GimbalLock,
    #[error("{0}")]
    InvalidLength(#[from] InvalidLength),
    #[error("euler angles must be finite")]
    NonFinite,
}

/// Roll, pitch and yaw of a body with respect to the NED frame, applied in
/// yaw-pitch-roll (intrinsic ZYX) order. Always stored in radians.
///
/// The representation is singular at pitch = +/-90 degrees (gimbal lock),
/// where the conversions into Euler angles and the body-rate to Euler-rate
/// transform fail with [`EulerAnglesErrors::GimbalLock`].
///
/// All three angles are finite. Serialized as `[roll, pitch, yaw]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct EulerAngles {
    roll: f64,
    pitch: f64,
    yaw: f64,
}

impl EulerAngles {
    /// # Errors
    ///
    /// `NonFinite` if any angle is NaN or infinite.
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Result<Self, EulerAnglesErrors> {
        if !(roll.is_finite() && pitch.is_finite() && yaw.is_finite()) {
            return Err(EulerAnglesErrors::NonFinite);
        }
        Ok(Self { roll, pitch, yaw })
    }

    /// Same as [`EulerAngles::new`] but the inputs are in degrees.
    pub fn from_degrees(roll: f64, pitch: f64, yaw: f64) -> Result<Self, EulerAnglesErrors> {
        Self::new(roll.to_radians(), pitch.to_radians(), yaw.to_radians())
    }

    /// Builds from `[roll, pitch, yaw]` in radians.
    pub fn from_slice(v: &[f64]) -> Result<Self, EulerAnglesErrors> {
        InvalidLength::check(3, v.len())?;
        Self::new(v[0], v[1], v[2])
    }

    /// Extracts the angles of a body-to-inertial rotation matrix.
    ///
    /// # Errors
    ///
    /// `GimbalLock` if pitch is within tolerance of +/-90 degrees.
    pub fn from_rotation_matrix(r: &RotationMatrix) -> Result<Self, EulerAnglesErrors> {
        let m = r.get_value();

        let pitch = pitch_from_sine(-m[(2, 0)])?;
        let roll = m[(2, 1)].atan2(m[(2, 2)]);
        let yaw = m[(1, 0)].atan2(m[(0, 0)]);

        // raw matrices are not validated, NaN entries surface here
        Self::new(roll, pitch, yaw)
    }

    /// Extracts the angles of a unit quaternion.
    ///
    /// This is the only implementation of the quaternion extraction,
    /// [`UnitQuaternion::to_euler_angles`] calls into it.
    ///
    /// # Errors
    ///
    /// `GimbalLock` if pitch is within tolerance of +/-90 degrees.
    pub fn from_quaternion(q: &UnitQuaternion) -> Result<Self, EulerAnglesErrors> {
        let (w, x, y, z) = (q.w(), q.x(), q.y(), q.z());

        let pitch = pitch_from_sine(2.0 * (w * y - x * z))?;
        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));

        Self::new(roll, pitch, yaw)
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// `[roll, pitch, yaw]` in radians.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.roll, self.pitch, self.yaw)
    }

    /// `[roll, pitch, yaw]` in degrees.
    pub fn to_degrees(&self) -> Vector3<f64> {
        Vector3::new(
            self.roll.to_degrees(),
            self.pitch.to_degrees(),
            self.yaw.to_degrees(),
        )
    }

    /// Inertial-to-body rotation due to roll alone (East-Down plane).
    pub fn r_roll(&self) -> Matrix3<f64> {
        let (s, c) = self.roll.sin_cos();
        Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
    }

    /// Inertial-to-body rotation due to pitch alone (North-Down plane).
    pub fn r_pitch(&self) -> Matrix3<f64> {
        let (s, c) = self.pitch.sin_cos();
        Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
    }

    /// Inertial-to-body rotation due to yaw alone (North-East plane).
    pub fn r_yaw(&self) -> Matrix3<f64> {
        let (s, c) = self.yaw.sin_cos();
        Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
    }

    /// Body-to-inertial rotation matrix, `(R_roll * R_pitch * R_yaw)^T`.
    ///
    /// The product order and the transpose are what make this a ZYX sequence,
    /// swapping either changes the rotation.
    pub fn r_bi(&self) -> RotationMatrix {
        RotationMatrix::from((self.r_roll() * self.r_pitch() * self.r_yaw()).transpose())
    }

    /// Maps Euler angle rates `[roll_dot, pitch_dot, yaw_dot]` to body rates `[p, q, r]`.
    pub fn t_eb(&self) -> Matrix3<f64> {
        let (s_ph, c_ph) = self.roll.sin_cos();
        let (s_th, c_th) = self.pitch.sin_cos();

        Matrix3::new(
            1.0,
            0.0,
            -s_th,
            0.0,
            c_ph,
            s_ph * c_th,
            0.0,
            -s_ph,
            c_ph * c_th,
        )
    }

    /// Maps body rates `[p, q, r]` to Euler angle rates. Inverse of [`EulerAngles::t_eb`].
    ///
    /// # Errors
    ///
    /// `GimbalLock` when cos(pitch) is within tolerance of zero.
    pub fn t_be(&self) -> Result<Matrix3<f64>, EulerAnglesErrors> {
        let (s_ph, c_ph) = self.roll.sin_cos();
        let (s_th, c_th) = self.pitch.sin_cos();

        if c_th.abs() < GIMBAL_LOCK_TOLERANCE {
            return Err(EulerAnglesErrors::GimbalLock);
        }

        let t = Matrix3::new(
            c_th,
            s_ph * s_th,
            c_ph * s_th,
            0.0,
            c_ph * c_th,
            -s_ph * c_th,
            0.0,
            s_ph,
            c_ph,
        );
        Ok(t / c_th)
    }
}

// sine of pitch in, pitch out, refusing the singular band around +/-90 degrees
fn pitch_from_sine(sin_pitch: f64) -> Result<f64, EulerAnglesErrors> {
    let sin_pitch = sin_pitch.clamp(-1.0, 1.0);
    let cos_pitch = (1.0 - sin_pitch * sin_pitch).sqrt();
    if cos_pitch < GIMBAL_LOCK_TOLERANCE {
        return Err(EulerAnglesErrors::GimbalLock);
    }
    Ok(sin_pitch.asin())
}

impl TryFrom<[f64; 3]> for EulerAngles {
    type Error = EulerAnglesErrors;
    fn try_from(value: [f64; 3]) -> Result<Self, EulerAnglesErrors> {
        Self::from_slice(&value)
    }
}

impl From<EulerAngles> for [f64; 3] {
    fn from(e: EulerAngles) -> Self {
        [e.roll, e.pitch, e.yaw]
    }
}

impl fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deg = self.to_degrees();
        write!(
            f,
            "EulerAngles[deg](roll = {:.6}, pitch = {:.6}, yaw = {:.6})",
            deg[0], deg[1], deg[2]
        )
    }
}
