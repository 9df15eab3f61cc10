use super::*;
use euler_angles::{EulerAngles, EulerAnglesErrors};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use rotation_matrix::RotationMatrix;
use serde::{Deserialize, Serialize};
use so3::{asymproj, hat, symproj, vex};
use std::fmt;
use thiserror::Error;

/// Allowed deviation of the norm from 1.0 before a quaternion is renormalized.
pub const UNIT_TOLERANCE: f64 = 1e-9;

/// Rotation angles below this are treated as no rotation when converting from a matrix.
const NEAR_IDENTITY_ANGLE: f64 = 1e-9;

/// Below this real part the matrix conversion switches to the half-turn branch.
const HALF_TURN_TOLERANCE: f64 = 1e-6;

/// Errors that can occur when creating a `UnitQuaternion`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuaternionErrors {
    #[error("{0}")]
    InvalidLength(#[from] InvalidLength),
    #[error("quaternion has non-finite components")]
    NonFinite,
    #[error("got zero magnitude quaternion")]
    ZeroMagnitude,
}

/// A unit quaternion representing the attitude of a body frame with respect
/// to an inertial frame (body-to-inertial).
///
/// Hamilton convention (`i * j = k`) with the real part listed first.
/// `q` and `-q` represent the same rotation.
///
/// The norm is 1.0 within [`UNIT_TOLERANCE`]. Every constructor normalizes,
/// the components are only readable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct UnitQuaternion {
    w: f64,
    x: f64,
    y: f64,
    z: f64,
}

impl UnitQuaternion {
    /// A quaternion representing no rotation.
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new normalized `UnitQuaternion`.
    ///
    /// # Arguments
    ///
    /// * `w` - The real component.
    /// * `x`, `y`, `z` - The imaginary components.
    ///
    /// # Returns
    ///
    /// `Ok` with the normalized quaternion, normalization is skipped when the
    /// norm is already within [`UNIT_TOLERANCE`] of 1.0.
    ///
    /// # Errors
    ///
    /// `ZeroMagnitude` for a zero vector and `NonFinite` for NaN or infinite components.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Result<Self, QuaternionErrors> {
        let v = Vector4::new(w, x, y, z);
        if !v.iter().all(|c| c.is_finite()) {
            return Err(QuaternionErrors::NonFinite);
        }
        let mag = v.norm();
        if mag < f64::EPSILON {
            return Err(QuaternionErrors::ZeroMagnitude);
        }
        Ok(Self::normalized(v, mag))
    }

    /// Builds from a real part and an imaginary vector.
    pub fn from_real_imag(real: f64, imag: &Vector3<f64>) -> Result<Self, QuaternionErrors> {
        Self::new(real, imag[0], imag[1], imag[2])
    }

    /// Builds from `[w, x, y, z]`.
    pub fn from_vector(v: &Vector4<f64>) -> Result<Self, QuaternionErrors> {
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Builds from a slice `[w, x, y, z]`.
    pub fn from_slice(v: &[f64]) -> Result<Self, QuaternionErrors> {
        InvalidLength::check(4, v.len())?;
        Self::new(v[0], v[1], v[2], v[3])
    }

    /// Rotation of `angle` radians about body X.
    ///
    /// # Errors
    ///
    /// `NonFinite` if `angle` is NaN or infinite.
    pub fn from_roll(angle: f64) -> Result<Self, QuaternionErrors> {
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(c, s, 0.0, 0.0)
    }

    /// Rotation of `angle` radians about body Y.
    pub fn from_pitch(angle: f64) -> Result<Self, QuaternionErrors> {
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(c, 0.0, s, 0.0)
    }

    /// Rotation of `angle` radians about body Z.
    pub fn from_yaw(angle: f64) -> Result<Self, QuaternionErrors> {
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(c, 0.0, 0.0, s)
    }

    /// Converts `EulerAngles` to a `UnitQuaternion`.
    ///
    /// Elemental rotations are composed as `yaw.compose(pitch).compose(roll)`,
    /// which is the intrinsic ZYX sequence. Changing the order changes the rotation.
    pub fn from_euler_angles(euler_angles: &EulerAngles) -> Self {
        // EulerAngles are finite, so every elemental rotation is too
        let elemental = |axis: usize, angle: f64| {
            let (s, c) = (angle / 2.0).sin_cos();
            let mut v = Vector4::new(c, 0.0, 0.0, 0.0);
            v[axis] = s;
            Self::renormalized(v)
        };
        elemental(3, euler_angles.yaw())
            .compose(&elemental(2, euler_angles.pitch()))
            .compose(&elemental(1, euler_angles.roll()))
    }

    /// Same as [`UnitQuaternion::from_euler_angles`] with the angles given in degrees.
    ///
    /// # Errors
    ///
    /// `NonFinite` if any angle is NaN or infinite.
    pub fn from_euler_degrees(roll: f64, pitch: f64, yaw: f64) -> Result<Self, EulerAnglesErrors> {
        Ok(Self::from_euler_angles(&EulerAngles::from_degrees(roll, pitch, yaw)?))
    }

    /// Converts a body-to-inertial `RotationMatrix` to a `UnitQuaternion`.
    ///
    /// With principal angle `theta = acos((trace(R) - 1) / 2)` the real part is
    /// `cos(theta / 2)` and the imaginary part is `vex(asymproj(R)) / (2 cos(theta / 2))`.
    ///
    /// Angles below 1e-9 rad return [`UnitQuaternion::IDENTITY`]. When the real
    /// part vanishes (theta close to pi) the axis is read from the symmetric
    /// part of `R` instead, its sign taken from the antisymmetric part.
    pub fn from_rotation_matrix(matrix: &RotationMatrix) -> Result<Self, QuaternionErrors> {
        let m = matrix.get_value();
        if !m.iter().all(|c| c.is_finite()) {
            return Err(QuaternionErrors::NonFinite);
        }

        let cos_angle = ((m.trace() - 1.0) / 2.0).clamp(-1.0, 1.0);
        let angle = cos_angle.acos();
        if angle < NEAR_IDENTITY_ANGLE {
            return Ok(Self::IDENTITY);
        }

        let (half_sin, real) = (angle / 2.0).sin_cos();
        let scaled_axis = vex(&asymproj(&m)); // sin(angle) * axis

        if real < HALF_TURN_TOLERANCE {
            // symproj(R) - cos(angle) I = (1 - cos(angle)) n n^T
            let outer = (symproj(&m) - Matrix3::identity() * cos_angle) / (1.0 - cos_angle);
            let i = outer.diagonal().imax();
            let mut axis: Vector3<f64> = outer.column(i) / outer[(i, i)].sqrt();
            if axis.dot(&scaled_axis) < 0.0 {
                axis = -axis;
            }
            return Self::from_real_imag(real, &(axis * half_sin));
        }

        Self::from_real_imag(real, &(scaled_axis / (2.0 * real)))
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// Real (scalar) part.
    pub fn real(&self) -> f64 {
        self.w
    }

    /// Imaginary (vector) part.
    pub fn imag(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// `[w, x, y, z]`
    pub fn as_vector(&self) -> Vector4<f64> {
        Vector4::new(self.w, self.x, self.y, self.z)
    }

    pub fn norm(&self) -> f64 {
        self.as_vector().norm()
    }

    pub fn is_unit(&self) -> bool {
        (1.0 - self.norm()).abs() <= UNIT_TOLERANCE
    }

    /// Negated imaginary part. Inertial-to-body for this body-to-inertial rotation.
    pub fn conjugate(&self) -> Self {
        Self {
            w: self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// For a unit quaternion the inverse is the conjugate, this just returns
    /// [`UnitQuaternion::conjugate`].
    pub fn inverse(&self) -> Self {
        self.conjugate()
    }

    /// The antipodal quaternion `-q`. Represents the same rotation.
    pub fn flipped(&self) -> Self {
        Self {
            w: -self.w,
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }

    /// Hamilton product `self * other`.
    ///
    /// Not commutative. `a.compose(&b)` is the rotation that applies `b`
    /// first and then `a`, so `a.compose(&b).rotate(v) == a.rotate(&b.rotate(v))`.
    pub fn compose(&self, other: &UnitQuaternion) -> Self {
        Self::renormalized(self.product_matrix() * other.as_vector())
    }

    /// Body X axis expressed in the inertial frame, first column of the rotation matrix.
    pub fn axis_x(&self) -> Vector3<f64> {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        Vector3::new(
            w * w + x * x - y * y - z * z,
            2.0 * (x * y + w * z),
            2.0 * (x * z - w * y),
        )
    }

    /// Body Y axis expressed in the inertial frame, second column of the rotation matrix.
    pub fn axis_y(&self) -> Vector3<f64> {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        Vector3::new(
            2.0 * (x * y - w * z),
            w * w + y * y - x * x - z * z,
            2.0 * (y * z + w * x),
        )
    }

    /// Body Z axis expressed in the inertial frame, third column of the rotation matrix.
    pub fn axis_z(&self) -> Vector3<f64> {
        let (w, x, y, z) = (self.w, self.x, self.y, self.z);
        Vector3::new(
            2.0 * (x * z + w * y),
            2.0 * (y * z - w * x),
            w * w + z * z - x * x - y * y,
        )
    }

    /// Body-to-inertial rotation matrix, `I + 2 w hat(v) + 2 hat(v)^2`.
    pub fn to_rotation_matrix(&self) -> RotationMatrix {
        let v_hat = hat(&self.imag());
        RotationMatrix::from(
            Matrix3::identity() + v_hat * (2.0 * self.w) + v_hat * v_hat * 2.0,
        )
    }

    /// See [`EulerAngles::from_quaternion`].
    pub fn to_euler_angles(&self) -> Result<EulerAngles, EulerAnglesErrors> {
        EulerAngles::from_quaternion(self)
    }

    /// Quaternion kinematics, `q_dot = 0.5 * Q(q) * [0, omega]`.
    ///
    /// # Arguments
    ///
    /// * `omega` - Angular rate of the body frame expressed in the body frame.
    ///
    /// # Returns
    ///
    /// The rate of change of `[w, x, y, z]`.
    pub fn angular_rate_to_quaternion_rate(&self, omega: &Vector3<f64>) -> Vector4<f64> {
        self.product_matrix() * Vector4::new(0.0, omega[0], omega[1], omega[2]) * 0.5
    }

    // left multiplication by self as a 4x4 matrix
    fn product_matrix(&self) -> Matrix4<f64> {
        product_matrix(&self.as_vector())
    }

    fn normalized(v: Vector4<f64>, mag: f64) -> Self {
        let v = if (mag - 1.0).abs() > UNIT_TOLERANCE {
            v / mag
        } else {
            v
        };
        Self {
            w: v[0],
            x: v[1],
            y: v[2],
            z: v[3],
        }
    }

    // only for finite components: products of unit quaternions and trig-built values
    fn renormalized(v: Vector4<f64>) -> Self {
        let mag = v.norm();
        Self::normalized(v, mag)
    }
}

/// Hamilton product `p * r` written as `product_matrix(p) * r`.
/// `p` does not need to be a unit quaternion.
fn product_matrix(p: &Vector4<f64>) -> Matrix4<f64> {
    let (w, x, y, z) = (p[0], p[1], p[2], p[3]);
    Matrix4::new(
        w, -x, -y, -z, //
        x, w, -z, y, //
        y, z, w, -x, //
        z, -y, x, w,
    )
}

impl Default for UnitQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RotationTrait for UnitQuaternion {
    /// Body-to-inertial rotation of a vector, the sandwich product
    /// `q * [0, v] * q^-1` with the zero real part dropped.
    fn rotate(&self, v: &Vector3<f64>) -> Vector3<f64> {
        let p = Vector4::new(0.0, v[0], v[1], v[2]);
        let rotated = self.product_matrix() * product_matrix(&p) * self.inverse().as_vector();
        Vector3::new(rotated[1], rotated[2], rotated[3])
    }

    /// Inertial-to-body, i.e. rotation by the conjugate.
    fn transform(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.conjugate().rotate(v)
    }

    fn inv(&self) -> Self {
        self.inverse()
    }

    fn identity() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<[f64; 4]> for UnitQuaternion {
    type Error = QuaternionErrors;
    fn try_from(value: [f64; 4]) -> Result<Self, QuaternionErrors> {
        Self::from_slice(&value)
    }
}

impl From<UnitQuaternion> for [f64; 4] {
    fn from(q: UnitQuaternion) -> Self {
        [q.w, q.x, q.y, q.z]
    }
}

impl From<&EulerAngles> for UnitQuaternion {
    fn from(euler_angles: &EulerAngles) -> Self {
        UnitQuaternion::from_euler_angles(euler_angles)
    }
}

impl TryFrom<&RotationMatrix> for UnitQuaternion {
    type Error = QuaternionErrors;
    fn try_from(matrix: &RotationMatrix) -> Result<Self, QuaternionErrors> {
        UnitQuaternion::from_rotation_matrix(matrix)
    }
}

impl fmt::Display for UnitQuaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UnitQuaternion: w = {:.6}, x = {:.6}i, y = {:.6}j, z = {:.6}k",
            self.w, self.x, self.y, self.z
        )
    }
}
