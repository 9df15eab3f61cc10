use diffeq::RungeKutta;
use mass_properties::{Inertia, MassProperties};
use nalgebra::{Matrix3, Vector3, Vector6};
use rotations::{
    RotationTrait,
    prelude::{EulerAngles, EulerAnglesErrors, UnitQuaternion},
};
use std::{
    f64::consts::TAU,
    fmt::{Display, Formatter},
};
use tracing::{debug, trace};

use crate::{
    SixDofErrors, dynamics::RigidBodyDynamics, pose::Pose, state::RigidBodyState, wrench::Wrench,
};

/// A rigid body with six degrees of freedom, advanced in time with RK4.
///
/// The state is only changed by [`RigidBody::advance`]. Every query is
/// computed from the current state and the derivative of the last step.
#[derive(Debug)]
pub struct RigidBody {
    dynamics: RigidBodyDynamics,
    state: RigidBodyState,
    orientation: UnitQuaternion,
    time: f64,
    solver: RungeKutta<RigidBodyState, 4>,
}

impl RigidBody {
    /// Creates a body from an explicit initial state.
    ///
    /// The quaternion block of `state` is normalized here.
    ///
    /// # Errors
    ///
    /// If the quaternion block is zero or not finite.
    pub fn new(
        mut state: RigidBodyState,
        mass_properties: MassProperties,
    ) -> Result<Self, SixDofErrors> {
        let orientation = state.normalize_orientation()?;
        debug!(
            mass = mass_properties.mass(),
            position = ?state.position(),
            orientation = %orientation,
            "rigid body created"
        );
        Ok(Self {
            dynamics: RigidBodyDynamics::new(mass_properties),
            state,
            orientation,
            time: 0.0,
            solver: RungeKutta::rk4(),
        })
    }

    /// Creates a body at rest at the origin with identity orientation.
    pub fn at_rest(mass_properties: MassProperties) -> Self {
        let state = RigidBodyState::rest();
        let orientation = UnitQuaternion::IDENTITY;
        debug!(
            mass = mass_properties.mass(),
            position = ?state.position(),
            orientation = %orientation,
            "rigid body created"
        );
        Self {
            dynamics: RigidBodyDynamics::new(mass_properties),
            state,
            orientation,
            time: 0.0,
            solver: RungeKutta::rk4(),
        }
    }

    /// Same as [`RigidBody::new`] with raw mass and inertia.
    pub fn with_parameters(
        state: RigidBodyState,
        mass: f64,
        inertia: &Matrix3<f64>,
    ) -> Result<Self, SixDofErrors> {
        let mass_properties = MassProperties::new(mass, Inertia::from_matrix(inertia)?)?;
        Self::new(state, mass_properties)
    }

    /// Integrates one step from `t` to `t + dt` with `wrench` held constant.
    ///
    /// # Arguments
    ///
    /// * `wrench` - Body frame force and moment.
    /// * `t` - Current time.
    /// * `dt` - Step size, must be finite and positive.
    ///
    /// # Returns
    ///
    /// The updated state. Its quaternion is renormalized after the step.
    ///
    /// # Errors
    ///
    /// An invalid `dt` or a non-finite `wrench`. The state is left unchanged.
    pub fn advance(
        &mut self,
        wrench: &Wrench,
        t: f64,
        dt: f64,
    ) -> Result<&RigidBodyState, SixDofErrors> {
        let (mut next, t_next) = self
            .solver
            .advance(&self.dynamics, &self.state, wrench, t, dt)?;
        self.orientation = next.normalize_orientation()?;
        self.state = next;
        self.time = t_next;
        trace!(t = t_next, position = ?self.state.position(), "rigid body advanced");
        Ok(&self.state)
    }

    /// [`RigidBody::advance`] from the time reached by the previous step.
    pub fn step(&mut self, wrench: &Wrench, dt: f64) -> Result<&RigidBodyState, SixDofErrors> {
        self.advance(wrench, self.time, dt)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    pub fn mass_properties(&self) -> &MassProperties {
        self.dynamics.mass_properties()
    }

    /// Mean state derivative over the last step, zero before the first step.
    pub fn last_derivative(&self) -> &RigidBodyState {
        self.solver.last_derivative()
    }

    /// NED position [m]
    pub fn position(&self) -> Vector3<f64> {
        self.state.position()
    }

    /// NED velocity [m/s]
    pub fn velocity(&self) -> Vector3<f64> {
        self.state.velocity()
    }

    pub fn orientation(&self) -> UnitQuaternion {
        self.orientation
    }

    /// Body rates `[p, q, r]` [rad/s]
    pub fn angular_rate(&self) -> Vector3<f64> {
        self.state.angular_rate()
    }

    /// Euler angles of the orientation with yaw wrapped into `[0, 2pi)`.
    pub fn orientation_euler(&self) -> Result<EulerAngles, EulerAnglesErrors> {
        let euler = self.orientation.to_euler_angles()?;
        EulerAngles::new(euler.roll(), euler.pitch(), wrap_two_pi(euler.yaw()))
    }

    /// Heading relative to north in `[0, 2pi)`.
    pub fn heading(&self) -> Result<f64, EulerAnglesErrors> {
        Ok(self.orientation_euler()?.yaw())
    }

    /// NED position of a point fixed on the body at `offset` (body frame).
    pub fn point_position(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        self.position() + self.orientation.rotate(offset)
    }

    /// NED velocity of a point fixed on the body at `offset` (body frame).
    pub fn point_velocity(&self, offset: &Vector3<f64>) -> Vector3<f64> {
        self.velocity() + self.orientation.rotate(&self.angular_rate().cross(offset))
    }

    /// Linear acceleration in the NED frame over the last step.
    pub fn acceleration_inertial(&self) -> Vector3<f64> {
        self.last_derivative().velocity()
    }

    /// Linear acceleration in the body frame over the last step.
    pub fn acceleration_body(&self) -> Vector3<f64> {
        self.orientation.transform(&self.acceleration_inertial())
    }

    /// Angular acceleration in the body frame over the last step.
    pub fn angular_acceleration(&self) -> Vector3<f64> {
        self.last_derivative().angular_rate()
    }

    /// `[body linear acceleration; angular acceleration]`
    pub fn acceleration_wrench(&self) -> Vector6<f64> {
        let mut v = Vector6::zeros();
        v.fixed_rows_mut::<3>(0).copy_from(&self.acceleration_body());
        v.fixed_rows_mut::<3>(3).copy_from(&self.angular_acceleration());
        v
    }

    /// Body frame airspeed at the center of mass for an inertial `wind`.
    pub fn airspeed_body(&self, wind: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.transform(&(self.velocity() - wind))
    }

    /// Body frame airspeed at a point fixed on the body at `offset`.
    ///
    /// `q.transform(velocity - wind) + omega x offset`. The lever arm term is
    /// already in the body frame and is intentionally added without rotation.
    /// Rotating it through the orientation would add an inertial vector to a
    /// body frame one.
    ///
    /// See [`RigidBody::point_velocity`] for the inertial counterpart.
    pub fn airspeed_at_point(&self, offset: &Vector3<f64>, wind: &Vector3<f64>) -> Vector3<f64> {
        self.airspeed_body(wind) + self.angular_rate().cross(offset)
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.time, &self.position(), &self.orientation)
    }
}

fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative angles
    if wrapped >= TAU { 0.0 } else { wrapped }
}

impl Display for RigidBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let p = self.position();
        let v = self.velocity();
        let w = self.angular_rate();
        writeln!(f, "RigidBody (t = {:.3})", self.time)?;
        writeln!(f, "    Position NED: [{:.6}, {:.6}, {:.6}]", p[0], p[1], p[2])?;
        writeln!(f, "    Velocity NED: [{:.6}, {:.6}, {:.6}]", v[0], v[1], v[2])?;
        match self.orientation_euler() {
            Ok(euler) => writeln!(f, "    Attitude: {euler}")?,
            Err(_) => writeln!(f, "    Attitude: {}", self.orientation)?,
        }
        write!(f, "    Omega: [{:.6}, {:.6}, {:.6}]", w[0], w[1], w[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use diffeq::DiffeqErrors;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-12;

    fn flying_east() -> RigidBody {
        let state = RigidBodyState::from_parts(
            &Vector3::new(10.0, 20.0, -100.0),
            &Vector3::new(0.0, 10.0, 0.0),
            &UnitQuaternion::from_yaw(FRAC_PI_2).unwrap(),
            &Vector3::new(0.0, 0.0, 1.0),
        );
        RigidBody::new(state, MassProperties::default()).unwrap()
    }

    #[test]
    fn test_new_normalizes_quaternion() {
        let mut state = RigidBodyState::rest();
        state.set_quaternion(&nalgebra::Vector4::new(0.0, 0.0, 0.0, 3.0));
        let body = RigidBody::new(state, MassProperties::default()).unwrap();

        assert_eq!(body.orientation().as_vector(), nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(body.state().quaternion()[3], 1.0);
    }

    #[test]
    fn test_new_rejects_zero_quaternion() {
        let result = RigidBody::new(RigidBodyState::default(), MassProperties::default());
        assert!(matches!(result, Err(SixDofErrors::Quaternion(_))));
    }

    #[test]
    fn test_with_parameters_validates() {
        let result = RigidBody::with_parameters(RigidBodyState::rest(), -1.0, &Matrix3::identity());
        assert!(matches!(result, Err(SixDofErrors::MassProperties(_))));

        let body =
            RigidBody::with_parameters(RigidBodyState::rest(), 5.0, &Matrix3::identity()).unwrap();
        assert_eq!(body.mass_properties().mass(), 5.0);
    }

    #[test]
    fn test_invalid_step_size() {
        let mut body = RigidBody::at_rest(MassProperties::default());
        let result = body.advance(&Wrench::default(), 0.0, 0.0);
        assert!(matches!(
            result,
            Err(SixDofErrors::Diffeq(DiffeqErrors::InvalidStepSize(_)))
        ));
        // state untouched
        assert_eq!(*body.state(), RigidBodyState::rest());
        assert_eq!(body.time(), 0.0);
    }

    #[test]
    fn test_non_finite_wrench_leaves_state_untouched() {
        let mut body = flying_east();
        let before = *body.state();
        for wrench in [
            Wrench::from_force(Vector3::new(0.0, f64::NAN, 0.0)),
            Wrench::from_moment(Vector3::new(f64::INFINITY, 0.0, 0.0)),
        ] {
            assert_eq!(
                body.advance(&wrench, 0.0, 0.01).err(),
                Some(SixDofErrors::NonFiniteWrench)
            );
        }
        assert_eq!(*body.state(), before);
        assert_eq!(body.time(), 0.0);
    }

    #[test]
    fn test_heading_wraps() {
        let state = RigidBodyState::from_parts(
            &Vector3::zeros(),
            &Vector3::zeros(),
            &UnitQuaternion::from_yaw(-FRAC_PI_2).unwrap(),
            &Vector3::zeros(),
        );
        let body = RigidBody::new(state, MassProperties::default()).unwrap();
        assert_abs_diff_eq!(body.heading().unwrap(), 1.5 * PI, epsilon = TOL);

        assert_eq!(wrap_two_pi(-1e-300), 0.0);
        assert_abs_diff_eq!(wrap_two_pi(2.5 * PI), 0.5 * PI, epsilon = TOL);
    }

    #[test]
    fn test_heading_gimbal_lock() {
        let state = RigidBodyState::from_parts(
            &Vector3::zeros(),
            &Vector3::zeros(),
            &UnitQuaternion::from_pitch(FRAC_PI_2).unwrap(),
            &Vector3::zeros(),
        );
        let body = RigidBody::new(state, MassProperties::default()).unwrap();
        assert_eq!(body.heading(), Err(EulerAnglesErrors::GimbalLock));
    }

    #[test]
    fn test_point_queries() {
        let body = flying_east();
        let offset = Vector3::new(1.0, 0.0, 0.0);

        // nose is one meter east of the center of mass
        assert_abs_diff_eq!(
            body.point_position(&offset),
            Vector3::new(10.0, 21.0, -100.0),
            epsilon = TOL
        );
        // yawing right swings the nose south
        assert_abs_diff_eq!(
            body.point_velocity(&offset),
            Vector3::new(-1.0, 10.0, 0.0),
            epsilon = TOL
        );
    }

    #[test]
    fn test_airspeed() {
        let body = flying_east();
        let offset = Vector3::new(1.0, 0.0, 0.0);

        assert_abs_diff_eq!(
            body.airspeed_body(&Vector3::zeros()),
            Vector3::new(10.0, 0.0, 0.0),
            epsilon = TOL
        );
        // tailwind from the west
        assert_abs_diff_eq!(
            body.airspeed_body(&Vector3::new(0.0, 4.0, 0.0)),
            Vector3::new(6.0, 0.0, 0.0),
            epsilon = TOL
        );
        // nose moves to the body's right
        assert_abs_diff_eq!(
            body.airspeed_at_point(&offset, &Vector3::zeros()),
            Vector3::new(10.0, 1.0, 0.0),
            epsilon = TOL
        );
    }

    #[test]
    fn test_accelerations_follow_last_step() {
        let mut body = flying_east();
        assert_eq!(body.acceleration_wrench(), Vector6::zeros());

        // yaw rate is cancelled so the heading stays east
        let mut state = *body.state();
        state.set_angular_rate(&Vector3::zeros());
        let mut body_no_spin = RigidBody::new(state, MassProperties::default()).unwrap();
        body_no_spin
            .advance(&Wrench::from_force(Vector3::new(2.0, 0.0, 0.0)), 0.0, 0.01)
            .unwrap();

        assert_abs_diff_eq!(
            body_no_spin.acceleration_inertial(),
            Vector3::new(0.0, 2.0, 0.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            body_no_spin.acceleration_body(),
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-9
        );

        body.advance(&Wrench::from_moment(Vector3::new(0.0, 0.0, -0.5)), 0.0, 0.01)
            .unwrap();
        assert_abs_diff_eq!(
            body.angular_acceleration(),
            Vector3::new(0.0, 0.0, -0.5),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(body.acceleration_wrench()[5], -0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_step_uses_own_clock() {
        let mut body = RigidBody::at_rest(MassProperties::default());
        body.step(&Wrench::default(), 0.25).unwrap();
        body.step(&Wrench::default(), 0.25).unwrap();
        assert_eq!(body.time(), 0.5);
        assert_eq!(body.pose().time, 0.5);
    }

    #[test]
    fn test_pose() {
        let body = flying_east();
        let pose = body.pose();
        assert_eq!(pose.position, [10.0, 20.0, -100.0]);
        let q = UnitQuaternion::from_yaw(FRAC_PI_2).unwrap();
        assert_eq!(pose.orientation, [q.w(), q.x(), q.y(), q.z()]);
    }

    #[test]
    fn test_display() {
        let body = RigidBody::at_rest(MassProperties::default());
        let text = body.to_string();
        assert!(text.starts_with("RigidBody (t = 0.000)"));
        assert!(text.contains("Attitude: EulerAngles[deg]"));
    }
}
