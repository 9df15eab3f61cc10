use diffeq::OdeModel;
use mass_properties::MassProperties;
use rotations::RotationTrait;

use crate::{SixDofErrors, state::RigidBodyState, wrench::Wrench};

/// Equations of motion of a free rigid body.
///
/// ```text
/// position_rate     = velocity
/// velocity_rate     = q.rotate(force) / mass
/// quaternion_rate   = 0.5 * Q(q) * [0, omega]
/// angular_rate_rate = I^-1 * (moment - omega x (I * omega))
/// ```
///
/// Holds nothing but the mass properties, the derivative depends only on the
/// arguments of [`OdeModel::f`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RigidBodyDynamics {
    mass_properties: MassProperties,
}

impl RigidBodyDynamics {
    pub fn new(mass_properties: MassProperties) -> Self {
        Self { mass_properties }
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }
}

impl OdeModel for RigidBodyDynamics {
    type State = RigidBodyState;
    type Input = Wrench;
    type Error = SixDofErrors;

    fn f(
        &self,
        _t: f64,
        state: &RigidBodyState,
        wrench: &Wrench,
        derivative: &mut RigidBodyState,
    ) -> Result<(), SixDofErrors> {
        if !wrench.is_finite() {
            return Err(SixDofErrors::NonFiniteWrench);
        }
        // stage states drift off the unit sphere, normalize before use
        let q = state.orientation()?;
        let omega = state.angular_rate();
        let inertia = self.mass_properties.inertia();

        let acceleration = q.rotate(&wrench.force) / self.mass_properties.mass();
        let gyroscopic = omega.cross(&(inertia * omega));
        let angular_acceleration =
            self.mass_properties.inverse_inertia() * (wrench.moment - gyroscopic);

        derivative.set_position(&state.velocity());
        derivative.set_velocity(&acceleration);
        derivative.set_quaternion(&q.angular_rate_to_quaternion_rate(&omega));
        derivative.set_angular_rate(&angular_acceleration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use mass_properties::Inertia;
    use nalgebra::{Vector3, Vector4};
    use rotations::prelude::UnitQuaternion;
    use std::f64::consts::FRAC_PI_2;

    fn derivative(
        dynamics: &RigidBodyDynamics,
        state: &RigidBodyState,
        wrench: &Wrench,
    ) -> RigidBodyState {
        let mut d = RigidBodyState::default();
        dynamics.f(0.0, state, wrench, &mut d).unwrap();
        d
    }

    #[test]
    fn test_force_is_rotated_into_inertial_frame() {
        let mp = MassProperties::new(2.0, Inertia::default()).unwrap();
        let dynamics = RigidBodyDynamics::new(mp);
        let state = RigidBodyState::from_parts(
            &Vector3::zeros(),
            &Vector3::new(1.0, 2.0, 3.0),
            &UnitQuaternion::from_yaw(FRAC_PI_2).unwrap(),
            &Vector3::zeros(),
        );

        // nose points east, forward thrust accelerates east
        let d = derivative(&dynamics, &state, &Wrench::from_force(Vector3::new(4.0, 0.0, 0.0)));
        assert_eq!(d.position(), Vector3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(d.velocity(), Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
        assert_eq!(d.quaternion(), Vector4::zeros());
        assert_eq!(d.angular_rate(), Vector3::zeros());
    }

    #[test]
    fn test_gyroscopic_coupling() {
        let inertia = Inertia::diagonal(1.0, 2.0, 3.0).unwrap();
        let dynamics = RigidBodyDynamics::new(MassProperties::new(1.0, inertia).unwrap());
        let omega = Vector3::new(1.0, 1.0, 0.0);
        let state = RigidBodyState::from_parts(
            &Vector3::zeros(),
            &Vector3::zeros(),
            &UnitQuaternion::IDENTITY,
            &omega,
        );

        // Euler's equations: I3 r_dot = (I1 - I2) p q
        let d = derivative(&dynamics, &state, &Wrench::default());
        assert_abs_diff_eq!(d.angular_rate(), Vector3::new(0.0, 0.0, -1.0 / 3.0), epsilon = 1e-12);
    }

    #[test]
    fn test_moment_through_inverse_inertia() {
        let inertia = Inertia::diagonal(2.0, 4.0, 5.0).unwrap();
        let dynamics = RigidBodyDynamics::new(MassProperties::new(1.0, inertia).unwrap());
        let d = derivative(
            &dynamics,
            &RigidBodyState::rest(),
            &Wrench::from_moment(Vector3::new(1.0, 1.0, -1.0)),
        );
        assert_abs_diff_eq!(d.angular_rate(), Vector3::new(0.5, 0.25, -0.2), epsilon = 1e-12);
    }

    #[test]
    fn test_quaternion_rate() {
        let dynamics = RigidBodyDynamics::default();
        let mut state = RigidBodyState::rest();
        state.set_angular_rate(&Vector3::new(0.0, 0.0, 2.0));

        let d = derivative(&dynamics, &state, &Wrench::default());
        assert_abs_diff_eq!(d.quaternion(), Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-15);
    }

    #[test]
    fn test_non_finite_wrench_is_error() {
        let dynamics = RigidBodyDynamics::default();
        let mut d = RigidBodyState::default();
        for wrench in [
            Wrench::from_force(Vector3::new(f64::NAN, 0.0, 0.0)),
            Wrench::from_moment(Vector3::new(0.0, 0.0, f64::NAN)),
        ] {
            assert_eq!(
                dynamics.f(0.0, &RigidBodyState::rest(), &wrench, &mut d),
                Err(SixDofErrors::NonFiniteWrench)
            );
        }
    }

    #[test]
    fn test_zero_quaternion_is_error() {
        let dynamics = RigidBodyDynamics::default();
        let state = RigidBodyState::default();
        let mut d = RigidBodyState::default();
        assert!(matches!(
            dynamics.f(0.0, &state, &Wrench::default(), &mut d),
            Err(SixDofErrors::Quaternion(_))
        ));
    }
}
