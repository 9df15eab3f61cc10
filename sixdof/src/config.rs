use mass_properties::{Inertia, MassProperties, MassPropertiesErrors};
use nalgebra::Vector3;
use ron::{
    error::SpannedError,
    from_str,
    ser::{PrettyConfig, to_string_pretty},
};
use rotations::prelude::{EulerAnglesErrors, QuaternionErrors, UNIT_TOLERANCE, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{SixDofErrors, body::RigidBody, state::RigidBodyState};

#[derive(Debug, Error)]
pub enum ConfigErrors {
    #[error("{0}")]
    EulerAngles(#[from] EulerAnglesErrors),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    MassProperties(#[from] MassPropertiesErrors),
    #[error("failed to parse RON: {0}")]
    Parse(#[from] SpannedError),
    #[error("{0}")]
    Quaternion(#[from] QuaternionErrors),
    #[error("failed to write RON: {0}")]
    Serialize(#[from] ron::Error),
    #[error("{0}")]
    SixDof(#[from] SixDofErrors),
}

/// How the initial attitude is written in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Attitude {
    /// `[w, x, y, z]`, normalized on load.
    Quaternion([f64; 4]),
    /// `[roll, pitch, yaw]` in degrees.
    EulerDegrees([f64; 3]),
}

impl Default for Attitude {
    fn default() -> Self {
        Attitude::Quaternion([1.0, 0.0, 0.0, 0.0])
    }
}

impl Attitude {
    pub fn orientation(&self) -> Result<UnitQuaternion, ConfigErrors> {
        match self {
            Attitude::Quaternion(q) => {
                let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
                if (norm - 1.0).abs() > UNIT_TOLERANCE {
                    warn!(norm, "initial attitude quaternion is not unit norm, renormalizing");
                }
                Ok(UnitQuaternion::from_slice(q)?)
            }
            Attitude::EulerDegrees(e) => Ok(UnitQuaternion::from_euler_degrees(e[0], e[1], e[2])?),
        }
    }
}

/// Initial conditions, every field falls back to rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// NED [m]
    pub position: [f64; 3],
    /// NED [m/s]
    pub velocity: [f64; 3],
    pub attitude: Attitude,
    /// body `[p, q, r]` [rad/s]
    pub angular_rate: [f64; 3],
}

impl InitialConditions {
    pub fn state(&self) -> Result<RigidBodyState, ConfigErrors> {
        Ok(RigidBodyState::from_parts(
            &Vector3::from(self.position),
            &Vector3::from(self.velocity),
            &self.attitude.orientation()?,
            &Vector3::from(self.angular_rate),
        ))
    }
}

/// Description of a rigid body as stored in a `.ron` file.
///
/// ```ron
/// (
///     mass: 5.0,
///     inertia: (1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0),
///     initial: (
///         position: (0.0, 0.0, -10.0),
///         attitude: EulerDegrees((0.0, 0.0, 90.0)),
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyConfig {
    /// [kg]
    pub mass: f64,
    /// Row-major inertia matrix about the center of mass. [kg m^2]
    pub inertia: [f64; 9],
    #[serde(default)]
    pub initial: InitialConditions,
}

impl Default for RigidBodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: Inertia::default().into(),
            initial: InitialConditions::default(),
        }
    }
}

impl RigidBodyConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigErrors> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&contents)?;
        debug!(?path, "loaded rigid body config");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigErrors> {
        fs::write(path, self.to_ron_string()?)?;
        debug!(?path, "saved rigid body config");
        Ok(())
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigErrors> {
        Ok(from_str(s)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigErrors> {
        Ok(to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn mass_properties(&self) -> Result<MassProperties, ConfigErrors> {
        let inertia = Inertia::from_row_slice(&self.inertia)?;
        Ok(MassProperties::new(self.mass, inertia)?)
    }

    /// Validates everything and creates the body at its initial conditions.
    pub fn build(&self) -> Result<RigidBody, ConfigErrors> {
        let state = self.initial.state()?;
        Ok(RigidBody::new(state, self.mass_properties()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    const CONFIG: &str = "(
        mass: 5.0,
        inertia: (2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0),
        initial: (
            position: (1.0, 2.0, -10.0),
            attitude: EulerDegrees((0.0, 0.0, 90.0)),
            angular_rate: (0.0, 0.0, 0.1),
        ),
    )";

    #[test]
    fn test_build_from_ron() {
        let body = RigidBodyConfig::from_ron_str(CONFIG).unwrap().build().unwrap();

        assert_eq!(body.mass_properties().mass(), 5.0);
        assert_eq!(body.mass_properties().inertia()[(2, 2)], 4.0);
        assert_eq!(body.position(), Vector3::new(1.0, 2.0, -10.0));
        assert_eq!(body.velocity(), Vector3::zeros());
        assert_eq!(body.angular_rate(), Vector3::new(0.0, 0.0, 0.1));
        assert_abs_diff_eq!(body.heading().unwrap(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_defaults() {
        let config = RigidBodyConfig::from_ron_str(
            "(mass: 1.0, inertia: (1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0))",
        )
        .unwrap();
        assert_eq!(config, RigidBodyConfig::default());

        let body = config.build().unwrap();
        assert_eq!(*body.state(), RigidBodyState::rest());
    }

    #[test]
    fn test_quaternion_attitude_is_normalized() {
        let config = RigidBodyConfig {
            initial: InitialConditions {
                attitude: Attitude::Quaternion([0.0, 0.0, 0.0, 2.0]),
                ..Default::default()
            },
            ..Default::default()
        };
        let body = config.build().unwrap();
        assert_eq!(body.state().quaternion()[3], 1.0);

        let config = RigidBodyConfig {
            initial: InitialConditions {
                attitude: Attitude::Quaternion([0.0; 4]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigErrors::Quaternion(QuaternionErrors::ZeroMagnitude))
        ));
    }

    #[test]
    fn test_non_finite_euler_attitude() {
        let config = RigidBodyConfig {
            initial: InitialConditions {
                attitude: Attitude::EulerDegrees([0.0, f64::NAN, 0.0]),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigErrors::EulerAngles(EulerAnglesErrors::NonFinite))
        ));
    }

    #[test]
    fn test_invalid_mass_properties() {
        let config = RigidBodyConfig {
            mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigErrors::MassProperties(MassPropertiesErrors::InvalidMass(_)))
        ));
    }

    #[test]
    fn test_parse_error() {
        let result = RigidBodyConfig::from_ron_str("(mass: 1.0)");
        assert!(matches!(result, Err(ConfigErrors::Parse(_))));
    }

    #[test]
    fn test_save_and_load() {
        let config = RigidBodyConfig::from_ron_str(CONFIG).unwrap();
        let path = std::env::temp_dir().join(format!("sixdof_config_{}.ron", std::process::id()));

        config.save(&path).unwrap();
        let loaded = RigidBodyConfig::load(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RigidBodyConfig::load(Path::new("/nonexistent/sixdof.ron"));
        assert!(matches!(result, Err(ConfigErrors::Io(_))));
    }
}
