//! Six degree of freedom rigid body model.
//!
//! Body frame is X forward, Y right, Z down. The inertial frame is NED.

pub mod body;
pub mod config;
pub mod dynamics;
pub mod pose;
pub mod state;
pub mod wrench;

use diffeq::DiffeqErrors;
use mass_properties::MassPropertiesErrors;
use rotations::{
    InvalidLength,
    prelude::{EulerAnglesErrors, QuaternionErrors},
};
use thiserror::Error;

pub mod prelude {
    pub use crate::SixDofErrors;
    pub use crate::body::RigidBody;
    pub use crate::config::*;
    pub use crate::dynamics::RigidBodyDynamics;
    pub use crate::pose::Pose;
    pub use crate::state::RigidBodyState;
    pub use crate::wrench::Wrench;
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SixDofErrors {
    #[error("{0}")]
    Diffeq(#[from] DiffeqErrors),
    #[error("{0}")]
    EulerAngles(#[from] EulerAnglesErrors),
    #[error("{0}")]
    InvalidLength(#[from] InvalidLength),
    #[error("{0}")]
    MassProperties(#[from] MassPropertiesErrors),
    #[error("wrench has non-finite components")]
    NonFiniteWrench,
    #[error("{0}")]
    Quaternion(#[from] QuaternionErrors),
}
