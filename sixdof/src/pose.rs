use nalgebra::Vector3;
use rotations::prelude::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// Snapshot of where the body is, read once per frame by a visualization bridge.
///
/// Position is inertial NED, orientation is `[w, x, y, z]` body-to-inertial.
/// Any relabeling of axes for a particular viewer happens on the receiving side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub time: f64,
    pub position: [f64; 3],
    pub orientation: [f64; 4],
}

impl Pose {
    pub fn new(time: f64, position: &Vector3<f64>, orientation: &UnitQuaternion) -> Self {
        Self {
            time,
            position: [position[0], position[1], position[2]],
            orientation: (*orientation).into(),
        }
    }
}
