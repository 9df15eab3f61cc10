//! Fixed-step explicit Runge-Kutta integration of ODE models.

pub mod model;
pub mod rk;
pub mod state;
pub mod tableau;

pub use model::OdeModel;
pub use rk::RungeKutta;
pub use state::Integrable;
pub use tableau::ButcherTableau;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DiffeqErrors {
    #[error("step size must be finite and positive, got {0}")]
    InvalidStepSize(f64),
}
