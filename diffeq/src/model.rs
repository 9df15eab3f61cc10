use std::fmt::Debug;

use crate::{DiffeqErrors, state::Integrable};

/// Trait for defining a dynamical system model that can be numerically integrated.
///
/// Types implementing this trait must define how to compute the derivative (or RHS function)
/// of the ODE at a given time, state and input. `f` takes `&self` and must be a pure
/// function of its arguments, it is evaluated several times per step at trial states.
pub trait OdeModel: Debug {
    type State: Integrable;
    /// Held constant over a step.
    type Input;
    type Error: From<DiffeqErrors>;

    /// Compute the derivative at time `t` and state `state`, storing the result in `derivative`.
    fn f(
        &self,
        t: f64,
        state: &Self::State,
        input: &Self::Input,
        derivative: &mut Self::State,
    ) -> Result<(), Self::Error>;
}
