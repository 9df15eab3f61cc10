use nalgebra::SVector;
use std::{
    fmt::Debug,
    ops::{AddAssign, MulAssign},
};

/// Trait representing an integrable state for use in ODE solvers.
///
/// The solver only needs to scale a state and accumulate scaled states into
/// another, so derivatives are stored in the same type as the state itself.
pub trait Integrable: Clone + Default + Debug + MulAssign<f64>
where
    for<'a> Self: AddAssign<&'a Self>,
{
}

impl<const N: usize> Integrable for SVector<f64, N>
where
    Self: Default,
{
}
