use std::array;

use tracing::trace;

use crate::{DiffeqErrors, Integrable, OdeModel, tableau::ButcherTableau};

// preallocated buffers for intermediate calculations
#[derive(Debug)]
struct RKBuffers<State: Integrable, const STAGES: usize> {
    k: [State; STAGES],
    state: State,
    derivative: State,
}

impl<State: Integrable, const STAGES: usize> Default for RKBuffers<State, STAGES> {
    fn default() -> Self {
        Self {
            k: array::from_fn(|_| State::default()),
            state: State::default(),
            derivative: State::default(),
        }
    }
}

/// Explicit fixed-step Runge-Kutta integrator.
///
/// No error estimation and no step adaptation. Stability is up to the
/// caller's choice of step size.
#[derive(Debug)]
pub struct RungeKutta<State: Integrable, const STAGES: usize> {
    tableau: ButcherTableau<STAGES>,
    buffers: RKBuffers<State, STAGES>,
    last_derivative: State,
}

impl<State: Integrable> RungeKutta<State, 4> {
    /// Classical 4th order method, weights 1:2:2:1 / 6.
    pub fn rk4() -> Self {
        Self::new(ButcherTableau::<4>::RK4)
    }
}

impl<State: Integrable> Default for RungeKutta<State, 4> {
    fn default() -> Self {
        Self::rk4()
    }
}

impl<State: Integrable, const STAGES: usize> RungeKutta<State, STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>) -> Self {
        Self {
            tableau,
            buffers: RKBuffers::default(),
            last_derivative: State::default(),
        }
    }

    /// Advances `x` from `t` to `t + h`.
    ///
    /// # Arguments
    ///
    /// * `model` - Provides the derivative function.
    /// * `x` - State at time `t`.
    /// * `input` - Held constant over every stage of the step.
    /// * `t` - Current time.
    /// * `h` - Step size, must be finite and positive.
    ///
    /// # Returns
    ///
    /// The new state and the new time `t + h`. The mean derivative over the
    /// step, `(new - x) / h`, is kept and can be read with [`RungeKutta::last_derivative`].
    pub fn advance<Model>(
        &mut self,
        model: &Model,
        x: &State,
        input: &Model::Input,
        t: f64,
        h: f64,
    ) -> Result<(State, f64), Model::Error>
    where
        Model: OdeModel<State = State>,
    {
        if !(h.is_finite() && h > 0.0) {
            return Err(DiffeqErrors::InvalidStepSize(h).into());
        }

        let mut y = x.clone();
        self.step(model, x, input, t, h, &mut y)?;

        // increment / h
        self.last_derivative.clone_from(x);
        self.last_derivative *= -1.0;
        self.last_derivative += &y;
        self.last_derivative *= 1.0 / h;

        trace!(t, h, "runge-kutta step");
        Ok((y, t + h))
    }

    /// Mean derivative over the most recent step, zero before the first step.
    pub fn last_derivative(&self) -> &State {
        &self.last_derivative
    }

    // y = x + h * sum(b_s * k_s)
    fn step<Model>(
        &mut self,
        model: &Model,
        x: &State,
        input: &Model::Input,
        t: f64,
        h: f64,
        y: &mut State,
    ) -> Result<(), Model::Error>
    where
        Model: OdeModel<State = State>,
    {
        let RKBuffers {
            k,
            state,
            derivative,
        } = &mut self.buffers;

        // k0
        model.f(t, x, input, &mut k[0])?;

        // k1 - ks
        for s in 1..STAGES {
            // in place calculation of intermediate points
            *state *= 0.0;
            // sum previous ks with appropriate scaling from tableau
            for i in 0..s {
                derivative.clone_from(&k[i]);
                *derivative *= self.tableau.a[s][i];
                *state += &*derivative;
            }
            *state *= h;
            *state += x;

            model.f(t + self.tableau.c[s] * h, state, input, &mut k[s])?;
        }

        y.clone_from(x);
        for s in 0..STAGES {
            derivative.clone_from(&k[s]);
            *derivative *= self.tableau.b[s] * h;
            *y += &*derivative;
        }
        Ok(())
    }
}
