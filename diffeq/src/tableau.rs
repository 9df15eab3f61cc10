/// Coefficients of an explicit Runge-Kutta method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButcherTableau<const STAGES: usize> {
    pub a: [[f64; STAGES]; STAGES],
    pub b: [f64; STAGES],
    pub c: [f64; STAGES],
}

impl ButcherTableau<4> {
    // usage is ButcherTableau::<4>::RK4
    pub const RK4: Self = Self {
        a: [
            [0., 0., 0., 0.],
            [1. / 2., 0., 0., 0.],
            [0., 1. / 2., 0., 0.],
            [0., 0., 1., 0.],
        ],
        b: [1. / 6., 1. / 3., 1. / 3., 1. / 6.],
        c: [0., 1.0 / 2.0, 1.0 / 2.0, 1.0],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rk4_tableau_is_consistent() {
        let t = ButcherTableau::<4>::RK4;
        assert_abs_diff_eq!(t.b.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
        // each c is the row sum of a
        for s in 0..4 {
            assert_abs_diff_eq!(t.a[s].iter().sum::<f64>(), t.c[s], epsilon = 1e-15);
        }
    }
}
