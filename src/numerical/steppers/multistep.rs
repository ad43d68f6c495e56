//! Explicit multistep methods: LeapFrog and Adams-Bashforth of orders 2 to 5.
//!
//! A method of order `k` needs the derivatives at the `k` most recent samples.
//! The first `k - 1` samples after `u0` are computed with a one-step starter
//! ([`Bootstrap`]); from then on the recurrence reuses derivative values kept in
//! a [`DerivativeHistory`] instead of evaluating them again.
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::bootstrap::Bootstrap;
use crate::numerical::steppers::{Convergence, StepOutcome, StepStrategy};
use crate::numerical::time_grid::GridState;
use std::collections::VecDeque;

/// Number of derivative values an Adams formula combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdamsOrder {
    Second,
    Third,
    Fourth,
    Fifth,
}

// Adams-Bashforth weights for f_i, f_{i-1}, ...; divide by the denominator
const AB2: [f64; 2] = [3.0, -1.0];
const AB3: [f64; 3] = [23.0, -16.0, 5.0];
const AB4: [f64; 4] = [55.0, -59.0, 37.0, -9.0];
const AB5: [f64; 5] = [1901.0, -2774.0, 2616.0, -1274.0, 251.0];

impl AdamsOrder {
    pub fn order(self) -> usize {
        match self {
            AdamsOrder::Second => 2,
            AdamsOrder::Third => 3,
            AdamsOrder::Fourth => 4,
            AdamsOrder::Fifth => 5,
        }
    }

    /// samples that must come from the starter before the recurrence engages
    pub fn bootstrap_points(self) -> usize {
        self.order() - 1
    }

    /// starter used unless the caller picks another one
    pub fn default_bootstrap(self) -> Bootstrap {
        match self {
            AdamsOrder::Second | AdamsOrder::Third => Bootstrap::Heun,
            AdamsOrder::Fourth | AdamsOrder::Fifth => Bootstrap::RK4,
        }
    }

    pub fn bashforth_coefficients(self) -> &'static [f64] {
        match self {
            AdamsOrder::Second => &AB2,
            AdamsOrder::Third => &AB3,
            AdamsOrder::Fourth => &AB4,
            AdamsOrder::Fifth => &AB5,
        }
    }

    pub fn bashforth_denominator(self) -> f64 {
        match self {
            AdamsOrder::Second => 2.0,
            AdamsOrder::Third => 12.0,
            AdamsOrder::Fourth => 24.0,
            AdamsOrder::Fifth => 720.0,
        }
    }
}

impl TryFrom<usize> for AdamsOrder {
    type Error = SolverError;

    fn try_from(order: usize) -> Result<Self, Self::Error> {
        match order {
            2 => Ok(AdamsOrder::Second),
            3 => Ok(AdamsOrder::Third),
            4 => Ok(AdamsOrder::Fourth),
            5 => Ok(AdamsOrder::Fifth),
            _ => Err(SolverError::configuration(format!(
                "Adams methods are available for orders 2 to 5, got {}",
                order
            ))),
        }
    }
}

/// Derivative values `f_i, f_{i-1}, ...` most recent first.
#[derive(Debug, Clone, Default)]
pub struct DerivativeHistory {
    values: VecDeque<f64>,
    last_index: Option<usize>,
}

impl DerivativeHistory {
    pub fn new() -> DerivativeHistory {
        DerivativeHistory::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.last_index = None;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Makes the history end at sample `i` and keep at most `depth` values.
    /// Only `f(t[i], u[i])` is evaluated when the previous call ended at `i - 1`;
    /// otherwise the history is rebuilt from the grid. Returns `f_i`.
    pub fn sync(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        i: usize,
        depth: usize,
    ) -> f64 {
        if self.last_index == Some(i) && !self.values.is_empty() {
            return self.values[0];
        }
        let depth = depth.max(1);
        if i > 0 && self.last_index == Some(i - 1) {
            self.values.push_front(problem.f(grid.t[i], grid.u[i]));
        } else {
            self.values.clear();
            for j in (i + 1).saturating_sub(depth)..=i {
                self.values.push_front(problem.f(grid.t[j], grid.u[j]));
            }
        }
        self.values.truncate(depth);
        self.last_index = Some(i);
        self.values[0]
    }

    /// `sum_j coefficients[j] * f_{i-j}`
    pub fn combine(&self, coefficients: &[f64]) -> f64 {
        coefficients
            .iter()
            .zip(self.values.iter())
            .map(|(c, f)| c * f)
            .sum()
    }
}

/// Centered two-step scheme `u[i+1] = u[i-1] + 2 dt f(t[i], u[i])`.
#[derive(Debug, Clone)]
pub struct LeapFrog {
    bootstrap: Bootstrap,
    f_now: f64,
}

impl Default for LeapFrog {
    fn default() -> Self {
        LeapFrog {
            bootstrap: Bootstrap::Midpoint,
            f_now: 0.0,
        }
    }
}

impl StepStrategy for LeapFrog {
    fn name(&self) -> &'static str {
        "LeapFrog"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        if i < 1 {
            return Ok(StepOutcome::explicit(
                self.bootstrap.advance(problem, grid.t[i], grid.u[i], grid.dt),
            ));
        }
        self.f_now = problem.f(grid.t[i], grid.u[i]);
        Ok(StepOutcome::explicit(grid.u[i - 1] + 2.0 * grid.dt * self.f_now))
    }

    fn bootstrap_points(&self) -> usize {
        1
    }

    fn bootstrap(&self) -> Option<Bootstrap> {
        Some(self.bootstrap)
    }

    fn set_bootstrap(&mut self, bootstrap: Bootstrap) -> bool {
        self.bootstrap = bootstrap;
        true
    }
}

#[derive(Debug, Clone)]
pub struct AdamsBashforth {
    order: AdamsOrder,
    bootstrap: Bootstrap,
    history: DerivativeHistory,
}

impl AdamsBashforth {
    pub fn new(order: AdamsOrder) -> AdamsBashforth {
        AdamsBashforth {
            order,
            bootstrap: order.default_bootstrap(),
            history: DerivativeHistory::new(),
        }
    }

    pub fn order(&self) -> AdamsOrder {
        self.order
    }

    /// `u_i + dt * sum_j b_j f_{i-j}`; the history must end at `i`
    pub(crate) fn extrapolate(
        order: AdamsOrder,
        history: &DerivativeHistory,
        u_i: f64,
        dt: f64,
    ) -> f64 {
        u_i + dt * history.combine(order.bashforth_coefficients()) / order.bashforth_denominator()
    }
}

impl StepStrategy for AdamsBashforth {
    fn name(&self) -> &'static str {
        match self.order {
            AdamsOrder::Second => "AdamsBashforth2",
            AdamsOrder::Third => "AdamsBashforth3",
            AdamsOrder::Fourth => "AdamsBashforth4",
            AdamsOrder::Fifth => "AdamsBashforth5",
        }
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let depth = self.order.order();
        self.history.sync(problem, grid, i, depth);
        if i < self.order.bootstrap_points() {
            return Ok(StepOutcome::explicit(
                self.bootstrap.advance(problem, grid.t[i], grid.u[i], grid.dt),
            ));
        }
        Ok(StepOutcome::explicit(AdamsBashforth::extrapolate(
            self.order,
            &self.history,
            grid.u[i],
            grid.dt,
        )))
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn bootstrap_points(&self) -> usize {
        self.order.bootstrap_points()
    }

    fn bootstrap(&self) -> Option<Bootstrap> {
        Some(self.bootstrap)
    }

    fn set_bootstrap(&mut self, bootstrap: Bootstrap) -> bool {
        self.bootstrap = bootstrap;
        true
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//          TESTS
///////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests_multistep {
    use super::*;
    use crate::numerical::time_grid::TimeGrid;
    use approx::assert_relative_eq;

    /// drives a stepper over a whole grid the way the solver does
    fn integrate<S: StepStrategy>(stepper: &mut S, problem: &IVPproblem) -> TimeGrid {
        let mut grid = TimeGrid::for_problem(problem);
        grid.seed(problem.u0());
        stepper.reset();
        for i in 0..grid.steps() {
            let outcome = {
                let state = GridState::new(problem, &grid);
                stepper.step(problem, &state, &Convergence::default(), i).unwrap()
            };
            grid.record(i + 1, &outcome);
        }
        grid
    }

    #[test]
    fn coefficient_tables_are_consistent() {
        for order in [
            AdamsOrder::Second,
            AdamsOrder::Third,
            AdamsOrder::Fourth,
            AdamsOrder::Fifth,
        ] {
            let sum: f64 = order.bashforth_coefficients().iter().sum();
            // weights of a consistent method add up to one
            assert_relative_eq!(sum / order.bashforth_denominator(), 1.0, epsilon = 1e-15);
            assert_eq!(order.bashforth_coefficients().len(), order.order());
        }
        assert!(AdamsOrder::try_from(6).is_err());
        assert_eq!(AdamsOrder::try_from(4).unwrap(), AdamsOrder::Fourth);
    }

    #[test]
    fn history_reuses_previous_values() {
        let p = IVPproblem::new(|t, _u| t, 0.0, 1.0, 0.25, 0.0).unwrap();
        let t = [0.0, 0.25, 0.5, 0.75, 1.0];
        let u = [0.0; 5];
        let state = GridState {
            t: &t,
            u: &u,
            predicted: &u,
            dt: 0.25,
            t0: 0.0,
            tf: 1.0,
            u0: 0.0,
            n_steps: 4,
        };
        let mut h = DerivativeHistory::new();
        // rebuilt from the grid
        assert_eq!(h.sync(&p, &state, 2, 3), 0.5);
        assert_eq!(h.len(), 3);
        assert_eq!(h.sync(&p, &state, 3, 3), 0.75);
        assert_eq!(h.len(), 3);
        // 0.75 - 0.5 + 0.25
        assert_eq!(h.combine(&[1.0, -1.0, 1.0]), 0.5);
    }

    #[test]
    fn bootstrap_points_match_starter() {
        // u' = -t u^2 has a nontrivial derivative in both arguments
        let p = IVPproblem::new(|t, u| -t * u * u, 0.0, 1.0, 0.1, 1.0).unwrap();
        for order in [
            AdamsOrder::Second,
            AdamsOrder::Third,
            AdamsOrder::Fourth,
            AdamsOrder::Fifth,
        ] {
            let mut ab = AdamsBashforth::new(order);
            let grid = integrate(&mut ab, &p);
            let u = grid.values();
            let starter = order.default_bootstrap();
            for i in 0..order.bootstrap_points() {
                let expected = starter.advance(&p, grid.times()[i], u[i], p.dt());
                assert_eq!(u[i + 1], expected);
            }
        }
    }

    #[test]
    fn recurrence_is_exact_for_polynomial_derivatives() {
        // f = p'(t) with p of degree k makes the order k formula exact from index k - 1 on
        for (order, k) in [
            (AdamsOrder::Second, 2),
            (AdamsOrder::Third, 3),
            (AdamsOrder::Fourth, 4),
            (AdamsOrder::Fifth, 5),
        ] {
            let kf = k as f64;
            let p = IVPproblem::new(move |t, _u| kf * t.powi(k - 1), 0.0, 1.0, 0.05, 0.0).unwrap();
            let mut ab = AdamsBashforth::new(order);
            let grid = integrate(&mut ab, &p);
            let t = grid.times();
            let u = grid.values();
            for i in order.bootstrap_points()..grid.steps() {
                let exact = t[i + 1].powi(k) - t[i].powi(k);
                assert_relative_eq!(u[i + 1] - u[i], exact, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn leapfrog_recurrence() {
        let p = IVPproblem::new(|_t, u| -u, 0.0, 1.0, 0.1, 1.0).unwrap();
        let mut lf = LeapFrog::default();
        let grid = integrate(&mut lf, &p);
        let u = grid.values();
        assert_eq!(u[1], Bootstrap::Midpoint.advance(&p, 0.0, 1.0, 0.1));
        for i in 1..grid.steps() {
            assert_relative_eq!(u[i + 1], u[i - 1] - 0.2 * u[i], epsilon = 1e-15);
        }
        assert_relative_eq!(u[10], (-1.0_f64).exp(), epsilon = 1e-2);
    }

    #[test]
    fn starter_can_be_replaced() {
        let mut ab = AdamsBashforth::new(AdamsOrder::Fifth);
        assert_eq!(ab.bootstrap(), Some(Bootstrap::RK4));
        assert!(ab.set_bootstrap(Bootstrap::Merson));
        assert_eq!(ab.bootstrap(), Some(Bootstrap::Merson));
    }
}
