//! Implicit one-step methods.
//!
//! Backward Euler solves `u[i+1] = u[i] + dt f(t[i+1], u[i+1])` by a damped
//! fixed-point (Newton-like) iteration with the forward-difference slope of the
//! problem. Crank-Nicolson here is the predictor-corrector variant: an explicit
//! Euler predictor grid is advanced alongside and blended once per step with the
//! trapezoidal rule.
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::{Convergence, IMPLICIT_TOLERANCE, StepOutcome, StepStrategy};
use crate::numerical::time_grid::GridState;
use log::{debug, warn};
use std::fmt::Display;

#[derive(Debug, Clone, Default)]
pub struct BackwardEuler {
    u_old: f64,
    u_new: f64,
    err: f64,
}

impl Display for BackwardEuler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BackwardEuler {{ last iterate: {}, last error: {:e} }}",
            self.u_new, self.err
        )
    }
}

impl BackwardEuler {
    fn fail(&self, step: usize, t: f64, iterations: usize) -> SolverError {
        warn!(
            "Backward Euler did not converge at step {} (t = {}): error {:e} after {} iterations",
            step, t, self.err, iterations
        );
        SolverError::NonConvergence {
            method: "BE".to_string(),
            step,
            t,
            iterations,
            last_error: self.err,
        }
    }
}

impl StepStrategy for BackwardEuler {
    fn name(&self) -> &'static str {
        "BackwardEuler"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let dt = grid.dt;
        let u_i = grid.u[i];
        let t_next = grid.t[i + 1];
        // explicit predictor with the slope taken at the new time
        let predicted = u_i + dt * problem.f(t_next, u_i);
        self.u_old = predicted;
        self.err = f64::INFINITY;
        let mut iterations = 0;
        loop {
            let slope = problem.dfdu(t_next, self.u_old);
            let residual = self.u_old - (u_i + dt * problem.f(t_next, self.u_old));
            self.u_new = self.u_old - residual / (1.0 - dt * slope);
            self.err = (self.u_new - self.u_old).abs();
            iterations += 1;
            if !self.u_new.is_finite() || !self.err.is_finite() {
                return Err(self.fail(i + 1, t_next, iterations));
            }
            self.u_old = self.u_new;
            if self.err <= convergence.tolerance {
                break;
            }
            if iterations >= convergence.max_iterations {
                return Err(self.fail(i + 1, t_next, iterations));
            }
        }
        debug!("BE step {}: {} iterations, error {:e}", i + 1, iterations, self.err);
        Ok(StepOutcome {
            value: self.u_new,
            predicted: Some(predicted),
            iterations,
        })
    }

    fn reset(&mut self) {
        *self = BackwardEuler::default();
    }

    fn default_tolerance(&self) -> Option<f64> {
        Some(IMPLICIT_TOLERANCE)
    }
}

/// Trapezoidal corrector over an explicit Euler predictor grid; one corrector
/// evaluation per step, no inner iteration.
#[derive(Debug, Clone, Default)]
pub struct CrankNicolson {
    f_now: f64,
    f_pred: f64,
}

impl StepStrategy for CrankNicolson {
    fn name(&self) -> &'static str {
        "CrankNicolson"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let dt = grid.dt;
        // the predictor grid evolves on its own, it is never reset to the corrected values
        let predicted = grid.predicted[i] + dt * problem.f(grid.t[i], grid.predicted[i]);
        self.f_now = problem.f(grid.t[i], grid.u[i]);
        self.f_pred = problem.f(grid.t[i + 1], predicted);
        Ok(StepOutcome {
            value: grid.u[i] + dt / 2.0 * (self.f_now + self.f_pred),
            predicted: Some(predicted),
            iterations: 0,
        })
    }
}
