//! Adams-Moulton predictor-corrector methods, orders 2 to 5.
//!
//! Each step predicts `u[i+1]` with the Adams-Bashforth formula of the same
//! order and then iterates the implicit Moulton formula
//! `u = u[i] + dt/den (c0 f(t[i+1], u) + c1 f_i + c2 f_{i-1} + ...)`
//! starting from the predictor, until two successive corrector values differ by
//! less than the tolerance. Starting samples are produced as for Adams-Bashforth.
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::bootstrap::Bootstrap;
use crate::numerical::steppers::multistep::{AdamsBashforth, AdamsOrder, DerivativeHistory};
use crate::numerical::steppers::{Convergence, PC_TOLERANCE, StepOutcome, StepStrategy};
use crate::numerical::time_grid::GridState;
use log::{debug, warn};
use std::fmt::Display;

// Adams-Moulton weights for f_{i+1}, f_i, f_{i-1}, ...; divide by the denominator
const AM2: [f64; 2] = [1.0, 1.0];
const AM3: [f64; 3] = [5.0, 8.0, -1.0];
const AM4: [f64; 4] = [9.0, 19.0, -5.0, 1.0];
const AM5: [f64; 5] = [251.0, 646.0, -264.0, 106.0, -19.0];

impl AdamsOrder {
    pub fn moulton_coefficients(self) -> &'static [f64] {
        match self {
            AdamsOrder::Second => &AM2,
            AdamsOrder::Third => &AM3,
            AdamsOrder::Fourth => &AM4,
            AdamsOrder::Fifth => &AM5,
        }
    }

    pub fn moulton_denominator(self) -> f64 {
        match self {
            AdamsOrder::Second => 2.0,
            AdamsOrder::Third => 12.0,
            AdamsOrder::Fourth => 24.0,
            AdamsOrder::Fifth => 720.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdamsMoulton {
    order: AdamsOrder,
    bootstrap: Bootstrap,
    history: DerivativeHistory,
    u_pred: f64,
    f_pred: f64,
    u_corr: f64,
    u_corr_old: f64,
    f_corr_old: f64,
    error: f64,
}

impl Display for AdamsMoulton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AdamsMoulton{} {{ starter: {}, predictor: {}, corrector: {}, error: {:e} }}",
            self.order.order(),
            self.bootstrap,
            self.u_pred,
            self.u_corr,
            self.error
        )
    }
}

impl AdamsMoulton {
    pub fn new(order: AdamsOrder) -> AdamsMoulton {
        AdamsMoulton {
            order,
            bootstrap: order.default_bootstrap(),
            history: DerivativeHistory::new(),
            u_pred: 0.0,
            f_pred: 0.0,
            u_corr: 0.0,
            u_corr_old: 0.0,
            f_corr_old: 0.0,
            error: 0.0,
        }
    }

    pub fn order(&self) -> AdamsOrder {
        self.order
    }

    fn fail(&self, step: usize, t: f64, iterations: usize) -> SolverError {
        warn!(
            "{} corrector did not converge at step {} (t = {}): error {:e} after {} iterations",
            self.name(),
            step,
            t,
            self.error,
            iterations
        );
        SolverError::NonConvergence {
            method: format!("AM{}", self.order.order()),
            step,
            t,
            iterations,
            last_error: self.error,
        }
    }
}

impl StepStrategy for AdamsMoulton {
    fn name(&self) -> &'static str {
        match self.order {
            AdamsOrder::Second => "AdamsMoulton2",
            AdamsOrder::Third => "AdamsMoulton3",
            AdamsOrder::Fourth => "AdamsMoulton4",
            AdamsOrder::Fifth => "AdamsMoulton5",
        }
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
        self.history.sync(problem, grid, i, self.order.order());
        if i < self.order.bootstrap_points() {
            return Ok(StepOutcome::explicit(
                self.bootstrap.advance(problem, grid.t[i], u_i, dt),
            ));
        }
        let t_next = grid.t[i + 1];

        self.u_pred = AdamsBashforth::extrapolate(self.order, &self.history, u_i, dt);
        self.f_pred = problem.f(t_next, self.u_pred);

        let coefficients = self.order.moulton_coefficients();
        let den = self.order.moulton_denominator();
        // the part of the Moulton sum that does not depend on the new value
        let known = u_i + dt * self.history.combine(&coefficients[1..]) / den;
        let weight = dt * coefficients[0] / den;

        self.u_corr_old = known + weight * self.f_pred;
        let mut iterations = 0;
        loop {
            self.f_corr_old = problem.f(t_next, self.u_corr_old);
            self.u_corr = known + weight * self.f_corr_old;
            self.error = (self.u_corr - self.u_corr_old).abs();
            iterations += 1;
            if !self.u_corr.is_finite() || !self.error.is_finite() {
                return Err(self.fail(i + 1, t_next, iterations));
            }
            if self.error < convergence.tolerance {
                break;
            }
            if iterations >= convergence.max_iterations {
                return Err(self.fail(i + 1, t_next, iterations));
            }
            self.u_corr_old = self.u_corr;
        }
        debug!(
            "{} step {}: {} corrector iterations, error {:e}",
            self.name(),
            i + 1,
            iterations,
            self.error
        );
        Ok(StepOutcome {
            value: self.u_corr,
            predicted: Some(self.u_pred),
            iterations,
        })
    }

    fn reset(&mut self) {
        *self = AdamsMoulton {
            bootstrap: self.bootstrap,
            ..AdamsMoulton::new(self.order)
        };
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

    fn default_tolerance(&self) -> Option<f64> {
        Some(PC_TOLERANCE)
    }
}
