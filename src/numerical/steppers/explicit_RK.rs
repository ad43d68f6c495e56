//! Explicit one-step methods: Forward Euler, Modified Euler (midpoint), Heun,
//! classical 4-stage Runge-Kutta, and the 5-stage Runge-Kutta-Merson scheme
//! which is only used to start multistep methods.
//!
//! Each method keeps its stage values `k1..k5` as scratch fields; they are
//! overwritten on every step. `advance` does one step from `(t, u)` and is
//! shared with the multistep starters.
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::{Convergence, StepOutcome, StepStrategy};
use crate::numerical::time_grid::GridState;

/// `u[i+1] = u[i] + dt f(t[i], u[i])`
#[derive(Debug, Clone, Default)]
pub struct ForwardEuler {
    k1: f64,
}

impl ForwardEuler {
    pub fn advance(&mut self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        self.k1 = problem.f(t, u);
        u + dt * self.k1
    }
}

impl StepStrategy for ForwardEuler {
    fn name(&self) -> &'static str {
        "ForwardEuler"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let value = self.advance(problem, grid.t[i], grid.u[i], grid.dt);
        Ok(StepOutcome::explicit(value))
    }
}

/// Midpoint rule: the slope is sampled half a step ahead.
#[derive(Debug, Clone, Default)]
pub struct ModifiedEuler {
    k1: f64,
    k2: f64,
}

impl ModifiedEuler {
    pub fn advance(&mut self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        self.k1 = problem.f(t, u);
        self.k2 = problem.f(t + dt / 2.0, u + self.k1 * dt / 2.0);
        u + dt * self.k2
    }
}

impl StepStrategy for ModifiedEuler {
    fn name(&self) -> &'static str {
        "ModifiedEuler"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let value = self.advance(problem, grid.t[i], grid.u[i], grid.dt);
        Ok(StepOutcome::explicit(value))
    }
}

/// Heun: average of the slopes at both ends of an Euler step.
#[derive(Debug, Clone, Default)]
pub struct Heun {
    k1: f64,
    k2: f64,
}

impl Heun {
    pub fn advance(&mut self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        self.k1 = problem.f(t, u);
        self.k2 = problem.f(t + dt, u + self.k1 * dt);
        u + dt / 2.0 * (self.k1 + self.k2)
    }
}

impl StepStrategy for Heun {
    fn name(&self) -> &'static str {
        "Heun"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let value = self.advance(problem, grid.t[i], grid.u[i], grid.dt);
        Ok(StepOutcome::explicit(value))
    }
}

/// Classic Runge-Kutta 4th order
#[derive(Debug, Clone, Default)]
pub struct RungeKutta4 {
    k1: f64,
    k2: f64,
    k3: f64,
    k4: f64,
}

impl RungeKutta4 {
    pub fn advance(&mut self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        // k1 = f(t, u)
        self.k1 = problem.f(t, u);
        // k2 = f(t + dt/2, u + dt*k1/2)
        self.k2 = problem.f(t + dt / 2.0, u + self.k1 * dt / 2.0);
        // k3 = f(t + dt/2, u + dt*k2/2)
        self.k3 = problem.f(t + dt / 2.0, u + self.k2 * dt / 2.0);
        // k4 = f(t + dt, u + dt*k3)
        self.k4 = problem.f(t + dt, u + self.k3 * dt);
        u + dt / 6.0 * (self.k1 + 2.0 * self.k2 + 2.0 * self.k3 + self.k4)
    }
}

impl StepStrategy for RungeKutta4 {
    fn name(&self) -> &'static str {
        "RungeKutta4"
    }

    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        _convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError> {
        let value = self.advance(problem, grid.t[i], grid.u[i], grid.dt);
        Ok(StepOutcome::explicit(value))
    }
}

/// Runge-Kutta-Merson, five stages; stages are kept pre-multiplied by `dt`.
#[derive(Debug, Clone, Default)]
pub struct RungeKuttaMerson {
    k1: f64,
    k2: f64,
    k3: f64,
    k4: f64,
    k5: f64,
}

impl RungeKuttaMerson {
    pub fn advance(&mut self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        self.k1 = dt * problem.f(t, u);
        self.k2 = dt * problem.f(t + dt / 3.0, u + self.k1 / 3.0);
        self.k3 = dt * problem.f(t + dt / 3.0, u + (self.k1 + self.k2) / 6.0);
        self.k4 = dt * problem.f(t + dt / 2.0, u + (self.k1 + 3.0 * self.k3) / 8.0);
        self.k5 = dt * problem.f(t + dt, u + (self.k1 - 3.0 * self.k3 + 4.0 * self.k4) / 2.0);
        u + (self.k1 + 4.0 * self.k4 + self.k5) / 6.0
    }
}
