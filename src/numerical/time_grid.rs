//! Fixed time grid shared by all steppers.
//!
//! The grid is sized once from the problem domain: `N` steps give `N + 1`
//! samples with `t[0] = t0` and `t[i] = t[i-1] + dt`. Values are filled index
//! by index while a solver runs; nothing is ever resized afterwards.
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::StepOutcome;

/// relative distance to the nearest integer below which `(tf - t0)/dt` is rounded instead of truncated
pub const STEP_COUNT_SNAP: f64 = 1e-9;
/// Upper bound on the number of grid steps.
///
/// A grid keeps four vectors of `N + 1` entries, so this caps one solver at
/// roughly 540 MB. Larger domains are rejected before anything is allocated.
pub const MAX_STEPS: usize = 1 << 24;

/// Number of steps `N` for the domain `[t0, tf]` with step `dt`.
///
/// `(tf - t0)/dt` is rounded to the nearest integer when it lies within
/// `STEP_COUNT_SNAP` (relative) of it, otherwise truncated. So `0.9/0.05`
/// gives 18 although the floating point quotient is 17.999999999999996.
/// `dt` may be negative if `tf < t0` (integration backwards in time).
pub fn step_count(t0: f64, tf: f64, dt: f64) -> Result<usize, SolverError> {
    if !(t0.is_finite() && tf.is_finite() && dt.is_finite()) {
        return Err(SolverError::configuration(format!(
            "domain parameters must be finite: t0 = {}, tf = {}, dt = {}",
            t0, tf, dt
        )));
    }
    if dt == 0.0 {
        return Err(SolverError::configuration("step size dt must not be zero"));
    }
    let span = tf - t0;
    if span == 0.0 {
        return Err(SolverError::configuration(format!(
            "empty domain: t0 = tf = {}",
            t0
        )));
    }
    if span.signum() != dt.signum() {
        return Err(SolverError::configuration(format!(
            "step size dt = {} points away from tf - t0 = {}",
            dt, span
        )));
    }
    let ratio = span / dt;
    if !ratio.is_finite() {
        return Err(SolverError::configuration(format!(
            "(tf - t0)/dt is not finite for dt = {}",
            dt
        )));
    }
    let nearest = ratio.round();
    let n = if (ratio - nearest).abs() <= STEP_COUNT_SNAP * nearest.max(1.0) {
        nearest
    } else {
        ratio.floor()
    };
    if n < 1.0 {
        return Err(SolverError::configuration(format!(
            "dt = {} is larger than the domain length {}: no step fits",
            dt, span
        )));
    }
    if n > MAX_STEPS as f64 {
        return Err(SolverError::configuration(format!(
            "{} steps requested, at most {} supported",
            n, MAX_STEPS
        )));
    }
    Ok(n as usize)
}

/// Time and solution samples owned by one solver.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    t: Vec<f64>,
    u: Vec<f64>,
    // predictor grid for Crank-Nicolson, committed predictor values for Adams-Moulton
    predicted: Vec<f64>,
    iterations: Vec<usize>,
    filled: usize,
}

impl TimeGrid {
    /// grid of `n_steps + 1` samples starting at `t0`; no value is computed yet
    pub fn new(t0: f64, dt: f64, n_steps: usize) -> TimeGrid {
        let mut t = Vec::with_capacity(n_steps + 1);
        let mut time = t0;
        t.push(time);
        for _ in 0..n_steps {
            time += dt;
            t.push(time);
        }
        TimeGrid {
            t,
            u: vec![0.0; n_steps + 1],
            predicted: vec![0.0; n_steps + 1],
            iterations: vec![0; n_steps + 1],
            filled: 0,
        }
    }

    pub fn for_problem(problem: &IVPproblem) -> TimeGrid {
        TimeGrid::new(problem.t0(), problem.dt(), problem.steps())
    }

    /// number of samples, `N + 1`
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn steps(&self) -> usize {
        self.t.len() - 1
    }

    /// number of samples already computed
    pub fn computed(&self) -> usize {
        self.filled
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.t.len()
    }

    /// all grid times, computed or not
    pub fn times(&self) -> &[f64] {
        &self.t
    }

    /// computed solution values
    pub fn values(&self) -> &[f64] {
        &self.u[..self.filled]
    }

    /// computed predictor values (equal to `values` for methods without a predictor)
    pub fn predicted_values(&self) -> &[f64] {
        &self.predicted[..self.filled]
    }

    /// fixed-point iterations spent on each computed sample (0 for explicit steps)
    pub fn iterations(&self) -> &[usize] {
        &self.iterations[..self.filled]
    }

    /// computed `(t, u)` pairs in increasing index order
    pub fn trajectory(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.t.iter().copied().zip(self.values().iter().copied())
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        if self.filled == 0 {
            None
        } else {
            Some((self.t[self.filled - 1], self.u[self.filled - 1]))
        }
    }

    pub(crate) fn clear(&mut self) {
        self.u.iter_mut().for_each(|v| *v = 0.0);
        self.predicted.iter_mut().for_each(|v| *v = 0.0);
        self.iterations.iter_mut().for_each(|k| *k = 0);
        self.filled = 0;
    }

    pub(crate) fn seed(&mut self, u0: f64) {
        self.u[0] = u0;
        self.predicted[0] = u0;
        self.iterations[0] = 0;
        self.filled = 1;
    }

    /// stores the outcome of the step that produced sample `index`
    pub(crate) fn record(&mut self, index: usize, outcome: &StepOutcome) {
        debug_assert_eq!(index, self.filled, "grid samples must be filled in order");
        self.u[index] = outcome.value;
        self.predicted[index] = outcome.predicted.unwrap_or(outcome.value);
        self.iterations[index] = outcome.iterations;
        self.filled = index + 1;
    }
}

/// Read-only view of the grid and domain handed to a stepper for one step.
///
/// Samples `0..=i` of `u` and `predicted` are valid when step `i -> i+1` runs.
#[derive(Debug, Clone, Copy)]
pub struct GridState<'a> {
    pub t: &'a [f64],
    pub u: &'a [f64],
    pub predicted: &'a [f64],
    pub dt: f64,
    pub t0: f64,
    pub tf: f64,
    pub u0: f64,
    pub n_steps: usize,
}

impl<'a> GridState<'a> {
    pub fn new(problem: &IVPproblem, grid: &'a TimeGrid) -> GridState<'a> {
        GridState {
            t: &grid.t,
            u: &grid.u,
            predicted: &grid.predicted,
            dt: problem.dt(),
            t0: problem.t0(),
            tf: problem.tf(),
            u0: problem.u0(),
            n_steps: grid.steps(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn step_count_exact_multiples() {
        assert_eq!(step_count(0.0, 2.0, 0.025).unwrap(), 80);
        assert_eq!(step_count(0.0, 2.5, 0.005).unwrap(), 500);
        assert_eq!(step_count(-5.0, 5.0, 0.04).unwrap(), 250);
    }

    #[test]
    fn step_count_rounds_near_integers() {
        // 0.9/0.05 evaluates to 17.999999999999996
        assert_eq!(step_count(-1.0, -0.1, 0.05).unwrap(), 18);
    }

    #[test]
    fn step_count_truncates_partial_steps() {
        // 4/0.3 = 13.33..
        assert_eq!(step_count(-2.0, 2.0, 0.3).unwrap(), 13);
        assert_eq!(step_count(0.0, 1.0, 0.4).unwrap(), 2);
    }

    #[test]
    fn step_count_backwards_in_time() {
        assert_eq!(step_count(1.0, 0.0, -0.25).unwrap(), 4);
    }

    #[test]
    fn step_count_rejects_degenerate_domains() {
        assert!(step_count(0.0, 1.0, 0.0).is_err());
        assert!(step_count(0.0, 1.0, -0.1).is_err());
        assert!(step_count(1.0, 1.0, 0.1).is_err());
        assert!(step_count(0.0, 1.0, 2.0).is_err());
        assert!(step_count(0.0, f64::INFINITY, 0.1).is_err());
        assert!(step_count(0.0, 1.0, f64::NAN).is_err());
        assert!(step_count(0.0, 1.0, 1e-300).is_err());
    }

    #[test]
    fn step_count_rejects_grids_too_large_to_allocate() {
        let err = step_count(0.0, 1.0, 1e-9).unwrap_err();
        assert!(matches!(err, SolverError::Configuration(_)));
        assert!(err.to_string().contains("at most"));
        assert!(IVPproblem::new(|_t, u| -u, 0.0, 1.0, 1e-9, 1.0).is_err());

        let limit = MAX_STEPS as f64;
        assert_eq!(step_count(0.0, limit, 1.0).unwrap(), MAX_STEPS);
        assert!(step_count(0.0, limit + 1.0, 1.0).is_err());
    }

    #[test]
    fn grid_times_are_equally_spaced() {
        let grid = TimeGrid::new(0.5, 0.1, 10);
        assert_eq!(grid.len(), 11);
        assert_eq!(grid.steps(), 10);
        assert_eq!(grid.times()[0], 0.5);
        for w in grid.times().windows(2) {
            assert_relative_eq!(w[1] - w[0], 0.1, epsilon = 1e-12);
        }
        assert_eq!(grid.computed(), 0);
        assert!(grid.values().is_empty());
        assert!(grid.last().is_none());
    }

    #[test]
    fn grid_records_in_order() {
        let mut grid = TimeGrid::new(0.0, 0.5, 2);
        grid.seed(1.0);
        grid.record(
            1,
            &StepOutcome {
                value: 2.0,
                predicted: Some(1.5),
                iterations: 3,
            },
        );
        assert_eq!(grid.values(), &[1.0, 2.0]);
        assert_eq!(grid.predicted_values(), &[1.0, 1.5]);
        assert_eq!(grid.iterations(), &[0, 3]);
        assert_eq!(grid.last(), Some((0.5, 2.0)));
        assert!(!grid.is_complete());
        grid.clear();
        assert_eq!(grid.computed(), 0);
    }
}
