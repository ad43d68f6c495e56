use crate::Utils::logger::{TrajectoryWriter, save_trajectory_to_csv};
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::steppers::{
    Bootstrap, Convergence, IMPLICIT_TOLERANCE, MAX_ITERATIONS, Method, StepStrategy, Stepper,
};
use crate::numerical::time_grid::{GridState, TimeGrid};
use log::{debug, info, warn};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

/// Fixed-step solver for one scalar problem and one method.
///
/// The solver owns a copy of the problem and a grid sized once at
/// construction. `run` fills the grid in memory; `run_to_file` and
/// `run_to_writer` do the same and also emit one `<t> <u>` line per sample as
/// soon as it is computed. Running again recomputes the grid from `u0`.
#[derive(Debug, Clone)]
pub struct OdeSolver {
    problem: IVPproblem,
    grid: TimeGrid,
    method: Method,
    stepper: Stepper,
    convergence: Convergence,
}

impl Display for OdeSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} solver on {}, computed {}/{} samples",
            self.method,
            self.problem,
            self.grid.computed(),
            self.grid.len()
        )
    }
}

impl OdeSolver {
    pub fn new(problem: &IVPproblem, method: Method) -> OdeSolver {
        let stepper = method.stepper();
        let convergence = Convergence {
            tolerance: stepper.default_tolerance().unwrap_or(IMPLICIT_TOLERANCE),
            max_iterations: MAX_ITERATIONS,
        };
        OdeSolver {
            problem: problem.clone(),
            grid: TimeGrid::for_problem(problem),
            method,
            stepper,
            convergence,
        }
    }

    /// method given by name, e.g. `"RK4"`, `"AB3"`, `"CrankNicolson"`
    pub fn from_name(problem: &IVPproblem, name: &str) -> Result<OdeSolver, SolverError> {
        let method = Method::from_str(name)
            .map_err(|_| SolverError::configuration(format!("unknown method '{}'", name)))?;
        Ok(OdeSolver::new(problem, method))
    }

    ///////////////////////////////// SETTINGS /////////////////////////////////

    /// stopping tolerance of the Backward Euler and Adams-Moulton loops
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<(), SolverError> {
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(SolverError::configuration(format!(
                "tolerance must be positive and finite, got {}",
                tolerance
            )));
        }
        self.convergence.tolerance = tolerance;
        Ok(())
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<(), SolverError> {
        if max_iterations == 0 {
            return Err(SolverError::configuration(
                "at least one iteration per step is required",
            ));
        }
        self.convergence.max_iterations = max_iterations;
        Ok(())
    }

    /// replaces the starter of a multistep method
    pub fn set_bootstrap(&mut self, bootstrap: Bootstrap) -> Result<(), SolverError> {
        if self.stepper.set_bootstrap(bootstrap) {
            Ok(())
        } else {
            Err(SolverError::configuration(format!(
                "{} is a one-step method and takes no starter",
                self.method
            )))
        }
    }

    ///////////////////////////////// RUNNING /////////////////////////////////

    /// integrates over the whole grid, keeping the result in memory only
    pub fn run(&mut self) -> Result<(), SolverError> {
        self.integrate::<std::io::Sink>(None)
    }

    /// Integrates and writes `<t> <u>` lines to `path`. The file is opened
    /// before anything is computed; if that fails the grid is left untouched.
    /// On a convergence failure the lines already written are kept.
    pub fn run_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SolverError> {
        let mut writer = TrajectoryWriter::create(path.as_ref())?;
        let result = self.integrate(Some(&mut writer));
        let flushed = writer.finish();
        result?;
        flushed
    }

    /// same as `run_to_file` for any byte sink
    pub fn run_to_writer<W: Write>(&mut self, sink: W) -> Result<(), SolverError> {
        let mut writer = TrajectoryWriter::new(sink, "<writer>");
        let result = self.integrate(Some(&mut writer));
        let flushed = writer.finish();
        result?;
        flushed
    }

    fn integrate<W: Write>(
        &mut self,
        mut sink: Option<&mut TrajectoryWriter<W>>,
    ) -> Result<(), SolverError> {
        let start = Instant::now();
        info!("Running {} solver", self.stepper.name());
        debug!("{}", self.problem);

        self.grid.clear();
        self.stepper.reset();
        self.grid.seed(self.problem.u0());
        if let Some(writer) = sink.as_deref_mut() {
            writer.write_point(self.problem.t0(), self.problem.u0())?;
        }

        let n_steps = self.grid.steps();
        let mut total_iterations = 0;
        for i in 0..n_steps {
            let state = GridState::new(&self.problem, &self.grid);
            let outcome = match self.stepper.step(&self.problem, &state, &self.convergence, i) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("{} solver stopped after {} of {} steps", self.method, i, n_steps);
                    return Err(e);
                }
            };
            total_iterations += outcome.iterations;
            self.grid.record(i + 1, &outcome);
            if let Some(writer) = sink.as_deref_mut() {
                writer.write_point(self.grid.times()[i + 1], outcome.value)?;
            }
        }

        if self.method.is_implicit() && total_iterations > 0 {
            debug!(
                "{} fixed-point iterations over {} steps",
                total_iterations, n_steps
            );
        }
        let duration = start.elapsed();
        info!(
            "{} solver done, took {} milliseconds",
            self.stepper.name(),
            duration.as_millis()
        );
        Ok(())
    }

    ///////////////////////////////// RESULTS /////////////////////////////////

    pub fn problem(&self) -> &IVPproblem {
        &self.problem
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn tolerance(&self) -> f64 {
        self.convergence.tolerance
    }

    pub fn max_iterations(&self) -> usize {
        self.convergence.max_iterations
    }

    pub fn bootstrap(&self) -> Option<Bootstrap> {
        self.stepper.bootstrap()
    }

    /// leading samples computed by the starter of a multistep method
    pub fn bootstrap_points(&self) -> usize {
        self.stepper.bootstrap_points()
    }

    pub fn times(&self) -> &[f64] {
        &self.grid.times()[..self.grid.computed()]
    }

    pub fn values(&self) -> &[f64] {
        self.grid.values()
    }

    /// predictor grid of Crank-Nicolson, predictor values of Adams-Moulton
    pub fn predicted_values(&self) -> &[f64] {
        self.grid.predicted_values()
    }

    pub fn iterations(&self) -> &[usize] {
        self.grid.iterations()
    }

    pub fn trajectory(&self) -> Vec<(f64, f64)> {
        self.grid.trajectory().collect()
    }

    pub fn final_value(&self) -> Option<f64> {
        if self.grid.is_complete() {
            self.grid.last().map(|(_, u)| u)
        } else {
            None
        }
    }

    pub fn get_result(&self) -> (Vec<f64>, Vec<f64>) {
        (self.times().to_vec(), self.values().to_vec())
    }

    /// `|u_i - y_i|` against the reference trajectory for every computed sample
    pub fn errors(&self) -> Option<Vec<f64>> {
        let reference = self.problem.reference_trajectory()?;
        Some(
            self.values()
                .iter()
                .zip(reference.iter())
                .map(|(u, (_, y))| (u - y).abs())
                .collect(),
        )
    }

    pub fn max_abs_error(&self) -> Option<f64> {
        let errors = self.errors()?;
        errors.into_iter().reduce(f64::max)
    }

    /// error at `tf`; `None` until the run is complete
    pub fn final_error(&self) -> Option<f64> {
        if !self.grid.is_complete() {
            return None;
        }
        self.errors()?.last().copied()
    }

    /// CSV with the computed values and, if known, the reference and the absolute error
    pub fn save_result_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        let reference: Option<Vec<f64>> = self
            .problem
            .reference_trajectory()
            .map(|points| points.into_iter().map(|(_, y)| y).collect());
        save_trajectory_to_csv(
            self.times(),
            self.values(),
            reference.as_deref(),
            "t",
            "u",
            path.as_ref(),
        )
    }
}
