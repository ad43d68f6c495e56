use crate::Utils::logger::TrajectoryWriter;
use crate::numerical::errors::SolverError;
use crate::numerical::time_grid::step_count;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// scalar function of two arguments: `f(t, u)` for the right hand side, `y(t, y_prev)` for the reference
pub type ScalarFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// step used by the forward-difference slope `dfdu`
pub const SLOPE_EPS: f64 = 1e-12;

/// Scalar initial value problem `du/dt = f(t, u)`, `u(t0) = u0` on `[t0, tf]` with fixed step `dt`.
///
/// Cloning is cheap: the functions are shared behind `Arc`. Every solver keeps
/// its own clone, so `set_rhs` on the caller's copy never changes a solver
/// that was built before.
#[derive(Clone)]
pub struct IVPproblem {
    rhs: ScalarFn,
    exact: Option<ScalarFn>,
    t0: f64,
    tf: f64,
    dt: f64,
    u0: f64,
    n_steps: usize,
}

impl fmt::Debug for IVPproblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IVPproblem")
            .field("t0", &self.t0)
            .field("tf", &self.tf)
            .field("dt", &self.dt)
            .field("u0", &self.u0)
            .field("n_steps", &self.n_steps)
            .field("has_reference", &self.exact.is_some())
            .finish()
    }
}

impl fmt::Display for IVPproblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IVP {{ t0: {}, tf: {}, dt: {}, u0: {}, steps: {} }}",
            self.t0, self.tf, self.dt, self.u0, self.n_steps
        )
    }
}

impl IVPproblem {
    /// Validates the domain and fixes the number of steps; see `time_grid::step_count`.
    pub fn new<F>(rhs: F, t0: f64, tf: f64, dt: f64, u0: f64) -> Result<IVPproblem, SolverError>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        let n_steps = step_count(t0, tf, dt)?;
        if !u0.is_finite() {
            return Err(SolverError::configuration(format!(
                "initial value must be finite, got {}",
                u0
            )));
        }
        Ok(IVPproblem {
            rhs: Arc::new(rhs),
            exact: None,
            t0,
            tf,
            dt,
            u0,
            n_steps,
        })
    }

    /// attaches a reference solution `y(t, y_prev)`
    pub fn with_exact<G>(mut self, exact: G) -> IVPproblem
    where
        G: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.exact = Some(Arc::new(exact));
        self
    }

    pub fn set_exact<G>(&mut self, exact: G)
    where
        G: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.exact = Some(Arc::new(exact));
    }

    /// replaces the right hand side of this descriptor only
    pub fn set_rhs<F>(&mut self, rhs: F)
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.rhs = Arc::new(rhs);
    }

    #[inline]
    pub fn f(&self, t: f64, u: f64) -> f64 {
        (self.rhs)(t, u)
    }

    /// forward-difference slope `(f(t, u + eps) - f(t, u)) / eps` used by implicit steppers
    #[inline]
    pub fn dfdu(&self, t: f64, u: f64) -> f64 {
        (self.f(t, u + SLOPE_EPS) - self.f(t, u)) / SLOPE_EPS
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }
    pub fn tf(&self) -> f64 {
        self.tf
    }
    pub fn dt(&self) -> f64 {
        self.dt
    }
    pub fn u0(&self) -> f64 {
        self.u0
    }

    /// number of steps `N`; the grid holds `N + 1` samples
    pub fn steps(&self) -> usize {
        self.n_steps
    }

    pub fn has_reference(&self) -> bool {
        self.exact.is_some()
    }

    /// Reference trajectory on the solver grid: `y_0 = u0`, `y_i = y(t_i, y_{i-1})`.
    pub fn reference_trajectory(&self) -> Option<Vec<(f64, f64)>> {
        let exact = self.exact.as_ref()?;
        let mut points = Vec::with_capacity(self.n_steps + 1);
        let mut time = self.t0;
        let mut y = self.u0;
        points.push((time, y));
        for _ in 0..self.n_steps {
            time += self.dt;
            y = exact(time, y);
            points.push((time, y));
        }
        Some(points)
    }

    /// writes the reference trajectory as `<t> <y>` lines
    pub fn write_reference<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        let points = self.reference_trajectory().ok_or_else(|| {
            SolverError::configuration("problem has no reference solution to write")
        })?;
        let mut writer = TrajectoryWriter::create(path.as_ref())?;
        for (t, y) in points {
            writer.write_point(t, y)?;
        }
        writer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn decay() -> IVPproblem {
        IVPproblem::new(|_t, u| -u, 0.0, 1.0, 0.1, 1.0)
            .unwrap()
            .with_exact(|t, _y| (-t).exp())
    }

    #[test]
    fn domain_accessors() {
        let p = decay();
        assert_eq!(p.t0(), 0.0);
        assert_eq!(p.tf(), 1.0);
        assert_eq!(p.dt(), 0.1);
        assert_eq!(p.u0(), 1.0);
        assert_eq!(p.steps(), 10);
        assert!(p.has_reference());
    }

    #[test]
    fn rejects_zero_step_and_bad_initial_value() {
        assert!(matches!(
            IVPproblem::new(|_t, u| u, 0.0, 1.0, 0.0, 1.0),
            Err(SolverError::Configuration(_))
        ));
        assert!(matches!(
            IVPproblem::new(|_t, u| u, 0.0, 1.0, 0.1, f64::NAN),
            Err(SolverError::Configuration(_))
        ));
    }

    #[test]
    fn slope_of_linear_rhs() {
        let p = IVPproblem::new(|t, u| 3.0 * u + t, 0.0, 1.0, 0.1, 1.0).unwrap();
        assert_relative_eq!(p.dfdu(0.5, 2.0), 3.0, epsilon = 1e-2);
    }

    #[test]
    fn set_rhs_leaves_clones_alone() {
        let mut p = decay();
        let before = p.clone();
        p.set_rhs(|_t, u| 2.0 * u);
        assert_eq!(p.f(0.0, 1.0), 2.0);
        assert_eq!(before.f(0.0, 1.0), -1.0);
    }

    #[test]
    fn reference_trajectory_on_grid() {
        let p = decay();
        let reference = p.reference_trajectory().unwrap();
        assert_eq!(reference.len(), 11);
        assert_eq!(reference[0], (0.0, 1.0));
        let (t_end, y_end) = reference[10];
        assert_relative_eq!(t_end, 1.0, epsilon = 1e-12);
        assert_relative_eq!(y_end, (-1.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn no_reference_without_exact() {
        let p = IVPproblem::new(|_t, u| u, 0.0, 1.0, 0.5, 1.0).unwrap();
        assert!(p.reference_trajectory().is_none());
        assert!(p.write_reference("unused.out").is_err());
    }

    #[test]
    fn write_reference_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytical.out");
        decay().write_reference(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "0 1");
        assert!(text.ends_with('\n'));
    }
}
