/// a collection of scalar test problems with known exact solutions
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use strum_macros::{Display, EnumIter, EnumString};

/*
 GaussianPulse:
 u' = -10(t-1)u,  u(0) = exp(-5),  t in [0, 2],  dt = 0.025
 exact solution: y = exp(-5(t-1)^2)

 StiffRelaxation:
 u' = -20u + 20 sin(t) + cos(t),  u(0) = 1,  t in [0, 2.5],  dt = 0.005
 exact solution: y = exp(-20t) + sin(t)

 ExponentialGrowth:
 u' = t u,  u(-2) = exp(2),  t in [-2, 2],  dt = 0.3
 exact solution: y = exp(t^2/2)

 Lorentzian:
 u' = -2t u^2,  u(-5) = 1/26,  t in [-5, 5],  dt = 0.04
 exact solution: y = 1/(1+t^2)

 RationalSingular:
 u' = (2t u^2 + 4)/(2(3 - t^2 u)),  u(-1) = 8,  t in [-1, -0.1],  dt = 0.05
 exact solution: y = (3 + sqrt(9 + 12t^2 - 4t^3))/t^2
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum SampleProblem {
    GaussianPulse,
    StiffRelaxation,
    ExponentialGrowth,
    Lorentzian,
    RationalSingular,
}

impl SampleProblem {
    pub fn rhs(self, t: f64, u: f64) -> f64 {
        match self {
            SampleProblem::GaussianPulse => -10.0 * (t - 1.0) * u,
            SampleProblem::StiffRelaxation => -20.0 * u + 20.0 * t.sin() + t.cos(),
            SampleProblem::ExponentialGrowth => t * u,
            SampleProblem::Lorentzian => -2.0 * t * u * u,
            SampleProblem::RationalSingular => {
                (2.0 * t * u * u + 4.0) / (2.0 * (3.0 - t * t * u))
            }
        }
    }

    pub fn exact(self, t: f64) -> f64 {
        match self {
            SampleProblem::GaussianPulse => (-5.0 * (t - 1.0).powi(2)).exp(),
            SampleProblem::StiffRelaxation => (-20.0 * t).exp() + t.sin(),
            SampleProblem::ExponentialGrowth => (t * t / 2.0).exp(),
            SampleProblem::Lorentzian => 1.0 / (1.0 + t * t),
            SampleProblem::RationalSingular => {
                (3.0 + (9.0 + 12.0 * t * t - 4.0 * t.powi(3)).sqrt()) / (t * t)
            }
        }
    }

    /// `(t0, tf, dt)`
    pub fn domain(self) -> (f64, f64, f64) {
        match self {
            SampleProblem::GaussianPulse => (0.0, 2.0, 0.025),
            SampleProblem::StiffRelaxation => (0.0, 2.5, 0.005),
            SampleProblem::ExponentialGrowth => (-2.0, 2.0, 0.3),
            SampleProblem::Lorentzian => (-5.0, 5.0, 0.04),
            SampleProblem::RationalSingular => (-1.0, -0.1, 0.05),
        }
    }

    pub fn initial_value(self) -> f64 {
        let (t0, _, _) = self.domain();
        self.exact(t0)
    }

    /// the problem on its own domain, reference solution attached
    pub fn problem(self) -> Result<IVPproblem, SolverError> {
        let (t0, tf, dt) = self.domain();
        self.problem_on(t0, tf, dt, self.initial_value())
    }

    /// same equation and reference on another domain or with another start value
    pub fn problem_on(self, t0: f64, tf: f64, dt: f64, u0: f64) -> Result<IVPproblem, SolverError> {
        Ok(IVPproblem::new(move |t, u| self.rhs(t, u), t0, tf, dt, u0)?
            .with_exact(move |t, _y| self.exact(t)))
    }
}
