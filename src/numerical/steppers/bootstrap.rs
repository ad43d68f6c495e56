use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::steppers::explicit_RK::{
    ForwardEuler, Heun, ModifiedEuler, RungeKutta4, RungeKuttaMerson,
};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// One-step method used to compute the leading samples of a multistep method.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Bootstrap {
    #[strum(to_string = "Euler", serialize = "FE")]
    Euler,
    /// RK2 midpoint
    #[strum(to_string = "Midpoint", serialize = "ModEuler")]
    Midpoint,
    /// RK2 Heun
    Heun,
    RK4,
    /// 5-stage Runge-Kutta-Merson
    Merson,
}

impl Bootstrap {
    /// one step of the starter from `(t, u)`
    pub fn advance(self, problem: &IVPproblem, t: f64, u: f64, dt: f64) -> f64 {
        match self {
            Bootstrap::Euler => ForwardEuler::default().advance(problem, t, u, dt),
            Bootstrap::Midpoint => ModifiedEuler::default().advance(problem, t, u, dt),
            Bootstrap::Heun => Heun::default().advance(problem, t, u, dt),
            Bootstrap::RK4 => RungeKutta4::default().advance(problem, t, u, dt),
            Bootstrap::Merson => RungeKuttaMerson::default().advance(problem, t, u, dt),
        }
    }

    /// order of accuracy of the starter
    pub fn order(self) -> usize {
        match self {
            Bootstrap::Euler => 1,
            Bootstrap::Midpoint | Bootstrap::Heun => 2,
            Bootstrap::RK4 | Bootstrap::Merson => 4,
        }
    }
}
