//! Stepping strategies.
//!
//! Every method is one struct implementing [`StepStrategy`]: it computes grid
//! sample `i + 1` from the samples `0..=i` already stored in the grid, holding
//! only its own per-step scratch values. [`Stepper`] is the closed set of
//! strategies, dispatched through `enum_dispatch`; [`Method`] names them.
pub mod adams_moulton;
pub mod bootstrap;
pub mod explicit_RK;
pub mod implicit_euler;
pub mod multistep;

use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::time_grid::GridState;
use enum_dispatch::enum_dispatch;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use adams_moulton::AdamsMoulton;
pub use bootstrap::Bootstrap;
pub use explicit_RK::{ForwardEuler, Heun, ModifiedEuler, RungeKutta4, RungeKuttaMerson};
pub use implicit_euler::{BackwardEuler, CrankNicolson};
pub use multistep::{AdamsBashforth, AdamsOrder, LeapFrog};

/// default tolerance of the Backward Euler fixed point
pub const IMPLICIT_TOLERANCE: f64 = 1e-12;
/// default tolerance of the Adams-Moulton corrector
pub const PC_TOLERANCE: f64 = 1e-10;
/// default iteration cap of every fixed-point loop
pub const MAX_ITERATIONS: usize = 100;

/// Result of one step: the committed value, the predictor if the method has one,
/// and the number of fixed-point iterations spent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub value: f64,
    pub predicted: Option<f64>,
    pub iterations: usize,
}

impl StepOutcome {
    pub fn explicit(value: f64) -> StepOutcome {
        StepOutcome {
            value,
            predicted: None,
            iterations: 0,
        }
    }
}

/// Stopping rule of the implicit and corrector loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convergence {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for Convergence {
    fn default() -> Self {
        Convergence {
            tolerance: IMPLICIT_TOLERANCE,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

#[enum_dispatch]
pub trait StepStrategy {
    /// human readable name used in log messages
    fn name(&self) -> &'static str;

    /// Computes sample `i + 1`; samples `0..=i` of `grid` are valid.
    fn step(
        &mut self,
        problem: &IVPproblem,
        grid: &GridState<'_>,
        convergence: &Convergence,
        i: usize,
    ) -> Result<StepOutcome, SolverError>;

    /// forgets per-run scratch state before a new integration
    fn reset(&mut self) {}

    /// number of leading samples produced by a one-step starter
    fn bootstrap_points(&self) -> usize {
        0
    }

    /// starter in use, for multistep methods
    fn bootstrap(&self) -> Option<Bootstrap> {
        None
    }

    /// replaces the starter; returns false when the method has none
    fn set_bootstrap(&mut self, _bootstrap: Bootstrap) -> bool {
        false
    }

    /// tolerance the method iterates to by default; `None` for methods without iteration
    fn default_tolerance(&self) -> Option<f64> {
        None
    }
}

#[enum_dispatch(StepStrategy)]
#[derive(Debug, Clone)]
pub enum Stepper {
    ForwardEuler(ForwardEuler),
    ModifiedEuler(ModifiedEuler),
    Heun(Heun),
    RungeKutta4(RungeKutta4),
    BackwardEuler(BackwardEuler),
    CrankNicolson(CrankNicolson),
    LeapFrog(LeapFrog),
    AdamsBashforth(AdamsBashforth),
    AdamsMoulton(AdamsMoulton),
}

/// Names of the available methods; parsed case-insensitively from short or long names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    #[strum(to_string = "FE", serialize = "ForwardEuler")]
    ForwardEuler,
    #[strum(to_string = "BE", serialize = "BackwardEuler")]
    BackwardEuler,
    #[strum(to_string = "ModEuler", serialize = "ModifiedEuler")]
    ModifiedEuler,
    #[strum(to_string = "Heun")]
    Heun,
    #[strum(to_string = "RK4", serialize = "RungeKutta4")]
    RungeKutta4,
    #[strum(to_string = "CN", serialize = "CrankNicolson")]
    CrankNicolson,
    #[strum(to_string = "LeapFrog")]
    LeapFrog,
    #[strum(to_string = "AB2")]
    AdamsBashforth2,
    #[strum(to_string = "AB3")]
    AdamsBashforth3,
    #[strum(to_string = "AB4")]
    AdamsBashforth4,
    #[strum(to_string = "AB5")]
    AdamsBashforth5,
    #[strum(to_string = "AM2")]
    AdamsMoulton2,
    #[strum(to_string = "AM3")]
    AdamsMoulton3,
    #[strum(to_string = "AM4")]
    AdamsMoulton4,
    #[strum(to_string = "AM5")]
    AdamsMoulton5,
}

impl Method {
    /// fresh stepper with default starter
    pub fn stepper(self) -> Stepper {
        match self {
            Method::ForwardEuler => ForwardEuler::default().into(),
            Method::BackwardEuler => BackwardEuler::default().into(),
            Method::ModifiedEuler => ModifiedEuler::default().into(),
            Method::Heun => Heun::default().into(),
            Method::RungeKutta4 => RungeKutta4::default().into(),
            Method::CrankNicolson => CrankNicolson::default().into(),
            Method::LeapFrog => LeapFrog::default().into(),
            Method::AdamsBashforth2 => AdamsBashforth::new(AdamsOrder::Second).into(),
            Method::AdamsBashforth3 => AdamsBashforth::new(AdamsOrder::Third).into(),
            Method::AdamsBashforth4 => AdamsBashforth::new(AdamsOrder::Fourth).into(),
            Method::AdamsBashforth5 => AdamsBashforth::new(AdamsOrder::Fifth).into(),
            Method::AdamsMoulton2 => AdamsMoulton::new(AdamsOrder::Second).into(),
            Method::AdamsMoulton3 => AdamsMoulton::new(AdamsOrder::Third).into(),
            Method::AdamsMoulton4 => AdamsMoulton::new(AdamsOrder::Fourth).into(),
            Method::AdamsMoulton5 => AdamsMoulton::new(AdamsOrder::Fifth).into(),
        }
    }

    /// order of accuracy of the global error
    pub fn order(self) -> usize {
        match self {
            Method::ForwardEuler | Method::BackwardEuler => 1,
            Method::ModifiedEuler
            | Method::Heun
            | Method::CrankNicolson
            | Method::LeapFrog
            | Method::AdamsBashforth2
            | Method::AdamsMoulton2 => 2,
            Method::AdamsBashforth3 | Method::AdamsMoulton3 => 3,
            Method::RungeKutta4 | Method::AdamsBashforth4 | Method::AdamsMoulton4 => 4,
            Method::AdamsBashforth5 | Method::AdamsMoulton5 => 5,
        }
    }

    /// true for methods that solve an equation for the new value on each step
    pub fn is_implicit(self) -> bool {
        matches!(
            self,
            Method::BackwardEuler
                | Method::CrankNicolson
                | Method::AdamsMoulton2
                | Method::AdamsMoulton3
                | Method::AdamsMoulton4
                | Method::AdamsMoulton5
        )
    }

    pub fn is_multistep(self) -> bool {
        self.stepper().bootstrap().is_some()
    }
}
