/// Scalar initial value problem `du/dt = f(t, u)`, `u(t0) = u0` on a fixed step grid
///  Example#1
/// ```
///    use RustedIVP::numerical::IVP_problem::IVPproblem;
///    use RustedIVP::numerical::solver_core::OdeSolver;
///    use RustedIVP::numerical::steppers::Method;
///    // u' = -10(t-1)u, exact solution exp(-5(t-1)^2)
///    let problem = IVPproblem::new(|t, u| -10.0 * (t - 1.0) * u, 0.0, 2.0, 0.025, (-5.0_f64).exp())
///        .unwrap()
///        .with_exact(|t, _y| (-5.0 * (t - 1.0) * (t - 1.0)).exp());
///    let mut solver = OdeSolver::new(&problem, Method::RungeKutta4);
///    solver.run().unwrap();
///    println!("error at tf = {:?}", solver.final_error());
/// ```
pub mod IVP_problem;
/// grid sizing and the sample storage of a solver
pub mod time_grid;
/// the solver: owns a problem copy and a grid, drives a stepping strategy
///  Example#2
/// ```
///    use RustedIVP::numerical::Examples_and_utils::SampleProblem;
///    use RustedIVP::numerical::solver_core::OdeSolver;
///    let problem = SampleProblem::Lorentzian.problem().unwrap();
///    // any of FE, BE, ModEuler, Heun, RK4, CN, LeapFrog, AB2..AB5, AM2..AM5
///    let mut solver = OdeSolver::from_name(&problem, "AM4").unwrap();
///    solver.set_tolerance(1e-10).unwrap();
///    solver.run().unwrap();
///    let (t, u) = solver.get_result();
///    assert_eq!(t.len(), u.len());
/// ```
pub mod solver_core;
/// explicit, implicit, multistep and predictor-corrector stepping strategies
pub mod steppers;
pub mod errors;
/// sample problems with exact solutions
pub mod Examples_and_utils;
