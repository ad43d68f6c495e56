//! Task files: which sample problem to integrate, with which method and where to
//! put the output. The format is TOML:
//!
//! ```toml
//! [problem]
//! name = "GaussianPulse"   # catalog entry
//! dt = 0.0125              # optional overrides: t0, tf, dt, u0
//!
//! [solver]
//! method = "AM4"
//! tolerance = 1e-10        # optional
//! max_iterations = 100     # optional
//! bootstrap = "Merson"     # optional, multistep methods only
//! output = "AM4.out"       # optional, `<t> <u>` lines
//! reference = "exact.out"  # optional, reference trajectory
//!
//! [logging]
//! level = "info"
//! file = "solver.log"
//! console = true
//! ```
use crate::Utils::logger::init_logger;
use crate::numerical::Examples_and_utils::SampleProblem;
use crate::numerical::IVP_problem::IVPproblem;
use crate::numerical::errors::SolverError;
use crate::numerical::solver_core::OdeSolver;
use crate::numerical::steppers::{Bootstrap, Method};
use log::info;
use simplelog::LevelFilter;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub problem: SampleProblem,
    pub t0: Option<f64>,
    pub tf: Option<f64>,
    pub dt: Option<f64>,
    pub u0: Option<f64>,
    pub method: Method,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
    pub bootstrap: Option<Bootstrap>,
    pub output: Option<PathBuf>,
    pub reference_output: Option<PathBuf>,
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
    pub log_to_console: bool,
}

fn section<'a>(doc: &'a Table, name: &str) -> Result<Option<&'a Table>, SolverError> {
    match doc.get(name) {
        None => Ok(None),
        Some(Value::Table(t)) => Ok(Some(t)),
        Some(other) => Err(SolverError::configuration(format!(
            "[{}] must be a table, found {}",
            name,
            other.type_str()
        ))),
    }
}

fn get_f64(table: Option<&Table>, key: &str) -> Result<Option<f64>, SolverError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(Value::Float(x)) => Ok(Some(*x)),
        Some(Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(other) => Err(SolverError::configuration(format!(
            "'{}' must be a number, found {}",
            key,
            other.type_str()
        ))),
    }
}

fn get_str<'a>(table: Option<&'a Table>, key: &str) -> Result<Option<&'a str>, SolverError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(SolverError::configuration(format!(
            "'{}' must be a string, found {}",
            key,
            other.type_str()
        ))),
    }
}

fn get_usize(table: Option<&Table>, key: &str) -> Result<Option<usize>, SolverError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(Value::Integer(i)) if *i >= 0 => Ok(Some(*i as usize)),
        Some(other) => Err(SolverError::configuration(format!(
            "'{}' must be a non-negative integer, found {}",
            key, other
        ))),
    }
}

fn get_bool(table: Option<&Table>, key: &str) -> Result<Option<bool>, SolverError> {
    match table.and_then(|t| t.get(key)) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(*b)),
        Some(other) => Err(SolverError::configuration(format!(
            "'{}' must be true or false, found {}",
            key,
            other.type_str()
        ))),
    }
}

impl TaskConfig {
    pub fn from_toml_str(text: &str) -> Result<TaskConfig, SolverError> {
        let doc: Table = text
            .parse()
            .map_err(|e| SolverError::configuration(format!("malformed task file: {}", e)))?;

        let problem = section(&doc, "problem")?;
        let solver = section(&doc, "solver")?;
        let logging = section(&doc, "logging")?;

        let name = get_str(problem, "name")?
            .ok_or_else(|| SolverError::configuration("[problem] needs a 'name'"))?;
        let sample = SampleProblem::from_str(name)
            .map_err(|_| SolverError::configuration(format!("unknown problem '{}'", name)))?;

        let method_name = get_str(solver, "method")?
            .ok_or_else(|| SolverError::configuration("[solver] needs a 'method'"))?;
        let method = Method::from_str(method_name)
            .map_err(|_| SolverError::configuration(format!("unknown method '{}'", method_name)))?;

        let bootstrap = match get_str(solver, "bootstrap")? {
            Some(b) => Some(Bootstrap::from_str(b).map_err(|_| {
                SolverError::configuration(format!("unknown bootstrap method '{}'", b))
            })?),
            None => None,
        };

        let log_level = match get_str(logging, "level")? {
            Some(level) => LevelFilter::from_str(level).map_err(|_| {
                SolverError::configuration(format!("unknown log level '{}'", level))
            })?,
            None => LevelFilter::Info,
        };

        Ok(TaskConfig {
            problem: sample,
            t0: get_f64(problem, "t0")?,
            tf: get_f64(problem, "tf")?,
            dt: get_f64(problem, "dt")?,
            u0: get_f64(problem, "u0")?,
            method,
            tolerance: get_f64(solver, "tolerance")?,
            max_iterations: get_usize(solver, "max_iterations")?,
            bootstrap,
            output: get_str(solver, "output")?.map(PathBuf::from),
            reference_output: get_str(solver, "reference")?.map(PathBuf::from),
            log_level,
            log_file: get_str(logging, "file")?.map(str::to_string),
            log_to_console: get_bool(logging, "console")?.unwrap_or(true),
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TaskConfig, SolverError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SolverError::io(path.as_ref(), e))?;
        TaskConfig::from_toml_str(&text)
    }

    /// catalog problem with the overrides applied
    pub fn build_problem(&self) -> Result<IVPproblem, SolverError> {
        let (t0, tf, dt) = self.problem.domain();
        let t0 = self.t0.unwrap_or(t0);
        let u0 = match self.u0 {
            Some(u0) => u0,
            None => self.problem.exact(t0),
        };
        self.problem.problem_on(
            t0,
            self.tf.unwrap_or(tf),
            self.dt.unwrap_or(dt),
            u0,
        )
    }

    pub fn build_solver(&self, problem: &IVPproblem) -> Result<OdeSolver, SolverError> {
        let mut solver = OdeSolver::new(problem, self.method);
        if let Some(tolerance) = self.tolerance {
            solver.set_tolerance(tolerance)?;
        }
        if let Some(max_iterations) = self.max_iterations {
            solver.set_max_iterations(max_iterations)?;
        }
        if let Some(bootstrap) = self.bootstrap {
            solver.set_bootstrap(bootstrap)?;
        }
        Ok(solver)
    }

    pub fn init_logging(&self) {
        init_logger(
            self.log_level,
            self.log_file.as_deref(),
            self.log_to_console,
        );
    }

    /// builds everything, writes the reference if asked and runs the solver
    pub fn run(&self) -> Result<OdeSolver, SolverError> {
        let problem = self.build_problem()?;
        info!("task: {} with {} on {}", self.problem, self.method, problem);
        let mut solver = self.build_solver(&problem)?;
        if let Some(path) = &self.reference_output {
            problem.write_reference(path)?;
        }
        match &self.output {
            Some(path) => solver.run_to_file(path)?,
            None => solver.run()?,
        }
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[problem]
name = "GaussianPulse"
dt = 0.05

[solver]
method = "AM4"
tolerance = 1e-9
max_iterations = 50
bootstrap = "merson"

[logging]
level = "debug"
console = false
"#;

    #[test]
    fn parses_full_task() {
        let task = TaskConfig::from_toml_str(FULL).unwrap();
        assert_eq!(task.problem, SampleProblem::GaussianPulse);
        assert_eq!(task.method, Method::AdamsMoulton4);
        assert_eq!(task.dt, Some(0.05));
        assert_eq!(task.t0, None);
        assert_eq!(task.tolerance, Some(1e-9));
        assert_eq!(task.max_iterations, Some(50));
        assert_eq!(task.bootstrap, Some(Bootstrap::Merson));
        assert_eq!(task.log_level, LevelFilter::Debug);
        assert!(!task.log_to_console);
        assert_eq!(task.output, None);
    }

    #[test]
    fn builds_problem_and_solver() {
        let task = TaskConfig::from_toml_str(FULL).unwrap();
        let problem = task.build_problem().unwrap();
        assert_eq!(problem.steps(), 40);
        assert_eq!(problem.t0(), 0.0);
        let solver = task.build_solver(&problem).unwrap();
        assert_eq!(solver.tolerance(), 1e-9);
        assert_eq!(solver.max_iterations(), 50);
        assert_eq!(solver.bootstrap(), Some(Bootstrap::Merson));
    }

    #[test]
    fn integers_are_accepted_as_numbers() {
        let task = TaskConfig::from_toml_str(
            "[problem]\nname = \"Lorentzian\"\nt0 = -2\ntf = 2\n[solver]\nmethod = \"RK4\"\n",
        )
        .unwrap();
        let problem = task.build_problem().unwrap();
        assert_eq!(problem.t0(), -2.0);
        // start value follows the exact solution at the new t0
        assert_eq!(problem.u0(), 0.2);
        assert_eq!(task.log_level, LevelFilter::Info);
        assert!(task.log_to_console);
    }

    #[test]
    fn rejects_bad_tasks() {
        let bad = [
            "[problem\nname = 1",
            "[solver]\nmethod = \"RK4\"\n",
            "[problem]\nname = \"Nope\"\n[solver]\nmethod = \"RK4\"\n",
            "[problem]\nname = \"Lorentzian\"\n[solver]\nmethod = \"RK45\"\n",
            "[problem]\nname = \"Lorentzian\"\ndt = \"small\"\n[solver]\nmethod = \"RK4\"\n",
            "[problem]\nname = \"Lorentzian\"\n[solver]\nmethod = \"RK4\"\nmax_iterations = -3\n",
            "problem = 3\n",
        ];
        for text in bad {
            assert!(
                matches!(
                    TaskConfig::from_toml_str(text),
                    Err(SolverError::Configuration(_))
                ),
                "accepted: {}",
                text
            );
        }
    }

    #[test]
    fn starter_on_one_step_method_is_rejected_when_building() {
        let task = TaskConfig::from_toml_str(
            "[problem]\nname = \"Lorentzian\"\n[solver]\nmethod = \"Heun\"\nbootstrap = \"RK4\"\n",
        )
        .unwrap();
        let problem = task.build_problem().unwrap();
        assert!(task.build_solver(&problem).is_err());
    }

    #[test]
    fn run_writes_output_and_reference() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ab3.out");
        let reference = dir.path().join("exact.out");
        let text = format!(
            "[problem]\nname = \"ExponentialGrowth\"\n[solver]\nmethod = \"AB3\"\noutput = {:?}\nreference = {:?}\n",
            out.to_string_lossy(),
            reference.to_string_lossy()
        );
        let task = TaskConfig::from_toml_str(&text).unwrap();
        let solver = task.run().unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written.lines().count(), solver.values().len());
        let exact = std::fs::read_to_string(&reference).unwrap();
        assert_eq!(exact.lines().count(), 14);
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TaskConfig::from_file(dir.path().join("task.toml")).unwrap_err();
        assert!(matches!(err, SolverError::Io { .. }));
    }
}
