use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a problem, configuring a solver or integrating.
#[derive(Debug, Error)]
pub enum SolverError {
    /// the output sink could not be opened or written
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// degenerate domain or invalid solver/task settings; detected before any stepping
    #[error("configuration error: {0}")]
    Configuration(String),

    /// an implicit or corrector loop did not reach its tolerance within the iteration cap
    #[error(
        "{method}: no convergence at step {step} (t = {t}) after {iterations} iterations, last error {last_error:e}"
    )]
    NonConvergence {
        method: String,
        step: usize,
        t: f64,
        iterations: usize,
        last_error: f64,
    },
}

impl SolverError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SolverError::Configuration(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SolverError::Io {
            path: path.into(),
            source,
        }
    }

    /// error magnitude reached before giving up, if this is a convergence failure
    pub fn last_error(&self) -> Option<f64> {
        match self {
            SolverError::NonConvergence { last_error, .. } => Some(*last_error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_convergence_reports_last_error() {
        let err = SolverError::NonConvergence {
            method: "BE".to_string(),
            step: 3,
            t: 0.75,
            iterations: 100,
            last_error: 2.5e-3,
        };
        assert_eq!(err.last_error(), Some(2.5e-3));
        let msg = err.to_string();
        assert!(msg.contains("BE"));
        assert!(msg.contains("step 3"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = SolverError::io(
            "/no/such/dir/out.dat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/no/such/dir/out.dat"));
        assert_eq!(err.last_error(), None);
    }
}
