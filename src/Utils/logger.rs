use crate::numerical::errors::SolverError;
use csv::Writer;
use simplelog::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sets up the global logger: terminal output and/or a log file.
/// Calling it again after a logger is installed does nothing.
pub fn init_logger(level: LevelFilter, log_to_file: Option<&str>, log_to_console: bool) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if log_to_console {
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    if let Some(filename) = log_to_file {
        if let Ok(file) = File::create(filename) {
            loggers.push(WriteLogger::new(level, Config::default(), file));
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

/// Line-oriented `<t> <u>` sink used by the solvers and the reference trajectory.
pub struct TrajectoryWriter<W: Write> {
    out: BufWriter<W>,
    label: PathBuf,
    lines: usize,
}

impl TrajectoryWriter<File> {
    /// opens (truncates) the file; fails before anything is written
    pub fn create(path: &Path) -> Result<TrajectoryWriter<File>, SolverError> {
        let file = File::create(path).map_err(|e| SolverError::io(path, e))?;
        Ok(TrajectoryWriter::new(file, path))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(inner: W, label: impl Into<PathBuf>) -> TrajectoryWriter<W> {
        TrajectoryWriter {
            out: BufWriter::new(inner),
            label: label.into(),
            lines: 0,
        }
    }

    pub fn write_point(&mut self, t: f64, u: f64) -> Result<(), SolverError> {
        writeln!(self.out, "{} {}", t, u).map_err(|e| SolverError::io(&self.label, e))?;
        self.lines += 1;
        Ok(())
    }

    /// number of records written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> Result<(), SolverError> {
        self.out
            .flush()
            .map_err(|e| SolverError::io(&self.label, e))
    }
}

/// writes `(t, u)` pairs as `<t> <u>` lines
pub fn save_trajectory_to_file(
    times: &[f64],
    values: &[f64],
    filename: &Path,
) -> Result<(), SolverError> {
    let mut writer = TrajectoryWriter::create(filename)?;
    for (t, u) in times.iter().zip(values.iter()) {
        writer.write_point(*t, *u)?;
    }
    writer.finish()
}

/// CSV export with a header row; when a reference is given its values and the
/// absolute error are added as two more columns
pub fn save_trajectory_to_csv(
    times: &[f64],
    values: &[f64],
    reference: Option<&[f64]>,
    arg: &str,
    value_name: &str,
    filename: &Path,
) -> Result<(), SolverError> {
    let to_io = |e: csv::Error| SolverError::io(filename, std::io::Error::other(e));
    let file = File::create(filename).map_err(|e| SolverError::io(filename, e))?;
    let mut writer = Writer::from_writer(file);

    let mut headers = vec![arg.to_string(), value_name.to_string()];
    if reference.is_some() {
        headers.push("reference".to_string());
        headers.push("abs_error".to_string());
    }
    writer.write_record(&headers).map_err(to_io)?;

    for (i, (t, u)) in times.iter().zip(values.iter()).enumerate() {
        let mut row = vec![t.to_string(), u.to_string()];
        if let Some(y) = reference.and_then(|r| r.get(i)) {
            row.push(y.to_string());
            row.push((u - y).abs().to_string());
        }
        writer.write_record(&row).map_err(to_io)?;
    }

    writer
        .flush()
        .map_err(|e| SolverError::io(filename, e))?;
    Ok(())
}
