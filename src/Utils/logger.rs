use chrono::Local;
use csv::Writer;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum LoggerError {
    UnknownLevel(String),
    Io(io::Error),
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoggerError::UnknownLevel(level) => write!(
                f,
                "loglevel must be debug, info, warn, error, off or none, got '{}'",
                level
            ),
            LoggerError::Io(err) => write!(f, "cannot open log file: {}", err),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(err: io::Error) -> Self {
        LoggerError::Io(err)
    }
}

/// Maps a level name to a filter; `off` and `none` both silence logging.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    match level.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        _ => Err(LoggerError::UnknownLevel(level.to_string())),
    }
}

/// `log_<date>_<time>.txt` in the current directory
pub fn default_log_file_name() -> PathBuf {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    PathBuf::from(format!("log_{}.txt", date_and_time))
}

/// Installs a terminal logger and, if `log_file` is given, a file logger next to it.
/// Only the first successful call in a process has an effect, later ones are ignored.
pub fn init_logger(level: &str, log_file: Option<&Path>) -> Result<(), LoggerError> {
    let level = parse_level(level)?;
    if level == LevelFilter::Off {
        return Ok(());
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(path) = log_file {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    let _ = CombinedLogger::init(loggers);
    Ok(())
}

/// Writes the iterates to `filename` as two columns, `iteration` and `estimate`.
pub fn save_trace_to_csv<P: AsRef<Path>>(trace: &[f64], filename: P) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["iteration", "estimate"])?;
    for (i, value) in trace.iter().enumerate() {
        writer.write_record([i.to_string(), value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("INFO").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level("none").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggerError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_default_log_file_name() {
        let name = default_log_file_name();
        let name = name.to_string_lossy();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_init_logger_off_does_nothing() {
        assert!(init_logger("off", None).is_ok());
        assert!(init_logger("loud", None).is_err());
    }

    #[test]
    fn test_save_trace_to_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.csv");
        save_trace_to_csv(&[1.0, 2.5, 2.05], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["iteration,estimate", "0,1", "1,2.5", "2,2.05"]);
    }

    #[test]
    fn test_save_empty_trace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        save_trace_to_csv(&[], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "iteration,estimate");
    }
}
