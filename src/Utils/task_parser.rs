//! Reads a solver task from a TOML document with the sections
//!
//! ```toml
//! [task]
//! expression = "x^2 - 4"
//! [solver]
//! initial_guess = 1.0
//! max_iterations = 100
//! goal_error = 1e-6
//! derivative = "symbolic"          # or "central_difference"
//! derivative_step = 1e-6
//! [logging]
//! level = "info"
//! file = "roots.log"
//! [output]
//! trace_csv = "trace.csv"
//! ```
//! Every section and every key is optional, missing keys keep the defaults of
//! [`SolverConfig`]. Integers are accepted where floats are expected.
use crate::numerical::root_finder::SolverConfig;
use crate::symbolic::symbolic_engine_derivatives::DerivativeMode;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug)]
pub enum TaskError {
    Io(io::Error),
    Syntax(toml::de::Error),
    WrongType {
        section: String,
        key: String,
        expected: &'static str,
    },
    UnknownValue {
        section: String,
        key: String,
        value: String,
    },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskError::Io(err) => write!(f, "cannot read task file: {}", err),
            TaskError::Syntax(err) => write!(f, "task file is not valid TOML: {}", err),
            TaskError::WrongType {
                section,
                key,
                expected,
            } => write!(f, "[{}] {} must be {}", section, key, expected),
            TaskError::UnknownValue {
                section,
                key,
                value,
            } => write!(f, "[{}] {} has unknown value '{}'", section, key, value),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<io::Error> for TaskError {
    fn from(err: io::Error) -> Self {
        TaskError::Io(err)
    }
}

impl From<toml::de::Error> for TaskError {
    fn from(err: toml::de::Error) -> Self {
        TaskError::Syntax(err)
    }
}

/// Everything a task file can say about one solve.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDocument {
    pub expression: Option<String>,
    pub solver: SolverConfig,
    pub loglevel: Option<String>,
    pub log_file: Option<PathBuf>,
    pub trace_csv: Option<PathBuf>,
}

fn wrong_type(section: &str, key: &str, expected: &'static str) -> TaskError {
    TaskError::WrongType {
        section: section.to_string(),
        key: key.to_string(),
        expected,
    }
}

fn get_section<'a>(doc: &'a Table, name: &str) -> Result<Option<&'a Table>, TaskError> {
    match doc.get(name) {
        None => Ok(None),
        Some(Value::Table(table)) => Ok(Some(table)),
        Some(_) => Err(TaskError::WrongType {
            section: name.to_string(),
            key: String::new(),
            expected: "a table",
        }),
    }
}

fn get_float(section: &Table, name: &str, key: &str) -> Result<Option<f64>, TaskError> {
    match section.get(key) {
        None => Ok(None),
        Some(Value::Float(val)) => Ok(Some(*val)),
        Some(Value::Integer(val)) => Ok(Some(*val as f64)),
        Some(_) => Err(wrong_type(name, key, "a number")),
    }
}

fn get_count(section: &Table, name: &str, key: &str) -> Result<Option<usize>, TaskError> {
    match section.get(key) {
        None => Ok(None),
        Some(Value::Integer(val)) => usize::try_from(*val)
            .map(Some)
            .map_err(|_| wrong_type(name, key, "a non-negative integer")),
        Some(_) => Err(wrong_type(name, key, "a non-negative integer")),
    }
}

fn get_string(section: &Table, name: &str, key: &str) -> Result<Option<String>, TaskError> {
    match section.get(key) {
        None => Ok(None),
        Some(Value::String(val)) => Ok(Some(val.clone())),
        Some(_) => Err(wrong_type(name, key, "a string")),
    }
}

/// Parses the text of a task document.
pub fn parse_task(text: &str) -> Result<TaskDocument, TaskError> {
    let doc = text.parse::<Table>()?;
    let mut task = TaskDocument::default();

    if let Some(section) = get_section(&doc, "task")? {
        task.expression = get_string(section, "task", "expression")?;
    }

    if let Some(section) = get_section(&doc, "solver")? {
        let solver = &mut task.solver;
        if let Some(val) = get_float(section, "solver", "initial_guess")? {
            solver.initial_guess = val;
        }
        if let Some(val) = get_count(section, "solver", "max_iterations")? {
            solver.max_iterations = val;
        }
        if let Some(val) = get_float(section, "solver", "goal_error")? {
            solver.goal_error = val;
        }
        if let Some(val) = get_string(section, "solver", "derivative")? {
            solver.derivative =
                DerivativeMode::from_str(&val).map_err(|_| TaskError::UnknownValue {
                    section: "solver".to_string(),
                    key: "derivative".to_string(),
                    value: val.clone(),
                })?;
        }
        if let Some(val) = get_float(section, "solver", "derivative_step")? {
            solver.derivative_step = val;
        }
    }

    if let Some(section) = get_section(&doc, "logging")? {
        task.loglevel = get_string(section, "logging", "level")?;
        task.log_file = get_string(section, "logging", "file")?.map(PathBuf::from);
    }

    if let Some(section) = get_section(&doc, "output")? {
        task.trace_csv = get_string(section, "output", "trace_csv")?.map(PathBuf::from);
    }

    Ok(task)
}

/// Reads and parses a task file.
pub fn load_task<P: AsRef<Path>>(path: P) -> Result<TaskDocument, TaskError> {
    let text = fs::read_to_string(path)?;
    parse_task(&text)
}
