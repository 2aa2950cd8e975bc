//! RustedRoots command line
//!
//! Collects an expression in `x`, an initial guess, an iteration budget and a goal error,
//! solves `f(x) = 0` and prints the root. Settings may come from a TOML task file, command
//! line flags override it.
//!
//! ```text
//! rusted_roots "x^2 - 4" --guess 1 --max-iterations 100 --goal-error 1e-6 --show-trace
//! rusted_roots --task task.toml --derivative symbolic --trace-csv trace.csv
//! ```
#![allow(non_snake_case)]
use RustedRoots::Utils::logger::{default_log_file_name, save_trace_to_csv};
use RustedRoots::Utils::task_parser::{TaskDocument, TaskError, load_task};
use RustedRoots::numerical::root_finder::{ERROR_MSG, RootFinder, SolveError, SolveResult};
use RustedRoots::symbolic::parse_expr::parse;
use RustedRoots::symbolic::symbolic_engine::Expr;
use RustedRoots::symbolic::symbolic_engine_derivatives::{DerivativeEstimator, DerivativeMode};
use clap::Parser;
use itertools::Itertools;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{builder::Builder, settings::Style};

/// iterates printed inline when --show-trace is not given
const TRACE_PREVIEW: usize = 8;

/// Newton-Raphson root finder for f(x) = 0
#[derive(Parser, Debug)]
#[command(name = "rusted_roots")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expression in x, e.g. "x^2 - 4"
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Initial guess x0 [default: 0.0]
    #[arg(short, long, allow_negative_numbers = true)]
    guess: Option<f64>,

    /// Maximum number of estimates, the initial guess included [default: 10000]
    #[arg(short = 'n', long)]
    max_iterations: Option<usize>,

    /// Goal error for the step and the residual [default: 1.0E-4]
    #[arg(short = 'e', long)]
    goal_error: Option<f64>,

    /// How f'(x) is computed: central_difference or symbolic
    #[arg(short, long)]
    derivative: Option<DerivativeMode>,

    /// Step of the central difference [default: 1e-6]
    #[arg(long)]
    step: Option<f64>,

    /// TOML task file
    #[arg(short, long)]
    task: Option<PathBuf>,

    /// Write the trace to this CSV file
    #[arg(long)]
    trace_csv: Option<PathBuf>,

    /// Print every iterate as a table
    #[arg(long)]
    show_trace: bool,

    /// debug, info, warn, error, off or none
    #[arg(long)]
    loglevel: Option<String>,

    /// Also log into a file; without a value a timestamped name is used
    #[arg(long, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,
}

#[derive(Debug)]
enum CliError {
    Task(TaskError),
    MissingExpression,
    Solve(SolveError),
    Output(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::Task(err) => write!(f, "{}", err),
            CliError::MissingExpression => write!(
                f,
                "no expression given, pass it as an argument or in [task] expression"
            ),
            CliError::Solve(err) => write!(f, "{}", err),
            CliError::Output(err) => write!(f, "cannot write trace: {}", err),
        }
    }
}

impl From<TaskError> for CliError {
    fn from(err: TaskError) -> Self {
        CliError::Task(err)
    }
}

impl From<SolveError> for CliError {
    fn from(err: SolveError) -> Self {
        CliError::Solve(err)
    }
}

/// Task file values overridden by whatever was given on the command line.
fn merge(cli: Cli) -> Result<(TaskDocument, bool), CliError> {
    let mut task = match &cli.task {
        Some(path) => load_task(path)?,
        None => TaskDocument::default(),
    };
    if let Some(expression) = cli.expression {
        task.expression = Some(expression);
    }
    let solver = &mut task.solver;
    if let Some(guess) = cli.guess {
        solver.set_initial_guess(guess);
    }
    if let Some(max_iterations) = cli.max_iterations {
        solver.set_max_iterations(max_iterations);
    }
    if let Some(goal_error) = cli.goal_error {
        solver.set_goal_error(goal_error);
    }
    if let Some(mode) = cli.derivative {
        solver.derivative = mode;
    }
    if let Some(step) = cli.step {
        solver.derivative_step = step;
    }
    if cli.loglevel.is_some() {
        task.loglevel = cli.loglevel;
    }
    match cli.log_file {
        Some(Some(path)) => task.log_file = Some(path),
        Some(None) => task.log_file = Some(default_log_file_name()),
        None => {}
    }
    if cli.trace_csv.is_some() {
        task.trace_csv = cli.trace_csv;
    }
    Ok((task, cli.show_trace))
}

fn print_trace_table(result: &SolveResult) {
    let mut builder = Builder::default();
    builder.push_record(["iteration".to_string(), "estimate".to_string()]);
    for (i, x) in result.trace.iter().enumerate() {
        builder.push_record([i.to_string(), format!("{:.15}", x)]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    println!("{}", table);
}

fn report(expr: &Expr, task: &TaskDocument, result: &SolveResult, show_trace: bool) {
    println!("f(x) = {}", expr);
    println!("root = {}", result);
    if !result.converged {
        println!(
            "not converged within {} iterations, the last estimate is shown",
            task.solver.max_iterations
        );
    }
    println!(
        "iterations: {}, fallback steps: {}, termination: {}",
        result.iterations_used, result.fallback_steps, result.termination
    );
    if let Some(residual) = result.final_residual {
        println!("f(root) = {:e}", residual);
    }
    let estimator =
        DerivativeEstimator::new(expr, task.solver.derivative, task.solver.derivative_step);
    if let Some(derivative) = estimator.symbolic_derivative() {
        println!("f'(x) = {}", derivative);
    }
    match estimator.at(result.final_estimate) {
        Ok(slope) => println!("f'(root) = {}", slope),
        Err(err) => println!("f'(root) is undefined: {}", err),
    }
    if show_trace {
        print_trace_table(result);
    } else {
        let preview = result.trace.iter().take(TRACE_PREVIEW).join(", ");
        let more = if result.trace.len() > TRACE_PREVIEW { ", ..." } else { "" };
        println!("trace: [{}{}]", preview, more);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let (task, show_trace) = merge(cli)?;
    let text = task.expression.clone().ok_or(CliError::MissingExpression)?;
    let expr = parse(&text).map_err(SolveError::from)?;

    let mut finder = RootFinder::new();
    finder.set_loglevel(task.loglevel.clone());
    finder.set_log_file(task.log_file.clone());
    let result = finder.solve(&expr, &task.solver)?;

    report(&expr, &task, &result, show_trace);
    if let Some(path) = &task.trace_csv {
        save_trace_to_csv(result.trace(), path).map_err(CliError::Output)?;
        println!("trace written to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ERROR_MSG);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
