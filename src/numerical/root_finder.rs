//! # Newton-Raphson root finder with a bisection safeguard
//!
//! Solves `f(x) = 0` for a parsed [`Expr`], recording every estimate in an
//! [`IterationTrace`].
//!
//! Each iteration tries a Newton step `x - f(x)/f'(x)`. When that step is impossible
//! (derivative undefined or flat, candidate not finite, `f` undefined at the candidate)
//! the solver looks back through the trace for the most recent estimate whose residual
//! has the opposite sign, and moves to the midpoint of that bracket instead.
//!
//! # Example
//! ```
//! use RustedRoots::numerical::root_finder::{RootFinder, SolverConfig};
//! use RustedRoots::symbolic::symbolic_engine::Expr;
//! let f = Expr::parse_expression("x^2 - 4").unwrap();
//! let config = SolverConfig::new(1.0, 100, 1e-6).unwrap();
//! let result = RootFinder::new().solve(&f, &config).unwrap();
//! assert!(result.converged);
//! assert!((result.final_estimate - 2.0).abs() < 1e-6);
//! ```
use crate::Utils::logger::init_logger;
use crate::numerical::trace::{CapacityError, IterationTrace, PREALLOCATED};
use crate::symbolic::parse_expr::{ParseError, parse};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_engine_derivatives::{
    DEFAULT_STEP, DerivativeEstimator, DerivativeMode, DomainError,
};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use strum_macros::Display;
use tabled::{builder::Builder, settings::Style};

/// Below this `|f'(x)|` a Newton step is not attempted.
pub const DERIVATIVE_FLOOR: f64 = 1e-12;

/// Message shown to users when a solve fails, followed by the specific error.
pub const ERROR_MSG: &str = "There was an issue in solving this problem";

/// Error types for the root finder
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    Parse(ParseError),
    /// `f` cannot be evaluated at the initial guess
    Domain(DomainError),
    Divergence {
        iteration: usize,
        estimate: f64,
        reason: String,
    },
    Capacity(CapacityError),
    InvalidConfig(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveError::Parse(err) => write!(f, "{}", err),
            SolveError::Domain(err) => write!(f, "{} at the initial guess", err),
            SolveError::Divergence {
                iteration,
                estimate,
                reason,
            } => write!(
                f,
                "Divergence at iteration {} (x = {}): {}",
                iteration, estimate, reason
            ),
            SolveError::Capacity(err) => write!(f, "{}", err),
            SolveError::InvalidConfig(msg) => write!(f, "Invalid solver configuration: {}", msg),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<ParseError> for SolveError {
    fn from(err: ParseError) -> Self {
        SolveError::Parse(err)
    }
}

impl From<DomainError> for SolveError {
    fn from(err: DomainError) -> Self {
        SolveError::Domain(err)
    }
}

impl From<CapacityError> for SolveError {
    fn from(err: CapacityError) -> Self {
        SolveError::Capacity(err)
    }
}

/// Why the iteration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TerminationReason {
    /// `|f(x_0)|` already met the goal error
    InitialGuess,
    /// `|x_{n+1} - x_n|` met the goal error
    StepTolerance,
    /// `|f(x_{n+1})|` met the goal error
    ResidualTolerance,
    /// the iteration budget ran out
    IterationLimit,
}

/// Configuration for one solve
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub initial_guess: f64,
    pub max_iterations: usize,
    pub goal_error: f64,
    pub derivative: DerivativeMode,
    pub derivative_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: 0.0,
            max_iterations: 10000,
            goal_error: 1.0e-4,
            derivative: DerivativeMode::CentralDifference,
            derivative_step: DEFAULT_STEP,
        }
    }
}

impl SolverConfig {
    /// Validated configuration with the default derivative settings.
    pub fn new(
        initial_guess: f64,
        max_iterations: usize,
        goal_error: f64,
    ) -> Result<Self, SolveError> {
        let config = Self {
            initial_guess,
            max_iterations,
            goal_error,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_derivative(mut self, mode: DerivativeMode) -> Self {
        self.derivative = mode;
        self
    }

    pub fn with_derivative_step(mut self, step: f64) -> Self {
        self.derivative_step = step;
        self
    }

    pub fn set_initial_guess(&mut self, initial_guess: f64) {
        self.initial_guess = initial_guess;
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    pub fn set_goal_error(&mut self, goal_error: f64) {
        self.goal_error = goal_error;
    }

    pub fn validate(&self) -> Result<(), SolveError> {
        if self.max_iterations < 1 {
            return Err(SolveError::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !(self.goal_error.is_finite() && self.goal_error > 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "goal_error must be a positive finite number, got {}",
                self.goal_error
            )));
        }
        if !self.initial_guess.is_finite() {
            return Err(SolveError::InvalidConfig(format!(
                "initial_guess must be finite, got {}",
                self.initial_guess
            )));
        }
        if !(self.derivative_step.is_finite() && self.derivative_step > 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "derivative_step must be a positive finite number, got {}",
                self.derivative_step
            )));
        }
        Ok(())
    }
}

/// Outcome of a solve that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// last element of the trace
    pub final_estimate: f64,
    pub trace: IterationTrace,
    pub converged: bool,
    /// steps taken after the initial guess
    pub iterations_used: usize,
    /// `f(final_estimate)`, absent only when `f` is undefined at a lone initial guess
    pub final_residual: Option<f64>,
    pub termination: TerminationReason,
    /// how many of the steps were bisection steps
    pub fallback_steps: usize,
}

impl SolveResult {
    pub fn trace(&self) -> &[f64] {
        self.trace.as_slice()
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.final_estimate)
    }
}

/// reason a Newton step was replaced by a bisection step
#[derive(Debug, Clone)]
enum FallbackReason {
    DerivativeFailed(DomainError),
    FlatDerivative(f64),
    NonFiniteCandidate(f64),
    CandidateFailed { candidate: f64, error: DomainError },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FallbackReason::DerivativeFailed(err) => write!(f, "derivative failed: {}", err),
            FallbackReason::FlatDerivative(slope) => {
                write!(f, "derivative {:e} is too close to zero", slope)
            }
            FallbackReason::NonFiniteCandidate(candidate) => {
                write!(f, "Newton step produced {}", candidate)
            }
            FallbackReason::CandidateFailed { candidate, error } => {
                write!(f, "Newton step to {} failed: {}", candidate, error)
            }
        }
    }
}

/// Main structure of the root finder. Holds only logging settings, so one instance
/// can serve any number of solves, in parallel too.
#[derive(Debug, Clone, Default)]
pub struct RootFinder {
    /// `debug`, `info`, `warn`, `error`, `off` or `none`; `None` leaves logging alone
    pub loglevel: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl RootFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loglevel(&mut self, loglevel: Option<String>) {
        self.loglevel = loglevel;
    }

    pub fn set_log_file(&mut self, log_file: Option<PathBuf>) {
        self.log_file = log_file;
    }

    fn init_logging(&self) -> Result<(), SolveError> {
        if let Some(level) = &self.loglevel {
            init_logger(level, self.log_file.as_deref())
                .map_err(|e| SolveError::InvalidConfig(e.to_string()))?;
        }
        Ok(())
    }

    /// Parses `text` and solves it.
    pub fn solve_str(&self, text: &str, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        let expr = parse(text)?;
        self.solve(&expr, config)
    }

    pub fn solve(&self, expr: &Expr, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        self.init_logging()?;
        self.timed_solve(expr, config)
    }

    /// Independent solves of one expression for several configurations, run on the
    /// rayon thread pool. Results come back in the order of `configs`.
    pub fn solve_batch(
        &self,
        expr: &Expr,
        configs: &[SolverConfig],
    ) -> Vec<Result<SolveResult, SolveError>> {
        if let Err(err) = self.init_logging() {
            return configs.iter().map(|_| Err(err.clone())).collect();
        }
        configs
            .par_iter()
            .map(|config| self.timed_solve(expr, config))
            .collect()
    }

    /// One solve with its statistics table or error logged, the logger already set up.
    fn timed_solve(&self, expr: &Expr, config: &SolverConfig) -> Result<SolveResult, SolveError> {
        let begin = Instant::now();
        let result = solver(expr, config);
        match &result {
            Ok(res) => self.calc_statistics(res, begin.elapsed().as_micros()),
            Err(err) => error!("{}: {}", ERROR_MSG, err),
        }
        result
    }

    fn calc_statistics(&self, result: &SolveResult, elapsed_micros: u128) {
        let residual = result
            .final_residual
            .map(|r| format!("{:e}", r))
            .unwrap_or_else(|| "undefined".to_string());
        let stats = vec![
            ("termination", result.termination.to_string()),
            ("number of iterations", result.iterations_used.to_string()),
            ("fallback steps", result.fallback_steps.to_string()),
            ("length of trace", result.trace.len().to_string()),
            ("final residual", residual),
            ("time elapsed, us", elapsed_micros.to_string()),
        ];
        let mut builder = Builder::default();
        for (key, value) in stats {
            builder.push_record(vec![key.to_string(), value]);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table);
    }
}

/// Solves with a default [`RootFinder`], which never touches the logger.
pub fn solve_expr(expr: &Expr, config: &SolverConfig) -> Result<SolveResult, SolveError> {
    RootFinder::new().solve(expr, config)
}

/// Parse-and-solve in one call with the default derivative settings.
///
/// # Example
/// ```
/// let result = RustedRoots::solve("x^2 - 4", 1.0, 100, 1e-6).unwrap();
/// assert!(result.converged);
/// println!("root = {}, after {} iterations", result, result.iterations_used);
/// ```
pub fn solve(
    expression_text: &str,
    initial_guess: f64,
    max_iterations: usize,
    goal_error: f64,
) -> Result<SolveResult, SolveError> {
    let config = SolverConfig::new(initial_guess, max_iterations, goal_error)?;
    RootFinder::new().solve_str(expression_text, &config)
}

/// One solve. Trace and residual history are local to the call.
fn solver(expr: &Expr, config: &SolverConfig) -> Result<SolveResult, SolveError> {
    config.validate()?;
    let estimator = DerivativeEstimator::new(expr, config.derivative, config.derivative_step);
    info!(
        "solving {} = 0 from x0 = {}, max iterations {}, goal error {:e}, derivative: {}",
        expr, config.initial_guess, config.max_iterations, config.goal_error, estimator
    );

    let mut trace = IterationTrace::with_capacity(config.max_iterations);
    let mut residuals: Vec<f64> = Vec::with_capacity(config.max_iterations.min(PREALLOCATED));
    let x0 = config.initial_guess;
    trace.push(x0)?;

    let f0 = match expr.evaluate(x0) {
        Ok(value) => value,
        Err(err) if config.max_iterations == 1 => {
            warn!("{} at the initial guess, no iterations allowed", err);
            return Ok(SolveResult {
                final_estimate: x0,
                trace,
                converged: false,
                iterations_used: 0,
                final_residual: None,
                termination: TerminationReason::IterationLimit,
                fallback_steps: 0,
            });
        }
        Err(err) => {
            error!("{} at the initial guess {}", err, x0);
            return Err(SolveError::Domain(err));
        }
    };
    residuals.push(f0);
    if f0.abs() <= config.goal_error {
        info!("initial guess {} already satisfies |f| <= {:e}", x0, config.goal_error);
        return Ok(SolveResult {
            final_estimate: x0,
            trace,
            converged: true,
            iterations_used: 0,
            final_residual: Some(f0),
            termination: TerminationReason::InitialGuess,
            fallback_steps: 0,
        });
    }

    let mut x = x0;
    let mut fx = f0;
    let mut fallback_steps = 0;
    for i in 0..config.max_iterations - 1 {
        let (x_new, f_new) = match newton_step(expr, &estimator, x, fx) {
            Ok(step) => step,
            Err(reason) => {
                warn!("iteration {}: {}, falling back to bisection", i + 1, reason);
                fallback_steps += 1;
                bisection_step(expr, trace.as_slice(), &residuals, x, fx)
                    .map_err(|err| diverged(i + 1, x, format!("{}; {}", reason, err)))?
            }
        };
        trace.push(x_new)?;
        residuals.push(f_new);
        debug!("iteration {}: x = {:.12}, f(x) = {:e}", i + 1, x_new, f_new);

        let step = (x_new - x).abs();
        x = x_new;
        fx = f_new;
        let termination = if step <= config.goal_error {
            Some(TerminationReason::StepTolerance)
        } else if fx.abs() <= config.goal_error {
            Some(TerminationReason::ResidualTolerance)
        } else {
            None
        };
        if let Some(termination) = termination {
            info!("converged to {} after {} iterations ({})", x, i + 1, termination);
            return Ok(SolveResult {
                final_estimate: x,
                trace,
                converged: true,
                iterations_used: i + 1,
                final_residual: Some(fx),
                termination,
                fallback_steps,
            });
        }
    }

    warn!(
        "no convergence within {} iterations, last estimate {}",
        config.max_iterations, x
    );
    Ok(SolveResult {
        final_estimate: x,
        iterations_used: trace.len() - 1,
        trace,
        converged: false,
        final_residual: Some(fx),
        termination: TerminationReason::IterationLimit,
        fallback_steps,
    })
}

fn diverged(iteration: usize, estimate: f64, reason: String) -> SolveError {
    error!("divergence at iteration {} (x = {}): {}", iteration, estimate, reason);
    SolveError::Divergence {
        iteration,
        estimate,
        reason,
    }
}

/// Newton candidate and `f` at it.
fn newton_step(
    expr: &Expr,
    estimator: &DerivativeEstimator,
    x: f64,
    fx: f64,
) -> Result<(f64, f64), FallbackReason> {
    let slope = estimator.at(x).map_err(FallbackReason::DerivativeFailed)?;
    if slope.abs() < DERIVATIVE_FLOOR {
        return Err(FallbackReason::FlatDerivative(slope));
    }
    let candidate = x - fx / slope;
    if !candidate.is_finite() {
        return Err(FallbackReason::NonFiniteCandidate(candidate));
    }
    let f_candidate = expr
        .evaluate(candidate)
        .map_err(|error| FallbackReason::CandidateFailed { candidate, error })?;
    Ok((candidate, f_candidate))
}

/// Midpoint of the bracket formed by `x` and the most recent earlier estimate whose
/// residual has the opposite sign.
fn bisection_step(
    expr: &Expr,
    estimates: &[f64],
    residuals: &[f64],
    x: f64,
    fx: f64,
) -> Result<(f64, f64), String> {
    let current = estimates.len() - 1;
    let partner = (0..current)
        .rev()
        .find(|&j| (residuals[j] < 0.0) != (fx < 0.0))
        .ok_or_else(|| "no earlier estimate brackets a sign change".to_string())?;
    let midpoint = 0.5 * (estimates[partner] + x);
    debug!(
        "bracket [{}, {}], bisection to {}",
        estimates[partner], x, midpoint
    );
    let f_mid = expr
        .evaluate(midpoint)
        .map_err(|err| format!("bisection midpoint {} failed: {}", midpoint, err))?;
    Ok((midpoint, f_mid))
}
