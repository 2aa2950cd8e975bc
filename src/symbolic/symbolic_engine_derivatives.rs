//! # Symbolic Engine Derivatives Module
//!
//! This module extends the symbolic engine with evaluation and differentiation, the two
//! things the root finder asks of an expression at every iteration.
//!
//! ## Key Methods
//!
//! ### Function evaluation
//! - `evaluate(x)` - pure tree walk with domain checking
//! - `evaluate_in(&EvaluationContext)` - the same with an explicit binding
//!
//! ### Differentiation
//! - `diff(var: &str)` - analytical derivative
//! - `derivative_expression()` - `diff("x")` followed by `simplify_()`
//! - `derivative(x, h)` - central finite difference
//! - `DerivativeEstimator` - one of the two above, chosen by `DerivativeMode`
//!
//! ### Numerical Analysis
//! - `compare_num1D()` - validate the analytical derivative against the finite difference
//!
//! ## Interesting Code Features
//!
//! 1. **Domain Checking**: every node checks its result for finiteness, so an overflow or
//!    `ln(-1)` is reported as a `DomainError` at the node where it happens instead of
//!    leaking a NaN into the Newton iteration
//!
//! 2. **Cheaper Power Rules**: `x^c` and `c^x` are differentiated with the plain power and
//!    exponential rules, the general `u^v` rule is used only when both sides depend on `x`
use crate::symbolic::symbolic_engine::{Expr, VARIABLE};
use crate::symbolic::utils::{central_difference, linspace, norm, numerical_derivative};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Step of the central difference unless configured otherwise.
pub const DEFAULT_STEP: f64 = 1e-6;
/// `tan` is undefined where `|cos(arg)|` drops below this.
pub const TAN_POLE_TOLERANCE: f64 = 1e-12;

/// The single binding `x -> value` an expression is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationContext {
    pub x: f64,
}

impl EvaluationContext {
    pub fn new(x: f64) -> Self {
        Self { x }
    }

    fn lookup(&self, name: &str) -> Result<f64, DomainError> {
        if name == VARIABLE {
            Ok(self.x)
        } else {
            Err(DomainError::UnboundVariable(name.to_string()))
        }
    }
}

/// Evaluation failures. Inside the solver they trigger the bisection fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    DivisionByZero,
    TangentPole { argument: f64 },
    NonFinite { operation: &'static str, value: f64 },
    UnboundVariable(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DomainError::DivisionByZero => write!(f, "Domain error: division by zero"),
            DomainError::TangentPole { argument } => {
                write!(f, "Domain error: tan is undefined at {}", argument)
            }
            DomainError::NonFinite { operation, value } => {
                write!(f, "Domain error: {} produced {}", operation, value)
            }
            DomainError::UnboundVariable(name) => {
                write!(f, "Domain error: variable '{}' has no value", name)
            }
        }
    }
}

impl std::error::Error for DomainError {}

fn finite(operation: &'static str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::NonFinite { operation, value })
    }
}

/// How `f'(x)` is obtained during a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
pub enum DerivativeMode {
    #[default]
    #[strum(serialize = "central_difference")]
    CentralDifference,
    #[strum(serialize = "symbolic")]
    Symbolic,
}

impl Expr {
    /// FUNCTION EVALUATION

    /// Evaluates the expression with `x` bound to the given value.
    ///
    /// Pure: no state is kept between calls, so one expression may be evaluated from
    /// several threads at once.
    ///
    /// # Examples
    /// ```rust
    /// use RustedRoots::symbolic::symbolic_engine::Expr;
    /// let f = Expr::parse_expression("tan(x)").unwrap();
    /// assert!(f.evaluate(std::f64::consts::FRAC_PI_2).is_err());
    /// ```
    pub fn evaluate(&self, x: f64) -> Result<f64, DomainError> {
        self.evaluate_in(&EvaluationContext::new(x))
    }

    pub fn evaluate_in(&self, ctx: &EvaluationContext) -> Result<f64, DomainError> {
        match self {
            Expr::Var(name) => ctx.lookup(name),
            Expr::Const(val) => finite("constant", *val),
            Expr::Add(lhs, rhs) => finite("addition", lhs.evaluate_in(ctx)? + rhs.evaluate_in(ctx)?),
            Expr::Sub(lhs, rhs) => {
                finite("subtraction", lhs.evaluate_in(ctx)? - rhs.evaluate_in(ctx)?)
            }
            Expr::Mul(lhs, rhs) => {
                finite("multiplication", lhs.evaluate_in(ctx)? * rhs.evaluate_in(ctx)?)
            }
            Expr::Div(lhs, rhs) => {
                let numerator = lhs.evaluate_in(ctx)?;
                let denominator = rhs.evaluate_in(ctx)?;
                if denominator == 0.0 {
                    return Err(DomainError::DivisionByZero);
                }
                finite("division", numerator / denominator)
            }
            Expr::Pow(base, exp) => {
                finite("power", base.evaluate_in(ctx)?.powf(exp.evaluate_in(ctx)?))
            }
            Expr::Ln(expr) => finite("ln", expr.evaluate_in(ctx)?.ln()),
            Expr::sin(expr) => finite("sin", expr.evaluate_in(ctx)?.sin()),
            Expr::cos(expr) => finite("cos", expr.evaluate_in(ctx)?.cos()),
            Expr::tg(expr) => {
                let argument = expr.evaluate_in(ctx)?;
                if argument.cos().abs() < TAN_POLE_TOLERANCE {
                    return Err(DomainError::TangentPole { argument });
                }
                finite("tan", argument.tan())
            }
        }
    }

    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard rules:
    /// - Power rule: d/dx(u^c) = c*u^(c-1)*u'
    /// - Exponential rule: d/dx(c^v) = c^v*ln(c)*v'
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule for `sin`, `cos`, `tan` and `ln`
    ///
    /// The result is not simplified, see [`Expr::derivative_expression`].
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
                )),
                Box::new(Expr::Pow(rhs.clone(), Box::new(Expr::Const(2.0)))),
            ),
            Expr::Pow(base, exp) if !exp.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            Expr::Pow(base, exp) if !base.contains_variable(var) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(self.clone()),
                    Box::new(Expr::Ln(base.clone())),
                )),
                Box::new(exp.diff(var)),
            ),
            // u^v * (v' * ln(u) + v * u' / u)
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(self.clone()),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(
                        Box::new(exp.diff(var)),
                        Box::new(Expr::Ln(base.clone())),
                    )),
                    Box::new(Expr::Div(
                        Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                        base.clone(),
                    )),
                )),
            ),
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
        }
    } // end of diff

    /// d/dx of the expression, simplified.
    pub fn derivative_expression(&self) -> Expr {
        self.diff(VARIABLE).simplify_()
    }

    /// Central finite difference `(f(x+h) - f(x-h)) / 2h`.
    ///
    /// Fails if either neighbour cannot be evaluated or the quotient is not finite.
    pub fn derivative(&self, x: f64, h: f64) -> Result<f64, DomainError> {
        let slope = central_difference(|t| self.evaluate(t), x, h)?;
        finite("finite difference", slope)
    }

    /// Compares the analytical derivative with the finite difference on a grid.
    ///
    /// # Arguments
    /// * `start` - Domain start
    /// * `end` - Domain end
    /// * `num_values` - Number of test points
    /// * `max_norm` - Maximum acceptable norm difference
    ///
    /// # Returns
    /// Tuple of (actual_norm, is_within_tolerance)
    pub fn compare_num1D(
        &self,
        start: f64,
        end: f64,
        num_values: usize,
        max_norm: f64,
    ) -> Result<(f64, bool), DomainError> {
        let derivative = self.derivative_expression();
        let domain = linspace(start, end, num_values);
        let analytical_derivative = domain
            .iter()
            .map(|&x| derivative.evaluate(x))
            .collect::<Result<Vec<f64>, DomainError>>()?;
        let step = if num_values > 1 {
            (1.0 / 1e4) * (end - start) / (num_values as f64 - 1.0)
        } else {
            DEFAULT_STEP
        };
        let numerical = numerical_derivative(|x| self.evaluate(x), &domain, step)?;
        let norma_val = norm(&analytical_derivative, &numerical);

        Ok((norma_val, max_norm > norma_val))
    }
}

/// Gives `f'(x)` for one function, either from a derivative tree built once up front
/// or from a central difference with a fixed step.
#[derive(Debug, Clone)]
pub struct DerivativeEstimator<'a> {
    function: &'a Expr,
    mode: DerivativeMode,
    step: f64,
    symbolic: Option<Expr>,
}

impl<'a> DerivativeEstimator<'a> {
    pub fn new(function: &'a Expr, mode: DerivativeMode, step: f64) -> Self {
        let symbolic = match mode {
            DerivativeMode::Symbolic => Some(function.derivative_expression()),
            DerivativeMode::CentralDifference => None,
        };
        Self {
            function,
            mode,
            step,
            symbolic,
        }
    }

    pub fn mode(&self) -> DerivativeMode {
        self.mode
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// the derivative tree, present in symbolic mode only
    pub fn symbolic_derivative(&self) -> Option<&Expr> {
        self.symbolic.as_ref()
    }

    pub fn at(&self, x: f64) -> Result<f64, DomainError> {
        match &self.symbolic {
            Some(derivative) => derivative.evaluate(x),
            None => self.function.derivative(x, self.step),
        }
    }
}

impl fmt::Display for DerivativeEstimator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.symbolic {
            Some(derivative) => write!(f, "symbolic f'(x) = {}", derivative),
            None => write!(f, "central difference with h = {:e}", self.step),
        }
    }
}
