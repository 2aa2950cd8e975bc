//! # Symbolic Engine Module
//!
//! The expression tree behind the root finder. A formula typed by the user is parsed
//! (see [`crate::symbolic::parse_expr`]) into an [`Expr`], which can then be evaluated,
//! differentiated and simplified.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variable**: `Var(String)` - the free variable, always `x` when produced by the parser
//! - **Constant**: `Const(f64)` - numeric literals and the constant `e`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - binary arithmetic
//! - **Functions**: `sin`, `cos`, `tg`, `Ln` - unary functions
//!
//! ### Key Methods
//! - `parse_expression(text)` - string to expression (fallible)
//! - `evaluate(x)` - pure tree walk, see `symbolic_engine_derivatives`
//! - `diff(var)` - analytical derivative
//! - `simplify_()` - constant folding and algebraic identities
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: `Box<Expr>` children, so parenthesis groups are
//!    encoded by the shape of the tree rather than by a node of their own
//!
//! 2. **Operator Overloading**: `std::ops` traits give `x.clone() * x - Expr::Const(4.0)`
//!
//! 3. **Round-trip printing**: `Display` writes every binary node in parentheses, so the
//!    printed form parses back into an equivalent tree
//!
//! 4. **Non-standard Function Names**: the tangent variant is called `tg` (mathematical
//!    notation) but prints as `tan`, the spelling the parser accepts

#![allow(non_camel_case_types)]

use std::fmt;

/// Name of the only free variable understood by the parser.
pub const VARIABLE: &str = "x";

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// Every leaf is either a variable or a numeric constant; the arity of every internal node
/// is fixed by its variant. Unary minus is stored as `Mul(Const(-1.0), operand)`.
///
/// # Examples
/// ```rust
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// assert_eq!(expr.evaluate(1.0).unwrap(), 3.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
}

/// Display implementation for printing expressions.
///
/// Binary operations are always wrapped in parentheses and negative constants are
/// parenthesised, so `(-1 ^ 2)` can never be printed for `Pow(Const(-1), Const(2))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) if val.is_sign_negative() && *val != 0.0 => write!(f, "({})", val),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// The free variable `x`.
    pub fn x() -> Expr {
        Expr::Var(VARIABLE.to_string())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Checks whether the named variable occurs anywhere in the tree.
    ///
    /// Used by differentiation to pick the cheaper power rule when an exponent
    /// or a base is constant with respect to `var_name`.
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
            Expr::Ln(expr) | Expr::sin(expr) | Expr::cos(expr) | Expr::tg(expr) => {
                expr.contains_variable(var_name)
            }
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        match self {
            Expr::Var(name) if name == var => Expr::Const(value),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.set_variable(var, value)),
                Box::new(rhs.set_variable(var, value)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.set_variable(var, value)),
                Box::new(exp.set_variable(var, value)),
            ),
            Expr::Ln(expr) => Expr::Ln(Box::new(expr.set_variable(var, value))),
            Expr::sin(expr) => Expr::sin(Box::new(expr.set_variable(var, value))),
            Expr::cos(expr) => Expr::cos(Box::new(expr.set_variable(var, value))),
            Expr::tg(expr) => Expr::tg(Box::new(expr.set_variable(var, value))),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 1.0)
    }

    /// True when the expression has a value at every finite `x`, overflow aside:
    /// no `ln`, `tan`, division or non-integer power anywhere in it.
    pub fn is_defined_everywhere(&self) -> bool {
        match self {
            Expr::Var(_) => true,
            Expr::Const(val) => val.is_finite(),
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) => {
                lhs.is_defined_everywhere() && rhs.is_defined_everywhere()
            }
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(c) if *c >= 0.0 && c.fract() == 0.0 => base.is_defined_everywhere(),
                _ => false,
            },
            Expr::sin(expr) | Expr::cos(expr) => expr.is_defined_everywhere(),
            Expr::Div(..) | Expr::Ln(_) | Expr::tg(_) => false,
        }
    }

    /// Number of nodes in the tree, handy to see how much `simplify_` saved.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Var(_) | Expr::Const(_) => 1,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Ln(expr) | Expr::sin(expr) | Expr::cos(expr) | Expr::tg(expr) => {
                1 + expr.node_count()
            }
        }
    }
}
