#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let input = "x^2.3 * ln(x + 1)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// // malformed input is reported, never guessed at
/// assert!(Expr::parse_expression("x*/2").is_err());
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the expression tree
/// 2) prints it back into a string that parses to the same tree
///# Example#
/// ```
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let x = Expr::x();
/// let f = x.clone() * x - Expr::Const(4.0);
/// println!("f = {}", f);
/// assert_eq!(f.evaluate(2.0).unwrap(), 0.0);
/// ```
pub mod symbolic_engine;
/// evaluation with domain checking, analytical and finite difference derivatives
///# Example#
/// ```
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("sin(x) * x").unwrap();
/// let df_dx = f.derivative_expression();
/// println!("df_dx = {}", df_dx);
/// let analytical = df_dx.evaluate(1.0).unwrap();
/// let numerical = f.derivative(1.0, 1e-6).unwrap();
/// assert!((analytical - numerical).abs() < 1e-6);
/// // compare numerical and analtical derivatives for a given linspace
/// let (norm, ok) = f.compare_num1D(0.0, 2.0, 100, 1e-6).unwrap();
/// println!(" result_of compare = {}, {}", norm, ok);
/// ```
pub mod symbolic_engine_derivatives;
mod symbolic_engine_tests;
/// constant folding and algebraic identities
pub mod symbolic_simplify;
/// finite differences, grids and norms
pub mod utils;
