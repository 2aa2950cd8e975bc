//! numerical part of the crate: the root finder and the record of its iterations
///  Example#1
/// ```
/// // the shortest way: parse and solve in one call
/// let result = RustedRoots::solve("x^2 - 4", 1.0, 100, 1e-6).unwrap();
/// println!("result = {}, converged = {}", result, result.converged);
/// println!("trace = {:?}", result.trace());
/// ```
/// Example#2
/// ```
/// // or more verbose way, with the symbolic derivative and console logging
/// use RustedRoots::numerical::root_finder::{RootFinder, SolverConfig};
/// use RustedRoots::symbolic::symbolic_engine::Expr;
/// use RustedRoots::symbolic::symbolic_engine_derivatives::DerivativeMode;
/// let f = Expr::parse_expression("x^3 - 2*x - 5").unwrap();
/// let config = SolverConfig::new(2.0, 50, 1e-10)
///     .unwrap()
///     .with_derivative(DerivativeMode::Symbolic);
/// let mut finder = RootFinder::new();
/// finder.set_loglevel(Some("warn".to_string()));
/// let result = finder.solve(&f, &config).unwrap();
/// assert!(result.converged);
/// ```
pub mod root_finder;
/// fixed-capacity buffer of iterates
pub mod trace;
