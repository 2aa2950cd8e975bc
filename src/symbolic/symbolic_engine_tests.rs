//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use crate::symbolic::parse_expr::parse;
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_engine_derivatives::{
        DEFAULT_STEP, DerivativeEstimator, DerivativeMode, DomainError,
    };
    use approx::assert_relative_eq;
    use rand::Rng;
    use std::f64::consts::{E, FRAC_PI_2, PI};
    use strum::IntoEnumIterator;

    #[test]
    fn test_operator_overloading() {
        let x = Expr::x();
        let expr = x.clone() * x - Expr::Const(4.0);
        let expected = Expr::Sub(
            Box::new(Expr::Mul(Box::new(Expr::x()), Box::new(Expr::x()))),
            Box::new(Expr::Const(4.0)),
        );
        assert_eq!(expr, expected);
        assert_eq!(
            -Expr::x(),
            Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(Expr::x()))
        );
    }

    #[test]
    fn test_evaluate_parsed() {
        let f = parse("x^2-4").unwrap();
        assert_eq!(f.evaluate(3.0).unwrap(), 5.0);
        assert_eq!(parse("2^3^2").unwrap().evaluate(0.0).unwrap(), 512.0);
        assert_eq!(parse("-x^2").unwrap().evaluate(3.0).unwrap(), -9.0);
        assert_eq!(parse("8/4/2").unwrap().evaluate(0.0).unwrap(), 1.0);
        assert_eq!(parse("1.0E-4").unwrap().evaluate(0.0).unwrap(), 1.0e-4);
        assert_eq!(parse("2*x+3*x").unwrap().evaluate(2.0).unwrap(), 10.0);
        assert_eq!(parse("(2+3)*x").unwrap().evaluate(2.0).unwrap(), 10.0);
    }

    #[test]
    fn test_evaluate_functions() {
        assert_relative_eq!(parse("sin(x)").unwrap().evaluate(FRAC_PI_2).unwrap(), 1.0);
        assert_relative_eq!(parse("cos(x)").unwrap().evaluate(PI).unwrap(), -1.0);
        assert_relative_eq!(
            parse("tan(x)").unwrap().evaluate(PI / 4.0).unwrap(),
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(parse("ln(x)").unwrap().evaluate(E).unwrap(), 1.0);
        assert_relative_eq!(parse("e^x").unwrap().evaluate(1.0).unwrap(), E);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let f = parse("sin(x)*x^3 - ln(x + 10)").unwrap();
        let first = f.evaluate(1.234).unwrap();
        for _ in 0..10 {
            assert_eq!(f.evaluate(1.234).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(
            parse("1/x").unwrap().evaluate(0.0),
            Err(DomainError::DivisionByZero)
        );
        assert!(matches!(
            parse("tan(x)").unwrap().evaluate(FRAC_PI_2),
            Err(DomainError::TangentPole { .. })
        ));
        assert!(matches!(
            parse("ln(x)").unwrap().evaluate(-1.0),
            Err(DomainError::NonFinite { operation: "ln", .. })
        ));
        assert!(matches!(
            parse("ln(x)").unwrap().evaluate(0.0),
            Err(DomainError::NonFinite { .. })
        ));
        assert!(matches!(
            parse("x^0.5").unwrap().evaluate(-4.0),
            Err(DomainError::NonFinite { operation: "power", .. })
        ));
        assert!(matches!(
            parse("e^x").unwrap().evaluate(1000.0),
            Err(DomainError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_unbound_variable() {
        let expr = Expr::Var("y".to_string()) + Expr::Const(1.0);
        assert_eq!(
            expr.evaluate(1.0),
            Err(DomainError::UnboundVariable("y".to_string()))
        );
    }

    #[test]
    fn test_display_reparses() {
        let inputs = [
            "x^2-4",
            "-x^2",
            "2^3^2",
            "8/4/2",
            "sin(x)*cos(x) - tan(x/3)",
            "ln(x+2) - e^(-x)",
            "x^-2 + (x-1)*(x+1)",
            "-(x - 3)",
        ];
        for input in inputs {
            let original = parse(input).unwrap();
            let printed = original.to_string();
            let reparsed = parse(&printed).unwrap();
            for x in [0.3, 1.7, 2.9] {
                assert_eq!(
                    original.evaluate(x).unwrap(),
                    reparsed.evaluate(x).unwrap(),
                    "{} printed as {}",
                    input,
                    printed
                );
            }
        }
    }

    #[test]
    fn test_display_negative_constant() {
        let expr = Expr::Pow(Box::new(Expr::Const(-1.0)), Box::new(Expr::Const(2.0)));
        assert_eq!(expr.to_string(), "((-1) ^ 2)");
        assert_eq!(parse(&expr.to_string()).unwrap().evaluate(0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_random_polynomials_evaluate() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let a: f64 = rng.random_range(-10.0..10.0);
            let b: f64 = rng.random_range(-10.0..10.0);
            let c: f64 = rng.random_range(-10.0..10.0);
            let x: f64 = rng.random_range(-5.0..5.0);
            let text = format!("{}*x^2 + {}*x + {}", a, b, c);
            let expr = parse(&text).unwrap();
            assert_relative_eq!(
                expr.evaluate(x).unwrap(),
                a * x.powf(2.0) + b * x + c,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_diff_polynomial() {
        let f = parse("x^3 - 2*x + 1").unwrap();
        let df = f.derivative_expression();
        assert_relative_eq!(df.evaluate(2.0).unwrap(), 10.0, epsilon = 1e-12);
        assert!(df.node_count() <= f.diff("x").node_count());
    }

    #[test]
    fn test_diff_rules() {
        let cases = [
            ("sin(x)", 0.7, 0.7f64.cos()),
            ("cos(x)", 0.7, -(0.7f64.sin())),
            ("tan(x)", 0.7, 1.0 / 0.7f64.cos().powi(2)),
            ("ln(x)", 0.7, 1.0 / 0.7),
            ("e^x", 0.7, 0.7f64.exp()),
            ("x^x", 1.5, 1.5f64.powf(1.5) * (1.5f64.ln() + 1.0)),
            ("1/x", 2.0, -0.25),
            ("x*sin(x)", 1.0, 1.0f64.sin() + 1.0f64.cos()),
        ];
        for (input, x, expected) in cases {
            let df = parse(input).unwrap().derivative_expression();
            assert_relative_eq!(df.evaluate(x).unwrap(), expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_diff_with_respect_to_other_variable() {
        let f = parse("x^2").unwrap();
        assert_eq!(f.diff("y").simplify_(), Expr::Const(0.0));
    }

    #[test]
    fn test_simplify_keeps_division_by_zero() {
        let expr = Expr::Div(Box::new(Expr::Const(1.0)), Box::new(Expr::Const(0.0)));
        assert_eq!(expr.simplify_(), expr);
        assert_eq!(expr.simplify_().evaluate(0.0), Err(DomainError::DivisionByZero));
    }

    #[test]
    fn test_simplify_collects_constants() {
        let expr = parse("(2*x)*3").unwrap().simplify_();
        assert_eq!(
            expr,
            Expr::Mul(Box::new(Expr::Const(6.0)), Box::new(Expr::x()))
        );
        assert_eq!(parse("x*x").unwrap().simplify_().to_string(), "(x ^ 2)");
        assert_eq!(parse("x^1 + 0").unwrap().simplify_(), Expr::x());
    }

    #[test]
    fn test_simplify_keeps_domain_of_zero_factor() {
        assert_eq!(parse("0*sin(x)").unwrap().simplify_(), Expr::Const(0.0));
        assert_eq!(parse("(x^2+1)^0").unwrap().simplify_(), Expr::Const(1.0));
        let zero_ln = parse("0*ln(x)").unwrap();
        assert_eq!(zero_ln.simplify_(), zero_ln);
        let tan_to_zero = parse("tan(x)^0").unwrap();
        assert_eq!(tan_to_zero.simplify_(), tan_to_zero);
        assert!(!parse("x^0.5").unwrap().is_defined_everywhere());
        assert!(parse("x^3 - cos(x)").unwrap().is_defined_everywhere());

        // both derivative modes agree that 3*ln(x) has no slope at -1
        let f = parse("3*ln(x)").unwrap();
        for mode in DerivativeMode::iter() {
            let estimator = DerivativeEstimator::new(&f, mode, DEFAULT_STEP);
            assert!(estimator.at(-1.0).is_err(), "{} gave a slope", mode);
            assert_relative_eq!(estimator.at(2.0).unwrap(), 1.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_central_difference() {
        let f = parse("x^2").unwrap();
        assert_relative_eq!(f.derivative(3.0, DEFAULT_STEP).unwrap(), 6.0, epsilon = 1e-6);
        let g = parse("1/x").unwrap();
        assert!(g.derivative(0.0, 1.0).is_ok());
        assert!(g.derivative(1.0, 1.0).is_err());
    }

    #[test]
    fn test_compare_num1D() {
        for input in ["x^3 - 2*x", "sin(x)*x", "ln(x+3)", "e^(x/2)"] {
            let f = parse(input).unwrap();
            let (norm, ok) = f.compare_num1D(0.5, 2.0, 50, 1e-5).unwrap();
            assert!(ok, "{} deviates by {}", input, norm);
        }
    }

    #[test]
    fn test_derivative_estimator_modes_agree() {
        let f = parse("x^3 - 2*x - 5").unwrap();
        for mode in DerivativeMode::iter() {
            let estimator = DerivativeEstimator::new(&f, mode, DEFAULT_STEP);
            assert_eq!(estimator.mode(), mode);
            assert_relative_eq!(estimator.at(2.0).unwrap(), 10.0, epsilon = 1e-5);
        }
        let symbolic = DerivativeEstimator::new(&f, DerivativeMode::Symbolic, DEFAULT_STEP);
        assert!(symbolic.symbolic_derivative().is_some());
        assert!(symbolic.to_string().starts_with("symbolic"));
    }

    #[test]
    fn test_derivative_mode_strings() {
        use std::str::FromStr;
        assert_eq!(
            DerivativeMode::from_str("central_difference").unwrap(),
            DerivativeMode::CentralDifference
        );
        assert_eq!(DerivativeMode::from_str("symbolic").unwrap(), DerivativeMode::Symbolic);
        assert!(DerivativeMode::from_str("forward").is_err());
        assert_eq!(DerivativeMode::Symbolic.to_string(), "symbolic");
        assert_eq!(DerivativeMode::default(), DerivativeMode::CentralDifference);
    }
}
