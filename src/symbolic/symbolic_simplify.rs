//! # Symbolic Expression Simplification Module
//!
//! Keeps symbolic derivatives small. `diff` produces trees full of `0 * u` and `1 * v`
//! terms; `simplify_` removes them bottom-up.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: arithmetic on two constants is evaluated, but only when the
//!    result is finite, so `1/0` stays in the tree and still fails at evaluation time
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x ^ 1 = x. `u * 0 = 0` and `u ^ 0 = 1`
//!    only when `u` is defined for every x (see [`Expr::is_defined_everywhere`]), so the
//!    derivative of `3*ln(x)` still fails where `ln(x)` does
//! 3. **Constant Collection**: (c1 * u) * c2 = (c1 * c2) * u
//! 4. **Power Rules**: x * x = x^2, x^a * x^b = x^(a + b)
use crate::symbolic::symbolic_engine::Expr;

fn fold(value: f64, otherwise: impl FnOnce() -> Expr) -> Expr {
    if value.is_finite() {
        Expr::Const(value)
    } else {
        otherwise()
    }
}

impl Expr {
    /// Simplifies the expression recursively, children first.
    ///
    /// # Examples
    /// ```rust
    /// use RustedRoots::symbolic::symbolic_engine::Expr;
    /// let d = Expr::parse_expression("x^2 - 4").unwrap().diff("x").simplify_();
    /// assert_eq!(d.to_string(), "(2 * x)");
    /// ```
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        fold(a + b, || Expr::Add(Box::new(lhs.clone()), Box::new(rhs.clone())))
                    }
                    _ if lhs.is_zero() => rhs, // 0 + x = x
                    _ if rhs.is_zero() => lhs, // x + 0 = x
                    _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        fold(a - b, || Expr::Sub(Box::new(lhs.clone()), Box::new(rhs.clone())))
                    }
                    _ if rhs.is_zero() => lhs, // x - 0 = x
                    _ if lhs.is_zero() => {
                        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(rhs)).simplify_()
                    }
                    _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        fold(a * b, || Expr::Mul(Box::new(lhs.clone()), Box::new(rhs.clone())))
                    }
                    // 0 * u = 0, unless u can fail
                    _ if lhs.is_zero() && rhs.is_defined_everywhere() => Expr::Const(0.0),
                    _ if rhs.is_zero() && lhs.is_defined_everywhere() => Expr::Const(0.0),
                    _ if lhs.is_one() => rhs, // 1 * x = x
                    _ if rhs.is_one() => lhs, // x * 1 = x
                    // (c1 * u) * c2 and c2 * (c1 * u)
                    (Expr::Mul(inner_lhs, inner_rhs), Expr::Const(c))
                    | (Expr::Const(c), Expr::Mul(inner_lhs, inner_rhs)) => {
                        match inner_lhs.as_ref() {
                            Expr::Const(c1) if (c1 * c).is_finite() => {
                                Expr::Mul(Box::new(Expr::Const(c1 * c)), inner_rhs.clone())
                                    .simplify_()
                            }
                            _ => Self::const_first(lhs.clone(), rhs.clone()),
                        }
                    }
                    (Expr::Var(v1), Expr::Var(v2)) if v1 == v2 => {
                        Expr::Pow(Box::new(lhs.clone()), Box::new(Expr::Const(2.0)))
                    }
                    // x^a * x^b = x^(a+b)
                    (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if base1 == base2 => {
                        let new_exp = Expr::Add(exp1.clone(), exp2.clone()).simplify_();
                        Expr::Pow(base1.clone(), Box::new(new_exp)).simplify_()
                    }
                    _ => Self::const_first(lhs, rhs),
                }
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => {
                        fold(a / b, || Expr::Div(Box::new(lhs.clone()), Box::new(rhs.clone())))
                    }
                    _ if rhs.is_one() => lhs, // x / 1 = x
                    // (c1 * u) / c2 = (c1 / c2) * u
                    (Expr::Mul(inner_lhs, inner_rhs), Expr::Const(c)) if *c != 0.0 => {
                        match inner_lhs.as_ref() {
                            Expr::Const(c1) if (c1 / c).is_finite() => {
                                Expr::Mul(Box::new(Expr::Const(c1 / c)), inner_rhs.clone())
                                    .simplify_()
                            }
                            _ => Expr::Div(Box::new(lhs.clone()), Box::new(rhs.clone())),
                        }
                    }
                    _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Pow(base, exp) => {
                let base = base.simplify_();
                let exp = exp.simplify_();
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => {
                        fold(a.powf(*b), || Expr::Pow(Box::new(base.clone()), Box::new(exp.clone())))
                    }
                    _ if exp.is_one() => base,            // x^1 = x
                    // x^0 = 1, unless x can fail
                    _ if exp.is_zero() && base.is_defined_everywhere() => Expr::Const(1.0),
                    _ => Expr::Pow(Box::new(base), Box::new(exp)),
                }
            }
            Expr::Ln(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => fold(a.ln(), || Expr::Ln(Box::new(expr.clone()))),
                    _ => Expr::Ln(Box::new(expr)),
                }
            }
            Expr::sin(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.sin()),
                    _ => Expr::sin(Box::new(expr)),
                }
            }
            Expr::cos(expr) => {
                let expr = expr.simplify_();
                match &expr {
                    Expr::Const(a) => Expr::Const(a.cos()),
                    _ => Expr::cos(Box::new(expr)),
                }
            }
            // tan of a constant is left alone, folding would hide a pole
            Expr::tg(expr) => Expr::tg(Box::new(expr.simplify_())),
        }
    }

    /// puts a constant factor on the left: u * c -> c * u
    fn const_first(lhs: Expr, rhs: Expr) -> Expr {
        match (&lhs, &rhs) {
            (_, Expr::Const(_)) if !matches!(lhs, Expr::Const(_)) => {
                Expr::Mul(Box::new(rhs), Box::new(lhs))
            }
            _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
        }
    }
}
