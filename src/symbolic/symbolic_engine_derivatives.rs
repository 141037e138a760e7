//! # Symbolic Engine Derivatives Module
//!
//! Analytical differentiation of [`Expr`] trees. The critical point finder differentiates
//! a compiled expression once with `diff` and hands the simplified result to the root
//! finder.
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Differentiation Rules**: product rule, quotient rule and chain rule for
//!    every supported function
//! 2. **Two power rules**: `n*u^(n-1)*u'` for exponents free of the variable and the general
//!    `u^v * (v'*ln(u) + v*u'/u)` otherwise

use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified, call `simplify` on it before display or solving.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").simplify(); // 2*x
    /// ```
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
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
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
            // d(u^v) = u^v * (v' ln u + v u'/u)
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
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
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
            Expr::sqrt(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(2.0)),
                    Box::new(Expr::sqrt(expr.clone())),
                )),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // analytical derivative against a central difference at a handful of points
    fn compare_num1D(input: &str, points: &[f64]) {
        let expr = Expr::parse_expression(input).unwrap();
        let f = expr.compile(&["x"]).unwrap();
        let df = expr.diff("x").compile(&["x"]).unwrap();
        let h = 1e-6;
        for &x in points {
            let numeric = (f.eval(&[x + h]).unwrap() - f.eval(&[x - h]).unwrap()) / (2.0 * h);
            let analytic = df.eval(&[x]).unwrap();
            assert_relative_eq!(analytic, numeric, epsilon = 1e-5, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_diff_polynomial() {
        let x = Expr::Var("x".to_string());
        let f = x.clone().pow(Expr::Const(2.0));
        let df = f.diff("x");
        let expected = Expr::Const(2.0) * x.clone().pow(Expr::Const(2.0) - Expr::Const(1.0))
            * Expr::Const(1.0);
        assert_eq!(df, expected);
        compare_num1D("x^3 - 2*x^2 + 5", &[-2.0, 0.3, 1.7]);
    }

    #[test]
    fn test_diff_elementary_functions() {
        compare_num1D("sin(x) + cos(x)", &[0.0, 0.5, 2.0]);
        compare_num1D("tan(x)", &[-0.4, 0.5, 1.0]);
        compare_num1D("exp(2*x) * log(x)", &[0.5, 1.0, 3.0]);
        compare_num1D("sqrt(x^2 + 1)", &[-1.0, 0.5, 4.0]);
        compare_num1D("1/(x^2 + 1)", &[-2.0, 0.0, 0.7]);
    }

    #[test]
    fn test_diff_variable_exponent() {
        compare_num1D("x^x", &[0.5, 1.0, 2.5]);
        compare_num1D("2^x", &[-1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_diff_constant_is_zero() {
        assert!(Expr::Const(3.0).diff("x").is_zero());
        assert!(Expr::parse_expression("pi").unwrap().diff("x").is_zero());
    }
}
