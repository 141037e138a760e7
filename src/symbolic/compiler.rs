//! # Expression Compiler
//!
//! Turns user text into an [`Expression`]: parsed tree, checked evaluator and the original
//! text, built only if the function evaluates at a representative point. A function that
//! cannot be evaluated there is rejected at compile time instead of producing an empty
//! plot later.
use crate::error::{EngineError, EngineResult, NumericFault};
use crate::symbolic::parse_expr::parse_expression_func;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::Lambda;
use log::debug;

/// Point at which every freshly compiled function is test-evaluated.
pub const REPRESENTATIVE_POINT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilerConfig {
    /// name of the free variable
    pub variable: String,
    pub test_point: f64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            variable: "x".to_string(),
            test_point: REPRESENTATIVE_POINT,
        }
    }
}

/// Immutable compiled function of one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    text: String,
    expr: Expr,
    lambda: Lambda,
    variable: String,
}

impl Expression {
    /// Compiles a function of `x` checked at `0.5`.
    pub fn compile(text: &str) -> EngineResult<Expression> {
        Self::compile_with(text, &CompilerConfig::default())
    }

    pub fn compile_with(text: &str, config: &CompilerConfig) -> EngineResult<Expression> {
        let expr = parse_expression_func(text, &config.variable)?;
        let expression = Self::from_expr(text.trim().to_string(), expr, &config.variable)?;
        expression
            .eval(config.test_point)
            .map_err(|fault| EngineError::NotEvaluable {
                expression: expression.text.clone(),
                x: config.test_point,
                fault,
            })?;
        debug!("compiled '{}' as {}", expression.text, expression.expr);
        Ok(expression)
    }

    /// Wraps an already built tree, used for derivatives that are not typed by the user.
    /// No representative-point test is made.
    pub fn from_expr(text: String, expr: Expr, variable: &str) -> EngineResult<Expression> {
        let lambda = expr.compile(&[variable])?;
        Ok(Expression {
            text,
            expr,
            lambda,
            variable: variable.to_string(),
        })
    }

    /// Symbolic derivative, simplified.
    pub fn derivative(&self) -> EngineResult<Expression> {
        let derivative = self.expr.diff(&self.variable).simplify();
        Self::from_expr(derivative.to_string(), derivative, &self.variable)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    #[inline]
    pub fn eval(&self, x: f64) -> Result<f64, NumericFault> {
        self.lambda.eval(&[x])
    }

    /// Evaluates over a slice, failing at the first point that faults.
    pub fn eval_vec(&self, xs: &[f64]) -> EngineResult<Vec<f64>> {
        xs.iter()
            .map(|&x| {
                self.eval(x)
                    .map_err(|fault| EngineError::NumericEvaluationError {
                        expression: self.text.clone(),
                        x,
                        fault,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compile_accepts_vocabulary() {
        let expression = Expression::compile("sin(x) + 0.5*x**4").unwrap();
        assert_eq!(expression.text(), "sin(x) + 0.5*x**4");
        assert_relative_eq!(
            expression.eval(2.0).unwrap(),
            2.0_f64.sin() + 8.0,
            epsilon = 1e-12
        );
        for text in ["x^2 - 4", "exp(-x)*cos(pi*x)", "log(x) + sqrt(x)", "tan(x)/e", "-x^2", "3"] {
            assert!(Expression::compile(text).is_ok(), "{}", text);
        }
    }

    #[test]
    fn test_compile_rejects_not_evaluable() {
        assert!(matches!(
            Expression::compile("sqrt(-1)"),
            Err(EngineError::NotEvaluable { fault: NumericFault::SqrtOfNegative(_), .. })
        ));
        assert!(matches!(
            Expression::compile("log(x - 1)"),
            Err(EngineError::NotEvaluable { x, .. }) if x == 0.5
        ));
        assert!(matches!(
            Expression::compile("1/(x - 0.5)"),
            Err(EngineError::NotEvaluable { fault: NumericFault::DivisionByZero, .. })
        ));
        assert!(matches!(
            Expression::compile("1e999"),
            Err(EngineError::NotEvaluable { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_unknown_symbol() {
        assert!(matches!(
            Expression::compile("foo(x)"),
            Err(EngineError::UnknownSymbol { symbol }) if symbol == "foo"
        ));
        assert!(matches!(
            Expression::compile("__import__"),
            Err(EngineError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_deeply_nested_input() {
        let deep = format!("{}x{}", "(".repeat(20000), ")".repeat(20000));
        assert!(matches!(
            Expression::compile(&deep),
            Err(EngineError::ParseError { .. })
        ));
    }

    #[test]
    fn test_eval_vec_reports_offending_x() {
        let expression = Expression::compile("1/x").unwrap();
        assert!(matches!(
            expression.eval_vec(&[-1.0, 0.0, 1.0]),
            Err(EngineError::NumericEvaluationError { x, .. }) if x == 0.0
        ));
        assert_eq!(expression.eval_vec(&[1.0, 2.0]).unwrap(), vec![1.0, 0.5]);
    }

    #[test]
    fn test_custom_test_point_and_variable() {
        let config = CompilerConfig {
            variable: "t".to_string(),
            test_point: 2.0,
        };
        assert!(Expression::compile_with("log(t - 1)", &config).is_ok());
        assert!(Expression::compile_with("log(x - 1)", &config).is_err());
    }

    #[test]
    fn test_derivative_expression() {
        let expression = Expression::compile("x^2").unwrap();
        let derivative = expression.derivative().unwrap();
        assert_relative_eq!(derivative.eval(3.0).unwrap(), 6.0);
    }

    #[test]
    fn test_expression_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Expression>();
    }
}
