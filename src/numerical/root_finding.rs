//! Bracketed scalar root refinement: bisection and Brent's method.
//!
//! Both methods need a sign change on `[a, b]`. They stop at the first evaluation fault
//! instead of iterating over garbage values.
use crate::error::NumericFault;
use crate::symbolic::compiler::Expression;
use log::trace;
use std::fmt;

/// Enum to represent the root finding methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootFindingMethod {
    Bisection,
    Brent,
}

impl fmt::Display for RootFindingMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RootFindingMethod::Bisection => write!(f, "bisection"),
            RootFindingMethod::Brent => write!(f, "brent"),
        }
    }
}

/// Error types for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub enum RootFindingError {
    MaxIterationsReached,
    InvalidInterval,
    Evaluation { x: f64, fault: NumericFault },
}

impl fmt::Display for RootFindingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RootFindingError::MaxIterationsReached => write!(f, "Maximum iterations reached"),
            RootFindingError::InvalidInterval => {
                write!(f, "Function does not change sign on the interval")
            }
            RootFindingError::Evaluation { x, fault } => {
                write!(f, "Evaluation failed at x = {}: {}", x, fault)
            }
        }
    }
}
//////////////////////////////////TRAITS AND IMPLEMENTATIONS/////////////////////////////////
impl std::error::Error for RootFindingError {}

/// Trait for representing an equation f(x) = 0 whose evaluation may fail
pub trait ScalarFunction {
    /// Evaluate the function at point x
    fn evaluate(&self, x: f64) -> Result<f64, NumericFault>;

    /// Get function name for debugging/logging
    fn name(&self) -> &str {
        "unnamed_function"
    }
}

impl ScalarFunction for Expression {
    fn evaluate(&self, x: f64) -> Result<f64, NumericFault> {
        self.eval(x)
    }

    fn name(&self) -> &str {
        self.text()
    }
}

/// Simple function wrapper for closures
pub struct ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    func: F,
    name: String,
}

impl<F> ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(func: F, name: String) -> Self {
        Self { func, name }
    }
}

impl<F> ScalarFunction for ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> Result<f64, NumericFault> {
        let value = (self.func)(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(NumericFault::NonFinite("closure"))
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Result structure for root finding methods
#[derive(Debug, Clone)]
pub struct RootFindingResult {
    pub root: f64,
    pub function_value: f64,
    pub iterations: usize,
    pub method: RootFindingMethod,
}

/// Configuration for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub struct RootFindingConfig {
    /// absolute x tolerance
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RootFindingConfig {
    fn default() -> Self {
        Self {
            tolerance: 2e-12,
            max_iterations: 100,
        }
    }
}

/// Main structure for scalar root finding methods
#[derive(Debug, Clone, Default)]
pub struct ScalarRootFinder {
    config: RootFindingConfig,
}

/// Strictly positive or strictly negative on both ends. Signs are compared directly,
/// a product of two tiny values underflows to zero.
pub(crate) fn same_sign(fa: f64, fb: f64) -> bool {
    fa != 0.0 && fb != 0.0 && fa.is_sign_negative() == fb.is_sign_negative()
}

fn evaluate_at<F: ScalarFunction + ?Sized>(function: &F, x: f64) -> Result<f64, RootFindingError> {
    function
        .evaluate(x)
        .map_err(|fault| RootFindingError::Evaluation { x, fault })
}

impl ScalarRootFinder {
    /// Create a new ScalarRootFinder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ScalarRootFinder with custom configuration
    pub fn with_config(config: RootFindingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RootFindingConfig {
        &self.config
    }

    /////////////////////////////////////////METHODS///////////////////////////////////////////

    /// Bisection method for finding roots
    /// Requires that f(a) and f(b) have opposite signs
    pub fn bisection<F>(
        &self,
        function: &F,
        mut a: f64,
        mut b: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: ScalarFunction + ?Sized,
    {
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }

        let mut fa = evaluate_at(function, a)?;
        let fb = evaluate_at(function, b)?;

        // Check if the function values have opposite signs
        if same_sign(fa, fb) {
            return Err(RootFindingError::InvalidInterval);
        }

        // Check if we already have a root at the endpoints
        if fa == 0.0 {
            return Ok(self.result(a, fa, 0, RootFindingMethod::Bisection));
        }
        if fb == 0.0 {
            return Ok(self.result(b, fb, 0, RootFindingMethod::Bisection));
        }

        trace!(
            "bisection for {} on [{}, {}]",
            function.name(),
            a,
            b
        );

        for iterations in 0..self.config.max_iterations {
            let c = (a + b) / 2.0;
            let fc = evaluate_at(function, c)?;

            // Check for convergence
            if fc == 0.0 || (b - a) / 2.0 < self.config.tolerance {
                return Ok(self.result(c, fc, iterations + 1, RootFindingMethod::Bisection));
            }

            // Update interval
            if !same_sign(fa, fc) {
                b = c;
            } else {
                a = c;
                fa = fc;
            }
        }

        Err(RootFindingError::MaxIterationsReached)
    }

    /// Brent's method: inverse quadratic interpolation and secant steps, falling back to
    /// bisection whenever the interpolated step leaves the bracket or converges too slowly.
    /// Requires that f(a) and f(b) have opposite signs
    pub fn brent<F>(
        &self,
        function: &F,
        mut a: f64,
        mut b: f64,
    ) -> Result<RootFindingResult, RootFindingError>
    where
        F: ScalarFunction + ?Sized,
    {
        let mut fa = evaluate_at(function, a)?;
        let mut fb = evaluate_at(function, b)?;

        if same_sign(fa, fb) {
            return Err(RootFindingError::InvalidInterval);
        }
        if fa == 0.0 {
            return Ok(self.result(a, fa, 0, RootFindingMethod::Brent));
        }
        if fb == 0.0 {
            return Ok(self.result(b, fb, 0, RootFindingMethod::Brent));
        }

        trace!("brent for {} on [{}, {}]", function.name(), a, b);

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for iterations in 0..self.config.max_iterations {
            // c is always the contrapoint of b
            if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            // b is the best estimate so far
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.config.tolerance;
            let xm = 0.5 * (c - b);
            if xm.abs() <= tol || fb == 0.0 {
                return Ok(self.result(b, fb, iterations, RootFindingMethod::Brent));
            }

            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // secant
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    // inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                if p > 0.0 {
                    q = -q;
                }
                p = p.abs();
                let min1 = 3.0 * xm * q - (tol * q).abs();
                let min2 = (e * q).abs();
                if 2.0 * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }

            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(xm) };
            fb = evaluate_at(function, b)?;
        }

        Err(RootFindingError::MaxIterationsReached)
    }

    fn result(
        &self,
        root: f64,
        function_value: f64,
        iterations: usize,
        method: RootFindingMethod,
    ) -> RootFindingResult {
        RootFindingResult {
            root,
            function_value,
            iterations,
            method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_bisection_simple_quadratic() {
        let solver = ScalarRootFinder::new();
        let func = ClosureFunction::new(|x| x * x - 4.0, "x^2 - 4".to_string());

        // Test positive root
        let result = solver.bisection(&func, 0.0, 3.0).unwrap();
        assert_relative_eq!(result.root, 2.0, epsilon = 1e-10);
        assert_eq!(result.method, RootFindingMethod::Bisection);

        // Test negative root
        let result = solver.bisection(&func, -3.0, 0.0).unwrap();
        assert_relative_eq!(result.root, -2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_bisection_invalid_interval() {
        let solver = ScalarRootFinder::new();
        let func = ClosureFunction::new(|x| x * x + 1.0, "x^2 + 1".to_string());

        // This function has no real roots, so bisection should fail
        let result = solver.bisection(&func, -1.0, 1.0);
        assert!(matches!(result, Err(RootFindingError::InvalidInterval)));
    }

    #[test]
    fn test_root_at_endpoint() {
        let solver = ScalarRootFinder::new();
        let func = ClosureFunction::new(|x| x - 2.0, "x - 2".to_string());
        let result = solver.bisection(&func, 2.0, 3.0).unwrap();
        assert_eq!(result.root, 2.0);
        assert_eq!(result.iterations, 0);
        let result = solver.brent(&func, 0.0, 2.0).unwrap();
        assert_eq!(result.root, 2.0);
    }

    #[test]
    fn test_brent_cubic() {
        let solver = ScalarRootFinder::new();
        // f(x) = x^3 - x - 1, root approximately at x = 1.324717957
        let func = ClosureFunction::new(|x| x * x * x - x - 1.0, "x^3 - x - 1".to_string());
        let result = solver.brent(&func, 1.0, 2.0).unwrap();
        assert_relative_eq!(result.root, 1.324717957244746, epsilon = 1e-11);
        assert_eq!(result.method, RootFindingMethod::Brent);
    }

    #[test]
    fn test_brent_is_faster_than_bisection() {
        let solver = ScalarRootFinder::new();
        let func = ClosureFunction::new(|x| x.sin(), "sin(x)".to_string());
        let brent = solver.brent(&func, 3.0, 4.0).unwrap();
        let bisection = solver.bisection(&func, 3.0, 4.0).unwrap();
        assert_relative_eq!(brent.root, PI, epsilon = 1e-11);
        assert_relative_eq!(bisection.root, PI, epsilon = 1e-11);
        assert!(brent.iterations < bisection.iterations);
    }

    #[test]
    fn test_brent_on_expression() {
        let solver = ScalarRootFinder::new();
        let expression = Expression::compile("exp(x) - 2").unwrap();
        let result = solver.brent(&expression, 0.0, 1.0).unwrap();
        assert_relative_eq!(result.root, 2.0_f64.ln(), epsilon = 1e-11);
    }

    #[test]
    fn test_evaluation_fault_is_reported() {
        let solver = ScalarRootFinder::new();
        let expression = Expression::compile("log(x)").unwrap();
        assert!(matches!(
            solver.brent(&expression, -1.0, 2.0),
            Err(RootFindingError::Evaluation { x, .. }) if x == -1.0
        ));
    }

    #[test]
    fn test_max_iterations() {
        let solver = ScalarRootFinder::with_config(RootFindingConfig {
            tolerance: 1e-15,
            max_iterations: 3,
        });
        let func = ClosureFunction::new(|x| x - 0.123456789, "x - c".to_string());
        assert!(matches!(
            solver.bisection(&func, 0.0, 1.0),
            Err(RootFindingError::MaxIterationsReached)
        ));
    }

    #[test]
    fn test_tiny_values_of_equal_sign_are_not_a_bracket() {
        let solver = ScalarRootFinder::new();
        // f(a) * f(b) underflows to 0 here
        let func = ClosureFunction::new(|x| 1e-200 * (x * x + 1.0), "tiny".to_string());
        assert!(matches!(
            solver.brent(&func, -1.0, 1.0),
            Err(RootFindingError::InvalidInterval)
        ));
        assert!(matches!(
            solver.bisection(&func, -1.0, 1.0),
            Err(RootFindingError::InvalidInterval)
        ));
        // a genuine bracket of tiny values is still refined
        let func = ClosureFunction::new(|x| 1e-200 * (x - 0.25), "tiny linear".to_string());
        let result = solver.brent(&func, -1.0, 1.0).unwrap();
        assert_relative_eq!(result.root, 0.25, epsilon = 1e-11);
    }

    #[test]
    fn test_same_sign() {
        assert!(same_sign(1.0, 2.0));
        assert!(same_sign(-1e-200, -1e-200));
        assert!(!same_sign(-1.0, 2.0));
        assert!(!same_sign(0.0, 2.0));
    }
}
