//! Two-tier root finder.
//!
//! The exact tier solves polynomials of degree at most 3 in closed form. Only when it
//! reports the expression as unsupported does the numeric tier run: a sweep over fixed
//! coarse brackets, each bracket with a sign change refined by Brent's method, with bisection
//! as the fallback when Brent runs out of iterations. A sign change across a pole converges
//! as well, so a candidate is kept only if the function is smaller there than at both ends
//! of its bracket. Either way the roots are filtered to the domain, sorted and deduplicated.
use crate::error::EngineResult;
use crate::numerical::grid::Domain;
use crate::numerical::root_finding::{
    RootFindingConfig, RootFindingError, RootFindingResult, ScalarRootFinder,
};
use crate::symbolic::compiler::Expression;
use crate::symbolic::symbolic_solve::{MAX_EXACT_DEGREE, solve_polynomial};
use itertools::Itertools;
use log::{debug, trace};

/// Brackets swept by the numeric tier.
pub const DEFAULT_INTERVALS: [(f64, f64); 6] = [
    (-100.0, -10.0),
    (-10.0, -1.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (1.0, 10.0),
    (10.0, 100.0),
];

/// Roots closer than this are one root.
pub const DEDUP_TOLERANCE: f64 = 1e-10;

/// Roots tagged with the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum RootSet {
    /// closed-form solution of a polynomial
    Exact(Vec<f64>),
    /// numeric sweep, only the brackets that were searched
    Approximate(Vec<f64>),
}

impl RootSet {
    pub fn values(&self) -> &[f64] {
        match self {
            RootSet::Exact(values) | RootSet::Approximate(values) => values,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, RootSet::Exact(_))
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootSearchConfig {
    pub intervals: Vec<(f64, f64)>,
    /// each interval is split into this many equal brackets
    pub subdivisions: usize,
    pub solver: RootFindingConfig,
    pub dedup_tolerance: f64,
    pub max_exact_degree: usize,
}

impl Default for RootSearchConfig {
    fn default() -> Self {
        RootSearchConfig {
            intervals: DEFAULT_INTERVALS.to_vec(),
            subdivisions: 1,
            solver: RootFindingConfig::default(),
            dedup_tolerance: DEDUP_TOLERANCE,
            max_exact_degree: MAX_EXACT_DEGREE,
        }
    }
}

/// Sorts ascending and merges neighbours closer than `tolerance`.
pub fn sort_and_dedup(mut roots: Vec<f64>, tolerance: f64) -> Vec<f64> {
    roots.retain(|r| r.is_finite());
    roots.sort_by(|a, b| a.total_cmp(b));
    roots
        .into_iter()
        .coalesce(|a, b| if (b - a).abs() <= tolerance { Ok(a) } else { Err((a, b)) })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct RootFinder {
    config: RootSearchConfig,
}

impl RootFinder {
    pub fn new(config: RootSearchConfig) -> Self {
        RootFinder { config }
    }

    pub fn config(&self) -> &RootSearchConfig {
        &self.config
    }

    /// Roots of `expression` inside `domain`. Empty when there are none.
    pub fn find_roots(&self, expression: &Expression, domain: &Domain) -> RootSet {
        let inside = |roots: Vec<f64>| -> Vec<f64> {
            let roots = roots.into_iter().filter(|r| domain.contains(*r)).collect();
            sort_and_dedup(roots, self.config.dedup_tolerance)
        };
        match self.exact_roots(expression) {
            Some(roots) => {
                let roots = inside(roots);
                debug!("exact roots of '{}': {:?}", expression.text(), roots);
                RootSet::Exact(roots)
            }
            None => {
                let roots = inside(self.sweep(expression));
                debug!("approximate roots of '{}': {:?}", expression.text(), roots);
                RootSet::Approximate(roots)
            }
        }
    }

    /// Closed-form tier, `None` when the expression is not a low-degree polynomial.
    pub fn exact_roots(&self, expression: &Expression) -> Option<Vec<f64>> {
        solve_polynomial(
            expression.expr(),
            expression.variable(),
            self.config.max_exact_degree,
        )
    }

    /// Numeric tier over every bracket of the configured intervals.
    pub fn sweep(&self, expression: &Expression) -> Vec<f64> {
        let solver = ScalarRootFinder::with_config(self.config.solver.clone());
        let parts = self.config.subdivisions.max(1);
        let mut roots = Vec::new();
        for &(start, end) in &self.config.intervals {
            let width = (end - start) / parts as f64;
            for k in 0..parts {
                let a = start + width * k as f64;
                let b = if k + 1 == parts { end } else { a + width };
                let refined = match solver.brent(expression, a, b) {
                    Err(RootFindingError::MaxIterationsReached) => self.bisect(expression, a, b),
                    other => other,
                };
                match refined {
                    Ok(result) if vanishes(expression, &result, a, b) => roots.push(result.root),
                    Ok(result) => debug!(
                        "sign change of '{}' at x = {} rejected, value {} ({})",
                        expression.text(),
                        result.root,
                        result.function_value,
                        result.method
                    ),
                    Err(RootFindingError::InvalidInterval) => {}
                    Err(e) => trace!("bracket [{}, {}] of '{}' skipped: {}", a, b, expression.text(), e),
                }
            }
        }
        roots
    }

    // The number of halvings is known in advance, so the budget always covers the bracket.
    fn bisect(&self, expression: &Expression, a: f64, b: f64) -> Result<RootFindingResult, RootFindingError> {
        let tolerance = self.config.solver.tolerance.max(f64::EPSILON);
        let halvings = ((b - a).abs() / tolerance).log2().ceil().max(0.0) as usize + 1;
        trace!("brent gave up on [{}, {}] of '{}', bisecting", a, b, expression.text());
        ScalarRootFinder::with_config(RootFindingConfig {
            tolerance,
            max_iterations: halvings.max(self.config.solver.max_iterations),
        })
        .bisection(expression, a, b)
    }
}

// A zero is smaller in magnitude than the bracket ends, a pole is larger.
fn vanishes(expression: &Expression, result: &RootFindingResult, a: f64, b: f64) -> bool {
    let residual = result.function_value.abs();
    if residual == 0.0 {
        return true;
    }
    match (expression.eval(a), expression.eval(b)) {
        (Ok(fa), Ok(fb)) => residual < fa.abs().min(fb.abs()),
        _ => false,
    }
}

/// Compiles `text` and finds its roots with the default search settings.
pub fn find_roots(text: &str, domain: &Domain) -> EngineResult<RootSet> {
    let expression = Expression::compile(text)?;
    Ok(RootFinder::default().find_roots(&expression, domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn domain() -> Domain {
        Domain::new(-10.0, 10.0).unwrap()
    }

    #[test]
    fn test_quadratic_roots_are_exact() {
        let roots = find_roots("x^2 - 4", &domain()).unwrap();
        assert!(roots.is_exact());
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots.values()[0], -2.0, epsilon = 1e-6);
        assert_relative_eq!(roots.values()[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cubic_roots_never_exceed_three() {
        let roots = find_roots("(x + 2)*(x - 2)*(x - 5)", &domain()).unwrap();
        assert!(roots.is_exact());
        assert_eq!(roots.len(), 3);
        for (actual, expected) in roots.values().iter().zip([-2.0, 2.0, 5.0]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_numeric_tier_for_quartic() {
        let roots = find_roots("(x - 0.5)*(x + 3)*(x - 5)*(x + 50)", &domain()).unwrap();
        assert!(!roots.is_exact());
        // -50 is found in [-100, -10] and dropped by the domain
        assert_eq!(roots.len(), 3);
        for (actual, expected) in roots.values().iter().zip([-3.0, 0.5, 5.0]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_numeric_tier_dedups_shared_bracket_ends() {
        // +-1 are ends of two brackets each
        let roots = find_roots("x^4 - 1", &domain()).unwrap();
        assert_eq!(roots, RootSet::Approximate(vec![-1.0, 1.0]));
    }

    #[test]
    fn test_numeric_tier_finds_transcendental_roots() {
        let roots = find_roots("sin(x)", &domain()).unwrap();
        assert!(!roots.is_exact());
        // one root per bracket with a sign change: [-10, -1], [-1, 0] and [0, 1] share 0, [1, 10]
        assert_eq!(roots.len(), 3);
        assert!(roots.values().iter().any(|r| r.abs() < 1e-12));
        for r in roots.values() {
            let turns = r / PI;
            assert_relative_eq!(turns, turns.round(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_subdivisions_find_more_roots() {
        let expression = Expression::compile("sin(x)").unwrap();
        let domain = Domain::new(-10.0, 10.0).unwrap();
        let coarse = RootFinder::default().find_roots(&expression, &domain);
        let fine = RootFinder::new(RootSearchConfig {
            subdivisions: 20,
            ..RootSearchConfig::default()
        })
        .find_roots(&expression, &domain);
        assert!(fine.len() > coarse.len());
        // -3pi..3pi
        assert_eq!(fine.len(), 7);
    }

    #[test]
    fn test_roots_outside_domain_are_dropped() {
        let roots = find_roots("x - 20", &domain()).unwrap();
        assert_eq!(roots, RootSet::Exact(vec![]));
        let roots = find_roots("exp(x) - exp(20)", &Domain::new(0.0, 10.0).unwrap()).unwrap();
        assert_eq!(roots, RootSet::Approximate(vec![]));
    }

    #[test]
    fn test_no_roots_is_not_an_error() {
        assert!(find_roots("x^2 + 1", &domain()).unwrap().is_empty());
        assert!(find_roots("exp(x)", &domain()).unwrap().is_empty());
        assert_eq!(find_roots("3", &domain()).unwrap(), RootSet::Exact(vec![]));
    }

    #[test]
    fn test_unevaluable_brackets_are_skipped() {
        let roots = find_roots("log(x)", &domain()).unwrap();
        assert_eq!(roots.len(), 1);
        assert_relative_eq!(roots.values()[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_compile_error_propagates() {
        assert!(matches!(
            find_roots("foo(x)", &domain()),
            Err(EngineError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_numeric_roots_zero_the_function() {
        for text in [
            "sin(x)",
            "x^5 - 3*x + 1",
            "(x - 0.5)*(x + 3)*(x - 5)*(x + 50)",
            "exp(x) - 2",
            "x*exp(-x^2) - 0.1",
        ] {
            let expression = Expression::compile(text).unwrap();
            let roots = RootFinder::default().find_roots(&expression, &domain());
            assert!(!roots.is_exact(), "{}", text);
            assert!(!roots.is_empty(), "{}", text);
            for &r in roots.values() {
                let residual = expression.eval(r).unwrap().abs();
                assert!(residual < 1e-6, "{} at {}: {}", text, r, residual);
            }
        }
        let roots = find_roots("x^5 - 3*x + 1", &domain()).unwrap();
        assert_eq!(roots.len(), 3);
    }

    #[test]
    fn test_sign_change_across_pole_is_not_a_root() {
        // poles at +-3, the only zero is 0
        let roots = find_roots("x/(x^2 - 9)^3 + 0", &domain()).unwrap();
        assert_eq!(roots.len(), 1);
        assert!(roots.values()[0].abs() < 1e-12);
        assert_eq!(find_roots("1/(x - 2)", &domain()).unwrap(), RootSet::Approximate(vec![]));
        let fine = RootFinder::new(RootSearchConfig {
            subdivisions: 20,
            ..RootSearchConfig::default()
        });
        let expression = Expression::compile("1/(x - 2.1) + 0").unwrap();
        assert!(fine.find_roots(&expression, &domain()).is_empty());
    }

    #[test]
    fn test_numeric_tier_never_exceeds_true_roots() {
        // degree 5 goes to the sweep, the real roots are -2, 2 and 5
        let text = "(x + 2)*(x - 2)*(x - 5)*(x^2 + 1)";
        let coarse = find_roots(text, &domain()).unwrap();
        assert!(!coarse.is_exact());
        assert!(coarse.len() <= 3);
        for r in coarse.values() {
            assert!([-2.0, 2.0, 5.0].iter().any(|e| (r - e).abs() < 1e-9), "{}", r);
        }

        let expression = Expression::compile(text).unwrap();
        let fine = RootFinder::new(RootSearchConfig {
            subdivisions: 20,
            ..RootSearchConfig::default()
        })
        .find_roots(&expression, &domain());
        assert_eq!(fine.len(), 3);
        for (actual, expected) in fine.values().iter().zip([-2.0, 2.0, 5.0]) {
            assert_relative_eq!(*actual, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bisection_takes_over_when_brent_runs_out() {
        let expression = Expression::compile("sin(x)").unwrap();
        let impatient = RootFinder::new(RootSearchConfig {
            solver: RootFindingConfig {
                tolerance: 2e-12,
                max_iterations: 2,
            },
            ..RootSearchConfig::default()
        });
        let roots = impatient.find_roots(&expression, &domain());
        assert_eq!(roots.len(), 3);
        for r in roots.values() {
            let turns = r / PI;
            assert_relative_eq!(turns, turns.round(), epsilon = 1e-9);
            assert!(expression.eval(*r).unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn test_sort_and_dedup() {
        let roots = sort_and_dedup(vec![2.0, -2.0, 2.0 + 1e-11, 5.0, -2.0 - 5e-11], 1e-10);
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[2], 5.0);
        assert_eq!(sort_and_dedup(vec![], 1e-10), Vec::<f64>::new());
    }
}
