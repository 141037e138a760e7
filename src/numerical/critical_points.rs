//! Critical points: roots of the symbolic first derivative, found with the same two-tier
//! strategy as ordinary roots.
use crate::error::EngineResult;
use crate::numerical::grid::Domain;
use crate::numerical::roots::{RootFinder, RootSearchConfig};
use crate::symbolic::compiler::Expression;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPoint {
    pub x: f64,
    pub y: f64,
    /// close to zero, kept for display
    pub derivative_value: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CriticalPointFinder {
    root_finder: RootFinder,
}

impl CriticalPointFinder {
    pub fn new(config: RootSearchConfig) -> Self {
        CriticalPointFinder {
            root_finder: RootFinder::new(config),
        }
    }

    /// Points of `expression` in `domain` where the derivative vanishes, ascending by x.
    /// Candidates at which either the function or its derivative cannot be evaluated are
    /// dropped.
    pub fn find(&self, expression: &Expression, domain: &Domain) -> Vec<CriticalPoint> {
        let derivative = match expression.derivative() {
            Ok(derivative) => derivative,
            Err(e) => {
                warn!("no derivative for '{}': {}", expression.text(), e);
                return Vec::new();
            }
        };
        debug!("d/d{} {} = {}", expression.variable(), expression.text(), derivative.text());
        let candidates = self.root_finder.find_roots(&derivative, domain);
        candidates
            .values()
            .iter()
            .filter_map(|&x| {
                let point = expression
                    .eval(x)
                    .and_then(|y| derivative.eval(x).map(|d| (y, d)));
                match point {
                    Ok((y, derivative_value)) => Some(CriticalPoint { x, y, derivative_value }),
                    Err(fault) => {
                        warn!("critical point of '{}' at x = {} skipped: {}", expression.text(), x, fault);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Compiles `text` and returns its critical points inside `domain`.
pub fn find_critical_points(text: &str, domain: &Domain) -> EngineResult<Vec<CriticalPoint>> {
    let expression = Expression::compile(text)?;
    Ok(CriticalPointFinder::default().find(&expression, domain))
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
    fn test_parabola_vertex() {
        let points = find_critical_points("x^2", &domain()).unwrap();
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(points[0].y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(points[0].derivative_value, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_extrema() {
        // f' = 3x^2 - 3
        let points = find_critical_points("x^3 - 3*x", &domain()).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(points[0].y, 2.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].y, -2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_transcendental_derivative_uses_sweep() {
        let points = find_critical_points("sin(x)", &domain()).unwrap();
        // cos changes sign in [-10, -1] and [1, 10], one extremum refined in each
        assert_eq!(points.len(), 2);
        for point in &points {
            assert_relative_eq!(point.y.abs(), 1.0, epsilon = 1e-12);
            assert!(point.derivative_value.abs() < 1e-9);
            let quarter_turns = point.x / (PI / 2.0);
            assert_relative_eq!(quarter_turns, quarter_turns.round(), epsilon = 1e-9);
        }
        assert!(points[0].x < 0.0 && points[1].x > 0.0);
    }

    #[test]
    fn test_linear_and_constant_have_none() {
        assert!(find_critical_points("2*x + 1", &domain()).unwrap().is_empty());
        assert!(find_critical_points("7", &domain()).unwrap().is_empty());
    }

    #[test]
    fn test_points_outside_domain_are_dropped() {
        let points = find_critical_points("(x - 20)^2", &domain()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_pole_of_derivative_is_not_a_critical_point() {
        // f' = -2/(x - 2)^3 changes sign only across the pole
        assert!(find_critical_points("1/(x - 2)^2", &domain()).unwrap().is_empty());

        let points = find_critical_points("x/(x^2 + 1)", &domain()).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(points[0].y, -0.5, epsilon = 1e-9);
        assert_relative_eq!(points[1].x, 1.0, epsilon = 1e-9);
        for point in &points {
            assert!(point.derivative_value.abs() < 1e-9);
        }
    }

    #[test]
    fn test_compile_error_propagates() {
        assert!(matches!(
            find_critical_points("sqrt(-1)", &domain()),
            Err(EngineError::NotEvaluable { .. })
        ));
    }
}
