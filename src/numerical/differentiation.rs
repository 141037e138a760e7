//! Numerical derivative series on a uniform grid.
//!
//! The gradient operator uses central differences in the interior and first-order
//! one-sided differences at both ends. Higher orders are obtained by applying the same
//! operator again to its own output, so the error of an order-k series compounds near the
//! ends of the grid. This chained scheme is kept on purpose, it is what the plotted
//! derivative has always shown.
use crate::error::{EngineError, EngineResult};
use crate::numerical::grid::DerivativeOrder;
use crate::symbolic::compiler::Expression;
use log::debug;

/// One pass of the gradient operator over equally spaced samples.
///
/// # Examples
/// ```
/// use deriva_engine::numerical::differentiation::gradient;
/// let g = gradient(&[0.0, 1.0, 4.0, 9.0], 1.0);
/// assert_eq!(g, vec![1.0, 2.0, 4.0, 5.0]);
/// ```
pub fn gradient(values: &[f64], spacing: f64) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut result = Vec::with_capacity(n);
    result.push((values[1] - values[0]) / spacing);
    for i in 1..n - 1 {
        result.push((values[i + 1] - values[i - 1]) / (2.0 * spacing));
    }
    result.push((values[n - 1] - values[n - 2]) / spacing);
    result
}

/// Applies [`gradient`] `order` times, each pass consuming the previous one.
pub fn derivative_of_samples(values: &[f64], spacing: f64, order: DerivativeOrder) -> Vec<f64> {
    let mut current = values.to_vec();
    for _ in 0..order.get() {
        current = gradient(&current, spacing);
    }
    current
}

/// Derivative series of `expression` on `grid`, evaluating the function once per point.
pub fn derivative(
    expression: &Expression,
    grid: &[f64],
    order: DerivativeOrder,
) -> EngineResult<Vec<f64>> {
    if grid.len() < 2 {
        return Err(EngineError::DomainError {
            x_min: grid.first().copied().unwrap_or(f64::NAN),
            x_max: grid.last().copied().unwrap_or(f64::NAN),
            reason: "at least 2 samples are required".to_string(),
        });
    }
    let values = expression.eval_vec(grid)?;
    let spacing = grid[1] - grid[0];
    debug!(
        "order {} derivative of '{}' on {} points",
        order.get(),
        expression.text(),
        grid.len()
    );
    Ok(derivative_of_samples(&values, spacing, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::grid::Domain;
    use approx::assert_relative_eq;

    fn order(k: i64) -> DerivativeOrder {
        DerivativeOrder::new(k).unwrap()
    }

    #[test]
    fn test_square_derivative_is_2x_away_from_ends() {
        let domain = Domain::new(-10.0, 10.0).unwrap();
        let grid = domain.grid();
        let expression = Expression::compile("x^2").unwrap();
        let dy = derivative(&expression, &grid, order(1)).unwrap();
        assert_eq!(dy.len(), grid.len());
        for i in 1..grid.len() - 1 {
            assert_relative_eq!(dy[i], 2.0 * grid[i], epsilon = 1e-9);
        }
        // one-sided ends are off by one spacing
        let h = grid[1] - grid[0];
        assert_relative_eq!(dy[0], 2.0 * grid[0] + h, epsilon = 1e-9);
        assert_relative_eq!(dy[399], 2.0 * grid[399] - h, epsilon = 1e-9);
    }

    #[test]
    fn test_constant_derivative_is_zero() {
        let grid = Domain::new(0.0, 1.0).unwrap().grid();
        let expression = Expression::compile("3.5").unwrap();
        for k in 1..=3 {
            let dy = derivative(&expression, &grid, order(k)).unwrap();
            assert!(dy.iter().all(|v| v.abs() < 1e-12));
        }
    }

    #[test]
    fn test_chained_second_derivative_of_cube() {
        let grid = Domain::with_samples(-2.0, 2.0, 41).unwrap().grid();
        let h = grid[1] - grid[0];
        let expression = Expression::compile("x^3").unwrap();
        let d2 = derivative(&expression, &grid, order(2)).unwrap();
        let n = grid.len();
        for i in 2..n - 2 {
            assert_relative_eq!(d2[i], 6.0 * grid[i], epsilon = 1e-9);
        }
        // second point mixes the one-sided first pass into the central second pass
        let x1 = grid[1];
        assert_relative_eq!(d2[1], 6.0 * x1 - 1.5 * (x1 - h), epsilon = 1e-9);
        assert!((d2[0] - 6.0 * grid[0]).abs() > 0.1);
    }

    #[test]
    fn test_gradient_of_two_samples() {
        assert_eq!(gradient(&[1.0, 3.0], 0.5), vec![4.0, 4.0]);
    }

    #[test]
    fn test_evaluation_failure_names_x() {
        let grid = Domain::with_samples(-1.0, 1.0, 3).unwrap().grid();
        let expression = Expression::compile("1/x").unwrap();
        assert!(matches!(
            derivative(&expression, &grid, order(1)),
            Err(EngineError::NumericEvaluationError { x, .. }) if x == 0.0
        ));
    }
}
