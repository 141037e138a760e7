//! Descriptive statistics over the sampled values of every analysed function.
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    /// population standard deviation
    pub std_dev: f64,
    /// trapezoidal area under each function, in input order
    pub areas: Vec<f64>,
    pub total_area: f64,
}

/// Trapezoidal rule over samples on `grid`.
pub fn trapezoid(grid: &[f64], values: &[f64]) -> f64 {
    grid.windows(2)
        .zip(values.windows(2))
        .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1]))
        .sum()
}

/// Aggregates `series` (one y-vector per function, each aligned with `grid`).
/// `None` when there is nothing to aggregate.
pub fn statistics(grid: &[f64], series: &[Vec<f64>]) -> Option<Statistics> {
    let count: usize = series.iter().map(Vec::len).sum();
    if series.is_empty() || count == 0 {
        return None;
    }
    let all = || series.iter().flatten().copied();
    let max = all().fold(f64::NEG_INFINITY, f64::max);
    let min = all().fold(f64::INFINITY, f64::min);
    let mean = all().sum::<f64>() / count as f64;
    let variance = all().map(|y| (y - mean).powi(2)).sum::<f64>() / count as f64;
    let areas: Vec<f64> = series.iter().map(|y| trapezoid(grid, y)).collect();
    let total_area = areas.iter().sum();
    debug!("statistics over {} samples of {} functions", count, series.len());
    Some(Statistics {
        max,
        min,
        mean,
        std_dev: variance.sqrt(),
        areas,
        total_area,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::utils::linspace;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_on_unit_interval() {
        let grid = linspace(0.0, 1.0, 400);
        let stats = statistics(&grid, &[vec![1.0; 400]]).unwrap();
        assert_relative_eq!(stats.mean, 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats.areas[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.total_area, 1.0, epsilon = 1e-12);
        assert_eq!(stats.max, 1.0);
        assert_eq!(stats.min, 1.0);
    }

    #[test]
    fn test_population_std_over_all_functions() {
        let grid = vec![0.0, 1.0];
        let stats = statistics(&grid, &[vec![1.0, 3.0], vec![5.0, 7.0]]).unwrap();
        assert_eq!(stats.max, 7.0);
        assert_eq!(stats.min, 1.0);
        assert_relative_eq!(stats.mean, 4.0);
        // variance (9 + 1 + 1 + 9) / 4
        assert_relative_eq!(stats.std_dev, 5.0_f64.sqrt());
        assert_eq!(stats.areas, vec![2.0, 6.0]);
        assert_relative_eq!(stats.total_area, 8.0);
    }

    #[test]
    fn test_signed_area() {
        let grid = linspace(-1.0, 1.0, 201);
        let y: Vec<f64> = grid.iter().map(|x| x.powi(3)).collect();
        let stats = statistics(&grid, &[y]).unwrap();
        assert_relative_eq!(stats.total_area, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(statistics(&[0.0, 1.0], &[]), None);
        assert_eq!(statistics(&[], &[vec![]]), None);
    }
}
