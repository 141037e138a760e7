//! Running integral of a compiled expression over a grid.
//!
//! Element `i` of the series approximates the definite integral from the first grid point
//! to `grid[i]`. Every element is an independent adaptive Gauss-Legendre quadrature, so the
//! points are integrated in parallel with rayon. A point whose quadrature fails is left as
//! a gap (`None`) and recorded in `failures`, the rest of the series is unaffected.
//!
//! # Examples
//! ```
//! use deriva_engine::numerical::integration::{integral, QuadratureConfig};
//! use deriva_engine::symbolic::compiler::Expression;
//! let expression = Expression::compile("2*x").unwrap();
//! let running = integral(&expression, &[0.0, 1.0, 2.0], &QuadratureConfig::default());
//! assert!((running.values[2].unwrap() - 4.0).abs() < 1e-10);
//! ```
use crate::error::NumericFault;
use crate::symbolic::compiler::Expression;
use gauss_quad::GaussLegendre;
use log::{debug, warn};
use rayon::prelude::*;
use std::cell::Cell;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureConfig {
    /// number of Gauss-Legendre nodes per panel
    pub degree: usize,
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// how many times a panel may be split in two
    pub max_subdivisions: usize,
    pub parallel: bool,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        QuadratureConfig {
            degree: 10,
            abs_tol: 1.49e-8,
            rel_tol: 1.49e-8,
            max_subdivisions: 50,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadratureError {
    #[error("integrand failed at x = {x}: {fault}")]
    Evaluation { x: f64, fault: NumericFault },

    #[error("quadrature did not converge: estimate {estimate}, error estimate {error_estimate}")]
    NotConverged { estimate: f64, error_estimate: f64 },

    #[error("cannot build Gauss-Legendre rule: {0}")]
    RuleConstruction(String),
}

/// A grid point whose integral could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationFailure {
    pub index: usize,
    pub x: f64,
    pub reason: QuadratureError,
}

/// Running integral aligned with the grid; `None` marks a flagged gap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunningIntegral {
    pub values: Vec<Option<f64>>,
    pub failures: Vec<IntegrationFailure>,
}

impl RunningIntegral {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// one panel of the adaptive scheme with its two half estimates
struct Panel {
    a: f64,
    b: f64,
    left: f64,
    right: f64,
    error: f64,
}

impl Panel {
    fn estimate(&self) -> f64 {
        self.left + self.right
    }
}

pub struct Integrator {
    config: QuadratureConfig,
    rule: GaussLegendre,
}

impl Integrator {
    pub fn new(config: QuadratureConfig) -> Result<Integrator, QuadratureError> {
        let rule = GaussLegendre::new(config.degree)
            .map_err(|e| QuadratureError::RuleConstruction(format!("{:?}", e)))?;
        Ok(Integrator { config, rule })
    }

    // single Gauss-Legendre panel, the first evaluation fault wins
    fn rule_integral(&self, expression: &Expression, a: f64, b: f64) -> Result<f64, QuadratureError> {
        let fault: Cell<Option<(f64, NumericFault)>> = Cell::new(None);
        let f = |t: f64| match expression.eval(t) {
            Ok(value) => value,
            Err(e) => {
                if let Some(previous) = fault.take() {
                    fault.set(Some(previous));
                } else {
                    fault.set(Some((t, e)));
                }
                0.0
            }
        };
        let value = self.rule.integrate(a, b, f);
        match fault.take() {
            Some((x, fault)) => Err(QuadratureError::Evaluation { x, fault }),
            None => Ok(value),
        }
    }

    fn panel(&self, expression: &Expression, a: f64, b: f64, whole: f64) -> Result<Panel, QuadratureError> {
        let mid = 0.5 * (a + b);
        let left = self.rule_integral(expression, a, mid)?;
        let right = self.rule_integral(expression, mid, b)?;
        Ok(Panel {
            a,
            b,
            left,
            right,
            error: (left + right - whole).abs(),
        })
    }

    /// Definite integral from `a` to `b`. Panels are split where the two-half estimate
    /// disagrees most with the whole-panel estimate, until the summed disagreement is below
    /// `max(abs_tol, rel_tol * |I|)` or the subdivision budget is spent.
    pub fn integrate(&self, expression: &Expression, a: f64, b: f64) -> Result<f64, QuadratureError> {
        if a == b {
            return Ok(0.0);
        }
        let whole = self.rule_integral(expression, a, b)?;
        let mut panels = vec![self.panel(expression, a, b, whole)?];
        let mut subdivisions = 0;
        loop {
            let estimate: f64 = panels.iter().map(Panel::estimate).sum();
            let error_estimate: f64 = panels.iter().map(|p| p.error).sum();
            if !estimate.is_finite() {
                return Err(QuadratureError::Evaluation {
                    x: b,
                    fault: NumericFault::NonFinite("quadrature"),
                });
            }
            if error_estimate <= self.config.abs_tol.max(self.config.rel_tol * estimate.abs()) {
                return Ok(estimate);
            }
            if subdivisions >= self.config.max_subdivisions {
                return Err(QuadratureError::NotConverged {
                    estimate,
                    error_estimate,
                });
            }
            let worst = panels
                .iter()
                .enumerate()
                .max_by(|(_, p), (_, q)| p.error.total_cmp(&q.error))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let split = panels.swap_remove(worst);
            let mid = 0.5 * (split.a + split.b);
            panels.push(self.panel(expression, split.a, mid, split.left)?);
            panels.push(self.panel(expression, mid, split.b, split.right)?);
            subdivisions += 1;
        }
    }

    /// Integrates from `grid[0]` to every grid point.
    pub fn running_integral(&self, expression: &Expression, grid: &[f64]) -> RunningIntegral {
        let Some(&x0) = grid.first() else {
            return RunningIntegral::default();
        };
        let integrate_at = |(index, &x): (usize, &f64)| (index, x, self.integrate(expression, x0, x));
        let results: Vec<(usize, f64, Result<f64, QuadratureError>)> = if self.config.parallel {
            grid.par_iter().enumerate().map(integrate_at).collect()
        } else {
            grid.iter().enumerate().map(integrate_at).collect()
        };

        let mut running = RunningIntegral {
            values: Vec::with_capacity(grid.len()),
            failures: Vec::new(),
        };
        for (index, x, result) in results {
            match result {
                Ok(value) => running.values.push(Some(value)),
                Err(reason) => {
                    running.values.push(None);
                    running.failures.push(IntegrationFailure { index, x, reason });
                }
            }
        }
        if !running.failures.is_empty() {
            warn!(
                "running integral of '{}': {} of {} points left as gaps",
                expression.text(),
                running.failures.len(),
                grid.len()
            );
        }
        debug!("running integral of '{}' on {} points", expression.text(), grid.len());
        running
    }
}

/// Running integral with the given quadrature settings. If the rule itself cannot be built
/// every point after the first is reported as a failure.
pub fn integral(expression: &Expression, grid: &[f64], config: &QuadratureConfig) -> RunningIntegral {
    match Integrator::new(config.clone()) {
        Ok(integrator) => integrator.running_integral(expression, grid),
        Err(reason) => {
            warn!("{}", reason);
            let mut running = RunningIntegral::default();
            for (index, &x) in grid.iter().enumerate() {
                if index == 0 {
                    running.values.push(Some(0.0));
                } else {
                    running.values.push(None);
                    running.failures.push(IntegrationFailure {
                        index,
                        x,
                        reason: reason.clone(),
                    });
                }
            }
            running
        }
    }
}
