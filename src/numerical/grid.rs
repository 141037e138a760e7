//! Domain of analysis, its sample grid and the derivative order.
use crate::error::{EngineError, EngineResult};
use crate::symbolic::utils::linspace;

pub const DEFAULT_SAMPLES: usize = 400;
/// Highest accepted derivative order, each order is one full pass over the grid.
pub const MAX_DERIVATIVE_ORDER: i64 = 64;

/// Closed interval `[x_min, x_max]` sampled at `samples` evenly spaced points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    x_min: f64,
    x_max: f64,
    samples: usize,
}

impl Domain {
    pub fn new(x_min: f64, x_max: f64) -> EngineResult<Domain> {
        Self::with_samples(x_min, x_max, DEFAULT_SAMPLES)
    }

    pub fn with_samples(x_min: f64, x_max: f64, samples: usize) -> EngineResult<Domain> {
        let invalid = |reason: &str| EngineError::DomainError {
            x_min,
            x_max,
            reason: reason.to_string(),
        };
        if !x_min.is_finite() || !x_max.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if x_min >= x_max {
            return Err(invalid("x_min must be less than x_max"));
        }
        if samples < 2 {
            return Err(invalid("at least 2 samples are required"));
        }
        Ok(Domain {
            x_min,
            x_max,
            samples,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Distance between neighbouring grid points.
    pub fn spacing(&self) -> f64 {
        (self.x_max - self.x_min) / (self.samples as f64 - 1.0)
    }

    /// Ordered grid including both ends.
    pub fn grid(&self) -> Vec<f64> {
        linspace(self.x_min, self.x_max, self.samples)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }
}

/// How many times the gradient operator is applied, from 1 to [`MAX_DERIVATIVE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DerivativeOrder(u32);

impl DerivativeOrder {
    pub fn new(order: i64) -> EngineResult<DerivativeOrder> {
        if !(1..=MAX_DERIVATIVE_ORDER).contains(&order) {
            return Err(EngineError::InvalidOrder(order));
        }
        Ok(DerivativeOrder(order as u32))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for DerivativeOrder {
    fn default() -> Self {
        DerivativeOrder(1)
    }
}
