//! # Function analysis pipeline
//!
//! Runs the whole analysis of a request in a fixed order: compile every function, build the
//! grid, sample, differentiate, integrate, then the optional roots, critical points and
//! statistics. Compilation and the domain/order checks come first and reject the request
//! before any computation. After that the only partial outcome is a gap in a running
//! integral.
//!
//! # Examples
//! ```
//! use deriva_engine::numerical::analysis::{AnalysisRequest, FunctionAnalyzer};
//! let request = AnalysisRequest::new(vec!["x^2 - 4".to_string()], -10.0, 10.0);
//! let result = FunctionAnalyzer::default().analyze(&request).unwrap();
//! assert_eq!(result.grid.len(), 400);
//! assert_eq!(result.roots.unwrap()[0].len(), 2);
//! ```
use crate::error::{EngineError, EngineResult};
use crate::numerical::critical_points::{CriticalPoint, CriticalPointFinder};
use crate::numerical::differentiation::derivative_of_samples;
use crate::numerical::grid::{DEFAULT_SAMPLES, DerivativeOrder, Domain};
use crate::numerical::integration::{QuadratureConfig, RunningIntegral, integral};
use crate::numerical::roots::{RootFinder, RootSearchConfig, RootSet};
use crate::numerical::statistics::{Statistics, statistics};
use crate::symbolic::compiler::{CompilerConfig, Expression};
use log::info;
use std::time::Instant;

/// Which of the optional analyses to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub roots: bool,
    pub critical_points: bool,
    pub statistics: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            roots: true,
            critical_points: true,
            statistics: true,
        }
    }
}

/// Numerical settings of every stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    pub compiler: CompilerConfig,
    pub quadrature: QuadratureConfig,
    pub roots: RootSearchConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub functions: Vec<String>,
    pub x_min: f64,
    pub x_max: f64,
    pub samples: usize,
    /// checked by the analyzer, 0 and negatives are rejected
    pub order: i64,
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    /// Request with 400 samples, first derivative and every option on.
    pub fn new(functions: Vec<String>, x_min: f64, x_max: f64) -> Self {
        AnalysisRequest {
            functions,
            x_min,
            x_max,
            samples: DEFAULT_SAMPLES,
            order: 1,
            options: AnalysisOptions::default(),
        }
    }
}

/// Sampled values of one function, aligned with the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSeries {
    pub expression: Expression,
    pub y: Vec<f64>,
    pub derivative: Vec<f64>,
    pub integral: RunningIntegral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub domain: Domain,
    pub order: DerivativeOrder,
    pub grid: Vec<f64>,
    /// one per requested function, in request order
    pub series: Vec<FunctionSeries>,
    pub roots: Option<Vec<RootSet>>,
    pub critical_points: Option<Vec<Vec<CriticalPoint>>>,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionAnalyzer {
    config: AnalysisConfig,
}

impl FunctionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        FunctionAnalyzer { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validates the request, then runs every stage.
    pub fn analyze(&self, request: &AnalysisRequest) -> EngineResult<AnalysisResult> {
        let start = Instant::now();
        if request.functions.is_empty() {
            return Err(EngineError::EmptyRequest);
        }
        let expressions = request
            .functions
            .iter()
            .map(|text| Expression::compile_with(text, &self.config.compiler))
            .collect::<EngineResult<Vec<_>>>()?;
        let domain = Domain::with_samples(request.x_min, request.x_max, request.samples)?;
        let order = DerivativeOrder::new(request.order)?;
        info!(
            "analysing {} function(s) on [{}, {}] with {} samples, derivative order {}",
            expressions.len(),
            domain.x_min(),
            domain.x_max(),
            domain.samples(),
            order.get()
        );

        let grid = domain.grid();
        let spacing = domain.spacing();
        let series = expressions
            .into_iter()
            .map(|expression| {
                let y = expression.eval_vec(&grid)?;
                let derivative = derivative_of_samples(&y, spacing, order);
                let integral = integral(&expression, &grid, &self.config.quadrature);
                Ok(FunctionSeries {
                    expression,
                    y,
                    derivative,
                    integral,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let roots = request.options.roots.then(|| {
            let finder = RootFinder::new(self.config.roots.clone());
            series
                .iter()
                .map(|s| finder.find_roots(&s.expression, &domain))
                .collect::<Vec<_>>()
        });
        let critical_points = request.options.critical_points.then(|| {
            let finder = CriticalPointFinder::new(self.config.roots.clone());
            series
                .iter()
                .map(|s| finder.find(&s.expression, &domain))
                .collect::<Vec<_>>()
        });
        let statistics = if request.options.statistics {
            let ys: Vec<Vec<f64>> = series.iter().map(|s| s.y.clone()).collect();
            statistics(&grid, &ys)
        } else {
            None
        };

        info!("analysis finished in {:?}", start.elapsed());
        Ok(AnalysisResult {
            domain,
            order,
            grid,
            series,
            roots,
            critical_points,
            statistics,
        })
    }
}

/// Analyses `request` with default settings.
pub fn analyze(request: &AnalysisRequest) -> EngineResult<AnalysisResult> {
    FunctionAnalyzer::default().analyze(request)
}
