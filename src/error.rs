//! Error types shared by every stage of the analysis pipeline.
//!
//! Compilation, domain and order validation fail fast with an [`EngineError`].
//! Numeric faults raised while evaluating a compiled expression are described by
//! [`NumericFault`] and wrapped into the error of the stage that met them.
use thiserror::Error;

/// Numeric failure met while evaluating an expression at a single point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericFault {
    #[error("division by zero")]
    DivisionByZero,

    #[error("logarithm of non-positive value {0}")]
    LogOfNonPositive(f64),

    #[error("square root of negative value {0}")]
    SqrtOfNegative(f64),

    #[error("non-real power: {base} ^ {exponent}")]
    NonRealPower { base: f64, exponent: f64 },

    #[error("non-finite result in {0}")]
    NonFinite(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("parse error in '{input}': {message}")]
    ParseError { input: String, message: String },

    #[error("unknown symbol '{symbol}'")]
    UnknownSymbol { symbol: String },

    #[error("expression '{expression}' is not evaluable at x = {x}: {fault}")]
    NotEvaluable {
        expression: String,
        x: f64,
        fault: NumericFault,
    },

    #[error("invalid domain [{x_min}, {x_max}]: {reason}")]
    DomainError {
        x_min: f64,
        x_max: f64,
        reason: String,
    },

    #[error(
        "derivative order must be between 1 and {max}, got {0}",
        max = crate::numerical::grid::MAX_DERIVATIVE_ORDER
    )]
    InvalidOrder(i64),

    #[error("evaluation of '{expression}' failed at x = {x}: {fault}")]
    NumericEvaluationError {
        expression: String,
        x: f64,
        fault: NumericFault,
    },

    #[error("analysis request contains no functions")]
    EmptyRequest,

    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),
}

impl EngineError {
    pub(crate) fn parse(input: &str, message: impl Into<String>) -> Self {
        EngineError::ParseError {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
