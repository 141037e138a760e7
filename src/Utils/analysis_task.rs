//! Typed analysis task read from a task document (see [`crate::Utils::task_parser`]).
//!
//! ```text
//! functions
//!   expr: x^2 - 4, sin(x) + 0.5*x**4
//! domain
//!   x_min: -10
//!   x_max: 10
//! logging
//!   loglevel: debug
//! ```
//! Only `functions.expr` is required, every other key falls back to its default.
use crate::Utils::task_parser::{
    DocumentMap, Value, parse_document_as, raw_values, template_from,
};
use crate::error::{EngineError, EngineResult};
use crate::numerical::analysis::{AnalysisConfig, AnalysisOptions, AnalysisRequest};
use crate::numerical::grid::DEFAULT_SAMPLES;
use log::LevelFilter;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const SECTIONS: [(&str, &[&str]); 6] = [
    ("functions", &["expr"]),
    ("domain", &["x_min", "x_max", "samples", "order"]),
    ("analysis", &["roots", "critical_points", "statistics"]),
    ("solver", &["tolerance", "max_iterations", "subdivisions"]),
    (
        "quadrature",
        &["degree", "abs_tol", "rel_tol", "max_subdivisions", "parallel"],
    ),
    ("logging", &["loglevel"]),
];

pub const DEMO_TASK: &str = "\
// functions of the console demo
functions
    expr: x^2 - 4, sin(x) + 0.5*x**4, exp(-x^2)
domain
    x_min: -10
    x_max: 10
    samples: 400
    order: 1
analysis
    roots: true
    critical_points: true
    statistics: true
logging
    loglevel: info
";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisTask {
    pub request: AnalysisRequest,
    pub config: AnalysisConfig,
    pub log_level: LevelFilter,
}

// read access to a parsed document with typed lookups
struct TaskDocument {
    map: DocumentMap,
}

impl TaskDocument {
    fn values(&self, section: &str, key: &str) -> &[Value] {
        self.map
            .get(section)
            .and_then(|keys| keys.get(key))
            .and_then(|values| values.as_deref())
            .unwrap_or(&[])
    }

    fn single(&self, section: &str, key: &str) -> EngineResult<Option<&Value>> {
        match self.values(section, key) {
            [] => Ok(None),
            [value] => Ok(Some(value)),
            values => Err(EngineError::Config(format!(
                "{}.{} expects one value, got {}",
                section,
                key,
                values.len()
            ))),
        }
    }

    fn typed<T>(
        &self,
        section: &str,
        key: &str,
        default: T,
        expected: &str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> EngineResult<T> {
        match self.single(section, key)? {
            None => Ok(default),
            Some(value) => convert(value).ok_or_else(|| {
                EngineError::Config(format!(
                    "{}.{} expects {}, got {} '{}'",
                    section,
                    key,
                    expected,
                    value.type_name(),
                    value
                ))
            }),
        }
    }

    fn float(&self, section: &str, key: &str, default: f64) -> EngineResult<f64> {
        self.typed(section, key, default, "a number", Value::as_float)
    }

    fn integer(&self, section: &str, key: &str, default: i64) -> EngineResult<i64> {
        self.typed(section, key, default, "an integer", Value::as_integer)
    }

    fn count(&self, section: &str, key: &str, default: usize) -> EngineResult<usize> {
        self.typed(section, key, default, "a non-negative integer", |value| {
            value.as_integer().and_then(|i| usize::try_from(i).ok())
        })
    }

    fn boolean(&self, section: &str, key: &str, default: bool) -> EngineResult<bool> {
        self.typed(section, key, default, "true or false", Value::as_boolean)
    }

    fn level(&self, section: &str, key: &str, default: LevelFilter) -> EngineResult<LevelFilter> {
        self.typed(
            section,
            key,
            default,
            "off, error, warn, info, debug or trace",
            |value| value.as_string().and_then(|s| LevelFilter::from_str(s).ok()),
        )
    }
}

impl AnalysisTask {
    /// Parses a task document. Unknown sections or keys are rejected.
    pub fn parse(document: &str) -> EngineResult<AnalysisTask> {
        let template = template_from(&SECTIONS);
        let map = parse_document_as(document, Some(&template)).map_err(EngineError::Config)?;
        for (title, keys) in &map {
            let known = template
                .get(title)
                .ok_or_else(|| EngineError::Config(format!("unknown section '{}'", title)))?;
            if let Some(key) = keys.keys().find(|key| !known.contains_key(*key)) {
                return Err(EngineError::Config(format!(
                    "unknown key '{}' in section '{}'",
                    key, title
                )));
            }
        }
        let doc = TaskDocument { map };

        // numeric-looking entries such as `1e400` must reach the compiler untouched
        let functions = raw_values(document, "functions", "expr");
        if functions.is_empty() {
            return Err(EngineError::Config(
                "functions.expr must list at least one function".to_string(),
            ));
        }

        let request = AnalysisRequest {
            functions,
            x_min: doc.float("domain", "x_min", -10.0)?,
            x_max: doc.float("domain", "x_max", 10.0)?,
            samples: doc.count("domain", "samples", DEFAULT_SAMPLES)?,
            order: doc.integer("domain", "order", 1)?,
            options: AnalysisOptions {
                roots: doc.boolean("analysis", "roots", true)?,
                critical_points: doc.boolean("analysis", "critical_points", true)?,
                statistics: doc.boolean("analysis", "statistics", true)?,
            },
        };

        let mut config = AnalysisConfig::default();
        let solver = &mut config.roots;
        solver.solver.tolerance = doc.float("solver", "tolerance", solver.solver.tolerance)?;
        solver.solver.max_iterations =
            doc.count("solver", "max_iterations", solver.solver.max_iterations)?;
        solver.subdivisions = doc.count("solver", "subdivisions", solver.subdivisions)?;
        let quadrature = &mut config.quadrature;
        quadrature.degree = doc.count("quadrature", "degree", quadrature.degree)?;
        quadrature.abs_tol = doc.float("quadrature", "abs_tol", quadrature.abs_tol)?;
        quadrature.rel_tol = doc.float("quadrature", "rel_tol", quadrature.rel_tol)?;
        quadrature.max_subdivisions =
            doc.count("quadrature", "max_subdivisions", quadrature.max_subdivisions)?;
        quadrature.parallel = doc.boolean("quadrature", "parallel", quadrature.parallel)?;

        let log_level = doc.level("logging", "loglevel", LevelFilter::Info)?;
        Ok(AnalysisTask {
            request,
            config,
            log_level,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<AnalysisTask> {
        let path = path.as_ref();
        let document = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&document)
    }

    /// Task run by the console when no file is given.
    pub fn demo() -> EngineResult<AnalysisTask> {
        Self::parse(DEMO_TASK)
    }
}
