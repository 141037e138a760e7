/// domain, sample grid and derivative order
pub mod grid;
/// finite-difference derivative series
///# Example
/// ```
/// use deriva_engine::numerical::differentiation::gradient;
/// assert_eq!(gradient(&[0.0, 1.0, 4.0, 9.0], 1.0), vec![1.0, 2.0, 4.0, 5.0]);
/// ```
pub mod differentiation;
/// running integral by adaptive Gauss-Legendre quadrature
pub mod integration;
/// bracketed scalar root finding: bisection and Brent
///# Example
/// ```
/// use deriva_engine::numerical::root_finding::{ClosureFunction, ScalarRootFinder};
/// let f = ClosureFunction::new(|x: f64| x * x - 2.0, "x^2 - 2".to_string());
/// let result = ScalarRootFinder::new().brent(&f, 0.0, 2.0).unwrap();
/// assert!((result.root - 2.0_f64.sqrt()).abs() < 1e-10);
/// ```
pub mod root_finding;
/// two-tier root finder: exact polynomial solutions, then a bracket sweep
pub mod roots;
/// roots of the symbolic first derivative
pub mod critical_points;
/// max, min, mean, std and trapezoidal areas of sampled functions
pub mod statistics;
/// ________________________________________________________________________________________________________________________________
/// # Analysis pipeline
/// compile -> sample -> differentiate, integrate -> roots -> critical points -> statistics
/// ```
/// use deriva_engine::numerical::analysis::{AnalysisRequest, analyze};
/// let request = AnalysisRequest::new(vec!["sin(x)".to_string(), "x^2".to_string()], -5.0, 5.0);
/// let result = analyze(&request).unwrap();
/// for series in &result.series {
///     println!("{}: {} points", series.expression.text(), series.y.len());
/// }
/// ```
pub mod analysis;
