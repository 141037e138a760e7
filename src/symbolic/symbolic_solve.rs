//! # Exact polynomial solver
//!
//! Recognises expressions that are polynomials in one variable and solves them in closed
//! form up to degree 3. Anything else is reported as unsupported (`None`) and left to the
//! numeric sweep of the root finder.
//!
//! ## Interesting Code Features
//!
//! 1. **Bounded expansion**: products and integer powers are expanded only while the degree
//!    stays within the limit, so `(x+1)^1000` costs nothing
//! 2. **Stable quadratic**: roots come from `q = -(b + sign(b)*sqrt(D))/2` to avoid cancellation
//! 3. **Cardano and trigonometric cubic**: one real root by Cardano, three by the cosine form;
//!    every root is polished with a few Newton steps on the original coefficients
use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

/// Highest degree solved in closed form.
pub const MAX_EXACT_DEGREE: usize = 3;

/// Coefficients in ascending powers: `c[0] + c[1]*x + c[2]*x^2 + ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(mut coefficients: Vec<f64>) -> Self {
        let scale = coefficients.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        while coefficients.len() > 1 {
            match coefficients.last() {
                Some(c) if c.abs() <= 1e-14 * scale => {
                    coefficients.pop();
                }
                _ => break,
            }
        }
        if coefficients.is_empty() {
            coefficients.push(0.0);
        }
        Polynomial { coefficients }
    }

    /// Extracts the polynomial form of `expr` in `var`, giving up once the degree would
    /// exceed `max_degree` or a term is not polynomial.
    pub fn from_expr(expr: &Expr, var: &str, max_degree: usize) -> Option<Polynomial> {
        expand(expr, var, max_degree).map(Polynomial::new)
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner scheme
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    fn eval_derivative(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (power, c)| acc * x + power as f64 * c)
    }

    /// Real roots in ascending order. A constant polynomial has no isolated roots.
    pub fn real_roots(&self) -> Vec<f64> {
        let c = &self.coefficients;
        let mut roots = match self.degree() {
            0 => Vec::new(),
            1 => vec![-c[0] / c[1]],
            2 => solve_quadratic(c[2], c[1], c[0]),
            3 => solve_cubic(c[3], c[2], c[1], c[0]),
            _ => Vec::new(),
        };
        for root in roots.iter_mut() {
            *root = self.polish(*root);
        }
        roots.retain(|r| r.is_finite());
        roots.sort_by(|a, b| a.total_cmp(b));
        roots
    }

    // Newton steps kept only while the residual shrinks
    fn polish(&self, mut root: f64) -> f64 {
        let mut residual = self.eval(root).abs();
        for _ in 0..8 {
            if residual == 0.0 {
                break;
            }
            let slope = self.eval_derivative(root);
            if slope == 0.0 {
                break;
            }
            let candidate = root - self.eval(root) / slope;
            let candidate_residual = self.eval(candidate).abs();
            if !(candidate_residual < residual) {
                break;
            }
            root = candidate;
            residual = candidate_residual;
        }
        root
    }
}

/// Closed-form real roots of `expr` in `var`, or `None` when the expression is not a
/// polynomial of degree at most `max_degree`.
pub fn solve_polynomial(expr: &Expr, var: &str, max_degree: usize) -> Option<Vec<f64>> {
    let max_degree = max_degree.min(MAX_EXACT_DEGREE);
    Polynomial::from_expr(expr, var, max_degree).map(|p| p.real_roots())
}

fn expand(expr: &Expr, var: &str, max_degree: usize) -> Option<Vec<f64>> {
    if !expr.contains_variable(var) {
        let value = expr.compile(&[]).ok()?.eval(&[]).ok()?;
        return Some(vec![value]);
    }
    match expr {
        Expr::Var(name) if name == var => Some(vec![0.0, 1.0]),
        Expr::Add(lhs, rhs) => Some(add(
            &expand(lhs, var, max_degree)?,
            &expand(rhs, var, max_degree)?,
            1.0,
        )),
        Expr::Sub(lhs, rhs) => Some(add(
            &expand(lhs, var, max_degree)?,
            &expand(rhs, var, max_degree)?,
            -1.0,
        )),
        Expr::Mul(lhs, rhs) => multiply(
            &expand(lhs, var, max_degree)?,
            &expand(rhs, var, max_degree)?,
            max_degree,
        ),
        Expr::Div(lhs, rhs) => {
            let numerator = expand(lhs, var, max_degree)?;
            let denominator = Polynomial::new(expand(rhs, var, max_degree)?);
            match denominator.coefficients() {
                [d] if *d != 0.0 => Some(numerator.iter().map(|c| c / d).collect()),
                _ => None,
            }
        }
        Expr::Pow(base, exponent) => {
            if exponent.contains_variable(var) {
                return None;
            }
            let n = exponent.compile(&[]).ok()?.eval(&[]).ok()?;
            if n < 0.0 || n.fract() != 0.0 || n > max_degree as f64 {
                return None;
            }
            let base = expand(base, var, max_degree)?;
            let mut result = vec![1.0];
            for _ in 0..(n as usize) {
                result = multiply(&result, &base, max_degree)?;
            }
            Some(result)
        }
        _ => None,
    }
}

fn add(a: &[f64], b: &[f64], sign: f64) -> Vec<f64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| a.get(i).copied().unwrap_or(0.0) + sign * b.get(i).copied().unwrap_or(0.0))
        .collect()
}

fn multiply(a: &[f64], b: &[f64], max_degree: usize) -> Option<Vec<f64>> {
    let a = Polynomial::new(a.to_vec());
    let b = Polynomial::new(b.to_vec());
    if a.degree() + b.degree() > max_degree {
        return None;
    }
    let mut result = vec![0.0; a.degree() + b.degree() + 1];
    for (i, ca) in a.coefficients().iter().enumerate() {
        for (j, cb) in b.coefficients().iter().enumerate() {
            result[i + j] += ca * cb;
        }
    }
    Some(result)
}

fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    let sign = if b >= 0.0 { 1.0 } else { -1.0 };
    let q = -0.5 * (b + sign * discriminant.sqrt());
    vec![q / a, c / q]
}

fn solve_cubic(a3: f64, a2: f64, a1: f64, a0: f64) -> Vec<f64> {
    // x^3 + a x^2 + b x + c, then x = t - a/3 gives t^3 + p t + q
    let (a, b, c) = (a2 / a3, a1 / a3, a0 / a3);
    let shift = a / 3.0;
    let p = b - a * a / 3.0;
    let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;
    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);
    let scale = (q / 2.0).powi(2) + (p / 3.0).powi(3).abs();

    let depressed: Vec<f64> = if discriminant.abs() <= 1e-12 * scale {
        if p == 0.0 {
            vec![0.0]
        } else {
            vec![3.0 * q / p, -3.0 * q / (2.0 * p)]
        }
    } else if discriminant > 0.0 {
        let sqrt_d = discriminant.sqrt();
        vec![(-q / 2.0 + sqrt_d).cbrt() + (-q / 2.0 - sqrt_d).cbrt()]
    } else {
        let r = 2.0 * (-p / 3.0).sqrt();
        let argument = ((3.0 * q) / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = argument.acos() / 3.0;
        (0..3)
            .map(|k| r * (phi - 2.0 * PI * k as f64 / 3.0).cos())
            .collect()
    };
    depressed.into_iter().map(|t| t - shift).collect()
}
