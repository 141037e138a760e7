use crate::error::{EngineError, NumericFault};
use crate::symbolic::symbolic_engine::Expr;

/// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
///
/// The tree is compiled once into a `Lambda`: variables are resolved to argument slots,
/// so evaluation does no name lookups. Every operation with a restricted real domain is
/// checked, a fault is returned instead of a NaN or an infinity leaking into the series.
#[derive(Clone, Debug, PartialEq)]
pub enum Lambda {
    Var(usize),
    Const(f64),
    Add(Box<Lambda>, Box<Lambda>),
    Sub(Box<Lambda>, Box<Lambda>),
    Mul(Box<Lambda>, Box<Lambda>),
    Div(Box<Lambda>, Box<Lambda>),
    Pow(Box<Lambda>, Box<Lambda>),
    Exp(Box<Lambda>),
    Ln(Box<Lambda>),
    Sin(Box<Lambda>),
    Cos(Box<Lambda>),
    Tg(Box<Lambda>),
    Sqrt(Box<Lambda>),
}

impl Expr {
    /// Resolves every variable of the expression to its position in `vars`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("x^2").unwrap().compile(&["x"]).unwrap();
    /// assert_eq!(f.eval(&[3.0]), Ok(9.0));
    /// ```
    pub fn compile(&self, vars: &[&str]) -> Result<Lambda, EngineError> {
        Ok(match self {
            Expr::Var(name) => {
                let idx = vars.iter().position(|&v| v == name).ok_or_else(|| {
                    EngineError::UnknownSymbol {
                        symbol: name.clone(),
                    }
                })?;
                Lambda::Var(idx)
            }
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Add(a, b) => Lambda::Add(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Sub(a, b) => Lambda::Sub(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Mul(a, b) => Lambda::Mul(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Div(a, b) => Lambda::Div(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Pow(a, b) => Lambda::Pow(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Exp(e) => Lambda::Exp(Box::new(e.compile(vars)?)),
            Expr::Ln(e) => Lambda::Ln(Box::new(e.compile(vars)?)),
            Expr::sin(e) => Lambda::Sin(Box::new(e.compile(vars)?)),
            Expr::cos(e) => Lambda::Cos(Box::new(e.compile(vars)?)),
            Expr::tg(e) => Lambda::Tg(Box::new(e.compile(vars)?)),
            Expr::sqrt(e) => Lambda::Sqrt(Box::new(e.compile(vars)?)),
        })
    }
}

fn finite(value: f64, op: &'static str) -> Result<f64, NumericFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NumericFault::NonFinite(op))
    }
}

fn checked_pow(base: f64, exponent: f64) -> Result<f64, NumericFault> {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(NumericFault::NonRealPower { base, exponent });
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(NumericFault::DivisionByZero);
    }
    finite(base.powf(exponent), "pow")
}

impl Lambda {
    /// Evaluates with `args` laid out as the `vars` passed to [`Expr::compile`].
    ///
    /// # Panics
    /// If `args` is shorter than that variable list.
    #[inline(always)]
    pub fn eval(&self, args: &[f64]) -> Result<f64, NumericFault> {
        match self {
            Lambda::Var(i) => finite(args[*i], "argument"),
            Lambda::Const(v) => finite(*v, "constant"),
            Lambda::Add(a, b) => finite(a.eval(args)? + b.eval(args)?, "addition"),
            Lambda::Sub(a, b) => finite(a.eval(args)? - b.eval(args)?, "subtraction"),
            Lambda::Mul(a, b) => finite(a.eval(args)? * b.eval(args)?, "multiplication"),
            Lambda::Div(a, b) => {
                let numerator = a.eval(args)?;
                let denominator = b.eval(args)?;
                if denominator == 0.0 {
                    return Err(NumericFault::DivisionByZero);
                }
                finite(numerator / denominator, "division")
            }
            Lambda::Pow(a, b) => checked_pow(a.eval(args)?, b.eval(args)?),
            Lambda::Exp(e) => finite(e.eval(args)?.exp(), "exp"),
            Lambda::Ln(e) => {
                let value = e.eval(args)?;
                if value <= 0.0 {
                    return Err(NumericFault::LogOfNonPositive(value));
                }
                Ok(value.ln())
            }
            Lambda::Sin(e) => Ok(e.eval(args)?.sin()),
            Lambda::Cos(e) => Ok(e.eval(args)?.cos()),
            Lambda::Tg(e) => finite(e.eval(args)?.tan(), "tan"),
            Lambda::Sqrt(e) => {
                let value = e.eval(args)?;
                if value < 0.0 {
                    return Err(NumericFault::SqrtOfNegative(value));
                }
                Ok(value.sqrt())
            }
        }
    }
}
