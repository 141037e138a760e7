//! # Symbolic Engine Module
//!
//! Core symbolic representation of a user-entered function of one variable.
//!
//! ## Purpose
//!
//! The symbolic engine allows the analysis pipeline to:
//! - hold a parsed expression as a closed abstract syntax tree
//! - differentiate it analytically (see `symbolic_engine_derivatives`)
//! - simplify it (see `symbolic_simplify`)
//! - turn it into a checked numeric evaluator (see `symbolic_lambdify`)
//! - recognise polynomial forms for the exact solver (see `symbolic_solve`)
//!
//! ## Main Structures
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - the free variable, "x" unless configured otherwise
//! - **Constants**: `Const(f64)` - numeric literals and the named constants `pi`, `e`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `sqrt` - the elementary functions
//!
//! ### `ElementaryFunction` Enum
//! The closed vocabulary of function names accepted by the parser. Nothing outside of it
//! can ever be called, there is no runtime symbol table.
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Expression Tree**: Uses Box<Expr> for nested expressions
//! 2. **Operator Overloading**: Implements std::ops traits (Add, Sub, Mul, Div, Neg) so
//!    trees can be built as `x.clone().pow(Expr::Const(2.0)) - Expr::Const(4.0)`
//! 3. **Non-standard Function Names**: Uses mathematical notation (tg) instead of
//!    programming conventions (tan) for the tangent variant

#![allow(non_camel_case_types)]

use std::f64;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Core symbolic expression enum representing a function of one variable as a tree.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm, written `log` by the user
    Ln(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
    /// Square root: sqrt(x)
    sqrt(Box<Expr>),
}

/// The function names a user may call. Parsed with `str::parse` through strum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ElementaryFunction {
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
}

impl ElementaryFunction {
    /// Wraps `arg` into the tree node of this function.
    pub fn apply(self, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match self {
            ElementaryFunction::Sin => Expr::sin(arg),
            ElementaryFunction::Cos => Expr::cos(arg),
            ElementaryFunction::Tan => Expr::tg(arg),
            ElementaryFunction::Exp => Expr::Exp(arg),
            ElementaryFunction::Log => Expr::Ln(arg),
            ElementaryFunction::Sqrt => Expr::sqrt(arg),
        }
    }
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Uses the user-facing names (`log`, `tan`) so a printed derivative can be pasted back
/// into the compiler.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "log({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tan({})", expr),
            Expr::sqrt(expr) => write!(f, "sqrt({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.contains_variable(var_name) || right.contains_variable(var_name)
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::sqrt(expr) => expr.contains_variable(var_name),
        }
    }
}
