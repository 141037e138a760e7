//! # Symbolic Expression Simplification Module
//!
//! Algebraic clean-up of expression trees, mostly of the raw output of `diff`.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: a subtree free of variables is evaluated with the checked
//!    evaluator and replaced by its value. Subtrees that fault (`log(-1)`, `1/0`) are kept
//!    as they are, so folding never hides a fault from the caller
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x * 0 = 0, x ^ 1 = x, x - x = 0
//! 3. **Constant Collection**: (c1 * expr) * c2 = (c1 * c2) * expr
//! 4. **Power Rules**: x^a * x^b = x^(a+b) for a shared base

use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    fn fold_constant(&self) -> Option<f64> {
        if !self.is_variable_free() {
            return None;
        }
        self.compile(&[]).ok()?.eval(&[]).ok()
    }

    fn is_variable_free(&self) -> bool {
        match self {
            Expr::Var(_) => false,
            Expr::Const(_) => true,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => lhs.is_variable_free() && rhs.is_variable_free(),
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::sqrt(expr) => expr.is_variable_free(),
        }
    }

    /// One bottom-up pass of folding and identity rules.
    pub fn simplify_(&self) -> Expr {
        if let Some(value) = self.fold_constant() {
            return Expr::Const(value);
        }
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), _) if *a == 0.0 => rhs, // 0 + x = x
                    (_, Expr::Const(b)) if *b == 0.0 => lhs, // x + 0 = x
                    _ if lhs == rhs => Expr::Mul(Box::new(Expr::Const(2.0)), Box::new(lhs)),
                    _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (_, Expr::Const(b)) if *b == 0.0 => lhs, // x - 0 = x
                    (Expr::Const(a), _) if *a == 0.0 => {
                        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(rhs)).simplify_()
                    }
                    _ if lhs == rhs => Expr::Const(0.0),
                    _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), _) | (_, Expr::Const(a)) if *a == 0.0 => Expr::Const(0.0),
                    (Expr::Const(a), _) if *a == 1.0 => rhs, // 1 * x = x
                    (_, Expr::Const(b)) if *b == 1.0 => lhs, // x * 1 = x
                    // constants go to the left
                    (other, Expr::Const(_)) if !matches!(other, Expr::Const(_)) => {
                        Expr::Mul(Box::new(rhs), Box::new(lhs)).simplify_()
                    }
                    // c2 * (c1 * expr) = (c2 * c1) * expr
                    (Expr::Const(c), Expr::Mul(inner_lhs, inner_rhs)) => {
                        match inner_lhs.as_ref() {
                            Expr::Const(c1) => {
                                Expr::Mul(Box::new(Expr::Const(c * c1)), inner_rhs.clone())
                                    .simplify_()
                            }
                            _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
                        }
                    }
                    // x^a * x^b = x^(a+b)
                    (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if base1 == base2 => {
                        let new_exp = Expr::Add(exp1.clone(), exp2.clone()).simplify_();
                        Expr::Pow(base1.clone(), Box::new(new_exp)).simplify_()
                    }
                    _ if lhs == rhs => {
                        Expr::Pow(Box::new(lhs), Box::new(Expr::Const(2.0)))
                    }
                    _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (_, Expr::Const(b)) if *b == 1.0 => lhs, // x / 1 = x
                    (_, Expr::Const(b)) if *b != 0.0 => {
                        Expr::Mul(Box::new(Expr::Const(1.0 / b)), Box::new(lhs)).simplify_()
                    }
                    _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Pow(base, exp) => {
                let base = base.simplify_();
                let exp = exp.simplify_();
                match (&base, &exp) {
                    (_, Expr::Const(e)) if *e == 1.0 => base, // x^1 = x
                    (_, Expr::Const(e)) if *e == 0.0 => Expr::Const(1.0),
                    // (x^a)^n = x^(a*n) for integer n
                    (Expr::Pow(inner_base, inner_exp), Expr::Const(n)) if n.fract() == 0.0 => {
                        match inner_exp.as_ref() {
                            Expr::Const(a) if a.fract() == 0.0 => Expr::Pow(
                                inner_base.clone(),
                                Box::new(Expr::Const(a * n)),
                            ),
                            _ => Expr::Pow(Box::new(base), Box::new(exp)),
                        }
                    }
                    _ => Expr::Pow(Box::new(base), Box::new(exp)),
                }
            }
            Expr::Exp(expr) => Expr::Exp(Box::new(expr.simplify_())),
            Expr::Ln(expr) => Expr::Ln(Box::new(expr.simplify_())),
            Expr::sin(expr) => Expr::sin(Box::new(expr.simplify_())),
            Expr::cos(expr) => Expr::cos(Box::new(expr.simplify_())),
            Expr::tg(expr) => Expr::tg(Box::new(expr.simplify_())),
            Expr::sqrt(expr) => Expr::sqrt(Box::new(expr.simplify_())),
        }
    }

    /// Repeats `simplify_` until the tree stops changing (at most a few passes).
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_();
        for _ in 0..8 {
            let next = current.simplify_();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }
}
