use crate::error::{EngineError, EngineResult};
use crate::symbolic::symbolic_engine::{ElementaryFunction, Expr};
use crate::symbolic::utils::{
    brackets_balanced, find_char_positions_outside_brackets, find_pair_to_this_bracket,
    strip_outer_brackets,
};
use log::trace;
use std::str::FromStr;

/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use deriva_engine::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("sin(x) + 0.5*x**4").unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
//                  search recursion diagram
//                "x^2 - 4*sin(x) + 1"              |
//                |       left  | right             |
//                |_________________________________|
//                | split by rightmost binary + or -|
//                |_________________________________|
//                | x^2 - 4*sin(x) |      1         |
//                |       |        |      Ok        |
//                |_____ \|/_______|________________|
//                | split by rightmost binary + or -|
//                |_________________________________|
//                |   x^2   |   4*sin(x)            |
//                |   |     |      |                |
//                |__\|/____|_____\|/_______________|
//                | by ^    |  split by * or /      |
//                | x | 2   |   4  |  sin(x)        |
//                  etc...
impl Expr {
    /// Parses a function of `x`.
    pub fn parse_expression(input: &str) -> EngineResult<Expr> {
        parse_expression_func(input, "x")
    }
}

const ALLOWED_PUNCTUATION: &[char] = &['+', '-', '*', '/', '^', '(', ')', '.', '_'];

/// Longest accepted input, in bytes.
pub const MAX_EXPRESSION_LENGTH: usize = 4096;
/// Deepest accepted tree. Brackets, operators and unary signs each add a level.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Parses `input` into a closed tree over the fixed vocabulary, `variable` being the only
/// free symbol.
pub fn parse_expression_func(input: &str, variable: &str) -> EngineResult<Expr> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EngineError::parse(input, "empty expression"));
    }
    if trimmed.len() > MAX_EXPRESSION_LENGTH {
        return Err(EngineError::parse(
            input,
            format!("expression longer than {} characters", MAX_EXPRESSION_LENGTH),
        ));
    }
    if let Some(c) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || ALLOWED_PUNCTUATION.contains(c)))
    {
        return Err(EngineError::parse(input, format!("unexpected character '{}'", c)));
    }
    if !brackets_balanced(trimmed) {
        return Err(EngineError::parse(input, "unbalanced parentheses"));
    }
    // both power notations end up as '^'
    let normalized = trimmed.replace("**", "^");
    let parser = Parser {
        original: input,
        variable,
    };
    let expr = parser.parse_node(&normalized, 0)?;
    trace!("parsed '{}' into {}", input, expr);
    Ok(expr)
}

struct Parser<'a> {
    original: &'a str,
    variable: &'a str,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> EngineError {
        EngineError::parse(self.original, message)
    }

    fn parse_node(&self, input: &str, depth: usize) -> EngineResult<Expr> {
        let input = input.trim();
        if input.is_empty() {
            return Err(self.error("missing operand"));
        }
        if depth > MAX_NESTING_DEPTH {
            return Err(self.error(format!(
                "expression nested deeper than {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        let depth = depth + 1;
        // expression that is ALL in brackets
        if let Some(inner) = strip_outer_brackets(input) {
            return self.parse_node(inner, depth);
        }
        // addition and subtraction, left associative
        if let Some((pos, op)) = find_rightmost_binary_sign(input) {
            let left = self.parse_node(&input[..pos], depth)?;
            let right = self.parse_node(&input[pos + 1..], depth)?;
            return Ok(match op {
                '+' => Expr::Add(left.boxed(), right.boxed()),
                _ => Expr::Sub(left.boxed(), right.boxed()),
            });
        }
        // multiplication and division, left associative
        if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['*', '/']) {
            let left = self.parse_node(&input[..pos], depth)?;
            let right = self.parse_node(&input[pos + 1..], depth)?;
            return Ok(match op {
                '*' => Expr::Mul(left.boxed(), right.boxed()),
                _ => Expr::Div(left.boxed(), right.boxed()),
            });
        }
        // unary sign binds looser than '^', so -x^2 = -(x^2)
        if let Some(rest) = input.strip_prefix('-') {
            return Ok(Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(self.parse_node(rest, depth)?),
            ));
        }
        if let Some(rest) = input.strip_prefix('+') {
            return self.parse_node(rest, depth);
        }
        // power, right associative: split at the leftmost '^'
        if let Some(pos) = find_char_positions_outside_brackets(input, '^') {
            let base = self.parse_node(&input[..pos], depth)?;
            let exponent = self.parse_node(&input[pos + 1..], depth)?;
            return Ok(Expr::Pow(base.boxed(), exponent.boxed()));
        }
        if input.ends_with(')') {
            return self.parse_call(input, depth);
        }
        self.parse_atom(input)
    }

    fn parse_call(&self, input: &str, depth: usize) -> EngineResult<Expr> {
        let open = input
            .find('(')
            .ok_or_else(|| self.error("unbalanced parentheses"))?;
        if find_pair_to_this_bracket(input, open) != Some(input.len() - 1) {
            return Err(self.error(format!("missing operator in '{}'", input)));
        }
        let name = input[..open].trim();
        if !is_identifier(name) {
            return Err(self.error(format!("missing operator in '{}'", input)));
        }
        let func = ElementaryFunction::from_str(name).map_err(|_| EngineError::UnknownSymbol {
            symbol: name.to_string(),
        })?;
        let argument = self.parse_node(&input[open + 1..input.len() - 1], depth)?;
        Ok(func.apply(argument))
    }

    fn parse_atom(&self, input: &str) -> EngineResult<Expr> {
        let first = input.chars().next().unwrap_or(' ');
        if first.is_ascii_digit() || first == '.' {
            return input
                .parse::<f64>()
                .map(Expr::Const)
                .map_err(|_| self.error(format!("invalid number literal '{}'", input)));
        }
        if !is_identifier(input) {
            return Err(self.error(format!("cannot parse '{}'", input)));
        }
        if input == self.variable {
            return Ok(Expr::Var(input.to_string()));
        }
        match input {
            "pi" => Ok(Expr::Const(std::f64::consts::PI)),
            "e" => Ok(Expr::Const(std::f64::consts::E)),
            _ if ElementaryFunction::from_str(input).is_ok() => Err(self.error(format!(
                "function '{}' used without an argument",
                input
            ))),
            _ => Err(EngineError::UnknownSymbol {
                symbol: input.to_string(),
            }),
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// function to find the rightmost occurrence of operators at the same precedence level,
fn find_rightmost_operator_outside_brackets(
    input: &str,
    operators: &[char],
) -> Option<(usize, char)> {
    let mut bracket_depth = 0;
    let mut last_op = None;

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            _ if bracket_depth == 0 && operators.contains(&c) => {
                last_op = Some((i, c));
            }
            _ => {}
        }
    }
    last_op
}

/// Rightmost '+' or '-' outside brackets that has a left operand. Unary signs and the
/// exponent sign of a literal such as `1e-5` are skipped.
fn find_rightmost_binary_sign(input: &str) -> Option<(usize, char)> {
    let mut bracket_depth = 0;
    let mut last_op = None;

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            '+' | '-' if bracket_depth == 0 => {
                let before = input[..i].trim_end();
                let is_binary = match before.chars().last() {
                    None => false,
                    Some(prev) if "+-*/^(".contains(prev) => false,
                    Some(_) => !is_exponent_sign(input, i),
                };
                if is_binary {
                    last_op = Some((i, c));
                }
            }
            _ => {}
        }
    }
    last_op
}

fn is_exponent_sign(input: &str, sign_pos: usize) -> bool {
    let head = &input[..sign_pos];
    let Some(mantissa) = head.strip_suffix(['e', 'E']) else {
        return false;
    };
    let literal_start = mantissa
        .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map_or(0, |p| p + 1);
    let literal = &mantissa[literal_start..];
    let preceded_by_identifier = mantissa[..literal_start]
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
    literal.chars().any(|c| c.is_ascii_digit()) && !preceded_by_identifier
}
