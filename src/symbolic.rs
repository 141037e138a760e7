#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// bracket helpers and linspace shared by the parser and the grid
pub mod utils;
/// ________________________________________________________________________________________________________________________________
/// # Symbolic engine
/// closed expression tree of one variable:
/// 1) arithmetic `+ - * / ^`
/// 2) elementary functions `sin cos tan exp log sqrt`
/// 3) human-readable printing of an expression
///# Example
/// ```
/// use deriva_engine::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("exp(x) + log(x)").unwrap();
/// println!("parsed_expression {}", parsed_expression);
/// let df_dx = parsed_expression.diff("x").simplify();
/// println!("df_dx = {}", df_dx);
/// ```
pub mod symbolic_engine;
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use deriva_engine::symbolic::symbolic_engine::Expr;
/// let input = "sin(x) + 0.5*x**4";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// let f = parsed_expression.compile(&["x"]).unwrap();
/// println!("{}, f(2) = {:?}", input, f.eval(&[2.0]));
/// ```
pub mod parse_expr;
/// turns a symbolic expression into a checked numeric evaluator
pub mod symbolic_lambdify;
/// analytical derivatives
pub mod symbolic_engine_derivatives;
/// constant folding and algebraic identities
pub mod symbolic_simplify;
/// ________________________________________________________________________________________________________________________________
/// # Expression compiler
/// user text -> tree + evaluator, rejected unless it evaluates at the representative point 0.5
///# Example
/// ```
/// use deriva_engine::symbolic::compiler::Expression;
/// let expression = Expression::compile("x^2 - 4").unwrap();
/// assert_eq!(expression.eval(3.0), Ok(5.0));
/// assert!(Expression::compile("sqrt(-1)").is_err());
/// ```
pub mod compiler;
/// closed-form roots of polynomials up to degree 3
pub mod symbolic_solve;
