/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedRK4::symbolic::symbolic_engine::Expr;
/// let input = "x^2*y'' + sin(x)*y";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.max_derivative_order("y"), Some(2));
///  ```
pub mod parse_expr;
/// # Symbolic engine
/// symbolic expressions with derivative terms y', y'', ..., substitution of variables and derivatives
pub mod symbolic_engine;
/// turns a symbolic expression into a Rust function
///# Example#
/// ```
/// use RustedRK4::symbolic::symbolic_engine::Expr;
/// let expr = Expr::parse_expression("x + 2*Y0 - Y1").unwrap();
/// let f = expr.lambdify_IVP_owned("x", &["Y0", "Y1"]).unwrap();
/// assert_eq!(f(1.0, &[2.0, 3.0]), 2.0);
/// ```
pub mod symbolic_lambdify;
