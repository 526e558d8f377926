//! Reduction of an nth-order scalar ODE y^(n) = f(x, y, y', ..., y^(n-1)) to a first-order
//! system over the state [Y0, Y1, ..., Y{n-1}] = [y, y', ..., y^(n-1)].
//!
//! Example#
//! ```
//! use RustedRK4::numerical::order_reduction::{OdeSpec, reduce_to_first_order};
//! let spec = OdeSpec::parse("y'' = 1 + 2*x*y - x^2*y'", 2).unwrap();
//! let (f, placeholders) = reduce_to_first_order(&spec).unwrap();
//! assert_eq!(placeholders.len(), 2);
//! assert_eq!(f(0.0, &[1.0, 0.0]), 1.0);
//! ```
use crate::errors::OdeError;
use crate::symbolic::parse_expr::parse_equation;
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info};

/// numeric right-hand side f(x, [Y0, ..., Y{n-1}]) of the highest-derivative equation
pub type RhsFunction = Box<dyn Fn(f64, &[f64]) -> f64 + Send + Sync>;

/// prefix of the state placeholders Y0, Y1, ...
pub const PLACEHOLDER_PREFIX: &str = "Y";

/// symbolic nth-order ODE: `expr` is the right-hand side of function^(order) = expr
#[derive(Clone, Debug, PartialEq)]
pub struct OdeSpec {
    pub expr: Expr,
    pub order: usize,
    /// name of the unknown function
    pub function: String,
    /// name of the independent argument
    pub arg: String,
}

impl OdeSpec {
    /// ODE for the function `y` of the argument `x`
    pub fn new(expr: Expr, order: usize) -> OdeSpec {
        OdeSpec {
            expr,
            order,
            function: "y".to_string(),
            arg: "x".to_string(),
        }
    }

    pub fn with_names(mut self, function: &str, arg: &str) -> OdeSpec {
        self.function = function.to_string();
        self.arg = arg.to_string();
        self
    }

    /// parses `"y'' = rhs"` or a bare right-hand side `"rhs"` for the function `y` of `x`
    pub fn parse(input: &str, order: usize) -> Result<OdeSpec, OdeError> {
        OdeSpec::parse_with_names(input, order, "y", "x")
    }

    /// parses an ODE written for the given function and argument names. In the equation form
    /// the left side must be exactly the derivative of the declared order.
    pub fn parse_with_names(
        input: &str,
        order: usize,
        function: &str,
        arg: &str,
    ) -> Result<OdeSpec, OdeError> {
        let (lhs, rhs) = parse_equation(input).map_err(OdeError::Parse)?;
        if let Some(lhs) = lhs {
            let expected = Expr::Derivative(function, order);
            if lhs != expected {
                return Err(OdeError::Reduction(format!(
                    "left-hand side {} is not {}, the derivative of order {} of {}",
                    lhs, expected, order, function
                )));
            }
        }
        Ok(OdeSpec::new(rhs, order).with_names(function, arg))
    }
}

/// Substitutes y, y', ..., y^(n-1) with the placeholders Y0..Y{n-1} and compiles the result into
/// a closure taking x followed by the placeholders.
///
/// # Returns
/// the compiled right-hand side and the placeholder symbols
pub fn reduce_to_first_order(spec: &OdeSpec) -> Result<(RhsFunction, Vec<Expr>), OdeError> {
    let order = spec.order;
    if order == 0 {
        return Err(OdeError::Reduction(
            "order of the ODE must be at least 1".to_string(),
        ));
    }
    if spec.function == spec.arg {
        return Err(OdeError::Reduction(format!(
            "function and argument share the name {}",
            spec.arg
        )));
    }
    let (placeholders, names) = Expr::IndexedVars(order, PLACEHOLDER_PREFIX);
    if let Some(clash) = names.iter().find(|name| {
        spec.expr.contains_variable(name) || **name == spec.function || **name == spec.arg
    }) {
        return Err(OdeError::Reduction(format!(
            "symbol {} is reserved for the state vector",
            clash
        )));
    }

    let mut reduced = spec.expr.substitute_variable(&spec.function, &placeholders[0]);
    for (k, placeholder) in placeholders.iter().enumerate() {
        reduced = reduced.substitute_derivative(&spec.function, k, placeholder);
    }

    if let Some((name, k)) = reduced.derivatives().into_iter().next() {
        let msg = if name == spec.function {
            format!(
                "derivative of order {} of {} remains, the ODE is declared of order {}",
                k, name, order
            )
        } else {
            format!("derivative of unknown function {} remains", name)
        };
        return Err(OdeError::Reduction(msg));
    }
    let unresolved: Vec<String> = reduced
        .all_arguments_are_variables()
        .into_iter()
        .filter(|v| *v != spec.arg && !names.contains(v))
        .collect();
    if !unresolved.is_empty() {
        return Err(OdeError::Reduction(format!(
            "unresolved symbols {:?}, only {} and the state may appear",
            unresolved, spec.arg
        )));
    }
    debug!("reduced right-hand side: {}", reduced);

    let vars: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
    let f = reduced
        .lambdify_IVP_owned(&spec.arg, &vars)
        .map_err(OdeError::Reduction)?;
    info!(
        "ODE of order {} for {}({}) reduced to a first-order system over {:?}",
        order, spec.function, spec.arg, names
    );
    Ok((f, placeholders))
}

/// shortcut for an expression in `y` and `x`
pub fn reduce_to_first_order_expr(
    expr: Expr,
    order: usize,
) -> Result<(RhsFunction, Vec<Expr>), OdeError> {
    reduce_to_first_order(&OdeSpec::new(expr, order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reduce_second_order() {
        let spec = OdeSpec::parse("1 + 2*x*y - x^2*y'", 2).unwrap();
        let (f, placeholders) = reduce_to_first_order(&spec).unwrap();
        assert_eq!(
            placeholders,
            vec![Expr::Var("Y0".to_string()), Expr::Var("Y1".to_string())]
        );
        // 1 + 2*2*3 - 4*5
        assert_relative_eq!(f(2.0, &[3.0, 5.0]), -7.0);
    }

    #[test]
    fn test_reduce_function_call_notation() {
        let spec = OdeSpec::parse("diff(y(x), x, 2) = -y(x) + diff(y(x), x)", 2).unwrap();
        let (f, _) = reduce_to_first_order(&spec).unwrap();
        assert_relative_eq!(f(0.0, &[1.0, 4.0]), 3.0);
    }

    #[test]
    fn test_reduce_first_order() {
        let spec = OdeSpec::parse("y' = x*y", 1).unwrap();
        let (f, placeholders) = reduce_to_first_order(&spec).unwrap();
        assert_eq!(placeholders.len(), 1);
        assert_relative_eq!(f(3.0, &[2.0]), 6.0);
    }

    #[test]
    fn test_reduce_custom_names() {
        let spec = OdeSpec::parse_with_names("u'' = -t*u", 2, "u", "t").unwrap();
        let (f, _) = reduce_to_first_order(&spec).unwrap();
        assert_relative_eq!(f(2.0, &[3.0, 0.0]), -6.0);
    }

    #[test]
    fn test_reduce_expr_shortcut() {
        let expr = -Expr::Var("y".to_string());
        let (f, _) = reduce_to_first_order_expr(expr, 3).unwrap();
        assert_relative_eq!(f(0.0, &[2.0, 0.0, 0.0]), -2.0);
    }

    #[test]
    fn test_zero_order_rejected() {
        let spec = OdeSpec::new(Expr::Const(1.0), 0);
        assert!(matches!(
            reduce_to_first_order(&spec),
            Err(OdeError::Reduction(_))
        ));
    }

    #[test]
    fn test_unresolved_derivative_rejected() {
        // y'' on the right of a second-order equation cannot be expressed through Y0, Y1
        let spec = OdeSpec::parse("x + y''", 2).unwrap();
        assert!(matches!(
            reduce_to_first_order(&spec),
            Err(OdeError::Reduction(_))
        ));
        let spec = OdeSpec::parse("x + z'", 2).unwrap();
        assert!(matches!(
            reduce_to_first_order(&spec),
            Err(OdeError::Reduction(_))
        ));
    }

    #[test]
    fn test_foreign_symbol_rejected() {
        let spec = OdeSpec::parse("x + a*y", 1).unwrap();
        assert!(matches!(
            reduce_to_first_order(&spec),
            Err(OdeError::Reduction(_))
        ));
    }

    #[test]
    fn test_lhs_order_mismatch_rejected() {
        let res = OdeSpec::parse("y''' = y", 2);
        assert!(matches!(res, Err(OdeError::Reduction(_))));
        let res = OdeSpec::parse("z'' = y", 2);
        assert!(matches!(res, Err(OdeError::Reduction(_))));
    }

    #[test]
    fn test_placeholder_clash_rejected() {
        let spec = OdeSpec::parse("Y0 + y", 1).unwrap();
        assert!(matches!(
            reduce_to_first_order(&spec),
            Err(OdeError::Reduction(_))
        ));
    }

    #[test]
    fn test_malformed_equation_is_parse_error() {
        assert!(matches!(OdeSpec::parse("y'' = (x", 2), Err(OdeError::Parse(_))));
    }
}
