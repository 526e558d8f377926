//! # Symbolic Engine Module
//!
//! Symbolic expressions used to describe an ordinary differential equation before it is
//! turned into a numeric right-hand side.
//!
//! ## Purpose
//!
//! The engine allows users to:
//! - Build expressions with ordinary Rust operators (`x + y * z`)
//! - Refer to an unknown function and its derivatives (`y`, `y'`, `y''`, ...)
//! - Substitute symbols and derivatives with other expressions
//! - Inspect free symbols and remaining derivative terms
//! - Convert an expression into an executable closure (see `symbolic_lambdify`)
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "Y0"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Derivatives**: `Deriv(String, usize)` - k-th derivative of an unknown function,
//!   `Deriv("y", 0)` is the function itself written as `y(x)`
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, etc. - mathematical functions
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - Create multiple variables from comma-separated string
//! - `IndexedVars(n, name)` - Create indexed variables (Y0, Y1, ...)
//! - `substitute_variable()` / `substitute_derivative()` - replace leaves with expressions
//! - `all_arguments_are_variables()` - sorted list of free symbols
//! - `derivatives()` - derivative terms still present in the expression
//!
//! Trigonometric functions use the mathematical notation (tg, ctg, arctg) for the variant names.

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// use symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let y1 = Expr::Deriv("y".to_string(), 1);
/// let expr = x * y1 + Expr::Const(2.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "Y0")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Derivative of given order of an unknown function of the argument
    Deriv(String, usize),
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
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    tg(Box<Expr>),
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    arctg(Box<Expr>),
    arcctg(Box<Expr>),
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Derivatives are printed in prime notation, so the output can be parsed back.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Deriv(name, 0) => write!(f, "{}", name),
            Expr::Deriv(name, order) => write!(f, "{}{}", name, "'".repeat(*order)),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
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

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Creates the k-th derivative of the unknown function `name`
    pub fn Derivative(name: &str, order: usize) -> Expr {
        Expr::Deriv(name.to_string(), order)
    }

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

    /// direct subexpressions of the node, leaves have none
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Deriv(_, _) => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            Expr::Exp(e)
            | Expr::Ln(e)
            | Expr::sin(e)
            | Expr::cos(e)
            | Expr::tg(e)
            | Expr::ctg(e)
            | Expr::arcsin(e)
            | Expr::arccos(e)
            | Expr::arctg(e)
            | Expr::arcctg(e) => vec![e.as_ref()],
        }
    }

    /// rebuilds the node applying `f` to every direct subexpression; leaves are cloned
    fn map_children<F: Fn(&Expr) -> Expr>(&self, f: &F) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Deriv(_, _) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            Expr::Exp(e) => Expr::Exp(f(e).boxed()),
            Expr::Ln(e) => Expr::Ln(f(e).boxed()),
            Expr::sin(e) => Expr::sin(f(e).boxed()),
            Expr::cos(e) => Expr::cos(f(e).boxed()),
            Expr::tg(e) => Expr::tg(f(e).boxed()),
            Expr::ctg(e) => Expr::ctg(f(e).boxed()),
            Expr::arcsin(e) => Expr::arcsin(f(e).boxed()),
            Expr::arccos(e) => Expr::arccos(f(e).boxed()),
            Expr::arctg(e) => Expr::arctg(f(e).boxed()),
            Expr::arcctg(e) => Expr::arcctg(f(e).boxed()),
        }
    }

    //___________________________________SUBSTITUTION____________________________________

    /// Substitutes a variable with an expression throughout the expression tree.
    ///
    /// # Arguments
    /// * `var` - Name of the variable to substitute
    /// * `expr` - Replacement expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            _ => self.map_children(&|e| e.substitute_variable(var, expr)),
        }
    }

    /// Substitutes the derivative of order `order` of function `func` with an expression.
    /// Order 0 matches the function written as `y(x)`; a bare `y` is a `Var` and is
    /// handled by `substitute_variable`.
    pub fn substitute_derivative(&self, func: &str, order: usize, expr: &Expr) -> Expr {
        match self {
            Expr::Deriv(name, k) if name == func && *k == order => expr.clone(),
            _ => self.map_children(&|e| e.substitute_derivative(func, order, expr)),
        }
    }

    //___________________________________INSPECTION____________________________________

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            _ => self
                .children()
                .iter()
                .any(|e| e.contains_variable(var_name)),
        }
    }

    /// Returns the sorted, deduplicated names of all free variables.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars.into_iter().collect()
    }

    fn collect_variables(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            _ => {
                for child in self.children() {
                    child.collect_variables(vars);
                }
            }
        }
    }

    /// All derivative terms `(function, order)` present in the expression, sorted, without repeats.
    pub fn derivatives(&self) -> Vec<(String, usize)> {
        let mut found = BTreeSet::new();
        self.collect_derivatives(&mut found);
        found.into_iter().collect()
    }

    fn collect_derivatives(&self, found: &mut BTreeSet<(String, usize)>) {
        match self {
            Expr::Deriv(name, order) => {
                found.insert((name.clone(), *order));
            }
            _ => {
                for child in self.children() {
                    child.collect_derivatives(found);
                }
            }
        }
    }

    pub fn contains_derivative(&self) -> bool {
        match self {
            Expr::Deriv(_, _) => true,
            _ => self.children().iter().any(|e| e.contains_derivative()),
        }
    }

    /// highest derivative order of `func` found in the expression, None if `func` does not occur
    /// as a derivative term
    pub fn max_derivative_order(&self, func: &str) -> Option<usize> {
        self.derivatives()
            .into_iter()
            .filter(|(name, _)| name == func)
            .map(|(_, order)| order)
            .max()
    }

    //__________________________________INDEXED VARIABLES____________________________________

    /// Creates a single indexed variable with format "name + index" (e.g., "Y5").
    pub fn IndexedVar(index: usize, var_name: &str) -> Expr {
        Expr::Var(format!("{}{}", var_name, index))
    }

    /// Creates indexed variables Y0, Y1, ... and their names.
    ///
    /// # Returns
    /// Tuple of (Vec<Expr>, Vec<String>) containing expressions and names
    pub fn IndexedVars(num_vars: usize, var_name: &str) -> (Vec<Expr>, Vec<String>) {
        let vec_of_names: Vec<String> = (0..num_vars)
            .map(|i| format!("{}{}", var_name, i))
            .collect();
        let vec_of_expr = vec_of_names.iter().map(|n| Expr::Var(n.clone())).collect();
        (vec_of_expr, vec_of_names)
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        {
            let var_names = stringify!($($var),+);
            let vars = $crate::symbolic::symbolic_engine::Expr::Symbols(var_names);
            let mut iter = vars.into_iter();
            ($(
                {
                    let $var = iter.next().unwrap();
                    $var
                }
            ),+)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_macro_and_operators() {
        let (x, y) = symbols!(x, y);
        let expr = x.clone() * y.clone() + Expr::Const(1.0);
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Mul(Box::new(x), Box::new(y))),
                Box::new(Expr::Const(1.0))
            )
        );
    }

    #[test]
    fn test_substitute_derivative_only_matching_order() {
        let x = Expr::Var("x".to_string());
        let expr = x * Expr::Derivative("y", 1) + Expr::Derivative("y", 2);
        let replaced = expr.substitute_derivative("y", 1, &Expr::Var("Y1".to_string()));
        assert!(replaced.contains_variable("Y1"));
        assert_eq!(replaced.derivatives(), vec![("y".to_string(), 2)]);
    }

    #[test]
    fn test_substitute_variable_inside_functions() {
        let expr = Expr::Var("y".to_string()).exp().ln();
        let replaced = expr.substitute_variable("y", &Expr::Var("Y0".to_string()));
        assert_eq!(replaced.all_arguments_are_variables(), vec!["Y0".to_string()]);
    }

    #[test]
    fn test_all_arguments_sorted_and_unique() {
        let (b, a) = symbols!(b, a);
        let expr = b.clone() * a.clone().pow(b) + a;
        assert_eq!(
            expr.all_arguments_are_variables(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_max_derivative_order() {
        let expr = Expr::Derivative("y", 1) * Expr::Derivative("y", 3) + Expr::Derivative("z", 5);
        assert_eq!(expr.max_derivative_order("y"), Some(3));
        assert_eq!(expr.max_derivative_order("w"), None);
        assert!(expr.contains_derivative());
        assert!(!Expr::Var("y".to_string()).contains_derivative());
    }

    #[test]
    fn test_display_uses_prime_notation() {
        let expr = Expr::Derivative("y", 2) - Expr::Derivative("y", 0);
        assert_eq!(format!("{}", expr), "(y'' - y)");
    }

    #[test]
    fn test_indexed_vars_names_match_expressions() {
        let (exprs, names) = Expr::IndexedVars(3, "Y");
        assert_eq!(names, vec!["Y0", "Y1", "Y2"]);
        assert_eq!(exprs[2], Expr::Var("Y2".to_string()));
        assert_eq!(Expr::IndexedVar(7, "Y"), Expr::Var("Y7".to_string()));
    }
}
