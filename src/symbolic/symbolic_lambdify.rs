use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

/// Compiled form of an expression: variable names are resolved to positions once,
/// so evaluation walks the tree without any lookups.
#[derive(Clone, Debug, PartialEq)]
pub enum Lambda {
    /// the independent argument (x or t)
    Arg,
    /// position in the state slice
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
    Ctg(Box<Lambda>),
    ArcSin(Box<Lambda>),
    ArcCos(Box<Lambda>),
    ArcTg(Box<Lambda>),
    ArcCtg(Box<Lambda>),
}

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions

    /// Compiles the expression for functions of the form f(arg, vars[0], vars[1], ...).
    ///
    /// Fails if the expression contains a derivative term or a symbol that is neither
    /// `arg` nor one of `vars`.
    pub fn compile_IVP(&self, arg: &str, vars: &[&str]) -> Result<Lambda, String> {
        let un = |e: &Expr| e.compile_IVP(arg, vars).map(Box::new);
        let lambda = match self {
            Expr::Var(name) if name == arg => Lambda::Arg,
            Expr::Var(name) => match vars.iter().position(|v| v == name) {
                Some(idx) => Lambda::Var(idx),
                None => return Err(format!("unknown symbol {}", name)),
            },
            Expr::Deriv(_, _) => {
                return Err(format!("derivative {} cannot be evaluated numerically", self));
            }
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Add(a, b) => Lambda::Add(un(a)?, un(b)?),
            Expr::Sub(a, b) => Lambda::Sub(un(a)?, un(b)?),
            Expr::Mul(a, b) => Lambda::Mul(un(a)?, un(b)?),
            Expr::Div(a, b) => Lambda::Div(un(a)?, un(b)?),
            Expr::Pow(a, b) => Lambda::Pow(un(a)?, un(b)?),
            Expr::Exp(e) => Lambda::Exp(un(e)?),
            Expr::Ln(e) => Lambda::Ln(un(e)?),
            Expr::sin(e) => Lambda::Sin(un(e)?),
            Expr::cos(e) => Lambda::Cos(un(e)?),
            Expr::tg(e) => Lambda::Tg(un(e)?),
            Expr::ctg(e) => Lambda::Ctg(un(e)?),
            Expr::arcsin(e) => Lambda::ArcSin(un(e)?),
            Expr::arccos(e) => Lambda::ArcCos(un(e)?),
            Expr::arctg(e) => Lambda::ArcTg(un(e)?),
            Expr::arcctg(e) => Lambda::ArcCtg(un(e)?),
        };
        Ok(lambda)
    }

    /// Creates closure specialized for Initial Value Problems, f(arg, state) where the state
    /// slice holds `vars` in order.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("t + y1 + y2").unwrap();
    /// let func = expr.lambdify_IVP_owned("t", &["y1", "y2"]).unwrap();
    /// assert_eq!(func(1.0, &[2.0, 3.0]), 6.0);
    /// ```
    pub fn lambdify_IVP_owned(
        self,
        arg: &str,
        vars: &[&str],
    ) -> Result<Box<dyn Fn(f64, &[f64]) -> f64 + Send + Sync>, String> {
        let compiled = self.compile_IVP(arg, vars)?;
        Ok(Box::new(move |x, y| compiled.eval(x, y)))
    }

    /// evaluates a one-argument expression, mostly useful for quick checks
    pub fn lambdify1D(&self, arg: &str) -> Result<Box<dyn Fn(f64) -> f64 + Send + Sync>, String> {
        let compiled = self.compile_IVP(arg, &[])?;
        Ok(Box::new(move |x| compiled.eval(x, &[])))
    }
}

impl Lambda {
    #[inline(always)]
    pub fn eval(&self, x: f64, y: &[f64]) -> f64 {
        match self {
            Lambda::Arg => x,
            Lambda::Var(i) => y[*i],
            Lambda::Const(v) => *v,
            Lambda::Add(a, b) => a.eval(x, y) + b.eval(x, y),
            Lambda::Sub(a, b) => a.eval(x, y) - b.eval(x, y),
            Lambda::Mul(a, b) => a.eval(x, y) * b.eval(x, y),
            Lambda::Div(a, b) => a.eval(x, y) / b.eval(x, y),
            Lambda::Pow(a, b) => pow(a.eval(x, y), b.eval(x, y)),
            Lambda::Exp(e) => e.eval(x, y).exp(),
            Lambda::Ln(e) => e.eval(x, y).ln(),
            Lambda::Sin(e) => e.eval(x, y).sin(),
            Lambda::Cos(e) => e.eval(x, y).cos(),
            Lambda::Tg(e) => e.eval(x, y).tan(),
            Lambda::Ctg(e) => 1.0 / e.eval(x, y).tan(),
            Lambda::ArcSin(e) => e.eval(x, y).asin(),
            Lambda::ArcCos(e) => e.eval(x, y).acos(),
            Lambda::ArcTg(e) => e.eval(x, y).atan(),
            Lambda::ArcCtg(e) => (PI / 2.0) - e.eval(x, y).atan(),
        }
    }
}

// integer exponents go through powi so that negative bases stay real
#[inline(always)]
fn pow(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lambdify_IVP_positional_arguments() {
        let expr = Expr::parse_expression("t + 2*y1 + 3*y2").unwrap();
        let func = expr.lambdify_IVP_owned("t", &["y1", "y2"]).unwrap();
        assert_relative_eq!(func(1.0, &[2.0, 3.0]), 14.0);
    }

    #[test]
    fn test_lambdify_second_order_rhs() {
        let expr = Expr::parse_expression("1 + 2*x*Y0 - x^2*Y1").unwrap();
        let func = expr.lambdify_IVP_owned("x", &["Y0", "Y1"]).unwrap();
        // 1 + 2*0.5*2 - 0.25*4
        assert_relative_eq!(func(0.5, &[2.0, 4.0]), 2.0);
    }

    #[test]
    fn test_negative_base_integer_power() {
        let f = Expr::parse_expression("x^3").unwrap().lambdify1D("x").unwrap();
        assert_relative_eq!(f(-2.0), -8.0);
        let g = Expr::parse_expression("x^(-2)").unwrap().lambdify1D("x").unwrap();
        assert_relative_eq!(g(-2.0), 0.25);
    }

    #[test]
    fn test_functions_evaluate() {
        let f = Expr::parse_expression("exp(x) + ln(x) + sin(x)^2 + cos(x)^2 + arctg(x) + arcctg(x)")
            .unwrap()
            .lambdify1D("x")
            .unwrap();
        let x: f64 = 1.5;
        assert_relative_eq!(f(x), x.exp() + x.ln() + 1.0 + PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compile_rejects_unknown_symbol_and_derivative() {
        let expr = Expr::parse_expression("x + z").unwrap();
        assert!(expr.compile_IVP("x", &["Y0"]).is_err());
        let expr = Expr::parse_expression("x + y'").unwrap();
        assert!(expr.compile_IVP("x", &["y"]).is_err());
    }

    #[test]
    fn test_compiled_tree_shape() {
        let expr = Expr::parse_expression("x*Y1").unwrap();
        let compiled = expr.compile_IVP("x", &["Y0", "Y1"]).unwrap();
        assert_eq!(
            compiled,
            Lambda::Mul(Box::new(Lambda::Arg), Box::new(Lambda::Var(1)))
        );
    }
}
