//! turns a String expression into a symbolic expression
//!
//! Grammar (lowest precedence first):
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := '-' unary | '+' unary | power
//! power   := atom (('^' | '**') unary)?          right associative
//! atom    := number | call | symbol | '(' sum ')'
//! call    := name '(' sum (',' sum)* ')'
//! symbol  := name '\''*                           y, y', y'', ...
//! ```
//! Calls of known functions (exp, ln/log, sqrt, sin, cos, tg/tan, ctg/cot, arcsin/asin,
//! arccos/acos, arctg/atan, arcctg/acot) build the matching node. `diff(y, x)` and
//! `diff(y, x, k)` build derivatives. Any other name applied to a single symbol, like `y(x)`,
//! is the unknown function itself.
//!
//! # Example
//! ```
//! use RustedRK4::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("1 + 2*x*y - x^2*y'").unwrap();
//! assert_eq!(parsed_expression.derivatives(), vec![("y".to_string(), 1)]);
//! ```
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded},
};

/// strips whitespace around the inner parser
fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Expr> {
    map_res(recognize_float, |s: &str| s.parse::<f64>().map(Expr::Const)).parse(input)
}

fn parse_diff(args: Vec<Expr>) -> Result<Expr, String> {
    let (target, order) = match args.as_slice() {
        [target, Expr::Var(_)] => (target, 1),
        [target, Expr::Var(_), Expr::Const(k)] if *k >= 0.0 && k.fract() == 0.0 => {
            (target, *k as usize)
        }
        _ => return Err("diff expects diff(f, x) or diff(f, x, k)".to_string()),
    };
    match target {
        Expr::Var(name) => Ok(Expr::Deriv(name.clone(), order)),
        Expr::Deriv(name, k) => Ok(Expr::Deriv(name.clone(), k + order)),
        other => Err(format!("cannot differentiate {}", other)),
    }
}

fn build_call(name: &str, mut args: Vec<Expr>) -> Result<Expr, String> {
    if name == "diff" {
        return parse_diff(args);
    }
    if args.len() != 1 {
        return Err(format!("{} expects exactly one argument", name));
    }
    let arg = args.remove(0).boxed();
    let expr = match name {
        "exp" => Expr::Exp(arg),
        "ln" | "log" => Expr::Ln(arg),
        "sqrt" => Expr::Pow(arg, Expr::Const(0.5).boxed()),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tg" | "tan" => Expr::tg(arg),
        "ctg" | "cot" => Expr::ctg(arg),
        "arcsin" | "asin" => Expr::arcsin(arg),
        "arccos" | "acos" => Expr::arccos(arg),
        "arctg" | "atan" => Expr::arctg(arg),
        "arcctg" | "acot" => Expr::arcctg(arg),
        // y(x): the unknown function itself
        _ => match *arg {
            Expr::Var(_) => Expr::Deriv(name.to_string(), 0),
            other => {
                return Err(format!(
                    "unknown function {} applied to {}, expected a single symbol",
                    name, other
                ));
            }
        },
    };
    Ok(expr)
}

fn parse_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (rest, args) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), parse_sum),
        ws(char(')')),
    )
    .parse(rest)?;
    match build_call(name, args) {
        Ok(expr) => Ok((rest, expr)),
        Err(_) => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
    }
}

fn parse_symbol(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (rest, primes) = many0(char('\'')).parse(rest)?;
    let expr = if primes.is_empty() {
        Expr::Var(name.to_string())
    } else {
        Expr::Deriv(name.to_string(), primes.len())
    };
    Ok((rest, expr))
}

fn parse_parens(input: &str) -> IResult<&str, Expr> {
    delimited(ws(char('(')), parse_sum, ws(char(')'))).parse(input)
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((parse_number, parse_call, parse_symbol, parse_parens))).parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (rest, base) = parse_atom(input)?;
    let (rest, exponent) =
        opt(preceded(ws(alt((tag("**"), tag("^")))), parse_unary)).parse(rest)?;
    let expr = match exponent {
        Some(exponent) => base.pow(exponent),
        None => base,
    };
    Ok((rest, expr))
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('-')), parse_unary), |e: Expr| -e),
        preceded(ws(char('+')), parse_unary),
        parse_power,
    ))
    .parse(input)
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = parse_unary(input)?;
    let (rest, tail) = many0(pair(ws(one_of("*/")), parse_unary)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => acc * rhs,
        _ => acc / rhs,
    });
    Ok((rest, expr))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (rest, first) = parse_product(input)?;
    let (rest, tail) = many0(pair(ws(one_of("+-")), parse_product)).parse(rest)?;
    let expr = tail.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    });
    Ok((rest, expr))
}

/// parses the whole input as one expression
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    match all_consuming(parse_sum).parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(format!(
            "could not parse '{}' near '{}'",
            input.trim(),
            e.input.trim()
        )),
        Err(nom::Err::Incomplete(_)) => Err(format!("incomplete expression '{}'", input.trim())),
    }
}

/// parses either a bare expression or an equation `lhs = rhs`
pub fn parse_equation(input: &str) -> Result<(Option<Expr>, Expr), String> {
    let parts: Vec<&str> = input.split('=').collect();
    match parts.as_slice() {
        [rhs] => Ok((None, parse_expression_func(rhs)?)),
        [lhs, rhs] => Ok((
            Some(parse_expression_func(lhs)?),
            parse_expression_func(rhs)?,
        )),
        _ => Err(format!("more than one '=' in '{}'", input.trim())),
    }
}

impl Expr {
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        parse_expression_func(input)
    }

    pub fn parse_vector_expression(inputs: Vec<&str>) -> Result<Vec<Expr>, String> {
        inputs.into_iter().map(parse_expression_func).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_parse_second_order_rhs() {
        let parsed = Expr::parse_expression("1 + 2*x*y - x^2*y'").unwrap();
        let x = var("x");
        let expected = Expr::Const(1.0) + Expr::Const(2.0) * x.clone() * var("y")
            - x.pow(Expr::Const(2.0)) * Expr::Derivative("y", 1);
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_prime_notation() {
        assert_eq!(Expr::parse_expression("y'''").unwrap(), Expr::Derivative("y", 3));
        assert_eq!(Expr::parse_expression("y").unwrap(), var("y"));
    }

    #[test]
    fn test_parse_diff_and_function_call() {
        assert_eq!(
            Expr::parse_expression("diff(y, x, 3)").unwrap(),
            Expr::Derivative("y", 3)
        );
        assert_eq!(
            Expr::parse_expression("diff(y', x)").unwrap(),
            Expr::Derivative("y", 2)
        );
        assert_eq!(
            Expr::parse_expression("y(x)").unwrap(),
            Expr::Derivative("y", 0)
        );
    }

    #[test]
    fn test_unary_minus_binds_weaker_than_power() {
        let parsed = Expr::parse_expression("-x^2").unwrap();
        assert_eq!(parsed, -(var("x").pow(Expr::Const(2.0))));
    }

    #[test]
    fn test_power_is_right_associative() {
        let parsed = Expr::parse_expression("2^3^2").unwrap();
        let expected = Expr::Const(2.0).pow(Expr::Const(3.0).pow(Expr::Const(2.0)));
        assert_eq!(parsed, expected);
        assert_eq!(
            Expr::parse_expression("x**2").unwrap(),
            Expr::parse_expression("x^2").unwrap()
        );
    }

    #[test]
    fn test_parse_functions() {
        let parsed = Expr::parse_expression("exp(-x) + sin(y) / cos(y)").unwrap();
        let expected = (-var("x")).exp() + Expr::sin(var("y").boxed()) / Expr::cos(var("y").boxed());
        assert_eq!(parsed, expected);
        assert_eq!(
            Expr::parse_expression("sqrt(x)").unwrap(),
            var("x").pow(Expr::Const(0.5))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expr::parse_expression("2*(x+1").is_err());
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("foo(x+1)").is_err());
        assert!(Expr::parse_expression("diff(y, x, 1.5)").is_err());
        assert!(Expr::parse_expression("2x").is_err());
    }

    #[test]
    fn test_parse_equation() {
        let (lhs, rhs) = parse_equation("y'' = -y").unwrap();
        assert_eq!(lhs, Some(Expr::Derivative("y", 2)));
        assert_eq!(rhs, -var("y"));
        let (lhs, _) = parse_equation("-y").unwrap();
        assert!(lhs.is_none());
        assert!(parse_equation("y' = y = 1").is_err());
    }

    #[test]
    fn test_parse_vector_expression() {
        let parsed = Expr::parse_vector_expression(vec!["Y1", "-Y0"]).unwrap();
        assert_eq!(parsed, vec![var("Y1"), -var("Y0")]);
    }
}
