//! Expression parsing and evaluation for tied parameters
//!
//! Tie expressions are small algebraic formulas over other parameters, e.g.
//! `2 * disk.r_eff` or `1 / nEinasto`. A variable is either
//! `component.parameter` or a bare `parameter` on the owning component.
//! Operators are `+ - * /` (left associative) and `^` or `**` (right
//! associative, binding tighter than unary minus).

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::recognize,
    error::{Error, ErrorKind},
    multi::many0,
    number::complete::double,
    sequence::{pair, preceded},
    IResult, Parser,
};
use std::collections::HashMap;
use thiserror::Error;

/// Error that can occur during expression parsing or evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Failed to parse expression: {message}")]
    ParseError { message: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },
}

/// Result type for expression evaluation
type ExprResult<T> = Result<T, ExpressionError>;

/// Expression AST node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant number
    Number(f64),

    /// Variable reference, possibly qualified as `component.parameter`
    Variable(String),

    /// Unary operations
    Unary(UnaryOp, Box<Expression>),

    /// Binary operations
    Binary(BinaryOp, Box<Expression>, Box<Expression>),

    /// Function call
    Function(String, Vec<Expression>),
}

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Context for expression evaluation, providing variable values
pub trait EvaluationContext {
    /// Get the value of a variable
    fn get_variable(&self, name: &str) -> ExprResult<f64>;

    /// Check if a variable exists
    fn has_variable(&self, name: &str) -> bool;
}

/// Simple implementation of EvaluationContext using a HashMap
#[derive(Debug, Clone, Default)]
pub struct SimpleContext {
    variables: HashMap<String, f64>,
}

impl SimpleContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }
}

impl EvaluationContext for SimpleContext {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.variables
            .get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }
}

impl Expression {
    /// Parse an expression from a string
    pub fn parse(input: &str) -> ExprResult<Self> {
        match sum(input) {
            Ok((remainder, expr)) => {
                if remainder.trim().is_empty() {
                    Ok(expr)
                } else {
                    Err(ExpressionError::ParseError {
                        message: format!("Unexpected trailing characters: '{}'", remainder.trim()),
                    })
                }
            }
            Err(e) => Err(ExpressionError::ParseError {
                message: format!("{:?}", e),
            }),
        }
    }

    /// Evaluate the expression with the given context
    pub fn evaluate<C: EvaluationContext + ?Sized>(&self, context: &C) -> ExprResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),

            Self::Variable(name) => context.get_variable(name),

            Self::Unary(UnaryOp::Neg, expr) => Ok(-expr.evaluate(context)?),

            Self::Binary(op, left, right) => {
                let lhs = left.evaluate(context)?;
                let rhs = right.evaluate(context)?;

                match op {
                    BinaryOp::Add => Ok(lhs + rhs),
                    BinaryOp::Sub => Ok(lhs - rhs),
                    BinaryOp::Mul => Ok(lhs * rhs),
                    BinaryOp::Div if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
                    BinaryOp::Div => Ok(lhs / rhs),
                    BinaryOp::Pow => Ok(lhs.powf(rhs)),
                }
            }

            Self::Function(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(context))
                    .collect::<ExprResult<Vec<f64>>>()?;
                apply_function(name, &values)
            }
        }
    }

    /// All variable names used in the expression, sorted and deduplicated
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => vars.push(name.clone()),
            Self::Unary(_, expr) => expr.collect_variables(vars),
            Self::Binary(_, left, right) => {
                left.collect_variables(vars);
                right.collect_variables(vars);
            }
            Self::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }
}

fn apply_function(name: &str, args: &[f64]) -> ExprResult<f64> {
    let single: Option<fn(f64) -> f64> = match name {
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "tan" => Some(f64::tan),
        "atan" => Some(f64::atan),
        "exp" => Some(f64::exp),
        "log" | "ln" => Some(f64::ln),
        "log10" => Some(f64::log10),
        "sqrt" => Some(f64::sqrt),
        "abs" => Some(f64::abs),
        _ => None,
    };

    if let Some(func) = single {
        return match args {
            [x] => Ok(func(*x)),
            _ => Err(ExpressionError::InvalidOperation {
                message: format!("{}() requires 1 argument, got {}", name, args.len()),
            }),
        };
    }

    match name {
        "pow" => match args {
            [base, exponent] => Ok(base.powf(*exponent)),
            _ => Err(ExpressionError::InvalidOperation {
                message: format!("pow() requires 2 arguments, got {}", args.len()),
            }),
        },
        "max" | "min" if args.len() < 2 => Err(ExpressionError::InvalidOperation {
            message: format!("{}() requires at least 2 arguments, got {}", name, args.len()),
        }),
        "max" => Ok(args.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))),
        "min" => Ok(args.iter().fold(f64::INFINITY, |a, &b| a.min(b))),
        _ => Err(ExpressionError::UndefinedFunction {
            name: name.to_string(),
        }),
    }
}

// Parser functions using nom

fn sp(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn symbol(input: &str, c: char) -> IResult<&str, char> {
    let (input, _) = sp(input)?;
    char(c).parse(input)
}

fn fail<T>(input: &str, kind: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Error(Error::new(input, kind)))
}

fn float(input: &str) -> IResult<&str, f64> {
    double(input)
}

/// One identifier segment: a letter or underscore followed by alphanumerics
fn segment(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// An identifier, optionally qualified with dots (`disk.r_eff`)
fn identifier(input: &str) -> IResult<&str, String> {
    let (input, matched) = recognize(pair(segment, many0(preceded(char('.'), segment)))).parse(input)?;
    Ok((input, matched.to_string()))
}

/// Parenthesized, comma separated call arguments
fn call_args(input: &str) -> IResult<&str, Vec<Expression>> {
    let (input, _) = symbol(input, '(')?;
    let (after, _) = sp(input)?;
    if let Some(rest) = after.strip_prefix(')') {
        return Ok((rest, Vec::new()));
    }

    let mut args = Vec::new();
    let mut input = input;
    loop {
        let (rest, arg) = sum(input)?;
        args.push(arg);
        let (rest, _) = sp(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            input = rest;
        } else if let Some(rest) = rest.strip_prefix(')') {
            return Ok((rest, args));
        } else {
            return fail(rest, ErrorKind::Char);
        }
    }
}

/// Number, function call, variable, or parenthesized expression
fn primary(input: &str) -> IResult<&str, Expression> {
    let (input, _) = sp(input)?;
    match input.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '.' => {
            let (rest, value) = float(input)?;
            Ok((rest, Expression::Number(value)))
        }
        Some('(') => {
            let (rest, _) = symbol(input, '(')?;
            let (rest, expr) = sum(rest)?;
            let (rest, _) = symbol(rest, ')')?;
            Ok((rest, expr))
        }
        _ => {
            let (rest, name) = identifier(input)?;
            let (after, _) = sp(rest)?;
            if after.starts_with('(') {
                let (rest, args) = call_args(after)?;
                Ok((rest, Expression::Function(name, args)))
            } else {
                Ok((rest, Expression::Variable(name)))
            }
        }
    }
}

/// Power with a right-associative, possibly negated exponent
fn power(input: &str) -> IResult<&str, Expression> {
    let (input, base) = primary(input)?;
    let (rest, _) = sp(input)?;
    let after = match rest.strip_prefix("**").or_else(|| rest.strip_prefix('^')) {
        Some(after) => after,
        None => return Ok((input, base)),
    };
    let (rest, exponent) = unary(after)?;
    Ok((
        rest,
        Expression::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)),
    ))
}

fn unary(input: &str) -> IResult<&str, Expression> {
    let (input, _) = sp(input)?;
    if let Some(rest) = input.strip_prefix('-') {
        let (rest, expr) = unary(rest)?;
        return Ok((rest, Expression::Unary(UnaryOp::Neg, Box::new(expr))));
    }
    if let Some(rest) = input.strip_prefix('+') {
        return unary(rest);
    }
    power(input)
}

/// Left-associative chain of `*` and `/`
fn product(input: &str) -> IResult<&str, Expression> {
    let (mut input, mut acc) = unary(input)?;
    loop {
        let (rest, _) = sp(input)?;
        let op = match rest.chars().next() {
            Some('*') => BinaryOp::Mul,
            Some('/') => BinaryOp::Div,
            _ => break,
        };
        let (rest, rhs) = unary(&rest[1..])?;
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = rest;
    }
    Ok((input, acc))
}

/// Left-associative chain of `+` and `-`
fn sum(input: &str) -> IResult<&str, Expression> {
    let (mut input, mut acc) = product(input)?;
    loop {
        let (rest, _) = sp(input)?;
        let op = match rest.chars().next() {
            Some('+') => BinaryOp::Add,
            Some('-') => BinaryOp::Sub,
            _ => break,
        };
        let (rest, rhs) = product(&rest[1..])?;
        acc = Expression::Binary(op, Box::new(acc), Box::new(rhs));
        input = rest;
    }
    Ok((input, acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, context: &SimpleContext) -> f64 {
        Expression::parse(source).unwrap().evaluate(context).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(Expression::parse("42").unwrap(), Expression::Number(42.0));
        assert_eq!(Expression::parse("3.14").unwrap(), Expression::Number(3.14));
        assert_eq!(Expression::parse("1e-3").unwrap(), Expression::Number(1e-3));
        assert_eq!(
            Expression::parse("-2.5").unwrap(),
            Expression::Unary(UnaryOp::Neg, Box::new(Expression::Number(2.5)))
        );
    }

    #[test]
    fn test_parse_qualified_variable() {
        assert_eq!(
            Expression::parse("disk.r_eff").unwrap(),
            Expression::Variable("disk.r_eff".to_string())
        );
        assert_eq!(
            Expression::parse("nEinasto").unwrap(),
            Expression::Variable("nEinasto".to_string())
        );
    }

    #[test]
    fn test_left_associativity() {
        let context = SimpleContext::new();
        assert_eq!(eval("10 - 4 - 3", &context), 3.0);
        assert_eq!(eval("64 / 4 / 2", &context), 8.0);
        assert_eq!(eval("2 - 3 + 4", &context), 3.0);
    }

    #[test]
    fn test_power_precedence() {
        let context = SimpleContext::new();
        assert_eq!(eval("2 ^ 3 ^ 2", &context), 512.0);
        assert_eq!(eval("2 ** 3", &context), 8.0);
        assert_eq!(eval("-2 ^ 2", &context), -4.0);
        assert_eq!(eval("2 ^ -1", &context), 0.5);
        assert_eq!(eval("3 * 2 ^ 2", &context), 12.0);
    }

    #[test]
    fn test_evaluate_with_context() {
        let mut context = SimpleContext::new();
        context.set_variable("halo.mvirial", 12.0);
        context.set_variable("x", 2.0);
        context.set_variable("y", 3.0);

        assert_eq!(eval("halo.mvirial - 1", &context), 11.0);
        assert_eq!(eval("2 * (x + 1) / (4 - y)", &context), 6.0);
        assert_eq!(eval("max(x, y, 5)", &context), 5.0);
        assert_eq!(eval("pow(x, y)", &context), 8.0);
        assert_eq!(eval("log10(100)", &context), 2.0);
        assert_eq!(eval("sqrt( 16 )", &context), 4.0);
    }

    #[test]
    fn test_evaluation_errors() {
        let context = SimpleContext::new();

        match Expression::parse("x").unwrap().evaluate(&context) {
            Err(ExpressionError::UndefinedVariable { name }) => assert_eq!(name, "x"),
            _ => panic!("Expected UndefinedVariable error"),
        }

        assert_eq!(
            Expression::parse("1 / 0").unwrap().evaluate(&context),
            Err(ExpressionError::DivisionByZero)
        );

        match Expression::parse("foo(1)").unwrap().evaluate(&context) {
            Err(ExpressionError::UndefinedFunction { name }) => assert_eq!(name, "foo"),
            _ => panic!("Expected UndefinedFunction error"),
        }

        assert!(matches!(
            Expression::parse("sin(1, 2)").unwrap().evaluate(&context),
            Err(ExpressionError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expression::parse("1 +").is_err());
        assert!(Expression::parse("(1 + 2").is_err());
        assert!(Expression::parse("1 2").is_err());
        assert!(Expression::parse("max(1, 2").is_err());
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            Expression::parse("b.x + a.y * x").unwrap().variables(),
            vec!["a.y".to_string(), "b.x".to_string(), "x".to_string()]
        );
        assert!(Expression::parse("sin(1) + 2").unwrap().variables().is_empty());
    }
}
