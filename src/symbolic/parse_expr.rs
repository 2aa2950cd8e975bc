//! a module turns a String expression into a symbolic expression
//!
//!# Example
//! ```
//! use RustedRoots::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("x^2 - 4").unwrap();
//! assert_eq!(parsed_expression.evaluate(3.0).unwrap(), 5.0);
//! ```
//!
//! Parsing is done in two passes: a `nom` tokenizer turns the text into positioned tokens,
//! then a recursive descent parser builds the tree. Precedence, from loosest to tightest:
//!
//!  |  level   | operators        | associativity |
//!  |----------|------------------|---------------|
//!  | sum      | `+` `-`          | left          |
//!  | product  | `*` `/`          | left          |
//!  | sign     | unary `-`        | prefix        |
//!  | power    | `^`              | right         |
//!  | primary  | number, `x`, `e`, `sin(..)`, `cos(..)`, `tan(..)`, `ln(..)`, `(..)` |  |
use crate::symbolic::symbolic_engine::{Expr, VARIABLE};
use log::debug;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{opt, recognize},
};
use std::f64::consts::E;
use std::fmt;

/// trees taller than this, or nested deeper, are rejected instead of risking the stack
const MAX_DEPTH: usize = 256;

/// Syntax errors reported by [`parse`]. Positions are byte offsets into the input.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    EmptyInput,
    UnknownToken { position: usize, token: String },
    InvalidNumber { position: usize, literal: String },
    UnbalancedParenthesis { position: usize },
    EmptyParentheses { position: usize },
    MalformedOperator { position: usize, operator: char },
    MissingOperand { position: usize, operator: char },
    ExpectedFunctionArgument { position: usize, function: String },
    TrailingInput { position: usize, token: String },
    NestingTooDeep { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "Syntax error: empty expression"),
            ParseError::UnknownToken { position, token } => {
                write!(f, "Syntax error: unknown token '{}' at {}", token, position)
            }
            ParseError::InvalidNumber { position, literal } => {
                write!(f, "Syntax error: invalid number '{}' at {}", literal, position)
            }
            ParseError::UnbalancedParenthesis { position } => {
                write!(f, "Syntax error: unbalanced parenthesis at {}", position)
            }
            ParseError::EmptyParentheses { position } => {
                write!(f, "Syntax error: empty parentheses at {}", position)
            }
            ParseError::MalformedOperator { position, operator } => write!(
                f,
                "Syntax error: operator '{}' at {} has no left operand",
                operator, position
            ),
            ParseError::MissingOperand { position, operator } => write!(
                f,
                "Syntax error: operator '{}' at {} has no right operand",
                operator, position
            ),
            ParseError::ExpectedFunctionArgument { position, function } => write!(
                f,
                "Syntax error: function '{}' at {} must be followed by a parenthesised argument",
                function, position
            ),
            ParseError::TrailingInput { position, token } => write!(
                f,
                "Syntax error: unexpected '{}' at {} after a complete expression",
                token, position
            ),
            ParseError::NestingTooDeep { position } => {
                write!(f, "Syntax error: expression nested too deeply at {}", position)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(val) => write!(f, "{}", val),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Op(op) => write!(f, "{}", op),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// token plus its byte offset in the source
type Spanned = (Token, usize);

/// parsed subtree and its height
type Parsed = (Expr, usize);

//___________________________________TOKENIZER____________________________________

/// Decimal literal: `12`, `1.`, `0.5`, `.5`, optionally followed by an exponent `E-4`/`e+3`.
/// An `e` without digits after it is left alone, it is the constant `e`.
/// Fraction digits go through `opt(digit1)`: `digit0` at end of input hands back a
/// remainder that `recognize` cannot measure, and the fraction would be lost.
fn number_literal(input: &str) -> IResult<&str, &str> {
    recognize((
        alt((
            recognize((digit1, opt((char('.'), opt(digit1))))),
            recognize((char('.'), digit1)),
        )),
        opt((one_of("eE"), opt(one_of("+-")), digit1)),
    ))
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphabetic()).parse(input)
}

fn operator(input: &str) -> IResult<&str, char> {
    one_of("+-*/^()").parse(input)
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = source;
    loop {
        let (after_ws, _) = multispace0::<&str, nom::error::Error<&str>>(rest)
            .map_err(|_| ParseError::EmptyInput)?;
        rest = after_ws;
        if rest.is_empty() {
            break;
        }
        let position = source.len() - rest.len();

        if let Ok((after, literal)) = number_literal(rest) {
            let value = literal
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber {
                    position,
                    literal: literal.to_string(),
                })?;
            tokens.push((Token::Number(value), position));
            rest = after;
        } else if let Ok((after, name)) = identifier(rest) {
            tokens.push((Token::Ident(name.to_string()), position));
            rest = after;
        } else if let Ok((after, op)) = operator(rest) {
            let token = match op {
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => Token::Op(other),
            };
            tokens.push((token, position));
            rest = after;
        } else {
            let token = rest.chars().next().map(String::from).unwrap_or_default();
            return Err(ParseError::UnknownToken { position, token });
        }
    }
    Ok(tokens)
}

//___________________________________PARSER____________________________________

struct ExpressionParser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn previous(&self) -> Option<&'a Spanned> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn next_is_op(&self, ops: &[char]) -> Option<(char, usize)> {
        match self.peek() {
            Some((Token::Op(op), position)) if ops.contains(op) => Some((*op, *position)),
            _ => None,
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep { position });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// height of a node built over children of the given heights, bounded by `MAX_DEPTH`
    fn node_height(children: usize, position: usize) -> Result<usize, ParseError> {
        let height = children + 1;
        if height > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep { position });
        }
        Ok(height)
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Parsed, ParseError> {
        let (mut lhs, mut height) = self.term()?;
        while let Some((op, position)) = self.next_is_op(&['+', '-']) {
            self.pos += 1;
            let (rhs, rhs_height) = self.term()?;
            height = Self::node_height(height.max(rhs_height), position)?;
            lhs = if op == '+' {
                Expr::Add(Box::new(lhs), Box::new(rhs))
            } else {
                Expr::Sub(Box::new(lhs), Box::new(rhs))
            };
        }
        Ok((lhs, height))
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Parsed, ParseError> {
        let (mut lhs, mut height) = self.unary()?;
        while let Some((op, position)) = self.next_is_op(&['*', '/']) {
            self.pos += 1;
            let (rhs, rhs_height) = self.unary()?;
            height = Self::node_height(height.max(rhs_height), position)?;
            lhs = if op == '*' {
                Expr::Mul(Box::new(lhs), Box::new(rhs))
            } else {
                Expr::Div(Box::new(lhs), Box::new(rhs))
            };
        }
        Ok((lhs, height))
    }

    // unary := '-' unary | power
    fn unary(&mut self) -> Result<Parsed, ParseError> {
        if let Some((_, position)) = self.next_is_op(&['-']) {
            self.pos += 1;
            self.enter(position)?;
            let operand = self.unary();
            self.leave();
            let (operand, height) = operand?;
            return Ok(match operand {
                Expr::Const(val) => (Expr::Const(-val), height),
                other => (
                    Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(other)),
                    Self::node_height(height, position)?,
                ),
            });
        }
        self.power()
    }

    // power := primary ('^' unary)?   right-assoc through unary -> power
    fn power(&mut self) -> Result<Parsed, ParseError> {
        let (base, base_height) = self.primary()?;
        if let Some((_, position)) = self.next_is_op(&['^']) {
            self.pos += 1;
            self.enter(position)?;
            let exponent = self.unary();
            self.leave();
            let (exponent, exponent_height) = exponent?;
            let height = Self::node_height(base_height.max(exponent_height), position)?;
            return Ok((Expr::Pow(Box::new(base), Box::new(exponent)), height));
        }
        Ok((base, base_height))
    }

    fn primary(&mut self) -> Result<Parsed, ParseError> {
        let Some((token, position)) = self.peek() else {
            return Err(self.missing_operand_error());
        };
        let position = *position;
        match token {
            Token::Number(val) => {
                self.pos += 1;
                Ok((Expr::Const(*val), 1))
            }
            Token::Ident(name) => {
                self.pos += 1;
                match name.as_str() {
                    VARIABLE => Ok((Expr::x(), 1)),
                    "e" => Ok((Expr::Const(E), 1)),
                    "sin" | "cos" | "tan" | "ln" => {
                        let (argument, height) = self.function_argument(name, position)?;
                        let argument = Box::new(argument);
                        let function = match name.as_str() {
                            "sin" => Expr::sin(argument),
                            "cos" => Expr::cos(argument),
                            "tan" => Expr::tg(argument),
                            _ => Expr::Ln(argument),
                        };
                        Ok((function, Self::node_height(height, position)?))
                    }
                    _ => Err(ParseError::UnknownToken {
                        position,
                        token: name.clone(),
                    }),
                }
            }
            Token::LParen => {
                self.pos += 1;
                self.group(position)
            }
            Token::RParen => Err(self.missing_operand_error()),
            Token::Op(op) => Err(ParseError::MalformedOperator {
                position,
                operator: *op,
            }),
        }
    }

    fn function_argument(&mut self, function: &str, position: usize) -> Result<Parsed, ParseError> {
        match self.peek() {
            Some((Token::LParen, paren_position)) => {
                self.pos += 1;
                self.group(*paren_position)
            }
            _ => Err(ParseError::ExpectedFunctionArgument {
                position,
                function: function.to_string(),
            }),
        }
    }

    /// parses what follows an opening parenthesis at `open_position`, up to and including `)`
    fn group(&mut self, open_position: usize) -> Result<Parsed, ParseError> {
        if let Some((Token::RParen, _)) = self.peek() {
            return Err(ParseError::EmptyParentheses {
                position: open_position,
            });
        }
        self.enter(open_position)?;
        let inner = self.expr();
        self.leave();
        let inner = inner?;
        match self.peek() {
            Some((Token::RParen, _)) => {
                self.pos += 1;
                Ok(inner)
            }
            Some((token, position)) => Err(ParseError::TrailingInput {
                position: *position,
                token: token.to_string(),
            }),
            None => Err(ParseError::UnbalancedParenthesis {
                position: open_position,
            }),
        }
    }

    /// An operand was expected but the input ended or a `)` came first.
    fn missing_operand_error(&self) -> ParseError {
        match (self.previous(), self.peek()) {
            (Some((Token::Op(op), position)), _) => ParseError::MissingOperand {
                position: *position,
                operator: *op,
            },
            (Some((Token::LParen, position)), None) => {
                ParseError::UnbalancedParenthesis { position: *position }
            }
            (_, Some((_, position))) => ParseError::UnbalancedParenthesis { position: *position },
            (_, None) => ParseError::EmptyInput,
        }
    }
}

/// Parses an infix expression in the variable `x` into an [`Expr`].
///
/// # Errors
/// Returns a [`ParseError`] for empty input, unknown tokens, unbalanced parentheses,
/// malformed operator sequences and trailing garbage after a complete expression.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    let mut parser = ExpressionParser::new(&tokens);
    let (expr, _) = parser.expr()?;
    if let Some((token, position)) = parser.peek() {
        return Err(match token {
            Token::RParen => ParseError::UnbalancedParenthesis {
                position: *position,
            },
            other => ParseError::TrailingInput {
                position: *position,
                token: other.to_string(),
            },
        });
    }
    debug!("parsed {:?} into {}", text, expr);
    Ok(expr)
}

impl Expr {
    /// Parses a string into a symbolic expression, see [`parse`].
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse(input)
    }
}
