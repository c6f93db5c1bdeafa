use crate::{BinaryOp, Expr, MAX_DEPTH};

use super::error::ParseError;
use super::lexer::Token;

// -- Grammar ------------------------------------------------------------------
//
// expression := unary (binaryOp expression)?
// unary      := '!' primary | primary
// primary    := entity | '(' expression ')'
//
// There is no precedence between `&` and `|`: the right operand of a binary
// node is the entire remainder, so `a & b | c` is `a & (b | c)`. A chain is
// read in a loop and folded from the right.
//
// `level` counts groups, negations and chain positions on the way down and
// bounds the recursion. The finished tree is checked against MAX_DEPTH again.

type Parsed<'t> = Result<(Expr, &'t [Token]), ParseError>;

/// Parse a complete token stream. Leftover tokens are an error.
pub(crate) fn parse_tokens(tokens: &[Token]) -> Result<Expr, ParseError> {
    let (expr, rest) = expression(tokens, 1)?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingTokens {
            tokens: rest.iter().map(Token::to_string).collect(),
        });
    }
    if expr.depth() > MAX_DEPTH {
        return Err(ParseError::TooDeep { limit: MAX_DEPTH });
    }
    Ok(expr)
}

fn descend(level: usize) -> Result<usize, ParseError> {
    if level > MAX_DEPTH {
        Err(ParseError::TooDeep { limit: MAX_DEPTH })
    } else {
        Ok(level)
    }
}

fn expression(tokens: &[Token], level: usize) -> Parsed<'_> {
    let (mut last, mut rest) = unary(tokens, descend(level)?)?;
    let mut chain: Vec<(Expr, BinaryOp)> = Vec::new();

    loop {
        let op = match rest.split_first() {
            Some((Token::And, after)) => {
                rest = after;
                BinaryOp::And
            }
            Some((Token::Or, after)) => {
                rest = after;
                BinaryOp::Or
            }
            // a closing paren ends an enclosing group; the caller checks it
            None | Some((Token::Close, _)) => break,
            Some((other, _)) => {
                return Err(ParseError::ExpectedOperator {
                    found: other.to_string(),
                })
            }
        };
        let (next, after) = unary(rest, descend(level + chain.len() + 1)?)?;
        chain.push((std::mem::replace(&mut last, next), op));
        rest = after;
    }

    let expr = chain
        .into_iter()
        .rev()
        .fold(last, |right, (left, op)| Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
    Ok((expr, rest))
}

fn unary(tokens: &[Token], level: usize) -> Parsed<'_> {
    match tokens.split_first() {
        Some((Token::Not, rest)) => {
            let (operand, rest) = primary(rest, descend(level + 1)?)?;
            Ok((Expr::Not(Box::new(operand)), rest))
        }
        _ => primary(tokens, level),
    }
}

fn primary(tokens: &[Token], level: usize) -> Parsed<'_> {
    match tokens.split_first() {
        None => Err(ParseError::Truncated),
        Some((Token::Open, rest)) => group(rest, descend(level + 1)?),
        Some((Token::Close, _)) => Err(ParseError::UnexpectedClose),
        Some((op @ (Token::And | Token::Or | Token::Not), _)) => Err(ParseError::ExpectedEntity {
            found: op.to_string(),
        }),
        Some((Token::Entity(raw), rest)) => Ok((entity(raw)?, rest)),
    }
}

fn group(tokens: &[Token], level: usize) -> Parsed<'_> {
    let (inner, rest) = expression(tokens, level)?;
    match rest.split_first() {
        Some((Token::Close, rest)) => Ok((inner, rest)),
        _ => Err(ParseError::ExpectedClose),
    }
}

/// `name` or `name=value`, split on the first `=`. Both sides are trimmed and
/// an empty value is no override.
fn entity(raw: &str) -> Result<Expr, ParseError> {
    let (name, value) = match raw.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (raw, None),
    };
    if name.is_empty() {
        return Err(ParseError::EmptyEntity {
            token: raw.to_owned(),
        });
    }
    Ok(Expr::Entity {
        name: name.to_owned(),
        value: value.filter(|v| !v.is_empty()).map(str::to_owned),
    })
}
