use std::fmt;

use winnow::combinator::{alt, repeat};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_till};

const SEPARATORS: [char; 5] = ['&', '|', '!', '(', ')'];

/// A single lexical token. Entity fragments are kept raw (trimmed) and split
/// into name and value by the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Entity(String),
    And,
    Or,
    Not,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Entity(raw) => write!(f, "{raw}"),
            Token::And => write!(f, "&"),
            Token::Or => write!(f, "|"),
            Token::Not => write!(f, "!"),
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
        }
    }
}

fn separator(input: &mut &str) -> ModalResult<Option<Token>> {
    let c = one_of(SEPARATORS).parse_next(input)?;
    let token = match c {
        '&' => Token::And,
        '|' => Token::Or,
        '!' => Token::Not,
        '(' => Token::Open,
        _ => Token::Close,
    };
    Ok(Some(token))
}

// Everything between two separators. Whitespace-only fragments vanish.
fn fragment(input: &mut &str) -> ModalResult<Option<Token>> {
    let raw = take_till(1.., SEPARATORS).parse_next(input)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Token::Entity(trimmed.to_owned())))
    }
}

fn tokens(input: &mut &str) -> ModalResult<Vec<Option<Token>>> {
    repeat(0.., alt((separator, fragment))).parse_next(input)
}

/// Split `input` into tokens, discarding whitespace.
///
/// Every character is either a separator or part of a fragment, so `tokens`
/// consumes any input and cannot fail.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    tokens
        .parse(input)
        .map(|tokens| tokens.into_iter().flatten().collect())
        .unwrap_or_default()
}
