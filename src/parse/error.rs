use thiserror::Error;

/// Syntax errors produced when parsing an input expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expression truncated")]
    Truncated,

    #[error("unexpected ')'")]
    UnexpectedClose,

    #[error("expected ')'")]
    ExpectedClose,

    #[error("expected entity, not operator '{found}'")]
    ExpectedEntity { found: String },

    #[error("expected operator, got '{found}'")]
    ExpectedOperator { found: String },

    #[error("entity name missing in '{token}'")]
    EmptyEntity { token: String },

    #[error("unparsed tokens: {}", tokens.join(" "))]
    TrailingTokens { tokens: Vec<String> },

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
