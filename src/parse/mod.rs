mod error;
mod grammar;
mod lexer;

pub use error::ParseError;

use crate::Expr;

/// Parse one input expression such as `"binary_sensor.motion & !sun=above_horizon"`.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a well-formed expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    grammar::parse_tokens(&lexer::tokenize(input))
}
