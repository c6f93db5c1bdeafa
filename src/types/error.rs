use thiserror::Error;

use crate::parse::ParseError;

/// Errors raised while substituting aliases into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    #[error("value check '{alias}={value}' can only be overridden for entity aliases")]
    ValueOverride { alias: String, value: String },

    #[error("cyclic alias detected: {}", path.join(" -> "))]
    Cyclic { path: Vec<String> },

    #[error("alias expansion nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors raised while building an engine from configuration. Any of these
/// aborts construction; no partially valid engine is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid expression {origin}: {source}")]
    Expression {
        origin: String,
        #[source]
        source: ParseError,
    },

    #[error("output '{output}': {source}")]
    Alias {
        output: String,
        #[source]
        source: AliasError,
    },

    #[error("duplicate output '{output}'")]
    DuplicateOutput { output: String },

    #[error("output '{output}' has no input expressions")]
    NoInputs { output: String },

    #[error("no outputs defined; at least one output is required")]
    NoOutputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_override_message() {
        let err = AliasError::ValueOverride {
            alias: "expr".into(),
            value: "off".into(),
        };
        assert_eq!(
            err.to_string(),
            "value check 'expr=off' can only be overridden for entity aliases"
        );
    }

    #[test]
    fn cyclic_alias_message() {
        let err = AliasError::Cyclic {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic alias detected: a -> b -> a");
    }

    #[test]
    fn too_deep_alias_message() {
        let err = AliasError::TooDeep { limit: 256 };
        assert_eq!(err.to_string(), "alias expansion nested deeper than 256 levels");
    }

    #[test]
    fn expression_message_includes_origin() {
        let err = BuildError::Expression {
            origin: "for output 'light.test'".into(),
            source: ParseError::ExpectedClose,
        };
        assert_eq!(
            err.to_string(),
            "invalid expression for output 'light.test': expected ')'"
        );
    }

    #[test]
    fn alias_message_includes_output() {
        let err = BuildError::Alias {
            output: "light.test".into(),
            source: AliasError::Cyclic {
                path: vec!["x".into(), "x".into()],
            },
        };
        assert_eq!(
            err.to_string(),
            "output 'light.test': cyclic alias detected: x -> x"
        );
    }

    #[test]
    fn duplicate_output_message() {
        let err = BuildError::DuplicateOutput {
            output: "light.a".into(),
        };
        assert_eq!(err.to_string(), "duplicate output 'light.a'");
    }

    #[test]
    fn no_inputs_message() {
        let err = BuildError::NoInputs {
            output: "light.a".into(),
        };
        assert_eq!(err.to_string(), "output 'light.a' has no input expressions");
    }
}
