//! Error types for the object model and the script layer.
//!
//! `ProtoError` covers everything the heap, resolver, construction helpers and
//! invocation can report. `ScriptError` adds lexing and parsing failures on
//! top of it for the text-driven front end.

use thiserror::Error;

/// Result type alias for object-model operations
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors raised while manipulating or invoking objects
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtoError {
    /// A construction helper was handed a seed that cannot become an object
    #[error("invalid seed: expected an object or nil, got {0}")]
    InvalidSeed(String),

    /// A value was called but holds no behavior
    #[error("'{0}' is not callable")]
    NotCallable(String),

    /// Wrong number of arguments for a callable
    #[error("{name}() takes {expected} argument(s) but {got} were given")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Neither the receiver nor its chain defines the requested method
    #[error("{receiver} has no method '{name}'")]
    MissingMethod { receiver: String, name: String },

    /// An operation needed an object and got something else
    #[error("expected an object, got {0}")]
    NotAnObject(String),

    /// Argument of the wrong kind passed to a builtin
    #[error("expected {expected}, got {got}")]
    ArgumentType { expected: &'static str, got: String },

    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: String,
        right: String,
    },

    /// `self` or the contextual form of `super` evaluated with no executing method
    #[error("'{0}' used outside of a method")]
    OutsideMethod(&'static str),

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("integer overflow")]
    Overflow,
}

/// Errors raised by the script front end
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unrecognized input {text:?} at offset {offset}")]
    Lex { offset: usize, text: String },

    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error(transparent)]
    Runtime(#[from] ProtoError),
}

impl ScriptError {
    /// True for failures detected before any statement ran.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, ScriptError::Lex { .. } | ScriptError::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_seed() {
        let err = ProtoError::InvalidSeed("int".to_string());
        assert_eq!(
            err.to_string(),
            "invalid seed: expected an object or nil, got int"
        );
    }

    #[test]
    fn test_error_display_arity() {
        let err = ProtoError::Arity {
            name: "speak".to_string(),
            expected: 1,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "speak() takes 1 argument(s) but 3 were given"
        );
    }

    #[test]
    fn test_script_error_wraps_runtime_error_transparently() {
        let err: ScriptError = ProtoError::OutsideMethod("self").into();
        assert_eq!(err.to_string(), "'self' used outside of a method");
        assert!(!err.is_syntax_error());
    }

    #[test]
    fn test_script_error_parse_is_syntax_error() {
        let err = ScriptError::Parse {
            offset: 4,
            message: "expected ')'".to_string(),
        };
        assert!(err.is_syntax_error());
        assert!(err.to_string().contains("offset 4"));
    }
}
