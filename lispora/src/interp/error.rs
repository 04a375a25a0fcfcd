//! Runtime errors for the interpreter
//!
//! Builtins and the call protocol report failures as [`RuntimeError`]s and
//! propagate them with `?`. At the call boundary they are turned into
//! [`Value::Error`], which is how errors travel through the language itself.

use super::Value;
use std::fmt;

/// Runtime error during evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnboundSymbol,
    NotAFunction,
    WrongArgumentType,
    WrongArgumentCount,
    EmptyListArgument,
    DivisionByZero,
    TooManyArguments,
    InvalidVariadicForm,
    /// Raised by the `error` builtin
    UserError,
    ImportFailure,
}

impl RuntimeError {
    pub fn unbound_symbol(name: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UnboundSymbol,
            message: format!("unbound symbol '{name}'"),
        }
    }

    pub fn not_a_function(got: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::NotAFunction,
            message: format!("S-expression starts with incorrect type: expected Function, got {got}"),
        }
    }

    pub fn wrong_argument_type(func: &str, index: usize, expected: &str, got: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::WrongArgumentType,
            message: format!(
                "function '{func}' passed incorrect type for argument {index}: expected {expected}, got {got}"
            ),
        }
    }

    pub fn wrong_argument_count(func: &str, expected: usize, got: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::WrongArgumentCount,
            message: format!(
                "function '{func}' passed incorrect number of arguments: expected {expected}, got {got}"
            ),
        }
    }

    pub fn empty_list_argument(func: &str, index: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::EmptyListArgument,
            message: format!("function '{func}' passed {{}} for argument {index}"),
        }
    }

    pub fn division_by_zero() -> Self {
        RuntimeError {
            kind: ErrorKind::DivisionByZero,
            message: "division by zero".to_string(),
        }
    }

    pub fn too_many_arguments(given: usize, total: usize) -> Self {
        RuntimeError {
            kind: ErrorKind::TooManyArguments,
            message: format!("function passed too many arguments: got {given}, expected {total}"),
        }
    }

    pub fn invalid_variadic_form() -> Self {
        RuntimeError {
            kind: ErrorKind::InvalidVariadicForm,
            message: "function format invalid: symbol '&' not followed by single symbol".to_string(),
        }
    }

    pub fn user_error(message: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::UserError,
            message: message.to_string(),
        }
    }

    pub fn import_failure(reason: &str) -> Self {
        RuntimeError {
            kind: ErrorKind::ImportFailure,
            message: format!("could not import: {reason}"),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

impl From<RuntimeError> for Value {
    fn from(err: RuntimeError) -> Self {
        Value::Error(err.message)
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RuntimeError::unbound_symbol("x").kind, ErrorKind::UnboundSymbol);
        assert_eq!(RuntimeError::division_by_zero().kind, ErrorKind::DivisionByZero);
        assert_eq!(RuntimeError::too_many_arguments(3, 2).kind, ErrorKind::TooManyArguments);
        assert_eq!(RuntimeError::import_failure("nope").kind, ErrorKind::ImportFailure);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(RuntimeError::unbound_symbol("foo").message, "unbound symbol 'foo'");
        assert_eq!(
            RuntimeError::empty_list_argument("head", 0).message,
            "function 'head' passed {} for argument 0"
        );
        assert_eq!(RuntimeError::import_failure("x.lspr").message, "could not import: x.lspr");
    }

    #[test]
    fn test_user_error_keeps_text_verbatim() {
        assert_eq!(RuntimeError::user_error("boom").message, "boom");
    }

    #[test]
    fn test_into_value() {
        let value: Value = RuntimeError::division_by_zero().into();
        assert_eq!(value, Value::Error("division by zero".to_string()));
        assert_eq!(RuntimeError::division_by_zero().to_string(), "Error: division by zero");
    }
}
