//! Calculator input error types.

use thiserror::Error;

/// Input rejected by the calculator.
///
/// Every variant is recoverable: the state is left unchanged and the
/// presentation layer shows a transient error flash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The operand already holds the maximum number of digits.
    #[error("Operand cannot exceed {max_digits} digits")]
    InputTooLong { max_digits: usize },

    /// The operand already contains a decimal separator.
    #[error("Operand already contains a decimal separator")]
    DuplicateSeparator,

    /// Operator or equals pressed with nothing to operate on.
    #[error("Nothing to operate on")]
    EmptyOperand,

    /// Custom rate text does not match the accepted grammar.
    #[error("Invalid custom rate: {0:?}")]
    InvalidCustomRate(String),
}

impl InputError {
    /// Get error code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            InputError::InputTooLong { .. } => "INPUT_TOO_LONG",
            InputError::DuplicateSeparator => "DUPLICATE_SEPARATOR",
            InputError::EmptyOperand => "EMPTY_OPERAND",
            InputError::InvalidCustomRate(_) => "INVALID_CUSTOM_RATE",
        }
    }
}

/// Result type for calculator input.
pub type InputResult<T> = Result<T, InputError>;

/// A key in a scripted key sequence had no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown key {key:?} at position {position}")]
pub struct KeyParseError {
    pub key: char,
    pub position: usize,
}
