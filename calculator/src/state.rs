//! Calculator state and the digit-entry reducers.
//!
//! Reducers take the current state by reference and return the next state;
//! a rejected input returns an [`InputError`] and the caller keeps the old
//! state untouched.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, InputResult};
use crate::operand::{Digit, Operand};

/// State of the calculator keypad.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculatorState {
    /// The operand being typed.
    pub(crate) current_operand: Operand,
    /// Committed `"operand + "` fragments not yet evaluated.
    pub(crate) expression: String,
    /// Next digit starts a fresh operand (set after `=`).
    pub(crate) overwrite: bool,
}

impl CalculatorState {
    /// The initial state: operand `"0"`, no expression, no overwrite.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state holding a carried value in overwrite mode.
    pub fn with_result(operand: Operand) -> Self {
        Self {
            current_operand: operand,
            expression: String::new(),
            overwrite: true,
        }
    }

    pub fn current_operand(&self) -> &Operand {
        &self.current_operand
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether an addition chain is waiting for `=`.
    pub fn has_pending_expression(&self) -> bool {
        !self.expression.is_empty()
    }

    /// Whether this is the initial state.
    pub fn is_initial(&self) -> bool {
        *self == Self::new()
    }

    /// Press a digit key.
    pub fn press_digit(&self, digit: Digit, max_digits: usize) -> InputResult<Self> {
        if self.overwrite {
            return Ok(Self {
                current_operand: Operand::from_text(digit.as_char().to_string()),
                expression: self.expression.clone(),
                overwrite: false,
            });
        }
        if self.current_operand.is_zero() && digit == Digit::ZERO {
            return Ok(self.clone());
        }

        Ok(Self {
            current_operand: self.current_operand.push_digit(digit, max_digits)?,
            ..self.clone()
        })
    }

    /// Press the decimal separator key.
    pub fn press_separator(&self) -> InputResult<Self> {
        if self.overwrite {
            return Ok(Self {
                current_operand: Operand::zero().push_separator()?,
                expression: self.expression.clone(),
                overwrite: false,
            });
        }
        if self.current_operand.has_separator() {
            return Err(InputError::DuplicateSeparator);
        }

        Ok(Self {
            current_operand: self.current_operand.push_separator()?,
            ..self.clone()
        })
    }

    /// Press backspace. After a result, this resets everything.
    pub fn backspace(&self) -> Self {
        if self.overwrite {
            return Self::new();
        }
        Self {
            current_operand: self.current_operand.pop(),
            ..self.clone()
        }
    }

    /// Press clear.
    pub fn clear(&self) -> Self {
        Self::new()
    }
}
