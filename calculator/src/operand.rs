//! The operand under construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use tasacalc_common::{digit_count, lenient_amount, DECIMAL_SEPARATOR};

use crate::error::{InputError, InputResult};

/// Maximum digits in an operand, separator excluded.
pub const MAX_DIGITS: usize = 15;

/// A single keypad digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    pub const ZERO: Digit = Digit(0);

    /// Create a digit; `None` unless `value` is 0-9.
    pub fn new(value: u8) -> Option<Self> {
        (value <= 9).then_some(Self(value))
    }

    /// Create a digit from its character.
    pub fn from_char(c: char) -> Option<Self> {
        c.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

impl TryFrom<u8> for Digit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Digit::new(value).ok_or_else(|| format!("{value} is not a digit"))
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decimal number under construction, stored as typed.
///
/// Holds at most one `,` separator and is the literal `"0"` when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand(String);

impl Operand {
    /// The initial operand, `"0"`.
    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// Wrap computed text, e.g. an evaluation result. Empty text becomes `"0"`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::zero()
        } else {
            Self(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the initial `"0"`.
    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }

    /// Digits typed so far, separator excluded.
    pub fn digit_count(&self) -> usize {
        digit_count(&self.0)
    }

    pub fn has_separator(&self) -> bool {
        self.0.contains(DECIMAL_SEPARATOR)
    }

    /// Numeric value, with unparsable text counting as zero.
    pub fn value(&self) -> f64 {
        lenient_amount(&self.0)
    }

    /// Append a digit. A lone `"0"` is replaced rather than prefixed.
    pub(crate) fn push_digit(&self, digit: Digit, max_digits: usize) -> InputResult<Self> {
        if self.is_zero() {
            return Ok(Self(digit.as_char().to_string()));
        }
        if self.digit_count() >= max_digits {
            return Err(InputError::InputTooLong { max_digits });
        }
        let mut text = self.0.clone();
        text.push(digit.as_char());
        Ok(Self(text))
    }

    /// Append the decimal separator.
    pub(crate) fn push_separator(&self) -> InputResult<Self> {
        if self.has_separator() {
            return Err(InputError::DuplicateSeparator);
        }
        let mut text = self.0.clone();
        text.push(DECIMAL_SEPARATOR);
        Ok(Self(text))
    }

    /// Drop the last character; a single character falls back to `"0"`.
    pub(crate) fn pop(&self) -> Self {
        let mut chars = self.0.chars();
        chars.next_back();
        Self::from_text(chars.as_str())
    }
}

impl Default for Operand {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
