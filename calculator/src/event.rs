//! Discrete events the presentation layer sends to the session.

use serde::{Deserialize, Serialize};
use tasacalc_common::ForeignCurrency;

use crate::error::KeyParseError;
use crate::expression::Operator;
use crate::operand::Digit;

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CalculatorEvent {
    Digit(Digit),
    DecimalSeparator,
    Backspace,
    Clear,
    Operator(Operator),
    Equals,
    SelectCurrency(ForeignCurrency),
    ToggleCustomRate,
    SetCustomRateText(String),
    SwapDirection,
}

impl CalculatorEvent {
    /// Map a single keypad character to its event.
    ///
    /// Digits, `,`/`.`, `+`, `=`, `c` clear, `<` backspace, `s` swap,
    /// `u`/`e` select USD/EUR, `r` toggle custom rate.
    pub fn from_key(key: char) -> Option<Self> {
        if let Some(digit) = Digit::from_char(key) {
            return Some(CalculatorEvent::Digit(digit));
        }
        let event = match key.to_ascii_lowercase() {
            ',' | '.' => CalculatorEvent::DecimalSeparator,
            '+' => CalculatorEvent::Operator(Operator::Add),
            '=' => CalculatorEvent::Equals,
            'c' => CalculatorEvent::Clear,
            '<' => CalculatorEvent::Backspace,
            's' => CalculatorEvent::SwapDirection,
            'u' => CalculatorEvent::SelectCurrency(ForeignCurrency::Usd),
            'e' => CalculatorEvent::SelectCurrency(ForeignCurrency::Eur),
            'r' => CalculatorEvent::ToggleCustomRate,
            _ => return None,
        };
        Some(event)
    }
}

/// Parse a key sequence such as `"10+5="`. Whitespace is ignored.
pub fn parse_keys(keys: &str) -> Result<Vec<CalculatorEvent>, KeyParseError> {
    keys.chars()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(position, key)| {
            CalculatorEvent::from_key(key).ok_or(KeyParseError { key, position })
        })
        .collect()
}
