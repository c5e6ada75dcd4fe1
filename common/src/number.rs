//! Numeric text helpers.
//!
//! Amounts travel through the calculator as text: the operand being typed,
//! the terms of an addition chain, and the custom rate field. These helpers
//! define how that text is parsed and how numbers are rendered back for
//! display.
//!
//! Parsing accepts both `,` and `.` as the decimal separator. Display uses
//! the Spanish (Venezuela) convention: `,` for decimals, `.` for thousands,
//! with grouping only once the integer part reaches five digits.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Decimal separator used in operand text.
pub const DECIMAL_SEPARATOR: char = ',';

/// Parse amount text, accepting `,` or `.` as decimal separator.
///
/// Returns `None` for empty, malformed, or non-finite input.
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse amount text, treating anything unparsable as zero.
///
/// This is the lenient policy used when summing addition terms and when
/// resolving rates: malformed input degrades to `0` instead of failing.
pub fn lenient_amount(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}

/// Count the digits of operand text, ignoring separators.
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// Render a computed value as operand text.
///
/// The value is rounded to at most `max_digits` significant digits, trailing
/// zeros are trimmed, and the decimal separator is `,`. Non-finite values
/// render as `"0"`.
///
/// Returns `None` when the integer part alone needs more than `max_digits`
/// digits, since no operand of that length can hold it.
pub fn operand_text(value: f64, max_digits: usize) -> Option<String> {
    if !value.is_finite() {
        return Some("0".to_string());
    }

    let int_digits = format!("{:.0}", value.abs().trunc()).len();
    if int_digits > max_digits {
        return None;
    }

    let decimals = max_digits - int_digits;
    let mut text = format!("{:.*}", decimals, value);

    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }

    // Rounding may carry into a new integer digit, e.g. 999.6 at 3 digits.
    if digit_count(&text) > max_digits {
        return None;
    }

    Some(text.replace('.', &DECIMAL_SEPARATOR.to_string()))
}

/// Round a value to `places` decimals, half away from zero.
///
/// Non-finite values round to zero.
pub fn round_places(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    match Decimal::from_f64(value) {
        Some(decimal) => decimal
            .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(0.0),
        None => {
            let factor = 10f64.powi(places as i32);
            (value * factor).round() / factor
        }
    }
}

/// Locale rules for displaying numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
    /// Minimum digits that must precede the first group separator.
    pub min_grouping_digits: usize,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            group_separator: '.',
            min_grouping_digits: 2,
        }
    }
}

impl NumberFormat {
    /// Format a value at fixed precision, e.g. `1403.3` -> `"1403,30"`.
    ///
    /// Non-finite values render as zero.
    pub fn format_fixed(&self, value: f64, places: u32) -> String {
        if !value.is_finite() {
            return self.format_decimal(Decimal::ZERO, places);
        }
        match Decimal::from_f64(value) {
            Some(decimal) => self.format_decimal(decimal, places),
            // Outside the decimal range; fall back to float formatting.
            None => {
                let text = format!("{:.*}", places as usize, value);
                self.localize(&text, '.')
            }
        }
    }

    /// Format a decimal at fixed precision, rounding half away from zero.
    pub fn format_decimal(&self, value: Decimal, places: u32) -> String {
        let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(places);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        self.localize(&rounded.to_string(), '.')
    }

    /// Format operand text as typed, grouping the integer part only.
    ///
    /// `"12345,6"` -> `"12.345,6"`; a trailing separator is preserved.
    pub fn format_operand(&self, operand: &str) -> String {
        self.localize(operand, DECIMAL_SEPARATOR)
    }

    /// Group the integer part of `text` and swap its decimal separator.
    fn localize(&self, text: &str, separator: char) -> String {
        let (sign, unsigned) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text),
        };
        let (int_part, frac_part) = match unsigned.split_once(separator) {
            Some((int_part, frac)) => (int_part, Some(frac)),
            None => (unsigned, None),
        };

        let mut out = String::with_capacity(text.len() + 4);
        out.push_str(sign);
        out.push_str(&self.group(int_part));
        if let Some(frac) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(frac);
        }
        out
    }

    fn group(&self, digits: &str) -> String {
        let len = digits.chars().count();
        if len < 3 + self.min_grouping_digits.max(1) {
            return digits.to_string();
        }

        let mut out = String::with_capacity(len + len / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(c);
        }
        out
    }
}
