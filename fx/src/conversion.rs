//! Currency conversion between a foreign currency and local currency.

use serde::{Deserialize, Serialize};
use tasacalc_common::{parse_amount, ConversionDirection, Currency, Rate};

/// Convert a numeric amount.
///
/// Returns `0` when the rate is not usable (zero, negative, or non-finite);
/// a degenerate rate is a valid state, not an error.
pub fn convert_value(amount: f64, rate: f64, direction: ConversionDirection) -> f64 {
    if !amount.is_finite() || !rate.is_finite() || rate <= 0.0 {
        return 0.0;
    }
    match direction {
        ConversionDirection::ForeignToLocal => amount * rate,
        ConversionDirection::LocalToForeign => amount / rate,
    }
}

/// Convert amount text (`,` or `.` as decimal separator).
///
/// Unparsable text converts to `0`.
pub fn convert(amount_text: &str, rate: f64, direction: ConversionDirection) -> f64 {
    match parse_amount(amount_text) {
        Some(amount) => convert_value(amount, rate, direction),
        None => 0.0,
    }
}

/// Represents a computed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Input amount.
    pub input: f64,
    /// Output amount.
    pub output: f64,
    /// Rate used for conversion.
    pub rate: Rate,
    pub direction: ConversionDirection,
}

impl Conversion {
    /// Compute the conversion of `amount_text` at `rate`.
    pub fn compute(amount_text: &str, rate: Rate, direction: ConversionDirection) -> Self {
        let input = parse_amount(amount_text).unwrap_or(0.0);
        Self {
            input,
            output: convert_value(input, rate.value, direction),
            rate,
            direction,
        }
    }

    /// A zero conversion, used before any input or after a reset.
    pub fn zero(rate: Rate, direction: ConversionDirection) -> Self {
        Self {
            input: 0.0,
            output: 0.0,
            rate,
            direction,
        }
    }

    /// Currency of the input amount.
    pub fn from_currency(&self) -> Currency {
        self.direction.from_currency(self.rate.currency)
    }

    /// Currency of the output amount.
    pub fn to_currency(&self) -> Currency {
        self.direction.to_currency(self.rate.currency)
    }

    /// Whether the output degenerated to zero because the rate is unusable.
    pub fn is_degenerate(&self) -> bool {
        !self.rate.is_usable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tasacalc_common::{ForeignCurrency, NumberFormat};

    #[test]
    fn test_convert_foreign_to_local() {
        let out = convert("10", 140.33, ConversionDirection::ForeignToLocal);
        assert!((out - 1403.3).abs() < 1e-9);
        assert_eq!(NumberFormat::default().format_fixed(out, 2), "1403,30");
    }

    #[test]
    fn test_convert_local_to_foreign() {
        let out = convert("1403,3", 140.33, ConversionDirection::LocalToForeign);
        assert!((out - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_degenerate() {
        assert_eq!(convert("10", 0.0, ConversionDirection::ForeignToLocal), 0.0);
        assert_eq!(convert("10", 0.0, ConversionDirection::LocalToForeign), 0.0);
        assert_eq!(convert("abc", 140.33, ConversionDirection::ForeignToLocal), 0.0);
        assert_eq!(convert("10", f64::NAN, ConversionDirection::ForeignToLocal), 0.0);
    }

    #[test]
    fn test_conversion_record() {
        let rate = Rate::official(151.2, ForeignCurrency::Eur);
        let conversion = Conversion::compute("2,5", rate, ConversionDirection::ForeignToLocal);

        assert_eq!(conversion.input, 2.5);
        assert!((conversion.output - 378.0).abs() < 1e-9);
        assert_eq!(conversion.from_currency(), Currency::Eur);
        assert_eq!(conversion.to_currency(), Currency::Ves);
        assert!(!conversion.is_degenerate());

        let zero = Conversion::zero(Rate::custom(0.0, ForeignCurrency::Usd), ConversionDirection::LocalToForeign);
        assert!(zero.is_degenerate());
        assert_eq!(zero.from_currency(), Currency::Ves);
    }

    proptest! {
        #[test]
        fn prop_round_trip(x in 0.0f64..1e12, rate in 0.0001f64..1e6) {
            let local = convert_value(x, rate, ConversionDirection::ForeignToLocal);
            let back = convert_value(local, rate, ConversionDirection::LocalToForeign);
            prop_assert!((back - x).abs() <= 1e-9 * x.max(1.0));
        }
    }
}
