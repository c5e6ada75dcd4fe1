//! Session configuration.

use tasacalc_common::{ForeignCurrency, NumberFormat};

use crate::direction::SwapPolicy;
use crate::operand::MAX_DIGITS;

/// Calculator session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum digits per operand (separator excluded).
    pub max_digits: usize,
    /// What a swap does with a pending addition chain.
    pub swap_policy: SwapPolicy,
    /// Display locale rules.
    pub number_format: NumberFormat,
    /// Decimal places of the conversion output and rate labels.
    pub output_places: u32,
    /// Foreign currency selected at session start.
    pub default_currency: ForeignCurrency,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_digits: MAX_DIGITS,
            swap_policy: SwapPolicy::Discard,
            number_format: NumberFormat::default(),
            output_places: 2,
            default_currency: ForeignCurrency::Usd,
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(max) = std::env::var("TASACALC_MAX_DIGITS") {
            if let Ok(max) = max.parse() {
                config.max_digits = max;
            }
        }

        if let Ok(policy) = std::env::var("TASACALC_SWAP_POLICY") {
            if let Ok(policy) = policy.parse() {
                config.swap_policy = policy;
            }
        }

        if let Ok(currency) = std::env::var("TASACALC_CURRENCY") {
            if let Ok(currency) = currency.parse() {
                config.default_currency = currency;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_digits == 0 {
            return Err("Max digits cannot be 0".to_string());
        }

        // f64 holds 15 significant decimal digits exactly
        if self.max_digits > MAX_DIGITS {
            return Err(format!("Max digits cannot exceed {MAX_DIGITS}"));
        }

        if self.number_format.decimal_separator == self.number_format.group_separator {
            return Err("Decimal and group separators must differ".to_string());
        }

        Ok(())
    }
}
