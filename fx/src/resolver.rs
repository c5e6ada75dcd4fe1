//! Active rate resolution: official rate or user-entered custom rate.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tasacalc_common::{lenient_amount, ExchangeRateData, ForeignCurrency, Rate};
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Digits with at most one decimal separator (`,` or `.`).
fn custom_rate_grammar() -> Option<&'static Regex> {
    static GRAMMAR: OnceLock<Option<Regex>> = OnceLock::new();
    GRAMMAR
        .get_or_init(|| Regex::new(r"^[0-9]*([.,][0-9]*)?$").ok())
        .as_ref()
}

/// Check custom rate text against the accepted grammar.
///
/// Without a usable grammar every text is rejected.
pub fn is_valid_custom_rate_text(text: &str) -> bool {
    custom_rate_grammar().map_or(false, |re| re.is_match(text))
}

/// Resolve the rate value used for conversion.
///
/// With `use_custom`, the custom text is parsed (`,` or `.` as separator)
/// and anything empty or unparsable yields `0`. Otherwise the official rate
/// for `selected` is returned, or `0` while rates are not loaded.
pub fn active_rate(
    use_custom: bool,
    custom_text: &str,
    official: Option<&ExchangeRateData>,
    selected: ForeignCurrency,
) -> f64 {
    if use_custom {
        return lenient_amount(custom_text);
    }
    official.map(|data| data.rate_for(selected)).unwrap_or(0.0)
}

/// Tracks the selected foreign currency and the custom rate override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResolver {
    selected: ForeignCurrency,
    use_custom: bool,
    custom_text: String,
}

impl RateResolver {
    /// Create a resolver with the given currency selected and no override.
    pub fn new(selected: ForeignCurrency) -> Self {
        Self {
            selected,
            ..Default::default()
        }
    }

    /// Currently selected foreign currency.
    pub fn selected(&self) -> ForeignCurrency {
        self.selected
    }

    /// Whether the custom rate is in use.
    pub fn uses_custom(&self) -> bool {
        self.use_custom
    }

    /// Current custom rate text.
    pub fn custom_text(&self) -> &str {
        &self.custom_text
    }

    /// Select a foreign currency. Always turns the custom rate off.
    pub fn select_currency(&mut self, currency: ForeignCurrency) {
        debug!(currency = %currency, "Selecting foreign currency");
        self.selected = currency;
        self.use_custom = false;
    }

    /// Turn the custom rate on or off. The selected currency is kept.
    pub fn set_use_custom(&mut self, use_custom: bool) {
        self.use_custom = use_custom;
    }

    /// Flip the custom rate switch.
    pub fn toggle_custom(&mut self) {
        self.use_custom = !self.use_custom;
    }

    /// Replace the custom rate text.
    ///
    /// Text outside the grammar is rejected and the previous text is kept.
    pub fn set_custom_text(&mut self, text: &str) -> FxResult<()> {
        if !is_valid_custom_rate_text(text) {
            return Err(FxError::InvalidCustomRate(text.to_string()));
        }
        self.custom_text = text.to_string();
        Ok(())
    }

    /// The active rate, given the latest official rates (if loaded).
    pub fn active(&self, official: Option<&ExchangeRateData>) -> Rate {
        let value = active_rate(self.use_custom, &self.custom_text, official, self.selected);
        if self.use_custom {
            Rate::custom(value, self.selected)
        } else {
            Rate::official(value, self.selected)
        }
    }

    /// The official rate for the selected currency, ignoring any override.
    pub fn official(&self, official: Option<&ExchangeRateData>) -> Rate {
        Rate::official(active_rate(false, "", official, self.selected), self.selected)
    }
}
