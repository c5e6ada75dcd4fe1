//! Reference exchange rate types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::ForeignCurrency;

/// Official rates for every foreign currency, quoted in local currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfficialRates {
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "EUR")]
    pub eur: f64,
}

impl OfficialRates {
    pub fn new(usd: f64, eur: f64) -> Self {
        Self { usd, eur }
    }

    /// Rate for the given foreign currency.
    pub fn get(&self, currency: ForeignCurrency) -> f64 {
        match currency {
            ForeignCurrency::Usd => self.usd,
            ForeignCurrency::Eur => self.eur,
        }
    }
}

/// A daily snapshot of official rates as supplied by a rate provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateData {
    /// Rates keyed by foreign currency.
    pub rates: OfficialRates,
    /// Date the rates apply to (serialized as `YYYY-MM-DD`).
    pub date: NaiveDate,
}

impl ExchangeRateData {
    pub fn new(rates: OfficialRates, date: NaiveDate) -> Self {
        Self { rates, date }
    }

    /// Official rate for the given foreign currency.
    pub fn rate_for(&self, currency: ForeignCurrency) -> f64 {
        self.rates.get(currency)
    }
}

/// One point of a historical rate series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRate {
    pub date: NaiveDate,
    pub rate: f64,
}

impl HistoricalRate {
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }
}

/// Summary of a historical series for chart captions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSummary {
    pub min: f64,
    pub max: f64,
    pub first: f64,
    pub last: f64,
    /// Change from first to last point, in percent.
    pub change_pct: f64,
}

impl HistoricalSummary {
    /// Summarize a series ordered oldest first. Returns `None` for an empty series.
    pub fn from_series(series: &[HistoricalRate]) -> Option<Self> {
        let first = series.first()?.rate;
        let last = series.last()?.rate;
        let (min, max) = series
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.rate), hi.max(p.rate))
            });
        let change_pct = if first == 0.0 {
            0.0
        } else {
            (last - first) / first * 100.0
        };

        Some(Self {
            min,
            max,
            first,
            last,
            change_pct,
        })
    }
}

/// Where the active conversion rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    /// Supplied by the rate provider.
    Official,
    /// Typed by the user.
    Custom,
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSource::Official => f.write_str("official"),
            RateSource::Custom => f.write_str("custom"),
        }
    }
}

/// The rate used for conversion between a foreign currency and local currency.
///
/// A value of zero (rates not loaded, or unparsable custom text) is a valid,
/// degenerate rate: conversions against it yield zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub value: f64,
    pub source: RateSource,
    pub currency: ForeignCurrency,
}

impl Rate {
    pub fn new(value: f64, source: RateSource, currency: ForeignCurrency) -> Self {
        Self {
            value,
            source,
            currency,
        }
    }

    pub fn official(value: f64, currency: ForeignCurrency) -> Self {
        Self::new(value, RateSource::Official, currency)
    }

    pub fn custom(value: f64, currency: ForeignCurrency) -> Self {
        Self::new(value, RateSource::Custom, currency)
    }

    /// Check if the rate can be used for conversion.
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}
