//! Currency codes and conversion direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the two foreign currencies with an official reference rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ForeignCurrency {
    /// US dollar.
    #[default]
    Usd,
    /// Euro.
    Eur,
}

impl ForeignCurrency {
    /// Every supported foreign currency, in keypad order.
    pub const ALL: [ForeignCurrency; 2] = [ForeignCurrency::Usd, ForeignCurrency::Eur];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            ForeignCurrency::Usd => "USD",
            ForeignCurrency::Eur => "EUR",
        }
    }

    pub fn symbol(&self) -> &'static str {
        Currency::from(*self).symbol()
    }
}

impl fmt::Display for ForeignCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a currency code is not one of the supported codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown currency code: {0}")]
pub struct UnknownCurrencyError(pub String);

impl FromStr for ForeignCurrency {
    type Err = UnknownCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(ForeignCurrency::Usd),
            "EUR" => Ok(ForeignCurrency::Eur),
            _ => Err(UnknownCurrencyError(s.to_string())),
        }
    }
}

/// Any currency shown by the calculator: a foreign currency or the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    /// Venezuelan bolívar, the local currency.
    Ves,
}

impl Currency {
    /// The local currency every rate is quoted in.
    pub const LOCAL: Currency = Currency::Ves;

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ves => "VES",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Ves => "Bs",
        }
    }
}

impl From<ForeignCurrency> for Currency {
    fn from(currency: ForeignCurrency) -> Self {
        match currency {
            ForeignCurrency::Usd => Currency::Usd,
            ForeignCurrency::Eur => Currency::Eur,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Which side of the conversion the typed amount is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionDirection {
    /// Typed amount is foreign; output is local (`amount * rate`).
    #[default]
    ForeignToLocal,
    /// Typed amount is local; output is foreign (`amount / rate`).
    LocalToForeign,
}

impl ConversionDirection {
    /// The opposite direction.
    pub fn swapped(self) -> Self {
        match self {
            ConversionDirection::ForeignToLocal => ConversionDirection::LocalToForeign,
            ConversionDirection::LocalToForeign => ConversionDirection::ForeignToLocal,
        }
    }

    /// Currency the typed amount is in.
    pub fn from_currency(self, foreign: ForeignCurrency) -> Currency {
        match self {
            ConversionDirection::ForeignToLocal => foreign.into(),
            ConversionDirection::LocalToForeign => Currency::LOCAL,
        }
    }

    /// Currency the converted amount is in.
    pub fn to_currency(self, foreign: ForeignCurrency) -> Currency {
        self.swapped().from_currency(foreign)
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionDirection::ForeignToLocal => f.write_str("foreign->local"),
            ConversionDirection::LocalToForeign => f.write_str("local->foreign"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_currency_parse() {
        assert_eq!("usd".parse::<ForeignCurrency>().unwrap(), ForeignCurrency::Usd);
        assert_eq!(" EUR ".parse::<ForeignCurrency>().unwrap(), ForeignCurrency::Eur);
        assert!("VES".parse::<ForeignCurrency>().is_err());
    }

    #[test]
    fn test_direction_roles() {
        let dir = ConversionDirection::ForeignToLocal;
        assert_eq!(dir.from_currency(ForeignCurrency::Eur), Currency::Eur);
        assert_eq!(dir.to_currency(ForeignCurrency::Eur), Currency::Ves);

        let swapped = dir.swapped();
        assert_eq!(swapped, ConversionDirection::LocalToForeign);
        assert_eq!(swapped.from_currency(ForeignCurrency::Usd), Currency::Ves);
        assert_eq!(swapped.to_currency(ForeignCurrency::Usd), Currency::Usd);
        assert_eq!(swapped.swapped(), dir);
    }

    #[test]
    fn test_symbols() {
        assert_eq!(Currency::Usd.symbol(), "$");
        assert_eq!(ForeignCurrency::Eur.symbol(), "€");
        assert_eq!(Currency::LOCAL.symbol(), "Bs");
    }

    #[test]
    fn test_serde_codes() {
        let json = serde_json::to_string(&ForeignCurrency::Usd).unwrap();
        assert_eq!(json, "\"USD\"");
        let dir: ConversionDirection = serde_json::from_str("\"local_to_foreign\"").unwrap();
        assert_eq!(dir, ConversionDirection::LocalToForeign);
    }
}
