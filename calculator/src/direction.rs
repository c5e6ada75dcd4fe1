//! Conversion direction and the swap behavior.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tasacalc_common::{ConversionDirection, Currency, ForeignCurrency};

/// What a swap does with an addition chain that is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPolicy {
    /// Drop the pending chain; the calculator returns to its initial state.
    #[default]
    Discard,
    /// Sum the pending chain and carry its converted value across the swap.
    Preserve,
}

impl fmt::Display for SwapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapPolicy::Discard => f.write_str("discard"),
            SwapPolicy::Preserve => f.write_str("preserve"),
        }
    }
}

impl FromStr for SwapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discard" => Ok(SwapPolicy::Discard),
            "preserve" => Ok(SwapPolicy::Preserve),
            other => Err(format!("Unknown swap policy: {other}")),
        }
    }
}

/// Tracks which currency is the input side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionController {
    direction: ConversionDirection,
}

impl DirectionController {
    pub fn new(direction: ConversionDirection) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> ConversionDirection {
        self.direction
    }

    /// Toggle the direction and return the new one.
    pub fn swap(&mut self) -> ConversionDirection {
        self.direction = self.direction.swapped();
        self.direction
    }

    /// Currency the typed amount is in.
    pub fn from_currency(&self, foreign: ForeignCurrency) -> Currency {
        self.direction.from_currency(foreign)
    }

    /// Currency the converted amount is in.
    pub fn to_currency(&self, foreign: ForeignCurrency) -> Currency {
        self.direction.to_currency(foreign)
    }
}
