//! Time utilities and constants for Tasacalc.

use chrono::{Duration, Local, NaiveDate};

/// Rate feed timing constants.
pub mod constants {
    use super::Duration;

    /// Simulated latency of a current-rates fetch (300 milliseconds).
    pub fn rates_fetch_latency() -> Duration {
        Duration::milliseconds(300)
    }

    /// Simulated latency of a historical-series fetch (500 milliseconds).
    pub fn history_fetch_latency() -> Duration {
        Duration::milliseconds(500)
    }

    /// How long a fetched historical series stays fresh (10 minutes).
    pub fn history_cache_ttl() -> Duration {
        Duration::minutes(10)
    }

    /// Number of daily points in a historical series.
    pub const HISTORY_DAYS: usize = 30;
}

/// Today's date in the local timezone, the date rates are published for.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The `days` consecutive dates ending at `end`, oldest first.
pub fn trailing_days(end: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .filter_map(|back| end.checked_sub_signed(Duration::days(back as i64)))
        .collect()
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
