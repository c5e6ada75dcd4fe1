//! Rate provider traits and implementations.

use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tasacalc_common::time::constants;
use tasacalc_common::{
    today, trailing_days, DurationExt, ExchangeRateData, ForeignCurrency, HistoricalRate,
    OfficialRates,
};
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Trait for reference rate providers.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch today's official rates for every foreign currency.
    async fn fetch_rates(&self) -> FxResult<ExchangeRateData>;

    /// Fetch the daily series for a currency, oldest point first.
    async fn fetch_historical_rates(
        &self,
        currency: ForeignCurrency,
        days: usize,
    ) -> FxResult<Vec<HistoricalRate>>;
}

/// Configuration for the built-in provider.
#[derive(Debug, Clone)]
pub struct StaticRateProviderConfig {
    /// Published USD rate.
    pub usd: f64,
    /// Published EUR rate.
    pub eur: f64,
    /// Delay before current rates resolve.
    pub latency: Duration,
    /// Delay before a historical series resolves.
    pub history_latency: Duration,
    /// Total width of the random band applied to historical points.
    pub fluctuation: f64,
    /// Seed for reproducible historical series.
    pub seed: Option<u64>,
    /// Make every fetch fail.
    pub fail: bool,
}

impl Default for StaticRateProviderConfig {
    fn default() -> Self {
        Self {
            usd: 140.33,
            eur: 151.2,
            latency: constants::rates_fetch_latency(),
            history_latency: constants::history_fetch_latency(),
            fluctuation: 5.0,
            seed: None,
            fail: false,
        }
    }
}

/// Provider serving fixed published rates, with a simulated network delay.
///
/// Historical points fluctuate randomly around the published rate.
pub struct StaticRateProvider {
    config: StaticRateProviderConfig,
    rng: Mutex<StdRng>,
}

impl StaticRateProvider {
    /// Create a provider with default configuration.
    pub fn new() -> Self {
        Self::with_config(StaticRateProviderConfig::default())
    }

    /// Create a provider with custom configuration.
    pub fn with_config(config: StaticRateProviderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    fn base_rate(&self, currency: ForeignCurrency) -> f64 {
        match currency {
            ForeignCurrency::Usd => self.config.usd,
            ForeignCurrency::Eur => self.config.eur,
        }
    }

    fn fail(&self, reason: &str) -> FxError {
        FxError::FetchFailed {
            provider: self.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Default for StaticRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn fetch_rates(&self) -> FxResult<ExchangeRateData> {
        tokio::time::sleep(self.config.latency.as_std()).await;

        if self.config.fail {
            return Err(self.fail("provider offline"));
        }

        Ok(ExchangeRateData::new(
            OfficialRates::new(self.config.usd, self.config.eur),
            today(),
        ))
    }

    async fn fetch_historical_rates(
        &self,
        currency: ForeignCurrency,
        days: usize,
    ) -> FxResult<Vec<HistoricalRate>> {
        tokio::time::sleep(self.config.history_latency.as_std()).await;

        if self.config.fail {
            return Err(FxError::HistoricalUnavailable(currency));
        }

        let base = self.base_rate(currency);
        let half = self.config.fluctuation / 2.0;

        let series: Vec<HistoricalRate> = {
            let mut rng = self.rng.lock();
            trailing_days(today(), days)
                .into_iter()
                .map(|date| {
                    let jitter = if half > 0.0 {
                        rng.gen_range(-half..half)
                    } else {
                        0.0
                    };
                    HistoricalRate::new(date, round_cents(base + jitter))
                })
                .collect()
        };

        debug!(currency = %currency, points = series.len(), "Generated historical series");
        Ok(series)
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: Mutex<Option<ExchangeRateData>>,
    history: dashmap::DashMap<ForeignCurrency, Vec<HistoricalRate>>,
    failing: std::sync::atomic::AtomicBool,
    rate_fetches: std::sync::atomic::AtomicUsize,
    history_fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider with no rates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: Mutex::new(None),
            history: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
            rate_fetches: std::sync::atomic::AtomicUsize::new(0),
            history_fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the rates returned by `fetch_rates`.
    pub fn set_rates(&self, rates: ExchangeRateData) {
        *self.rates.lock() = Some(rates);
    }

    /// Set the series returned for a currency.
    pub fn set_history(&self, currency: ForeignCurrency, series: Vec<HistoricalRate>) {
        self.history.insert(currency, series);
    }

    /// Make every subsequent fetch fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of `fetch_rates` calls so far.
    pub fn rate_fetches(&self) -> usize {
        self.rate_fetches.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Number of `fetch_historical_rates` calls so far.
    pub fn history_fetches(&self) -> usize {
        self.history_fetches
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    fn is_failing(&self) -> bool {
        self.failing.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self) -> FxResult<ExchangeRateData> {
        self.rate_fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.is_failing() {
            return Err(FxError::FetchFailed {
                provider: self.name.clone(),
                reason: "mock failure".to_string(),
            });
        }

        self.rates.lock().clone().ok_or_else(|| FxError::FetchFailed {
            provider: self.name.clone(),
            reason: "no rates set".to_string(),
        })
    }

    async fn fetch_historical_rates(
        &self,
        currency: ForeignCurrency,
        days: usize,
    ) -> FxResult<Vec<HistoricalRate>> {
        self.history_fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.is_failing() {
            return Err(FxError::HistoricalUnavailable(currency));
        }

        self.history
            .get(&currency)
            .map(|series| {
                let skip = series.len().saturating_sub(days);
                series[skip..].to_vec()
            })
            .ok_or(FxError::HistoricalUnavailable(currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> StaticRateProviderConfig {
        StaticRateProviderConfig {
            latency: Duration::zero(),
            history_latency: Duration::zero(),
            seed: Some(7),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_static_provider_rates() {
        let provider = StaticRateProvider::with_config(fast_config());

        let data = provider.fetch_rates().await.unwrap();

        assert_eq!(data.rate_for(ForeignCurrency::Usd), 140.33);
        assert_eq!(data.rate_for(ForeignCurrency::Eur), 151.2);
        assert_eq!(data.date, today());
    }

    #[tokio::test]
    async fn test_static_provider_history() {
        let provider = StaticRateProvider::with_config(fast_config());

        let series = provider
            .fetch_historical_rates(ForeignCurrency::Eur, constants::HISTORY_DAYS)
            .await
            .unwrap();

        assert_eq!(series.len(), 30);
        assert_eq!(series.last().unwrap().date, today());
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        for point in &series {
            assert!((point.rate - 151.2).abs() <= 2.5 + 1e-9);
            // Rounded to cents
            assert!(((point.rate * 100.0).round() - point.rate * 100.0).abs() < 1e-6);
        }
    }

    #[tokio::test]
    async fn test_static_provider_failure() {
        let provider = StaticRateProvider::with_config(StaticRateProviderConfig {
            fail: true,
            ..fast_config()
        });

        let result = provider.fetch_rates().await;
        assert!(matches!(result, Err(FxError::FetchFailed { .. })));

        let history = provider
            .fetch_historical_rates(ForeignCurrency::Usd, 30)
            .await;
        assert_eq!(history, Err(FxError::HistoricalUnavailable(ForeignCurrency::Usd)));
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test");
        assert!(provider.fetch_rates().await.is_err());

        let data = ExchangeRateData::new(OfficialRates::new(36.5, 39.8), today());
        provider.set_rates(data.clone());

        assert_eq!(provider.fetch_rates().await.unwrap(), data);
        assert_eq!(provider.rate_fetches(), 2);

        provider.set_failing(true);
        assert!(provider.fetch_rates().await.is_err());
    }
}
