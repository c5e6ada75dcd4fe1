//! Rate service: fetches official rates and historical series.

use std::sync::Arc;

use tasacalc_common::time::constants;
use tasacalc_common::{ExchangeRateData, ForeignCurrency, HistoricalRate, HistoricalSummary};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::cache::{HistoricalCacheConfig, HistoricalRateCache};
use crate::error::FxResult;
use crate::provider::RateProvider;
use crate::store::{RateLoadStatus, RateStore, SharedRateStore};

/// Configuration for the rate service.
#[derive(Debug, Clone)]
pub struct RateServiceConfig {
    /// Historical series cache configuration.
    pub history: HistoricalCacheConfig,
    /// Number of daily points requested per series.
    pub history_days: usize,
}

impl Default for RateServiceConfig {
    fn default() -> Self {
        Self {
            history: HistoricalCacheConfig::default(),
            history_days: constants::HISTORY_DAYS,
        }
    }
}

impl RateServiceConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.history_days == 0 {
            return Err("History days cannot be 0".to_string());
        }
        if self.history.max_entries == 0 {
            return Err("History cache must hold at least one entry".to_string());
        }
        Ok(())
    }
}

/// Fronts a rate provider with the shared rate store and history cache.
pub struct RateService {
    provider: Arc<dyn RateProvider>,
    store: SharedRateStore,
    history: HistoricalRateCache,
    config: RateServiceConfig,
}

impl RateService {
    /// Create a new service with the given provider.
    pub fn new(provider: Arc<dyn RateProvider>, config: RateServiceConfig) -> Self {
        Self {
            provider,
            store: Arc::new(RateStore::new()),
            history: HistoricalRateCache::with_config(config.history.clone()),
            config,
        }
    }

    /// The shared store the fetched rates land in.
    pub fn store(&self) -> SharedRateStore {
        self.store.clone()
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch current rates and publish them to the store.
    ///
    /// A failure is logged once and recorded in the store; it is not retried.
    #[instrument(skip(self), fields(provider = %self.provider.name()))]
    pub async fn load_rates(&self) -> FxResult<ExchangeRateData> {
        match self.provider.fetch_rates().await {
            Ok(rates) => {
                info!(
                    date = %rates.date,
                    usd = rates.rates.usd,
                    eur = rates.rates.eur,
                    "Official rates loaded"
                );
                self.store.replace(rates.clone());
                Ok(rates)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    "Rate fetch failed"
                );
                self.store.mark_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Run `load_rates` as a background task.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<FxResult<ExchangeRateData>> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.load_rates().await })
    }

    /// Get the historical series for a currency, from cache when fresh.
    #[instrument(skip(self))]
    pub async fn historical_rates(
        &self,
        currency: ForeignCurrency,
    ) -> FxResult<Arc<Vec<HistoricalRate>>> {
        if let Some(cached) = self.history.get(currency) {
            debug!("Using cached series");
            return Ok(cached);
        }

        let series = self
            .provider
            .fetch_historical_rates(currency, self.config.history_days)
            .await
            .map_err(|e| {
                warn!(error = %e, "Historical fetch failed");
                e
            })?;

        Ok(self.history.insert(currency, series))
    }

    /// Summary statistics of the historical series for a currency.
    pub async fn historical_summary(
        &self,
        currency: ForeignCurrency,
    ) -> FxResult<Option<HistoricalSummary>> {
        let series = self.historical_rates(currency).await?;
        Ok(HistoricalSummary::from_series(&series))
    }

    /// Get service statistics.
    pub fn stats(&self) -> RateServiceStats {
        RateServiceStats {
            status: self.store.status(),
            cached_series: self.history.len(),
        }
    }
}

/// Service statistics.
#[derive(Debug, Clone)]
pub struct RateServiceStats {
    pub status: RateLoadStatus,
    pub cached_series: usize,
}
