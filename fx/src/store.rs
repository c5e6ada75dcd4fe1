//! Shared holder for the current official rates.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tasacalc_common::ExchangeRateData;
use tracing::debug;

/// Load status of the official rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum RateLoadStatus {
    /// Fetch in flight; calculator runs with rate 0.
    Loading,
    /// Rates available.
    Ready,
    /// Fetch failed; calculator stays in degraded mode.
    Failed(String),
}

#[derive(Debug)]
struct StoreInner {
    rates: Option<ExchangeRateData>,
    status: RateLoadStatus,
}

/// Holds the single rates object shared between the fetch task and the session.
///
/// The object is replaced as a whole; readers get a snapshot clone.
#[derive(Debug)]
pub struct RateStore {
    inner: RwLock<StoreInner>,
}

impl RateStore {
    /// Create an empty store in the `Loading` state.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                rates: None,
                status: RateLoadStatus::Loading,
            }),
        }
    }

    /// Snapshot of the current rates.
    pub fn snapshot(&self) -> Option<ExchangeRateData> {
        self.inner.read().rates.clone()
    }

    /// Current load status.
    pub fn status(&self) -> RateLoadStatus {
        self.inner.read().status.clone()
    }

    /// Replace the rates object and mark the store ready.
    pub fn replace(&self, rates: ExchangeRateData) {
        debug!(date = %rates.date, "Replacing official rates");
        let mut inner = self.inner.write();
        inner.rates = Some(rates);
        inner.status = RateLoadStatus::Ready;
    }

    /// Record a failed fetch. Previously loaded rates are kept.
    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.inner.write().status = RateLoadStatus::Failed(reason.into());
    }
}

impl Default for RateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared rate store.
pub type SharedRateStore = Arc<RateStore>;
