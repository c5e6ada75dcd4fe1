//! Tasacalc FX
//!
//! Reference rate feed and conversion for the calculator.
//!
//! # Features
//!
//! - Asynchronous rate provider trait with a built-in provider
//! - Shared rate store replaced atomically when a fetch completes
//! - Historical series caching with configurable TTL
//! - Official vs. custom rate resolution
//! - Bidirectional foreign/local conversion
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tasacalc_fx::{RateService, RateServiceConfig, StaticRateProvider, convert};
//! use tasacalc_common::{ConversionDirection, ForeignCurrency};
//!
//! let service = RateService::new(Arc::new(StaticRateProvider::new()), RateServiceConfig::default());
//! let rates = service.load_rates().await?;
//!
//! let ves = convert("10", rates.rate_for(ForeignCurrency::Usd), ConversionDirection::ForeignToLocal);
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod store;

pub use cache::{HistoricalCacheConfig, HistoricalRateCache};
pub use conversion::{convert, convert_value, Conversion};
pub use engine::{RateService, RateServiceConfig, RateServiceStats};
pub use error::{FxError, FxResult};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
pub use provider::{RateProvider, StaticRateProvider, StaticRateProviderConfig};
pub use resolver::{active_rate, is_valid_custom_rate_text, RateResolver};
pub use store::{RateLoadStatus, RateStore, SharedRateStore};
