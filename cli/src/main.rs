//! Tasacalc CLI
//!
//! Drives a calculator session from a key sequence, a JSON script or a
//! built-in scenario, and prints the final view as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod metrics;
mod scenario;

use controller::SessionDriver;
use scenario::Scenario;
use tasacalc_calculator::{CalculatorEvent, SessionConfig, SwapPolicy};
use tasacalc_common::ForeignCurrency;
use tasacalc_fx::{RateService, RateServiceConfig, StaticRateProvider, StaticRateProviderConfig};

/// Tasacalc CLI
#[derive(Parser, Debug)]
#[command(name = "tasacalc")]
#[command(about = "USD/EUR to bolivar calculator")]
struct Args {
    /// Key sequence to press, e.g. "10+5=" (c clear, < backspace, s swap, u/e currency, r custom rate)
    #[arg(short, long)]
    keys: Option<String>,

    /// JSON scenario file to run
    #[arg(long, conflicts_with = "scenario")]
    script: Option<PathBuf>,

    /// Built-in scenario to run
    #[arg(short, long)]
    scenario: Option<String>,

    /// Foreign currency selected at start (USD or EUR)
    #[arg(short, long)]
    currency: Option<ForeignCurrency>,

    /// Start with this custom rate instead of the official one
    #[arg(long)]
    custom_rate: Option<String>,

    /// What a swap does with a pending addition chain (discard or preserve)
    #[arg(long)]
    swap_policy: Option<SwapPolicy>,

    /// Simulated latency of the rate fetch
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Make the rate fetch fail
    #[arg(long)]
    fail_fetch: bool,

    /// Random seed for reproducible historical series
    #[arg(long)]
    seed: Option<u64>,

    /// Include a summary of the historical series
    #[arg(long)]
    history: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            args.log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!args.log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let mut config = SessionConfig::from_env();
    if let Some(currency) = args.currency {
        config.default_currency = currency;
    }
    if let Some(policy) = args.swap_policy {
        config.swap_policy = policy;
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let mut provider_config = StaticRateProviderConfig {
        seed: args.seed,
        fail: args.fail_fetch,
        ..Default::default()
    };
    if let Some(ms) = args.latency_ms {
        provider_config.latency = chrono::Duration::milliseconds(ms as i64);
    }

    let service_config = RateServiceConfig::default();
    service_config.validate().map_err(|e| anyhow::anyhow!(e))?;
    let service = Arc::new(RateService::new(
        Arc::new(StaticRateProvider::with_config(provider_config)),
        service_config,
    ));

    info!("Starting Tasacalc");
    info!("Currency: {}", config.default_currency);
    info!("Swap policy: {}", config.swap_policy);

    let mut driver = SessionDriver::start(config, service);

    if let Some(rate) = &args.custom_rate {
        driver.send(CalculatorEvent::ToggleCustomRate)?;
        driver.send(CalculatorEvent::SetCustomRateText(rate.clone()))?;
    }

    let scenario = if let Some(path) = &args.script {
        Some(Scenario::from_file(path)?)
    } else if let Some(name) = &args.scenario {
        Some(Scenario::load(name)?)
    } else {
        args.keys.as_deref().map(Scenario::from_keys)
    };

    let name = match &scenario {
        Some(scenario) => {
            driver.run_scenario(scenario).await?;
            info!(
                "Scenario {} finished after {} events",
                scenario.name,
                driver.metrics().events_handled
            );
            scenario.name.clone()
        }
        None => {
            info!("No input given; showing the initial session");
            "initial".to_string()
        }
    };

    // Keys given alongside a scenario run after it.
    if args.script.is_some() || args.scenario.is_some() {
        if let Some(keys) = &args.keys {
            driver.send_keys(keys)?;
        }
    }

    let report = driver.finish(&name, args.history).await;

    info!("Session complete");
    info!("Events: {}", report.metrics.events_handled);
    info!("Rejected: {}", report.metrics.events_rejected);
    info!("Evaluations: {}", report.metrics.evaluations);
    info!("Acceptance rate: {:.2}", report.metrics.acceptance_rate());
    if report.metrics.expectations_failed > 0 {
        info!("Failed expectations: {}", report.metrics.expectations_failed);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
