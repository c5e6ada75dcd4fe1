//! Session driver.
//!
//! Key events and the background rate fetch are delivered through one
//! queue, so the session sees them strictly one at a time.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use tasacalc_calculator::{
    parse_keys, CalculatorEvent, Notification, Session, SessionConfig, SessionView,
};
use tasacalc_common::{ExchangeRateData, HistoricalSummary};
use tasacalc_fx::{FxError, FxResult, RateService};

use crate::metrics::SessionMetrics;
use crate::scenario::{Scenario, ScenarioStep};

/// Work delivered to the session.
#[derive(Debug)]
enum DriverMessage {
    Event(CalculatorEvent),
    Rates(FxResult<ExchangeRateData>),
}

/// Final state of a driven session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub scenario: String,
    pub view: SessionView,
    pub notifications: Vec<Notification>,
    pub metrics: SessionMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_summary: Option<HistoricalSummary>,
}

/// Drives a session from scripted input.
pub struct SessionDriver {
    session: Session,
    service: Arc<RateService>,
    tx: mpsc::UnboundedSender<DriverMessage>,
    rx: mpsc::UnboundedReceiver<DriverMessage>,
    /// Background rate fetch; `None` once it has ended.
    fetch: Option<JoinHandle<()>>,
    metrics: SessionMetrics,
    notifications: Vec<Notification>,
    rates_delivered: bool,
}

impl SessionDriver {
    /// Create a driver and start the rate fetch in the background.
    pub fn start(config: SessionConfig, service: Arc<RateService>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let fetch_tx = tx.clone();
        let fetch_service = Arc::clone(&service);
        let fetch = tokio::spawn(async move {
            let result = fetch_service.load_rates().await;
            // Receiver gone means the driver already finished.
            let _ = fetch_tx.send(DriverMessage::Rates(result));
        });

        let session = Session::new(config);
        info!(session = %session.id(), provider = %service.provider_name(), "Session started");

        Self {
            session,
            service,
            tx,
            rx,
            fetch: Some(fetch),
            metrics: SessionMetrics::new(),
            notifications: Vec::new(),
            rates_delivered: false,
        }
    }

    /// Queue an event behind anything already pending.
    pub fn send(&self, event: CalculatorEvent) -> anyhow::Result<()> {
        self.tx
            .send(DriverMessage::Event(event))
            .map_err(|_| anyhow::anyhow!("Session queue closed"))
    }

    /// Queue a key sequence.
    pub fn send_keys(&self, keys: &str) -> anyhow::Result<()> {
        for event in parse_keys(keys)? {
            self.send(event)?;
        }
        Ok(())
    }

    /// Run a scenario to completion.
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        for step in &scenario.steps {
            self.execute_step(step).await?;
        }

        Ok(())
    }

    /// Process everything queued so far without waiting.
    pub fn drain(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.process(message);
        }
    }

    /// Wait until the rate fetch has been delivered.
    ///
    /// A fetch task that ends without sending its result counts as a
    /// failed fetch.
    pub async fn wait_for_rates(&mut self) {
        self.drain();
        while !self.rates_delivered {
            let Some(fetch) = self.fetch.as_mut() else {
                break;
            };

            tokio::select! {
                message = self.rx.recv() => match message {
                    Some(message) => self.process(message),
                    None => break,
                },
                joined = fetch => {
                    self.fetch = None;
                    // The result may already be queued.
                    self.drain();
                    if !self.rates_delivered {
                        let reason = match joined {
                            Ok(()) => "fetch task ended without a result".to_string(),
                            Err(e) => e.to_string(),
                        };
                        warn!(reason = %reason, "Rate fetch task lost");
                        let error = FxError::FetchFailed {
                            provider: self.service.provider_name().to_string(),
                            reason,
                        };
                        self.process(DriverMessage::Rates(Err(error)));
                    }
                }
            }
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Wait for pending work and produce the report.
    pub async fn finish(mut self, scenario: &str, with_history: bool) -> SessionReport {
        self.wait_for_rates().await;

        let history_summary = if with_history {
            let currency = self.session.resolver().selected();
            match self.service.historical_summary(currency).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!(error = %e, "Historical summary unavailable");
                    None
                }
            }
        } else {
            None
        };

        self.notifications.extend(self.session.take_notifications());

        SessionReport {
            session_id: self.session.id(),
            scenario: scenario.to_string(),
            view: self.session.view(),
            notifications: self.notifications,
            metrics: self.metrics,
            history_summary,
        }
    }

    fn process(&mut self, message: DriverMessage) {
        match message {
            DriverMessage::Event(event) => {
                let result = self.session.handle(event.clone());
                self.metrics.record_event(&event, &result);
            }
            DriverMessage::Rates(result) => {
                self.metrics.record_rate_load(result.is_ok());
                self.rates_delivered = true;
                self.session.apply_rates(result);
                for notification in self.session.take_notifications() {
                    warn!("{}: {}", notification.title, notification.description);
                    self.notifications.push(notification);
                }
            }
        }
    }

    /// Execute a single scenario step.
    async fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::Keys { keys } => {
                self.send_keys(keys)?;
                self.drain();
            }
            ScenarioStep::Event { event } => {
                self.send(event.clone())?;
                self.drain();
            }
            ScenarioStep::CustomRate { text } => {
                self.send(CalculatorEvent::SetCustomRateText(text.clone()))?;
                self.drain();
            }
            ScenarioStep::WaitForRates => {
                self.wait_for_rates().await;
            }
            ScenarioStep::Wait { millis } => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
                self.drain();
            }
            ScenarioStep::Expect { expectation } => {
                let view = self.session.view();
                match expectation.check(&view) {
                    Ok(()) => {
                        info!("Expectation met: {:?}", expectation);
                        self.metrics.record_expectation(true);
                    }
                    Err(actual) => {
                        warn!("Expectation failed: {:?}, observed {:?}", expectation, actual);
                        self.metrics.record_expectation(false);
                    }
                }
            }
        }

        Ok(())
    }
}
