//! Session metrics.

use std::collections::BTreeMap;

use serde::Serialize;
use tasacalc_calculator::{CalculatorEvent, InputResult};

/// Counters collected while driving a session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionMetrics {
    /// Events handed to the session.
    pub events_handled: u64,
    /// Events the session rejected.
    pub events_rejected: u64,
    /// Rejections by error code.
    pub rejections: BTreeMap<&'static str, u64>,
    /// Successful `=` presses.
    pub evaluations: u64,
    /// Direction swaps.
    pub swaps: u64,
    /// Rate loads that completed, successful or not.
    pub rate_loads: u64,
    pub rate_load_failures: u64,
    pub expectations_passed: u64,
    pub expectations_failed: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one event.
    pub fn record_event(&mut self, event: &CalculatorEvent, result: &InputResult<()>) {
        self.events_handled += 1;

        match result {
            Ok(()) => match event {
                CalculatorEvent::Equals => self.evaluations += 1,
                CalculatorEvent::SwapDirection => self.swaps += 1,
                _ => {}
            },
            Err(e) => {
                self.events_rejected += 1;
                *self.rejections.entry(e.code()).or_insert(0) += 1;
            }
        }
    }

    /// Record a completed rate load.
    pub fn record_rate_load(&mut self, success: bool) {
        self.rate_loads += 1;
        if !success {
            self.rate_load_failures += 1;
        }
    }

    /// Record a scenario expectation.
    pub fn record_expectation(&mut self, passed: bool) {
        if passed {
            self.expectations_passed += 1;
        } else {
            self.expectations_failed += 1;
        }
    }

    /// Share of events that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.events_handled == 0 {
            return 0.0;
        }

        (self.events_handled - self.events_rejected) as f64 / self.events_handled as f64
    }
}
