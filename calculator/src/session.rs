//! The calculator session: keypad state, rate selection and live conversion.
//!
//! A [`Session`] processes one [`CalculatorEvent`] at a time to completion.
//! After every event the conversion output is recomputed explicitly with
//! [`recompute_conversion`] from the conversion basis, the active rate and
//! the direction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tasacalc_common::{
    operand_text, round_places, ConversionDirection, Currency, ExchangeRateData, Rate,
};
use tasacalc_fx::{convert_value, Conversion, FxResult, RateLoadStatus, RateResolver, RateStore};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::direction::{DirectionController, SwapPolicy};
use crate::error::{InputError, InputResult};
use crate::event::CalculatorEvent;
use crate::expression::{History, HistoryEntry, Operator};
use crate::operand::{Digit, Operand};
use crate::state::CalculatorState;

/// Compute the conversion of the basis amount at the given rate and direction.
pub fn recompute_conversion(basis: &str, rate: Rate, direction: ConversionDirection) -> Conversion {
    Conversion::compute(basis, rate, direction)
}

/// A one-shot message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    fn fetch_failed() -> Self {
        Self {
            title: "Error".to_string(),
            description: "Could not fetch exchange rates.".to_string(),
        }
    }
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub from_currency: Currency,
    pub from_symbol: String,
    pub to_currency: Currency,
    pub to_symbol: String,
    pub current_operand_display: String,
    pub expression_display: String,
    pub conversion_output_display: String,
    /// e.g. `"1 USD = 140,33 VES"`, using the active rate.
    pub active_rate_display: String,
    /// Official rate of the selected currency; `None` while loading.
    pub official_rate_display: Option<String>,
    pub rate_date: Option<NaiveDate>,
    pub rate_status: RateLoadStatus,
    pub uses_custom_rate: bool,
    pub custom_rate_text: String,
    pub history_entries: Vec<HistoryEntry>,
    /// Set when the last event was rejected.
    pub error_flash: bool,
}

/// A calculator session.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    state: CalculatorState,
    resolver: RateResolver,
    direction: DirectionController,
    rates: Option<ExchangeRateData>,
    rate_status: RateLoadStatus,
    history: History,
    /// Amount the live conversion is computed from.
    basis: String,
    conversion: Conversion,
    error_flash: bool,
    failure_notified: bool,
    notifications: Vec<Notification>,
}

impl Session {
    /// Start a session. Rates are not loaded yet, so conversions yield zero.
    pub fn new(config: SessionConfig) -> Self {
        let resolver = RateResolver::new(config.default_currency);
        let direction = DirectionController::default();
        let conversion = Conversion::zero(resolver.active(None), direction.direction());

        Self {
            id: Uuid::now_v7(),
            config,
            state: CalculatorState::new(),
            resolver,
            direction,
            rates: None,
            rate_status: RateLoadStatus::Loading,
            history: History::new(),
            basis: Operand::zero().to_string(),
            conversion,
            error_flash: false,
            failure_notified: false,
            notifications: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn direction(&self) -> ConversionDirection {
        self.direction.direction()
    }

    pub fn resolver(&self) -> &RateResolver {
        &self.resolver
    }

    pub fn rate_status(&self) -> &RateLoadStatus {
        &self.rate_status
    }

    /// Amount the live conversion is currently computed from.
    pub fn basis(&self) -> &str {
        &self.basis
    }

    /// Whether the last event was rejected.
    pub fn error_flash(&self) -> bool {
        self.error_flash
    }

    /// The rate conversions currently use.
    pub fn active_rate(&self) -> Rate {
        self.resolver.active(self.rates.as_ref())
    }

    /// Drain pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Process one event to completion.
    ///
    /// A rejected event leaves the state unchanged, raises the error flash
    /// and returns the reason.
    pub fn handle(&mut self, event: CalculatorEvent) -> InputResult<()> {
        self.error_flash = false;

        let result = self.apply(&event);
        match &result {
            Ok(()) => self.refresh(),
            Err(e) => {
                debug!(session = %self.id, code = e.code(), event = ?event, "Input rejected");
                self.error_flash = true;
            }
        }
        result
    }

    /// Deliver the outcome of the background rate fetch.
    ///
    /// A failure is reported once as a notification; the session keeps
    /// running with whatever rates it has (rate 0 if none).
    pub fn apply_rates(&mut self, result: FxResult<ExchangeRateData>) {
        match result {
            Ok(rates) => {
                debug!(session = %self.id, date = %rates.date, "Rates applied");
                self.rates = Some(rates);
                self.rate_status = RateLoadStatus::Ready;
            }
            Err(e) => {
                self.rate_status = RateLoadStatus::Failed(e.to_string());
                self.notify_failure();
            }
        }
        self.refresh();
    }

    /// Pick up the latest rates object and status from a shared store.
    pub fn sync_from_store(&mut self, store: &RateStore) {
        if let Some(rates) = store.snapshot() {
            self.rates = Some(rates);
        }
        self.rate_status = store.status();
        if matches!(self.rate_status, RateLoadStatus::Failed(_)) {
            self.notify_failure();
        }
        self.refresh();
    }

    /// Snapshot of everything the presentation layer renders.
    pub fn view(&self) -> SessionView {
        let fmt = &self.config.number_format;
        let places = self.config.output_places;
        let foreign = self.resolver.selected();
        let from = self.direction.from_currency(foreign);
        let to = self.direction.to_currency(foreign);
        let active = self.active_rate();

        let rate_label = |value: f64| {
            format!(
                "1 {} = {} {}",
                foreign,
                fmt.format_fixed(value, places),
                Currency::LOCAL
            )
        };

        SessionView {
            from_currency: from,
            from_symbol: from.symbol().to_string(),
            to_currency: to,
            to_symbol: to.symbol().to_string(),
            current_operand_display: fmt.format_operand(self.state.current_operand().as_str()),
            expression_display: self.state.expression().trim_end().to_string(),
            conversion_output_display: fmt.format_fixed(self.conversion.output, places),
            active_rate_display: rate_label(active.value),
            official_rate_display: self
                .rates
                .as_ref()
                .map(|rates| rate_label(self.resolver.official(Some(rates)).value)),
            rate_date: self.rates.as_ref().map(|rates| rates.date),
            rate_status: self.rate_status.clone(),
            uses_custom_rate: self.resolver.uses_custom(),
            custom_rate_text: self.resolver.custom_text().to_string(),
            history_entries: self.history.entries().to_vec(),
            error_flash: self.error_flash,
        }
    }

    fn apply(&mut self, event: &CalculatorEvent) -> InputResult<()> {
        match event {
            CalculatorEvent::Digit(digit) => self.press_digit(*digit),
            CalculatorEvent::DecimalSeparator => {
                self.state = self.state.press_separator()?;
                Ok(())
            }
            CalculatorEvent::Backspace => {
                self.state = self.state.backspace();
                Ok(())
            }
            CalculatorEvent::Clear => {
                self.clear();
                Ok(())
            }
            CalculatorEvent::Operator(op) => self.press_operator(*op),
            CalculatorEvent::Equals => self.evaluate(),
            CalculatorEvent::SelectCurrency(currency) => {
                self.resolver.select_currency(*currency);
                Ok(())
            }
            CalculatorEvent::ToggleCustomRate => {
                self.resolver.toggle_custom();
                Ok(())
            }
            CalculatorEvent::SetCustomRateText(text) => self
                .resolver
                .set_custom_text(text)
                .map_err(|_| InputError::InvalidCustomRate(text.clone())),
            CalculatorEvent::SwapDirection => self.swap(),
        }
    }

    fn press_digit(&mut self, digit: Digit) -> InputResult<()> {
        self.state = self.state.press_digit(digit, self.config.max_digits)?;
        Ok(())
    }

    fn press_operator(&mut self, op: Operator) -> InputResult<()> {
        let next = self.state.press_operator(op)?;
        // Live conversion freezes at the operand just committed.
        self.basis = self.state.current_operand().to_string();
        self.state = next;
        Ok(())
    }

    fn evaluate(&mut self) -> InputResult<()> {
        let evaluation = self.state.evaluate(self.config.max_digits)?;
        info!(
            session = %self.id,
            expression = %evaluation.entry.expression_text,
            result = %evaluation.entry.result,
            "Expression evaluated"
        );
        self.history.push(evaluation.entry);
        self.state = evaluation.state;
        Ok(())
    }

    fn clear(&mut self) {
        self.state = self.state.clear();
        self.basis = Operand::zero().to_string();
        self.conversion = Conversion::zero(self.active_rate(), self.direction());
    }

    /// Toggle the direction, carrying the converted amount as the new input.
    ///
    /// A carried amount too long for an operand rejects the swap.
    fn swap(&mut self) -> InputResult<()> {
        let carried = if self.state.has_pending_expression() {
            match self.config.swap_policy {
                SwapPolicy::Discard => None,
                SwapPolicy::Preserve => Some(convert_value(
                    self.state.partial_sum(),
                    self.active_rate().value,
                    self.direction(),
                )),
            }
        } else {
            Some(self.conversion.output)
        };

        let max_digits = self.config.max_digits;
        let next = match carried {
            Some(value) if value != 0.0 => {
                let rounded = round_places(value, self.config.output_places);
                let text = operand_text(rounded, max_digits)
                    .ok_or(InputError::InputTooLong { max_digits })?;
                CalculatorState::with_result(Operand::from_text(text))
            }
            _ => CalculatorState::new(),
        };

        let direction = self.direction.swap();
        self.state = next;
        self.basis = self.state.current_operand().to_string();

        debug!(
            session = %self.id,
            direction = %direction,
            policy = %self.config.swap_policy,
            operand = %self.state.current_operand(),
            "Direction swapped"
        );
        Ok(())
    }

    /// Follow the live operand while no chain is pending, then recompute.
    fn refresh(&mut self) {
        if !self.state.has_pending_expression() {
            self.basis = self.state.current_operand().to_string();
        }
        self.conversion = recompute_conversion(&self.basis, self.active_rate(), self.direction());
    }

    fn notify_failure(&mut self) {
        if self.failure_notified {
            return;
        }
        warn!(session = %self.id, "Running without official rates");
        self.failure_notified = true;
        self.notifications.push(Notification::fetch_failed());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_keys;
    use tasacalc_common::{ForeignCurrency, OfficialRates, RateSource};
    use tasacalc_fx::FxError;
    use tokio_test::{assert_err, assert_ok};

    fn rates() -> ExchangeRateData {
        ExchangeRateData::new(OfficialRates::new(140.33, 151.2), "2024-05-02".parse().unwrap())
    }

    fn loaded_session(config: SessionConfig) -> Session {
        let mut session = Session::new(config);
        session.apply_rates(Ok(rates()));
        session
    }

    fn press(session: &mut Session, keys: &str) -> Vec<InputResult<()>> {
        parse_keys(keys)
            .unwrap()
            .into_iter()
            .map(|event| session.handle(event))
            .collect()
    }

    #[test]
    fn test_ten_dollars_in_bolivares() {
        let mut session = loaded_session(SessionConfig::default());

        press(&mut session, "10");

        let view = session.view();
        assert_eq!(view.conversion_output_display, "1403,30");
        assert_eq!(view.current_operand_display, "10");
        assert_eq!(view.from_currency, Currency::Usd);
        assert_eq!(view.to_currency, Currency::Ves);
        assert_eq!(view.active_rate_display, "1 USD = 140,33 VES");
    }

    #[test]
    fn test_conversion_zero_while_loading() {
        let mut session = Session::default();

        press(&mut session, "10");

        let view = session.view();
        assert_eq!(view.rate_status, RateLoadStatus::Loading);
        assert_eq!(view.conversion_output_display, "0,00");
        assert!(view.official_rate_display.is_none());

        session.apply_rates(Ok(rates()));
        assert_eq!(session.view().conversion_output_display, "1403,30");
    }

    #[test]
    fn test_evaluate_records_history() {
        let mut session = loaded_session(SessionConfig::default());

        press(&mut session, "5+3=");

        assert_eq!(session.state().current_operand().as_str(), "8");
        assert!(session.state().overwrite());
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().entries()[0].to_string(), "5 + 3 = 8");
        assert!((session.conversion().output - 8.0 * 140.33).abs() < 1e-9);
    }

    #[test]
    fn test_basis_freezes_while_expression_pending() {
        let mut session = loaded_session(SessionConfig::default());

        press(&mut session, "5+3");
        assert_eq!(session.basis(), "5");
        assert!((session.conversion().output - 5.0 * 140.33).abs() < 1e-9);

        press(&mut session, "+2");
        assert_eq!(session.basis(), "3");

        press(&mut session, "=");
        assert_eq!(session.basis(), "10");
    }

    #[test]
    fn test_rejected_input_flashes_and_keeps_state() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "1,");

        let results = press(&mut session, ",");

        assert_eq!(results, vec![Err(InputError::DuplicateSeparator)]);
        assert!(session.error_flash());
        assert_eq!(session.state().current_operand().as_str(), "1,");

        press(&mut session, "5");
        assert!(!session.error_flash());
        assert_eq!(session.view().current_operand_display, "1,5");
    }

    #[test]
    fn test_too_long_flashes() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "999999999999999");

        let results = press(&mut session, "9");

        assert_eq!(results, vec![Err(InputError::InputTooLong { max_digits: 15 })]);
        assert!(session.view().error_flash);
    }

    #[test]
    fn test_empty_operator_and_equals_flash() {
        let mut session = loaded_session(SessionConfig::default());

        assert_eq!(press(&mut session, "+"), vec![Err(InputError::EmptyOperand)]);
        assert_eq!(press(&mut session, "="), vec![Err(InputError::EmptyOperand)]);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_clear_resets_output() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "5+3");

        press(&mut session, "c");

        assert!(session.state().is_initial());
        assert_eq!(session.conversion().output, 0.0);
        assert_eq!(session.view().conversion_output_display, "0,00");
    }

    #[test]
    fn test_custom_rate_round_trip_restores_official() {
        let mut session = loaded_session(SessionConfig::default());

        session.handle(CalculatorEvent::ToggleCustomRate).unwrap();
        session
            .handle(CalculatorEvent::SetCustomRateText("100,5".to_string()))
            .unwrap();
        let custom = session.active_rate();
        assert_eq!(custom.value, 100.5);
        assert_eq!(custom.source, RateSource::Custom);

        session.handle(CalculatorEvent::ToggleCustomRate).unwrap();
        session
            .handle(CalculatorEvent::SelectCurrency(ForeignCurrency::Usd))
            .unwrap();

        let official = session.active_rate();
        assert_eq!(official.value, 140.33);
        assert_eq!(official.source, RateSource::Official);
    }

    #[test]
    fn test_custom_rate_recomputes_output() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "2");

        session.handle(CalculatorEvent::ToggleCustomRate).unwrap();
        assert_eq!(session.view().conversion_output_display, "0,00");

        session
            .handle(CalculatorEvent::SetCustomRateText("36,5".to_string()))
            .unwrap();
        assert_eq!(session.view().conversion_output_display, "73,00");
        assert_eq!(session.view().official_rate_display.as_deref(), Some("1 USD = 140,33 VES"));
    }

    #[test]
    fn test_invalid_custom_rate_rejected() {
        let mut session = loaded_session(SessionConfig::default());
        session.handle(CalculatorEvent::ToggleCustomRate).unwrap();
        session
            .handle(CalculatorEvent::SetCustomRateText("36".to_string()))
            .unwrap();

        let result = session.handle(CalculatorEvent::SetCustomRateText("36,5.1".to_string()));

        assert_eq!(result, Err(InputError::InvalidCustomRate("36,5.1".to_string())));
        assert!(session.error_flash());
        assert_eq!(session.view().custom_rate_text, "36");
    }

    #[test]
    fn test_select_currency_switches_rate() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "1e");

        let view = session.view();
        assert_eq!(view.from_currency, Currency::Eur);
        assert_eq!(view.conversion_output_display, "151,20");
    }

    #[test]
    fn test_swap_carries_output() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "10");

        press(&mut session, "s");

        assert_eq!(session.direction(), ConversionDirection::LocalToForeign);
        assert_eq!(session.state().current_operand().as_str(), "1403,3");
        assert!(session.state().overwrite());
        let view = session.view();
        assert_eq!(view.from_currency, Currency::Ves);
        assert_eq!(view.to_currency, Currency::Usd);
        assert_eq!(view.conversion_output_display, "10,00");
    }

    #[test]
    fn test_swap_with_pending_expression_discards() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "5+3");

        press(&mut session, "s");

        assert!(session.state().is_initial());
        assert_eq!(session.state().expression(), "");
        assert_eq!(session.conversion().output, 0.0);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_swap_with_pending_expression_preserves() {
        let config = SessionConfig {
            swap_policy: SwapPolicy::Preserve,
            ..Default::default()
        };
        let mut session = loaded_session(config);
        press(&mut session, "5+3");

        press(&mut session, "s");

        // 8 USD at 140.33 = 1122.64 VES, carried as the new input
        assert_eq!(session.state().current_operand().as_str(), "1122,64");
        assert_eq!(session.state().expression(), "");
        assert!(session.history().is_empty());
        assert_eq!(session.view().conversion_output_display, "8,00");
    }

    #[test]
    fn test_swap_rejects_carry_beyond_digit_cap() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "999999999999999");

        let error = assert_err!(session.handle(CalculatorEvent::SwapDirection));

        assert_eq!(error, InputError::InputTooLong { max_digits: 15 });
        assert!(session.error_flash());
        assert_eq!(session.direction(), ConversionDirection::ForeignToLocal);
        assert_eq!(session.state().current_operand().as_str(), "999999999999999");
    }

    #[test]
    fn test_swap_carry_stays_within_digit_cap() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "7777777777");

        press(&mut session, "s");

        let operand = session.state().current_operand();
        assert!(operand.digit_count() <= 15);
        assert_eq!(operand.as_str(), "1091455555446,41");
        assert_eq!(session.direction(), ConversionDirection::LocalToForeign);
    }

    #[test]
    fn test_evaluate_beyond_digit_cap_flashes() {
        let mut session = loaded_session(SessionConfig::default());

        let results = press(&mut session, "999999999999999+999999999999999=");

        assert_eq!(results.last(), Some(&Err(InputError::InputTooLong { max_digits: 15 })));
        assert!(session.history().is_empty());
        assert_eq!(session.view().expression_display, "999999999999999 +");
    }

    #[test]
    fn test_swap_at_zero_stays_initial() {
        let mut session = loaded_session(SessionConfig::default());

        press(&mut session, "s");

        assert!(session.state().is_initial());
        assert_eq!(session.direction(), ConversionDirection::LocalToForeign);
    }

    #[test]
    fn test_fetch_failure_notifies_once() {
        let mut session = Session::default();
        let failure = || {
            Err(FxError::FetchFailed {
                provider: "test".to_string(),
                reason: "offline".to_string(),
            })
        };

        session.apply_rates(failure());
        session.apply_rates(failure());

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].description, "Could not fetch exchange rates.");
        assert!(session.take_notifications().is_empty());

        // Calculator keeps working in degraded mode
        press(&mut session, "5+5=");
        assert_eq!(session.state().current_operand().as_str(), "10");
        assert_eq!(session.view().conversion_output_display, "0,00");
    }

    #[test]
    fn test_sync_from_store() {
        let store = RateStore::new();
        let mut session = Session::default();
        press(&mut session, "3");

        store.replace(rates());
        session.sync_from_store(&store);

        assert_eq!(session.rate_status(), &RateLoadStatus::Ready);
        assert_eq!(
            session.view().rate_date,
            Some(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        );
        assert_eq!(session.view().conversion_output_display, "420,99");
    }

    #[tokio::test]
    async fn test_background_load_feeds_session() {
        use std::sync::Arc;
        use tasacalc_fx::{MockRateProvider, RateService, RateServiceConfig};

        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rates(rates());
        let service = Arc::new(RateService::new(provider, RateServiceConfig::default()));
        let mut session = Session::default();

        press(&mut session, "10");
        assert_eq!(session.conversion().output, 0.0);

        let loaded = assert_ok!(assert_ok!(service.spawn_load().await));
        session.apply_rates(Ok(loaded));

        assert_eq!(session.view().conversion_output_display, "1403,30");
        assert!(session.take_notifications().is_empty());
    }

    #[test]
    fn test_view_serializes() {
        let mut session = loaded_session(SessionConfig::default());
        press(&mut session, "12345,5");

        let json = serde_json::to_value(session.view()).unwrap();

        assert_eq!(json["current_operand_display"], "12.345,5");
        assert_eq!(json["from_symbol"], "$");
        assert_eq!(json["to_symbol"], "Bs");
        assert_eq!(json["rate_status"]["status"], "ready");
    }
}
