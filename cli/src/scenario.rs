//! Scripted calculator sessions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tasacalc_calculator::{CalculatorEvent, SessionView};

/// A scripted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Press a key sequence, e.g. `"10+5="`.
    Keys { keys: String },
    /// Send a single event.
    Event { event: CalculatorEvent },
    /// Replace the custom rate text.
    CustomRate { text: String },
    /// Block until the rate fetch has been delivered.
    WaitForRates,
    /// Sleep, letting background work land.
    Wait { millis: u64 },
    /// Check the rendered session.
    Expect { expectation: Expectation },
}

/// Conditions checked against the session view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Conversion output reads exactly `display`.
    Output { display: String },
    /// Current operand reads exactly `display`.
    Operand { display: String },
    /// Pending expression reads exactly `display`.
    Expression { display: String },
    /// History holds `count` entries.
    HistoryLen { count: usize },
    /// Error flash is raised or not.
    ErrorFlash { raised: bool },
}

impl Expectation {
    /// Check the expectation, returning what was observed on mismatch.
    pub fn check(&self, view: &SessionView) -> Result<(), String> {
        let (expected, actual) = match self {
            Expectation::Output { display } => (display.clone(), view.conversion_output_display.clone()),
            Expectation::Operand { display } => (display.clone(), view.current_operand_display.clone()),
            Expectation::Expression { display } => (display.clone(), view.expression_display.clone()),
            Expectation::HistoryLen { count } => (count.to_string(), view.history_entries.len().to_string()),
            Expectation::ErrorFlash { raised } => (raised.to_string(), view.error_flash.to_string()),
        };

        if expected == actual {
            Ok(())
        } else {
            Err(actual)
        }
    }
}

impl Scenario {
    /// Load a built-in scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "simple-conversion" => Ok(Self::simple_conversion()),
            "addition-chain" => Ok(Self::addition_chain()),
            "custom-rate" => Ok(Self::custom_rate()),
            "swap-mid-expression" => Ok(Self::swap_mid_expression()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// Load a scenario from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Wrap a bare key sequence.
    pub fn from_keys(keys: &str) -> Self {
        Self {
            name: "keys".to_string(),
            description: format!("Key sequence {keys:?}"),
            steps: vec![ScenarioStep::Keys {
                keys: keys.to_string(),
            }],
        }
    }

    /// Ten dollars into bolivares.
    fn simple_conversion() -> Self {
        Self {
            name: "simple-conversion".to_string(),
            description: "Convert 10 USD at the official rate".to_string(),
            steps: vec![
                ScenarioStep::WaitForRates,
                ScenarioStep::Keys {
                    keys: "10".to_string(),
                },
                expect(Expectation::Output {
                    display: "1403,30".to_string(),
                }),
                ScenarioStep::Keys {
                    keys: "e".to_string(),
                },
                expect(Expectation::Output {
                    display: "1512,00".to_string(),
                }),
            ],
        }
    }

    /// Sum a chain and continue from the result.
    fn addition_chain() -> Self {
        Self {
            name: "addition-chain".to_string(),
            description: "Add amounts and convert the total".to_string(),
            steps: vec![
                ScenarioStep::WaitForRates,
                ScenarioStep::Keys {
                    keys: "5+3".to_string(),
                },
                expect(Expectation::Expression {
                    display: "5 +".to_string(),
                }),
                ScenarioStep::Keys {
                    keys: "=".to_string(),
                },
                expect(Expectation::Operand {
                    display: "8".to_string(),
                }),
                expect(Expectation::Output {
                    display: "1122,64".to_string(),
                }),
                ScenarioStep::Keys {
                    keys: "+2=".to_string(),
                },
                expect(Expectation::HistoryLen { count: 2 }),
                ScenarioStep::Keys {
                    keys: "=".to_string(),
                },
                expect(Expectation::HistoryLen { count: 3 }),
            ],
        }
    }

    /// Override the official rate and go back.
    fn custom_rate() -> Self {
        Self {
            name: "custom-rate".to_string(),
            description: "Convert at a user-entered rate, then restore the official one".to_string(),
            steps: vec![
                ScenarioStep::WaitForRates,
                ScenarioStep::Keys {
                    keys: "2r".to_string(),
                },
                ScenarioStep::CustomRate {
                    text: "36,5".to_string(),
                },
                expect(Expectation::Output {
                    display: "73,00".to_string(),
                }),
                ScenarioStep::CustomRate {
                    text: "36,5,".to_string(),
                },
                expect(Expectation::ErrorFlash { raised: true }),
                ScenarioStep::Keys {
                    keys: "r".to_string(),
                },
                expect(Expectation::Output {
                    display: "280,66".to_string(),
                }),
            ],
        }
    }

    /// Swap while a chain is still pending.
    fn swap_mid_expression() -> Self {
        Self {
            name: "swap-mid-expression".to_string(),
            description: "Swap direction with an unevaluated chain".to_string(),
            steps: vec![
                ScenarioStep::WaitForRates,
                ScenarioStep::Keys {
                    keys: "5+3s".to_string(),
                },
                expect(Expectation::Expression {
                    display: String::new(),
                }),
                expect(Expectation::HistoryLen { count: 0 }),
            ],
        }
    }
}

fn expect(expectation: Expectation) -> ScenarioStep {
    ScenarioStep::Expect { expectation }
}
