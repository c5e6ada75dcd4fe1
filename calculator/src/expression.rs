//! Addition chains and their evaluation.
//!
//! The calculator accumulates `operand (+ operand)*` and sums it on `=`.
//! There is no precedence and no other operator: it is an accumulation
//! list, not an expression grammar.

use serde::{Deserialize, Serialize};
use std::fmt;
use tasacalc_common::{lenient_amount, operand_text};

use crate::error::{InputError, InputResult};
use crate::operand::Operand;
use crate::state::CalculatorState;

/// A binary operator key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Sum addition terms, counting every unparsable term as zero.
///
/// Malformed terms never abort an evaluation; they contribute nothing.
pub fn lenient_sum<'a>(terms: impl IntoIterator<Item = &'a str>) -> f64 {
    terms.into_iter().map(lenient_amount).sum()
}

/// Split an expression on `+` and sum its terms leniently.
pub fn sum_expression(expression: &str) -> f64 {
    lenient_sum(expression.split(Operator::Add.symbol()))
}

/// A completed evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The evaluated chain, e.g. `"5 + 3"`.
    pub expression_text: String,
    /// The result as operand text, e.g. `"8"`.
    pub result: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.expression_text, self.result)
    }
}

/// Append-only log of evaluations for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of pressing `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// State after evaluation: the result in overwrite mode.
    pub state: CalculatorState,
    /// Entry to append to history.
    pub entry: HistoryEntry,
    /// Numeric result.
    pub value: f64,
}

impl CalculatorState {
    /// Press an operator key, committing the current operand to the chain.
    pub fn press_operator(&self, op: Operator) -> InputResult<Self> {
        if self.current_operand.is_zero() && self.expression.is_empty() {
            return Err(InputError::EmptyOperand);
        }

        Ok(Self {
            current_operand: Operand::zero(),
            expression: format!("{}{} {} ", self.expression, self.current_operand, op),
            overwrite: false,
        })
    }

    /// The chain as it would be evaluated now: committed terms plus the operand.
    pub fn final_expression(&self) -> String {
        format!("{}{}", self.expression, self.current_operand)
    }

    /// Sum of the chain so far, without recording anything.
    pub fn partial_sum(&self) -> f64 {
        sum_expression(&self.final_expression())
    }

    /// Press `=`, summing the chain.
    ///
    /// `max_digits` bounds the significant digits of the result operand; a
    /// sum whose integer part needs more digits is rejected as too long.
    pub fn evaluate(&self, max_digits: usize) -> InputResult<Evaluation> {
        if self.expression.is_empty() && self.current_operand.is_zero() {
            return Err(InputError::EmptyOperand);
        }

        let expression_text = self.final_expression();
        let value = sum_expression(&expression_text);
        let result =
            operand_text(value, max_digits).ok_or(InputError::InputTooLong { max_digits })?;

        Ok(Evaluation {
            state: CalculatorState::with_result(Operand::from_text(result.clone())),
            entry: HistoryEntry {
                expression_text,
                result,
            },
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::{Digit, MAX_DIGITS};

    fn press(state: CalculatorState, keys: &str) -> CalculatorState {
        keys.chars().fold(state, |s, c| match c {
            '+' => s.press_operator(Operator::Add).unwrap(),
            ',' => s.press_separator().unwrap(),
            _ => s.press_digit(Digit::from_char(c).unwrap(), MAX_DIGITS).unwrap(),
        })
    }

    #[test]
    fn test_five_plus_three() {
        let state = press(CalculatorState::new(), "5+3");
        assert_eq!(state.expression(), "5 + ");
        assert_eq!(state.current_operand().as_str(), "3");

        let evaluation = state.evaluate(MAX_DIGITS).unwrap();

        assert_eq!(evaluation.state.current_operand().as_str(), "8");
        assert_eq!(evaluation.state.expression(), "");
        assert!(evaluation.state.overwrite());
        assert_eq!(evaluation.entry.to_string(), "5 + 3 = 8");
        assert_eq!(evaluation.value, 8.0);
    }

    #[test]
    fn test_chain_with_decimals() {
        let state = press(CalculatorState::new(), "1,5+2,25+10");
        assert_eq!(state.final_expression(), "1,5 + 2,25 + 10");

        let evaluation = state.evaluate(MAX_DIGITS).unwrap();

        assert_eq!(evaluation.entry.result, "13,75");
    }

    #[test]
    fn test_float_noise_trimmed() {
        let evaluation = press(CalculatorState::new(), "0,1+0,2")
            .evaluate(MAX_DIGITS)
            .unwrap();
        assert_eq!(evaluation.entry.result, "0,3");
    }

    #[test]
    fn test_operator_on_empty_operand() {
        let state = CalculatorState::new();
        assert_eq!(state.press_operator(Operator::Add), Err(InputError::EmptyOperand));
    }

    #[test]
    fn test_operator_after_pending_zero_allowed() {
        let state = press(CalculatorState::new(), "5+");
        let state = state.press_operator(Operator::Add).unwrap();
        assert_eq!(state.expression(), "5 + 0 + ");
    }

    #[test]
    fn test_evaluate_empty() {
        assert_eq!(
            CalculatorState::new().evaluate(MAX_DIGITS),
            Err(InputError::EmptyOperand)
        );
    }

    #[test]
    fn test_evaluate_single_operand() {
        let evaluation = press(CalculatorState::new(), "42").evaluate(MAX_DIGITS).unwrap();
        assert_eq!(evaluation.entry.to_string(), "42 = 42");
    }

    #[test]
    fn test_continue_chain_from_result() {
        let evaluation = press(CalculatorState::new(), "5+3").evaluate(MAX_DIGITS).unwrap();

        let state = press(evaluation.state, "+2");
        assert_eq!(state.expression(), "8 + ");

        let evaluation = state.evaluate(MAX_DIGITS).unwrap();
        assert_eq!(evaluation.entry.to_string(), "8 + 2 = 10");
    }

    #[test]
    fn test_sum_beyond_digit_cap_rejected() {
        let state = press(CalculatorState::new(), "999999999999999+999999999999999");

        assert_eq!(
            state.evaluate(MAX_DIGITS),
            Err(InputError::InputTooLong { max_digits: 15 })
        );
    }

    #[test]
    fn test_result_stays_within_digit_cap() {
        let evaluation = press(CalculatorState::new(), "99999999999999+1,25")
            .evaluate(MAX_DIGITS)
            .unwrap();

        let operand = evaluation.state.current_operand();
        assert!(operand.digit_count() <= MAX_DIGITS);
        assert_eq!(operand.as_str(), "100000000000000");
    }

    #[test]
    fn test_lenient_sum_counts_malformed_terms_as_zero() {
        assert_eq!(lenient_sum(["5", "abc", " 3 "]), 8.0);
        assert_eq!(lenient_sum(["", ","]), 0.0);
        assert_eq!(sum_expression("1,5 + x + 2"), 3.5);
    }

    #[test]
    fn test_partial_sum() {
        let state = press(CalculatorState::new(), "5+3+");
        assert_eq!(state.partial_sum(), 8.0);
    }

    #[test]
    fn test_history_append_only() {
        let mut history = History::new();
        assert!(history.is_empty());

        history.push(HistoryEntry {
            expression_text: "1 + 1".to_string(),
            result: "2".to_string(),
        });
        history.push(HistoryEntry {
            expression_text: "2".to_string(),
            result: "2".to_string(),
        });

        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].to_string(), "1 + 1 = 2");
        assert_eq!(history.last().unwrap().expression_text, "2");
    }
}
