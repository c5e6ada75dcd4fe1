//! Tasacalc Calculator
//!
//! Keypad state machine, addition chains and the live conversion session.
//!
//! The session consumes discrete [`CalculatorEvent`]s one at a time. Each
//! event either produces a new state or is rejected with an [`InputError`]
//! that leaves the state untouched and raises a transient error flash.
//!
//! # Example
//!
//! ```rust,ignore
//! use tasacalc_calculator::{parse_keys, Session, SessionConfig};
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.apply_rates(rates);
//! for event in parse_keys("10+5=")? {
//!     let _ = session.handle(event);
//! }
//! println!("{}", session.view().conversion_output_display);
//! ```

pub mod config;
pub mod direction;
pub mod error;
pub mod event;
pub mod expression;
pub mod operand;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use direction::{DirectionController, SwapPolicy};
pub use error::{InputError, InputResult, KeyParseError};
pub use event::{parse_keys, CalculatorEvent};
pub use expression::{lenient_sum, sum_expression, Evaluation, History, HistoryEntry, Operator};
pub use operand::{Digit, Operand, MAX_DIGITS};
pub use session::{recompute_conversion, Notification, Session, SessionView};
pub use state::CalculatorState;
