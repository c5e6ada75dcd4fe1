//! Tasacalc Common Types
//!
//! This crate contains shared types used across the Tasacalc workspace,
//! including currency codes, rate data supplied by rate providers, and the
//! numeric text helpers the calculator uses to parse and display amounts.

pub mod currency;
pub mod number;
pub mod rates;
pub mod time;

pub use currency::*;
pub use number::*;
pub use rates::*;
pub use time::*;
