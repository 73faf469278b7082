//! Calculation Engines
//! Mission: Pure, stateless arithmetic feeding the record stores

pub mod input;
pub mod profit_loss;
pub mod tax;

pub use input::{coerce_balance, coerce_number, DEFAULT_STARTING_BALANCE, MAX_INPUT_MAGNITUDE};
pub use profit_loss::{TradeCalculation, TradeInput};
pub use tax::TaxCalculation;
