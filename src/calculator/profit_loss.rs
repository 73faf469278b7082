//! Profit/Loss Engine
//! Mission: Turn entry/exit prices and a contract count into a full trade result

use crate::contracts::ContractSpec;
use serde::Serialize;

/// Inputs to the profit/loss engine, already coerced to numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeInput {
    pub entry_price: f64,
    pub exit_price: f64,
    pub num_contracts: f64,
    pub starting_balance: f64,
}

/// Transient result of a profit/loss calculation (not yet persisted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeCalculation {
    pub spec: ContractSpec,
    pub entry_price: f64,
    pub exit_price: f64,
    pub num_contracts: f64,
    pub point_diff: f64,
    pub ticks: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub total_value: f64,
    pub margin_used: f64,
    pub starting_balance: f64,
    pub remaining_balance: f64,
    pub is_profit: bool,
}

/// Margin reserved for `num_contracts` open contracts
#[inline]
pub fn margin_used(num_contracts: f64, spec: &ContractSpec) -> f64 {
    num_contracts * spec.typical_margin
}

/// Compute a trade result. Never fails: zero inputs give a zero-valued result,
/// and inputs from `coerce_number` keep every field finite.
pub fn calculate(input: TradeInput, spec: &ContractSpec) -> TradeCalculation {
    let TradeInput {
        entry_price,
        exit_price,
        num_contracts,
        starting_balance,
    } = input;

    let point_diff = exit_price - entry_price;
    let ticks = point_diff / spec.tick_size;
    let profit_loss = point_diff * num_contracts * spec.contract_multiplier;
    let profit_loss_pct = if entry_price > 0.0 {
        (point_diff / entry_price) * 100.0
    } else {
        0.0
    };
    let total_value = exit_price * num_contracts * spec.contract_multiplier;
    let margin_used = margin_used(num_contracts, spec);

    TradeCalculation {
        spec: *spec,
        entry_price,
        exit_price,
        num_contracts,
        point_diff,
        ticks,
        profit_loss,
        profit_loss_pct,
        total_value,
        margin_used,
        starting_balance,
        remaining_balance: starting_balance - margin_used,
        is_profit: profit_loss >= 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts;

    fn input(entry: f64, exit: f64, contracts: f64) -> TradeInput {
        TradeInput {
            entry_price: entry,
            exit_price: exit,
            num_contracts: contracts,
            starting_balance: 25_000.0,
        }
    }

    #[test]
    fn test_mes_long_winner() {
        let spec = contracts::lookup("MES");
        let calc = calculate(input(5800.0, 5850.0, 2.0), spec);

        assert_eq!(calc.point_diff, 50.0);
        assert_eq!(calc.ticks, 200.0);
        assert_eq!(calc.profit_loss, 500.0);
        assert_eq!(calc.total_value, 58_500.0);
        assert_eq!(calc.margin_used, 4932.0);
        assert_eq!(calc.remaining_balance, 25_000.0 - 4932.0);
        assert!(calc.is_profit);
        assert!((calc.profit_loss_pct - 50.0 / 5800.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_loser_sets_flag() {
        let spec = contracts::lookup("MGC");
        let calc = calculate(input(2660.0, 2650.0, 3.0), spec);

        assert_eq!(calc.profit_loss, -10.0 * 3.0 * 10.0);
        assert!(!calc.is_profit);
        assert!(calc.profit_loss_pct < 0.0);
    }

    #[test]
    fn test_flat_trade_counts_as_profit() {
        let spec = contracts::lookup("SIL");
        let calc = calculate(input(30.5, 30.5, 1.0), spec);
        assert_eq!(calc.profit_loss, 0.0);
        assert!(calc.is_profit);
    }

    #[test]
    fn test_zero_entry_guards_percentage() {
        let spec = contracts::lookup("MES");
        let calc = calculate(input(0.0, 10.0, 1.0), spec);
        assert_eq!(calc.profit_loss_pct, 0.0);
        assert_eq!(calc.profit_loss, 50.0);
    }

    #[test]
    fn test_profit_formula_holds_across_specs() {
        for spec in contracts::all() {
            for &(entry, exit, n) in &[(100.0, 101.5, 1.0), (50.0, 40.0, 4.0), (7.25, 7.25, 2.0)] {
                let calc = calculate(input(entry, exit, n), spec);
                let expected = (exit - entry) * n * spec.contract_multiplier;
                assert!((calc.profit_loss - expected).abs() < 1e-9);
                assert_eq!(calc.is_profit, calc.profit_loss >= 0.0);
            }
        }
    }
}
