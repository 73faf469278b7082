//! Section 1256 Tax Engine
//! Mission: Estimate blended 60/40 federal tax (plus optional California tax) on futures P&L

use serde::Serialize;

/// Share of gain/loss treated as long-term
pub const LONG_TERM_SHARE: f64 = 0.60;
/// Share of gain/loss treated as short-term
pub const SHORT_TERM_SHARE: f64 = 0.40;
/// Federal long-term capital gains rate
pub const LONG_TERM_RATE: f64 = 0.20;
/// Federal short-term rate (top ordinary bracket)
pub const SHORT_TERM_RATE: f64 = 0.38;
/// California top bracket, applied to the whole amount
pub const CA_STATE_RATE: f64 = 0.133;

/// Transient result of a tax calculation (not yet persisted)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxCalculation {
    pub amount: f64,
    pub is_profit: bool,
    pub include_ca_state: bool,
    pub long_term_portion: f64,
    pub short_term_portion: f64,
    pub long_term_tax: f64,
    pub short_term_tax: f64,
    pub total_federal_tax: f64,
    pub ca_state_tax: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub federal_effective_rate: f64,
    pub state_effective_rate: f64,
    pub after_tax: f64,
}

fn rate_of(part: f64, amount: f64) -> f64 {
    if amount != 0.0 {
        (part / amount) * 100.0
    } else {
        0.0
    }
}

/// Compute tax on a signed P&L amount.
///
/// A zero amount yields `None` rather than an all-zero result so that callers
/// never persist a meaningless entry.
pub fn calculate(amount: f64, include_ca_state: bool) -> Option<TaxCalculation> {
    if amount == 0.0 {
        return None;
    }

    let long_term_portion = amount * LONG_TERM_SHARE;
    let short_term_portion = amount * SHORT_TERM_SHARE;
    let long_term_tax = long_term_portion * LONG_TERM_RATE;
    let short_term_tax = short_term_portion * SHORT_TERM_RATE;
    let total_federal_tax = long_term_tax + short_term_tax;
    let ca_state_tax = if include_ca_state {
        amount * CA_STATE_RATE
    } else {
        0.0
    };
    let total_tax = total_federal_tax + ca_state_tax;

    Some(TaxCalculation {
        amount,
        is_profit: amount > 0.0,
        include_ca_state,
        long_term_portion,
        short_term_portion,
        long_term_tax,
        short_term_tax,
        total_federal_tax,
        ca_state_tax,
        total_tax,
        effective_rate: rate_of(total_tax, amount),
        federal_effective_rate: rate_of(total_federal_tax, amount),
        state_effective_rate: rate_of(ca_state_tax, amount),
        after_tax: amount - total_tax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_ten_thousand_federal_only() {
        let r = calculate(10_000.0, false).unwrap();
        assert!(close(r.long_term_tax, 1200.0));
        assert!(close(r.short_term_tax, 1520.0));
        assert!(close(r.total_federal_tax, 2720.0));
        assert_eq!(r.ca_state_tax, 0.0);
        assert!(close(r.after_tax, 7280.0));
        assert!(close(r.effective_rate, 27.2));
        assert_eq!(r.state_effective_rate, 0.0);
        assert!(r.is_profit);
    }

    #[test]
    fn test_state_tax_added() {
        let r = calculate(10_000.0, true).unwrap();
        assert!(close(r.ca_state_tax, 1330.0));
        assert!(close(r.total_tax, 4050.0));
        assert!(close(r.state_effective_rate, 13.3));
        assert!(close(r.after_tax, 5950.0));
    }

    #[test]
    fn test_zero_amount_has_no_result() {
        assert!(calculate(0.0, false).is_none());
        assert!(calculate(0.0, true).is_none());
    }

    #[test]
    fn test_loss_gives_negative_tax() {
        let r = calculate(-5_000.0, false).unwrap();
        assert!(!r.is_profit);
        assert!(r.total_tax < 0.0);
        assert!(close(r.after_tax, -5_000.0 - r.total_tax));
        // blended rate is the same for gains and losses
        assert!(close(r.effective_rate, 27.2));
    }

    #[test]
    fn test_portions_sum_to_amount() {
        for &a in &[1.0, -1.0, 123.45, 98_765.4321, -0.01] {
            let r = calculate(a, false).unwrap();
            assert!(close(r.long_term_portion + r.short_term_portion, a));
            let expected = 0.20 * 0.60 * a + 0.38 * 0.40 * a;
            assert!(close(r.total_federal_tax, expected));
        }
    }
}
