//! Futures Contract Specifications
//! Mission: Static reference data for every micro contract the calculators support

use serde::Serialize;

/// Immutable contract specification, keyed by symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContractSpec {
    pub key: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub tick_size: f64,
    pub tick_value: f64,
    pub contract_multiplier: f64,
    /// Margin reserved per open contract (USD)
    pub typical_margin: f64,
    pub default_entry: &'static str,
    pub default_exit: &'static str,
    pub default_stop: &'static str,
    pub default_target: &'static str,
}

/// Symbol used when an unknown key is requested
pub const FALLBACK_KEY: &str = "MES";

static CONTRACTS: [ContractSpec; 3] = [
    ContractSpec {
        key: "MES",
        symbol: "/MES",
        name: "Micro E-mini S&P 500",
        tick_size: 0.25,
        tick_value: 1.25,
        contract_multiplier: 5.0,
        typical_margin: 2466.0,
        default_entry: "5800.00",
        default_exit: "5850.00",
        default_stop: "5780.00",
        default_target: "5860.00",
    },
    ContractSpec {
        key: "MGC",
        symbol: "/MGC",
        name: "Micro Gold",
        tick_size: 0.1,
        tick_value: 1.00,
        contract_multiplier: 10.0,
        typical_margin: 3168.0,
        default_entry: "2650.0",
        default_exit: "2660.0",
        default_stop: "2645.0",
        default_target: "2665.0",
    },
    ContractSpec {
        key: "SIL",
        symbol: "/SIL",
        name: "Micro Silver",
        tick_size: 0.005,
        tick_value: 5.00,
        contract_multiplier: 1000.0,
        typical_margin: 8580.0,
        default_entry: "30.500",
        default_exit: "30.600",
        default_stop: "30.450",
        default_target: "30.650",
    },
];

/// All contracts in display order
pub fn all() -> &'static [ContractSpec] {
    &CONTRACTS
}

/// Find a contract by key (`MES`) or symbol (`/MES`), case-insensitive.
/// Returns `None` for unknown keys; see [`lookup`] for the fallback variant.
pub fn find(key: &str) -> Option<&'static ContractSpec> {
    let key = key.trim().trim_start_matches('/');
    CONTRACTS.iter().find(|c| c.key.eq_ignore_ascii_case(key))
}

/// Find a contract, falling back to MES when the key is unknown
pub fn lookup(key: &str) -> &'static ContractSpec {
    find(key).unwrap_or(&CONTRACTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_are_well_formed() {
        for spec in all() {
            assert!(spec.tick_size > 0.0, "{} tick size", spec.key);
            assert!(spec.contract_multiplier > 0.0, "{} multiplier", spec.key);
            assert_eq!(spec.symbol, format!("/{}", spec.key));
            // tick value is the dollar worth of one tick
            let implied = spec.tick_size * spec.contract_multiplier;
            assert!((implied - spec.tick_value).abs() < 1e-9, "{}", spec.key);
        }
    }

    #[test]
    fn test_lookup_accepts_key_or_symbol() {
        assert_eq!(lookup("MGC").name, "Micro Gold");
        assert_eq!(lookup("/SIL").name, "Micro Silver");
        assert_eq!(lookup("mgc").key, "MGC");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert!(find("ES").is_none());
        assert_eq!(lookup("ES").key, FALLBACK_KEY);
        assert_eq!(lookup("").key, FALLBACK_KEY);
    }
}
