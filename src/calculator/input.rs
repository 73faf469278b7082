//! Form input coercion
//!
//! Raw form fields are never rejected. A field is read up to the end of its
//! leading numeric prefix (`"12.5abc"` reads as 12.5) and anything without a
//! usable prefix reads as zero. Non-finite values and magnitudes above
//! `MAX_INPUT_MAGNITUDE` also read as zero, so every derived figure stays finite.

/// Starting account balance used when none (or zero) is supplied
pub const DEFAULT_STARTING_BALANCE: f64 = 25_000.0;

/// Largest accepted field magnitude. Products of three bounded fields
/// (price × contracts × multiplier) cannot overflow an f64.
pub const MAX_INPUT_MAGNITUDE: f64 = 1e15;

/// Coerce a raw field to a number, yielding 0.0 for malformed input
pub fn coerce_number(raw: &str) -> f64 {
    let prefix = numeric_prefix(raw.trim_start());
    match prefix.parse::<f64>() {
        Ok(v) if v.is_finite() && v.abs() <= MAX_INPUT_MAGNITUDE => v,
        _ => 0.0,
    }
}

/// Coerce a starting balance; zero or malformed input yields the default
pub fn coerce_balance(raw: &str) -> f64 {
    let v = coerce_number(raw);
    if v == 0.0 {
        DEFAULT_STARTING_BALANCE
    } else {
        v
    }
}

/// Longest prefix of `s` that forms a decimal literal
fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(coerce_number("5800.00"), 5800.0);
        assert_eq!(coerce_number("  -12.5"), -12.5);
        assert_eq!(coerce_number("+3"), 3.0);
        assert_eq!(coerce_number(".5"), 0.5);
        assert_eq!(coerce_number("7."), 7.0);
        assert_eq!(coerce_number("1e3"), 1000.0);
    }

    #[test]
    fn test_leading_prefix_is_kept() {
        assert_eq!(coerce_number("12abc"), 12.0);
        assert_eq!(coerce_number("2.5.1"), 2.5);
        assert_eq!(coerce_number("4e"), 4.0);
        assert_eq!(coerce_number("4e+"), 4.0);
    }

    #[test]
    fn test_malformed_is_zero() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("-"), 0.0);
        assert_eq!(coerce_number("."), 0.0);
        assert_eq!(coerce_number("1e999"), 0.0);
    }

    #[test]
    fn test_out_of_range_is_zero() {
        assert_eq!(coerce_number("1e308"), 0.0);
        assert_eq!(coerce_number("-1e308"), 0.0);
        assert_eq!(coerce_number("1e15"), MAX_INPUT_MAGNITUDE);
        assert_eq!(coerce_balance("9e99"), DEFAULT_STARTING_BALANCE);
    }

    #[test]
    fn test_balance_defaults() {
        assert_eq!(coerce_balance(""), DEFAULT_STARTING_BALANCE);
        assert_eq!(coerce_balance("0"), DEFAULT_STARTING_BALANCE);
        assert_eq!(coerce_balance("10000"), 10_000.0);
    }
}
