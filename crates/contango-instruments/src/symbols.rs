//! Dated contract code generation.
//!
//! Exchange futures codes follow `PREFIX + MONTH_CODE + LAST_YEAR_DIGIT`, so
//! the Brent March 2024 contract is `BRH4`.

use contango_types::{ContangoError, MonthRange, Result, YearMonth};
use tracing::debug;

/// Delivery month codes, January through December.
pub const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Returns the delivery code for a month number (1 = January).
#[must_use]
pub const fn month_code(month: u32) -> Option<char> {
    if month >= 1 && month <= 12 {
        Some(MONTH_CODES[(month - 1) as usize])
    } else {
        None
    }
}

/// Returns the month number for a delivery code.
#[must_use]
pub fn month_from_code(code: char) -> Option<u32> {
    let code = code.to_ascii_uppercase();
    MONTH_CODES
        .iter()
        .position(|&c| c == code)
        .map(|i| i as u32 + 1)
}

/// Builds the contract code for `prefix` expiring in `month`.
#[must_use]
pub fn contract_symbol(prefix: &str, month: YearMonth) -> String {
    let code = MONTH_CODES[(month.month() - 1) as usize];
    format!("{prefix}{code}{}", month.year_digit())
}

/// Generates one contract code per month from `start` through `end` (inclusive).
///
/// A start after the end yields an empty list.
///
/// # Errors
///
/// Returns [`ContangoError::InvalidPrefix`] if the prefix is blank.
pub fn generate_contract_symbols_until(
    prefix: &str,
    start: YearMonth,
    end: YearMonth,
) -> Result<Vec<String>> {
    if prefix.trim().is_empty() {
        return Err(ContangoError::InvalidPrefix(prefix.to_string()));
    }

    let symbols: Vec<String> = MonthRange::new(start, end)
        .months()
        .map(|month| contract_symbol(prefix, month))
        .collect();

    debug!(prefix, %start, %end, count = symbols.len(), "generated contract symbols");
    Ok(symbols)
}

/// Generates contract codes from `start`, ending at `end` or the current month.
///
/// # Errors
///
/// Returns [`ContangoError::InvalidPrefix`] if the prefix is blank.
pub fn generate_contract_symbols(
    prefix: &str,
    start: YearMonth,
    end: Option<YearMonth>,
) -> Result<Vec<String>> {
    generate_contract_symbols_until(prefix, start, end.unwrap_or_else(YearMonth::current))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_codes() {
        assert_eq!(month_code(1), Some('F'));
        assert_eq!(month_code(3), Some('H'));
        assert_eq!(month_code(12), Some('Z'));
        assert_eq!(month_code(0), None);
        assert_eq!(month_code(13), None);
        assert_eq!(month_from_code('m'), Some(6));
        assert_eq!(month_from_code('A'), None);
    }

    #[test]
    fn test_brent_two_and_a_half_years() {
        let symbols = generate_contract_symbols_until("BR", ym("2022-03"), ym("2024-06")).unwrap();
        assert_eq!(symbols.len(), 28);
        assert_eq!(symbols.first().unwrap(), "BRH2");
        assert_eq!(symbols.last().unwrap(), "BRM4");
        assert!(symbols.contains(&"BRZ3".to_string()));
    }

    #[test]
    fn test_one_symbol_per_month_with_table_codes() {
        let symbols = generate_contract_symbols_until("Si", ym("2023-01"), ym("2023-12")).unwrap();
        for (symbol, code) in symbols.iter().zip(MONTH_CODES) {
            assert_eq!(symbol, &format!("Si{code}3"));
        }
    }

    #[test]
    fn test_start_after_end_is_empty() {
        let symbols = generate_contract_symbols_until("BR", ym("2024-06"), ym("2024-01")).unwrap();
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_blank_prefix_is_configuration_error() {
        let err = generate_contract_symbols_until("", ym("2024-01"), ym("2024-02")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_open_end_reaches_current_month() {
        let current = YearMonth::current();
        let symbols = generate_contract_symbols("BR", current, None).unwrap();
        assert_eq!(symbols, vec![contract_symbol("BR", current)]);
    }
}
