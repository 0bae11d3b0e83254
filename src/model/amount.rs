//! Won amounts as they appear in the month tabs.
//!
//! Amount cells are formatted by the sheet, so what comes back from the API looks like
//! `₩12,345` or ` 1,000 ` rather than a plain number. `Won` strips the currency symbol, the
//! thousands separators and any whitespace before parsing.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

const WON_SIGN: char = '₩';

/// A Korean won amount.
///
/// # Examples
///
/// ```
/// # use gagyebu::model::Won;
/// # use std::str::FromStr;
/// let amount = Won::from_str("₩12,345").unwrap();
/// assert_eq!(amount.whole(), 12345);
/// assert_eq!(amount.to_string(), "₩12,345");
/// ```
///
/// Cells that are not numbers count as nothing:
/// ```
/// # use gagyebu::model::Won;
/// assert_eq!(Won::from_cell("abc").whole(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Won(Decimal);

impl Won {
    pub const ZERO: Won = Won(Decimal::ZERO);

    /// Parses a cell value leniently: anything that is not a number after normalization, including
    /// an empty cell, is zero.
    pub fn from_cell(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// The value with any fractional part truncated.
    pub fn whole(&self) -> i64 {
        self.0.trunc().to_i64().unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// An error that can occur when parsing strings into `Won` values.
pub struct WonError(rust_decimal::Error);

impl Debug for WonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for WonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for WonError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Won {
    type Err = WonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != ',' && *c != WON_SIGN && !c.is_whitespace())
            .collect();
        if normalized.is_empty() {
            return Ok(Won::ZERO);
        }
        let value = Decimal::from_str(&normalized).map_err(WonError)?;
        Ok(Won(value))
    }
}

impl fmt::Display for Won {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2).normalize();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let rounded = rounded.abs();
        let whole = thousands(rounded.trunc().to_i64().unwrap_or_default());
        match rounded.to_string().split_once('.') {
            Some((_, frac)) => write!(f, "{sign}{WON_SIGN}{whole}.{frac}"),
            None => write!(f, "{sign}{WON_SIGN}{whole}"),
        }
    }
}

impl From<u64> for Won {
    fn from(value: u64) -> Self {
        Won(Decimal::from(value))
    }
}

impl std::ops::AddAssign for Won {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Formats a whole number with thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn thousands(n: i64) -> String {
    let grouped = format_num::format_num!(",.0f", n.unsigned_abs() as f64);
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_won_sign_and_commas() {
        assert_eq!(Won::from_cell("₩12,345").whole(), 12345);
    }

    #[test]
    fn test_parse_padded() {
        assert_eq!(Won::from_cell(" 1,000 ").whole(), 1000);
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Won::from_cell("abc").whole(), 0);
        assert!(Won::from_str("abc").is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert!(Won::from_cell("").is_zero());
        assert!(Won::from_cell("   ").is_zero());
    }

    #[test]
    fn test_parse_inner_spaces() {
        assert_eq!(Won::from_cell("₩ 1 234 567").whole(), 1234567);
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Won::from_cell("-₩5,000").whole(), -5000);
    }

    #[test]
    fn test_whole_truncates() {
        assert_eq!(Won::from_cell("1,999.99").whole(), 1999);
    }

    #[test]
    fn test_sum() {
        let mut total = Won::ZERO;
        for cell in ["₩1,000", "2500", "", "n/a", "0.5", "0.5"] {
            total += Won::from_cell(cell);
        }
        assert_eq!(total.whole(), 3501);
    }

    #[test]
    fn test_display() {
        assert_eq!(Won::from(1234567u64).to_string(), "₩1,234,567");
        assert_eq!(Won::ZERO.to_string(), "₩0");
        assert_eq!(Won::from_cell("-5000").to_string(), "-₩5,000");
        assert_eq!(Won::from_cell("1234.5").to_string(), "₩1,234.5");
        assert_eq!(Won::from_cell("₩1,000.00").to_string(), "₩1,000");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(12345), "12,345");
        assert_eq!(thousands(-1234567), "-1,234,567");
        assert_eq!(thousands(3_200_000), "3,200,000");
    }
}
