//! Amount parsing for balances read off portal pages.

use crate::error::ParseError;
use crate::model::MAX_AMOUNT;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // A sign counts only when it touches the "$" or the digits; "Due - $45.00" is a separator.
    PATTERN.get_or_init(|| {
        Regex::new(r"(-?)(?:\$\s*)?(-?)([0-9][0-9,]*(?:\.[0-9]+)?)")
            .expect("amount pattern is valid")
    })
}

/// Parses the first amount found in `raw`.
///
/// Thousands separators are dropped and blanks after the dollar sign are
/// allowed, so `"$ 1,234.56"` yields `1234.56`. Text such as
/// `"Amount Due $89.35"` is accepted; the first numeric run wins.
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseError> {
    let captures = amount_pattern()
        .captures(raw)
        .ok_or_else(|| ParseError::NoAmount(raw.trim().to_string()))?;

    let signed = captures.get(1).is_some_and(|m| !m.is_empty())
        || captures.get(2).is_some_and(|m| !m.is_empty());
    if signed {
        return Err(ParseError::Negative(raw.trim().to_string()));
    }

    let digits = captures[3].replace(',', "");
    let amount = Decimal::from_str(&digits).map_err(|e| ParseError::invalid(&digits, e))?;
    if amount > MAX_AMOUNT {
        return Err(ParseError::TooLarge(digits));
    }
    Ok(amount)
}
