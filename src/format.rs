//! Currency display formatting.
//!
//! Amounts are shown with exactly two fraction digits (midpoint rounded away
//! from zero), comma thousands separators and a leading sign, e.g.
//! `-$1,234.50` or `INR`-style `₹8,300.00`. Codes without a well-known
//! symbol are prefixed with the code itself: `XYZ 12.00`.

use crate::core::currency::CurrencyCode;
use rust_decimal::prelude::*;

/// Symbol shown in front of amounts, if the currency has a common one.
pub fn currency_symbol(code: &CurrencyCode) -> Option<&'static str> {
    let symbol = match code.as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "INR" => "₹",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "KRW" => "₩",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "HKD" => "HK$",
        "MXN" => "MX$",
        "BRL" => "R$",
        "ILS" => "₪",
        "VND" => "₫",
        "PHP" => "₱",
        _ => return None,
    };
    Some(symbol)
}

/// `amount` rounded to cents (midpoint away from zero) at scale 2.
///
/// `None` for NaN, infinities and magnitudes beyond `Decimal`'s range.
pub fn round_cents(amount: f64) -> Option<Decimal> {
    if !amount.is_finite() {
        return None;
    }
    let mut rounded = Decimal::from_f64_retain(amount)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    Some(rounded)
}

/// Two-decimal digits of `amount` without grouping; `None` for NaN/∞.
fn fixed_two(amount: f64) -> Option<(bool, String)> {
    if !amount.is_finite() {
        return None;
    }
    match round_cents(amount) {
        Some(rounded) => {
            let negative = rounded.is_sign_negative() && !rounded.is_zero();
            Some((negative, rounded.abs().to_string()))
        }
        // Beyond Decimal's range; float formatting is exact enough there.
        None => Some((amount < 0.0, format!("{:.2}", amount.abs()))),
    }
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Format `amount` in `code` for display.
///
/// # Examples
///
/// ```
/// use emi_insights::core::currency::CurrencyCode;
/// use emi_insights::format::format_currency;
///
/// assert_eq!(format_currency(2051.6531, &CurrencyCode::new("USD")), "$2,051.65");
/// assert_eq!(format_currency(-5.0, &CurrencyCode::new("XYZ")), "-XYZ 5.00");
/// ```
pub fn format_currency(amount: f64, code: &CurrencyCode) -> String {
    let (negative, digits) = match fixed_two(amount) {
        Some(parts) => parts,
        None => return "N/A".to_string(),
    };
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    let number = format!("{}.{}", group_thousands(integer), fraction);
    let sign = if negative { "-" } else { "" };

    match currency_symbol(code) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{} {}", sign, code, number),
    }
}

/// Format a bare rate with four fraction digits, as in rate listings.
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{:.4}", r),
        _ => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD")
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_currency(0.0, &usd()), "$0.00");
        assert_eq!(format_currency(999.999, &usd()), "$1,000.00");
        assert_eq!(format_currency(1_234_567.891, &usd()), "$1,234,567.89");
        assert_eq!(format_currency(100_000.0, &usd()), "$100,000.00");
    }

    #[test]
    fn test_rounding_midpoint_away_from_zero() {
        assert_eq!(format_currency(2.125, &usd()), "$2.13");
        assert_eq!(format_currency(-2.125, &usd()), "-$2.13");
    }

    #[test]
    fn test_negative_zero_has_no_sign() {
        assert_eq!(format_currency(-0.001, &usd()), "$0.00");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(format_currency(8300.0, &CurrencyCode::new("INR")), "₹8,300.00");
        assert_eq!(format_currency(1.5, &CurrencyCode::new("EUR")), "€1.50");
        assert_eq!(format_currency(1.5, &CurrencyCode::new("CHF")), "CHF 1.50");
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(2051.6531), Some(dec!(2051.65)));
        assert_eq!(round_cents(0.005), Some(dec!(0.01)));
        assert_eq!(round_cents(-1.0), Some(dec!(-1.00)));
        assert_eq!(round_cents(1.0).map(|d| d.to_string()), Some("1.00".to_string()));
        assert_eq!(round_cents(f64::NAN), None);
        assert_eq!(round_cents(1e30), None);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_currency(f64::NAN, &usd()), "N/A");
        assert_eq!(format_currency(f64::INFINITY, &usd()), "N/A");
    }

    #[test]
    fn test_out_of_decimal_range() {
        assert_eq!(
            format_currency(1e30, &usd()),
            "$1,000,000,000,000,000,019,884,624,838,656.00"
        );
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Some(83.0)), "83.0000");
        assert_eq!(format_rate(None), "N/A");
    }
}
