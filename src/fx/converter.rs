//! Two-hop pivot conversion.
//!
//! The rate source only quotes each currency against one pivot, so every
//! conversion goes source → pivot → target:
//! `amount / rate(source) × rate(target)`.
//!
//! Conversion never fails. When it cannot be carried out the amount comes
//! back unchanged together with a [`ConversionWarning`].

use crate::core::currency::CurrencyCode;
use crate::fx::rate_table::RateTable;
use log::warn;
use serde::Serialize;
use std::fmt;

/// Why a conversion degraded to the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ConversionWarning {
    /// No rate table is available yet (loading, or every fetch failed).
    RateUnavailable,
    /// The table has no usable rate for this currency.
    UnknownCurrencyCode { code: CurrencyCode },
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionWarning::RateUnavailable => {
                write!(f, "exchange rates are not available; amounts are not converted")
            }
            ConversionWarning::UnknownCurrencyCode { code } => {
                write!(f, "no usable exchange rate for {}; amount is not converted", code)
            }
        }
    }
}

/// Outcome of a conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub amount: f64,
    pub warning: Option<ConversionWarning>,
}

impl Conversion {
    fn converted(amount: f64) -> Self {
        Self {
            amount,
            warning: None,
        }
    }

    fn identity(amount: f64, warning: ConversionWarning) -> Self {
        warn!("{}", warning);
        Self {
            amount,
            warning: Some(warning),
        }
    }

    pub fn is_converted(&self) -> bool {
        self.warning.is_none()
    }
}

fn usable(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| r.is_finite())
}

/// Convert `amount` from `source` to `target` using pivot-relative rates.
///
/// Rules, first match wins:
/// 1. same currency: unchanged, no lookup
/// 2. no table: unchanged, [`ConversionWarning::RateUnavailable`]
/// 3. source rate missing, non-finite or zero: unchanged, warning names source
/// 4. target rate missing or non-finite: unchanged, warning names target
/// 5. `amount / rate(source) × rate(target)`
///
/// # Examples
///
/// ```
/// use emi_insights::core::currency::CurrencyCode;
/// use emi_insights::fx::converter::convert;
/// use emi_insights::fx::rate_table::RateTable;
///
/// let table = RateTable::from_json(CurrencyCode::new("USD"), r#"{"USD": 1, "INR": 83}"#).unwrap();
/// let result = convert(100.0, &"USD".into(), &"INR".into(), Some(&table));
/// assert_eq!(result.amount, 8300.0);
/// assert!(result.warning.is_none());
/// ```
pub fn convert(
    amount: f64,
    source: &CurrencyCode,
    target: &CurrencyCode,
    table: Option<&RateTable>,
) -> Conversion {
    if source == target {
        return Conversion::converted(amount);
    }

    let table = match table {
        Some(table) => table,
        None => return Conversion::identity(amount, ConversionWarning::RateUnavailable),
    };

    let source_rate = match usable(table.rate(source)) {
        Some(rate) if rate != 0.0 => rate,
        _ => {
            return Conversion::identity(
                amount,
                ConversionWarning::UnknownCurrencyCode {
                    code: source.clone(),
                },
            )
        }
    };

    let target_rate = match usable(table.rate(target)) {
        Some(rate) => rate,
        None => {
            return Conversion::identity(
                amount,
                ConversionWarning::UnknownCurrencyCode {
                    code: target.clone(),
                },
            )
        }
    };

    let in_pivot = amount / source_rate;
    Conversion::converted(in_pivot * target_rate)
}

/// Currencies a user can pick, in lexicographic order.
///
/// Falls back to the pivot alone (or the default pivot when there is no
/// table) while nothing usable is loaded.
pub fn list_available_currencies(table: Option<&RateTable>) -> Vec<CurrencyCode> {
    match table {
        Some(table) if !table.is_empty() => table.currencies().cloned().collect(),
        Some(table) => vec![table.pivot().clone()],
        None => vec![CurrencyCode::default_pivot()],
    }
}

/// Units of `quote` per one unit of `base`; `None` when either is unpriced.
pub fn cross_rate(table: Option<&RateTable>, base: &CurrencyCode, quote: &CurrencyCode) -> Option<f64> {
    table.and_then(|t| t.cross_rate(base, quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s)
    }

    fn table() -> RateTable {
        RateTable::new(
            code("USD"),
            vec![(code("USD"), 1.0), (code("EUR"), 0.9), (code("INR"), 83.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_pivot_to_target() {
        let result = convert(100.0, &code("USD"), &code("INR"), Some(&table()));
        assert_eq!(result.amount, 8300.0);
        assert!(result.is_converted());
    }

    #[test]
    fn test_cross_conversion_via_pivot() {
        let result = convert(90.0, &code("EUR"), &code("INR"), Some(&table()));
        assert_relative_eq!(result.amount, 8300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_same_currency_skips_lookup() {
        // Not listed, yet returned untouched and without warning.
        let result = convert(42.5, &code("XYZ"), &code("XYZ"), None);
        assert_eq!(result.amount, 42.5);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_no_table_is_identity_with_warning() {
        let result = convert(50.0, &code("USD"), &code("INR"), None);
        assert_eq!(result.amount, 50.0);
        assert_eq!(result.warning, Some(ConversionWarning::RateUnavailable));
    }

    #[test]
    fn test_missing_target_names_currency() {
        let only_usd = RateTable::new(code("USD"), vec![(code("USD"), 1.0)]).unwrap();
        let result = convert(50.0, &code("USD"), &code("XYZ"), Some(&only_usd));
        assert_eq!(result.amount, 50.0);
        assert_eq!(
            result.warning,
            Some(ConversionWarning::UnknownCurrencyCode { code: code("XYZ") })
        );
        assert!(result.warning.unwrap().to_string().contains("XYZ"));
    }

    #[test]
    fn test_missing_source_checked_first() {
        let result = convert(50.0, &code("AAA"), &code("BBB"), Some(&table()));
        assert_eq!(
            result.warning,
            Some(ConversionWarning::UnknownCurrencyCode { code: code("AAA") })
        );
    }

    #[test]
    fn test_round_trip() {
        let t = table();
        let there = convert(1234.56, &code("EUR"), &code("INR"), Some(&t));
        let back = convert(there.amount, &code("INR"), &code("EUR"), Some(&t));
        assert_relative_eq!(back.amount, 1234.56, max_relative = 1e-12);
    }

    #[test]
    fn test_available_currencies() {
        let codes = list_available_currencies(Some(&table()));
        assert_eq!(codes, vec![code("EUR"), code("INR"), code("USD")]);
    }

    #[test]
    fn test_available_currencies_fallback() {
        assert_eq!(list_available_currencies(None), vec![code("USD")]);
        let empty = RateTable::empty(code("EUR"));
        assert_eq!(list_available_currencies(Some(&empty)), vec![code("EUR")]);
    }

    #[test]
    fn test_cross_rate_helper() {
        assert_eq!(cross_rate(None, &code("USD"), &code("INR")), None);
        assert_eq!(cross_rate(Some(&table()), &code("USD"), &code("INR")), Some(83.0));
    }
}
