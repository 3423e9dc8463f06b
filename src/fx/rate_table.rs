use crate::core::currency::CurrencyCode;
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Allowed distance of the pivot's own entry from 1.
const PIVOT_UNITY_TOLERANCE: f64 = 1e-9;

/// Errors arising from rate table construction.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate for {code} must be positive and finite, got {rate}")]
    InvalidRate { code: CurrencyCode, rate: f64 },
    #[error("pivot {pivot} must have a rate of 1, got {rate}")]
    PivotNotUnity { pivot: CurrencyCode, rate: f64 },
    #[error("rate body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rate body must be a JSON object of currency code to number")]
    NotAnObject,
}

/// Pivot-relative exchange rates.
///
/// Each entry is the value of **one unit of the pivot currency expressed in
/// that currency** ("units per pivot"). With a USD pivot, `INR: 83.0` means
/// 1 USD = 83 INR. This is the shape the upstream feed delivers.
///
/// A table is immutable once built: a refresh replaces it wholesale.
///
/// # Examples
///
/// ```
/// use emi_insights::core::currency::CurrencyCode;
/// use emi_insights::fx::rate_table::RateTable;
///
/// let table = RateTable::new(
///     CurrencyCode::new("USD"),
///     [("USD", 1.0), ("INR", 83.0)].into_iter().map(|(c, r)| (CurrencyCode::new(c), r)),
/// ).unwrap();
///
/// assert_eq!(table.rate(&CurrencyCode::new("INR")), Some(83.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    pivot: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

/// Rate of one currency against a chosen base, as listed to users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossRate {
    pub currency: CurrencyCode,
    /// Units of `currency` per one unit of the base; `None` when either side
    /// cannot be priced.
    pub rate: Option<f64>,
}

fn valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

impl RateTable {
    /// Build a table, rejecting any non-positive or non-finite rate and a
    /// pivot entry that is not 1.
    pub fn new(
        pivot: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, f64)>,
    ) -> Result<Self, RateError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if !valid_rate(rate) {
                return Err(RateError::InvalidRate { code, rate });
            }
            if code == pivot && (rate - 1.0).abs() > PIVOT_UNITY_TOLERANCE {
                return Err(RateError::PivotNotUnity { pivot, rate });
            }
            table.insert(code, rate);
        }
        Ok(Self { pivot, rates: table })
    }

    /// A table holding no rates at all.
    pub fn empty(pivot: CurrencyCode) -> Self {
        Self {
            pivot,
            rates: BTreeMap::new(),
        }
    }

    /// Parse a rate body: a JSON object mapping currency code to number.
    ///
    /// Lenient per entry: codes that fail to parse and values that are not
    /// positive finite numbers are skipped with a warning, so one bad entry
    /// in a feed does not discard the rest. A pivot entry other than 1 is
    /// still rejected, since every other rate would be off by the same factor.
    pub fn from_json(pivot: CurrencyCode, body: &str) -> Result<Self, RateError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let object = value.as_object().ok_or(RateError::NotAnObject)?;
        Self::from_json_map(pivot, object)
    }

    /// Same as [`RateTable::from_json`] for an already parsed object.
    pub fn from_json_map(
        pivot: CurrencyCode,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, RateError> {
        let mut rates = HashMap::with_capacity(object.len());
        for (raw_code, raw_rate) in object {
            let code = match CurrencyCode::parse(raw_code) {
                Ok(code) => code,
                Err(e) => {
                    warn!("skipping rate entry {:?}: {}", raw_code, e);
                    continue;
                }
            };
            match raw_rate.as_f64() {
                Some(rate) if valid_rate(rate) => {
                    rates.insert(code, rate);
                }
                _ => warn!("skipping rate entry {}: unusable value {}", code, raw_rate),
            }
        }

        Self::new(pivot, rates)
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    /// Units of `code` per one unit of the pivot, if listed.
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Listed currencies in lexicographic order.
    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    /// `(code, rate)` pairs in lexicographic code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    /// Units of `quote` per one unit of `base`, routed through the pivot.
    pub fn cross_rate(&self, base: &CurrencyCode, quote: &CurrencyCode) -> Option<f64> {
        if base == quote {
            return Some(1.0);
        }
        let base_rate = self.rate(base)?;
        let quote_rate = self.rate(quote)?;
        Some(quote_rate / base_rate)
    }

    /// Every listed currency priced against `base`, optionally restricted to
    /// codes containing `filter` (case-insensitive).
    pub fn cross_rates(&self, base: &CurrencyCode, filter: Option<&str>) -> Vec<CrossRate> {
        let needle = filter.map(|f| f.trim().to_ascii_uppercase());
        self.currencies()
            .filter(|code| match &needle {
                Some(n) => code.as_str().contains(n.as_str()),
                None => true,
            })
            .map(|code| CrossRate {
                currency: code.clone(),
                rate: self.cross_rate(base, code),
            })
            .collect()
    }
}
