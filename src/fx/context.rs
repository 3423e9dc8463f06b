use crate::core::currency::CurrencyCode;
use crate::fx::cache::RateSnapshot;
use crate::fx::converter::{convert, list_available_currencies, Conversion, ConversionWarning};
use crate::fx::rate_table::RateTable;
use log::warn;
use std::sync::Arc;
use thiserror::Error;

/// Errors arising from display currency selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("currency {code} is not available; choose one of: {available}")]
    UnavailableCurrency { code: CurrencyCode, available: String },
}

/// Display currency selection plus the rate snapshot used to honour it.
///
/// There is no global instance: whoever renders amounts holds a context and
/// passes it by reference to the code that needs it.
#[derive(Debug, Clone)]
pub struct CurrencyContext {
    pivot: CurrencyCode,
    current: CurrencyCode,
    rates: Option<Arc<RateTable>>,
    loading: bool,
}

impl CurrencyContext {
    /// A context displaying in `pivot`, waiting for its first rate table.
    pub fn new(pivot: CurrencyCode) -> Self {
        Self {
            current: pivot.clone(),
            pivot,
            rates: None,
            loading: true,
        }
    }

    /// A context that already has rates.
    pub fn with_rates(rates: Arc<RateTable>) -> Self {
        let pivot = rates.pivot().clone();
        Self {
            current: pivot.clone(),
            pivot,
            rates: Some(rates),
            loading: false,
        }
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    pub fn current_currency(&self) -> &CurrencyCode {
        &self.current
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn rates(&self) -> Option<&RateTable> {
        self.rates.as_deref()
    }

    /// Adopt the latest cache state.
    pub fn update_from(&mut self, snapshot: &RateSnapshot) {
        self.rates = snapshot.table.clone();
        self.loading = snapshot.loading;
    }

    /// Codes the user may switch to, sorted.
    pub fn available_currencies(&self) -> Vec<CurrencyCode> {
        match self.rates() {
            Some(table) => list_available_currencies(Some(table)),
            None => vec![self.pivot.clone()],
        }
    }

    /// Switch the display currency. Unlisted codes are refused and the
    /// current selection is kept.
    pub fn change_currency(&mut self, code: CurrencyCode) -> Result<(), ContextError> {
        let available = self.available_currencies();
        if available.contains(&code) {
            self.current = code;
            return Ok(());
        }

        let listed = available
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        warn!(
            "attempted to change to an unavailable currency {}; available: {}",
            code, listed
        );
        Err(ContextError::UnavailableCurrency {
            code,
            available: listed,
        })
    }

    /// Convert between any two currencies with the context's rates.
    ///
    /// While loading, amounts pass through unchanged.
    pub fn convert_amount(&self, amount: f64, source: &CurrencyCode, target: &CurrencyCode) -> Conversion {
        if self.loading && source != target {
            return Conversion {
                amount,
                warning: Some(ConversionWarning::RateUnavailable),
            };
        }
        convert(amount, source, target, self.rates())
    }

    /// Express an amount held in `base` in the current display currency.
    pub fn to_display(&self, amount: f64, base: &CurrencyCode) -> Conversion {
        self.convert_amount(amount, base, &self.current)
    }
}

impl Default for CurrencyContext {
    fn default() -> Self {
        Self::new(CurrencyCode::default_pivot())
    }
}
