//! # emi-insights
//!
//! Loan EMI and amortization engine with multi-currency display.
//!
//! Given a principal, an annual interest rate and a tenure, this crate
//! computes the equated monthly installment and the month-by-month
//! amortization schedule, then re-expresses every figure in a selected
//! display currency through a table of pivot-relative exchange rates.
//!
//! ## Architecture
//!
//! - **core**: Currency codes, validated loan parameters
//! - **amortization**: EMI formula, amortization schedule, loan summaries
//! - **fx**: Rate tables, pivot conversion, rate sources, caching, display context
//! - **format**: Currency display formatting
//! - **config**: Runtime configuration
//! - **simulation**: Random loan generation for benchmarks and stress tests

pub mod amortization;
pub mod config;
pub mod core;
pub mod format;
pub mod fx;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::amortization::emi::compute_emi;
    pub use crate::amortization::schedule::{compute_schedule, AmortizationEntry};
    pub use crate::amortization::summary::{DisplaySummary, LoanSummary};
    pub use crate::core::currency::CurrencyCode;
    pub use crate::core::loan::{LoanError, LoanParams};
    pub use crate::fx::cache::{RateCache, RateSnapshot};
    pub use crate::fx::context::CurrencyContext;
    pub use crate::fx::converter::{convert, list_available_currencies, Conversion, ConversionWarning};
    pub use crate::fx::provider::RateSource;
    pub use crate::fx::rate_table::RateTable;
}
