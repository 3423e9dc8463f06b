//! Random loan and rate generation.
//!
//! Produces portfolios of valid loans and plausible rate tables for
//! benchmarking the engine and exercising it under varied inputs.

use crate::core::currency::CurrencyCode;
use crate::core::loan::LoanParams;
use crate::fx::rate_table::RateTable;
use log::warn;
use rand::Rng;

/// Draws allowed per requested loan before generation gives up.
const MAX_ATTEMPTS_PER_LOAN: usize = 100;

/// Configuration for generating a random loan portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Number of loans to generate.
    pub loan_count: usize,
    /// Minimum principal.
    pub min_principal: f64,
    /// Maximum principal.
    pub max_principal: f64,
    /// Minimum annual rate, in percent.
    pub min_rate_percent: f64,
    /// Maximum annual rate, in percent.
    pub max_rate_percent: f64,
    /// Shortest tenure, in whole years.
    pub min_tenure_years: u32,
    /// Longest tenure, in whole years.
    pub max_tenure_years: u32,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            loan_count: 100,
            min_principal: 1_000.0,
            max_principal: 10_000_000.0,
            min_rate_percent: 0.5,
            max_rate_percent: 24.0,
            min_tenure_years: 1,
            max_tenure_years: 30,
        }
    }
}

impl PortfolioConfig {
    /// Whether every range is finite and ordered, so it can be sampled.
    pub fn has_valid_ranges(&self) -> bool {
        let ordered = |min: f64, max: f64| min <= max && (max - min).is_finite();
        ordered(self.min_principal, self.max_principal)
            && ordered(self.min_rate_percent, self.max_rate_percent)
            && self.min_tenure_years <= self.max_tenure_years
    }
}

/// Generate a random portfolio of valid loans.
///
/// Returns fewer than `loan_count` loans (possibly none) when the ranges
/// cannot be sampled or rarely yield valid parameters.
pub fn generate_random_loans(config: &PortfolioConfig) -> Vec<LoanParams> {
    let mut loans = Vec::with_capacity(config.loan_count);
    if !config.has_valid_ranges() {
        warn!("portfolio ranges are empty or not finite: {:?}", config);
        return loans;
    }

    let mut rng = rand::thread_rng();
    let max_attempts = config.loan_count.saturating_mul(MAX_ATTEMPTS_PER_LOAN);
    let mut attempts = 0;

    while loans.len() < config.loan_count {
        if attempts == max_attempts {
            warn!(
                "generated {} of {} loans after {} attempts",
                loans.len(),
                config.loan_count,
                attempts
            );
            break;
        }
        attempts += 1;

        let principal = rng.gen_range(config.min_principal..=config.max_principal);
        let rate = rng.gen_range(config.min_rate_percent..=config.max_rate_percent);
        let tenure = rng.gen_range(config.min_tenure_years..=config.max_tenure_years);

        // Rounded to cents, as a user would enter it.
        let principal = (principal * 100.0).round() / 100.0;

        if let Ok(params) = LoanParams::new(principal, rate, f64::from(tenure)) {
            loans.push(params);
        }
    }

    loans
}

/// Generate a rate table for `currencies`, quoted against `pivot`.
///
/// The pivot is listed at exactly 1; other rates fall between 0.01 and 500.
pub fn generate_random_rates(pivot: &CurrencyCode, currencies: &[CurrencyCode]) -> RateTable {
    let mut rng = rand::thread_rng();
    let rates: Vec<(CurrencyCode, f64)> = currencies
        .iter()
        .filter(|code| *code != pivot)
        .map(|code| (code.clone(), rng.gen_range(0.01..500.0)))
        .chain(std::iter::once((pivot.clone(), 1.0)))
        .collect();

    RateTable::new(pivot.clone(), rates).unwrap_or_else(|_| RateTable::empty(pivot.clone()))
}
