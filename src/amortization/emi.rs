//! Equated monthly installment.
//!
//! `EMI = P × r × (1 + r)^n / ((1 + r)^n − 1)` where `r` is the monthly
//! rate (annual percent ÷ 12 ÷ 100) and `n` the number of monthly payments.
//! At `r == 0` the formula is 0/0 and the installment is simply `P / n`.
//!
//! `(1 + r)^n − 1` is evaluated as `expm1(n · ln1p(r))`: forming `1 + r`
//! first discards the low digits of a small `r`, and subtracting 1 again
//! leaves only that rounding error.

use crate::core::loan::{validate_inputs, LoanError};
use log::debug;

/// Monthly rate as a fraction, from an annual percentage.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Compute the equated monthly installment.
///
/// Returns [`LoanError::InvalidLoanParameters`] for a non-positive principal
/// or tenure, a negative rate, any non-finite input, or when the result
/// overflows. A rate of exactly zero takes the simple-division branch.
///
/// # Examples
///
/// ```
/// use emi_insights::amortization::emi::compute_emi;
///
/// let emi = compute_emi(100_000.0, 8.5, 5.0).unwrap();
/// assert!((emi - 2051.65).abs() < 0.01);
///
/// assert_eq!(compute_emi(1200.0, 0.0, 1.0).unwrap(), 100.0);
/// ```
pub fn compute_emi(principal: f64, annual_rate_percent: f64, tenure_years: f64) -> Result<f64, LoanError> {
    let months = validate_inputs(principal, annual_rate_percent, tenure_years, true)?;
    emi_for_months(principal, monthly_rate(annual_rate_percent), months)
}

/// Installment for an already validated principal, monthly rate and month count.
pub(crate) fn emi_for_months(principal: f64, monthly_rate: f64, months: u32) -> Result<f64, LoanError> {
    let n = f64::from(months);

    let emi = if monthly_rate == 0.0 {
        principal / n
    } else {
        let growth = (n * monthly_rate.ln_1p()).exp_m1();
        principal * (monthly_rate / growth) * (growth + 1.0)
    };

    if !emi.is_finite() || emi <= 0.0 {
        return Err(LoanError::invalid(
            "emi",
            format!(
                "computation overflowed for principal {} at monthly rate {} over {} months",
                principal, monthly_rate, months
            ),
        ));
    }

    debug!(
        "emi {:.4} for principal {} at monthly rate {} over {} months",
        emi, principal, monthly_rate, months
    );
    Ok(emi)
}
