use crate::amortization::emi::{emi_for_months, monthly_rate};
use crate::core::loan::{validate_inputs, LoanError};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Residual balance below which the final month is settled to exactly zero.
pub const FINAL_BALANCE_CLAMP: f64 = 0.01;

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// Payment number, starting at 1.
    pub month: u32,
    /// Part of the installment that reduces the balance.
    pub principal_payment: f64,
    /// Part of the installment that pays interest on the opening balance.
    pub interest_payment: f64,
    /// Balance outstanding after this payment.
    pub remaining_balance: f64,
}

impl AmortizationEntry {
    /// Total paid this month.
    pub fn payment(&self) -> f64 {
        self.principal_payment + self.interest_payment
    }
}

impl fmt::Display for AmortizationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "month {:>4}  principal {:>14.2}  interest {:>14.2}  balance {:>14.2}",
            self.month, self.principal_payment, self.interest_payment, self.remaining_balance
        )
    }
}

/// Compute the month-by-month amortization schedule.
///
/// Each month pays interest on the running balance and puts the rest of the
/// EMI towards principal. The schedule has exactly `tenure_years × 12`
/// entries. On the final month only, a residual balance smaller than
/// [`FINAL_BALANCE_CLAMP`] in absolute value is set to exactly `0.0`.
///
/// # Examples
///
/// ```
/// use emi_insights::amortization::schedule::compute_schedule;
///
/// let schedule = compute_schedule(100_000.0, 8.5, 5.0).unwrap();
/// assert_eq!(schedule.len(), 60);
/// assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
/// ```
pub fn compute_schedule(
    principal: f64,
    annual_rate_percent: f64,
    tenure_years: f64,
) -> Result<Vec<AmortizationEntry>, LoanError> {
    let months = validate_inputs(principal, annual_rate_percent, tenure_years, true)?;
    let rate = monthly_rate(annual_rate_percent);
    let emi = emi_for_months(principal, rate, months)?;

    let mut schedule = Vec::with_capacity(months as usize);
    let mut balance = principal;

    for month in 1..=months {
        let interest = balance * rate;
        let principal_paid = emi - interest;
        balance -= principal_paid;

        if month == months && balance.abs() < FINAL_BALANCE_CLAMP {
            trace!("clamping final balance {:e} to zero", balance);
            balance = 0.0;
        }

        schedule.push(AmortizationEntry {
            month,
            principal_payment: principal_paid,
            interest_payment: interest,
            remaining_balance: balance,
        });
    }

    Ok(schedule)
}

/// Sum of the principal paid over a schedule.
pub fn total_principal(schedule: &[AmortizationEntry]) -> f64 {
    schedule.iter().map(|e| e.principal_payment).sum()
}

/// Sum of the interest paid over a schedule.
pub fn total_interest(schedule: &[AmortizationEntry]) -> f64 {
    schedule.iter().map(|e| e.interest_payment).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::emi::compute_emi;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_schedule() {
        let schedule = compute_schedule(100_000.0, 8.5, 5.0).unwrap();
        let emi = compute_emi(100_000.0, 8.5, 5.0).unwrap();

        assert_eq!(schedule.len(), 60);
        assert_eq!(schedule[0].month, 1);
        assert_eq!(schedule[59].month, 60);
        assert_eq!(schedule[59].remaining_balance, 0.0);

        // First month interest is simply principal × monthly rate.
        assert_abs_diff_eq!(schedule[0].interest_payment, 708.3333, epsilon = 1e-3);

        for entry in &schedule {
            assert_abs_diff_eq!(entry.payment(), emi, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(total_principal(&schedule), 100_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_tiny_rates_amortize_fully() {
        for (principal, rate, years) in [(1000.0, 1e-12, 5.0), (10_000_000.0, 1e-6, 30.0)] {
            let schedule = compute_schedule(principal, rate, years).unwrap();
            assert_eq!(schedule.last().unwrap().remaining_balance, 0.0);
            assert_abs_diff_eq!(total_principal(&schedule), principal, epsilon = 0.01);
        }
    }

    #[test]
    fn test_balance_non_increasing() {
        let schedule = compute_schedule(50_000.0, 12.0, 3.0).unwrap();
        let mut previous = 50_000.0;
        for entry in &schedule {
            assert!(entry.remaining_balance <= previous);
            previous = entry.remaining_balance;
        }
    }

    #[test]
    fn test_interest_declines_principal_grows() {
        let schedule = compute_schedule(10_000.0, 6.0, 2.0).unwrap();
        for pair in schedule.windows(2) {
            assert!(pair[1].interest_payment < pair[0].interest_payment);
            assert!(pair[1].principal_payment > pair[0].principal_payment);
        }
    }

    #[test]
    fn test_zero_rate_schedule() {
        let schedule = compute_schedule(1200.0, 0.0, 1.0).unwrap();
        assert_eq!(schedule.len(), 12);
        for entry in &schedule {
            assert_eq!(entry.interest_payment, 0.0);
            assert_eq!(entry.principal_payment, 100.0);
        }
        assert_eq!(schedule[11].remaining_balance, 0.0);
    }

    #[test]
    fn test_only_final_month_is_clamped() {
        // Intermediate balances keep their exact computed values.
        let schedule = compute_schedule(1.0, 0.0, 0.25).unwrap();
        assert_eq!(schedule.len(), 3);
        assert!(schedule[0].remaining_balance > 0.6);
        assert!(schedule[1].remaining_balance > 0.3);
        assert_eq!(schedule[2].remaining_balance, 0.0);
    }

    #[test]
    fn test_small_non_final_balance_not_clamped() {
        // With 2 months at a tiny principal the first balance is below the
        // clamp threshold but must stay untouched.
        let schedule = compute_schedule(0.01, 1.0, 2.0 / 12.0).unwrap();
        assert!(schedule[0].remaining_balance > 0.0);
        assert!(schedule[0].remaining_balance < FINAL_BALANCE_CLAMP);
        assert_eq!(schedule[1].remaining_balance, 0.0);
    }

    #[test]
    fn test_restartable() {
        let a = compute_schedule(75_000.0, 9.25, 7.0).unwrap();
        let b = compute_schedule(75_000.0, 9.25, 7.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs_produce_no_schedule() {
        assert!(compute_schedule(-1.0, 8.5, 5.0).is_err());
        assert!(compute_schedule(1000.0, f64::NAN, 5.0).is_err());
        assert!(compute_schedule(1000.0, 8.5, -1.0).is_err());
    }

    #[test]
    fn test_entry_display() {
        let entry = AmortizationEntry {
            month: 1,
            principal_payment: 1343.32,
            interest_payment: 708.33,
            remaining_balance: 98_656.68,
        };
        let text = entry.to_string();
        assert!(text.contains("month    1"));
        assert!(text.contains("98656.68"));
    }
}
