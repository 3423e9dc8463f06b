use crate::amortization::schedule::AmortizationEntry;
use crate::core::currency::CurrencyCode;
use crate::core::loan::{LoanError, LoanParams};
use crate::fx::context::CurrencyContext;
use crate::fx::converter::ConversionWarning;
use serde::Serialize;
use std::fmt;

/// Installment, schedule and totals of one loan, in the loan's own currency.
///
/// Either every figure is computed or the calculation fails as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanSummary {
    pub params: LoanParams,
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationEntry>,
}

/// A [`LoanSummary`] re-expressed in a display currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySummary {
    pub currency: CurrencyCode,
    pub principal: f64,
    pub emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationEntry>,
    /// Distinct reasons any figure was left unconverted.
    pub warnings: Vec<ConversionWarning>,
}

impl LoanSummary {
    pub fn calculate(params: &LoanParams) -> Result<Self, LoanError> {
        let emi = params.emi()?;
        let schedule = params.schedule()?;
        let total_payment = emi * f64::from(params.tenure_months());
        Ok(Self {
            params: *params,
            emi,
            total_payment,
            total_interest: total_payment - params.principal(),
            schedule,
        })
    }

    /// Convert every figure from `base` into the context's display currency.
    ///
    /// When no figure could be converted the result stays labelled with
    /// `base`, so unconverted amounts are never shown under the target code.
    pub fn to_display(&self, ctx: &CurrencyContext, base: &CurrencyCode) -> DisplaySummary {
        let mut warnings: Vec<ConversionWarning> = Vec::new();
        let mut any_converted = false;
        let mut display = |amount: f64| {
            let conversion = ctx.to_display(amount, base);
            match conversion.warning {
                Some(w) => {
                    if !warnings.contains(&w) {
                        warnings.push(w);
                    }
                }
                None => any_converted = true,
            }
            conversion.amount
        };

        let principal = display(self.params.principal());
        let emi = display(self.emi);
        let total_payment = display(self.total_payment);
        let total_interest = display(self.total_interest);
        let schedule: Vec<AmortizationEntry> = self
            .schedule
            .iter()
            .map(|entry| AmortizationEntry {
                month: entry.month,
                principal_payment: display(entry.principal_payment),
                interest_payment: display(entry.interest_payment),
                remaining_balance: display(entry.remaining_balance),
            })
            .collect();

        let currency = if any_converted {
            ctx.current_currency().clone()
        } else {
            base.clone()
        };

        DisplaySummary {
            currency,
            principal,
            emi,
            total_payment,
            total_interest,
            schedule,
            warnings,
        }
    }
}

impl fmt::Display for LoanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Loan Summary ===")?;
        writeln!(f, "Loan:            {}", self.params)?;
        writeln!(f, "Monthly EMI:     {:.2}", self.emi)?;
        writeln!(f, "Total Payment:   {:.2}", self.total_payment)?;
        writeln!(f, "Total Interest:  {:.2}", self.total_interest)?;
        Ok(())
    }
}
