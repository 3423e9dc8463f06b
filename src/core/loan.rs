use crate::amortization::emi::compute_emi;
use crate::amortization::schedule::{compute_schedule, AmortizationEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest tenure accepted, in months (1000 years).
pub const MAX_TENURE_MONTHS: u32 = 12_000;

/// Tolerance used when checking that a fractional tenure covers whole months.
const WHOLE_MONTH_TOLERANCE: f64 = 1e-9;

/// Errors arising from loan calculations.
///
/// Fatal to the computation that raised it: no partial schedule or EMI is
/// ever returned alongside an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("invalid loan parameters: {field} {reason}")]
    InvalidLoanParameters { field: &'static str, reason: String },
}

impl LoanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        LoanError::InvalidLoanParameters {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending input.
    pub fn field(&self) -> &'static str {
        match self {
            LoanError::InvalidLoanParameters { field, .. } => field,
        }
    }
}

/// Validate raw engine inputs and return the number of monthly payments.
///
/// `allow_zero_rate` lets the engine functions reach their zero-interest
/// fallback; [`LoanParams::new`] always passes `false`.
pub(crate) fn validate_inputs(
    principal: f64,
    annual_rate_percent: f64,
    tenure_years: f64,
    allow_zero_rate: bool,
) -> Result<u32, LoanError> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(LoanError::invalid(
            "principal",
            format!("must be a positive finite amount, got {}", principal),
        ));
    }
    let rate_ok = if allow_zero_rate {
        annual_rate_percent >= 0.0
    } else {
        annual_rate_percent > 0.0
    };
    if !annual_rate_percent.is_finite() || !rate_ok {
        return Err(LoanError::invalid(
            "annual_rate_percent",
            format!("must be a positive finite percentage, got {}", annual_rate_percent),
        ));
    }
    tenure_months(tenure_years)
}

/// Convert a tenure in years to a whole number of months.
pub(crate) fn tenure_months(tenure_years: f64) -> Result<u32, LoanError> {
    if !tenure_years.is_finite() || tenure_years <= 0.0 {
        return Err(LoanError::invalid(
            "tenure_years",
            format!("must be a positive finite number of years, got {}", tenure_years),
        ));
    }
    let months = tenure_years * 12.0;
    let whole = months.round();
    if (months - whole).abs() > WHOLE_MONTH_TOLERANCE {
        return Err(LoanError::invalid(
            "tenure_years",
            format!("must cover a whole number of months, got {} months", months),
        ));
    }
    if whole < 1.0 || whole > MAX_TENURE_MONTHS as f64 {
        return Err(LoanError::invalid(
            "tenure_years",
            format!("must span 1 to {} months, got {}", MAX_TENURE_MONTHS, whole),
        ));
    }
    Ok(whole as u32)
}

/// Validated loan inputs.
///
/// Immutable once built; every field is strictly positive and finite and the
/// tenure covers a whole number of months.
///
/// # Examples
///
/// ```
/// use emi_insights::core::loan::LoanParams;
///
/// let params = LoanParams::new(100_000.0, 8.5, 5.0).unwrap();
/// assert_eq!(params.tenure_months(), 60);
/// assert!(LoanParams::new(100_000.0, 0.0, 5.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanParams")]
pub struct LoanParams {
    principal: f64,
    annual_rate_percent: f64,
    tenure_years: f64,
    #[serde(skip_serializing)]
    tenure_months: u32,
}

#[derive(Deserialize)]
struct RawLoanParams {
    principal: f64,
    annual_rate_percent: f64,
    tenure_years: f64,
}

impl TryFrom<RawLoanParams> for LoanParams {
    type Error = LoanError;

    fn try_from(raw: RawLoanParams) -> Result<Self, Self::Error> {
        LoanParams::new(raw.principal, raw.annual_rate_percent, raw.tenure_years)
    }
}

impl LoanParams {
    /// Build loan parameters, rejecting any non-positive or non-finite field.
    pub fn new(principal: f64, annual_rate_percent: f64, tenure_years: f64) -> Result<Self, LoanError> {
        let tenure_months = validate_inputs(principal, annual_rate_percent, tenure_years, false)?;
        Ok(Self {
            principal,
            annual_rate_percent,
            tenure_years,
            tenure_months,
        })
    }

    /// Build loan parameters from a tenure expressed in months.
    pub fn from_months(principal: f64, annual_rate_percent: f64, months: u32) -> Result<Self, LoanError> {
        Self::new(principal, annual_rate_percent, f64::from(months) / 12.0)
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate_percent(&self) -> f64 {
        self.annual_rate_percent
    }

    pub fn tenure_years(&self) -> f64 {
        self.tenure_years
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }

    /// Interest rate applied each month, as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 12.0 / 100.0
    }

    pub fn emi(&self) -> Result<f64, LoanError> {
        compute_emi(self.principal, self.annual_rate_percent, self.tenure_years)
    }

    pub fn schedule(&self) -> Result<Vec<AmortizationEntry>, LoanError> {
        compute_schedule(self.principal, self.annual_rate_percent, self.tenure_years)
    }
}

impl Default for LoanParams {
    /// 100 000 at 8.5 % over 5 years.
    fn default() -> Self {
        Self {
            principal: 100_000.0,
            annual_rate_percent: 8.5,
            tenure_years: 5.0,
            tenure_months: 60,
        }
    }
}

impl fmt::Display for LoanParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal {:.2} at {}% over {} years ({} months)",
            self.principal, self.annual_rate_percent, self.tenure_years, self.tenure_months
        )
    }
}
