use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Code of the pivot currency used when nothing else is configured.
pub const DEFAULT_PIVOT: &str = "USD";

/// ISO 4217-style currency code.
///
/// Codes coming from user input or from a rate feed should go through
/// [`CurrencyCode::parse`], which trims and upper-cases them so that
/// `"inr"` and `"INR"` name the same currency.
///
/// # Examples
///
/// ```
/// use emi_insights::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let parsed = CurrencyCode::parse(" usd ").unwrap();
/// assert_eq!(usd, parsed);
/// ```
/// Serializes as the bare code string; deserializing goes through
/// [`CurrencyCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// Errors arising from currency code parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyCodeError {
    #[error("currency code must not be empty")]
    Empty,
    #[error("currency code {0:?} contains characters other than ASCII letters and digits")]
    InvalidCharacters(String),
}

impl CurrencyCode {
    /// Wrap a code verbatim, without normalization.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Normalize and validate a code: surrounding whitespace is dropped and
    /// letters are upper-cased.
    pub fn parse(input: &str) -> Result<Self, CurrencyCodeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CurrencyCodeError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurrencyCodeError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The default pivot currency (`USD`).
    pub fn default_pivot() -> Self {
        Self::new(DEFAULT_PIVOT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::default_pivot()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
