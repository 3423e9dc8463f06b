//! Rate sources.
//!
//! The calculator never talks to the upstream FX provider itself. Rates reach
//! it through a thin proxy that answers a `GET ?base=XXX` with either the bare
//! rate mapping (2xx) or `{"error": "..."}` (non-2xx). This module holds the
//! [`RateSource`] seam plus the parsing of that body contract.

use crate::core::currency::{CurrencyCode, CurrencyCodeError};
use crate::fx::rate_table::{RateError, RateTable};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors arising while fetching a rate table.
///
/// These stop at the cache: calculation code only ever sees a table or
/// nothing.
#[derive(Debug, Error)]
pub enum RateSourceError {
    #[error("failed to read rates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rate service returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("malformed rate body: {0}")]
    Malformed(#[from] RateError),
    #[error("invalid base currency: {0}")]
    InvalidBase(#[from] CurrencyCodeError),
}

/// Anything that can produce a fresh rate table quoted against `pivot`.
pub trait RateSource {
    fn fetch_rates(&self, pivot: &CurrencyCode) -> Result<RateTable, RateSourceError>;
}

impl<S: RateSource + ?Sized> RateSource for Box<S> {
    fn fetch_rates(&self, pivot: &CurrencyCode) -> Result<RateTable, RateSourceError> {
        (**self).fetch_rates(pivot)
    }
}

/// Bodies the proxy (or the upstream service it wraps) may answer with.
#[derive(Deserialize)]
#[serde(untagged)]
enum RateBody {
    Error {
        error: String,
    },
    /// Raw upstream envelope, as the proxy receives it.
    Envelope {
        conversion_rates: serde_json::Map<String, serde_json::Value>,
    },
    Rates(serde_json::Map<String, serde_json::Value>),
}

/// Interpret a proxy response.
///
/// A 2xx body is the rate mapping (a raw upstream envelope with
/// `conversion_rates` is accepted too). Any other status, or a body carrying
/// an `error` field, becomes [`RateSourceError::Upstream`].
pub fn parse_proxy_body(status: u16, body: &str, pivot: &CurrencyCode) -> Result<RateTable, RateSourceError> {
    let parsed: Result<RateBody, _> = serde_json::from_str(body);
    let success = (200..300).contains(&status);

    match parsed {
        Ok(RateBody::Error { error }) => Err(RateSourceError::Upstream {
            status,
            message: error,
        }),
        Ok(_) | Err(_) if !success => Err(RateSourceError::Upstream {
            status,
            message: "failed to fetch exchange rates".to_string(),
        }),
        Ok(RateBody::Envelope { conversion_rates }) => {
            Ok(RateTable::from_json_map(pivot.clone(), &conversion_rates)?)
        }
        Ok(RateBody::Rates(rates)) => Ok(RateTable::from_json_map(pivot.clone(), &rates)?),
        Err(e) => Err(RateSourceError::Malformed(RateError::Json(e))),
    }
}

/// Resolve the proxy's `base` query parameter: upper-cased, defaulting to
/// `default_pivot` when absent.
pub fn normalize_base(base: Option<&str>, default_pivot: &CurrencyCode) -> Result<CurrencyCode, RateSourceError> {
    match base {
        Some(raw) => Ok(CurrencyCode::parse(raw)?),
        None => Ok(default_pivot.clone()),
    }
}

/// Serves one fixed table. Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct StaticRateSource {
    table: RateTable,
}

impl StaticRateSource {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }
}

impl RateSource for StaticRateSource {
    fn fetch_rates(&self, pivot: &CurrencyCode) -> Result<RateTable, RateSourceError> {
        if self.table.pivot() != pivot {
            return Err(RateSourceError::Upstream {
                status: 400,
                message: format!(
                    "rates are quoted against {}, not {}",
                    self.table.pivot(),
                    pivot
                ),
            });
        }
        Ok(self.table.clone())
    }
}

/// Reads a saved proxy body from disk on every fetch.
///
/// The file is taken to be quoted against the requested pivot.
#[derive(Debug, Clone)]
pub struct JsonFileRateSource {
    path: PathBuf,
}

impl JsonFileRateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RateSource for JsonFileRateSource {
    fn fetch_rates(&self, pivot: &CurrencyCode) -> Result<RateTable, RateSourceError> {
        let body = fs::read_to_string(&self.path).map_err(|source| RateSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let table = parse_proxy_body(200, &body, pivot)?;
        debug!("loaded {} rates from {}", table.len(), self.path.display());
        Ok(table)
    }
}
