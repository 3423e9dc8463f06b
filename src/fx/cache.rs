use crate::core::currency::CurrencyCode;
use crate::fx::provider::RateSource;
use crate::fx::rate_table::RateTable;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use std::sync::Arc;

/// How long a fetched table is served before a refresh is attempted.
pub const DEFAULT_TTL_HOURS: i64 = 4;

/// Minimum wait after a failed fetch before [`RateCache::current`] tries again.
pub const DEFAULT_RETRY_SECONDS: i64 = 60;

/// What the rest of the application sees of the rate cache at one instant.
#[derive(Debug, Clone, Default)]
pub struct RateSnapshot {
    /// Latest table, if any fetch ever succeeded.
    pub table: Option<Arc<RateTable>>,
    /// No table yet and none has failed: the first fetch is pending.
    pub loading: bool,
    /// The table is older than the cache TTL.
    pub stale: bool,
    /// Message of the most recent failed fetch, cleared on success.
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedRates {
    table: Arc<RateTable>,
    fetched_at: DateTime<Utc>,
}

/// Time-bounded cache in front of a [`RateSource`].
///
/// A successful fetch replaces the cached table wholesale. A failed fetch
/// leaves the previous table in place (reported as stale) and records the
/// error; it is never passed on to conversion code.
pub struct RateCache<S> {
    source: S,
    pivot: CurrencyCode,
    ttl: Duration,
    retry_interval: Duration,
    cached: Option<CachedRates>,
    last_error: Option<String>,
    failed_at: Option<DateTime<Utc>>,
}

impl<S: RateSource> RateCache<S> {
    pub fn new(source: S, pivot: CurrencyCode) -> Self {
        Self::with_ttl(source, pivot, Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(source: S, pivot: CurrencyCode, ttl: Duration) -> Self {
        Self {
            source,
            pivot,
            ttl,
            retry_interval: Duration::seconds(DEFAULT_RETRY_SECONDS),
            cached: None,
            last_error: None,
            failed_at: None,
        }
    }

    /// Replace the wait between a failed fetch and the next attempt.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn pivot(&self) -> &CurrencyCode {
        &self.pivot
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    /// Time the current table was fetched.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.cached.as_ref().map(|c| c.fetched_at)
    }

    fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        match &self.cached {
            Some(cached) => now - cached.fetched_at >= self.ttl,
            None => true,
        }
    }

    /// Report the cache state without fetching.
    pub fn snapshot(&self, now: DateTime<Utc>) -> RateSnapshot {
        RateSnapshot {
            table: self.cached.as_ref().map(|c| Arc::clone(&c.table)),
            loading: self.cached.is_none() && self.last_error.is_none(),
            stale: self.cached.is_some() && self.is_stale_at(now),
            last_error: self.last_error.clone(),
        }
    }

    /// Fetch unconditionally. On failure the previous table is kept.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> RateSnapshot {
        match self.source.fetch_rates(&self.pivot) {
            Ok(table) => {
                info!("fetched {} exchange rates against {}", table.len(), self.pivot);
                self.cached = Some(CachedRates {
                    table: Arc::new(table),
                    fetched_at: now,
                });
                self.last_error = None;
                self.failed_at = None;
            }
            Err(e) => {
                error!("failed to load exchange rates: {}; conversions may not be accurate", e);
                self.last_error = Some(e.to_string());
                self.failed_at = Some(now);
            }
        }
        self.snapshot(now)
    }

    /// Serve the cached table, refreshing first when it is missing or past
    /// its TTL. After a failed fetch no new attempt is made until the retry
    /// interval has passed.
    pub fn current(&mut self, now: DateTime<Utc>) -> RateSnapshot {
        if let Some(failed_at) = self.failed_at {
            if now - failed_at < self.retry_interval {
                return self.snapshot(now);
            }
        }
        if self.is_stale_at(now) {
            debug!("rate cache for {} is empty or expired, refreshing", self.pivot);
            return self.refresh(now);
        }
        self.snapshot(now)
    }

    /// [`RateCache::current`] at the present instant.
    pub fn current_now(&mut self) -> RateSnapshot {
        self.current(Utc::now())
    }
}
