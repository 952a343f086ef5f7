//! The shared in-memory cache for the most recent sentiment payload.
//!
//! The dashboard holds exactly one payload: the latest successful response
//! from the sentiment API. Requests can overlap when the user changes
//! filters faster than network latency, and responses can complete out of
//! order, so every fetch takes a numbered ticket before it starts and a
//! response is only stored if no newer fetch has been issued since. Failed
//! fetches never touch the cache.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Error, payload::SentimentPayload};

/// A numbered ticket for one in-flight fetch.
///
/// Tickets are issued in a strictly increasing order by
/// [PayloadCache::begin_fetch].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Whether a fetched payload was stored or discarded.
#[derive(Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The payload replaced the cached one wholesale.
    Applied,
    /// A newer fetch was issued after this one started, so the payload was
    /// discarded and the cache left unchanged.
    Stale,
}

#[derive(Debug, Default)]
struct CacheInner {
    /// The highest ticket handed out so far.
    last_issued: u64,
    /// The ticket of the payload currently held.
    last_applied: u64,
    payload: SentimentPayload,
}

/// The most recent successful sentiment payload, shared across requests.
///
/// Starts out empty; [PayloadCache::snapshot] on a fresh cache returns a
/// payload with no records and no dates.
#[derive(Debug, Clone, Default)]
pub struct PayloadCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl PayloadCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the start of a fetch and get its ticket.
    ///
    /// # Errors
    /// Returns [Error::CacheLockError] if the cache lock is poisoned.
    pub fn begin_fetch(&self) -> Result<FetchTicket, Error> {
        let mut inner = self.lock()?;
        inner.last_issued += 1;

        Ok(FetchTicket(inner.last_issued))
    }

    /// Store `payload` if `ticket` still belongs to the most recently issued
    /// fetch, otherwise discard it.
    ///
    /// # Errors
    /// Returns [Error::CacheLockError] if the cache lock is poisoned.
    pub fn apply(
        &self,
        ticket: FetchTicket,
        payload: SentimentPayload,
    ) -> Result<ApplyOutcome, Error> {
        let mut inner = self.lock()?;

        if ticket.0 < inner.last_issued || ticket.0 <= inner.last_applied {
            tracing::debug!(
                "discarding stale sentiment payload: fetch {} was superseded",
                ticket.0
            );
            return Ok(ApplyOutcome::Stale);
        }

        inner.last_applied = ticket.0;
        inner.payload = payload;

        Ok(ApplyOutcome::Applied)
    }

    /// A copy of the currently held payload.
    ///
    /// # Errors
    /// Returns [Error::CacheLockError] if the cache lock is poisoned.
    pub fn snapshot(&self) -> Result<SentimentPayload, Error> {
        Ok(self.lock()?.payload.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheInner>, Error> {
        self.inner
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire payload cache lock: {error}"))
            .map_err(|_| Error::CacheLockError)
    }
}

#[cfg(test)]
mod payload_cache_tests {
    use crate::payload::{SentimentPayload, SentimentRecord};

    use super::{ApplyOutcome, PayloadCache};

    fn payload_with_label(label: &str) -> SentimentPayload {
        SentimentPayload {
            sentiments: vec![SentimentRecord {
                label: label.to_owned(),
                value: 1.0,
            }],
            dates: vec!["2024-01-01".to_owned()],
        }
    }

    #[test]
    fn fresh_cache_holds_empty_payload() {
        let cache = PayloadCache::new();

        assert!(cache.snapshot().unwrap().is_empty());
    }

    #[test]
    fn successful_fetch_replaces_payload_wholesale() {
        let cache = PayloadCache::new();

        let ticket = cache.begin_fetch().unwrap();
        let outcome = cache.apply(ticket, payload_with_label("positive")).unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(cache.snapshot().unwrap(), payload_with_label("positive"));

        let ticket = cache.begin_fetch().unwrap();
        cache.apply(ticket, payload_with_label("negative")).unwrap();

        assert_eq!(cache.snapshot().unwrap(), payload_with_label("negative"));
    }

    #[test]
    fn response_from_superseded_fetch_is_discarded() {
        let cache = PayloadCache::new();

        let first = cache.begin_fetch().unwrap();
        let second = cache.begin_fetch().unwrap();

        // The newer fetch completes first.
        let outcome = cache.apply(second, payload_with_label("newer")).unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);

        // The older response arrives late and must not overwrite it.
        let outcome = cache.apply(first, payload_with_label("older")).unwrap();
        assert_eq!(outcome, ApplyOutcome::Stale);

        assert_eq!(cache.snapshot().unwrap(), payload_with_label("newer"));
    }

    #[test]
    fn older_response_is_discarded_even_if_newer_fetch_failed() {
        let cache = PayloadCache::new();

        let seeded = cache.begin_fetch().unwrap();
        cache.apply(seeded, payload_with_label("seeded")).unwrap();

        let stale = cache.begin_fetch().unwrap();
        // A newer fetch starts before the stale response lands. It fails, so
        // apply is never called for it.
        let _failed = cache.begin_fetch().unwrap();

        let outcome = cache.apply(stale, payload_with_label("stale")).unwrap();

        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(cache.snapshot().unwrap(), payload_with_label("seeded"));
    }

    #[test]
    fn failed_fetch_leaves_previous_payload_untouched() {
        let cache = PayloadCache::new();

        let ticket = cache.begin_fetch().unwrap();
        cache.apply(ticket, payload_with_label("positive")).unwrap();

        // A failed fetch takes a ticket but never applies a payload.
        let _ticket = cache.begin_fetch().unwrap();

        assert_eq!(cache.snapshot().unwrap(), payload_with_label("positive"));
    }
}
