//! Implements a struct that holds the state of the dashboard server.

use crate::{cache::PayloadCache, client::SentimentClient};

/// The state of the dashboard server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The client for the remote sentiment API.
    pub client: SentimentClient,

    /// The most recent successful sentiment payload.
    pub payload_cache: PayloadCache,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to determine "today" for the default filter date range.
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with an empty payload cache.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g.
    /// "Pacific/Auckland".
    pub fn new(client: SentimentClient, local_timezone: &str) -> Self {
        Self {
            client,
            payload_cache: PayloadCache::new(),
            local_timezone: local_timezone.to_owned(),
        }
    }
}
