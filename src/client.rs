//! HTTP client for the remote sentiment API.

use std::time::Duration;

use time::Date;

use crate::{Error, payload::SentimentPayload};

/// How long to wait for the sentiment API before giving up on a fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The filter state that drives each fetch.
///
/// The dates may be in either order; the API accepts both and the dashboard
/// does not validate that the start comes before the end. An empty `filter`
/// string means "no filter".
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentQuery {
    /// Start of the date range.
    pub start_date: Date,
    /// End of the date range.
    pub end_date: Date,
    /// Free-text filter matched against the source or label.
    pub filter: String,
}

/// A client for the remote `/sentiments` endpoint.
#[derive(Debug, Clone)]
pub struct SentimentClient {
    client: reqwest::Client,
    base_url: String,
}

impl SentimentClient {
    /// Create a client for the sentiment API at `base_url`.
    ///
    /// # Errors
    /// Returns [Error::ApiRequest] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::ApiRequest(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch the sentiment payload for `query`.
    ///
    /// Issues exactly one network request per invocation, with the start
    /// date, end date and filter sent as query parameters. There is no retry
    /// and no debounce; callers are expected to discard stale responses via
    /// the payload cache.
    ///
    /// # Errors
    /// Returns [Error::ApiRequest] on transport failures, [Error::ApiStatus]
    /// on non-2xx responses and [Error::InvalidPayload] if the body cannot be
    /// parsed.
    pub async fn fetch(&self, query: &SentimentQuery) -> Result<SentimentPayload, Error> {
        let url = format!("{}/sentiments", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("startDate", query.start_date.to_string()),
                ("endDate", query.end_date.to_string()),
                ("filter", query.filter.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ApiStatus(status.as_u16()));
        }

        Ok(response.json::<SentimentPayload>().await?)
    }
}
