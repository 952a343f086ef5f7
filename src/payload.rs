//! The sentiment data returned by the remote sentiment API.

use serde::{Deserialize, Serialize};

/// One labeled measurement for the current query, e.g. "positive" → 12.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    /// The sentiment category, e.g. "positive", "neutral" or "negative".
    pub label: String,
    /// The measurement for the category, e.g. a count or a score.
    pub value: f64,
}

/// The complete API response for one fetch: all sentiment records and the
/// timeline date labels for the active query.
///
/// The timeline chart pairs `dates[i]` positionally with
/// `sentiments[i].value`. The API does not guarantee that the two lists have
/// the same length and the dashboard does not enforce it; the chart simply
/// stops at the shorter list.
///
/// A payload is replaced wholesale on every successful fetch. There is no
/// merging and no persistence beyond the in-memory session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentPayload {
    /// One entry per sentiment category, in the order the API returned them.
    #[serde(default)]
    pub sentiments: Vec<SentimentRecord>,
    /// Ordered x-axis labels for the timeline chart.
    #[serde(default)]
    pub dates: Vec<String>,
}

impl SentimentPayload {
    /// Whether the payload contains no sentiment records and no dates.
    ///
    /// A fresh server starts with an empty payload until the first
    /// successful fetch.
    pub fn is_empty(&self) -> bool {
        self.sentiments.is_empty() && self.dates.is_empty()
    }
}
