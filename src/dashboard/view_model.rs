//! Pure data shaping for the dashboard charts.
//!
//! The view models sit between the fetched payload and the chart builders:
//! the pie view model pairs each sentiment category with a palette color and
//! the line view model pairs the date labels with the sentiment values.

use crate::payload::{SentimentPayload, SentimentRecord};

/// The chart color palette, assigned to categories in order and repeated
/// cyclically when there are more categories than colors.
const PALETTE: [&str; 3] = ["#FF6384", "#36A2EB", "#FFCE56"];

/// The data for the sentiment distribution pie chart.
pub(super) struct PieViewModel {
    /// The category labels, in payload order
    pub labels: Vec<String>,
    /// The value for each category
    pub values: Vec<f64>,
    /// The slice color for each category
    pub colors: Vec<&'static str>,
}

impl PieViewModel {
    /// Creates the pie chart data from the sentiment records, preserving
    /// their order.
    pub fn from_records(records: &[SentimentRecord]) -> Self {
        Self {
            labels: records.iter().map(|record| record.label.clone()).collect(),
            values: records.iter().map(|record| record.value).collect(),
            colors: records
                .iter()
                .enumerate()
                .map(|(index, _)| PALETTE[index % PALETTE.len()])
                .collect(),
        }
    }
}

/// The data for the sentiment timeline line chart.
pub(super) struct LineViewModel {
    /// The date labels for the x-axis
    pub labels: Vec<String>,
    /// The sentiment values, paired with the labels by position
    pub values: Vec<f64>,
}

impl LineViewModel {
    /// Creates the line chart data from the payload.
    ///
    /// The dates and sentiment values are paired by position. No length
    /// check is made, the chart simply stops at the shorter of the two
    /// lists.
    pub fn from_payload(payload: &SentimentPayload) -> Self {
        Self {
            labels: payload.dates.clone(),
            values: payload
                .sentiments
                .iter()
                .map(|record| record.value)
                .collect(),
        }
    }
}
