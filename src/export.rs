//! CSV export of the currently displayed sentiment data.

use axum::{
    extract::{FromRef, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, cache::PayloadCache, payload::SentimentPayload};

/// The file name the browser saves the export as.
const EXPORT_FILE_NAME: &str = "sentiment_analysis_data.csv";

/// The state needed for the CSV export.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The most recent successful sentiment payload.
    pub payload_cache: PayloadCache,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            payload_cache: state.payload_cache.clone(),
        }
    }
}

/// Serialize `payload` as CSV with a `Date,Label,Value` header.
///
/// The body crosses every date with every sentiment record: one row
/// `date,label,value` per pair, dates outermost. An empty payload produces a
/// header-only file.
pub fn payload_to_csv(payload: &SentimentPayload) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["Date", "Label", "Value"])?;

    for date in &payload.dates {
        for record in &payload.sentiments {
            writer.write_record([
                date.as_str(),
                record.label.as_str(),
                &record.value.to_string(),
            ])?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::Csv(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::Csv(error.to_string()))
}

/// Download the currently displayed sentiment data as a CSV file.
///
/// Serializes whatever the payload cache holds; on a fresh server that is an
/// empty payload, which downloads as a header-only file.
pub async fn export_csv(State(state): State<ExportState>) -> Result<Response, Error> {
    let payload = state.payload_cache.snapshot()?;
    let body = payload_to_csv(&payload)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv;charset=utf-8;".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
