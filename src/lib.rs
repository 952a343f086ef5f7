//! Sentiview is a web app for exploring sentiment-analysis results.
//!
//! This library serves a single dashboard page that charts the distribution
//! and timeline of sentiment data fetched from a remote API, lets the user
//! filter by date range and free text, and exports the displayed data as a
//! CSV file.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod cache;
mod client;
mod dashboard;
mod endpoints;
mod export;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod payload;
mod routing;
mod timezone;

pub use app_state::AppState;
pub use client::SentimentClient;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request to the sentiment API could not be completed.
    ///
    /// This covers transport-level failures such as DNS errors, refused
    /// connections and timeouts. The previously fetched payload is kept and
    /// the error is only logged on the server.
    #[error("could not reach the sentiment API: {0}")]
    ApiRequest(String),

    /// The sentiment API responded with a non-2xx status code.
    #[error("the sentiment API returned HTTP {0}")]
    ApiStatus(u16),

    /// The sentiment API responded with a body that could not be parsed as a
    /// sentiment payload.
    #[error("could not parse the sentiment API response: {0}")]
    InvalidPayload(String),

    /// The sentiment payload could not be serialized as CSV.
    #[error("could not serialize the sentiment data as CSV: {0}")]
    Csv(String),

    /// Could not acquire the lock on the shared payload cache.
    #[error("could not acquire the payload cache lock")]
    CacheLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Error::InvalidPayload(value.to_string())
        } else {
            Error::ApiRequest(value.to_string())
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Csv(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string."
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
