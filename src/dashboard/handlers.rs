//! Dashboard HTTP handlers.
//!
//! The full page and the HTMX content partial share the same flow: resolve
//! the filter query, fetch from the sentiment API, store the payload if it
//! is not stale, then render whatever the cache now holds. A failed fetch
//! only logs a diagnostic; the previous payload keeps being rendered.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    AppState, Error,
    cache::PayloadCache,
    client::{SentimentClient, SentimentQuery},
    payload::SentimentPayload,
    timezone::get_local_offset,
};

use super::{
    charts::{DashboardChart, distribution_chart, timeline_chart},
    view::{dashboard_content, dashboard_view},
    view_model::{LineViewModel, PieViewModel},
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The client for the remote sentiment API.
    pub client: SentimentClient,
    /// The most recent successful sentiment payload.
    pub payload_cache: PayloadCache,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            client: state.client.clone(),
            payload_cache: state.payload_cache.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The filter query parameters of the dashboard page.
///
/// Missing dates fall back to today in the server's local timezone, and a
/// missing filter falls back to the empty string, so the initial page load
/// queries today's data unfiltered.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Start of the date range.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub start_date: Option<Date>,
    /// End of the date range.
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<Date>,
    /// Free-text filter matched against the source or label.
    #[serde(default)]
    pub filter: Option<String>,
}

/// The date format used by HTML date inputs.
const QUERY_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Deserializes a date query parameter, treating a cleared date input
/// (empty string) the same as an absent one.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;

    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, QUERY_DATE_FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl DashboardQuery {
    fn resolve(self, local_timezone: &str) -> Result<SentimentQuery, Error> {
        let local_offset = get_local_offset(local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", local_timezone);
            Error::InvalidTimezoneError(local_timezone.to_owned())
        })?;
        let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

        Ok(SentimentQuery {
            start_date: self.start_date.unwrap_or(today),
            end_date: self.end_date.unwrap_or(today),
            filter: self.filter.unwrap_or_default(),
        })
    }
}

/// Display the dashboard page for the given filters.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let query = query.resolve(&state.local_timezone)?;
    let payload = refresh_payload(&state, &query).await?;
    let charts = build_dashboard_charts(&payload);

    Ok(dashboard_view(&query, &payload, &charts).into_response())
}

/// Serve the dashboard content partial for HTMX filter updates.
pub async fn get_dashboard_content(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let query = query.resolve(&state.local_timezone)?;
    let payload = refresh_payload(&state, &query).await?;
    let charts = build_dashboard_charts(&payload);

    Ok(dashboard_content(&payload, &charts).into_response())
}

/// Fetch the payload for `query` and return whatever the cache holds
/// afterwards.
///
/// Exactly one network call is made per invocation. On success the payload
/// replaces the cached one unless a newer fetch was issued in the meantime.
/// On failure the error is logged and the cached payload is left untouched,
/// so the charts keep showing the previous data.
async fn refresh_payload(
    state: &DashboardState,
    query: &SentimentQuery,
) -> Result<SentimentPayload, Error> {
    let ticket = state.payload_cache.begin_fetch()?;

    match state.client.fetch(query).await {
        Ok(payload) => {
            state.payload_cache.apply(ticket, payload)?;
        }
        Err(error) => {
            tracing::error!("could not fetch sentiment data: {error}");
        }
    }

    state.payload_cache.snapshot()
}

/// Creates the pair of dashboard charts from the payload.
fn build_dashboard_charts(payload: &SentimentPayload) -> [DashboardChart; 2] {
    let pie = PieViewModel::from_records(&payload.sentiments);
    let line = LineViewModel::from_payload(payload);

    [
        DashboardChart {
            id: "distribution-chart",
            options: distribution_chart(&pie).to_string(),
        },
        DashboardChart {
            id: "timeline-chart",
            options: timeline_chart(&line).to_string(),
        },
    ]
}

#[cfg(test)]
mod dashboard_handler_tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use axum::{
        Json, Router,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode},
        routing::get,
    };
    use scraper::{Html, Selector};
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{cache::PayloadCache, client::SentimentClient};

    use super::{DashboardQuery, DashboardState, get_dashboard_content, get_dashboard_page};

    /// A scripted stub of the sentiment API.
    ///
    /// Serves the scripted responses in order, repeating the last one, and
    /// records the query parameters of every request.
    struct StubApi {
        base_url: String,
        requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
    }

    async fn stub_api(responses: Vec<(StatusCode, Value)>) -> StubApi {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let call_count = Arc::new(AtomicUsize::new(0));

        let requests_for_route = requests.clone();
        let responses = Arc::new(responses);

        let router = Router::new().route(
            "/sentiments",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let requests = requests_for_route.clone();
                let responses = responses.clone();
                let call_count = call_count.clone();
                async move {
                    requests.lock().unwrap().push(params);
                    let index = call_count
                        .fetch_add(1, Ordering::SeqCst)
                        .min(responses.len() - 1);
                    let (status, body) = responses[index].clone();
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        StubApi {
            base_url: format!("http://{address}"),
            requests,
        }
    }

    fn test_state(api: &StubApi) -> DashboardState {
        DashboardState {
            client: SentimentClient::new(&api.base_url).unwrap(),
            payload_cache: PayloadCache::new(),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn test_query() -> DashboardQuery {
        DashboardQuery {
            start_date: Some(date!(2024 - 01 - 01)),
            end_date: Some(date!(2024 - 01 - 31)),
            filter: Some("".to_owned()),
        }
    }

    fn example_payload_json() -> Value {
        json!({
            "sentiments": [
                {"label": "positive", "value": 5},
                {"label": "negative", "value": 2}
            ],
            "dates": ["2024-01-01", "2024-01-02"]
        })
    }

    #[tokio::test]
    async fn dashboard_page_displays_filters_and_charts() {
        let api = stub_api(vec![(StatusCode::OK, example_payload_json())]).await;
        let state = test_state(&api);

        let response = get_dashboard_page(State(state), Query(test_query()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_element_exists(&html, "input[type='date'][name='start_date']");
        assert_element_exists(&html, "input[type='date'][name='end_date']");
        assert_element_exists(&html, "input[type='text'][name='filter']");
        assert_element_exists(&html, "a[href='/dashboard/export']");
        assert_element_exists(&html, "#distribution-chart");
        assert_element_exists(&html, "#timeline-chart");
    }

    #[tokio::test]
    async fn each_render_fetches_once_with_the_updated_parameters() {
        let api = stub_api(vec![(StatusCode::OK, example_payload_json())]).await;
        let state = test_state(&api);

        get_dashboard_content(State(state.clone()), Query(test_query()))
            .await
            .unwrap();

        let second_query = DashboardQuery {
            filter: Some("twitter".to_owned()),
            ..test_query()
        };
        get_dashboard_content(State(state), Query(second_query))
            .await
            .unwrap();

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 2, "expected one fetch per filter change");
        assert_eq!(requests[0].get("filter").unwrap(), "");
        assert_eq!(requests[1].get("filter").unwrap(), "twitter");
        assert_eq!(requests[1].get("startDate").unwrap(), "2024-01-01");
        assert_eq!(requests[1].get("endDate").unwrap(), "2024-01-31");
    }

    #[tokio::test]
    async fn failed_fetch_keeps_showing_the_previous_payload() {
        let api = stub_api(vec![
            (StatusCode::OK, example_payload_json()),
            (StatusCode::INTERNAL_SERVER_ERROR, json!({})),
        ])
        .await;
        let state = test_state(&api);

        let first = get_dashboard_page(State(state.clone()), Query(test_query()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = get_dashboard_page(State(state.clone()), Query(test_query()))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        // The charts still render from the first, successful payload.
        let html = parse_html(second).await;
        assert_element_exists(&html, "#distribution-chart");
        assert_element_exists(&html, "#timeline-chart");

        let cached = state.payload_cache.snapshot().unwrap();
        assert_eq!(cached.sentiments.len(), 2);
        assert_eq!(cached.dates.len(), 2);
    }

    #[tokio::test]
    async fn displays_prompt_text_on_empty_payload() {
        let api = stub_api(vec![(StatusCode::OK, json!({"sentiments": [], "dates": []}))]).await;
        let state = test_state(&api);

        let response = get_dashboard_page(State(state), Query(test_query()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html(response).await;
        let text: String = html.root_element().text().collect();
        assert!(
            text.contains("Nothing here yet"),
            "expected the empty-data prompt, got: {text}"
        );
    }

    #[test]
    fn query_parses_dates_and_treats_cleared_inputs_as_absent() {
        let query: DashboardQuery =
            serde_urlencoded::from_str("start_date=2024-01-01&end_date=&filter=news").unwrap();

        assert_eq!(query.start_date, Some(date!(2024 - 01 - 01)));
        assert_eq!(query.end_date, None);
        assert_eq!(query.filter.as_deref(), Some("news"));

        let query: DashboardQuery = serde_urlencoded::from_str("").unwrap();

        assert_eq!(query.start_date, None);
        assert_eq!(query.end_date, None);
        assert_eq!(query.filter, None);
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let api = stub_api(vec![(StatusCode::OK, example_payload_json())]).await;
        let state = DashboardState {
            local_timezone: "Atlantis/Lost_City".to_owned(),
            ..test_state(&api)
        };

        let result = get_dashboard_page(State(state), Query(test_query())).await;

        assert!(result.is_err());
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[track_caller]
    fn assert_element_exists(html: &Html, css_selector: &str) {
        let selector = Selector::parse(css_selector).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "No element matching '{}' found",
            css_selector
        );
    }
}
