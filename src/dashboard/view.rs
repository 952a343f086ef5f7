//! HTML rendering for the dashboard page.

use maud::{Markup, PreEscaped, html};

use crate::{
    client::SentimentQuery,
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE,
        base,
    },
    payload::SentimentPayload,
};

use super::charts::{DashboardChart, charts_init_script};

/// The ECharts build the chart init scripts run against.
const ECHARTS_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// Renders the full dashboard page: filter controls, export link and the
/// chart sections.
pub(super) fn dashboard_view(
    query: &SentimentQuery,
    payload: &SentimentPayload,
    charts: &[DashboardChart; 2],
) -> Markup {
    let content = html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl"
            {
                header class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-2xl font-bold" { "Sentiment Analysis Tool" }

                    a href=(endpoints::EXPORT_CSV) class=(LINK_STYLE) download
                    {
                        "Export CSV"
                    }
                }

                (filter_form(query))

                div id="dashboard-content"
                {
                    (dashboard_content(payload, charts))
                }
            }
        }
    );

    let scripts = [HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned())];

    base("Dashboard", &scripts, &content)
}

/// Renders the filter controls.
///
/// Any change to a filter triggers exactly one HTMX GET for the dashboard
/// content partial, carrying the updated parameters. Without JavaScript the
/// form falls back to a plain GET of the full page.
fn filter_form(query: &SentimentQuery) -> Markup {
    html!(
        form
            id="filters"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            hx-get=(endpoints::DASHBOARD_CONTENT)
            hx-target="#dashboard-content"
            hx-swap="innerHTML"
            hx-trigger="change"
            class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6 bg-gray-50
                dark:bg-gray-800 p-4 rounded-lg"
        {
            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start date" }

                input
                    name="start_date"
                    id="start_date"
                    type="date"
                    value=(query.start_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end_date" class=(FORM_LABEL_STYLE) { "End date" }

                input
                    name="end_date"
                    id="end_date"
                    type="date"
                    value=(query.end_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter" class=(FORM_LABEL_STYLE) { "Filter" }

                input
                    name="filter"
                    id="filter"
                    type="text"
                    value=(query.filter)
                    placeholder="Filter by Source/Label"
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }
    )
}

/// Renders the chart sections and their init script.
///
/// This is also served on its own for HTMX updates, so a filter change
/// refreshes the charts without a full page reload.
pub(super) fn dashboard_content(
    payload: &SentimentPayload,
    charts: &[DashboardChart; 2],
) -> Markup {
    if payload.is_empty() {
        return no_data_view();
    }

    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }

        script { (PreEscaped(charts_init_script(charts))) }
    )
}

/// Renders the dashboard content when the payload holds no data at all.
fn no_data_view() -> Markup {
    html!(
        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once the sentiment API returns data
                for the selected date range and filter."
            }
        }
    )
}
