//! Chart generation for the dashboard.
//!
//! This module turns the chart view models into ECharts configurations:
//! - **Sentiment Distribution**: a pie chart of the per-category values
//! - **Sentiment Timeline**: a line chart of the values over the date labels
//!
//! Each chart is generated as JSON for the ECharts library, with a
//! corresponding HTML container and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Color, Tooltip, Trigger},
    series::{Line, Pie},
};

use super::view_model::{LineViewModel, PieViewModel};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The pie chart of per-category sentiment values.
pub(super) fn distribution_chart(view_model: &PieViewModel) -> Chart {
    let data: Vec<(f64, &str)> = view_model
        .values
        .iter()
        .copied()
        .zip(view_model.labels.iter().map(String::as_str))
        .collect();

    Chart::new()
        .title(Title::new().text("Sentiment Distribution"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .color(
            view_model
                .colors
                .iter()
                .map(|&color| Color::from(color))
                .collect(),
        )
        .series(Pie::new().name("Sentiment").radius("60%").data(data))
}

/// The line chart of sentiment values over the date labels.
pub(super) fn timeline_chart(view_model: &LineViewModel) -> Chart {
    Chart::new()
        .title(Title::new().text("Sentiment Timeline"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(view_model.labels.clone()),
        )
        .y_axis(Axis::new().type_(AxisType::Value))
        .color(vec![Color::from("rgba(75,192,192,1)")])
        .series(
            Line::new()
                .name("Sentiment Over Time")
                .data(view_model.values.clone()),
        )
}

/// Generates the JavaScript that initializes the dashboard charts.
///
/// The script runs as soon as it is evaluated, so it must be placed after
/// the chart container divs. HTMX re-runs it when the dashboard content is
/// swapped in, which keeps the charts live across filter changes.
pub(super) fn charts_init_script(charts: &[DashboardChart]) -> String {
    charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    chart.setOption({});

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
