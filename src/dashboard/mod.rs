//! Dashboard module
//!
//! Serves the sentiment dashboard page: filter controls, a pie chart of the
//! sentiment distribution and a line chart of the sentiment timeline, plus
//! the HTMX partial that refreshes the charts when a filter changes.

mod charts;
mod handlers;
mod view;
mod view_model;

pub use handlers::{get_dashboard_content, get_dashboard_page};
