//! The application's endpoint URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The dashboard content partial, requested by HTMX when a filter changes.
pub const DASHBOARD_CONTENT: &str = "/dashboard/content";
/// The CSV download of the currently displayed sentiment data.
pub const EXPORT_CSV: &str = "/dashboard/export";
