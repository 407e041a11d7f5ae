pub mod analytics;
pub mod dashboard;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /analytics/overview                      KPI overview (admin)
/// /analytics/users                         user report
/// /analytics/revenue                       revenue report
/// /analytics/subscriptions                 subscription report
/// /analytics/content                       content report
/// /analytics/engagement                    engagement report
/// /analytics/instructors                   per-instructor statistics
/// /analytics/instructors/{id}              single instructor
/// /analytics/realtime                      last-hour snapshot
/// /analytics/compare                       period comparison
/// /analytics/mrr                           monthly recurring revenue series
/// /analytics/arr                           annual recurring revenue
/// /analytics/churn                         churn / retention for a range
/// /analytics/ltv                           simplified lifetime value
/// /analytics/retention                     signup cohort retention
///
/// /dashboard                               get, update layout (auth)
/// /dashboard/reset                         restore default layout (POST)
/// /dashboard/widgets                       catalog, add placement
/// /dashboard/widgets/{widget_id}           update, remove placement
/// /dashboard/widgets/{widget_id}/data      widget data
/// /dashboard/admin/widgets                 list all, create (admin)
/// /dashboard/admin/widgets/{id}            update, delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/analytics", analytics::router())
        .nest("/dashboard", dashboard::router())
}
