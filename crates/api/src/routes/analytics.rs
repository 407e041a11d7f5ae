//! Route definitions for the admin analytics reports.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Analytics routes mounted at `/analytics`. Every route is admin-only.
///
/// ```text
/// GET /overview           -> overview
/// GET /users              -> users
/// GET /revenue            -> revenue
/// GET /subscriptions      -> subscriptions
/// GET /content            -> content
/// GET /engagement         -> engagement
/// GET /instructors        -> instructors
/// GET /instructors/{id}   -> instructor
/// GET /realtime           -> realtime
/// GET /compare            -> compare
/// GET /mrr                -> mrr
/// GET /arr                -> arr
/// GET /churn              -> churn
/// GET /ltv                -> ltv
/// GET /retention          -> retention
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(analytics::overview))
        .route("/users", get(analytics::users))
        .route("/revenue", get(analytics::revenue))
        .route("/subscriptions", get(analytics::subscriptions))
        .route("/content", get(analytics::content))
        .route("/engagement", get(analytics::engagement))
        .route("/instructors", get(analytics::instructors))
        .route("/instructors/{id}", get(analytics::instructor))
        .route("/realtime", get(analytics::realtime))
        .route("/compare", get(analytics::compare))
        .route("/mrr", get(analytics::mrr))
        .route("/arr", get(analytics::arr))
        .route("/churn", get(analytics::churn))
        .route("/ltv", get(analytics::ltv))
        .route("/retention", get(analytics::retention))
}
