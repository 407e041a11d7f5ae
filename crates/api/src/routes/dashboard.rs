//! Route definitions for user dashboards and widget catalog administration.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
///
/// ```text
/// GET    /                          -> get_dashboard
/// PUT    /                          -> update_layout
/// POST   /reset                     -> reset
/// GET    /widgets                   -> list_catalog
/// POST   /widgets                   -> add_widget
/// PATCH  /widgets/{widget_id}       -> update_widget_placement
/// DELETE /widgets/{widget_id}       -> remove_widget
/// GET    /widgets/{widget_id}/data  -> widget_data
/// GET    /admin/widgets             -> admin_list_widgets
/// POST   /admin/widgets             -> admin_create_widget
/// PATCH  /admin/widgets/{id}        -> admin_update_widget
/// DELETE /admin/widgets/{id}        -> admin_delete_widget
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(dashboard::get_dashboard).put(dashboard::update_layout),
        )
        .route("/reset", post(dashboard::reset))
        .route(
            "/widgets",
            get(dashboard::list_catalog).post(dashboard::add_widget),
        )
        .route(
            "/widgets/{widget_id}",
            patch(dashboard::update_widget_placement).delete(dashboard::remove_widget),
        )
        .route("/widgets/{widget_id}/data", get(dashboard::widget_data))
        .route(
            "/admin/widgets",
            get(dashboard::admin_list_widgets).post(dashboard::admin_create_widget),
        )
        .route(
            "/admin/widgets/{id}",
            patch(dashboard::admin_update_widget).delete(dashboard::admin_delete_widget),
        )
}
