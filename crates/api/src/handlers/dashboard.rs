//! Handlers for per-user dashboards and the widget catalog.
//!
//! Dashboard endpoints act on the authenticated user's own placements.
//! Catalog administration requires the `admin` role.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use yogahub_core::types::DbId;
use yogahub_db::models::dashboard::{AddDashboardWidget, UpdateDashboardLayout, UpdatePlacement};
use yogahub_db::models::widget::{CreateWidget, UpdateWidget};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::RangeParams;
use crate::response::DataResponse;
use crate::services::dashboard;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// User dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard
///
/// The caller's placements joined with widget metadata. Seeds the default
/// layout on first access.
pub async fn get_dashboard(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let widgets = dashboard::get_user_dashboard(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::ok(widgets)))
}

/// PUT /api/v1/dashboard
///
/// Batch layout update; all or nothing.
pub async fn update_layout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateDashboardLayout>,
) -> AppResult<impl IntoResponse> {
    let widgets =
        dashboard::update_dashboard_layout(&state.pool, user.user_id, &input.widgets).await?;
    Ok(Json(DataResponse::ok(widgets)))
}

/// POST /api/v1/dashboard/reset
pub async fn reset(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let widgets = dashboard::reset_dashboard(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::ok(widgets)))
}

/// GET /api/v1/dashboard/widgets
///
/// Catalog of active widgets.
pub async fn list_catalog(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let widgets = dashboard::list_catalog(&state.pool).await?;
    Ok(Json(DataResponse::ok(widgets)))
}

/// POST /api/v1/dashboard/widgets
pub async fn add_widget(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AddDashboardWidget>,
) -> AppResult<impl IntoResponse> {
    let placement = dashboard::add_widget(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::ok(placement))))
}

/// PATCH /api/v1/dashboard/widgets/{widgetId}
pub async fn update_widget_placement(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(widget_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdatePlacement>,
) -> AppResult<impl IntoResponse> {
    let placement =
        dashboard::update_widget_placement(&state.pool, user.user_id, widget_id, &input).await?;
    Ok(Json(DataResponse::ok(placement)))
}

/// DELETE /api/v1/dashboard/widgets/{widgetId}
pub async fn remove_widget(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(widget_id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    dashboard::remove_widget(&state.pool, user.user_id, widget_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/dashboard/widgets/{widgetId}/data
///
/// Accepts the same `dateFrom` / `dateTo` / `filters` parameters as the
/// analytics endpoints.
pub async fn widget_data(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    ApiPath(widget_id): ApiPath<DbId>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let range = params.range(now)?;
    let filters = params.filters()?;
    let data = dashboard::get_widget_data(&state.pool, widget_id, &range, &filters, now).await?;
    Ok(Json(DataResponse::ok(data)))
}

// ---------------------------------------------------------------------------
// Widget catalog administration
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/admin/widgets
///
/// Every widget, including inactive ones.
pub async fn admin_list_widgets(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let widgets = dashboard::list_all_widgets(&state.pool).await?;
    Ok(Json(DataResponse::ok(widgets)))
}

/// POST /api/v1/dashboard/admin/widgets
pub async fn admin_create_widget(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = dashboard::create_widget(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::ok(widget))))
}

/// PATCH /api/v1/dashboard/admin/widgets/{id}
pub async fn admin_update_widget(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = dashboard::update_widget(&state.pool, id, &input).await?;
    Ok(Json(DataResponse::ok(widget)))
}

/// DELETE /api/v1/dashboard/admin/widgets/{id}
///
/// Removes every placement of the widget, then the widget.
pub async fn admin_delete_widget(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    dashboard::delete_widget(&state.pool, id).await?;
    tracing::info!(widget_id = id, user_id = admin.user_id, "Widget deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
