//! Handlers for the admin analytics endpoints.
//!
//! All routes require the `admin` role. Ranged reports accept
//! `?dateFrom=&dateTo=&filters=`; see [`RangeParams`].

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use yogahub_core::types::DbId;

use crate::error::AppResult;
use crate::extract::ApiPath;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{CompareParams, MonthsParams, RangeParams};
use crate::response::DataResponse;
use crate::services::analytics;
use crate::state::AppState;

/// GET /api/v1/analytics/overview
pub async fn overview(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = analytics::overview(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/users
pub async fn users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::user_analytics(&state.pool, &range, &filters).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/revenue
pub async fn revenue(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::revenue_analytics(&state.pool, &range, &filters).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/subscriptions
pub async fn subscriptions(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::subscription_analytics(&state.pool, &range, &filters).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/content
pub async fn content(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::content_analytics(&state.pool, &range, &filters).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/engagement
pub async fn engagement(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::engagement_analytics(&state.pool, &range, &filters).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/instructors
pub async fn instructors(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let report = analytics::instructor_analytics(&state.pool, &range, None).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/instructors/{id}
pub async fn instructor(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(instructor_id): ApiPath<DbId>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let report = analytics::instructor_detail(&state.pool, &range, instructor_id).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/realtime
pub async fn realtime(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = analytics::realtime_snapshot(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/compare
///
/// All of `metric`, `period1From`, `period1To`, `period2From` and
/// `period2To` are required.
pub async fn compare(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> AppResult<impl IntoResponse> {
    let comparison = params.resolve()?;
    let report = analytics::compare_periods(
        &state.pool,
        comparison.metric,
        &comparison.period1,
        &comparison.period2,
    )
    .await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/mrr
pub async fn mrr(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<MonthsParams>,
) -> AppResult<impl IntoResponse> {
    let months = params.months()?;
    let report = analytics::mrr_report(&state.pool, months, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/arr
pub async fn arr(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = analytics::arr_report(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/churn
pub async fn churn(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<impl IntoResponse> {
    let range = params.range(Utc::now())?;
    let filters = params.filters()?;
    let report = analytics::churn_report(&state.pool, &range, filters.plan_id).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/ltv
pub async fn ltv(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = analytics::ltv_report(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}

/// GET /api/v1/analytics/retention
pub async fn retention(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<MonthsParams>,
) -> AppResult<impl IntoResponse> {
    let months = params.months()?;
    let report = analytics::retention_report(&state.pool, months, Utc::now()).await?;
    Ok(Json(DataResponse::ok(report)))
}
