//! HTTP error envelope for the reporting API.
//!
//! Every failure leaves the service as
//! `{ "success": false, "error": <message>, "code": <CODE> }`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use yogahub_core::error::CoreError;
use yogahub_core::types::DbId;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler and service function.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request the domain layer never saw (body, path, params).
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            AppError::InternalError(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", not_found_message(entity, *id))
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

/// Client-facing wording for a missing entity.
fn not_found_message(entity: &str, id: DbId) -> String {
    match entity {
        "Widget" => format!("Widget {id} is not in the widget catalog"),
        "DashboardWidget" => format!("Widget {id} is not on this dashboard"),
        "Instructor" => format!("Instructor {id} does not exist"),
        other => format!("{other} {id} does not exist"),
    }
}

/// Client-facing wording for a unique constraint violation.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_user_dashboard_widgets_user_widget" => {
            "This widget is already on the dashboard".to_string()
        }
        "uq_widgets_name" => "A widget with this name already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Map a sqlx error onto the envelope.
///
/// `RowNotFound` is a 404 and `uq_*` unique violations (SQLSTATE 23505) are
/// a 409. Everything else is a 500 whose detail stays in the log.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "The requested report data does not exist".to_string(),
        ),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.starts_with("uq_")) =>
        {
            let constraint = db_err.constraint().unwrap_or_default();
            (StatusCode::CONFLICT, "CONFLICT", conflict_message(constraint))
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
