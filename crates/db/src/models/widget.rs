//! Widget catalog model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use yogahub_core::types::{DbId, Timestamp};

/// A row from the `widgets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub widget_type: String,
    pub data_source: String,
    pub chart_config: Option<serde_json::Value>,
    pub default_width: i32,
    pub default_height: i32,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a catalog widget.
///
/// `widget_type` and `data_source` are checked against the known sets by
/// the service before insert.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidget {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub widget_type: String,
    pub data_source: String,
    pub chart_config: Option<serde_json::Value>,
    #[validate(range(min = 1, max = 12))]
    pub default_width: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub default_height: Option<i32>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
}

/// DTO for patching a catalog widget. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWidget {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub widget_type: Option<String>,
    pub data_source: Option<String>,
    pub chart_config: Option<serde_json::Value>,
    #[validate(range(min = 1, max = 12))]
    pub default_width: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub default_height: Option<i32>,
    pub is_default: Option<bool>,
    pub is_active: Option<bool>,
}
