//! Repository for the `widgets` catalog.

use sqlx::PgPool;
use yogahub_core::types::DbId;

use crate::models::widget::{CreateWidget, UpdateWidget, Widget};

/// Column list for `widgets` queries.
const COLUMNS: &str = "\
    id, name, description, widget_type, data_source, chart_config, \
    default_width, default_height, is_default, is_active, created_at, updated_at";

/// Provides CRUD operations for dashboard widgets.
pub struct WidgetRepo;

impl WidgetRepo {
    /// Active widgets users may place, in catalog order.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Widget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM widgets WHERE is_active ORDER BY id");
        sqlx::query_as::<_, Widget>(&query).fetch_all(pool).await
    }

    /// Every widget, including inactive ones.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Widget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM widgets ORDER BY id");
        sqlx::query_as::<_, Widget>(&query).fetch_all(pool).await
    }

    /// Active widgets flagged for the default dashboard.
    pub async fn list_defaults(pool: &PgPool) -> Result<Vec<Widget>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM widgets WHERE is_default AND is_active ORDER BY id"
        );
        sqlx::query_as::<_, Widget>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Widget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM widgets WHERE id = $1");
        sqlx::query_as::<_, Widget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a widget. Omitted sizes and flags take the column defaults.
    pub async fn create(pool: &PgPool, input: &CreateWidget) -> Result<Widget, sqlx::Error> {
        let query = format!(
            "INSERT INTO widgets \
                (name, description, widget_type, data_source, chart_config, \
                 default_width, default_height, is_default, is_active) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 4), COALESCE($7, 3), \
                     COALESCE($8, FALSE), COALESCE($9, TRUE)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Widget>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.widget_type)
            .bind(&input.data_source)
            .bind(&input.chart_config)
            .bind(input.default_width)
            .bind(input.default_height)
            .bind(input.is_default)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Patch a widget. Returns `None` if no widget has this id.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWidget,
    ) -> Result<Option<Widget>, sqlx::Error> {
        let query = format!(
            "UPDATE widgets SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                widget_type = COALESCE($4, widget_type), \
                data_source = COALESCE($5, data_source), \
                chart_config = COALESCE($6, chart_config), \
                default_width = COALESCE($7, default_width), \
                default_height = COALESCE($8, default_height), \
                is_default = COALESCE($9, is_default), \
                is_active = COALESCE($10, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Widget>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.widget_type)
            .bind(&input.data_source)
            .bind(&input.chart_config)
            .bind(input.default_width)
            .bind(input.default_height)
            .bind(input.is_default)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a widget together with every placement referencing it.
    ///
    /// Placements go first, then the widget, in one transaction. Returns the
    /// number of placements removed, or `None` (with nothing deleted) if the
    /// widget does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<u64>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let placements = sqlx::query("DELETE FROM user_dashboard_widgets WHERE widget_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM widgets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(placements))
    }
}
