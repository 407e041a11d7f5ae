use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema and widget catalog.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    yogahub_db::health_check(&pool).await.unwrap();

    let tables = [
        "users",
        "instructors",
        "subscription_plans",
        "subscriptions",
        "payments",
        "programs",
        "classes",
        "meditations",
        "video_progress",
        "planner_entries",
        "challenges",
        "challenge_enrollments",
        "instructor_payouts",
        "widgets",
        "user_dashboard_widgets",
    ];

    for table in tables {
        sqlx::query(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
    }
}

/// The catalog ships twelve widgets, eight of them on the default layout.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_widget_catalog_seeded(pool: PgPool) {
    let (total, defaults): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE is_default) FROM widgets")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total, 12);
    assert_eq!(defaults, 8);

    let (distinct_sources,): (i64,) =
        sqlx::query_as("SELECT COUNT(DISTINCT data_source) FROM widgets")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(distinct_sources, 12, "every data source has exactly one widget");
}

/// Placement rows reject out-of-range sizes at the schema level.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_placement_size_check(pool: PgPool) {
    let (user_id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, display_name) VALUES ('grid@test.com', 'Grid') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let result = sqlx::query(
        "INSERT INTO user_dashboard_widgets (user_id, widget_id, width, height) \
         VALUES ($1, (SELECT MIN(id) FROM widgets), 13, 2)",
    )
    .bind(user_id)
    .execute(&pool)
    .await;

    assert!(result.is_err(), "width 13 must violate the size check");
}
