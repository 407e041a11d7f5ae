//! HTTP-level integration tests for `/api/v1/analytics`.

mod common;

use axum::http::StatusCode;
use common::{admin, body_json, build_test_app, create_user, get, get_auth, member};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

async fn insert_subscription(
    pool: &PgPool,
    user_id: i64,
    started_at: &str,
    cancelled_at: Option<&str>,
) {
    let status = if cancelled_at.is_some() { "cancelled" } else { "active" };
    sqlx::query(
        "INSERT INTO subscriptions (user_id, status, started_at, cancelled_at) \
         VALUES ($1, $2, $3::TIMESTAMPTZ, $4::TIMESTAMPTZ)",
    )
    .bind(user_id)
    .bind(status)
    .bind(started_at)
    .bind(cancelled_at)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_user_at(pool: &PgPool, email: &str, created_at: &str) {
    sqlx::query(
        "INSERT INTO users (email, display_name, created_at) \
         VALUES ($1, 'Member', $2::TIMESTAMPTZ)",
    )
    .bind(email)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap();
}

async fn insert_payment(
    pool: &PgPool,
    user_id: i64,
    amount_cents: i64,
    status: &str,
    paid_at: &str,
) {
    sqlx::query(
        "INSERT INTO payments (user_id, amount_cents, status, paid_at) \
         VALUES ($1, $2, $3, $4::TIMESTAMPTZ)",
    )
    .bind(user_id)
    .bind(amount_cents)
    .bind(status)
    .bind(paid_at)
    .execute(pool)
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analytics_requires_token(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/analytics/overview").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analytics_rejects_non_admin(pool: PgPool) {
    let (_, token) = member(&pool, "member@test.com").await;

    for uri in [
        "/api/v1/analytics/overview",
        "/api/v1/analytics/churn",
        "/api/v1/analytics/mrr",
    ] {
        let response = get_auth(build_test_app(pool.clone()), uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_every_report_responds(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    for uri in [
        "/api/v1/analytics/overview",
        "/api/v1/analytics/users",
        "/api/v1/analytics/revenue",
        "/api/v1/analytics/subscriptions",
        "/api/v1/analytics/content",
        "/api/v1/analytics/engagement",
        "/api/v1/analytics/instructors",
        "/api/v1/analytics/realtime",
        "/api/v1/analytics/mrr",
        "/api/v1/analytics/arr",
        "/api/v1/analytics/churn",
        "/api/v1/analytics/ltv",
        "/api/v1/analytics/retention",
    ] {
        let response = get_auth(build_test_app(pool.clone()), uri, &token).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(response).await["success"], true, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_churn_for_january(pool: PgPool) {
    let (admin_id, token) = admin(&pool).await;

    insert_subscription(
        &pool,
        admin_id,
        "2023-12-01T00:00:00Z",
        Some("2024-01-15T00:00:00Z"),
    )
    .await;
    insert_subscription(&pool, admin_id, "2023-11-01T00:00:00Z", None).await;
    insert_subscription(&pool, admin_id, "2023-10-01T00:00:00Z", None).await;
    insert_subscription(&pool, admin_id, "2023-09-01T00:00:00Z", None).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/churn?dateFrom=2024-01-01&dateTo=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["startingSubscriptions"], 4);
    assert_eq!(data["churnedSubscriptions"], 1);
    assert_eq!(data["churnRate"], 25.0);
    assert_eq!(data["retentionRate"], 75.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_churn_without_subscriptions_is_zero(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/churn?dateFrom=2024-01-01&dateTo=2024-01-31",
        &token,
    )
    .await;
    let data = &body_json(response).await["data"];
    assert_eq!(data["startingSubscriptions"], 0);
    assert_eq!(data["churnRate"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_inverted_range_is_rejected(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/users?dateFrom=2024-02-01&dateTo=2024-01-01",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_out_of_range_years_are_rejected(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    for uri in [
        "/api/v1/analytics/users?dateFrom=-200000-01-01&dateTo=%2B200000-01-01",
        "/api/v1/analytics/revenue?dateFrom=-200000-01-01&dateTo=%2B200000-01-01",
        "/api/v1/analytics/users?dateFrom=0001-01-01&dateTo=9999-12-31",
    ] {
        let response = get_auth(build_test_app(pool.clone()), uri, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR", "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_filters_are_rejected(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/analytics/users?filters=not-json",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/users?filters=%7B%22role%22%3A%22guest%22%7D",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_report_honors_role_filter(pool: PgPool) {
    let (_, token) = admin(&pool).await;
    member(&pool, "m1@test.com").await;
    member(&pool, "m2@test.com").await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/users?filters=%7B%22role%22%3A%22member%22%7D",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["totalUsers"], 2);
    assert_eq!(data["newUsers"], 2);
}

// ---------------------------------------------------------------------------
// MRR and retention
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mrr_returns_ascending_months(pool: PgPool) {
    let (admin_id, token) = admin(&pool).await;
    insert_subscription(&pool, admin_id, "2020-01-01T00:00:00Z", None).await;

    let response = get_auth(build_test_app(pool), "/api/v1/analytics/mrr", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let months = json["data"].as_array().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[0]["growth"], 0.0);

    let labels: Vec<&str> = months.iter().map(|m| m["month"].as_str().unwrap()).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(labels, sorted);

    // One plan-less subscription throughout: fallback price every month.
    for month in months {
        assert_eq!(month["activeSubscriptions"], 1);
        assert_eq!(month["mrr"], 29.99);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mrr_months_parameter(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/analytics/mrr?months=3",
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);

    for bad in ["0", "37", "twelve"] {
        let response = get_auth(
            build_test_app(pool.clone()),
            &format!("/api/v1/analytics/mrr?months={bad}"),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "months={bad}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_retention_includes_empty_months(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/retention?months=6",
        &token,
    )
    .await;
    let json = body_json(response).await;
    let cohorts = json["data"].as_array().unwrap();
    assert_eq!(cohorts.len(), 6);
    // The admin signed up this month and holds no subscription.
    let current = cohorts.last().unwrap();
    assert_eq!(current["users"], 1);
    assert_eq!(current["retained"], 0);
    assert_eq!(current["retentionRate"], 0.0);
}

// ---------------------------------------------------------------------------
// Period comparison
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_users_between_periods(pool: PgPool) {
    let (_, token) = admin(&pool).await;
    insert_user_at(&pool, "a@test.com", "2024-02-03T00:00:00Z").await;
    insert_user_at(&pool, "b@test.com", "2024-02-10T00:00:00Z").await;
    insert_user_at(&pool, "c@test.com", "2024-01-10T00:00:00Z").await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/compare?metric=users\
         &period1From=2024-02-01&period1To=2024-02-29\
         &period2From=2024-01-01&period2To=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["metric"], "users");
    assert_eq!(data["period1"]["value"], 2.0);
    assert_eq!(data["period2"]["value"], 1.0);
    assert_eq!(data["change"], 1.0);
    assert_eq!(data["changePercent"], 100.0);
    assert_eq!(data["direction"], "up");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_revenue_trending_down(pool: PgPool) {
    let (_, token) = admin(&pool).await;
    let payer = create_user(&pool, "payer@test.com", "member").await;
    insert_payment(&pool, payer, 1000, "succeeded", "2024-02-05T00:00:00Z").await;
    insert_payment(&pool, payer, 5000, "failed", "2024-02-06T00:00:00Z").await;
    insert_payment(&pool, payer, 2999, "succeeded", "2024-01-05T00:00:00Z").await;
    insert_payment(&pool, payer, 1, "succeeded", "2024-01-20T00:00:00Z").await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/compare?metric=revenue\
         &period1From=2024-02-01&period1To=2024-02-29\
         &period2From=2024-01-01&period2To=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["metric"], "revenue");
    assert_eq!(data["period1"]["value"], 10.0);
    assert_eq!(data["period2"]["value"], 30.0);
    assert_eq!(data["change"], -20.0);
    assert_eq!(data["changePercent"], -66.67);
    assert_eq!(data["direction"], "down");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_subscriptions_flat(pool: PgPool) {
    let (_, token) = admin(&pool).await;
    let a = create_user(&pool, "sub-a@test.com", "member").await;
    let b = create_user(&pool, "sub-b@test.com", "member").await;
    insert_subscription(&pool, a, "2024-02-10T00:00:00Z", None).await;
    insert_subscription(&pool, b, "2024-01-10T00:00:00Z", Some("2024-01-20T00:00:00Z")).await;
    sqlx::query(
        "INSERT INTO subscriptions (user_id, status, started_at) \
         VALUES ($1, 'trialing', '2024-01-15T00:00:00Z')",
    )
    .bind(a)
    .execute(&pool)
    .await
    .unwrap();

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/compare?metric=subscriptions\
         &period1From=2024-02-01&period1To=2024-02-29\
         &period2From=2024-01-01&period2To=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = &body_json(response).await["data"];
    assert_eq!(data["metric"], "subscriptions");
    assert_eq!(data["period1"]["value"], 1.0);
    assert_eq!(data["period2"]["value"], 1.0);
    assert_eq!(data["change"], 0.0);
    assert_eq!(data["changePercent"], 0.0);
    assert_eq!(data["direction"], "flat");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_requires_all_parameters(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/compare?metric=revenue&period1From=2024-01-01",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_rejects_unknown_metric(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/compare?metric=pageviews\
         &period1From=2024-02-01&period1To=2024-02-29\
         &period2From=2024-01-01&period2To=2024-01-31",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Instructors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_instructor_id_is_rejected(pool: PgPool) {
    let (_, token) = admin(&pool).await;

    let response =
        get_auth(build_test_app(pool), "/api/v1/analytics/instructors/abc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_instructor_detail(pool: PgPool) {
    let (_, token) = admin(&pool).await;
    let (instructor_id,): (i64,) =
        sqlx::query_as("INSERT INTO instructors (display_name) VALUES ('Asha') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
    sqlx::query(
        "INSERT INTO classes (instructor_id, title, is_published) VALUES ($1, 'Flow', TRUE)",
    )
    .bind(instructor_id)
    .execute(&pool)
    .await
    .unwrap();

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/analytics/instructors/{instructor_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["instructorId"], instructor_id);
    assert_eq!(data["displayName"], "Asha");
    assert_eq!(data["classes"], 1);

    let response = get_auth(
        build_test_app(pool),
        "/api/v1/analytics/instructors/999999",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
