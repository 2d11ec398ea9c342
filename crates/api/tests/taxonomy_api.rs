//! HTTP-level integration tests for the category and geographic taxonomies.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_superuser, delete_auth, get, login, patch_json_auth,
    post_json_auth, user_with_token,
};
use sqlx::PgPool;

async fn admin_token(pool: &PgPool, app: &axum::Router) -> String {
    create_superuser(pool, "admin@example.com").await;
    login(app, "admin@example.com").await
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_crud_and_visibility(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/category",
        serde_json::json!({ "name": "Repair", "description": "Home repair" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = body_json(response).await;
    let id = category["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/sub_category",
        serde_json::json!({ "category_id": id, "name": "Plumbing" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app.clone(), &format!("/api/v1/category/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Repair");
    assert_eq!(json["subcategories"][0]["name"], "Plumbing");

    // Hidden categories disappear from public reads.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/category/{id}"),
        serde_json::json!({ "is_visible": false }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app.clone(), &format!("/api/v1/category/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(get(app.clone(), "/api/v1/category").await).await;
    assert_eq!(json["count"], 0);

    let response = delete_auth(app, &format!("/api/v1/category/{id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_writes_require_admin(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "user@example.com").await;

    let response = post_json_auth(
        app,
        "/api/v1/category",
        serde_json::json!({ "name": "Repair" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_name_length_is_checked(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;

    let response = post_json_auth(
        app,
        "/api/v1/category",
        serde_json::json!({ "name": "x".repeat(29) }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_page_past_the_end_is_invalid(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/category?page=3").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Invalid page.");
}

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_geo_hierarchy(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;

    let country = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/geo/country",
            serde_json::json!({ "name": "Russia" }),
            &admin,
        )
        .await,
    )
    .await;
    let other_country = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/geo/country",
            serde_json::json!({ "name": "Georgia" }),
            &admin,
        )
        .await,
    )
    .await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/geo/region",
        serde_json::json!({ "country_id": country["id"], "name": "Moscow Oblast" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let region = body_json(response).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/geo/city",
        serde_json::json!({
            "region_id": region["id"],
            "name": "Moscow",
            "longitude": 37.6,
            "latitude": 55.75,
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let city = body_json(response).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/geo/subway_branch",
        serde_json::json!({ "city_id": city["id"], "name": "Red", "color": "#ff0000" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let branch = body_json(response).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/geo/subway",
        serde_json::json!({
            "city_id": city["id"],
            "branch_id": branch["id"],
            "name": "Lubyanka",
        }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let country_id = country["id"].as_str().unwrap();
    let response = get(app.clone(), &format!("/api/v1/geo/region?country={country_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["name"], "Moscow Oblast");

    let other_id = other_country["id"].as_str().unwrap();
    let response = get(app.clone(), &format!("/api/v1/geo/region?country={other_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);

    let branch_id = branch["id"].as_str().unwrap();
    let response = get(app, &format!("/api/v1/geo/subway?branch={branch_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["results"][0]["name"], "Lubyanka");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_subway_branch_color_is_validated(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;

    let country = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/geo/country",
            serde_json::json!({ "name": "Russia" }),
            &admin,
        )
        .await,
    )
    .await;
    let region = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/geo/region",
            serde_json::json!({ "country_id": country["id"], "name": "Moscow Oblast" }),
            &admin,
        )
        .await,
    )
    .await;
    let city = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/geo/city",
            serde_json::json!({ "region_id": region["id"], "name": "Moscow" }),
            &admin,
        )
        .await,
    )
    .await;

    let response = post_json_auth(
        app,
        "/api/v1/geo/subway_branch",
        serde_json::json!({ "city_id": city["id"], "name": "Red", "color": "red" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_with_unknown_country_is_rejected(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;

    let response = post_json_auth(
        app,
        "/api/v1/geo/region",
        serde_json::json!({ "country_id": uuid::Uuid::new_v4(), "name": "Nowhere" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
