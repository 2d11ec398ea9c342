//! HTTP-level integration tests for client and executor profiles, their
//! verification, feedback and the executor's work records.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_profile, create_superuser, delete_auth, get, login,
    patch_json_auth, post_json_auth, user_with_token,
};
use sqlx::PgPool;

fn id_of(json: &serde_json::Value) -> String {
    json["id"].as_str().expect("record must have an id").to_string()
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_client_profile_lifecycle(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (user, token) = user_with_token(&pool, &app, "client@example.com").await;

    let profile = create_profile(&app, &token, "client").await;
    assert_eq!(profile["user_id"], user.id.to_string());
    let id = id_of(&profile);

    // One profile of each kind per user.
    let response = post_json_auth(
        app.clone(),
        "/api/v1/client/profile",
        serde_json::json!({ "name": "Again" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/client/profile/{id}"),
        serde_json::json!({ "bio": "Looking for a plumber", "gender": "F" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["bio"], "Looking for a plumber");

    let response = get(app.clone(), &format!("/api/v1/client/profile/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app.clone(), &format!("/api/v1/client/profile/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app, &format!("/api/v1/client/profile/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_owner_only_updates(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_owner, owner) = user_with_token(&pool, &app, "owner@example.com").await;
    let (_other, other) = user_with_token(&pool, &app, "other@example.com").await;
    let id = id_of(&create_profile(&app, &owner, "executor").await);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/executor/profile/{id}"),
        serde_json::json!({ "name": "Hijack" }),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app, &format!("/api/v1/executor/profile/{id}"), &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_fields_are_validated(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "user@example.com").await;

    let response = post_json_auth(
        app,
        "/api/v1/executor/profile",
        serde_json::json!({ "gender": "X" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_requires_adult(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "user@example.com").await;
    create_profile(&app, &token, "client").await;

    let mut body = serde_json::json!({
        "first_name": "Alex",
        "last_name": "Smith",
        "birthday": "2020-01-01",
        "address": "Main street 1",
        "passport_photo_url": "https://cdn.example.com/passport.png",
        "selfie_with_passport_url": "https://cdn.example.com/selfie.png",
    });
    let response =
        post_json_auth(app.clone(), "/api/v1/client/verification", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    body["birthday"] = serde_json::json!("1990-05-17");
    let response =
        post_json_auth(app.clone(), "/api/v1/client/verification", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app, "/api/v1/client/verification", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_verification_without_profile(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "user@example.com").await;

    let body = serde_json::json!({
        "first_name": "Alex",
        "last_name": "Smith",
        "birthday": "1990-05-17",
        "address": "Main street 1",
        "passport_photo_url": "https://cdn.example.com/passport.png",
        "selfie_with_passport_url": "https://cdn.example.com/selfie.png",
    });
    let response = post_json_auth(app, "/api/v1/executor/verification", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Executor profile required");
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_flow(pool: PgPool) {
    create_superuser(&pool, "admin@example.com").await;
    let app = build_test_app(pool.clone());
    let (_executor_user, executor) = user_with_token(&pool, &app, "exec@example.com").await;
    let (_client_user, client) = user_with_token(&pool, &app, "client@example.com").await;
    let executor_id = id_of(&create_profile(&app, &executor, "executor").await);
    create_profile(&app, &client, "client").await;
    let base = format!("/api/v1/executor/{executor_id}/feedback");

    // Executors cannot review executors.
    let response = post_json_auth(
        app.clone(),
        &base,
        serde_json::json!({ "text": "Great", "rate": 5 }),
        &executor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &base,
        serde_json::json!({ "text": "Great", "rate": 6 }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &base,
        serde_json::json!({ "text": "Great work", "rate": 4 }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let feedback_id = id_of(&body_json(response).await);

    let response = get(app.clone(), &format!("/api/v1/executor/profile/{executor_id}")).await;
    let profile = body_json(response).await;
    assert_eq!(profile["rating"], 4.0);

    // Only the author edits, only the reviewed owner answers.
    let response = patch_json_auth(
        app.clone(),
        &format!("{base}/{feedback_id}"),
        serde_json::json!({ "rate": 5 }),
        &executor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/{feedback_id}/answer"),
        serde_json::json!({ "answer": "Thanks!" }),
        &client,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/{feedback_id}/answer"),
        serde_json::json!({ "answer": "Thanks!" }),
        &executor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["answer"], "Thanks!");

    let json = body_json(get(app.clone(), &base).await).await;
    assert_eq!(json["count"], 1);

    let response = delete_auth(app.clone(), &format!("{base}/{feedback_id}"), &client).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let admin = login(&app, "admin@example.com").await;
    let response = delete_auth(app, &format!("{base}/{feedback_id}"), &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// Executor details
// ---------------------------------------------------------------------------

async fn admin_token(pool: &PgPool, app: &axum::Router) -> String {
    create_superuser(pool, "admin@example.com").await;
    login(app, "admin@example.com").await
}

async fn subcategory(app: &axum::Router, admin: &str, name: &str) -> String {
    let category = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/category",
            serde_json::json!({ "name": format!("{name} works") }),
            admin,
        )
        .await,
    )
    .await;
    let sub = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/sub_category",
            serde_json::json!({ "category_id": category["id"], "name": name }),
            admin,
        )
        .await,
    )
    .await;
    id_of(&sub)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_services_filter_executors_by_price(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;
    let plumbing = subcategory(&app, &admin, "Plumbing").await;
    let (_cheap_user, cheap) = user_with_token(&pool, &app, "cheap@example.com").await;
    let (_pricey_user, pricey) = user_with_token(&pool, &app, "pricey@example.com").await;
    let cheap_id = id_of(&create_profile(&app, &cheap, "executor").await);
    create_profile(&app, &pricey, "executor").await;

    for (token, price) in [(&cheap, 20.0), (&pricey, 500.0)] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/executor/service",
            serde_json::json!({
                "subcategory_id": plumbing,
                "photo": "https://cdn.example.com/s.png",
                "description": "Fix leaks",
                "price": price,
                "time_unit": "HOURLY",
            }),
            token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(app.clone(), "/api/v1/executor/profile?price_min=10&price_max=50").await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["id"], cheap_id);

    let response = get(app.clone(), "/api/v1/executor/profile?subcategory=Plumbing").await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);

    let response = get(app, "/api/v1/executor/profile?price_min=50&price_max=10").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_service_requires_executor_profile(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;
    let plumbing = subcategory(&app, &admin, "Plumbing").await;
    let (_user, token) = user_with_token(&pool, &app, "user@example.com").await;

    let response = post_json_auth(
        app,
        "/api/v1/executor/service",
        serde_json::json!({
            "subcategory_id": plumbing,
            "photo": "https://cdn.example.com/s.png",
            "description": "Fix leaks",
            "price": 10.0,
            "time_unit": "HOURLY",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_service_time_unit_is_validated(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let admin = admin_token(&pool, &app).await;
    let plumbing = subcategory(&app, &admin, "Plumbing").await;
    let (_user, token) = user_with_token(&pool, &app, "exec@example.com").await;
    create_profile(&app, &token, "executor").await;

    let response = post_json_auth(
        app,
        "/api/v1/executor/service",
        serde_json::json!({
            "subcategory_id": plumbing,
            "photo": "https://cdn.example.com/s.png",
            "description": "Fix leaks",
            "price": 10.0,
            "time_unit": "FORTNIGHTLY",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_experience_and_files_belong_to_owner(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_owner_user, owner) = user_with_token(&pool, &app, "owner@example.com").await;
    let (_other_user, other) = user_with_token(&pool, &app, "other@example.com").await;
    let executor_id = id_of(&create_profile(&app, &owner, "executor").await);
    create_profile(&app, &other, "executor").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/executor/experience",
        serde_json::json!({
            "name": "Plumber at ACME",
            "description": "Fixed pipes",
            "start_date": "2019-01-01",
            "finish_date": "2021-06-30",
        }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let experience_id = id_of(&body_json(response).await);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/executor/experience_file",
        serde_json::json!({
            "experience_id": experience_id,
            "name": "Diploma",
            "photo": "https://cdn.example.com/d.png",
        }),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/executor/experience_file",
        serde_json::json!({
            "experience_id": experience_id,
            "name": "Diploma",
            "photo": "https://cdn.example.com/d.png",
        }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/executor/experience/{experience_id}"),
        serde_json::json!({ "name": "Stolen" }),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(
        get(app.clone(), &format!("/api/v1/executor/experience?executor={executor_id}")).await,
    )
    .await;
    assert_eq!(json["count"], 1);

    let json = body_json(
        get(app, &format!("/api/v1/executor/experience_file?experience={experience_id}")).await,
    )
    .await;
    assert_eq!(json["results"][0]["name"], "Diploma");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_experience_dates_are_ordered(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "exec@example.com").await;
    create_profile(&app, &token, "executor").await;

    let response = post_json_auth(
        app,
        "/api/v1/executor/experience",
        serde_json::json!({
            "name": "Plumber at ACME",
            "description": "Fixed pipes",
            "start_date": "2022-01-01",
            "finish_date": "2021-06-30",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_single_address_per_executor(pool: PgPool) {
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

    let (_user, token) = user_with_token(&pool, &app, "exec@example.com").await;
    create_profile(&app, &token, "executor").await;
    let body = serde_json::json!({ "city_id": city["id"], "street": "Tverskaya", "home": "1" });

    let response =
        post_json_auth(app.clone(), "/api/v1/executor/address", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app.clone(), "/api/v1/executor/address", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(get(app, "/api/v1/executor/profile?city=Moscow").await).await;
    assert_eq!(json["count"], 1);
}
