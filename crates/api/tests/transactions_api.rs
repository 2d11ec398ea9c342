//! HTTP-level integration tests for subscription plans and invoices, with
//! the CryptoCloud and Stripe acquirers served by mocks.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_app_with_state, build_test_app, create_profile, get, get_auth,
    post_json_auth, test_state, user_with_token,
};
use jobbit_acquiring::cryptocloud::CryptoCloudClient;
use jobbit_acquiring::stripe::StripeClient;
use jobbit_core::subscription::Purpose;
use jobbit_api::payments::Acquirers;
use sqlx::PgPool;

fn subscription(period: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "sub_level": "PRO",
        "acquiring_type_provider": "CRYPTO",
        "period": period,
        "user_role": role,
    })
}

/// An app whose CryptoCloud client talks to `base_url`.
fn app_with_cryptocloud(pool: PgPool, base_url: String) -> axum::Router {
    let mut state = test_state(pool);
    let mut acquirers = Acquirers::default();
    acquirers.register(Arc::new(CryptoCloudClient::with_client(
        state.http.clone(),
        base_url,
        "test-api-key".into(),
        "test-shop".into(),
    )));
    state.acquirers = Arc::new(acquirers);
    build_app_with_state(state)
}

/// An app whose Stripe client talks to `base_url`, with a price for the
/// monthly plan only.
fn app_with_stripe(pool: PgPool, base_url: String) -> axum::Router {
    let mut state = test_state(pool);
    let mut acquirers = Acquirers::default();
    acquirers.register(Arc::new(StripeClient::with_client(
        state.http.clone(),
        base_url,
        "sk_test".into(),
        HashMap::from([(Purpose::M1ProSub, "price_month".to_string())]),
    )));
    state.acquirers = Arc::new(acquirers);
    build_app_with_state(state)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plans_are_listed_per_currency(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/subscription/plans").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["currency"], "USD");
    assert_eq!(json["M1_PRO_SUB"]["price"], 100.0);
    assert_eq!(json["M1_PRO_SUB"]["title"], "1 Month Subscription");
    assert_eq!(json["M3_PRO_SUB"]["period"], "M3");
    assert_eq!(json["D1_PRO_SUB"]["sub_level"], "PRO");

    // Unknown codes fall back to the default currency.
    let json = body_json(get(app.clone(), "/api/v1/subscription/plans?currency=XYZ").await).await;
    assert_eq!(json["currency"], "USD");

    let response = get(app, "/api/v1/subscription/plans?currency=EUR").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["err_detail"],
        "No available subscriptions plans for given currency EUR exist"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_make_rejects_bad_arguments(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_user, token) = user_with_token(&pool, &app, "payer@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscription/make",
        subscription("Y1", "CLIENT"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["err_detail"], "Bad value for `period`");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscription/make",
        subscription("M1", "CLIENT"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["detail"],
        "User has not available profile for this role"
    );

    create_profile(&app, &token, "client").await;
    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscription/make",
        serde_json::json!({
            "sub_level": "STANDARD",
            "acquiring_type_provider": "CRYPTO",
            "period": "M1",
            "user_role": "CLIENT",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["err_detail"], "Bad transaction purpose");

    // No acquirer is configured in the default test state.
    let response = post_json_auth(
        app,
        "/api/v1/subscription/make",
        subscription("M1", "CLIENT"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invoice_is_issued_and_paid(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/v1/invoice/create")
        .match_header("authorization", "Token test-api-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","pay_url":"https://pay.cryptocloud.plus/ABC123","invoice_id":"ABC123"}"#)
        .create_async()
        .await;
    let info = server
        .mock("GET", "/v1/invoice/info")
        .match_query(mockito::Matcher::UrlEncoded("uuid".into(), "INV-ABC123".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","status_invoice":"paid"}"#)
        .expect(2)
        .create_async()
        .await;

    let app = app_with_cryptocloud(pool.clone(), server.url());
    let (_user, token) = user_with_token(&pool, &app, "payer@example.com").await;
    create_profile(&app, &token, "executor").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/subscription/make",
        subscription("M1", "EXECUTOR"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let tx = &json["data"];
    assert_eq!(tx["status"], "CREATED");
    assert_eq!(tx["pay_url"], "https://pay.cryptocloud.plus/ABC123");
    assert_eq!(tx["purpose"], "M1_PRO_SUB");
    assert_eq!(tx["amount"], 100.0);
    assert_eq!(tx["payment_type"], "SINGULAR");
    assert_eq!(tx["type"], "DEPOSIT");
    let id = tx["id"].as_str().unwrap().to_string();
    create.assert_async().await;

    let response = get_auth(app.clone(), "/api/v1/user/transactions?role=EXECUTOR", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["amount"], "100.00");
    assert_eq!(json["results"][0]["purpose"], "1 Month Subscription");

    let uri = format!("/api/v1/user/transactions/{id}/refresh");
    let response = post_json_auth(app.clone(), &uri, serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "PAID");

    // Refreshing an already paid invoice does not notify twice.
    let response = post_json_auth(app.clone(), &uri, serde_json::json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    info.assert_async().await;

    let json = body_json(get_auth(app, "/api/v1/notification", &token).await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["title"], "Payment received");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_invoice_cancels_unpaid_ones(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/invoice/create")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","pay_url":"https://pay.example.com/x","invoice_id":"X1"}"#)
        .expect(2)
        .create_async()
        .await;

    let app = app_with_cryptocloud(pool.clone(), server.url());
    let (user, token) = user_with_token(&pool, &app, "payer@example.com").await;
    create_profile(&app, &token, "client").await;

    for period in ["W1", "M3"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/subscription/make",
            subscription(period, "CLIENT"),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let statuses: Vec<(String, String)> = sqlx::query_as(
        "SELECT purpose, status FROM transactions WHERE user_id = $1 ORDER BY created_at",
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        statuses,
        vec![
            ("W1_PRO_SUB".to_string(), "CANCELED".to_string()),
            ("M3_PRO_SUB".to_string(), "CREATED".to_string()),
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_acquirer_failure_is_a_bad_gateway(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/invoice/create")
        .with_status(500)
        .create_async()
        .await;

    let app = app_with_cryptocloud(pool.clone(), server.url());
    let (_user, token) = user_with_token(&pool, &app, "payer@example.com").await;
    create_profile(&app, &token, "client").await;

    let response = post_json_auth(
        app,
        "/api/v1/subscription/make",
        subscription("M1", "CLIENT"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transactions_belong_to_their_owner(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/invoice/create")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"success","pay_url":"https://pay.example.com/y","invoice_id":"Y1"}"#)
        .create_async()
        .await;

    let app = app_with_cryptocloud(pool.clone(), server.url());
    let (_owner, owner) = user_with_token(&pool, &app, "owner@example.com").await;
    let (_other, other) = user_with_token(&pool, &app, "other@example.com").await;
    create_profile(&app, &owner, "client").await;
    create_profile(&app, &other, "client").await;

    let json = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/subscription/make",
            subscription("D1", "CLIENT"),
            &owner,
        )
        .await,
    )
    .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/user/transactions/{id}/refresh"),
        serde_json::json!({}),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(get_auth(app.clone(), "/api/v1/user/transactions?role=CLIENT", &other).await).await;
    assert_eq!(json["count"], 0);

    let response = get_auth(app, "/api/v1/user/transactions", &owner).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partially_paid_invoice_is_handed_back(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/v1/invoice/create")
        .expect(0)
        .create_async()
        .await;

    let app = app_with_cryptocloud(pool.clone(), server.url());
    let (user, token) = user_with_token(&pool, &app, "payer@example.com").await;
    create_profile(&app, &token, "client").await;
    let partial: uuid::Uuid = sqlx::query_scalar(
        "INSERT INTO transactions
             (status, pay_url, invoice_id, currency, payment_type, purpose, amount,
              provider, tx_type, user_id, user_role)
         VALUES ('PARTIAL', 'https://pay.example.com/p', 'INV-PART1', 'USD', 'SINGULAR',
                 'M1_PRO_SUB', 100.0, 'CRYPTO', 'DEPOSIT', $1, 'CLIENT')
         RETURNING id",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();

    let response = post_json_auth(
        app,
        "/api/v1/subscription/make",
        subscription("M3", "CLIENT"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], partial.to_string());
    assert_eq!(json["data"]["status"], "PARTIAL");
    assert_eq!(json["data"]["invoice_id"], "INV-PART1");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
    create.assert_async().await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stripe_invoice_is_a_payment_link(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/v1/payment_links")
        .match_header("authorization", "Bearer sk_test")
        .match_body(mockito::Matcher::UrlEncoded(
            "line_items[0][price]".into(),
            "price_month".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"plink_9","url":"https://buy.stripe.com/test_9","active":true}"#)
        .create_async()
        .await;
    let status = server
        .mock("GET", "/v1/payment_links/plink_9")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"plink_9","url":"https://buy.stripe.com/test_9","active":false}"#)
        .create_async()
        .await;

    let app = app_with_stripe(pool.clone(), server.url());
    let (_user, token) = user_with_token(&pool, &app, "payer@example.com").await;
    create_profile(&app, &token, "executor").await;

    let mut body = subscription("M1", "EXECUTOR");
    body["acquiring_type_provider"] = "STRIPE".into();
    let response = post_json_auth(app.clone(), "/api/v1/subscription/make", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["invoice_id"], "plink_9");
    assert_eq!(json["data"]["pay_url"], "https://buy.stripe.com/test_9");
    assert_eq!(json["data"]["payment_type"], "RECURRENT");
    create.assert_async().await;

    // A deactivated link means the customer paid.
    let id = json["data"]["id"].as_str().unwrap().to_string();
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/user/transactions/{id}/refresh"),
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "PAID");
    status.assert_async().await;

    // No price is configured for the weekly plan.
    let mut body = subscription("W1", "EXECUTOR");
    body["acquiring_type_provider"] = "STRIPE".into();
    let response = post_json_auth(app, "/api/v1/subscription/make", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
