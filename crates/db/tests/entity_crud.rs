use jobbit_core::enums::ProfileRole;
use jobbit_db::models::order::{CreateOrder, OrderSpecific};
use jobbit_db::models::profile::CreateProfile;
use jobbit_db::models::user::{CreateUser, User};
use jobbit_db::repositories::{OrderRepo, OtpRepo, ProfileRepo, UserRepo};
use sqlx::PgPool;

async fn user(pool: &PgPool, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: Some(email.to_string()),
            phone_number: None,
            password_hash: "not-a-real-hash".to_string(),
            is_active: true,
            type_2fa: "EMAIL".to_string(),
        },
    )
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_user_emails_are_unique(pool: PgPool) {
    user(&pool, "taken@example.com").await;
    let err = UserRepo::create(
        &pool,
        &CreateUser {
            email: Some("taken@example.com".to_string()),
            phone_number: None,
            password_hash: "x".to_string(),
            is_active: false,
            type_2fa: "EMAIL".to_string(),
        },
    )
    .await
    .unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|e| e.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_superuser_upsert_promotes_existing_account(pool: PgPool) {
    let existing = user(&pool, "boss@example.com").await;
    assert!(!existing.is_superuser);

    let promoted = UserRepo::upsert_superuser(&pool, "boss@example.com", "new-hash")
        .await
        .unwrap();
    assert_eq!(promoted.id, existing.id);
    assert!(promoted.is_superuser);
    assert!(promoted.is_staff_member);

    let fresh = UserRepo::upsert_superuser(&pool, "root@example.com", "hash")
        .await
        .unwrap();
    assert!(fresh.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_balance_is_never_overdrawn(pool: PgPool) {
    let owner = user(&pool, "exec@example.com").await;
    let executor = ProfileRepo::create(
        &pool,
        ProfileRole::Executor,
        owner.id,
        &CreateProfile {
            username: Some("exec".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(executor.balance, Some(0.0));

    sqlx::query("UPDATE executor_profiles SET balance = 10 WHERE id = $1")
        .bind(executor.id)
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(ProfileRepo::deduct_balance(&mut tx, executor.id, 6.0).await.unwrap());
    assert!(!ProfileRepo::deduct_balance(&mut tx, executor.id, 6.0).await.unwrap());
    tx.commit().await.unwrap();

    let reloaded = ProfileRepo::find_by_id(&pool, ProfileRole::Executor, executor.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.balance, Some(4.0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_order_defaults_and_status_filter(pool: PgPool) {
    let owner = user(&pool, "client@example.com").await;
    let client = ProfileRepo::create(&pool, ProfileRole::Client, owner.id, &CreateProfile::default())
        .await
        .unwrap();
    assert_eq!(client.balance, None);

    let order = OrderRepo::create(
        &pool,
        client.id,
        &CreateOrder {
            title: "Paint the fence".to_string(),
            description: "Forty meters".to_string(),
            longitude: None,
            latitude: None,
            budget: None,
            response_cost: None,
            start_date: None,
            end_date: None,
            comment: None,
            specifics: vec![OrderSpecific {
                title: "Color".to_string(),
                text: "Green".to_string(),
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(order.status, "ON_MODERATION");
    assert_eq!(order.response_cost, 0.0);
    assert_eq!(order.comment, "");
    assert_eq!(order.specifics.0.len(), 1);

    assert_eq!(OrderRepo::count(&pool, Some("ON_MODERATION")).await.unwrap(), 1);
    assert_eq!(OrderRepo::count(&pool, Some("ACTIVE")).await.unwrap(), 0);
    assert_eq!(OrderRepo::count(&pool, None).await.unwrap(), 1);

    // Removing the client removes their orders.
    assert!(ProfileRepo::delete(&pool, ProfileRole::Client, client.id).await.unwrap());
    assert!(OrderRepo::find_by_id(&pool, order.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_otp_challenges_are_swept(pool: PgPool) {
    let now = chrono::Utc::now();
    OtpRepo::create(&pool, "stale", "123456", now - chrono::Duration::minutes(1))
        .await
        .unwrap();
    OtpRepo::create(&pool, "live", "654321", now + chrono::Duration::minutes(5))
        .await
        .unwrap();

    assert_eq!(OtpRepo::cleanup_expired(&pool).await.unwrap(), 1);
    let left: Vec<String> = sqlx::query_scalar("SELECT token_hash FROM otp_challenges")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(left, vec!["live".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_otp_challenge_locks_after_failed_attempts(pool: PgPool) {
    let expires = chrono::Utc::now() + chrono::Duration::minutes(5);
    OtpRepo::create(&pool, "hash", "123456", expires).await.unwrap();

    assert!(!OtpRepo::consume(&pool, "hash", "000000", 2).await.unwrap());
    assert!(!OtpRepo::consume(&pool, "hash", "111111", 2).await.unwrap());
    assert!(!OtpRepo::consume(&pool, "hash", "123456", 2).await.unwrap());

    OtpRepo::create(&pool, "other", "123456", expires).await.unwrap();
    assert!(!OtpRepo::consume(&pool, "other", "000000", 2).await.unwrap());
    assert!(OtpRepo::consume(&pool, "other", "123456", 2).await.unwrap());
    assert!(!OtpRepo::consume(&pool, "other", "123456", 2).await.unwrap());
}
