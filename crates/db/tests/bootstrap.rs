use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify seed data.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    jobbit_db::health_check(&pool).await.unwrap();

    let currencies: Vec<(String,)> = sqlx::query_as("SELECT currency FROM subscription_plans")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(currencies, vec![("USD".to_string(),)]);
}

/// Entity keys are UUIDs generated by the database.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_uuid(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "uuid", "Table {table}.id should be uuid, got {data_type}");
    }
}

/// Status-like columns reject values outside their enumeration.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_checks_are_enforced(pool: PgPool) {
    let result = sqlx::query(
        "INSERT INTO transactions (status, invoice_id, currency, payment_type, purpose,
                                   amount, provider, user_role)
         VALUES ('LOST', 'INV-1', 'USD', 'SINGULAR', 'M1_PRO_SUB', 1, 'CRYPTO', 'CLIENT')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err(), "unknown transaction status must be rejected");
}
