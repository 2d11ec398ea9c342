//! One-shot bootstrap: apply migrations and make sure the superuser exists.
//!
//! Reads `DATABASE_URL`, `ADMIN_EMAIL` and `ADMIN_PASSWORD`. Running it again
//! resets the superuser password and re-grants admin flags.

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobbit_api::auth::password::hash_password;
use jobbit_core::validation::validate_email;
use jobbit_db::repositories::UserRepo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prepare=info,jobbit_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let email = std::env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?;
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;
    let email = email.trim().to_lowercase();
    validate_email(&email).context("ADMIN_EMAIL is not a valid email")?;
    if password.is_empty() {
        bail!("ADMIN_PASSWORD must not be empty");
    }

    let pool = jobbit_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    jobbit_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    let user = UserRepo::upsert_superuser(&pool, &email, &hash)
        .await
        .context("Failed to create superuser")?;
    tracing::info!(user_id = %user.id, email = ?user.email, "Superuser ready");

    pool.close().await;
    Ok(())
}
