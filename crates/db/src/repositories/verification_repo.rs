//! Repository for `client_verifications` and `executor_verifications`.

use sqlx::PgPool;
use jobbit_core::enums::ProfileRole;
use jobbit_core::types::DbId;

use crate::models::verification::{CreateVerification, Verification};
use crate::repositories::profile_repo::tables;

/// Select list aliasing the profile foreign key to `profile_id`.
fn columns(role: ProfileRole) -> String {
    format!(
        "id, {} AS profile_id, first_name, middle_name, last_name, birthday, address, \
         passport_photo_url, selfie_with_passport_url, created_at",
        tables(role).verification_fk
    )
}

pub struct VerificationRepo;

impl VerificationRepo {
    /// Insert a verification request for `profile_id`.
    ///
    /// A second request for the same profile fails on the unique constraint.
    pub async fn create(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
        input: &CreateVerification,
    ) -> Result<Verification, sqlx::Error> {
        let t = tables(role);
        let query = format!(
            "INSERT INTO {} ({}, first_name, middle_name, last_name, birthday, address,
                             passport_photo_url, selfie_with_passport_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            t.verifications,
            t.verification_fk,
            columns(role)
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(profile_id)
            .bind(&input.first_name)
            .bind(&input.middle_name)
            .bind(&input.last_name)
            .bind(input.birthday)
            .bind(&input.address)
            .bind(&input.passport_photo_url)
            .bind(&input.selfie_with_passport_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_profile(
        pool: &PgPool,
        role: ProfileRole,
        profile_id: DbId,
    ) -> Result<Option<Verification>, sqlx::Error> {
        let t = tables(role);
        let query = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            columns(role),
            t.verifications,
            t.verification_fk
        );
        sqlx::query_as::<_, Verification>(&query)
            .bind(profile_id)
            .fetch_optional(pool)
            .await
    }
}
