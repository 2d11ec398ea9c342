//! Repositories for the executor detail tables.
//!
//! Listings are public and may be narrowed to one executor; writes are
//! issued by handlers after the owner check.

use sqlx::PgPool;
use jobbit_core::types::DbId;

use crate::models::executor::{
    Address, CreateAddress, CreateExperience, CreateExperienceFile, CreateGeo, CreatePortfolio,
    CreateService, Experience, ExperienceFile, Geo, Portfolio, Service, UpdateAddress,
    UpdateExperience, UpdateExperienceFile, UpdateGeo, UpdatePortfolio, UpdateService,
};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const EXPERIENCE_COLUMNS: &str =
    "id, executor_id, name, description, start_date, finish_date, is_visible, is_approved";

const EXPERIENCE_FILE_COLUMNS: &str = "id, experience_id, name, photo";

const SERVICE_COLUMNS: &str = "id, executor_id, subcategory_id, photo, description, price, \
                               time_unit, has_departure, departure_cost";

const ADDRESS_COLUMNS: &str =
    "id, executor_id, city_id, street, home, office, room, postal_index";

/// Portfolio columns with the attached subcategories gathered into an array.
const PORTFOLIO_SELECT: &str = "SELECT p.id, p.executor_id, p.description, p.photo,
        ARRAY(SELECT pc.subcategory_id FROM executor_portfolio_categories pc
              WHERE pc.portfolio_id = p.id) AS subcategory_ids
    FROM executor_portfolios p";

/// Geo columns with the attached subway stations gathered into an array.
const GEO_SELECT: &str = "SELECT g.id, g.executor_id, g.remote_work_ability,
        ARRAY(SELECT gs.subway_id FROM executor_geo_subways gs
              WHERE gs.geo_id = g.id) AS subway_ids
    FROM executor_geos g";

// ---------------------------------------------------------------------------
// ExperienceRepo
// ---------------------------------------------------------------------------

pub struct ExperienceRepo;

impl ExperienceRepo {
    pub async fn create(
        pool: &PgPool,
        executor_id: DbId,
        input: &CreateExperience,
    ) -> Result<Experience, sqlx::Error> {
        let query = format!(
            "INSERT INTO executor_experiences
                (executor_id, name, description, start_date, finish_date, is_visible)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true))
             RETURNING {EXPERIENCE_COLUMNS}"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(executor_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.finish_date)
            .bind(input.is_visible)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!("SELECT {EXPERIENCE_COLUMNS} FROM executor_experiences WHERE id = $1");
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        executor_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Experience>, sqlx::Error> {
        let query = format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM executor_experiences
             WHERE ($1::uuid IS NULL OR executor_id = $1)
             ORDER BY start_date DESC, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(executor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, executor_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_experiences WHERE ($1::uuid IS NULL OR executor_id = $1)",
        )
        .bind(executor_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExperience,
    ) -> Result<Option<Experience>, sqlx::Error> {
        let query = format!(
            "UPDATE executor_experiences SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                finish_date = COALESCE($5, finish_date),
                is_visible = COALESCE($6, is_visible)
             WHERE id = $1
             RETURNING {EXPERIENCE_COLUMNS}"
        );
        sqlx::query_as::<_, Experience>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.finish_date)
            .bind(input.is_visible)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_experiences WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// ExperienceFileRepo
// ---------------------------------------------------------------------------

pub struct ExperienceFileRepo;

impl ExperienceFileRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateExperienceFile,
    ) -> Result<ExperienceFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO executor_experience_files (experience_id, name, photo)
             VALUES ($1, $2, $3)
             RETURNING {EXPERIENCE_FILE_COLUMNS}"
        );
        sqlx::query_as::<_, ExperienceFile>(&query)
            .bind(input.experience_id)
            .bind(&input.name)
            .bind(&input.photo)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ExperienceFile>, sqlx::Error> {
        let query =
            format!("SELECT {EXPERIENCE_FILE_COLUMNS} FROM executor_experience_files WHERE id = $1");
        sqlx::query_as::<_, ExperienceFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The executor that owns the experience a file is attached to.
    pub async fn owner_executor_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT e.executor_id FROM executor_experience_files f
             JOIN executor_experiences e ON e.id = f.experience_id
             WHERE f.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        experience_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ExperienceFile>, sqlx::Error> {
        let query = format!(
            "SELECT {EXPERIENCE_FILE_COLUMNS} FROM executor_experience_files
             WHERE ($1::uuid IS NULL OR experience_id = $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ExperienceFile>(&query)
            .bind(experience_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, experience_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_experience_files
             WHERE ($1::uuid IS NULL OR experience_id = $1)",
        )
        .bind(experience_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateExperienceFile,
    ) -> Result<Option<ExperienceFile>, sqlx::Error> {
        let query = format!(
            "UPDATE executor_experience_files SET
                name = COALESCE($2, name),
                photo = COALESCE($3, photo)
             WHERE id = $1
             RETURNING {EXPERIENCE_FILE_COLUMNS}"
        );
        sqlx::query_as::<_, ExperienceFile>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.photo)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_experience_files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// ServiceRepo
// ---------------------------------------------------------------------------

pub struct ServiceRepo;

impl ServiceRepo {
    pub async fn create(
        pool: &PgPool,
        executor_id: DbId,
        input: &CreateService,
    ) -> Result<Service, sqlx::Error> {
        let query = format!(
            "INSERT INTO executor_services
                (executor_id, subcategory_id, photo, description, price, time_unit,
                 has_departure, departure_cost)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false), COALESCE($8, 0))
             RETURNING {SERVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(executor_id)
            .bind(input.subcategory_id)
            .bind(&input.photo)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.time_unit)
            .bind(input.has_departure)
            .bind(input.departure_cost)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {SERVICE_COLUMNS} FROM executor_services WHERE id = $1");
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        executor_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Service>, sqlx::Error> {
        let query = format!(
            "SELECT {SERVICE_COLUMNS} FROM executor_services
             WHERE ($1::uuid IS NULL OR executor_id = $1)
             ORDER BY price, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(executor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, executor_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_services WHERE ($1::uuid IS NULL OR executor_id = $1)",
        )
        .bind(executor_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateService,
    ) -> Result<Option<Service>, sqlx::Error> {
        let query = format!(
            "UPDATE executor_services SET
                subcategory_id = COALESCE($2, subcategory_id),
                photo = COALESCE($3, photo),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                time_unit = COALESCE($6, time_unit),
                has_departure = COALESCE($7, has_departure),
                departure_cost = COALESCE($8, departure_cost)
             WHERE id = $1
             RETURNING {SERVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Service>(&query)
            .bind(id)
            .bind(input.subcategory_id)
            .bind(&input.photo)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.time_unit)
            .bind(input.has_departure)
            .bind(input.departure_cost)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_services WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// PortfolioRepo
// ---------------------------------------------------------------------------

pub struct PortfolioRepo;

impl PortfolioRepo {
    /// Insert a portfolio entry together with its subcategory links.
    pub async fn create(
        pool: &PgPool,
        executor_id: DbId,
        input: &CreatePortfolio,
    ) -> Result<Portfolio, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO executor_portfolios (executor_id, description, photo)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(executor_id)
        .bind(&input.description)
        .bind(&input.photo)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO executor_portfolio_categories (portfolio_id, subcategory_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&input.subcategory_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!("{PORTFOLIO_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        executor_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Portfolio>, sqlx::Error> {
        let query = format!(
            "{PORTFOLIO_SELECT}
             WHERE ($1::uuid IS NULL OR p.executor_id = $1)
             ORDER BY p.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(executor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, executor_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_portfolios WHERE ($1::uuid IS NULL OR executor_id = $1)",
        )
        .bind(executor_id)
        .fetch_one(pool)
        .await
    }

    /// Update a portfolio entry; a present `subcategory_ids` replaces the links.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePortfolio,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "UPDATE executor_portfolios SET
                description = COALESCE($2, description),
                photo = COALESCE($3, photo)
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.description)
        .bind(&input.photo)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(ref subcategory_ids) = input.subcategory_ids {
            sqlx::query("DELETE FROM executor_portfolio_categories WHERE portfolio_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO executor_portfolio_categories (portfolio_id, subcategory_id)
                 SELECT $1, UNNEST($2::uuid[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(subcategory_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_portfolios WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// AddressRepo
// ---------------------------------------------------------------------------

pub struct AddressRepo;

impl AddressRepo {
    /// Insert the executor's address. One per executor (`uq_executor_addresses_executor_id`).
    pub async fn create(
        pool: &PgPool,
        executor_id: DbId,
        input: &CreateAddress,
    ) -> Result<Address, sqlx::Error> {
        let query = format!(
            "INSERT INTO executor_addresses
                (executor_id, city_id, street, home, office, room, postal_index)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), COALESCE($6, ''), COALESCE($7, ''))
             RETURNING {ADDRESS_COLUMNS}"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(executor_id)
            .bind(input.city_id)
            .bind(&input.street)
            .bind(&input.home)
            .bind(&input.office)
            .bind(&input.room)
            .bind(&input.postal_index)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Address>, sqlx::Error> {
        let query = format!("SELECT {ADDRESS_COLUMNS} FROM executor_addresses WHERE id = $1");
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        executor_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Address>, sqlx::Error> {
        let query = format!(
            "SELECT {ADDRESS_COLUMNS} FROM executor_addresses
             WHERE ($1::uuid IS NULL OR executor_id = $1)
             ORDER BY id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(executor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, executor_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_addresses WHERE ($1::uuid IS NULL OR executor_id = $1)",
        )
        .bind(executor_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAddress,
    ) -> Result<Option<Address>, sqlx::Error> {
        let query = format!(
            "UPDATE executor_addresses SET
                city_id = COALESCE($2, city_id),
                street = COALESCE($3, street),
                home = COALESCE($4, home),
                office = COALESCE($5, office),
                room = COALESCE($6, room),
                postal_index = COALESCE($7, postal_index)
             WHERE id = $1
             RETURNING {ADDRESS_COLUMNS}"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .bind(input.city_id)
            .bind(&input.street)
            .bind(&input.home)
            .bind(&input.office)
            .bind(&input.room)
            .bind(&input.postal_index)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_addresses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// WorkAreaRepo
// ---------------------------------------------------------------------------

/// Operations over `executor_geos` and its subway links.
pub struct WorkAreaRepo;

impl WorkAreaRepo {
    /// Insert the executor's geo record. One per executor (`uq_executor_geos_executor_id`).
    pub async fn create(
        pool: &PgPool,
        executor_id: DbId,
        input: &CreateGeo,
    ) -> Result<Geo, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO executor_geos (executor_id, remote_work_ability)
             VALUES ($1, COALESCE($2, true))
             RETURNING id",
        )
        .bind(executor_id)
        .bind(input.remote_work_ability)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(
            "INSERT INTO executor_geo_subways (geo_id, subway_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&input.subway_ids)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Geo>, sqlx::Error> {
        let query = format!("{GEO_SELECT} WHERE g.id = $1");
        sqlx::query_as::<_, Geo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        executor_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Geo>, sqlx::Error> {
        let query = format!(
            "{GEO_SELECT}
             WHERE ($1::uuid IS NULL OR g.executor_id = $1)
             ORDER BY g.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Geo>(&query)
            .bind(executor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, executor_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM executor_geos WHERE ($1::uuid IS NULL OR executor_id = $1)",
        )
        .bind(executor_id)
        .fetch_one(pool)
        .await
    }

    /// Update a geo record; a present `subway_ids` replaces the links.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateGeo,
    ) -> Result<Option<Geo>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query(
            "UPDATE executor_geos SET remote_work_ability = COALESCE($2, remote_work_ability)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.remote_work_ability)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(ref subway_ids) = input.subway_ids {
            sqlx::query("DELETE FROM executor_geo_subways WHERE geo_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO executor_geo_subways (geo_id, subway_id)
                 SELECT $1, UNNEST($2::uuid[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(subway_ids)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM executor_geos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
