//! Repository for the geographic hierarchy tables.
//!
//! Every level supports the same operations: find by id, a paginated list
//! optionally narrowed to one parent, insert and delete.

use sqlx::PgPool;
use jobbit_core::types::DbId;

use crate::models::geo::{
    City, Country, CreateCity, CreateCountry, CreateRegion, CreateSubway, CreateSubwayBranch,
    Region, Subway, SubwayBranch,
};

const COUNTRY_COLUMNS: &str = "id, name";
const REGION_COLUMNS: &str = "id, country_id, name";
const CITY_COLUMNS: &str = "id, region_id, name, longitude, latitude";
const SUBWAY_BRANCH_COLUMNS: &str = "id, city_id, name, color";
const SUBWAY_COLUMNS: &str = "id, city_id, branch_id, name, longitude, latitude";

/// Read and admin operations over countries, regions, cities and subways.
pub struct GeoRepo;

impl GeoRepo {
    // -- country --

    pub async fn create_country(pool: &PgPool, input: &CreateCountry) -> Result<Country, sqlx::Error> {
        let query = format!(
            "INSERT INTO countries (name) VALUES ($1) RETURNING {COUNTRY_COLUMNS}"
        );
        sqlx::query_as::<_, Country>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_country(pool: &PgPool, id: DbId) -> Result<Option<Country>, sqlx::Error> {
        let query = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = $1");
        sqlx::query_as::<_, Country>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_countries(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Country>, sqlx::Error> {
        let query = format!("SELECT {COUNTRY_COLUMNS} FROM countries ORDER BY name, id LIMIT $1 OFFSET $2");
        sqlx::query_as::<_, Country>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_countries(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries")
            .fetch_one(pool)
            .await
    }

    pub async fn delete_country(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM countries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- region --

    pub async fn create_region(pool: &PgPool, input: &CreateRegion) -> Result<Region, sqlx::Error> {
        let query = format!(
            "INSERT INTO regions (country_id, name) VALUES ($1, $2) RETURNING {REGION_COLUMNS}"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(input.country_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_region(pool: &PgPool, id: DbId) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {REGION_COLUMNS} FROM regions WHERE id = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_regions(
        pool: &PgPool,
        country_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!(
            "SELECT {REGION_COLUMNS} FROM regions
             WHERE ($1::uuid IS NULL OR country_id = $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(country_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_regions(pool: &PgPool, country_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM regions WHERE ($1::uuid IS NULL OR country_id = $1)",
        )
        .bind(country_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_region(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- city --

    pub async fn create_city(pool: &PgPool, input: &CreateCity) -> Result<City, sqlx::Error> {
        let query = format!(
            "INSERT INTO cities (region_id, name, longitude, latitude) VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, 0)) RETURNING {CITY_COLUMNS}"
        );
        sqlx::query_as::<_, City>(&query)
            .bind(input.region_id)
            .bind(&input.name)
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_one(pool)
            .await
    }

    pub async fn find_city(pool: &PgPool, id: DbId) -> Result<Option<City>, sqlx::Error> {
        let query = format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = $1");
        sqlx::query_as::<_, City>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_cities(
        pool: &PgPool,
        region_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<City>, sqlx::Error> {
        let query = format!(
            "SELECT {CITY_COLUMNS} FROM cities
             WHERE ($1::uuid IS NULL OR region_id = $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, City>(&query)
            .bind(region_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_cities(pool: &PgPool, region_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cities WHERE ($1::uuid IS NULL OR region_id = $1)",
        )
        .bind(region_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_city(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- subway branch --

    pub async fn create_subway_branch(pool: &PgPool, input: &CreateSubwayBranch) -> Result<SubwayBranch, sqlx::Error> {
        let query = format!(
            "INSERT INTO subway_branches (city_id, name, color) VALUES ($1, $2, $3) RETURNING {SUBWAY_BRANCH_COLUMNS}"
        );
        sqlx::query_as::<_, SubwayBranch>(&query)
            .bind(input.city_id)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    pub async fn find_subway_branch(pool: &PgPool, id: DbId) -> Result<Option<SubwayBranch>, sqlx::Error> {
        let query = format!("SELECT {SUBWAY_BRANCH_COLUMNS} FROM subway_branches WHERE id = $1");
        sqlx::query_as::<_, SubwayBranch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_subway_branches(
        pool: &PgPool,
        city_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubwayBranch>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBWAY_BRANCH_COLUMNS} FROM subway_branches
             WHERE ($1::uuid IS NULL OR city_id = $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SubwayBranch>(&query)
            .bind(city_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_subway_branches(pool: &PgPool, city_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subway_branches WHERE ($1::uuid IS NULL OR city_id = $1)",
        )
        .bind(city_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_subway_branch(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subway_branches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -- subway --

    pub async fn create_subway(pool: &PgPool, input: &CreateSubway) -> Result<Subway, sqlx::Error> {
        let query = format!(
            "INSERT INTO subways (city_id, branch_id, name, longitude, latitude) VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0)) RETURNING {SUBWAY_COLUMNS}"
        );
        sqlx::query_as::<_, Subway>(&query)
            .bind(input.city_id)
            .bind(input.branch_id)
            .bind(&input.name)
            .bind(input.longitude)
            .bind(input.latitude)
            .fetch_one(pool)
            .await
    }

    pub async fn find_subway(pool: &PgPool, id: DbId) -> Result<Option<Subway>, sqlx::Error> {
        let query = format!("SELECT {SUBWAY_COLUMNS} FROM subways WHERE id = $1");
        sqlx::query_as::<_, Subway>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_subways(
        pool: &PgPool,
        branch_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subway>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBWAY_COLUMNS} FROM subways
             WHERE ($1::uuid IS NULL OR branch_id = $1)
             ORDER BY name, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Subway>(&query)
            .bind(branch_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_subways(pool: &PgPool, branch_id: Option<DbId>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subways WHERE ($1::uuid IS NULL OR branch_id = $1)",
        )
        .bind(branch_id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_subway(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subways WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
