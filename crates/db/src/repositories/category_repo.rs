//! Repositories for the `categories` and `subcategories` tables.

use sqlx::PgPool;
use jobbit_core::types::DbId;

use crate::models::category::{
    Category, CreateCategory, CreateSubcategory, Subcategory, UpdateCategory, UpdateSubcategory,
};

const CATEGORY_COLUMNS: &str = "id, name, description, is_visible";
const SUBCATEGORY_COLUMNS: &str = "id, category_id, name, description, is_visible";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description, is_visible)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, true))
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_visible)
            .fetch_one(pool)
            .await
    }

    /// Find a visible category by id.
    pub async fn find_visible(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND is_visible = true");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Visible categories ordered by name.
    pub async fn list_visible(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE is_visible = true
             ORDER BY name, id
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_visible(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE is_visible = true")
            .fetch_one(pool)
            .await
    }

    /// Update a category. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_visible = COALESCE($4, is_visible)
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_visible)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for subcategories.
pub struct SubcategoryRepo;

impl SubcategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubcategory,
    ) -> Result<Subcategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO subcategories (category_id, name, description, is_visible)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, true))
             RETURNING {SUBCATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_visible)
            .fetch_one(pool)
            .await
    }

    pub async fn find_visible(pool: &PgPool, id: DbId) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM subcategories WHERE id = $1 AND is_visible = true"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_visible(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Subcategory>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM subcategories
             WHERE is_visible = true
             ORDER BY name, id
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_visible(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subcategories WHERE is_visible = true")
            .fetch_one(pool)
            .await
    }

    /// Visible subcategories belonging to any of the given categories.
    pub async fn list_visible_for_categories(
        pool: &PgPool,
        category_ids: &[DbId],
    ) -> Result<Vec<Subcategory>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM subcategories
             WHERE category_id = ANY($1) AND is_visible = true
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(category_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubcategory,
    ) -> Result<Option<Subcategory>, sqlx::Error> {
        let query = format!(
            "UPDATE subcategories SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                is_visible = COALESCE($5, is_visible)
             WHERE id = $1
             RETURNING {SUBCATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Subcategory>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.is_visible)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
