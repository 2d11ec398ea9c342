//! Repository for `client_profiles` and `executor_profiles`.
//!
//! The two tables share a layout, so every operation takes the
//! [`ProfileRole`] that selects the table.

use sqlx::{PgPool, Postgres, Transaction};
use jobbit_core::enums::ProfileRole;
use jobbit_core::types::DbId;

use crate::models::profile::{split_names, CreateProfile, ExecutorFilter, Profile, UpdateProfile};

/// Table names backing one profile kind.
pub(crate) struct ProfileTables {
    pub profiles: &'static str,
    pub feedbacks: &'static str,
    pub verifications: &'static str,
    pub verification_fk: &'static str,
}

pub(crate) fn tables(role: ProfileRole) -> ProfileTables {
    match role {
        ProfileRole::Client => ProfileTables {
            profiles: "client_profiles",
            feedbacks: "client_feedbacks",
            verifications: "client_verifications",
            verification_fk: "client_id",
        },
        ProfileRole::Executor => ProfileTables {
            profiles: "executor_profiles",
            feedbacks: "executor_feedbacks",
            verifications: "executor_verifications",
            verification_fk: "executor_id",
        },
    }
}

/// Base columns present in both profile tables.
const BASE_COLUMNS: &str = "id, user_id, email, username, name, last_name, phone_number, bio, \
                            birthdate, is_active, is_verified, gender, avatar, created_date";

/// `SELECT` over one profile table with `balance` and the derived `rating`.
///
/// Wrapped as a subquery aliased `p` so filters can reference `p.rating`.
fn select_profiles(role: ProfileRole) -> String {
    let t = tables(role);
    let balance = match role {
        ProfileRole::Client => "NULL::float8",
        ProfileRole::Executor => "pr.balance",
    };
    format!(
        "SELECT * FROM (
            SELECT pr.id, pr.user_id, pr.email, pr.username, pr.name, pr.last_name,
                   pr.phone_number, pr.bio, pr.birthdate, pr.is_active, pr.is_verified,
                   pr.gender, pr.avatar, {balance} AS balance, pr.created_date,
                   (SELECT ROUND(AVG(f.rate)::numeric, 1)::float8
                      FROM {fb} f WHERE f.profile_id = pr.id) AS rating
            FROM {profiles} pr
         ) p",
        fb = t.feedbacks,
        profiles = t.profiles,
    )
}

/// Provides CRUD operations for both profile kinds.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a profile for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        role: ProfileRole,
        user_id: DbId,
        input: &CreateProfile,
    ) -> Result<Profile, sqlx::Error> {
        let t = tables(role);
        let query = format!(
            "INSERT INTO {} (user_id, email, username, name, last_name, phone_number, bio,
                             birthdate, gender, avatar)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
            t.profiles
        );
        let id: DbId = sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.name)
            .bind(&input.last_name)
            .bind(&input.phone_number)
            .bind(&input.bio)
            .bind(input.birthdate)
            .bind(&input.gender)
            .bind(&input.avatar)
            .fetch_one(pool)
            .await?;
        Self::find_by_id(pool, role, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        role: ProfileRole,
        id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("{} WHERE p.id = $1", select_profiles(role));
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The profile of the given kind owned by `user_id`, if any.
    pub async fn find_by_user(
        pool: &PgPool,
        role: ProfileRole,
        user_id: DbId,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("{} WHERE p.user_id = $1", select_profiles(role));
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_for_user(
        pool: &PgPool,
        role: ProfileRole,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1)",
            tables(role).profiles
        );
        sqlx::query_scalar::<_, bool>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// List client profiles, newest first.
    pub async fn list_clients(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY p.created_date DESC, p.id LIMIT $1 OFFSET $2",
            select_profiles(ProfileRole::Client)
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_clients(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM client_profiles")
            .fetch_one(pool)
            .await
    }

    /// List executor profiles matching `filter`, newest first.
    pub async fn list_executors(
        pool: &PgPool,
        filter: &ExecutorFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_executor_filter(filter);
        let query = format!(
            "{} {where_clause} ORDER BY p.created_date DESC, p.id LIMIT ${bind_idx} OFFSET ${}",
            select_profiles(ProfileRole::Executor),
            bind_idx + 1
        );
        let mut q = sqlx::query_as::<_, Profile>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::Float(v) => q.bind(*v),
                BindValue::TextList(v) => q.bind(v.as_slice()),
            };
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count executor profiles matching `filter` (for pagination metadata).
    pub async fn count_executors(pool: &PgPool, filter: &ExecutorFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_executor_filter(filter);
        let query = format!(
            "SELECT COUNT(*) FROM ({} {where_clause}) filtered",
            select_profiles(ProfileRole::Executor)
        );
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::Float(v) => q.bind(*v),
                BindValue::TextList(v) => q.bind(v.as_slice()),
            };
        }
        q.fetch_one(pool).await
    }

    /// Update a profile. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        role: ProfileRole,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET
                email = COALESCE($2, email),
                username = COALESCE($3, username),
                name = COALESCE($4, name),
                last_name = COALESCE($5, last_name),
                phone_number = COALESCE($6, phone_number),
                bio = COALESCE($7, bio),
                birthdate = COALESCE($8, birthdate),
                gender = COALESCE($9, gender),
                avatar = COALESCE($10, avatar),
                is_active = COALESCE($11, is_active)
             WHERE id = $1",
            tables(role).profiles
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.name)
            .bind(&input.last_name)
            .bind(&input.phone_number)
            .bind(&input.bio)
            .bind(input.birthdate)
            .bind(&input.gender)
            .bind(&input.avatar)
            .bind(input.is_active)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, role, id).await
    }

    pub async fn delete(pool: &PgPool, role: ProfileRole, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", tables(role).profiles);
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subtract `amount` from an executor balance inside `tx`.
    ///
    /// Returns `false` without touching the row when the balance is too low.
    pub async fn deduct_balance(
        tx: &mut Transaction<'_, Postgres>,
        executor_id: DbId,
        amount: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE executor_profiles SET balance = balance - $2
             WHERE id = $1 AND balance >= $2",
        )
        .bind(executor_id)
        .bind(amount)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for the executor listing filter.
enum BindValue {
    Float(f64),
    TextList(Vec<String>),
}

/// Build a WHERE clause over the aliased executor subquery `p`.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_executor_filter(filter: &ExecutorFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if filter.price_min.is_some() || filter.price_max.is_some() {
        let mut price_conds = Vec::new();
        if let Some(min) = filter.price_min {
            price_conds.push(format!("s.price >= ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Float(min));
        }
        if let Some(max) = filter.price_max {
            price_conds.push(format!("s.price <= ${bind_idx}"));
            bind_idx += 1;
            bind_values.push(BindValue::Float(max));
        }
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM executor_services s WHERE s.executor_id = p.id AND {})",
            price_conds.join(" AND ")
        ));
    }

    if let Some(min) = filter.rate_min {
        conditions.push(format!("p.rating >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Float(min));
    }

    if let Some(max) = filter.rate_max {
        conditions.push(format!("p.rating <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Float(max));
    }

    let name_filters: [(&Option<String>, &str); 6] = [
        (
            &filter.subcategory,
            "EXISTS (SELECT 1 FROM executor_services s
                     JOIN subcategories sc ON sc.id = s.subcategory_id
                     WHERE s.executor_id = p.id AND sc.name = ANY(${}))",
        ),
        (
            &filter.category,
            "EXISTS (SELECT 1 FROM executor_services s
                     JOIN subcategories sc ON sc.id = s.subcategory_id
                     JOIN categories c ON c.id = sc.category_id
                     WHERE s.executor_id = p.id AND c.name = ANY(${}))",
        ),
        (
            &filter.city,
            "EXISTS (SELECT 1 FROM executor_addresses a
                     JOIN cities ci ON ci.id = a.city_id
                     WHERE a.executor_id = p.id AND ci.name = ANY(${}))",
        ),
        (
            &filter.region,
            "EXISTS (SELECT 1 FROM executor_addresses a
                     JOIN cities ci ON ci.id = a.city_id
                     JOIN regions r ON r.id = ci.region_id
                     WHERE a.executor_id = p.id AND r.name = ANY(${}))",
        ),
        (
            &filter.country,
            "EXISTS (SELECT 1 FROM executor_addresses a
                     JOIN cities ci ON ci.id = a.city_id
                     JOIN regions r ON r.id = ci.region_id
                     JOIN countries co ON co.id = r.country_id
                     WHERE a.executor_id = p.id AND co.name = ANY(${}))",
        ),
        (
            &filter.subways,
            "EXISTS (SELECT 1 FROM executor_geos g
                     JOIN executor_geo_subways gs ON gs.geo_id = g.id
                     JOIN subways sw ON sw.id = gs.subway_id
                     WHERE g.executor_id = p.id AND sw.name = ANY(${}))",
        ),
    ];

    for (value, template) in name_filters {
        let Some(raw) = value else { continue };
        let names = split_names(raw);
        if names.is_empty() {
            continue;
        }
        conditions.push(template.replace("${}", &format!("${bind_idx}")));
        bind_idx += 1;
        bind_values.push(BindValue::TextList(names));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (clause, binds, idx) = build_executor_filter(&ExecutorFilter::default());
        assert!(clause.is_empty());
        assert!(binds.is_empty());
        assert_eq!(idx, 1);
    }

    #[test]
    fn price_bounds_share_one_service() {
        let filter = ExecutorFilter {
            price_min: Some(10.0),
            price_max: Some(50.0),
            ..Default::default()
        };
        let (clause, binds, idx) = build_executor_filter(&filter);
        assert_eq!(clause.matches("EXISTS").count(), 1);
        assert!(clause.contains("s.price >= $1 AND s.price <= $2"));
        assert_eq!(binds.len(), 2);
        assert_eq!(idx, 3);
    }

    #[test]
    fn name_filters_number_their_binds() {
        let filter = ExecutorFilter {
            rate_min: Some(4.0),
            city: Some("Moscow,Kazan".into()),
            subways: Some(" ".into()),
            ..Default::default()
        };
        let (clause, binds, idx) = build_executor_filter(&filter);
        assert!(clause.contains("p.rating >= $1"));
        assert!(clause.contains("ci.name = ANY($2)"));
        assert!(!clause.contains("sw.name"));
        assert_eq!(binds.len(), 2);
        assert_eq!(idx, 3);
    }
}
