//! Repository for the `properties` table.

use estate_core::search::ResolvedPropertyFilter;
use estate_core::types::DbId;
use sqlx::PgPool;

use crate::models::property::{CreateProperty, Property, PropertyExportRow, UpdateProperty};

const COLUMNS: &str = "id, owner_id, title, description, property_type, address, city, state, \
                        zip_code, country, price, square_footage, lot_size, year_built, zoning, \
                        status, cap_rate, noi, broker_name, broker_phone, broker_email, \
                        virtual_tour_url, is_premium, is_verified, created_at, updated_at";

/// Search predicates. Every clause is disabled by a NULL (or `false`) bind,
/// so the same statement serves any filter combination.
const SEARCH_WHERE: &str = "
    ($1::TEXT IS NULL OR title ILIKE $1 OR description ILIKE $1 OR address ILIKE $1
        OR city ILIKE $1 OR state ILIKE $1 OR zip_code ILIKE $1)
    AND ($2::TEXT IS NULL OR property_type ILIKE $2)
    AND ($3::TEXT IS NULL OR status = $3)
    AND ($4::NUMERIC IS NULL OR price >= $4)
    AND ($5::NUMERIC IS NULL OR price <= $5)
    AND ($6::INT IS NULL OR square_footage >= $6)
    AND ($7::INT IS NULL OR square_footage <= $7)
    AND ($8::TEXT IS NULL OR city ILIKE $8)
    AND ($9::TEXT IS NULL OR state ILIKE $9)
    AND ($10::TEXT IS NULL OR zip_code ILIKE $10)
    AND ($11::NUMERIC IS NULL OR cap_rate >= $11)
    AND ($12::INT IS NULL OR year_built = $12)
    AND ($13::TEXT IS NULL OR zoning ILIKE $13)
    AND ($14 = false OR is_premium = true)
    AND ($15 = false OR is_verified = true)";

macro_rules! bind_filter {
    ($query:expr, $f:expr) => {
        $query
            .bind(&$f.keyword)
            .bind(&$f.property_type)
            .bind(&$f.status)
            .bind($f.min_price)
            .bind($f.max_price)
            .bind($f.min_sqft)
            .bind($f.max_sqft)
            .bind(&$f.city)
            .bind(&$f.state)
            .bind(&$f.zip_code)
            .bind($f.min_cap_rate)
            .bind($f.year_built)
            .bind(&$f.zoning)
            .bind($f.premium_only)
            .bind($f.verified_only)
    };
}

/// Provides CRUD and search over property listings.
pub struct PropertyRepo;

impl PropertyRepo {
    pub async fn create(pool: &PgPool, input: &CreateProperty) -> Result<Property, sqlx::Error> {
        let query = format!(
            "INSERT INTO properties (owner_id, title, description, property_type, address, city,
                                     state, zip_code, country, price, square_footage, lot_size,
                                     year_built, zoning, status, cap_rate, noi, broker_name,
                                     broker_phone, broker_email, virtual_tour_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'Nepal'), $10, $11, $12,
                     $13, $14, $15, $16, $17, $18, $19, $20, $21)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.property_type)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip_code)
            .bind(&input.country)
            .bind(input.price)
            .bind(input.square_footage)
            .bind(input.lot_size)
            .bind(input.year_built)
            .bind(&input.zoning)
            .bind(&input.status)
            .bind(input.cap_rate)
            .bind(input.noi)
            .bind(&input.broker_name)
            .bind(&input.broker_phone)
            .bind(&input.broker_email)
            .bind(&input.virtual_tour_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM properties WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Search with a resolved filter. Premium listings sort first, then newest.
    pub async fn search(
        pool: &PgPool,
        filter: &ResolvedPropertyFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties
             WHERE {SEARCH_WHERE}
             ORDER BY is_premium DESC, created_at DESC
             LIMIT $16 OFFSET $17"
        );
        bind_filter!(sqlx::query_as::<_, Property>(&query), filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows matching a filter, for pagination.
    pub async fn count(pool: &PgPool, filter: &ResolvedPropertyFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM properties WHERE {SEARCH_WHERE}");
        let row: (i64,) = bind_filter!(sqlx::query_as(&query), filter)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Premium listings for the home page.
    pub async fn list_featured(pool: &PgPool, limit: i64) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties
             WHERE is_premium = true
             ORDER BY updated_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_latest(pool: &PgPool, limit: i64) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM properties ORDER BY created_at DESC LIMIT $1");
        sqlx::query_as::<_, Property>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Property>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM properties WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a property. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProperty,
    ) -> Result<Option<Property>, sqlx::Error> {
        let query = format!(
            "UPDATE properties SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                property_type = COALESCE($4, property_type),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                state = COALESCE($7, state),
                zip_code = COALESCE($8, zip_code),
                country = COALESCE($9, country),
                price = COALESCE($10, price),
                square_footage = COALESCE($11, square_footage),
                lot_size = COALESCE($12, lot_size),
                year_built = COALESCE($13, year_built),
                zoning = COALESCE($14, zoning),
                status = COALESCE($15, status),
                cap_rate = COALESCE($16, cap_rate),
                noi = COALESCE($17, noi),
                broker_name = COALESCE($18, broker_name),
                broker_phone = COALESCE($19, broker_phone),
                broker_email = COALESCE($20, broker_email),
                virtual_tour_url = COALESCE($21, virtual_tour_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Property>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.property_type)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip_code)
            .bind(&input.country)
            .bind(input.price)
            .bind(input.square_footage)
            .bind(input.lot_size)
            .bind(input.year_built)
            .bind(&input.zoning)
            .bind(&input.status)
            .bind(input.cap_rate)
            .bind(input.noi)
            .bind(&input.broker_name)
            .bind(&input.broker_phone)
            .bind(&input.broker_email)
            .bind(&input.virtual_tour_url)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a property with its images, premium listing and analytics.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_premium(pool: &PgPool, id: DbId, premium: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE properties SET is_premium = $2 WHERE id = $1")
            .bind(id)
            .bind(premium)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Bulk admin actions
    // -----------------------------------------------------------------------

    pub async fn set_verified_bulk(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE properties SET is_verified = true WHERE id = ANY($1) AND is_verified = false",
        )
        .bind(ids)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_premium_bulk(
        pool: &PgPool,
        ids: &[DbId],
        premium: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE properties SET is_premium = $2 WHERE id = ANY($1) AND is_premium <> $2",
        )
        .bind(ids)
        .bind(premium)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_status_bulk(
        pool: &PgPool,
        ids: &[DbId],
        status: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE properties SET status = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Rows for the admin CSV export, newest first.
    pub async fn export_rows(pool: &PgPool) -> Result<Vec<PropertyExportRow>, sqlx::Error> {
        sqlx::query_as::<_, PropertyExportRow>(
            "SELECT p.id, p.title, p.property_type, p.city, p.state, p.price, p.status,
                    p.is_premium, p.is_verified, u.username AS owner_username, p.created_at
             FROM properties p
             JOIN users u ON u.id = p.owner_id
             ORDER BY p.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }
}
