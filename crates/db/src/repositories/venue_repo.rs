//! Repository for the `venues` catalogue table.

use gigseeker_core::types::DbId;
use sqlx::PgPool;

use crate::models::venue::{CreateVenue, Venue, VenueSearch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, city, state, genres, website, description, \
    capacity, created_at, updated_at";

/// Filter clause shared by the search listing and its count query.
/// `NULL` parameters disable their filter.
const SEARCH_WHERE: &str = "($1::text IS NULL
        OR name ILIKE '%' || $1 || '%'
        OR city ILIKE '%' || $1 || '%'
        OR description ILIKE '%' || $1 || '%')
     AND ($2::text IS NULL OR city ILIKE '%' || $2 || '%')
     AND ($3::text IS NULL OR state = $3)
     AND ($4::text[] IS NULL OR genres && $4)";

/// Provides read access to the venue catalogue, plus inserts for
/// seeding and tests.
pub struct VenueRepo;

impl VenueRepo {
    /// Insert a venue into the catalogue, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVenue) -> Result<Venue, sqlx::Error> {
        let query = format!(
            "INSERT INTO venues (name, email, city, state, genres, website, description, capacity)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Venue>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.genres)
            .bind(&input.website)
            .bind(&input.description)
            .bind(input.capacity)
            .fetch_one(pool)
            .await
    }

    /// Find a venue by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Venue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM venues WHERE id = $1");
        sqlx::query_as::<_, Venue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Search the catalogue, returning one page of matches plus the
    /// total match count for pagination.
    pub async fn search(
        pool: &PgPool,
        filters: &VenueSearch,
    ) -> Result<(Vec<Venue>, i64), sqlx::Error> {
        let listing = format!(
            "SELECT {COLUMNS} FROM venues
             WHERE {SEARCH_WHERE}
             ORDER BY name ASC
             LIMIT $5 OFFSET $6"
        );
        let venues = sqlx::query_as::<_, Venue>(&listing)
            .bind(&filters.query)
            .bind(&filters.city)
            .bind(&filters.state)
            .bind(&filters.genres)
            .bind(filters.limit())
            .bind(filters.offset())
            .fetch_all(pool)
            .await?;

        let count = format!("SELECT COUNT(*) FROM venues WHERE {SEARCH_WHERE}");
        let total = sqlx::query_scalar::<_, i64>(&count)
            .bind(&filters.query)
            .bind(&filters.city)
            .bind(&filters.state)
            .bind(&filters.genres)
            .fetch_one(pool)
            .await?;

        Ok((venues, total))
    }
}
