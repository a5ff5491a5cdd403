//! Repository for the `providers` table and provider search.

use sqlx::PgPool;

use crate::models::provider::{Provider, ProviderMatch, ProviderSearch};

/// Column list for providers queries.
const COLUMNS: &str = "provider_id, user_id, category_id, industry_id, created_at, updated_at";

/// Provides read operations for providers.
pub struct ProviderRepo;

impl ProviderRepo {
    /// Find the provider registered for a user, if any.
    pub async fn find_by_user_id(pool: &PgPool, user_id: &str) -> Result<Option<Provider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM providers WHERE user_id = $1");
        sqlx::query_as::<_, Provider>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Search providers by name, category or industry.
    ///
    /// Each hit carries the coordinates of the provider's default location,
    /// when one is set, for distance annotation by the caller.
    pub async fn search(
        pool: &PgPool,
        criteria: &ProviderSearch,
    ) -> Result<Vec<ProviderMatch>, sqlx::Error> {
        sqlx::query_as::<_, ProviderMatch>(
            "SELECT p.provider_id, p.user_id, \
                NULLIF(CONCAT_WS(' ', u.first_name, u.last_name), '') AS name, \
                u.photo_url, \
                p.category_id, c.name AS category_name, \
                p.industry_id, i.name AS industry_name, \
                l.latitude, l.longitude \
             FROM providers p \
             JOIN users u ON u.user_id = p.user_id \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN industries i ON i.id = p.industry_id \
             LEFT JOIN locations l ON l.user_id = p.user_id AND l.is_default \
             WHERE ($1::text IS NULL \
                    OR CONCAT_WS(' ', u.first_name, u.last_name) ILIKE $1 ESCAPE '\\' \
                    OR c.name ILIKE $1 ESCAPE '\\' \
                    OR i.name ILIKE $1 ESCAPE '\\') \
               AND ($2::bigint IS NULL OR p.category_id = $2) \
               AND ($3::bigint IS NULL OR p.industry_id = $3) \
             ORDER BY p.created_at DESC, p.provider_id",
        )
        .bind(criteria.pattern.as_deref())
        .bind(criteria.category_id)
        .bind(criteria.industry_id)
        .fetch_all(pool)
        .await
    }
}
