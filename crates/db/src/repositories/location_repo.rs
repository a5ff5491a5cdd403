//! Repository for the `locations` table.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::location::{CreateLocation, Location, LocationRemoval};
use crate::models::transition::Transition;

/// Column list for locations queries.
const COLUMNS: &str = "location_id, user_id, name, latitude, longitude, address, \
    is_default, created_at, updated_at";

/// Provides location bookkeeping with a single default per user.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a location for a user.
    ///
    /// The user's first location always becomes the default. When
    /// `make_default` is set the previous default is cleared in the same
    /// transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateLocation,
    ) -> Result<Transition<Location>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_user(&mut *tx, &input.user_id).await? {
            return Ok(Transition::Missing("User"));
        }

        let has_default = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE user_id = $1 AND is_default)",
        )
        .bind(&input.user_id)
        .fetch_one(&mut *tx)
        .await?;
        let is_default = input.make_default || !has_default;

        if is_default && has_default {
            clear_default(&mut *tx, &input.user_id).await?;
        }

        let query = format!(
            "INSERT INTO locations \
                (location_id, user_id, name, latitude, longitude, address, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let location = sqlx::query_as::<_, Location>(&query)
            .bind(input.location_id)
            .bind(&input.user_id)
            .bind(&input.name)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.address)
            .bind(is_default)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id = %location.user_id,
            location_id = %location.location_id,
            is_default = location.is_default,
            "Location saved",
        );
        Ok(Transition::Applied(location))
    }

    /// Find a location by its ID.
    pub async fn find_by_id(pool: &PgPool, location_id: Uuid) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE location_id = $1");
        sqlx::query_as::<_, Location>(&query)
            .bind(location_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's default location, if any.
    pub async fn find_default(pool: &PgPool, user_id: &str) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE user_id = $1 AND is_default");
        sqlx::query_as::<_, Location>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// All of a user's locations, default first.
    pub async fn list_by_user(pool: &PgPool, user_id: &str) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locations WHERE user_id = $1 \
             ORDER BY is_default DESC, created_at, location_id"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Make one of the user's locations the default.
    ///
    /// Returns `None` (and changes nothing) if the location does not exist or
    /// belongs to someone else.
    pub async fn set_default(
        pool: &PgPool,
        user_id: &str,
        location_id: Uuid,
    ) -> Result<Option<Location>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_user(&mut *tx, user_id).await? {
            return Ok(None);
        }

        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM locations WHERE location_id = $1 AND user_id = $2)",
        )
        .bind(location_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !owned {
            return Ok(None);
        }

        clear_default(&mut *tx, user_id).await?;

        let query = format!(
            "UPDATE locations SET is_default = true \
             WHERE location_id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        let location = sqlx::query_as::<_, Location>(&query)
            .bind(location_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, location_id = %location_id, "Default location changed");
        Ok(Some(location))
    }

    /// Delete one of the user's locations.
    ///
    /// Locations referenced by a request are kept. Removing the default
    /// promotes the oldest remaining location so the user never ends up with
    /// locations but no default.
    pub async fn remove(
        pool: &PgPool,
        user_id: &str,
        location_id: Uuid,
    ) -> Result<LocationRemoval, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_user(&mut *tx, user_id).await? {
            return Ok(LocationRemoval::Missing);
        }

        let find_query =
            format!("SELECT {COLUMNS} FROM locations WHERE location_id = $1 AND user_id = $2");
        let location = sqlx::query_as::<_, Location>(&find_query)
            .bind(location_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(location) = location else {
            return Ok(LocationRemoval::Missing);
        };

        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE location_id = $1)",
        )
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await?;
        if in_use {
            return Ok(LocationRemoval::InUse);
        }

        sqlx::query("DELETE FROM locations WHERE location_id = $1")
            .bind(location_id)
            .execute(&mut *tx)
            .await?;

        let promoted = if location.is_default {
            let promote_query = format!(
                "UPDATE locations SET is_default = true \
                 WHERE location_id = ( \
                     SELECT location_id FROM locations WHERE user_id = $1 \
                     ORDER BY created_at, location_id LIMIT 1) \
                 RETURNING {COLUMNS}"
            );
            sqlx::query_as::<_, Location>(&promote_query)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            None
        };

        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            location_id = %location_id,
            promoted = ?promoted.as_ref().map(|l| l.location_id),
            "Location removed",
        );
        Ok(LocationRemoval::Removed { promoted })
    }
}

/// Serialize default-location changes per user. Returns false if the user
/// row does not exist.
async fn lock_user(conn: &mut PgConnection, user_id: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query_scalar::<_, String>("SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

async fn clear_default(conn: &mut PgConnection, user_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE locations SET is_default = false WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
