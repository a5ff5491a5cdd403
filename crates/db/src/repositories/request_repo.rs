//! Repository for the `bookings` and `photos` tables.

use huduma_core::lifecycle::{self, LifecycleEvent, RequestStatus};
use huduma_core::types::DbId;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::request::{
    CreateRequest, CreatedRequest, OpenRequest, Request, RequestCategory, RequestDetail,
    RequestFilter, RequestSummary,
};
use crate::models::transition::{decode_status, Transition};
use crate::repositories::LocationRepo;

/// Column list for bookings queries.
const COLUMNS: &str = "booking_id, client_id, provider_id, category_id, location_id, \
    title, note, status, is_urgent, start_at, created_at, updated_at";

/// Select list and joins shared by the discovery feed and request search.
const OPEN_SELECT: &str = "SELECT b.booking_id, b.title, b.category_id, \
        c.name AS category_name, b.is_urgent, b.start_at, b.created_at, \
        l.address, l.latitude, l.longitude \
     FROM bookings b \
     LEFT JOIN categories c ON c.id = b.category_id \
     LEFT JOIN locations l ON l.location_id = b.location_id";

/// Who may act on a request: its client and, once booked, the provider's user.
#[derive(Debug, FromRow)]
struct Parties {
    client_id: String,
    provider_user_id: Option<String>,
    status: String,
}

/// Provides lifecycle and query operations for requests.
pub struct RequestRepo;

impl RequestRepo {
    /// Insert a new request in `bidding` together with its photos.
    ///
    /// Photos are stored with their submission index so they read back in
    /// the same order.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRequest,
    ) -> Result<CreatedRequest, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO bookings \
                (booking_id, client_id, category_id, location_id, title, note, is_urgent, start_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&insert_query)
            .bind(input.booking_id)
            .bind(&input.client_id)
            .bind(input.category_id)
            .bind(input.location_id)
            .bind(&input.title)
            .bind(&input.note)
            .bind(input.is_urgent)
            .bind(input.start_at)
            .fetch_one(&mut *tx)
            .await?;

        for (position, url) in input.photos.iter().enumerate() {
            sqlx::query(
                "INSERT INTO photos (photo_id, booking_id, uploaded_by, photo_url, position) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(request.booking_id)
            .bind(&input.client_id)
            .bind(url)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            booking_id = %request.booking_id,
            client_id = %request.client_id,
            photos = input.photos.len(),
            "Request created",
        );

        Ok(CreatedRequest {
            request,
            photos: input.photos.clone(),
        })
    }

    /// Find a request by its ID.
    pub async fn find_by_id(pool: &PgPool, booking_id: Uuid) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE booking_id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(booking_id)
            .fetch_optional(pool)
            .await
    }

    /// Photo URLs of a request, in submission order.
    pub async fn list_photos(pool: &PgPool, booking_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT photo_url FROM photos WHERE booking_id = $1 ORDER BY position",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await
    }

    /// Find a request enriched with category name, location, photos and bid count.
    pub async fn find_detail(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Option<RequestDetail>, sqlx::Error> {
        let Some(request) = Self::find_by_id(pool, booking_id).await? else {
            return Ok(None);
        };

        let category_name = match request.category_id {
            Some(category_id) => {
                sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = $1")
                    .bind(category_id)
                    .fetch_optional(pool)
                    .await?
            }
            None => None,
        };
        let location = match request.location_id {
            Some(location_id) => LocationRepo::find_by_id(pool, location_id).await?,
            None => None,
        };
        let bids_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bids WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_one(pool)
                .await?;
        let photos = Self::list_photos(pool, booking_id).await?;

        Ok(Some(RequestDetail {
            request,
            category_name,
            location,
            bids_count,
            photos,
        }))
    }

    /// List requests by client and/or status, newest first.
    pub async fn filter(
        pool: &PgPool,
        filter: &RequestFilter,
    ) -> Result<Vec<RequestSummary>, sqlx::Error> {
        sqlx::query_as::<_, RequestSummary>(
            "SELECT b.booking_id, b.title, b.status, b.is_urgent, b.start_at, b.created_at, \
                b.provider_id, \
                NULLIF(CONCAT_WS(' ', u.first_name, u.last_name), '') AS provider_name, \
                u.photo_url AS provider_photo, \
                (SELECT COUNT(*) FROM bids x WHERE x.booking_id = b.booking_id) AS bids_count \
             FROM bookings b \
             LEFT JOIN providers p ON p.provider_id = b.provider_id \
             LEFT JOIN users u ON u.user_id = p.user_id \
             WHERE ($1::text IS NULL OR b.client_id = $1) \
               AND ($2::text IS NULL OR b.status = $2) \
             ORDER BY b.created_at DESC, b.booking_id DESC",
        )
        .bind(filter.client_id.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await
    }

    /// Open requests, optionally restricted to one category, newest first.
    pub async fn list_open(
        pool: &PgPool,
        category_id: Option<DbId>,
    ) -> Result<Vec<OpenRequest>, sqlx::Error> {
        let query = format!(
            "{OPEN_SELECT} \
             WHERE b.status = ANY($1) \
               AND ($2::bigint IS NULL OR b.category_id = $2) \
             ORDER BY b.created_at DESC, b.booking_id DESC"
        );
        sqlx::query_as::<_, OpenRequest>(&query)
            .bind(LifecycleEvent::SubmitBid.allowed_from_strs())
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Open requests whose title or category name contains the pattern,
    /// optionally restricted to one category.
    ///
    /// `pattern` must already be an escaped `ILIKE` pattern.
    pub async fn search_open(
        pool: &PgPool,
        pattern: &str,
        category_id: Option<DbId>,
    ) -> Result<Vec<OpenRequest>, sqlx::Error> {
        let query = format!(
            "{OPEN_SELECT} \
             WHERE b.status = ANY($1) \
               AND (b.title ILIKE $2 ESCAPE '\\' OR c.name ILIKE $2 ESCAPE '\\') \
               AND ($3::bigint IS NULL OR b.category_id = $3) \
             ORDER BY b.created_at DESC, b.booking_id DESC"
        );
        sqlx::query_as::<_, OpenRequest>(&query)
            .bind(LifecycleEvent::SubmitBid.allowed_from_strs())
            .bind(pattern)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Distinct categories that currently have open requests, by name.
    pub async fn list_open_categories(pool: &PgPool) -> Result<Vec<RequestCategory>, sqlx::Error> {
        sqlx::query_as::<_, RequestCategory>(
            "SELECT DISTINCT c.id, c.name \
             FROM bookings b \
             JOIN categories c ON c.id = b.category_id \
             WHERE b.status = ANY($1) \
             ORDER BY c.name, c.id",
        )
        .bind(LifecycleEvent::SubmitBid.allowed_from_strs())
        .fetch_all(pool)
        .await
    }

    /// Move a `pending` booking to `completed`. Only the client may do this.
    pub async fn complete(
        pool: &PgPool,
        booking_id: Uuid,
        actor: &str,
    ) -> Result<Transition<Request>, sqlx::Error> {
        Self::apply_transition(pool, booking_id, actor, LifecycleEvent::Complete, |p, actor| {
            p.client_id == actor
        })
        .await
    }

    /// Cancel a `bidding` or `pending` request. The client or the assigned
    /// provider may do this.
    pub async fn cancel(
        pool: &PgPool,
        booking_id: Uuid,
        actor: &str,
    ) -> Result<Transition<Request>, sqlx::Error> {
        Self::apply_transition(pool, booking_id, actor, LifecycleEvent::Cancel, |p, actor| {
            p.client_id == actor || p.provider_user_id.as_deref() == Some(actor)
        })
        .await
    }

    /// Guarded status update shared by complete and cancel.
    ///
    /// The locked row's status is run through [`lifecycle::transition`] to
    /// pick the target. The write itself stays a conditional
    /// `UPDATE ... WHERE status = ANY(..)`; zero affected rows means another
    /// transaction got there first, and the status observed afterwards is
    /// reported back.
    async fn apply_transition(
        pool: &PgPool,
        booking_id: Uuid,
        actor: &str,
        event: LifecycleEvent,
        may_act: fn(&Parties, &str) -> bool,
    ) -> Result<Transition<Request>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let parties = sqlx::query_as::<_, Parties>(
            "SELECT b.client_id, p.user_id AS provider_user_id, b.status \
             FROM bookings b \
             LEFT JOIN providers p ON p.provider_id = b.provider_id \
             WHERE b.booking_id = $1 \
             FOR UPDATE OF b",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(parties) = parties else {
            return Ok(Transition::Missing("Request"));
        };
        if !may_act(&parties, actor) {
            return Ok(Transition::Forbidden);
        }
        let current = decode_status(&parties.status)?;
        let Ok(target) = lifecycle::transition(current, event) else {
            return Ok(Transition::Stale(current));
        };

        let update_query = format!(
            "UPDATE bookings SET status = $2 \
             WHERE booking_id = $1 AND status = ANY($3) \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Request>(&update_query)
            .bind(booking_id)
            .bind(target.as_str())
            .bind(event.allowed_from_strs())
            .fetch_optional(&mut *tx)
            .await?;

        match updated {
            Some(request) => {
                tx.commit().await?;
                tracing::info!(
                    booking_id = %booking_id,
                    actor = %actor,
                    status = %request.status,
                    "Request status changed",
                );
                Ok(Transition::Applied(request))
            }
            None => {
                let current = current_status(&mut *tx, booking_id).await?;
                Ok(current.map_or(Transition::Missing("Request"), Transition::Stale))
            }
        }
    }
}

/// Read the status of a request inside an open transaction.
pub(crate) async fn current_status(
    conn: &mut PgConnection,
    booking_id: Uuid,
) -> Result<Option<RequestStatus>, sqlx::Error> {
    let raw = sqlx::query_scalar::<_, String>("SELECT status FROM bookings WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_optional(conn)
        .await?;
    raw.as_deref().map(decode_status).transpose()
}
