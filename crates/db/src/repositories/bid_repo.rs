//! Repository for the `bids` table and the accept-bid protocol.

use huduma_core::lifecycle::{self, LifecycleEvent};
use huduma_core::types::DbId;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::bid::{AcceptedBid, Bid, BidWithProvider, CreateBid};
use crate::models::request::Request;
use crate::models::transition::{decode_status, Transition};
use crate::repositories::request_repo::current_status;

/// Column list for bids queries.
const COLUMNS: &str = "id, booking_id, provider_id, amount, accepted, created_at, updated_at";

/// Column list for bookings rows returned by an acceptance.
const REQUEST_COLUMNS: &str = "booking_id, client_id, provider_id, category_id, location_id, \
    title, note, status, is_urgent, start_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct BiddingTarget {
    client_id: String,
    status: String,
}

/// Provides bid submission, listing and acceptance.
pub struct BidRepo;

impl BidRepo {
    /// Place a bid on an open request.
    ///
    /// The request row is share-locked for the duration of the insert, so a
    /// concurrent acceptance either lands before (and the bid is refused) or
    /// after (and sees the bid). A provider's second bid on the same request
    /// is reported as [`Transition::Duplicate`].
    pub async fn create(
        pool: &PgPool,
        input: &CreateBid,
        bidder_user_id: &str,
    ) -> Result<Transition<Bid>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let target = sqlx::query_as::<_, BiddingTarget>(
            "SELECT client_id, status FROM bookings WHERE booking_id = $1 FOR SHARE",
        )
        .bind(input.booking_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(target) = target else {
            return Ok(Transition::Missing("Request"));
        };
        if target.client_id == bidder_user_id {
            return Ok(Transition::Forbidden);
        }
        let status = decode_status(&target.status)?;
        if lifecycle::transition(status, LifecycleEvent::SubmitBid).is_err() {
            return Ok(Transition::Stale(status));
        }

        let insert_query = format!(
            "INSERT INTO bids (booking_id, provider_id, amount) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_bids_booking_provider DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let bid = sqlx::query_as::<_, Bid>(&insert_query)
            .bind(input.booking_id)
            .bind(input.provider_id)
            .bind(input.amount)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(bid) = bid else {
            return Ok(Transition::Duplicate);
        };
        tx.commit().await?;

        tracing::info!(
            bid_id = bid.id,
            booking_id = %bid.booking_id,
            provider_id = %bid.provider_id,
            amount = bid.amount,
            "Bid submitted",
        );
        Ok(Transition::Applied(bid))
    }

    /// Find a bid by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bid>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bids WHERE id = $1");
        sqlx::query_as::<_, Bid>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All bids on a request with the bidder's display fields, oldest first.
    pub async fn list_by_request(
        pool: &PgPool,
        booking_id: Uuid,
    ) -> Result<Vec<BidWithProvider>, sqlx::Error> {
        sqlx::query_as::<_, BidWithProvider>(
            "SELECT b.id, b.booking_id, b.provider_id, b.amount, b.accepted, \
                b.created_at, b.updated_at, \
                NULLIF(CONCAT_WS(' ', u.first_name, u.last_name), '') AS provider_name, \
                u.photo_url AS provider_photo \
             FROM bids b \
             JOIN providers p ON p.provider_id = b.provider_id \
             JOIN users u ON u.user_id = p.user_id \
             WHERE b.booking_id = $1 \
             ORDER BY b.created_at, b.id",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await
    }

    /// All bids placed by a provider, newest first.
    pub async fn list_by_provider(pool: &PgPool, provider_id: Uuid) -> Result<Vec<Bid>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bids WHERE provider_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Bid>(&query)
            .bind(provider_id)
            .fetch_all(pool)
            .await
    }

    /// Accept a bid, booking its provider onto the request.
    ///
    /// Single transaction:
    /// 1. load the bid and its request's client;
    /// 2. `UPDATE bookings ... WHERE status = 'bidding'`; zero rows means the
    ///    request already moved on (a concurrent acceptance, a cancellation);
    /// 3. flip `bids.accepted` false to true; zero rows means it was already set.
    ///
    /// A concurrent loser blocks on the row lock taken in step 2, re-checks
    /// the status predicate once the winner commits and comes back
    /// [`Transition::Stale`]. An assigned provider is never overwritten.
    pub async fn accept(
        pool: &PgPool,
        bid_id: DbId,
        actor: &str,
    ) -> Result<Transition<AcceptedBid>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let find_query = format!("SELECT {COLUMNS} FROM bids WHERE id = $1");
        let bid = sqlx::query_as::<_, Bid>(&find_query)
            .bind(bid_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(bid) = bid else {
            return Ok(Transition::Missing("Bid"));
        };

        let client_id =
            sqlx::query_scalar::<_, String>("SELECT client_id FROM bookings WHERE booking_id = $1")
                .bind(bid.booking_id)
                .fetch_optional(&mut *tx)
                .await?;
        match client_id {
            None => return Ok(Transition::Missing("Request")),
            Some(client_id) if client_id != actor => return Ok(Transition::Forbidden),
            Some(_) => {}
        }

        let event = LifecycleEvent::AcceptBid;
        let book_query = format!(
            "UPDATE bookings SET provider_id = $2, status = $3 \
             WHERE booking_id = $1 AND status = ANY($4) \
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&book_query)
            .bind(bid.booking_id)
            .bind(bid.provider_id)
            .bind(event.target().as_str())
            .bind(event.allowed_from_strs())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(request) = request else {
            let current = current_status(&mut *tx, bid.booking_id).await?;
            return Ok(current.map_or(Transition::Missing("Request"), Transition::Stale));
        };

        let flip_query = format!(
            "UPDATE bids SET accepted = true \
             WHERE id = $1 AND booking_id = $2 AND accepted = false \
             RETURNING {COLUMNS}"
        );
        let bid = sqlx::query_as::<_, Bid>(&flip_query)
            .bind(bid.id)
            .bind(bid.booking_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(bid) = bid else {
            return Ok(Transition::Duplicate);
        };

        tx.commit().await?;

        tracing::info!(
            bid_id = bid.id,
            booking_id = %request.booking_id,
            provider_id = %bid.provider_id,
            "Bid accepted",
        );
        Ok(Transition::Applied(AcceptedBid { request, bid }))
    }
}
