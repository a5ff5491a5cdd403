//! Bid row models and DTOs.

use huduma_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::request::Request;

/// A row from the `bids` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Bid {
    pub id: DbId,
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub amount: i64,
    pub accepted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a new bid.
#[derive(Debug, Clone)]
pub struct CreateBid {
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub amount: i64,
}

/// A bid joined with the bidding provider's display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BidWithProvider {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bid: Bid,
    pub provider_name: Option<String>,
    pub provider_photo: Option<String>,
}

/// Both rows touched by a successful acceptance.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedBid {
    pub request: Request,
    pub bid: Bid,
}
