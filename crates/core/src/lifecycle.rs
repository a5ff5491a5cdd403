//! Request lifecycle state machine.
//!
//! A request and its eventual booking share one row and one status column.
//! This module owns the transition table; the store derives its conditional
//! `WHERE status = ANY(..)` guards from [`LifecycleEvent::allowed_from`] so the
//! SQL and the table cannot drift apart.
//!
//! ```text
//!   CreateRequest ──► Bidding ──AcceptBid──► Pending ──Complete──► Completed
//!                      │  ▲                    │
//!                      │  └──SubmitBid         │
//!                      └───────Cancel──────────┴──────────────────► Cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a request/booking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Open for bids. No provider assigned.
    Bidding,
    /// A bid was accepted; the provider is assigned and work is outstanding.
    Pending,
    /// Terminal.
    Completed,
    /// Terminal.
    Cancelled,
}

/// Database values, in lifecycle order.
pub const STATUS_BIDDING: &str = "bidding";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid status strings.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_BIDDING,
    STATUS_PENDING,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

impl RequestStatus {
    /// The value stored in `bookings.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Bidding => STATUS_BIDDING,
            RequestStatus::Pending => STATUS_PENDING,
            RequestStatus::Completed => STATUS_COMPLETED,
            RequestStatus::Cancelled => STATUS_CANCELLED,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_BIDDING => Ok(RequestStatus::Bidding),
            STATUS_PENDING => Ok(RequestStatus::Pending),
            STATUS_COMPLETED => Ok(RequestStatus::Completed),
            STATUS_CANCELLED => Ok(RequestStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown request status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An event applied to an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    SubmitBid,
    AcceptBid,
    Complete,
    Cancel,
}

impl LifecycleEvent {
    /// Statuses from which this event may be applied.
    pub fn allowed_from(self) -> &'static [RequestStatus] {
        match self {
            LifecycleEvent::SubmitBid | LifecycleEvent::AcceptBid => &[RequestStatus::Bidding],
            LifecycleEvent::Complete => &[RequestStatus::Pending],
            LifecycleEvent::Cancel => &[RequestStatus::Bidding, RequestStatus::Pending],
        }
    }

    /// Status the request ends in after the event.
    pub fn target(self) -> RequestStatus {
        match self {
            LifecycleEvent::SubmitBid => RequestStatus::Bidding,
            LifecycleEvent::AcceptBid => RequestStatus::Pending,
            LifecycleEvent::Complete => RequestStatus::Completed,
            LifecycleEvent::Cancel => RequestStatus::Cancelled,
        }
    }

    /// [`allowed_from`](Self::allowed_from) as database strings, for binding
    /// to `status = ANY($n)`.
    pub fn allowed_from_strs(self) -> Vec<String> {
        self.allowed_from()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }

    fn verb(self) -> &'static str {
        match self {
            LifecycleEvent::SubmitBid => "bid on",
            LifecycleEvent::AcceptBid => "accept a bid on",
            LifecycleEvent::Complete => "complete",
            LifecycleEvent::Cancel => "cancel",
        }
    }
}

/// Apply `event` to a request currently in `from`.
///
/// Returns the resulting status, or [`CoreError::Conflict`] when the guard
/// fails. Terminal states accept no events.
pub fn transition(from: RequestStatus, event: LifecycleEvent) -> Result<RequestStatus, CoreError> {
    if event.allowed_from().contains(&from) {
        Ok(event.target())
    } else {
        Err(stale_state(event, from))
    }
}

/// The conflict reported when a guard fails against the current status.
pub fn stale_state(event: LifecycleEvent, current: RequestStatus) -> CoreError {
    CoreError::Conflict(format!(
        "Cannot {} a request in status '{current}'",
        event.verb()
    ))
}

/// The error reported when the actor may not apply `event` to a request.
pub fn forbidden(event: LifecycleEvent) -> CoreError {
    CoreError::Forbidden(format!("You are not allowed to {} this request", event.verb()))
}

/// The error reported when a uniqueness rule blocks `event`.
pub fn duplicate(event: LifecycleEvent) -> CoreError {
    match event {
        LifecycleEvent::SubmitBid => {
            CoreError::Conflict("You have already placed a bid on this request".into())
        }
        LifecycleEvent::AcceptBid => CoreError::Conflict("Bid has already been accepted".into()),
        other => CoreError::Conflict(format!("Cannot {} this request twice", other.verb())),
    }
}
