//! Outcome of a guarded lifecycle write.

use huduma_core::lifecycle::RequestStatus;

/// Result of a conditional write against the lifecycle tables.
///
/// Anything other than [`Transition::Applied`] means the transaction was
/// rolled back and nothing changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T> {
    Applied(T),
    /// The named entity does not exist.
    Missing(&'static str),
    /// The actor may not perform this write.
    Forbidden,
    /// The status guard failed; carries the status observed afterwards.
    Stale(RequestStatus),
    /// A uniqueness rule blocked the write (duplicate bid, bid already accepted).
    Duplicate,
}

impl<T> Transition<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// Decode a `bookings.status` value, surfacing junk as a decode error.
pub(crate) fn decode_status(raw: &str) -> Result<RequestStatus, sqlx::Error> {
    raw.parse::<RequestStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
