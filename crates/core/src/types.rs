/// Integer primary keys (bids, categories, industries) are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque user identifier issued by the external identity provider.
pub type UserId = String;
