//! Row models and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` structs matching a database row or join
//! - `Deserialize`/plain input structs for inserts
//!
//! [`transition`] holds the outcome type returned by every guarded
//! lifecycle write.

pub mod bid;
pub mod location;
pub mod provider;
pub mod request;
pub mod transition;
