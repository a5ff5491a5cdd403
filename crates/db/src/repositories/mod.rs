//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lifecycle writes run in a single
//! transaction and report guard failures as a [`Transition`] instead of an
//! error; the transaction is dropped (rolled back) in every such case.
//!
//! [`Transition`]: crate::models::transition::Transition

pub mod bid_repo;
pub mod location_repo;
pub mod provider_repo;
pub mod request_repo;

pub use bid_repo::BidRepo;
pub use location_repo::LocationRepo;
pub use provider_repo::ProviderRepo;
pub use request_repo::RequestRepo;
