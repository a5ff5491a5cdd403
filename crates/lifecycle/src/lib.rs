//! Request/bid/booking lifecycle service.
//!
//! [`LifecycleService`] is the facade the HTTP layer talks to. It validates
//! caller input, delegates each operation to one repository call (one
//! transaction for every mutation) and translates guard outcomes into
//! [`CoreError`](huduma_core::error::CoreError) variants.

pub mod config;
pub mod error;
pub mod inputs;
pub mod service;

pub use config::LifecycleConfig;
pub use error::{LifecycleError, LifecycleResult};
pub use service::{LifecycleService, SearchResults};
