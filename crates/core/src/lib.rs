//! Domain rules for the request/bid/booking lifecycle.
//!
//! This crate has no database or HTTP dependencies. Everything here is pure
//! and can be shared by the store, the lifecycle service, and the API.

pub mod error;
pub mod geo;
pub mod lifecycle;
pub mod matching;
pub mod search;
pub mod types;
pub mod validation;
