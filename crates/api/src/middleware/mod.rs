//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`validated::ValidJson`], [`validated::ValidQuery`] -- Body and query
//!   extraction with JSON error responses.

pub mod auth;
pub mod validated;
