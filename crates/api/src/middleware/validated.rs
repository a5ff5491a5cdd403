//! Body and query extractors that answer malformed input with the JSON
//! error envelope instead of axum's plain-text rejections.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use huduma_core::error::CoreError;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body; rejections become `400 VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| invalid(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string; rejections become `400 VALIDATION_ERROR`.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| invalid(rejection.body_text()))?;
        Ok(Self(value))
    }
}

fn invalid(message: String) -> AppError {
    AppError::Core(CoreError::Validation(message))
}
