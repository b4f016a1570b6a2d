//! Authenticated-user extraction.
//!
//! Identity is established out-of-band (the edge gateway authenticates the
//! caller and forwards the user id in `X-User-Id`). This extractor only
//! validates presence and shape; a missing or malformed header is rejected
//! before any handler logic runs.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

/// The authenticated caller. Available to any handler as an extractor.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        let user_id = Uuid::parse_str(header).map_err(|_| AppError::Unauthenticated)?;

        Ok(AuthUser(user_id))
    }
}
