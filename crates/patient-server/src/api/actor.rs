//! Acting-user extraction.
//!
//! Authentication happens upstream; the gateway forwards the verified user
//! id in `X-Actor-Id`.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The authenticated user performing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("missing X-Actor-Id header"))?;
        Ok(Actor(actor.to_string()))
    }
}
