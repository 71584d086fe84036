//! Bearer-token extraction for role-gated handlers.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use tracing::warn;

use crate::auth::jwt::Claims;
use crate::auth::Role;
use crate::errors::AppError;
use crate::state::AppState;

/// Verified claims of the calling user.
///
/// The token is read from `Authorization: Bearer <token>`, falling back to an
/// `access_token` query parameter so report downloads work as plain links.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl AuthClaims {
    /// Fails with 403 unless the caller holds `role`.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.0.role == role {
            Ok(())
        } else {
            warn!(
                "Role check failed: '{}' holds {} but {} is required",
                self.0.sub, self.0.role, role
            );
            Err(AppError::Forbidden)
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim().to_string())
        })
        .filter(|t| !t.is_empty());

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.access_token)
            .filter(|t| !t.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = state.auth.verify(&token).map_err(|e| {
            warn!("Rejected access token: {e}");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        Ok(AuthClaims(claims))
    }
}
