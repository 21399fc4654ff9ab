// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Header carrying the raw access token.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Extractor for authenticated users.
///
/// Reuses the identity attached by [`super::middleware::require_auth`] when
/// present; otherwise verifies the `Auth-Token` header itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = token_from_headers(&parts.headers)?;
        let user = state.identity.verify_token(token).await?;
        Ok(Auth(user))
    }
}

/// Read the access token, tolerating an optional `Bearer ` prefix.
pub fn token_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTH_TOKEN_HEADER)
        .ok_or(AuthError::MissingAuthToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthToken)?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AuthError::MissingAuthToken);
    }
    Ok(token)
}
