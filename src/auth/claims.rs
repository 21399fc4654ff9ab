// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access token claims and authenticated user representation.

use serde::{Deserialize, Serialize};

/// Claims of an identity provider access token.
///
/// Tokens are ES256-signed with `iss = "privy.io"` and `aud` set to the app id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Identity id (`did:privy:...`)
    pub sub: String,

    /// Session id
    #[serde(default)]
    pub sid: Option<String>,

    pub iss: String,

    /// Validated by jsonwebtoken, not read directly
    #[serde(default)]
    pub aud: Option<serde_json::Value>,

    #[serde(default)]
    pub iat: i64,

    pub exp: i64,
}

/// Identity attached to a request once its token is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable identity id from the identity provider.
    pub user_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: AccessTokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
            expires_at: claims.exp,
        }
    }
}
