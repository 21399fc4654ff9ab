// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Privy access-token authentication for the Tact API.
//!
//! ## Auth Flow
//!
//! 1. The mobile client signs the user in with Privy
//! 2. The client sends the raw access token in the `Auth-Token` header
//! 3. The server:
//!    - Verifies the ES256 signature against the app verification key
//!      (configured PEM, or the app JWKS fetched via HTTPS)
//!    - Checks expiry, issuer (`privy.io`) and audience (the app id)
//!    - Attaches `sub` as the identity id to the request
//! 4. Handlers resolve the identity id to a wallet address through
//!    [`IdentityProvider::wallet_for`]
//!
//! ## Security
//!
//! - Every route except `/health/*` and the API docs requires authentication
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod privy;

#[cfg(test)]
pub(crate) mod test_keys;

use async_trait::async_trait;

use crate::models::WalletAddress;

pub use claims::{AccessTokenClaims, AuthenticatedUser};
pub use error::AuthError;
pub use extractor::{Auth, AUTH_TOKEN_HEADER};
pub use jwks::JwksManager;
pub use privy::{PrivyClient, PrivyConfig};

/// Failure talking to the identity provider's user API.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Request(String),
    #[error("identity provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected identity response: {0}")]
    InvalidResponse(String),
}

/// External identity capability: token verification plus the
/// identity-to-wallet lookup every user-scoped handler needs.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an access token and return the identity it belongs to.
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Wallet linked to the identity, if it has one.
    async fn wallet_for(&self, user_id: &str) -> Result<Option<WalletAddress>, IdentityError>;

    /// `None` when ready, otherwise a short reason for `/health/ready`.
    async fn readiness(&self) -> Option<String> {
        None
    }
}
