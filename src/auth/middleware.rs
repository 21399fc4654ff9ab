// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to the whole user-facing router so that a missing or invalid
//! token is rejected before any handler runs:
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/users/profile", get(get_profile))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::extractor::token_from_headers;
use crate::state::AppState;

/// Verify the `Auth-Token` header and attach the identity to the request.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = match token_from_headers(request.headers()) {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };

    let verified = state.identity.verify_token(token).await;
    match verified {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "token verification failed");
            e.into_response()
        }
    }
}
