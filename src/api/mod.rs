// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::require_auth, AuthenticatedUser},
    error::ApiError,
    models::{
        Cid, InterestResponse, MatchSummary, RegisterRequest, SubmitResponsesRequest, UserRow,
        WalletAddress,
    },
    state::AppState,
};

pub mod health;
pub mod matches;
pub mod users;

pub fn router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/users/register", post(users::register))
        .route(
            "/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/users/responses", post(users::submit_responses))
        .route("/users/pfp", post(users::picture_upload_url))
        .route("/matches", get(matches::list_matches))
        .route("/matches/{wallet}", post(matches::express_interest))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let probes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(authenticated)
        .merge(probes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Wallet linked to the caller's identity.
pub(crate) async fn caller_wallet(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<WalletAddress, ApiError> {
    state
        .identity
        .wallet_for(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No wallet linked to this account"))
}

/// Row registered for `wallet`, or 404.
pub(crate) async fn registered_user(
    state: &AppState,
    wallet: &WalletAddress,
) -> Result<UserRow, ApiError> {
    state
        .users
        .user_by_wallet(wallet)
        .await?
        .ok_or_else(|| ApiError::not_found("No user found"))
}

/// Registers the `Auth-Token` header scheme referenced by every user route.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "auth_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Auth-Token",
                "Privy access token of the signed-in user.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        users::register,
        users::get_profile,
        users::update_profile,
        users::submit_responses,
        users::picture_upload_url,
        matches::list_matches,
        matches::express_interest,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            UserRow,
            WalletAddress,
            Cid,
            RegisterRequest,
            SubmitResponsesRequest,
            MatchSummary,
            InterestResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Users", description = "Registration, profile and questionnaire answers"),
        (name = "Matches", description = "Similar profiles and mutual interest"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
