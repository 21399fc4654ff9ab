// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use super::{caller_wallet, registered_user};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        DataEnvelope, NewUser, ProfileUpdate, ProfileUpdateError, RegisterRequest,
        SubmitResponsesRequest, UserRow,
    },
    questionnaire::render_document,
    state::AppState,
    storage::PICTURE_UPLOAD_TTL,
};

/// Register the caller under their linked wallet.
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    tag = "Users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Created row, wrapped in `data`", body = UserRow),
        (status = 400, description = "Username or full name missing"),
        (status = 409, description = "Wallet or username already registered"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity or store request failed")
    )
)]
pub async fn register(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<DataEnvelope<UserRow>>, ApiError> {
    let username = non_blank(request.username);
    let full_name = non_blank(request.full_name);
    let (Some(username), Some(full_name)) = (username, full_name) else {
        return Err(ApiError::bad_request("Username and full name are required"));
    };

    let wallet_address = caller_wallet(&state, &user).await?;
    let row = state
        .users
        .insert_user(NewUser {
            username,
            full_name,
            wallet_address,
        })
        .await?;

    info!(user_id = row.id, username = %row.username, "user registered");
    Ok(Json(DataEnvelope::new(row)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get the caller's profile row, or null when they have not registered.
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Caller's row or null, wrapped in `data`", body = UserRow),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity or store request failed")
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<DataEnvelope<Option<UserRow>>>, ApiError> {
    let wallet = caller_wallet(&state, &user).await?;
    let row = state.users.user_by_wallet(&wallet).await?;
    Ok(Json(DataEnvelope::new(row)))
}

/// Update allow-listed profile columns.
///
/// The body is validated in full before the identity provider or store is
/// contacted, so a rejected update writes nothing.
#[utoipa::path(
    put,
    path = "/users/profile",
    request_body(
        content = Object,
        description = "Any of city, state, country, dob, picture, gender, username, full_name"
    ),
    tag = "Users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Updated rows, wrapped in `data`", body = [UserRow]),
        (status = 400, description = "Invalid profile property provided, or a blank name"),
        (status = 404, description = "No user found"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity or store request failed")
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<DataEnvelope<Vec<UserRow>>>, ApiError> {
    // Validate before touching any external service.
    let Value::Object(fields) = body else {
        return Err(ProfileUpdateError::Empty.into());
    };
    let update = ProfileUpdate::from_body(fields)?;

    let wallet = caller_wallet(&state, &user).await?;
    let rows = state.users.update_user(&wallet, &update).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("No user found"));
    }
    Ok(Json(DataEnvelope::new(rows)))
}

/// Store questionnaire answers and record their content id on the caller's row.
#[utoipa::path(
    post,
    path = "/users/responses",
    request_body = SubmitResponsesRequest,
    tag = "Users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Rows with the new response_hash, wrapped in `data`", body = [UserRow]),
        (status = 404, description = "No user found"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity, store or storage request failed")
    )
)]
pub async fn submit_responses(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<SubmitResponsesRequest>,
) -> Result<Json<DataEnvelope<Vec<UserRow>>>, ApiError> {
    let wallet = caller_wallet(&state, &user).await?;
    let row = registered_user(&state, &wallet).await?;

    let document = render_document(&request.responses);
    let cid = state
        .storage
        .upload_vectorized(&row.username, document, &state.group_id)
        .await?;
    let rows = state.users.set_response_hash(&wallet, &cid).await?;

    info!(user_id = row.id, %cid, answers = request.responses.len(), "responses stored");
    Ok(Json(DataEnvelope::new(rows)))
}

/// Issue a short-lived URL for uploading a profile picture.
#[utoipa::path(
    post,
    path = "/users/pfp",
    tag = "Users",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Signed upload URL valid for 30 seconds, wrapped in `data`", body = String),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Storage request failed")
    )
)]
pub async fn picture_upload_url(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<DataEnvelope<String>>, ApiError> {
    let url = state
        .storage
        .create_signed_upload_url(PICTURE_UPLOAD_TTL)
        .await?;
    Ok(Json(DataEnvelope::new(url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::models::WalletAddress;
    use crate::storage::VectorStorage;
    use crate::store::UserStore;
    use crate::test_support::TestHarness;
    use axum::http::StatusCode;
    use serde_json::json;

    const ALICE: &str = "did:privy:alice";

    fn auth(user_id: &str) -> Auth {
        Auth(AuthenticatedUser {
            user_id: user_id.to_string(),
            session_id: None,
            expires_at: 0,
        })
    }

    fn register_request(username: &str, full_name: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            full_name: Some(full_name.to_string()),
        }
    }

    fn harness_with_alice() -> TestHarness {
        let harness = TestHarness::new();
        harness.identity.link(ALICE, "0xalice");
        harness
    }

    #[tokio::test]
    async fn register_creates_row_for_linked_wallet() {
        let harness = harness_with_alice();
        let Json(envelope) = register(
            auth(ALICE),
            State(harness.state()),
            Json(register_request("alice", "Alice Liddell")),
        )
        .await
        .unwrap();

        assert_eq!(envelope.data.username, "alice");
        assert_eq!(envelope.data.wallet_address, WalletAddress::from("0xalice"));
        assert!(harness
            .store
            .user_by_wallet(&WalletAddress::from("0xalice"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn register_requires_both_names() {
        let harness = harness_with_alice();
        let err = register(
            auth(ALICE),
            State(harness.state()),
            Json(RegisterRequest {
                username: Some("alice".into()),
                full_name: Some("  ".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let harness = harness_with_alice();
        let request = || Json(register_request("alice", "Alice"));
        register(auth(ALICE), State(harness.state()), request())
            .await
            .unwrap();
        let err = register(auth(ALICE), State(harness.state()), request())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_without_linked_wallet_is_not_found() {
        let harness = TestHarness::new();
        let err = register(
            auth("did:privy:nobody"),
            State(harness.state()),
            Json(register_request("ghost", "Ghost")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_profile_returns_null_for_unregistered_wallet() {
        let harness = harness_with_alice();
        let Json(envelope) = get_profile(auth(ALICE), State(harness.state()))
            .await
            .unwrap();
        assert_eq!(envelope.data, None);
    }

    #[tokio::test]
    async fn update_profile_writes_allowed_fields() {
        let harness = harness_with_alice();
        register(
            auth(ALICE),
            State(harness.state()),
            Json(register_request("alice", "Alice")),
        )
        .await
        .unwrap();

        let Json(envelope) = update_profile(
            auth(ALICE),
            State(harness.state()),
            Json(json!({"city": "Lisbon", "gender": "female"})),
        )
        .await
        .unwrap();

        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].city.as_deref(), Some("Lisbon"));
        assert_eq!(envelope.data[0].gender.as_deref(), Some("female"));
    }

    #[tokio::test]
    async fn update_profile_rejects_disallowed_field_before_writing() {
        let harness = harness_with_alice();
        register(
            auth(ALICE),
            State(harness.state()),
            Json(register_request("alice", "Alice")),
        )
        .await
        .unwrap();

        let err = update_profile(
            auth(ALICE),
            State(harness.state()),
            Json(json!({"city": "Lisbon", "wallet_address": "0xmallory"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid profile property provided");

        let row = harness
            .store
            .user_by_wallet(&WalletAddress::from("0xalice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.city, None);
    }

    #[tokio::test]
    async fn update_profile_cannot_blank_required_names() {
        let harness = harness_with_alice();
        register(
            auth(ALICE),
            State(harness.state()),
            Json(register_request("alice", "Alice")),
        )
        .await
        .unwrap();

        let err = update_profile(
            auth(ALICE),
            State(harness.state()),
            Json(json!({"username": "", "full_name": null})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let row = harness
            .store
            .user_by_wallet(&WalletAddress::from("0xalice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.username, "alice");
        assert_eq!(row.full_name, "Alice");
    }

    #[tokio::test]
    async fn update_profile_for_unregistered_user_is_not_found() {
        let harness = harness_with_alice();
        let err = update_profile(
            auth(ALICE),
            State(harness.state()),
            Json(json!({"city": "Lisbon"})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn submit_responses_for_unknown_user_is_not_found() {
        let harness = harness_with_alice();
        let err = submit_responses(
            auth(ALICE),
            State(harness.state()),
            Json(SubmitResponsesRequest {
                responses: json!({"comfortFood": "Tacos"}).as_object().cloned().unwrap(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "No user found");
    }

    #[tokio::test]
    async fn submit_responses_stores_document_and_hash() {
        let harness = harness_with_alice();
        register(
            auth(ALICE),
            State(harness.state()),
            Json(register_request("alice", "Alice")),
        )
        .await
        .unwrap();

        let Json(envelope) = submit_responses(
            auth(ALICE),
            State(harness.state()),
            Json(SubmitResponsesRequest {
                responses: json!({"comfortFood": "Tacos", "funFact": null})
                    .as_object()
                    .cloned()
                    .unwrap(),
            }),
        )
        .await
        .unwrap();

        let cid = envelope.data[0].response_hash.clone().unwrap();
        let document = harness.storage.fetch_document(&cid).await.unwrap();
        assert_eq!(document, "comfortFood: Tacos\nfunFact: N/A\n");
    }

    #[tokio::test]
    async fn picture_upload_url_is_short_lived() {
        let harness = harness_with_alice();
        let Json(envelope) = picture_upload_url(auth(ALICE), State(harness.state()))
            .await
            .unwrap();
        assert!(envelope.data.contains("expires="));
    }
}
