// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Match endpoints.
//!
//! Matching is a similarity query over the questionnaire group. Interest is
//! recorded as a directed like, and a positive proof marks the pair as a match.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{debug, info};

use super::{caller_wallet, registered_user};
use crate::{
    auth::Auth,
    error::ApiError,
    models::{Cid, DataEnvelope, InterestResponse, MatchSummary, UserRow, WalletAddress},
    state::AppState,
    storage::VectorMatch,
};

/// List profiles similar to the caller's answers, best first.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "Matches",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Similar profiles, best first, wrapped in `data`", body = [MatchSummary]),
        (status = 404, description = "No user found, or no responses submitted yet"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity, store or storage request failed")
    )
)]
pub async fn list_matches(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<DataEnvelope<Vec<MatchSummary>>>, ApiError> {
    let wallet = caller_wallet(&state, &user).await?;
    let me = registered_user(&state, &wallet).await?;
    let Some(own_cid) = me.response_hash.clone() else {
        return Err(ApiError::not_found("No responses submitted"));
    };

    let document = state.storage.fetch_document(&own_cid).await?;
    let hits = state
        .storage
        .query_vectors(&state.group_id, &document)
        .await?;
    let hits = distinct_hits(hits);

    let cids: Vec<Cid> = hits
        .iter()
        .map(|hit| hit.cid.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let owners = state.users.users_by_response_hashes(&cids).await?;

    let matches = summarize(hits, owners, &me);
    debug!(user_id = me.id, matches = matches.len(), "matches resolved");
    Ok(Json(DataEnvelope::new(matches)))
}

/// First hit per indexed file, in index order.
///
/// Cids are content addresses, so two users with identical answers share
/// one. Only the file id is unique per upload.
fn distinct_hits(hits: Vec<VectorMatch>) -> Vec<VectorMatch> {
    let mut seen = HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.file_id.clone()))
        .collect()
}

/// One summary per owner of each hit, best hit first.
///
/// Hits without an owner are dropped, as is the caller, matched by id or
/// username.
fn summarize(hits: Vec<VectorMatch>, owners: Vec<UserRow>, me: &UserRow) -> Vec<MatchSummary> {
    let mut by_cid: HashMap<Cid, Vec<UserRow>> = HashMap::new();
    for row in owners {
        if let Some(cid) = row.response_hash.clone() {
            by_cid.entry(cid).or_default().push(row);
        }
    }

    let mut emitted = HashSet::new();
    let mut matches = Vec::new();
    for hit in hits {
        let Some(rows) = by_cid.get(&hit.cid) else {
            continue;
        };
        for owner in rows {
            if owner.id == me.id || owner.username == me.username || !emitted.insert(owner.id) {
                continue;
            }
            matches.push(MatchSummary {
                cid: hit.cid.clone(),
                file_id: hit.file_id.clone(),
                score: hit.score,
                username: owner.username.clone(),
                picture: owner.picture.clone(),
            });
        }
    }
    matches
}

/// Record interest in another user and prove whether it is mutual.
#[utoipa::path(
    post,
    path = "/matches/{wallet}",
    params(
        ("wallet" = String, Path, description = "Wallet address of the user the caller is interested in")
    ),
    tag = "Matches",
    security(("auth_token" = [])),
    responses(
        (status = 200, description = "Proof outcome, wrapped in `data`", body = InterestResponse),
        (status = 400, description = "Caller and target are the same user"),
        (status = 404, description = "Caller or target not registered"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 500, description = "Identity, store or prover request failed")
    )
)]
pub async fn express_interest(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(target_wallet): Path<String>,
) -> Result<Json<DataEnvelope<InterestResponse>>, ApiError> {
    let wallet = caller_wallet(&state, &user).await?;
    let me = registered_user(&state, &wallet).await?;
    let target = state
        .users
        .user_by_wallet(&WalletAddress::from(target_wallet))
        .await?
        .ok_or_else(|| ApiError::not_found("No match found"))?;

    if target.id == me.id {
        return Err(ApiError::bad_request("Cannot express interest in yourself"));
    }

    state.users.record_like(me.id, target.id).await?;
    let result = state.prover.prove(me.id, target.id).await?;
    if result.is_match {
        state.users.mark_mutually_proven(me.id, target.id).await?;
    }

    info!(
        user_id = me.id,
        target_id = target.id,
        is_match = result.is_match,
        "interest recorded"
    );
    Ok(Json(DataEnvelope::new(InterestResponse {
        user_id: me.id,
        target_id: target.id,
        is_match: result.is_match,
    })))
}
