// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process prover backed by the likes table.

use std::sync::Arc;

use async_trait::async_trait;

use super::{MatchResult, ProveCapability, ProveError};
use crate::models::UserId;
use crate::store::UserStore;

pub struct MutualInterestProver {
    store: Arc<dyn UserStore>,
}

impl MutualInterestProver {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProveCapability for MutualInterestProver {
    async fn prove(&self, user_id: UserId, target_id: UserId) -> Result<MatchResult, ProveError> {
        let likes = self.store.likes_between(user_id, target_id).await?;
        let likes_target = likes
            .iter()
            .any(|like| like.liker_id == user_id && like.likee_id == target_id);
        let liked_back = likes
            .iter()
            .any(|like| like.liker_id == target_id && like.likee_id == user_id);
        let is_match = likes_target && liked_back;

        Ok(MatchResult {
            is_match,
            details: format!("User ID: {user_id}\nTarget ID: {target_id}\nIs Match: {is_match}\n"),
        })
    }
}
