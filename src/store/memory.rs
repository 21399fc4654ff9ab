// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store.
//!
//! Used when no managed database is configured, and as the store in handler
//! tests. Enforces the same unique constraints as the real tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{Cid, LikeRow, NewUser, ProfileUpdate, UserId, UserRow, WalletAddress};

#[derive(Default)]
struct Tables {
    next_id: UserId,
    users: HashMap<UserId, UserRow>,
    likes: HashMap<(UserId, UserId), LikeRow>,
}

impl Tables {
    fn by_wallet_mut(&mut self, wallet: &WalletAddress) -> Option<&mut UserRow> {
        self.users
            .values_mut()
            .find(|user| &user.wallet_address == wallet)
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.username == username && Some(user.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_update(user: &mut UserRow, update: &ProfileUpdate) {
    for (column, value) in update.iter() {
        let value = value.map(str::to_string);
        match column {
            "city" => user.city = value,
            "state" => user.state = value,
            "country" => user.country = value,
            "dob" => user.dob = value,
            "gender" => user.gender = value,
            "picture" => user.picture = value,
            // Validation guarantees a value for the NOT NULL columns.
            "username" => user.username = value.unwrap_or_default(),
            "full_name" => user.full_name = value.unwrap_or_default(),
            _ => {}
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|row| row.wallet_address == user.wallet_address)
        {
            return Err(StoreError::Conflict("User already registered".into()));
        }
        if tables.username_taken(&user.username, None) {
            return Err(StoreError::Conflict("Username already taken".into()));
        }

        tables.next_id += 1;
        let row = UserRow {
            id: tables.next_id,
            wallet_address: user.wallet_address,
            username: user.username,
            full_name: user.full_name,
            created_at: Some(Utc::now()),
            ..UserRow::default()
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn user_by_wallet(&self, wallet: &WalletAddress) -> StoreResult<Option<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| &user.wallet_address == wallet)
            .cloned())
    }

    async fn update_user(
        &self,
        wallet: &WalletAddress,
        update: &ProfileUpdate,
    ) -> StoreResult<Vec<UserRow>> {
        let mut tables = self.tables.write().await;

        let Some(id) = tables.by_wallet_mut(wallet).map(|user| user.id) else {
            return Ok(Vec::new());
        };

        let new_username = update
            .iter()
            .find(|(column, _)| *column == "username")
            .and_then(|(_, value)| value);
        if let Some(username) = new_username {
            if tables.username_taken(username, Some(id)) {
                return Err(StoreError::Conflict("Username already taken".into()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(Vec::new());
        };
        apply_update(user, update);
        Ok(vec![user.clone()])
    }

    async fn set_response_hash(
        &self,
        wallet: &WalletAddress,
        cid: &Cid,
    ) -> StoreResult<Vec<UserRow>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .by_wallet_mut(wallet)
            .map(|user| {
                user.response_hash = Some(cid.clone());
                vec![user.clone()]
            })
            .unwrap_or_default())
    }

    async fn users_by_response_hashes(&self, cids: &[Cid]) -> StoreResult<Vec<UserRow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .filter(|user| {
                user.response_hash
                    .as_ref()
                    .is_some_and(|hash| cids.contains(hash))
            })
            .cloned()
            .collect())
    }

    async fn record_like(&self, liker: UserId, likee: UserId) -> StoreResult<LikeRow> {
        let mut tables = self.tables.write().await;
        let like = tables
            .likes
            .entry((liker, likee))
            .or_insert_with(|| LikeRow {
                liker_id: liker,
                likee_id: likee,
                proven: false,
            });
        Ok(like.clone())
    }

    async fn mark_mutually_proven(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>> {
        // Both directions change under one write lock.
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        for key in [(a, b), (b, a)] {
            if let Some(like) = tables.likes.get_mut(&key) {
                like.proven = true;
                updated.push(like.clone());
            }
        }
        Ok(updated)
    }

    async fn likes_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>> {
        let tables = self.tables.read().await;
        Ok([(a, b), (b, a)]
            .iter()
            .filter_map(|key| tables.likes.get(key).cloned())
            .collect())
    }
}
