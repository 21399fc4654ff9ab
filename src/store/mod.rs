// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relational Store
//!
//! The `users` and `likes` tables live in a managed Postgres instance. Handlers
//! reach them through the [`UserStore`] port so the managed client can be
//! replaced by [`InMemoryStore`] for local runs and tests.
//!
//! ## Tables
//!
//! ```text
//! users(id, wallet_address UNIQUE, username UNIQUE, full_name, city, state,
//!       country, dob, gender, picture, response_hash, created_at)
//! likes(liker_id, likee_id, proven, UNIQUE(liker_id, likee_id))
//! ```
//!
//! ## Consistency
//!
//! - Recording a like is an upsert on `(liker_id, likee_id)` that never resets
//!   `proven`.
//! - Marking a pair proven updates both directions in one statement.
//! - Match enrichment resolves all cids with one query.

use async_trait::async_trait;

use crate::models::{Cid, LikeRow, NewUser, ProfileUpdate, UserId, UserRow, WalletAddress};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStore;
pub use supabase::{SupabaseConfig, SupabaseStore};

/// Errors surfaced by relational store adapters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("store request failed: {0}")]
    Request(String),

    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store response was invalid: {0}")]
    InvalidResponse(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Port to the relational store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a users row and return it with its generated columns.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow>;

    async fn user_by_wallet(&self, wallet: &WalletAddress) -> StoreResult<Option<UserRow>>;

    /// Apply an allow-listed update to the row keyed by `wallet`.
    ///
    /// Returns the updated rows; empty when no row matched.
    async fn update_user(
        &self,
        wallet: &WalletAddress,
        update: &ProfileUpdate,
    ) -> StoreResult<Vec<UserRow>>;

    async fn set_response_hash(
        &self,
        wallet: &WalletAddress,
        cid: &Cid,
    ) -> StoreResult<Vec<UserRow>>;

    /// Resolve many questionnaire documents to their owners in one call.
    async fn users_by_response_hashes(&self, cids: &[Cid]) -> StoreResult<Vec<UserRow>>;

    /// Record that `liker` is interested in `likee`.
    ///
    /// Idempotent: an existing like is returned unchanged.
    async fn record_like(&self, liker: UserId, likee: UserId) -> StoreResult<LikeRow>;

    /// Mark the likes in both directions between `a` and `b` as proven.
    async fn mark_mutually_proven(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>>;

    /// Likes in either direction between `a` and `b`.
    async fn likes_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>>;
}
