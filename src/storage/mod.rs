// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # File Storage and Vector Index
//!
//! Questionnaire documents are uploaded privately into a group and embedded by
//! the storage provider. Matching is a similarity query against that group
//! using the caller's own document as the query text.
//!
//! Handlers only see the [`VectorStorage`] port:
//!
//! - [`PinataClient`] talks to the managed provider.
//! - [`InMemoryVectorStorage`] keeps documents in process and scores them by
//!   line overlap, for local runs and tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Cid;

pub mod memory;
pub mod pinata;

pub use memory::InMemoryVectorStorage;
pub use pinata::{PinataClient, PinataConfig};

/// Lifetime of the signed profile picture upload URL.
pub const PICTURE_UPLOAD_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(String),

    #[error("storage returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("storage response was invalid: {0}")]
    InvalidResponse(String),

    #[error("document {0} not found")]
    NotFound(Cid),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One hit of a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub file_id: String,
    pub cid: Cid,
    pub score: f64,
}

/// Port to file storage with vector search.
#[async_trait]
pub trait VectorStorage: Send + Sync {
    /// Upload `contents` as a private file named `name` into `group` and embed
    /// it. Returns the content identifier.
    async fn upload_vectorized(&self, name: &str, contents: String, group: &str)
        -> StorageResult<Cid>;

    async fn fetch_document(&self, cid: &Cid) -> StorageResult<String>;

    /// Documents of `group` nearest to `query`, best first.
    async fn query_vectors(&self, group: &str, query: &str) -> StorageResult<Vec<VectorMatch>>;

    /// A URL the client can upload one file to until `expires` elapses.
    async fn create_signed_upload_url(&self, expires: Duration) -> StorageResult<String>;
}
