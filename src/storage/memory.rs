// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process document store with line-overlap similarity.
//!
//! Content identifiers are derived from the document text, so identical
//! documents share a cid the way they do on IPFS. File ids stay unique per
//! upload.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StorageError, StorageResult, VectorMatch, VectorStorage};
use crate::models::Cid;

struct StoredDocument {
    file_id: String,
    cid: Cid,
    group: String,
    contents: String,
}

#[derive(Default)]
pub struct InMemoryVectorStorage {
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryVectorStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lines(text: &str) -> HashSet<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn content_id(contents: &str) -> Cid {
    Cid(format!(
        "mem-{}",
        Uuid::new_v5(&Uuid::NAMESPACE_OID, contents.as_bytes()).simple()
    ))
}

/// Jaccard index of the two documents' non-empty lines.
fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (lines(a), lines(b));
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[async_trait]
impl VectorStorage for InMemoryVectorStorage {
    async fn upload_vectorized(
        &self,
        _name: &str,
        contents: String,
        group: &str,
    ) -> StorageResult<Cid> {
        let cid = content_id(&contents);
        self.documents.write().await.push(StoredDocument {
            file_id: Uuid::new_v4().to_string(),
            cid: cid.clone(),
            group: group.to_string(),
            contents,
        });
        Ok(cid)
    }

    async fn fetch_document(&self, cid: &Cid) -> StorageResult<String> {
        self.documents
            .read()
            .await
            .iter()
            .find(|document| &document.cid == cid)
            .map(|document| document.contents.clone())
            .ok_or_else(|| StorageError::NotFound(cid.clone()))
    }

    async fn query_vectors(&self, group: &str, query: &str) -> StorageResult<Vec<VectorMatch>> {
        let documents = self.documents.read().await;
        let mut matches: Vec<VectorMatch> = documents
            .iter()
            .filter(|document| document.group == group)
            .map(|document| VectorMatch {
                file_id: document.file_id.clone(),
                cid: document.cid.clone(),
                score: similarity(query, &document.contents),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(matches)
    }

    async fn create_signed_upload_url(&self, expires: Duration) -> StorageResult<String> {
        Ok(format!(
            "memory://uploads/{}?expires={}",
            Uuid::new_v4(),
            expires.as_secs()
        ))
    }
}
