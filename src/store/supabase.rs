// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supabase (PostgREST) adapter for the relational store.
//!
//! All calls go to `{SUPABASE_URL}/rest/v1/{table}` with the service-role key
//! in both the `apikey` and bearer headers, and ask for the affected rows back
//! with `Prefer: return=representation`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use super::{StoreError, StoreResult, UserStore};
use crate::models::{Cid, LikeRow, NewUser, ProfileUpdate, UserId, UserRow, WalletAddress};

const USERS_TABLE: &str = "users";
const LIKES_TABLE: &str = "likes";
const RETURN_ROWS: &str = "return=representation";
const UPSERT_ROWS: &str = "resolution=merge-duplicates,return=representation";

/// Connection settings for the managed database.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct SupabaseStore {
    rest_url: Url,
    service_role_key: String,
    http: Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let rest_url = rest_base(&config.url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| StoreError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            rest_url,
            service_role_key: config.service_role_key,
            http,
        })
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| StoreError::Request(format!("invalid table url: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    fn users_where(&self, column: &str, filter: &str) -> StoreResult<Url> {
        let mut url = self.table_url(USERS_TABLE)?;
        url.query_pairs_mut()
            .append_pair(column, filter)
            .append_pair("select", "*");
        Ok(url)
    }

    fn likes_between_url(&self, a: UserId, b: UserId) -> StoreResult<Url> {
        let mut url = self.table_url(LIKES_TABLE)?;
        url.query_pairs_mut().append_pair("or", &pair_filter(a, b));
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Vec<T>> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        read_rows(response).await
    }

    async fn patch_users(&self, wallet: &WalletAddress, body: &Value) -> StoreResult<Vec<UserRow>> {
        let url = self.users_where("wallet_address", &eq_filter(wallet.as_str()))?;
        self.fetch(self.http.patch(url).header("Prefer", RETURN_ROWS).json(body))
            .await
    }
}

#[async_trait]
impl UserStore for SupabaseStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let url = self.table_url(USERS_TABLE)?;
        let rows: Vec<UserRow> = self
            .fetch(self.http.post(url).header("Prefer", RETURN_ROWS).json(&[user]))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("insert returned no rows".into()))
    }

    async fn user_by_wallet(&self, wallet: &WalletAddress) -> StoreResult<Option<UserRow>> {
        let url = self.users_where("wallet_address", &eq_filter(wallet.as_str()))?;
        let rows: Vec<UserRow> = self.fetch(self.http.get(url)).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_user(
        &self,
        wallet: &WalletAddress,
        update: &ProfileUpdate,
    ) -> StoreResult<Vec<UserRow>> {
        self.patch_users(wallet, &Value::Object(update.as_json().clone()))
            .await
    }

    async fn set_response_hash(
        &self,
        wallet: &WalletAddress,
        cid: &Cid,
    ) -> StoreResult<Vec<UserRow>> {
        self.patch_users(wallet, &json!({ "response_hash": cid }))
            .await
    }

    async fn users_by_response_hashes(&self, cids: &[Cid]) -> StoreResult<Vec<UserRow>> {
        if cids.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.users_where("response_hash", &in_filter(cids.iter().map(Cid::as_str)))?;
        debug!(count = cids.len(), "resolving match owners");
        self.fetch(self.http.get(url)).await
    }

    async fn record_like(&self, liker: UserId, likee: UserId) -> StoreResult<LikeRow> {
        let mut url = self.table_url(LIKES_TABLE)?;
        url.query_pairs_mut()
            .append_pair("on_conflict", "liker_id,likee_id");
        // `proven` is left out so an upsert never resets it.
        let body = json!([{ "liker_id": liker, "likee_id": likee }]);
        let rows: Vec<LikeRow> = self
            .fetch(self.http.post(url).header("Prefer", UPSERT_ROWS).json(&body))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidResponse("like upsert returned no rows".into()))
    }

    async fn mark_mutually_proven(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>> {
        let url = self.likes_between_url(a, b)?;
        self.fetch(
            self.http
                .patch(url)
                .header("Prefer", RETURN_ROWS)
                .json(&json!({ "proven": true })),
        )
        .await
    }

    async fn likes_between(&self, a: UserId, b: UserId) -> StoreResult<Vec<LikeRow>> {
        let url = self.likes_between_url(a, b)?;
        self.fetch(self.http.get(url)).await
    }
}

/// `https://x.supabase.co` → `https://x.supabase.co/rest/v1/`
fn rest_base(project_url: &Url) -> StoreResult<Url> {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("rest/v1/")
        .map_err(|e| StoreError::Request(format!("invalid SUPABASE_URL: {e}")))
}

fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

fn in_filter<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values
        .map(|value| format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Both directed rows between two users, as a PostgREST `or` filter.
fn pair_filter(a: UserId, b: UserId) -> String {
    format!("(and(liker_id.eq.{a},likee_id.eq.{b}),and(liker_id.eq.{b},likee_id.eq.{a}))")
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> StoreResult<Vec<T>> {
    let status = response.status();
    if status == StatusCode::CONFLICT {
        let body = response.text().await.unwrap_or_default();
        debug!(%body, "unique constraint rejected write");
        return Err(StoreError::Conflict(conflict_message(&body).to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| StoreError::InvalidResponse(e.to_string()))
}

/// Client-facing message for a PostgREST unique violation body.
fn conflict_message(body: &str) -> &'static str {
    let details = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("details").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default();

    if details.contains("(username)") {
        "Username already taken"
    } else {
        "User already registered"
    }
}
