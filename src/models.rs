// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the rows exchanged with the relational store and the
//! request and response bodies of the REST API. Types that cross the HTTP
//! boundary derive `ToSchema` for OpenAPI documentation.
//!
//! ## Identity Keys
//!
//! - [`WalletAddress`] keys a users row. It comes from the identity provider,
//!   never from the request body.
//! - [`UserId`] is the numeric primary key used by likes and the prover.
//! - [`Cid`] identifies a questionnaire document in file storage.
//!
//! ## Envelope
//!
//! Every successful response is wrapped in [`DataEnvelope`] (`{"data": ...}`),
//! which is what the mobile client reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Numeric primary key of a users row.
pub type UserId = i64;

// =============================================================================
// Identity Types
// =============================================================================

/// Wallet address linked to an identity.
///
/// The users table is keyed by this value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

/// Content identifier returned by file storage on upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cid(pub String);

impl Cid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Cid {
    fn from(value: String) -> Self {
        Cid(value)
    }
}

impl From<&str> for Cid {
    fn from(value: &str) -> Self {
        Cid(value.to_string())
    }
}

// =============================================================================
// Store Rows
// =============================================================================

/// A row of the `users` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub wallet_address: WalletAddress,
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    /// Cid of the stored questionnaire document.
    #[serde(default)]
    pub response_hash: Option<Cid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Columns written when a user registers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub wallet_address: WalletAddress,
}

/// A row of the `likes` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LikeRow {
    pub liker_id: UserId,
    pub likee_id: UserId,
    #[serde(default)]
    pub proven: bool,
}

// =============================================================================
// Profile Updates
// =============================================================================

/// Columns a user may change through `PUT /users/profile`.
pub const PROFILE_FIELDS: &[&str] = &[
    "city",
    "state",
    "country",
    "dob",
    "picture",
    "gender",
    "username",
    "full_name",
];

/// Allow-listed columns that can never be blank or null.
pub const REQUIRED_PROFILE_FIELDS: &[&str] = &["username", "full_name"];

/// Reasons a profile update body is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileUpdateError {
    #[error("no profile properties provided")]
    Empty,
    #[error("profile property `{0}` is not allowed")]
    UnknownField(String),
    #[error("profile property `{0}` must be a string or null")]
    InvalidValue(String),
    #[error("profile property `{0}` cannot be blank")]
    Blank(String),
}

/// An allow-listed set of column updates.
///
/// Only constructed through [`ProfileUpdate::from_body`], so every key is in
/// [`PROFILE_FIELDS`] and every value is a string or null. Fields in
/// [`REQUIRED_PROFILE_FIELDS`] always carry a non-blank string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    fields: Map<String, Value>,
}

impl ProfileUpdate {
    /// Validate a raw request body.
    pub fn from_body(body: Map<String, Value>) -> Result<Self, ProfileUpdateError> {
        if body.is_empty() {
            return Err(ProfileUpdateError::Empty);
        }

        for (key, value) in &body {
            if !PROFILE_FIELDS.contains(&key.as_str()) {
                return Err(ProfileUpdateError::UnknownField(key.clone()));
            }
            if !(value.is_string() || value.is_null()) {
                return Err(ProfileUpdateError::InvalidValue(key.clone()));
            }
            let blank = value.as_str().is_none_or(|text| text.trim().is_empty());
            if REQUIRED_PROFILE_FIELDS.contains(&key.as_str()) && blank {
                return Err(ProfileUpdateError::Blank(key.clone()));
            }
        }

        Ok(Self { fields: body })
    }

    /// Iterate over `(column, value)` pairs. `None` clears the column.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The update as a JSON object, ready to be sent to the store.
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.fields
    }
}

// =============================================================================
// Request Models
// =============================================================================

/// Request to register the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "fullName")]
    pub full_name: Option<String>,
}

/// Questionnaire answers keyed by question.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponsesRequest {
    /// Answers in the order they were given. Null answers render as `N/A`.
    #[schema(value_type = Object)]
    pub responses: Map<String, Value>,
}

// =============================================================================
// Response Models
// =============================================================================

/// Success envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A similar profile returned by `GET /matches`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MatchSummary {
    pub cid: Cid,
    pub file_id: String,
    /// Similarity in `[0, 1]`.
    pub score: f64,
    pub username: String,
    pub picture: Option<String>,
}

/// Outcome of `POST /matches/{wallet}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct InterestResponse {
    pub user_id: UserId,
    pub target_id: UserId,
    pub is_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn profile_update_accepts_allowed_fields() {
        let update = ProfileUpdate::from_body(body(json!({
            "city": "Austin",
            "gender": null,
        })))
        .expect("valid update");

        let pairs: Vec<_> = update.iter().collect();
        assert_eq!(pairs, vec![("city", Some("Austin")), ("gender", None)]);
    }

    #[test]
    fn profile_update_rejects_unknown_field() {
        let err = ProfileUpdate::from_body(body(json!({
            "city": "Austin",
            "wallet_address": "0xabc",
        })))
        .unwrap_err();
        assert_eq!(err, ProfileUpdateError::UnknownField("wallet_address".into()));
    }

    #[test]
    fn profile_update_rejects_non_string_values() {
        let err = ProfileUpdate::from_body(body(json!({ "dob": 1990 }))).unwrap_err();
        assert_eq!(err, ProfileUpdateError::InvalidValue("dob".into()));
    }

    #[test]
    fn profile_update_rejects_blank_or_null_names() {
        for value in [json!(""), json!("   "), Value::Null] {
            let err = ProfileUpdate::from_body(body(json!({ "username": value.clone() }))).unwrap_err();
            assert_eq!(err, ProfileUpdateError::Blank("username".into()));

            let err = ProfileUpdate::from_body(body(json!({ "full_name": value }))).unwrap_err();
            assert_eq!(err, ProfileUpdateError::Blank("full_name".into()));
        }

        let update = ProfileUpdate::from_body(body(json!({ "username": "sam" }))).unwrap();
        assert_eq!(update.iter().collect::<Vec<_>>(), vec![("username", Some("sam"))]);
    }

    #[test]
    fn profile_update_rejects_empty_body() {
        assert_eq!(
            ProfileUpdate::from_body(Map::new()).unwrap_err(),
            ProfileUpdateError::Empty
        );
    }

    #[test]
    fn register_request_reads_camel_case_full_name() {
        let request: RegisterRequest =
            serde_json::from_value(json!({ "username": "sam", "fullName": "Sam Lee" })).unwrap();
        assert_eq!(request.username.as_deref(), Some("sam"));
        assert_eq!(request.full_name.as_deref(), Some("Sam Lee"));
    }

    #[test]
    fn user_row_tolerates_missing_optional_columns() {
        let row: UserRow = serde_json::from_value(json!({
            "id": 7,
            "wallet_address": "0xabc",
            "username": "sam",
            "full_name": "Sam Lee",
        }))
        .unwrap();
        assert_eq!(row.id, 7);
        assert!(row.response_hash.is_none());
        assert!(row.created_at.is_none());
    }
}
