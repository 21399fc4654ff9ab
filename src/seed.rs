// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Synthetic Profile Seeding
//!
//! Builds test profiles for the match index: a person fetched from a
//! randomuser-compatible API plus one random answer per questionnaire
//! question. Profiles are written as `<username>.json` and, when requested,
//! their answer documents are uploaded into the vector group.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::models::Cid;
use crate::questionnaire::{render_document, QUESTIONS};
use crate::storage::{StorageError, VectorStorage};

pub const DEFAULT_SOURCE_URL: &str = "https://randomuser.me/api/";

pub const GENDERS: &[&str] = &["Male", "Female", "Non-binary"];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("profile source request failed: {0}")]
    Request(String),
    #[error("profile source returned HTTP {status}")]
    Status { status: u16 },
    #[error("profile source returned no results")]
    NoResults,
    #[error("failed to write profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode profile: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to upload profile: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Deserialize)]
struct RandomUserResponse {
    #[serde(default)]
    results: Vec<RandomPerson>,
}

/// The subset of a randomuser.me result the seeder uses.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomPerson {
    pub name: PersonName,
    pub location: PersonLocation,
    pub login: PersonLogin,
    pub dob: PersonDob,
    pub picture: ProfilePicture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonLocation {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonLogin {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonDob {
    pub date: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePicture {
    pub large: String,
    pub thumbnail: String,
}

/// A seeded profile as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticProfile {
    pub gender: String,
    pub first_name: String,
    pub last_name: String,
    pub location: PersonLocation,
    pub username: String,
    pub dob: String,
    pub age: u32,
    pub picture: ProfilePicture,
    /// Questionnaire answers in question order.
    pub responses: Map<String, Value>,
    /// Set once the answers document has been uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_hash: Option<Cid>,
}

impl SyntheticProfile {
    pub fn new(person: RandomPerson, gender: &str, responses: Map<String, Value>) -> Self {
        Self {
            gender: gender.to_string(),
            first_name: person.name.first,
            last_name: person.name.last,
            location: person.location,
            username: person.login.username,
            dob: person.dob.date,
            age: person.dob.age,
            picture: person.picture,
            responses,
            response_hash: None,
        }
    }

    /// The document embedded for this profile.
    pub fn document(&self) -> String {
        render_document(&self.responses)
    }

    /// Upload the answers document into `group` and remember its cid.
    pub async fn upload(
        &mut self,
        storage: &dyn VectorStorage,
        group: &str,
    ) -> Result<&Cid, SeedError> {
        let cid = storage
            .upload_vectorized(&self.username, self.document(), group)
            .await?;
        Ok(self.response_hash.insert(cid))
    }
}

/// One random answer per question, in question order.
pub fn random_answers<R: Rng + ?Sized>(rng: &mut R) -> Map<String, Value> {
    QUESTIONS
        .iter()
        .filter_map(|question| {
            let answer = question.answers.choose(rng)?;
            Some((question.key.to_string(), Value::from(*answer)))
        })
        .collect()
}

pub fn random_gender<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    GENDERS.choose(rng).copied().unwrap_or("Non-binary")
}

/// Client for a randomuser-compatible person generator.
pub struct RandomUserClient {
    http: reqwest::Client,
    source_url: Url,
}

impl RandomUserClient {
    pub fn new(source_url: Url) -> Result<Self, SeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SeedError::Request(e.to_string()))?;
        Ok(Self { http, source_url })
    }

    fn person_url(&self, gender: &str) -> Url {
        let mut url = self.source_url.clone();
        // The generator only knows two genders; anything else gets a random person.
        let gender = gender.to_ascii_lowercase();
        if gender == "male" || gender == "female" {
            url.query_pairs_mut().append_pair("gender", &gender);
        }
        url
    }

    pub async fn fetch_person(&self, gender: &str) -> Result<RandomPerson, SeedError> {
        let response = self
            .http
            .get(self.person_url(gender))
            .send()
            .await
            .map_err(|e| SeedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::Status {
                status: status.as_u16(),
            });
        }

        let body: RandomUserResponse = response
            .json()
            .await
            .map_err(|e| SeedError::Request(e.to_string()))?;
        body.results.into_iter().next().ok_or(SeedError::NoResults)
    }
}

/// Write `profile` as `<dir>/<username>.json`.
pub async fn write_profile(dir: &Path, profile: &SyntheticProfile) -> Result<PathBuf, SeedError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.json", profile.username));
    tokio::fs::write(&path, serde_json::to_vec_pretty(profile)?).await?;
    Ok(path)
}
