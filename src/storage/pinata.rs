// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pinata private files, vectorization and signed URLs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use super::{StorageError, StorageResult, VectorMatch, VectorStorage};
use crate::models::Cid;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_UPLOADS_URL: &str = "https://uploads.pinata.cloud";

/// Lifetime of the signed link used to read a private document back.
const DOWNLOAD_LINK_TTL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct PinataConfig {
    pub jwt: String,
    /// Dedicated gateway domain, with or without scheme.
    pub gateway: String,
    pub api_url: Url,
    pub uploads_url: Url,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    jwt: String,
    gateway: Url,
    api_url: Url,
    uploads_url: Url,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct DataResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
    cid: Cid,
}

#[derive(Debug, Deserialize)]
struct VectorizeResponse {
    status: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> StorageResult<Self> {
        let gateway = gateway_url(&config.gateway)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            jwt: config.jwt,
            gateway,
            api_url: config.api_url,
            uploads_url: config.uploads_url,
            http,
        })
    }

    fn endpoint(base: &Url, path: &str) -> StorageResult<Url> {
        base.join(path)
            .map_err(|e| StorageError::Request(format!("invalid endpoint {path}: {e}")))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StorageResult<T> {
        let response = request
            .bearer_auth(&self.jwt)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }

    /// Gateway URL of a private file, to be signed before it can be read.
    fn private_file_url(&self, cid: &Cid) -> StorageResult<Url> {
        Self::endpoint(&self.gateway, &format!("files/{cid}"))
    }
}

#[async_trait]
impl VectorStorage for PinataClient {
    async fn upload_vectorized(
        &self,
        name: &str,
        contents: String,
        group: &str,
    ) -> StorageResult<Cid> {
        let file = Part::text(contents)
            .file_name(name.to_string())
            .mime_str("text/plain")
            .map_err(|e| StorageError::Request(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("name", name.to_string())
            .text("network", "private")
            .text("group_id", group.to_string());

        let url = Self::endpoint(&self.uploads_url, "v3/files")?;
        let uploaded: DataResponse<UploadedFile> =
            self.send(self.http.post(url).multipart(form)).await?;
        let file = uploaded.data;

        let url = Self::endpoint(&self.uploads_url, &format!("v3/vectorize/files/{}", file.id))?;
        let vectorized: VectorizeResponse = self.send(self.http.post(url)).await?;
        if !vectorized.status {
            return Err(StorageError::InvalidResponse(format!(
                "file {} was uploaded but not vectorized",
                file.id
            )));
        }

        info!(file_id = %file.id, cid = %file.cid, group, "uploaded and vectorized document");
        Ok(file.cid)
    }

    async fn fetch_document(&self, cid: &Cid) -> StorageResult<String> {
        let url = Self::endpoint(&self.api_url, "v3/files/private/download_link")?;
        let body = json!({
            "url": self.private_file_url(cid)?.as_str(),
            "expires": DOWNLOAD_LINK_TTL_SECS,
            "date": Utc::now().timestamp(),
            "method": "GET",
        });
        let link: DataResponse<String> = self.send(self.http.post(url).json(&body)).await?;

        let response = self
            .http
            .get(&link.data)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(cid.clone()));
        }
        let response = ensure_success(response).await?;
        response
            .text()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))
    }

    async fn query_vectors(&self, group: &str, query: &str) -> StorageResult<Vec<VectorMatch>> {
        let url = Self::endpoint(
            &self.uploads_url,
            &format!("v3/vectorize/groups/{group}/query"),
        )?;
        let result: DataResponse<QueryResult> = self
            .send(self.http.post(url).json(&json!({ "text": query })))
            .await?;
        debug!(group, hits = result.data.matches.len(), "vector query finished");
        Ok(result.data.matches)
    }

    async fn create_signed_upload_url(&self, expires: Duration) -> StorageResult<String> {
        let url = Self::endpoint(&self.uploads_url, "v3/files/sign")?;
        let body = json!({
            "date": Utc::now().timestamp(),
            "expires": expires.as_secs(),
        });
        let signed: DataResponse<String> = self.send(self.http.post(url).json(&body)).await?;
        Ok(signed.data)
    }
}

/// Accept `gw.example.com` as well as `https://gw.example.com/`.
fn gateway_url(gateway: &str) -> StorageResult<Url> {
    let gateway = gateway.trim().trim_end_matches('/');
    let with_scheme = if gateway.contains("://") {
        format!("{gateway}/")
    } else {
        format!("https://{gateway}/")
    };
    Url::parse(&with_scheme)
        .map_err(|e| StorageError::Request(format!("invalid PINATA_GATEWAY_URL: {e}")))
}

async fn ensure_success(response: Response) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PinataClient {
        PinataClient::new(PinataConfig {
            jwt: "jwt".into(),
            gateway: "tact.mypinata.cloud".into(),
            api_url: Url::parse(DEFAULT_API_URL).unwrap(),
            uploads_url: Url::parse(DEFAULT_UPLOADS_URL).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn gateway_url_adds_scheme_when_missing() {
        assert_eq!(
            gateway_url("tact.mypinata.cloud").unwrap().as_str(),
            "https://tact.mypinata.cloud/"
        );
        assert_eq!(
            gateway_url("https://tact.mypinata.cloud/").unwrap().as_str(),
            "https://tact.mypinata.cloud/"
        );
    }

    #[test]
    fn private_file_url_points_at_gateway() {
        let url = client().private_file_url(&Cid::from("bafkqa")).unwrap();
        assert_eq!(url.as_str(), "https://tact.mypinata.cloud/files/bafkqa");
    }

    #[test]
    fn endpoints_join_onto_base() {
        let url = PinataClient::endpoint(
            &Url::parse(DEFAULT_UPLOADS_URL).unwrap(),
            "v3/vectorize/groups/g-1/query",
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://uploads.pinata.cloud/v3/vectorize/groups/g-1/query"
        );
    }

    #[test]
    fn upload_response_parses() {
        let body = r#"{"data":{"id":"f-1","name":"sam","cid":"bafkqa","size":120,"mime_type":"text/plain","group_id":"g-1"}}"#;
        let parsed: DataResponse<UploadedFile> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.id, "f-1");
        assert_eq!(parsed.data.cid, Cid::from("bafkqa"));
    }

    #[test]
    fn query_response_parses_matches() {
        let body = r#"{"data":{"count":2,"matches":[{"file_id":"f-2","cid":"bafkqb","score":0.91},{"file_id":"f-3","cid":"bafkqc","score":0.72}]}}"#;
        let parsed: DataResponse<QueryResult> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.matches.len(), 2);
        assert_eq!(parsed.data.matches[0].cid, Cid::from("bafkqb"));
        assert!((parsed.data.matches[1].score - 0.72).abs() < f64::EPSILON);
    }

    #[test]
    fn query_response_without_matches_is_empty() {
        let parsed: DataResponse<QueryResult> =
            serde_json::from_str(r#"{"data":{"count":0}}"#).unwrap();
        assert!(parsed.data.matches.is_empty());
    }
}
