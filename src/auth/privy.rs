// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Privy identity provider client.
//!
//! Token verification is local: the app verification key is either given
//! as a PEM or fetched from the app JWKS endpoint. Wallet lookup calls the
//! Privy user API with the app secret.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{
    AccessTokenClaims, AuthError, AuthenticatedUser, IdentityError, IdentityProvider, JwksManager,
};
use crate::models::WalletAddress;

pub const DEFAULT_API_URL: &str = "https://auth.privy.io";

/// Issuer of every Privy access token.
pub const PRIVY_ISSUER: &str = "privy.io";

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct PrivyConfig {
    pub app_id: String,
    pub app_secret: String,
    /// ES256 verification key in PEM form. JWKS is used when absent.
    pub verification_key: Option<String>,
    pub api_url: Url,
}

enum KeySource {
    Static(DecodingKey),
    Jwks(JwksManager),
}

pub struct PrivyClient {
    config: PrivyConfig,
    http: reqwest::Client,
    keys: KeySource,
}

impl PrivyClient {
    pub fn new(config: PrivyConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        let keys = match &config.verification_key {
            Some(pem) => {
                // Keys pasted into env files often carry literal `\n`.
                let pem = pem.replace("\\n", "\n");
                let key = DecodingKey::from_ec_pem(pem.as_bytes()).map_err(|e| {
                    AuthError::InternalError(format!("invalid verification key: {e}"))
                })?;
                KeySource::Static(key)
            }
            None => KeySource::Jwks(JwksManager::new(
                jwks_url(&config.api_url, &config.app_id),
                http.clone(),
            )),
        };

        Ok(Self { config, http, keys })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[PRIVY_ISSUER]);
        validation.set_audience(&[&self.config.app_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation
    }

    async fn decoding_key(&self, token: &str) -> Result<(DecodingKey, Algorithm), AuthError> {
        match &self.keys {
            KeySource::Static(key) => Ok((key.clone(), Algorithm::ES256)),
            KeySource::Jwks(jwks) => {
                let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
                match &header.kid {
                    Some(kid) => jwks.get_decoding_key(kid).await,
                    None => jwks.get_any_decoding_key().await,
                }
            }
        }
    }

    fn user_url(&self, user_id: &str) -> Result<Url, IdentityError> {
        let mut url = self.config.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| IdentityError::Request("identity API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["api", "v1", "users", user_id]);
        Ok(url)
    }
}

fn jwks_url(api_url: &Url, app_id: &str) -> String {
    format!(
        "{}/api/v1/apps/{}/jwks.json",
        api_url.as_str().trim_end_matches('/'),
        app_id
    )
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    }
}

#[derive(Debug, Deserialize)]
struct PrivyUser {
    #[serde(default)]
    linked_accounts: Vec<LinkedAccount>,
}

#[derive(Debug, Deserialize)]
struct LinkedAccount {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    owner_address: Option<String>,
}

/// Embedded or external wallet first, then the Farcaster custody address.
fn resolve_wallet(user: &PrivyUser) -> Option<WalletAddress> {
    let wallet = user
        .linked_accounts
        .iter()
        .filter(|account| account.kind == "wallet")
        .find_map(|account| account.address.clone());

    wallet
        .or_else(|| {
            user.linked_accounts
                .iter()
                .filter(|account| account.kind == "farcaster")
                .find_map(|account| account.owner_address.clone())
        })
        .map(WalletAddress)
}

#[async_trait]
impl IdentityProvider for PrivyClient {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let (key, algorithm) = self.decoding_key(token).await?;
        let data = decode::<AccessTokenClaims>(token, &key, &self.validation(algorithm))
            .map_err(map_jwt_error)?;
        Ok(AuthenticatedUser::from_claims(data.claims))
    }

    async fn wallet_for(&self, user_id: &str) -> Result<Option<WalletAddress>, IdentityError> {
        let response = self
            .http
            .get(self.user_url(user_id)?)
            .basic_auth(&self.config.app_id, Some(&self.config.app_secret))
            .header("privy-app-id", &self.config.app_id)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(user_id, "identity not found");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let user: PrivyUser = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
        Ok(resolve_wallet(&user))
    }

    async fn readiness(&self) -> Option<String> {
        let KeySource::Jwks(jwks) = &self.keys else {
            return None;
        };
        if jwks.is_cached().await {
            return None;
        }
        match jwks.refresh().await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "identity provider keys unavailable");
                Some(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_keys::{
        expired_token_for, sign, token_for, OTHER_PUBLIC_KEY, TEST_APP_ID, TEST_JWKS,
        TEST_PUBLIC_KEY,
    };
    use serde_json::json;

    fn config(verification_key: Option<&str>) -> PrivyConfig {
        PrivyConfig {
            app_id: TEST_APP_ID.to_string(),
            app_secret: "secret".to_string(),
            verification_key: verification_key.map(str::to_string),
            api_url: Url::parse(DEFAULT_API_URL).unwrap(),
        }
    }

    fn client() -> PrivyClient {
        PrivyClient::new(config(Some(TEST_PUBLIC_KEY))).unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let user = client().verify_token(&token_for("did:privy:alice")).await.unwrap();
        assert_eq!(user.user_id, "did:privy:alice");
        assert_eq!(user.session_id.as_deref(), Some("sess_1"));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let err = client()
            .verify_token(&expired_token_for("did:privy:alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn token_signed_by_other_key_is_rejected() {
        let client = PrivyClient::new(config(Some(OTHER_PUBLIC_KEY))).unwrap();
        let err = client
            .verify_token(&token_for("did:privy:alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[tokio::test]
    async fn audience_and_issuer_are_checked() {
        let now = chrono::Utc::now().timestamp();
        let wrong_aud = sign(
            json!({"sub": "did:privy:a", "iss": PRIVY_ISSUER, "aud": "other-app", "exp": now + 600}),
            None,
        );
        assert!(matches!(
            client().verify_token(&wrong_aud).await,
            Err(AuthError::InvalidAudience)
        ));

        let wrong_iss = sign(
            json!({"sub": "did:privy:a", "iss": "evil.io", "aud": TEST_APP_ID, "exp": now + 600}),
            None,
        );
        assert!(matches!(
            client().verify_token(&wrong_iss).await,
            Err(AuthError::InvalidIssuer)
        ));
    }

    #[tokio::test]
    async fn swapped_subject_breaks_signature() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let token = token_for("did:privy:alice");
        let parts: Vec<&str> = token.split('.').collect();
        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["sub"] = json!("did:privy:mallory");
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(claims.to_string()),
            parts[2]
        );

        assert!(matches!(
            client().verify_token(&forged).await,
            Err(AuthError::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        assert!(matches!(
            client().verify_token("not-a-jwt").await,
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn escaped_newlines_in_key_are_accepted() {
        let escaped = TEST_PUBLIC_KEY.replace('\n', "\\n");
        assert!(PrivyClient::new(config(Some(&escaped))).is_ok());
    }

    #[test]
    fn invalid_key_is_a_config_error() {
        assert!(matches!(
            PrivyClient::new(config(Some("not a pem"))),
            Err(AuthError::InternalError(_))
        ));
    }

    #[tokio::test]
    async fn jwks_keys_verify_tokens() {
        let client = PrivyClient::new(config(None)).unwrap();
        let KeySource::Jwks(jwks) = &client.keys else {
            panic!("expected JWKS key source");
        };
        assert_eq!(
            jwks.jwks_url(),
            "https://auth.privy.io/api/v1/apps/test-app/jwks.json"
        );
        jwks.prime(serde_json::from_str(TEST_JWKS).unwrap()).await;

        let user = client.verify_token(&token_for("did:privy:bob")).await.unwrap();
        assert_eq!(user.user_id, "did:privy:bob");
        assert_eq!(client.readiness().await, None);
    }

    #[test]
    fn user_url_keeps_did_in_one_segment() {
        let url = client().user_url("did:privy:abc").unwrap();
        assert_eq!(url.as_str(), "https://auth.privy.io/api/v1/users/did:privy:abc");
    }

    #[test]
    fn wallet_account_wins_over_farcaster() {
        let user: PrivyUser = serde_json::from_value(json!({
            "id": "did:privy:abc",
            "linked_accounts": [
                {"type": "email", "address": "a@example.com"},
                {"type": "farcaster", "fid": 7, "owner_address": "0xfarcaster"},
                {"type": "wallet", "address": "0xwallet", "chain_type": "ethereum"}
            ]
        }))
        .unwrap();
        assert_eq!(resolve_wallet(&user), Some(WalletAddress::from("0xwallet")));
    }

    #[test]
    fn farcaster_owner_is_the_fallback() {
        let user: PrivyUser = serde_json::from_value(json!({
            "linked_accounts": [{"type": "farcaster", "owner_address": "0xfarcaster"}]
        }))
        .unwrap();
        assert_eq!(resolve_wallet(&user), Some(WalletAddress::from("0xfarcaster")));
    }

    #[test]
    fn no_linked_wallet_resolves_to_none() {
        let user: PrivyUser =
            serde_json::from_value(json!({"linked_accounts": [{"type": "email", "address": "a@b.c"}]}))
                .unwrap();
        assert_eq!(resolve_wallet(&user), None);
    }
}
