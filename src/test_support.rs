// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for handler and extractor tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use crate::auth::test_keys::{TEST_APP_ID, TEST_PUBLIC_KEY};
use crate::auth::{
    AuthError, AuthenticatedUser, IdentityError, IdentityProvider, PrivyClient, PrivyConfig,
};
use crate::models::{UserId, WalletAddress};
use crate::prover::{MatchResult, MutualInterestProver, ProveCapability, ProveError};
use crate::state::AppState;
use crate::storage::InMemoryVectorStorage;
use crate::store::InMemoryStore;

pub const TEST_GROUP: &str = "test-group";

/// Verifies real tokens signed by the test key; wallets come from a table.
pub struct TestIdentity {
    verifier: PrivyClient,
    wallets: Mutex<HashMap<String, WalletAddress>>,
}

impl TestIdentity {
    pub fn new() -> Self {
        let verifier = PrivyClient::new(PrivyConfig {
            app_id: TEST_APP_ID.to_string(),
            app_secret: "secret".to_string(),
            verification_key: Some(TEST_PUBLIC_KEY.to_string()),
            api_url: Url::parse("https://auth.privy.io").unwrap(),
        })
        .unwrap();
        Self {
            verifier,
            wallets: Mutex::new(HashMap::new()),
        }
    }

    pub fn link(&self, user_id: &str, wallet: &str) {
        self.wallets
            .lock()
            .unwrap()
            .insert(user_id.to_string(), WalletAddress::from(wallet));
    }
}

#[async_trait]
impl IdentityProvider for TestIdentity {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.verifier.verify_token(token).await
    }

    async fn wallet_for(&self, user_id: &str) -> Result<Option<WalletAddress>, IdentityError> {
        Ok(self.wallets.lock().unwrap().get(user_id).cloned())
    }
}

/// Prover returning a fixed verdict and recording its calls.
pub struct ScriptedProver {
    verdict: bool,
    pub calls: Mutex<Vec<(UserId, UserId)>>,
}

impl ScriptedProver {
    pub fn new(verdict: bool) -> Self {
        Self {
            verdict,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProveCapability for ScriptedProver {
    async fn prove(&self, user_id: UserId, target_id: UserId) -> Result<MatchResult, ProveError> {
        self.calls.lock().unwrap().push((user_id, target_id));
        Ok(MatchResult {
            is_match: self.verdict,
            details: format!("Is Match: {}", self.verdict),
        })
    }
}

pub struct TestHarness {
    pub identity: Arc<TestIdentity>,
    pub store: Arc<InMemoryStore>,
    pub storage: Arc<InMemoryVectorStorage>,
    pub prover: Arc<dyn ProveCapability>,
}

impl TestHarness {
    /// In-memory collaborators with the in-process mutual interest prover.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            identity: Arc::new(TestIdentity::new()),
            prover: Arc::new(MutualInterestProver::new(store.clone())),
            store,
            storage: Arc::new(InMemoryVectorStorage::new()),
        }
    }

    pub fn with_prover(mut self, prover: Arc<dyn ProveCapability>) -> Self {
        self.prover = prover;
        self
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.identity.clone(),
            self.store.clone(),
            self.storage.clone(),
            self.prover.clone(),
            TEST_GROUP,
        )
    }
}
