// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{AuthError, IdentityProvider, PrivyClient};
use crate::config::{Config, ProverConfig};
use crate::prover::{MutualInterestProver, ProveCapability, TactBinaryProver};
use crate::storage::{InMemoryVectorStorage, PinataClient, StorageError, VectorStorage};
use crate::store::{InMemoryStore, StoreError, SupabaseStore, UserStore};

/// External collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub users: Arc<dyn UserStore>,
    pub storage: Arc<dyn VectorStorage>,
    pub prover: Arc<dyn ProveCapability>,
    /// Vector group questionnaire documents live in.
    pub group_id: Arc<str>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("identity provider: {0}")]
    Identity(#[from] AuthError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn VectorStorage>,
        prover: Arc<dyn ProveCapability>,
        group_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            identity,
            users,
            storage,
            prover,
            group_id: group_id.into(),
        }
    }

    /// Wire real clients where credentials are configured and in-memory
    /// fallbacks elsewhere.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let identity: Arc<dyn IdentityProvider> = Arc::new(PrivyClient::new(config.privy.clone())?);

        let users: Arc<dyn UserStore> = match &config.supabase {
            Some(supabase) => {
                info!(url = %supabase.url, "using Supabase store");
                Arc::new(SupabaseStore::new(supabase.clone())?)
            }
            None => {
                warn!("SUPABASE_URL not set, using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        };

        let storage: Arc<dyn VectorStorage> = match &config.pinata {
            Some(pinata) => {
                info!(gateway = %pinata.gateway, "using Pinata storage");
                Arc::new(PinataClient::new(pinata.clone())?)
            }
            None => {
                warn!("PINATA_JWT not set, using in-memory storage");
                Arc::new(InMemoryVectorStorage::new())
            }
        };

        let prover: Arc<dyn ProveCapability> = match &config.prover {
            ProverConfig::Binary { path, timeout } => {
                info!(binary = %path.display(), timeout_secs = timeout.as_secs(), "using proof binary");
                Arc::new(TactBinaryProver::new(path.clone()).with_timeout(*timeout))
            }
            ProverConfig::InProcess => {
                warn!("TACT_PROVER_BIN not set, using in-process mutual interest prover");
                Arc::new(MutualInterestProver::new(users.clone()))
            }
        };

        Ok(Self::new(
            identity,
            users,
            storage,
            prover,
            config.group_id.as_str(),
        ))
    }
}
