// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tact - Dating App Backend
//!
//! Authenticates users with Privy, keeps profiles in Supabase, embeds
//! questionnaire answers in a Pinata vector group for similarity matching,
//! and records interest between users behind a match prover.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Access token verification and wallet resolution (Privy)
//! - `store` - Users and likes tables (Supabase / in-memory)
//! - `storage` - Documents and vector search (Pinata / in-memory)
//! - `prover` - Match proof capability (`tact` binary / in-process)
//! - `seed` - Synthetic profile generation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod prover;
pub mod questionnaire;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
