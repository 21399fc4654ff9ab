// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Match Prover
//!
//! Decides whether two users constitute a match once one of them shows
//! interest. Handlers depend only on [`ProveCapability`]:
//!
//! - [`TactBinaryProver`] shells out to the `tact` proof binary and reads the
//!   `Is Match: <bool>` line it prints.
//! - [`MutualInterestProver`] answers in process from the likes table: a pair
//!   matches when each user has liked the other.

use async_trait::async_trait;

use crate::models::UserId;
use crate::store::StoreError;

pub mod binary;
pub mod mutual;

pub use binary::TactBinaryProver;
pub use mutual::MutualInterestProver;

/// Marker preceding the verdict in the proof binary's output.
pub const MATCH_MARKER: &str = "Is Match:";

/// Verdict for one `(user, target)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub is_match: bool,
    /// Human-readable trace of how the verdict was reached.
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProveError {
    #[error("failed to start prover: {0}")]
    Spawn(String),

    #[error("prover exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("prover timed out after {0}s")]
    TimedOut(u64),

    #[error("prover could not read likes: {0}")]
    Store(#[from] StoreError),
}

#[async_trait]
pub trait ProveCapability: Send + Sync {
    async fn prove(&self, user_id: UserId, target_id: UserId) -> Result<MatchResult, ProveError>;
}

/// Read the verdict from proof binary output.
///
/// The first line containing [`MATCH_MARKER`] decides. Only a literal `true`
/// after the marker counts as a match; anything else, including a missing
/// line, does not.
pub fn parse_match_output(stdout: &str) -> bool {
    stdout
        .lines()
        .find_map(|line| {
            line.split_once(MATCH_MARKER)
                .map(|(_, verdict)| verdict.trim() == "true")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_verdict() {
        let stdout = "Successfully generated proof!\nUser ID: 1\nTarget ID: 2\nIs Match: true\nResult verified correctly!\n";
        assert!(parse_match_output(stdout));
    }

    #[test]
    fn parses_negative_verdict() {
        let stdout = "User ID: 1\nTarget ID: 2\nIs Match: false\n";
        assert!(!parse_match_output(stdout));
    }

    #[test]
    fn missing_line_means_no_match() {
        assert!(!parse_match_output("Successfully generated proof!\n"));
        assert!(!parse_match_output(""));
    }

    #[test]
    fn first_verdict_line_wins() {
        assert!(!parse_match_output("Is Match: false\nIs Match: true\n"));
    }

    #[test]
    fn verdict_must_be_exactly_true() {
        assert!(parse_match_output("Is Match:    true   \r\n"));
        assert!(!parse_match_output("Is Match: untrue\n"));
        assert!(!parse_match_output("Is Match: true-ish\n"));
    }
}
