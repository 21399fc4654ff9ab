// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Runs the `tact` proof binary as a child process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use super::{parse_match_output, MatchResult, ProveCapability, ProveError};
use crate::models::UserId;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct TactBinaryProver {
    binary: PathBuf,
    timeout: Duration,
}

impl TactBinaryProver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, user_id: UserId, target_id: UserId) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--prove")
            .arg("--user-id")
            .arg(user_id.to_string())
            .arg("--target-id")
            .arg(target_id.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ProveCapability for TactBinaryProver {
    async fn prove(&self, user_id: UserId, target_id: UserId) -> Result<MatchResult, ProveError> {
        info!(user_id, target_id, binary = %self.binary.display(), "running match prover");

        let child = self
            .command(user_id, target_id)
            .spawn()
            .map_err(|e| ProveError::Spawn(e.to_string()))?;

        // Dropping the future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProveError::TimedOut(self.timeout.as_secs()))?
            .map_err(|e| ProveError::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ProveError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            warn!(user_id, target_id, %stderr, "match prover wrote to stderr");
        }

        let is_match = parse_match_output(&stdout);
        info!(user_id, target_id, is_match, "match prover finished");
        Ok(MatchResult {
            is_match,
            details: stdout,
        })
    }
}
