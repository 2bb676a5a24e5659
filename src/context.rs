//! GitHub Actions run context.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::Repo;

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<EventPullRequest>,
}

#[derive(Debug, Deserialize)]
struct EventPullRequest {
    number: u64,
}

/// The repository and (optionally) pull request a run is acting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub repo: Repo,
    pub pull_request: Option<u64>,
}

impl RunContext {
    pub fn new(repo: Repo, pull_request: Option<u64>) -> Self {
        Self { repo, pull_request }
    }

    pub fn from_event_file(repo: Repo, path: &Path) -> Result<Self> {
        let payload = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload '{}'", path.display()))?;
        Self::from_event_payload(repo, &payload)
    }

    /// Takes the pull request number from a webhook event payload. Events
    /// other than `pull_request`/`pull_request_target` carry none.
    pub fn from_event_payload(repo: Repo, payload: &str) -> Result<Self> {
        let event: EventPayload =
            serde_json::from_str(payload).context("Failed to parse event payload")?;
        Ok(Self::new(repo, event.pull_request.map(|pr| pr.number)))
    }
}
