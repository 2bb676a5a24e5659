//! Pull request loading and conditional labeling.
//!
//! A run first builds a [`PullRequestRequest`] from its context, which only
//! succeeds for pull request events. Loading the request yields an immutable
//! [`PullRequest`] snapshot; labels added afterwards are written to the forge
//! but not reflected back into the snapshot.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    context::RunContext,
    types::{
        Condition, ConditionalLabel, FileConditionTarget, FilesChanged, Forge, Label, Repo,
    },
};

/// Identifies the pull request a run will load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRequest {
    pub repo: Repo,
    pub number: u64,
}

impl PullRequestRequest {
    pub fn new(repo: Repo, number: u64) -> Self {
        Self { repo, number }
    }

    /// Fails when the run was not triggered by a pull request.
    pub fn from_context(ctx: &RunContext) -> Result<Self> {
        let number = ctx.pull_request.ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot label a pull request: the run context for {} has no associated pull request",
                ctx.repo
            )
        })?;
        Ok(Self::new(ctx.repo.clone(), number))
    }

    /// Fetches metadata, commits and changed files for the pull request.
    pub async fn load<F>(&self, forge: &F) -> Result<PullRequest>
    where
        F: Forge + Sync,
    {
        let metadata = forge
            .get_pull_request(self.number)
            .await
            .with_context(|| format!("Failed to fetch pull request #{}", self.number))?;

        let commits = forge
            .list_pull_request_commits(self.number)
            .await
            .with_context(|| format!("Failed to list commits of pull request #{}", self.number))?;

        let files = forge
            .list_pull_request_files(self.number)
            .await
            .with_context(|| format!("Failed to list files of pull request #{}", self.number))?;

        // Author is whoever committed first, not the PR opener.
        let author = commits.first().and_then(|c| c.committer_login.clone());

        let pr = PullRequest {
            repo: self.repo.clone(),
            number: self.number,
            title: metadata.title,
            body: metadata.body.unwrap_or_default(),
            author,
            lines_changed: metadata.additions + metadata.deletions,
            files_changed: FilesChanged {
                quantity: metadata.changed_files,
                files,
            },
            labels: metadata.labels,
            mergeable: metadata.mergeable.unwrap_or(false),
            rebaseable: metadata.rebaseable.unwrap_or(false),
        };

        debug!(
            pr = pr.number,
            lines_changed = pr.lines_changed,
            files_changed = pr.files_changed.quantity,
            author = ?pr.author,
            first_commit = commits.first().map(|c| c.sha.as_str()),
            "Loaded pull request"
        );

        Ok(pr)
    }
}

/// Snapshot of a pull request as loaded at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub repo: Repo,
    pub number: u64,
    pub title: String,
    pub body: String,
    pub author: Option<String>,
    pub lines_changed: u64,
    pub files_changed: FilesChanged,
    pub labels: Vec<Label>,
    pub mergeable: bool,
    pub rebaseable: bool,
}

impl PullRequest {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.matches_name(name))
    }

    /// Attaches `label` by name. The forge decides what happens to names it
    /// does not know.
    pub async fn add_label<F>(&self, forge: &F, label: &Label) -> Result<()>
    where
        F: Forge + Sync,
    {
        forge
            .add_labels(self.number, std::slice::from_ref(&label.name))
            .await
            .with_context(|| {
                format!(
                    "Failed to add label '{}' to pull request #{}",
                    label.name, self.number
                )
            })?;
        info!(pr = self.number, label = %label.name, "Added label");
        Ok(())
    }

    pub fn check_condition(&self, condition: &Condition, target: FileConditionTarget) -> bool {
        let files_metric = match target {
            FileConditionTarget::LinesChanged => self.lines_changed,
            FileConditionTarget::FilesChanged => self.files_changed.quantity,
        };

        match *condition {
            Condition::MaxLines(max) => self.lines_changed < max,
            Condition::MinLines(min) => self.lines_changed >= min,
            Condition::MaxFiles(max) => files_metric < max,
            Condition::MinFiles(min) => files_metric >= min,
        }
    }

    pub fn matches(&self, rule: &ConditionalLabel, target: FileConditionTarget) -> bool {
        rule.conditions.iter().all(|condition| {
            let holds = self.check_condition(condition, target);
            debug!(label = %rule.label.name, %condition, holds, "Evaluated condition");
            holds
        })
    }

    /// Adds the label of every rule whose conditions all hold and returns
    /// the names added, in rule order.
    pub async fn apply<F>(
        &self,
        forge: &F,
        rules: &[ConditionalLabel],
        target: FileConditionTarget,
    ) -> Result<Vec<String>>
    where
        F: Forge + Sync,
    {
        let mut applied = Vec::new();
        for rule in rules {
            if self.matches(rule, target) {
                self.add_label(forge, &rule.label).await?;
                applied.push(rule.label.name.clone());
            }
        }
        Ok(applied)
    }
}
