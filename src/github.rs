use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::types::{CommitInfo, Forge, Label, PullRequestMetadata, Repo};

const PER_PAGE: u8 = 100;

pub fn get_github_token() -> Result<String> {
    // Actions exports GITHUB_TOKEN; GH_TOKEN and the gh CLI cover local runs.
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Ok(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN") {
        return Ok(token);
    }

    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

fn convert_label(label: octocrab::models::Label) -> Label {
    Label {
        name: label.name,
        color: label.color,
        description: label.description.unwrap_or_default(),
    }
}

/// GitHub REST implementation of [`Forge`] for a single repository.
#[derive(Debug)]
pub struct GitHub {
    client: Octocrab,
    repo: Repo,
}

impl GitHub {
    /// Creates a client authenticated with `token`.
    pub fn new(token: impl Into<String>, repo: Repo) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .context("Failed to create GitHub client")?;
        Ok(Self::with_client(client, repo))
    }

    pub fn with_client(client: Octocrab, repo: Repo) -> Self {
        Self { client, repo }
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let first_page = self
            .client
            .issues(self.repo.owner(), self.repo.name())
            .list_labels_for_repo()
            .per_page(PER_PAGE)
            .send()
            .await?;
        let labels = self.client.all_pages(first_page).await?;
        debug!(repo = %self.repo, count = labels.len(), "Listed labels");
        Ok(labels.into_iter().map(convert_label).collect())
    }

    async fn create_label(&self, label: &Label) -> Result<Label> {
        let created = self
            .client
            .issues(self.repo.owner(), self.repo.name())
            .create_label(&label.name, &label.color, &label.description)
            .await?;
        Ok(convert_label(created))
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequestMetadata> {
        let pr = self
            .client
            .pulls(self.repo.owner(), self.repo.name())
            .get(number)
            .await?;
        Ok(PullRequestMetadata {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            body: pr.body,
            additions: pr.additions.unwrap_or(0),
            deletions: pr.deletions.unwrap_or(0),
            changed_files: pr.changed_files.unwrap_or(0),
            labels: pr
                .labels
                .unwrap_or_default()
                .into_iter()
                .map(convert_label)
                .collect(),
            mergeable: pr.mergeable,
            rebaseable: pr.rebaseable,
        })
    }

    async fn list_pull_request_commits(&self, number: u64) -> Result<Vec<CommitInfo>> {
        let first_page = self
            .client
            .pulls(self.repo.owner(), self.repo.name())
            .pr_commits(number)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let commits = self.client.all_pages(first_page).await?;
        Ok(commits
            .into_iter()
            .map(|commit| CommitInfo {
                sha: commit.sha,
                committer_login: commit.committer.map(|c| c.login),
            })
            .collect())
    }

    async fn list_pull_request_files(&self, number: u64) -> Result<Vec<String>> {
        let first_page = self
            .client
            .pulls(self.repo.owner(), self.repo.name())
            .list_files(number)
            .await?;
        let files = self.client.all_pages(first_page).await?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.client
            .issues(self.repo.owner(), self.repo.name())
            .add_labels(number, labels)
            .await?;
        Ok(())
    }
}
