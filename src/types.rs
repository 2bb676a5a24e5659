use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named, colored tag attachable to a pull request.
///
/// Names are matched case-insensitively, mirroring how GitHub treats label
/// uniqueness within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl Label {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: description.into(),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Kind of logical label. Only size buckets exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    Size,
}

/// A label bound to a single numeric threshold.
///
/// For size labels the threshold is an exclusive upper bound on lines
/// changed; `u64::MAX` marks the unbounded catch-all bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLabel {
    pub label: Label,
    pub condition: u64,
    pub label_type: LabelType,
}

impl SizeLabel {
    pub fn name(&self) -> &str {
        &self.label.name
    }

    pub fn is_unbounded(&self) -> bool {
        self.condition == u64::MAX
    }
}

/// A single threshold check evaluated against a loaded pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "kebab-case")]
pub enum Condition {
    MaxLines(u64),
    MinLines(u64),
    MaxFiles(u64),
    MinFiles(u64),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::MaxLines(n) => write!(f, "max-lines({n})"),
            Condition::MinLines(n) => write!(f, "min-lines({n})"),
            Condition::MaxFiles(n) => write!(f, "max-files({n})"),
            Condition::MinFiles(n) => write!(f, "min-files({n})"),
        }
    }
}

/// A label applied when every one of its conditions holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalLabel {
    #[serde(flatten)]
    pub label: Label,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Which metric the `MaxFiles`/`MinFiles` conditions compare against.
///
/// Historically these conditions were evaluated against lines changed, and
/// existing configurations may rely on that. `FilesChanged` compares the
/// number of changed files instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FileConditionTarget {
    #[default]
    LinesChanged,
    FilesChanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilesChanged {
    pub quantity: u64,
    pub files: Vec<String>,
}

/// Pull request fields as returned by the forge, before any derivation.
#[derive(Debug, Clone, Default)]
pub struct PullRequestMetadata {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub labels: Vec<Label>,
    pub mergeable: Option<bool>,
    pub rebaseable: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitInfo {
    pub sha: String,
    pub committer_login: Option<String>,
}

/// Remote operations the labeler needs from a code forge.
///
/// Implementations are bound to one repository and one set of credentials
/// at construction time.
#[async_trait]
pub trait Forge {
    async fn list_labels(&self) -> Result<Vec<Label>>;

    async fn create_label(&self, label: &Label) -> Result<Label>;

    async fn get_pull_request(&self, number: u64) -> Result<PullRequestMetadata>;

    async fn list_pull_request_commits(&self, number: u64) -> Result<Vec<CommitInfo>>;

    async fn list_pull_request_files(&self, number: u64) -> Result<Vec<String>>;

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    InvalidFormat(String),
    #[error("repository owner must not be empty")]
    EmptyOwner,
    #[error("repository name must not be empty")]
    EmptyName,
}

/// A GitHub repository identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repo {
    owner: String,
    name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();
        if owner.trim().is_empty() {
            return Err(RepoError::EmptyOwner);
        }
        if name.trim().is_empty() {
            return Err(RepoError::EmptyName);
        }
        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses `owner/repo`.
    pub fn parse(repo: &str) -> Result<Self, RepoError> {
        let parts: Vec<&str> = repo.trim().split('/').collect();
        if parts.len() != 2 {
            return Err(RepoError::InvalidFormat(repo.to_string()));
        }
        Self::new(parts[0], parts[1])
    }

    /// Parses a GitHub repository or pull request URL, returning the PR
    /// number when the URL points at a pull request.
    pub fn parse_url(url_str: &str) -> Result<(Self, Option<u64>)> {
        use anyhow::Context;

        let url = url::Url::parse(url_str)
            .with_context(|| format!("Failed to parse URL: '{}'", url_str))?;

        if url.host_str() != Some("github.com") {
            anyhow::bail!("URL must be a GitHub URL, got: '{}'", url_str);
        }

        let segments: Vec<&str> = url
            .path_segments()
            .context("Cannot parse URL path")?
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [owner, repo] => Ok((Self::new(*owner, *repo)?, None)),
            [owner, repo, "pull", number] => {
                let number: u64 = number
                    .parse()
                    .with_context(|| format!("Invalid PR number in URL: '{}'", url_str))?;
                Ok((Self::new(*owner, *repo)?, Some(number)))
            }
            _ => anyhow::bail!(
                "URL must be in format https://github.com/owner/repo/pull/123, got: '{}'",
                url_str
            ),
        }
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_name_matching_ignores_case() {
        let label = Label::new("Size/XL", "ff0000", "");
        assert!(label.matches_name("size/xl"));
        assert!(label.matches_name("SIZE/XL"));
        assert!(!label.matches_name("size/l"));
    }

    #[test]
    fn test_repo_parse() {
        let repo = Repo::parse("owner/repo").unwrap();
        assert_eq!(repo.owner(), "owner");
        assert_eq!(repo.name(), "repo");
        assert_eq!(repo.to_string(), "owner/repo");

        assert_eq!(
            Repo::parse("owner").unwrap_err(),
            RepoError::InvalidFormat("owner".to_string())
        );
        assert_eq!(Repo::parse("/repo").unwrap_err(), RepoError::EmptyOwner);
        assert_eq!(Repo::parse("owner/").unwrap_err(), RepoError::EmptyName);
    }

    #[test]
    fn test_repo_parse_url() {
        let (repo, number) = Repo::parse_url("https://github.com/owner/repo/pull/42").unwrap();
        assert_eq!(repo, Repo::new("owner", "repo").unwrap());
        assert_eq!(number, Some(42));

        let (repo, number) = Repo::parse_url("https://github.com/owner/repo").unwrap();
        assert_eq!(repo.to_string(), "owner/repo");
        assert_eq!(number, None);

        assert!(Repo::parse_url("https://gitlab.com/owner/repo/pull/1").is_err());
        assert!(Repo::parse_url("https://github.com/owner/repo/pull/abc").is_err());
        assert!(Repo::parse_url("https://github.com/owner/repo/issues/1").is_err());
    }

    #[test]
    fn test_condition_deserialization() {
        let json = r#"[
            {"kind": "max-lines", "threshold": 500},
            {"kind": "min-lines", "threshold": 100},
            {"kind": "max-files", "threshold": 10},
            {"kind": "min-files", "threshold": 2}
        ]"#;
        let conditions: Vec<Condition> = serde_json::from_str(json).unwrap();
        assert_eq!(
            conditions,
            vec![
                Condition::MaxLines(500),
                Condition::MinLines(100),
                Condition::MaxFiles(10),
                Condition::MinFiles(2),
            ]
        );
    }

    #[test]
    fn test_conditional_label_deserialization() {
        let json = r#"{
            "name": "needs-split",
            "color": "b60205",
            "conditions": [{"kind": "min-lines", "threshold": 1000}]
        }"#;
        let rule: ConditionalLabel = serde_json::from_str(json).unwrap();
        assert_eq!(rule.label.name, "needs-split");
        assert_eq!(rule.label.color, "b60205");
        assert_eq!(rule.label.description, "");
        assert_eq!(rule.conditions, vec![Condition::MinLines(1000)]);
    }
}
