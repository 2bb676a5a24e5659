use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::{
    context::RunContext,
    parser::{parse_labels_from_formatted_string, parse_logical_labels_from_formatted_string},
    run::RunSpec,
    types::{ConditionalLabel, FileConditionTarget, LabelType, Repo},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser, Default, Debug)]
#[command(
    name = "pr-labeler",
    about = "Label a pull request by size and by simple line/file-count rules, creating missing labels as needed"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct CliArgs {
    /// GitHub repository in format 'owner/repo'
    #[arg(short = 'r', long, env = "GITHUB_REPOSITORY", value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Pull request to label (defaults to the one in the Actions event payload)
    #[arg(short = 'p', long = "pr", value_name = "PR-NUMBER|PR-URL")]
    pub pr: Option<String>,

    /// Webhook event payload to take the pull request from
    #[arg(long = "event-path", env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<String>,

    /// Labels to create when missing (e.g. 'bug|d73a4a,docs|0075ca')
    #[arg(short = 'l', long, env = "INPUT_LABELS", value_name = "SPEC")]
    pub labels: Option<String>,

    /// Size buckets by exclusive max lines changed; empty max catches the rest (e.g. 'S|00ff00=10,M|ffff00=100,L|ff0000=')
    #[arg(short = 's', long = "size-labels", env = "INPUT_SIZE_LABELS", value_name = "SPEC")]
    pub size_labels: Option<String>,

    /// Conditional label rules as a JSON array
    #[arg(
        long = "conditional-labels",
        env = "INPUT_CONDITIONAL_LABELS",
        value_name = "JSON",
        conflicts_with = "conditional_labels_file"
    )]
    pub conditional_labels: Option<String>,

    /// Read conditional label rules from a JSON file
    #[arg(long = "conditional-labels-file", value_name = "PATH")]
    pub conditional_labels_file: Option<PathBuf>,

    /// Metric compared by max-files/min-files conditions: lines-changed (default) or files-changed
    #[arg(long = "file-conditions", env = "INPUT_FILE_CONDITIONS", value_name = "METRIC")]
    pub file_conditions: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CliArgs {
    pub fn validate(&self) -> Result<()> {
        if non_empty(&self.labels).is_none()
            && non_empty(&self.size_labels).is_none()
            && non_empty(&self.conditional_labels).is_none()
            && self.conditional_labels_file.is_none()
        {
            anyhow::bail!(
                "Must specify at least one of: --labels, --size-labels, --conditional-labels, --conditional-labels-file"
            );
        }

        if non_empty(&self.repo).is_none()
            && !non_empty(&self.pr).is_some_and(|pr| pr.starts_with("https://"))
        {
            anyhow::bail!("--repo is required unless --pr is a pull request URL");
        }

        Ok(())
    }
}

/// Parses conditional label rules from JSON.
pub fn parse_conditional_labels(json: &str) -> Result<Vec<ConditionalLabel>> {
    serde_json::from_str(json).context("Invalid conditional label rules")
}

fn read_conditional_labels(path: &Path) -> Result<Vec<ConditionalLabel>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read conditional label rules '{}'", path.display()))?;
    parse_conditional_labels(&json)
}

// Actions passes unset inputs as empty strings.
fn parse_file_conditions(value: Option<&str>) -> Result<FileConditionTarget> {
    match value {
        Some(v) => <FileConditionTarget as ValueEnum>::from_str(v, true)
            .map_err(|e| anyhow::anyhow!("Invalid --file-conditions '{}': {}", v, e)),
        None => Ok(FileConditionTarget::default()),
    }
}

fn resolve_context(cli: &CliArgs) -> Result<RunContext> {
    let repo = non_empty(&cli.repo)
        .map(|r| {
            Repo::parse(r).map_err(|e| anyhow::anyhow!("Invalid repository format '{}': {}", r, e))
        })
        .transpose()?;

    if let Some(pr) = non_empty(&cli.pr) {
        if pr.starts_with("https://") {
            let (pr_repo, number) = Repo::parse_url(pr)?;
            let number =
                number.ok_or_else(|| anyhow::anyhow!("URL must contain '/pull/' in the path"))?;
            if let Some(repo) = repo.as_ref().filter(|r| **r != pr_repo) {
                anyhow::bail!("PR URL {} is from {} but --repo specifies {}", pr, pr_repo, repo);
            }
            return Ok(RunContext::new(pr_repo, Some(number)));
        }

        let number: u64 = pr
            .parse()
            .with_context(|| format!("Invalid PR number: '{}'", pr))?;
        let repo = repo.context("PR numbers require --repo to be specified")?;
        return Ok(RunContext::new(repo, Some(number)));
    }

    let repo = repo.context("--repo is required")?;
    match non_empty(&cli.event_path) {
        Some(path) => RunContext::from_event_file(repo, Path::new(path)),
        None => Ok(RunContext::new(repo, None)),
    }
}

fn create_run_spec(cli: CliArgs) -> Result<RunSpec> {
    cli.validate()?;

    let mut spec = RunSpec::new(resolve_context(&cli)?);

    if let Some(labels) = non_empty(&cli.labels) {
        spec.labels = parse_labels_from_formatted_string(labels).context("Invalid --labels")?;
    }

    if let Some(size_labels) = non_empty(&cli.size_labels) {
        spec.size_labels = parse_logical_labels_from_formatted_string(size_labels, LabelType::Size)
            .context("Invalid --size-labels")?;
    }

    let rules_json = non_empty(&cli.conditional_labels);
    spec.conditional_labels = match (&cli.conditional_labels_file, rules_json) {
        (Some(path), _) => read_conditional_labels(path)?,
        (None, Some(json)) => parse_conditional_labels(json)?,
        (None, None) => Vec::new(),
    };

    spec.file_conditions = parse_file_conditions(non_empty(&cli.file_conditions))?;

    Ok(spec)
}

/// Parses command-line arguments (and their environment fallbacks) into a
/// run specification.
///
/// Every label definition is parsed here so configuration mistakes are
/// reported before any request reaches GitHub.
pub fn parse_args<I, T>(args: I) -> Result<RunSpec>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    create_run_spec(cli)
}
