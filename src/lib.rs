//! PR labeler: size and rule based labeling for GitHub pull requests.
//!
//! Parses compact label definitions, ensures the labels exist in the
//! repository, loads a pull request's change metrics and applies the size
//! bucket and conditional rules that match. All GitHub access goes through
//! the [`Forge`] trait so the labeling logic can run against any backend.

pub mod cli;
pub mod context;
pub mod github;
pub mod labels;
pub mod parser;
pub mod pull_request;
pub mod run;
pub mod size;
pub mod types;

pub use cli::{parse_args, parse_conditional_labels};
pub use context::RunContext;
pub use github::{GitHub, get_github_token};
pub use labels::{
    create_label_if_not_present, create_or_update_labels, ensure_labels, get_labels_for_repo,
};
pub use parser::{
    LabelSpecError, parse_label, parse_labels_from_formatted_string, parse_logical_label,
    parse_logical_labels_from_formatted_string,
};
pub use pull_request::{PullRequest, PullRequestRequest};
pub use run::{RunOutcome, RunSpec, run};
pub use size::{classify, get_label_for_lines_changed};
pub use types::{
    CommitInfo, Condition, ConditionalLabel, FileConditionTarget, FilesChanged, Forge, Label,
    LabelType, PullRequestMetadata, Repo, RepoError, SizeLabel,
};
