use anyhow::Result;
use tracing::{info, warn};

use crate::{
    context::RunContext,
    labels::ensure_labels,
    parser::autogenerated_description,
    pull_request::PullRequestRequest,
    size::classify,
    types::{ConditionalLabel, FileConditionTarget, Forge, Label, SizeLabel},
};

/// Everything a single labeling run needs, already parsed and validated.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub context: RunContext,
    pub labels: Vec<Label>,
    pub size_labels: Vec<SizeLabel>,
    pub conditional_labels: Vec<ConditionalLabel>,
    pub file_conditions: FileConditionTarget,
}

impl RunSpec {
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            labels: Vec::new(),
            size_labels: Vec::new(),
            conditional_labels: Vec::new(),
            file_conditions: FileConditionTarget::default(),
        }
    }

    /// Labels that must exist in the repository before any are applied, in
    /// configuration order: plain labels, size buckets, then rule labels.
    pub fn required_labels(&self) -> Vec<Label> {
        let size = self.size_labels.iter().map(|l| l.label.clone());
        let rules = self.conditional_labels.iter().map(|rule| {
            let mut label = rule.label.clone();
            if label.description.is_empty() {
                label.description = autogenerated_description(&label.name);
            }
            label
        });

        self.labels.iter().cloned().chain(size).chain(rules).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub pull_request: u64,
    pub lines_changed: u64,
    pub files_changed: u64,
    pub created: Vec<Label>,
    pub size_label: Option<String>,
    pub applied: Vec<String>,
}

/// Labels one pull request: ensures the configured labels exist, loads the
/// pull request, applies its size bucket and then every matching rule.
pub async fn run<F>(spec: &RunSpec, forge: &F) -> Result<RunOutcome>
where
    F: Forge + Sync,
{
    let request = PullRequestRequest::from_context(&spec.context)?;

    let created = ensure_labels(forge, &spec.required_labels()).await?;
    let pr = request.load(forge).await?;

    let size_label = if spec.size_labels.is_empty() {
        None
    } else {
        match classify(pr.lines_changed, &spec.size_labels) {
            Some(bucket) => {
                pr.add_label(forge, &bucket.label).await?;
                Some(bucket.label.name.clone())
            }
            None => {
                warn!(
                    pr = pr.number,
                    lines_changed = pr.lines_changed,
                    "No size label applies; configure a bucket without a threshold to catch every size"
                );
                None
            }
        }
    };

    let applied = pr
        .apply(forge, &spec.conditional_labels, spec.file_conditions)
        .await?;

    info!(
        pr = pr.number,
        size_label = ?size_label,
        applied = applied.len(),
        "Labeling complete"
    );

    Ok(RunOutcome {
        pull_request: pr.number,
        lines_changed: pr.lines_changed,
        files_changed: pr.files_changed.quantity,
        created,
        size_label,
        applied,
    })
}
