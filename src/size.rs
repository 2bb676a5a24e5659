use anyhow::{Context, Result};
use tracing::debug;

use crate::{
    parser::parse_logical_labels_from_formatted_string,
    types::{Label, LabelType, SizeLabel},
};

/// Picks the size bucket for `lines_changed`.
///
/// Buckets are ordered by threshold (stable, so equal thresholds keep their
/// configured order) and the first one whose threshold is strictly greater
/// than `lines_changed` wins. Returns `None` when the change is at least as
/// large as every threshold.
pub fn classify(lines_changed: u64, size_labels: &[SizeLabel]) -> Option<&SizeLabel> {
    let mut ordered: Vec<&SizeLabel> = size_labels.iter().collect();
    ordered.sort_by_key(|label| label.condition);

    ordered.into_iter().find(|label| {
        debug!(label = %label.name(), condition = label.condition, "Checking size label");
        label.condition > lines_changed
    })
}

/// Parses `size_labels` (`name|color=max,...`) and returns the label for
/// `lines_changed`, if any bucket applies.
pub fn get_label_for_lines_changed(lines_changed: u64, size_labels: &str) -> Result<Option<Label>> {
    let possible = parse_logical_labels_from_formatted_string(size_labels, LabelType::Size)
        .context("Invalid size label definitions")?;

    Ok(classify(lines_changed, &possible).map(|label| label.label.clone()))
}
