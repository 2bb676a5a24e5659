use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{
    parser::parse_labels_from_formatted_string,
    types::{Forge, Label},
};

/// Lists every label currently defined on the forge's repository.
pub async fn get_labels_for_repo<F>(forge: &F) -> Result<Vec<Label>>
where
    F: Forge + Sync,
{
    forge
        .list_labels()
        .await
        .context("Failed to list repository labels")
}

/// Creates `label` unless a label with the same name (ignoring case) is
/// already in `current_labels`.
///
/// Returns the created label, or `None` when it already existed. Existing
/// labels are never modified.
pub async fn create_label_if_not_present<F>(
    forge: &F,
    label: &Label,
    current_labels: &[Label],
) -> Result<Option<Label>>
where
    F: Forge + Sync,
{
    if current_labels.iter().any(|l| l.matches_name(&label.name)) {
        debug!(label = %label.name, "Label already present");
        return Ok(None);
    }

    let created = forge
        .create_label(label)
        .await
        .with_context(|| format!("Failed to create label '{}'", label.name))?;
    info!(label = %created.name, color = %created.color, "Created label");

    Ok(Some(created))
}

/// Ensures every label in `labels` exists, creating the missing ones in
/// order. Returns the labels that were created.
pub async fn ensure_labels<F>(forge: &F, labels: &[Label]) -> Result<Vec<Label>>
where
    F: Forge + Sync,
{
    let mut known = get_labels_for_repo(forge).await?;
    let mut created = Vec::new();

    for label in labels {
        if let Some(new_label) = create_label_if_not_present(forge, label, &known).await? {
            known.push(new_label.clone());
            created.push(new_label);
        }
    }

    Ok(created)
}

/// Ensures every label in the `name|color` formatted string exists and
/// returns the repository's full label list afterwards.
///
/// Despite the name, labels that already exist keep their color and
/// description.
pub async fn create_or_update_labels<F>(forge: &F, labels: &str) -> Result<Vec<Label>>
where
    F: Forge + Sync,
{
    let required =
        parse_labels_from_formatted_string(labels).context("Invalid label definitions")?;
    ensure_labels(forge, &required).await?;
    get_labels_for_repo(forge).await
}
