//! Parsing of the compact label definition format.
//!
//! A definition looks like `name|color=value`. Definitions are joined with
//! `,` into a single configuration string. For plain labels the `=value`
//! suffix is ignored, which lets a size-label string double as the list of
//! labels to create. For size labels the suffix is the exclusive upper
//! bound on lines changed; an empty suffix means "no upper bound".
//!
//! `,`, `|` and `=` are reserved and cannot be escaped.

use crate::types::{Label, LabelType, SizeLabel};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabelSpecError {
    #[error("label definition '{0}' is missing the '|' between name and color")]
    MissingColorSeparator(String),
    #[error("label definition '{0}' has an empty name")]
    EmptyName(String),
    #[error("label definition '{0}' has an empty color")]
    EmptyColor(String),
    #[error("label definition '{spec}' has a non-numeric threshold '{threshold}'")]
    InvalidThreshold { spec: String, threshold: String },
}

pub fn autogenerated_description(name: &str) -> String {
    format!("PR-Labeler autogenerated {} label", name)
}

/// Splits a definition into `(name, color, condition)`.
fn split_definition(spec: &str) -> Result<(&str, &str, Option<&str>), LabelSpecError> {
    let (key, condition) = match spec.split_once('=') {
        Some((key, condition)) => (key, Some(condition.trim())),
        None => (spec, None),
    };

    let (name, color) = key
        .split_once('|')
        .ok_or_else(|| LabelSpecError::MissingColorSeparator(spec.to_string()))?;
    let (name, color) = (name.trim(), color.trim());

    if name.is_empty() {
        return Err(LabelSpecError::EmptyName(spec.to_string()));
    }
    if color.is_empty() {
        return Err(LabelSpecError::EmptyColor(spec.to_string()));
    }

    Ok((name, color, condition))
}

/// Parses a single `name|color[=ignored]` definition.
pub fn parse_label(spec: &str) -> Result<Label, LabelSpecError> {
    let (name, color, _) = split_definition(spec.trim())?;
    Ok(Label::new(name, color, autogenerated_description(name)))
}

/// Parses a single `name|color=threshold` definition.
pub fn parse_logical_label(spec: &str, label_type: LabelType) -> Result<SizeLabel, LabelSpecError> {
    let spec = spec.trim();
    let (name, color, condition) = split_definition(spec)?;

    let condition = match (label_type, condition) {
        (LabelType::Size, None | Some("")) => u64::MAX,
        (_, Some(threshold)) => {
            threshold
                .parse()
                .map_err(|_| LabelSpecError::InvalidThreshold {
                    spec: spec.to_string(),
                    threshold: threshold.to_string(),
                })?
        }
    };

    Ok(SizeLabel {
        label: Label::new(name, color, autogenerated_description(name)),
        condition,
        label_type,
    })
}

fn segments(formatted: &str) -> impl Iterator<Item = &str> {
    formatted.split(',').filter(|s| !s.trim().is_empty())
}

pub fn parse_labels_from_formatted_string(formatted: &str) -> Result<Vec<Label>, LabelSpecError> {
    segments(formatted).map(parse_label).collect()
}

pub fn parse_logical_labels_from_formatted_string(
    formatted: &str,
    label_type: LabelType,
) -> Result<Vec<SizeLabel>, LabelSpecError> {
    segments(formatted)
        .map(|spec| parse_logical_label(spec, label_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels_preserves_input_order() {
        let labels = parse_labels_from_formatted_string("a|111111,b|222222").unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].name, "a");
        assert_eq!(labels[0].color, "111111");
        assert_eq!(labels[1].name, "b");
        assert_eq!(labels[1].color, "222222");
    }

    #[test]
    fn test_parse_label_ignores_condition_suffix() {
        let label = parse_label("size/S|00ff00=10").unwrap();
        assert_eq!(label.name, "size/S");
        assert_eq!(label.color, "00ff00");
        assert_eq!(label.description, "PR-Labeler autogenerated size/S label");
    }

    #[test]
    fn test_parse_labels_trims_whitespace_and_skips_empty_segments() {
        let labels = parse_labels_from_formatted_string(" a | 111111 , b|222222,").unwrap();
        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(labels[0].color, "111111");
    }

    #[test]
    fn test_parse_size_labels_omitted_threshold_is_unbounded() {
        let labels = parse_logical_labels_from_formatted_string(
            "s|aaa=10,m|bbb=50,l|ccc=200,xl|ddd=",
            LabelType::Size,
        )
        .unwrap();
        let thresholds: Vec<u64> = labels.iter().map(|l| l.condition).collect();
        assert_eq!(thresholds, vec![10, 50, 200, u64::MAX]);
        assert!(labels[3].is_unbounded());
        assert_eq!(labels[3].label_type, LabelType::Size);
    }

    #[test]
    fn test_parse_size_label_without_equals_is_unbounded() {
        let label = parse_logical_label("xl|ddd", LabelType::Size).unwrap();
        assert_eq!(label.condition, u64::MAX);
    }

    #[test]
    fn test_parse_errors_are_descriptive() {
        assert_eq!(
            parse_label("no-color").unwrap_err(),
            LabelSpecError::MissingColorSeparator("no-color".to_string())
        );
        assert_eq!(
            parse_label("|ffffff").unwrap_err(),
            LabelSpecError::EmptyName("|ffffff".to_string())
        );
        assert_eq!(
            parse_label("name|").unwrap_err(),
            LabelSpecError::EmptyColor("name|".to_string())
        );

        let err = parse_logical_label("s|aaa=ten", LabelType::Size).unwrap_err();
        assert_eq!(
            err,
            LabelSpecError::InvalidThreshold {
                spec: "s|aaa=ten".to_string(),
                threshold: "ten".to_string(),
            }
        );
        assert!(err.to_string().contains("non-numeric threshold 'ten'"));
    }

    #[test]
    fn test_parse_error_reports_first_bad_segment() {
        let err = parse_labels_from_formatted_string("a|111111,broken,c|333333").unwrap_err();
        assert_eq!(
            err,
            LabelSpecError::MissingColorSeparator("broken".to_string())
        );
    }
}
