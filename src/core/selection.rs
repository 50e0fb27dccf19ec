//! Feature selection and schema alignment.
//!
//! `rank_features` reproduces the training-time feature-selection step:
//! it ranks every column of the training matrix by how well it separates
//! the two classes and returns the top names. Running it once at startup
//! fixes the column set and order the classifier will see for the whole
//! run. `select` then restricts each extracted vector to exactly that
//! schema, failing hard on any missing column.

use crate::core::features::FeatureVector;
use std::path::Path;

/// Name of the class column in the training matrix.
const LABEL_COLUMN: &str = "Label";

/// Errors raised during feature selection and alignment.
#[derive(Debug)]
pub enum SelectionError {
    IoError(String),
    ParseError(String),
    /// The training matrix has no `Label` column.
    MissingLabel,
    /// The `Label` column does not contain exactly two classes.
    NotBinary(usize),
    /// The extracted features do not cover the trained schema.
    SchemaMismatch { missing: Vec<String> },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::IoError(e) => write!(f, "IO error: {e}"),
            SelectionError::ParseError(e) => write!(f, "Parse error: {e}"),
            SelectionError::MissingLabel => {
                write!(f, "training matrix has no '{LABEL_COLUMN}' column")
            }
            SelectionError::NotBinary(n) => {
                write!(f, "training matrix has {n} classes, expected 2")
            }
            SelectionError::SchemaMismatch { missing } => {
                write!(
                    f,
                    "trained features not present in extracted vector: {}",
                    missing.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Rank the feature columns of a training matrix and return the top names.
///
/// Columns are scored with a two-sample t-statistic between the two
/// classes: |mean0 - mean1| / sqrt(var0/n0 + var1/n1). Ties keep the
/// original column order. Returns at most `count` names.
pub fn rank_features(
    training_path: &Path,
    count: usize,
) -> Result<Vec<String>, SelectionError> {
    let mut reader = csv::Reader::from_path(training_path)
        .map_err(|e| SelectionError::IoError(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SelectionError::ParseError(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let label_index = headers
        .iter()
        .position(|h| h == LABEL_COLUMN)
        .ok_or(SelectionError::MissingLabel)?;

    // Split rows into the two classes as they appear
    let mut class_values: Vec<String> = Vec::new();
    let mut rows_by_class: Vec<Vec<Vec<f64>>> = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| SelectionError::ParseError(e.to_string()))?;

        let label = record
            .get(label_index)
            .unwrap_or_default()
            .trim()
            .to_string();
        let class = match class_values.iter().position(|c| *c == label) {
            Some(i) => i,
            None => {
                class_values.push(label);
                rows_by_class.push(Vec::new());
                class_values.len() - 1
            }
        };

        let mut row = Vec::with_capacity(headers.len() - 1);
        for (i, field) in record.iter().enumerate() {
            if i == label_index {
                continue;
            }
            let value: f64 = field.trim().parse().map_err(|_| {
                SelectionError::ParseError(format!(
                    "non-numeric value {field:?} in column '{}'",
                    headers[i]
                ))
            })?;
            row.push(value);
        }
        rows_by_class[class].push(row);
    }

    if class_values.len() != 2 {
        return Err(SelectionError::NotBinary(class_values.len()));
    }

    let feature_headers: Vec<&String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_index)
        .map(|(_, h)| h)
        .collect();

    let mut scored: Vec<(f64, &String)> = feature_headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let score = t_score(
                &column(&rows_by_class[0], col),
                &column(&rows_by_class[1], col),
            );
            (score, *header)
        })
        .collect();

    // Stable sort keeps column order on ties
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(count);

    Ok(scored.into_iter().map(|(_, h)| h.clone()).collect())
}

fn column(rows: &[Vec<f64>], index: usize) -> Vec<f64> {
    rows.iter().map(|r| r[index]).collect()
}

/// Two-sample t-statistic magnitude between two series.
fn t_score(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (mean_a, var_a) = mean_var(a);
    let (mean_b, var_b) = mean_var(b);
    let denom = (var_a / a.len() as f64 + var_b / b.len() as f64).sqrt();
    let diff = (mean_a - mean_b).abs();
    if denom == 0.0 {
        // Identical within-class values: perfectly separable if means differ
        if diff > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        diff / denom
    }
}

fn mean_var(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

/// Restrict a feature vector to exactly the trained columns, in order.
///
/// Fails with `SchemaMismatch` naming every trained column absent from the
/// extracted vector. Never drops silently.
pub fn select(
    vector: &FeatureVector,
    trained_feature_names: &[String],
) -> Result<FeatureVector, SelectionError> {
    let missing: Vec<String> = trained_feature_names
        .iter()
        .filter(|name| vector.get(name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SelectionError::SchemaMismatch { missing });
    }

    let mut selected = FeatureVector::with_capacity(trained_feature_names.len());
    for name in trained_feature_names {
        // Presence checked above
        let value = vector.get(name).unwrap_or_default();
        selected.push(name.clone(), value);
    }
    Ok(selected)
}

/// Check that every trained feature can be produced by the live extractor.
///
/// Runs at startup against the deterministic feature-name battery, so a
/// channel-count mismatch between training and the live session fails
/// before any window is pulled.
pub fn validate_schema(
    trained_feature_names: &[String],
    available_names: &[String],
) -> Result<(), SelectionError> {
    let missing: Vec<String> = trained_feature_names
        .iter()
        .filter(|name| !available_names.contains(name))
        .cloned()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SelectionError::SchemaMismatch { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_matrix(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_rank_features_prefers_separating_column() {
        // c1_mean separates the classes perfectly with spread, c2_var does
        // not separate at all, c3_std separates weakly relative to noise.
        let file = write_matrix(
            "c1_mean,c2_var,c3_std,Label\n\
             10.0,5.0,1.0,0\n\
             11.0,4.9,1.2,0\n\
             10.5,5.1,0.9,0\n\
             20.0,5.0,1.1,1\n\
             21.0,4.8,1.3,1\n\
             20.5,5.2,1.0,1\n",
        );

        let ranked = rank_features(file.path(), 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], "c1_mean");
    }

    #[test]
    fn test_rank_features_count_larger_than_columns() {
        let file = write_matrix("a,b,Label\n1.0,2.0,0\n3.0,4.0,1\n");
        let ranked = rank_features(file.path(), 10).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_rank_features_missing_label_column() {
        let file = write_matrix("a,b\n1.0,2.0\n");
        let err = rank_features(file.path(), 5).unwrap_err();
        assert!(matches!(err, SelectionError::MissingLabel));
    }

    #[test]
    fn test_rank_features_rejects_three_classes() {
        let file = write_matrix("a,Label\n1.0,0\n2.0,1\n3.0,2\n");
        let err = rank_features(file.path(), 5).unwrap_err();
        assert!(matches!(err, SelectionError::NotBinary(3)));
    }

    #[test]
    fn test_rank_features_rejects_non_numeric() {
        let file = write_matrix("a,Label\noops,0\n2.0,1\n");
        let err = rank_features(file.path(), 5).unwrap_err();
        assert!(matches!(err, SelectionError::ParseError(_)));
    }

    #[test]
    fn test_select_orders_by_trained_names() {
        let mut vector = FeatureVector::new();
        vector.push("c1_mean", 1.0);
        vector.push("c2_var", 2.0);
        vector.push("c1_var", 3.0);

        let trained = vec!["c2_var".to_string(), "c1_mean".to_string()];
        let selected = select(&vector, &trained).unwrap();

        assert_eq!(selected.names(), vec!["c2_var", "c1_mean"]);
        assert_eq!(selected.values(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_select_order_independent_of_extractor_permutation() {
        let trained = vec!["b".to_string(), "a".to_string()];

        let mut forward = FeatureVector::new();
        forward.push("a", 1.0);
        forward.push("b", 2.0);

        let mut reversed = FeatureVector::new();
        reversed.push("b", 2.0);
        reversed.push("a", 1.0);

        let from_forward = select(&forward, &trained).unwrap();
        let from_reversed = select(&reversed, &trained).unwrap();
        assert_eq!(from_forward, from_reversed);
    }

    #[test]
    fn test_select_fails_on_missing_column() {
        let mut vector = FeatureVector::new();
        vector.push("c1_mean", 1.0);

        let trained = vec!["c1_mean".to_string(), "c3_mean".to_string()];
        let err = select(&vector, &trained).unwrap_err();
        match err {
            SelectionError::SchemaMismatch { missing } => {
                assert_eq!(missing, vec!["c3_mean".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_schema_channel_mismatch() {
        // Model trained on three channels, live source has two
        let trained = vec!["c1_mean".to_string(), "c3_mean".to_string()];
        let available = crate::core::features::feature_names(&[
            "c1".to_string(),
            "c2".to_string(),
        ]);

        let err = validate_schema(&trained, &available).unwrap_err();
        assert!(matches!(err, SelectionError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_validate_schema_ok() {
        let available = crate::core::features::feature_names(&[
            "c1".to_string(),
            "c2".to_string(),
        ]);
        let trained = vec!["c1_mean".to_string(), "c2_var".to_string()];
        assert!(validate_schema(&trained, &available).is_ok());
    }
}
