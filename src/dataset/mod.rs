//! In-memory multi-label dataset: a feature matrix plus tri-state label columns.
//!
//! Label values are parsed once at the boundary into [`LabelValue`]; every
//! downstream operation works on the enum, never on raw strings. "Positive"
//! always means exactly [`LabelValue::True`] — a missing value is neither
//! positive nor negative.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod ops;

pub use ops::validate_consistency;

/// Errors produced by dataset construction and transforms.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A label cell held something other than `"0"`, `"1"`, `"?"` or empty.
    #[error("invalid label value {value:?} for label {label:?} at row {row}")]
    InvalidLabelValue {
        value: String,
        label: String,
        row: usize,
    },
    /// A referenced label name is not a column of this dataset.
    #[error("unknown label {name:?}")]
    UnknownLabel { name: String },
    /// Two label columns share a name.
    #[error("duplicate label name {name:?}")]
    DuplicateLabel { name: String },
    /// A row's feature or label vector has the wrong length.
    #[error("row {row} has {got} {kind} values, expected {expected}")]
    RowLengthMismatch {
        row: usize,
        kind: &'static str,
        got: usize,
        expected: usize,
    },
    /// Feature and label matrices disagree on the number of rows.
    #[error("feature matrix has {feature_rows} rows but label matrix has {label_rows}")]
    RowCountMismatch {
        feature_rows: usize,
        label_rows: usize,
    },
    /// The ancestor invariant failed: a label is true under a non-true parent.
    #[error("row {row}: label {label:?} is true but its parent {parent:?} is not")]
    InconsistentRow {
        row: usize,
        label: String,
        parent: String,
    },
}

/// Tri-state value of one label cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelValue {
    /// The label applies to the instance.
    True,
    /// The label does not apply.
    False,
    /// The label was not annotated for this instance.
    Missing,
}

impl LabelValue {
    /// Parse a source-format cell (`"1"`, `"0"`, `"?"` or empty).
    pub fn parse(raw: &str, label: &str, row: usize) -> Result<Self, DatasetError> {
        match raw.trim() {
            "1" => Ok(Self::True),
            "0" => Ok(Self::False),
            "?" | "" => Ok(Self::Missing),
            other => Err(DatasetError::InvalidLabelValue {
                value: other.to_string(),
                label: label.to_string(),
                row,
            }),
        }
    }

    /// Whether this cell counts as positive (exactly `True`).
    pub fn is_true(self) -> bool {
        matches!(self, Self::True)
    }
}

/// A dense multi-label dataset: feature columns plus label columns.
///
/// Rows are instances. The feature matrix and the label matrix are row-major
/// and share row indices. Both matrices are immutable after construction;
/// transforms return new datasets.
#[derive(Debug, Clone)]
pub struct MultiLabelDataset {
    label_names: Vec<String>,
    features: Vec<Vec<f32>>,
    labels: Vec<Vec<LabelValue>>,
}

impl MultiLabelDataset {
    /// Build a dataset, validating rectangular shape and label-name uniqueness.
    pub fn new(
        label_names: Vec<String>,
        features: Vec<Vec<f32>>,
        labels: Vec<Vec<LabelValue>>,
    ) -> Result<Self, DatasetError> {
        if features.len() != labels.len() {
            return Err(DatasetError::RowCountMismatch {
                feature_rows: features.len(),
                label_rows: labels.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for name in &label_names {
            if !seen.insert(name.as_str()) {
                return Err(DatasetError::DuplicateLabel { name: name.clone() });
            }
        }
        let feature_len = features.first().map(Vec::len).unwrap_or(0);
        for (row, values) in features.iter().enumerate() {
            if values.len() != feature_len {
                return Err(DatasetError::RowLengthMismatch {
                    row,
                    kind: "feature",
                    got: values.len(),
                    expected: feature_len,
                });
            }
        }
        for (row, values) in labels.iter().enumerate() {
            if values.len() != label_names.len() {
                return Err(DatasetError::RowLengthMismatch {
                    row,
                    kind: "label",
                    got: values.len(),
                    expected: label_names.len(),
                });
            }
        }
        Ok(Self {
            label_names,
            features,
            labels,
        })
    }

    /// Build a dataset from raw string label cells, parsing each into a
    /// [`LabelValue`] at this boundary.
    pub fn from_raw_labels(
        label_names: Vec<String>,
        features: Vec<Vec<f32>>,
        raw_labels: Vec<Vec<String>>,
    ) -> Result<Self, DatasetError> {
        let mut labels = Vec::with_capacity(raw_labels.len());
        for (row, cells) in raw_labels.iter().enumerate() {
            if cells.len() != label_names.len() {
                return Err(DatasetError::RowLengthMismatch {
                    row,
                    kind: "label",
                    got: cells.len(),
                    expected: label_names.len(),
                });
            }
            let mut parsed = Vec::with_capacity(cells.len());
            for (col, cell) in cells.iter().enumerate() {
                parsed.push(LabelValue::parse(cell, &label_names[col], row)?);
            }
            labels.push(parsed);
        }
        Self::new(label_names, features, labels)
    }

    /// Number of instances.
    pub fn num_rows(&self) -> usize {
        self.features.len()
    }

    /// Number of label columns.
    pub fn num_labels(&self) -> usize {
        self.label_names.len()
    }

    /// Ordered label column names.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Feature vector of one instance.
    pub fn features_of(&self, row: usize) -> &[f32] {
        &self.features[row]
    }

    /// Label row of one instance, aligned with [`Self::label_names`].
    pub fn labels_of(&self, row: usize) -> &[LabelValue] {
        &self.labels[row]
    }

    /// Column index of a label name.
    pub fn label_index(&self, name: &str) -> Option<usize> {
        self.label_names.iter().position(|n| n == name)
    }

    /// Value of one label cell, addressed by name.
    pub fn label_value(&self, row: usize, name: &str) -> Result<LabelValue, DatasetError> {
        let col = self
            .label_index(name)
            .ok_or_else(|| DatasetError::UnknownLabel {
                name: name.to_string(),
            })?;
        Ok(self.labels[row][col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_dataset() -> MultiLabelDataset {
        MultiLabelDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![
                vec![LabelValue::True, LabelValue::False],
                vec![LabelValue::Missing, LabelValue::True],
            ],
        )
        .unwrap()
    }

    #[test]
    fn parse_accepts_tri_state_tokens() {
        assert_eq!(LabelValue::parse("1", "a", 0).unwrap(), LabelValue::True);
        assert_eq!(LabelValue::parse("0", "a", 0).unwrap(), LabelValue::False);
        assert_eq!(LabelValue::parse("?", "a", 0).unwrap(), LabelValue::Missing);
        assert_eq!(LabelValue::parse(" ", "a", 0).unwrap(), LabelValue::Missing);
    }

    #[test]
    fn parse_rejects_anything_else() {
        let err = LabelValue::parse("yes", "a", 3).unwrap_err();
        match err {
            DatasetError::InvalidLabelValue { value, label, row } => {
                assert_eq!(value, "yes");
                assert_eq!(label, "a");
                assert_eq!(row, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn new_rejects_duplicate_label_names() {
        let err = MultiLabelDataset::new(
            vec!["a".into(), "a".into()],
            vec![vec![0.0]],
            vec![vec![LabelValue::False, LabelValue::False]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateLabel { .. }));
    }

    #[test]
    fn new_rejects_ragged_rows() {
        let err = MultiLabelDataset::new(
            vec!["a".into()],
            vec![vec![0.0, 1.0], vec![0.0]],
            vec![vec![LabelValue::False], vec![LabelValue::False]],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::RowLengthMismatch { row: 1, .. }));
    }

    #[test]
    fn label_value_by_name() {
        let data = two_row_dataset();
        assert_eq!(data.label_value(1, "b").unwrap(), LabelValue::True);
        assert!(matches!(
            data.label_value(0, "zzz"),
            Err(DatasetError::UnknownLabel { .. })
        ));
    }
}
