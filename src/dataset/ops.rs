//! Pure dataset transforms: label projection, positive filtering, validation.
//!
//! Every transform copies; the source dataset is never mutated. Row and
//! column order are preserved.

use std::collections::BTreeSet;

use crate::hierarchy::LabelHierarchy;

use super::{DatasetError, MultiLabelDataset};

impl MultiLabelDataset {
    /// Keep only the label columns named in `keep`; drop the rest.
    ///
    /// Feature columns and rows are untouched, so the result has the same row
    /// count and `|keep ∩ labels|` label columns, in their original order.
    /// Projecting twice with the same set is a no-op the second time.
    pub fn project_labels(&self, keep: &BTreeSet<String>) -> MultiLabelDataset {
        let kept_cols: Vec<usize> = self
            .label_names
            .iter()
            .enumerate()
            .filter(|(_, name)| keep.contains(name.as_str()))
            .map(|(col, _)| col)
            .collect();
        let label_names = kept_cols
            .iter()
            .map(|&col| self.label_names[col].clone())
            .collect();
        let labels = self
            .labels
            .iter()
            .map(|row| kept_cols.iter().map(|&col| row[col]).collect())
            .collect();
        MultiLabelDataset {
            label_names,
            features: self.features.clone(),
            labels,
        }
    }

    /// Keep only the rows where `label` is exactly true.
    ///
    /// Rows where the value is false or missing are dropped. Feature values of
    /// surviving rows are copied unchanged.
    pub fn filter_positive(&self, label: &str) -> Result<MultiLabelDataset, DatasetError> {
        let col = self
            .label_index(label)
            .ok_or_else(|| DatasetError::UnknownLabel {
                name: label.to_string(),
            })?;
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for row in 0..self.num_rows() {
            if self.labels[row][col].is_true() {
                features.push(self.features[row].clone());
                labels.push(self.labels[row].clone());
            }
        }
        Ok(MultiLabelDataset {
            label_names: self.label_names.clone(),
            features,
            labels,
        })
    }
}

/// Check the ancestor invariant over every row: a true label requires a true
/// parent, all the way to a hierarchy root.
///
/// Labels absent from the hierarchy and parents absent from the dataset are
/// skipped; only violations between columns both present are reported.
pub fn validate_consistency(
    dataset: &MultiLabelDataset,
    hierarchy: &LabelHierarchy,
) -> Result<(), DatasetError> {
    for row in 0..dataset.num_rows() {
        let values = dataset.labels_of(row);
        for (col, name) in dataset.label_names().iter().enumerate() {
            if !values[col].is_true() {
                continue;
            }
            let Ok(Some(parent)) = hierarchy.parent_of(name) else {
                continue;
            };
            let Some(parent_col) = dataset.label_index(parent) else {
                continue;
            };
            if !values[parent_col].is_true() {
                return Err(DatasetError::InconsistentRow {
                    row,
                    label: name.clone(),
                    parent: parent.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LabelValue;

    fn dataset() -> MultiLabelDataset {
        // 5 rows, labels [a, b]; a true on rows 0, 2, 4.
        let rows = [
            (vec![0.0, 10.0], LabelValue::True, LabelValue::False),
            (vec![1.0, 11.0], LabelValue::False, LabelValue::True),
            (vec![2.0, 12.0], LabelValue::True, LabelValue::Missing),
            (vec![3.0, 13.0], LabelValue::Missing, LabelValue::False),
            (vec![4.0, 14.0], LabelValue::True, LabelValue::True),
        ];
        MultiLabelDataset::new(
            vec!["a".into(), "b".into()],
            rows.iter().map(|(f, _, _)| f.clone()).collect(),
            rows.iter().map(|(_, a, b)| vec![*a, *b]).collect(),
        )
        .unwrap()
    }

    fn keep(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn project_keeps_rows_and_drops_columns() {
        let data = dataset();
        let projected = data.project_labels(&keep(&["b"]));
        assert_eq!(projected.num_rows(), 5);
        assert_eq!(projected.label_names(), ["b".to_string()]);
        assert_eq!(projected.features_of(2), &[2.0, 12.0]);
        assert_eq!(projected.labels_of(0), &[LabelValue::False]);
    }

    #[test]
    fn project_is_idempotent() {
        let data = dataset();
        let set = keep(&["a"]);
        let once = data.project_labels(&set);
        let twice = once.project_labels(&set);
        assert_eq!(once.label_names(), twice.label_names());
        assert_eq!(once.num_rows(), twice.num_rows());
        for row in 0..once.num_rows() {
            assert_eq!(once.labels_of(row), twice.labels_of(row));
            assert_eq!(once.features_of(row), twice.features_of(row));
        }
    }

    #[test]
    fn filter_positive_returns_exactly_the_true_rows() {
        let data = dataset();
        let filtered = data.filter_positive("a").unwrap();
        assert_eq!(filtered.num_rows(), 3);
        // Rows 0, 2, 4 survive with features unchanged; missing is dropped.
        assert_eq!(filtered.features_of(0), &[0.0, 10.0]);
        assert_eq!(filtered.features_of(1), &[2.0, 12.0]);
        assert_eq!(filtered.features_of(2), &[4.0, 14.0]);
    }

    #[test]
    fn filter_positive_never_grows() {
        let data = dataset();
        assert!(data.filter_positive("b").unwrap().num_rows() <= data.num_rows());
    }

    #[test]
    fn filter_positive_rejects_unknown_label() {
        assert!(matches!(
            dataset().filter_positive("nope"),
            Err(DatasetError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn consistency_flags_true_child_under_false_parent() {
        let hierarchy =
            LabelHierarchy::from_parent_pairs(&[("a", None), ("b", Some("a"))]).unwrap();
        let data = MultiLabelDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![0.0], vec![0.0]],
            vec![
                vec![LabelValue::True, LabelValue::True],
                vec![LabelValue::False, LabelValue::True],
            ],
        )
        .unwrap();
        let err = validate_consistency(&data, &hierarchy).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InconsistentRow { row: 1, .. }
        ));
    }

    #[test]
    fn consistency_accepts_valid_rows() {
        let hierarchy =
            LabelHierarchy::from_parent_pairs(&[("a", None), ("b", Some("a"))]).unwrap();
        let data = MultiLabelDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![0.0]],
            vec![vec![LabelValue::True, LabelValue::True]],
        )
        .unwrap();
        assert!(validate_consistency(&data, &hierarchy).is_ok());
    }
}
