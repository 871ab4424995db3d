//! Frequency-prior baseline learner.

use crate::dataset::MultiLabelDataset;

use super::{BaseLearner, LearnerError, Prediction};

/// Baseline learner that ignores features and predicts each label's empirical
/// positive frequency.
///
/// A label is predicted true when at least half of its annotated training
/// values were positive; missing values are excluded from the frequency.
/// Deterministic, which makes it the workhorse of the engine tests.
#[derive(Debug, Clone, Default)]
pub struct PriorLearner {
    labels: Vec<String>,
    frequencies: Vec<f32>,
}

impl PriorLearner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaseLearner for PriorLearner {
    fn train(&mut self, dataset: &MultiLabelDataset) -> Result<(), LearnerError> {
        if dataset.num_rows() == 0 {
            return Err(LearnerError::EmptyDataset);
        }
        if dataset.num_labels() == 0 {
            return Err(LearnerError::NoLabels);
        }
        let k = dataset.num_labels();
        let mut positives = vec![0usize; k];
        let mut annotated = vec![0usize; k];
        for row in 0..dataset.num_rows() {
            for (col, value) in dataset.labels_of(row).iter().enumerate() {
                match value {
                    crate::dataset::LabelValue::True => {
                        positives[col] += 1;
                        annotated[col] += 1;
                    }
                    crate::dataset::LabelValue::False => annotated[col] += 1,
                    crate::dataset::LabelValue::Missing => {}
                }
            }
        }
        self.labels = dataset.label_names().to_vec();
        self.frequencies = (0..k)
            .map(|col| {
                if annotated[col] == 0 {
                    0.0
                } else {
                    positives[col] as f32 / annotated[col] as f32
                }
            })
            .collect();
        Ok(())
    }

    fn predict(&self, _features: &[f32]) -> Result<Prediction, LearnerError> {
        if self.labels.is_empty() {
            return Err(LearnerError::NotTrained);
        }
        Ok(Prediction {
            bipartition: self.frequencies.iter().map(|&f| f >= 0.5).collect(),
            confidences: self.frequencies.clone(),
        })
    }

    fn trained_labels(&self) -> &[String] {
        &self.labels
    }
}
