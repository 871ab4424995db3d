//! Binary-relevance logistic regression learner.
//!
//! One independent sigmoid head per label column, fit by seeded mini-batch
//! SGD with L2 regularization. Missing label values contribute no gradient.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::dataset::{LabelValue, MultiLabelDataset};

use super::{BaseLearner, LearnerError, Prediction};

/// Training hyperparameters for [`LogisticLearner`].
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 40,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 64,
            seed: 42,
        }
    }
}

/// Trained weights of one logistic-regression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticModel {
    labels: Vec<String>,
    feature_len: usize,
    /// Row-major `[n_labels][feature_len]`.
    weights: Vec<f32>,
    bias: Vec<f32>,
}

/// Per-label logistic regression over raw feature vectors.
#[derive(Debug, Clone, Default)]
pub struct LogisticLearner {
    options: TrainOptions,
    model: Option<LogisticModel>,
}

impl LogisticLearner {
    pub fn new(options: TrainOptions) -> Self {
        Self {
            options,
            model: None,
        }
    }
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl BaseLearner for LogisticLearner {
    fn train(&mut self, dataset: &MultiLabelDataset) -> Result<(), LearnerError> {
        let n = dataset.num_rows();
        let k = dataset.num_labels();
        if n == 0 {
            return Err(LearnerError::EmptyDataset);
        }
        if k == 0 {
            return Err(LearnerError::NoLabels);
        }
        let dim = dataset.features_of(0).len();

        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let mut weights = vec![0.0f32; k * dim];
        let mut bias = vec![0.0f32; k];
        for w in &mut weights {
            *w = (rng.random::<f32>() - 0.5) * 0.01;
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let batch_size = self.options.batch_size.max(1);
        let lr = self.options.learning_rate;
        let l2 = self.options.l2.max(0.0);

        for _epoch in 0..self.options.epochs {
            indices.shuffle(&mut rng);
            for batch in indices.chunks(batch_size) {
                let mut grad_w = vec![0.0f32; k * dim];
                let mut grad_b = vec![0.0f32; k];
                let mut used = 0usize;
                for &row in batch {
                    let x = dataset.features_of(row);
                    let targets = dataset.labels_of(row);
                    let mut contributed = false;
                    for label in 0..k {
                        let target = match targets[label] {
                            LabelValue::True => 1.0,
                            LabelValue::False => 0.0,
                            LabelValue::Missing => continue,
                        };
                        let w = &weights[label * dim..(label + 1) * dim];
                        let z: f32 = w.iter().zip(x).map(|(wi, xi)| wi * xi).sum::<f32>()
                            + bias[label];
                        let err = sigmoid(z) - target;
                        let gw = &mut grad_w[label * dim..(label + 1) * dim];
                        for (gi, xi) in gw.iter_mut().zip(x) {
                            *gi += err * xi;
                        }
                        grad_b[label] += err;
                        contributed = true;
                    }
                    if contributed {
                        used += 1;
                    }
                }
                if used == 0 {
                    continue;
                }
                let scale = lr / used as f32;
                for (w, g) in weights.iter_mut().zip(&grad_w) {
                    *w -= scale * g + lr * l2 * *w;
                }
                for (b, g) in bias.iter_mut().zip(&grad_b) {
                    *b -= scale * g;
                }
            }
        }

        self.model = Some(LogisticModel {
            labels: dataset.label_names().to_vec(),
            feature_len: dim,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, LearnerError> {
        let model = self.model.as_ref().ok_or(LearnerError::NotTrained)?;
        if features.len() != model.feature_len {
            return Err(LearnerError::FeatureLengthMismatch {
                got: features.len(),
                expected: model.feature_len,
            });
        }
        let k = model.labels.len();
        let dim = model.feature_len;
        let mut confidences = Vec::with_capacity(k);
        for label in 0..k {
            let w = &model.weights[label * dim..(label + 1) * dim];
            let z: f32 =
                w.iter().zip(features).map(|(wi, xi)| wi * xi).sum::<f32>() + model.bias[label];
            confidences.push(sigmoid(z));
        }
        Ok(Prediction {
            bipartition: confidences.iter().map(|&p| p >= 0.5).collect(),
            confidences,
        })
    }

    fn trained_labels(&self) -> &[String] {
        self.model
            .as_ref()
            .map(|m| m.labels.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_dataset() -> MultiLabelDataset {
        // Label "pos" is true exactly when the single feature is > 0.
        let features: Vec<Vec<f32>> = (-10..10).map(|v| vec![v as f32]).collect();
        let labels = (-10..10)
            .map(|v| {
                vec![if v > 0 {
                    LabelValue::True
                } else {
                    LabelValue::False
                }]
            })
            .collect();
        MultiLabelDataset::new(vec!["pos".into()], features, labels).unwrap()
    }

    #[test]
    fn learns_a_separable_label() {
        let data = separable_dataset();
        let mut learner = LogisticLearner::new(TrainOptions {
            epochs: 200,
            ..TrainOptions::default()
        });
        learner.train(&data).unwrap();
        assert!(learner.predict(&[8.0]).unwrap().bipartition[0]);
        assert!(!learner.predict(&[-8.0]).unwrap().bipartition[0]);
    }

    #[test]
    fn training_is_reproducible_for_a_seed() {
        let data = separable_dataset();
        let mut a = LogisticLearner::new(TrainOptions::default());
        let mut b = LogisticLearner::new(TrainOptions::default());
        a.train(&data).unwrap();
        b.train(&data).unwrap();
        assert_eq!(
            a.predict(&[3.0]).unwrap().confidences,
            b.predict(&[3.0]).unwrap().confidences
        );
    }

    #[test]
    fn feature_length_is_checked() {
        let data = separable_dataset();
        let mut learner = LogisticLearner::new(TrainOptions::default());
        learner.train(&data).unwrap();
        assert!(matches!(
            learner.predict(&[1.0, 2.0]),
            Err(LearnerError::FeatureLengthMismatch { .. })
        ));
    }
}
