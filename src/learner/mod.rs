//! Base-learner seam for the hierarchy engines.
//!
//! Any multi-label algorithm usable as a node model implements [`BaseLearner`]:
//! train on a dataset whose label columns are the targets, then predict a
//! bipartition plus per-label confidences for a feature vector. The tree
//! engines own one boxed learner per node and create fresh instances through a
//! caller-supplied factory closure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::MultiLabelDataset;

mod logistic;
mod prior;

pub use logistic::{LogisticLearner, TrainOptions};
pub use prior::PriorLearner;

/// Errors produced by base-learner training and prediction.
#[derive(Debug, Error)]
pub enum LearnerError {
    /// The training dataset has no rows.
    #[error("training dataset is empty")]
    EmptyDataset,
    /// The training dataset has no label columns to predict.
    #[error("training dataset has no label columns")]
    NoLabels,
    /// `predict` was called before `train`.
    #[error("learner has not been trained")]
    NotTrained,
    /// The instance's feature vector does not match the trained schema.
    #[error("feature vector has length {got}, model expects {expected}")]
    FeatureLengthMismatch { got: usize, expected: usize },
}

/// Output of one model evaluation: a bipartition over the model's label
/// columns plus a positive-class confidence per column, in training order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted-true flags, one per trained label column.
    pub bipartition: Vec<bool>,
    /// Confidence that each label is positive, aligned with `bipartition`.
    pub confidences: Vec<f32>,
}

/// A trainable multi-label model usable as a per-node classifier.
///
/// Implementations must treat every label column of the training dataset as a
/// target and must preserve column order in [`Prediction`].
pub trait BaseLearner {
    /// Fit the model to the dataset. Failures abort the enclosing build.
    fn train(&mut self, dataset: &MultiLabelDataset) -> Result<(), LearnerError>;

    /// Evaluate the trained model on one feature vector.
    fn predict(&self, features: &[f32]) -> Result<Prediction, LearnerError>;

    /// Ordered names of the label columns this model was trained on.
    fn trained_labels(&self) -> &[String];
}
