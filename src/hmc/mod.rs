//! Hierarchical multi-label classification with one local classifier per
//! parent node.
//!
//! [`HmcTree`] trains one base learner per internal hierarchy node (plus a
//! synthetic root over the top-level labels) and predicts top-down, pruning
//! every subtree whose parent label came out negative.
//! [`NodeDatasetBuilder`] derives each node's training view: only the node's
//! immediate children survive as label columns, and only parent-positive rows
//! survive as instances.

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::hierarchy::HierarchyError;
use crate::learner::LearnerError;

mod node_data;
mod tree;

pub use node_data::NodeDatasetBuilder;
pub use tree::{HmcPrediction, HmcReport, HmcTree};

/// Errors produced while building or querying an HMC tree.
///
/// Build failures are fail-fast: a failed subtree aborts the whole build and
/// no partial tree is returned.
#[derive(Debug, Error)]
pub enum HmcError {
    /// A hierarchy lookup failed.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    /// A dataset transform failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// A hierarchy node has no matching label column in the training dataset.
    #[error("hierarchy node {name:?} is not a label column of the training dataset")]
    MissingLabelColumn { name: String },
    /// The base learner failed to train at a node.
    #[error("training the model for node {node:?} failed: {source}")]
    Training {
        node: String,
        source: LearnerError,
    },
    /// The base learner failed to evaluate at a node.
    #[error("evaluating the model for node {node:?} failed: {source}")]
    Prediction {
        node: String,
        source: LearnerError,
    },
}
