//! HOMER: hierarchy-of-multilabel-classifiers over an artificial hierarchy.
//!
//! HOMER makes the HMC engine usable on a flat label set: a
//! [`HierarchyBuilder`] clusters the labels into a balanced tree of synthetic
//! meta-labels, the dataset is augmented with one OR-of-descendants column per
//! meta-label, and an [`crate::hmc::HmcTree`] is trained on the result. At
//! prediction time the meta-label entries are stripped again, so callers only
//! ever see the original labels.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::dataset::{DatasetError, LabelValue, MultiLabelDataset};
use crate::hierarchy::{HierarchyError, LabelHierarchy};
use crate::hmc::{HmcError, HmcPrediction, HmcReport, HmcTree};
use crate::learner::BaseLearner;

mod cluster;

pub use cluster::{BalancedKMeansBuilder, ClusterOptions};

/// Errors produced by HOMER's hierarchy synthesis and delegation.
#[derive(Debug, Error)]
pub enum HomerError {
    /// The label set cannot be partitioned as requested.
    #[error("hierarchy construction failed: {reason}")]
    HierarchyConstruction { reason: String },
    /// The delegated HMC build or prediction failed.
    #[error(transparent)]
    Hmc(#[from] HmcError),
    /// The synthesized hierarchy is malformed.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    /// Augmenting the dataset failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Synthesizes a label hierarchy for a flat label set.
///
/// Contract: the returned hierarchy's leaves are exactly the dataset's labels
/// and every internal node is a fresh meta-label; each group along the
/// recursion has at most `num_clusters` members.
pub trait HierarchyBuilder {
    fn build_label_hierarchy(
        &self,
        dataset: &MultiLabelDataset,
        num_clusters: usize,
    ) -> Result<LabelHierarchy, HomerError>;
}

/// Append one label column per meta-label (internal hierarchy node) to the
/// dataset, valued as the OR of the meta-label's descendant leaves.
///
/// Meta columns land strictly after all original columns, in hierarchy arena
/// order; a missing leaf value counts as not-true. That ordering is what lets
/// [`Homer::predict`] recover the original labels by taking a prefix.
pub fn hierarchical_dataset(
    dataset: &MultiLabelDataset,
    hierarchy: &LabelHierarchy,
) -> Result<MultiLabelDataset, HomerError> {
    let metas: Vec<&str> = hierarchy.internal_labels();
    let mut label_names: Vec<String> = dataset.label_names().to_vec();
    label_names.extend(metas.iter().map(|m| m.to_string()));

    let mut features = Vec::with_capacity(dataset.num_rows());
    let mut labels = Vec::with_capacity(dataset.num_rows());
    for row in 0..dataset.num_rows() {
        let mut values = dataset.labels_of(row).to_vec();
        for meta in &metas {
            let descendants = hierarchy.descendants_of(meta)?;
            let any_true = descendants.iter().any(|leaf| {
                dataset
                    .label_index(leaf)
                    .is_some_and(|col| dataset.labels_of(row)[col].is_true())
            });
            values.push(if any_true {
                LabelValue::True
            } else {
                LabelValue::False
            });
        }
        features.push(dataset.features_of(row).to_vec());
        labels.push(values);
    }
    Ok(MultiLabelDataset::new(label_names, features, labels)?)
}

/// Counter snapshot of a HOMER model, including hierarchy shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomerReport {
    /// Number of synthetic meta-labels in the hierarchy.
    pub num_meta_labels: u64,
    /// Delegated HMC counters.
    pub hmc: HmcReport,
}

/// A trained HOMER model: an HMC tree over a synthesized hierarchy, with
/// meta-labels stripped from every prediction.
pub struct Homer {
    tree: HmcTree,
    num_leaf_labels: usize,
    num_meta_labels: usize,
}

impl std::fmt::Debug for Homer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Homer")
            .field("num_leaf_labels", &self.num_leaf_labels)
            .field("num_meta_labels", &self.num_meta_labels)
            .finish_non_exhaustive()
    }
}

impl Homer {
    /// Synthesize a hierarchy for `dataset`'s labels, augment the dataset
    /// with meta-label columns, and train the delegated HMC tree.
    ///
    /// A builder failure (for example `num_clusters` not smaller than the
    /// label count) is surfaced as-is; there is no retry.
    pub fn build<F>(
        dataset: &MultiLabelDataset,
        num_clusters: usize,
        builder: &dyn HierarchyBuilder,
        new_learner: F,
    ) -> Result<Self, HomerError>
    where
        F: FnMut() -> Box<dyn BaseLearner>,
    {
        let hierarchy = builder.build_label_hierarchy(dataset, num_clusters)?;
        let num_meta_labels = hierarchy.internal_labels().len();
        debug!(
            labels = dataset.num_labels(),
            meta_labels = num_meta_labels,
            "synthesized artificial hierarchy"
        );
        let augmented = hierarchical_dataset(dataset, &hierarchy)?;
        let tree = HmcTree::build(&augmented, hierarchy, new_learner)?;
        Ok(Self {
            tree,
            num_leaf_labels: dataset.num_labels(),
            num_meta_labels,
        })
    }

    /// Predict the original (meta-free) label vector for one feature vector.
    pub fn predict(&self, features: &[f32]) -> Result<HmcPrediction, HomerError> {
        let mut prediction = self.tree.predict(features)?;
        prediction.bipartition.truncate(self.num_leaf_labels);
        prediction.confidences.truncate(self.num_leaf_labels);
        Ok(prediction)
    }

    /// Ordered names of the user-visible labels.
    pub fn label_order(&self) -> &[String] {
        &self.tree.label_order()[..self.num_leaf_labels]
    }

    /// Number of synthetic meta-labels in the hierarchy.
    pub fn num_meta_labels(&self) -> usize {
        self.num_meta_labels
    }

    /// The delegated HMC tree, for counter queries.
    pub fn tree(&self) -> &HmcTree {
        &self.tree
    }

    /// Counter snapshot for evaluation tooling.
    pub fn report(&self) -> HomerReport {
        HomerReport {
            num_meta_labels: self.num_meta_labels as u64,
            hmc: self.tree.report(),
        }
    }
}
