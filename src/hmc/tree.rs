//! Recursive build/predict engine over a label hierarchy.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::MultiLabelDataset;
use crate::hierarchy::LabelHierarchy;
use crate::learner::BaseLearner;

use super::{HmcError, NodeDatasetBuilder};

/// One trained node of the tree: the local model plus the ordered label
/// columns it predicts. Children exist only for child labels that are
/// themselves internal hierarchy nodes.
struct HmcNode {
    /// `None` for the synthetic root.
    name: Option<String>,
    model: Box<dyn BaseLearner>,
    /// Label columns of this node's training view, in model output order.
    child_labels: Vec<String>,
    children: BTreeMap<String, HmcNode>,
}

impl HmcNode {
    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }
}

/// Counters accumulated through the build recursion.
#[derive(Debug, Default, Clone, Copy)]
struct BuildStats {
    nodes_built: u64,
    instances_used: u64,
}

/// Snapshot of a tree's cost counters, for external evaluation tooling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HmcReport {
    /// Number of node models trained.
    pub nodes_built: u64,
    /// Sum of training rows over all node models.
    pub train_instances_used: u64,
    /// Running total of model evaluations over all predictions so far.
    pub classifier_evals: u64,
}

/// One instance's prediction over the flat label set.
#[derive(Debug, Clone)]
pub struct HmcPrediction {
    /// Predicted-true flags, aligned with the tree's label order.
    pub bipartition: Vec<bool>,
    /// Per-label confidences, aligned with `bipartition`.
    pub confidences: Vec<f32>,
    /// Model evaluations this prediction needed.
    pub classifier_evals: u64,
}

/// A trained hierarchical multi-label classifier.
///
/// Built once by [`HmcTree::build`], immutable afterward. Prediction walks the
/// tree top-down: a node's model decides its children labels, positive
/// internal children are recursed into, and negative children have their
/// whole descendant set forced false without evaluating any model below them.
/// That pruning is what makes every returned bipartition hierarchy-consistent
/// by construction.
pub struct HmcTree {
    hierarchy: LabelHierarchy,
    label_order: Vec<String>,
    label_index: BTreeMap<String, usize>,
    root: HmcNode,
    nodes_built: u64,
    instances_used: u64,
    classifier_evals: AtomicU64,
}

impl std::fmt::Debug for HmcTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmcTree")
            .field("label_order", &self.label_order)
            .field("nodes_built", &self.nodes_built)
            .field("instances_used", &self.instances_used)
            .finish_non_exhaustive()
    }
}

impl HmcTree {
    /// Train a tree on `dataset` under `hierarchy`, creating one fresh base
    /// learner per internal node via `new_learner`.
    ///
    /// Fails fast: any learner training error aborts the build with the
    /// offending node's name attached, and no partial tree is returned.
    pub fn build<F>(
        dataset: &MultiLabelDataset,
        hierarchy: LabelHierarchy,
        mut new_learner: F,
    ) -> Result<Self, HmcError>
    where
        F: FnMut() -> Box<dyn BaseLearner>,
    {
        for name in hierarchy.labels() {
            if dataset.label_index(name).is_none() {
                return Err(HmcError::MissingLabelColumn {
                    name: name.to_string(),
                });
            }
        }
        for name in dataset.label_names() {
            if !hierarchy.contains(name) {
                warn!(label = %name, "dataset label has no hierarchy node; it stays a root-level target");
            }
        }

        let builder = NodeDatasetBuilder::new(&hierarchy);
        let mut stats = BuildStats::default();
        let root = Self::build_recursive(&builder, dataset, None, &mut new_learner, &mut stats)?;
        debug!(
            nodes = stats.nodes_built,
            instances = stats.instances_used,
            "hmc build finished"
        );

        let label_order: Vec<String> = dataset.label_names().to_vec();
        let label_index = label_order
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Ok(Self {
            hierarchy,
            label_order,
            label_index,
            root,
            nodes_built: stats.nodes_built,
            instances_used: stats.instances_used,
            classifier_evals: AtomicU64::new(0),
        })
    }

    fn build_recursive<F>(
        builder: &NodeDatasetBuilder<'_>,
        data: &MultiLabelDataset,
        node: Option<&str>,
        new_learner: &mut F,
        stats: &mut BuildStats,
    ) -> Result<HmcNode, HmcError>
    where
        F: FnMut() -> Box<dyn BaseLearner>,
    {
        let node_name = node.unwrap_or("<root>");
        let node_data = builder.node_view(data, node)?;
        debug!(
            node = %node_name,
            rows = node_data.num_rows(),
            labels = node_data.num_labels(),
            "training node model"
        );

        let mut model = new_learner();
        model
            .train(&node_data)
            .map_err(|source| HmcError::Training {
                node: node_name.to_string(),
                source,
            })?;
        stats.nodes_built += 1;
        stats.instances_used += node_data.num_rows() as u64;

        // The model's output order is the training view's column order, which
        // may differ from the hierarchy's declaration order.
        let child_labels: Vec<String> = node_data.label_names().to_vec();

        let mut children = BTreeMap::new();
        for child in &child_labels {
            let internal = builder
                .child_labels(Some(child.as_str()))
                .map(|grandchildren| !grandchildren.is_empty())
                .unwrap_or(false);
            if !internal {
                continue;
            }
            let child_data = builder.child_view(data, node, child)?;
            let child_node =
                Self::build_recursive(builder, &child_data, Some(child.as_str()), new_learner, stats)?;
            children.insert(child.clone(), child_node);
        }

        Ok(HmcNode {
            name: node.map(String::from),
            model,
            child_labels,
            children,
        })
    }

    /// Predict the flat label vector for one feature vector.
    pub fn predict(&self, features: &[f32]) -> Result<HmcPrediction, HmcError> {
        let mut bipartition = vec![false; self.label_order.len()];
        let mut confidences = vec![0.0f32; self.label_order.len()];
        let mut evals = 0u64;
        self.predict_recursive(&self.root, features, &mut bipartition, &mut confidences, &mut evals)?;
        self.classifier_evals.fetch_add(evals, Ordering::Relaxed);
        Ok(HmcPrediction {
            bipartition,
            confidences,
            classifier_evals: evals,
        })
    }

    fn predict_recursive(
        &self,
        node: &HmcNode,
        features: &[f32],
        bipartition: &mut [bool],
        confidences: &mut [f32],
        evals: &mut u64,
    ) -> Result<(), HmcError> {
        let output = node
            .model
            .predict(features)
            .map_err(|source| HmcError::Prediction {
                node: node.display_name().to_string(),
                source,
            })?;
        *evals += 1;

        for (i, child) in node.child_labels.iter().enumerate() {
            let idx = self.flat_index(child)?;
            confidences[idx] = output.confidences[i];
            if output.bipartition[i] {
                bipartition[idx] = true;
                if let Some(child_node) = node.children.get(child) {
                    self.predict_recursive(child_node, features, bipartition, confidences, evals)?;
                }
            } else {
                bipartition[idx] = false;
                // A negative branch is pruned: every descendant is forced
                // false and inherits this child's confidence, and no model
                // below it is evaluated.
                if let Ok(descendants) = self.hierarchy.descendants_of(child) {
                    for name in descendants {
                        let d = self.flat_index(name)?;
                        bipartition[d] = false;
                        confidences[d] = output.confidences[i];
                    }
                }
            }
        }
        Ok(())
    }

    fn flat_index(&self, name: &str) -> Result<usize, HmcError> {
        self.label_index
            .get(name)
            .copied()
            .ok_or_else(|| HmcError::MissingLabelColumn {
                name: name.to_string(),
            })
    }

    /// Flat label order of predictions, identical to the training dataset's.
    pub fn label_order(&self) -> &[String] {
        &self.label_order
    }

    /// The hierarchy this tree was trained under.
    pub fn hierarchy(&self) -> &LabelHierarchy {
        &self.hierarchy
    }

    /// Number of node models trained.
    pub fn num_nodes(&self) -> u64 {
        self.nodes_built
    }

    /// Sum of training rows over all node models.
    pub fn train_instances_used(&self) -> u64 {
        self.instances_used
    }

    /// Total model evaluations across all predictions so far.
    pub fn classifier_evals(&self) -> u64 {
        self.classifier_evals.load(Ordering::Relaxed)
    }

    /// Counter snapshot for evaluation tooling.
    pub fn report(&self) -> HmcReport {
        HmcReport {
            nodes_built: self.nodes_built,
            train_instances_used: self.instances_used,
            classifier_evals: self.classifier_evals(),
        }
    }
}
