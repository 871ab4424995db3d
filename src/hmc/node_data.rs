//! Per-node training views over the full dataset.
//!
//! For a hierarchy node the local subproblem keeps the feature columns
//! unchanged, keeps only the node's immediate children as label columns, and
//! (for non-root nodes) keeps only the instances that were positive for the
//! node's own label in the parent's view.

use std::collections::BTreeSet;

use crate::dataset::MultiLabelDataset;
use crate::hierarchy::LabelHierarchy;

use super::HmcError;

/// Derives node-local datasets from a dataset and a label hierarchy.
///
/// `node = None` addresses the synthetic root above the hierarchy's top-level
/// labels; `node = Some(name)` addresses the hierarchy node of that label.
#[derive(Debug, Clone, Copy)]
pub struct NodeDatasetBuilder<'h> {
    hierarchy: &'h LabelHierarchy,
}

impl<'h> NodeDatasetBuilder<'h> {
    pub fn new(hierarchy: &'h LabelHierarchy) -> Self {
        Self { hierarchy }
    }

    /// The label columns a node's model predicts: the hierarchy's top-level
    /// labels for the root, otherwise the node's direct children.
    pub fn child_labels(&self, node: Option<&str>) -> Result<Vec<String>, HmcError> {
        let names = match node {
            None => self.hierarchy.root_labels(),
            Some(name) => self.hierarchy.children_of(name)?,
        };
        Ok(names.into_iter().map(String::from).collect())
    }

    /// Labels visible to a node's subproblem: its strict descendants plus,
    /// for a non-root node, its own label.
    pub fn available_labels(&self, node: Option<&str>) -> Result<BTreeSet<String>, HmcError> {
        match node {
            None => Ok(self.hierarchy.labels().map(String::from).collect()),
            Some(name) => {
                let mut available = self.hierarchy.descendants_of(name)?.clone();
                available.insert(name.to_string());
                Ok(available)
            }
        }
    }

    /// The dataset a node's model trains on: `data` with every label column
    /// in `available − children` dropped. Rows are untouched.
    pub fn node_view(
        &self,
        data: &MultiLabelDataset,
        node: Option<&str>,
    ) -> Result<MultiLabelDataset, HmcError> {
        let children: BTreeSet<String> = self.child_labels(node)?.into_iter().collect();
        let available = self.available_labels(node)?;
        let keep: BTreeSet<String> = data
            .label_names()
            .iter()
            .filter(|name| children.contains(*name) || !available.contains(*name))
            .cloned()
            .collect();
        Ok(data.project_labels(&keep))
    }

    /// The dataset handed to the recursion for child `child` of `node`: only
    /// rows positive for `child`, and only label columns inside `child`'s
    /// subtree (its own label included, so the child frame sees it).
    pub fn child_view(
        &self,
        data: &MultiLabelDataset,
        node: Option<&str>,
        child: &str,
    ) -> Result<MultiLabelDataset, HmcError> {
        let available = self.available_labels(node)?;
        let mut subtree = self.hierarchy.descendants_of(child)?.clone();
        subtree.insert(child.to_string());
        let filtered = data.filter_positive(child)?;
        let keep: BTreeSet<String> = filtered
            .label_names()
            .iter()
            .filter(|name| subtree.contains(*name) || !available.contains(*name))
            .cloned()
            .collect();
        Ok(filtered.project_labels(&keep))
    }
}
