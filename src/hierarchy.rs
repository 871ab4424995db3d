//! Label hierarchy: a forest of label names with cached descendant sets.
//!
//! Nodes live in an arena and reference each other by index, so the tree can
//! be walked without reference cycles. A hierarchy is built once before
//! training and is read-only afterward.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Errors produced while building or querying a hierarchy.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A referenced node name is absent from the hierarchy.
    #[error("unknown hierarchy node {name:?}")]
    UnknownNode { name: String },
    /// The same label name was declared twice.
    #[error("duplicate hierarchy node {name:?}")]
    DuplicateNode { name: String },
    /// The parent links do not form a forest.
    #[error("hierarchy contains a cycle through {name:?}")]
    Cycle { name: String },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    /// Names of all strict descendants (self excluded).
    descendants: BTreeSet<String>,
}

/// A forest of label nodes, addressed by name.
///
/// Roots are the nodes without a parent; the synthetic HMC root above them is
/// the tree engine's concern, not the hierarchy's.
#[derive(Debug, Clone)]
pub struct LabelHierarchy {
    nodes: Vec<Node>,
    index: BTreeMap<String, usize>,
    roots: Vec<usize>,
}

impl LabelHierarchy {
    /// Build a hierarchy from `(label, parent)` pairs, `None` marking a root.
    ///
    /// Pairs may arrive in any order; a parent may be declared after its
    /// children. Duplicate names, unknown parents and cyclic parent links are
    /// rejected.
    pub fn from_parent_pairs(pairs: &[(&str, Option<&str>)]) -> Result<Self, HierarchyError> {
        let mut nodes: Vec<Node> = Vec::with_capacity(pairs.len());
        let mut index = BTreeMap::new();
        for (name, _) in pairs {
            if index.insert(name.to_string(), nodes.len()).is_some() {
                return Err(HierarchyError::DuplicateNode {
                    name: name.to_string(),
                });
            }
            nodes.push(Node {
                name: name.to_string(),
                parent: None,
                children: Vec::new(),
                descendants: BTreeSet::new(),
            });
        }
        let mut roots = Vec::new();
        for (id, (name, parent)) in pairs.iter().enumerate() {
            match parent {
                None => roots.push(id),
                Some(parent_name) => {
                    let parent_id =
                        *index
                            .get(*parent_name)
                            .ok_or_else(|| HierarchyError::UnknownNode {
                                name: parent_name.to_string(),
                            })?;
                    if parent_id == id {
                        return Err(HierarchyError::Cycle {
                            name: name.to_string(),
                        });
                    }
                    nodes[id].parent = Some(parent_id);
                    nodes[parent_id].children.push(id);
                }
            }
        }
        let mut hierarchy = Self {
            nodes,
            index,
            roots,
        };
        hierarchy.check_acyclic()?;
        hierarchy.cache_descendants();
        Ok(hierarchy)
    }

    /// Every node must be reachable from a root; otherwise the parent links
    /// contain a cycle.
    fn check_acyclic(&self) -> Result<(), HierarchyError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<usize> = self.roots.clone();
        while let Some(id) = stack.pop() {
            if visited[id] {
                continue;
            }
            visited[id] = true;
            stack.extend(&self.nodes[id].children);
        }
        match visited.iter().position(|seen| !seen) {
            Some(id) => Err(HierarchyError::Cycle {
                name: self.nodes[id].name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn cache_descendants(&mut self) {
        // Post-order over each root so children are cached before parents.
        fn fill(nodes: &mut Vec<Node>, id: usize) {
            let children = nodes[id].children.clone();
            let mut all = BTreeSet::new();
            for child in children {
                fill(nodes, child);
                all.insert(nodes[child].name.clone());
                all.extend(nodes[child].descendants.iter().cloned());
            }
            nodes[id].descendants = all;
        }
        let roots = self.roots.clone();
        for root in roots {
            fill(&mut self.nodes, root);
        }
    }

    fn node(&self, name: &str) -> Result<&Node, HierarchyError> {
        let id = self
            .index
            .get(name)
            .ok_or_else(|| HierarchyError::UnknownNode {
                name: name.to_string(),
            })?;
        Ok(&self.nodes[*id])
    }

    /// Whether `name` is a node of this hierarchy.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the hierarchy has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names of the top-level nodes, in declaration order.
    pub fn root_labels(&self) -> Vec<&str> {
        self.roots
            .iter()
            .map(|&id| self.nodes[id].name.as_str())
            .collect()
    }

    /// Direct children of a node, in declaration order.
    pub fn children_of(&self, name: &str) -> Result<Vec<&str>, HierarchyError> {
        let node = self.node(name)?;
        Ok(node
            .children
            .iter()
            .map(|&id| self.nodes[id].name.as_str())
            .collect())
    }

    /// All strict descendants of a node (children, grandchildren, ...).
    pub fn descendants_of(&self, name: &str) -> Result<&BTreeSet<String>, HierarchyError> {
        Ok(&self.node(name)?.descendants)
    }

    /// Parent name, or `None` for a root.
    pub fn parent_of(&self, name: &str) -> Result<Option<&str>, HierarchyError> {
        let node = self.node(name)?;
        Ok(node.parent.map(|id| self.nodes[id].name.as_str()))
    }

    /// Ancestor chain from the immediate parent up to a root.
    pub fn ancestors_of(&self, name: &str) -> Result<Vec<&str>, HierarchyError> {
        let mut node = self.node(name)?;
        let mut ancestors = Vec::new();
        while let Some(parent_id) = node.parent {
            node = &self.nodes[parent_id];
            ancestors.push(node.name.as_str());
        }
        Ok(ancestors)
    }

    /// Whether a node has no children.
    pub fn is_leaf(&self, name: &str) -> Result<bool, HierarchyError> {
        Ok(self.node(name)?.children.is_empty())
    }

    /// Names of every node, in arena order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name.as_str())
    }

    /// Names of all leaf nodes, in arena order.
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.children.is_empty())
            .map(|node| node.name.as_str())
            .collect()
    }

    /// Names of all internal (non-leaf) nodes, in arena order.
    pub fn internal_labels(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| !node.children.is_empty())
            .map(|node| node.name.as_str())
            .collect()
    }
}
