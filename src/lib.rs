//! Hierarchical multi-label classification.
//!
//! Two engines over one base-learner seam: [`hmc::HmcTree`] trains a local
//! classifier per parent node of a real label hierarchy and predicts top-down
//! with negative-branch pruning, and [`homer::Homer`] makes the same engine
//! work on flat label sets by synthesizing a balanced artificial hierarchy of
//! meta-labels first.

/// Multi-label datasets with tri-state label values and pure transforms.
pub mod dataset;
/// Label hierarchies (arena-backed forests of label names).
pub mod hierarchy;
/// The recursive HMC build/predict engine.
pub mod hmc;
/// The HOMER adapter and its default hierarchy builder.
pub mod homer;
/// Base-learner trait and bundled implementations.
pub mod learner;
/// Tracing subscriber setup for binaries and tests.
pub mod logging;

pub use dataset::{DatasetError, LabelValue, MultiLabelDataset};
pub use hierarchy::{HierarchyError, LabelHierarchy};
pub use hmc::{HmcError, HmcPrediction, HmcTree};
pub use homer::{Homer, HomerError};
pub use learner::{BaseLearner, LearnerError, Prediction};
