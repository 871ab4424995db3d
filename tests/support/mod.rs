//! Shared helpers for the engine integration tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use hierlab::dataset::MultiLabelDataset;
use hierlab::learner::{BaseLearner, LearnerError, Prediction};

/// Scripted outputs for a [`ScriptedLearner`], keyed by the comma-joined
/// label columns a node model was trained on.
pub type Script = BTreeMap<String, Vec<(bool, f32)>>;

/// Log of node keys in evaluation order, shared across all learners created
/// by one factory.
pub type EvalLog = Rc<RefCell<Vec<String>>>;

/// A stub base learner with fully scripted predictions.
///
/// `train` only records the label schema; `predict` replays the scripted
/// bipartition/confidence row for that schema and appends the schema key to
/// the shared log, which lets tests assert exactly which node models ran.
pub struct ScriptedLearner {
    labels: Vec<String>,
    script: Rc<Script>,
    log: EvalLog,
}

impl ScriptedLearner {
    pub fn factory(
        script: Script,
    ) -> (impl FnMut() -> Box<dyn BaseLearner>, EvalLog) {
        let script = Rc::new(script);
        let log: EvalLog = Rc::new(RefCell::new(Vec::new()));
        let log_handle = Rc::clone(&log);
        let factory = move || {
            Box::new(ScriptedLearner {
                labels: Vec::new(),
                script: Rc::clone(&script),
                log: Rc::clone(&log),
            }) as Box<dyn BaseLearner>
        };
        (factory, log_handle)
    }

    fn key(&self) -> String {
        self.labels.join(",")
    }
}

impl BaseLearner for ScriptedLearner {
    fn train(&mut self, dataset: &MultiLabelDataset) -> Result<(), LearnerError> {
        if dataset.num_labels() == 0 {
            return Err(LearnerError::NoLabels);
        }
        self.labels = dataset.label_names().to_vec();
        Ok(())
    }

    fn predict(&self, _features: &[f32]) -> Result<Prediction, LearnerError> {
        if self.labels.is_empty() {
            return Err(LearnerError::NotTrained);
        }
        let key = self.key();
        self.log.borrow_mut().push(key.clone());
        let row = self
            .script
            .get(&key)
            .cloned()
            .unwrap_or_else(|| vec![(false, 0.0); self.labels.len()]);
        Ok(Prediction {
            bipartition: row.iter().map(|(b, _)| *b).collect(),
            confidences: row.iter().map(|(_, c)| *c).collect(),
        })
    }

    fn trained_labels(&self) -> &[String] {
        &self.labels
    }
}

/// Build a dataset from raw `"0"`/`"1"`/`"?"` label rows.
pub fn raw_dataset(
    label_names: &[&str],
    rows: &[(Vec<f32>, &[&str])],
) -> MultiLabelDataset {
    MultiLabelDataset::from_raw_labels(
        label_names.iter().map(|s| s.to_string()).collect(),
        rows.iter().map(|(f, _)| f.clone()).collect(),
        rows.iter()
            .map(|(_, l)| l.iter().map(|s| s.to_string()).collect())
            .collect(),
    )
    .expect("valid test dataset")
}
