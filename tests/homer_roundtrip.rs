use hierlab::dataset::{LabelValue, MultiLabelDataset};
use hierlab::homer::{BalancedKMeansBuilder, HierarchyBuilder, Homer, HomerError};
use hierlab::learner::{BaseLearner, PriorLearner};

fn flat_dataset(num_labels: usize, num_rows: usize) -> MultiLabelDataset {
    let label_names: Vec<String> = (0..num_labels).map(|i| format!("l{i}")).collect();
    let features: Vec<Vec<f32>> = (0..num_rows)
        .map(|r| vec![r as f32, (r % 5) as f32])
        .collect();
    let labels: Vec<Vec<LabelValue>> = (0..num_rows)
        .map(|r| {
            (0..num_labels)
                .map(|c| {
                    if (r + c) % 3 == 0 {
                        LabelValue::True
                    } else {
                        LabelValue::False
                    }
                })
                .collect()
        })
        .collect();
    MultiLabelDataset::new(label_names, features, labels).expect("dataset")
}

fn prior_factory() -> impl FnMut() -> Box<dyn BaseLearner> {
    || Box::new(PriorLearner::new()) as Box<dyn BaseLearner>
}

#[test]
fn predictions_round_trip_to_the_original_label_count() {
    hierlab::logging::init();
    let data = flat_dataset(9, 30);
    let builder = BalancedKMeansBuilder::default();
    let homer = Homer::build(&data, 3, &builder, prior_factory()).expect("build");

    let prediction = homer.predict(&[1.0, 1.0]).expect("predict");
    assert_eq!(prediction.bipartition.len(), 9);
    assert_eq!(prediction.confidences.len(), 9);
    assert_eq!(homer.label_order(), data.label_names());
}

#[test]
fn meta_labels_never_leak_into_output() {
    let data = flat_dataset(9, 30);
    let builder = BalancedKMeansBuilder::default();
    let homer = Homer::build(&data, 3, &builder, prior_factory()).expect("build");

    assert!(homer.num_meta_labels() > 0);
    for name in homer.label_order() {
        assert!(
            !name.starts_with("meta"),
            "meta-label {name} leaked into the user-visible order"
        );
    }
    // The delegated tree still sees the full augmented label set.
    assert_eq!(
        homer.tree().label_order().len(),
        9 + homer.num_meta_labels()
    );
}

#[test]
fn builder_failure_surfaces_unchanged() {
    // Fewer labels than clusters: synthesis must fail, with no retry.
    let data = flat_dataset(3, 10);
    let builder = BalancedKMeansBuilder::default();
    let err = Homer::build(&data, 3, &builder, prior_factory()).unwrap_err();
    assert!(matches!(err, HomerError::HierarchyConstruction { .. }));
}

#[test]
fn synthesized_hierarchy_leaves_match_the_flat_labels() {
    let data = flat_dataset(10, 40);
    let builder = BalancedKMeansBuilder::default();
    let hierarchy = builder.build_label_hierarchy(&data, 3).expect("hierarchy");
    let mut leaves: Vec<&str> = hierarchy.leaf_labels();
    leaves.sort_unstable();
    let mut expected: Vec<&str> = data.label_names().iter().map(|s| s.as_str()).collect();
    expected.sort_unstable();
    assert_eq!(leaves, expected);
}

#[test]
fn counters_cover_the_augmented_tree() {
    let data = flat_dataset(9, 30);
    let builder = BalancedKMeansBuilder::default();
    let homer = Homer::build(&data, 3, &builder, prior_factory()).expect("build");

    // One model per internal node of the synthesized hierarchy, plus the
    // synthetic root.
    assert_eq!(
        homer.tree().num_nodes(),
        homer.num_meta_labels() as u64 + 1
    );
    homer.predict(&[0.0, 0.0]).expect("predict");
    assert!(homer.tree().classifier_evals() >= 1);

    let report = homer.report();
    assert_eq!(report.num_meta_labels, homer.num_meta_labels() as u64);
    let json = serde_json::to_string(&report).expect("serialize");
    assert!(json.contains("classifier_evals"));
}
