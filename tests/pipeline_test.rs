//! End-to-end tests for the classification pipeline against a synthetic
//! source and a model persisted to disk.

use neurostate_agent::{
    core::{extract_features, feature_names, select, validate_schema, Prediction, Windower},
    model::{ForestModel, Node, Tree},
    source::SyntheticSource,
};

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// A trained model expecting `c1_mean` and `c2_var`.
fn trained_model() -> ForestModel {
    ForestModel::new(
        labels(&["c1_mean", "c2_var"]),
        vec![
            Tree {
                nodes: vec![
                    Node::Split {
                        feature: 0,
                        threshold: 0.0,
                        left: 1,
                        right: 2,
                    },
                    Node::Leaf { probs: [0.8, 0.2] },
                    Node::Leaf { probs: [0.3, 0.7] },
                ],
            },
            Tree {
                nodes: vec![Node::Leaf { probs: [0.5, 0.5] }],
            },
        ],
    )
    .unwrap()
}

#[test]
fn synthetic_end_to_end() {
    // 2 channels at 10 samples/sec, 1-second windows
    let source = SyntheticSource::seeded(10.0, labels(&["c1", "c2"]), 99);
    let mut windower = Windower::new(Box::new(source), 1.0, 0);

    let trained = labels(&["c1_mean", "c2_var"]);
    let model = trained_model();

    // Startup schema validation passes without pulling anything
    validate_schema(&trained, &feature_names(&windower.channel_labels())).unwrap();

    // Run a few iterations the way the live loop does
    for _ in 0..3 {
        let window = windower.next_window().unwrap();
        assert_eq!(window.len(), 10);

        let features = extract_features(&window);
        assert!(features.get("c1_mean").is_some());
        assert!(features.get("c2_var").is_some());

        let selected = select(&features, &trained).unwrap();
        assert_eq!(selected.names(), vec!["c1_mean", "c2_var"]);

        let probs = model.predict_proba(&selected).unwrap();
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-9);

        let prediction = Prediction::from_probabilities(probs);
        assert!(prediction.confidence >= 0.5);
        assert!(prediction.odds >= 1.0);
    }
}

#[test]
fn end_to_end_with_persisted_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classifier.json");
    trained_model().save(&path).unwrap();

    let model = ForestModel::load(&path).unwrap();
    let trained = model.feature_names().to_vec();

    let source = SyntheticSource::seeded(10.0, labels(&["c1", "c2"]), 7);
    let mut windower = Windower::new(Box::new(source), 1.0, 0);

    let window = windower.next_window().unwrap();
    let selected = select(&extract_features(&window), &trained).unwrap();
    let probs = model.predict_proba(&selected).unwrap();
    assert!((probs[0] + probs[1] - 1.0).abs() < 1e-9);
}

#[test]
fn schema_mismatch_fails_before_any_pull() {
    // 3-channel model against a 2-channel source
    let source = SyntheticSource::seeded(10.0, labels(&["c1", "c2"]), 1);
    let windower = Windower::new(Box::new(source), 1.0, 0);

    let trained = labels(&["c1_mean", "c2_var", "c3_mean"]);
    let err = validate_schema(&trained, &feature_names(&windower.channel_labels())).unwrap_err();
    assert!(err.to_string().contains("c3_mean"));
}

#[test]
fn aux_channel_dropped_before_extraction() {
    let source = SyntheticSource::seeded(10.0, labels(&["tp9", "af7", "aux"]), 1);
    let mut windower = Windower::new(Box::new(source), 1.0, 1);

    let window = windower.next_window().unwrap();
    let features = extract_features(&window);

    assert!(features.get("tp9_mean").is_some());
    assert!(features.get("aux_mean").is_none());
}
