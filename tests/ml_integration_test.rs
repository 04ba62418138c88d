/// Integration tests for the local classifiers
///
/// These tests train on the real reference dataset and verify:
/// - Holdout accuracy of both models
/// - Predictions for canonical samples
/// - Concurrent use of shared models

use iris_consensus::{
    config::ModelConfig,
    ml::{local_consensus, ClassLabel, FeatureVector, LocalModels},
};
use std::sync::Arc;

fn train() -> LocalModels {
    LocalModels::train(&ModelConfig::default()).expect("training succeeds")
}

#[test]
fn test_models_meet_accuracy_floor() {
    let models = train();

    for metadata in models.metadata() {
        assert!(
            metadata.holdout_accuracy >= 0.8,
            "{} accuracy {}",
            metadata.name,
            metadata.holdout_accuracy
        );
        assert_eq!(metadata.n_training_samples, 120);
        assert_eq!(metadata.n_test_samples, 30);
        assert_eq!(metadata.n_features, 4);
    }
}

#[test]
fn test_canonical_samples() {
    let models = train();
    let setosa = FeatureVector::new(5.1, 3.5, 1.4, 0.2);
    let virginica = FeatureVector::new(7.7, 3.0, 6.1, 2.3);

    assert_eq!(models.svm.predict(&setosa).unwrap(), ClassLabel::Setosa);
    assert_eq!(models.decision_tree.predict(&setosa).unwrap(), ClassLabel::Setosa);
    assert_eq!(models.svm.predict(&virginica).unwrap(), ClassLabel::Virginica);
    assert_eq!(models.decision_tree.predict(&virginica).unwrap(), ClassLabel::Virginica);

    let tree = models.decision_tree.predict(&setosa).unwrap();
    let svm = models.svm.predict(&setosa).unwrap();
    assert_eq!(local_consensus(tree, svm).unwrap(), ClassLabel::Setosa);
}

#[test]
fn test_predictions_are_deterministic() {
    let models = train();
    let sample = FeatureVector::new(6.0, 2.9, 4.5, 1.5);

    let first = models.svm.predict(&sample).unwrap();
    for _ in 0..10 {
        assert_eq!(models.svm.predict(&sample).unwrap(), first);
    }
}

#[test]
fn test_out_of_range_measurements_still_classify() {
    let models = train();
    let odd = FeatureVector::new(-40.0, 1000.0, 0.0, 12.5);

    assert!(models.svm.predict(&odd).is_ok());
    assert!(models.decision_tree.predict(&odd).is_ok());
}

#[tokio::test]
async fn test_models_are_shared_across_tasks() {
    let models = Arc::new(train());
    let sample = FeatureVector::new(5.1, 3.5, 1.4, 0.2);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let models = models.clone();
            tokio::spawn(async move {
                let tree = models.decision_tree.predict(&sample).unwrap();
                let svm = models.svm.predict(&sample).unwrap();
                local_consensus(tree, svm).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), ClassLabel::Setosa);
    }
}
