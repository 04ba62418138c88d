use crate::config::ModelConfig;
use crate::error::Result;
use crate::metrics::MODEL_HOLDOUT_ACCURACY;
use crate::ml::classifier::{Classifier, DecisionTreeClassifierWrapper, SupportVectorClassifier};
use crate::ml::dataset::{load_iris, train_test_split};
use crate::ml::models::ModelMetadata;
use std::sync::Arc;
use tracing::info;

/// The two local models, trained once and shared read-only
#[derive(Clone)]
pub struct LocalModels {
    pub svm: Arc<dyn Classifier>,
    pub decision_tree: Arc<dyn Classifier>,
}

impl LocalModels {
    pub fn new(svm: Arc<dyn Classifier>, decision_tree: Arc<dyn Classifier>) -> Self {
        Self { svm, decision_tree }
    }

    /// Train both models on the seeded split of the reference dataset.
    ///
    /// Any failure is returned to the caller; the service must not start
    /// without both models.
    pub fn train(config: &ModelConfig) -> Result<Self> {
        let (records, targets) = load_iris()?;
        let split = train_test_split(&records, &targets, config.test_ratio, config.random_seed)?;

        info!(
            n_train = split.n_train(),
            n_test = split.n_test(),
            seed = config.random_seed,
            "Training local models"
        );

        let svm = SupportVectorClassifier::train(&split, config.svm_kernel_eps)?;
        let decision_tree = DecisionTreeClassifierWrapper::train(&split, config.tree_max_depth)?;

        for metadata in [svm.metadata(), decision_tree.metadata()] {
            info!(
                model = %metadata.model_type,
                accuracy = metadata.holdout_accuracy,
                "Model trained"
            );
            MODEL_HOLDOUT_ACCURACY
                .with_label_values(&[&metadata.model_type.to_string()])
                .set(metadata.holdout_accuracy);
        }

        Ok(Self::new(Arc::new(svm), Arc::new(decision_tree)))
    }

    pub fn metadata(&self) -> Vec<ModelMetadata> {
        vec![
            self.svm.metadata().clone(),
            self.decision_tree.metadata().clone(),
        ]
    }
}
