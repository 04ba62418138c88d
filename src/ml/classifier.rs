use crate::error::{AppError, Result};
use crate::ml::dataset::TrainTestSplit;
use crate::ml::features::FeatureVector;
use crate::ml::models::{ClassLabel, ModelMetadata, ModelType, N_FEATURES};
use chrono::Utc;
use linfa::composing::MultiClassModel;
use linfa::prelude::Pr;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

/// A trained model mapping measurements to an Iris species.
///
/// Implementations are immutable once constructed and are shared across
/// request handlers without synchronisation.
pub trait Classifier: Send + Sync {
    /// Predict integer class codes for each row of `records`
    fn predict_records(&self, records: &Array2<f64>) -> Result<Vec<usize>>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Predict the species of a single flower
    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel> {
        features.validate()?;

        let predictions = self.predict_records(&features.to_records())?;
        let index = predictions.first().copied().ok_or_else(|| {
            AppError::Model(format!("{} returned no prediction", self.metadata().name))
        })?;

        ClassLabel::from_index(index).ok_or_else(|| {
            AppError::Model(format!(
                "{} produced unmapped label {}",
                self.metadata().name,
                index
            ))
        })
    }

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }
}

/// Support vector machine: one RBF-kernel SVM per class, highest
/// Platt-scaled probability wins
pub struct SupportVectorClassifier {
    metadata: ModelMetadata,

    /// (class, one-vs-all model) pairs
    models: Vec<(usize, Svm<f64, Pr>)>,
}

impl SupportVectorClassifier {
    /// Fit on the training part of `split` and score on the held-out part.
    ///
    /// `kernel_eps` is the Gaussian kernel width; when absent it is
    /// `n_features * var(X_train)`.
    pub fn train(split: &TrainTestSplit, kernel_eps: Option<f64>) -> Result<Self> {
        let eps = kernel_eps.unwrap_or_else(|| scale_kernel_eps(&split.train_records));

        let dataset = DatasetBase::from(split.train_records.clone())
            .with_targets(split.train_targets.clone());

        let params = Svm::<_, Pr>::params().gaussian_kernel(eps);
        let models = dataset
            .one_vs_all()
            .map_err(|e| AppError::Model(format!("Failed to split classes for SVM: {}", e)))?
            .into_iter()
            .map(|(label, binary)| {
                params
                    .fit(&binary)
                    .map(|model| (label, model))
                    .map_err(|e| {
                        AppError::Model(format!("Failed to train SVM for class {}: {}", label, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut classifier = Self {
            metadata: ModelMetadata::new("Support Vector Machine", ModelType::SupportVectorMachine)
                .with_hyperparameter("kernel", "gaussian")
                .with_hyperparameter("kernel_eps", format!("{:.4}", eps))
                .with_hyperparameter("strategy", "one_vs_all"),
            models,
        };
        classifier.record_evaluation(split)?;

        Ok(classifier)
    }

    fn record_evaluation(&mut self, split: &TrainTestSplit) -> Result<()> {
        let accuracy = holdout_accuracy(&*self, split)?;
        self.metadata.holdout_accuracy = accuracy;
        self.metadata.n_training_samples = split.n_train();
        self.metadata.n_test_samples = split.n_test();
        self.metadata.trained_at = Utc::now();
        Ok(())
    }
}

impl Classifier for SupportVectorClassifier {
    fn predict_records(&self, records: &Array2<f64>) -> Result<Vec<usize>> {
        check_records(records)?;

        // MultiClassModel boxes its members without Send bounds, so it is
        // assembled per call rather than stored.
        let model: MultiClassModel<Array2<f64>, usize> = self.models.iter().cloned().collect();
        let dataset = DatasetBase::from(records.clone());
        let predictions: Array1<usize> = model.predict(&dataset);

        Ok(predictions.to_vec())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Decision Tree Classifier
pub struct DecisionTreeClassifierWrapper {
    metadata: ModelMetadata,

    /// Trained model
    model: DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
}

impl DecisionTreeClassifierWrapper {
    /// Fit a Gini CART tree on the training part of `split`; `max_depth` of
    /// `None` grows until leaves are pure.
    pub fn train(split: &TrainTestSplit, max_depth: Option<u16>) -> Result<Self> {
        let x = ndarray_to_densematrix(&split.train_records);
        let y: Vec<i32> = split.train_targets.iter().map(|&t| t as i32).collect();

        let mut params =
            DecisionTreeClassifierParameters::default().with_criterion(SplitCriterion::Gini);
        if let Some(depth) = max_depth {
            params = params.with_max_depth(depth);
        }

        let model = DecisionTreeClassifier::fit(&x, &y, params)
            .map_err(|e| AppError::Model(format!("Failed to train decision tree: {}", e)))?;

        let depth = max_depth.map_or_else(|| "unbounded".to_string(), |d| d.to_string());
        let mut classifier = Self {
            metadata: ModelMetadata::new("Decision Tree", ModelType::DecisionTree)
                .with_hyperparameter("criterion", "gini")
                .with_hyperparameter("max_depth", depth),
            model,
        };

        classifier.metadata.holdout_accuracy = holdout_accuracy(&classifier, split)?;
        classifier.metadata.n_training_samples = split.n_train();
        classifier.metadata.n_test_samples = split.n_test();
        classifier.metadata.trained_at = Utc::now();

        Ok(classifier)
    }
}

impl Classifier for DecisionTreeClassifierWrapper {
    fn predict_records(&self, records: &Array2<f64>) -> Result<Vec<usize>> {
        check_records(records)?;

        let x = ndarray_to_densematrix(records);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Model(format!("Prediction failed: {}", e)))?;

        predictions
            .into_iter()
            .map(|p| {
                usize::try_from(p)
                    .map_err(|_| AppError::Model(format!("Decision tree produced label {}", p)))
            })
            .collect()
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

/// Fraction of held-out samples the classifier labels correctly
pub fn holdout_accuracy(classifier: &dyn Classifier, split: &TrainTestSplit) -> Result<f64> {
    let predictions = classifier.predict_records(&split.test_records)?;
    Ok(accuracy_score(&split.test_targets, &predictions))
}

pub fn accuracy_score(y_true: &Array1<usize>, y_pred: &[usize]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }

    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();

    correct as f64 / y_true.len() as f64
}

fn check_records(records: &Array2<f64>) -> Result<()> {
    if records.ncols() != N_FEATURES {
        return Err(AppError::invalid_feature(
            "features",
            format!(
                "expected {} measurements per sample, got {}",
                N_FEATURES,
                records.ncols()
            ),
        ));
    }
    if records.iter().any(|v| !v.is_finite()) {
        return Err(AppError::invalid_feature(
            "features",
            "measurements must be finite numbers",
        ));
    }
    Ok(())
}

/// `gamma = 1 / (n_features * var(X))`, expressed as linfa's kernel width
fn scale_kernel_eps(records: &Array2<f64>) -> f64 {
    let mean = records.mean().unwrap_or(0.0);
    let variance = records.mapv(|v| (v - mean).powi(2)).mean().unwrap_or(0.0);
    let eps = records.ncols() as f64 * variance;

    if eps.is_finite() && eps > 0.0 {
        eps
    } else {
        1.0
    }
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}
