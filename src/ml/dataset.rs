//! Reference Iris dataset and its seeded train/test partition.

use ndarray::{Array1, Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::ml::models::{N_CLASSES, N_FEATURES};

/// Records and labels split into training and held-out parts
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train_records: Array2<f64>,
    pub train_targets: Array1<usize>,
    pub test_records: Array2<f64>,
    pub test_targets: Array1<usize>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.train_records.nrows()
    }

    pub fn n_test(&self) -> usize {
        self.test_records.nrows()
    }
}

/// The classic 150-sample Iris dataset
pub fn load_iris() -> Result<(Array2<f64>, Array1<usize>)> {
    let dataset = linfa_datasets::iris();
    let records = dataset.records().to_owned();
    let targets: Array1<usize> = dataset.targets().iter().copied().collect();

    if records.ncols() != N_FEATURES || records.nrows() != targets.len() {
        return Err(AppError::Model(format!(
            "unexpected Iris shape: {:?} records, {} targets",
            records.shape(),
            targets.len()
        )));
    }
    if let Some(bad) = targets.iter().find(|&&t| t >= N_CLASSES) {
        return Err(AppError::Model(format!("unexpected Iris label {}", bad)));
    }

    Ok((records, targets))
}

/// Shuffle sample indices with a seeded RNG and hold out
/// `ceil(n * test_ratio)` of them.
///
/// The first `n_test` permuted indices form the test set. The same seed
/// always yields the same partition for a given `rand` release.
pub fn train_test_split(
    records: &Array2<f64>,
    targets: &Array1<usize>,
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    let n_samples = records.nrows();
    if n_samples != targets.len() {
        return Err(AppError::Model(format!(
            "{} records but {} targets",
            n_samples,
            targets.len()
        )));
    }
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AppError::Configuration(format!(
            "test ratio must lie in (0, 1), got {}",
            test_ratio
        )));
    }

    let n_test = (n_samples as f64 * test_ratio).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(AppError::Model(format!(
            "cannot hold out {} of {} samples",
            n_test, n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test_idx, train_idx) = indices.split_at(n_test);

    debug!(
        n_train = train_idx.len(),
        n_test = test_idx.len(),
        seed,
        "Partitioned reference dataset"
    );

    Ok(TrainTestSplit {
        train_records: records.select(Axis(0), train_idx),
        train_targets: targets.select(Axis(0), train_idx),
        test_records: records.select(Axis(0), test_idx),
        test_targets: targets.select(Axis(0), test_idx),
    })
}
