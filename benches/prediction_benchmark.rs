//! Criterion benchmarks for the prediction paths
//!
//! These benchmarks measure:
//! - Single-sample prediction for each local model
//! - Batch prediction over the reference dataset
//! - The two combiners

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iris_consensus::{
    config::ModelConfig,
    external::ExternalPrediction,
    ml::{
        dataset::load_iris, local_consensus, weighted_consensus, ClassLabel, FeatureVector,
        LocalModels,
    },
};

fn bench_single_prediction(c: &mut Criterion) {
    let models = LocalModels::train(&ModelConfig::default()).expect("training succeeds");
    let sample = FeatureVector::new(6.3, 2.9, 5.6, 1.8);

    let mut group = c.benchmark_group("predict_single");
    group.bench_function("svm", |b| {
        b.iter(|| models.svm.predict(black_box(&sample)).unwrap());
    });
    group.bench_function("decision_tree", |b| {
        b.iter(|| models.decision_tree.predict(black_box(&sample)).unwrap());
    });
    group.finish();
}

fn bench_batch_prediction(c: &mut Criterion) {
    let models = LocalModels::train(&ModelConfig::default()).expect("training succeeds");
    let (records, _) = load_iris().expect("dataset loads");

    let mut group = c.benchmark_group("predict_batch");
    group.throughput(Throughput::Elements(records.nrows() as u64));
    for (name, model) in [("svm", &models.svm), ("decision_tree", &models.decision_tree)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
            b.iter(|| model.predict_records(black_box(records)).unwrap());
        });
    }
    group.finish();
}

fn bench_combiners(c: &mut Criterion) {
    c.bench_function("local_consensus", |b| {
        b.iter(|| local_consensus(black_box(ClassLabel::Setosa), black_box(ClassLabel::Virginica)))
    });

    let a = ExternalPrediction::new(1, 0.8);
    let b_pred = ExternalPrediction::new(2, 0.2);
    c.bench_function("weighted_consensus", |b| {
        b.iter(|| weighted_consensus(black_box(&a), black_box(&b_pred)))
    });
}

criterion_group!(
    benches,
    bench_single_prediction,
    bench_batch_prediction,
    bench_combiners
);
criterion_main!(benches);
