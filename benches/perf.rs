use std::collections::HashMap;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;

use cricvision_terminal::data_fetch::flatten_cricsheet_match;
use cricvision_terminal::insights::{compute_insights, projection_series};
use cricvision_terminal::match_state::{FEATURE_COUNT, ScenarioPreset};
use cricvision_terminal::model_store::{
    ModelArtifact, ModelBundle, ModelKind, ModelStore, PredictionTarget, ScalerArtifact,
};
use cricvision_terminal::wagon_wheel::generate_shots;

const MATCH_JSON: &str = r#"{
    "info": { "match_id": "bench-1" },
    "innings": [
        { "overs": [
            { "bowler": "JJ Bumrah", "deliveries": [
                { "runs": { "total": 1, "extras": 0 } },
                { "runs": { "total": 0, "extras": 0 }, "wickets": [ { "kind": "bowled" } ] },
                { "runs": { "total": 4, "extras": 0 } },
                { "runs": { "total": 6, "extras": 0 } },
                { "runs": { "total": 1, "extras": 1 } },
                { "runs": { "total": 2, "extras": 0 } }
            ] }
        ] }
    ]
}"#;

fn bench_store() -> ModelStore {
    let bundle = |kind, intercept, coeffs: [f64; FEATURE_COUNT]| {
        ModelBundle::new(
            ScalerArtifact {
                means: vec![10.0, 80.0, 3.0, 60.0, 8.0, 2.5],
                stds: vec![5.0, 40.0, 2.0, 30.0, 2.0, 2.0],
            },
            ModelArtifact {
                kind,
                intercept,
                coeffs: coeffs.to_vec(),
                feature_names: Vec::new(),
            },
        )
        .expect("valid bench bundle")
    };

    let mut bundles = HashMap::new();
    bundles.insert(
        PredictionTarget::Wicket,
        bundle(ModelKind::Classifier, -2.2, [0.02, 0.0, 0.08, 0.0, 0.0, 0.05]),
    );
    bundles.insert(
        PredictionTarget::Runs,
        bundle(ModelKind::Regressor, 1.25, [0.01, 0.0, -0.04, 0.0, 0.02, 0.0]),
    );
    bundles.insert(
        PredictionTarget::Boundary,
        bundle(ModelKind::Classifier, -1.6, [0.03, 0.0, -0.02, 0.0, 0.04, 0.0]),
    );
    ModelStore::from_bundles(bundles)
}

fn bench_compute_insights(c: &mut Criterion) {
    let store = bench_store();
    let state = ScenarioPreset::MiddleOvers.match_state();
    c.bench_function("compute_insights", |b| {
        b.iter(|| {
            let metrics = compute_insights(black_box(&store), black_box(&state)).unwrap();
            black_box(metrics.win_probability);
        })
    });
}

fn bench_projection_series(c: &mut Criterion) {
    let store = bench_store();
    let state = ScenarioPreset::Powerplay.match_state();
    let metrics = compute_insights(&store, &state).unwrap();
    c.bench_function("projection_series", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(42);
            let series = projection_series(black_box(&metrics), black_box(&state), &mut rng);
            black_box(series.len());
        })
    });
}

fn bench_flatten_match(c: &mut Criterion) {
    c.bench_function("flatten_cricsheet_match", |b| {
        b.iter(|| {
            let rows = flatten_cricsheet_match(black_box(MATCH_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_wagon_shots(c: &mut Criterion) {
    c.bench_function("wagon_shots", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(9);
            let shots = generate_shots(&mut rng);
            black_box(shots.len());
        })
    });
}

criterion_group!(
    benches,
    bench_compute_insights,
    bench_projection_series,
    bench_flatten_match,
    bench_wagon_shots
);
criterion_main!(benches);
