use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use cricvision_terminal::insights::{
    MatchPhase, compute_insights, phase_chart, projection_series,
};
use cricvision_terminal::match_state::{FEATURE_COUNT, MatchState, ScenarioPreset};
use cricvision_terminal::model_store::{
    ModelArtifact, ModelBundle, ModelKind, ModelStore, ModelUnavailable, PredictionTarget,
    ScalerArtifact,
};

fn bundle(kind: ModelKind, intercept: f64, coeffs: [f64; FEATURE_COUNT]) -> ModelBundle {
    ModelBundle::new(
        ScalerArtifact {
            means: vec![0.0; FEATURE_COUNT],
            stds: vec![1.0; FEATURE_COUNT],
        },
        ModelArtifact {
            kind,
            intercept,
            coeffs: coeffs.to_vec(),
            feature_names: Vec::new(),
        },
    )
    .unwrap()
}

fn full_store() -> ModelStore {
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

#[test]
fn every_preset_produces_bounded_metrics() {
    let store = full_store();
    for preset in ScenarioPreset::ALL {
        let state = preset.match_state();
        let metrics = compute_insights(&store, &state).unwrap();

        assert!((0.0..=100.0).contains(&metrics.wicket_probability));
        assert!((0.0..=100.0).contains(&metrics.boundary_probability));
        assert!((0.0..=100.0).contains(&metrics.dot_ball_probability));
        assert!((5.0..=95.0).contains(&metrics.win_probability));
        assert!(metrics.expected_runs_per_ball >= 0.0);
        assert!(metrics.projected_final_score >= state.cumulative_runs as f64);
    }
}

#[test]
fn identical_state_yields_identical_metrics() {
    let store = full_store();
    let state = ScenarioPreset::MiddleOvers.match_state();
    let a = compute_insights(&store, &state).unwrap();
    let b = compute_insights(&store, &state).unwrap();
    assert_eq!(a.wicket_probability, b.wicket_probability);
    assert_eq!(a.expected_runs_per_ball, b.expected_runs_per_ball);
    assert_eq!(a.win_probability, b.win_probability);
}

#[test]
fn no_balls_remaining_pins_win_probability_at_even() {
    let store = full_store();
    let state = MatchState {
        balls_remaining: 0,
        ..MatchState::default()
    };
    let metrics = compute_insights(&store, &state).unwrap();
    assert_eq!(metrics.win_probability, 50.0);
}

#[test]
fn missing_target_surfaces_model_unavailable_end_to_end() {
    let mut bundles = HashMap::new();
    bundles.insert(
        PredictionTarget::Wicket,
        bundle(ModelKind::Classifier, 0.0, [0.0; FEATURE_COUNT]),
    );
    let store = ModelStore::from_bundles(bundles);

    let err = compute_insights(&store, &MatchState::default()).unwrap_err();
    let unavailable = err.downcast_ref::<ModelUnavailable>().unwrap();
    assert_eq!(unavailable.target, "runs_prediction");
}

#[test]
fn phase_chart_marks_the_phase_of_each_preset() {
    let expectations = [
        (ScenarioPreset::Powerplay, MatchPhase::Powerplay),
        (ScenarioPreset::MiddleOvers, MatchPhase::Middle),
        (ScenarioPreset::DeathOvers, MatchPhase::Death),
    ];
    for (preset, expected) in expectations {
        let phases = phase_chart(&preset.match_state());
        let current: Vec<_> = phases.iter().filter(|p| p.current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].phase, expected);
    }
}

#[test]
fn projection_covers_the_next_ten_overs_capped_at_twenty() {
    let store = full_store();

    let early = ScenarioPreset::Powerplay.match_state();
    let metrics = compute_insights(&store, &early).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let series = projection_series(&metrics, &early, &mut rng);
    assert_eq!(series.len(), 10);
    assert_eq!(series[0].over, early.over);

    let late = ScenarioPreset::DeathOvers.match_state();
    let metrics = compute_insights(&store, &late).unwrap();
    let series = projection_series(&metrics, &late, &mut rng);
    assert_eq!(series.first().unwrap().over, 18);
    assert_eq!(series.last().unwrap().over, 20);
}

#[test]
fn projection_is_reproducible_under_a_fixed_seed() {
    let store = full_store();
    let state = ScenarioPreset::MiddleOvers.match_state();
    let metrics = compute_insights(&store, &state).unwrap();

    let a = projection_series(&metrics, &state, &mut StdRng::seed_from_u64(11));
    let b = projection_series(&metrics, &state, &mut StdRng::seed_from_u64(11));
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.over, y.over);
        assert_eq!(x.runs_per_over, y.runs_per_over);
        assert_eq!(x.wicket_risk_pct, y.wicket_risk_pct);
    }
}
