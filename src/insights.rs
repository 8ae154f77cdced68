use anyhow::Result;
use rand::Rng;

use crate::match_state::MatchState;
use crate::model_store::{ModelStore, PredictionTarget};

// Fixed per-phase rates for the phase comparison chart. Illustrative
// baselines, not model output.
const PHASE_WICKET_PCT: [f64; 3] = [5.2, 6.8, 8.5];
const PHASE_BOUNDARY_PCT: [f64; 3] = [18.5, 12.3, 22.7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    High,
    Moderate,
    Low,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::High => "High",
            RiskTier::Moderate => "Moderate",
            RiskTier::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Powerplay,
    Middle,
    Death,
}

impl MatchPhase {
    pub fn of_over(over: u8) -> Self {
        if over < 6 {
            MatchPhase::Powerplay
        } else if over < 16 {
            MatchPhase::Middle
        } else {
            MatchPhase::Death
        }
    }

    pub fn index(self) -> usize {
        match self {
            MatchPhase::Powerplay => 0,
            MatchPhase::Middle => 1,
            MatchPhase::Death => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchPhase::Powerplay => "Powerplay",
            MatchPhase::Middle => "Middle",
            MatchPhase::Death => "Death",
        }
    }
}

/// The nine user-facing metrics, recomputed fresh on every trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub wicket_probability: f64,
    pub expected_runs_per_ball: f64,
    pub boundary_probability: f64,
    pub dot_ball_probability: f64,
    pub projected_final_score: f64,
    pub win_probability: f64,
    pub economy_rate_forecast: f64,
    pub wicket_risk: RiskTier,
    pub boundary_tier: RiskTier,
}

impl DerivedMetrics {
    pub fn runs_per_over(&self) -> f64 {
        self.expected_runs_per_ball * 6.0
    }

    pub fn confidence_gauge(&self) -> f64 {
        (self.wicket_probability + self.boundary_probability) / 2.0
    }
}

/// Derives all dashboard metrics from one match state. Pure in the state
/// and the loaded bundles: identical inputs give identical outputs. Fails
/// with `ModelUnavailable` when a required bundle never loaded.
pub fn compute_insights(store: &ModelStore, state: &MatchState) -> Result<DerivedMetrics> {
    let wicket_probability = 100.0 * store.predict(PredictionTarget::Wicket, state)?;
    let expected_runs_per_ball = store.predict(PredictionTarget::Runs, state)?.max(0.0);
    let boundary_probability = 100.0 * store.predict(PredictionTarget::Boundary, state)?;

    let dot_ball_probability =
        clamp(100.0 - boundary_probability - expected_runs_per_ball * 30.0, 0.0, 100.0);

    let projected_final_score = (state.cumulative_runs as f64
        + expected_runs_per_ball * state.balls_remaining as f64)
        .max(0.0);

    // With no balls left the required rate is undefined; fall back to an
    // even 50. The linear form below is pinned by tests, keep it verbatim.
    let win_probability = if state.balls_remaining > 0 {
        let required_run_rate = (projected_final_score - state.cumulative_runs as f64)
            / (state.balls_remaining as f64 / 6.0);
        clamp(
            50.0 + (required_run_rate - state.current_run_rate) * 10.0,
            5.0,
            95.0,
        )
    } else {
        50.0
    };

    let economy_rate_forecast = state.current_run_rate * (1.0 + state.pressure_index / 20.0);

    Ok(DerivedMetrics {
        wicket_probability: clamp(wicket_probability, 0.0, 100.0),
        expected_runs_per_ball,
        boundary_probability: clamp(boundary_probability, 0.0, 100.0),
        dot_ball_probability,
        projected_final_score,
        win_probability,
        economy_rate_forecast,
        wicket_risk: wicket_risk_tier(wicket_probability),
        boundary_tier: boundary_tier(boundary_probability),
    })
}

pub fn wicket_risk_tier(wicket_probability: f64) -> RiskTier {
    if wicket_probability > 15.0 {
        RiskTier::High
    } else if wicket_probability > 8.0 {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

pub fn boundary_tier(boundary_probability: f64) -> RiskTier {
    if boundary_probability > 20.0 {
        RiskTier::High
    } else if boundary_probability > 10.0 {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseRates {
    pub phase: MatchPhase,
    pub wicket_pct: f64,
    pub boundary_pct: f64,
    pub current: bool,
}

pub fn phase_chart(state: &MatchState) -> [PhaseRates; 3] {
    let current = MatchPhase::of_over(state.over);
    let phases = [MatchPhase::Powerplay, MatchPhase::Middle, MatchPhase::Death];
    phases.map(|phase| PhaseRates {
        phase,
        wicket_pct: PHASE_WICKET_PCT[phase.index()],
        boundary_pct: PHASE_BOUNDARY_PCT[phase.index()],
        current: phase == current,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionPoint {
    pub over: u8,
    pub runs_per_over: f64,
    pub wicket_risk_pct: f64,
}

/// Over-by-over projection for the next stretch of the innings. The
/// jitter is presentation-only; the underlying metrics stay deterministic.
pub fn projection_series<R: Rng>(
    metrics: &DerivedMetrics,
    state: &MatchState,
    rng: &mut R,
) -> Vec<ProjectionPoint> {
    let start = state.over.min(20);
    let end = (state.over as u16 + 10).min(21) as u8;
    (start..end)
        .map(|over| ProjectionPoint {
            over,
            runs_per_over: metrics.runs_per_over() * (1.0 + rng.gen_range(-0.15..0.25)),
            wicket_risk_pct: metrics.wicket_probability * (1.0 + rng.gen_range(-0.2..0.3)),
        })
        .collect()
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
