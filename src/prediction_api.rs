use std::path::Path;

use anyhow::Result;

use crate::match_state::MatchState;
use crate::model_store::{ModelStore, PredictionTarget};

/// Thin inference wrapper for use outside the dashboard: scripts, tests
/// and bins get the three single-call predictions without touching the
/// UI layers.
#[derive(Debug)]
pub struct PredictionApi {
    store: ModelStore,
}

/// Rounded, display-ready insight block.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchInsights {
    pub wicket_probability: f64,
    pub expected_runs: f64,
    pub boundary_probability: f64,
    pub pressure_level: &'static str,
}

impl PredictionApi {
    pub fn load(models_dir: &Path) -> Self {
        Self {
            store: ModelStore::load(models_dir),
        }
    }

    pub fn from_store(store: ModelStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Probability of a wicket on the next ball, in [0,1].
    pub fn predict_wicket_probability(&self, state: &MatchState) -> Result<f64> {
        self.store.predict(PredictionTarget::Wicket, state)
    }

    /// Expected runs off the next ball, floored at zero.
    pub fn predict_runs(&self, state: &MatchState) -> Result<f64> {
        Ok(self.store.predict(PredictionTarget::Runs, state)?.max(0.0))
    }

    /// Probability of a boundary (four or six) on the next ball, in [0,1].
    pub fn predict_boundary_probability(&self, state: &MatchState) -> Result<f64> {
        self.store.predict(PredictionTarget::Boundary, state)
    }

    pub fn match_insights(&self, state: &MatchState) -> Result<MatchInsights> {
        let wicket = self.predict_wicket_probability(state)?;
        let runs = self.predict_runs(state)?;
        let boundary = self.predict_boundary_probability(state)?;

        Ok(MatchInsights {
            wicket_probability: round2(wicket * 100.0),
            expected_runs: round2(runs),
            boundary_probability: round2(boundary * 100.0),
            pressure_level: pressure_level(state.pressure_index),
        })
    }
}

pub fn pressure_level(pressure_index: f64) -> &'static str {
    if pressure_index > 5.0 {
        "High"
    } else if pressure_index > 2.0 {
        "Medium"
    } else {
        "Low"
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
