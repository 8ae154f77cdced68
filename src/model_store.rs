use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::match_state::{FEATURE_COUNT, FEATURE_NAMES, MatchState};

/// The three prediction targets the dashboard consumes. Each maps to a
/// `<name>_scaler.json` + `<name>_model.json` pair on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionTarget {
    Wicket,
    Runs,
    Boundary,
}

impl PredictionTarget {
    pub const ALL: [PredictionTarget; 3] = [
        PredictionTarget::Wicket,
        PredictionTarget::Runs,
        PredictionTarget::Boundary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PredictionTarget::Wicket => "wicket_prediction",
            PredictionTarget::Runs => "runs_prediction",
            PredictionTarget::Boundary => "boundary_prediction",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Classifier,
    Regressor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub kind: ModelKind,
    #[serde(default)]
    pub intercept: f64,
    pub coeffs: Vec<f64>,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

/// A fitted scaler + model pair, immutable after load.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    scaler: ScalerArtifact,
    model: ModelArtifact,
}

impl ModelBundle {
    pub fn new(scaler: ScalerArtifact, model: ModelArtifact) -> Result<Self> {
        if scaler.means.len() != FEATURE_COUNT || scaler.stds.len() != FEATURE_COUNT {
            return Err(anyhow!(
                "scaler expects {} features, artifact has {}/{}",
                FEATURE_COUNT,
                scaler.means.len(),
                scaler.stds.len()
            ));
        }
        if model.coeffs.len() != FEATURE_COUNT {
            return Err(anyhow!(
                "model expects {} coefficients, artifact has {}",
                FEATURE_COUNT,
                model.coeffs.len()
            ));
        }
        // Feature names are optional in the artifact; when present they
        // must match the order features() flattens the state in.
        if !model.feature_names.is_empty()
            && model.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES)
        {
            return Err(anyhow!(
                "model feature names {:?} do not match expected order {:?}",
                model.feature_names,
                FEATURE_NAMES
            ));
        }
        Ok(Self { scaler, model })
    }

    pub fn kind(&self) -> ModelKind {
        self.model.kind
    }

    /// Scaler transform then linear score. Classifiers return the
    /// positive-class probability in [0,1]; regressors the raw prediction
    /// floored at zero.
    pub fn predict(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let mut score = self.model.intercept;
        for idx in 0..FEATURE_COUNT {
            let std = self.scaler.stds[idx].max(1e-9);
            let scaled = (features[idx] - self.scaler.means[idx]) / std;
            score += self.model.coeffs[idx] * scaled;
        }
        match self.model.kind {
            ModelKind::Classifier => sigmoid(score),
            ModelKind::Regressor => score.max(0.0),
        }
    }
}

/// Error for calls against a target whose bundle never loaded. Kept as a
/// concrete type so callers can downcast and show "model unavailable"
/// instead of a generic failure.
#[derive(Debug, Clone)]
pub struct ModelUnavailable {
    pub target: &'static str,
}

impl fmt::Display for ModelUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model unavailable: {}", self.target)
    }
}

impl std::error::Error for ModelUnavailable {}

#[derive(Debug, Default)]
pub struct ModelStore {
    bundles: HashMap<PredictionTarget, ModelBundle>,
    load_errors: Vec<String>,
}

impl ModelStore {
    /// Loads every target from `models_dir`. Failures are per entry: a
    /// missing or corrupt pair is recorded and skipped, the rest still
    /// load.
    pub fn load(models_dir: &Path) -> Self {
        let mut store = Self::default();
        for target in PredictionTarget::ALL {
            match load_bundle(models_dir, target) {
                Ok(bundle) => {
                    store.bundles.insert(target, bundle);
                }
                Err(err) => {
                    store
                        .load_errors
                        .push(format!("{}: {err:#}", target.name()));
                }
            }
        }
        store
    }

    pub fn from_bundles(bundles: HashMap<PredictionTarget, ModelBundle>) -> Self {
        Self {
            bundles,
            load_errors: Vec::new(),
        }
    }

    pub fn available(&self, target: PredictionTarget) -> bool {
        self.bundles.contains_key(&target)
    }

    pub fn loaded_count(&self) -> usize {
        self.bundles.len()
    }

    pub fn load_errors(&self) -> &[String] {
        &self.load_errors
    }

    pub fn predict(&self, target: PredictionTarget, state: &MatchState) -> Result<f64> {
        let Some(bundle) = self.bundles.get(&target) else {
            return Err(ModelUnavailable {
                target: target.name(),
            }
            .into());
        };
        Ok(bundle.predict(&state.features()))
    }
}

pub fn default_models_dir() -> PathBuf {
    env::var("CRICVISION_MODELS_DIR")
        .ok()
        .map(|s| PathBuf::from(s.trim()))
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("models"))
}

fn load_bundle(models_dir: &Path, target: PredictionTarget) -> Result<ModelBundle> {
    let scaler_path = models_dir.join(format!("{}_scaler.json", target.name()));
    let raw = fs::read_to_string(&scaler_path)
        .with_context(|| format!("read scaler {}", scaler_path.display()))?;
    let scaler = serde_json::from_str::<ScalerArtifact>(&raw)
        .with_context(|| format!("parse scaler {}", scaler_path.display()))?;

    let model_path = models_dir.join(format!("{}_model.json", target.name()));
    let raw = fs::read_to_string(&model_path)
        .with_context(|| format!("read model {}", model_path.display()))?;
    let model = serde_json::from_str::<ModelArtifact>(&raw)
        .with_context(|| format!("parse model {}", model_path.display()))?;

    ModelBundle::new(scaler, model)
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Identity scaler + fixed coefficients, handy for deterministic tests.
    pub fn fixed_bundle(kind: ModelKind, intercept: f64, coeffs: [f64; FEATURE_COUNT]) -> ModelBundle {
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
        .expect("valid fixed bundle")
    }

    pub fn fixed_store() -> ModelStore {
        let mut bundles = HashMap::new();
        bundles.insert(
            PredictionTarget::Wicket,
            fixed_bundle(ModelKind::Classifier, -2.2, [0.02, 0.0, 0.08, 0.0, 0.0, 0.05]),
        );
        bundles.insert(
            PredictionTarget::Runs,
            fixed_bundle(ModelKind::Regressor, 1.25, [0.01, 0.0, -0.04, 0.0, 0.02, 0.0]),
        );
        bundles.insert(
            PredictionTarget::Boundary,
            fixed_bundle(ModelKind::Classifier, -1.6, [0.03, 0.0, -0.02, 0.0, 0.04, 0.0]),
        );
        ModelStore::from_bundles(bundles)
    }
}
