//! Logistic classifier over the shared feature vector, loaded from JSON weights.
//!
//! ```json
//! { "name": "baseline-2024", "modalities": { "image": { "weights": [..6], "bias": -1.2 } } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use atrust_core::{AtrustError, DetectorTier, Modality, Result};

use crate::features::{self, FEATURE_DIM};

use super::{clamp_score, SampleScorer};

/// One modality's linear head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearHead {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// On-disk weights file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub name: String,
    pub modalities: BTreeMap<Modality, LinearHead>,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    heads: BTreeMap<Modality, LinearHead>,
}

impl LinearModel {
    /// Load and validate weights. Any failure here is an initialization
    /// failure for the whole tier.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let weights: ModelWeights = serde_json::from_str(&raw)?;
        let model = Self::from_weights(weights)?;
        info!(
            model = %model.name,
            path = %path.display(),
            modalities = model.heads.len(),
            "classifier weights loaded"
        );
        Ok(model)
    }

    pub fn from_weights(weights: ModelWeights) -> Result<Self> {
        if weights.modalities.is_empty() {
            return Err(AtrustError::Config(format!(
                "model '{}' has no modality heads",
                weights.name
            )));
        }
        for (modality, head) in &weights.modalities {
            if head.weights.len() != FEATURE_DIM {
                return Err(AtrustError::Config(format!(
                    "model '{}' {} head has {} weights, expected {}",
                    weights.name,
                    modality,
                    head.weights.len(),
                    FEATURE_DIM
                )));
            }
            if !head.bias.is_finite() || head.weights.iter().any(|w| !w.is_finite()) {
                return Err(AtrustError::Config(format!(
                    "model '{}' {} head has non-finite parameters",
                    weights.name, modality
                )));
            }
        }
        Ok(Self {
            name: weights.name,
            heads: weights.modalities,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl SampleScorer for LinearModel {
    fn tier(&self) -> DetectorTier {
        DetectorTier::Model
    }

    fn supports(&self, modality: Modality) -> bool {
        self.heads.contains_key(&modality)
    }

    fn score(&self, modality: Modality, buffer: &[u8]) -> Result<Option<f64>> {
        let head = self.heads.get(&modality).ok_or_else(|| {
            AtrustError::Scoring(format!("model '{}' has no {} head", self.name, modality))
        })?;
        let Some(x) = features::extract(modality, buffer) else {
            return Ok(None);
        };
        let z = head
            .weights
            .iter()
            .zip(x.iter())
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + head.bias;
        let p = sigmoid(z);
        if !p.is_finite() {
            return Err(AtrustError::Scoring(format!(
                "model '{}' produced a non-finite probability",
                self.name
            )));
        }
        Ok(Some(clamp_score(p)))
    }
}
