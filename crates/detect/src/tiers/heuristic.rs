//! Dependency-free scorer. Always available, deterministic.

use atrust_core::{DetectorTier, Modality, Result};

use crate::features::{self, FeatureVector};

use super::{clamp_score, SampleScorer};

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    /// Visual buffers: strong high-frequency energy, low entropy (synthetic
    /// smoothness) and saturated regions all raise suspicion.
    fn visual(f: &FeatureVector) -> f64 {
        let noise = (f[3] * 4.0).min(1.0);
        let flatness = 1.0 - f[2];
        let saturation = f[4];
        0.5 * noise + 0.3 * flatness + 0.2 * saturation
    }

    /// PCM: a noisy zero crossing rate, clipping and dropouts raise suspicion.
    fn spectral(f: &FeatureVector) -> f64 {
        let zcr = ((f[1] - 0.05) / 0.45).clamp(0.0, 1.0);
        let clipping = (f[2] * 10.0).min(1.0);
        let dropouts = f[4];
        0.5 * zcr + 0.3 * clipping + 0.2 * dropouts
    }
}

impl SampleScorer for HeuristicScorer {
    fn tier(&self) -> DetectorTier {
        DetectorTier::Heuristic
    }

    fn score(&self, modality: Modality, buffer: &[u8]) -> Result<Option<f64>> {
        let Some(f) = features::extract(modality, buffer) else {
            return Ok(None);
        };
        let raw = match modality {
            Modality::Video | Modality::Image => Self::visual(&f),
            Modality::Audio => Self::spectral(&f),
            Modality::Text => return Ok(None),
        };
        Ok(Some(clamp_score(raw)))
    }
}
