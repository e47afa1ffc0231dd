//! Sample scorers, one per capability tier.

pub mod heuristic;
pub mod model;
pub mod native;

use atrust_core::{DetectorTier, Modality, Result};

pub use heuristic::HeuristicScorer;
pub use model::LinearModel;
pub use native::NativeModule;

/// Uniform scoring capability shared by every tier.
///
/// `Ok(None)` means the sample has no detectable content and contributes
/// nothing. `Err` is a scoring failure for this one input; the detector
/// never retries it on a lower tier.
pub trait SampleScorer: Send + Sync {
    fn tier(&self) -> DetectorTier;

    /// Whether this scorer can answer for the modality at all.
    fn supports(&self, _modality: Modality) -> bool {
        true
    }

    /// Score one decoded sample. Implementations may return values outside
    /// [0, 1]; the detector clamps.
    fn score(&self, modality: Modality, buffer: &[u8]) -> Result<Option<f64>>;
}

/// Clamp into [0, 1]; NaN collapses to 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
