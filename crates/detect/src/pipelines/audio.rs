use atrust_core::{DetectionResult, Modality};

use crate::decoder::Sample;
use crate::detector::TieredDetector;
use crate::normalize::{NormalizePolicy, Thresholds};

/// High severity swaps the medium flag for the high one.
pub const POLICY: NormalizePolicy = NormalizePolicy {
    modality: Modality::Audio,
    evidence_type: "spectral_anomaly",
    thresholds: Thresholds::DEFAULT,
    penalty_scale: 50.0,
    penalty_cap: 50,
    medium_flags: &["audio:medium_anomaly"],
    high_flags: &["audio:high_anomaly"],
};

pub fn scan(detector: &TieredDetector, samples: &[Sample]) -> DetectionResult {
    super::score_buffer(detector, &POLICY, samples)
}
