use atrust_core::{DetectionResult, Modality};

use crate::decoder::Sample;
use crate::detector::TieredDetector;
use crate::normalize::{NormalizePolicy, Thresholds};

pub const POLICY: NormalizePolicy = NormalizePolicy {
    modality: Modality::Image,
    evidence_type: "ai_image_detection",
    thresholds: Thresholds::DEFAULT,
    penalty_scale: 50.0,
    penalty_cap: 50,
    medium_flags: &["image:gan_fingerprint"],
    high_flags: &["image:gan_fingerprint", "image:noise_anomaly"],
};

pub fn scan(detector: &TieredDetector, samples: &[Sample]) -> DetectionResult {
    super::score_buffer(detector, &POLICY, samples)
}
