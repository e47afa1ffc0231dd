//! Per-modality scan pipelines: decoded samples in, `DetectionResult` out.

pub mod audio;
pub mod image;
pub mod text;
pub mod video;

use atrust_core::{DetectionResult, Modality};
use serde_json::Value;

use crate::decoder::Sample;
use crate::detector::{TierOutcome, TieredDetector};
use crate::normalize::{normalize, NormalizePolicy, Provenance};

/// Score policy for a media modality; `None` for text.
pub fn policy_for(modality: Modality) -> Option<&'static NormalizePolicy> {
    match modality {
        Modality::Video => Some(&video::POLICY),
        Modality::Image => Some(&image::POLICY),
        Modality::Audio => Some(&audio::POLICY),
        Modality::Text => None,
    }
}

/// Score a single-buffer modality (image, audio) and normalize under `policy`.
///
/// One decoded sample is scored as a plain buffer; anything else falls back
/// to the sequence path.
pub(crate) fn score_buffer(
    detector: &TieredDetector,
    policy: &NormalizePolicy,
    samples: &[Sample],
) -> DetectionResult {
    let [sample] = samples else {
        return score_samples(detector, policy, samples).1;
    };
    let outcome = detector.detect(policy.modality, &sample.data);
    let mut result = normalize(outcome.score, policy, &Provenance::from(&outcome));
    result.summary.insert("samples".to_string(), Value::from(1));
    result
}

/// Score all samples with one tier and normalize under `policy`.
pub(crate) fn score_samples(
    detector: &TieredDetector,
    policy: &NormalizePolicy,
    samples: &[Sample],
) -> (TierOutcome, DetectionResult) {
    let outcome = detector.detect_samples(policy.modality, samples);
    let mut result = normalize(outcome.score, policy, &Provenance::from(&outcome));
    result
        .summary
        .insert("samples".to_string(), Value::from(samples.len()));
    (outcome, result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use atrust_core::{DetectorTier, Result};

    use super::*;
    use crate::capability::Capabilities;
    use crate::tiers::SampleScorer;

    /// Records the length of the last buffer it scored.
    struct Recording(Arc<AtomicUsize>);

    impl SampleScorer for Recording {
        fn tier(&self) -> DetectorTier {
            DetectorTier::Native
        }

        fn score(&self, _modality: Modality, buffer: &[u8]) -> Result<Option<f64>> {
            self.0.store(buffer.len(), Ordering::SeqCst);
            Ok(Some(0.8))
        }
    }

    fn recording_detector() -> (TieredDetector, Arc<AtomicUsize>) {
        let seen = Arc::new(AtomicUsize::new(0));
        let scorer = Recording(Arc::clone(&seen));
        let scorer: Arc<dyn SampleScorer> = Arc::new(scorer);
        let caps = Capabilities::builder()
            .native(move || Ok(Arc::clone(&scorer)))
            .build();
        (TieredDetector::new(Arc::new(caps)), seen)
    }

    #[test]
    fn image_is_scored_as_one_buffer() {
        let (detector, seen) = recording_detector();
        let samples = vec![Sample::new(0, vec![7u8; 300])];
        let r = image::scan(&detector, &samples);
        assert_eq!(seen.load(Ordering::SeqCst), 300);
        assert_eq!(r.score(), Some(0.8));
        assert_eq!(r.summary["tier"], "native");
        assert_eq!(r.summary["samples"], 1);
        assert_eq!(r.penalty, 40);
    }

    #[test]
    fn audio_buffer_without_content_scores_zero() {
        struct Silent;

        impl SampleScorer for Silent {
            fn tier(&self) -> DetectorTier {
                DetectorTier::Native
            }

            fn score(&self, _modality: Modality, _buffer: &[u8]) -> Result<Option<f64>> {
                Ok(None)
            }
        }

        let caps = Capabilities::builder()
            .native(|| Ok(Arc::new(Silent) as Arc<dyn SampleScorer>))
            .build();
        let detector = TieredDetector::new(Arc::new(caps));
        let r = audio::scan(&detector, &[Sample::new(0, vec![0u8; 8])]);
        assert_eq!(r.penalty, 0);
        assert!(r.flags.is_empty());
        assert_eq!(r.summary["diagnostics"], serde_json::json!(["no_content"]));
    }
}
