//! Frame-sampled video: mean frame score plus suspicious time windows.

use serde_json::Value;
use tracing::debug;

use atrust_core::config::VideoConfig;
use atrust_core::{DetectionResult, EvidenceItem, Modality};

use crate::decoder::Sample;
use crate::detector::TieredDetector;
use crate::normalize::{NormalizePolicy, Thresholds};
use crate::segments::{extract_segments, segment_severity, SegmentOptions};

pub const POLICY: NormalizePolicy = NormalizePolicy {
    modality: Modality::Video,
    evidence_type: "deepfake_detection",
    thresholds: Thresholds::DEFAULT,
    penalty_scale: 50.0,
    penalty_cap: 50,
    medium_flags: &["video:facial_inconsistency"],
    high_flags: &["video:facial_inconsistency", "video:temporal_artifact"],
};

pub const SEGMENT_EVIDENCE: &str = "suspicious_segments";

pub fn scan(detector: &TieredDetector, samples: &[Sample], config: &VideoConfig) -> DetectionResult {
    let (outcome, mut result) = super::score_samples(detector, &POLICY, samples);
    result.summary.insert(
        "frames_scored".to_string(),
        Value::from(outcome.samples_with_content()),
    );
    if outcome.error.is_some() {
        return result;
    }

    let scored: Vec<(usize, f64)> = outcome
        .sample_scores
        .iter()
        .filter_map(|s| s.score.map(|score| (s.index, score)))
        .collect();
    let options = SegmentOptions {
        pad_secs: config.segment_pad_secs,
        merge: config.merge_segments,
    };
    let windows = extract_segments(&scored, config.fps, config.segment_threshold, &options);
    debug!(windows = windows.len(), threshold = config.segment_threshold, "segments extracted");

    if let Some(severity) = segment_severity(windows.len()) {
        result.evidence.push(
            EvidenceItem::new(Modality::Video, SEGMENT_EVIDENCE, severity)
                .with_detail("windows", windows.len())
                .with_detail("threshold", config.segment_threshold)
                .with_detail("fps", config.fps)
                .with_timestamps(windows),
        );
    }
    result
}
