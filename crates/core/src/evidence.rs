use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::modality::Modality;

/// Lowest and highest evidence severity.
pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 5;

/// A time window in seconds of source media, `start <= end`.
///
/// Deserialization goes through [`TimeWindow::new`]; code building one by
/// hand must keep the bounds ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTimeWindow")]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: f64,
    end: f64,
}

impl From<RawTimeWindow> for TimeWindow {
    fn from(raw: RawTimeWindow) -> Self {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Build a window, swapping the bounds if they arrive reversed.
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// One auditable suspicious finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvidenceItem")]
pub struct EvidenceItem {
    pub pipeline: Modality,
    #[serde(rename = "type")]
    pub kind: String,
    /// `MIN_SEVERITY..=MAX_SEVERITY`. Out-of-range values are rejected on
    /// deserialization; set it directly only with a value in range.
    pub severity: u8,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub timestamps: Vec<TimeWindow>,
}

#[derive(Deserialize)]
struct RawEvidenceItem {
    pipeline: Modality,
    #[serde(rename = "type")]
    kind: String,
    severity: u8,
    #[serde(default)]
    details: Map<String, Value>,
    #[serde(default)]
    timestamps: Vec<TimeWindow>,
}

impl TryFrom<RawEvidenceItem> for EvidenceItem {
    type Error = String;

    fn try_from(raw: RawEvidenceItem) -> Result<Self, Self::Error> {
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&raw.severity) {
            return Err(format!(
                "severity must be within {}..={}, got {}",
                MIN_SEVERITY, MAX_SEVERITY, raw.severity
            ));
        }
        Ok(Self {
            pipeline: raw.pipeline,
            kind: raw.kind,
            severity: raw.severity,
            details: raw.details,
            timestamps: raw.timestamps,
        })
    }
}

impl EvidenceItem {
    /// Severity is clamped into `1..=5`.
    pub fn new(pipeline: Modality, kind: impl Into<String>, severity: u8) -> Self {
        Self {
            pipeline,
            kind: kind.into(),
            severity: severity.clamp(MIN_SEVERITY, MAX_SEVERITY),
            details: Map::new(),
            timestamps: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_timestamps(mut self, timestamps: Vec<TimeWindow>) -> Self {
        self.timestamps = timestamps;
        self
    }
}

/// Canonical output of one modality's scan.
///
/// `penalty` is already clamped to the modality ceiling when this leaves
/// the normalizer; the aggregator never re-clamps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub penalty: u32,
    pub flags: BTreeSet<String>,
    pub evidence: Vec<EvidenceItem>,
    pub summary: Map<String, Value>,
}

/// Well-known `summary` keys.
pub mod summary_keys {
    pub const SCORE: &str = "score";
    pub const TIER: &str = "tier";
    pub const FALLBACK: &str = "fallback";
    pub const DIAGNOSTICS: &str = "diagnostics";
    pub const ERROR: &str = "error";
    pub const INPUT_SHA256: &str = "input_sha256";
}

impl DetectionResult {
    /// Raw anomaly score recorded in the summary, if any.
    pub fn score(&self) -> Option<f64> {
        self.summary.get(summary_keys::SCORE).and_then(Value::as_f64)
    }

    /// Error diagnostic recorded in the summary, if the detector degraded.
    pub fn error(&self) -> Option<&str> {
        self.summary.get(summary_keys::ERROR).and_then(Value::as_str)
    }

    pub fn is_degraded(&self) -> bool {
        self.error().is_some()
    }

    /// Zero-information result for a modality whose task never produced an answer.
    pub fn zero_information(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut summary = Map::new();
        summary.insert(summary_keys::SCORE.to_string(), Value::from(0.0));
        summary.insert(
            summary_keys::ERROR.to_string(),
            Value::from(reason.clone()),
        );
        summary.insert(
            summary_keys::DIAGNOSTICS.to_string(),
            Value::from(vec![format!("error:{}", reason)]),
        );
        Self {
            penalty: 0,
            flags: BTreeSet::new(),
            evidence: Vec::new(),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_clamped() {
        assert_eq!(EvidenceItem::new(Modality::Video, "x", 0).severity, 1);
        assert_eq!(EvidenceItem::new(Modality::Video, "x", 9).severity, 5);
        assert_eq!(EvidenceItem::new(Modality::Video, "x", 3).severity, 3);
    }

    #[test]
    fn evidence_serializes_kind_as_type() {
        let item = EvidenceItem::new(Modality::Image, "ai_image_detection", 4)
            .with_detail("score", 0.8);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "ai_image_detection");
        assert_eq!(json["pipeline"], "image");
        assert_eq!(json["details"]["score"], 0.8);
        assert!(json["timestamps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn reversed_window_is_normalized() {
        let w = TimeWindow::new(2.0, 1.0);
        assert_eq!(w, TimeWindow { start: 1.0, end: 2.0 });
    }

    #[test]
    fn out_of_range_severity_is_rejected_on_read() {
        let json = r#"{"pipeline": "video", "type": "x", "severity": 9}"#;
        let err = serde_json::from_str::<EvidenceItem>(json).unwrap_err();
        assert!(err.to_string().contains("severity must be within 1..=5"), "{err}");

        let json = r#"{"pipeline": "video", "type": "x", "severity": 0}"#;
        assert!(serde_json::from_str::<EvidenceItem>(json).is_err());
    }

    #[test]
    fn evidence_reads_back_what_it_writes() {
        let item = EvidenceItem::new(Modality::Video, "suspicious_segments", 4)
            .with_timestamps(vec![TimeWindow::new(0.5, 1.5)]);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(serde_json::from_str::<EvidenceItem>(&json).unwrap(), item);
    }

    #[test]
    fn reversed_window_is_normalized_on_read() {
        let w: TimeWindow = serde_json::from_str(r#"{"start": 3.0, "end": 1.0}"#).unwrap();
        assert_eq!(w, TimeWindow { start: 1.0, end: 3.0 });
    }

    #[test]
    fn window_overlap() {
        let a = TimeWindow::new(0.0, 0.25);
        let b = TimeWindow::new(0.25, 0.75);
        let c = TimeWindow::new(0.8, 1.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn zero_information_is_neutral_and_marked() {
        let r = DetectionResult::zero_information("timeout");
        assert_eq!(r.penalty, 0);
        assert!(r.flags.is_empty());
        assert!(r.evidence.is_empty());
        assert_eq!(r.score(), Some(0.0));
        assert_eq!(r.error(), Some("timeout"));
        assert!(r.is_degraded());
    }
}
