//! Detector scores and rule matches into canonical [`DetectionResult`]s.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};

use atrust_core::summary_keys as keys;
use atrust_core::{DetectionResult, DetectorTier, EvidenceItem, Modality};
use atrust_rules::{RuleMatch, RuleScoring, TEXT_PENALTY_CEILING};

use crate::detector::TierOutcome;

/// Severity of the evidence item for an input that could not be decoded.
pub const MALFORMED_SEVERITY: u8 = 2;

/// Evidence type for an input that could not be decoded.
pub const MALFORMED_EVIDENCE: &str = "unreadable_file";

/// Score cut-offs for qualitative flags. Inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    pub const DEFAULT: Thresholds = Thresholds {
        medium: 0.5,
        high: 0.75,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How one modality turns a score into penalty, flags and evidence.
#[derive(Debug, Clone, Copy)]
pub struct NormalizePolicy {
    pub modality: Modality,
    pub evidence_type: &'static str,
    pub thresholds: Thresholds,
    pub penalty_scale: f64,
    pub penalty_cap: u32,
    pub medium_flags: &'static [&'static str],
    /// Complete flag set at high severity (not added on top of `medium_flags`).
    pub high_flags: &'static [&'static str],
}

/// Which tier answered and what it reported, for the audit summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    /// `None` for rule-based signals.
    pub tier: Option<DetectorTier>,
    pub diagnostics: Vec<String>,
    pub error: Option<String>,
}

impl Provenance {
    pub fn rules() -> Self {
        Self::default()
    }

    fn tier_label(&self) -> &'static str {
        self.tier.map(|t| t.as_str()).unwrap_or("rules")
    }

    fn write_into(&self, summary: &mut Map<String, Value>) {
        summary.insert(keys::TIER.to_string(), Value::from(self.tier_label()));
        summary.insert(
            keys::FALLBACK.to_string(),
            Value::from(matches!(self.tier, Some(t) if t != DetectorTier::Native)),
        );
        summary.insert(keys::DIAGNOSTICS.to_string(), json!(self.diagnostics));
        if let Some(error) = &self.error {
            summary.insert(keys::ERROR.to_string(), Value::from(error.clone()));
        }
    }
}

impl From<&TierOutcome> for Provenance {
    fn from(outcome: &TierOutcome) -> Self {
        Self {
            tier: Some(outcome.tier),
            diagnostics: outcome.diagnostics.clone(),
            error: outcome.error.clone(),
        }
    }
}

/// `clamp(floor(score * scale), 0, cap)`.
pub fn penalty_for(score: f64, scale: f64, cap: u32) -> u32 {
    let raw = (score * scale).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        raw.min(cap as f64) as u32
    }
}

/// Wrap an anomaly score into a `DetectionResult`.
///
/// Below the medium threshold there are no flags and no evidence, but the
/// penalty may still be nonzero.
pub fn normalize(score: f64, policy: &NormalizePolicy, provenance: &Provenance) -> DetectionResult {
    let penalty = penalty_for(score, policy.penalty_scale, policy.penalty_cap);

    let (flags, severity): (&[&str], Option<u8>) = if score >= policy.thresholds.high {
        (policy.high_flags, Some(4))
    } else if score >= policy.thresholds.medium {
        (policy.medium_flags, Some(3))
    } else {
        (&[], None)
    };

    let evidence = severity
        .map(|severity| {
            vec![EvidenceItem::new(policy.modality, policy.evidence_type, severity)
                .with_detail("score", score)
                .with_detail("tier", provenance.tier_label())]
        })
        .unwrap_or_default();

    let mut summary = Map::new();
    summary.insert(keys::SCORE.to_string(), Value::from(score));
    provenance.write_into(&mut summary);

    DetectionResult {
        penalty,
        flags: flags.iter().map(|f| f.to_string()).collect(),
        evidence,
        summary,
    }
}

/// Wrap rule matches into a `DetectionResult`.
///
/// `penalty = min(Σ severity × weight, cap)`, where `cap` never exceeds
/// [`TEXT_PENALTY_CEILING`]; one evidence item lists every match, severity 4
/// if any match is severity 5 or above, else 3.
pub fn normalize_rule_matches(
    modality: Modality,
    evidence_type: &str,
    matches: &[RuleMatch],
    scoring: RuleScoring,
) -> DetectionResult {
    let cap = scoring.penalty_cap.clamp(1, TEXT_PENALTY_CEILING);
    let total: u64 = matches
        .iter()
        .map(|m| m.severity as u64 * scoring.weight as u64)
        .sum();
    let penalty = total.min(cap as u64) as u32;

    let flags: BTreeSet<String> = matches.iter().map(|m| m.flag.clone()).collect();

    let evidence = if matches.is_empty() {
        Vec::new()
    } else {
        let severity = if matches.iter().any(|m| m.severity >= 5) { 4 } else { 3 };
        vec![EvidenceItem::new(modality, evidence_type, severity).with_detail(
            "matches",
            json!(matches
                .iter()
                .map(|m| json!({ "flag": m.flag, "severity": m.severity }))
                .collect::<Vec<_>>()),
        )]
    };

    let mut summary = Map::new();
    summary.insert(
        keys::SCORE.to_string(),
        Value::from(penalty as f64 / cap as f64),
    );
    summary.insert("matched_rules".to_string(), Value::from(matches.len()));
    Provenance::rules().write_into(&mut summary);

    DetectionResult {
        penalty,
        flags,
        evidence,
        summary,
    }
}

/// Result for media that could not be decoded: fixed-severity evidence, no penalty.
pub fn malformed_result(modality: Modality, reason: &str) -> DetectionResult {
    let error = format!("malformed:{}", reason);
    let mut summary = Map::new();
    summary.insert(keys::SCORE.to_string(), Value::from(0.0));
    summary.insert(keys::ERROR.to_string(), Value::from(error.clone()));
    summary.insert(keys::DIAGNOSTICS.to_string(), json!([format!("error:{}", error)]));

    DetectionResult {
        penalty: 0,
        flags: [format!("{}:{}", modality, MALFORMED_EVIDENCE)].into_iter().collect(),
        evidence: vec![EvidenceItem::new(modality, MALFORMED_EVIDENCE, MALFORMED_SEVERITY)
            .with_detail("reason", reason)],
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO: NormalizePolicy = NormalizePolicy {
        modality: Modality::Video,
        evidence_type: "deepfake_detection",
        thresholds: Thresholds::DEFAULT,
        penalty_scale: 50.0,
        penalty_cap: 50,
        medium_flags: &["video:facial_inconsistency"],
        high_flags: &["video:facial_inconsistency", "video:temporal_artifact"],
    };

    fn heuristic() -> Provenance {
        Provenance {
            tier: Some(DetectorTier::Heuristic),
            diagnostics: vec!["native:unavailable:x".into()],
            error: None,
        }
    }

    #[test]
    fn penalty_floors_and_caps() {
        assert_eq!(penalty_for(0.999, 50.0, 50), 49);
        assert_eq!(penalty_for(1.0, 50.0, 50), 50);
        assert_eq!(penalty_for(1.0, 80.0, 50), 50);
        assert_eq!(penalty_for(-0.5, 50.0, 50), 0);
        assert_eq!(penalty_for(f64::NAN, 50.0, 50), 0);
    }

    #[test]
    fn infinite_scores_saturate() {
        assert_eq!(penalty_for(f64::INFINITY, 50.0, 50), 50);
        assert_eq!(penalty_for(1.0, f64::INFINITY, 20), 20);
        assert_eq!(penalty_for(f64::NEG_INFINITY, 50.0, 50), 0);
    }

    #[test]
    fn low_score_has_penalty_but_no_flags() {
        let r = normalize(0.3, &VIDEO, &heuristic());
        assert_eq!(r.penalty, 15);
        assert!(r.flags.is_empty());
        assert!(r.evidence.is_empty());
        assert_eq!(r.score(), Some(0.3));
        assert_eq!(r.summary["tier"], "heuristic");
        assert_eq!(r.summary["fallback"], true);
    }

    #[test]
    fn medium_boundary_is_inclusive() {
        let r = normalize(0.5, &VIDEO, &heuristic());
        assert_eq!(r.penalty, 25);
        assert_eq!(r.flags.len(), 1);
        assert_eq!(r.evidence[0].severity, 3);
        assert_eq!(r.evidence[0].kind, "deepfake_detection");
    }

    #[test]
    fn high_boundary_is_inclusive() {
        let r = normalize(0.75, &VIDEO, &heuristic());
        assert_eq!(r.penalty, 37);
        assert!(r.flags.contains("video:temporal_artifact"));
        assert_eq!(r.evidence[0].severity, 4);
        assert_eq!(r.evidence[0].details["score"], 0.75);
    }

    #[test]
    fn error_provenance_is_recorded() {
        let p = Provenance {
            tier: Some(DetectorTier::Native),
            diagnostics: vec!["error:boom".into()],
            error: Some("boom".into()),
        };
        let r = normalize(0.0, &VIDEO, &p);
        assert_eq!(r.penalty, 0);
        assert_eq!(r.error(), Some("boom"));
        assert_eq!(r.summary["fallback"], false);
    }

    fn m(flag: &str, severity: u8) -> RuleMatch {
        RuleMatch {
            flag: flag.to_string(),
            severity,
        }
    }

    #[test]
    fn rule_penalty_sums_and_caps() {
        let r = normalize_rule_matches(
            Modality::Text,
            "scam_intent_rules",
            &[m("text:a", 3), m("text:b", 4)],
            RuleScoring::default(),
        );
        assert_eq!(r.penalty, 28);
        assert_eq!(r.evidence.len(), 1);
        assert_eq!(r.evidence[0].severity, 3);

        let many: Vec<RuleMatch> = (0..6).map(|i| m(&format!("text:{i}"), 5)).collect();
        let r = normalize_rule_matches(
            Modality::Text,
            "scam_intent_rules",
            &many,
            RuleScoring::default(),
        );
        assert_eq!(r.penalty, 60);
        assert_eq!(r.score(), Some(1.0));
        assert_eq!(r.evidence[0].severity, 4);
        assert_eq!(r.evidence[0].details["matches"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn document_cap_cannot_exceed_text_ceiling() {
        let scoring = RuleScoring {
            weight: 50,
            penalty_cap: 500,
        };
        let r = normalize_rule_matches(
            Modality::Text,
            "scam_intent_rules",
            &[m("text:otp", 5)],
            scoring,
        );
        assert_eq!(r.penalty, TEXT_PENALTY_CEILING);
        assert_eq!(r.score(), Some(1.0));
    }

    #[test]
    fn no_matches_is_clean() {
        let r = normalize_rule_matches(
            Modality::Text,
            "scam_intent_rules",
            &[],
            RuleScoring::default(),
        );
        assert_eq!(r.penalty, 0);
        assert!(r.flags.is_empty());
        assert!(r.evidence.is_empty());
        assert_eq!(r.summary["tier"], "rules");
    }

    #[test]
    fn malformed_is_fixed_severity_without_penalty() {
        let r = malformed_result(Modality::Image, "empty input");
        assert_eq!(r.penalty, 0);
        assert!(r.flags.contains("image:unreadable_file"));
        assert_eq!(r.evidence[0].severity, 2);
        assert_eq!(r.error(), Some("malformed:empty input"));
    }
}
