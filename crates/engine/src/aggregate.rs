//! Fan-in of per-modality results into one [`TrustReport`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use atrust_core::{DetectionResult, Modality, RiskType, TrustReport};

/// Highest possible trust score.
pub const MAX_TRUST: u8 = 100;

/// Build the report from every present modality's result.
///
/// Never fails. Penalties are summed without a per-modality re-clamp; only
/// the final trust score is clamped into 0..=100.
pub fn build_report(results: BTreeMap<Modality, DetectionResult>) -> TrustReport {
    let mut total_penalty: u64 = 0;
    let mut flags = BTreeSet::new();
    let mut evidence = Vec::new();

    for modality in Modality::ALL {
        let Some(result) = results.get(&modality) else {
            continue;
        };
        total_penalty = total_penalty.saturating_add(result.penalty as u64);
        flags.extend(result.flags.iter().cloned());
        evidence.extend(result.evidence.iter().cloned());
    }

    let trust_score = (MAX_TRUST as u64).saturating_sub(total_penalty) as u8;
    let risk_type = RiskType::from_trust_score(trust_score);
    debug!(
        modalities = results.len(),
        total_penalty,
        trust_score,
        risk = %risk_type,
        "report built"
    );

    TrustReport {
        trust_score,
        risk_type,
        flags: flags.into_iter().collect(),
        evidence,
        recommended_action: risk_type.recommended_action().to_string(),
        raw: results,
    }
}

/// Like [`build_report`], treating `None` entries as absent (neutral).
pub fn aggregate(results: BTreeMap<Modality, Option<DetectionResult>>) -> TrustReport {
    build_report(
        results
            .into_iter()
            .filter_map(|(m, r)| r.map(|r| (m, r)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use atrust_core::EvidenceItem;

    use super::*;

    fn result(penalty: u32, flags: &[&str]) -> DetectionResult {
        DetectionResult {
            penalty,
            flags: flags.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    fn with_evidence(mut r: DetectionResult, m: Modality, kinds: &[&str]) -> DetectionResult {
        r.evidence = kinds.iter().map(|k| EvidenceItem::new(m, *k, 3)).collect();
        r
    }

    #[test]
    fn empty_request_is_fully_trusted() {
        let report = build_report(BTreeMap::new());
        assert_eq!(report.trust_score, 100);
        assert_eq!(report.risk_type, RiskType::Low);
        assert!(report.flags.is_empty());
        assert!(report.raw.is_empty());
    }

    #[test]
    fn penalties_beyond_100_clamp_to_zero() {
        let report = build_report(BTreeMap::from([
            (Modality::Video, result(30, &[])),
            (Modality::Image, result(30, &[])),
            (Modality::Text, result(50, &[])),
        ]));
        assert_eq!(report.trust_score, 0);
        assert_eq!(report.risk_type, RiskType::Critical);
        assert_eq!(
            report.recommended_action,
            RiskType::Critical.recommended_action()
        );
    }

    #[test]
    fn trust_is_100_iff_all_penalties_zero() {
        let clean = build_report(BTreeMap::from([
            (Modality::Audio, result(0, &["audio:medium_anomaly"])),
            (Modality::Text, result(0, &[])),
        ]));
        assert_eq!(clean.trust_score, 100);

        let dirty = build_report(BTreeMap::from([(Modality::Audio, result(1, &[]))]));
        assert_eq!(dirty.trust_score, 99);
    }

    #[test]
    fn bucket_follows_trust_score_only() {
        for (penalty, expected) in [
            (15, RiskType::Low),
            (16, RiskType::Medium),
            (35, RiskType::Medium),
            (36, RiskType::High),
            (60, RiskType::High),
            (61, RiskType::Critical),
        ] {
            let report = build_report(BTreeMap::from([(Modality::Text, result(penalty, &[]))]));
            assert_eq!(report.risk_type, expected, "penalty {}", penalty);
        }
    }

    #[test]
    fn flags_are_sorted_and_deduplicated() {
        let report = build_report(BTreeMap::from([
            (Modality::Video, result(1, &["z:last", "shared:flag"])),
            (Modality::Text, result(1, &["shared:flag", "a:first"])),
        ]));
        assert_eq!(report.flags, vec!["a:first", "shared:flag", "z:last"]);
    }

    #[test]
    fn evidence_follows_canonical_modality_order() {
        let report = build_report(BTreeMap::from([
            (Modality::Text, with_evidence(result(0, &[]), Modality::Text, &["t1"])),
            (Modality::Audio, with_evidence(result(0, &[]), Modality::Audio, &["a1", "a2"])),
            (Modality::Video, with_evidence(result(0, &[]), Modality::Video, &["v1", "v2"])),
        ]));
        let kinds: Vec<&str> = report.evidence.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["v1", "v2", "a1", "a2", "t1"]);
    }

    #[test]
    fn absent_modality_is_neutral() {
        let only_video = aggregate(BTreeMap::from([(Modality::Video, Some(result(20, &[])))]));
        let with_absent = aggregate(BTreeMap::from([
            (Modality::Video, Some(result(20, &[]))),
            (Modality::Image, None),
        ]));
        assert_eq!(only_video.trust_score, with_absent.trust_score);
        assert!(!with_absent.raw.contains_key(&Modality::Image));
    }

    #[test]
    fn raw_keeps_results_verbatim() {
        let video = result(12, &["video:facial_inconsistency"]);
        let report = build_report(BTreeMap::from([(Modality::Video, video.clone())]));
        assert_eq!(report.raw[&Modality::Video], video);
    }

    #[test]
    fn degraded_modality_does_not_abort_aggregation() {
        let report = build_report(BTreeMap::from([
            (Modality::Video, DetectionResult::zero_information("timeout")),
            (Modality::Text, result(24, &["text:otp_mentioned"])),
        ]));
        assert_eq!(report.trust_score, 76);
        assert_eq!(report.raw.len(), 2);
    }

    #[test]
    fn trust_score_always_in_range() {
        for a in (0..=120u32).step_by(7) {
            for b in (0..=120u32).step_by(11) {
                let report = build_report(BTreeMap::from([
                    (Modality::Image, result(a, &[])),
                    (Modality::Audio, result(b, &[])),
                ]));
                assert!(report.trust_score <= 100);
                assert_eq!(report.trust_score as u32, 100u32.saturating_sub(a + b));
            }
        }
    }
}
