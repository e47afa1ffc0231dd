//! Concurrent scans through `DetectionEngine`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use atrust_core::config::VideoConfig;
use atrust_core::{AtrustError, DetectorTier, EngineConfig, Modality, Result, RiskType};
use atrust_detect::{Capabilities, MediaSource, SampleScorer, ScanInput, Scanner};
use atrust_engine::{DetectionEngine, ScanRequest};
use atrust_rules::{default_rule_set, CompiledRuleSet};

struct Scripted {
    score: f64,
    delay: Duration,
    panic_on: Option<Modality>,
}

impl SampleScorer for Scripted {
    fn tier(&self) -> DetectorTier {
        DetectorTier::Native
    }

    fn score(&self, modality: Modality, _buffer: &[u8]) -> Result<Option<f64>> {
        if self.panic_on == Some(modality) {
            panic!("scorer crashed on {modality}");
        }
        thread::sleep(self.delay);
        Ok(Some(self.score))
    }
}

fn engine_with(scorer: Scripted) -> DetectionEngine {
    let scorer = Arc::new(scorer);
    let caps = Capabilities::builder()
        .native(move || Ok(Arc::clone(&scorer) as Arc<dyn SampleScorer>))
        .build();
    let rules = CompiledRuleSet::compile(&default_rule_set().unwrap()).unwrap();
    DetectionEngine::new(Scanner::new(
        Arc::new(caps),
        Arc::new(rules),
        VideoConfig::default(),
    ))
}

fn media(bytes: &[u8]) -> ScanInput {
    ScanInput::Media(MediaSource::Bytes(bytes.to_vec()))
}

#[tokio::test]
async fn empty_request_is_low_risk() {
    let engine = engine_with(Scripted {
        score: 0.9,
        delay: Duration::ZERO,
        panic_on: None,
    });
    let outcome = engine.scan_all(ScanRequest::new()).await.unwrap();
    assert_eq!(outcome.report.trust_score, 100);
    assert_eq!(outcome.report.risk_type, RiskType::Low);
    assert!(outcome.finished_at >= outcome.started_at);
}

#[tokio::test]
async fn all_modalities_aggregate_to_critical() {
    let engine = engine_with(Scripted {
        score: 1.0,
        delay: Duration::ZERO,
        panic_on: None,
    });
    let request = ScanRequest::new()
        .with(Modality::Video, media(&[7u8; 64]))
        .with(Modality::Image, media(&[7u8; 64]))
        .with_text("Pay now! Share the OTP and your UPI pin, lottery prize money waiting");

    let report = engine.scan_all(request).await.unwrap().report;
    // video 50 + image 50 + text capped at 60.
    assert_eq!(report.trust_score, 0);
    assert_eq!(report.risk_type, RiskType::Critical);
    assert_eq!(report.raw.len(), 3);
    assert_eq!(report.raw[&Modality::Text].penalty, 60);
    assert_eq!(report.evidence[0].pipeline, Modality::Video);
    assert_eq!(report.evidence.last().unwrap().pipeline, Modality::Text);
    let mut sorted = report.flags.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(report.flags, sorted);
}

#[tokio::test]
async fn timed_out_modality_is_zero_information() {
    let engine = engine_with(Scripted {
        score: 1.0,
        delay: Duration::from_millis(500),
        panic_on: None,
    })
    .with_task_timeout(Some(Duration::from_millis(50)));

    let request = ScanRequest::new()
        .with(Modality::Image, media(&[1u8; 16]))
        .with_text("urgent");
    let report = engine.scan_all(request).await.unwrap().report;

    let image = &report.raw[&Modality::Image];
    assert_eq!(image.penalty, 0);
    assert_eq!(image.error(), Some("timeout"));
    assert_eq!(report.raw[&Modality::Text].penalty, 12);
    assert_eq!(report.trust_score, 88);
}

#[tokio::test]
async fn panicking_modality_does_not_drop_the_others() {
    let engine = engine_with(Scripted {
        score: 0.6,
        delay: Duration::ZERO,
        panic_on: Some(Modality::Audio),
    });
    let request = ScanRequest::new()
        .with(Modality::Audio, media(&[3u8; 32]))
        .with(Modality::Image, media(&[3u8; 32]));
    let report = engine.scan_all(request).await.unwrap().report;

    assert_eq!(report.raw.len(), 2);
    assert_eq!(report.raw[&Modality::Audio].error(), Some("panic"));
    assert_eq!(report.raw[&Modality::Image].penalty, 30);
    assert_eq!(report.trust_score, 70);
    assert_eq!(report.risk_type, RiskType::Medium);
}

#[tokio::test]
async fn invalid_pairing_fails_fast() {
    let engine = engine_with(Scripted {
        score: 0.0,
        delay: Duration::ZERO,
        panic_on: None,
    });
    let request = ScanRequest::new().with(Modality::Video, ScanInput::Text("not a video".into()));
    let err = engine.scan_all(request).await.unwrap_err();
    assert!(matches!(err, AtrustError::InvalidInput(_)));
}

#[tokio::test]
async fn engine_from_default_config_runs_heuristics() {
    let engine = DetectionEngine::from_config(&EngineConfig::default()).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    let noise: Vec<u8> = (0..4096u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    std::fs::write(file.path(), &noise).unwrap();

    let outcome = engine
        .scan_all(ScanRequest::new().with_file(Modality::Image, file.path()))
        .await
        .unwrap();
    let image = &outcome.report.raw[&Modality::Image];
    assert_eq!(image.summary["tier"], "heuristic");
    assert!(!image.is_degraded());

    let json = serde_json::to_value(&outcome).unwrap();
    assert!(json["scan_id"].is_string());
    assert!(json["report"]["trust_score"].is_u64());
    assert!(json["report"]["raw"]["image"].is_object());
}
