//! `scan(modality, input)`: decode, detect, normalize, one modality at a time.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use atrust_core::config::VideoConfig;
use atrust_core::summary_keys as keys;
use atrust_core::{AtrustError, DetectionResult, EngineConfig, Modality, Result};
use atrust_rules::{default_rule_set, load_rule_set, CompiledRuleSet, RuleMatcher};

use crate::capability::Capabilities;
use crate::decoder::{MediaDecoder, MediaSource, RawDecoder};
use crate::detector::TieredDetector;
use crate::normalize::malformed_result;
use crate::pipelines;

/// Input for one modality.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanInput {
    Media(MediaSource),
    /// Inline text; only valid for [`Modality::Text`].
    Text(String),
}

/// Runs one modality end to end. Cheap to clone; share it across tasks.
#[derive(Clone)]
pub struct Scanner {
    detector: TieredDetector,
    decoder: Arc<dyn MediaDecoder>,
    matcher: Arc<dyn RuleMatcher>,
    video: VideoConfig,
}

impl Scanner {
    pub fn new(
        capabilities: Arc<Capabilities>,
        matcher: Arc<dyn RuleMatcher>,
        video: VideoConfig,
    ) -> Self {
        Self {
            detector: TieredDetector::new(capabilities),
            decoder: Arc::new(RawDecoder::new(video.frame_bytes)),
            matcher,
            video,
        }
    }

    /// Wire capabilities, rules and sampling from process config.
    ///
    /// Tier prerequisites are not loaded here; that happens on first use.
    /// A broken rule document is a configuration error.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let rule_set = match &config.rules.text_rules_path {
            Some(path) => load_rule_set(path),
            None => default_rule_set(),
        }
        .map_err(|e| AtrustError::Config(format!("text rules: {}", e)))?;
        let matcher = CompiledRuleSet::compile(&rule_set)
            .map_err(|e| AtrustError::Config(format!("text rules: {}", e)))?;

        Ok(Self::new(
            Arc::new(Capabilities::from_config(&config.detector)),
            Arc::new(matcher),
            config.video.clone(),
        ))
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn MediaDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn capabilities(&self) -> &Arc<Capabilities> {
        self.detector.capabilities()
    }

    /// Reject modality/input pairs that can never be scanned.
    pub fn check_input(modality: Modality, input: &ScanInput) -> Result<()> {
        match (modality, input) {
            (Modality::Text, _) | (_, ScanInput::Media(_)) => Ok(()),
            (m, ScanInput::Text(_)) => Err(AtrustError::InvalidInput(format!(
                "{} expects a media source, got inline text",
                m
            ))),
        }
    }

    /// Scan one modality.
    ///
    /// Runtime failures come back inside the result (malformed-input
    /// evidence, zero-information scores); only an invalid modality/input
    /// pairing is an `Err`.
    pub fn scan(&self, modality: Modality, input: &ScanInput) -> Result<DetectionResult> {
        Self::check_input(modality, input)?;
        let started = Instant::now();

        let bytes = match input {
            ScanInput::Text(text) => text.as_bytes().to_vec(),
            ScanInput::Media(source) => match source.load() {
                Ok(bytes) => bytes,
                Err(AtrustError::MalformedInput(reason)) => {
                    warn!(modality = %modality, reason = %reason, "unreadable input");
                    return Ok(malformed_result(modality, &reason));
                }
                Err(e) => return Err(e),
            },
        };
        let digest = format!("{:x}", Sha256::digest(&bytes));

        let mut result = match self.scan_bytes(modality, &bytes) {
            Ok(result) => result,
            Err(AtrustError::MalformedInput(reason)) => {
                warn!(modality = %modality, reason = %reason, "malformed input");
                malformed_result(modality, &reason)
            }
            Err(e) => return Err(e),
        };
        result
            .summary
            .insert(keys::INPUT_SHA256.to_string(), Value::from(digest));

        info!(
            modality = %modality,
            penalty = result.penalty,
            flags = result.flags.len(),
            degraded = result.is_degraded(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "modality scanned"
        );
        Ok(result)
    }

    fn scan_bytes(&self, modality: Modality, bytes: &[u8]) -> Result<DetectionResult> {
        let decode = || {
            self.decoder
                .decode_samples(modality, bytes, self.video.fps, self.video.max_frames)
        };
        Ok(match modality {
            Modality::Text => {
                let text = std::str::from_utf8(bytes).map_err(|e| {
                    AtrustError::MalformedInput(format!("text is not UTF-8: {}", e))
                })?;
                pipelines::text::scan(self.matcher.as_ref(), text)
            }
            Modality::Video => pipelines::video::scan(&self.detector, &decode()?, &self.video),
            Modality::Image => pipelines::image::scan(&self.detector, &decode()?),
            Modality::Audio => pipelines::audio::scan(&self.detector, &decode()?),
        })
    }
}
