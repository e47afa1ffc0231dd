//! Tier resolution for one modality call.
//!
//! The first ready tier that supports the modality answers. If it fails on
//! this particular input the call yields a zero-information score tagged
//! `error:<reason>`; it is never retried on a lower tier.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use atrust_core::{AtrustError, DetectorTier, Modality};

use crate::capability::Capabilities;
use crate::decoder::Sample;
use crate::tiers::clamp_score;

/// Score of one decoded sample; `None` when it had no detectable content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleScore {
    pub index: usize,
    pub score: Option<f64>,
}

/// What one detector call produced and which tier produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TierOutcome {
    /// Clamped to [0, 1].
    pub score: f64,
    pub tier: DetectorTier,
    pub diagnostics: Vec<String>,
    /// Set when the answering tier failed on this input.
    pub error: Option<String>,
    /// Per-sample scores for sequence calls; empty for single buffers.
    pub sample_scores: Vec<SampleScore>,
}

impl TierOutcome {
    fn scored(tier: DetectorTier, score: f64, diagnostics: Vec<String>) -> Self {
        Self {
            score: clamp_score(score),
            tier,
            diagnostics,
            error: None,
            sample_scores: Vec::new(),
        }
    }

    fn failed(tier: DetectorTier, reason: String, mut diagnostics: Vec<String>) -> Self {
        diagnostics.push(format!("error:{}", reason));
        Self {
            score: 0.0,
            tier,
            diagnostics,
            error: Some(reason),
            sample_scores: Vec::new(),
        }
    }

    /// Number of samples that had detectable content.
    pub fn samples_with_content(&self) -> usize {
        self.sample_scores.iter().filter(|s| s.score.is_some()).count()
    }

    /// Whether a tier below Native answered.
    pub fn is_fallback(&self) -> bool {
        self.tier != DetectorTier::Native
    }
}

#[derive(Clone)]
pub struct TieredDetector {
    capabilities: Arc<Capabilities>,
}

impl TieredDetector {
    pub fn new(capabilities: Arc<Capabilities>) -> Self {
        Self { capabilities }
    }

    pub fn capabilities(&self) -> &Arc<Capabilities> {
        &self.capabilities
    }

    /// Score a single buffer.
    pub fn detect(&self, modality: Modality, buffer: &[u8]) -> TierOutcome {
        let (scorer, mut diagnostics) = self.capabilities.resolve(modality);
        let tier = scorer.tier();
        match scorer.score(modality, buffer) {
            Ok(Some(score)) => {
                debug!(modality = %modality, tier = %tier, score, "sample scored");
                TierOutcome::scored(tier, score, diagnostics)
            }
            Ok(None) => {
                diagnostics.push("no_content".to_string());
                TierOutcome::scored(tier, 0.0, diagnostics)
            }
            Err(e) => {
                let reason = failure_reason(e);
                warn!(modality = %modality, tier = %tier, reason = %reason, "scoring failed");
                TierOutcome::failed(tier, reason, diagnostics)
            }
        }
    }

    /// Score an ordered sample sequence with one tier.
    ///
    /// Samples are scored in parallel with their order kept. The outcome
    /// score is the mean over samples with content (0.0 when none had any).
    /// A failure on any sample fails the whole call.
    pub fn detect_samples(&self, modality: Modality, samples: &[Sample]) -> TierOutcome {
        let (scorer, mut diagnostics) = self.capabilities.resolve(modality);
        let tier = scorer.tier();

        let scored: Result<Vec<SampleScore>, AtrustError> = samples
            .par_iter()
            .map(|sample| {
                scorer.score(modality, &sample.data).map(|score| SampleScore {
                    index: sample.index,
                    score: score.map(clamp_score),
                })
            })
            .collect();

        match scored {
            Ok(sample_scores) => {
                let with_content: Vec<f64> = sample_scores.iter().filter_map(|s| s.score).collect();
                let score = if with_content.is_empty() {
                    diagnostics.push("no_content".to_string());
                    0.0
                } else {
                    with_content.iter().sum::<f64>() / with_content.len() as f64
                };
                debug!(
                    modality = %modality,
                    tier = %tier,
                    samples = samples.len(),
                    with_content = with_content.len(),
                    score,
                    "sequence scored"
                );
                let mut outcome = TierOutcome::scored(tier, score, diagnostics);
                outcome.sample_scores = sample_scores;
                outcome
            }
            Err(e) => {
                let reason = failure_reason(e);
                warn!(modality = %modality, tier = %tier, reason = %reason, "scoring failed");
                TierOutcome::failed(tier, reason, diagnostics)
            }
        }
    }
}

fn failure_reason(e: AtrustError) -> String {
    match e {
        AtrustError::Scoring(reason) => reason,
        other => other.to_string(),
    }
}
