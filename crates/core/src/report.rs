use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::evidence::{DetectionResult, EvidenceItem};
use crate::modality::Modality;

/// Qualitative risk bucket derived from the trust score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskType {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskType {
    /// Buckets are inclusive on their lower bound: >=85 low, >=65 medium, >=40 high.
    pub fn from_trust_score(trust_score: u8) -> Self {
        match trust_score {
            85.. => RiskType::Low,
            65..=84 => RiskType::Medium,
            40..=64 => RiskType::High,
            _ => RiskType::Critical,
        }
    }

    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskType::Low => "Proceed normally. Keep original sources and context.",
            RiskType::Medium => "Proceed with caution. Verify via an independent channel.",
            RiskType::High => "Do not act immediately. Seek verification and avoid sharing.",
            RiskType::Critical => {
                "Treat as malicious. Do not send money/OTP/UPI or sensitive info."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskType::Low => "low",
            RiskType::Medium => "medium",
            RiskType::High => "high",
            RiskType::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final aggregated assessment for one scan request.
///
/// Field names and ranges are the wire contract for any adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReport {
    /// 0..=100; 100 means no modality contributed any penalty.
    pub trust_score: u8,
    pub risk_type: RiskType,
    /// Sorted, deduplicated.
    pub flags: Vec<String>,
    /// Per-modality evidence concatenated in canonical modality order.
    pub evidence: Vec<EvidenceItem>,
    pub recommended_action: String,
    /// Every present modality's result, verbatim.
    pub raw: BTreeMap<Modality, DetectionResult>,
}
