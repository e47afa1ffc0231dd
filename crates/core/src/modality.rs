use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AtrustError;

/// An independent input stream with its own detector.
///
/// Declaration order is the canonical processing order used by the
/// aggregator: video, image, audio, text. `Ord` follows it, so a
/// `BTreeMap<Modality, _>` iterates canonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Video,
    Image,
    Audio,
    Text,
}

impl Modality {
    /// All modalities in canonical order.
    pub const ALL: [Modality; 4] = [
        Modality::Video,
        Modality::Image,
        Modality::Audio,
        Modality::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Video => "video",
            Modality::Image => "image",
            Modality::Audio => "audio",
            Modality::Text => "text",
        }
    }

    /// Stable numeric code handed across the native module ABI.
    pub fn code(&self) -> u32 {
        match self {
            Modality::Video => 0,
            Modality::Image => 1,
            Modality::Audio => 2,
            Modality::Text => 3,
        }
    }

    /// Whether the modality is represented as an ordered sequence of timed samples.
    pub fn is_time_sampled(&self) -> bool {
        matches!(self, Modality::Video)
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = AtrustError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Modality::Video),
            "image" => Ok(Modality::Image),
            "audio" => Ok(Modality::Audio),
            "text" => Ok(Modality::Text),
            other => Err(AtrustError::InvalidInput(format!(
                "unknown modality '{}'",
                other
            ))),
        }
    }
}

/// Capability level a detector may answer with. Lower = preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorTier {
    /// Native acceleration module.
    Native,
    /// Loaded classifier weights.
    Model,
    /// Dependency-free fallback; always available.
    Heuristic,
}

impl DetectorTier {
    /// Resolution order, highest priority first.
    pub const PRIORITY: [DetectorTier; 3] = [
        DetectorTier::Native,
        DetectorTier::Model,
        DetectorTier::Heuristic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorTier::Native => "native",
            DetectorTier::Model => "model",
            DetectorTier::Heuristic => "heuristic",
        }
    }
}

impl std::fmt::Display for DetectorTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_follows_declaration() {
        let mut shuffled = vec![Modality::Text, Modality::Audio, Modality::Video, Modality::Image];
        shuffled.sort();
        assert_eq!(shuffled, Modality::ALL.to_vec());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("VIDEO".parse::<Modality>().unwrap(), Modality::Video);
        assert_eq!(" text ".parse::<Modality>().unwrap(), Modality::Text);
    }

    #[test]
    fn unknown_modality_is_invalid_input() {
        let err = "smell".parse::<Modality>().unwrap_err();
        assert!(matches!(err, AtrustError::InvalidInput(_)));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Modality::Audio).unwrap(), "\"audio\"");
        assert_eq!(
            serde_json::to_string(&DetectorTier::Heuristic).unwrap(),
            "\"heuristic\""
        );
    }

    #[test]
    fn tier_priority_is_native_model_heuristic() {
        assert!(DetectorTier::Native < DetectorTier::Model);
        assert!(DetectorTier::Model < DetectorTier::Heuristic);
    }
}
