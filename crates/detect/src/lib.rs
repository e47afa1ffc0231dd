//! Per-modality anomaly detection with tiered fallback.
//!
//! - [`capability`]: one-time, cached initialization of the native and model tiers
//! - [`tiers`]: the native, model and heuristic sample scorers
//! - [`detector`]: tier resolution and the zero-information failure policy
//! - [`segments`]: suspicious time windows for time-sampled modalities
//! - [`normalize`]: scores and rule matches into canonical `DetectionResult`s
//! - [`scanner`]: `scan(modality, input)` wiring decoder, detector and normalizer

pub mod capability;
pub mod decoder;
pub mod detector;
pub mod features;
pub mod normalize;
pub mod pipelines;
pub mod scanner;
pub mod segments;
pub mod tiers;

pub use capability::{Capabilities, CapabilitiesBuilder, TierState, TierStatus};
pub use decoder::{MediaDecoder, MediaSource, RawDecoder, Sample};
pub use detector::{SampleScore, TierOutcome, TieredDetector};
pub use normalize::{normalize, normalize_rule_matches, NormalizePolicy, Provenance, Thresholds};
pub use scanner::{ScanInput, Scanner};
pub use segments::{extract_segments, segment_severity, SegmentOptions};
pub use tiers::SampleScorer;
