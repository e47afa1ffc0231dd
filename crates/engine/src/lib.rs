//! Trust report aggregation and concurrent multi-modality scans.

pub mod aggregate;
pub mod engine;

pub use aggregate::{aggregate, build_report};
pub use engine::{DetectionEngine, ScanOutcome, ScanRequest};
