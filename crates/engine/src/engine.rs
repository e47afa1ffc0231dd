//! Concurrent scan of every requested modality, then one report.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use atrust_core::{DetectionResult, EngineConfig, Modality, Result, TrustReport};
use atrust_detect::{MediaSource, ScanInput, Scanner};

use crate::aggregate::build_report;

/// The modality inputs of one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub inputs: BTreeMap<Modality, ScanInput>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, modality: Modality, input: ScanInput) -> Self {
        self.inputs.insert(modality, input);
        self
    }

    pub fn with_file(self, modality: Modality, path: impl Into<PathBuf>) -> Self {
        self.with(modality, ScanInput::Media(MediaSource::Path(path.into())))
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with(Modality::Text, ScanInput::Text(text.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn modalities(&self) -> Vec<Modality> {
        self.inputs.keys().copied().collect()
    }
}

/// A completed scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub report: TrustReport,
}

/// Runs one blocking task per requested modality and aggregates once all
/// of them have answered.
#[derive(Clone)]
pub struct DetectionEngine {
    scanner: Scanner,
    task_timeout: Option<Duration>,
}

impl DetectionEngine {
    pub fn new(scanner: Scanner) -> Self {
        Self {
            scanner,
            task_timeout: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(Scanner::from_config(config)?).with_task_timeout(config.engine.task_timeout()))
    }

    /// Bound each modality task. An expired task yields a zero-information
    /// result; the blocking work itself is not interrupted.
    pub fn with_task_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Scan every requested modality concurrently and build the report.
    ///
    /// Fails only when a modality/input pairing is invalid, before any
    /// work starts. Every requested modality appears in `report.raw`.
    pub async fn scan_all(&self, request: ScanRequest) -> Result<ScanOutcome> {
        for (modality, input) in &request.inputs {
            Scanner::check_input(*modality, input)?;
        }

        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();
        let requested = request.modalities();
        info!(%scan_id, modalities = ?requested, "scan started");

        let mut tasks = JoinSet::new();
        for (modality, input) in request.inputs {
            let scanner = self.scanner.clone();
            let timeout = self.task_timeout;
            tasks.spawn(async move {
                let result = run_modality(scanner, modality, input, timeout).await;
                (modality, result)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((modality, result)) => {
                    results.insert(modality, result);
                }
                Err(e) => warn!(%scan_id, error = %e, "modality task aborted"),
            }
        }
        for modality in requested {
            results
                .entry(modality)
                .or_insert_with(|| DetectionResult::zero_information("task_aborted"));
        }

        let report = build_report(results);
        info!(
            %scan_id,
            trust_score = report.trust_score,
            risk = %report.risk_type,
            flags = report.flags.len(),
            elapsed_ms = timer.elapsed().as_millis() as u64,
            "scan complete"
        );

        Ok(ScanOutcome {
            scan_id,
            started_at,
            finished_at: Utc::now(),
            report,
        })
    }
}

async fn run_modality(
    scanner: Scanner,
    modality: Modality,
    input: ScanInput,
    timeout: Option<Duration>,
) -> DetectionResult {
    let handle = tokio::task::spawn_blocking(move || scanner.scan(modality, &input));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(modality = %modality, timeout_secs = limit.as_secs_f64(), "modality timed out");
                return DetectionResult::zero_information("timeout");
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!(modality = %modality, error = %e, "modality scan failed");
            DetectionResult::zero_information(e.to_string())
        }
        Err(e) => {
            warn!(modality = %modality, error = %e, "modality task panicked");
            DetectionResult::zero_information("panic")
        }
    }
}
