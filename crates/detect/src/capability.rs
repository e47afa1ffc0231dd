//! Process-scoped tier readiness.
//!
//! Each optional tier (native, model) is initialized lazily on first use,
//! exactly once: concurrent first callers block on the same `OnceLock` and
//! every later caller reads the cached state without locking. A failed
//! initialization is cached too and never retried. The heuristic tier has
//! no prerequisites and is always ready.
//!
//! A `Capabilities` value is built from [`DetectorConfig`] at startup and
//! shared by `Arc` with every detector, so tests can inject their own.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{info, warn};

use atrust_core::config::DetectorConfig;
use atrust_core::{AtrustError, DetectorTier, Modality};

use crate::tiers::{HeuristicScorer, LinearModel, NativeModule, SampleScorer};

/// Deferred tier prerequisite loader.
pub type TierInitializer =
    Box<dyn Fn() -> Result<Arc<dyn SampleScorer>, AtrustError> + Send + Sync>;

/// Cached outcome of one tier's initialization.
#[derive(Clone)]
pub enum TierState {
    Ready(Arc<dyn SampleScorer>),
    Unavailable { reason: String },
}

impl TierState {
    pub fn is_ready(&self) -> bool {
        matches!(self, TierState::Ready(_))
    }
}

impl std::fmt::Debug for TierState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TierState::Ready(s) => write!(f, "Ready({})", s.tier()),
            TierState::Unavailable { reason } => write!(f, "Unavailable({reason})"),
        }
    }
}

/// Serializable readiness report for one tier.
#[derive(Debug, Clone, Serialize)]
pub struct TierStatus {
    pub tier: DetectorTier,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Modalities the tier can answer for (empty when not ready).
    pub modalities: Vec<Modality>,
}

struct TierSlot {
    tier: DetectorTier,
    init: TierInitializer,
    state: OnceLock<TierState>,
}

impl TierSlot {
    fn new(tier: DetectorTier, init: TierInitializer) -> Self {
        Self {
            tier,
            init,
            state: OnceLock::new(),
        }
    }

    fn unavailable(tier: DetectorTier, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            tier,
            Box::new(move || -> Result<Arc<dyn SampleScorer>, AtrustError> {
                Err(AtrustError::Initialization {
                    tier,
                    reason: reason.clone(),
                })
            }),
        )
    }

    fn state(&self) -> &TierState {
        self.state.get_or_init(|| match (self.init)() {
            Ok(scorer) => {
                info!(tier = %self.tier, "tier ready");
                TierState::Ready(scorer)
            }
            Err(e) => {
                let reason = match e {
                    AtrustError::Initialization { reason, .. } => reason,
                    other => other.to_string(),
                };
                warn!(tier = %self.tier, reason = %reason, "tier unavailable");
                TierState::Unavailable { reason }
            }
        })
    }
}

/// Readiness of every tier, resolved at most once per instance.
pub struct Capabilities {
    native: TierSlot,
    model: TierSlot,
    heuristic: Arc<dyn SampleScorer>,
}

impl Capabilities {
    /// Wire the configured prerequisites. Nothing is loaded until first use.
    pub fn from_config(config: &DetectorConfig) -> Self {
        let mut builder = CapabilitiesBuilder::new();
        if let Some(path) = config.native_library.clone() {
            builder = builder.native(move || {
                let module = NativeModule::load(&path)?;
                Ok(Arc::new(module) as Arc<dyn SampleScorer>)
            });
        }
        if let Some(path) = config.model_path.clone() {
            builder = builder.model(move || {
                let model = LinearModel::load(&path).map_err(|e| match e {
                    e @ AtrustError::Initialization { .. } => e,
                    other => AtrustError::Initialization {
                        tier: DetectorTier::Model,
                        reason: other.to_string(),
                    },
                })?;
                Ok(Arc::new(model) as Arc<dyn SampleScorer>)
            });
        }
        builder.build()
    }

    /// Heuristic only; native and model report unavailable.
    pub fn heuristic_only() -> Self {
        CapabilitiesBuilder::new().build()
    }

    pub fn builder() -> CapabilitiesBuilder {
        CapabilitiesBuilder::new()
    }

    /// Cached state of a tier, initializing it on first call.
    pub fn state(&self, tier: DetectorTier) -> TierState {
        match tier {
            DetectorTier::Native => self.native.state().clone(),
            DetectorTier::Model => self.model.state().clone(),
            DetectorTier::Heuristic => TierState::Ready(Arc::clone(&self.heuristic)),
        }
    }

    /// Pick the first ready tier, in priority order, that supports the modality.
    ///
    /// Always succeeds: the heuristic tier is the floor. Skipped tiers are
    /// reported as diagnostics (`native:unavailable:<reason>`,
    /// `model:unsupported:<modality>`).
    pub fn resolve(&self, modality: Modality) -> (Arc<dyn SampleScorer>, Vec<String>) {
        let mut diagnostics = Vec::new();
        for tier in DetectorTier::PRIORITY {
            match self.state(tier) {
                TierState::Ready(scorer) if scorer.supports(modality) => {
                    return (scorer, diagnostics);
                }
                TierState::Ready(_) => {
                    diagnostics.push(format!("{}:unsupported:{}", tier, modality));
                }
                TierState::Unavailable { reason } => {
                    diagnostics.push(format!("{}:unavailable:{}", tier, reason));
                }
            }
        }
        (Arc::clone(&self.heuristic), diagnostics)
    }

    /// Force every tier's initialization now (e.g. at startup) and report.
    pub fn status(&self) -> Vec<TierStatus> {
        DetectorTier::PRIORITY
            .iter()
            .map(|tier| match self.state(*tier) {
                TierState::Ready(scorer) => TierStatus {
                    tier: *tier,
                    ready: true,
                    reason: None,
                    modalities: Modality::ALL
                        .into_iter()
                        .filter(|m| *m != Modality::Text && scorer.supports(*m))
                        .collect(),
                },
                TierState::Unavailable { reason } => TierStatus {
                    tier: *tier,
                    ready: false,
                    reason: Some(reason),
                    modalities: Vec::new(),
                },
            })
            .collect()
    }
}

/// Assembles a [`Capabilities`] from explicit initializers.
pub struct CapabilitiesBuilder {
    native: Option<TierInitializer>,
    model: Option<TierInitializer>,
    heuristic: Arc<dyn SampleScorer>,
}

impl CapabilitiesBuilder {
    pub fn new() -> Self {
        Self {
            native: None,
            model: None,
            heuristic: Arc::new(HeuristicScorer),
        }
    }

    pub fn native<F>(mut self, init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SampleScorer>, AtrustError> + Send + Sync + 'static,
    {
        self.native = Some(Box::new(init));
        self
    }

    pub fn model<F>(mut self, init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SampleScorer>, AtrustError> + Send + Sync + 'static,
    {
        self.model = Some(Box::new(init));
        self
    }

    /// Replace the heuristic floor (tests).
    pub fn heuristic(mut self, scorer: Arc<dyn SampleScorer>) -> Self {
        self.heuristic = scorer;
        self
    }

    pub fn build(self) -> Capabilities {
        Capabilities {
            native: match self.native {
                Some(init) => TierSlot::new(DetectorTier::Native, init),
                None => TierSlot::unavailable(DetectorTier::Native, "no native module configured"),
            },
            model: match self.model {
                Some(init) => TierSlot::new(DetectorTier::Model, init),
                None => TierSlot::unavailable(DetectorTier::Model, "no model weights configured"),
            },
            heuristic: self.heuristic,
        }
    }
}

impl Default for CapabilitiesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
