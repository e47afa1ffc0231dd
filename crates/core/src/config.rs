use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AtrustError, Result};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn profiled_env_path(profile: &str, key: &str) -> Option<PathBuf> {
    profiled_env_opt(profile, key).map(PathBuf::from)
}

// ── Top-level config ──────────────────────────────────────────

/// Process-scoped engine configuration, resolved once at startup and
/// injected into the capability registry and scanners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub detector: DetectorConfig,
    pub video: VideoConfig,
    pub rules: RulesConfig,
    pub engine: TaskConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            detector: DetectorConfig::default(),
            video: VideoConfig::default(),
            rules: RulesConfig::default(),
            engine: TaskConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ATRUST_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ATRUST_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            detector: DetectorConfig::from_env_profiled(p),
            video: VideoConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
            engine: TaskConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let v = &self.video;
        if !(v.fps.is_finite() && v.fps > 0.0) {
            return Err(AtrustError::Config(format!("video fps must be > 0, got {}", v.fps)));
        }
        if v.max_frames == 0 {
            return Err(AtrustError::Config("video max_frames must be >= 1".into()));
        }
        if v.frame_bytes == 0 {
            return Err(AtrustError::Config("frame_bytes must be >= 1".into()));
        }
        if !(0.0..=1.0).contains(&v.segment_threshold) {
            return Err(AtrustError::Config(format!(
                "segment threshold must be within [0, 1], got {}",
                v.segment_threshold
            )));
        }
        if !(v.segment_pad_secs.is_finite() && v.segment_pad_secs >= 0.0) {
            return Err(AtrustError::Config(format!(
                "segment pad must be >= 0, got {}",
                v.segment_pad_secs
            )));
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        let path_or_none = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string())
        };
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  detector:    native_lib={}, model={}",
            path_or_none(&self.detector.native_library),
            path_or_none(&self.detector.model_path)
        );
        tracing::info!(
            "  video:       fps={}, max_frames={}, threshold={}, pad={}s, merge={}",
            self.video.fps,
            self.video.max_frames,
            self.video.segment_threshold,
            self.video.segment_pad_secs,
            self.video.merge_segments
        );
        tracing::info!("  rules:       text_rules={}", path_or_none(&self.rules.text_rules_path));
        tracing::info!(
            "  engine:      task_timeout={}",
            self.engine
                .task_timeout_secs
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "(unbounded)".to_string())
        );
    }
}

// ── Detector tiers ────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Shared library exporting the native scoring ABI.
    pub native_library: Option<PathBuf>,
    /// JSON classifier weights.
    pub model_path: Option<PathBuf>,
}

impl DetectorConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            native_library: profiled_env_path(p, "ATRUST_NATIVE_LIB"),
            model_path: profiled_env_path(p, "ATRUST_MODEL_PATH"),
        }
    }
}

// ── Video sampling ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Frames sampled per second of source duration.
    pub fps: f64,
    /// Upper bound on frames scored per scan.
    pub max_frames: usize,
    /// Raw frame size when splitting an undecoded stream.
    pub frame_bytes: usize,
    pub segment_threshold: f64,
    pub segment_pad_secs: f64,
    pub merge_segments: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: 2.0,
            max_frames: 16,
            frame_bytes: 4096,
            segment_threshold: 0.65,
            segment_pad_secs: 0.25,
            merge_segments: false,
        }
    }
}

impl VideoConfig {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            fps: profiled_env_parse(p, "ATRUST_VIDEO_FPS", d.fps),
            max_frames: profiled_env_parse(p, "ATRUST_VIDEO_MAX_FRAMES", d.max_frames),
            frame_bytes: profiled_env_parse(p, "ATRUST_FRAME_BYTES", d.frame_bytes),
            segment_threshold: profiled_env_parse(p, "ATRUST_SEGMENT_THRESHOLD", d.segment_threshold),
            segment_pad_secs: profiled_env_parse(p, "ATRUST_SEGMENT_PAD_SECS", d.segment_pad_secs),
            merge_segments: profiled_env_bool(p, "ATRUST_MERGE_SEGMENTS", d.merge_segments),
        }
    }
}

// ── Text rules ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Rule document to use instead of the bundled table.
    pub text_rules_path: Option<PathBuf>,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            text_rules_path: profiled_env_path(p, "ATRUST_TEXT_RULES"),
        }
    }
}

// ── Task bounds ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    pub task_timeout_secs: Option<u64>,
}

impl TaskConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            task_timeout_secs: profiled_env_opt(p, "ATRUST_TASK_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|s| *s > 0),
        }
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_sampling() {
        let c = EngineConfig::default();
        assert_eq!(c.video.fps, 2.0);
        assert_eq!(c.video.max_frames, 16);
        assert_eq!(c.video.segment_threshold, 0.65);
        assert_eq!(c.video.segment_pad_secs, 0.25);
        assert!(!c.video.merge_segments);
        assert!(c.engine.task_timeout().is_none());
        assert_eq!(c.profile_label(), "default");
        c.validate().unwrap();
    }

    #[test]
    fn profiled_keys_take_precedence() {
        env::set_var("CFGTEST_ATRUST_VIDEO_FPS", "5");
        env::set_var("CFGTEST_ATRUST_MERGE_SEGMENTS", "true");
        let c = VideoConfig::from_env_profiled("CFGTEST");
        assert_eq!(c.fps, 5.0);
        assert!(c.merge_segments);
        env::remove_var("CFGTEST_ATRUST_VIDEO_FPS");
        env::remove_var("CFGTEST_ATRUST_MERGE_SEGMENTS");
    }

    #[test]
    fn validate_rejects_bad_sampling() {
        let mut c = EngineConfig::default();
        c.video.fps = 0.0;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.video.segment_threshold = 1.5;
        assert!(c.validate().is_err());

        let mut c = EngineConfig::default();
        c.video.max_frames = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn bool_parsing() {
        env::set_var("CFGTEST_BOOL_ON", "Yes");
        env::set_var("CFGTEST_BOOL_OFF", "0");
        assert!(profiled_env_bool("", "CFGTEST_BOOL_ON", false));
        assert!(!profiled_env_bool("", "CFGTEST_BOOL_OFF", true));
        assert!(profiled_env_bool("", "CFGTEST_BOOL_MISSING", true));
        env::remove_var("CFGTEST_BOOL_ON");
        env::remove_var("CFGTEST_BOOL_OFF");
    }
}
