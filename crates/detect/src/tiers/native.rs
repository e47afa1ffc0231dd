//! Native acceleration module loaded from a shared library.
//!
//! The library must export:
//!
//! ```c
//! uint32_t atrust_abi_version(void);
//! int32_t  atrust_score(uint32_t modality, const uint8_t *data, size_t len, double *out);
//! ```
//!
//! `atrust_score` returns 0 when `*out` holds a score, 1 when the sample has
//! no detectable content, anything else on failure.

use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::info;

use atrust_core::{AtrustError, DetectorTier, Modality, Result};

use super::SampleScorer;

/// ABI revision this build speaks.
pub const NATIVE_ABI_VERSION: u32 = 1;

const SCORED: i32 = 0;
const NO_CONTENT: i32 = 1;

type AbiVersionFn = unsafe extern "C" fn() -> u32;
type ScoreFn = unsafe extern "C" fn(u32, *const u8, usize, *mut f64) -> i32;

pub struct NativeModule {
    path: PathBuf,
    score_fn: ScoreFn,
    // Keeps `score_fn` valid; dropped last.
    _library: Library,
}

impl std::fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModule").field("path", &self.path).finish()
    }
}

impl NativeModule {
    /// Load the library and resolve its symbols.
    pub fn load(path: &Path) -> Result<Self> {
        let init_err = |reason: String| AtrustError::Initialization {
            tier: DetectorTier::Native,
            reason,
        };

        if !path.exists() {
            return Err(init_err(format!("{} does not exist", path.display())));
        }

        // SAFETY: loading runs the library's initializers; the path is
        // operator-configured and trusted like any other binary we execute.
        let library = unsafe { Library::new(path) }
            .map_err(|e| init_err(format!("failed to load {}: {e}", path.display())))?;

        // SAFETY: symbol signatures are fixed by the ABI documented above.
        let version = unsafe {
            let symbol = library
                .get::<AbiVersionFn>(b"atrust_abi_version\0")
                .map_err(|e| init_err(format!("missing atrust_abi_version: {e}")))?;
            symbol()
        };
        if version != NATIVE_ABI_VERSION {
            return Err(init_err(format!(
                "ABI version {version} is not supported (expected {NATIVE_ABI_VERSION})"
            )));
        }

        // SAFETY: as above; the raw fn pointer outlives the `Symbol` because
        // the `Library` is stored alongside it.
        let score_fn = unsafe {
            *library
                .get::<ScoreFn>(b"atrust_score\0")
                .map_err(|e| init_err(format!("missing atrust_score: {e}")))?
        };

        info!(path = %path.display(), abi = version, "native module loaded");
        Ok(Self {
            path: path.to_path_buf(),
            score_fn,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleScorer for NativeModule {
    fn tier(&self) -> DetectorTier {
        DetectorTier::Native
    }

    fn supports(&self, modality: Modality) -> bool {
        modality != Modality::Text
    }

    fn score(&self, modality: Modality, buffer: &[u8]) -> Result<Option<f64>> {
        let mut out = 0.0f64;
        // SAFETY: `buffer` is valid for `len` bytes for the duration of the
        // call and `out` is a valid, writable f64.
        let rc = unsafe { (self.score_fn)(modality.code(), buffer.as_ptr(), buffer.len(), &mut out) };
        match rc {
            SCORED if out.is_finite() => Ok(Some(out)),
            SCORED => Err(AtrustError::Scoring(
                "native module returned a non-finite score".to_string(),
            )),
            NO_CONTENT => Ok(None),
            code => Err(AtrustError::Scoring(format!(
                "native module returned error code {code}"
            ))),
        }
    }
}
