//! Fixed-size feature vectors shared by the model and heuristic tiers.
//!
//! Every dimension is normalized to [0, 1]. A buffer with no detectable
//! content (too short, constant, or silent) yields `None`.

use atrust_core::Modality;

/// Dimensionality of every feature vector.
pub const FEATURE_DIM: usize = 6;

/// PCM amplitude below which a sample counts as silence.
const SILENCE_AMPLITUDE: i32 = 64;

/// PCM amplitude at or above which a sample counts as clipped.
const CLIP_AMPLITUDE: i32 = 32_000;

pub type FeatureVector = [f64; FEATURE_DIM];

/// Extract the modality's feature vector from a decoded sample buffer.
pub fn extract(modality: Modality, buffer: &[u8]) -> Option<FeatureVector> {
    match modality {
        Modality::Video | Modality::Image => byte_features(buffer),
        Modality::Audio => pcm_features(buffer),
        Modality::Text => None,
    }
}

/// Pixel-like statistics over raw 8-bit samples.
///
/// Dimensions: mean, standard deviation, Shannon entropy, mean absolute
/// neighbour difference, saturated ratio (0 or 255), longest constant run.
pub fn byte_features(buffer: &[u8]) -> Option<FeatureVector> {
    if buffer.len() < 2 {
        return None;
    }
    let first = buffer[0];
    if buffer.iter().all(|b| *b == first) {
        return None;
    }

    let n = buffer.len() as f64;
    let mut histogram = [0u64; 256];
    let mut sum = 0.0;
    let mut saturated = 0u64;
    for &b in buffer {
        histogram[b as usize] += 1;
        sum += b as f64;
        if b == 0 || b == 255 {
            saturated += 1;
        }
    }
    let mean = sum / n;

    let variance = buffer
        .iter()
        .map(|b| {
            let d = *b as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    let entropy = histogram
        .iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / n;
            -p * p.log2()
        })
        .sum::<f64>();

    let abs_diff = buffer
        .windows(2)
        .map(|w| (w[1] as i32 - w[0] as i32).unsigned_abs() as f64)
        .sum::<f64>()
        / (n - 1.0);

    let mut longest_run = 1usize;
    let mut run = 1usize;
    for w in buffer.windows(2) {
        if w[0] == w[1] {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 1;
        }
    }

    Some([
        mean / 255.0,
        (variance.sqrt() / 127.5).min(1.0),
        entropy / 8.0,
        abs_diff / 255.0,
        saturated as f64 / n,
        longest_run as f64 / n,
    ])
}

/// Signal statistics over 16-bit little-endian PCM.
///
/// Dimensions: RMS, zero crossing rate, clipping ratio, crest factor,
/// silence ratio, mean absolute neighbour difference.
pub fn pcm_features(buffer: &[u8]) -> Option<FeatureVector> {
    let samples: Vec<i32> = buffer
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]) as i32)
        .collect();
    if samples.len() < 2 {
        return None;
    }
    if samples.iter().all(|s| s.abs() < SILENCE_AMPLITUDE) {
        return None;
    }

    let n = samples.len() as f64;
    let rms = (samples.iter().map(|s| (*s as f64).powi(2)).sum::<f64>() / n).sqrt();
    let peak = samples.iter().map(|s| s.abs()).max().unwrap_or(0) as f64;

    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] < 0) != (w[1] < 0))
        .count() as f64;

    let clipped = samples.iter().filter(|s| s.abs() >= CLIP_AMPLITUDE).count() as f64;
    let silent = samples.iter().filter(|s| s.abs() < SILENCE_AMPLITUDE).count() as f64;

    let abs_diff = samples
        .windows(2)
        .map(|w| (w[1] - w[0]).unsigned_abs() as f64)
        .sum::<f64>()
        / (n - 1.0);

    // Crest factor of a pure sine is ~1.41; heavy transients push past 10.
    let crest = if rms > 0.0 { peak / rms } else { 0.0 };

    Some([
        (rms / 32_768.0).min(1.0),
        crossings / (n - 1.0),
        clipped / n,
        (crest / 10.0).min(1.0),
        silent / n,
        (abs_diff / 65_536.0).min(1.0),
    ])
}
