//! Media decoding seam.
//!
//! Real container decoding is a collaborator concern; [`RawDecoder`] treats
//! inputs as already-sampled raw buffers so the engine runs end to end
//! without codec dependencies.

use std::path::PathBuf;

use atrust_core::{AtrustError, Modality, Result};

/// Where media bytes come from.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl MediaSource {
    /// Read the full input. A missing or unreadable file is malformed input.
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            MediaSource::Bytes(bytes) => Ok(bytes.clone()),
            MediaSource::Path(path) => std::fs::read(path).map_err(|e| {
                AtrustError::MalformedInput(format!("cannot read {}: {}", path.display(), e))
            }),
        }
    }
}

/// One decoded sample in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub index: usize,
    pub data: Vec<u8>,
}

impl Sample {
    pub fn new(index: usize, data: Vec<u8>) -> Self {
        Self { index, data }
    }
}

/// Turns raw input bytes into ordered sample buffers.
///
/// Decoding either fully succeeds or fails with `MalformedInput`.
pub trait MediaDecoder: Send + Sync {
    /// `sample_rate` is samples per second of source duration for
    /// time-sampled modalities; `max_samples` bounds the sequence length.
    fn decode_samples(
        &self,
        modality: Modality,
        bytes: &[u8],
        sample_rate: f64,
        max_samples: usize,
    ) -> Result<Vec<Sample>>;
}

/// Treats bytes as raw samples: fixed-size video frames, one image buffer,
/// 16-bit PCM audio (a leading WAV header is stripped).
#[derive(Debug, Clone, Copy)]
pub struct RawDecoder {
    pub frame_bytes: usize,
}

impl Default for RawDecoder {
    fn default() -> Self {
        Self { frame_bytes: 4096 }
    }
}

impl RawDecoder {
    pub fn new(frame_bytes: usize) -> Self {
        Self {
            frame_bytes: frame_bytes.max(1),
        }
    }
}

impl MediaDecoder for RawDecoder {
    fn decode_samples(
        &self,
        modality: Modality,
        bytes: &[u8],
        _sample_rate: f64,
        max_samples: usize,
    ) -> Result<Vec<Sample>> {
        if bytes.is_empty() {
            return Err(AtrustError::MalformedInput("empty input".to_string()));
        }
        match modality {
            Modality::Video => Ok(bytes
                .chunks(self.frame_bytes.max(1))
                .take(max_samples.max(1))
                .enumerate()
                .map(|(i, chunk)| Sample::new(i, chunk.to_vec()))
                .collect()),
            Modality::Image => Ok(vec![Sample::new(0, bytes.to_vec())]),
            Modality::Audio => Ok(vec![Sample::new(0, pcm_payload(bytes)?.to_vec())]),
            Modality::Text => Err(AtrustError::InvalidInput(
                "text is not decoded as media".to_string(),
            )),
        }
    }
}

/// PCM payload of a RIFF/WAVE file, or the bytes unchanged if not RIFF.
fn pcm_payload(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" {
        return Ok(bytes);
    }
    if &bytes[8..12] != b"WAVE" {
        return Err(AtrustError::MalformedInput("RIFF container is not WAVE".to_string()));
    }

    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let body = offset + 8;
        if id == b"data" {
            let end = body.saturating_add(size).min(bytes.len());
            if end <= body {
                return Err(AtrustError::MalformedInput("WAVE data chunk is empty".to_string()));
            }
            return Ok(&bytes[body..end]);
        }
        // Chunks are word aligned.
        offset = body.saturating_add(size).saturating_add(size & 1);
    }
    Err(AtrustError::MalformedInput("WAVE file has no data chunk".to_string()))
}
