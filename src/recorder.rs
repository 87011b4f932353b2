//! Voice recorder state machine.
//!
//! The capture device lives in the webview; it pushes base64 audio
//! chunks over IPC while recording. This side owns the lifecycle
//! (`Idle → Recording → Stopped`, then confirm or discard), buffers the
//! chunks, feeds the live visualizer with downsampled time-domain
//! samples, and assembles the single upload blob on confirmation.

use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

/// Samples handed to the visualizer per pushed chunk.
const WAVEFORM_SAMPLES_PER_CHUNK: usize = 64;

/// Mime type the capture device records in.
const AUDIO_MIME: &str = "audio/webm";

// ═══════════════════════════════════════════════════════════
// States and outputs
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    /// Capture finished; the blob is held until confirm or discard.
    Stopped,
}

/// The assembled recording released by `confirm()`.
#[derive(Debug, Clone)]
pub struct ConfirmedRecording {
    /// Ephemeral client-side id for this take.
    pub recording_id: String,
    /// Single `data:audio/webm;base64,…` blob for upload.
    pub data_url: String,
    pub started_at: DateTime<Utc>,
    pub byte_len: usize,
}

/// Errors from recorder transitions.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Recording is already in progress")]
    AlreadyRecording,
    #[error("No recording in progress")]
    NotRecording,
    #[error("No finished recording to act on")]
    NothingRecorded,
    #[error("Could not access the microphone: {0}")]
    CaptureFailed(String),
    #[error("Audio chunk is not valid base64: {0}")]
    BadChunk(String),
}

// ═══════════════════════════════════════════════════════════
// Recorder
// ═══════════════════════════════════════════════════════════

pub struct Recorder {
    state: RecorderState,
    recording_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    chunks: Vec<Vec<u8>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            recording_id: None,
            started_at: None,
            chunks: Vec::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Begin a take. Rejected while one is already running; a previous
    /// unconfirmed take is dropped.
    pub fn start(&mut self) -> Result<String, RecorderError> {
        if self.state == RecorderState::Recording {
            return Err(RecorderError::AlreadyRecording);
        }
        let id = Uuid::new_v4().to_string();
        self.state = RecorderState::Recording;
        self.recording_id = Some(id.clone());
        self.started_at = Some(Utc::now());
        self.chunks.clear();
        info!(recording_id = %id, "Recording started");
        Ok(id)
    }

    /// The capture device failed to deliver (typically mic permission
    /// denied). Resets to `Idle` and surfaces the reason.
    pub fn capture_failed(&mut self, reason: &str) -> RecorderError {
        self.reset();
        RecorderError::CaptureFailed(reason.to_string())
    }

    /// Buffer one pushed chunk and return visualizer samples for it.
    /// Accepts either bare base64 or a full data URL.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<Vec<f32>, RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        let encoded = chunk.rsplit(',').next().unwrap_or(chunk);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| RecorderError::BadChunk(e.to_string()))?;
        let samples = waveform_samples(&bytes);
        self.chunks.push(bytes);
        Ok(samples)
    }

    /// End the take; the blob is held until confirm or discard.
    pub fn stop(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.state = RecorderState::Stopped;
        debug!(chunks = self.chunks.len(), "Recording stopped");
        Ok(())
    }

    /// Release the assembled blob for upload and return to `Idle`.
    pub fn confirm(&mut self) -> Result<ConfirmedRecording, RecorderError> {
        if self.state != RecorderState::Stopped {
            return Err(RecorderError::NothingRecorded);
        }
        let bytes: Vec<u8> = self.chunks.concat();
        let confirmed = ConfirmedRecording {
            recording_id: self.recording_id.clone().unwrap_or_default(),
            data_url: format!(
                "data:{};base64,{}",
                AUDIO_MIME,
                base64::engine::general_purpose::STANDARD.encode(&bytes)
            ),
            started_at: self.started_at.unwrap_or_else(Utc::now),
            byte_len: bytes.len(),
        };
        self.reset();
        Ok(confirmed)
    }

    /// Drop the held take.
    pub fn discard(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Stopped {
            return Err(RecorderError::NothingRecorded);
        }
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = RecorderState::Idle;
        self.recording_id = None;
        self.started_at = None;
        self.chunks.clear();
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Downsample raw chunk bytes to normalized time-domain samples in
/// `[-1, 1]` for the live waveform.
fn waveform_samples(bytes: &[u8]) -> Vec<f32> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let step = (bytes.len() / WAVEFORM_SAMPLES_PER_CHUNK).max(1);
    bytes
        .iter()
        .step_by(step)
        .take(WAVEFORM_SAMPLES_PER_CHUNK)
        .map(|&b| (b as f32 - 128.0) / 128.0)
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn full_take_assembles_single_blob() {
        let mut rec = Recorder::new();
        let id = rec.start().unwrap();
        assert!(!id.is_empty());

        rec.push_chunk(&b64(b"hello ")).unwrap();
        rec.push_chunk(&b64(b"world")).unwrap();
        rec.stop().unwrap();

        let confirmed = rec.confirm().unwrap();
        assert_eq!(confirmed.recording_id, id);
        assert_eq!(confirmed.byte_len, 11);
        let prefix = "data:audio/webm;base64,";
        assert!(confirmed.data_url.starts_with(prefix));
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&confirmed.data_url[prefix.len()..])
            .unwrap();
        assert_eq!(decoded, b"hello world");
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn start_while_recording_is_rejected() {
        let mut rec = Recorder::new();
        rec.start().unwrap();
        assert!(matches!(rec.start(), Err(RecorderError::AlreadyRecording)));
        assert_eq!(rec.state(), RecorderState::Recording);
    }

    #[test]
    fn chunk_outside_recording_is_rejected() {
        let mut rec = Recorder::new();
        assert!(matches!(
            rec.push_chunk(&b64(b"x")),
            Err(RecorderError::NotRecording)
        ));
    }

    #[test]
    fn data_url_chunks_are_accepted() {
        let mut rec = Recorder::new();
        rec.start().unwrap();
        let samples = rec
            .push_chunk(&format!("data:audio/webm;base64,{}", b64(&[0u8, 128, 255])))
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert!((samples[0] - (-1.0)).abs() < f32::EPSILON);
        assert!(samples[1].abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_base64_is_rejected_without_state_change() {
        let mut rec = Recorder::new();
        rec.start().unwrap();
        assert!(matches!(
            rec.push_chunk("not base64!!!"),
            Err(RecorderError::BadChunk(_))
        ));
        assert_eq!(rec.state(), RecorderState::Recording);
    }

    #[test]
    fn discard_drops_take() {
        let mut rec = Recorder::new();
        rec.start().unwrap();
        rec.push_chunk(&b64(b"audio")).unwrap();
        rec.stop().unwrap();
        rec.discard().unwrap();
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(matches!(rec.confirm(), Err(RecorderError::NothingRecorded)));
    }

    #[test]
    fn capture_failure_resets_to_idle() {
        let mut rec = Recorder::new();
        rec.start().unwrap();
        let err = rec.capture_failed("Permission denied");
        assert!(matches!(err, RecorderError::CaptureFailed(_)));
        assert_eq!(rec.state(), RecorderState::Idle);
    }

    #[test]
    fn waveform_downsamples_large_chunks() {
        let bytes = vec![200u8; 100_000];
        let samples = waveform_samples(&bytes);
        assert!(samples.len() <= WAVEFORM_SAMPLES_PER_CHUNK);
        assert!(samples.iter().all(|s| (*s - 0.5625).abs() < 1e-6));
    }
}
