//! Voice activity detection.
//!
//! [`WebRtcVad`] runs the WebRTC classifier over fixed-length frames and
//! groups voiced frames into [`SpeechSegment`]s. The duration knobs follow
//! the usual Silero defaults so segments line up with what callers expect
//! from a neural VAD.

use crate::error::SpeechError;
use serde::{Deserialize, Serialize};
use webrtc_vad::{SampleRate, Vad, VadMode};

/// A detected speech region, as sample indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSegment {
    /// First sample of the region.
    pub start: usize,
    /// One past the last sample of the region.
    pub end: usize,
}

impl SpeechSegment {
    /// Number of samples covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the segment covers no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finds speech in 16-bit mono PCM.
pub trait VoiceActivityDetector: Send + Sync + 'static {
    /// Returns speech regions in ascending, non-overlapping order.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::InvalidInput`] when the audio format is not
    /// supported by the detector.
    fn segment(&self, samples: &[i16], sample_rate: u32)
    -> Result<Vec<SpeechSegment>, SpeechError>;
}

/// Tuning for [`WebRtcVad`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Classifier aggressiveness, 0 (quality) to 3 (very aggressive).
    pub mode: u8,
    /// Frame length in milliseconds: 10, 20 or 30.
    pub frame_ms: u32,
    /// Shorter voiced runs are discarded.
    pub min_speech_ms: u32,
    /// Silence must last this long to end a segment.
    pub min_silence_ms: u32,
    /// Added on both sides of every segment.
    pub speech_pad_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            mode: 3,
            frame_ms: 30,
            min_speech_ms: 250,
            min_silence_ms: 100,
            speech_pad_ms: 30,
        }
    }
}

/// Voice activity detector backed by the WebRTC classifier.
///
/// The classifier handle is not `Send`, so a fresh one is built for every
/// [`segment`](VoiceActivityDetector::segment) call.
#[derive(Debug, Clone, Default)]
pub struct WebRtcVad {
    config: VadConfig,
}

impl WebRtcVad {
    /// Creates a detector with the given tuning.
    #[must_use]
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }

    /// Returns the tuning in use.
    #[must_use]
    pub fn config(&self) -> &VadConfig {
        &self.config
    }

    fn classifier(&self, sample_rate: u32) -> Result<Vad, SpeechError> {
        let rate = match sample_rate {
            8000 => SampleRate::Rate8kHz,
            16000 => SampleRate::Rate16kHz,
            32000 => SampleRate::Rate32kHz,
            48000 => SampleRate::Rate48kHz,
            other => {
                return Err(SpeechError::InvalidInput(format!(
                    "VAD supports 8000, 16000, 32000 or 48000 Hz, got {other}"
                )));
            }
        };
        let mode = match self.config.mode {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            3 => VadMode::VeryAggressive,
            other => {
                return Err(SpeechError::InvalidInput(format!(
                    "VAD mode must be 0-3, got {other}"
                )));
            }
        };
        if !matches!(self.config.frame_ms, 10 | 20 | 30) {
            return Err(SpeechError::InvalidInput(format!(
                "VAD frames must be 10, 20 or 30 ms, got {}",
                self.config.frame_ms
            )));
        }

        let mut vad = Vad::new();
        vad.set_mode(mode);
        vad.set_sample_rate(rate);
        Ok(vad)
    }
}

impl VoiceActivityDetector for WebRtcVad {
    fn segment(
        &self,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<Vec<SpeechSegment>, SpeechError> {
        let mut vad = self.classifier(sample_rate)?;
        let timing = FrameTiming::new(&self.config, sample_rate);

        let voiced = samples
            .chunks_exact(timing.frame_len)
            .map(|frame| {
                vad.is_voice_segment(frame).map_err(|()| {
                    SpeechError::InvalidInput(format!(
                        "VAD rejected a {}-sample frame",
                        frame.len()
                    ))
                })
            })
            .collect::<Result<Vec<bool>, _>>()?;

        let segments = group_frames(&voiced, samples.len(), &timing);
        tracing::trace!(
            frames = voiced.len(),
            segments = segments.len(),
            "vad pass complete"
        );
        Ok(segments)
    }
}

/// Frame and duration limits in samples.
#[derive(Debug, Clone, Copy)]
struct FrameTiming {
    frame_len: usize,
    min_speech: usize,
    min_silence: usize,
    pad: usize,
}

impl FrameTiming {
    fn new(config: &VadConfig, sample_rate: u32) -> Self {
        Self {
            frame_len: ms_to_samples(config.frame_ms, sample_rate).max(1),
            min_speech: ms_to_samples(config.min_speech_ms, sample_rate),
            min_silence: ms_to_samples(config.min_silence_ms, sample_rate),
            pad: ms_to_samples(config.speech_pad_ms, sample_rate),
        }
    }
}

fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    (u64::from(ms) * u64::from(sample_rate) / 1000) as usize
}

/// Turns per-frame voice decisions into padded, merged segments over a
/// buffer of `total` samples.
fn group_frames(voiced: &[bool], total: usize, timing: &FrameTiming) -> Vec<SpeechSegment> {
    let mut raw = Vec::new();
    let mut start: Option<usize> = None;
    let mut silence_from: Option<usize> = None;

    for (index, &is_voice) in voiced.iter().enumerate() {
        let pos = index * timing.frame_len;
        match (is_voice, start) {
            (true, None) => start = Some(pos),
            (true, Some(_)) => silence_from = None,
            (false, Some(begin)) => {
                let quiet_since = *silence_from.get_or_insert(pos);
                if pos + timing.frame_len - quiet_since >= timing.min_silence {
                    raw.push(SpeechSegment {
                        start: begin,
                        end: quiet_since,
                    });
                    start = None;
                    silence_from = None;
                }
            }
            (false, None) => {}
        }
    }
    if let Some(begin) = start {
        raw.push(SpeechSegment {
            start: begin,
            end: silence_from.unwrap_or(total),
        });
    }

    let mut segments: Vec<SpeechSegment> = Vec::with_capacity(raw.len());
    for segment in raw.into_iter().filter(|s| s.len() >= timing.min_speech) {
        let padded = SpeechSegment {
            start: segment.start.saturating_sub(timing.pad),
            end: (segment.end + timing.pad).min(total),
        };
        match segments.last_mut() {
            Some(previous) if padded.start <= previous.end => previous.end = padded.end,
            _ => segments.push(padded),
        }
    }
    segments
}

/// Concatenates the samples covered by `segments`.
#[must_use]
pub fn collect_chunks(segments: &[SpeechSegment], samples: &[i16]) -> Vec<i16> {
    let total = segments.iter().map(SpeechSegment::len).sum();
    let mut out = Vec::with_capacity(total);
    for segment in segments {
        let end = segment.end.min(samples.len());
        if segment.start < end {
            out.extend_from_slice(&samples[segment.start..end]);
        }
    }
    out
}
