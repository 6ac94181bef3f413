//! Speech I/O adapters for Yatra.
//!
//! The conversation loop works on text. This crate sits at its edges:
//!
//! - [`VoiceActivityDetector`]: finds speech regions in raw PCM
//! - [`SpeechToText`]: turns a speech region into a transcript
//! - [`TextToSpeech`]: turns a reply into playable audio
//!
//! Shipped adapters are [`WebRtcVad`], [`WhisperStt`] (`OpenAI` audio
//! transcriptions) and [`ElevenLabsTts`]. All audio is 16-bit mono PCM.

pub mod error;
pub mod stt;
pub mod tts;
pub mod vad;
pub mod wav;

pub use error::SpeechError;
pub use stt::{SpeechToText, SttCapabilities, WhisperStt};
pub use tts::{ElevenLabsTts, TextToSpeech};
pub use vad::{SpeechSegment, VadConfig, VoiceActivityDetector, WebRtcVad, collect_chunks};
