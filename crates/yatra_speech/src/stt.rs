//! Speech-to-text.

use crate::error::SpeechError;
use crate::wav::pcm_to_wav_bytes;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Largest WAV payload accepted for one transcription request.
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// What an STT adapter can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SttCapabilities {
    /// Whether the adapter accepts audio incrementally. Batch adapters are
    /// fed one detected speech segment at a time.
    pub streaming: bool,
}

/// Turns PCM audio into text.
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Reports adapter capabilities.
    fn capabilities(&self) -> SttCapabilities;

    /// Transcribes 16-bit mono PCM.
    async fn transcribe(&self, pcm: &[i16], sample_rate: u32) -> Result<String, SpeechError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// `OpenAI` audio transcriptions (Whisper).
#[derive(Clone)]
pub struct WhisperStt {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: String,
}

impl core::fmt::Debug for WhisperStt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WhisperStt")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl WhisperStt {
    /// Creates an adapter using `whisper-1` and English.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com".to_string(),
            model: "whisper-1".to_string(),
            language: "en".to_string(),
        }
    }

    /// Overrides the API origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the transcription model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the spoken language hint (ISO-639-1).
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[async_trait]
impl SpeechToText for WhisperStt {
    fn capabilities(&self) -> SttCapabilities {
        SttCapabilities { streaming: false }
    }

    async fn transcribe(&self, pcm: &[i16], sample_rate: u32) -> Result<String, SpeechError> {
        let wav = pcm_to_wav_bytes(pcm, sample_rate)?;
        if wav.len() > MAX_AUDIO_BYTES {
            return Err(SpeechError::InvalidInput(format!(
                "audio is {} bytes, limit is {MAX_AUDIO_BYTES}",
                wav.len()
            )));
        }

        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", self.language.clone());

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|err| SpeechError::InvalidInput(format!("Invalid API key header: {err}")))?;

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .header(AUTHORIZATION, auth)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SpeechError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|err| SpeechError::InvalidResponse(format!("{err}: {body}")))?;
        tracing::debug!(chars = parsed.text.len(), "transcribed segment");
        Ok(parsed.text)
    }
}
