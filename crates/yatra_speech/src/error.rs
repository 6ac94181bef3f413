//! Error type shared by the speech adapters.

/// Errors raised by STT, TTS and audio helpers.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Transport failure talking to a speech service.
    #[error("http error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("speech provider error ({status}): {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The service answered with a body that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The input was rejected before any request was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// WAV encoding or decoding failed.
    #[error("audio error: {0}")]
    Audio(#[from] hound::Error),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
