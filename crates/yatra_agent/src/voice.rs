//! Audio in, replies out.
//!
//! [`VoicePipeline`] finds speech in a PCM buffer, transcribes each segment
//! and feeds the transcript to the session as one utterance.

use crate::session::{AgentSession, Reply, SessionError};
use core::time::Duration;
use std::sync::Arc;
use yatra_speech::{SpeechToText, VoiceActivityDetector};

/// Detects, transcribes and answers speech.
pub struct VoicePipeline {
    vad: Arc<dyn VoiceActivityDetector>,
    stt: Arc<dyn SpeechToText>,
    stt_timeout: Duration,
    session: Arc<AgentSession>,
}

impl core::fmt::Debug for VoicePipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VoicePipeline")
            .field("stt_timeout", &self.stt_timeout)
            .field("session", &self.session.id())
            .finish_non_exhaustive()
    }
}

impl VoicePipeline {
    /// Builds a pipeline feeding `session`.
    pub fn new(
        vad: Arc<dyn VoiceActivityDetector>,
        stt: Arc<dyn SpeechToText>,
        session: Arc<AgentSession>,
    ) -> Self {
        if !stt.capabilities().streaming {
            tracing::info!("speech-to-text is batch only, transcribing per speech segment");
        }
        Self {
            vad,
            stt,
            stt_timeout: Duration::from_secs(15),
            session,
        }
    }

    /// Limits each transcription to `timeout`.
    #[must_use]
    pub fn with_stt_timeout(mut self, timeout: Duration) -> Self {
        self.stt_timeout = timeout;
        self
    }

    /// The session replies come from.
    #[must_use]
    pub fn session(&self) -> &Arc<AgentSession> {
        &self.session
    }

    /// Answers every utterance found in `samples`, in order.
    ///
    /// Segments that transcribe to nothing, or that fall outside `samples`,
    /// are skipped. A failed detection or transcription yields a fallback
    /// reply and leaves the context alone.
    ///
    /// # Errors
    ///
    /// Returns the first [`SessionError`] from the session.
    pub async fn process(
        &self,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<Vec<Reply>, SessionError> {
        let segments = match self.vad.segment(samples, sample_rate) {
            Ok(segments) => segments,
            Err(err) => {
                tracing::warn!(error = %err, sample_rate, "speech detection failed");
                let reply = self
                    .session
                    .transcription_failed(format!("speech detection failed: {err}"))
                    .await?;
                return Ok(vec![reply]);
            }
        };
        tracing::debug!(segments = segments.len(), "speech segments detected");

        let mut replies = Vec::with_capacity(segments.len());
        for segment in segments {
            let end = segment.end.min(samples.len());
            let Some(chunk) = samples.get(segment.start..end).filter(|c| !c.is_empty()) else {
                tracing::debug!(
                    start = segment.start,
                    end = segment.end,
                    "segment outside buffer skipped"
                );
                continue;
            };
            let transcript =
                tokio::time::timeout(self.stt_timeout, self.stt.transcribe(chunk, sample_rate))
                    .await;

            let reply = match transcript {
                Ok(Ok(text)) if text.trim().is_empty() => {
                    tracing::debug!(start = segment.start, "empty transcript skipped");
                    continue;
                }
                Ok(Ok(text)) => {
                    tracing::info!(transcript = %text.trim(), "user said");
                    self.session.handle_utterance(text.trim()).await?
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "transcription failed");
                    self.session.transcription_failed(err.to_string()).await?
                }
                Err(_) => {
                    tracing::warn!(timeout = ?self.stt_timeout, "transcription timed out");
                    self.session
                        .transcription_failed(format!("timed out after {:?}", self.stt_timeout))
                        .await?
                }
            };
            replies.push(reply);
        }
        Ok(replies)
    }
}
