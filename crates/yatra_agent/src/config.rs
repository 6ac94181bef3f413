//! Application configuration.
//!
//! Everything except credentials lives in a TOML file whose tables mirror
//! [`VoicebotConfig`]; every field has a default so an empty file (or no file)
//! is valid. Credentials are read from the environment by [`Secrets`].
//!
//! ```toml
//! [agent]
//! model_id = "openai/gpt-4o"
//! max_tool_depth = 5
//!
//! [timeouts]
//! llm_secs = 30
//!
//! [knowledge]
//! dir = "data"
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

use crate::prompt::{GREETING, TRAVEL_CONSULTANT_PROMPT};
use crate::session::TurnPolicy;
use crate::telephony::TelephonyError;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use yatra_core::{ConfigError, LoggingConfig, Secret, load_toml, optional_secret_from_env, secret_from_env};
use yatra_speech::VadConfig;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicebotConfig {
    /// Conversation settings.
    pub agent: AgentConfig,
    /// Per-call time limits.
    pub timeouts: TimeoutConfig,
    /// STT/TTS adapter settings.
    pub speech: SpeechConfig,
    /// Voice activity detection tuning.
    pub vad: VadConfig,
    /// Knowledge base location.
    pub knowledge: KnowledgeConfig,
    /// Outbound intro call settings.
    pub telephony: TelephonyConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl VoicebotConfig {
    /// Loads the configuration file, or the defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_toml(path),
            None => Ok(Self::default()),
        }
    }

    /// Turn limits derived from the agent and timeout tables.
    #[must_use]
    pub fn turn_policy(&self) -> TurnPolicy {
        TurnPolicy {
            max_tool_depth: self.agent.max_tool_depth,
            llm_timeout: self.timeouts.llm(),
            tts_timeout: self.timeouts.tts(),
        }
    }
}

/// The `[agent]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model in `provider/model` form.
    pub model_id: String,
    /// Maximum model rounds in one turn.
    pub max_tool_depth: usize,
    /// Overrides the built-in travel consultant instructions.
    pub instructions: Option<String>,
    /// First thing the bot says.
    pub greeting: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model_id: "openai/gpt-4o".to_string(),
            max_tool_depth: 5,
            instructions: None,
            greeting: GREETING.to_string(),
        }
    }
}

impl AgentConfig {
    /// The instructions the session is primed with.
    #[must_use]
    pub fn instructions(&self) -> &str {
        self.instructions
            .as_deref()
            .unwrap_or(TRAVEL_CONSULTANT_PROMPT)
    }
}

/// The `[timeouts]` table, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// One model completion.
    pub llm_secs: u64,
    /// One tool handler.
    pub tool_secs: u64,
    /// One transcription.
    pub stt_secs: u64,
    /// One synthesis.
    pub tts_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_secs: 30,
            tool_secs: 10,
            stt_secs: 15,
            tts_secs: 15,
        }
    }
}

impl TimeoutConfig {
    /// Model completion limit.
    #[must_use]
    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm_secs)
    }

    /// Tool handler limit.
    #[must_use]
    pub fn tool(&self) -> Duration {
        Duration::from_secs(self.tool_secs)
    }

    /// Transcription limit.
    #[must_use]
    pub fn stt(&self) -> Duration {
        Duration::from_secs(self.stt_secs)
    }

    /// Synthesis limit.
    #[must_use]
    pub fn tts(&self) -> Duration {
        Duration::from_secs(self.tts_secs)
    }
}

/// The `[speech]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Transcription model.
    pub stt_model: String,
    /// Spoken language hint.
    pub language: String,
    /// `ElevenLabs` voice.
    pub voice_id: String,
    /// `ElevenLabs` model.
    pub tts_model: String,
    /// Overrides the `OpenAI` API origin (chat and transcription).
    pub openai_base_url: Option<String>,
    /// Overrides the `ElevenLabs` API origin.
    pub elevenlabs_base_url: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_model: "whisper-1".to_string(),
            language: "en".to_string(),
            voice_id: "DpnM70iDHNHZ0Mguv6GJ".to_string(),
            tts_model: "eleven_monolingual_v1".to_string(),
            openai_base_url: None,
            elevenlabs_base_url: None,
        }
    }
}

/// The `[knowledge]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Directory of `.txt` / `.md` documents.
    pub dir: PathBuf,
    /// Passages returned per query.
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            top_k: 3,
        }
    }
}

/// The `[telephony]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    /// Name used in the intro call.
    pub customer_name: String,
    /// Number to dial, E.164.
    pub customer_phone: Option<String>,
    /// Trip destination mentioned in the intro call.
    pub destination: String,
    /// URL serving the intro call markup.
    pub intro_url: String,
    /// Overrides the Twilio API origin.
    pub api_base_url: Option<String>,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            customer_name: "Shreya".to_string(),
            customer_phone: None,
            destination: "Meghalaya".to_string(),
            intro_url: "http://localhost:8000/twiml/intro".to_string(),
            api_base_url: None,
        }
    }
}

impl TelephonyConfig {
    /// The number to dial: `given` when non-empty, otherwise `customer_phone`.
    ///
    /// # Errors
    ///
    /// Returns [`TelephonyError::MissingNumber`] if neither is set.
    pub fn recipient<'a>(&'a self, given: &'a str) -> Result<&'a str, TelephonyError> {
        let given = given.trim();
        if !given.is_empty() {
            return Ok(given);
        }
        self.customer_phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
            .ok_or(TelephonyError::MissingNumber)
    }
}

/// Credentials read from the environment.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// `OPENAI_API_KEY`.
    pub openai_api_key: Secret,
    /// `ELEVENLABS_API_KEY`; without it replies are text only.
    pub elevenlabs_api_key: Option<Secret>,
}

impl Secrets {
    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] if `OPENAI_API_KEY` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: secret_from_env("OPENAI_API_KEY")?,
            elevenlabs_api_key: optional_secret_from_env("ELEVENLABS_API_KEY"),
        })
    }
}
