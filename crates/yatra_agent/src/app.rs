//! Wiring a session from configuration.

use crate::config::VoicebotConfig;
use crate::knowledge::{KnowledgeBase, KnowledgeError};
use crate::session::{AgentSession, SessionError};
use crate::telephony::TelephonyError;
use crate::tools::travel_tools;
use std::sync::Arc;
use yatra_core::ConfigError;
use yatra_models::ModelRegistry;
use yatra_models::error::CreateModelError;
use yatra_speech::{SpeechError, TextToSpeech};
use yatra_tools::ToolError;

/// Errors that stop the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configured model is unavailable.
    #[error(transparent)]
    Model(#[from] CreateModelError),
    /// Tool registration failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// The knowledge base could not be loaded.
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    /// Audio could not be read or written.
    #[error(transparent)]
    Speech(#[from] SpeechError),
    /// The intro call failed.
    #[error(transparent)]
    Telephony(#[from] TelephonyError),
    /// The session refused a turn.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Console or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds a session for the configured model, with the travel tools.
///
/// # Errors
///
/// Returns [`AppError::Model`] if the model id is malformed or its provider
/// is not registered, and [`AppError::Tool`] if tool registration fails.
pub fn build_session(
    config: &VoicebotConfig,
    models: &ModelRegistry,
    knowledge: Arc<dyn KnowledgeBase>,
    tts: Option<Arc<dyn TextToSpeech>>,
) -> Result<AgentSession, AppError> {
    let llm = models.llm(&config.agent.model_id)?;
    let registry = Arc::new(travel_tools(knowledge)?);

    let mut session = AgentSession::new(llm, registry, config.agent.instructions())
        .with_policy(config.turn_policy())
        .with_tool_timeout(config.timeouts.tool());
    if let Some(tts) = tts {
        session = session.with_tts(tts);
    }
    tracing::info!(
        session = session.id(),
        model = %config.agent.model_id,
        "session ready"
    );
    Ok(session)
}
