//! A travel-consultant voicebot in Rust.
//!
//! Re-exports the Yatra crates for convenience.

/// Layer 0: configuration loading and tracing setup.
pub use yatra_core;

/// Layer 1: chat context, LLM handles and the provider trait.
pub use yatra_models;

/// Layer 1: tool registry and executor.
pub use yatra_tools;

/// Layer 1: the `OpenAI` Responses API provider.
pub use yatra_model_providers;

/// Layer 1: VAD, speech-to-text and text-to-speech adapters.
pub use yatra_speech;

/// Layer 2: conversation sessions, knowledge base and telephony.
pub use yatra_agent;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use yatra_agent::{
        AgentSession, KeywordIndex, KnowledgeBase, Reply, SessionError, TurnError, TurnPolicy,
        TurnState, VoicePipeline, VoicebotConfig,
    };
    pub use yatra_models::ModelRegistry;
    pub use yatra_models::llm::{ChatContext, ChatMessage, ChatRole, Llm, LlmProvider};
    pub use yatra_speech::{SpeechToText, TextToSpeech, VoiceActivityDetector};
    pub use yatra_tools::{Tool, ToolExecutor, ToolRegistry};
}
