//! Yatra, a travel-consultant voicebot.
//!
//! The bot greets a caller, asks about their trip, looks up matching group
//! tour packages with the `query_kb` tool and answers by voice.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  VoicePipeline                                               │
//! │                                                              │
//! │  ┌─────┐   ┌─────┐   ┌──────────────────────────┐   ┌─────┐  │
//! │  │ VAD │──▶│ STT │──▶│       AgentSession       │──▶│ TTS │  │
//! │  └─────┘   └─────┘   │                          │   └─────┘  │
//! │                      │  ChatContext ─▶ Llm      │            │
//! │                      │       ▲          │       │            │
//! │                      │       └─ ToolExecutor ◀──┘            │
//! │                      └──────────────────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AgentSession`] runs one turn per utterance; the model may call tools
//! for up to [`TurnPolicy::max_tool_depth`] rounds before it must answer.

mod app;
pub mod config;
pub mod knowledge;
pub mod prompt;
pub mod session;
pub mod telephony;
pub mod tools;
pub mod voice;

pub use app::{AppError, build_session};
pub use config::{Secrets, VoicebotConfig};
pub use knowledge::{KeywordIndex, KnowledgeBase, KnowledgeError};
pub use session::{AgentSession, Reply, SessionError, TurnError, TurnPolicy, TurnState};
pub use telephony::{IntroCall, TelephonyError, TwilioClient, TwilioCredentials};
pub use tools::{QueryKnowledgeBase, travel_tools};
pub use voice::VoicePipeline;
