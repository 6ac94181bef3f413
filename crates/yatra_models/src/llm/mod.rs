//! LLM (Large Language Model) conversation capabilities.
//!
//! This module provides the core traits and types for driving a chat model:
//!
//! - [`ChatContext`]: the ordered conversation history
//! - [`LlmProvider`]: the provider-side generation trait
//! - [`Llm`]: a model handle exposing [`Llm::complete`]
//! - Tool calling types shared with the tool executor

mod context;
mod error;
mod model;
mod provider;
mod types;

pub use context::{
    ChatContext, ChatMessage, ChatRole, ContextError, DEFAULT_INSTRUCTIONS,
    INSTRUCTIONS_MESSAGE_ID, MessageKind,
};
pub use error::GenerationError;
pub use model::{Llm, Outcome};
pub use provider::LlmProvider;
pub use types::{
    AssistantBlock, GenerationRequest, GenerationResponse, ToolCall, ToolChoice, ToolDefinition,
    ToolResultStatus, Usage,
};
