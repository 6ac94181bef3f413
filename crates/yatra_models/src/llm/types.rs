//! Request and response shapes shared by every provider.

use super::context::{ChatContext, ChatMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The conversation to send to the model, instructions included.
    pub messages: Vec<ChatMessage>,
    /// Tools offered to the model.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Tool selection mode; provider default when `None`.
    pub tool_choice: Option<ToolChoice>,
}

impl GenerationRequest {
    /// Wraps `messages` with no tools.
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            tools: None,
            tool_choice: None,
        }
    }

    /// Creates a request carrying a copy of the whole conversation.
    ///
    /// # Example
    ///
    /// ```rust
    /// use yatra_models::llm::{ChatContext, ChatRole, GenerationRequest};
    ///
    /// let mut context = ChatContext::new();
    /// context.append(ChatRole::User, "Hello!");
    ///
    /// let request = GenerationRequest::from_context(&context);
    /// assert_eq!(request.messages.len(), 2);
    /// ```
    #[must_use]
    pub fn from_context(context: &ChatContext) -> Self {
        Self::new(context.messages().to_vec())
    }

    /// Offers one more tool.
    #[must_use]
    pub fn tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.get_or_insert_with(Vec::new).push(tool);
        self
    }

    /// Replaces the offered tools. An empty list offers none.
    #[must_use]
    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Sets the tool selection mode.
    #[must_use]
    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Lets the model pick between tools and text.
    #[must_use]
    pub fn auto_tool(mut self) -> Self {
        self.tool_choice = Some(ToolChoice::Auto);
        self
    }

    /// Forces a text answer.
    #[must_use]
    pub fn no_tool(mut self) -> Self {
        self.tool_choice = Some(ToolChoice::None);
        self
    }
}

/// One completion result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated content blocks, in provider order.
    pub content: Vec<AssistantBlock>,
    /// Token usage information.
    pub usage: Usage,
}

impl GenerationResponse {
    /// Concatenated text blocks; empty when the model only called tools.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::Text(text) => Some(text.as_str()),
                AssistantBlock::ToolCall(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Returns the tool calls in the order the provider returned them.
    #[must_use]
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::ToolCall(call) => Some(call),
                AssistantBlock::Text(_) => None,
            })
            .collect()
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: Option<u64>,
    /// Completion tokens.
    pub output_tokens: Option<u64>,
    /// Prompt plus completion.
    pub total_tokens: Option<u64>,
}

/// One block of model output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantBlock {
    /// Plain text content.
    Text(String),
    /// A requested tool invocation.
    ToolCall(ToolCall),
}

impl AssistantBlock {
    /// Text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Tool call block.
    #[must_use]
    pub fn tool_call(call: ToolCall) -> Self {
        Self::ToolCall(call)
    }
}

/// What the model is told about a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name of the tool (e.g., `query_kb`).
    pub name: String,
    /// Human-readable description, shown to the model for tool selection.
    pub description: String,
    /// Object schema for the arguments:
    ///
    /// ```json
    /// {
    ///   "type": "object",
    ///   "properties": {
    ///     "query": {"type": "string", "description": "The question to look up"}
    ///   },
    ///   "required": ["query"]
    /// }
    /// ```
    pub parameters: Value,
}

/// Tool selection mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Tools or text, model's choice.
    Auto,
    /// At least one tool call.
    Required,
    /// Exactly the named tool.
    Specific(String),
    /// Text only.
    None,
}

/// A tool invocation requested by the model.
///
/// `arguments` is kept exactly as the provider sent it (normally a JSON
/// encoded object). It is parsed and validated by the tool executor, never by
/// the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned identifier linking the call to its result.
    pub id: String,
    /// Registered tool name.
    pub name: String,
    /// Serialized arguments.
    pub arguments: String,
}

impl ToolCall {
    /// Builds a call record.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Whether a tool call succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultStatus {
    /// The handler returned a payload.
    #[default]
    Success,
    /// Lookup, validation or the handler failed.
    Error,
}
