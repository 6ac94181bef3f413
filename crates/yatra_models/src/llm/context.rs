//! Conversation history handed to the model.
//!
//! A [`ChatContext`] is an ordered list of [`ChatMessage`]s. Messages are
//! addressed by a string id that is unique within the context. The
//! instructions message is a system message stored under the reserved id
//! [`INSTRUCTIONS_MESSAGE_ID`]; a valid context holds exactly one.

use super::types::{ToolCall, ToolResultStatus};
use serde::{Deserialize, Serialize};

/// Reserved id of the system instructions message.
pub const INSTRUCTIONS_MESSAGE_ID: &str = "instructions";

/// Instructions used when none are configured.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful travel assistant. Ask questions naturally.";

/// Errors raised by [`ChatContext`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No message with the given id exists.
    #[error("message '{0}' not found in chat context")]
    NotFound(String),

    /// A message with the given id already exists.
    #[error("message id '{0}' is already used in chat context")]
    DuplicateId(String),

    /// The context has no instructions message.
    #[error("chat context has no instructions message")]
    MissingInstructions,

    /// The context has more than one instructions message.
    #[error("chat context has {0} instructions messages, expected exactly one")]
    DuplicateInstructions(usize),
}

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions.
    System,
    /// The caller.
    User,
    /// The model.
    Assistant,
    /// Output of a tool invocation.
    Tool,
}

/// What a message carries beyond its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain conversational text.
    Message,
    /// A tool invocation requested by the assistant.
    ToolCall {
        /// The requested call, arguments unparsed.
        call: ToolCall,
    },
    /// The outcome of a tool invocation.
    ToolResult {
        /// Id of the [`ToolCall`] this result answers.
        call_id: String,
        /// Name of the tool that produced the result.
        tool_name: String,
        /// Whether the tool succeeded.
        status: ToolResultStatus,
    },
}

/// A single entry of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique id within the owning context.
    pub id: String,
    /// Author of the message.
    pub role: ChatRole,
    /// Text content. Tool call messages carry none.
    pub content: Option<String>,
    /// Message kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Creates a plain text message. The id is assigned when the message is
    /// pushed into a context.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            role,
            content: Some(content.into()),
            kind: MessageKind::Message,
        }
    }

    /// Creates the instructions message.
    #[must_use]
    pub fn instructions(text: impl Into<String>) -> Self {
        Self::new(ChatRole::System, text).with_id(INSTRUCTIONS_MESSAGE_ID)
    }

    /// Creates an assistant message recording a tool call.
    #[must_use]
    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            id: String::new(),
            role: ChatRole::Assistant,
            content: None,
            kind: MessageKind::ToolCall { call },
        }
    }

    /// Creates a tool message recording the result of a call.
    #[must_use]
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        status: ToolResultStatus,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            role: ChatRole::Tool,
            content: Some(content.into()),
            kind: MessageKind::ToolResult {
                call_id: call_id.into(),
                tool_name: tool_name.into(),
                status,
            },
        }
    }

    /// Sets the message id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns the text content, or an empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Returns `true` if this is the instructions message.
    #[must_use]
    pub fn is_instructions(&self) -> bool {
        self.role == ChatRole::System && self.id == INSTRUCTIONS_MESSAGE_ID
    }
}

/// Ordered conversation history.
///
/// Insertion order is preserved. Ids are unique; generated ids are drawn
/// until they do not collide with an existing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatContext {
    messages: Vec<ChatMessage>,
}

impl Default for ChatContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatContext {
    /// Creates a context primed with [`DEFAULT_INSTRUCTIONS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_instructions(DEFAULT_INSTRUCTIONS)
    }

    /// Creates a context primed with the given instructions.
    #[must_use]
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::instructions(instructions)],
        }
    }

    /// Builds a context from existing messages, such as a restored snapshot.
    ///
    /// Messages without an id receive a generated one. When no instructions
    /// message is present, one carrying [`DEFAULT_INSTRUCTIONS`] is prepended.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::DuplicateId`] if two messages share an id, or
    /// [`ContextError::DuplicateInstructions`] if more than one instructions
    /// message is present.
    pub fn from_messages(
        messages: impl IntoIterator<Item = ChatMessage>,
    ) -> Result<Self, ContextError> {
        let mut context = Self {
            messages: Vec::new(),
        };
        for message in messages {
            if message.is_instructions() && context.has_instructions() {
                let count = context.instruction_count() + 1;
                return Err(ContextError::DuplicateInstructions(count));
            }
            context.push(message)?;
        }
        if !context.has_instructions() {
            context
                .messages
                .insert(0, ChatMessage::instructions(DEFAULT_INSTRUCTIONS));
        }
        Ok(context)
    }

    /// Appends a text message with a generated id and returns it.
    pub fn append(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        let message = ChatMessage::new(role, content).with_id(self.fresh_id());
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Appends a text message under a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::DuplicateId`] if the id is already used.
    pub fn append_with_id(
        &mut self,
        role: ChatRole,
        content: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<&ChatMessage, ContextError> {
        self.push(ChatMessage::new(role, content).with_id(id))
    }

    /// Appends a prepared message. An empty id is replaced by a generated one.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::DuplicateId`] if the id is already used.
    pub fn push(&mut self, mut message: ChatMessage) -> Result<&ChatMessage, ContextError> {
        if message.id.is_empty() {
            message.id = self.fresh_id();
        } else if self.contains(&message.id) {
            return Err(ContextError::DuplicateId(message.id));
        }
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Inserts a prepared message at the front.
    ///
    /// Ids are not checked here; [`validate`](Self::validate) reports any
    /// collision this introduces. An empty id is replaced by a generated one.
    pub fn insert_front(&mut self, mut message: ChatMessage) {
        if message.id.is_empty() {
            message.id = self.fresh_id();
        }
        self.messages.insert(0, message);
    }

    /// Returns the position of the message with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NotFound`] if no such message exists.
    pub fn index_of(&self, id: &str) -> Result<usize, ContextError> {
        self.messages
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| ContextError::NotFound(id.to_string()))
    }

    /// Returns the message with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Returns all messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Returns the last message.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the context holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Removes every message, instructions included.
    ///
    /// Call [`reprime`](Self::reprime) to restore a valid context.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Resets the context to a single instructions message.
    pub fn reprime(&mut self, instructions: impl Into<String>) {
        self.messages.clear();
        self.messages.push(ChatMessage::instructions(instructions));
    }

    /// Keeps only the first `len` messages.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Returns `true` if an instructions message is present.
    #[must_use]
    pub fn has_instructions(&self) -> bool {
        self.messages.iter().any(ChatMessage::is_instructions)
    }

    /// Returns the instructions text, if present.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.is_instructions())
            .map(ChatMessage::text)
    }

    /// Checks that exactly one instructions message is present and that all
    /// ids are unique.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::MissingInstructions`],
    /// [`ContextError::DuplicateInstructions`] or [`ContextError::DuplicateId`].
    pub fn validate(&self) -> Result<(), ContextError> {
        match self.instruction_count() {
            0 => return Err(ContextError::MissingInstructions),
            1 => {}
            n => return Err(ContextError::DuplicateInstructions(n)),
        }

        let mut seen = std::collections::HashSet::with_capacity(self.messages.len());
        for message in &self.messages {
            if !seen.insert(message.id.as_str()) {
                return Err(ContextError::DuplicateId(message.id.clone()));
            }
        }
        Ok(())
    }

    fn instruction_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_instructions()).count()
    }

    fn contains(&self, id: &str) -> bool {
        self.messages.iter().any(|m| m.id == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = nanoid::nanoid!();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_context_holds_default_instructions() {
        let context = ChatContext::new();

        assert_eq!(context.len(), 1);
        assert_eq!(context.instructions(), Some(DEFAULT_INSTRUCTIONS));
        assert_eq!(context.messages()[0].id, INSTRUCTIONS_MESSAGE_ID);
        assert!(context.validate().is_ok());
    }

    #[test]
    fn append_generates_unique_ids() {
        let mut context = ChatContext::new();
        let first = context.append(ChatRole::User, "hi").id.clone();
        let second = context.append(ChatRole::Assistant, "hello").id.clone();

        assert_ne!(first, second);
        assert_eq!(context.index_of(&first), Ok(1));
        assert_eq!(context.index_of(&second), Ok(2));
    }

    #[test]
    fn append_with_id_rejects_duplicates() {
        let mut context = ChatContext::new();
        context
            .append_with_id(ChatRole::Assistant, "Hi!", "greeting")
            .expect("first insert");

        let err = context
            .append_with_id(ChatRole::Assistant, "Hi again!", "greeting")
            .unwrap_err();
        assert_eq!(err, ContextError::DuplicateId("greeting".into()));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn index_of_unknown_id_is_not_found() {
        let context = ChatContext::new();
        assert_eq!(
            context.index_of("missing"),
            Err(ContextError::NotFound("missing".into()))
        );
    }

    #[test]
    fn clear_leaves_context_without_instructions() {
        let mut context = ChatContext::new();
        context.append(ChatRole::User, "hi");
        context.clear();

        assert!(context.is_empty());
        assert_eq!(context.validate(), Err(ContextError::MissingInstructions));

        context.reprime("Be brief.");
        assert_eq!(context.len(), 1);
        assert_eq!(context.instructions(), Some("Be brief."));
    }

    #[test]
    fn from_messages_primes_missing_instructions() {
        let context = ChatContext::from_messages(vec![ChatMessage::new(ChatRole::User, "hi")])
            .expect("valid messages");

        assert_eq!(context.len(), 2);
        assert!(context.messages()[0].is_instructions());
        assert!(context.validate().is_ok());
    }

    #[test]
    fn from_messages_rejects_duplicated_instructions() {
        let err = ChatContext::from_messages(vec![
            ChatMessage::instructions("a"),
            ChatMessage::new(ChatRole::User, "hi"),
            ChatMessage::instructions("b"),
        ])
        .unwrap_err();
        assert_eq!(err, ContextError::DuplicateInstructions(2));
    }

    #[test]
    fn extra_system_messages_are_not_instructions() {
        let mut context = ChatContext::new();
        context.append(ChatRole::System, "extra system text");
        assert!(context.validate().is_ok());
    }

    #[test]
    fn insert_front_skips_dedup_but_validate_catches_it() {
        let mut context = ChatContext::new();
        context.insert_front(ChatMessage::instructions("Be kind."));

        assert!(context.messages()[0].is_instructions());
        assert_eq!(
            context.validate(),
            Err(ContextError::DuplicateInstructions(2))
        );

        let mut context = ChatContext::new();
        let id = context.append(ChatRole::User, "hi").id.clone();
        context.insert_front(ChatMessage::new(ChatRole::User, "again").with_id(id.clone()));
        assert_eq!(context.len(), 3);
        assert_eq!(context.validate(), Err(ContextError::DuplicateId(id)));
    }

    #[test]
    fn snapshot_round_trip_preserves_order() {
        let mut context = ChatContext::with_instructions("Plan trips.");
        context.append(ChatRole::User, "Meghalaya in June?");
        context.append(ChatRole::Assistant, "Monsoon season, very green.");

        let json = serde_json::to_string(&context).expect("serializable");
        let restored: ChatContext = serde_json::from_str(&json).expect("deserializable");
        let restored = ChatContext::from_messages(restored.messages().to_vec())
            .expect("snapshot is valid");

        assert_eq!(restored, context);
    }

    #[test]
    fn tool_messages_serialize_with_type_tag() {
        let call = ToolCall::new("call_1", "query_kb", r#"{"query":"Goa"}"#);
        let message = ChatMessage::tool_call(call).with_id("m1");
        let json = serde_json::to_value(&message).expect("serializable");

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["type"]["tool_call"]["call"]["name"], "query_kb");

        let result = ChatMessage::tool_result("call_1", "query_kb", ToolResultStatus::Error, "x");
        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["role"], "tool");
        assert_eq!(json["type"]["tool_result"]["status"], "error");
    }

    proptest! {
        #[test]
        fn appended_messages_are_found_at_their_position(texts in prop::collection::vec(".{0,16}", 0..24)) {
            let mut context = ChatContext::new();
            let ids: Vec<String> = texts
                .iter()
                .map(|text| context.append(ChatRole::User, text.clone()).id.clone())
                .collect();

            prop_assert_eq!(context.len(), texts.len() + 1);
            for (offset, id) in ids.iter().enumerate() {
                prop_assert_eq!(context.index_of(id), Ok(offset + 1));
                prop_assert_eq!(context.get(id).map(ChatMessage::text), Some(texts[offset].as_str()));
            }
        }

        #[test]
        fn truncate_then_append_keeps_ids_unique(keep in 0usize..8, extra in 0usize..8) {
            let mut context = ChatContext::new();
            for i in 0..8 {
                context.append(ChatRole::User, format!("m{i}"));
            }
            context.truncate(keep + 1);
            for i in 0..extra {
                context.append(ChatRole::Assistant, format!("r{i}"));
            }

            let mut ids: Vec<&str> = context.messages().iter().map(|m| m.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), context.len());
        }
    }
}
